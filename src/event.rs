use std::fmt;

/// A key or string value pulled out of the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionEvent {
    Key(String),
    StringValue(String),
}

impl ExtractionEvent {
    pub fn as_str(&self) -> &str {
        match self {
            ExtractionEvent::Key(s) | ExtractionEvent::StringValue(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ExtractionEvent::Key(s) | ExtractionEvent::StringValue(s) => s,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, ExtractionEvent::Key(_))
    }
}

/// The transformed payload of an event, tagged with its position in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedToken {
    pub index: usize,
    pub is_key: bool,
    pub text: String,
}

impl fmt::Display for EmittedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
