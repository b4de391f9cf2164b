mod config_tests;
mod transformer_tests;

use crate::{ExtractionEvent, IncrementalParser, ParseError};

/// Feeds `doc` in slices of `chunk_size` bytes and collects every event.
pub(crate) fn parse_chunked(doc: &[u8], chunk_size: usize) -> Result<Vec<ExtractionEvent>, ParseError> {
    let mut parser = IncrementalParser::new();
    let mut events = Vec::new();
    for chunk in doc.chunks(chunk_size) {
        for event in parser.feed(chunk) {
            events.push(event?);
        }
    }
    events.extend(parser.finish()?);
    Ok(events)
}

pub(crate) fn upper_tokens(events: &[ExtractionEvent]) -> Vec<String> {
    events.iter().map(|e| e.as_str().to_uppercase()).collect()
}

/// The payloads the command line tool is checked against, with their expected output.
pub(crate) const PAYLOADS: &[(&str, &str, &[&str])] = &[
    ("emptyObject", "{}", &[]),
    ("emptyArray", "[]", &[]),
    ("numberKey", r#"{"number":1}"#, &["NUMBER"]),
    ("stringKey", r#"{"string":"hello world"}"#, &["STRING", "HELLO WORLD"]),
    ("objectKey", r#"{"object":{}}"#, &["OBJECT"]),
    (
        "nestedObject",
        r#"{"outer":{"inner":{"string":"hola"}}}"#,
        &["OUTER", "INNER", "STRING", "HOLA"],
    ),
];
