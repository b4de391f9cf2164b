use crate::{EmittedToken, ExtractionEvent};

type TransformFn = Box<dyn Fn(&str) -> String + Send + Sync>;
type FilterFn = Box<dyn Fn(&ExtractionEvent) -> bool + Send + Sync>;

/// Turns extraction events into output tokens.
pub struct TokenTransformer {
    transform: TransformFn,
    filter: Option<FilterFn>,
}

impl TokenTransformer {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            transform: Box::new(transform),
            filter: None,
        }
    }

    /// Unicode, locale-independent uppercasing.
    pub fn uppercase() -> Self {
        Self::new(str::to_uppercase)
    }

    pub fn identity() -> Self {
        Self::new(str::to_owned)
    }

    /// Only events for which `filter` returns true are emitted.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ExtractionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Drops string values and emits object keys only.
    pub fn keys_only(self) -> Self {
        self.with_filter(ExtractionEvent::is_key)
    }

    pub fn accepts(&self, event: &ExtractionEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    pub fn apply(&self, index: usize, event: &ExtractionEvent) -> EmittedToken {
        EmittedToken {
            index,
            is_key: event.is_key(),
            text: (self.transform)(event.as_str()),
        }
    }
}

impl Default for TokenTransformer {
    fn default() -> Self {
        Self::uppercase()
    }
}
