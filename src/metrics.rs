use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::PipelineError;

/// Counters for one pipeline run, kept in their own registry.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Registry,
    tokens_emitted: IntCounter,
    bytes_read: IntCounter,
    chunks_read: IntCounter,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();
        let tokens_emitted = IntCounter::new(
            "capitalize_tokens_emitted_total",
            "Tokens written to the output stream",
        )?;
        let bytes_read = IntCounter::new("capitalize_bytes_read_total", "Input bytes consumed")?;
        let chunks_read = IntCounter::new("capitalize_chunks_read_total", "Input chunks consumed")?;
        registry.register(Box::new(tokens_emitted.clone()))?;
        registry.register(Box::new(bytes_read.clone()))?;
        registry.register(Box::new(chunks_read.clone()))?;

        Ok(Self {
            registry,
            tokens_emitted,
            bytes_read,
            chunks_read,
        })
    }

    pub(crate) fn token_emitted(&self) {
        self.tokens_emitted.inc();
    }

    pub(crate) fn input_consumed(&self, bytes: u64, chunks: u64) {
        self.bytes_read.inc_by(bytes);
        self.chunks_read.inc_by(chunks);
    }

    pub fn tokens_emitted(&self) -> u64 {
        self.tokens_emitted.get()
    }

    /// Renders the registry in the prometheus text format.
    pub fn gather(&self) -> Result<String, PipelineError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
