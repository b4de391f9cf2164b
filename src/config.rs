use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{PipelineConfig, PipelineError};

/// Layered settings: built-in defaults, then an optional file, then
/// `CAPITALIZE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunk_size: usize,
    pub processor_delay_ms: u64,
    pub separator: char,
    pub completion_marker: String,
    pub read_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            processor_delay_ms: 0,
            separator: ',',
            completion_marker: "OK".to_string(),
            read_timeout_ms: None,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix("CAPITALIZE"))
            .build()?
            .try_deserialize()
    }

    pub fn into_pipeline_config(self) -> Result<PipelineConfig, PipelineError> {
        if !self.separator.is_ascii() {
            return Err(PipelineError::InvalidConfig(format!(
                "separator {:?} must be a single ASCII character",
                self.separator
            )));
        }
        PipelineConfig {
            chunk_size: self.chunk_size,
            processor_delay: Duration::from_millis(self.processor_delay_ms),
            separator: self.separator as u8,
            completion_marker: self.completion_marker,
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
        }
        .validated()
    }
}
