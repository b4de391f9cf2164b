//! # Streaming JSON Capitalizer
//!
//! This library extracts every object key and string value from a JSON
//! document that arrives in arbitrarily small chunks, uppercases each one and
//! streams the results out as soon as they are known. Tokens may be split at
//! any byte offset, including inside `\uXXXX` escapes and multi-byte UTF-8
//! sequences.
//!
//! Parsing is pull-driven: the [`IncrementalParser`] only scans far enough to
//! produce the next event, and [`EmitPipeline`] only reads another chunk once
//! the previous events have been emitted. A slow consumer therefore slows
//! down how fast input is read.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stream_capitalizer::{EmitPipeline, PipelineConfig, TokenTransformer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input: &[u8] = br#"{"outer": {"inner": {"string": "hola"}}}"#;
//!     let config = PipelineConfig::new(8, Duration::from_millis(20));
//!     let pipeline = EmitPipeline::new(config, TokenTransformer::uppercase())?;
//!
//!     let mut out = Vec::new();
//!     let mut done = Vec::new();
//!     pipeline.run(input, &mut out, &mut done).await?;
//!
//!     assert_eq!(out, b"OUTER,INNER,STRING,HOLA,");
//!     assert_eq!(done, b"OK");
//!     Ok(())
//! }
//! ```

#[cfg(test)]
mod tests;

mod event;
pub use event::*;

mod escape;

mod parser;
pub use parser::*;

mod reader;
pub use reader::*;

mod stream_adapter;
pub use stream_adapter::*;

mod transformers;
pub use transformers::*;

mod pipeline;
pub use pipeline::*;

mod config;
pub use config::*;

#[cfg(feature = "metrics")]
mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::*;
