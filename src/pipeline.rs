use async_stream::try_stream;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, instrument, warn};
use validator::Validate;

#[cfg(feature = "metrics")]
use crate::PipelineMetrics;
use crate::{ChunkSource, ExtractionEvent, IncrementalParser, ParseError, TokenTransformer};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Parse(#[from] ParseError),
    #[error("Timeout while waiting for input")]
    Timeout,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[cfg(feature = "metrics")]
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PipelineConfig {
    #[validate(range(min = 1))]
    pub chunk_size: usize,
    pub processor_delay: Duration,
    pub separator: u8,
    #[validate(length(min = 1))]
    pub completion_marker: String,
    pub read_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            processor_delay: Duration::ZERO,
            separator: b',',
            completion_marker: "OK".to_string(),
            read_timeout: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(chunk_size: usize, processor_delay: Duration) -> Self {
        Self {
            chunk_size,
            processor_delay,
            ..Default::default()
        }
    }

    pub fn validated(self) -> Result<Self, PipelineError> {
        self.validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        Ok(self)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineReport {
    pub tokens_emitted: usize,
    pub bytes_read: u64,
    pub chunks_read: u64,
}

// A chunk is only requested once the parser has no further event in the bytes
// it already holds, so reads from `source` follow the consumer's pace.
fn scan<R>(
    source: &mut ChunkSource<R>,
) -> impl Stream<Item = Result<ExtractionEvent, PipelineError>> + '_
where
    R: AsyncRead + Unpin,
{
    try_stream! {
        let mut parser = IncrementalParser::new();
        while let Some(chunk) = source.next_chunk().await? {
            for event in parser.feed(&chunk) {
                yield event?;
            }
        }
        for event in parser.finish()? {
            yield event;
        }
    }
}

/// Lazily extracts keys and string values from `reader`, reading at most
/// `chunk_size` bytes at a time and only when the consumer asks for more.
///
/// The stream ends with the first error.
pub fn extract_events<R>(
    reader: R,
    chunk_size: usize,
    read_timeout: Option<Duration>,
) -> impl Stream<Item = Result<ExtractionEvent, PipelineError>>
where
    R: AsyncRead + Unpin,
{
    try_stream! {
        let mut source = ChunkSource::new(reader, chunk_size).with_timeout(read_timeout);
        let events = scan(&mut source);
        tokio::pin!(events);
        while let Some(event) = events.next().await {
            yield event?;
        }
    }
}

/// Pulls events from the parser, transforms them one at a time, waits the
/// processor delay and writes each token followed by the separator.
///
/// The completion marker goes to its own sink and only after the whole input
/// parsed cleanly.
pub struct EmitPipeline {
    config: PipelineConfig,
    transformer: TokenTransformer,
    #[cfg(feature = "metrics")]
    metrics: Option<PipelineMetrics>,
}

impl EmitPipeline {
    pub fn new(config: PipelineConfig, transformer: TokenTransformer) -> Result<Self, PipelineError> {
        Ok(Self {
            config: config.validated()?,
            transformer,
            #[cfg(feature = "metrics")]
            metrics: None,
        })
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[instrument(skip_all, fields(chunk_size = self.config.chunk_size, delay_ms = self.config.processor_delay.as_millis() as u64))]
    pub async fn run<R, W, C>(
        &self,
        reader: R,
        mut out: W,
        mut completion: C,
    ) -> Result<PipelineReport, PipelineError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        C: AsyncWrite + Unpin,
    {
        let mut source =
            ChunkSource::new(reader, self.config.chunk_size).with_timeout(self.config.read_timeout);
        let mut tokens_emitted = 0;

        {
            let events = scan(&mut source);
            tokio::pin!(events);
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, tokens_emitted, "aborting run");
                        return Err(e);
                    }
                };
                if !self.transformer.accepts(&event) {
                    continue;
                }

                let token = self.transformer.apply(tokens_emitted, &event);
                if !self.config.processor_delay.is_zero() {
                    sleep(self.config.processor_delay).await;
                }
                out.write_all(token.text.as_bytes()).await?;
                out.write_all(&[self.config.separator]).await?;
                out.flush().await?;

                #[cfg(feature = "metrics")]
                if let Some(metrics) = &self.metrics {
                    metrics.token_emitted();
                }
                tokens_emitted += 1;
            }
        }

        completion
            .write_all(self.config.completion_marker.as_bytes())
            .await?;
        completion.flush().await?;

        let report = PipelineReport {
            tokens_emitted,
            bytes_read: source.bytes_read(),
            chunks_read: source.chunks_read(),
        };
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.input_consumed(report.bytes_read, report.chunks_read);
        }
        debug!(?report, "run complete");
        Ok(report)
    }
}
