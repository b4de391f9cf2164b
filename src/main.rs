use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stream_capitalizer::{EmitPipeline, PipelineError, Settings, TokenTransformer};
use tracing::debug;

#[cfg(feature = "metrics")]
use stream_capitalizer::PipelineMetrics;

/// Reads a JSON document from stdin in fixed-size chunks and prints every key
/// and string value uppercased, comma terminated. Prints `OK` to stderr once
/// the whole document parsed.
#[derive(Parser, Debug)]
#[command(name = "capitalize", version)]
struct Args {
    /// Bytes read from stdin per chunk (at least 1).
    chunk_size: usize,

    /// Milliseconds to wait before emitting each token.
    processor_delay: u64,

    /// Settings file (toml, yaml or json) for separator, marker and read timeout.
    #[arg(short, long, value_name = "file")]
    config: Option<PathBuf>,

    /// Dump prometheus metrics to stderr after the completion marker.
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics: bool,
}

async fn run(args: Args) -> Result<(), PipelineError> {
    let mut settings = Settings::load(args.config.as_deref())
        .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
    settings.chunk_size = args.chunk_size;
    settings.processor_delay_ms = args.processor_delay;

    let pipeline = EmitPipeline::new(settings.into_pipeline_config()?, TokenTransformer::uppercase())?;
    #[cfg(feature = "metrics")]
    let metrics = PipelineMetrics::new()?;
    #[cfg(feature = "metrics")]
    let pipeline = pipeline.with_metrics(metrics.clone());

    let report = pipeline
        .run(tokio::io::stdin(), tokio::io::stdout(), tokio::io::stderr())
        .await?;
    debug!(?report, "document processed");

    #[cfg(feature = "metrics")]
    if args.metrics {
        eprint!("\n{}", metrics.gather()?);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(PipelineError::Parse(e)) => {
            eprintln!("A parser error occurred, the input is incomplete or invalid JSON.\nError: [ {e} ]");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
