mod args;
mod convert;
mod datasets;
mod encoder;
mod eval;
mod inspection;
mod progress;
mod report;
mod train;

use anyhow::Context;
use common::tokenization::{TextTokenizer, WordPieceTokenizer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let parsed = args::parse()?;
    let config = parsed.config;

    if let Some(path) = config.inspect.as_deref() {
        inspection::inspect_records(path, config.inspect_limit)?;
        return Ok(());
    }

    let vocab_file = config.settings.vocab_file.as_path();
    info!(path = %vocab_file.display(), "Loading tokenizer vocabulary");
    let tokenizer = WordPieceTokenizer::from_vocab_file(vocab_file)
        .with_context(|| format!("loading vocabulary from {}", vocab_file.display()))?;
    let tokenizer = TextTokenizer::new(tokenizer);

    let summaries = convert::run_conversion(&config, &tokenizer)?;
    let records: u64 = summaries.iter().map(|summary| summary.records_written).sum();
    info!(splits = summaries.len(), records, "Done");

    Ok(())
}
