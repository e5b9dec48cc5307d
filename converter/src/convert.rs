use std::fs;

use anyhow::{Context, Result};
use common::tokenization::TextTokenizer;
use tracing::info;

use crate::{
    args::Config,
    datasets::Split,
    eval::convert_eval_dataset,
    report::{write_report, SplitSummary},
    train::convert_train_dataset,
};

/// Converts every selected split in train, dev, eval order, then writes the run report.
pub fn run_conversion(config: &Config, tokenizer: &TextTokenizer) -> Result<Vec<SplitSummary>> {
    let settings = &config.settings;
    let output_folder = config.output_folder()?;
    fs::create_dir_all(output_folder)
        .with_context(|| format!("creating output folder {}", output_folder.display()))?;

    let mut summaries = Vec::with_capacity(config.splits.len());
    for &split in &config.splits {
        let summary = match split {
            Split::Train => convert_train_dataset(settings, tokenizer, output_folder),
            Split::Dev | Split::Eval => {
                convert_eval_dataset(split, settings, tokenizer, output_folder)
            }
        }
        .with_context(|| format!("converting {split} split"))?;
        summaries.push(summary);
    }

    if config.report {
        let path = write_report(settings, &summaries, output_folder)?;
        info!(path = %path.display(), "Wrote conversion report");
    }

    Ok(summaries)
}
