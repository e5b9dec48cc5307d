use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use common::utils::config::{get_config, ConversionSettings, OverflowPolicy};

use crate::datasets::Split;

pub const DEFAULT_INSPECT_LIMIT: usize = 5;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Folder for the generated tfrecord and id mapping files (created if absent)
    #[arg(long)]
    pub output_folder: Option<PathBuf>,

    /// BERT WordPiece vocabulary file
    #[arg(long)]
    pub vocab_file: Option<PathBuf>,

    /// Training triples TSV (query, positive passage, negative passage)
    #[arg(long)]
    pub train_dataset_path: Option<PathBuf>,

    /// Dev top-1000 candidates TSV
    #[arg(long)]
    pub dev_dataset_path: Option<PathBuf>,

    /// Eval top-1000 candidates TSV
    #[arg(long)]
    pub eval_dataset_path: Option<PathBuf>,

    /// Dev relevance judgments (qrels) TSV
    #[arg(long)]
    pub dev_qrels_path: Option<PathBuf>,

    /// Maximum ids per query plus document sequence
    #[arg(long)]
    pub max_seq_length: Option<usize>,

    /// Maximum ids per query, markers included
    #[arg(long)]
    pub max_query_length: Option<usize>,

    /// Candidates per query in the dev and eval files
    #[arg(long)]
    pub num_eval_docs: Option<usize>,

    /// What to do with queries that have more than num_eval_docs candidates
    #[arg(long)]
    pub overflow_policy: Option<OverflowPolicy>,

    /// Splits to convert; always run in train, dev, eval order
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = Split::ALL)]
    pub splits: Vec<Split>,

    /// Skip writing conversion_report.json into the output folder
    #[arg(long = "no-report", action = ArgAction::SetFalse)]
    pub report: bool,

    /// Decode and log the first records of an existing tfrecord file, then exit
    #[arg(long)]
    pub inspect: Option<PathBuf>,

    /// Number of records to show in inspection mode
    #[arg(long, default_value_t = DEFAULT_INSPECT_LIMIT)]
    pub inspect_limit: usize,

    // Computed fields (not arguments)
    #[arg(skip)]
    pub settings: ConversionSettings,
}

impl Config {
    /// Layers CLI overrides on top of `base` and validates the result.
    pub fn finalize(&mut self, base: ConversionSettings) -> Result<()> {
        let mut settings = base;

        if let Some(folder) = &self.output_folder {
            settings.output_folder = Some(folder.clone());
        }
        if let Some(path) = &self.vocab_file {
            settings.vocab_file = path.clone();
        }
        if let Some(path) = &self.train_dataset_path {
            settings.train_dataset_path = path.clone();
        }
        if let Some(path) = &self.dev_dataset_path {
            settings.dev_dataset_path = path.clone();
        }
        if let Some(path) = &self.eval_dataset_path {
            settings.eval_dataset_path = path.clone();
        }
        if let Some(path) = &self.dev_qrels_path {
            settings.dev_qrels_path = path.clone();
        }
        if let Some(value) = self.max_seq_length {
            settings.max_seq_length = value;
        }
        if let Some(value) = self.max_query_length {
            settings.max_query_length = value;
        }
        if let Some(value) = self.num_eval_docs {
            settings.num_eval_docs = value;
        }
        if let Some(policy) = self.overflow_policy {
            settings.overflow_policy = policy;
        }

        self.splits.sort_unstable();
        self.splits.dedup();

        // Validations
        if settings.max_query_length < 2 {
            return Err(anyhow!(
                "--max-query-length must leave room for [CLS] and [SEP] (got {})",
                settings.max_query_length
            ));
        }

        if settings.max_seq_length <= settings.max_query_length {
            return Err(anyhow!(
                "--max-seq-length ({}) must be greater than --max-query-length ({})",
                settings.max_seq_length,
                settings.max_query_length
            ));
        }

        if settings.num_eval_docs == 0 {
            return Err(anyhow!("--num-eval-docs must be greater than zero"));
        }

        if self.inspect_limit == 0 {
            return Err(anyhow!("--inspect-limit must be greater than zero"));
        }

        if self.inspect.is_none() {
            if self.splits.is_empty() {
                return Err(anyhow!("--splits must name at least one split"));
            }
            if settings.output_folder.is_none() {
                return Err(anyhow!(
                    "--output-folder is required (or set CONVERTER_OUTPUT_FOLDER)"
                ));
            }
        }

        self.settings = settings;
        Ok(())
    }

    pub fn output_folder(&self) -> Result<&Path> {
        self.settings
            .output_folder
            .as_deref()
            .ok_or_else(|| anyhow!("no output folder configured"))
    }
}

pub struct ParsedArgs {
    pub config: Config,
}

pub fn parse() -> Result<ParsedArgs> {
    let mut config = Config::parse();
    let base = get_config().context("loading converter configuration")?;
    config.finalize(base)?;
    Ok(ParsedArgs { config })
}
