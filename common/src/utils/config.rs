use std::{fmt, path::Path, path::PathBuf, str::FromStr};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SEQ_LENGTH: usize = 512;
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 64;
pub const DEFAULT_NUM_EVAL_DOCS: usize = 1000;

/// What to do with a query that has more than `num_eval_docs` candidates.
#[derive(Clone, Copy, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Abort the split on the post-padding length check.
    #[default]
    Reject,
    /// Keep the first `num_eval_docs` candidates in input order.
    Truncate,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "truncate" => Ok(Self::Truncate),
            other => Err(format!(
                "unknown overflow policy '{other}'. Expected 'reject' or 'truncate'."
            )),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Truncate => write!(f, "truncate"),
        }
    }
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct ConversionSettings {
    #[serde(default)]
    pub output_folder: Option<PathBuf>,
    #[serde(default = "default_vocab_file")]
    pub vocab_file: PathBuf,
    #[serde(default = "default_train_dataset_path")]
    pub train_dataset_path: PathBuf,
    #[serde(default = "default_dev_dataset_path")]
    pub dev_dataset_path: PathBuf,
    #[serde(default = "default_eval_dataset_path")]
    pub eval_dataset_path: PathBuf,
    #[serde(default = "default_dev_qrels_path")]
    pub dev_qrels_path: PathBuf,
    #[serde(default = "default_max_seq_length")]
    pub max_seq_length: usize,
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
    #[serde(default = "default_num_eval_docs")]
    pub num_eval_docs: usize,
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            output_folder: None,
            vocab_file: default_vocab_file(),
            train_dataset_path: default_train_dataset_path(),
            dev_dataset_path: default_dev_dataset_path(),
            eval_dataset_path: default_eval_dataset_path(),
            dev_qrels_path: default_dev_qrels_path(),
            max_seq_length: default_max_seq_length(),
            max_query_length: default_max_query_length(),
            num_eval_docs: default_num_eval_docs(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

fn default_vocab_file() -> PathBuf {
    PathBuf::from("./data/bert/uncased_L-24_H-1024_A-16/vocab.txt")
}

fn default_train_dataset_path() -> PathBuf {
    PathBuf::from("./data/triples.train.small.tsv")
}

fn default_dev_dataset_path() -> PathBuf {
    PathBuf::from("./data/top1000.dev.tsv")
}

fn default_eval_dataset_path() -> PathBuf {
    PathBuf::from("./data/top1000.eval.tsv")
}

fn default_dev_qrels_path() -> PathBuf {
    PathBuf::from("./data/qrels.dev.tsv")
}

fn default_max_seq_length() -> usize {
    DEFAULT_MAX_SEQ_LENGTH
}

fn default_max_query_length() -> usize {
    DEFAULT_MAX_QUERY_LENGTH
}

fn default_num_eval_docs() -> usize {
    DEFAULT_NUM_EVAL_DOCS
}

/// Loads settings from an optional `converter.{toml,yaml,json}` in the working
/// directory, then `CONVERTER_*` environment variables.
pub fn get_config() -> Result<ConversionSettings, ConfigError> {
    load_config(None)
}

pub fn load_config(file: Option<&Path>) -> Result<ConversionSettings, ConfigError> {
    let file_source = match file {
        Some(path) => File::from(path).required(true),
        None => File::with_name("converter").required(false),
    };

    let config = Config::builder()
        .add_source(file_source)
        .add_source(Environment::with_prefix("CONVERTER").try_parsing(true))
        .build()?;

    config.try_deserialize()
}
