use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use common::utils::config::ConversionSettings;
use serde::Serialize;

use crate::datasets::Split;

pub const REPORT_FILE_NAME: &str = "conversion_report.json";

/// What one split's conversion wrote.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SplitSummary {
    pub split: String,
    pub input_path: String,
    pub records_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids_path: Option<String>,
    pub input_lines: usize,
    pub records_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_pairs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_labels: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padded_documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_queries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_timings: Option<EvalStageTimings>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct EvalStageTimings {
    pub load_relevance_ms: u128,
    pub index_rows_ms: u128,
    pub pad_ms: u128,
    pub encode_ms: u128,
    pub close_ms: u128,
}

impl SplitSummary {
    pub fn new(split: Split, input_path: &Path, records_path: &Path) -> Self {
        Self {
            split: split.label().to_string(),
            input_path: input_path.display().to_string(),
            records_path: records_path.display().to_string(),
            ids_path: None,
            input_lines: 0,
            records_written: 0,
            queries: None,
            relevant_pairs: None,
            positive_labels: None,
            padded_documents: None,
            truncated_queries: None,
            stage_timings: None,
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversionReport<'a> {
    pub generated_at: String,
    pub settings: &'a ConversionSettings,
    pub splits: &'a [SplitSummary],
}

pub fn write_report(
    settings: &ConversionSettings,
    splits: &[SplitSummary],
    output_folder: &Path,
) -> Result<PathBuf> {
    let report = ConversionReport {
        generated_at: Utc::now().to_rfc3339(),
        settings,
        splits,
    };
    let path = output_folder.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(&report).context("serialising conversion report")?;
    fs::write(&path, json).with_context(|| format!("writing report to {}", path.display()))?;
    Ok(path)
}
