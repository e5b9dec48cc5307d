use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use common::{
    records::TfRecordWriter, tokenization::TextTokenizer, utils::config::ConversionSettings,
};

use crate::{
    datasets::{RelevanceSet, Split},
    report::{EvalStageTimings, SplitSummary},
};

use super::candidates::{CandidateTable, PadOutcome};

pub(super) struct ConversionContext<'a> {
    split: Split,
    settings: &'a ConversionSettings,
    tokenizer: &'a TextTokenizer,
    output_folder: &'a Path,
    pub started: Instant,
    pub stage_timings: EvalStageTimings,
    pub relevance: Option<RelevanceSet>,
    pub candidates: CandidateTable,
    pub input_lines: usize,
    pub positive_labels: usize,
    pub pad_outcome: PadOutcome,
    pub records_path: PathBuf,
    pub ids_path: PathBuf,
    pub records: Option<TfRecordWriter<BufWriter<File>>>,
    pub ids: Option<BufWriter<File>>,
    pub summary: Option<SplitSummary>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        split: Split,
        settings: &'a ConversionSettings,
        tokenizer: &'a TextTokenizer,
        output_folder: &'a Path,
    ) -> Self {
        Self {
            split,
            settings,
            tokenizer,
            output_folder,
            started: Instant::now(),
            stage_timings: EvalStageTimings::default(),
            relevance: None,
            candidates: CandidateTable::default(),
            input_lines: 0,
            positive_labels: 0,
            pad_outcome: PadOutcome::default(),
            records_path: PathBuf::new(),
            ids_path: PathBuf::new(),
            records: None,
            ids: None,
            summary: None,
        }
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn settings(&self) -> &'a ConversionSettings {
        self.settings
    }

    pub fn tokenizer(&self) -> &'a TextTokenizer {
        self.tokenizer
    }

    pub fn output_folder(&self) -> &'a Path {
        self.output_folder
    }

    pub fn dataset_path(&self) -> &'a Path {
        match self.split {
            Split::Dev => self.settings.dev_dataset_path.as_path(),
            Split::Eval | Split::Train => self.settings.eval_dataset_path.as_path(),
        }
    }

    pub fn record_stage_duration(&mut self, stage: ConversionStage, duration: Duration) {
        let elapsed = duration.as_millis();
        match stage {
            ConversionStage::LoadRelevance => self.stage_timings.load_relevance_ms += elapsed,
            ConversionStage::IndexRows => self.stage_timings.index_rows_ms += elapsed,
            ConversionStage::Pad => self.stage_timings.pad_ms += elapsed,
            ConversionStage::Encode => self.stage_timings.encode_ms += elapsed,
            ConversionStage::Close => self.stage_timings.close_ms += elapsed,
        }
    }

    pub fn into_summary(self) -> Result<SplitSummary> {
        self.summary
            .ok_or_else(|| anyhow!("{} conversion finished without a summary", self.split))
    }
}

#[derive(Copy, Clone)]
pub(super) enum ConversionStage {
    LoadRelevance,
    IndexRows,
    Pad,
    Encode,
    Close,
}

impl ConversionStage {
    pub fn label(self) -> &'static str {
        match self {
            ConversionStage::LoadRelevance => "load-relevance",
            ConversionStage::IndexRows => "index-rows",
            ConversionStage::Pad => "pad",
            ConversionStage::Encode => "encode",
            ConversionStage::Close => "close",
        }
    }
}
