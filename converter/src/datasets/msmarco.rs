//! Row layouts of the MS MARCO passage-ranking TSV files.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use common::error::ConversionError;
use tracing::info;

use super::{split_fields, TsvLine, TsvLines};

/// `query \t positive_passage \t negative_passage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingTriple {
    pub query: String,
    pub positive: String,
    pub negative: String,
}

impl TrainingTriple {
    pub fn parse(line: &TsvLine, path: &Path) -> Result<Self, ConversionError> {
        let [query, positive, negative] =
            split_fields::<3>(line.text.trim_end(), path, line.number)?;
        Ok(Self {
            query: query.to_string(),
            positive: positive.to_string(),
            negative: negative.to_string(),
        })
    }
}

/// `query_id \t doc_id \t query \t passage` from a top-1000 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub query_id: String,
    pub doc_id: String,
    pub query: String,
    pub doc: String,
}

impl CandidateRow {
    pub fn parse(line: &TsvLine, path: &Path) -> Result<Self, ConversionError> {
        let [query_id, doc_id, query, doc] =
            split_fields::<4>(line.text.trim(), path, line.number)?;
        Ok(Self {
            query_id: query_id.to_string(),
            doc_id: doc_id.to_string(),
            query: query.to_string(),
            doc: doc.to_string(),
        })
    }
}

/// Relevant `(query_id, doc_id)` pairs from a qrels file.
#[derive(Debug, Clone, Default)]
pub struct RelevanceSet {
    pairs: HashMap<String, HashSet<String>>,
    len: usize,
}

impl RelevanceSet {
    /// Reads `query_id \t _ \t doc_id \t _` lines.
    pub fn load(path: &Path) -> Result<Self, ConversionError> {
        let mut set = Self::default();
        for line in TsvLines::open(path)? {
            let line = line?;
            let [query_id, _, doc_id, _] = split_fields::<4>(line.text.trim(), path, line.number)?;
            set.insert(query_id, doc_id);
        }
        info!(
            path = %path.display(),
            pairs = set.len,
            queries = set.pairs.len(),
            "Loaded relevance judgments"
        );
        Ok(set)
    }

    pub fn insert(&mut self, query_id: &str, doc_id: &str) {
        if self
            .pairs
            .entry(query_id.to_string())
            .or_default()
            .insert(doc_id.to_string())
        {
            self.len += 1;
        }
    }

    pub fn contains(&self, query_id: &str, doc_id: &str) -> bool {
        self.pairs
            .get(query_id)
            .is_some_and(|docs| docs.contains(doc_id))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
