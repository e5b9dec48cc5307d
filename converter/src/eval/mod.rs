mod candidates;
mod context;
mod stages;
mod state;

use std::path::Path;

use anyhow::{bail, Result};
use common::{tokenization::TextTokenizer, utils::config::ConversionSettings};

use crate::{datasets::Split, report::SplitSummary};

use context::ConversionContext;

/// Converts a top-1000 candidate file into `dataset_{split}.tf` and
/// `query_doc_ids_{split}.txt`, with every query padded to `num_eval_docs`.
pub fn convert_eval_dataset(
    split: Split,
    settings: &ConversionSettings,
    tokenizer: &TextTokenizer,
    output_folder: &Path,
) -> Result<SplitSummary> {
    if split == Split::Train {
        bail!("the training split is not a candidate list");
    }

    let mut ctx = ConversionContext::new(split, settings, tokenizer, output_folder);
    let machine = state::init();

    let machine = stages::load_relevance(machine, &mut ctx)?;
    let machine = stages::index_rows(machine, &mut ctx)?;
    let machine = stages::pad_candidates(machine, &mut ctx)?;
    let machine = stages::encode_candidates(machine, &mut ctx)?;
    let machine = stages::close(machine, &mut ctx)?;

    drop(machine);

    ctx.into_summary()
}
