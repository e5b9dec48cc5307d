use std::time::Instant;

use common::error::ConversionError;
use tracing::info;

use crate::datasets::{CandidateRow, TsvLines};

use super::super::{
    candidates::Candidate,
    context::{ConversionContext, ConversionStage},
    state::{EvalConversionMachine, Indexed, RelevanceLoaded},
};
use super::{map_guard_error, StageResult};

pub(crate) fn index_rows(
    machine: EvalConversionMachine<(), RelevanceLoaded>,
    ctx: &mut ConversionContext<'_>,
) -> StageResult<Indexed> {
    let stage = ConversionStage::IndexRows;
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        "starting conversion stage"
    );
    let started = Instant::now();

    let path = ctx.dataset_path();
    let mut relevant_rows = 0usize;
    for line in TsvLines::open(path)? {
        let line = line?;
        let row = CandidateRow::parse(&line, path)?;
        let relevant = ctx
            .relevance
            .as_ref()
            .is_some_and(|relevance| relevance.contains(&row.query_id, &row.doc_id));
        if relevant {
            relevant_rows += 1;
        }

        ctx.candidates.push(
            &row.query_id,
            &row.query,
            Candidate {
                doc_id: row.doc_id,
                doc_text: row.doc,
                label: i64::from(relevant),
            },
        );
        ctx.input_lines += 1;
    }

    if ctx.candidates.is_empty() {
        return Err(ConversionError::InvariantViolation(format!(
            "{} has no candidate rows",
            path.display()
        ))
        .into());
    }
    info!(
        split = ctx.split().label(),
        rows = ctx.input_lines,
        queries = ctx.candidates.len(),
        relevant_rows,
        "Indexed candidate rows"
    );

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed conversion stage"
    );

    machine
        .index_rows()
        .map_err(|(_, guard)| map_guard_error("index_rows", guard))
}
