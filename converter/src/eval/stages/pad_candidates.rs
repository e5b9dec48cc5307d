use std::time::Instant;

use tracing::{info, warn};

use super::super::{
    context::{ConversionContext, ConversionStage},
    state::{EvalConversionMachine, Indexed, Padded},
};
use super::{map_guard_error, StageResult};

pub(crate) fn pad_candidates(
    machine: EvalConversionMachine<(), Indexed>,
    ctx: &mut ConversionContext<'_>,
) -> StageResult<Padded> {
    let stage = ConversionStage::Pad;
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        "starting conversion stage"
    );
    let started = Instant::now();

    let target = ctx.settings().num_eval_docs;
    let policy = ctx.settings().overflow_policy;
    let outcome = ctx.candidates.pad_to(target, policy);
    if outcome.truncated_queries > 0 {
        warn!(
            split = ctx.split().label(),
            truncated_queries = outcome.truncated_queries,
            num_eval_docs = target,
            "Dropped candidates beyond num_eval_docs"
        );
    }
    ctx.candidates.verify_uniform(target)?;
    ctx.pad_outcome = outcome;
    ctx.positive_labels = ctx.candidates.positive_labels();

    info!(
        split = ctx.split().label(),
        queries = ctx.candidates.len(),
        padded_documents = outcome.padded_documents,
        positives = ctx.positive_labels,
        num_eval_docs = target,
        "Padded candidate lists"
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
        .pad()
        .map_err(|(_, guard)| map_guard_error("pad", guard))
}
