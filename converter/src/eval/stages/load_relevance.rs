use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use crate::datasets::{RelevanceSet, Split};

use super::super::{
    context::{ConversionContext, ConversionStage},
    state::{EvalConversionMachine, Init, RelevanceLoaded},
};
use super::{map_guard_error, StageResult};

pub(crate) fn load_relevance(
    machine: EvalConversionMachine<(), Init>,
    ctx: &mut ConversionContext<'_>,
) -> StageResult<RelevanceLoaded> {
    let stage = ConversionStage::LoadRelevance;
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        "starting conversion stage"
    );
    let started = Instant::now();

    if ctx.split() == Split::Dev {
        let path = ctx.settings().dev_qrels_path.as_path();
        let relevance = RelevanceSet::load(path)
            .with_context(|| format!("loading relevance judgments from {}", path.display()))?;
        if relevance.is_empty() {
            warn!(path = %path.display(), "Relevance file is empty; every dev label will be 0");
        }
        ctx.relevance = Some(relevance);
    } else {
        info!(
            split = ctx.split().label(),
            "No relevance judgments for this split; every label is 0"
        );
    }

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed conversion stage"
    );

    machine
        .load_relevance()
        .map_err(|(_, guard)| map_guard_error("load_relevance", guard))
}
