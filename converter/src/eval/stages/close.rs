use std::{io::Write, time::Instant};

use anyhow::{anyhow, Context};
use common::records::RecordSink;
use tracing::info;

use crate::report::SplitSummary;

use super::super::{
    context::{ConversionContext, ConversionStage},
    state::{Closed, EvalConversionMachine, Encoded},
};
use super::{map_guard_error, StageResult};

pub(crate) fn close(
    machine: EvalConversionMachine<(), Encoded>,
    ctx: &mut ConversionContext<'_>,
) -> StageResult<Closed> {
    let stage = ConversionStage::Close;
    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        "starting conversion stage"
    );
    let started = Instant::now();

    let writer = ctx
        .records
        .take()
        .ok_or_else(|| anyhow!("record writer missing at close"))?;
    let records_written = writer.records_written();
    writer
        .finish()
        .with_context(|| format!("flushing {}", ctx.records_path.display()))?;

    let mut ids = ctx
        .ids
        .take()
        .ok_or_else(|| anyhow!("id mapping writer missing at close"))?;
    ids.flush()
        .with_context(|| format!("flushing {}", ctx.ids_path.display()))?;
    drop(ids);

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);

    let mut summary = SplitSummary::new(ctx.split(), ctx.dataset_path(), &ctx.records_path);
    summary.ids_path = Some(ctx.ids_path.display().to_string());
    summary.input_lines = ctx.input_lines;
    summary.records_written = records_written;
    summary.queries = Some(ctx.candidates.len());
    summary.relevant_pairs = ctx.relevance.as_ref().map(|relevance| relevance.len());
    summary.positive_labels = Some(ctx.positive_labels);
    summary.padded_documents = Some(ctx.pad_outcome.padded_documents);
    summary.truncated_queries = Some(ctx.pad_outcome.truncated_queries);
    summary.stage_timings = Some(ctx.stage_timings);
    summary.duration_ms = ctx.started.elapsed().as_millis();

    info!(
        split = ctx.split().label(),
        queries = ctx.candidates.len(),
        records = records_written,
        duration_ms = summary.duration_ms,
        "Evaluation set converted"
    );
    ctx.summary = Some(summary);

    info!(
        split = ctx.split().label(),
        conversion_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed conversion stage"
    );

    machine
        .close()
        .map_err(|(_, guard)| map_guard_error("close", guard))
}
