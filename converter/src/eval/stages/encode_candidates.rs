use std::{fs::File, io::BufWriter, time::Instant};

use anyhow::anyhow;
use common::{error::ConversionError, records::TfRecordWriter};
use tracing::info;

use crate::{
    encoder::{ExampleEncoder, IdMapping},
    progress::ProgressEstimator,
};

use super::super::{
    context::{ConversionContext, ConversionStage},
    state::{EvalConversionMachine, Encoded, Padded},
};
use super::{map_guard_error, StageResult};

const PROGRESS_EVERY_QUERIES: usize = 100;

pub(crate) fn encode_candidates(
    machine: EvalConversionMachine<(), Padded>,
    ctx: &mut ConversionContext<'_>,
) -> StageResult<Encoded> {
    let stage = ConversionStage::Encode;
    let split = ctx.split();
    info!(
        split = split.label(),
        conversion_stage = stage.label(),
        "starting conversion stage"
    );
    let started = Instant::now();

    let records_path = ctx.output_folder().join(split.records_file_name());
    let ids_name = split
        .ids_file_name()
        .ok_or_else(|| anyhow!("{split} split has no query/doc id mapping file"))?;
    let ids_path = ctx.output_folder().join(ids_name);

    let mut writer = TfRecordWriter::create(&records_path)?;
    let ids_file =
        File::create(&ids_path).map_err(|err| ConversionError::resource(&ids_path, err))?;
    let mut ids = BufWriter::new(ids_file);

    let encoder = ExampleEncoder::new(ctx.tokenizer(), ctx.settings());
    let progress = ProgressEstimator::start(
        split.label(),
        "query",
        ctx.candidates.len(),
        PROGRESS_EVERY_QUERIES,
    );

    for (index, (query, list)) in ctx.candidates.iter().enumerate() {
        progress.observe(index);
        let documents: Vec<&str> = list
            .candidates
            .iter()
            .map(|c| c.doc_text.as_str())
            .collect();
        let labels: Vec<i64> = list.candidates.iter().map(|c| c.label).collect();
        let doc_ids: Vec<&str> = list.candidates.iter().map(|c| c.doc_id.as_str()).collect();

        encoder.write(
            &mut writer,
            query,
            &documents,
            &labels,
            Some(IdMapping {
                writer: &mut ids,
                query_id: &list.query_id,
                doc_ids: &doc_ids,
            }),
        )?;
    }

    ctx.records_path = records_path;
    ctx.ids_path = ids_path;
    ctx.records = Some(writer);
    ctx.ids = Some(ids);

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        split = split.label(),
        conversion_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed conversion stage"
    );

    machine
        .encode()
        .map_err(|(_, guard)| map_guard_error("encode", guard))
}
