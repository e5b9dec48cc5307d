mod state;

use std::{path::Path, time::Instant};

use anyhow::{anyhow, Context, Result};
use common::{
    error::ConversionError,
    records::{RecordSink, TfRecordWriter},
    tokenization::TextTokenizer,
    utils::config::ConversionSettings,
};
use state_machines::core::GuardError;
use tracing::info;

use crate::{
    datasets::{count_lines, Split, TrainingTriple, TsvLine, TsvLines},
    encoder::ExampleEncoder,
    progress::ProgressEstimator,
    report::SplitSummary,
};

const PROGRESS_EVERY_LINES: usize = 1000;
/// Positive passage first, then the negative one.
const TRIPLE_LABELS: [i64; 2] = [1, 0];

fn map_guard_error(event: &str, guard: GuardError) -> anyhow::Error {
    anyhow!("invalid training conversion transition during {event}: {guard:?}")
}

/// Streams `query \t positive \t negative` triples into `dataset_train.tf`.
pub fn convert_train_dataset(
    settings: &ConversionSettings,
    tokenizer: &TextTokenizer,
    output_folder: &Path,
) -> Result<SplitSummary> {
    let machine = state::init();
    let started = Instant::now();
    let input_path = settings.train_dataset_path.as_path();
    info!(
        split = Split::Train.label(),
        path = %input_path.display(),
        "Converting training set to tfrecord"
    );

    info!("Counting number of examples");
    let total = count_lines(input_path)?;
    info!(examples = total, "Training examples found");

    let records_path = output_folder.join(Split::Train.records_file_name());
    let mut writer = TfRecordWriter::create(&records_path)?;
    let lines = TsvLines::open(input_path)?;
    let machine = machine
        .open()
        .map_err(|(_, guard)| map_guard_error("open", guard))?;

    let encoder = ExampleEncoder::new(tokenizer, settings);
    let progress =
        ProgressEstimator::start(Split::Train.label(), "line", total, PROGRESS_EVERY_LINES);
    let input_lines = stream_triples(lines, input_path, &encoder, &mut writer, &progress)?;

    let records_written = writer.records_written();
    writer
        .finish()
        .with_context(|| format!("flushing {}", records_path.display()))?;
    let machine = machine
        .close()
        .map_err(|(_, guard)| map_guard_error("close", guard))?;
    drop(machine);

    let mut summary = SplitSummary::new(Split::Train, input_path, &records_path);
    summary.input_lines = input_lines;
    summary.records_written = records_written;
    summary.positive_labels = Some(input_lines);
    summary.duration_ms = started.elapsed().as_millis();

    info!(
        split = Split::Train.label(),
        lines = input_lines,
        records = records_written,
        duration_ms = summary.duration_ms,
        "Training set converted"
    );

    Ok(summary)
}

/// Writes two records per line and stops at the first bad line.
fn stream_triples(
    lines: impl IntoIterator<Item = Result<TsvLine, ConversionError>>,
    path: &Path,
    encoder: &ExampleEncoder<'_>,
    sink: &mut dyn RecordSink,
    progress: &ProgressEstimator,
) -> Result<usize, ConversionError> {
    let mut processed = 0usize;
    for (index, line) in lines.into_iter().enumerate() {
        progress.observe(index);
        let line = line?;
        let triple = TrainingTriple::parse(&line, path)?;
        encoder.write::<_, &str>(
            sink,
            &triple.query,
            &[triple.positive.as_str(), triple.negative.as_str()],
            &TRIPLE_LABELS,
            None,
        )?;
        processed += 1;
    }
    Ok(processed)
}
