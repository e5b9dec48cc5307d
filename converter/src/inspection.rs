use std::path::Path;

use anyhow::{Context, Result};
use common::records::{EncodedExample, TfRecordReader};
use tracing::info;

/// Logs the first `limit` records of a tfrecord file and returns how many were shown.
pub fn inspect_records(path: &Path, limit: usize) -> Result<usize> {
    let reader = TfRecordReader::open(path)
        .with_context(|| format!("opening {} for inspection", path.display()))?;

    let mut shown = 0usize;
    for (index, record) in reader.take(limit).enumerate() {
        let bytes = record.with_context(|| format!("reading record {index}"))?;
        let example = EncodedExample::from_bytes(&bytes)
            .with_context(|| format!("decoding record {index}"))?;
        info!(
            record = index,
            label = example.label,
            query_len = example.query_token_ids.len(),
            doc_len = example.doc_token_ids.len(),
            query_ids = ?example.query_token_ids,
            doc_ids = ?example.doc_token_ids,
            "Inspected record"
        );
        shown += 1;
    }

    info!(path = %path.display(), shown, "Inspection finished");
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::records::{RecordSink, TfRecordWriter};
    use std::fs;
    use tempfile::tempdir;

    fn write_examples(path: &Path, count: i64) {
        let mut writer = TfRecordWriter::create(path).unwrap();
        for label in 0..count {
            let example = EncodedExample {
                query_token_ids: vec![101, 2054, 102],
                doc_token_ids: vec![2003, label],
                label: label % 2,
            };
            writer.write_record(&example.to_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn shows_at_most_the_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset_dev.tf");
        write_examples(&path, 4);

        assert_eq!(inspect_records(&path, 2).unwrap(), 2);
        assert_eq!(inspect_records(&path, 10).unwrap(), 4);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset_dev.tf");
        write_examples(&path, 1);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        assert!(inspect_records(&path, 5).is_err());
    }
}
