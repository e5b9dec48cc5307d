use std::io::Write;

use common::{
    error::ConversionError,
    records::{EncodedExample, RecordSink},
    tokenization::TextTokenizer,
    utils::config::ConversionSettings,
};

/// Where the `query_id \t doc_id` line for each written record goes.
pub struct IdMapping<'a, D: AsRef<str>> {
    pub writer: &'a mut dyn Write,
    pub query_id: &'a str,
    pub doc_ids: &'a [D],
}

/// Turns one query and its candidate documents into ranking records.
///
/// The query and each document share a window of `max_seq_length` ids: the
/// query gets `[CLS] .. [SEP]` within `max_query_length`, each document gets
/// whatever is left, without markers of its own.
pub struct ExampleEncoder<'a> {
    tokenizer: &'a TextTokenizer,
    max_seq_length: usize,
    max_query_length: usize,
}

impl<'a> ExampleEncoder<'a> {
    pub fn new(tokenizer: &'a TextTokenizer, settings: &ConversionSettings) -> Self {
        Self {
            tokenizer,
            max_seq_length: settings.max_seq_length,
            max_query_length: settings.max_query_length,
        }
    }

    pub fn encode<D: AsRef<str>>(
        &self,
        query: &str,
        documents: &[D],
        labels: &[i64],
    ) -> Result<Vec<EncodedExample>, ConversionError> {
        if documents.len() != labels.len() {
            return Err(ConversionError::EncodingPrecondition(format!(
                "{} documents but {} labels",
                documents.len(),
                labels.len()
            )));
        }

        let query_token_ids = self.tokenizer.encode(query, self.max_query_length, true)?;
        let doc_budget = self
            .max_seq_length
            .checked_sub(query_token_ids.len())
            .ok_or_else(|| {
                ConversionError::EncodingPrecondition(format!(
                    "query uses {} ids, more than max_seq_length {}",
                    query_token_ids.len(),
                    self.max_seq_length
                ))
            })?;

        documents
            .iter()
            .zip(labels)
            .map(|(document, &label)| {
                let doc_token_ids = self.tokenizer.encode(document.as_ref(), doc_budget, false)?;
                Ok(EncodedExample {
                    query_token_ids: query_token_ids.clone(),
                    doc_token_ids,
                    label,
                })
            })
            .collect()
    }

    /// Encodes and appends one record per document to `sink`, in input order.
    /// Returns the number of records written.
    pub fn write<D: AsRef<str>, I: AsRef<str>>(
        &self,
        sink: &mut dyn RecordSink,
        query: &str,
        documents: &[D],
        labels: &[i64],
        mut ids: Option<IdMapping<'_, I>>,
    ) -> Result<usize, ConversionError> {
        if let Some(mapping) = ids.as_ref() {
            if mapping.doc_ids.len() != documents.len() {
                return Err(ConversionError::EncodingPrecondition(format!(
                    "{} documents but {} document ids",
                    documents.len(),
                    mapping.doc_ids.len()
                )));
            }
        }

        let examples = self.encode(query, documents, labels)?;
        for (index, example) in examples.iter().enumerate() {
            sink.write_record(&example.to_bytes())?;
            if let Some(mapping) = ids.as_mut() {
                if let Some(doc_id) = mapping.doc_ids.get(index) {
                    writeln!(mapping.writer, "{}\t{}", mapping.query_id, doc_id.as_ref())?;
                }
            }
        }

        Ok(examples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        records::{TfRecordReader, TfRecordWriter},
        testing::{HashingTokenizer, TEST_CLS_ID, TEST_SEP_ID},
        tokenization::SubwordTokenizer,
    };
    use std::io::Cursor;

    fn settings(max_seq_length: usize, max_query_length: usize) -> ConversionSettings {
        ConversionSettings {
            max_seq_length,
            max_query_length,
            ..ConversionSettings::default()
        }
    }

    fn words(count: usize) -> String {
        (0..count).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn positive_and_negative_share_the_query_tokens() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(512, 64));

        let examples = encoder
            .encode(
                "what is ai",
                &["ai is artificial intelligence", "dogs are pets"],
                &[1, 0],
            )
            .unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].label, 1);
        assert_eq!(examples[1].label, 0);
        assert_eq!(examples[0].query_token_ids, examples[1].query_token_ids);
        assert_ne!(examples[0].doc_token_ids, examples[1].doc_token_ids);
        assert_eq!(examples[0].query_token_ids.first(), Some(&TEST_CLS_ID));
        assert_eq!(examples[0].query_token_ids.last(), Some(&TEST_SEP_ID));
        assert_ne!(examples[0].doc_token_ids.first(), Some(&TEST_CLS_ID));
        assert_ne!(examples[0].doc_token_ids.last(), Some(&TEST_SEP_ID));
    }

    #[test]
    fn document_budget_is_what_the_query_leaves() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(16, 8));

        let short_query = encoder.encode("ai", &[words(40)], &[0]).unwrap();
        assert_eq!(short_query[0].query_token_ids.len(), 3);
        assert_eq!(short_query[0].doc_token_ids.len(), 13);

        let long_query = encoder.encode(&words(20), &[words(40)], &[0]).unwrap();
        assert_eq!(long_query[0].query_token_ids.len(), 8);
        assert_eq!(long_query[0].doc_token_ids.len(), 8);
        assert_eq!(
            long_query[0].doc_token_ids,
            HashingTokenizer.tokenize_ids(&words(40)).unwrap()[..8].to_vec()
        );
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(512, 64));

        let result = encoder.encode("q", &["a", "b"], &[1]);

        assert!(matches!(
            result,
            Err(ConversionError::EncodingPrecondition(_))
        ));
    }

    #[test]
    fn write_emits_one_id_line_per_record() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(512, 64));
        let mut sink = TfRecordWriter::new(Vec::new());
        let mut ids = Vec::new();

        let written = encoder
            .write(
                &mut sink,
                "what is ai",
                &["doc one", "doc two", "FAKE DOCUMENT"],
                &[1, 0, 0],
                Some(IdMapping {
                    writer: &mut ids,
                    query_id: "q1",
                    doc_ids: &["d1", "d2", "00000000"],
                }),
            )
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(sink.records_written(), 3);
        assert_eq!(
            String::from_utf8(ids).unwrap(),
            "q1\td1\nq1\td2\nq1\t00000000\n"
        );

        let records: Vec<EncodedExample> = TfRecordReader::new(Cursor::new(sink.finish().unwrap()))
            .map(|bytes| EncodedExample::from_bytes(&bytes.unwrap()).unwrap())
            .collect();
        assert_eq!(
            records.iter().map(|r| r.label).collect::<Vec<_>>(),
            vec![1, 0, 0]
        );
    }

    #[test]
    fn write_without_mapping_only_touches_the_sink() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(512, 64));
        let mut sink = TfRecordWriter::new(Vec::new());

        let written = encoder
            .write::<_, &str>(&mut sink, "q", &["a", "b"], &[1, 0], None)
            .unwrap();

        assert_eq!(written, 2);
    }

    #[test]
    fn mismatched_doc_ids_write_nothing() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let encoder = ExampleEncoder::new(&tokenizer, &settings(512, 64));
        let mut sink = TfRecordWriter::new(Vec::new());
        let mut ids = Vec::new();

        let result = encoder.write(
            &mut sink,
            "q",
            &["a", "b"],
            &[1, 0],
            Some(IdMapping {
                writer: &mut ids,
                query_id: "q1",
                doc_ids: &["d1"],
            }),
        );

        assert!(matches!(
            result,
            Err(ConversionError::EncodingPrecondition(_))
        ));
        assert_eq!(sink.records_written(), 0);
        assert!(ids.is_empty());
    }
}
