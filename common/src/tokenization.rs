//! Text to bounded BERT input ids.
//!
//! The subword tokenizer itself is a black box behind [`SubwordTokenizer`];
//! [`TextTokenizer`] owns the marker and truncation policy on top of it.

use std::{path::Path, str::Utf8Error};

use tokenizers::{
    decoders::wordpiece::WordPiece as WordPieceDecoder, models::wordpiece::WordPiece,
    normalizers::bert::BertNormalizer, pre_tokenizers::bert::BertPreTokenizer,
    processors::bert::BertProcessing, TokenizerBuilder, TokenizerImpl,
};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::ConversionError;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const UNK_TOKEN: &str = "[UNK]";

/// Number of ids reserved for `[CLS]` and `[SEP]` when markers are enabled.
pub const MARKER_COUNT: usize = 2;

pub trait SubwordTokenizer {
    /// Raw subword ids for `text`, without any markers or truncation.
    fn tokenize_ids(&self, text: &str) -> Result<Vec<i64>, ConversionError>;
    fn cls_id(&self) -> i64;
    fn sep_id(&self) -> i64;
}

type BertTokenizer =
    TokenizerImpl<WordPiece, BertNormalizer, BertPreTokenizer, BertProcessing, WordPieceDecoder>;

/// Uncased BERT WordPiece tokenizer loaded from a `vocab.txt`.
pub struct WordPieceTokenizer {
    inner: BertTokenizer,
    cls_id: i64,
    sep_id: i64,
}

impl WordPieceTokenizer {
    pub fn from_vocab_file(path: &Path) -> Result<Self, ConversionError> {
        if !path.is_file() {
            return Err(ConversionError::resource(path, "vocabulary file not found"));
        }

        let model = WordPiece::from_file(&path.to_string_lossy())
            .unk_token(UNK_TOKEN.to_string())
            .build()
            .map_err(|err| ConversionError::resource(path, err))?;

        // clean_text, handle_chinese_chars, strip_accents follows lowercase, lowercase
        let inner: BertTokenizer = TokenizerBuilder::new()
            .with_model(model)
            .with_normalizer(Some(BertNormalizer::new(true, true, None, true)))
            .with_pre_tokenizer(Some(BertPreTokenizer))
            .with_post_processor(None)
            .with_decoder(None)
            .build()
            .map_err(|err| ConversionError::resource(path, err))?;

        let cls_id = marker_id(&inner, CLS_TOKEN, path)?;
        let sep_id = marker_id(&inner, SEP_TOKEN, path)?;
        marker_id(&inner, UNK_TOKEN, path)?;

        debug!(
            vocab_size = inner.get_vocab_size(false),
            cls_id, sep_id, "Loaded WordPiece vocabulary"
        );

        Ok(Self {
            inner,
            cls_id,
            sep_id,
        })
    }
}

fn marker_id(tokenizer: &BertTokenizer, token: &str, path: &Path) -> Result<i64, ConversionError> {
    tokenizer
        .token_to_id(token)
        .map(i64::from)
        .ok_or_else(|| ConversionError::resource(path, format!("vocabulary is missing {token}")))
}

impl SubwordTokenizer for WordPieceTokenizer {
    fn tokenize_ids(&self, text: &str) -> Result<Vec<i64>, ConversionError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|err| ConversionError::EncodingPrecondition(err.to_string()))?;
        Ok(encoding.get_ids().iter().copied().map(i64::from).collect())
    }

    fn cls_id(&self) -> i64 {
        self.cls_id
    }

    fn sep_id(&self) -> i64 {
        self.sep_id
    }
}

/// Decodes raw bytes as strict UTF-8. The text is kept byte-for-byte so rows
/// can be compared exactly; NFC is applied later, in [`TextTokenizer::encode`].
pub fn convert_to_unicode(bytes: &[u8]) -> Result<String, Utf8Error> {
    std::str::from_utf8(bytes).map(str::to_string)
}

pub struct TextTokenizer {
    inner: Box<dyn SubwordTokenizer>,
}

impl TextTokenizer {
    pub fn new(inner: impl SubwordTokenizer + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Tokenizes `text` into at most `max_length` ids.
    ///
    /// With `add_markers`, the result is `[CLS] ids.. [SEP]` and the markers
    /// count toward `max_length`. Over-long inputs keep their leading ids.
    pub fn encode(
        &self,
        text: &str,
        max_length: usize,
        add_markers: bool,
    ) -> Result<Vec<i64>, ConversionError> {
        let reserved = if add_markers { MARKER_COUNT } else { 0 };
        let budget = max_length.checked_sub(reserved).ok_or_else(|| {
            ConversionError::EncodingPrecondition(format!(
                "token budget {max_length} cannot hold {reserved} marker ids"
            ))
        })?;

        let normalized: String = text.nfc().collect();
        let mut ids = self.inner.tokenize_ids(&normalized)?;
        ids.truncate(budget);

        if add_markers {
            ids.insert(0, self.inner.cls_id());
            ids.push(self.inner.sep_id());
        }

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HashingTokenizer, TEST_CLS_ID, TEST_SEP_ID};
    use std::fs;
    use tempfile::tempdir;

    fn write_vocab(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("vocab.txt");
        let vocab = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "what", "is", "ai", "dog", "##s", "?"];
        fs::write(&path, vocab.join("\n")).unwrap();
        path
    }

    #[test]
    fn wordpiece_tokenizer_lowercases_and_splits_subwords() {
        let dir = tempdir().unwrap();
        let tokenizer = WordPieceTokenizer::from_vocab_file(&write_vocab(dir.path())).unwrap();

        assert_eq!(tokenizer.cls_id(), 2);
        assert_eq!(tokenizer.sep_id(), 3);
        assert_eq!(tokenizer.tokenize_ids("What is AI?").unwrap(), vec![4, 5, 6, 9]);
        assert_eq!(tokenizer.tokenize_ids("dogs").unwrap(), vec![7, 8]);
        assert_eq!(tokenizer.tokenize_ids("zebra").unwrap(), vec![1]);
    }

    #[test]
    fn missing_vocabulary_is_a_resource_error() {
        let dir = tempdir().unwrap();
        let result = WordPieceTokenizer::from_vocab_file(&dir.path().join("absent.txt"));

        assert!(matches!(result, Err(ConversionError::Resource { .. })));
    }

    #[test]
    fn vocabulary_without_markers_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        fs::write(&path, "[UNK]\nhello\n").unwrap();

        let result = WordPieceTokenizer::from_vocab_file(&path);

        assert!(matches!(result, Err(ConversionError::Resource { .. })));
    }

    #[test]
    fn markers_wrap_the_sequence_and_count_toward_budget() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let ids = tokenizer.encode("what is ai", 64, true).unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(ids.first(), Some(&TEST_CLS_ID));
        assert_eq!(ids.last(), Some(&TEST_SEP_ID));
    }

    #[test]
    fn truncation_keeps_the_leading_ids() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let text = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let full = HashingTokenizer.tokenize_ids(&text).unwrap();

        let with_markers = tokenizer.encode(&text, 10, true).unwrap();
        assert_eq!(with_markers.len(), 10);
        assert_eq!(&with_markers[1..9], &full[..8]);

        let without_markers = tokenizer.encode(&text, 10, false).unwrap();
        assert_eq!(without_markers, full[..10].to_vec());
    }

    #[test]
    fn short_input_is_not_padded() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);

        assert_eq!(tokenizer.encode("ai", 512, false).unwrap().len(), 1);
        assert!(tokenizer.encode("", 8, false).unwrap().is_empty());
    }

    #[test]
    fn budget_smaller_than_markers_is_rejected() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);
        let result = tokenizer.encode("ai", 1, true);

        assert!(matches!(result, Err(ConversionError::EncodingPrecondition(_))));
    }

    #[test]
    fn convert_to_unicode_keeps_bytes_and_rejects_malformed_input() {
        let decomposed = "cafe\u{301}";
        assert_eq!(convert_to_unicode(decomposed.as_bytes()).unwrap(), decomposed);
        assert!(convert_to_unicode(&[0x66, 0xff, 0x6f]).is_err());
    }

    #[test]
    fn composed_and_decomposed_text_encode_identically() {
        let tokenizer = TextTokenizer::new(HashingTokenizer);

        let composed = tokenizer.encode("caf\u{e9} au lait", 16, true).unwrap();
        let decomposed = tokenizer.encode("cafe\u{301} au lait", 16, true).unwrap();

        assert_eq!(composed, decomposed);
    }
}
