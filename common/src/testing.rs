//! Deterministic stand-ins for tests that should not depend on a real vocabulary.

use crate::{error::ConversionError, tokenization::SubwordTokenizer};

pub const TEST_CLS_ID: i64 = 101;
pub const TEST_SEP_ID: i64 = 102;

/// Whitespace tokenizer that hashes each lowercased word into a fixed id range.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashingTokenizer;

impl HashingTokenizer {
    pub fn word_id(word: &str) -> i64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.to_lowercase().bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        1000 + i64::try_from(hash % 29_000).unwrap_or_default()
    }
}

impl SubwordTokenizer for HashingTokenizer {
    fn tokenize_ids(&self, text: &str) -> Result<Vec<i64>, ConversionError> {
        Ok(text.split_whitespace().map(Self::word_id).collect())
    }

    fn cls_id(&self) -> i64 {
        TEST_CLS_ID
    }

    fn sep_id(&self) -> i64 {
        TEST_SEP_ID
    }
}
