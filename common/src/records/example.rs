//! `tf.train.Example` messages, restricted to the `Int64List` features the
//! ranking records use.

use std::collections::BTreeMap;

use prost::Message;

use crate::error::ConversionError;

pub const QUERY_IDS_FEATURE: &str = "query_ids";
pub const DOC_IDS_FEATURE: &str = "doc_ids";
pub const LABEL_FEATURE: &str = "label";

#[derive(Clone, PartialEq, Message)]
struct Example {
    #[prost(message, optional, tag = "1")]
    features: Option<Features>,
}

#[derive(Clone, PartialEq, Message)]
struct Features {
    #[prost(btree_map = "string, message", tag = "1")]
    feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, Message)]
struct Feature {
    #[prost(oneof = "feature::Kind", tags = "3")]
    kind: Option<feature::Kind>,
}

mod feature {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub(super) enum Kind {
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

#[derive(Clone, PartialEq, Message)]
struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    value: Vec<i64>,
}

fn int64_feature(value: Vec<i64>) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value })),
    }
}

/// One (query, document) pair ready for the record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedExample {
    pub query_token_ids: Vec<i64>,
    pub doc_token_ids: Vec<i64>,
    pub label: i64,
}

impl EncodedExample {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut feature = BTreeMap::new();
        feature.insert(
            QUERY_IDS_FEATURE.to_string(),
            int64_feature(self.query_token_ids.clone()),
        );
        feature.insert(
            DOC_IDS_FEATURE.to_string(),
            int64_feature(self.doc_token_ids.clone()),
        );
        feature.insert(LABEL_FEATURE.to_string(), int64_feature(vec![self.label]));

        Example {
            features: Some(Features { feature }),
        }
        .encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConversionError> {
        let example = Example::decode(bytes)
            .map_err(|err| ConversionError::Record(format!("decoding tf.train.Example: {err}")))?;
        let mut features = example.features.unwrap_or_default().feature;

        let mut take = |name: &str| -> Result<Vec<i64>, ConversionError> {
            match features.remove(name).and_then(|feature| feature.kind) {
                Some(feature::Kind::Int64List(list)) => Ok(list.value),
                None => Err(ConversionError::Record(format!(
                    "example is missing int64 feature '{name}'"
                ))),
            }
        };

        let query_token_ids = take(QUERY_IDS_FEATURE)?;
        let doc_token_ids = take(DOC_IDS_FEATURE)?;
        let label = match take(LABEL_FEATURE)?.as_slice() {
            [label] => *label,
            other => {
                return Err(ConversionError::Record(format!(
                    "label feature must hold exactly one value, found {}",
                    other.len()
                )))
            }
        };

        Ok(Self {
            query_token_ids,
            doc_token_ids,
            label,
        })
    }
}
