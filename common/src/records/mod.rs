mod example;
mod tfrecord;

pub use example::{EncodedExample, DOC_IDS_FEATURE, LABEL_FEATURE, QUERY_IDS_FEATURE};
pub use tfrecord::{masked_crc32c, RecordSink, TfRecordReader, TfRecordWriter};
