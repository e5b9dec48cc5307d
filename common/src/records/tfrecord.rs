//! TFRecord framing.
//!
//! Each record is laid out as
//! `u64 length | u32 masked_crc32c(length) | payload | u32 masked_crc32c(payload)`,
//! all integers little endian.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::ConversionError;

const MASK_DELTA: u32 = 0xa282_ead8;
const HEADER_LEN: usize = 12;
const FOOTER_LEN: usize = 4;

pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Append-only destination for serialized records. Write order is preserved.
pub trait RecordSink {
    fn write_record(&mut self, record: &[u8]) -> Result<(), ConversionError>;
    fn records_written(&self) -> u64;
}

pub struct TfRecordWriter<W: Write> {
    inner: W,
    written: u64,
}

impl TfRecordWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, ConversionError> {
        let file = File::create(path).map_err(|err| ConversionError::resource(path, err))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TfRecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Flushes buffered frames and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, ConversionError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> RecordSink for TfRecordWriter<W> {
    fn write_record(&mut self, record: &[u8]) -> Result<(), ConversionError> {
        let mut frame = BytesMut::with_capacity(HEADER_LEN + record.len() + FOOTER_LEN);
        frame.put_u64_le(record.len() as u64);
        let length_crc = masked_crc32c(&frame);
        frame.put_u32_le(length_crc);
        frame.put_slice(record);
        frame.put_u32_le(masked_crc32c(record));

        self.inner.write_all(&frame)?;
        self.written += 1;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}

/// Iterates the payloads of a TFRecord stream, verifying both checksums.
pub struct TfRecordReader<R: Read> {
    inner: R,
    index: u64,
    failed: bool,
}

impl TfRecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ConversionError> {
        let file = File::open(path).map_err(|err| ConversionError::resource(path, err))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> TfRecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            index: 0,
            failed: false,
        }
    }

    fn read_header(&mut self) -> Result<Option<[u8; HEADER_LEN]>, ConversionError> {
        let mut header = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            let Some(slot) = header.get_mut(filled..) else {
                break;
            };
            match self.inner.read(slot) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(ConversionError::Record(format!(
                        "record {} has a truncated header",
                        self.index
                    )))
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Some(header))
    }

    fn read_record(&mut self) -> Result<Option<Vec<u8>>, ConversionError> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };

        let (length_bytes, mut crc_bytes) = header.split_at(8);
        let mut length_buf = length_bytes;
        let length = length_buf.get_u64_le();
        if crc_bytes.get_u32_le() != masked_crc32c(length_bytes) {
            return Err(ConversionError::Record(format!(
                "record {} length checksum mismatch",
                self.index
            )));
        }

        let length = usize::try_from(length).map_err(|_| {
            ConversionError::Record(format!("record {} length {length} overflows", self.index))
        })?;
        let mut payload = vec![0u8; length];
        let mut footer = [0u8; FOOTER_LEN];
        self.inner
            .read_exact(&mut payload)
            .and_then(|()| self.inner.read_exact(&mut footer))
            .map_err(|err| match err.kind() {
                ErrorKind::UnexpectedEof => {
                    ConversionError::Record(format!("record {} is truncated", self.index))
                }
                _ => err.into(),
            })?;

        if footer.as_slice().get_u32_le() != masked_crc32c(&payload) {
            return Err(ConversionError::Record(format!(
                "record {} payload checksum mismatch",
                self.index
            )));
        }

        self.index += 1;
        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for TfRecordReader<R> {
    type Item = Result<Vec<u8>, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read_record();
        if result.is_err() {
            self.failed = true;
        }
        result.transpose()
    }
}
