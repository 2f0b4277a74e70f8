//! Fixed-capacity buffer for packing records into BGZF-sized blocks.
//!
//! BGZF payloads top out at 0xff00 bytes, so a writer batches serialized
//! records into blocks of at most that size before compressing each one.
//! [`BlockBuffer`] does the batching: records append while they fit, a
//! record that would overflow is refused with a zero byte count, and the
//! written prefix is handed onward as a byte slice.

use crate::record::Record;

/// Number of payload bytes that fit in one BGZF block.
pub const BGZF_BLOCK_SIZE: usize = 0xff00;

/// A bounded buffer that batches serialized records.
///
/// # Example
///
/// ```
/// use bamcodec::block::BlockBuffer;
/// use bamcodec::record::Record;
///
/// let mut buffer = BlockBuffer::new();
/// let record = Record::new();
/// let written = buffer.write(&record);
/// assert_eq!(written, record.serialized_len());
/// assert_eq!(buffer.as_bytes(), record.to_bytes());
/// ```
#[derive(Debug, Clone)]
pub struct BlockBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl BlockBuffer {
    /// Create a buffer with the BGZF payload limit ([`BGZF_BLOCK_SIZE`]).
    pub fn new() -> Self {
        Self::with_capacity(BGZF_BLOCK_SIZE)
    }

    /// Create a buffer with a custom byte limit.
    pub fn with_capacity(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Serialize a record into the buffer.
    ///
    /// Returns the number of bytes written, or 0 when the record would
    /// not fit; the buffer is left unchanged in that case.
    pub fn write(&mut self, record: &Record) -> usize {
        let record_size = record.serialized_len();
        if self.data.len() + record_size > self.limit {
            return 0;
        }
        record.write_into(&mut self.data);
        record_size
    }

    /// Discard all written records and rewind to the start.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// The written prefix of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no records have been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The byte limit this buffer was created with.
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Bytes still available before the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.data.len()
    }
}

impl Default for BlockBuffer {
    fn default() -> Self {
        Self::new()
    }
}
