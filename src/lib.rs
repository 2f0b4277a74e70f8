//! bamcodec: record-level codec for the BAM alignment format
//!
//! # Overview
//!
//! bamcodec decodes, represents, mutates and re-encodes the alignment
//! records of BAM (the binary counterpart of SAM), together with their
//! building blocks: CIGAR data, packed 4-bit IUPAC sequences, auxiliary
//! tags and BGZF virtual file offsets.
//!
//! The crate works on raw byte buffers: BGZF framing, file I/O, headers
//! and indexing belong to outer layers. What it guarantees is exactness
//! at the record level, with serialization reproducing parsed input byte
//! for byte, and strict invariant maintenance, with the record's block
//! size always agreeing with its field lengths.
//!
//! ## Quick Start
//!
//! ```
//! use bamcodec::{Record, Records};
//!
//! # fn main() -> bamcodec::Result<()> {
//! // Build a record and serialize it.
//! let mut record = Record::new();
//! record.set_read_name(b"read1")?;
//! record.set_sequence(b"GATTACA", None)?;
//! record.set_tag(*b"NM", 2, None)?;
//! let bytes = record.to_bytes();
//!
//! // Walk a buffer of concatenated records.
//! for result in Records::new(&bytes) {
//!     let record = result?;
//!     assert_eq!(record.read_name(), b"read1");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`record`]: the alignment record, its builder and wire codec
//! - [`reader`]: iteration over buffers of concatenated records
//! - [`cigar`]: CIGAR storage and text/pair/byte conversions
//! - [`sequence`]: packed 4-bit IUPAC sequence codec
//! - [`tags`]: auxiliary tag scan, decode and typed mutation
//! - [`block`]: BGZF-sized record batching
//! - [`virtual_offset`]: 48/16-bit BGZF virtual file offsets
//! - [`ascii`]: word-at-a-time ASCII validation

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ascii;
pub mod block;
pub mod cigar;
pub mod error;
pub mod reader;
pub mod record;
pub mod sequence;
pub mod tags;
pub mod virtual_offset;

// Re-export the main types and the named wire constants.
pub use block::{BlockBuffer, BGZF_BLOCK_SIZE};
pub use cigar::{
    Cigar, BAM_CBACK, BAM_CDEL, BAM_CDIFF, BAM_CEQUAL, BAM_CHARD_CLIP, BAM_CIGAR_MAX_LEN,
    BAM_CIGAR_SHIFT, BAM_CINS, BAM_CMATCH, BAM_CPAD, BAM_CREF_SKIP, BAM_CSOFT_CLIP,
};
pub use error::{BamError, Result};
pub use reader::Records;
pub use record::{
    Record, RecordBuilder, BAM_FDUP, BAM_FMREVERSE, BAM_FMUNMAP, BAM_FPAIRED,
    BAM_FPROPER_PAIR, BAM_FQCFAIL, BAM_FREAD1, BAM_FREAD2, BAM_FREVERSE, BAM_FSECONDARY,
    BAM_FSUPPLEMENTARY, BAM_FUNMAP,
};
pub use tags::{
    default_tag_type, ArrayData, ArraySubtype, TagArray, TagData, TagType, TagValue, Tags,
};
pub use virtual_offset::{Chunk, VirtualFileOffset};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
