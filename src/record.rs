//! BAM alignment record: parsing, mutation and serialization.
//!
//! A record represents a single alignment. On the wire it is laid out as
//! (all integers little-endian):
//!
//! ```text
//! block_size   (u32)  record length excluding this field
//! ref_id       (i32)  reference sequence index (-1 = unmapped)
//! pos          (i32)  0-based leftmost position (-1 = unmapped)
//! l_read_name  (u8)   read name length including the trailing NUL
//! mapq         (u8)   mapping quality (255 = unavailable)
//! bin          (u16)  BAI index bin
//! n_cigar_op   (u16)  number of CIGAR operations
//! flag         (u16)  bitwise flags
//! l_seq        (u32)  sequence length in bases
//! next_ref_id  (i32)  reference index of the mate (-1 = unavailable)
//! next_pos     (i32)  position of the mate (-1 = unavailable)
//! tlen         (i32)  template length
//! read_name    (u8 x l_read_name)        NUL-terminated ASCII
//! cigar        (u32 x n_cigar_op)        operation words
//! seq          (u8 x (l_seq+1)/2)        packed 4-bit bases
//! qual         (u8 x l_seq)              Phred scores, 0xFF = missing
//! tags         (remainder)               auxiliary TLV entries
//! ```
//!
//! The in-memory record owns its variable-length fields and keeps
//! `block_size` consistent with them at all times: every mutator funnels
//! through one size helper, and any mutation that would break the
//! invariant fails without touching the record.

use crate::ascii;
use crate::cigar::{Cigar, BAM_CSOFT_CLIP};
use crate::error::{BamError, Result};
use crate::sequence;
use crate::tags::{self, default_tag_type, TagData, TagType, TagValue, Tags};

/// Flag bit: the read is paired in sequencing.
pub const BAM_FPAIRED: u16 = 1;
/// Flag bit: the read is mapped in a proper pair.
pub const BAM_FPROPER_PAIR: u16 = 2;
/// Flag bit: the read itself is unmapped.
pub const BAM_FUNMAP: u16 = 4;
/// Flag bit: the mate is unmapped.
pub const BAM_FMUNMAP: u16 = 8;
/// Flag bit: the read is mapped to the reverse strand.
pub const BAM_FREVERSE: u16 = 16;
/// Flag bit: the mate is mapped to the reverse strand.
pub const BAM_FMREVERSE: u16 = 32;
/// Flag bit: this is read 1 of the pair.
pub const BAM_FREAD1: u16 = 64;
/// Flag bit: this is read 2 of the pair.
pub const BAM_FREAD2: u16 = 128;
/// Flag bit: this is not the primary alignment.
pub const BAM_FSECONDARY: u16 = 256;
/// Flag bit: the read fails quality checks.
pub const BAM_FQCFAIL: u16 = 512;
/// Flag bit: the read is an optical or PCR duplicate.
pub const BAM_FDUP: u16 = 1024;
/// Flag bit: this is a supplementary alignment.
pub const BAM_FSUPPLEMENTARY: u16 = 2048;

/// Byte count of the fixed header, `block_size` through `tlen`.
const FIXED_SIZE: usize = 36;

/// Byte count of the fixed fields inside `block_size`, `ref_id` through
/// `tlen`.
const FIXED_TAIL: u64 = 32;

/// Longest read name the wire format can carry (`l_read_name` is a `u8`
/// that includes the NUL).
const READ_NAME_MAX: usize = 254;

const LONG_CIGAR_UNSUPPORTED: &str = "support for cigars longer than 65535 operations";

/// One BAM alignment record.
///
/// Construct with [`Record::new`] / [`RecordBuilder`], or parse one from
/// wire bytes with [`Record::parse`] (usually through
/// [`crate::reader::Records`]). Serialization via [`Record::to_bytes`]
/// reproduces parsed input byte for byte as long as the record was not
/// mutated.
///
/// # Example
///
/// ```
/// use bamcodec::record::Record;
///
/// # fn main() -> bamcodec::Result<()> {
/// let mut record = Record::new();
/// record.set_read_name(b"read1")?;
/// record.set_sequence(b"GATTACA", None)?;
/// record.set_tag(*b"NM", 2, None)?;
///
/// let bytes = record.to_bytes();
/// let reparsed = Record::parse(&bytes)?;
/// assert_eq!(reparsed, record);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    block_size: u32,
    ref_id: i32,
    pos: i32,
    mapq: u8,
    bin: u16,
    flag: u16,
    l_seq: u32,
    next_ref_id: i32,
    next_pos: i32,
    tlen: i32,
    read_name: Vec<u8>,
    cigar: Cigar,
    seq: Vec<u8>,
    qual: Vec<u8>,
    tags: Tags,
}

impl Record {
    /// Create an unmapped record with empty variable-length fields.
    ///
    /// Defaults: `ref_id`, `pos`, `next_ref_id` and `next_pos` are -1,
    /// `mapq` is 255 (unknown), `flag` is 0, and `block_size` satisfies
    /// the size identity for the empty fields.
    pub fn new() -> Self {
        Self {
            block_size: (FIXED_TAIL + 1) as u32,
            ref_id: -1,
            pos: -1,
            mapq: 255,
            bin: 0,
            flag: 0,
            l_seq: 0,
            next_ref_id: -1,
            next_pos: -1,
            tlen: 0,
            read_name: Vec::new(),
            cigar: Cigar::new(),
            seq: Vec::new(),
            qual: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Start building a record with non-default fixed fields.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::new()
    }

    /// Compute the block size for the given variable-field lengths.
    ///
    /// This is the single place the size identity lives; every mutator
    /// calls it with its prospective lengths before committing anything.
    fn block_size_for(
        name_len: usize,
        n_cigar_op: usize,
        seq_len: usize,
        qual_len: usize,
        tags_len: usize,
    ) -> Result<u32> {
        let size = FIXED_TAIL
            + name_len as u64
            + 1
            + 4 * n_cigar_op as u64
            + seq_len as u64
            + qual_len as u64
            + tags_len as u64;
        u32::try_from(size).map_err(|_| BamError::BlockSizeOverflow { size })
    }

    /// Length of the record when serialized, `block_size + 4`.
    pub fn serialized_len(&self) -> usize {
        self.block_size as usize + 4
    }

    /// The record length field, excluding the field itself.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Index of the reference sequence, -1 when unmapped.
    pub fn reference_id(&self) -> i32 {
        self.ref_id
    }

    /// 0-based leftmost position of the alignment, -1 when unmapped.
    pub fn position(&self) -> i32 {
        self.pos
    }

    /// Mapping quality, 255 when unavailable.
    pub fn mapping_quality(&self) -> u8 {
        self.mapq
    }

    /// BAI index bin.
    pub fn bin(&self) -> u16 {
        self.bin
    }

    /// Bitwise flags; see the `BAM_F*` constants.
    pub fn flag(&self) -> u16 {
        self.flag
    }

    /// Number of bases in the sequence (`l_seq`).
    pub fn sequence_length(&self) -> u32 {
        self.l_seq
    }

    /// Reference index of the mate, -1 when unavailable.
    pub fn next_reference_id(&self) -> i32 {
        self.next_ref_id
    }

    /// Position of the mate, -1 when unavailable.
    pub fn next_position(&self) -> i32 {
        self.next_pos
    }

    /// Template length.
    pub fn template_length(&self) -> i32 {
        self.tlen
    }

    /// The read name, without the trailing NUL.
    pub fn read_name(&self) -> &[u8] {
        &self.read_name
    }

    /// Length of the read name on the wire, including the trailing NUL.
    pub fn l_read_name(&self) -> u8 {
        (self.read_name.len() + 1) as u8
    }

    /// The CIGAR.
    ///
    /// # Errors
    ///
    /// When the inline CIGAR is the long-CIGAR placeholder (exactly two
    /// operations, the first a soft clip spanning the whole sequence),
    /// the real CIGAR lives in a `CG` tag; expanding it is
    /// [`BamError::NotImplemented`].
    pub fn cigar(&self) -> Result<&Cigar> {
        if self.cigar.len() == 2 {
            if let Some((op, len)) = self.cigar.iter().next() {
                if op == BAM_CSOFT_CLIP && u64::from(len) == u64::from(self.l_seq) {
                    return Err(BamError::NotImplemented(LONG_CIGAR_UNSUPPORTED));
                }
            }
        }
        Ok(&self.cigar)
    }

    /// The inline CIGAR without the long-CIGAR placeholder check.
    pub fn raw_cigar(&self) -> &Cigar {
        &self.cigar
    }

    /// The packed 4-bit sequence bytes.
    pub fn raw_sequence(&self) -> &[u8] {
        &self.seq
    }

    /// The per-base Phred quality scores (`0xFF`-filled when missing).
    pub fn qualities(&self) -> &[u8] {
        &self.qual
    }

    /// Decode the packed sequence into ASCII bases.
    pub fn sequence(&self) -> Result<Vec<u8>> {
        sequence::decode(&self.seq, self.l_seq as usize)
    }

    /// The auxiliary tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The read is paired in sequencing.
    pub fn is_paired(&self) -> bool {
        self.flag & BAM_FPAIRED != 0
    }

    /// The read is mapped in a proper pair.
    pub fn is_proper_pair(&self) -> bool {
        self.flag & BAM_FPROPER_PAIR != 0
    }

    /// The read itself is unmapped.
    pub fn is_unmapped(&self) -> bool {
        self.flag & BAM_FUNMAP != 0
    }

    /// The mate is unmapped.
    pub fn mate_is_unmapped(&self) -> bool {
        self.flag & BAM_FMUNMAP != 0
    }

    /// The read is mapped to the reverse strand.
    pub fn is_reverse(&self) -> bool {
        self.flag & BAM_FREVERSE != 0
    }

    /// The mate is mapped to the reverse strand.
    pub fn mate_is_reverse(&self) -> bool {
        self.flag & BAM_FMREVERSE != 0
    }

    /// This is read 1.
    pub fn is_read1(&self) -> bool {
        self.flag & BAM_FREAD1 != 0
    }

    /// This is read 2.
    pub fn is_read2(&self) -> bool {
        self.flag & BAM_FREAD2 != 0
    }

    /// This is not the primary alignment.
    pub fn is_secondary(&self) -> bool {
        self.flag & BAM_FSECONDARY != 0
    }

    /// QC failure for this read.
    pub fn is_qcfail(&self) -> bool {
        self.flag & BAM_FQCFAIL != 0
    }

    /// The read is an optical or PCR duplicate.
    pub fn is_duplicate(&self) -> bool {
        self.flag & BAM_FDUP != 0
    }

    /// This is a supplementary alignment.
    pub fn is_supplementary(&self) -> bool {
        self.flag & BAM_FSUPPLEMENTARY != 0
    }

    /// Replace the read name.
    ///
    /// # Errors
    ///
    /// - [`BamError::ReadNameTooLong`] for names over 254 bytes
    /// - [`BamError::NonAscii`] for names with high-bit bytes
    pub fn set_read_name(&mut self, name: &[u8]) -> Result<()> {
        if name.len() > READ_NAME_MAX {
            return Err(BamError::ReadNameTooLong { len: name.len() });
        }
        if !ascii::is_ascii(name) {
            return Err(BamError::NonAscii { field: "read name" });
        }
        self.block_size = Self::block_size_for(
            name.len(),
            self.cigar.len(),
            self.seq.len(),
            self.qual.len(),
            self.tags.len(),
        )?;
        self.read_name = name.to_vec();
        Ok(())
    }

    /// Replace the CIGAR.
    ///
    /// # Errors
    ///
    /// More than 65535 operations cannot be stored inline; the `CG` tag
    /// spill that would be required is [`BamError::NotImplemented`].
    pub fn set_cigar(&mut self, cigar: Cigar) -> Result<()> {
        if cigar.len() > usize::from(u16::MAX) {
            return Err(BamError::NotImplemented(LONG_CIGAR_UNSUPPORTED));
        }
        self.block_size = Self::block_size_for(
            self.read_name.len(),
            cigar.len(),
            self.seq.len(),
            self.qual.len(),
            self.tags.len(),
        )?;
        self.cigar = cigar;
        Ok(())
    }

    /// Encode and set the sequence, together with its quality scores.
    ///
    /// When `qualities` is omitted, the quality array is filled with
    /// `0xFF` ("missing") bytes of the same length.
    ///
    /// # Errors
    ///
    /// - [`BamError::InvalidNucleotide`] for non-IUPAC characters
    /// - [`BamError::QualityLengthMismatch`] when the lengths disagree
    pub fn set_sequence(&mut self, bases: &[u8], qualities: Option<&[u8]>) -> Result<()> {
        if let Some(qual) = qualities {
            if qual.len() != bases.len() {
                return Err(BamError::QualityLengthMismatch {
                    seq: bases.len(),
                    qual: qual.len(),
                });
            }
        }
        let packed = sequence::encode(bases)?;
        self.block_size = Self::block_size_for(
            self.read_name.len(),
            self.cigar.len(),
            packed.len(),
            bases.len(),
            self.tags.len(),
        )?;
        self.qual = match qualities {
            Some(qual) => qual.to_vec(),
            None => vec![0xFF; bases.len()],
        };
        self.seq = packed;
        // block_size_for bounds the total at u32::MAX, so the base count
        // fits as well.
        self.l_seq = bases.len() as u32;
        Ok(())
    }

    /// Replace the raw tag data wholesale.
    ///
    /// The bytes are not validated; malformed data surfaces on the next
    /// tag lookup.
    pub fn set_raw_tags(&mut self, data: Vec<u8>) -> Result<()> {
        self.block_size = Self::block_size_for(
            self.read_name.len(),
            self.cigar.len(),
            self.seq.len(),
            self.qual.len(),
            data.len(),
        )?;
        self.tags = Tags::from_raw(data);
        Ok(())
    }

    /// Look up a tag and decode its value.
    ///
    /// # Errors
    ///
    /// [`BamError::TagNotFound`] when absent; malformed tag data and `H`
    /// values surface their own errors.
    pub fn get_tag(&self, key: [u8; 2]) -> Result<TagValue<'_>> {
        self.tags
            .get(key)?
            .ok_or(BamError::TagNotFound { tag: key })
    }

    /// Insert or replace a tag.
    ///
    /// The value type is `value_type` if given, else the per-key SAMtags
    /// default ([`default_tag_type`]), else the value's own kind. On any
    /// failure the record is left unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use bamcodec::record::Record;
    /// use bamcodec::tags::TagValue;
    ///
    /// # fn main() -> bamcodec::Result<()> {
    /// let mut record = Record::new();
    /// record.set_tag(*b"NM", 2, None)?;
    /// assert_eq!(record.get_tag(*b"NM")?, TagValue::Int(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_tag<'a>(
        &mut self,
        key: [u8; 2],
        value: impl Into<TagData<'a>>,
        value_type: Option<TagType>,
    ) -> Result<()> {
        let value = value.into();
        let value_type = value_type
            .or_else(|| default_tag_type(key))
            .unwrap_or_else(|| value.natural_type());
        let tlv = tags::encode_tlv(key, &value, value_type)?;
        let new_tags = self.tags.spliced(key, &tlv)?;
        self.block_size = Self::block_size_for(
            self.read_name.len(),
            self.cigar.len(),
            self.seq.len(),
            self.qual.len(),
            new_tags.len(),
        )?;
        self.tags = Tags::from_raw(new_tags);
        Ok(())
    }

    /// Remove a tag by name; returns whether it was present.
    pub fn delete_tag(&mut self, key: [u8; 2]) -> Result<bool> {
        if tags::find_tag(self.tags.as_raw(), key)?.is_none() {
            return Ok(false);
        }
        let new_tags = self.tags.spliced(key, &[])?;
        self.block_size = Self::block_size_for(
            self.read_name.len(),
            self.cigar.len(),
            self.seq.len(),
            self.qual.len(),
            new_tags.len(),
        )?;
        self.tags = Tags::from_raw(new_tags);
        Ok(true)
    }

    /// Parse one complete record, including its leading `block_size`.
    ///
    /// Fields are decoded little-endian one by one; the layout is never
    /// reinterpreted through an in-memory struct, so the parse is
    /// portable across endianness and padding rules. Bytes past the
    /// record's declared end are ignored.
    ///
    /// # Errors
    ///
    /// - [`BamError::Truncated`] when any field overruns the data
    /// - [`BamError::InvalidReadNameLength`] when `l_read_name` is 0
    /// - [`BamError::NonAscii`] for high-bit bytes in the read name
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FIXED_SIZE {
            return Err(BamError::Truncated {
                context: "record header",
                expected: FIXED_SIZE,
                actual: data.len(),
            });
        }
        let block_size = read_u32(data, 0);
        let ref_id = read_i32(data, 4);
        let pos = read_i32(data, 8);
        let l_read_name = data[12];
        let mapq = data[13];
        let bin = read_u16(data, 14);
        let n_cigar_op = read_u16(data, 16) as usize;
        let flag = read_u16(data, 18);
        let l_seq = read_u32(data, 20);
        let next_ref_id = read_i32(data, 24);
        let next_pos = read_i32(data, 28);
        let tlen = read_i32(data, 32);

        let total = block_size as usize + 4;
        if data.len() < total {
            return Err(BamError::Truncated {
                context: "record",
                expected: total,
                actual: data.len(),
            });
        }
        if l_read_name == 0 {
            return Err(BamError::InvalidReadNameLength { length: 0 });
        }

        let mut cursor = FIXED_SIZE;
        let name_end = cursor + l_read_name as usize;
        if name_end > total {
            return Err(BamError::Truncated {
                context: "read name",
                expected: name_end,
                actual: total,
            });
        }
        let read_name = &data[cursor..name_end - 1];
        if !ascii::is_ascii(read_name) {
            return Err(BamError::NonAscii { field: "read name" });
        }
        cursor = name_end;

        let cigar_end = cursor + 4 * n_cigar_op;
        if cigar_end > total {
            return Err(BamError::Truncated {
                context: "cigar",
                expected: cigar_end,
                actual: total,
            });
        }
        let cigar = Cigar::from_bytes(&data[cursor..cigar_end])?;
        cursor = cigar_end;

        let seq_end = cursor + (l_seq as usize).div_ceil(2);
        if seq_end > total {
            return Err(BamError::Truncated {
                context: "sequence",
                expected: seq_end,
                actual: total,
            });
        }
        let seq = data[cursor..seq_end].to_vec();
        cursor = seq_end;

        let qual_end = cursor + l_seq as usize;
        if qual_end > total {
            return Err(BamError::Truncated {
                context: "quality scores",
                expected: qual_end,
                actual: total,
            });
        }
        let qual = data[cursor..qual_end].to_vec();
        cursor = qual_end;

        let tags = Tags::from_raw(data[cursor..total].to_vec());

        Ok(Self {
            block_size,
            ref_id,
            pos,
            mapq,
            bin,
            flag,
            l_seq,
            next_ref_id,
            next_pos,
            tlen,
            read_name: read_name.to_vec(),
            cigar,
            seq,
            qual,
            tags,
        })
    }

    /// Serialize the record into a fresh buffer of `block_size + 4`
    /// bytes, matching the wire format exactly.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        self.write_into(&mut out);
        out
    }

    /// Append the serialized record to `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.block_size.to_le_bytes());
        out.extend_from_slice(&self.ref_id.to_le_bytes());
        out.extend_from_slice(&self.pos.to_le_bytes());
        out.push(self.l_read_name());
        out.push(self.mapq);
        out.extend_from_slice(&self.bin.to_le_bytes());
        out.extend_from_slice(&(self.cigar.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.flag.to_le_bytes());
        out.extend_from_slice(&self.l_seq.to_le_bytes());
        out.extend_from_slice(&self.next_ref_id.to_le_bytes());
        out.extend_from_slice(&self.next_pos.to_le_bytes());
        out.extend_from_slice(&self.tlen.to_le_bytes());
        out.extend_from_slice(&self.read_name);
        out.push(0);
        for &word in self.cigar.as_words() {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(&self.seq);
        out.extend_from_slice(&self.qual);
        out.extend_from_slice(self.tags.as_raw());
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    read_u32(data, offset) as i32
}

/// Builder for the fixed fields a record can be created with.
///
/// Fields not set keep the unmapped defaults of [`Record::new`].
///
/// # Example
///
/// ```
/// use bamcodec::record::{Record, BAM_FREVERSE};
///
/// # fn main() -> bamcodec::Result<()> {
/// let record = Record::builder()
///     .reference_id(3)
///     .position(10_000)
///     .read_name(b"read1")
///     .mapping_quality(60)
///     .flag(BAM_FREVERSE)
///     .build()?;
/// assert_eq!(record.position(), 10_000);
/// assert!(record.is_reverse());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    ref_id: Option<i32>,
    pos: Option<i32>,
    read_name: Vec<u8>,
    mapq: Option<u8>,
    flag: Option<u16>,
    next_ref_id: Option<i32>,
    next_pos: Option<i32>,
}

impl RecordBuilder {
    /// Start from the unmapped defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference sequence index.
    pub fn reference_id(mut self, ref_id: i32) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    /// 0-based leftmost position.
    pub fn position(mut self, pos: i32) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Read name (ASCII, at most 254 bytes).
    pub fn read_name(mut self, name: &[u8]) -> Self {
        self.read_name = name.to_vec();
        self
    }

    /// Mapping quality.
    pub fn mapping_quality(mut self, mapq: u8) -> Self {
        self.mapq = Some(mapq);
        self
    }

    /// Bitwise flags.
    pub fn flag(mut self, flag: u16) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Reference index of the mate.
    pub fn next_reference_id(mut self, next_ref_id: i32) -> Self {
        self.next_ref_id = Some(next_ref_id);
        self
    }

    /// Position of the mate.
    pub fn next_position(mut self, next_pos: i32) -> Self {
        self.next_pos = Some(next_pos);
        self
    }

    /// Build the record.
    ///
    /// # Errors
    ///
    /// The read name is validated like [`Record::set_read_name`].
    pub fn build(self) -> Result<Record> {
        let mut record = Record::new();
        record.set_read_name(&self.read_name)?;
        if let Some(ref_id) = self.ref_id {
            record.ref_id = ref_id;
        }
        if let Some(pos) = self.pos {
            record.pos = pos;
        }
        if let Some(mapq) = self.mapq {
            record.mapq = mapq;
        }
        if let Some(flag) = self.flag {
            record.flag = flag;
        }
        if let Some(next_ref_id) = self.next_ref_id {
            record.next_ref_id = next_ref_id;
        }
        if let Some(next_pos) = self.next_pos {
            record.next_pos = next_pos;
        }
        Ok(record)
    }
}
