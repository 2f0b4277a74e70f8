//! CIGAR (Compact Idiosyncratic Gapped Alignment Report) storage and codecs.
//!
//! CIGAR data describes how a read aligns to the reference, as a sequence
//! of (operation, length) pairs.
//!
//! # BAM Format
//!
//! In BAM, CIGAR data is stored as 32-bit little-endian integers:
//! - Low 4 bits: operation code (0-9)
//! - High 28 bits: operation length (0 to 268,435,455)
//!
//! # Operations
//!
//! - M: Match/mismatch (alignment match, can include mismatches)
//! - I: Insertion to reference
//! - D: Deletion from reference
//! - N: Skipped region from reference (intron for RNA-seq)
//! - S: Soft clipping (bases present in read, not in alignment)
//! - H: Hard clipping (bases not present in read)
//! - P: Padding (silent deletion from padded reference)
//! - =: Sequence match (bases match reference)
//! - X: Sequence mismatch (bases don't match reference)
//! - B: Back (move backwards along the reference)

use crate::error::{BamError, Result};
use std::fmt;
use std::str::FromStr;

/// CIGAR operation code for an alignment match (M).
pub const BAM_CMATCH: u8 = 0;
/// CIGAR operation code for an insertion to the reference (I).
pub const BAM_CINS: u8 = 1;
/// CIGAR operation code for a deletion from the reference (D).
pub const BAM_CDEL: u8 = 2;
/// CIGAR operation code for a skipped region (N).
pub const BAM_CREF_SKIP: u8 = 3;
/// CIGAR operation code for soft clipping (S).
pub const BAM_CSOFT_CLIP: u8 = 4;
/// CIGAR operation code for hard clipping (H).
pub const BAM_CHARD_CLIP: u8 = 5;
/// CIGAR operation code for padding (P).
pub const BAM_CPAD: u8 = 6;
/// CIGAR operation code for a sequence match (=).
pub const BAM_CEQUAL: u8 = 7;
/// CIGAR operation code for a sequence mismatch (X).
pub const BAM_CDIFF: u8 = 8;
/// CIGAR operation code for a backwards move (B).
pub const BAM_CBACK: u8 = 9;

/// Number of bits the operation length is shifted left by in a CIGAR word.
pub const BAM_CIGAR_SHIFT: u32 = 4;

/// Maximum operation length a CIGAR word can store (28 bits).
pub const BAM_CIGAR_MAX_LEN: u32 = (1 << 28) - 1;

/// Characters naming each operation, indexed by operation code.
const CIGAR_OP_CHARS: &[u8; 10] = b"MIDNSHP=XB";

const fn build_char_to_op() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < CIGAR_OP_CHARS.len() {
        table[CIGAR_OP_CHARS[i] as usize] = i as i8;
        i += 1;
    }
    table
}

/// 256-entry operation character to operation code table (-1 = invalid).
static CHAR_TO_OP: [i8; 256] = build_char_to_op();

/// A CIGAR: a sized contiguous sequence of 32-bit operation words.
///
/// Each word encodes `(len << 4) | op`. A `Cigar` owns its words and can
/// be constructed from text, from (operation, length) pairs, or from raw
/// little-endian bytes. Equality is pointwise word equality; no ordering
/// is defined.
///
/// # Example
///
/// ```
/// use bamcodec::cigar::Cigar;
///
/// # fn main() -> bamcodec::Result<()> {
/// let cigar = Cigar::from_text("3M1I2M")?;
/// assert_eq!(cigar.len(), 3);
/// assert_eq!(cigar.as_words(), &[0x30, 0x11, 0x20]);
/// assert_eq!(cigar.to_string(), "3M1I2M");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    words: Vec<u32>,
}

impl Cigar {
    /// Create an empty CIGAR (zero operations).
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Parse a CIGAR from its textual form.
    ///
    /// The text is a repetition of `<decimal count><operation character>`
    /// until the end of the string. The operation character is translated
    /// through a 256-entry lookup table.
    ///
    /// # Errors
    ///
    /// - [`BamError::CigarLengthOverflow`] when a count exceeds 2^28 - 1
    /// - [`BamError::InvalidCigarChar`] for characters naming no operation
    /// - [`BamError::Truncated`] when the text ends in the middle of a count
    pub fn from_text(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        // Two characters minimum per operation, so len / 2 is an upper
        // bound on the number of words.
        let mut words = Vec::with_capacity(bytes.len() / 2);
        let mut pos = 0;
        while pos < bytes.len() {
            let mut count: u64 = 0;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                count = count * 10 + u64::from(bytes[pos] - b'0');
                if count > u64::from(BAM_CIGAR_MAX_LEN) {
                    return Err(BamError::CigarLengthOverflow { len: count });
                }
                pos += 1;
            }
            if pos >= bytes.len() {
                return Err(BamError::Truncated {
                    context: "cigar text",
                    expected: pos + 1,
                    actual: bytes.len(),
                });
            }
            let op = CHAR_TO_OP[bytes[pos] as usize];
            if op < 0 {
                return Err(BamError::InvalidCigarChar { byte: bytes[pos] });
            }
            words.push(((count as u32) << BAM_CIGAR_SHIFT) | op as u32);
            pos += 1;
        }
        words.shrink_to_fit();
        Ok(Self { words })
    }

    /// Build a CIGAR from an iterator of `(operation, length)` pairs.
    ///
    /// # Errors
    ///
    /// - [`BamError::InvalidCigarOp`] when an operation code exceeds 9
    /// - [`BamError::CigarLengthOverflow`] when a length exceeds 2^28 - 1
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u32)>,
    {
        let iter = pairs.into_iter();
        let mut words = Vec::with_capacity(iter.size_hint().0);
        for (op, len) in iter {
            if op > BAM_CBACK {
                return Err(BamError::InvalidCigarOp { op: u32::from(op) });
            }
            if len > BAM_CIGAR_MAX_LEN {
                return Err(BamError::CigarLengthOverflow {
                    len: u64::from(len),
                });
            }
            words.push((len << BAM_CIGAR_SHIFT) | u32::from(op));
        }
        Ok(Self { words })
    }

    /// Reinterpret raw little-endian bytes as CIGAR words.
    ///
    /// The buffer length must be a multiple of 4. Operation codes are not
    /// validated, matching the wire format which permits any 4-bit value.
    ///
    /// # Errors
    ///
    /// [`BamError::LengthNotMultiple`] when the length is not a multiple
    /// of 4.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() % 4 != 0 {
            return Err(BamError::LengthNotMultiple {
                what: "cigar buffer",
                len: data.len(),
                width: 4,
            });
        }
        let words = data
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        Ok(Self { words })
    }

    /// The number of CIGAR operations (`n_cigar_op`).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether this CIGAR holds no operations.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Read-only view of the underlying operation words.
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    /// Export the operation words as little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 4);
        for &word in &self.words {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Iterate over `(operation, length)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.words
            .iter()
            .map(|&word| ((word & 0xF) as u8, word >> BAM_CIGAR_SHIFT))
    }
}

impl fmt::Display for Cigar {
    /// Render the textual form: `<len><opchar>` for each word.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (op, len) in self.iter() {
            // Operation codes from iter() are 4 bits; codes 10-15 have no
            // character and render as '?'.
            let opchar = CIGAR_OP_CHARS.get(op as usize).copied().unwrap_or(b'?');
            write!(f, "{}{}", len, char::from(opchar))?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = BamError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}
