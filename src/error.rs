//! Error types for bamcodec.
//!
//! All fallible operations in this crate return [`BamError`] through the
//! crate-wide [`Result`] alias. Variants carry enough context (tag names,
//! offending bytes, expected/actual byte counts) to pinpoint where in a
//! record a failure occurred.

use thiserror::Error;

/// Result type alias for bamcodec operations.
pub type Result<T> = std::result::Result<T, BamError>;

/// Errors that can occur while decoding, mutating or encoding BAM records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BamError {
    /// Input data ended inside a record, field or value.
    #[error("truncated {context}: need {expected} bytes, got {actual}")]
    Truncated {
        /// What was being parsed when the data ran out.
        context: &'static str,
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },

    /// Tag data ended inside a tag entry.
    #[error("truncated tag {}", tag_name(.tag))]
    TruncatedTag {
        /// The two-letter tag name.
        tag: [u8; 2],
    },

    /// A `Z` or `H` tag value ran to the end of the tag data without a NUL.
    #[error("truncated tag {}: string value not terminated by NUL", tag_name(.tag))]
    UnterminatedString {
        /// The two-letter tag name.
        tag: [u8; 2],
    },

    /// Read name longer than the wire format can store.
    #[error("read name may not be longer than 254 bytes, got {len}")]
    ReadNameTooLong {
        /// Length of the rejected name.
        len: usize,
    },

    /// `l_read_name` on the wire was zero; the field counts the
    /// terminating NUL so it must be at least 1.
    #[error("invalid read name length: {length} (must be at least 1)")]
    InvalidReadNameLength {
        /// The invalid length value.
        length: u8,
    },

    /// CIGAR operation length does not fit in 28 bits.
    #[error("cigar operation length {len} exceeds the 28-bit maximum")]
    CigarLengthOverflow {
        /// The rejected length.
        len: u64,
    },

    /// CIGAR operation code outside `0..=9`.
    #[error("invalid cigar operation code: {op}")]
    InvalidCigarOp {
        /// The rejected operation code.
        op: u32,
    },

    /// Character in a CIGAR string that names no operation.
    #[error("invalid cigar operation character: '{}'", byte_char(.byte))]
    InvalidCigarChar {
        /// The rejected character.
        byte: u8,
    },

    /// Character in a sequence that is not part of the IUPAC alphabet.
    #[error("not a IUPAC character: '{}'", byte_char(.byte))]
    InvalidNucleotide {
        /// The rejected character.
        byte: u8,
    },

    /// Bytes with the high bit set in a field restricted to ASCII.
    #[error("{field} must only contain ASCII characters")]
    NonAscii {
        /// Which field contained the non-ASCII bytes.
        field: &'static str,
    },

    /// Sequence and quality arrays of different lengths.
    #[error("sequence and qualities must have the same length ({seq} vs {qual})")]
    QualityLengthMismatch {
        /// Sequence length.
        seq: usize,
        /// Quality length.
        qual: usize,
    },

    /// Tag entry with a type code this crate does not recognise.
    #[error("unknown value type '{}' for tag {}", byte_char(.type_code), tag_name(.tag))]
    UnknownTagType {
        /// The two-letter tag name.
        tag: [u8; 2],
        /// The unrecognised type code.
        type_code: u8,
    },

    /// `B` array tag with an unrecognised element subtype.
    #[error("unknown array subtype: '{}'", byte_char(.subtype))]
    UnknownArraySubtype {
        /// The unrecognised subtype code.
        subtype: u8,
    },

    /// A value-type code string that names no tag type.
    #[error("unknown value type: {code}")]
    UnknownValueType {
        /// The rejected code.
        code: String,
    },

    /// Integer too large or too small for the requested tag value type.
    #[error(
        "tag {} with value type '{}' requires a value between {min} and {max}, got {value}",
        tag_name(.tag), byte_char(.type_code)
    )]
    ValueOutOfRange {
        /// The two-letter tag name.
        tag: [u8; 2],
        /// The requested value type code.
        type_code: u8,
        /// The rejected value.
        value: i64,
        /// Lower bound of the type.
        min: i64,
        /// Upper bound of the type.
        max: i64,
    },

    /// Supplied value kind cannot be stored under the requested value type.
    #[error(
        "tag {} with value type '{}' cannot store the supplied value",
        tag_name(.tag), byte_char(.type_code)
    )]
    TagValueMismatch {
        /// The two-letter tag name.
        tag: [u8; 2],
        /// The requested value type code.
        type_code: u8,
    },

    /// Value type `A` requires exactly one character.
    #[error("value type 'A' requires exactly one character, got {len}")]
    CharLength {
        /// Length of the rejected value.
        len: usize,
    },

    /// Virtual file offset subfield out of range.
    #[error("{field} of {value} is larger than the maximum allowed value {max}")]
    OffsetOverflow {
        /// Which subfield overflowed (`coffset` or `uoffset`).
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Maximum allowed value.
        max: u64,
    },

    /// A mutation would push the record's block size past `u32::MAX`.
    #[error("record too large: block size of {size} does not fit in 32 bits")]
    BlockSizeOverflow {
        /// The computed block size.
        size: u64,
    },

    /// Array tag with more elements than a 32-bit count can describe.
    #[error("array of {len} elements does not fit a 32-bit count")]
    ArrayTooLong {
        /// Number of elements in the rejected array.
        len: usize,
    },

    /// Buffer length that is not a whole number of fixed-width items.
    #[error("{what} length {len} is not a multiple of {width}")]
    LengthNotMultiple {
        /// What was being decoded.
        what: &'static str,
        /// The offending length.
        len: usize,
        /// The item width.
        width: usize,
    },

    /// Tag lookup by name found nothing.
    #[error("tag not present: {}", tag_name(.tag))]
    TagNotFound {
        /// The two-letter tag name.
        tag: [u8; 2],
    },

    /// Functionality the format defines but this crate does not support.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

fn tag_name(tag: &[u8; 2]) -> String {
    format!("{}{}", char::from(tag[0]), char::from(tag[1]))
}

fn byte_char(byte: &u8) -> char {
    char::from(*byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_tags() {
        let err = BamError::TagNotFound { tag: *b"NM" };
        assert_eq!(err.to_string(), "tag not present: NM");

        let err = BamError::TruncatedTag { tag: *b"RG" };
        assert!(err.to_string().contains("RG"));
    }

    #[test]
    fn test_error_messages_show_characters() {
        let err = BamError::InvalidCigarChar { byte: b'Q' };
        assert!(err.to_string().contains("'Q'"));

        let err = BamError::InvalidNucleotide { byte: b'E' };
        assert_eq!(err.to_string(), "not a IUPAC character: 'E'");
    }
}
