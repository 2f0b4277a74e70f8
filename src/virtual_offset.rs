//! BGZF virtual file offsets.
//!
//! A virtual file offset addresses a byte inside a BGZF-compressed file
//! with a single `u64`:
//!
//! - High 48 bits (`coffset`): offset of the compressed block start
//! - Low 16 bits (`uoffset`): offset within the inflated block
//!
//! Index formats store runs of virtual file offsets either as flat lists
//! or as `(start, end)` chunk pairs; the bulk decoders here handle both
//! layouts from raw little-endian bytes.

use crate::error::{BamError, Result};
use std::fmt;

/// A 64-bit BGZF virtual file offset (`coffset:uoffset`).
///
/// # Example
///
/// ```
/// use bamcodec::virtual_offset::VirtualFileOffset;
///
/// # fn main() -> bamcodec::Result<()> {
/// let vfo = VirtualFileOffset::new(0x123456789ABC, 0x0042)?;
/// assert_eq!(vfo.as_raw(), 0x123456789ABC0042);
/// assert_eq!(vfo.coffset(), 0x123456789ABC);
/// assert_eq!(vfo.uoffset(), 0x0042);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualFileOffset(u64);

impl VirtualFileOffset {
    /// Maximum value of the compressed-block offset (48 bits).
    pub const COFFSET_MAX: u64 = 0xFFFF_FFFF_FFFF;

    /// Maximum value of the within-block offset (16 bits).
    pub const UOFFSET_MAX: u64 = 0xFFFF;

    /// Pack a compressed-block offset and a within-block offset.
    ///
    /// # Errors
    ///
    /// [`BamError::OffsetOverflow`] when either subfield exceeds its range.
    pub fn new(coffset: u64, uoffset: u64) -> Result<Self> {
        if coffset > Self::COFFSET_MAX {
            return Err(BamError::OffsetOverflow {
                field: "coffset",
                value: coffset,
                max: Self::COFFSET_MAX,
            });
        }
        if uoffset > Self::UOFFSET_MAX {
            return Err(BamError::OffsetOverflow {
                field: "uoffset",
                value: uoffset,
                max: Self::UOFFSET_MAX,
            });
        }
        Ok(Self((coffset << 16) | uoffset))
    }

    /// Wrap an already-packed 64-bit value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Construct from 8 little-endian bytes.
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// The packed 64-bit value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Offset to the beginning of the compressed BGZF block.
    pub const fn coffset(self) -> u64 {
        self.0 >> 16
    }

    /// Offset inside the inflated BGZF block.
    pub const fn uoffset(self) -> u16 {
        (self.0 & Self::UOFFSET_MAX) as u16
    }

    /// Decode a buffer of packed offsets.
    ///
    /// The buffer length must be a multiple of 8; each 8-byte group is a
    /// little-endian virtual file offset.
    ///
    /// # Errors
    ///
    /// [`BamError::LengthNotMultiple`] for lengths not divisible by 8.
    pub fn decode_all(data: &[u8]) -> Result<Vec<Self>> {
        if data.len() % 8 != 0 {
            return Err(BamError::LengthNotMultiple {
                what: "virtual file offset buffer",
                len: data.len(),
                width: 8,
            });
        }
        Ok(data
            .chunks_exact(8)
            .map(|chunk| Self(u64::from_le_bytes(chunk.try_into().unwrap())))
            .collect())
    }

    /// Decode a buffer of `(start, end)` chunk pairs.
    ///
    /// The buffer length must be a multiple of 16; each 16-byte group is
    /// a half-open [`Chunk`] of two little-endian virtual file offsets.
    ///
    /// # Errors
    ///
    /// [`BamError::LengthNotMultiple`] for lengths not divisible by 16.
    pub fn decode_chunks(data: &[u8]) -> Result<Vec<Chunk>> {
        if data.len() % 16 != 0 {
            return Err(BamError::LengthNotMultiple {
                what: "chunk buffer",
                len: data.len(),
                width: 16,
            });
        }
        Ok(data
            .chunks_exact(16)
            .map(|pair| Chunk {
                start: Self(u64::from_le_bytes(pair[..8].try_into().unwrap())),
                end: Self(u64::from_le_bytes(pair[8..].try_into().unwrap())),
            })
            .collect())
    }
}

impl fmt::Display for VirtualFileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.coffset(), self.uoffset())
    }
}

/// A half-open region of a BGZF file between two virtual file offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First byte of the region.
    pub start: VirtualFileOffset,
    /// One past the last byte of the region.
    pub end: VirtualFileOffset,
}

impl Chunk {
    /// Create a chunk from its bounds.
    pub fn new(start: VirtualFileOffset, end: VirtualFileOffset) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_and_accessors() {
        let vfo = VirtualFileOffset::new(0x123456789ABC, 0x0042).unwrap();
        assert_eq!(vfo.as_raw(), 0x123456789ABC0042);
        assert_eq!(vfo.coffset(), 0x123456789ABC);
        assert_eq!(vfo.uoffset(), 0x0042);
    }

    #[test]
    fn test_uoffset_defaults_to_zero() {
        let vfo = VirtualFileOffset::new(7, 0).unwrap();
        assert_eq!(vfo.as_raw(), 7 << 16);
        assert_eq!(vfo.uoffset(), 0);
    }

    #[test]
    fn test_coffset_overflow() {
        let result = VirtualFileOffset::new(VirtualFileOffset::COFFSET_MAX + 1, 0);
        assert_eq!(
            result.unwrap_err(),
            BamError::OffsetOverflow {
                field: "coffset",
                value: VirtualFileOffset::COFFSET_MAX + 1,
                max: VirtualFileOffset::COFFSET_MAX,
            }
        );
    }

    #[test]
    fn test_uoffset_overflow() {
        let result = VirtualFileOffset::new(0, 0x1_0000);
        assert!(matches!(
            result.unwrap_err(),
            BamError::OffsetOverflow { field: "uoffset", .. }
        ));
    }

    #[test]
    fn test_from_le_bytes() {
        let vfo =
            VirtualFileOffset::from_le_bytes(*b"\x42\x00\xBC\x9A\x78\x56\x34\x12");
        assert_eq!(vfo.coffset(), 0x123456789ABC);
        assert_eq!(vfo.uoffset(), 0x0042);
    }

    #[test]
    fn test_ordering_follows_file_position() {
        let early = VirtualFileOffset::new(1, 0xFFFF).unwrap();
        let late = VirtualFileOffset::new(2, 0).unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_decode_all() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x123456789ABC0042u64.to_le_bytes());
        data.extend_from_slice(&0x10u64.to_le_bytes());
        let offsets = VirtualFileOffset::decode_all(&data).unwrap();
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0].as_raw(), 0x123456789ABC0042);
        assert_eq!(offsets[1].as_raw(), 0x10);
    }

    #[test]
    fn test_decode_all_empty() {
        assert_eq!(VirtualFileOffset::decode_all(&[]).unwrap(), vec![]);
    }

    #[test]
    fn test_decode_all_bad_length() {
        let result = VirtualFileOffset::decode_all(&[0; 12]);
        assert_eq!(
            result.unwrap_err(),
            BamError::LengthNotMultiple {
                what: "virtual file offset buffer",
                len: 12,
                width: 8,
            }
        );
    }

    #[test]
    fn test_decode_chunks() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x100u64.to_le_bytes());
        data.extend_from_slice(&0x200u64.to_le_bytes());
        let chunks = VirtualFileOffset::decode_chunks(&data).unwrap();
        assert_eq!(
            chunks,
            vec![Chunk::new(
                VirtualFileOffset::from_raw(0x100),
                VirtualFileOffset::from_raw(0x200),
            )]
        );
    }

    #[test]
    fn test_decode_chunks_bad_length() {
        let result = VirtualFileOffset::decode_chunks(&[0; 8]);
        assert!(matches!(
            result.unwrap_err(),
            BamError::LengthNotMultiple { width: 16, .. }
        ));
    }

    #[test]
    fn test_display() {
        let vfo = VirtualFileOffset::new(100, 42).unwrap();
        assert_eq!(vfo.to_string(), "100:42");
    }

    proptest! {
        #[test]
        fn prop_pack_roundtrip(
            coffset in 0u64..=VirtualFileOffset::COFFSET_MAX,
            uoffset in 0u64..=VirtualFileOffset::UOFFSET_MAX,
        ) {
            let vfo = VirtualFileOffset::new(coffset, uoffset).unwrap();
            prop_assert_eq!(vfo.coffset(), coffset);
            prop_assert_eq!(u64::from(vfo.uoffset()), uoffset);
            prop_assert_eq!(
                VirtualFileOffset::from_le_bytes(vfo.as_raw().to_le_bytes()),
                vfo
            );
        }

        #[test]
        fn prop_bulk_decode_concatenates(raws in prop::collection::vec(any::<u64>(), 0..20)) {
            let mut data = Vec::new();
            for raw in &raws {
                data.extend_from_slice(&raw.to_le_bytes());
            }
            let decoded = VirtualFileOffset::decode_all(&data).unwrap();
            let expected: Vec<_> = raws.iter().map(|&r| VirtualFileOffset::from_raw(r)).collect();
            prop_assert_eq!(decoded, expected);
        }
    }
}
