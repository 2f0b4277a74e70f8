//! Fast ASCII validation.
//!
//! BAM restricts read names, tag string values and CIGAR text to 7-bit
//! ASCII. Validation only needs to prove that no byte has its high bit
//! set, so the check runs word-at-a-time: 8 bytes are masked against
//! `0x8080_8080_8080_8080` per step, with a plain byte loop for the tail.

const ASCII_MASK_8BYTE: u64 = 0x8080_8080_8080_8080;
const ASCII_MASK_1BYTE: u8 = 0x80;

/// Check whether a byte slice contains only 7-bit ASCII.
///
/// Returns `true` iff every byte has its high bit clear. Performs no
/// allocation and has no error states.
///
/// # Example
///
/// ```
/// use bamcodec::ascii::is_ascii;
///
/// assert!(is_ascii(b"read_1/2"));
/// assert!(!is_ascii(&[b'r', 0x80, b'd']));
/// ```
pub fn is_ascii(data: &[u8]) -> bool {
    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        // chunks_exact guarantees 8 bytes, so the conversion cannot fail.
        let word = u64::from_ne_bytes(chunk.try_into().unwrap());
        if word & ASCII_MASK_8BYTE != 0 {
            return false;
        }
    }
    chunks.remainder().iter().all(|&b| b & ASCII_MASK_1BYTE == 0)
}
