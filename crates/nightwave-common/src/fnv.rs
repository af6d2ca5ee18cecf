//! FNV-1a 64 hashing utilities.
//!
//! REDengine addresses resources by the FNV-1a 64 hash of their logical
//! path instead of by path string. Archive index entries carry this hash
//! as their content identifier.

/// FNV-1a 64 offset basis.
pub const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64 prime.
pub const PRIME: u64 = 0x0000_0100_0000_01b3;

/// Compute the FNV-1a 64 hash of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u64 {
    let mut hash = OFFSET_BASIS;
    for &byte in data {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Compute the FNV-1a 64 hash of a string.
///
/// The string is encoded as UTF-8 before hashing.
#[inline]
pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}
