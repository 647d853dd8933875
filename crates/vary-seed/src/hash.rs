//! Pinned string hashes for seeding generators
//!
//! Both hashes are fixed: changing either constant changes every shuffle
//! produced by the profile that uses it.

/// FNV-1a 32-bit offset basis
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Polynomial rolling hash over UTF-16 code units
///
/// `h = h * 31 + code_unit`, wrapping in unsigned 32-bit arithmetic.
#[must_use]
pub fn polynomial_hash(key: &str) -> u32 {
    key.encode_utf16().fold(0u32, |h, unit| {
        h.wrapping_mul(31).wrapping_add(u32::from(unit))
    })
}

/// FNV-1a over the UTF-8 bytes of `key`
#[must_use]
pub fn fnv1a(key: &str) -> u32 {
    key.bytes().fold(FNV_OFFSET_BASIS, |h, byte| {
        (h ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
