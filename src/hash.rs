//! DJB2 key hashing.
//!
//! Keys are addressed by a 32-bit hash of their bytes (including the trailing
//! NUL the wire format stores), seeded at 5381 and folded with a ×33
//! schedule. Collisions are expected and tolerated by the tree engine via
//! quadratic probing; see [`probe_hash`].
//!
//! Both functions are `const fn`, so hashes of literal keys can be folded at
//! compile time:
//!
//! ```
//! use lite3::{key_data, KeyData};
//!
//! const TITLE: KeyData = key_data("title");
//! assert_eq!(TITLE.size, 6); // five bytes plus the NUL terminator
//! ```

use crate::types::KeyData;

/// Seed of the rolling hash.
pub const DJB2_SEED: u32 = 5381;

// ─────────────────────────────────────────────────────────────────────────────
// Hash functions
// ─────────────────────────────────────────────────────────────────────────────

/// 32-bit DJB2 hash of `key`'s bytes.
///
/// The trailing NUL the wire format appends contributes nothing to the hash
/// (folding a zero byte is `h*33 + 0`), so hashing the bare `&str` matches
/// hashing the stored NUL-terminated record up to its terminator.
#[inline]
pub const fn key_hash(key: &str) -> u32 {
    let bytes = key.as_bytes();
    let mut hash = DJB2_SEED;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(bytes[i] as u32);
        i += 1;
    }
    hash
}

/// Hash plus stored key size (bytes including the NUL terminator).
#[inline]
pub const fn key_data(key: &str) -> KeyData {
    KeyData {
        hash: key_hash(key),
        size: key.len() as u32 + 1,
    }
}

/// Probe position `i` for a base hash: `h_i = h_0 + i²` (quadratic open
/// addressing). Attempt 0 is the base hash itself.
#[inline]
pub(crate) const fn probe_hash(base: u32, attempt: u32) -> u32 {
    base.wrapping_add(attempt.wrapping_mul(attempt))
}
