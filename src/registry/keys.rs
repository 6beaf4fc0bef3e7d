//! Base-62 key generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Key alphabet: digits, then upper case, then lower case.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Uniformly random key of `len` alphanumeric characters.
#[must_use]
pub fn generate_key(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Number of distinct keys of `width` characters, saturating at `u64::MAX`.
#[must_use]
pub fn key_space(width: usize) -> u64 {
    u32::try_from(width)
        .ok()
        .and_then(|w| 62u64.checked_pow(w))
        .unwrap_or(u64::MAX)
}

#[must_use]
pub fn is_valid_key(key: &str, width: usize) -> bool {
    key.len() == width && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// The `n`th key of `width` characters in alphabet order (`n` wraps at the
/// key space).
#[must_use]
pub fn nth_key(mut n: u64, width: usize) -> String {
    let mut out = vec![ALPHABET[0]; width];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(n % 62) as usize];
        n /= 62;
    }
    out.into_iter().map(char::from).collect()
}
