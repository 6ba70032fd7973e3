//! Base62 key codec
//!
//! Reversible unsigned-integer <-> string encoding over the fixed alphabet
//! `0-9A-Za-z`, used to turn packed 64-bit IDs into short-link keys.
use once_cell::sync::Lazy;

use crate::error::KubeflakeError;

/// Character set for base62 encoding (0-9, A-Z, a-z)
const BASE62_CHARS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Lookup table for decoding base62 characters to their values
static DECODE_MAP: Lazy<[i8; 256]> = Lazy::new(|| {
    let mut map = [-1i8; 256];
    for (i, &c) in BASE62_CHARS.iter().enumerate() {
        map[c as usize] = i as i8;
    }
    map
});

/// Maximum length of a base62 encoded u64 (11 characters)
const MAX_BASE62_LEN: usize = 11;

/// Encode a u64 ID to a base62 string
///
/// The value 0 encodes as the literal `"0"`, never an empty string.
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return "0".to_string();
    }

    // Pre-allocate buffer with maximum possible size
    let mut buffer = [0u8; MAX_BASE62_LEN];
    let mut position = MAX_BASE62_LEN;

    while id > 0 && position > 0 {
        position -= 1;
        let remainder = (id % 62) as usize;
        buffer[position] = BASE62_CHARS[remainder];
        id /= 62;
    }

    // Convert only the used portion of the buffer to a string
    String::from_utf8_lossy(&buffer[position..]).into_owned()
}

/// Decode a base62 string back to a u64 ID
///
/// Any character outside the alphabet, or a key whose value does not fit
/// in a u64, fails with [`KubeflakeError::InvalidBase`].
pub fn decode(encoded: &str) -> Result<u64, KubeflakeError> {
    let mut result: u64 = 0;
    for &c in encoded.as_bytes() {
        let value = DECODE_MAP[c as usize];
        if value == -1 {
            return Err(KubeflakeError::InvalidBase);
        }

        result = result
            .checked_mul(62)
            .and_then(|r| r.checked_add(value as u64))
            .ok_or(KubeflakeError::InvalidBase)?;
    }

    Ok(result)
}

/// A reversible u64 <-> key codec.
///
/// [`Settings`](crate::Settings) carries one of these so the key alphabet
/// can be swapped without touching the generator.
pub trait KeyCodec: Send + Sync {
    fn encode(&self, id: u64) -> String;
    fn decode(&self, key: &str) -> Result<u64, KubeflakeError>;
}

/// The default base62 codec
#[derive(Debug, Default, Clone, Copy)]
pub struct Base62;

impl KeyCodec for Base62 {
    fn encode(&self, id: u64) -> String {
        encode(id)
    }

    fn decode(&self, key: &str) -> Result<u64, KubeflakeError> {
        decode(key)
    }
}
