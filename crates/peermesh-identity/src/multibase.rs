//! String codecs used for PeerId rendering.
//!
//! The modern PeerId string is multibase `'b'`: RFC 4648 base32, lowercase,
//! no padding. The legacy form is base58 with the btc alphabet.
//!
//! Base32 reference: `data-encoding` crate (MIT/Apache-2.0)
//! Base58 reference: `bs58` crate (MIT/Apache-2.0)

use std::sync::LazyLock;

use data_encoding::{Encoding, Specification};

use crate::error::{IdentityError, Result};

/// Multibase prefix character for base32-lowercase-nopad.
pub const MULTIBASE_BASE32_PREFIX: char = 'b';

/// RFC 4648 base32, lowercase symbols, no padding. `data-encoding` ships the
/// uppercase form only, so the lowercase alphabet is built once here.
static BASE32_LOWER_NOPAD: LazyLock<Encoding> = LazyLock::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str("abcdefghijklmnopqrstuvwxyz234567");
    spec.encoding()
        .expect("base32 alphabet has 32 distinct characters")
});

/// Number of base32 characters needed for `n` input bytes: `ceil(n * 8 / 5)`.
pub fn base32_encoded_len(n: usize) -> usize {
    BASE32_LOWER_NOPAD.encode_len(n)
}

/// Encode to lowercase base32 without padding.
pub fn base32_encode(input: &[u8]) -> String {
    BASE32_LOWER_NOPAD.encode(input)
}

/// Decode lowercase base32 without padding.
///
/// Any character outside the alphabet (including uppercase) fails with
/// [`IdentityError::InvalidMultibase`].
pub fn base32_decode(input: &str) -> Result<Vec<u8>> {
    BASE32_LOWER_NOPAD
        .decode(input.as_bytes())
        .map_err(|e| IdentityError::InvalidMultibase(e.to_string()))
}

/// Encode with the base58 btc alphabet.
pub fn base58_encode(input: &[u8]) -> String {
    bs58::encode(input).into_string()
}

/// Decode the base58 btc alphabet.
pub fn base58_decode(input: &str) -> Result<Vec<u8>> {
    bs58::decode(input)
        .into_vec()
        .map_err(|e| IdentityError::InvalidMultibase(e.to_string()))
}
