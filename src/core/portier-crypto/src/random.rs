//! Cryptographically secure random generation.
//!
//! Uses the operating system's CSPRNG for all random number generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, Rng, RngCore};
use zeroize::Zeroizing;

/// Number of random bytes behind a freshly generated signing secret (256 bits).
pub const SECRET_BYTES: usize = 32;

/// Alphabet used by modular-crypt salts.
const CRYPT_ALPHABET: &[u8; 64] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates cryptographically secure random bytes.
///
/// # Arguments
///
/// * `len` - Number of random bytes to generate
pub fn generate_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generates a random token encoded as unpadded base64url.
///
/// 32 random bytes yield a 43 character token.
///
/// # Arguments
///
/// * `byte_len` - Number of random bytes behind the token
pub fn generate_urlsafe_token(byte_len: usize) -> Zeroizing<String> {
    let bytes = generate_bytes(byte_len);
    Zeroizing::new(URL_SAFE_NO_PAD.encode(&*bytes))
}

/// Generates a salt drawn from the modular-crypt alphabet (`./0-9A-Za-z`).
pub fn generate_crypt_salt(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| CRYPT_ALPHABET[rng.gen_range(0..CRYPT_ALPHABET.len())] as char)
        .collect()
}
