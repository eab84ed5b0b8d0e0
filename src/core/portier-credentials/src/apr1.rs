//! Apache `$apr1$` MD5-crypt.
//!
//! Same construction as FreeBSD MD5-crypt with the `$apr1$` magic string,
//! 1000 rounds, and the modular-crypt base64 alphabet.

use md5::{Digest, Md5};

/// Prefix marking an APR1 hash.
pub const APR1_MAGIC: &str = "$apr1$";

/// Maximum number of salt characters used by APR1.
pub const SALT_LEN: usize = 8;

const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Computes the full `$apr1$salt$hash` string for `password`.
///
/// The salt is truncated at the first `$` and to [`SALT_LEN`] characters.
pub fn hash_with_salt(password: &[u8], salt: &str) -> String {
    let salt = salt.split('$').next().unwrap_or_default();
    let salt = &salt.as_bytes()[..salt.len().min(SALT_LEN)];

    let mut ctx = Md5::new();
    ctx.update(password);
    ctx.update(APR1_MAGIC.as_bytes());
    ctx.update(salt);

    let mut alt = Md5::new();
    alt.update(password);
    alt.update(salt);
    alt.update(password);
    let alt = alt.finalize();

    let mut remaining = password.len();
    while remaining > 0 {
        let take = remaining.min(alt.len());
        ctx.update(&alt[..take]);
        remaining -= take;
    }

    let mut bits = password.len();
    while bits > 0 {
        if bits & 1 == 1 {
            ctx.update([0u8]);
        } else {
            ctx.update(&password[..1]);
        }
        bits >>= 1;
    }

    let mut digest = ctx.finalize();
    for round in 0..1000 {
        let mut ctx = Md5::new();
        if round & 1 == 1 {
            ctx.update(password);
        } else {
            ctx.update(&digest);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(password);
        }
        if round & 1 == 1 {
            ctx.update(&digest);
        } else {
            ctx.update(password);
        }
        digest = ctx.finalize();
    }

    let mut out = String::with_capacity(APR1_MAGIC.len() + salt.len() + 23);
    out.push_str(APR1_MAGIC);
    out.push_str(&String::from_utf8_lossy(salt));
    out.push('$');

    for (a, b, c) in [(0, 6, 12), (1, 7, 13), (2, 8, 14), (3, 9, 15), (4, 10, 5)] {
        let v = (u32::from(digest[a]) << 16) | (u32::from(digest[b]) << 8) | u32::from(digest[c]);
        push_base64(&mut out, v, 4);
    }
    push_base64(&mut out, u32::from(digest[11]), 2);

    out
}

/// Extracts the salt from a stored `$apr1$salt$hash` string.
pub fn salt_of(stored: &str) -> Option<&str> {
    let rest = stored.strip_prefix(APR1_MAGIC)?;
    let (salt, _) = rest.split_once('$')?;
    Some(salt)
}

fn push_base64(out: &mut String, mut v: u32, n: usize) {
    for _ in 0..n {
        out.push(ITOA64[(v & 0x3f) as usize] as char);
        v >>= 6;
    }
}
