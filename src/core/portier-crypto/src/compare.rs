//! Constant-time comparison.

use subtle::ConstantTimeEq;

/// Compares two byte strings without short-circuiting on the first mismatch.
///
/// Inputs of different length compare unequal; only the length is observable.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).unwrap_u8() == 1
}
