//! Constant-time comparison.

use subtle::ConstantTimeEq;

/// Compare two byte slices in constant time.
///
/// The length check leaks only the lengths, which for hex signatures are
/// public anyway. Slices of different length compare unequal.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// String flavour of [`constant_time_eq`], comparing UTF-8 bytes.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
