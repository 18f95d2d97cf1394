//! Secure wiping of sensitive buffers.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Overwrite every byte of `buf` with zero.
///
/// The writes are volatile and followed by a compiler fence, so they are
/// not elided even if `buf` is never read again.
pub fn zero(buf: &mut [u8]) {
    buf.zeroize();
}

/// True iff every byte of `buf` is zero. Vacuously true for empty input.
pub fn is_zero(buf: &[u8]) -> bool {
    let acc = buf.iter().fold(0u8, |acc, &b| acc | b);
    acc.ct_eq(&0).into()
}
