//! Timing-safe comparison of byte buffers
//!
//! Both operations touch every byte regardless of where the inputs first
//! differ. Only the final result is branched on.

use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use std::cmp::Ordering;
use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater};

/// Compare two equal-length buffers as little-endian unsigned integers.
///
/// This matches libsodium's `sodium_compare`: the byte at the highest index
/// is the most significant. Fails with `SizeMismatch` when the lengths differ.
pub fn compare(a: &[u8], b: &[u8]) -> Result<Ordering> {
    if a.len() != b.len() {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::SizeMismatch,
            format!(
                "cannot compare buffers of different lengths ({} and {})",
                a.len(),
                b.len()
            ),
        ));
    }

    let mut gt = Choice::from(0);
    let mut lt = Choice::from(0);
    let mut eq = Choice::from(1);
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        gt |= eq & x.ct_gt(y);
        lt |= eq & y.ct_gt(x);
        eq &= x.ct_eq(y);
    }

    let ordering = match (gt.unwrap_u8(), lt.unwrap_u8()) {
        (1, _) => Ordering::Greater,
        (_, 1) => Ordering::Less,
        _ => Ordering::Equal,
    };
    Ok(ordering)
}

/// True iff both buffers have the same length and contents.
///
/// Never fails; buffers of different length are simply not equal.
pub fn equals(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
