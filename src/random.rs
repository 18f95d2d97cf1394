//! Cryptographically secure random bytes from the operating system.

use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use rand::RngCore;
use rand::rngs::OsRng;

/// Allocate a buffer of exactly `len` bytes and fill it from the OS CSPRNG.
///
/// Either the whole buffer is returned filled, or an error is returned and
/// nothing escapes.
pub fn bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        SaltsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::AllocationFailed,
            format!("failed to allocate {} random bytes", len),
            e,
        )
    })?;
    buf.resize(len, 0);
    fill(&mut buf)?;
    Ok(buf)
}

/// Fill a caller-owned buffer from the OS CSPRNG.
pub fn fill(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        SaltsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::AllocationFailed,
            "system random source unavailable",
            e,
        )
    })
}
