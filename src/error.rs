use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example, caused by bad input - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The caller provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A key, nonce, mac or envelope buffer has the wrong length or is too
    /// short to hold the fixed-size fields.
    InvalidSize,
    /// Two buffers that must be of equal length for comparison were not.
    SizeMismatch,
    /// Memory or random bytes could not be obtained for an output buffer.
    AllocationFailed,
    /// The secretbox primitive refused to seal the message.
    EncryptFailed,
    /// Authentication failed due to a wrong key, wrong nonce, tampering
    /// or corruption.
    DecryptFailed,
    /// The armored representation is malformed (prefix or unsupported family).
    ArmoringInvalid,
    /// Base64 decoding of the armored payload failed.
    ArmoringDecode,
    /// Input claimed to be saltseal data but used a future/unsupported version.
    ArmoringFromFuture,
    /// A key could not be obtained from the configured reader.
    KeyUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SaltsealError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SaltsealError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The caller-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    ///
    /// The kind of the innermost failure is kept so callers can still branch on it.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SaltsealError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_keeps_kind_and_category() {
        let inner = SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptFailed,
            "decryption failed",
        );
        let outer = inner.with_context("failed to decrypt");

        assert_eq!(outer.kind, Some(ErrorKind::DecryptFailed));
        assert_eq!(outer.category, ErrorCategory::User);
        assert_eq!(outer.message(), "failed to decrypt");
        assert_eq!(
            outer.source_error().map(|e| e.to_string()).as_deref(),
            Some("decryption failed")
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let err = SaltsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to read",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );

        assert_eq!(err.to_string(), "failed to read");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_new_has_no_kind() {
        let err = SaltsealError::new(ErrorCategory::Internal, "something");
        assert_eq!(err.kind, None);
        assert!(err.source_error().is_none());
    }
}
