//! Versioned armoring for envelopes and keys
//!
//! Provides base64url encoding with a version prefix. The armored format is:
//! - Free of whitespace (including newlines)
//! - Safe to embed in URLs
//! - Safe to pass unescaped in a POSIX shell
//!
//! Envelopes and keys use distinct prefixes so that one can never be
//! mistaken for the other.

use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use crate::secretbox::{KEY_SIZE, Key};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use zeroize::Zeroizing;

/// What an armored string carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Envelope,
    Key,
}

impl Label {
    /// Magic prefix shared by all versions
    fn family(self) -> &'static str {
        match self {
            Label::Envelope => "saltseal",
            Label::Key => "saltkey",
        }
    }

    /// Version 1 magic marker
    fn v1_magic(self) -> &'static str {
        match self {
            Label::Envelope => "saltseal1:",
            Label::Key => "saltkey1:",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Label::Envelope => "saltseal envelope",
            Label::Key => "saltseal key",
        }
    }
}

/// Wrap a combined envelope in armor.
///
/// Format: saltseal1:{base64url-no-padding}
pub fn wrap(envelope: &[u8]) -> String {
    wrap_labeled(Label::Envelope, envelope)
}

/// Unwrap an armored envelope, returning the combined envelope bytes.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    unwrap_labeled(Label::Envelope, armored)
}

/// Wrap a key in armor.
///
/// Format: saltkey1:{base64url-no-padding}
pub fn wrap_key(key: &Key) -> Zeroizing<String> {
    Zeroizing::new(wrap_labeled(Label::Key, key.as_ref()))
}

/// Unwrap an armored key. Surrounding whitespace is ignored.
pub fn unwrap_key(armored: &str) -> Result<Key> {
    let raw = Zeroizing::new(unwrap_labeled(Label::Key, armored.trim())?);
    if raw.len() != KEY_SIZE {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidSize,
            format!("armored key holds {} bytes, expected {}", raw.len(), KEY_SIZE),
        ));
    }
    Key::from_slice(&raw)
}

fn wrap_labeled(label: Label, body: &[u8]) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(body);
    format!("{}{}", label.v1_magic(), encoded)
}

fn unwrap_labeled(label: Label, armored: &str) -> Result<Vec<u8>> {
    let magic = label.v1_magic();
    if armored.len() < magic.len() {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input size smaller than magic marker; likely truncated",
        ));
    }

    if let Some(encoded) = armored.strip_prefix(magic) {
        let body = URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
            SaltsealError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::ArmoringDecode,
                format!("base64 decoding failed: {}", e),
                e,
            )
        })?;
        Ok(body)
    } else if armored.starts_with(label.family()) {
        Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringFromFuture,
            format!(
                "input claims to be a {}, but not a version we support",
                label.noun()
            ),
        ))
    } else {
        Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            format!("input unrecognized as {}", label.noun()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes() {
        let bytes = b"";
        let armored = wrap(bytes);
        assert_eq!(armored, "saltseal1:");
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, &unwrapped[..]);
    }

    #[test]
    fn test_simple_string() {
        let bytes = b"test";
        let armored = wrap(bytes);
        assert_eq!(armored, "saltseal1:dGVzdA");
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, &unwrapped[..]);
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let armored = wrap(&bytes);

        assert_eq!(
            armored,
            "saltseal1:AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0-P0BBQkNERUZHSElKS0xNTk9QUVJTVFVWV1hZWltcXV5fYGFiY2RlZmdoaWprbG1ub3BxcnN0dXZ3eHl6e3x9fn-AgYKDhIWGh4iJiouMjY6PkJGSk5SVlpeYmZqbnJ2en6ChoqOkpaanqKmqq6ytrq-wsbKztLW2t7i5uru8vb6_wMHCw8TFxsfIycrLzM3Oz9DR0tPU1dbX2Nna29zd3t_g4eLj5OXm5-jp6uvs7e7v8PHy8_T19vf4-fr7_P3-_w"
        );

        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, unwrapped);
    }

    #[test]
    fn test_truncated_input() {
        let err = unwrap("").expect_err("expected truncated input error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
    }

    #[test]
    fn test_wrong_version() {
        let err = unwrap("saltseal999999:...").expect_err("expected unsupported version error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringFromFuture));
    }

    #[test]
    fn test_not_saltseal() {
        let err = unwrap("something not looking like saltseal data")
            .expect_err("expected non-saltseal error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
    }

    #[test]
    fn test_bad_base64() {
        let err = unwrap("saltseal1:bad$$").expect_err("expected base64 decode error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringDecode));
    }

    #[test]
    fn test_url_safe_no_whitespace() {
        let bytes = vec![0xFFu8; 100];
        let armored = wrap(&bytes);

        for c in ['+', '/', '=', ' ', '\n', '\t'] {
            assert!(!armored.contains(c), "armored output contains {:?}", c);
        }
    }

    #[test]
    fn test_key_roundtrip() {
        let key = Key::from([0x24u8; KEY_SIZE]);
        let armored = wrap_key(&key);
        assert!(armored.starts_with("saltkey1:"));

        let restored = unwrap_key(&format!("  {}\n", *armored)).unwrap();
        assert_eq!(restored, key);
    }

    #[test]
    fn test_key_and_envelope_not_confused() {
        let key = Key::from([1u8; KEY_SIZE]);
        let err = unwrap(&wrap_key(&key)).expect_err("key is not an envelope");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));

        let err = unwrap_key(&wrap(&[0u8; KEY_SIZE])).expect_err("envelope is not a key");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
    }

    #[test]
    fn test_key_wrong_length() {
        let armored = wrap_labeled(Label::Key, &[0u8; 16]);
        let err = unwrap_key(&armored).expect_err("expected size error");
        assert_eq!(err.kind, Some(ErrorKind::InvalidSize));
    }

    #[test]
    fn test_key_from_future() {
        let err = unwrap_key("saltkey2:AAAA").expect_err("expected unsupported version error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringFromFuture));
    }
}
