//! Secret-key authenticated encryption envelopes
//!
//! Messages are sealed with NaCl secretbox (XSalsa20Poly1305) under a
//! fresh random nonce. The result is offered in three shapes carrying the
//! same information:
//!
//! - combined: `nonce(24) | mac(16) | ciphertext(len(message))`
//! - sealed: `mac | ciphertext` with the nonce returned separately
//! - detached: ciphertext, nonce and mac as independent buffers
//!
//! The combined layout has fixed offsets, no length prefix and no version
//! byte. Ciphertext length always equals plaintext length.
//!
//! All shapes are produced by one detached seal and consumed by one
//! detached open, so every pairing round-trips identically.

use crate::constant_time;
use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use crate::random;
use crypto_secretbox::XSalsa20Poly1305;
use crypto_secretbox::aead::generic_array::GenericArray;
use crypto_secretbox::aead::{AeadInPlace, KeyInit};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a secret key in bytes
pub const KEY_SIZE: usize = 32;

/// Length of a nonce in bytes
pub const NONCE_SIZE: usize = 24;

/// Length of a Poly1305 authentication tag in bytes
pub const MAC_SIZE: usize = 16;

const DECRYPT_FAILED_MSG: &str = "corrupt input, tampered-with data, or wrong key";

/// A secretbox key, wiped from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Generate a fresh random key. Keys are never cached or derived.
    pub fn generate() -> Result<Self> {
        let mut key = Self([0u8; KEY_SIZE]);
        random::fill(&mut key.0)?;
        Ok(key)
    }

    /// Create a key from a slice, checking that the length is correct.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_len("key", bytes, KEY_SIZE)?;
        let mut key = Self([0u8; KEY_SIZE]);
        key.0.copy_from_slice(bytes);
        Ok(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        constant_time::equals(&self.0, &other.0)
    }
}

impl Eq for Key {}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for Key {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// A single-use nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a random nonce. Callers never pick nonces for encryption.
    pub fn generate() -> Result<Self> {
        let bytes = random::bytes(NONCE_SIZE)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_len("nonce", bytes, NONCE_SIZE)?;
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(bytes);
        Ok(Self(nonce))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A Poly1305 authentication tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mac([u8; MAC_SIZE]);

impl Mac {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_len("mac", bytes, MAC_SIZE)?;
        let mut mac = [0u8; MAC_SIZE];
        mac.copy_from_slice(bytes);
        Ok(Self(mac))
    }

    pub fn as_bytes(&self) -> &[u8; MAC_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `mac | ciphertext` with the nonce kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub mac_ciphertext: Vec<u8>,
    pub nonce: Nonce,
}

impl SealedBox {
    /// Prepend the nonce, producing the combined wire format.
    pub fn into_combined(self) -> Vec<u8> {
        let mut combined = Vec::with_capacity(NONCE_SIZE + self.mac_ciphertext.len());
        combined.extend_from_slice(self.nonce.as_bytes());
        combined.extend_from_slice(&self.mac_ciphertext);
        combined
    }
}

/// Ciphertext, nonce and mac as independent buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedBox {
    pub ciphertext: Vec<u8>,
    pub nonce: Nonce,
    pub mac: Mac,
}

impl DetachedBox {
    /// Interleave the mac in front of the ciphertext.
    pub fn into_sealed(self) -> SealedBox {
        let mut mac_ciphertext = Vec::with_capacity(MAC_SIZE + self.ciphertext.len());
        mac_ciphertext.extend_from_slice(self.mac.as_bytes());
        mac_ciphertext.extend_from_slice(&self.ciphertext);
        SealedBox {
            mac_ciphertext,
            nonce: self.nonce,
        }
    }

    pub fn into_combined(self) -> Vec<u8> {
        self.into_sealed().into_combined()
    }
}

/// Encrypt under a freshly generated key.
///
/// Returns the combined envelope and the key; the key is never retained.
pub fn encrypt_with_new_key(message: &[u8]) -> Result<(Vec<u8>, Key)> {
    let key = Key::generate()?;
    let sealed = encrypt_split(message, key.as_ref())?;
    Ok((sealed.into_combined(), key))
}

/// Encrypt into the combined `nonce | mac | ciphertext` format.
pub fn encrypt(message: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    Ok(encrypt_split(message, key)?.into_combined())
}

/// Encrypt into `mac | ciphertext`, returning the nonce separately.
pub fn encrypt_split(message: &[u8], key: &[u8]) -> Result<SealedBox> {
    Ok(encrypt_detached(message, key)?.into_sealed())
}

/// Encrypt into independent ciphertext, nonce and mac buffers.
pub fn encrypt_detached(message: &[u8], key: &[u8]) -> Result<DetachedBox> {
    let cipher = cipher_for(key)?;
    let nonce = Nonce::generate()?;

    let mut ciphertext = message.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(
            GenericArray::from_slice(nonce.as_ref()),
            b"",
            &mut ciphertext,
        )
        .map_err(|e| {
            SaltsealError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::EncryptFailed,
                format!("secretbox seal failed: {}", e),
            )
        })?;

    Ok(DetachedBox {
        ciphertext,
        nonce,
        mac: Mac::from_slice(&tag)?,
    })
}

/// Decrypt a combined `nonce | mac | ciphertext` envelope.
pub fn decrypt(combined: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if combined.len() < NONCE_SIZE + MAC_SIZE {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidSize,
            format!(
                "envelope of {} bytes is shorter than nonce and mac ({} bytes)",
                combined.len(),
                NONCE_SIZE + MAC_SIZE
            ),
        ));
    }
    let (nonce, mac_ciphertext) = combined.split_at(NONCE_SIZE);
    decrypt_split(mac_ciphertext, key, nonce)
}

/// Decrypt `mac | ciphertext` using a separately transmitted nonce.
pub fn decrypt_split(mac_ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    if mac_ciphertext.len() < MAC_SIZE {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidSize,
            format!(
                "sealed box of {} bytes is shorter than a mac ({} bytes)",
                mac_ciphertext.len(),
                MAC_SIZE
            ),
        ));
    }
    let (mac, ciphertext) = mac_ciphertext.split_at(MAC_SIZE);
    decrypt_detached(ciphertext, key, nonce, mac)
}

/// Decrypt a detached ciphertext given its nonce and mac.
///
/// No plaintext is returned unless the mac verifies.
pub fn decrypt_detached(ciphertext: &[u8], key: &[u8], nonce: &[u8], mac: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    check_len("nonce", nonce, NONCE_SIZE)?;
    check_len("mac", mac, MAC_SIZE)?;

    let mut plaintext = ciphertext.to_vec();
    if cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut plaintext,
            GenericArray::from_slice(mac),
        )
        .is_err()
    {
        plaintext.zeroize();
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptFailed,
            DECRYPT_FAILED_MSG,
        ));
    }

    Ok(plaintext)
}

fn cipher_for(key: &[u8]) -> Result<XSalsa20Poly1305> {
    check_len("key", key, KEY_SIZE)?;
    Ok(XSalsa20Poly1305::new(GenericArray::from_slice(key)))
}

fn check_len(what: &str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidSize,
            format!(
                "{} must be exactly {} bytes, got {}",
                what,
                expected,
                bytes.len()
            ),
        ));
    }
    Ok(())
}
