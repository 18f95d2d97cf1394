//! File encryption/decryption operations
//!
//! This module provides high-level file operations for generating keys and
//! encrypting, decrypting and updating files using armored saltseal envelopes.

use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use crate::key_reader::KeyReader;
use crate::secretbox::{self, Key};
use crate::varmor;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Generate a fresh random key and write it, armored, to `output_path`.
///
/// Refuses to overwrite an existing file. The key file is created with
/// mode 0o600 on Unix systems.
pub fn generate_key_file(output_path: &Path) -> Result<()> {
    let key = Key::generate()?;
    let armored = varmor::wrap_key(&key);
    write_file_secure(output_path, armored.as_bytes(), false)
        .map_err(|e| e.with_context(format!("failed to write key to {}", output_path.display())))?;
    debug!(path = %output_path.display(), "wrote new key");
    Ok(())
}

/// Encrypt a file with a key
///
/// Reads plaintext from `input_path`, encrypts it using a key from
/// `key_reader`, and writes the armored envelope to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let key = key_reader.read_key()?;
    let envelope = secretbox::encrypt(&plaintext, key.as_ref())
        .map_err(|e| e.with_context("encryption failed"))?;
    debug!(
        plaintext_len = plaintext.len(),
        envelope_len = envelope.len(),
        "sealed file contents"
    );
    let armored = varmor::wrap(&envelope);
    write_file_secure(output_path, armored.as_bytes(), true)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a file with a key
///
/// Reads an armored envelope from `input_path`, decrypts it using a key from
/// `key_reader`, and writes the plaintext to `output_path`. Nothing is
/// written unless authentication succeeds.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let plaintext = open_armored_file(input_path, key_reader)?;
    write_file_secure(output_path, &plaintext, true)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Update an encrypted file with new plaintext using the same key
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the key
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext under the validated key and a fresh nonce
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
///
/// The key validation prevents accidentally re-encrypting under a different key.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let armored_bytes = fs::read(crypt_path).map_err(|e| read_error(crypt_path, e))?;
    let armored = armored_utf8(armored_bytes, "encrypted file is not valid UTF-8")?;
    let key = key_reader.read_key()?;

    // Validate key by decrypting existing file (discard plaintext)
    let envelope = varmor::unwrap(&armored).map_err(|e| e.with_context("failed to unarmor"))?;
    secretbox::decrypt(&envelope, key.as_ref()).map_err(|e| e.with_context("failed to decrypt"))?;

    let crypt_dir = crypt_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to create tempfile", e))?;
    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_envelope = secretbox::encrypt(&new_plaintext, key.as_ref())
        .map_err(|e| e.with_context("failed to encrypt"))?;
    let new_armored = varmor::wrap(&new_envelope);

    temp_file
        .write_all(new_armored.as_bytes())
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                io_error(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", crypt_path.display()),
            e.error,
        )
    })?;
    debug!(path = %crypt_path.display(), "replaced encrypted file");
    Ok(())
}

fn open_armored_file(input_path: &Path, key_reader: &mut dyn KeyReader) -> Result<Vec<u8>> {
    let armored_bytes = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let armored = armored_utf8(armored_bytes, "input file is not valid UTF-8")?;
    let key = key_reader.read_key()?;
    let envelope = varmor::unwrap(&armored).map_err(|e| e.with_context("failed to unarmor"))?;
    secretbox::decrypt(&envelope, key.as_ref()).map_err(|e| e.with_context("failed to decrypt"))
}

fn armored_utf8(bytes: Vec<u8>, msg: &str) -> Result<String> {
    let armored = String::from_utf8(bytes).map_err(|e| {
        SaltsealError::with_kind_and_source(ErrorCategory::User, ErrorKind::ArmoringInvalid, msg, e)
    })?;
    Ok(armored.trim_end().to_owned())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8], overwrite: bool) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| io_error(ErrorCategory::User, format!("failed to open {}", path.display()), e))?;
    file.write_all(contents).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to write {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> SaltsealError {
    SaltsealError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> SaltsealError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    io_error(
        category,
        format!("failed to read from {}", path.display()),
        err,
    )
}
