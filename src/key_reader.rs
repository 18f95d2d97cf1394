//! Key reading functionality

use crate::error::{ErrorCategory, ErrorKind, Result, SaltsealError};
use crate::secretbox::Key;
use crate::varmor;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Trait for obtaining an armored key from various sources
pub trait KeyReader {
    /// Read and validate a key.
    fn read_key(&mut self) -> Result<Key>;
}

/// Returns a fixed key (for testing and embedding)
pub struct ConstantKeyReader {
    key: Key,
}

impl ConstantKeyReader {
    pub fn new(key: Key) -> Self {
        Self { key }
    }
}

impl KeyReader for ConstantKeyReader {
    fn read_key(&mut self) -> Result<Key> {
        Ok(self.key.clone())
    }
}

/// Reads an armored key from any io::Read source
pub struct ReaderKeyReader {
    reader: Box<dyn Read>,
}

impl ReaderKeyReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeyReader for ReaderKeyReader {
    fn read_key(&mut self) -> Result<Key> {
        let mut data = Zeroizing::new(String::new());
        self.reader.read_to_string(&mut data).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                SaltsealError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::ArmoringInvalid,
                    "key input is not valid UTF-8",
                    e,
                )
            } else {
                SaltsealError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::KeyUnavailable,
                    format!("error reading key: {}", e),
                    e,
                )
            }
        })?;
        varmor::unwrap_key(&data).map_err(|e| e.with_context("invalid key input"))
    }
}

/// Reads an armored key from a file
pub struct FileKeyReader {
    path: PathBuf,
}

impl FileKeyReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl KeyReader for FileKeyReader {
    fn read_key(&mut self) -> Result<Key> {
        let data = fs::read_to_string(&self.path).map(Zeroizing::new).map_err(|e| {
            SaltsealError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                format!("failed to read key from {}", self.path.display()),
                e,
            )
        })?;
        varmor::unwrap_key(&data)
            .map_err(|e| e.with_context(format!("invalid key file {}", self.path.display())))
    }
}
