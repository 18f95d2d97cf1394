//! Saltseal - secret-key authenticated encryption envelopes using NaCl secretbox
//!
//! The core API lives in [`secretbox`]: messages are sealed under a key and a
//! freshly generated nonce and returned as a combined, split or detached
//! envelope. [`constant_time`], [`memory`] and [`random`] provide the
//! supporting primitives; [`varmor`], [`key_reader`] and [`file_ops`] build
//! the file tool on top.
//!
//! All operations are stateless and may be called concurrently.

#![forbid(unsafe_code)]

pub mod constant_time;
pub mod error;
pub mod file_ops;
pub mod key_reader;
pub mod memory;
pub mod random;
pub mod secretbox;
pub mod varmor;

pub use error::{ErrorCategory, ErrorKind, Result, SaltsealError};
pub use secretbox::{DetachedBox, KEY_SIZE, Key, MAC_SIZE, Mac, NONCE_SIZE, Nonce, SealedBox};
