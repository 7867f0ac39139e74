//! # Error Types
//!
//! Storage errors shared by every subsystem that persists through
//! [`crate::store::KeyValueStore`].

use thiserror::Error;

/// Errors raised by a key-value store backend or the record codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Stored bytes could not be decoded, or a record could not be encoded.
    #[error("KV store codec error: {message}")]
    CodecError { message: String },
}

impl KVStoreError {
    /// Wrap a codec failure.
    pub fn codec(err: impl std::fmt::Display) -> Self {
        KVStoreError::CodecError {
            message: err.to_string(),
        }
    }
}
