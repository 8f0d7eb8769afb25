//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key has the wrong number of characters for its algorithm.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key contains characters outside `[A-Za-z0-9]`.
    #[error("invalid key: only ASCII letters and digits are allowed")]
    InvalidKeyCharset,

    /// IV has the wrong length for the mode.
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    /// Returns true if the error is caused by the configured key itself.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidKeyLength { .. } | CryptoError::InvalidKeyCharset
        )
    }
}
