//! Encryption configuration and key validation.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "AES128")]
    Aes128,
    #[serde(rename = "AES192")]
    Aes192,
    #[serde(rename = "AES256")]
    Aes256,
}

impl Algorithm {
    /// Required key length in characters (equal to bytes, keys are ASCII).
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Wire name sent to the gateway.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes128 => "AES128",
            Self::Aes192 => "AES192",
            Self::Aes256 => "AES256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block cipher mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Gcm,
    Cbc,
}

impl Mode {
    /// Length of the IV string for this mode.
    #[must_use]
    pub const fn iv_len(self) -> usize {
        match self {
            Self::Gcm => 12,
            Self::Cbc => 16,
        }
    }

    /// Wire name sent to the gateway.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcm => "GCM",
            Self::Cbc => "CBC",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-device encryption settings.
///
/// The key is wiped from memory when the config is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionConfig {
    #[zeroize(skip)]
    pub algorithm: Algorithm,
    #[zeroize(skip)]
    #[serde(default)]
    pub mode: Mode,
    pub key: String,
}

impl EncryptionConfig {
    /// Creates a config. The key is not validated here.
    pub fn new(algorithm: Algorithm, mode: Mode, key: impl Into<String>) -> Self {
        Self {
            algorithm,
            mode,
            key: key.into(),
        }
    }

    /// Returns true if the key matches `^[A-Za-z0-9]{N}$` for the algorithm.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks the key against the algorithm, reporting what is wrong.
    pub fn validate(&self) -> CryptoResult<()> {
        let expected = self.algorithm.key_len();
        // chars, not bytes: a multi-byte key must not pass on byte count
        let actual = self.key.chars().count();
        if actual != expected {
            return Err(CryptoError::InvalidKeyLength { expected, actual });
        }
        if !self.key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CryptoError::InvalidKeyCharset);
        }
        Ok(())
    }

    pub(crate) fn key_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("algorithm", &self.algorithm)
            .field("mode", &self.mode)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Pure length/charset check of a config's key.
#[must_use]
pub fn is_encryption_key_valid(config: &EncryptionConfig) -> bool {
    config.is_valid()
}
