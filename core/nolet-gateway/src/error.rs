//! Gateway error types.

use nolet_crypto::CryptoError;
use nolet_types::DeviceId;
use thiserror::Error;

/// Result type for dispatch operations.
pub type PushResult<T> = Result<T, PushError>;

/// Errors that can occur while dispatching a push.
///
/// Three families, see [`PushError::is_input`], [`PushError::is_security`]
/// and [`PushError::is_transport`]. Gateway messages are carried verbatim;
/// translating them is the caller's concern.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Encryption is configured but the key is malformed. Raised before any
    /// request is made.
    #[error("encryption key rejected: {0}")]
    InvalidEncryptionKey(#[source] CryptoError),

    #[error("encryption failed: {0}")]
    Crypto(#[source] CryptoError),

    /// The gateway answered with a non-success code.
    #[error("[{code}] {message}")]
    Gateway { code: i64, message: String },

    /// The gateway answered 2xx but the body is not `{code, message}`.
    #[error("invalid gateway response: {0}")]
    InvalidBody(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PushError {
    /// Recoverable by correcting user input; never retried automatically.
    pub fn is_input(&self) -> bool {
        matches!(self, PushError::InvalidEndpoint(_))
    }

    /// Refused before anything left the machine.
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            PushError::InvalidEncryptionKey(_) | PushError::Crypto(_)
        )
    }

    /// Failure reported by the network or the gateway; the caller may retry.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PushError::Gateway { .. }
                | PushError::InvalidBody(_)
                | PushError::Timeout
                | PushError::Network(_)
        )
    }
}

impl From<CryptoError> for PushError {
    fn from(err: CryptoError) -> Self {
        if err.is_key_error() {
            PushError::InvalidEncryptionKey(err)
        } else {
            PushError::Crypto(err)
        }
    }
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PushError::Timeout
        } else {
            PushError::Network(err.to_string())
        }
    }
}

/// Errors raised while turning form input into a device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceInputError {
    #[error("device alias must not be empty")]
    EmptyAlias,

    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("endpoint already registered: {0}")]
    DuplicateEndpoint(String),

    #[error("device not found: {0}")]
    NotFound(DeviceId),
}

impl DeviceInputError {
    /// Stable key for the translation layer.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            DeviceInputError::EmptyAlias => "device.alias_required",
            DeviceInputError::EmptyEndpoint => "device.api_url_required",
            DeviceInputError::InvalidEndpoint(_) => "device.api_url_invalid",
            DeviceInputError::DuplicateEndpoint(_) => "device.api_url_duplicate",
            DeviceInputError::NotFound(_) => "device.not_found",
        }
    }
}
