//! The registered push endpoint.

use crate::auth::Authorization;
use crate::ids::DeviceId;
use nolet_crypto::EncryptionConfig;
use serde::{Deserialize, Serialize};

/// A push endpoint plus its optional credential and encryption settings.
///
/// `api_url` always holds the canonical form produced when the device was
/// added or last edited; raw user input is never stored. Field names
/// serialize in the extension's camelCase layout (`apiURL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub alias: String,
    #[serde(rename = "apiURL")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionConfig>,
}

impl Device {
    /// Returns true when both the alias and the endpoint are non-empty.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.alias.trim().is_empty() && !self.api_url.trim().is_empty()
    }

    /// Returns the `Authorization` header value, if the device has one.
    #[must_use]
    pub fn authorization_header(&self) -> Option<&str> {
        self.authorization.as_ref().map(Authorization::header_value)
    }

    /// Returns a copy of this device with `encryption` replaced.
    #[must_use]
    pub fn with_encryption(&self, encryption: Option<EncryptionConfig>) -> Self {
        Self {
            encryption,
            ..self.clone()
        }
    }
}
