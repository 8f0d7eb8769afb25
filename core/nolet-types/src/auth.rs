//! HTTP Basic-Auth credentials for self-hosted gateways.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Authorization scheme. Only Basic is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    Basic,
}

/// A device's stored credential.
///
/// `value` is the complete `Authorization` header value, computed once when
/// the credential is built. Changing `user` or `pwd` requires building a new
/// credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(rename = "type")]
    pub kind: AuthKind,
    pub user: String,
    pub pwd: String,
    pub value: String,
}

impl Authorization {
    /// Returns the header value to attach verbatim to requests.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.value
    }
}

/// Builds a Basic-Auth credential from form input.
///
/// Returns `None` when either field is blank after trimming: authentication
/// is opt-in and a half-filled form must not yield a broken credential.
#[must_use]
pub fn build_basic_auth(user: &str, pwd: &str) -> Option<Authorization> {
    let user = user.trim();
    let pwd = pwd.trim();
    if user.is_empty() || pwd.is_empty() {
        return None;
    }

    let encoded = BASE64.encode(format!("{user}:{pwd}"));
    Some(Authorization {
        kind: AuthKind::Basic,
        user: user.to_string(),
        pwd: pwd.to_string(),
        value: format!("Basic {encoded}"),
    })
}
