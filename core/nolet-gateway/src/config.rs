//! Gateway client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::endpoint::FIRST_PARTY_HOST;

/// Settings shared by every request a [`crate::PushClient`] makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Operator-run gateway host subject to device-key canonicalization.
    pub first_party_host: String,
    /// Hard upper bound for a liveness probe.
    pub ping_timeout_ms: u64,
    /// Upper bound for a single push request.
    pub request_timeout_ms: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            first_party_host: FIRST_PARTY_HOST.to_string(),
            ping_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            user_agent: concat!("nolet/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
