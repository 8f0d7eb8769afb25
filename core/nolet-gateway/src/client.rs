//! HTTP client for push gateways.

use futures::future::join_all;
use nolet_types::{Device, DeviceId, PushId};
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::endpoint::parse_endpoint;
use crate::error::{PushError, PushResult};
use crate::payload::{build_request_body, parse_response, PushContent, PushResponse};

/// Sends pushes and liveness probes to gateways.
///
/// Wraps a single `reqwest::Client`, so clones share one connection pool.
/// Holds no other state; calls for different devices are independent.
#[derive(Debug, Clone)]
pub struct PushClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

/// Result of one device's share of a fan-out.
#[derive(Debug)]
pub struct DeviceOutcome {
    pub device_id: DeviceId,
    pub alias: String,
    pub result: PushResult<PushResponse>,
}

impl PushClient {
    pub fn new(config: GatewayConfig) -> PushResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Uses a caller-built HTTP client. `config` still governs ping deadlines.
    pub fn with_http(http: reqwest::Client, config: GatewayConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Delivers `content` to one device.
    ///
    /// Succeeds only when the request completed and the gateway's `code` is in
    /// the 2xx family. Encrypted devices have their key checked before the
    /// request is built, so a bad key never produces network traffic.
    pub async fn send(
        &self,
        device: &Device,
        content: &PushContent,
        id: &PushId,
    ) -> PushResult<PushResponse> {
        let url = parse_endpoint(&device.api_url)?;
        let body = build_request_body(id, content, device.encryption.as_ref())
            .inspect_err(|e| warn!(device_id = %device.id, error = %e, "push refused"))?;

        let mut request = self.http.post(url).json(&body);
        if let Some(value) = device.authorization_header() {
            request = request.header(AUTHORIZATION, value);
        }

        debug!(
            device_id = %device.id,
            push_id = %id,
            encrypted = device.encryption.is_some() || content.ciphertext,
            "sending push"
        );

        let result = match request.send().await {
            Ok(response) => read_reply(response).await.and_then(PushResponse::into_result),
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(reply) => info!(device_id = %device.id, push_id = %id, code = reply.code, "push delivered"),
            Err(e) => warn!(device_id = %device.id, push_id = %id, error = %e, "push failed"),
        }
        result
    }

    /// Delivers `content` to every device concurrently under one `id`.
    ///
    /// Outcomes come back in the order of `devices`; a failing device does not
    /// affect the others.
    pub async fn send_fanout(
        &self,
        devices: &[Device],
        content: &PushContent,
        id: &PushId,
    ) -> Vec<DeviceOutcome> {
        join_all(devices.iter().map(|device| async move {
            DeviceOutcome {
                device_id: device.id,
                alias: device.alias.clone(),
                result: self.send(device, content, id).await,
            }
        }))
        .await
    }
}

/// Reads a `{code, message}` reply.
///
/// On a 2xx status the body decides: a body that does not parse is
/// [`PushError::InvalidBody`]. Any other status is a gateway failure under the
/// HTTP status, carrying the reply's message or else the raw text.
pub(crate) async fn read_reply(response: reqwest::Response) -> PushResult<PushResponse> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let parsed = parse_response(&bytes);
    if status.is_success() {
        return parsed;
    }
    let message = match parsed {
        Ok(reply) if !reply.message.is_empty() => reply.message,
        _ => String::from_utf8_lossy(&bytes).into_owned(),
    };
    Err(PushError::Gateway {
        code: i64::from(status.as_u16()),
        message,
    })
}
