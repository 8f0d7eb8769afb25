//! Gateway liveness probe.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{read_reply, PushClient};
use crate::endpoint::ping_url;
use crate::error::PushError;

/// Outcome of a single probe. Every failure class is its own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingResult {
    /// Gateway answered with a 2xx-family code.
    Ok {
        latency_ms: u64,
        code: i64,
        message: String,
    },
    /// Gateway answered with some other code.
    GatewayFailure { code: i64, message: String },
    /// No answer before the deadline.
    Timeout,
    /// The caller gave up first.
    Cancelled,
    /// DNS failure, refused connection and the like.
    Network(String),
    /// The gateway answered 2xx with something other than `{code, message}`.
    InvalidBody(String),
    /// `api_url` could not be parsed; nothing was sent.
    InvalidEndpoint(String),
}

impl PingResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, PingResult::Ok { .. })
    }
}

impl PushClient {
    /// Probes `<origin>/ping` of the gateway behind `api_url`.
    pub async fn ping(&self, api_url: &str) -> PingResult {
        self.ping_with_cancel(api_url, &CancellationToken::new()).await
    }

    /// Like [`PushClient::ping`], abandoned as soon as `cancel` fires.
    ///
    /// The deadline is a child of `cancel` armed by a timer. Whichever fires
    /// first drops the in-flight request, which releases its connection.
    pub async fn ping_with_cancel(&self, api_url: &str, cancel: &CancellationToken) -> PingResult {
        let url = match ping_url(api_url) {
            Ok(url) => url,
            Err(e) => return PingResult::InvalidEndpoint(e.to_string()),
        };

        let deadline = cancel.child_token();
        let timer = tokio::spawn({
            let deadline = deadline.clone();
            let timeout = self.config().ping_timeout();
            async move {
                tokio::time::sleep(timeout).await;
                deadline.cancel();
            }
        });

        let started = Instant::now();
        debug!(url = %url, "pinging gateway");
        let outcome = tokio::select! {
            biased;
            () = deadline.cancelled() => None,
            reply = async {
                let response = self.http().get(&url).send().await?;
                read_reply(response).await
            } => Some(reply),
        };
        timer.abort();

        let result = match outcome {
            None if cancel.is_cancelled() => PingResult::Cancelled,
            None => PingResult::Timeout,
            Some(Ok(reply)) if reply.is_success() => PingResult::Ok {
                latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                code: reply.code,
                message: reply.message,
            },
            Some(Ok(reply)) => PingResult::GatewayFailure {
                code: reply.code,
                message: reply.message,
            },
            Some(Err(e)) => e.into(),
        };

        match &result {
            PingResult::Ok { latency_ms, .. } => debug!(url = %url, latency_ms, "gateway alive"),
            other => warn!(url = %url, result = ?other, "ping failed"),
        }
        result
    }
}

impl From<PushError> for PingResult {
    fn from(err: PushError) -> Self {
        match err {
            PushError::Gateway { code, message } => PingResult::GatewayFailure { code, message },
            PushError::InvalidBody(msg) => PingResult::InvalidBody(msg),
            PushError::Timeout => PingResult::Timeout,
            PushError::InvalidEndpoint(msg) => PingResult::InvalidEndpoint(msg),
            other => PingResult::Network(other.to_string()),
        }
    }
}
