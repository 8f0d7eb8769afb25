//! Push gateway access for NoLet.
//!
//! This crate covers everything between a registered device and its gateway:
//! - Endpoint canonicalization and validation (pure, no I/O)
//! - Device form handling and list operations
//! - Liveness probing with a hard deadline
//! - Push dispatch, optionally encrypted, to one or many devices
//!
//! # Example
//!
//! ```no_run
//! use nolet_gateway::{canonicalize, DeviceDraft, GatewayConfig, PushClient, PushContent};
//! use nolet_types::generate_id;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! assert_eq!(
//!     canonicalize("abcdefghijklmnopqrstuv"),
//!     "https://wzs.app/abcdefghijklmnopqrstuv/"
//! );
//!
//! let device = DeviceDraft::new("phone", "abcdefghijklmnopqrstuv").into_device(None)?;
//! let client = PushClient::new(GatewayConfig::default())?;
//! client
//!     .send(&device, &PushContent::new("hello"), &generate_id())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod devices;
mod endpoint;
mod error;
mod payload;
mod ping;

pub use client::{DeviceOutcome, PushClient};
pub use config::GatewayConfig;
pub use devices::{add_device, edit_device, remove_device, resolve_default, DeviceDraft};
pub use endpoint::{
    canonicalize, canonicalize_with_host, find_device_key, is_device_key, is_first_party,
    is_valid_endpoint, parse_endpoint, ping_url, truncate_after_nth_slash, truncate_fallback,
    DEVICE_KEY_LEN, FIRST_PARTY_HOST,
};
pub use error::{DeviceInputError, PushError, PushResult};
pub use payload::{build_request_body, is_success_code, parse_response, PushContent, PushResponse};
pub use ping::PingResult;
