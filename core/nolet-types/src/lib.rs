//! Core type definitions for NoLet.
//!
//! This crate defines the plain data shared by every layer of the push core:
//! - Device and push identifiers (random UUID v4)
//! - The registered push endpoint (`Device`) and its Basic-Auth credential
//!
//! Endpoint canonicalization and network dispatch live in `nolet-gateway`;
//! encryption configuration lives in `nolet-crypto`.

mod auth;
mod device;
mod ids;

pub use auth::{build_basic_auth, AuthKind, Authorization};
pub use device::Device;
pub use ids::{generate_id, DeviceId, PushId};
