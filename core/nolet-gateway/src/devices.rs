//! Turning form input into devices and managing the device list.
//!
//! The list itself is owned by the caller. Every operation here takes a slice
//! and returns a new `Vec`, so persistence stays a single write of the result.

use nolet_types::{build_basic_auth, Device, DeviceId};
use tracing::debug;

use crate::endpoint::{canonicalize_with_host, is_valid_endpoint, FIRST_PARTY_HOST};
use crate::error::DeviceInputError;

/// Raw values from the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDraft {
    pub alias: String,
    pub api_url: String,
    pub user: String,
    pub pwd: String,
}

impl DeviceDraft {
    pub fn new(alias: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_basic_auth(mut self, user: impl Into<String>, pwd: impl Into<String>) -> Self {
        self.user = user.into();
        self.pwd = pwd.into();
        self
    }

    /// Validates the draft against the default first-party host.
    ///
    /// With `existing` set the result keeps that device's id and encryption
    /// settings; otherwise a fresh id is issued.
    pub fn into_device(self, existing: Option<&Device>) -> Result<Device, DeviceInputError> {
        self.into_device_with_host(existing, FIRST_PARTY_HOST)
    }

    pub fn into_device_with_host(
        self,
        existing: Option<&Device>,
        host: &str,
    ) -> Result<Device, DeviceInputError> {
        let alias = self.alias.trim();
        if alias.is_empty() {
            return Err(DeviceInputError::EmptyAlias);
        }
        if self.api_url.trim().is_empty() {
            return Err(DeviceInputError::EmptyEndpoint);
        }

        let api_url = canonicalize_with_host(&self.api_url, host);
        if !is_valid_endpoint(&api_url) {
            return Err(DeviceInputError::InvalidEndpoint(api_url));
        }

        Ok(Device {
            id: existing.map_or_else(DeviceId::new, |d| d.id),
            alias: alias.to_string(),
            api_url,
            authorization: build_basic_auth(&self.user, &self.pwd),
            encryption: existing.and_then(|d| d.encryption.clone()),
        })
    }
}

/// Appends `device`, refusing an endpoint that is already registered.
pub fn add_device(devices: &[Device], device: Device) -> Result<Vec<Device>, DeviceInputError> {
    if devices.iter().any(|d| d.api_url == device.api_url) {
        return Err(DeviceInputError::DuplicateEndpoint(device.api_url));
    }
    debug!(device_id = %device.id, alias = %device.alias, "adding device");
    let mut next = devices.to_vec();
    next.push(device);
    Ok(next)
}

/// Replaces the device with `id`, keeping its position in the list.
///
/// The stored id always survives the edit, whatever id `device` carries.
pub fn edit_device(
    devices: &[Device],
    id: DeviceId,
    mut device: Device,
) -> Result<Vec<Device>, DeviceInputError> {
    let index = devices
        .iter()
        .position(|d| d.id == id)
        .ok_or(DeviceInputError::NotFound(id))?;
    if devices
        .iter()
        .any(|d| d.id != id && d.api_url == device.api_url)
    {
        return Err(DeviceInputError::DuplicateEndpoint(device.api_url));
    }
    device.id = id;
    let mut next = devices.to_vec();
    next[index] = device;
    Ok(next)
}

/// Drops the device with `id`. Unknown ids leave the list unchanged.
pub fn remove_device(devices: &[Device], id: DeviceId) -> Vec<Device> {
    devices.iter().filter(|d| d.id != id).cloned().collect()
}

/// The default device, or the first one when the default is unset or gone.
pub fn resolve_default(devices: &[Device], default_id: Option<DeviceId>) -> Option<&Device> {
    default_id
        .and_then(|id| devices.iter().find(|d| d.id == id))
        .or_else(|| devices.first())
}
