//! Device book persistence for the NoLet command line.
//!
//! The book is a single JSON file holding the registered devices, the default
//! device and the user's encryption and sound preferences.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nolet_crypto::EncryptionConfig;
use nolet_gateway::resolve_default;
use nolet_types::{Device, DeviceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything the CLI remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceBook {
    pub devices: Vec<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_device: Option<DeviceId>,
    /// Applied to devices that carry no encryption settings of their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

impl DeviceBook {
    /// Reads the book at `path`. A missing file is an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No device book at {:?}, starting empty", path);
            return Ok(Self::default());
        }
        let bytes = fs::read(path).context("Failed to read device book")?;
        serde_json::from_slice(&bytes).context("Failed to parse device book")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to encode device book")?;
        fs::write(path, json).context("Failed to write device book")
    }

    /// Stores the shared encryption settings, valid or not.
    ///
    /// An invalid key is kept so it can be corrected later; pushes to devices
    /// using it are refused until then. Returns whether the key is valid.
    pub fn set_encryption(&mut self, encryption: EncryptionConfig) -> bool {
        let valid = match encryption.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Encryption key is invalid ({}); pushes will be refused until it is fixed", e);
                false
            }
        };
        self.encryption = Some(encryption);
        valid
    }

    /// Looks a device up by id or, failing that, by alias.
    pub fn find(&self, selector: &str) -> Option<&Device> {
        match DeviceId::parse(selector) {
            Ok(id) => self.devices.iter().find(|d| d.id == id),
            Err(_) => self.devices.iter().find(|d| d.alias == selector),
        }
    }

    pub fn default_device(&self) -> Option<&Device> {
        resolve_default(&self.devices, self.default_device)
    }

    /// Resolves the devices a push goes to, with book-level encryption filled in.
    ///
    /// `all` wins over `selectors`; no selectors means the default device.
    pub fn targets(&self, selectors: &[String], all: bool) -> Result<Vec<Device>> {
        let picked: Vec<&Device> = if all {
            self.devices.iter().collect()
        } else if selectors.is_empty() {
            self.default_device().into_iter().collect()
        } else {
            selectors
                .iter()
                .map(|s| self.find(s).with_context(|| format!("Unknown device: {s}")))
                .collect::<Result<_>>()?
        };
        if picked.is_empty() {
            bail!("No devices registered");
        }
        Ok(picked.into_iter().map(|d| self.effective(d)).collect())
    }

    fn effective(&self, device: &Device) -> Device {
        match (&device.encryption, &self.encryption) {
            (None, Some(shared)) => device.with_encryption(Some(shared.clone())),
            _ => device.clone(),
        }
    }
}
