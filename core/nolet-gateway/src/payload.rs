//! Push content and the gateway wire format.

use nolet_crypto::{Algorithm, EncryptionConfig, Mode};
use nolet_types::PushId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PushError, PushResult};

/// What the user wants delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushContent {
    pub body: String,
    pub title: String,
    pub url: Option<String>,
    pub sound: Option<String>,
    /// Favicon of the originating page. Best-effort; never required.
    pub icon: Option<String>,
    /// `body` is already ciphertext produced by the caller.
    pub ciphertext: bool,
    /// IV that goes with a caller-supplied ciphertext.
    pub iv: Option<String>,
}

impl PushContent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Marks `body` as caller-encrypted; it is forwarded without re-encryption.
    #[must_use]
    pub fn pre_encrypted(mut self, iv: Option<String>) -> Self {
        self.ciphertext = true;
        self.iv = iv;
        self
    }
}

#[derive(Debug, Serialize)]
struct PlainMessage<'a> {
    id: &'a PushId,
    body: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
}

/// Fields that travel inside the ciphertext.
#[derive(Debug, Serialize)]
struct SealedFields<'a> {
    body: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EncryptedMessage<'a> {
    id: &'a PushId,
    ciphertext: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    iv: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    algorithm: Option<Algorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
}

/// Builds the JSON request body for one device.
///
/// With `encryption` set the key is validated before anything is encrypted,
/// and an invalid key fails with [`PushError::InvalidEncryptionKey`]. The key
/// itself never appears in the output.
pub fn build_request_body(
    id: &PushId,
    content: &PushContent,
    encryption: Option<&EncryptionConfig>,
) -> PushResult<serde_json::Value> {
    if content.ciphertext {
        let message = EncryptedMessage {
            id,
            ciphertext: &content.body,
            iv: content.iv.as_deref(),
            algorithm: None,
            mode: None,
            sound: content.sound.as_deref(),
        };
        return Ok(serde_json::to_value(message)?);
    }

    match encryption {
        None => Ok(serde_json::to_value(PlainMessage {
            id,
            body: &content.body,
            title: &content.title,
            url: content.url.as_deref(),
            sound: content.sound.as_deref(),
            icon: content.icon.as_deref(),
        })?),
        Some(config) => {
            config.validate().map_err(PushError::InvalidEncryptionKey)?;
            let sealed = nolet_crypto::encrypt_json(
                config,
                &SealedFields {
                    body: &content.body,
                    title: &content.title,
                    url: content.url.as_deref(),
                    icon: content.icon.as_deref(),
                },
            )?;
            Ok(serde_json::to_value(EncryptedMessage {
                id,
                ciphertext: &sealed.ciphertext,
                iv: Some(sealed.iv.as_str()),
                algorithm: Some(config.algorithm),
                mode: Some(config.mode),
                sound: content.sound.as_deref(),
            })?)
        }
    }
}

/// Gateway reply `{code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    #[serde(deserialize_with = "code_from_number_or_string")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl PushResponse {
    /// 2xx-family codes are success.
    pub fn is_success(&self) -> bool {
        is_success_code(self.code)
    }

    /// Turns a failure reply into [`PushError::Gateway`], message untouched.
    pub fn into_result(self) -> PushResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PushError::Gateway {
                code: self.code,
                message: self.message,
            })
        }
    }
}

pub fn is_success_code(code: i64) -> bool {
    (200..=299).contains(&code)
}

/// Parses a reply body; anything other than `{code, message}` is
/// [`PushError::InvalidBody`].
pub fn parse_response(body: &[u8]) -> PushResult<PushResponse> {
    serde_json::from_slice(body).map_err(|e| PushError::InvalidBody(e.to_string()))
}

fn code_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Int(i64),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Int(n) => Ok(n),
        Code::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
