//! Push payload encryption for NoLet.
//!
//! Devices may opt into symmetric end-to-end encryption. The gateway only
//! ever sees ciphertext, the IV and the algorithm/mode names; the key stays
//! on the sending side and on the receiving device.
//!
//! # Key format
//!
//! Keys are alphanumeric strings whose length is fixed by the algorithm
//! (16, 24 or 32 characters for AES-128/192/256). The ASCII bytes of the key
//! are the raw AES key. Configurations with a malformed key can be stored so
//! the user can fix them, but every encryption entry point re-validates and
//! refuses to run with them.
//!
//! # Modes
//!
//! - `GCM`: authenticated, 12-character IV.
//! - `CBC`: PKCS#7 padded, 16-character IV.
//!
//! IVs are random alphanumeric strings whose ASCII bytes are the nonce, so
//! they travel in JSON without further encoding. Ciphertext is base64.

mod cipher;
mod config;
mod error;

pub use cipher::{decrypt, decrypt_string, encrypt, encrypt_json, encrypt_with_iv, generate_iv, EncryptedPayload};
pub use config::{is_encryption_key_valid, Algorithm, EncryptionConfig, Mode};
pub use error::{CryptoError, CryptoResult};
