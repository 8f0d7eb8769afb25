//! AES payload encryption in GCM or CBC mode.

use crate::config::{Algorithm, EncryptionConfig, Mode};
use crate::error::{CryptoError, CryptoResult};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Ciphertext plus the IV needed to decrypt it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Base64 of the encrypted bytes (GCM output includes the auth tag).
    pub ciphertext: String,
    /// Alphanumeric IV; its ASCII bytes are the nonce.
    pub iv: String,
}

/// Generates a random alphanumeric IV of the length `mode` requires.
pub fn generate_iv(mode: Mode) -> String {
    rand::rngs::OsRng
        .sample_iter(&Alphanumeric)
        .take(mode.iv_len())
        .map(char::from)
        .collect()
}

/// Encrypts `plaintext` with a fresh random IV.
///
/// The key is re-validated first; an invalid key is an error, never a
/// silent passthrough.
pub fn encrypt(config: &EncryptionConfig, plaintext: &[u8]) -> CryptoResult<EncryptedPayload> {
    encrypt_with_iv(config, &generate_iv(config.mode), plaintext)
}

/// Serializes `value` to JSON and encrypts it.
pub fn encrypt_json<T: Serialize>(
    config: &EncryptionConfig,
    value: &T,
) -> CryptoResult<EncryptedPayload> {
    let json = serde_json::to_vec(value)?;
    encrypt(config, &json)
}

/// Encrypts `plaintext` with a caller-chosen IV.
///
/// Reusing an IV with the same key breaks GCM; outside of tests prefer
/// [`encrypt`].
pub fn encrypt_with_iv(
    config: &EncryptionConfig,
    iv: &str,
    plaintext: &[u8],
) -> CryptoResult<EncryptedPayload> {
    config.validate()?;
    check_iv(config.mode, iv)?;

    let key = config.key_bytes();
    let iv_bytes = iv.as_bytes();
    let ciphertext = match config.mode {
        Mode::Gcm => match config.algorithm {
            Algorithm::Aes128 => gcm_encrypt::<Aes128Gcm>(key, iv_bytes, plaintext)?,
            Algorithm::Aes192 => gcm_encrypt::<Aes192Gcm>(key, iv_bytes, plaintext)?,
            Algorithm::Aes256 => gcm_encrypt::<Aes256Gcm>(key, iv_bytes, plaintext)?,
        },
        Mode::Cbc => match config.algorithm {
            Algorithm::Aes128 => Aes128CbcEnc::new_from_slices(key, iv_bytes)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Algorithm::Aes192 => Aes192CbcEnc::new_from_slices(key, iv_bytes)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Algorithm::Aes256 => Aes256CbcEnc::new_from_slices(key, iv_bytes)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        },
    };

    Ok(EncryptedPayload {
        ciphertext: STANDARD.encode(ciphertext),
        iv: iv.to_string(),
    })
}

/// Decrypts a payload produced by [`encrypt`] with the same config.
pub fn decrypt(config: &EncryptionConfig, payload: &EncryptedPayload) -> CryptoResult<Vec<u8>> {
    config.validate()?;
    check_iv(config.mode, &payload.iv)?;

    let ciphertext = STANDARD
        .decode(&payload.ciphertext)
        .map_err(|e| CryptoError::Decryption(format!("invalid base64: {}", e)))?;

    let key = config.key_bytes();
    let iv = payload.iv.as_bytes();
    match config.mode {
        Mode::Gcm => match config.algorithm {
            Algorithm::Aes128 => gcm_decrypt::<Aes128Gcm>(key, iv, &ciphertext),
            Algorithm::Aes192 => gcm_decrypt::<Aes192Gcm>(key, iv, &ciphertext),
            Algorithm::Aes256 => gcm_decrypt::<Aes256Gcm>(key, iv, &ciphertext),
        },
        Mode::Cbc => {
            let unpadded = match config.algorithm {
                Algorithm::Aes128 => Aes128CbcDec::new_from_slices(key, iv)
                    .map_err(|e| CryptoError::Decryption(e.to_string()))?
                    .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
                Algorithm::Aes192 => Aes192CbcDec::new_from_slices(key, iv)
                    .map_err(|e| CryptoError::Decryption(e.to_string()))?
                    .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
                Algorithm::Aes256 => Aes256CbcDec::new_from_slices(key, iv)
                    .map_err(|e| CryptoError::Decryption(e.to_string()))?
                    .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
            };
            unpadded.map_err(|_| {
                CryptoError::Decryption("bad padding (wrong key or tampered data)".to_string())
            })
        }
    }
}

/// Decrypts a payload and interprets it as UTF-8.
pub fn decrypt_string(config: &EncryptionConfig, payload: &EncryptedPayload) -> CryptoResult<String> {
    let plaintext = decrypt(config, payload)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {}", e)))
}

fn check_iv(mode: Mode, iv: &str) -> CryptoResult<()> {
    let expected = mode.iv_len();
    if iv.len() != expected {
        return Err(CryptoError::InvalidNonceLength {
            expected,
            actual: iv.len(),
        });
    }
    Ok(())
}

fn gcm_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    cipher
        .encrypt(aes_gcm::aead::Nonce::<C>::from_slice(iv), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

fn gcm_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt(aes_gcm::aead::Nonce::<C>::from_slice(iv), ciphertext)
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}
