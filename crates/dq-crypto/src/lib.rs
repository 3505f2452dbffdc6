//! Symmetric encryption for connection credentials.
//!
//! Connection configs (hostnames, usernames, passwords, API tokens) are
//! encrypted at rest with AES-256-GCM before `dq-db` ever writes them.
//! `dq-schemas::Connection::encrypted_config` holds exactly the base64
//! string this crate produces; nothing upstream of here ever sees plaintext
//! on disk.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde_json::Value;

const NONCE_LEN: usize = 12;

#[derive(Debug)]
pub enum CryptoError {
    MissingKey,
    InvalidKeyLength(usize),
    InvalidKeyEncoding(base64::DecodeError),
    Malformed,
    DecryptFailed,
    Serialize(serde_json::Error),
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::MissingKey => write!(f, "ENCRYPTION_KEY is not set"),
            CryptoError::InvalidKeyLength(n) => {
                write!(f, "encryption key must decode to 32 bytes, got {n}")
            }
            CryptoError::InvalidKeyEncoding(e) => write!(f, "encryption key is not valid base64: {e}"),
            CryptoError::Malformed => write!(f, "encrypted payload is truncated or not valid base64"),
            CryptoError::DecryptFailed => write!(f, "decryption failed: wrong key or corrupted data"),
            CryptoError::Serialize(e) => write!(f, "config serialization failed: {e}"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// A loaded 256-bit key. Construct once at startup (`EncryptionKey::from_env`)
/// and share behind an `Arc` — never re-derive per request.
#[derive(Clone)]
pub struct EncryptionKey(aes_gcm::Key<Aes256Gcm>);

impl EncryptionKey {
    pub const ENV_VAR: &'static str = "ENCRYPTION_KEY";

    /// Reads `ENCRYPTION_KEY` as a base64-encoded 32-byte key.
    pub fn from_env() -> Result<Self, CryptoError> {
        let raw = std::env::var(Self::ENV_VAR).map_err(|_| CryptoError::MissingKey)?;
        Self::from_base64(&raw)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(CryptoError::InvalidKeyEncoding)?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        Ok(EncryptionKey(*Key::<Aes256Gcm>::from_slice(&bytes)))
    }

    /// Generates a new random key, base64-encoded for storage in an env var
    /// or secrets manager. Mirrors the `generate_encryption_key` bootstrap
    /// helper the API ships for first-time setup.
    pub fn generate() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        BASE64.encode(bytes)
    }

    /// Serializes `config` to JSON, encrypts it, and returns a base64 string
    /// of `nonce || ciphertext` suitable for `Connection::encrypted_config`.
    pub fn encrypt_config(&self, config: &Value) -> Result<String, CryptoError> {
        let plaintext = serde_json::to_vec(config).map_err(CryptoError::Serialize)?;
        let cipher = Aes256Gcm::new(&self.0);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|_| CryptoError::DecryptFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    /// Inverse of [`encrypt_config`](Self::encrypt_config).
    pub fn decrypt_config(&self, encrypted: &str) -> Result<Value, CryptoError> {
        let raw = BASE64.decode(encrypted.trim()).map_err(|_| CryptoError::Malformed)?;
        if raw.len() <= NONCE_LEN {
            return Err(CryptoError::Malformed);
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new(&self.0);
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)?;

        serde_json::from_slice(&plaintext).map_err(CryptoError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_config() {
        let key = EncryptionKey::from_base64(&EncryptionKey::generate()).unwrap();
        let config = serde_json::json!({"host": "db.internal", "password": "hunter2"});

        let encrypted = key.encrypt_config(&config).unwrap();
        assert_ne!(encrypted, config.to_string());

        let decrypted = key.decrypt_config(&encrypted).unwrap();
        assert_eq!(decrypted, config);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let key_a = EncryptionKey::from_base64(&EncryptionKey::generate()).unwrap();
        let key_b = EncryptionKey::from_base64(&EncryptionKey::generate()).unwrap();

        let encrypted = key_a.encrypt_config(&serde_json::json!({"a": 1})).unwrap();
        let result = key_b.decrypt_config(&encrypted);
        assert!(matches!(result, Err(CryptoError::DecryptFailed)));
    }

    #[test]
    fn rejects_short_key() {
        let short = base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        let result = EncryptionKey::from_base64(&short);
        assert!(matches!(result, Err(CryptoError::InvalidKeyLength(16))));
    }
}
