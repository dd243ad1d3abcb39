//! AES-256-GCM payload codec.
//!
//! The key is SHA-256 of a passphrase. Every seal draws a fresh random
//! 96-bit nonce and prepends it to the ciphertext before base64 encoding.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};

/// AES-GCM nonce length (96 bit).
pub const NONCE_LEN: usize = 12;

/// 256-bit symmetric key derived from a passphrase.
#[derive(Clone)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Deterministic: the same passphrase always yields the same key.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self(key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("AES-GCM encryption failed")]
    Encrypt,

    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload too short ({0} bytes)")]
    Truncated(usize),

    #[error("Authentication failed (tampered, corrupted, or legacy payload)")]
    Authentication,
}

/// Encrypt `plaintext` into a base64 payload string.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<String, CipherError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = key
        .cipher()
        .encrypt(&nonce, plaintext)
        .map_err(|_| CipherError::Encrypt)?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(combined))
}

/// Decode and decrypt a payload produced by [`seal`].
pub fn open(key: &DerivedKey, payload: &str) -> Result<Vec<u8>, CipherError> {
    let bytes = BASE64.decode(payload.trim())?;
    if bytes.len() < NONCE_LEN {
        return Err(CipherError::Truncated(bytes.len()));
    }
    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

    key.cipher()
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::Authentication)
}
