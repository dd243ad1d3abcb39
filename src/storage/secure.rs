//! Secure store — JSON values in, encrypted strings out.

use super::backend::KeyValueBackend;
use super::cipher::{self, CipherError, DerivedKey};
use super::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::LazyLock;

/// Passphrase every install derives its storage key from.
///
/// Shared by all installs, so this obfuscates local data rather than
/// protecting it from someone holding the application binary. Changing it
/// makes all existing history unreadable.
pub const DEFAULT_PASSPHRASE: &str = "techrisk_secret_key";

static DEFAULT_KEY: LazyLock<DerivedKey> =
    LazyLock::new(|| DerivedKey::from_passphrase(DEFAULT_PASSPHRASE));

/// Result of reading a key, keeping "never written" apart from "unreadable".
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Found(T),
    NotFound,
    Corrupted(CorruptReason),
}

#[derive(Debug)]
pub enum CorruptReason {
    /// Base64, length or authentication failure.
    Cipher(CipherError),
    /// Decrypted bytes are not UTF-8 JSON.
    Json(String),
    /// Valid JSON that does not fit the requested type.
    Shape(String),
}

impl<T> LoadOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            LoadOutcome::Found(value) => Some(value),
            LoadOutcome::NotFound | LoadOutcome::Corrupted(_) => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, LoadOutcome::Corrupted(_))
    }
}

/// Encrypting wrapper around a [`KeyValueBackend`].
///
/// Holds no state between calls apart from the immutable key, so it can be
/// shared freely. Ordering of concurrent writes to one key is whatever the
/// backend provides.
pub struct SecureStore<B> {
    backend: B,
    key: DerivedKey,
}

impl<B: KeyValueBackend> SecureStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            key: DEFAULT_KEY.clone(),
        }
    }

    pub fn with_passphrase(backend: B, passphrase: &str) -> Self {
        Self {
            backend,
            key: DerivedKey::from_passphrase(passphrase),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serialize, encrypt and write `value` under `key`, replacing any
    /// previous value.
    pub fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        let payload = cipher::seal(&self.key, json.as_bytes()).map_err(|e| {
            log::error!("[STORAGE] Encrypting {} failed: {}", key, e);
            StorageError::Encryption
        })?;
        self.backend.set(key, &payload)
    }

    /// Read and decrypt `key`. Missing and unreadable values both give `None`.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self.load(key)?.into_option())
    }

    /// Like [`get_item`](Self::get_item) but reports why nothing came back.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<LoadOutcome<T>, StorageError> {
        let payload = match self.backend.get(key)? {
            Some(payload) if !payload.is_empty() => payload,
            _ => return Ok(LoadOutcome::NotFound),
        };

        let plaintext = match cipher::open(&self.key, &payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("[STORAGE] {} could not be decrypted ({}), treating as empty", key, e);
                return Ok(LoadOutcome::Corrupted(CorruptReason::Cipher(e)));
            }
        };

        let json: serde_json::Value = match serde_json::from_slice(&plaintext) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("[STORAGE] {} decrypted to invalid JSON: {}", key, e);
                return Ok(LoadOutcome::Corrupted(CorruptReason::Json(e.to_string())));
            }
        };

        match serde_json::from_value(json) {
            Ok(value) => Ok(LoadOutcome::Found(value)),
            Err(e) => {
                log::warn!("[STORAGE] {} has an unexpected shape: {}", key, e);
                Ok(LoadOutcome::Corrupted(CorruptReason::Shape(e.to_string())))
            }
        }
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }
}
