//! Encrypted local storage — public API.
//!
//! Values are serialized to JSON, sealed with AES-256-GCM, and persisted as
//! base64 strings in a plain key-value backend (the desktop stand-in for
//! browser localStorage). Payload layout:
//!
//!   base64( nonce (12 bytes) | ciphertext + tag )
//!
//! Unreadable payloads read back as absent; only backend failures are errors.

mod backend;
mod cipher;
mod secure;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use cipher::{CipherError, DerivedKey, NONCE_LEN};
pub use secure::{CorruptReason, LoadOutcome, SecureStore, DEFAULT_PASSPHRASE};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend failed: {0}")]
    Backend(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Value is not JSON-serializable: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encryption failed")]
    Encryption,
}
