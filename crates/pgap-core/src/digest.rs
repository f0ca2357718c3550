//! # Content Digests
//!
//! SHA-256 digests over canonical bytes. Used for taxonomy versioning (two
//! payloads with identical content share a version digest) and for deriving
//! a [`DocumentId`](crate::DocumentId) from document content.
//!
//! Canonical bytes are the compact `serde_json` encoding of the value. The
//! values hashed in this workspace are plain structs and sequences, whose
//! field order is fixed by their type definitions, so the encoding is stable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PgapError;

/// A SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Hash raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            bytes: hasher.finalize().into(),
        }
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first `len` hex characters, for compact display.
    pub fn short_hex(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len);
        hex
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute the SHA-256 digest of a serializable value's canonical bytes.
///
/// # Errors
///
/// Returns [`PgapError::Json`] if the value cannot be serialized.
pub fn sha256_digest<T: Serialize + ?Sized>(value: &T) -> Result<ContentDigest, PgapError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(ContentDigest::of_bytes(&bytes))
}
