//! Ed25519 signer
//!
//! The key file holds the 32-byte secret seed, hex encoded.

use super::{Result, SignError, Signer};
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use std::path::Path;

pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(&seed))
    }

    /// Parse a hex encoded seed
    pub fn from_hex(seed: &str) -> Result<Self> {
        let bytes = hex::decode(seed.trim())
            .map_err(|e| SignError::InvalidKey(format!("seed is not hex: {}", e)))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            SignError::InvalidKey(format!("seed must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Load a hex encoded seed from a file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_hex(&content)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.verifying_key().as_bytes()))
            .finish()
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(content).to_bytes().to_vec())
    }
}
