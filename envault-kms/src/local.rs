//! In-process key service adapter
//!
//! Stands in for a remote KMS during development and tests: master keys
//! live inside the ring and never leave it in plaintext, and data keys
//! are wrapped under them with AES-256-GCM.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use envault_crypto::DataKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{KmsError, KmsResult};
use crate::kms::{GeneratedDataKey, KeyService, WrappedDataKey};

/// Nonce size used when wrapping a data key
const WRAP_NONCE_SIZE: usize = 12;

/// Authentication tag size of the wrapping cipher
const WRAP_TAG_SIZE: usize = 16;

/// Smallest decodable blob: master key id + nonce + tag
const MIN_BLOB_SIZE: usize = 16 + WRAP_NONCE_SIZE + WRAP_TAG_SIZE;

/// Master key metadata, safe to expose to provisioning callers
#[derive(Debug, Clone)]
pub struct MasterKeyMetadata {
    pub id: Uuid,
    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

struct MasterKeyEntry {
    key: DataKey,
    metadata: MasterKeyMetadata,
}

/// Registry of master keys.
///
/// Key material stays inside the ring; callers only ever see metadata
/// and wrapped blobs. Disabling a master key revokes access to every
/// data key wrapped under it.
pub struct MasterKeyRing {
    keys: RwLock<HashMap<Uuid, MasterKeyEntry>>,
}

impl MasterKeyRing {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Provision a new master key and return its identifier
    pub async fn create_master_key(&self, description: &str) -> Uuid {
        let id = Uuid::new_v4();
        let entry = MasterKeyEntry {
            key: DataKey::generate(),
            metadata: MasterKeyMetadata {
                id,
                description: description.to_string(),
                enabled: true,
                created_at: Utc::now(),
            },
        };

        let mut keys = self.keys.write().await;
        keys.insert(id, entry);

        info!(master_key_id = %id, "Master key created");
        id
    }

    /// List metadata for all provisioned master keys
    pub async fn list_master_keys(&self) -> Vec<MasterKeyMetadata> {
        let keys = self.keys.read().await;
        keys.values().map(|entry| entry.metadata.clone()).collect()
    }

    /// Disable a master key, revoking access to everything wrapped under it
    pub async fn disable_master_key(&self, id: &Uuid) -> KmsResult<()> {
        let mut keys = self.keys.write().await;
        let entry = keys
            .get_mut(id)
            .ok_or_else(|| KmsError::MasterKeyNotFound(id.to_string()))?;
        entry.metadata.enabled = false;

        info!(master_key_id = %id, "Master key disabled");
        Ok(())
    }

    /// Wrap a payload under a master key.
    ///
    /// Blob layout: `[master_key_id:16][nonce:12][ciphertext+tag]`,
    /// base64-encoded. The layout is private to this adapter; callers
    /// treat the result as opaque.
    async fn wrap(&self, master_key_id: &Uuid, payload: &[u8]) -> KmsResult<String> {
        let keys = self.keys.read().await;
        let entry = keys
            .get(master_key_id)
            .ok_or_else(|| KmsError::MasterKeyNotFound(master_key_id.to_string()))?;
        if !entry.metadata.enabled {
            return Err(KmsError::MasterKeyDisabled(master_key_id.to_string()));
        }

        let cipher = Aes256Gcm::new(entry.key.as_bytes().into());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, payload)
            .map_err(|e| KmsError::Unavailable(format!("key wrapping failed: {}", e)))?;

        let mut blob = Vec::with_capacity(16 + WRAP_NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(master_key_id.as_bytes());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(blob))
    }

    /// Unwrap a blob produced by [`MasterKeyRing::wrap`]
    async fn unwrap(&self, blob_text: &str) -> KmsResult<Zeroizing<Vec<u8>>> {
        let blob = STANDARD
            .decode(blob_text)
            .map_err(|e| KmsError::InvalidWrappedKey(format!("not valid base64: {}", e)))?;
        if blob.len() < MIN_BLOB_SIZE {
            return Err(KmsError::InvalidWrappedKey(format!(
                "blob too short: {} bytes",
                blob.len()
            )));
        }

        let master_key_id = Uuid::from_slice(&blob[..16])
            .map_err(|e| KmsError::InvalidWrappedKey(format!("bad master key id: {}", e)))?;
        let (nonce, ciphertext) = blob[16..].split_at(WRAP_NONCE_SIZE);

        let keys = self.keys.read().await;
        let entry = keys
            .get(&master_key_id)
            .ok_or_else(|| KmsError::MasterKeyNotFound(master_key_id.to_string()))?;
        if !entry.metadata.enabled {
            return Err(KmsError::MasterKeyDisabled(master_key_id.to_string()));
        }

        let cipher = Aes256Gcm::new(entry.key.as_bytes().into());
        let payload = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                KmsError::InvalidWrappedKey(
                    "blob was not produced under an accessible master key".to_string(),
                )
            })?;

        Ok(Zeroizing::new(payload))
    }
}

/// Key service backed by an in-process master key ring
pub struct LocalKms {
    ring: Arc<MasterKeyRing>,
    master_key_id: Uuid,
}

impl LocalKms {
    /// Create a key service that wraps data keys under `master_key_id`.
    ///
    /// The identifier comes from configuration, not ambient state, so
    /// tests can substitute their own ring and key.
    pub fn new(ring: Arc<MasterKeyRing>, master_key_id: Uuid) -> Self {
        Self {
            ring,
            master_key_id,
        }
    }

    pub fn master_key_id(&self) -> Uuid {
        self.master_key_id
    }
}

#[async_trait]
impl KeyService for LocalKms {
    async fn generate_data_key(&self) -> KmsResult<GeneratedDataKey> {
        let key = DataKey::generate();
        let blob = self.ring.wrap(&self.master_key_id, key.as_bytes()).await?;

        debug!(master_key_id = %self.master_key_id, "Data key generated");
        Ok(GeneratedDataKey {
            key,
            wrapped: WrappedDataKey::new(blob),
        })
    }

    async fn decrypt_data_key(&self, wrapped: &WrappedDataKey) -> KmsResult<DataKey> {
        let payload = self.ring.unwrap(wrapped.as_str()).await?;
        DataKey::from_bytes(&payload).map_err(|_| {
            KmsError::InvalidWrappedKey("unwrapped payload is not a 256-bit key".to_string())
        })
    }
}
