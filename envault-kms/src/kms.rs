//! Key service capability interface
//!
//! This module provides a trait-based interface for data key management
//! that can be implemented by different backends:
//! - In-process master key ring (current implementation)
//! - AWS KMS
//! - Azure Key Vault
//! - Hardware Security Modules (HSM)
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


use async_trait::async_trait;
use envault_crypto::DataKey;

use crate::error::KmsResult;

/// A data key wrapped under a master key, safe to persist next to the
/// ciphertext it protects. The text is base64 of an opaque blob whose
/// layout belongs to the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedDataKey(String);

impl WrappedDataKey {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for WrappedDataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Both forms of a freshly generated data key.
///
/// The plaintext form zeroizes itself on drop; the caller is responsible
/// for how long it stays alive.
pub struct GeneratedDataKey {
    pub key: DataKey,
    pub wrapped: WrappedDataKey,
}

/// Trait for key service backends
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Request a fresh 256-bit data key wrapped under the configured
    /// master key. Every call creates a distinct key.
    async fn generate_data_key(&self) -> KmsResult<GeneratedDataKey>;

    /// Unwrap a previously wrapped data key.
    ///
    /// Results are never cached: every call is a fresh round-trip so key
    /// access can be revoked centrally by disabling the master key.
    async fn decrypt_data_key(&self, wrapped: &WrappedDataKey) -> KmsResult<DataKey>;
}
