//! Data encryption key (DEK) type
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


use aes_gcm::aead::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Data key size in bytes (256 bits)
pub const DATA_KEY_SIZE: usize = 32;

/// A 256-bit data encryption key.
///
/// The plaintext form exists only transiently in memory while an
/// encrypt/decrypt operation is in flight. The buffer is overwritten
/// with zeros when the key is dropped, on every exit path.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    bytes: [u8; DATA_KEY_SIZE],
}

impl DataKey {
    /// Generate a new random 256-bit key from the OS CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; DATA_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a data key from raw bytes.
    ///
    /// The caller keeps ownership of `bytes` and is responsible for
    /// zeroing its own copy.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != DATA_KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: DATA_KEY_SIZE,
                got: bytes.len(),
            });
        }
        let mut key = [0u8; DATA_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Get the key bytes (use with caution)
    pub fn as_bytes(&self) -> &[u8; DATA_KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DataKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        let k1 = DataKey::generate();
        let k2 = DataKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(matches!(
            DataKey::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKeySize { expected: 32, got: 16 })
        ));
        assert!(DataKey::from_bytes(&[0u8; 32]).is_ok());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = DataKey::generate();
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "DataKey([REDACTED])");
    }
}
