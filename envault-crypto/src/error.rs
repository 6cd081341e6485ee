//! Error types for field encryption
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


use thiserror::Error;

/// Field encryption errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The envelope text does not parse into the expected components.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Integrity check failed: wrong key or tampered ciphertext.
    #[error("Authentication failed: wrong key or tampered ciphertext")]
    Authentication,

    #[error("Invalid key size: expected {expected} bytes, got {got}")]
    InvalidKeySize { expected: usize, got: usize },

    #[error("Encryption error: {0}")]
    Encryption(String),
}

/// Result type for field encryption operations
pub type CryptoResult<T> = Result<T, CryptoError>;
