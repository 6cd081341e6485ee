//! Error types for protected records
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


use envault_crypto::CryptoError;
use envault_kms::KmsError;
use thiserror::Error;

/// Store backend errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Protected record lifecycle errors.
///
/// A missing row is not an error: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Lifecycle violation: the operation needs a persisted identity.
    #[error("Record has not been persisted")]
    NotPersisted,

    #[error("Key service error: {0}")]
    Key(#[from] KmsError),

    #[error("Encryption error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;
