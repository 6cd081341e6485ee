//! Error types for key management
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

/// Key service errors
///
/// None of these are retried here; the caller decides on retry/backoff.
#[derive(Error, Debug)]
pub enum KmsError {
    #[error("Key service unavailable: {0}")]
    Unavailable(String),

    #[error("Master key not found: {0}")]
    MasterKeyNotFound(String),

    #[error("Master key disabled: {0}")]
    MasterKeyDisabled(String),

    #[error("Invalid wrapped key: {0}")]
    InvalidWrappedKey(String),
}

/// Result type for key service operations
pub type KmsResult<T> = Result<T, KmsError>;
