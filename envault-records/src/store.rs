//! User store port
//!
//! One logical row per user. Every encrypted column is opaque text; the
//! store never sees plaintext or key material. Row writes are single
//! calls so a cancelled save cannot leave a half-written row.
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
use chrono::{DateTime, Utc};

use crate::error::StoreResult;

/// A stored user row, fields still encrypted
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email_encrypted: String,
    pub phone_encrypted: String,
    pub dek_encrypted: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row to insert: encrypted fields plus the wrapped data key
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub username: String,
    pub email_encrypted: String,
    pub phone_encrypted: String,
    pub dek_encrypted: String,
}

/// Re-encrypted field values for an update.
///
/// The wrapped data key is deliberately absent: updates never touch
/// `dek_encrypted`.
#[derive(Debug, Clone)]
pub struct EncryptedUserFields {
    pub username: String,
    pub email_encrypted: String,
    pub phone_encrypted: String,
}

/// Trait for user row storage backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new row and return its assigned identity
    async fn insert(&self, row: NewUserRow) -> StoreResult<i64>;

    /// Look up a row by its unique username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;

    /// Read only the wrapped data key of a row
    async fn wrapped_key(&self, id: i64) -> StoreResult<Option<String>>;

    /// Overwrite the encrypted fields of a row, leaving the wrapped data
    /// key untouched. Returns the number of rows affected.
    async fn update(&self, id: i64, fields: &EncryptedUserFields) -> StoreResult<u64>;

    /// Delete a row. Returns the number of rows affected.
    async fn delete(&self, id: i64) -> StoreResult<u64>;
}
