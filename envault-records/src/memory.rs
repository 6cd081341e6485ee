//! In-memory user store
//!
//! Backs tests and the demo when no database is configured. Mirrors the
//! Postgres backend's semantics, including the unique username
//! constraint.
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
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{EncryptedUserFields, NewUserRow, UserRow, UserStore};

/// In-memory user row storage
pub struct MemoryUserStore {
    rows: RwLock<HashMap<i64, UserRow>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, row: NewUserRow) -> StoreResult<i64> {
        let mut rows = self.rows.write().await;

        if rows.values().any(|r| r.username == row.username) {
            return Err(StoreError::UniqueViolation(row.username));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        rows.insert(
            id,
            UserRow {
                id,
                username: row.username,
                email_encrypted: row.email_encrypted,
                phone_encrypted: row.phone_encrypted,
                dek_encrypted: row.dek_encrypted,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.username == username).cloned())
    }

    async fn wrapped_key(&self, id: i64) -> StoreResult<Option<String>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).map(|r| r.dek_encrypted.clone()))
    }

    async fn update(&self, id: i64, fields: &EncryptedUserFields) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) => {
                row.username = fields.username.clone();
                row.email_encrypted = fields.email_encrypted.clone();
                row.phone_encrypted = fields.phone_encrypted.clone();
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        Ok(if rows.remove(&id).is_some() { 1 } else { 0 })
    }
}
