//! Postgres user store
//!
//! Handles storage and retrieval of encrypted user rows. The database
//! only ever holds ciphertext and wrapped keys.
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
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{error, info};

use crate::error::{StoreError, StoreResult};
use crate::store::{EncryptedUserFields, NewUserRow, UserRow, UserStore};

/// Postgres-backed user row storage
pub struct PgUserStore {
    client: Client,
}

impl PgUserStore {
    /// Connect and initialize the schema
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        info!("Connecting to user database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        Self::run_migrations(&client).await?;

        info!("User database connected and initialized");

        Ok(Self { client })
    }

    /// Run database migrations
    async fn run_migrations(client: &Client) -> StoreResult<()> {
        client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGSERIAL PRIMARY KEY,
                    username VARCHAR(255) NOT NULL UNIQUE,
                    email_encrypted TEXT NOT NULL,
                    phone_encrypted TEXT NOT NULL,
                    dek_encrypted TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                &[],
            )
            .await?;

        client
            .execute(
                r#"
                CREATE INDEX IF NOT EXISTS idx_users_username
                ON users(username)
                "#,
                &[],
            )
            .await?;

        Ok(())
    }

    fn row_to_user(row: &Row) -> UserRow {
        UserRow {
            id: row.get(0),
            username: row.get(1),
            email_encrypted: row.get(2),
            phone_encrypted: row.get(3),
            dek_encrypted: row.get(4),
            created_at: row.get(5),
            updated_at: row.get(6),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, row: NewUserRow) -> StoreResult<i64> {
        let inserted = self
            .client
            .query_one(
                r#"
                INSERT INTO users (username, email_encrypted, phone_encrypted, dek_encrypted)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
                &[
                    &row.username,
                    &row.email_encrypted,
                    &row.phone_encrypted,
                    &row.dek_encrypted,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    StoreError::UniqueViolation(row.username.clone())
                } else {
                    StoreError::Database(e)
                }
            })?;

        Ok(inserted.get(0))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let row = self
            .client
            .query_opt(
                r#"
                SELECT id, username, email_encrypted, phone_encrypted, dek_encrypted,
                       created_at, updated_at
                FROM users
                WHERE username = $1
                "#,
                &[&username],
            )
            .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn wrapped_key(&self, id: i64) -> StoreResult<Option<String>> {
        let row = self
            .client
            .query_opt("SELECT dek_encrypted FROM users WHERE id = $1", &[&id])
            .await?;

        Ok(row.map(|r| r.get(0)))
    }

    async fn update(&self, id: i64, fields: &EncryptedUserFields) -> StoreResult<u64> {
        let affected = self
            .client
            .execute(
                r#"
                UPDATE users SET
                    username = $1,
                    email_encrypted = $2,
                    phone_encrypted = $3,
                    updated_at = NOW()
                WHERE id = $4
                "#,
                &[
                    &fields.username,
                    &fields.email_encrypted,
                    &fields.phone_encrypted,
                    &id,
                ],
            )
            .await?;

        Ok(affected)
    }

    async fn delete(&self, id: i64) -> StoreResult<u64> {
        let affected = self
            .client
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await?;

        Ok(affected)
    }
}
