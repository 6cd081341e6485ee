//! User entity with encrypted sensitive fields
//!
//! One data key per user, generated on first save and reused for every
//! later update. Plaintext field values live only in memory; the store
//! row carries ciphertext envelopes and the wrapped key.
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


use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroize;

use envault_crypto::{DataKey, FieldCipher};
use envault_kms::{KeyService, WrappedDataKey};

use crate::error::{RecordError, RecordResult};
use crate::store::{EncryptedUserFields, NewUserRow, UserStore};

/// Plain field values of a user
#[derive(Clone)]
pub struct UserData {
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl std::fmt::Debug for UserData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserData")
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("phone", &"[REDACTED]")
            .finish()
    }
}

/// A user whose sensitive fields are envelope-encrypted at rest
pub struct User {
    store: Arc<dyn UserStore>,
    kms: Arc<dyn KeyService>,
    cipher: Arc<dyn FieldCipher>,
    id: Option<i64>,
    username: String,
    email: String,
    phone: String,
}

impl User {
    /// Create a transient user; nothing is persisted until [`User::save`]
    pub fn new(
        store: Arc<dyn UserStore>,
        kms: Arc<dyn KeyService>,
        cipher: Arc<dyn FieldCipher>,
        data: UserData,
    ) -> Self {
        Self {
            store,
            kms,
            cipher,
            id: None,
            username: data.username,
            email: data.email,
            phone: data.phone,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    /// Get the current field values
    pub fn data(&self) -> UserData {
        UserData {
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Persist the user, encrypting every sensitive field.
    ///
    /// First save generates a data key; later saves unwrap and reuse the
    /// stored one. All fields are re-encrypted on every save, whether or
    /// not they changed.
    pub async fn save(&mut self) -> RecordResult<()> {
        if let Some(id) = self.id {
            match self.store.wrapped_key(id).await? {
                Some(blob) => return self.update_existing(id, WrappedDataKey::new(blob)).await,
                None => {
                    // Row is gone, forgotten by another caller. Saving again
                    // starts a wholly new record, never a resurrection.
                    warn!(
                        user_id = id,
                        username = %self.username,
                        "Row no longer exists, creating a new record"
                    );
                    self.id = None;
                }
            }
        }
        self.create_new().await
    }

    async fn create_new(&mut self) -> RecordResult<()> {
        let generated = self.kms.generate_data_key().await?;
        let (email_encrypted, phone_encrypted) = self.encrypt_fields(&generated.key)?;

        let id = self
            .store
            .insert(NewUserRow {
                username: self.username.clone(),
                email_encrypted,
                phone_encrypted,
                dek_encrypted: generated.wrapped.into_string(),
            })
            .await?;

        self.id = Some(id);
        info!(user_id = id, username = %self.username, "User created with encrypted fields");
        Ok(())
    }

    async fn update_existing(&mut self, id: i64, wrapped: WrappedDataKey) -> RecordResult<()> {
        // The stored data key is always reused on update. Issuing a new
        // one would orphan the ciphertexts wrapped under the old key.
        let key = self.kms.decrypt_data_key(&wrapped).await?;
        let (email_encrypted, phone_encrypted) = self.encrypt_fields(&key)?;

        let affected = self
            .store
            .update(
                id,
                &EncryptedUserFields {
                    username: self.username.clone(),
                    email_encrypted,
                    phone_encrypted,
                },
            )
            .await?;

        if affected == 0 {
            // Concurrent forget won the race; last writer wins.
            warn!(user_id = id, "Row disappeared during update");
        } else {
            info!(user_id = id, username = %self.username, "User updated");
        }
        Ok(())
    }

    fn encrypt_fields(&self, key: &DataKey) -> RecordResult<(String, String)> {
        let email_encrypted = self.cipher.encrypt(&self.email, key)?;
        let phone_encrypted = self.cipher.encrypt(&self.phone, key)?;
        Ok((email_encrypted, phone_encrypted))
    }

    /// Find a user by username, decrypting their sensitive fields.
    ///
    /// An absent row is a normal outcome, returned as `Ok(None)`.
    pub async fn find_by_username(
        store: Arc<dyn UserStore>,
        kms: Arc<dyn KeyService>,
        cipher: Arc<dyn FieldCipher>,
        username: &str,
    ) -> RecordResult<Option<User>> {
        let row = match store.find_by_username(username).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let key = kms
            .decrypt_data_key(&WrappedDataKey::new(row.dek_encrypted))
            .await?;
        let email = cipher.decrypt(&row.email_encrypted, &key)?;
        let phone = cipher.decrypt(&row.phone_encrypted, &key)?;

        Ok(Some(User {
            store,
            kms,
            cipher,
            id: Some(row.id),
            username: row.username,
            email,
            phone,
        }))
    }

    /// Right to be forgotten: clear the in-memory sensitive fields, then
    /// delete the row. After this the identity is gone; a later save
    /// creates a wholly new record.
    pub async fn forget(&mut self) -> RecordResult<()> {
        let id = self.id.ok_or(RecordError::NotPersisted)?;

        // Cleared before the delete call so a failed delete cannot leave
        // plaintext lingering in this instance.
        self.email.zeroize();
        self.phone.zeroize();

        self.store.delete(id).await?;
        self.id = None;

        info!(username = %self.username, "User forgotten");
        Ok(())
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("phone", &"[REDACTED]")
            .finish()
    }
}
