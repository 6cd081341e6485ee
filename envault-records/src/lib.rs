//! Protected record storage for Envault
//!
//! This library ties the key service and the field ciphers together into
//! the user lifecycle:
//! - One data key per user row, wrapped and stored next to the ciphertext
//! - Encrypted save/load of sensitive fields
//! - Right-to-be-forgotten deletion
//! - Postgres and in-memory store backends
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


pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod user;

pub use error::{RecordError, RecordResult, StoreError, StoreResult};
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use store::{EncryptedUserFields, NewUserRow, UserRow, UserStore};
pub use user::{User, UserData};
