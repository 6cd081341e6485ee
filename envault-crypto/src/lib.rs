//! Field-level authenticated encryption for Envault
//!
//! Provides the data key type, the self-describing ciphertext envelope
//! format, and interchangeable AEAD cipher adapters.
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


pub mod cipher;
pub mod data_key;
pub mod envelope;
pub mod error;

pub use cipher::{AesGcmFieldCipher, FieldCipher, SecretBoxFieldCipher};
pub use data_key::{DataKey, DATA_KEY_SIZE};
pub use envelope::Envelope;
pub use error::{CryptoError, CryptoResult};
