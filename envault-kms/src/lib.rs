//! Key management for Envault
//!
//! Provides the capability interface for generating and unwrapping data
//! keys under a master key that never leaves the key service, plus an
//! in-process adapter. A real KMS, an HSM-backed service, or the local
//! adapter are interchangeable behind the same trait.
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
pub mod kms;
pub mod local;

pub use error::{KmsError, KmsResult};
pub use kms::{GeneratedDataKey, KeyService, WrappedDataKey};
pub use local::{LocalKms, MasterKeyMetadata, MasterKeyRing};
