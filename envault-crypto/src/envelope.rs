//! Ciphertext envelope text format
//!
//! An encrypted field travels as one colon-delimited string so the nonce
//! (and tag, for ciphers that separate it) are always recoverable at
//! decrypt time: `<hex(nonce)>:<hex(ciphertext)>:<hex(tag)>` or
//! `<hex(nonce)>:<hex(ciphertext+tag)>` for combined constructions.
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


use crate::error::{CryptoError, CryptoResult};

/// Parsed ciphertext envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Nonce/IV bytes
    pub nonce: Vec<u8>,
    /// Ciphertext bytes. For combined constructions this includes the tag.
    pub ciphertext: Vec<u8>,
    /// Authentication tag, when the cipher emits it separately
    pub tag: Option<Vec<u8>>,
}

impl Envelope {
    /// Encode into the delimited text representation
    pub fn encode(&self) -> String {
        match &self.tag {
            Some(tag) => format!(
                "{}:{}:{}",
                hex::encode(&self.nonce),
                hex::encode(&self.ciphertext),
                hex::encode(tag)
            ),
            None => format!(
                "{}:{}",
                hex::encode(&self.nonce),
                hex::encode(&self.ciphertext)
            ),
        }
    }

    /// Parse the delimited text representation.
    ///
    /// Accepts two components (combined ciphertext+tag) or three
    /// (separate tag). Anything else is malformed.
    pub fn parse(text: &str) -> CryptoResult<Self> {
        let parts: Vec<&str> = text.split(':').collect();

        let (nonce_hex, ciphertext_hex, tag_hex) = match parts.as_slice() {
            [nonce, ciphertext] => (*nonce, *ciphertext, None),
            [nonce, ciphertext, tag] => (*nonce, *ciphertext, Some(*tag)),
            _ => {
                return Err(CryptoError::MalformedEnvelope(format!(
                    "expected 2 or 3 components, got {}",
                    parts.len()
                )))
            }
        };

        let nonce = decode_component(nonce_hex, "nonce")?;
        let ciphertext = decode_component(ciphertext_hex, "ciphertext")?;
        let tag = tag_hex
            .map(|t| decode_component(t, "tag"))
            .transpose()?;

        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

fn decode_component(hex_text: &str, name: &str) -> CryptoResult<Vec<u8>> {
    hex::decode(hex_text)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("{} is not valid hex: {}", name, e)))
}
