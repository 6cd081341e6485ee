//! AEAD field cipher adapters
//!
//! Two interchangeable constructions behind one trait, selected at
//! construction time: AES-256-GCM with a separate tag component, and an
//! XChaCha20-Poly1305 secret box with a combined ciphertext+tag. A fresh
//! random nonce is drawn from the OS CSPRNG on every encrypt call.
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


use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};

use crate::data_key::DataKey;
use crate::envelope::Envelope;
use crate::error::{CryptoError, CryptoResult};

/// AES-GCM nonce size in bytes (96 bits)
pub const GCM_NONCE_SIZE: usize = 12;

/// XChaCha20-Poly1305 nonce size in bytes (192 bits)
pub const SECRETBOX_NONCE_SIZE: usize = 24;

/// Authentication tag size in bytes (128 bits, both constructions)
pub const TAG_SIZE: usize = 16;

/// Authenticated encryption of a UTF-8 field value under a data key.
///
/// Implementations are stateless; the envelope string is self-describing
/// so one key can encrypt many fields without per-field bookkeeping.
pub trait FieldCipher: Send + Sync {
    /// Encrypt a field value, producing the envelope text
    fn encrypt(&self, plaintext: &str, key: &DataKey) -> CryptoResult<String>;

    /// Decrypt an envelope back to the field value.
    ///
    /// Integrity is verified before any plaintext is returned; a wrong
    /// key or tampered envelope fails with [`CryptoError::Authentication`].
    fn decrypt(&self, envelope: &str, key: &DataKey) -> CryptoResult<String>;
}

/// AES-256-GCM adapter. Envelope: `nonce:ciphertext:tag`, hex components.
pub struct AesGcmFieldCipher;

impl FieldCipher for AesGcmFieldCipher {
    fn encrypt(&self, plaintext: &str, key: &DataKey) -> CryptoResult<String> {
        let cipher = Aes256Gcm::new(key.as_bytes().into());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        // The aead API returns ciphertext||tag; the tag travels as its
        // own envelope component.
        let mut combined = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(format!("AES-GCM encryption failed: {}", e)))?;
        let tag = combined.split_off(combined.len() - TAG_SIZE);

        Ok(Envelope {
            nonce: nonce.to_vec(),
            ciphertext: combined,
            tag: Some(tag),
        }
        .encode())
    }

    fn decrypt(&self, envelope: &str, key: &DataKey) -> CryptoResult<String> {
        let parsed = Envelope::parse(envelope)?;

        let tag = parsed.tag.ok_or_else(|| {
            CryptoError::MalformedEnvelope("expected a separate tag component".into())
        })?;
        if parsed.nonce.len() != GCM_NONCE_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "expected {}-byte nonce, got {}",
                GCM_NONCE_SIZE,
                parsed.nonce.len()
            )));
        }
        if tag.len() != TAG_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "expected {}-byte tag, got {}",
                TAG_SIZE,
                tag.len()
            )));
        }

        let cipher = Aes256Gcm::new(key.as_bytes().into());
        let nonce = Nonce::from_slice(&parsed.nonce);

        let mut combined = parsed.ciphertext;
        combined.extend_from_slice(&tag);

        let plaintext = cipher
            .decrypt(nonce, combined.as_slice())
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::MalformedEnvelope("payload is not valid UTF-8".into()))
    }
}

/// XChaCha20-Poly1305 secret-box adapter. Envelope: `nonce:ciphertext`,
/// hex components, tag appended to the ciphertext.
pub struct SecretBoxFieldCipher;

impl FieldCipher for SecretBoxFieldCipher {
    fn encrypt(&self, plaintext: &str, key: &DataKey) -> CryptoResult<String> {
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(format!("secret box encryption failed: {}", e)))?;

        Ok(Envelope {
            nonce: nonce.to_vec(),
            ciphertext,
            tag: None,
        }
        .encode())
    }

    fn decrypt(&self, envelope: &str, key: &DataKey) -> CryptoResult<String> {
        let parsed = Envelope::parse(envelope)?;

        if parsed.tag.is_some() {
            return Err(CryptoError::MalformedEnvelope(
                "expected a combined ciphertext+tag component".into(),
            ));
        }
        if parsed.nonce.len() != SECRETBOX_NONCE_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "expected {}-byte nonce, got {}",
                SECRETBOX_NONCE_SIZE,
                parsed.nonce.len()
            )));
        }
        if parsed.ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::MalformedEnvelope(
                "ciphertext shorter than the authentication tag".into(),
            ));
        }

        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        let nonce = XNonce::from_slice(&parsed.nonce);

        let plaintext = cipher
            .decrypt(nonce, parsed.ciphertext.as_slice())
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::MalformedEnvelope("payload is not valid UTF-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ciphers() -> Vec<Box<dyn FieldCipher>> {
        vec![Box::new(AesGcmFieldCipher), Box::new(SecretBoxFieldCipher)]
    }

    #[test]
    fn round_trip() {
        let key = DataKey::generate();
        for cipher in ciphers() {
            let envelope = cipher.encrypt("john.doe@example.com", &key).unwrap();
            assert_ne!(envelope, "john.doe@example.com");
            let decrypted = cipher.decrypt(&envelope, &key).unwrap();
            assert_eq!(decrypted, "john.doe@example.com");
        }
    }

    #[test]
    fn round_trip_empty_and_unicode() {
        let key = DataKey::generate();
        for cipher in ciphers() {
            for plaintext in ["", "ü +1-555-123-4567 データ"] {
                let envelope = cipher.encrypt(plaintext, &key).unwrap();
                assert_eq!(cipher.decrypt(&envelope, &key).unwrap(), plaintext);
            }
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let key1 = DataKey::generate();
        let key2 = DataKey::generate();
        for cipher in ciphers() {
            let envelope = cipher.encrypt("secret", &key1).unwrap();
            assert!(matches!(
                cipher.decrypt(&envelope, &key2),
                Err(CryptoError::Authentication)
            ));
        }
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let key = DataKey::generate();
        for cipher in ciphers() {
            let envelope = cipher.encrypt("tamper target", &key).unwrap();
            let mut parsed = Envelope::parse(&envelope).unwrap();
            for i in 0..parsed.ciphertext.len() {
                parsed.ciphertext[i] ^= 0x01;
                assert!(matches!(
                    cipher.decrypt(&parsed.encode(), &key),
                    Err(CryptoError::Authentication)
                ));
                parsed.ciphertext[i] ^= 0x01;
            }
        }
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let key = DataKey::generate();
        let cipher = AesGcmFieldCipher;
        let envelope = cipher.encrypt("tamper target", &key).unwrap();
        let mut parsed = Envelope::parse(&envelope).unwrap();
        for i in 0..TAG_SIZE {
            parsed.tag.as_mut().unwrap()[i] ^= 0x80;
            assert!(matches!(
                cipher.decrypt(&parsed.encode(), &key),
                Err(CryptoError::Authentication)
            ));
            parsed.tag.as_mut().unwrap()[i] ^= 0x80;
        }
    }

    #[test]
    fn nonces_never_repeat() {
        let key = DataKey::generate();
        for cipher in ciphers() {
            let mut seen = HashSet::new();
            for _ in 0..10_000 {
                let envelope = cipher.encrypt("nonce check", &key).unwrap();
                let nonce_hex = envelope.split(':').next().unwrap().to_string();
                assert!(seen.insert(nonce_hex), "nonce repeated under the same key");
            }
        }
    }

    #[test]
    fn component_count_is_per_cipher() {
        let key = DataKey::generate();

        let combined = SecretBoxFieldCipher.encrypt("x", &key).unwrap();
        assert!(matches!(
            AesGcmFieldCipher.decrypt(&combined, &key),
            Err(CryptoError::MalformedEnvelope(_))
        ));

        let separate = AesGcmFieldCipher.encrypt("x", &key).unwrap();
        assert!(matches!(
            SecretBoxFieldCipher.decrypt(&separate, &key),
            Err(CryptoError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn wrong_nonce_length_is_malformed() {
        let key = DataKey::generate();
        let envelope = AesGcmFieldCipher.encrypt("x", &key).unwrap();
        let mut parsed = Envelope::parse(&envelope).unwrap();
        parsed.nonce.push(0);
        assert!(matches!(
            AesGcmFieldCipher.decrypt(&parsed.encode(), &key),
            Err(CryptoError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn truncated_secretbox_ciphertext_is_malformed() {
        let key = DataKey::generate();
        let envelope = SecretBoxFieldCipher.encrypt("", &key).unwrap();
        let mut parsed = Envelope::parse(&envelope).unwrap();
        parsed.ciphertext.truncate(TAG_SIZE - 1);
        assert!(matches!(
            SecretBoxFieldCipher.decrypt(&parsed.encode(), &key),
            Err(CryptoError::MalformedEnvelope(_))
        ));
    }
}
