//! Envault demo
//!
//! Walks the full envelope-encryption lifecycle against a local key
//! service: create a user with sensitive fields, show that only
//! ciphertext reaches the store, read the fields back, then exercise the
//! right to be forgotten.

use anyhow::Result;
use envault_config::{CipherKind, EnvaultConfig};
use envault_crypto::{AesGcmFieldCipher, FieldCipher, SecretBoxFieldCipher};
use envault_kms::{KeyService, LocalKms, MasterKeyRing};
use envault_logging::init_console_logging;
use envault_records::{MemoryUserStore, PgUserStore, User, UserData, UserStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_console_logging("envault-demo", "info");

    // Load configuration
    let config = EnvaultConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Provision the key service. The local adapter keeps master keys in
    // process; a configured id would belong to an external KMS.
    if let Some(configured) = &config.key_service.master_key_id {
        warn!(
            master_key_id = %configured,
            "Configured master key belongs to an external KMS; the local adapter provisions its own"
        );
    }

    let ring = Arc::new(MasterKeyRing::new());
    let master_key_id = match ring.list_master_keys().await.first() {
        Some(existing) => {
            info!(master_key_id = %existing.id, "Using existing master key");
            existing.id
        }
        None => ring.create_master_key("Envault demo master key").await,
    };
    let kms: Arc<dyn KeyService> = Arc::new(LocalKms::new(Arc::clone(&ring), master_key_id));

    let cipher: Arc<dyn FieldCipher> = match config.cipher {
        CipherKind::AesGcm => Arc::new(AesGcmFieldCipher),
        CipherKind::Secretbox => Arc::new(SecretBoxFieldCipher),
    };

    // Connect the store, falling back to memory when no database is set
    let store: Arc<dyn UserStore> = match config.database_url() {
        Some(url) => Arc::new(PgUserStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL not configured, using in-memory store");
            Arc::new(MemoryUserStore::new())
        }
    };

    // Create a user with sensitive data
    let mut user = User::new(
        Arc::clone(&store),
        Arc::clone(&kms),
        Arc::clone(&cipher),
        UserData {
            username: "john_doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "+1-555-123-4567".to_string(),
        },
    );
    user.save().await?;

    // Show what actually reached storage
    let row = store
        .find_by_username("john_doe")
        .await?
        .ok_or_else(|| anyhow::anyhow!("saved row not found"))?;
    info!(
        email_encrypted = preview(&row.email_encrypted),
        phone_encrypted = preview(&row.phone_encrypted),
        dek_encrypted = preview(&row.dek_encrypted),
        "Stored row holds only ciphertext"
    );

    // Retrieve and decrypt
    let mut retrieved = User::find_by_username(
        Arc::clone(&store),
        Arc::clone(&kms),
        Arc::clone(&cipher),
        "john_doe",
    )
    .await?
    .ok_or_else(|| anyhow::anyhow!("saved user not found"))?;
    // Plaintext stays out of the logs; report the outcome only.
    info!(
        username = retrieved.username(),
        round_trip_ok = retrieved.email() == user.email() && retrieved.phone() == user.phone(),
        "Sensitive fields decrypted (authorized access)"
    );

    // Right to be forgotten
    retrieved.forget().await?;

    let after = User::find_by_username(store, kms, cipher, "john_doe").await?;
    info!(
        user_exists = after.is_some(),
        "Lookup after forget"
    );

    info!("Demo completed");
    Ok(())
}

fn preview(text: &str) -> &str {
    &text[..text.len().min(48)]
}
