//! User Lifecycle Integration Tests
//!
//! Exercises save/load/forget against the in-memory store and the local
//! key service, the same wiring the demo uses without a database.

use envault_crypto::{AesGcmFieldCipher, FieldCipher, SecretBoxFieldCipher};
use envault_kms::{KeyService, KmsError, LocalKms, MasterKeyRing};
use envault_records::{MemoryUserStore, RecordError, User, UserData, UserStore};
use std::sync::Arc;

struct TestEnv {
    store: Arc<MemoryUserStore>,
    ring: Arc<MasterKeyRing>,
    kms: Arc<dyn KeyService>,
    cipher: Arc<dyn FieldCipher>,
}

async fn setup_with(cipher: Arc<dyn FieldCipher>) -> TestEnv {
    let store = Arc::new(MemoryUserStore::new());
    let ring = Arc::new(MasterKeyRing::new());
    let master_key_id = ring.create_master_key("test master key").await;
    let kms: Arc<dyn KeyService> = Arc::new(LocalKms::new(Arc::clone(&ring), master_key_id));
    TestEnv {
        store,
        ring,
        kms,
        cipher,
    }
}

async fn setup() -> TestEnv {
    setup_with(Arc::new(AesGcmFieldCipher)).await
}

fn john() -> UserData {
    UserData {
        username: "john_doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: "+1-555-123-4567".to_string(),
    }
}

fn new_user(env: &TestEnv, data: UserData) -> User {
    User::new(
        Arc::clone(&env.store) as Arc<dyn UserStore>,
        Arc::clone(&env.kms),
        Arc::clone(&env.cipher),
        data,
    )
}

async fn load(env: &TestEnv, username: &str) -> Option<User> {
    User::find_by_username(
        Arc::clone(&env.store) as Arc<dyn UserStore>,
        Arc::clone(&env.kms),
        Arc::clone(&env.cipher),
        username,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn save_stores_only_ciphertext() {
    let env = setup().await;
    let mut user = new_user(&env, john());

    user.save().await.unwrap();
    assert!(user.id().is_some());

    let row = env
        .store
        .find_by_username("john_doe")
        .await
        .unwrap()
        .unwrap();
    assert!(!row.email_encrypted.is_empty());
    assert!(!row.phone_encrypted.is_empty());
    assert!(!row.dek_encrypted.is_empty());
    assert_ne!(row.email_encrypted, "john.doe@example.com");
    assert_ne!(row.phone_encrypted, "+1-555-123-4567");
}

#[tokio::test]
async fn round_trips_through_storage_with_both_ciphers() {
    for cipher in [
        Arc::new(AesGcmFieldCipher) as Arc<dyn FieldCipher>,
        Arc::new(SecretBoxFieldCipher) as Arc<dyn FieldCipher>,
    ] {
        let env = setup_with(cipher).await;
        let mut user = new_user(&env, john());
        user.save().await.unwrap();

        let loaded = load(&env, "john_doe").await.unwrap();
        assert_eq!(loaded.username(), "john_doe");
        assert_eq!(loaded.email(), "john.doe@example.com");
        assert_eq!(loaded.phone(), "+1-555-123-4567");
    }
}

#[tokio::test]
async fn load_missing_user_returns_none() {
    let env = setup().await;
    assert!(load(&env, "nobody").await.is_none());
}

#[tokio::test]
async fn update_reuses_the_stored_data_key() {
    let env = setup().await;
    let mut user = new_user(&env, john());
    user.save().await.unwrap();

    let before = env
        .store
        .find_by_username("john_doe")
        .await
        .unwrap()
        .unwrap();

    user.set_email("new.address@example.com");
    user.save().await.unwrap();

    let after = env
        .store
        .find_by_username("john_doe")
        .await
        .unwrap()
        .unwrap();

    // Same wrapped key, fresh ciphertexts for every field.
    assert_eq!(after.dek_encrypted, before.dek_encrypted);
    assert_ne!(after.email_encrypted, before.email_encrypted);
    assert_ne!(after.phone_encrypted, before.phone_encrypted);

    let loaded = load(&env, "john_doe").await.unwrap();
    assert_eq!(loaded.email(), "new.address@example.com");
    assert_eq!(loaded.phone(), "+1-555-123-4567");
}

#[tokio::test]
async fn forget_removes_the_row_and_clears_memory() {
    let env = setup().await;
    let mut user = new_user(&env, john());
    user.save().await.unwrap();

    let mut loaded = load(&env, "john_doe").await.unwrap();
    loaded.forget().await.unwrap();

    assert!(load(&env, "john_doe").await.is_none());
    assert!(loaded.id().is_none());
    assert_eq!(loaded.email(), "");
    assert_eq!(loaded.phone(), "");
}

#[tokio::test]
async fn forget_on_a_transient_user_fails() {
    let env = setup().await;
    let mut user = new_user(&env, john());

    assert!(matches!(
        user.forget().await,
        Err(RecordError::NotPersisted)
    ));
}

#[tokio::test]
async fn resave_after_forget_creates_a_fresh_record() {
    let env = setup().await;
    let mut user = new_user(&env, john());
    user.save().await.unwrap();

    let first_id = user.id().unwrap();
    let first_dek = env
        .store
        .find_by_username("john_doe")
        .await
        .unwrap()
        .unwrap()
        .dek_encrypted;

    user.forget().await.unwrap();

    user.set_email("john.doe@example.com");
    user.set_phone("+1-555-123-4567");
    user.save().await.unwrap();

    let second_id = user.id().unwrap();
    let second_dek = env
        .store
        .find_by_username("john_doe")
        .await
        .unwrap()
        .unwrap()
        .dek_encrypted;

    assert_ne!(second_id, first_id);
    assert_ne!(second_dek, first_dek);
}

#[tokio::test]
async fn save_after_a_concurrent_forget_recreates_the_record() {
    let env = setup().await;
    let mut original = new_user(&env, john());
    original.save().await.unwrap();
    let original_id = original.id().unwrap();

    let mut other_handle = load(&env, "john_doe").await.unwrap();
    other_handle.forget().await.unwrap();

    // The stale handle still carries the old identity; saving it must
    // produce a new record rather than resurrect the deleted one.
    original.save().await.unwrap();
    let new_id = original.id().unwrap();

    assert_ne!(new_id, original_id);
    assert!(load(&env, "john_doe").await.is_some());
}

#[tokio::test]
async fn mismatched_cipher_adapter_fails_closed() {
    let env = setup().await;
    let mut user = new_user(&env, john());
    user.save().await.unwrap();

    let result = User::find_by_username(
        Arc::clone(&env.store) as Arc<dyn UserStore>,
        Arc::clone(&env.kms),
        Arc::new(SecretBoxFieldCipher),
        "john_doe",
    )
    .await;

    assert!(matches!(result, Err(RecordError::Crypto(_))));
}

#[tokio::test]
async fn disabling_the_master_key_blocks_reads() {
    let env = setup().await;
    let mut user = new_user(&env, john());
    user.save().await.unwrap();

    let master_key_id = env.ring.list_master_keys().await[0].id;
    env.ring.disable_master_key(&master_key_id).await.unwrap();

    let result = User::find_by_username(
        Arc::clone(&env.store) as Arc<dyn UserStore>,
        Arc::clone(&env.kms),
        Arc::clone(&env.cipher),
        "john_doe",
    )
    .await;

    assert!(matches!(
        result,
        Err(RecordError::Key(KmsError::MasterKeyDisabled(_)))
    ));
}
