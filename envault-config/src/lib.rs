//! Configuration management for Envault services

use serde::Deserialize;
use std::env;

/// Which field cipher adapter to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherKind {
    /// AES-256-GCM, three-part envelope
    AesGcm,
    /// XChaCha20-Poly1305 secret box, two-part envelope
    Secretbox,
}

/// Key service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeyServiceConfig {
    /// Master key identifier to wrap data keys under.
    /// When absent, the demo provisions a fresh master key at startup.
    pub master_key_id: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnvaultConfig {
    pub key_service: KeyServiceConfig,
    pub database: Option<DatabaseConfig>,
    pub cipher: CipherKind,
    pub log_level: Option<String>,
}

impl EnvaultConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let master_key_id = env::var("ENVAULT_MASTER_KEY_ID").ok();

        let cipher = match env::var("ENVAULT_CIPHER").as_deref() {
            Ok("secretbox") => CipherKind::Secretbox,
            Ok("aes-gcm") | Err(_) => CipherKind::AesGcm,
            Ok(other) => {
                return Err(config::ConfigError::Message(format!(
                    "Unknown ENVAULT_CIPHER value: {}",
                    other
                )))
            }
        };

        let database = env::var("DATABASE_URL")
            .ok()
            .map(|url| DatabaseConfig { url });

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            key_service: KeyServiceConfig { master_key_id },
            database,
            cipher,
            log_level: Some(log_level),
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Get database URL, if a database is configured
    pub fn database_url(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.url.as_str())
    }
}
