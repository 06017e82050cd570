use crate::models::Principal;
use crate::routing::RouteTable;
use crate::token::{TokenSigning, DEFAULT_TTL_MS};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a directory with a higher-priority Settings.toml
pub const CONFIG_DIR_ENV: &str = "SESSIONGUARD_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGuardSettings {
    #[serde(default)]
    pub token: TokenSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Principals seeded into the credential store at startup
    #[serde(default = "default_users")]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Token lifetime in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: i64,
    /// Signature mode; `none` writes a constant placeholder signature
    #[serde(default)]
    pub signing: TokenSigning,
    /// HMAC key, only used when `signing = "hmac-sha256"`
    #[serde(default)]
    pub signing_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Location of the persisted record for the file backend
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_token_key")]
    pub token_key: String,
    #[serde(default = "default_user_key")]
    pub user_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    pub root: String,
    pub login_path: String,
    pub dashboard_path: String,
    pub public: Vec<String>,
    pub protected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: u64,
    pub email: String,
    pub secret: String,
}

// Helper functions for serde defaults
fn default_ttl_ms() -> i64 { DEFAULT_TTL_MS }
fn default_storage_path() -> String { ".sessionguard/session.json".to_string() }
fn default_token_key() -> String { "authToken".to_string() }
fn default_user_key() -> String { "user".to_string() }

fn default_users() -> Vec<SeedUser> {
    vec![SeedUser {
        id: 1,
        email: "user@example.com".to_string(),
        secret: "password123".to_string(),
    }]
}

impl Default for SessionGuardSettings {
    fn default() -> Self {
        Self {
            token: TokenSettings::default(),
            storage: StorageSettings::default(),
            routes: RouteSettings::default(),
            logging: LoggingSettings::default(),
            users: default_users(),
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            signing: TokenSigning::None,
            signing_secret: String::new(), // Generated if HMAC signing is enabled
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: default_storage_path(),
            token_key: default_token_key(),
            user_key: default_user_key(),
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            public: vec!["/login".to_string(), "/signup".to_string()],
            protected: vec![
                "/dashboard".to_string(),
                "/verify-email".to_string(),
                "/activate-2fa".to_string(),
                "/activate-mfa".to_string(),
                "/otp".to_string(),
            ],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SeedUser {
    #[must_use]
    pub fn to_principal(&self) -> Principal {
        Principal::new(self.id, &self.email, &self.secret)
    }
}

impl SessionGuardSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - The resulting settings fail validation
    pub fn load() -> Result<Self> {
        Self::load_env_file();

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        Self::init_logging(&settings.logging);
        settings.validate()?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `SESSIONGUARD_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self> {
        let mut settings = Self::default();

        let default_config_path = PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(config_dir) = std::env::var(CONFIG_DIR_ENV) {
            let config_path = Path::new(&config_dir).join("Settings.toml");
            if config_path.exists() {
                settings = Self::from_file(&config_path)?;
                println!("✓ Overriding settings from {}", config_path.display());
            } else {
                println!(
                    "ℹ {CONFIG_DIR_ENV} set but no Settings.toml found at: {}",
                    config_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a Settings.toml file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&toml_content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has the wrong shape
    pub fn from_toml(toml_content: &str) -> Result<Self> {
        Ok(basic_toml::from_str(toml_content)?)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_token_env_overrides(&mut settings.token);
        Self::apply_storage_env_overrides(&mut settings.storage);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for token settings
    pub fn apply_token_env_overrides(token_settings: &mut TokenSettings) {
        if let Ok(ttl_str) = std::env::var("TOKEN_TTL_MS") {
            if let Ok(ttl) = ttl_str.parse::<i64>() {
                token_settings.ttl_ms = ttl;
            }
        }
        if let Ok(signing_str) = std::env::var("TOKEN_SIGNING") {
            match signing_str.parse::<TokenSigning>() {
                Ok(signing) => token_settings.signing = signing,
                Err(e) => eprintln!("⚠️  Ignoring TOKEN_SIGNING: {e}"),
            }
        }

        Self::handle_signing_secret_override(token_settings);
    }

    /// Helper function to handle signing secret environment override and generation
    fn handle_signing_secret_override(token_settings: &mut TokenSettings) {
        if let Ok(secret) = std::env::var("TOKEN_SIGNING_SECRET") {
            if !secret.is_empty() {
                token_settings.signing_secret = secret;
            }
        }

        // Generate random signing secret if signing is on and no secret was configured
        if token_settings.signing == TokenSigning::HmacSha256
            && token_settings.signing_secret.is_empty()
        {
            token_settings.signing_secret = Self::generate_random_signing_secret();
            Self::warn_about_generated_secret();
        }
    }

    /// Generates 32 bytes (256 bits) of entropy for the HMAC key
    fn generate_random_signing_secret() -> String {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        general_purpose::STANDARD.encode(secret)
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated token signing secret");
        eprintln!("🔒 Set TOKEN_SIGNING_SECRET or token.signing_secret in Settings.toml");
        eprintln!("💡 Tokens issued before a restart will stop validating");
    }

    /// Apply environment overrides for storage settings
    fn apply_storage_env_overrides(storage_settings: &mut StorageSettings) {
        if let Ok(backend) = std::env::var("STORAGE_BACKEND") {
            match backend.trim().to_ascii_lowercase().as_str() {
                "memory" => storage_settings.backend = StorageBackend::Memory,
                "file" => storage_settings.backend = StorageBackend::File,
                other => eprintln!("⚠️  Ignoring unknown STORAGE_BACKEND '{other}'"),
            }
        }
        if let Ok(path) = std::env::var("STORAGE_PATH") {
            storage_settings.path = path;
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Initialise `env_logger` at the configured level
    ///
    /// A logger that is already installed is left in place.
    pub fn init_logging(logging_settings: &LoggingSettings) {
        let env = env_logger::Env::default().default_filter_or(logging_settings.level.as_str());
        if env_logger::Builder::from_env(env).try_init().is_err() {
            log::debug!("Logger already initialised");
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Check settings for values the session manager cannot work with
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token lifetime is not positive
    /// - HMAC signing is enabled without a secret
    /// - Storage keys are empty or identical
    /// - Two seeded users share an id or an email
    /// - Any route path is unsafe or the route lists conflict
    pub fn validate(&self) -> Result<()> {
        if self.token.ttl_ms <= 0 {
            bail!("token.ttl_ms must be positive, got {}", self.token.ttl_ms);
        }
        if self.token.signing == TokenSigning::HmacSha256 && self.token.signing_secret.is_empty()
        {
            bail!("token.signing_secret is required for hmac-sha256 signing");
        }
        if self.storage.token_key.is_empty() || self.storage.user_key.is_empty() {
            bail!("storage keys must not be empty");
        }
        if self.storage.token_key == self.storage.user_key {
            bail!("storage.token_key and storage.user_key must differ");
        }
        self.validate_users()?;
        RouteTable::from_settings(&self.routes)?;
        Ok(())
    }

    /// Seeded principals must have distinct ids and distinct emails
    fn validate_users(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut emails = HashSet::new();
        for user in &self.users {
            if user.email.trim().is_empty() {
                bail!("users entry {} has an empty email", user.id);
            }
            if !ids.insert(user.id) {
                bail!("duplicate user id {} in [[users]]", user.id);
            }
            if !emails.insert(user.email.as_str()) {
                bail!("duplicate user email {} in [[users]]", user.email);
            }
        }
        Ok(())
    }

    /// Build the route table for these settings
    ///
    /// # Errors
    ///
    /// Returns an error if a configured route path is invalid
    pub fn route_table(&self) -> Result<RouteTable> {
        Ok(RouteTable::from_settings(&self.routes)?)
    }

    /// Principals to seed into the credential store
    #[must_use]
    pub fn seed_principals(&self) -> Vec<Principal> {
        self.users.iter().map(SeedUser::to_principal).collect()
    }
}
