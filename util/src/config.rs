//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.
//!
//! Most callers use the free accessor functions (`config::port()`,
//! `config::autosave_interval_ms()`, ...) rather than holding the lock.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    /// Period of the worksheet autosave timer.
    pub autosave_interval_ms: u64,
    /// How long a `saving`/`saved`/`error` indicator stays up before reverting to idle.
    pub save_status_revert_ms: u64,
    /// Upper bound on a boundary message body, in bytes.
    pub max_snapshot_bytes: usize,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing or unparsable values fall back to development defaults, except
    /// that a production environment without `JWT_SECRET` is refused.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env_name = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if env_name == "production" => panic!("JWT_SECRET is required in production"),
            Err(_) => "worksheet-hub-dev-secret".into(),
        };

        Self {
            env: env_name,
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "worksheet-hub".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info,sqlx=warn".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/worksheet-hub.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parsed_or("PORT", 3000),
            jwt_secret,
            jwt_duration_minutes: parsed_or("JWT_DURATION_MINUTES", 60),
            autosave_interval_ms: parsed_or("AUTOSAVE_INTERVAL_MS", 3000),
            save_status_revert_ms: parsed_or("SAVE_STATUS_REVERT_MS", 2000),
            max_snapshot_bytes: parsed_or("MAX_SNAPSHOT_BYTES", 256 * 1024),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_autosave_interval_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.autosave_interval_ms = value);
    }

    pub fn set_save_status_revert_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.save_status_revert_ms = value);
    }

    pub fn set_max_snapshot_bytes(value: usize) {
        AppConfig::set_field(|cfg| cfg.max_snapshot_bytes = value);
    }
}

// --- Free accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn autosave_interval_ms() -> u64 {
    AppConfig::global().autosave_interval_ms
}

pub fn save_status_revert_ms() -> u64 {
    AppConfig::global().save_status_revert_ms
}

pub fn max_snapshot_bytes() -> usize {
    AppConfig::global().max_snapshot_bytes
}
