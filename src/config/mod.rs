//! Configuration loading for the Staffboard API.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `STAFFBOARD_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration derived from `STAFFBOARD_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// HMAC secret for signing session tokens; required for the prod profile
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
    /// Session token lifetime in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    /// Directory where submission uploads are stored
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Exact origin allowed by CORS (the frontend)
    #[serde(default = "default_cors_allowed_origin")]
    pub cors_allowed_origin: String,
    /// Insert demo organization/accounts/assignments at startup
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            session_secret: default_session_secret(),
            session_ttl_hours: default_session_ttl_hours(),
            upload_dir: default_upload_dir(),
            cors_allowed_origin: default_cors_allowed_origin(),
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if !config.session_secret.is_empty() {
            config.session_secret = "[REDACTED]".to_string();
        }
        serde_json::to_string(&config)
    }

    /// Validate configuration bounds and profile-dependent requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.session_ttl_hours == 0 || self.session_ttl_hours > 24 * 30 {
            return Err(ConfigError::InvalidSessionTtl {
                value: self.session_ttl_hours,
            });
        }

        // The built-in dev secret is acceptable anywhere except prod.
        if self.profile == "prod" && self.session_secret == default_session_secret() {
            return Err(ConfigError::MissingSessionSecret);
        }

        if self.upload_dir.trim().is_empty() {
            return Err(ConfigError::MissingUploadDir);
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "dev".to_string()
}

fn default_api_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://staffboard.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_session_secret() -> String {
    "staffboard-dev-secret".to_string()
}

fn default_session_ttl_hours() -> u64 {
    24
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_cors_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("database URL cannot be empty; set STAFFBOARD_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("session secret must be set for the prod profile; set STAFFBOARD_SESSION_SECRET")]
    MissingSessionSecret,
    #[error("session TTL must be between 1 and 720 hours, got {value}")]
    InvalidSessionTtl { value: u64 },
    #[error("upload directory cannot be empty; set STAFFBOARD_UPLOAD_DIR")]
    MissingUploadDir,
}

/// Loads configuration using layered `.env` files and `STAFFBOARD_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from layered env files and process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("STAFFBOARD_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let session_secret = layered
            .remove("SESSION_SECRET")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_session_secret);
        let session_ttl_hours = layered
            .remove("SESSION_TTL_HOURS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_session_ttl_hours);
        let upload_dir = layered
            .remove("UPLOAD_DIR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_upload_dir);
        let cors_allowed_origin = layered
            .remove("CORS_ALLOWED_ORIGIN")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_cors_allowed_origin);
        let seed_demo_data = layered
            .remove("SEED_DEMO_DATA")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            session_secret,
            session_ttl_hours,
            upload_dir,
            cors_allowed_origin,
            seed_demo_data,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("STAFFBOARD_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("STAFFBOARD_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.bind_addr().is_ok());
    }

    #[test]
    fn prod_profile_requires_real_secret() {
        let config = AppConfig {
            profile: "prod".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSessionSecret)
        ));

        let config = AppConfig {
            profile: "prod".to_string(),
            session_secret: "an-actual-secret".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn session_ttl_bounds() {
        let config = AppConfig {
            session_ttl_hours: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSessionTtl { value: 0 })
        ));
    }

    #[test]
    fn redacted_json_hides_secret() {
        let config = AppConfig {
            session_secret: "super-secret".to_string(),
            ..Default::default()
        };
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn loader_reads_layered_env_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "STAFFBOARD_API_BIND_ADDR=127.0.0.1:9100\nSTAFFBOARD_UPLOAD_DIR=files\nIGNORED=1\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(".env.local"),
            "STAFFBOARD_API_BIND_ADDR=127.0.0.1:9200\n",
        )
        .unwrap();

        let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
            .load()
            .unwrap();

        // .env.local overrides .env; unprefixed keys are ignored.
        assert_eq!(config.api_bind_addr, "127.0.0.1:9200");
        assert_eq!(config.upload_dir, "files");
    }
}
