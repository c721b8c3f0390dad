use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::token::{TokenSettings, DEFAULT_HEADER_PREFIX};

pub const DEFAULT_JWT_SECRET: &str = "inkpost-development-secret";
pub const JWT_SECRET_ENV: &str = "INKPOST_JWT_SECRET";
pub const DATABASE_ENV: &str = "INKPOST_DATABASE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub jwt: JwtConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "inkpost.db".to_string(),
            port: 3000,
            cors_origin: None,
            jwt: JwtConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_seconds: i64,
    pub refresh_expiration_days: i64,
    pub header_prefix: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            expiration_seconds: 300,
            refresh_expiration_days: 7,
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    /// Read the TOML file if one is given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            self.jwt.secret = secret;
        }
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            self.database = database;
        }
        self
    }

    /// True when neither the config file nor the environment set a secret
    pub fn uses_default_secret(&self) -> bool {
        self.jwt.secret == DEFAULT_JWT_SECRET
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.jwt.secret.clone(),
            expiration: Duration::seconds(self.jwt.expiration_seconds),
            refresh_expiration: Duration::days(self.jwt.refresh_expiration_days),
            header_prefix: self.jwt.header_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = AppConfig::from_toml(
            r#"
port = 8080

[jwt]
expiration_seconds = 60
"#,
        )
        .expect("valid toml");

        assert_eq!(config.port, 8080);
        assert_eq!(config.database, "inkpost.db");
        assert_eq!(config.jwt.expiration_seconds, 60);
        assert_eq!(config.jwt.refresh_expiration_days, 7);
        assert_eq!(config.jwt.header_prefix, "JWT");
    }

    #[test]
    fn token_settings_follow_config() {
        let mut config = AppConfig::default();
        config.jwt.secret = "s".to_string();
        config.jwt.expiration_seconds = 90;

        let settings = config.token_settings();
        assert_eq!(settings.secret, "s");
        assert_eq!(settings.expiration, Duration::seconds(90));
        assert_eq!(settings.refresh_expiration, Duration::days(7));
    }

    #[test]
    fn default_secret_is_detected() {
        assert!(AppConfig::default().uses_default_secret());

        let config = AppConfig::from_toml("[jwt]\nsecret = \"rotated\"").expect("valid toml");
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(AppConfig::from_toml("port = \"eighty\"").is_err());
    }
}
