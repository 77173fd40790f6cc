use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;
use versions::types::{CreatorType, SecurityCookie};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Creator id cannot be 0")]
    InvalidCreatorId,

    #[error("Security cookie is empty")]
    EmptyCookie,

    #[error("Database path is empty")]
    EmptyDatabasePath,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Deserialize, Debug)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Upstream platform endpoints and the creator whose catalog is served.
#[derive(Deserialize, Debug)]
pub struct Platform {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: Url,
    #[serde(default = "default_develop_url")]
    pub develop_url: Url,
    #[serde(default = "default_games_url")]
    pub games_url: Url,
    pub creator_type: CreatorType,
    pub creator_id: u64,
    /// Session cookie split into parts; the secret store caps entry size,
    /// so the credential arrives in pieces and is rejoined here.
    pub cookie_parts: Vec<String>,
}

impl Platform {
    pub fn security_cookie(&self) -> SecurityCookie {
        SecurityCookie::from_parts(&self.cookie_parts)
    }
}

#[derive(Deserialize, Debug)]
pub struct Database {
    pub path: String,
}

#[derive(Deserialize, Debug)]
pub struct Statsd {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_statsd_prefix")]
    pub prefix: String,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub platform: Platform,
    pub database: Database,
    pub statsd: Option<Statsd>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }

        if self.platform.creator_id == 0 {
            return Err(ValidationError::InvalidCreatorId);
        }

        if self.platform.cookie_parts.iter().all(|part| part.is_empty()) {
            return Err(ValidationError::EmptyCookie);
        }

        if self.database.path.is_empty() {
            return Err(ValidationError::EmptyDatabasePath);
        }

        Ok(())
    }
}

fn default_catalog_url() -> Url {
    Url::parse("https://apis.roblox.com").expect("static URL")
}

fn default_develop_url() -> Url {
    Url::parse("https://develop.roblox.com").expect("static URL")
}

fn default_games_url() -> Url {
    Url::parse("https://games.roblox.com").expect("static URL")
}

fn default_statsd_prefix() -> String {
    "roulette".into()
}
