mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path).await
}

pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    if !Path::new(config_path).exists() {
        debug!("No configuration file at {}, using defaults", config_path);
        return Ok(Config::default());
    }

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;
    config.validate()?;

    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.storage.enabled {
            if self.storage.bucket.trim().is_empty() {
                return Err(Error::config("storage.bucket must not be empty"));
            }
            if self.storage.backend == StorageBackend::Http && self.storage.endpoint.is_none() {
                return Err(Error::config("storage.endpoint is required for the http backend"));
            }
        }
        if self.model.dir.trim().is_empty() {
            return Err(Error::config("model.dir must not be empty"));
        }
        Ok(())
    }
}
