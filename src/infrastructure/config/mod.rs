use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::domain::config::AppConfig;
use crate::domain::error::{AppError, Result};

/// Environment variable naming an alternative TOML file
pub const CONFIG_PATH_ENV: &str = "REGIONTALES_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "regiontales.toml";
pub const ENV_PREFIX: &str = "REGIONTALES_";

/// Layers defaults, the TOML file and `REGIONTALES_*` variables
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self.figment().extract()?;
        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
