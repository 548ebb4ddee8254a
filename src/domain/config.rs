// ============================================================
// APPLICATION CONFIGURATION
// ============================================================
// Values layered from defaults, TOML file and environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::domain::binding::{Role, RoleCandidates};
use crate::domain::selection::DEFAULT_PLACEHOLDER;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_app_config"))]
pub struct AppConfig {
    /// Delimited text file holding one row per region
    pub data_path: PathBuf,

    /// Directory searched for `<character>.<ext>` illustrations
    pub image_dir: PathBuf,

    /// Field delimiter; detected from the file when absent
    pub delimiter: Option<char>,

    /// Shown instead of blank cells
    #[validate(length(min = 1))]
    pub placeholder: String,

    pub candidates: RoleCandidates,

    #[validate(nested)]
    pub server: ServerConfig,

    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/regions.csv"),
            image_dir: PathBuf::from("images"),
            delimiter: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            candidates: RoleCandidates::default(),
            server: ServerConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Delimiter as a byte for the CSV reader
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter
            .filter(char::is_ascii)
            .map(|c| c as u8)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

fn validate_app_config(config: &AppConfig) -> Result<(), ValidationError> {
    if let Some(delimiter) = config.delimiter {
        if !delimiter.is_ascii() {
            let mut err = ValidationError::new("delimiter_not_ascii");
            err.message = Some(format!("delimiter '{}' must be an ASCII character", delimiter).into());
            return Err(err);
        }
    }

    for role in Role::ALL {
        if config
            .candidates
            .for_role(role)
            .iter()
            .any(|candidate| candidate.trim().is_empty())
        {
            let mut err = ValidationError::new("blank_candidate");
            err.message = Some(format!("{} candidates must not contain blank entries", role).into());
            return Err(err);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let config = AppConfig {
            delimiter: Some('、'),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.delimiter_byte(), None);
    }

    #[test]
    fn test_rejects_blank_candidates() {
        let mut config = AppConfig::default();
        config.candidates.feature.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_placeholder_and_port_zero() {
        let mut config = AppConfig {
            placeholder: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.placeholder = "-".to_string();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delimiter_byte() {
        let config = AppConfig {
            delimiter: Some(';'),
            ..Default::default()
        };
        assert_eq!(config.delimiter_byte(), Some(b';'));
    }
}
