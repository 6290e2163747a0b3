use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::info;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "Manitto.toml";
pub const ENV_PREFIX: &str = "MANITTO_";

pub struct ConfigService {
    config_path: PathBuf,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}

impl ConfigService {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Defaults, then the TOML file if present, then `MANITTO_*` environment variables.
    pub fn load(&self) -> Result<AppConfig> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(env_file = %path.display(), "Loaded environment file");
        }

        let config: AppConfig = self.figment().extract()?;
        validate(&config)?;

        info!(
            data_file = %config.data_file.display(),
            export_encoding = %config.export_encoding,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.config_path))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if encoding_rs::Encoding::for_label(config.export_encoding.as_bytes()).is_none() {
        return Err(AppError::ConfigError(format!(
            "Unknown export encoding: {}",
            config.export_encoding
        )));
    }
    if config.admin_password.is_empty() {
        return Err(AppError::ConfigError(
            "admin_password must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(dir.path().join("missing.toml"));
        let config: AppConfig = service.figment().extract().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.data_file, PathBuf::from("result.json"));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Manitto.toml");
        fs::write(
            &path,
            "admin_password = \"xmas2024\"\nexport_encoding = \"utf-8\"\nport = 8080\n",
        )
        .unwrap();

        let config: AppConfig = ConfigService::new(&path).figment().extract().unwrap();
        assert_eq!(config.admin_password, "xmas2024");
        assert_eq!(config.export_encoding, "utf-8");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let config = AppConfig::default().with_export_encoding("klingon");
        assert!(matches!(validate(&config), Err(AppError::ConfigError(_))));
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
