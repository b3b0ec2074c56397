//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/risktag/config.toml)
//! 3. Project config (.risktag/config.toml)
//! 4. Environment variables (RISKTAG_* prefix, `__` as the key separator)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::Config;
use crate::types::{Result, RiskError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. RISKTAG_GATEWAY__MODEL_ID -> gateway.model_id
        figment = figment.merge(Env::prefixed("RISKTAG_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| RiskError::Config(format!("configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only (plus defaults)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| RiskError::Config(format!("configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Path to the global config file (~/.config/risktag/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "risktag").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Path to the project config file (.risktag/config.toml)
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".risktag").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[gateway]
model_id = "anthropic.claude-3-5-sonnet-20240620-v1:0"

[classification]
batch_size = 12
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.gateway.model_id,
            "anthropic.claude-3-5-sonnet-20240620-v1:0"
        );
        assert_eq!(config.classification.batch_size, 12);
        // Untouched sections keep their defaults
        assert_eq!(config.classification.concurrency, 2);
        assert!(config.taxonomy.file.is_none());
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[classification]\nbatch_size = 0").unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::load_from_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.classification.batch_size, 5);
    }
}
