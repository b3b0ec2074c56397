//! Configuration Types
//!
//! All configuration structures with sensible defaults. Supports global
//! (~/.config/risktag/) and project (.risktag/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{batch, model};
use crate::types::{Result, RiskError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model gateway settings
    pub gateway: GatewayConfig,

    /// Batch classification settings
    pub classification: ClassificationConfig,

    /// Reference taxonomy settings
    pub taxonomy: TaxonomyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            gateway: GatewayConfig::default(),
            classification: ClassificationConfig::default(),
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `RiskError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.endpoint_url.trim().is_empty() {
            return Err(RiskError::Config(
                "gateway endpoint_url must not be empty".to_string(),
            ));
        }
        if self.gateway.model_id.trim().is_empty() {
            return Err(RiskError::Config(
                "gateway model_id must not be empty".to_string(),
            ));
        }
        if self.classification.batch_size == 0 {
            return Err(RiskError::Config(
                "classification batch_size must be greater than 0".to_string(),
            ));
        }
        if self.classification.concurrency == 0 {
            return Err(RiskError::Config(
                "classification concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Gateway Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Invoke endpoint of the hosted model runtime
    pub endpoint_url: String,

    /// Model identifier sent with every completion request
    pub model_id: String,

    /// Environment variable holding the session token
    pub token_env: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint_url: model::DEFAULT_ENDPOINT_URL.to_string(),
            model_id: model::DEFAULT_MODEL_ID.to_string(),
            token_env: "RISKTAG_SESSION_TOKEN".to_string(),
        }
    }
}

// =============================================================================
// Classification Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Records classified per batch sweep
    pub batch_size: usize,

    /// Concurrent article classifications
    pub concurrency: usize,

    /// Caller-level retries for gateway-failed articles
    pub max_retries: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            batch_size: batch::DEFAULT_BATCH_SIZE,
            concurrency: batch::DEFAULT_CONCURRENCY,
            max_retries: batch::MAX_RETRY_ATTEMPTS,
        }
    }
}

// =============================================================================
// Taxonomy Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Optional YAML file overriding the builtin reference lists
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = Config::default();
        config.classification.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_id_rejected() {
        let mut config = Config::default();
        config.gateway.model_id = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
