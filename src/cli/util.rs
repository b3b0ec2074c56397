//! CLI Wiring Helpers
//!
//! Builds the shared collaborators (taxonomy, gateway, article files)
//! every subcommand needs.

use std::path::Path;
use std::sync::Arc;

use crate::ai::{BedrockGateway, EnvTokenProvider, LlmGateway};
use crate::config::Config;
use crate::taxonomy::Taxonomy;
use crate::types::{ArticleRecord, Result, RiskError};

/// Taxonomy from the configured override file, or the builtin lists
pub fn load_taxonomy(config: &Config) -> Result<Arc<Taxonomy>> {
    let taxonomy = match &config.taxonomy.file {
        Some(path) => Taxonomy::from_yaml_file(path)?,
        None => Taxonomy::builtin(),
    };
    Ok(taxonomy.into_shared())
}

/// Gateway against the configured endpoint with env-backed credentials
pub fn build_gateway(config: &Config) -> Result<Arc<dyn LlmGateway>> {
    let provider = EnvTokenProvider::new(config.gateway.token_env.as_str());
    let gateway = BedrockGateway::new(&config.gateway.endpoint_url, Box::new(provider))?;
    Ok(Arc::new(gateway))
}

/// Read a JSON array of article records
pub fn load_articles(path: &Path) -> Result<Vec<ArticleRecord>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RiskError::Store(format!("cannot read {}: {}", path.display(), e)))?;
    let records: Vec<ArticleRecord> = serde_json::from_str(&raw)?;
    Ok(records)
}

/// Write records back out as pretty-printed JSON
pub fn save_articles(path: &Path, records: &[ArticleRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_article_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"URL": "https://a", "DateTime": "2025-11-02T10:00:00Z", "Tag": ""}}]"#
        )
        .unwrap();

        let records = load_articles(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].tag.is_none());

        let out = tempfile::NamedTempFile::new().unwrap();
        save_articles(out.path(), &records).unwrap();
        let reloaded = load_articles(out.path()).unwrap();
        assert_eq!(reloaded, records);
    }
}
