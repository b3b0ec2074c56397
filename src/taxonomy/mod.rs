//! Reference Taxonomy
//!
//! The closed value sets that bound all classification output: concern
//! events, emerging risks, misc topics, and the NAICS code table.
//!
//! Loaded once at process start and shared immutably (`Arc<Taxonomy>`)
//! across all concurrent compilations and classifications. Membership is
//! exact-match: the pipeline never normalizes case or whitespace, because
//! stored fields must contain taxonomy values verbatim.

pub mod reference;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::types::{Result, RiskError};

/// One NAICS industry classification entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaicsEntry {
    pub code: String,
    pub description: String,
}

/// Immutable reference taxonomy shared by both core components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    concerns: Vec<String>,
    emerging_risks: Vec<String>,
    misc_topics: Vec<String>,
    naics: Vec<NaicsEntry>,
}

impl Taxonomy {
    /// The builtin reference lists compiled into the crate
    pub fn builtin() -> Self {
        Self {
            concerns: reference::CONCERN_EVENTS.iter().map(|s| s.to_string()).collect(),
            emerging_risks: reference::EMERGING_RISKS.iter().map(|s| s.to_string()).collect(),
            misc_topics: reference::MISC_TOPICS.iter().map(|s| s.to_string()).collect(),
            naics: reference::NAICS_TABLE
                .iter()
                .map(|(code, description)| NaicsEntry {
                    code: code.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    /// Load an override taxonomy from a YAML file.
    ///
    /// The file must provide all four lists; empty lists are rejected
    /// because an empty reference set would silently blank every
    /// classification.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let taxonomy: Taxonomy = serde_yaml::from_str(&raw)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    fn validate(&self) -> Result<()> {
        if self.concerns.is_empty()
            || self.emerging_risks.is_empty()
            || self.misc_topics.is_empty()
            || self.naics.is_empty()
        {
            return Err(RiskError::Taxonomy(
                "taxonomy lists must all be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    pub fn is_concern(&self, value: &str) -> bool {
        self.concerns.iter().any(|c| c == value)
    }

    pub fn is_emerging_risk(&self, value: &str) -> bool {
        self.emerging_risks.iter().any(|r| r == value)
    }

    pub fn is_misc_topic(&self, value: &str) -> bool {
        self.misc_topics.iter().any(|t| t == value)
    }

    /// True when `code` and `description` form an exact reference pair
    pub fn is_naics_pair(&self, code: &str, description: &str) -> bool {
        self.naics
            .iter()
            .any(|e| e.code == code && e.description == description)
    }

    pub fn naics_by_code(&self, code: &str) -> Option<&NaicsEntry> {
        self.naics.iter().find(|e| e.code == code)
    }

    // =========================================================================
    // Prompt embedding
    // =========================================================================

    /// First `n` concern events joined with `", "`, with a trailing
    /// ellipsis marker when the list was truncated
    pub fn concerns_preview(&self, n: usize) -> String {
        preview(&self.concerns, n)
    }

    /// First `n` emerging risks, same truncation behavior
    pub fn emerging_risks_preview(&self, n: usize) -> String {
        preview(&self.emerging_risks, n)
    }

    /// Misc topics are small enough to embed in full
    pub fn misc_topics_joined(&self) -> String {
        self.misc_topics.join(", ")
    }

    /// Full NAICS table as `code - description` pairs
    pub fn naics_joined(&self) -> String {
        self.naics
            .iter()
            .map(|e| format!("{} - {}", e.code, e.description))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn concerns(&self) -> &[String] {
        &self.concerns
    }

    pub fn emerging_risks(&self) -> &[String] {
        &self.emerging_risks
    }

    pub fn misc_topics(&self) -> &[String] {
        &self.misc_topics
    }

    pub fn naics(&self) -> &[NaicsEntry] {
        &self.naics
    }
}

fn preview(values: &[String], n: usize) -> String {
    if values.len() <= n {
        values.join(", ")
    } else {
        format!("{}...", values[..n].join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_membership_is_exact() {
        let tax = Taxonomy::builtin();
        assert!(tax.is_concern("lawsuits"));
        assert!(!tax.is_concern("Lawsuits"));
        assert!(tax.is_emerging_risk("PFAS"));
        assert!(!tax.is_emerging_risk("pfas contamination"));
        assert!(tax.is_misc_topic("personal auto"));
        assert!(!tax.is_misc_topic("commercial auto"));
    }

    #[test]
    fn test_naics_pair_requires_both_halves() {
        let tax = Taxonomy::builtin();
        assert!(tax.is_naics_pair("327910", "Abrasive Product Manufacturing"));
        assert!(!tax.is_naics_pair("327910", "Abrasives"));
        assert!(!tax.is_naics_pair("000000", "Abrasive Product Manufacturing"));
        assert_eq!(
            tax.naics_by_code("622110").map(|e| e.description.as_str()),
            Some("General Medical and Surgical Hospitals")
        );
    }

    #[test]
    fn test_preview_truncates_with_marker() {
        let tax = Taxonomy::builtin();
        let sampled = tax.concerns_preview(20);
        assert!(sampled.ends_with("..."));
        assert_eq!(sampled.matches(", ").count(), 19);

        // Misc list is shorter than the window, no marker
        let full = preview(tax.misc_topics(), 20);
        assert!(!full.ends_with("..."));
    }

    #[test]
    fn test_yaml_override_round_trip() {
        let tax = Taxonomy::builtin();
        let yaml = serde_yaml::to_string(&tax).unwrap();
        let parsed: Taxonomy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.concerns(), tax.concerns());
        assert_eq!(parsed.naics(), tax.naics());
    }

    #[test]
    fn test_empty_override_rejected() {
        let empty: Taxonomy = serde_yaml::from_str(
            "concerns: []\nemerging_risks: []\nmisc_topics: []\nnaics: []\n",
        )
        .unwrap();
        assert!(empty.validate().is_err());
    }
}
