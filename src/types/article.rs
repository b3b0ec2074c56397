//! Article Record Types
//!
//! The stored unit: one crawled news article plus its classification
//! fields. Serde names mirror the store's PascalCase attribute names
//! exactly so records round-trip through the adapter unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::RiskError;

// =============================================================================
// Tag
// =============================================================================

/// Classification tag assigned by the pipeline's final stage.
///
/// `Tag` is a pure function of the other classification fields (see
/// [`crate::classify::assign_tag`]); `ProcessingError` is only ever
/// produced by the pipeline's failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Current,
    #[serde(rename = "Potential New Trend")]
    PotentialNewTrend,
    Untagged,
    #[serde(rename = "Processing Error")]
    ProcessingError,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Current => "Current",
            Tag::PotentialNewTrend => "Potential New Trend",
            Tag::Untagged => "Untagged",
            Tag::ProcessingError => "Processing Error",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Current" => Ok(Tag::Current),
            "Potential New Trend" => Ok(Tag::PotentialNewTrend),
            "Untagged" => Ok(Tag::Untagged),
            "Processing Error" => Ok(Tag::ProcessingError),
            other => Err(RiskError::InvalidInput(format!("unknown tag: {}", other))),
        }
    }
}

// =============================================================================
// Article Record
// =============================================================================

/// One crawled article as stored in the backing table.
///
/// `(URL, DateTime)` uniquely identifies a record. Multi-value
/// classification fields are flat `;`-joined strings; values, once
/// present, are always members of the reference taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Partition key, unique per article
    #[serde(rename = "URL")]
    pub url: String,

    /// Sort key, ISO-8601, set at ingestion and immutable
    #[serde(rename = "DateTime")]
    pub date_time: String,

    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Full article text used for classification
    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Model-generated insurance-relevant summary
    #[serde(
        rename = "ReasonIdentified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reason_identified: Option<String>,

    /// `;`-joined subset of the concern-events taxonomy
    #[serde(rename = "Concerns", default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,

    /// `;`-joined subset of the emerging-risks taxonomy
    #[serde(
        rename = "EmergingRiskName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub emerging_risk_name: Option<String>,

    /// `;`-joined subset of the misc-topics taxonomy
    #[serde(rename = "MiscTopics", default, skip_serializing_if = "Option::is_none")]
    pub misc_topics: Option<String>,

    /// NAICS pair: both set (an exact taxonomy entry) or both null
    #[serde(rename = "NAICSCODE", default, skip_serializing_if = "Option::is_none")]
    pub naics_code: Option<String>,

    #[serde(
        rename = "NAICSDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub naics_description: Option<String>,

    /// Stored tags can legitimately be empty strings (legacy rows); those
    /// and unknown values load as `None` rather than failing the record
    #[serde(
        rename = "Tag",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_tag"
    )]
    pub tag: Option<Tag>,
}

fn lenient_tag<'de, D>(deserializer: D) -> Result<Option<Tag>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl ArticleRecord {
    /// Minimal record with only the composite key set
    pub fn new(url: impl Into<String>, date_time: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            date_time: date_time.into(),
            title: None,
            source: None,
            description: None,
            data: None,
            reason_identified: None,
            concerns: None,
            emerging_risk_name: None,
            misc_topics: None,
            naics_code: None,
            naics_description: None,
            tag: None,
        }
    }

    /// Attribute lookup by store-side (PascalCase) name.
    ///
    /// Used by filter-expression evaluation; `Tag` resolves to its wire
    /// string. Returns `None` for absent attributes and unknown names.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "URL" => Some(self.url.clone()),
            "DateTime" => Some(self.date_time.clone()),
            "Title" => self.title.clone(),
            "Source" => self.source.clone(),
            "Description" => self.description.clone(),
            "Data" => self.data.clone(),
            "ReasonIdentified" => self.reason_identified.clone(),
            "Concerns" => self.concerns.clone(),
            "EmergingRiskName" => self.emerging_risk_name.clone(),
            "MiscTopics" => self.misc_topics.clone(),
            "NAICSCODE" => self.naics_code.clone(),
            "NAICSDescription" => self.naics_description.clone(),
            "Tag" => self.tag.map(|t| t.as_str().to_string()),
            _ => None,
        }
    }
}

// =============================================================================
// Article Update
// =============================================================================

/// Partial update applied to an existing record by URL.
///
/// Only `Some` fields are written; the adapter merges them into the
/// stored item (latest `DateTime` row for that URL).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    #[serde(
        rename = "ReasonIdentified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reason_identified: Option<String>,

    #[serde(rename = "Concerns", default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,

    #[serde(
        rename = "EmergingRiskName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub emerging_risk_name: Option<String>,

    #[serde(rename = "MiscTopics", default, skip_serializing_if = "Option::is_none")]
    pub misc_topics: Option<String>,

    #[serde(rename = "NAICSCODE", default, skip_serializing_if = "Option::is_none")]
    pub naics_code: Option<String>,

    #[serde(
        rename = "NAICSDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub naics_description: Option<String>,

    #[serde(rename = "Tag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl ArticleUpdate {
    pub fn is_empty(&self) -> bool {
        self.reason_identified.is_none()
            && self.concerns.is_none()
            && self.emerging_risk_name.is_none()
            && self.misc_topics.is_none()
            && self.naics_code.is_none()
            && self.naics_description.is_none()
            && self.tag.is_none()
    }

    /// Merge this update into a record, leaving `None` fields untouched
    pub fn apply_to(&self, record: &mut ArticleRecord) {
        if let Some(v) = &self.reason_identified {
            record.reason_identified = Some(v.clone());
        }
        if let Some(v) = &self.concerns {
            record.concerns = Some(v.clone());
        }
        if let Some(v) = &self.emerging_risk_name {
            record.emerging_risk_name = Some(v.clone());
        }
        if let Some(v) = &self.misc_topics {
            record.misc_topics = Some(v.clone());
        }
        if let Some(v) = &self.naics_code {
            record.naics_code = Some(v.clone());
        }
        if let Some(v) = &self.naics_description {
            record.naics_description = Some(v.clone());
        }
        if let Some(t) = self.tag {
            record.tag = Some(t);
        }
    }
}
