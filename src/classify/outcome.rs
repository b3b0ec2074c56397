//! Classification Outcome Types
//!
//! `CandidateFields` is the lenient shape parsed from any pipeline
//! stage's completion: lists may arrive as null, a bare string, or an
//! array; codes may arrive as numbers. `Classification` is the final,
//! validated outcome with the tag always set.
//!
//! Taxonomy enforcement lives here and is applied locally regardless of
//! what the reflect/verification stages claim: values not found verbatim
//! in the reference lists are stripped, and the NAICS pair is nulled
//! unless both halves match one reference entry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::classify::tag::{assign_tag, default_reasoning};
use crate::taxonomy::{NaicsEntry, Taxonomy};
use crate::types::{ArticleUpdate, Tag};

// =============================================================================
// Candidate Fields (per-stage parse target)
// =============================================================================

/// Fields extracted from one stage's completion, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFields {
    #[serde(rename = "ReasonIdentified", default, deserialize_with = "lenient_string")]
    pub reason_identified: Option<String>,

    #[serde(rename = "Concerns", default, deserialize_with = "lenient_list")]
    pub concerns: Vec<String>,

    #[serde(rename = "EmergingRiskName", default, deserialize_with = "lenient_list")]
    pub emerging_risks: Vec<String>,

    #[serde(rename = "MiscTopics", default, deserialize_with = "lenient_list")]
    pub misc_topics: Vec<String>,

    #[serde(rename = "NAICSCODE", default, deserialize_with = "lenient_string")]
    pub naics_code: Option<String>,

    #[serde(rename = "NAICSDescription", default, deserialize_with = "lenient_string")]
    pub naics_description: Option<String>,

    #[serde(rename = "Tag", default, deserialize_with = "lenient_tag")]
    pub tag: Option<Tag>,

    #[serde(rename = "TaggingReasoning", default, deserialize_with = "lenient_string")]
    pub tagging_reasoning: Option<String>,
}

impl CandidateFields {
    /// Parse a stage completion's JSON object; `None` when the object
    /// cannot be interpreted at all
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Strip every value not present verbatim in the taxonomy and null
    /// the NAICS pair unless it matches one reference entry exactly
    pub fn apply_taxonomy(&mut self, taxonomy: &Taxonomy) {
        retain_members(&mut self.concerns, |v| taxonomy.is_concern(v));
        retain_members(&mut self.emerging_risks, |v| taxonomy.is_emerging_risk(v));
        retain_members(&mut self.misc_topics, |v| taxonomy.is_misc_topic(v));

        let valid_pair = match (&self.naics_code, &self.naics_description) {
            (Some(code), Some(description)) => taxonomy.is_naics_pair(code, description),
            _ => false,
        };
        if !valid_pair {
            self.naics_code = None;
            self.naics_description = None;
        }
    }

    pub fn has_concerns(&self) -> bool {
        !self.concerns.is_empty()
    }

    pub fn has_risks(&self) -> bool {
        !self.emerging_risks.is_empty()
    }

    pub fn has_misc(&self) -> bool {
        !self.misc_topics.is_empty()
    }

    /// Stage-2/3 JSON rendering handed to the next prompt
    pub fn stage_json(&self) -> String {
        json!({
            "Concerns": self.concerns,
            "EmergingRiskName": self.emerging_risks,
            "MiscTopics": self.misc_topics,
            "NAICSCODE": self.naics_code,
            "NAICSDescription": self.naics_description,
        })
        .to_string()
    }
}

/// Drop non-members and duplicates, preserving first-seen order
fn retain_members(values: &mut Vec<String>, is_member: impl Fn(&str) -> bool) {
    let mut kept: Vec<String> = Vec::with_capacity(values.len());
    for value in values.drain(..) {
        if is_member(&value) && !kept.contains(&value) {
            kept.push(value);
        }
    }
    *values = kept;
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(as_clean_string(&value))
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Array(items) => items.iter().filter_map(as_clean_string_ref).collect(),
        _ => as_clean_string(&value).into_iter().collect(),
    })
}

fn lenient_tag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Tag>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().and_then(|s| s.parse().ok()))
}

fn as_clean_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() && s.to_lowercase() != "null" => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_clean_string_ref(value: &Value) -> Option<String> {
    as_clean_string(value)
}

// =============================================================================
// Final Classification
// =============================================================================

/// The validated end-of-pipeline outcome for one article
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub reason_identified: Option<String>,
    pub concerns: Vec<String>,
    pub emerging_risks: Vec<String>,
    pub misc_topics: Vec<String>,
    pub naics: Option<NaicsEntry>,
    pub tag: Tag,
    pub tagging_reasoning: String,
}

impl Classification {
    /// Finalize verified fields: enforce the taxonomy one last time,
    /// then compute the tag with the authoritative decision tree (the
    /// model's own Tag claim is ignored).
    pub fn from_verified(mut fields: CandidateFields, taxonomy: &Taxonomy) -> Self {
        fields.apply_taxonomy(taxonomy);

        let (hc, hr, hm) = (fields.has_concerns(), fields.has_risks(), fields.has_misc());
        let tag = assign_tag(hc, hr, hm);
        let tagging_reasoning = fields
            .tagging_reasoning
            .take()
            .unwrap_or_else(|| default_reasoning(hc, hr, hm));

        Self {
            reason_identified: fields.reason_identified,
            concerns: fields.concerns,
            emerging_risks: fields.emerging_risks,
            misc_topics: fields.misc_topics,
            naics: naics_from(&fields.naics_code, &fields.naics_description),
            tag,
            tagging_reasoning,
        }
    }

    /// Terminal failure outcome: whatever fields were gathered before the
    /// gateway failed, still taxonomy-enforced, tagged `Processing Error`
    pub fn processing_error(
        mut fields: CandidateFields,
        taxonomy: &Taxonomy,
        reason: impl Into<String>,
    ) -> Self {
        fields.apply_taxonomy(taxonomy);
        Self {
            reason_identified: fields.reason_identified,
            concerns: fields.concerns,
            emerging_risks: fields.emerging_risks,
            misc_topics: fields.misc_topics,
            naics: naics_from(&fields.naics_code, &fields.naics_description),
            tag: Tag::ProcessingError,
            tagging_reasoning: reason.into(),
        }
    }

    /// Exact output JSON shape, multi-value fields still as arrays
    pub fn to_json(&self) -> Value {
        json!({
            "ReasonIdentified": self.reason_identified.clone().unwrap_or_default(),
            "Concerns": self.concerns,
            "EmergingRiskName": self.emerging_risks,
            "MiscTopics": self.misc_topics,
            "NAICSCODE": self.naics.as_ref().map(|n| n.code.clone()),
            "NAICSDescription": self.naics.as_ref().map(|n| n.description.clone()),
            "Tag": self.tag.as_str(),
            "TaggingReasoning": self.tagging_reasoning,
        })
    }

    /// Record update for persistence: multi-value fields `;`-joined.
    ///
    /// Empty lists persist as empty strings so a swept record is visibly
    /// processed; an absent NAICS pair is simply not written.
    pub fn to_update(&self) -> ArticleUpdate {
        ArticleUpdate {
            reason_identified: self.reason_identified.clone(),
            concerns: Some(self.concerns.join(";")),
            emerging_risk_name: Some(self.emerging_risks.join(";")),
            misc_topics: Some(self.misc_topics.join(";")),
            naics_code: self.naics.as_ref().map(|n| n.code.clone()),
            naics_description: self.naics.as_ref().map(|n| n.description.clone()),
            tag: Some(self.tag),
        }
    }
}

fn naics_from(code: &Option<String>, description: &Option<String>) -> Option<NaicsEntry> {
    match (code, description) {
        (Some(code), Some(description)) => Some(NaicsEntry {
            code: code.clone(),
            description: description.clone(),
        }),
        _ => None,
    }
}
