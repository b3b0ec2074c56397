//! Tag Decision Tree
//!
//! The tag is a pure function of which classification fields are
//! non-empty. Kept as one function so the business rule is exhaustively
//! testable and stays authoritative over whatever the model claims in
//! its final-verification output.

use crate::types::Tag;

/// Assign the tag from field presence:
///
/// - no concerns: `Untagged`, regardless of the rest
/// - concerns + risks + misc topics: `Potential New Trend`
/// - concerns + risks, no misc topics: `Current`
/// - concerns without risks: `Potential New Trend`
///
/// `ProcessingError` is never produced here; it belongs to the
/// pipeline's failure path only.
pub fn assign_tag(has_concerns: bool, has_risks: bool, has_misc: bool) -> Tag {
    if !has_concerns {
        return Tag::Untagged;
    }
    if has_risks {
        if has_misc {
            Tag::PotentialNewTrend
        } else {
            Tag::Current
        }
    } else {
        Tag::PotentialNewTrend
    }
}

/// Deterministic reasoning text used when the model's own explanation is
/// missing or the final stage could not be parsed
pub fn default_reasoning(has_concerns: bool, has_risks: bool, has_misc: bool) -> String {
    match (has_concerns, has_risks, has_misc) {
        (false, _, _) => "No concern events were identified, so the article is untagged.".to_string(),
        (true, true, true) => {
            "Concerns, emerging risks, and misc topics are all present, indicating a potential new trend."
                .to_string()
        }
        (true, true, false) => {
            "Concerns and emerging risks are present without misc topics, matching a current exposure."
                .to_string()
        }
        (true, false, _) => {
            "Concerns are present without emerging risks, indicating a potential new trend.".to_string()
        }
    }
}
