//! Query Compiler
//!
//! Turns one free-text request into exactly one valid query-description,
//! never executing anything itself. Parse trouble degrades to the
//! "show everything" default so the user always sees some result;
//! gateway transport/auth failures are hard errors and propagate.

use std::sync::Arc;
use tracing::{info, warn};

use super::description::QueryDescription;
use super::prompt;
use crate::ai::{LlmGateway, extract_json};
use crate::constants::model;
use crate::taxonomy::Taxonomy;
use crate::types::Result;

pub struct QueryCompiler {
    gateway: Arc<dyn LlmGateway>,
    taxonomy: Arc<Taxonomy>,
    model_id: String,
}

impl QueryCompiler {
    pub fn new(gateway: Arc<dyn LlmGateway>, taxonomy: Arc<Taxonomy>, model_id: impl Into<String>) -> Self {
        Self {
            gateway,
            taxonomy,
            model_id: model_id.into(),
        }
    }

    /// Compile a natural-language request into a query-description.
    ///
    /// The returned object always satisfies its invariants: limit
    /// injected, projection stripped, alias/binding maps consistent.
    /// Errors are gateway transport/auth failures only.
    pub async fn compile(&self, user_text: &str) -> Result<QueryDescription> {
        let prompt = prompt::query_generation_prompt(&self.taxonomy, user_text);

        let completion = self
            .gateway
            .complete(
                &self.model_id,
                &prompt,
                model::QUERY_MAX_TOKENS,
                model::TEMPERATURE,
            )
            .await?;

        let description = match extract_json(&completion) {
            Some(value) => QueryDescription::from_model_value(value).unwrap_or_else(|e| {
                warn!("discarding malformed query description: {}", e);
                QueryDescription::default()
            }),
            None => {
                warn!(
                    "no JSON found in completion for query: {:?}",
                    truncate(user_text, 120)
                );
                QueryDescription::default()
            }
        };

        info!("compiled query: {}", description.explanation);
        Ok(description)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
