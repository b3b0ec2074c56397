//! Classification Pipeline
//!
//! Four sequential model passes per article: summarize, classify,
//! reflect, final verification. Each stage consumes the previous stage's
//! output, so there is no internal parallelism; callers may classify
//! many articles concurrently (see [`crate::worker`]).
//!
//! Failure semantics: a gateway transport/auth failure at any stage
//! terminates the article with `Tag = Processing Error` instead of
//! propagating. A stage whose completion cannot be parsed leaves its
//! fields empty and the pipeline continues — there is no mid-pipeline
//! default substitute.

use std::sync::Arc;
use tracing::{debug, error, warn};

use super::outcome::{CandidateFields, Classification};
use super::prompts;
use crate::ai::{LlmGateway, extract_json};
use crate::constants::{limits, model};
use crate::taxonomy::Taxonomy;
use crate::types::{Result, RiskError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Summarize,
    Classify,
    Reflect,
    Verify,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Summarize => "summarize",
            Stage::Classify => "classify",
            Stage::Reflect => "reflect",
            Stage::Verify => "verify",
        }
    }
}

pub struct ClassificationPipeline {
    gateway: Arc<dyn LlmGateway>,
    taxonomy: Arc<Taxonomy>,
    model_id: String,
}

impl ClassificationPipeline {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        taxonomy: Arc<Taxonomy>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            taxonomy,
            model_id: model_id.into(),
        }
    }

    /// Classify one article's text.
    ///
    /// Returns `Err` only for input rejected before any model call;
    /// every model-side failure is folded into the outcome so a single
    /// article can never abort a batch.
    pub async fn run(&self, article_text: &str) -> Result<Classification> {
        let text = prepare_text(article_text)?;
        let mut fields = CandidateFields::default();

        // Stage 1: summarize
        match self.invoke(Stage::Summarize, &prompts::summary_prompt(&text)).await {
            Ok(completion) => {
                if let Some(parsed) = parse_stage(Stage::Summarize, &completion) {
                    fields.reason_identified = parsed.reason_identified;
                }
            }
            Err(e) => return Ok(self.abort(fields, Stage::Summarize, e)),
        }

        // Stage 2: classify against the full taxonomy
        match self
            .invoke(Stage::Classify, &prompts::classify_prompt(&self.taxonomy, &text))
            .await
        {
            Ok(completion) => {
                if let Some(parsed) = parse_stage(Stage::Classify, &completion) {
                    fields.concerns = parsed.concerns;
                    fields.emerging_risks = parsed.emerging_risks;
                    fields.misc_topics = parsed.misc_topics;
                    fields.naics_code = parsed.naics_code;
                    fields.naics_description = parsed.naics_description;
                }
            }
            Err(e) => return Ok(self.abort(fields, Stage::Classify, e)),
        }

        // Stage 3: reflect. Applied even when stage 2 looks well-formed;
        // near-miss hallucinations are exactly what it exists to catch.
        match self
            .invoke(
                Stage::Reflect,
                &prompts::reflect_prompt(&self.taxonomy, &fields.stage_json()),
            )
            .await
        {
            Ok(completion) => {
                if let Some(parsed) = parse_stage(Stage::Reflect, &completion) {
                    fields.concerns = parsed.concerns;
                    fields.emerging_risks = parsed.emerging_risks;
                    fields.misc_topics = parsed.misc_topics;
                    fields.naics_code = parsed.naics_code;
                    fields.naics_description = parsed.naics_description;
                }
                // Reflection is advisory; membership is settled locally
                fields.apply_taxonomy(&self.taxonomy);
            }
            Err(e) => return Ok(self.abort(fields, Stage::Reflect, e)),
        }

        // Stage 4: final verification and tagging
        match self
            .invoke(
                Stage::Verify,
                &prompts::final_verification_prompt(&self.taxonomy, &text, &fields),
            )
            .await
        {
            Ok(completion) => {
                if let Some(parsed) = parse_stage(Stage::Verify, &completion) {
                    if parsed.reason_identified.is_some() {
                        fields.reason_identified = parsed.reason_identified;
                    }
                    fields.concerns = parsed.concerns;
                    fields.emerging_risks = parsed.emerging_risks;
                    fields.misc_topics = parsed.misc_topics;
                    fields.naics_code = parsed.naics_code;
                    fields.naics_description = parsed.naics_description;
                    fields.tagging_reasoning = parsed.tagging_reasoning;
                }
            }
            Err(e) => return Ok(self.abort(fields, Stage::Verify, e)),
        }

        // from_verified re-enforces the taxonomy and computes the tag
        // with the authoritative decision tree
        Ok(Classification::from_verified(fields, &self.taxonomy))
    }

    async fn invoke(&self, stage: Stage, prompt: &str) -> Result<String> {
        debug!(stage = stage.as_str(), "invoking model");
        self.gateway
            .complete(
                &self.model_id,
                prompt,
                model::CLASSIFY_MAX_TOKENS,
                model::TEMPERATURE,
            )
            .await
    }

    fn abort(&self, fields: CandidateFields, stage: Stage, err: RiskError) -> Classification {
        error!(stage = stage.as_str(), "pipeline aborted: {}", err);
        Classification::processing_error(
            fields,
            &self.taxonomy,
            format!("Processing failed during {} stage: {}", stage.as_str(), err),
        )
    }
}

fn parse_stage(stage: Stage, completion: &str) -> Option<CandidateFields> {
    let parsed = extract_json(completion).and_then(CandidateFields::from_value);
    if parsed.is_none() {
        warn!(
            stage = stage.as_str(),
            "unparsable completion, leaving stage fields empty"
        );
    }
    parsed
}

/// Trim, reject too-short input, and truncate over-long input at a char
/// boundary before it reaches any prompt
fn prepare_text(article_text: &str) -> Result<String> {
    let trimmed = article_text.trim();
    if trimmed.chars().count() < limits::MIN_TEXT_CHARS {
        return Err(RiskError::InvalidInput(format!(
            "article text shorter than {} characters",
            limits::MIN_TEXT_CHARS
        )));
    }
    Ok(trimmed.chars().take(limits::MAX_TEXT_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ARTICLE: &str = "A chemical plant fire in Ohio injured twelve workers and \
        triggered a class action lawsuit over alleged safety violations at the site.";

    /// Gateway replaying scripted per-stage responses in order
    struct SequencedGateway {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    }

    impl SequencedGateway {
        fn new(responses: Vec<std::result::Result<&str, &str>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(String::from).map_err(String::from))
                        .collect(),
                ),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for SequencedGateway {
        async fn complete(
            &self,
            _model_id: &str,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("more gateway calls than scripted responses")
                .map_err(RiskError::Gateway)
        }
    }

    fn pipeline(gateway: Arc<SequencedGateway>) -> ClassificationPipeline {
        ClassificationPipeline::new(gateway, Taxonomy::builtin().into_shared(), "test-model")
    }

    const SUMMARY: &str = r#"{"ReasonIdentified": "Plant fire with injury and litigation exposure."}"#;

    fn stage_json(concerns: &[&str], risks: &[&str], misc: &[&str]) -> String {
        serde_json::json!({
            "Concerns": concerns,
            "EmergingRiskName": risks,
            "MiscTopics": misc,
            "NAICSCODE": null,
            "NAICSDescription": null
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_concerns_only_yields_potential_new_trend() {
        let classify = stage_json(&["lawsuits"], &[], &[]);
        let verify = r#"{
            "ReasonIdentified": "Refined summary.",
            "Concerns": ["lawsuits"],
            "EmergingRiskName": [],
            "MiscTopics": [],
            "NAICSCODE": null,
            "NAICSDescription": null,
            "Tag": "Current",
            "TaggingReasoning": "model-made claim"
        }"#;
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok(verify),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        // The model claimed Current; the decision tree overrules it
        assert_eq!(result.tag, Tag::PotentialNewTrend);
        assert_eq!(result.concerns, vec!["lawsuits"]);
        assert_eq!(result.reason_identified.as_deref(), Some("Refined summary."));
    }

    #[tokio::test]
    async fn test_no_concerns_yields_untagged_regardless_of_rest() {
        // Adversarial stage outputs: risks and misc populated without concerns
        let classify = stage_json(&[], &["PFAS"], &["personal auto"]);
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::Untagged);
    }

    #[tokio::test]
    async fn test_concerns_and_risks_without_misc_yields_current() {
        let classify = stage_json(&["fire", "injuries"], &["Lithium-Ion Battery Fires"], &[]);
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::Current);
    }

    #[tokio::test]
    async fn test_all_three_present_yields_potential_new_trend() {
        let classify = stage_json(&["fire"], &["Climate Change"], &["home ownership"]);
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::PotentialNewTrend);
    }

    #[tokio::test]
    async fn test_transport_failure_in_summarize_becomes_processing_error() {
        let gateway = SequencedGateway::new(vec![Err("connection reset by peer")]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::ProcessingError);
        assert!(result.tagging_reasoning.contains("summarize"));
        assert!(result.concerns.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_mid_pipeline_keeps_partial_fields() {
        let classify = stage_json(&["fraud"], &[], &[]);
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Err("gateway timeout"),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::ProcessingError);
        assert_eq!(result.concerns, vec!["fraud"]);
        assert!(
            result
                .reason_identified
                .as_deref()
                .unwrap()
                .contains("Plant fire")
        );
    }

    #[tokio::test]
    async fn test_unparsable_stage_leaves_fields_empty_and_continues() {
        let gateway = SequencedGateway::new(vec![
            Ok("no json in this summary at all"),
            Ok("the classifier rambled instead of answering"),
            Ok("still rambling"),
            Ok("and once more"),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        // All stages degraded; nothing crashed, nothing was invented
        assert_eq!(result.tag, Tag::Untagged);
        assert!(result.reason_identified.is_none());
        assert!(result.concerns.is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_final_stage_tags_from_reflected_fields() {
        let classify = stage_json(&["explosion"], &["Hydrogen Infrastructure"], &[]);
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok("verifier produced prose instead of JSON"),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.tag, Tag::Current);
        assert_eq!(result.concerns, vec!["explosion"]);
        // Reasoning synthesized deterministically
        assert!(!result.tagging_reasoning.is_empty());
    }

    #[tokio::test]
    async fn test_invented_categories_are_stripped() {
        let classify = stage_json(
            &["lawsuits", "supply chain meltdown"],
            &["PFAS", "Quantum Risk"],
            &[],
        );
        let gateway = SequencedGateway::new(vec![
            Ok(SUMMARY),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
            Ok(classify.as_str()),
        ]);

        let result = pipeline(gateway).run(ARTICLE).await.unwrap();
        assert_eq!(result.concerns, vec!["lawsuits"]);
        assert_eq!(result.emerging_risks, vec!["PFAS"]);
        assert_eq!(result.tag, Tag::Current);
    }

    #[tokio::test]
    async fn test_short_text_rejected_before_any_model_call() {
        let gateway = SequencedGateway::new(vec![]);
        let result = pipeline(gateway).run("too short").await;
        assert!(matches!(result, Err(RiskError::InvalidInput(_))));
    }

    #[test]
    fn test_prepare_text_truncates_at_char_boundary() {
        let long = "ü".repeat(limits::MAX_TEXT_CHARS + 100);
        let prepared = prepare_text(&long).unwrap();
        assert_eq!(prepared.chars().count(), limits::MAX_TEXT_CHARS);

        let short = "x".repeat(limits::MIN_TEXT_CHARS);
        assert!(prepare_text(&short).is_ok());
    }
}
