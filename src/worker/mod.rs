//! Batch Classification Worker
//!
//! Sweeps the store for records needing classification and runs the
//! pipeline over them with bounded concurrency. The pipeline itself is
//! a sequential chain per article; parallelism lives entirely here.
//!
//! Caller-level retry: the core never retries a gateway failure, so the
//! worker owns that policy — exponential backoff, gateway-shaped
//! failures only. Parse-level degradation (empty fields) is a final
//! answer and is not retried. One article's failure never aborts the
//! batch.

use backon::{ExponentialBuilder, Retryable};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::classify::{CandidateFields, Classification, ClassificationPipeline};
use crate::constants::{batch, limits};
use crate::store::{ScanParams, StoreAdapter};
use crate::taxonomy::Taxonomy;
use crate::types::{ArticleRecord, Result, RiskError, Tag};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Records classified per sweep
    pub batch_size: usize,
    /// Concurrent article classifications
    pub concurrency: usize,
    /// Retries after the first attempt, gateway failures only
    pub max_retries: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: batch::DEFAULT_BATCH_SIZE,
            concurrency: batch::DEFAULT_CONCURRENCY,
            max_retries: batch::MAX_RETRY_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Articles that went through the pipeline
    pub processed: usize,
    /// Articles persisted with a non-error tag
    pub tagged: usize,
    /// Articles persisted as `Processing Error` or failing persistence
    pub errors: usize,
    /// Records skipped before any model call (no usable text)
    pub skipped: usize,
}

/// Should this record be (re)classified?
///
/// The store-side sweep filter covers `Untagged` and attribute-absent
/// tags; empty-string tags cannot be expressed there and are handled
/// here, in the application layer, after retrieval.
pub fn needs_classification(record: &ArticleRecord) -> bool {
    matches!(record.tag, None | Some(Tag::Untagged))
}

pub struct BatchClassifier {
    pipeline: Arc<ClassificationPipeline>,
    store: Arc<dyn StoreAdapter>,
    taxonomy: Arc<Taxonomy>,
}

impl BatchClassifier {
    pub fn new(
        pipeline: Arc<ClassificationPipeline>,
        store: Arc<dyn StoreAdapter>,
        taxonomy: Arc<Taxonomy>,
    ) -> Self {
        Self {
            pipeline,
            store,
            taxonomy,
        }
    }

    /// Run one sweep: fetch candidates, classify concurrently, persist
    /// each outcome as it completes
    pub async fn run(&self, config: &BatchConfig) -> Result<BatchReport> {
        let candidates = self.sweep(config.batch_size).await?;
        info!("sweep found {} records needing classification", candidates.len());

        let results: Vec<ArticleOutcome> = stream::iter(candidates)
            .map(|record| self.process_one(record, config))
            .buffer_unordered(config.concurrency.max(1))
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in results {
            match outcome {
                ArticleOutcome::Tagged => {
                    report.processed += 1;
                    report.tagged += 1;
                }
                ArticleOutcome::Failed => {
                    report.processed += 1;
                    report.errors += 1;
                }
                ArticleOutcome::Skipped => report.skipped += 1,
            }
        }
        info!(
            "batch complete: {} tagged, {} errors, {} skipped",
            report.tagged, report.errors, report.skipped
        );
        Ok(report)
    }

    /// Scan with the canned untagged filter, accumulate pages, then
    /// apply the application-layer post-filter and cap at `batch_size`
    async fn sweep(&self, batch_size: usize) -> Result<Vec<ArticleRecord>> {
        let mut params = ScanParams::untagged_sweep(batch_size as u32 * 2);
        let mut rows: Vec<ArticleRecord> = Vec::new();

        loop {
            let page = self.store.scan(&params).await?;
            rows.extend(page.rows);
            match page.next {
                Some(token) if rows.len() < params.limit as usize => {
                    params.start_token = Some(token);
                }
                _ => break,
            }
        }

        rows.retain(needs_classification);
        rows.truncate(batch_size);
        Ok(rows)
    }

    async fn process_one(&self, record: ArticleRecord, config: &BatchConfig) -> ArticleOutcome {
        let url = record.url.clone();
        let text = match record.data.as_deref() {
            Some(text) if text.trim().chars().count() >= limits::MIN_TEXT_CHARS => text.to_string(),
            _ => {
                warn!(%url, "skipping record without usable article text");
                return ArticleOutcome::Skipped;
            }
        };

        let classification = self.classify_with_retry(&text, config).await;
        let failed = classification.tag == Tag::ProcessingError;
        if failed {
            warn!(%url, "classification failed: {}", classification.tagging_reasoning);
        }

        if let Err(e) = self
            .store
            .update_article(&url, &classification.to_update())
            .await
        {
            warn!(%url, "failed to persist classification: {}", e);
            return ArticleOutcome::Failed;
        }

        if failed {
            ArticleOutcome::Failed
        } else {
            ArticleOutcome::Tagged
        }
    }

    /// Classify once, retrying gateway-shaped failures with exponential
    /// backoff. The final failure becomes a `Processing Error` outcome.
    async fn classify_with_retry(&self, text: &str, config: &BatchConfig) -> Classification {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(batch::RETRY_BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(batch::RETRY_MAX_DELAY_SECS))
            .with_max_times(config.max_retries);

        let attempt = || async {
            let outcome = self.pipeline.run(text).await?;
            if outcome.tag == Tag::ProcessingError {
                // Surface as a gateway error so the retry policy applies
                Err(RiskError::Gateway(outcome.tagging_reasoning.clone()))
            } else {
                Ok(outcome)
            }
        };

        match attempt
            .retry(backoff)
            .when(RiskError::is_gateway)
            .notify(|err: &RiskError, dur: Duration| {
                warn!("retrying classification after {:?}: {}", dur, err);
            })
            .await
        {
            Ok(classification) => classification,
            Err(err) => Classification::processing_error(
                CandidateFields::default(),
                &self.taxonomy,
                err.to_string(),
            ),
        }
    }
}

enum ArticleOutcome {
    Tagged,
    Failed,
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LlmGateway;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    const BODY: &str = "A warehouse fire destroyed inventory and injured two workers, \
        prompting a lawsuit against the operator over alleged code violations.";

    /// Gateway that answers each stage from the prompt's own markers and
    /// fails outright when the article text carries a poison marker
    struct StageAwareGateway;

    #[async_trait]
    impl LlmGateway for StageAwareGateway {
        async fn complete(
            &self,
            _model_id: &str,
            prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String> {
            if prompt.contains("POISON") {
                return Err(RiskError::Gateway("simulated outage".to_string()));
            }
            if prompt.contains("<classification_process>")
                || prompt.contains("<validation_checklist>")
                || prompt.contains("<tagging_strategy>")
            {
                Ok(serde_json::json!({
                    "Concerns": ["fire", "injuries", "lawsuits"],
                    "EmergingRiskName": [],
                    "MiscTopics": [],
                    "NAICSCODE": null,
                    "NAICSDescription": null,
                    "TaggingReasoning": "Concerns without emerging risks."
                })
                .to_string())
            } else {
                Ok(r#"{"ReasonIdentified": "Fire loss with liability exposure."}"#.to_string())
            }
        }
    }

    fn record(url: &str, tag: Option<Tag>, data: Option<&str>) -> ArticleRecord {
        let mut r = ArticleRecord::new(url, "2025-11-02T10:00:00Z");
        r.tag = tag;
        r.data = data.map(String::from);
        r
    }

    fn classifier(store: Arc<MemoryStore>) -> BatchClassifier {
        let taxonomy = Taxonomy::builtin().into_shared();
        let pipeline = Arc::new(ClassificationPipeline::new(
            Arc::new(StageAwareGateway),
            taxonomy.clone(),
            "test-model",
        ));
        BatchClassifier::new(pipeline, store, taxonomy)
    }

    fn quick_config() -> BatchConfig {
        BatchConfig {
            batch_size: 10,
            concurrency: 2,
            max_retries: 0,
        }
    }

    #[test]
    fn test_needs_classification_post_filter() {
        assert!(needs_classification(&record("u", None, None)));
        assert!(needs_classification(&record("u", Some(Tag::Untagged), None)));
        assert!(!needs_classification(&record("u", Some(Tag::Current), None)));
        assert!(!needs_classification(&record(
            "u",
            Some(Tag::ProcessingError),
            None
        )));
    }

    #[tokio::test]
    async fn test_batch_classifies_and_persists_untagged_records() {
        let store = Arc::new(MemoryStore::new(vec![
            record("https://a", None, Some(BODY)),
            record("https://b", Some(Tag::Untagged), Some(BODY)),
            record("https://c", Some(Tag::Current), Some(BODY)),
        ]));

        let report = classifier(store.clone()).run(&quick_config()).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.tagged, 2);
        assert_eq!(report.errors, 0);

        let records = store.records();
        let a = records.iter().find(|r| r.url == "https://a").unwrap();
        assert_eq!(a.tag, Some(Tag::PotentialNewTrend));
        assert_eq!(a.concerns.as_deref(), Some("fire;injuries;lawsuits"));
        assert_eq!(a.emerging_risk_name.as_deref(), Some(""));
        // Already-tagged record untouched
        let c = records.iter().find(|r| r.url == "https://c").unwrap();
        assert_eq!(c.tag, Some(Tag::Current));
    }

    #[tokio::test]
    async fn test_failed_article_does_not_abort_batch() {
        let poisoned = format!("{} POISON marker text to trip the gateway.", BODY);
        let store = Arc::new(MemoryStore::new(vec![
            record("https://bad", None, Some(&poisoned)),
            record("https://good", None, Some(BODY)),
        ]));

        let report = classifier(store.clone()).run(&quick_config()).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.tagged, 1);
        assert_eq!(report.errors, 1);

        let records = store.records();
        let bad = records.iter().find(|r| r.url == "https://bad").unwrap();
        assert_eq!(bad.tag, Some(Tag::ProcessingError));
        let good = records.iter().find(|r| r.url == "https://good").unwrap();
        assert_eq!(good.tag, Some(Tag::PotentialNewTrend));
    }

    #[tokio::test]
    async fn test_records_without_text_are_skipped() {
        let store = Arc::new(MemoryStore::new(vec![
            record("https://empty", None, None),
            record("https://short", None, Some("tiny")),
        ]));

        let report = classifier(store).run(&quick_config()).await.unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_batch_size_caps_the_sweep() {
        let records: Vec<ArticleRecord> = (0..8)
            .map(|i| record(&format!("https://x/{}", i), None, Some(BODY)))
            .collect();
        let store = Arc::new(MemoryStore::new(records));

        let config = BatchConfig {
            batch_size: 3,
            ..quick_config()
        };
        let report = classifier(store).run(&config).await.unwrap();
        assert_eq!(report.processed, 3);
    }
}
