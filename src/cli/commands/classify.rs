//! Classify Command
//!
//! Run the batch classification worker over an article file: untagged
//! records are classified and the updated records written back out.

use console::style;
use std::path::Path;
use std::sync::Arc;

use crate::classify::ClassificationPipeline;
use crate::cli::util::{build_gateway, load_articles, load_taxonomy, save_articles};
use crate::config::Config;
use crate::store::MemoryStore;
use crate::types::Result;
use crate::worker::{BatchClassifier, BatchConfig};

pub async fn run(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    batch_size: Option<usize>,
    concurrency: Option<usize>,
) -> Result<()> {
    let taxonomy = load_taxonomy(config)?;
    let gateway = build_gateway(config)?;
    let pipeline = Arc::new(ClassificationPipeline::new(
        gateway,
        taxonomy.clone(),
        config.gateway.model_id.as_str(),
    ));

    let records = load_articles(input)?;
    println!("loaded {} article(s) from {}", records.len(), input.display());

    let store = Arc::new(MemoryStore::new(records));
    let worker = BatchClassifier::new(pipeline, store.clone(), taxonomy);
    let batch_config = BatchConfig {
        batch_size: batch_size.unwrap_or(config.classification.batch_size),
        concurrency: concurrency.unwrap_or(config.classification.concurrency),
        max_retries: config.classification.max_retries,
    };

    let report = worker.run(&batch_config).await?;

    println!();
    println!("{}", style("Batch complete").bold());
    println!("  processed: {}", report.processed);
    println!("  tagged:    {}", report.tagged);
    println!("  errors:    {}", report.errors);
    println!("  skipped:   {}", report.skipped);

    let destination = output.unwrap_or(input);
    save_articles(destination, &store.records())?;
    println!();
    println!("wrote updated records to {}", destination.display());

    Ok(())
}
