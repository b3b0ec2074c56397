//! Query Command
//!
//! Compile a natural-language request into a query-description and
//! optionally execute it against a local article file.

use console::style;
use std::path::Path;

use crate::cli::util::{build_gateway, load_articles, load_taxonomy};
use crate::config::Config;
use crate::query::QueryCompiler;
use crate::store::{self, MemoryStore};
use crate::types::{Result, RiskError};

pub async fn run(config: &Config, user_text: &str, input: Option<&Path>) -> Result<()> {
    if user_text.trim().is_empty() {
        return Err(RiskError::InvalidInput(
            "query text must not be empty".to_string(),
        ));
    }

    let taxonomy = load_taxonomy(config)?;
    let gateway = build_gateway(config)?;
    let compiler = QueryCompiler::new(gateway, taxonomy, config.gateway.model_id.as_str());

    let description = compiler.compile(user_text).await?;

    println!("{}", style("Compiled query").bold());
    println!("{}", serde_json::to_string_pretty(&description)?);
    println!();
    println!("{} {}", style("Explanation:").dim(), description.explanation);

    if let Some(path) = input {
        let records = load_articles(path)?;
        let store = MemoryStore::new(records);
        let rows = store::execute(&store, &description).await?;

        println!();
        println!(
            "{}",
            style(format!("{} matching article(s)", rows.len())).bold()
        );
        for row in &rows {
            let tag = row
                .tag
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            let title = row.title.as_deref().unwrap_or("(untitled)");
            println!("  [{}] {} — {}", tag, title, row.url);
        }
    }

    Ok(())
}
