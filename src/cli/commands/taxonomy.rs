//! Taxonomy Command
//!
//! Show the loaded reference taxonomy: counts per list and the sampled
//! previews the query prompt embeds.

use console::style;

use crate::cli::util::load_taxonomy;
use crate::config::Config;
use crate::constants::query;
use crate::types::Result;

pub fn run(config: &Config) -> Result<()> {
    let taxonomy = load_taxonomy(config)?;

    println!("{}", style("Reference taxonomy").bold());
    match &config.taxonomy.file {
        Some(path) => println!("  source: {}", path.display()),
        None => println!("  source: builtin"),
    }
    println!();
    println!(
        "Concern events ({}): {}",
        taxonomy.concerns().len(),
        taxonomy.concerns_preview(query::TAXONOMY_PREVIEW_LEN)
    );
    println!(
        "Emerging risks ({}): {}",
        taxonomy.emerging_risks().len(),
        taxonomy.emerging_risks_preview(query::TAXONOMY_PREVIEW_LEN)
    );
    println!(
        "Misc topics ({}): {}",
        taxonomy.misc_topics().len(),
        taxonomy.misc_topics_joined()
    );
    println!("NAICS entries: {}", taxonomy.naics().len());

    Ok(())
}
