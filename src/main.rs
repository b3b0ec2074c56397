use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risktag::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "risktag")]
#[command(
    version,
    about = "LLM-driven query compilation and risk classification for crawled news articles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Path to a config file (overrides the lookup chain)")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a natural-language request into a store query
    Query {
        #[arg(help = "The request, e.g. \"Show all articles tagged as Current\"")]
        text: String,
        #[arg(
            long,
            short,
            help = "Execute against a JSON article file and print matches"
        )]
        input: Option<PathBuf>,
    },

    /// Classify untagged articles from a JSON article file
    Classify {
        #[arg(long, short, help = "JSON file of article records")]
        input: PathBuf,
        #[arg(long, short, help = "Where to write updated records (default: input)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Records to classify this run")]
        batch_size: Option<usize>,
        #[arg(long, help = "Concurrent classifications")]
        concurrency: Option<usize>,
    },

    /// Show the loaded reference taxonomy
    Taxonomy,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    match cli.command {
        Commands::Query { text, input } => {
            let rt = Runtime::new()?;
            rt.block_on(risktag::cli::commands::query::run(
                &config,
                &text,
                input.as_deref(),
            ))?;
        }
        Commands::Classify {
            input,
            output,
            batch_size,
            concurrency,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(risktag::cli::commands::classify::run(
                &config,
                &input,
                output.as_deref(),
                batch_size,
                concurrency,
            ))?;
        }
        Commands::Taxonomy => {
            risktag::cli::commands::taxonomy::run(&config)?;
        }
    }

    Ok(())
}
