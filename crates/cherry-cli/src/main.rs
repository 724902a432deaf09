//! Cherry CLI
//!
//! Classifies text with models from the Cherry cache and prints the results
//! as JSON.

use anyhow::{Context, Result};
use cherry_classify::{CherryConfig, Classify, ModelArtifacts};
use clap::Parser;
use std::io::Write;
use tracing::{debug, info};

mod cli;
mod report;

use cli::{Cli, Commands};
use report::{ClassifyReport, ModelReport};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    run(cli, &mut std::io::stdout().lock())
}

/// Execute one command, writing its output to `out`
fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let mut config = CherryConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(cache_dir) = &cli.cache_dir {
        config = config.with_cache_dir(cache_dir);
    }
    debug!("Model cache: {}", config.cache_dir.display());

    let cache = config.cache();

    match cli.command {
        Commands::Classify {
            model,
            texts,
            pretty,
        } => {
            let model = config.model(model.model.as_deref())?;
            info!("Classifying {} text(s) with model {}", texts.len(), model);

            let result = Classify::new(&cache, model, texts.clone())
                .with_context(|| format!("Classification with model {} failed", model))?;
            let report = ClassifyReport::new(model, &texts, &result);

            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            writeln!(out, "{}", json)?;
        }

        Commands::Models => {
            for model in cache.models()? {
                writeln!(out, "{}", model)?;
            }
        }

        Commands::Inspect { model } => {
            let model = config.model(model.model.as_deref())?;
            let artifacts = ModelArtifacts::load(&cache, model)
                .with_context(|| format!("Failed to load model {}", model))?;
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(&ModelReport::from(&artifacts))?
            )?;
        }
    }

    Ok(())
}

/// Initialize tracing/logging on stderr, keeping stdout for results
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("cherry=debug,cherry_classify=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cherry=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
