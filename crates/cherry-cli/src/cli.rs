use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cherry")]
#[command(author, version, about = "Classify text with cached Cherry models")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "cherry.yaml")]
    pub config: PathBuf,

    /// Model cache directory (overrides the configuration file)
    #[arg(long, global = true, env = "CHERRY_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one or more texts
    Classify {
        #[command(flatten)]
        model: ModelArg,

        /// Texts to classify, one result row per text
        #[arg(required = true)]
        texts: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List models available in the cache
    Models,

    /// Show the classes and feature count of a cached model
    Inspect {
        #[command(flatten)]
        model: ModelArg,
    },
}

#[derive(Args, Debug)]
pub struct ModelArg {
    /// Model name (defaults to `default_model` from the configuration)
    #[arg(short, long)]
    pub model: Option<String>,
}
