//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "docseer",
    version,
    about = "Ask questions about a documentation tree and get grounded answers with images",
    long_about = "docseer retrieves the most relevant documentation passages and the best-matching \
                  documentation image for a question, then asks a language model to answer using \
                  only the retrieved text."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/docseer/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Answer a single question and exit
    Ask {
        /// Question to ask
        question: String,

        /// Print the answer, sources and image as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the image collection from the documentation tree
    IngestImages,

    /// Show the collections in the vector store
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
