//! CLI module for docs-summarizer
//!
//! Provides command-line interface parsing for the docs-summarizer binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docs-summarizer - answer questions from product documentation
#[derive(Parser, Debug)]
#[command(
    name = "docs-summarizer",
    version,
    about = "Answer questions from product documentation with an LLM",
    long_about = "Retrieves documentation passages relevant to a question, fits them and the\n\
                  conversation history into the model's context window, and asks the\n\
                  configured LLM for an answer.",
    after_help = "EXAMPLES:\n    \
                  docs-summarizer index ./docs --base-url https://docs.example.com/4.15\n    \
                  docs-summarizer ask \"How do I upgrade a cluster?\"\n    \
                  docs-summarizer ask \"And rollback?\" --history chat.txt\n    \
                  docs-summarizer config --validate"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        default_value = "docs-summarizer.toml",
        env = "DOCS_SUMMARIZER_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Enable verbose output (debug logging for this crate)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about the documentation
    Ask {
        /// The question to answer
        question: String,

        /// Conversation id used in log lines (generated when omitted)
        #[arg(long)]
        conversation_id: Option<String>,

        /// File with previous conversation turns, one `human:`/`ai:` line each
        #[arg(long)]
        history: Option<PathBuf>,

        /// Answer without retrieving reference content
        #[arg(long)]
        no_rag: bool,

        /// Model to use instead of the configured default
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ingest a documentation directory into the configured index
    Index {
        /// Directory containing markdown or text documentation
        docs_dir: PathBuf,

        /// Public URL the directory is published under
        #[arg(long)]
        base_url: String,

        /// Chunk size in characters
        #[arg(long, default_value = "1500")]
        chunk_size: usize,

        /// Overlap between consecutive chunks in characters
        #[arg(long, default_value = "150")]
        chunk_overlap: usize,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file and exit
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
