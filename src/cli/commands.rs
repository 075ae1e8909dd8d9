//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "taxrag")]
#[command(about = "Income-tax law assistant: retrieval-augmented answers over the tax code")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session
    Chat {
        /// Session id for conversation memory
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Ask a single question and stream the answer
    Ask {
        /// The question
        question: String,
        /// Session id for conversation memory
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Show current configuration
    Config,
}

impl Commands {
    /// Whether the command needs the secrets and the RAG pipeline
    #[must_use]
    pub const fn needs_pipeline(&self) -> bool {
        !matches!(self, Self::Config)
    }
}
