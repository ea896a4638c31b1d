//! # askbase CLI
//!
//! The `askbase` binary answers questions against a fixed knowledge base
//! document. The document is chunked and embedded at startup; each query
//! retrieves the most similar chunks and a chat model produces the reply.
//!
//! ## Usage
//!
//! ```bash
//! askbase --config ./config/askbase.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askbase serve` | Start the HTTP chat API |
//! | `askbase ask "<question>"` | Answer one question and exit |
//! | `askbase search "<query>"` | Show the chunks retrieval would feed the model |
//! | `askbase chunks` | Preview chunking statistics without embedding |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use askbase::engine::Engine;
use askbase::{ask, chunks_cmd, config, search, server};

/// Retrieval-augmented question answering over a fixed knowledge base.
#[derive(Parser)]
#[command(
    name = "askbase",
    about = "Retrieval-augmented question answering over a fixed knowledge base",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/askbase.toml`. The knowledge base document,
    /// chunking, embedding, completion, and server settings are all read
    /// from this file.
    #[arg(long, global = true, default_value = "./config/askbase.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat API.
    ///
    /// Loads and embeds the knowledge base, then serves `GET /` and
    /// `POST /chat` on the address configured in `[server].bind`.
    Serve,

    /// Answer a single question and exit.
    ///
    /// Runs the same pipeline as the server for one query: retrieve the
    /// most similar chunks, assemble the prompt, call the chat model.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve (defaults to `[retrieval].top_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Show the chunks retrieval would feed the model.
    ///
    /// Embeds the query and prints the top matches with their similarity
    /// scores. No chat completion is made.
    Search {
        /// The search query string.
        query: String,

        /// Number of chunks to retrieve (defaults to `[retrieval].top_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Preview chunking statistics without calling any API.
    Chunks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("askbase=info,tower_http=info")),
        )
        .with_target(false)
        // Diagnostics go to stderr; stdout carries command output only.
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let engine = Arc::new(Engine::bootstrap(&cfg).await?);
            server::run_server(&cfg, engine).await?;
        }
        Commands::Ask { question, k } => {
            ask::run_ask(&cfg, &question, k).await?;
        }
        Commands::Search { query, k } => {
            search::run_search(&cfg, &query, k).await?;
        }
        Commands::Chunks => {
            chunks_cmd::run_chunks(&cfg)?;
        }
    }

    Ok(())
}
