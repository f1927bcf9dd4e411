//! # Campaign Copilot CLI (`copilot`)
//!
//! Offline companion to the `campaign_copilot` library.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `copilot init` | Create the SQLite database and run schema migrations |
//! | `copilot ingest` | Extract, chunk, and embed every PDF in the configured drop directory |
//! | `copilot ask "<question>"` | Run one chat turn against the stores and print the reply |
//!
//! All commands accept a `--config` flag pointing to a TOML configuration
//! file. See `config/copilot.example.toml` for a full example.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use campaign_copilot::completion::OpenAiCompletions;
use campaign_copilot::config::load_config;
use campaign_copilot::db;
use campaign_copilot::embedding::OpenAiEmbeddings;
use campaign_copilot::engine::ChatEngine;
use campaign_copilot::ingest::ingest_pdf_dir;
use campaign_copilot::migrate::run_migrations;
use campaign_copilot::models::SessionMeta;
use campaign_copilot::sqlite_store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "copilot",
    about = "Campaign Copilot — knowledge-grounded chat context builder for a campaign-sharing platform",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/copilot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema.
    Init,
    /// Ingest PDFs from the configured drop directory into the chunk store.
    Ingest,
    /// Ask a one-shot question (no session persistence).
    Ask {
        /// The user message to answer.
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config.db.path).await?;
            run_migrations(&pool).await?;
            println!("Database ready at {}", config.db.path.display());
        }
        Commands::Ingest => {
            let pool = db::connect(&config.db.path).await?;
            run_migrations(&pool).await?;
            let store = SqliteStore::new(pool, config.embedding.model.clone());
            let embedder = OpenAiEmbeddings::new(&config.embedding)?;
            let report = ingest_pdf_dir(&config, &store, &embedder).await?;
            println!(
                "Done: {} documents, {} pages, {} chunks",
                report.documents, report.pages, report.chunks
            );
        }
        Commands::Ask { question } => {
            let pool = db::connect(&config.db.path).await?;
            run_migrations(&pool).await?;
            let store = Arc::new(SqliteStore::new(pool, config.embedding.model.clone()));
            let embedder = Arc::new(OpenAiEmbeddings::new(&config.embedding)?);
            let completions = Arc::new(OpenAiCompletions::new(&config.completion)?);

            let engine = ChatEngine::new(
                store.clone(),
                store,
                embedder,
                completions,
                &config,
            );

            let reply = engine.reply(&SessionMeta::default(), &[], &question).await?;
            println!("{}", reply);
        }
    }

    Ok(())
}
