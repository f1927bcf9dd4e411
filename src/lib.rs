//! # Campaign Copilot
//!
//! A knowledge-grounded chat context builder for a campaign-sharing
//! platform. Given a user message, it decides which approved campaign
//! records and which PDF-derived knowledge chunks to inject into a
//! language-model prompt, using lightweight intent heuristics, vector
//! similarity search, and a fixed context-window budget.
//!
//! ## Architecture
//!
//! ```text
//!                 user message
//!                      │
//!               ┌──────▼──────┐
//!               │   Intent     │  off-topic flag, explicit id,
//!               │  Heuristics  │  latest/all keywords
//!               └──────┬──────┘
//!          ┌───────────┴───────────┐        (issued concurrently)
//!   ┌──────▼──────┐         ┌──────▼──────┐
//!   │  Campaign    │         │  Similarity  │── Embedding API
//!   │  Resolver    │── DB    │   Search     │── Chunk store
//!   └──────┬──────┘         └──────┬──────┘
//!          └───────────┬───────────┘
//!               ┌──────▼──────┐
//!               │   Prompt     │  persona + context blocks
//!               │  Assembler   │  + capped history
//!               └──────┬──────┘
//!               ┌──────▼──────┐
//!               │  Completion  │── Chat API
//!               └─────────────┘
//! ```
//!
//! The library is invoked by a request handler; it is not a service
//! itself. The `copilot` binary covers the offline side: database setup
//! and PDF ingestion, plus a one-shot `ask` for exercising the pipeline.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`intent`] | Pure intent heuristics |
//! | [`chunker`] | Sliding-window text chunking |
//! | [`embedding`] | Embedding client + vector utilities |
//! | [`completion`] | Chat-completion client |
//! | [`store`] | Chunk / campaign store traits and in-memory impls |
//! | [`sqlite_store`] | SQLite-backed stores |
//! | [`campaigns`] | Campaign context resolver |
//! | [`retrieval`] | Knowledge retrieval with graceful degradation |
//! | [`prompt`] | Prompt assembly |
//! | [`engine`] | Per-turn orchestration |
//! | [`ingest`] | Offline PDF ingestion pipeline |

pub mod campaigns;
pub mod chunker;
pub mod completion;
pub mod config;
pub mod db;
pub mod embedding;
pub mod engine;
pub mod ingest;
pub mod intent;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod retrieval;
pub mod sqlite_store;
pub mod store;
