//! Storage abstraction for the context builder.
//!
//! Two narrow read interfaces cover everything the chat pipeline needs
//! from persistence: [`ChunkStore`] for the vector-indexed knowledge
//! chunks and [`CampaignStore`] for the campaign read projection. Both
//! are owned externally (the ingestion job is this crate's only writer,
//! and only to the chunk table); the chat path issues reads exclusively.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CampaignSummary, Chunk};

/// Persisted table of embedded text fragments from source documents.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Append a batch of chunks. Ingestion-only.
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Remove every chunk extracted from `source_document`, so a document
    /// can be re-ingested without duplicates. Ingestion-only.
    async fn delete_document(&self, source_document: &str) -> Result<()>;

    /// The `k` chunks nearest to `embedding`, best match first. Ties are
    /// broken by chunk id so results are reproducible.
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>>;
}

/// Read queries over the externally-owned campaign table. Every method
/// already filters to approved campaigns; unapproved records never reach
/// the prompt builder.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// A single approved campaign by id, if it exists and is approved.
    async fn approved_by_id(&self, id: i64) -> Result<Option<CampaignSummary>>;

    /// The `limit` most recently created approved campaigns, newest first.
    async fn latest_approved(&self, limit: usize) -> Result<Vec<CampaignSummary>>;

    /// Case-insensitive substring match of `query` against title,
    /// description, and country; newest first among matches, capped at
    /// `limit`.
    async fn search_approved(&self, query: &str, limit: usize) -> Result<Vec<CampaignSummary>>;
}
