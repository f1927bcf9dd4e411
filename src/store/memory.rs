//! In-memory store implementations for tests and embedded use.
//!
//! Vector search is brute-force cosine similarity over all stored chunks;
//! campaign search is lowercase substring matching. Both sort and
//! truncate exactly like the SQLite backend so either can stand behind
//! the engine.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{ApprovalStatus, CampaignSummary, Chunk};

use super::{CampaignStore, ChunkStore};

/// In-memory [`ChunkStore`].
#[derive(Default)]
pub struct InMemoryChunkStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        self.chunks.write().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn delete_document(&self, source_document: &str) -> Result<()> {
        self.chunks
            .write()
            .unwrap()
            .retain(|c| c.source_document != source_document);
        Ok(())
    }

    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read().unwrap();
        let mut scored: Vec<(f32, &Chunk)> = chunks
            .iter()
            .map(|c| (cosine_similarity(embedding, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        Ok(scored.into_iter().take(k).map(|(_, c)| c.clone()).collect())
    }
}

/// In-memory [`CampaignStore`]. Holds records of every approval status so
/// the approved-only filter is exercised, not assumed.
#[derive(Default)]
pub struct InMemoryCampaignStore {
    campaigns: RwLock<Vec<(CampaignSummary, ApprovalStatus)>>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, summary: CampaignSummary, status: ApprovalStatus) {
        self.campaigns.write().unwrap().push((summary, status));
    }
}

fn newest_first(list: &mut [CampaignSummary]) {
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn approved_by_id(&self, id: i64) -> Result<Option<CampaignSummary>> {
        let campaigns = self.campaigns.read().unwrap();
        Ok(campaigns
            .iter()
            .find(|(c, status)| c.id == id && *status == ApprovalStatus::Approved)
            .map(|(c, _)| c.clone()))
    }

    async fn latest_approved(&self, limit: usize) -> Result<Vec<CampaignSummary>> {
        let campaigns = self.campaigns.read().unwrap();
        let mut approved: Vec<CampaignSummary> = campaigns
            .iter()
            .filter(|(_, status)| *status == ApprovalStatus::Approved)
            .map(|(c, _)| c.clone())
            .collect();
        newest_first(&mut approved);
        approved.truncate(limit);
        Ok(approved)
    }

    async fn search_approved(&self, query: &str, limit: usize) -> Result<Vec<CampaignSummary>> {
        let q = query.to_lowercase();
        let campaigns = self.campaigns.read().unwrap();
        let mut matches: Vec<CampaignSummary> = campaigns
            .iter()
            .filter(|(c, status)| {
                *status == ApprovalStatus::Approved
                    && (c.title.to_lowercase().contains(&q)
                        || c.description.to_lowercase().contains(&q)
                        || c.country.to_lowercase().contains(&q))
            })
            .map(|(c, _)| c.clone())
            .collect();
        newest_first(&mut matches);
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn campaign(id: i64, title: &str, days_ago: i64) -> CampaignSummary {
        CampaignSummary {
            id,
            title: title.to_string(),
            description: String::new(),
            country: "Georgia".to_string(),
            topics: Vec::new(),
            subtopics: Vec::new(),
            tools: Vec::new(),
            sub_tools: Vec::new(),
            start_date: None,
            end_date: None,
            is_ongoing: false,
            created_at: Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
                - chrono::Duration::days(days_ago),
        }
    }

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            source_document: "guide.pdf".to_string(),
            page_number: 1,
            chunk_index: 0,
            text: format!("chunk {}", id),
            hash: String::new(),
            embedding,
        }
    }

    #[tokio::test]
    async fn nearest_orders_by_similarity_then_id() {
        let store = InMemoryChunkStore::new();
        store
            .insert_chunks(&[
                chunk("b", vec![1.0, 0.0]),
                chunk("a", vec![1.0, 0.0]),
                chunk("c", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let got = store.nearest(&[1.0, 0.0], 3).await.unwrap();
        let ids: Vec<&str> = got.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_document_removes_only_that_source() {
        let store = InMemoryChunkStore::new();
        let mut other = chunk("x", vec![1.0]);
        other.source_document = "other.pdf".to_string();
        store
            .insert_chunks(&[chunk("a", vec![1.0]), other])
            .await
            .unwrap();

        store.delete_document("guide.pdf").await.unwrap();
        let got = store.nearest(&[1.0], 10).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].source_document, "other.pdf");
    }

    #[tokio::test]
    async fn unapproved_campaigns_are_invisible() {
        let store = InMemoryCampaignStore::new();
        store.insert(campaign(1, "Approved march", 1), ApprovalStatus::Approved);
        store.insert(campaign(2, "Pending march", 0), ApprovalStatus::Pending);
        store.insert(campaign(3, "Rejected march", 0), ApprovalStatus::Rejected);

        assert!(store.approved_by_id(2).await.unwrap().is_none());
        let latest = store.latest_approved(10).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, 1);
        let found = store.search_approved("march", 10).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_newest_first() {
        let store = InMemoryCampaignStore::new();
        store.insert(campaign(1, "Climate Strike", 5), ApprovalStatus::Approved);
        store.insert(campaign(2, "climate mural", 1), ApprovalStatus::Approved);
        store.insert(campaign(3, "River cleanup", 2), ApprovalStatus::Approved);

        let found = store.search_approved("CLIMATE", 10).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
