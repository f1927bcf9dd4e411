//! Knowledge-base retrieval for a single chat turn.
//!
//! Embeds the user's message once and asks the chunk store for the
//! nearest neighbors. This leg is strictly best-effort: the assistant
//! can answer without knowledge-base context, so an embedding or store
//! failure degrades to an empty result instead of failing the turn.

use crate::embedding::EmbeddingClient;
use crate::models::Chunk;
use crate::store::ChunkStore;

/// The `k` stored chunks closest to `query`, best match first.
///
/// Infallible by design: any error on the embedding or store side is
/// logged and reported as zero chunks.
pub async fn search_knowledge(
    embedder: &dyn EmbeddingClient,
    store: &dyn ChunkStore,
    query: &str,
    k: usize,
) -> Vec<Chunk> {
    if query.trim().is_empty() || k == 0 {
        return Vec::new();
    }

    let embedding = match embedder.embed(query).await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: query embedding failed: {}", e);
            return Vec::new();
        }
    };

    match store.nearest(&embedding, k).await {
        Ok(chunks) => chunks,
        Err(e) => {
            eprintln!("Warning: knowledge search failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryChunkStore;
    use crate::store::ChunkStore as _;
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl EmbeddingClient for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn dims(&self) -> usize {
            self.0.len()
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            bail!("embedding service unreachable")
        }
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            0
        }
    }

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            source_document: "handbook.pdf".to_string(),
            page_number: 3,
            chunk_index: 0,
            text: format!("text {}", id),
            hash: String::new(),
            embedding,
        }
    }

    #[tokio::test]
    async fn returns_nearest_chunks_best_first() {
        let store = InMemoryChunkStore::new();
        store
            .insert_chunks(&[
                chunk("far", vec![0.0, 1.0]),
                chunk("near", vec![1.0, 0.05]),
            ])
            .await
            .unwrap();

        let got = search_knowledge(&FixedEmbedder(vec![1.0, 0.0]), &store, "how to start", 1).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "near");
    }

    #[tokio::test]
    async fn embedding_failure_degrades_to_empty() {
        let store = InMemoryChunkStore::new();
        store
            .insert_chunks(&[chunk("a", vec![1.0, 0.0])])
            .await
            .unwrap();

        let got = search_knowledge(&FailingEmbedder, &store, "how to start", 5).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let store = InMemoryChunkStore::new();
        let got = search_knowledge(&FixedEmbedder(vec![1.0]), &store, "   ", 5).await;
        assert!(got.is_empty());
    }
}
