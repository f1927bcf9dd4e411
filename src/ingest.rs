//! Offline PDF ingestion pipeline.
//!
//! Walks a drop directory for PDF files, extracts text page by page,
//! slices each page into overlapping windows, embeds every window, and
//! writes the result to the chunk store. Re-ingesting a document replaces
//! its previous chunks. This is the only writer the chunk table has, and
//! it runs out of band. The chat path never mutates anything.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::chunker::sliding_chunks;
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::models::Chunk;
use crate::store::ChunkStore;

/// Counters for one ingestion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestReport {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Ingest already-extracted page texts for one document.
///
/// Page numbers are 1-based. Existing chunks for `source_document` are
/// replaced, not appended to.
pub async fn ingest_pages(
    source_document: &str,
    pages: &[String],
    chunk_size: usize,
    chunk_overlap: usize,
    store: &dyn ChunkStore,
    embedder: &dyn EmbeddingClient,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        documents: 1,
        ..Default::default()
    };

    store.delete_document(source_document).await?;

    for (page_idx, page_text) in pages.iter().enumerate() {
        let windows = sliding_chunks(page_text, chunk_size, chunk_overlap);
        if windows.is_empty() {
            continue;
        }
        report.pages += 1;

        let vectors = embedder
            .embed_batch(&windows)
            .await
            .with_context(|| format!("embedding {} page {}", source_document, page_idx + 1))?;

        let chunks: Vec<Chunk> = windows
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| Chunk {
                id: Uuid::new_v4().to_string(),
                source_document: source_document.to_string(),
                page_number: (page_idx + 1) as i64,
                chunk_index: chunk_index as i64,
                hash: sha256_hex(&text),
                text,
                embedding,
            })
            .collect();

        report.chunks += chunks.len();
        store.insert_chunks(&chunks).await?;
    }

    Ok(report)
}

/// Walk `ingest.pdf_dir`, extract and ingest every PDF found.
///
/// A document that fails to parse is skipped with a warning; the run
/// continues with the rest.
pub async fn ingest_pdf_dir(
    config: &Config,
    store: &dyn ChunkStore,
    embedder: &dyn EmbeddingClient,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for entry in WalkDir::new(&config.ingest.pdf_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;

        let pages = match pdf_extract::extract_text_from_mem_by_pages(&bytes) {
            Ok(pages) => pages,
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", file_name, e);
                continue;
            }
        };

        let doc_report = ingest_pages(
            &file_name,
            &pages,
            config.ingest.chunk_size,
            config.ingest.chunk_overlap,
            store,
            embedder,
        )
        .await?;

        println!(
            "Ingested {} ({} pages, {} chunks)",
            file_name, doc_report.pages, doc_report.chunks
        );

        report.documents += doc_report.documents;
        report.pages += doc_report.pages;
        report.chunks += doc_report.chunks;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryChunkStore;
    use async_trait::async_trait;

    struct CountingEmbedder;

    #[async_trait]
    impl EmbeddingClient for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Deterministic toy embedding: length and first byte.
            let first = text.bytes().next().unwrap_or(0) as f32;
            Ok(vec![text.len() as f32, first])
        }
        fn model_name(&self) -> &str {
            "counting"
        }
        fn dims(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn pages_are_chunked_indexed_and_stored() {
        let store = InMemoryChunkStore::new();
        let pages = vec!["a".repeat(25), String::new(), "b".repeat(5)];

        let report = ingest_pages("guide.pdf", &pages, 10, 2, &store, &CountingEmbedder)
            .await
            .unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.pages, 2); // the empty page produced nothing
        // Page 1: windows at offsets 0, 8, 16. Page 3: a single window.
        assert_eq!(report.chunks, 4);

        let stored = store.nearest(&[10.0, 97.0], 100).await.unwrap();
        assert_eq!(stored.len(), 4);
        let page1: Vec<&Chunk> = stored.iter().filter(|c| c.page_number == 1).collect();
        assert_eq!(page1.len(), 3);
        let mut indices: Vec<i64> = page1.iter().map(|c| c.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(stored.iter().all(|c| !c.hash.is_empty()));
        assert!(stored.iter().all(|c| c.embedding.len() == 2));
    }

    #[tokio::test]
    async fn reingest_replaces_previous_chunks() {
        let store = InMemoryChunkStore::new();

        ingest_pages("guide.pdf", &["first version".to_string()], 100, 0, &store, &CountingEmbedder)
            .await
            .unwrap();
        ingest_pages("guide.pdf", &["second".to_string()], 100, 0, &store, &CountingEmbedder)
            .await
            .unwrap();

        let stored = store.nearest(&[6.0, 115.0], 100).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "second");
    }
}
