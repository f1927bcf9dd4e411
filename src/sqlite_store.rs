//! SQLite-backed implementations of [`ChunkStore`] and [`CampaignStore`].
//!
//! Embeddings are stored as little-endian `f32` BLOBs and ranked with
//! in-process cosine similarity, the same metric the ingestion job used
//! when the vectors were written, so index and query always agree.
//! Campaign substring search maps to `LIKE` over lowercased columns with
//! wildcard escaping.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::models::{ApprovalStatus, CampaignSummary, Chunk};
use crate::store::{CampaignStore, ChunkStore};

/// One store handle implementing both read interfaces over a shared pool.
pub struct SqliteStore {
    pool: SqlitePool,
    /// Embedding model id recorded next to stored vectors.
    model: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, model: impl Into<String>) -> Self {
        Self {
            pool,
            model: model.into(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or update a campaign projection row. Used to mirror the
    /// authoritative campaign table into the copilot database.
    pub async fn upsert_campaign(
        &self,
        campaign: &CampaignSummary,
        status: ApprovalStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (id, title, description, country, topics, subtopics,
                                   tools, sub_tools, start_date, end_date, is_ongoing,
                                   status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                country = excluded.country,
                topics = excluded.topics,
                subtopics = excluded.subtopics,
                tools = excluded.tools,
                sub_tools = excluded.sub_tools,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                is_ongoing = excluded.is_ongoing,
                status = excluded.status,
                created_at = excluded.created_at
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(&campaign.country)
        .bind(serde_json::to_string(&campaign.topics)?)
        .bind(serde_json::to_string(&campaign.subtopics)?)
        .bind(serde_json::to_string(&campaign.tools)?)
        .bind(serde_json::to_string(&campaign.sub_tools)?)
        .bind(campaign.start_date.map(|d| d.to_string()))
        .bind(campaign.end_date.map(|d| d.to_string()))
        .bind(campaign.is_ongoing as i64)
        .bind(status.as_str())
        .bind(campaign.created_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn parse_string_array(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn campaign_from_row(row: &sqlx::sqlite::SqliteRow) -> CampaignSummary {
    let start_date: Option<String> = row.get("start_date");
    let end_date: Option<String> = row.get("end_date");
    let topics: String = row.get("topics");
    let subtopics: String = row.get("subtopics");
    let tools: String = row.get("tools");
    let sub_tools: String = row.get("sub_tools");
    let created_at: i64 = row.get("created_at");

    CampaignSummary {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        country: row.get("country"),
        topics: parse_string_array(&topics),
        subtopics: parse_string_array(&subtopics),
        tools: parse_string_array(&tools),
        sub_tools: parse_string_array(&sub_tools),
        start_date: start_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        end_date: end_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        is_ongoing: row.get::<i64, _>("is_ongoing") != 0,
        created_at: chrono::DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
    }
}

/// Escape `%`, `_`, and the escape character itself for a `LIKE ... ESCAPE '\'`
/// pattern.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if c == '%' || c == '_' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

const CAMPAIGN_COLUMNS: &str = "id, title, description, country, topics, subtopics, tools, \
                                sub_tools, start_date, end_date, is_ongoing, created_at";

#[async_trait]
impl CampaignStore for SqliteStore {
    async fn approved_by_id(&self, id: i64) -> Result<Option<CampaignSummary>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM campaigns WHERE id = ? AND status = 'APPROVED'",
            CAMPAIGN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campaign_from_row))
    }

    async fn latest_approved(&self, limit: usize) -> Result<Vec<CampaignSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM campaigns WHERE status = 'APPROVED' \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            CAMPAIGN_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campaign_from_row).collect())
    }

    async fn search_approved(&self, query: &str, limit: usize) -> Result<Vec<CampaignSummary>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let rows = sqlx::query(&format!(
            "SELECT {} FROM campaigns WHERE status = 'APPROVED' AND ( \
                 lower(title) LIKE ? ESCAPE '\\' \
                 OR lower(description) LIKE ? ESCAPE '\\' \
                 OR lower(country) LIKE ? ESCAPE '\\') \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            CAMPAIGN_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campaign_from_row).collect())
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO knowledge_chunks (id, source_document, page_number, chunk_index,
                                              text, hash, embedding, dims, model)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(source_document, page_number, chunk_index) DO UPDATE SET
                    id = excluded.id,
                    text = excluded.text,
                    hash = excluded.hash,
                    embedding = excluded.embedding,
                    dims = excluded.dims,
                    model = excluded.model
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.source_document)
            .bind(chunk.page_number)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(vec_to_blob(&chunk.embedding))
            .bind(chunk.embedding.len() as i64)
            .bind(&self.model)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_document(&self, source_document: &str) -> Result<()> {
        sqlx::query("DELETE FROM knowledge_chunks WHERE source_document = ?")
            .bind(source_document)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT id, source_document, page_number, chunk_index, text, hash, embedding \
             FROM knowledge_chunks",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, Chunk)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vector = blob_to_vec(&blob);
                let score = cosine_similarity(embedding, &vector);
                let chunk = Chunk {
                    id: row.get("id"),
                    source_document: row.get("source_document"),
                    page_number: row.get("page_number"),
                    chunk_index: row.get("chunk_index"),
                    text: row.get("text"),
                    hash: row.get("hash"),
                    embedding: vector,
                };
                (score, chunk)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });

        Ok(scored.into_iter().take(k).map(|(_, c)| c).collect())
    }
}
