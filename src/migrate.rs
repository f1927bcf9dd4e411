use anyhow::Result;
use sqlx::SqlitePool;

/// Create the schema if it does not exist yet.
///
/// `knowledge_chunks` is owned by the ingestion job; `campaigns` mirrors
/// the read projection the context builder consumes (the authoritative
/// campaign table lives with the CRUD subsystem).
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS knowledge_chunks (
            id TEXT PRIMARY KEY,
            source_document TEXT NOT NULL,
            page_number INTEGER NOT NULL,
            chunk_index INTEGER NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            embedding BLOB NOT NULL,
            dims INTEGER NOT NULL,
            model TEXT NOT NULL,
            UNIQUE(source_document, page_number, chunk_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            topics TEXT NOT NULL DEFAULT '[]',
            subtopics TEXT NOT NULL DEFAULT '[]',
            tools TEXT NOT NULL DEFAULT '[]',
            sub_tools TEXT NOT NULL DEFAULT '[]',
            start_date TEXT,
            end_date TEXT,
            is_ongoing INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_campaigns_status_created ON campaigns(status, created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
