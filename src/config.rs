use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL campaign links are built from, e.g. `https://example.org`.
    /// A trailing slash is tolerated and stripped.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_embed_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: default_dims(),
            timeout_secs: default_embed_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_embed_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_completion_retries")]
    pub max_retries: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_completion_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_completion_timeout_secs(),
            max_retries: default_completion_retries(),
        }
    }
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.5
}
fn default_max_output_tokens() -> u32 {
    260
}
fn default_completion_timeout_secs() -> u64 {
    60
}
fn default_completion_retries() -> u32 {
    2
}

/// Caps on how much campaign, knowledge, and history content may enter a
/// single prompt.
#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Most recent conversation turns forwarded to the model.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Maximum campaign summaries in the campaign context block.
    #[serde(default = "default_campaign_limit")]
    pub campaign_limit: usize,
    /// Maximum knowledge chunks retrieved per turn.
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
    /// Budget for the campaign store query, per turn.
    #[serde(default = "default_campaign_timeout_secs")]
    pub campaign_timeout_secs: u64,
    /// Budget for the embed-and-search leg, per turn.
    #[serde(default = "default_knowledge_timeout_secs")]
    pub knowledge_timeout_secs: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            campaign_limit: default_campaign_limit(),
            chunk_limit: default_chunk_limit(),
            campaign_timeout_secs: default_campaign_timeout_secs(),
            knowledge_timeout_secs: default_knowledge_timeout_secs(),
        }
    }
}

fn default_history_cap() -> usize {
    10
}
fn default_campaign_limit() -> usize {
    20
}
fn default_chunk_limit() -> usize {
    5
}
fn default_campaign_timeout_secs() -> u64 {
    10
}
fn default_knowledge_timeout_secs() -> u64 {
    40
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Directory scanned for `*.pdf` files.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,
    /// Sliding-window size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in characters.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pdf_dir: default_pdf_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from("data/pdfs")
}
fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        anyhow::bail!("completion.temperature must be in [0.0, 2.0]");
    }

    if config.completion.max_output_tokens == 0 {
        anyhow::bail!("completion.max_output_tokens must be > 0");
    }

    if config.context.campaign_limit == 0 {
        anyhow::bail!("context.campaign_limit must be >= 1");
    }

    if config.context.chunk_limit == 0 {
        anyhow::bail!("context.chunk_limit must be >= 1");
    }

    if config.ingest.chunk_size == 0 {
        anyhow::bail!("ingest.chunk_size must be > 0");
    }

    Ok(config)
}
