//! Core data types used throughout Campaign Copilot.
//!
//! These types represent the knowledge chunks, campaign projections, and
//! conversation turns that flow through the retrieval and prompt-building
//! pipeline. None of them are mutated by this crate after construction:
//! chunks are written once at ingestion time, and campaign summaries and
//! conversation history arrive as per-request snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A fixed-size, overlapping slice of source-document text, stored together
/// with its embedding for similarity search.
///
/// Immutable once created. `chunk_index` is unique within
/// `(source_document, page_number)`.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk UUID.
    pub id: String,
    /// File name of the document this chunk was extracted from.
    pub source_document: String,
    /// 1-based page number within the source document.
    pub page_number: i64,
    /// Position of this chunk within its page.
    pub chunk_index: i64,
    /// Raw chunk text.
    pub text: String,
    /// SHA-256 of `text`, for staleness detection on re-ingestion.
    pub hash: String,
    /// Embedding vector; dimensionality is fixed by the embedding model.
    pub embedding: Vec<f32>,
}

/// Moderation state of a campaign. Only approved campaigns are ever
/// eligible for chat context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ApprovalStatus::Pending),
            "APPROVED" => Some(ApprovalStatus::Approved),
            "REJECTED" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Read projection of a campaign record, as exposed to the prompt builder.
///
/// Owned by the campaign CRUD subsystem; this crate only reads it.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub country: String,
    pub topics: Vec<String>,
    pub subtopics: Vec<String>,
    pub tools: Vec<String>,
    pub sub_tools: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
    pub created_at: DateTime<Utc>,
}

/// A campaign summary decorated with its public web URL, ready for
/// rendering into a prompt context block.
#[derive(Debug, Clone)]
pub struct CampaignContext {
    pub summary: CampaignSummary,
    /// `{base_url}/campaigns/{id}`.
    pub url: String,
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One prior message in a chat session, supplied as an immutable snapshot.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp,
        }
    }
}

/// Role tag on an outgoing prompt message, serialized in the wire format
/// expected by chat-completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in an assembled prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-session selections made in the guided chat flow. All optional; the
/// persona block adapts to whatever is present.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
    /// Virtual mentor the user picked, if any.
    pub mentor_name: Option<String>,
    /// Topic chosen during onboarding.
    pub topic_name: Option<String>,
    /// Action tool chosen during onboarding.
    pub tool_name: Option<String>,
    /// Sub-tool refinement of `tool_name`.
    pub sub_tool_name: Option<String>,
}
