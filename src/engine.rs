//! Per-turn orchestration.
//!
//! [`ChatEngine`] wires the stores and API clients together: classify the
//! message, gather campaign and knowledge context concurrently, assemble
//! the prompt, and ask the completion client for a reply. The two context
//! queries have no data dependency, so they are issued together and
//! joined, each under its own timeout.
//!
//! Failure policy per leg:
//! - knowledge retrieval degrades to an empty context on error or timeout;
//! - campaign resolution degrades on timeout but surfaces store errors;
//! - a completion failure yields a literal apologetic fallback string, so
//!   the transport layer never sees a stack trace from this leg.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::campaigns::resolve_campaigns;
use crate::completion::CompletionClient;
use crate::config::{CompletionConfig, Config, ContextConfig};
use crate::embedding::EmbeddingClient;
use crate::intent::classify;
use crate::prompt::assemble;
use crate::retrieval::search_knowledge;
use crate::store::{CampaignStore, ChunkStore};
use crate::models::{ConversationTurn, SessionMeta};

/// Returned when the completion call fails outright.
const COMPLETION_FALLBACK: &str =
    "Sorry — I'm having trouble answering right now. Please try again in a moment.";

/// Returned when the completion call succeeds but produces no text.
const EMPTY_REPLY_FALLBACK: &str = "Sorry — I couldn't generate a response right now.";

/// Knowledge-grounded reply generator for one chat turn at a time.
pub struct ChatEngine {
    campaigns: Arc<dyn CampaignStore>,
    chunks: Arc<dyn ChunkStore>,
    embedder: Arc<dyn EmbeddingClient>,
    completions: Arc<dyn CompletionClient>,
    completion: CompletionConfig,
    context: ContextConfig,
    base_url: String,
}

impl ChatEngine {
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        chunks: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingClient>,
        completions: Arc<dyn CompletionClient>,
        config: &Config,
    ) -> Self {
        Self {
            campaigns,
            chunks,
            embedder,
            completions,
            completion: config.completion.clone(),
            context: config.context.clone(),
            base_url: config.app.public_base_url.clone(),
        }
    }

    /// Produce the assistant's reply to `user_text`.
    ///
    /// `history` is the prior conversation as an immutable snapshot; the
    /// engine neither stores nor mutates it. Returns `Err` only when the
    /// campaign store itself fails; every other failure mode degrades
    /// into a usable reply.
    pub async fn reply(
        &self,
        session: &SessionMeta,
        history: &[ConversationTurn],
        user_text: &str,
    ) -> Result<String> {
        let intent = classify(user_text);

        let campaign_fut = timeout(
            Duration::from_secs(self.context.campaign_timeout_secs),
            resolve_campaigns(
                self.campaigns.as_ref(),
                &self.base_url,
                user_text,
                self.context.campaign_limit,
            ),
        );
        let knowledge_fut = timeout(
            Duration::from_secs(self.context.knowledge_timeout_secs),
            search_knowledge(
                self.embedder.as_ref(),
                self.chunks.as_ref(),
                user_text,
                self.context.chunk_limit,
            ),
        );

        let (campaign_res, knowledge_res) = tokio::join!(campaign_fut, knowledge_fut);

        let campaigns = match campaign_res {
            Ok(resolved) => resolved?,
            Err(_) => {
                eprintln!("Warning: campaign context query timed out");
                Vec::new()
            }
        };

        let chunks = knowledge_res.unwrap_or_else(|_| {
            eprintln!("Warning: knowledge retrieval timed out");
            Vec::new()
        });

        let messages = assemble(
            session,
            &campaigns,
            &chunks,
            history,
            intent.off_topic,
            user_text,
            self.context.history_cap,
        );

        match self
            .completions
            .complete(
                &messages,
                self.completion.temperature,
                self.completion.max_output_tokens,
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Ok(EMPTY_REPLY_FALLBACK.to_string()),
            Err(e) => {
                eprintln!("Warning: completion failed: {}", e);
                Ok(COMPLETION_FALLBACK.to_string())
            }
        }
    }
}
