//! Campaign context resolver.
//!
//! Decides which approved campaigns to expose to the language model for a
//! given user message. Rules are tried in order and the first match wins:
//!
//! 1. An explicit id reference (`#12`, `campaign 12`, `id: 12`) resolves
//!    to that single approved campaign.
//! 2. A "latest"-style request, or a query too short to mean anything,
//!    resolves to the newest approved campaigns.
//! 3. A "list everything" request resolves the same way; the context
//!    budget makes "all" mean "most recent up to the cap".
//! 4. Otherwise, substring search over title/description/country.
//! 5. Zero search hits fall back to a handful of recent campaigns, so the
//!    assistant never sees an empty campaign context while approved
//!    content exists.

use anyhow::Result;

use crate::intent::classify;
use crate::models::{CampaignContext, CampaignSummary};
use crate::store::CampaignStore;

/// How many recent campaigns the zero-hit fallback surfaces at most.
const FALLBACK_LIMIT: usize = 6;

fn decorate(campaigns: Vec<CampaignSummary>, base_url: &str) -> Vec<CampaignContext> {
    let base = base_url.trim_end_matches('/');
    campaigns
        .into_iter()
        .map(|summary| {
            let url = format!("{}/campaigns/{}", base, summary.id);
            CampaignContext { summary, url }
        })
        .collect()
}

/// Resolve the campaign context slice for one user message.
///
/// Returns at most `limit` campaigns, ordered by relevance then recency.
/// A `limit` of 0 is coerced to 1 rather than rejected.
pub async fn resolve_campaigns(
    store: &dyn CampaignStore,
    base_url: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<CampaignContext>> {
    let limit = limit.max(1);
    let q = query.trim();
    let intent = classify(q);

    if let Some(id) = intent.explicit_campaign_id {
        if let Some(campaign) = store.approved_by_id(id).await? {
            return Ok(decorate(vec![campaign], base_url));
        }
        // Unknown or unapproved id: fall through to the other rules.
    }

    if intent.wants_latest || q.chars().count() < 3 {
        return Ok(decorate(store.latest_approved(limit).await?, base_url));
    }

    if intent.wants_all {
        return Ok(decorate(store.latest_approved(limit).await?, base_url));
    }

    let matches = store.search_approved(q, limit).await?;
    if !matches.is_empty() {
        return Ok(decorate(matches, base_url));
    }

    let fallback = store.latest_approved(FALLBACK_LIMIT.min(limit)).await?;
    Ok(decorate(fallback, base_url))
}
