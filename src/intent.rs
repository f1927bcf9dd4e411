//! Lightweight intent heuristics over the raw user message.
//!
//! Everything in this module is a pure function over the message text: no
//! I/O, no failure modes. The classifiers only annotate the turn; in
//! particular, off-topic detection never blocks generation, it adds a
//! redirection hint to the prompt.

use regex::Regex;
use std::sync::OnceLock;

/// What the heuristics read out of a single user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    /// Message looks unrelated to the platform's domain.
    pub off_topic: bool,
    /// Campaign id the user referenced explicitly (`#12`, `campaign 12`,
    /// `id: 12`), if any.
    pub explicit_campaign_id: Option<i64>,
    /// Message asks for the newest campaigns.
    pub wants_latest: bool,
    /// Message asks to list campaigns broadly.
    pub wants_all: bool,
}

/// Obvious coding and dev-help requests the assistant should steer away
/// from. Matched as lowercase substrings.
const OFF_TOPIC_TERMS: &[&str] = &[
    "python",
    "javascript",
    "react",
    "node",
    "coding",
    "programming",
    "java",
    "c++",
    "sql",
    "algorithm",
    "leetcode",
    "bug",
    "stack trace",
    "css",
    "html",
];

fn teach_me_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bteach me\b").unwrap())
}

fn hash_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\s*(\d{1,10})\b").unwrap())
}

fn campaign_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcampaign\s+(\d{1,10})\b").unwrap())
}

fn id_colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bid\s*:\s*(\d{1,10})\b").unwrap())
}

fn latest_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(latest|newest|recent|last)\b").unwrap())
}

fn all_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(all campaigns|all approved campaigns|list campaigns|show campaigns)\b")
            .unwrap()
    })
}

/// Classify a user message. Total: always returns a fully-populated
/// [`Intent`], worst case with every field false/`None`.
pub fn classify(text: &str) -> Intent {
    let t = text.to_lowercase();
    Intent {
        off_topic: is_off_topic(&t),
        explicit_campaign_id: extract_campaign_id(&t),
        wants_latest: latest_re().is_match(&t),
        wants_all: all_re().is_match(&t),
    }
}

fn is_off_topic(lowered: &str) -> bool {
    if OFF_TOPIC_TERMS.iter().any(|k| lowered.contains(k)) {
        return true;
    }

    // Generic "teach me X" where X has nothing to do with the domain.
    teach_me_re().is_match(lowered)
        && !lowered.contains("nonviolent")
        && !lowered.contains("activism")
}

/// Pull an explicit campaign id out of free text. Pattern priority:
/// `#<digits>`, then `campaign <digits>`, then `id: <digits>`; first match
/// wins. Returns `None` when nothing matches or the number does not fit
/// the supported range.
fn extract_campaign_id(lowered: &str) -> Option<i64> {
    for re in [hash_id_re(), campaign_id_re(), id_colon_re()] {
        if let Some(caps) = re.captures(lowered) {
            return caps[1].parse::<i64>().ok();
        }
    }
    None
}
