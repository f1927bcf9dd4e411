//! Prompt assembly.
//!
//! Builds the ordered, role-tagged message sequence for one chat turn:
//! persona → campaign context → knowledge context (when retrieved) →
//! off-topic hint (when flagged) → capped history → the new user turn.
//! Everything in this module is pure string work with no I/O and no
//! failure: oversized inputs are truncated and empty inputs render
//! explicit markers.

use crate::models::{CampaignContext, ChatMessage, Chunk, ConversationTurn, SessionMeta, Speaker};

/// Hard cap on the rendered description of a single campaign.
const DESCRIPTION_CAP: usize = 220;

/// What the platform is, for grounding the assistant's claims about itself.
const PLATFORM_KNOWLEDGE: &str = "\
This assistant lives inside a campaign-sharing platform for peaceful activism. \
The platform collects verified non-violent campaigns from around the world, helps \
people discover causes that match their interests and skills, and guides newcomers \
through a simple chat experience instead of overwhelming them with information. \
It is aimed at young people who care about justice, equality, and human rights \
but may not know where to begin. The platform never promotes conflict; it exists \
to make responsible, creative, peaceful participation accessible.";

/// What non-violent action is, for keeping suggestions inside the domain.
const NONVIOLENCE_KNOWLEDGE: &str = "\
Non-violent action creates social or political change without physical harm: \
peaceful protests and demonstrations, creative art actions, community organizing, \
educational initiatives, social media advocacy, petitions and open letters, \
dialogue campaigns, and ethical consumer action. It is rooted in responsibility \
and respect for human dignity, turning frustration into constructive, meaningful \
participation.";

/// Render the persona block for the current session selections.
pub fn persona_block(session: &SessionMeta) -> String {
    let mentor = session
        .mentor_name
        .as_deref()
        .filter(|name| !name.is_empty() && *name != "Assistant");

    let persona_intro = match mentor {
        Some(name) => format!(
            "Persona:\n- You speak as \"{}\" (virtual mentor simulation).\n- Sound human, grounded and experienced.\n- Do NOT repeatedly introduce yourself.",
            name
        ),
        None => "Persona:\n- You are the platform's assistant.\n- Friendly, sharp, practical, and emotionally intelligent.".to_string(),
    };

    let topic_status = match session.topic_name.as_deref() {
        Some(topic) if !topic.is_empty() => format!("Topic selected: {}", topic),
        _ => "No specific topic selected".to_string(),
    };

    let tool_status = match (
        session.tool_name.as_deref().filter(|t| !t.is_empty()),
        session.sub_tool_name.as_deref().filter(|t| !t.is_empty()),
    ) {
        (Some(tool), Some(sub)) => format!("Tool selected: {} -> {}", tool, sub),
        (Some(tool), None) => format!("Tool selected: {}", tool),
        _ => "Tool selection: user skipped or clicked \"I don't know\"".to_string(),
    };

    format!(
        "{persona_intro}\n\n\
         Session awareness:\n- {topic_status}\n- {tool_status}\n\n\
         Behavior rules:\n\
         - Subtly demonstrate awareness of the selected topic and tool; never repeat them mechanically.\n\
         - If the user skipped the tool selection, switch into guidance mode: ask what matters to them, what they are strong at, and how much time they have, then offer 2-3 structured options.\n\
         - If the user sounds uncertain or overwhelmed, lead confidently; ask at most ONE thoughtful question at a time.\n\
         - When clarity increases, switch into planning mode and give a short action plan: clear goal, why it matters, suggested tool, first safe step, optional next step.\n\n\
         Tone:\n\
         - Calm, intelligent, empowering. Never preachy, never robotic, never overly long.\n\
         - Speak like a thoughtful mentor, not a chatbot."
    )
}

/// Render the full system persona message.
pub fn system_prompt(session: &SessionMeta) -> String {
    format!(
        "You are the assistant inside a campaign-sharing platform for peaceful activism.\n\n\
         About the platform:\n{PLATFORM_KNOWLEDGE}\n\n\
         About non-violent action:\n{NONVIOLENCE_KNOWLEDGE}\n\n\
         Primary mission: help people turn confusion into safe, non-violent action.\n\n\
         Campaign usage rules:\n\
         - Only use campaigns from the provided context.\n\
         - Always reference campaigns with Markdown links; never output plain URLs.\n\
         - If listing campaigns, keep it to 3-5 relevant ones.\n\n\
         Safety:\n\
         - Promote legal, non-violent civic participation.\n\
         - Refuse violent or harmful instructions.\n\n\
         Style:\n\
         - 2-6 short paragraphs, clear structure, confident tone, no filler.\n\n\
         {}",
        persona_block(session)
    )
}

fn truncate_description(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.chars().count() > DESCRIPTION_CAP {
        let cut: String = trimmed.chars().take(DESCRIPTION_CAP).collect();
        format!("{}…", cut)
    } else {
        trimmed.to_string()
    }
}

fn json_array(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Render one campaign as a single context line plus an indented,
/// truncated description.
fn campaign_line(campaign: &CampaignContext) -> String {
    let c = &campaign.summary;
    let mut parts: Vec<String> = vec![format!("#{}: {}", c.id, c.title)];

    if !c.topics.is_empty() {
        parts.push(format!("topics: {}", json_array(&c.topics)));
    }
    if !c.subtopics.is_empty() {
        parts.push(format!("subtopics: {}", json_array(&c.subtopics)));
    }
    if !c.tools.is_empty() {
        parts.push(format!("tools: {}", json_array(&c.tools)));
    }
    if !c.sub_tools.is_empty() {
        parts.push(format!("subTools: {}", json_array(&c.sub_tools)));
    }
    if let Some(start) = c.start_date {
        parts.push(format!("startDate: {}", start.format("%Y-%m-%d")));
    }
    if let Some(end) = c.end_date {
        parts.push(format!("endDate: {}", end.format("%Y-%m-%d")));
    }
    if c.is_ongoing {
        parts.push("isOngoing: true".to_string());
    }
    parts.push(format!("url: {}", campaign.url));

    let description = truncate_description(&c.description);
    if description.is_empty() {
        parts.join(" | ")
    } else {
        format!("{}\n  - {}", parts.join(" | "), description)
    }
}

/// Render the campaign context block. Zero campaigns render an explicit
/// marker so the model does not invent campaigns to fill the gap.
pub fn render_campaign_context(campaigns: &[CampaignContext]) -> String {
    if campaigns.is_empty() {
        return "No approved campaigns found.".to_string();
    }
    campaigns
        .iter()
        .map(campaign_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render retrieved knowledge chunks, each tagged with its provenance.
pub fn render_knowledge_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| format!("[{} – page {}]\n{}", c.source_document, c.page_number, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

const OFF_TOPIC_HINT: &str = "Note: the user's last message looks off-topic for this \
platform. Respond briefly, then redirect toward what the platform can help with \
(topics, campaigns, non-violent actions). Do not use a repeated canned sentence.";

/// Compose the full, ordered prompt for one turn.
///
/// History beyond the most recent `history_cap` turns is dropped
/// silently, never summarized.
pub fn assemble(
    session: &SessionMeta,
    campaigns: &[CampaignContext],
    chunks: &[Chunk],
    history: &[ConversationTurn],
    off_topic_hint: bool,
    user_text: &str,
    history_cap: usize,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len().min(history_cap) + 4);

    messages.push(ChatMessage::system(system_prompt(session)));

    messages.push(ChatMessage::system(format!(
        "Approved campaigns context (most recent first). Use ONLY these for campaign facts:\n{}",
        render_campaign_context(campaigns)
    )));

    if !chunks.is_empty() {
        messages.push(ChatMessage::system(format!(
            "Knowledge base context from uploaded documents. Use it for factual information:\n{}",
            render_knowledge_context(chunks)
        )));
    }

    if off_topic_hint {
        messages.push(ChatMessage::system(OFF_TOPIC_HINT));
    }

    let skip = history.len().saturating_sub(history_cap);
    for turn in &history[skip..] {
        messages.push(match turn.speaker {
            Speaker::User => ChatMessage::user(turn.text.clone()),
            Speaker::Assistant => ChatMessage::assistant(turn.text.clone()),
        });
    }

    messages.push(ChatMessage::user(user_text));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CampaignSummary, Role};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn campaign_ctx(id: i64) -> CampaignContext {
        CampaignContext {
            summary: CampaignSummary {
                id,
                title: format!("Campaign {}", id),
                description: "Short description".to_string(),
                country: "Georgia".to_string(),
                topics: vec!["environment".to_string()],
                subtopics: Vec::new(),
                tools: vec!["petition".to_string()],
                sub_tools: Vec::new(),
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
                end_date: None,
                is_ongoing: true,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            },
            url: format!("https://example.org/campaigns/{}", id),
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            id: "c1".to_string(),
            source_document: "handbook.pdf".to_string(),
            page_number: 7,
            chunk_index: 0,
            text: text.to_string(),
            hash: String::new(),
            embedding: Vec::new(),
        }
    }

    fn turn(speaker: Speaker, text: &str) -> ConversationTurn {
        ConversationTurn::new(speaker, text, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn campaign_line_renders_fields_and_url() {
        let line = campaign_line(&campaign_ctx(5));
        assert!(line.starts_with("#5: Campaign 5"));
        assert!(line.contains("topics: [\"environment\"]"));
        assert!(line.contains("tools: [\"petition\"]"));
        assert!(!line.contains("subtopics:"));
        assert!(line.contains("startDate: 2025-03-01"));
        assert!(line.contains("isOngoing: true"));
        assert!(line.contains("url: https://example.org/campaigns/5"));
        assert!(line.contains("\n  - Short description"));
    }

    #[test]
    fn long_description_is_capped_with_ellipsis() {
        let mut ctx = campaign_ctx(1);
        ctx.summary.description = "x".repeat(400);
        let line = campaign_line(&ctx);
        let desc = line.split("\n  - ").nth(1).unwrap();
        assert_eq!(desc.chars().count(), 221);
        assert!(desc.ends_with('…'));
    }

    #[test]
    fn empty_campaign_context_renders_marker() {
        assert_eq!(render_campaign_context(&[]), "No approved campaigns found.");
    }

    #[test]
    fn knowledge_chunks_carry_provenance_tags() {
        let rendered = render_knowledge_context(&[chunk("alpha"), chunk("beta")]);
        assert!(rendered.starts_with("[handbook.pdf – page 7]\nalpha"));
        assert!(rendered.contains("\n\n[handbook.pdf – page 7]\nbeta"));
    }

    #[test]
    fn assemble_orders_blocks_and_caps_history() {
        let history: Vec<ConversationTurn> = (0..15)
            .map(|i| {
                turn(
                    if i % 2 == 0 { Speaker::User } else { Speaker::Assistant },
                    &format!("turn {}", i),
                )
            })
            .collect();

        let messages = assemble(
            &SessionMeta::default(),
            &[campaign_ctx(7)],
            &[chunk("facts")],
            &history,
            true,
            "what next?",
            10,
        );

        // persona + campaigns + knowledge + hint + 10 history + user turn
        assert_eq!(messages.len(), 15);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("Approved campaigns context"));
        assert!(messages[2].content.contains("Knowledge base context"));
        assert!(messages[3].content.contains("off-topic"));
        assert_eq!(messages[4].content, "turn 5");
        assert_eq!(messages[13].content, "turn 14");
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "what next?");
    }

    #[test]
    fn optional_blocks_are_omitted_when_empty() {
        let messages = assemble(
            &SessionMeta::default(),
            &[],
            &[],
            &[],
            false,
            "hello",
            10,
        );

        assert_eq!(messages.len(), 3);
        assert!(messages[1].content.contains("No approved campaigns found."));
        assert!(!messages.iter().any(|m| m.content.contains("Knowledge base context")));
        assert!(!messages.iter().any(|m| m.content.contains("off-topic")));
    }

    #[test]
    fn mentor_persona_switches_voice() {
        let session = SessionMeta {
            mentor_name: Some("Vera".to_string()),
            topic_name: Some("climate".to_string()),
            tool_name: None,
            sub_tool_name: None,
        };
        let block = persona_block(&session);
        assert!(block.contains("\"Vera\""));
        assert!(block.contains("Topic selected: climate"));
        assert!(block.contains("skipped"));
    }
}
