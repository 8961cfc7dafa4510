//! Serializing a discussion into prompt context.

use ideaforge_models::{Discussion, Idea};

/// Longest message excerpt included in the detailed context, in characters.
pub const EXCERPT_CHARS: usize = 200;

/// Standard context shared by every agent.
///
/// Topic header, then each prior message as `[from -> to]: content`, then
/// each idea as `N. title - description` with its score once validated.
pub fn build_context(discussion: &Discussion) -> String {
    let mut out = format!("Topic: {}\n\n", discussion.topic);

    if !discussion.messages().is_empty() {
        out.push_str("Previous Discussion:\n");
        for msg in discussion.messages() {
            out.push_str(&format!("[{} -> {}]: {}\n", msg.from, msg.to, msg.content));
        }
        out.push('\n');
    }

    if !discussion.ideas().is_empty() {
        out.push_str("Current Ideas:\n");
        for (i, idea) in discussion.ideas().iter().enumerate() {
            out.push_str(&format!("{}. {} - {}\n", i + 1, idea.title, idea.description));
            if idea.is_validated() {
                out.push_str(&format!("   Score: {:.1}/10\n", idea.score()));
            }
        }
        out.push('\n');
    }

    out
}

/// Rich context for the report writer: message flow, full idea records and
/// the final selection.
pub fn build_detailed_context(discussion: &Discussion) -> String {
    let mut out = String::from("\nDETAILED DISCUSSION CONTEXT:\n\n");

    if discussion.max_rounds > 1 {
        out.push_str(&format!(
            "Discussion Rounds: {} rounds completed\n\n",
            discussion.round
        ));
    }

    out.push_str("Discussion Flow:\n");
    for (i, msg) in discussion.messages().iter().enumerate() {
        out.push_str(&format!(
            "{}. [{} -> {}] ({}): {}\n",
            i + 1,
            msg.from,
            msg.to,
            msg.kind,
            truncate(&msg.content, EXCERPT_CHARS)
        ));
    }
    out.push('\n');

    out.push_str(&format!("Total Ideas Generated: {}\n\n", discussion.ideas().len()));
    out.push_str("Detailed Ideas:\n");
    for (i, idea) in discussion.ideas().iter().enumerate() {
        write_idea_details(&mut out, i + 1, idea);
    }

    if let Some(final_idea) = discussion.final_idea() {
        out.push_str(&format!(
            "\nFinal Selected Idea: {} (Score: {:.1}/10)\n",
            final_idea.title,
            final_idea.score()
        ));
    }

    out
}

fn write_idea_details(out: &mut String, position: usize, idea: &Idea) {
    out.push_str(&format!("\nIdea {}: {}\n", position, idea.title));
    out.push_str(&format!("  Description: {}\n", idea.description));
    out.push_str(&format!("  Category: {}\n", idea.category.as_deref().unwrap_or("")));
    out.push_str(&format!("  Created by: {}\n", idea.created_by));

    if !idea.is_validated() {
        return;
    }
    out.push_str(&format!("  Score: {:.1}/10\n", idea.score()));
    if !idea.pros().is_empty() {
        out.push_str("  Pros:\n");
        for pro in idea.pros() {
            out.push_str(&format!("    + {}\n", pro));
        }
    }
    if !idea.cons().is_empty() {
        out.push_str("  Cons:\n");
        for con in idea.cons() {
            out.push_str(&format!("    - {}\n", con));
        }
    }
}

/// Shorten `s` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_models::{AgentRole, IdeaEvaluation, Message, MessageKind, Participant};

    fn discussion() -> Discussion {
        let mut d = Discussion::new("reduce plastic waste", 2).unwrap();
        d.push_message(Message::new(
            AgentRole::TeamLeader,
            Participant::Team,
            "Let's begin.",
            MessageKind::Kickoff,
        ));
        d.add_idea(Idea::new(
            "Refill stations",
            "Neighbourhood refill points",
            Some("retail".into()),
            AgentRole::Ideation,
        ));
        d.add_idea(Idea::new("Deposit scheme", "Pay back on return", None, AgentRole::Ideation));
        d
    }

    #[test]
    fn test_empty_discussion_has_topic_only() {
        let d = Discussion::new("topic", 1).unwrap();
        assert_eq!(build_context(&d), "Topic: topic\n\n");
    }

    #[test]
    fn test_build_context_format() {
        let mut d = discussion();
        let id = d.ideas()[0].id.to_string();
        d.apply_evaluations(&[IdeaEvaluation {
            idea_id: id,
            score: 7.5,
            ..Default::default()
        }]);

        let expected = "Topic: reduce plastic waste\n\n\
            Previous Discussion:\n\
            [team_leader -> team]: Let's begin.\n\n\
            Current Ideas:\n\
            1. Refill stations - Neighbourhood refill points\n   \
            Score: 7.5/10\n\
            2. Deposit scheme - Pay back on return\n\n";
        assert_eq!(build_context(&d), expected);
    }

    #[test]
    fn test_detailed_context_lists_ideas_and_flow() {
        let mut d = discussion();
        d.begin_round(2);
        let id = d.ideas()[1].id.to_string();
        d.apply_evaluations(&[IdeaEvaluation {
            idea_id: id,
            score: 8.0,
            pros: vec!["simple".into()],
            cons: vec!["logistics".into()],
            ..Default::default()
        }]);
        d.select_final_idea();

        let ctx = build_detailed_context(&d);
        assert!(ctx.contains("Discussion Rounds: 2 rounds completed"));
        assert!(ctx.contains("1. [team_leader -> team] (kickoff): Let's begin."));
        assert!(ctx.contains("Total Ideas Generated: 2"));
        assert!(ctx.contains("  Category: retail"));
        assert!(ctx.contains("    + simple"));
        assert!(ctx.contains("    - logistics"));
        assert!(ctx.contains("Final Selected Idea: Deposit scheme (Score: 8.0/10)"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("héllo wörld", 4), "héll...");
    }
}
