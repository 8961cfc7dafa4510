//! Plain-text discussion summary.

use ideaforge_models::{Discussion, TeamConfig};

/// Summary printed after a run: counts, validated ideas reaching the team's
/// score threshold, then the final idea with its pros and cons when one was
/// selected.
pub fn summary(discussion: &Discussion, config: &TeamConfig) -> String {
    let mut out = String::from("\nDiscussion Summary:\n");
    out.push_str(&format!("   Topic: {}\n", discussion.topic));
    out.push_str(&format!("   Status: {}\n", discussion.status));
    out.push_str(&format!("   Team Size: {} agents\n", config.team_size()));
    out.push_str(&format!("   Rounds: {}/{}\n", discussion.round, discussion.max_rounds));
    out.push_str(&format!("   Ideas Generated: {}\n", discussion.ideas().len()));
    out.push_str(&format!("   Messages Exchanged: {}\n", discussion.messages().len()));

    let strong = discussion.ideas_meeting(config.min_score_threshold);
    if !strong.is_empty() {
        out.push_str(&format!(
            "\nStrong Candidates (score >= {:.1}):\n",
            config.min_score_threshold
        ));
        for idea in strong {
            out.push_str(&format!("   {} ({:.1}/10)\n", idea.title, idea.score()));
        }
    }

    if let Some(idea) = discussion.final_idea() {
        out.push_str("\nFinal Selected Idea:\n");
        out.push_str(&format!("   Title: {}\n", idea.title));
        out.push_str(&format!("   Score: {:.1}/10\n", idea.score()));
        out.push_str(&format!("   Description: {}\n", idea.description));

        if !idea.pros().is_empty() {
            out.push_str("\n   Pros:\n");
            for pro in idea.pros() {
                out.push_str(&format!("      + {}\n", pro));
            }
        }
        if !idea.cons().is_empty() {
            out.push_str("\n   Cons:\n");
            for con in idea.cons() {
                out.push_str(&format!("      - {}\n", con));
            }
        }
    }

    out
}
