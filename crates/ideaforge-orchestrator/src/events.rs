//! Progress events and their fan-out.
//!
//! Every state change produces one [`DiscussionEvent`]. Typed subscribers get
//! the event itself over a `std::sync::mpsc` channel; the single progress
//! callback gets its one-line rendering. Without a callback the line goes to
//! the log.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};

use ideaforge_models::{AgentRole, DiscussionId, Idea, IdeaId};
use serde::Serialize;
use tracing::info;

use crate::phase::DiscussionPhase;

/// Progress callback receiving human-readable lines.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Longest agent-output excerpt carried in an event.
pub const SUMMARY_CHARS: usize = 150;

/// Something that happened during a discussion.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiscussionEvent {
    DiscussionStarted {
        discussion_id: DiscussionId,
        topic: String,
        team_size: usize,
        max_rounds: u32,
        deep_dive: bool,
    },
    PhaseStarted {
        phase: DiscussionPhase,
    },
    RoundStarted {
        round: u32,
        max_rounds: u32,
    },
    AgentContributing {
        role: AgentRole,
    },
    AgentContributed {
        role: AgentRole,
        summary: String,
    },
    /// A non-fatal agent failure; the discussion carries on.
    AgentFailed {
        role: AgentRole,
        error: String,
    },
    IdeaAdded {
        idea: Idea,
    },
    IdeaScored {
        idea_id: IdeaId,
        title: String,
        score: f64,
    },
    FinalIdeaSelected {
        idea_id: IdeaId,
        title: String,
        score: f64,
    },
    DiscussionCompleted {
        discussion_id: DiscussionId,
        ideas: usize,
    },
    DiscussionFailed {
        discussion_id: DiscussionId,
        error: String,
    },
}

impl fmt::Display for DiscussionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscussionStarted {
                topic,
                team_size,
                max_rounds,
                deep_dive,
                ..
            } => write!(
                f,
                "Starting discussion with {} agents on: {} ({} rounds, deep dive: {})",
                team_size, topic, max_rounds, deep_dive
            ),
            Self::PhaseStarted { phase } => write!(f, "Phase: {}", phase),
            Self::RoundStarted { round, max_rounds } => {
                write!(f, "Round {} of {}", round, max_rounds)
            }
            Self::AgentContributing { role } => {
                write!(f, "  {} contributing...", role.display_name())
            }
            Self::AgentContributed { role, summary } => {
                write!(f, "    {}: {}", role.display_name(), summary)
            }
            Self::AgentFailed { role, error } => {
                write!(f, "    {} skipped: {}", role.display_name(), error)
            }
            Self::IdeaAdded { idea } => write!(f, "    New idea: {}", idea.title),
            Self::IdeaScored { title, score, .. } => {
                write!(f, "  {} - Score: {:.1}/10", title, score)
            }
            Self::FinalIdeaSelected { title, score, .. } => {
                write!(f, "  Final Idea: {} (Score: {:.1}/10)", title, score)
            }
            Self::DiscussionCompleted { ideas, .. } => {
                write!(f, "Discussion completed successfully with {} ideas", ideas)
            }
            Self::DiscussionFailed { error, .. } => write!(f, "Discussion failed: {}", error),
        }
    }
}

/// Fan-out point for discussion events.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Sender<DiscussionEvent>>>>,
    callback: Option<ProgressCallback>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the progress callback.
    pub fn set_callback(&mut self, callback: ProgressCallback) {
        self.callback = Some(callback);
    }

    /// Receive every subsequent event.
    ///
    /// Dropping the receiver unsubscribes on the next emit.
    pub fn subscribe(&self) -> Receiver<DiscussionEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.write() {
            subs.push(tx);
        }
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|subs| subs.len()).unwrap_or(0)
    }

    /// Deliver `event` to subscribers and the progress sink.
    pub fn emit(&self, event: DiscussionEvent) {
        let line = event.to_string();
        match &self.callback {
            Some(callback) => callback(&line),
            None => info!("{}", line),
        }

        if let Ok(mut subs) = self.subscribers.write() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_subscribers_receive_typed_events() {
        let bus = EventBus::new();
        let rx = bus.subscribe();

        bus.emit(DiscussionEvent::RoundStarted {
            round: 1,
            max_rounds: 2,
        });

        match rx.try_recv().unwrap() {
            DiscussionEvent::RoundStarted { round, max_rounds } => {
                assert_eq!((round, max_rounds), (1, 2));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(DiscussionEvent::PhaseStarted {
            phase: DiscussionPhase::Kickoff,
        });

        assert_eq!(bus.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }

    #[test]
    fn test_callback_gets_rendered_line() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let mut bus = EventBus::new();
        bus.set_callback(Arc::new(move |line: &str| {
            sink.lock().unwrap().push(line.to_string())
        }));

        bus.emit(DiscussionEvent::AgentContributing {
            role: AgentRole::Ideation,
        });
        bus.emit(DiscussionEvent::PhaseStarted {
            phase: DiscussionPhase::Round(2),
        });

        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "  Ideation Specialist contributing...".to_string(),
                "Phase: round 2".to_string()
            ]
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = DiscussionEvent::AgentContributed {
            role: AgentRole::Critic,
            summary: "risky".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "agent_contributed");
        assert_eq!(json["role"], "critic");
        assert_eq!(json["summary"], "risky");
    }
}
