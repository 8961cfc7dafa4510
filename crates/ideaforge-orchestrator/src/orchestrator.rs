//! The discussion state machine.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use ideaforge_agent::{create_team, Agent, AgentResponse, LlmClient};
use ideaforge_models::{
    AgentRole, Discussion, DiscussionId, IdeaId, Message, MessageKind, Participant, TeamConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{OrchestratorError, Result};
use crate::events::{DiscussionEvent, EventBus, ProgressCallback, SUMMARY_CHARS};
use crate::handle::DiscussionHandle;
use crate::phase::{DiscussionPhase, PhaseTracker};

const VALIDATION_INSTRUCTION: &str =
    "Provide final scores and comprehensive evaluation of all ideas discussed";

const SELECTION_INSTRUCTION: &str = "Based on all the discussion, evaluation, and team input, \
select the best idea and explain your decision";

const REPORT_REQUEST: &str = "Create the final idea sheet";

const REPORT_INSTRUCTION: &str = "Generate a comprehensive strategic report. Focus on an \
executive summary with the final recommendation, detailed analysis of the top ideas, specific \
reasons the runner-ups were not selected, the circumstances that might favour each alternative, \
open questions for further exploration, and actionable next steps.";

/// Drives one discussion from kickoff to report.
///
/// Agents run strictly one at a time in a fixed order, each seeing the
/// transcript as left by the previous one. The discussion lives behind a
/// [`DiscussionHandle`] so other tasks can poll it while this one runs.
///
/// # Example
///
/// ```ignore
/// let client = create_client(&BackendConfig::from_env(None)?)?;
/// let mut orchestrator = Orchestrator::new(client, TeamConfig::standard())?;
/// let events = orchestrator.subscribe();
/// orchestrator.start_discussion("reduce plastic waste").await?;
/// println!("{}", orchestrator.handle().report_artifact().await);
/// ```
pub struct Orchestrator {
    config: TeamConfig,
    agents: HashMap<AgentRole, Box<dyn Agent>>,
    handle: DiscussionHandle,
    events: EventBus,
    cancel: CancellationToken,
    phases: PhaseTracker,
}

impl Orchestrator {
    /// Build the team described by `config` on top of `client`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`OrchestratorError::Configuration`] when the team
    /// configuration does not validate.
    pub fn new(client: Arc<dyn LlmClient>, config: TeamConfig) -> Result<Self> {
        config.validate()?;
        let agents = create_team(&config, client);
        Self::with_agents(config, agents)
    }

    /// Use pre-built agents. Agents whose role the configuration excludes
    /// are dropped; an included role without an agent is an error.
    pub fn with_agents(config: TeamConfig, agents: Vec<Box<dyn Agent>>) -> Result<Self> {
        config.validate()?;

        let agents: HashMap<AgentRole, Box<dyn Agent>> = agents
            .into_iter()
            .filter(|agent| config.includes(agent.role()))
            .map(|agent| (agent.role(), agent))
            .collect();

        if let Some(missing) = config
            .active_roles()
            .into_iter()
            .find(|role| !agents.contains_key(role))
        {
            return Err(OrchestratorError::MissingAgent(missing));
        }

        info!(
            team_size = agents.len(),
            max_rounds = config.max_rounds,
            "Orchestrator initialized"
        );

        Ok(Self {
            config,
            agents,
            handle: DiscussionHandle::new(),
            events: EventBus::new(),
            cancel: CancellationToken::new(),
            phases: PhaseTracker::new(),
        })
    }

    /// Route progress lines to `callback` instead of the log.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.events.set_callback(callback);
        self
    }

    /// Abort the discussion when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Receive typed progress events.
    pub fn subscribe(&self) -> Receiver<DiscussionEvent> {
        self.events.subscribe()
    }

    /// Read access to the discussion, usable from other tasks.
    pub fn handle(&self) -> DiscussionHandle {
        self.handle.clone()
    }

    /// Token that cancels this discussion.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    pub fn phase(&self) -> DiscussionPhase {
        self.phases.current()
    }

    /// Create the discussion for `topic` without running it.
    pub async fn prepare(&mut self, topic: &str) -> Result<DiscussionId> {
        let discussion = Discussion::new(topic, self.config.max_rounds)?;
        let id = discussion.id.clone();
        let topic = discussion.topic.clone();

        {
            let mut state = self.handle.write().await;
            if state.discussion.is_some() {
                return Err(OrchestratorError::State(
                    "a discussion has already been started on this orchestrator".into(),
                ));
            }
            state.discussion = Some(discussion);
        }

        info!(discussion_id = %id, topic = %topic, "Discussion prepared");
        self.events.emit(DiscussionEvent::DiscussionStarted {
            discussion_id: id.clone(),
            topic,
            team_size: self.config.team_size(),
            max_rounds: self.config.max_rounds,
            deep_dive: self.config.deep_dive,
        });

        Ok(id)
    }

    /// Prepare and run a discussion on `topic`.
    pub async fn start_discussion(&mut self, topic: &str) -> Result<DiscussionId> {
        let id = self.prepare(topic).await?;
        self.run().await?;
        Ok(id)
    }

    /// Run the prepared discussion to completion.
    ///
    /// On a fatal error the discussion is marked failed, its end time stays
    /// unset, and the error is returned. Partial results remain readable
    /// through the handle.
    pub async fn run(&mut self) -> Result<()> {
        if self.handle.snapshot().await.is_none() {
            return Err(OrchestratorError::State("no discussion has been prepared".into()));
        }
        if self.phases.current() != DiscussionPhase::Idle {
            return Err(OrchestratorError::State(format!(
                "discussion already ran (phase: {})",
                self.phases.current()
            )));
        }

        match self.drive().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<()> {
        self.run_kickoff().await?;

        for round in 1..=self.config.max_rounds {
            self.run_round(round).await?;
            self.run_synthesis(round).await?;
        }

        self.run_final_validation().await?;
        self.run_final_selection().await?;
        self.run_visualization().await?;

        self.enter(DiscussionPhase::Completed).await?;
        let (id, ideas) = self
            .update(|d| {
                d.complete();
                (d.id.clone(), d.ideas().len())
            })
            .await?;

        info!(discussion_id = %id, ideas, "Discussion completed");
        self.events.emit(DiscussionEvent::DiscussionCompleted {
            discussion_id: id,
            ideas,
        });
        Ok(())
    }

    async fn run_kickoff(&mut self) -> Result<()> {
        self.enter(DiscussionPhase::Kickoff).await?;

        let topic = self.update(|d| d.topic.clone()).await?;
        let members: Vec<&str> = self
            .config
            .active_roles()
            .into_iter()
            .filter(|role| !matches!(role, AgentRole::TeamLeader | AgentRole::ReportWriter))
            .map(|role| role.display_name())
            .collect();
        let instruction = format!(
            "We have a team of {} agents to explore: {}\n\nTeam members: {}\n\n\
             Please set the direction for this discussion. What should each team member focus on?",
            self.config.team_size(),
            topic,
            members.join(", ")
        );

        let response = self.invoke(AgentRole::TeamLeader, &instruction).await?;
        self.record(response, Participant::Team, MessageKind::Kickoff)
            .await
    }

    async fn run_round(&mut self, round: u32) -> Result<()> {
        self.enter(DiscussionPhase::Round(round)).await?;
        self.update(|d| d.begin_round(round)).await?;
        self.events.emit(DiscussionEvent::RoundStarted {
            round,
            max_rounds: self.config.max_rounds,
        });

        for role in AgentRole::ROUND_ORDER {
            if !self.agents.contains_key(&role) {
                continue;
            }
            if matches!(role, AgentRole::Critic | AgentRole::Implementer)
                && self.update(|d| d.ideas().is_empty()).await?
            {
                debug!(role = %role, round, "No ideas to analyse, skipping");
                continue;
            }

            let instruction = contribution_instruction(role, round);
            match self.invoke(role, instruction).await {
                Ok(response) => self.merge_contribution(response).await?,
                Err(OrchestratorError::Agent(err)) => {
                    warn!(role = %role, round, error = %err, "Contribution failed, continuing");
                    self.events.emit(DiscussionEvent::AgentFailed {
                        role,
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    async fn merge_contribution(&mut self, response: AgentResponse) -> Result<()> {
        let role = response.role;
        let summary = response.summary(SUMMARY_CHARS);
        let ideas = response.ideas;
        let content = response.content;

        let added = self
            .update(|d| {
                let added: Vec<_> = ideas.into_iter().map(|idea| d.add_idea(idea).clone()).collect();
                d.push_message(Message::new(
                    role,
                    Participant::Team,
                    content,
                    MessageKind::Contribution(role),
                ));
                added
            })
            .await?;

        debug!(role = %role, ideas = added.len(), "Contribution merged");
        for idea in added {
            self.events.emit(DiscussionEvent::IdeaAdded { idea });
        }
        self.events
            .emit(DiscussionEvent::AgentContributed { role, summary });
        Ok(())
    }

    async fn run_synthesis(&mut self, round: u32) -> Result<()> {
        let instruction = format!(
            "Synthesize the contributions from round {}.\n\n\
             What are the key insights? What should the team focus on in the next round?\n\
             If this is the final round, identify which ideas are strongest.",
            round
        );

        let response = self.invoke(AgentRole::TeamLeader, &instruction).await?;
        self.record(response, Participant::Team, MessageKind::Synthesis)
            .await
    }

    async fn run_final_validation(&mut self) -> Result<()> {
        self.enter(DiscussionPhase::FinalValidation).await?;

        if !self.agents.contains_key(&AgentRole::Moderator) {
            debug!("No moderator configured, ideas stay unvalidated");
            return Ok(());
        }
        if self.update(|d| d.ideas().is_empty()).await? {
            return Err(OrchestratorError::NoIdeasToValidate);
        }

        let response = self
            .invoke(AgentRole::Moderator, VALIDATION_INSTRUCTION)
            .await?;
        let evaluations = response.evaluations.clone();

        let scored = self
            .update(|d| {
                let applied = d.apply_evaluations(&evaluations);
                let echoed_ids = evaluations
                    .iter()
                    .filter(|e| IdeaId::is_minted(e.idea_id.trim()))
                    .count();
                debug!(
                    evaluations = evaluations.len(),
                    echoed_ids,
                    applied,
                    "Evaluations applied"
                );
                d.ideas()
                    .iter()
                    .filter(|idea| idea.is_validated())
                    .map(|idea| DiscussionEvent::IdeaScored {
                        idea_id: idea.id.clone(),
                        title: idea.title.clone(),
                        score: idea.score(),
                    })
                    .collect::<Vec<_>>()
            })
            .await?;

        self.record(response, Participant::Team, MessageKind::Validation)
            .await?;
        for event in scored {
            self.events.emit(event);
        }
        Ok(())
    }

    async fn run_final_selection(&mut self) -> Result<()> {
        self.enter(DiscussionPhase::FinalSelection).await?;

        let response = self
            .invoke(AgentRole::TeamLeader, SELECTION_INSTRUCTION)
            .await?;
        let narration = response.content.clone();
        self.update(|d| d.summary = Some(narration)).await?;
        self.record(response, Participant::Team, MessageKind::Selection)
            .await?;

        let selected = self
            .update(|d| {
                d.select_final_idea()
                    .map(|idea| (idea.id.clone(), idea.title.clone(), idea.score()))
            })
            .await?;

        match selected {
            Some((idea_id, title, score)) => {
                info!(idea = %title, score, "Final idea selected");
                self.events.emit(DiscussionEvent::FinalIdeaSelected {
                    idea_id,
                    title,
                    score,
                });
            }
            None => debug!("No ideas to select from"),
        }
        Ok(())
    }

    async fn run_visualization(&mut self) -> Result<()> {
        self.enter(DiscussionPhase::Visualization).await?;

        if !self.agents.contains_key(&AgentRole::ReportWriter) {
            debug!("No report writer configured, skipping report");
            return Ok(());
        }

        let response = self
            .invoke(AgentRole::ReportWriter, REPORT_INSTRUCTION)
            .await?;

        self.update(|d| {
            d.push_message(Message::new(
                AgentRole::TeamLeader,
                AgentRole::ReportWriter,
                REPORT_REQUEST,
                MessageKind::Request,
            ));
        })
        .await?;
        self.record(response, Participant::Team, MessageKind::Visualization)
            .await
    }

    /// Announce and call `role`'s agent on a snapshot of the discussion,
    /// racing the cancellation token. The lock is not held while the agent
    /// runs.
    async fn invoke(&self, role: AgentRole, instruction: &str) -> Result<AgentResponse> {
        let agent = self
            .agents
            .get(&role)
            .ok_or(OrchestratorError::MissingAgent(role))?;
        let snapshot = self
            .handle
            .snapshot()
            .await
            .ok_or_else(|| OrchestratorError::State("no discussion has been prepared".into()))?;

        debug!(role = %role, "Invoking agent");
        self.events.emit(DiscussionEvent::AgentContributing { role });
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OrchestratorError::Cancelled),
            response = agent.process(&snapshot, instruction) => Ok(response?),
        }
    }

    /// Append `response` as a message from its role.
    async fn record(
        &self,
        response: AgentResponse,
        to: Participant,
        kind: MessageKind,
    ) -> Result<()> {
        let role = response.role;
        let summary = response.summary(SUMMARY_CHARS);
        let content = response.content;

        self.update(|d| {
            d.push_message(Message::new(role, to, content, kind));
        })
        .await?;
        self.events
            .emit(DiscussionEvent::AgentContributed { role, summary });
        Ok(())
    }

    /// Run `f` on the discussion under the write lock.
    async fn update<T>(&self, f: impl FnOnce(&mut Discussion) -> T) -> Result<T> {
        let mut state = self.handle.write().await;
        let discussion = state
            .discussion
            .as_mut()
            .ok_or_else(|| OrchestratorError::State("no discussion has been prepared".into()))?;
        Ok(f(discussion))
    }

    async fn enter(&mut self, phase: DiscussionPhase) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }
        self.phases.advance(phase)?;
        self.handle.write().await.phase = phase;
        debug!(phase = %phase, "Entering phase");
        self.events.emit(DiscussionEvent::PhaseStarted { phase });
        Ok(())
    }

    async fn fail(&mut self, err: &OrchestratorError) {
        warn!(phase = %self.phases.current(), error = %err, "Discussion failed");
        if self.phases.advance(DiscussionPhase::Failed).is_err() {
            return;
        }

        let discussion_id = {
            let mut state = self.handle.write().await;
            state.phase = DiscussionPhase::Failed;
            state.error = Some(err.to_string());
            state.discussion.as_mut().map(|d| {
                d.fail();
                d.id.clone()
            })
        };

        if let Some(discussion_id) = discussion_id {
            self.events.emit(DiscussionEvent::DiscussionFailed {
                discussion_id,
                error: err.to_string(),
            });
        }
    }
}

fn contribution_instruction(role: AgentRole, round: u32) -> &'static str {
    match role {
        AgentRole::Researcher => "Provide research and context for this topic",
        AgentRole::Ideation if round > 1 => {
            "Building on previous ideas and feedback, generate refined or new creative ideas"
        }
        AgentRole::Ideation => "Generate creative ideas based on the discussion so far",
        AgentRole::Critic => "Challenge the assumptions in these ideas. What could go wrong?",
        AgentRole::Implementer => {
            "How would we actually implement these ideas? What's the practical approach?"
        }
        _ => "Contribute your perspective on the discussion so far",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_instructions() {
        assert!(contribution_instruction(AgentRole::Ideation, 1).starts_with("Generate"));
        assert!(contribution_instruction(AgentRole::Ideation, 2).starts_with("Building"));
        assert!(contribution_instruction(AgentRole::Critic, 1).contains("go wrong"));
    }
}
