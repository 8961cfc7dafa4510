//! Registry of discussions for hosting layers.
//!
//! A web server or TUI that runs several discussions at once owns one
//! [`SessionStore`]; each orchestrator stays a single-owner object running
//! on its own task.

use std::collections::HashMap;
use std::sync::Arc;

use ideaforge_models::{DiscussionId, DiscussionStatus};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{OrchestratorError, Result};
use crate::handle::DiscussionHandle;
use crate::orchestrator::Orchestrator;

struct Session {
    handle: DiscussionHandle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Brief description of a stored discussion.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: DiscussionId,
    pub topic: String,
    pub status: DiscussionStatus,
    pub ideas: usize,
}

/// Concurrent map of discussion id to running or finished discussion.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<DiscussionId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare `topic` on `orchestrator` and run it on a background task.
    ///
    /// Preparation errors (such as an empty topic) are returned directly;
    /// run errors are recorded on the discussion and visible through
    /// [`DiscussionHandle::error`].
    pub async fn spawn(&self, mut orchestrator: Orchestrator, topic: &str) -> Result<DiscussionId> {
        let id = orchestrator.prepare(topic).await?;
        let handle = orchestrator.handle();
        let cancel = orchestrator.cancellation_token();

        let task_id = id.clone();
        let task = tokio::spawn(async move {
            if let Err(err) = orchestrator.run().await {
                warn!(discussion_id = %task_id, error = %err, "Background discussion failed");
            }
        });

        info!(discussion_id = %id, "Discussion spawned");
        self.sessions.write().await.insert(
            id.clone(),
            Session {
                handle,
                cancel,
                task: Some(task),
            },
        );
        Ok(id)
    }

    /// Handle for discussion `id`.
    pub async fn get(&self, id: &DiscussionId) -> Option<DiscussionHandle> {
        self.sessions.read().await.get(id).map(|s| s.handle.clone())
    }

    /// Ids of every stored discussion.
    pub async fn ids(&self) -> Vec<DiscussionId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Summaries of every stored discussion.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<DiscussionHandle> = self
            .sessions
            .read()
            .await
            .values()
            .map(|s| s.handle.clone())
            .collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(d) = handle.snapshot().await {
                summaries.push(SessionSummary {
                    id: d.id.clone(),
                    topic: d.topic.clone(),
                    status: d.status,
                    ideas: d.ideas().len(),
                });
            }
        }
        summaries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        summaries
    }

    /// Request cancellation of discussion `id`.
    pub async fn cancel(&self, id: &DiscussionId) -> Result<()> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(id)
            .ok_or_else(|| OrchestratorError::DiscussionNotFound(id.to_string()))?;
        session.cancel.cancel();
        Ok(())
    }

    /// Wait for discussion `id`'s task to finish and return its status.
    pub async fn wait(&self, id: &DiscussionId) -> Result<Option<DiscussionStatus>> {
        let (handle, task) = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(id)
                .ok_or_else(|| OrchestratorError::DiscussionNotFound(id.to_string()))?;
            (session.handle.clone(), session.task.take())
        };

        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(discussion_id = %id, error = %err, "Discussion task did not finish cleanly");
            }
        }
        Ok(handle.status().await)
    }

    /// Drop discussion `id`, cancelling it if still running.
    pub async fn remove(&self, id: &DiscussionId) -> Option<DiscussionHandle> {
        let session = self.sessions.write().await.remove(id)?;
        session.cancel.cancel();
        Some(session.handle)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
