//! Shared read access to a running discussion.

use std::sync::Arc;

use ideaforge_models::{Discussion, DiscussionId, DiscussionStatus};
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::phase::DiscussionPhase;

#[derive(Debug)]
pub(crate) struct SharedState {
    pub(crate) discussion: Option<Discussion>,
    pub(crate) phase: DiscussionPhase,
    pub(crate) error: Option<String>,
}

/// Cloneable, lock-guarded view of one discussion.
///
/// The orchestrator writes through its own clone between agent calls;
/// readers only ever see whole updates.
#[derive(Debug, Clone)]
pub struct DiscussionHandle {
    inner: Arc<RwLock<SharedState>>,
}

impl Default for DiscussionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SharedState {
                discussion: None,
                phase: DiscussionPhase::Idle,
                error: None,
            })),
        }
    }

    /// Copy of the discussion, or `None` before it has been created.
    pub async fn snapshot(&self) -> Option<Discussion> {
        self.inner.read().await.discussion.clone()
    }

    pub async fn id(&self) -> Option<DiscussionId> {
        self.inner
            .read()
            .await
            .discussion
            .as_ref()
            .map(|d| d.id.clone())
    }

    pub async fn status(&self) -> Option<DiscussionStatus> {
        self.inner.read().await.discussion.as_ref().map(|d| d.status)
    }

    pub async fn phase(&self) -> DiscussionPhase {
        self.inner.read().await.phase
    }

    /// Message of the error that ended the discussion, if it failed.
    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    /// The report artifact, or an empty string when none was produced.
    pub async fn report_artifact(&self) -> String {
        self.inner
            .read()
            .await
            .discussion
            .as_ref()
            .map(|d| d.report_artifact().to_string())
            .unwrap_or_default()
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SharedState> {
        self.inner.write().await
    }
}
