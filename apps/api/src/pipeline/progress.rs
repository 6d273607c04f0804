//! Stage progress and run state for a single pipeline run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uploading,
    Analyzing,
    Matching,
    Saving,
    Complete,
}

impl Stage {
    pub fn percentage(self) -> u8 {
        match self {
            Stage::Uploading => 10,
            Stage::Analyzing => 25,
            Stage::Matching => 75,
            Stage::Saving => 90,
            Stage::Complete => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Uploading => "Uploading file securely...",
            Stage::Analyzing => "Analyzing resume...",
            Stage::Matching => "Finding job matches...",
            Stage::Saving => "Saving results...",
            Stage::Complete => "Complete!",
        }
    }
}

/// `{stage, percentage}` as rendered by the progress bar. Empty when idle or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub stage: String,
    pub percentage: u8,
}

impl Progress {
    pub fn at(stage: Stage) -> Self {
        Self {
            stage: stage.label().to_string(),
            percentage: stage.percentage(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Succeeded { resume_id: Uuid },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSnapshot {
    #[serde(flatten)]
    pub state: RunState,
    pub progress: Progress,
}

impl Default for RunSnapshot {
    fn default() -> Self {
        Self {
            state: RunState::Idle,
            progress: Progress::default(),
        }
    }
}

/// Owner of one run's state. Observers follow it through [`RunTracker::subscribe`].
///
/// Transitions: `Idle → Running → {Succeeded, Failed}`. Only the orchestrator drives them.
#[derive(Debug)]
pub struct RunTracker {
    tx: watch::Sender<RunSnapshot>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunSnapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.tx.borrow().clone()
    }

    #[allow(dead_code)] // HTTP clients poll RunRegistry::latest instead
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn start(&self) {
        self.tx.send_modify(|s| s.state = RunState::Running);
    }

    pub(crate) fn advance(&self, stage: Stage) {
        self.tx.send_modify(|s| s.progress = Progress::at(stage));
    }

    pub(crate) fn succeed(&self, resume_id: Uuid) {
        self.tx
            .send_modify(|s| s.state = RunState::Succeeded { resume_id });
    }

    pub(crate) fn fail(&self, error: String) {
        self.tx.send_modify(|s| {
            s.state = RunState::Failed { error };
            s.progress = Progress::default();
        });
    }
}

/// Latest run per user, kept only so the browser can poll progress.
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<Mutex<HashMap<Uuid, Arc<RunTracker>>>>,
}

impl RunRegistry {
    /// Registers a fresh tracker for `user_id`, replacing the previous run's.
    pub fn begin(&self, user_id: Uuid) -> Arc<RunTracker> {
        let tracker = Arc::new(RunTracker::new());
        self.runs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id, tracker.clone());
        tracker
    }

    pub fn latest(&self, user_id: Uuid) -> Option<RunSnapshot> {
        self.runs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
            .map(|t| t.snapshot())
    }
}
