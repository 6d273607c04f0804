//! Pipeline Orchestrator: one user-triggered run from uploaded file to stored record.
//!
//! Flow: preconditions → upload file → analyze → match jobs → save record → complete.
//!
//! The run is a saga over three independent systems (object storage, AI provider,
//! job search + database) with a no-rollback policy: the first fatal stage error
//! aborts the run and nothing already written is undone. Job matching is
//! best-effort and can never fail the run.

pub mod handlers;
pub mod progress;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::encoder::UploadedFile;
use crate::config::Capabilities;
use crate::matching::JobMatcher;
use crate::models::resume::NewResumeRecord;
use crate::pipeline::progress::{RunTracker, Stage};
use crate::storage::ResumeStore;

const UPLOAD_FAILED: &str = "Failed to upload your resume file.";
const SAVE_FAILED: &str = "Failed to save results.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("AI features are disabled. Please configure your Google Gemini API key.")]
    AiDisabled,

    #[error("Please sign in to analyze your resume.")]
    Unauthenticated,

    #[error("Please select a file to analyze.")]
    NoFile,

    /// A stage failed after the run started. `message` is user-facing.
    #[error("{message}")]
    StageFailed { stage: Stage, message: String },
}

impl PipelineError {
    /// Stage the run was in when it failed; `None` for precondition failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    fn at(stage: Stage, message: impl Into<String>) -> Self {
        PipelineError::StageFailed {
            stage,
            message: message.into(),
        }
    }
}

/// Sequences encoder/analyzer, matcher and store into one run.
pub struct Pipeline {
    capabilities: Capabilities,
    analyzer: Arc<dyn ResumeAnalyzer>,
    matcher: Arc<dyn JobMatcher>,
    store: Arc<dyn ResumeStore>,
}

impl Pipeline {
    pub fn new(
        capabilities: Capabilities,
        analyzer: Arc<dyn ResumeAnalyzer>,
        matcher: Arc<dyn JobMatcher>,
        store: Arc<dyn ResumeStore>,
    ) -> Self {
        Self {
            capabilities,
            analyzer,
            matcher,
            store,
        }
    }

    /// First two preconditions of a run: AI configured, then a signed-in user.
    /// Callers that must not touch any run state on failure check this first.
    pub fn authorize(&self, user_id: Option<Uuid>) -> Result<Uuid, PipelineError> {
        if !self.capabilities.ai {
            return Err(PipelineError::AiDisabled);
        }
        user_id.ok_or(PipelineError::Unauthenticated)
    }

    /// Runs the whole pipeline and returns the id of the stored record.
    ///
    /// Precondition failures return before the tracker is touched. Concurrent runs
    /// for the same trigger are not prevented here; the caller disables the trigger.
    pub async fn run(
        &self,
        user_id: Option<Uuid>,
        file: Option<UploadedFile>,
        tracker: &RunTracker,
    ) -> Result<Uuid, PipelineError> {
        let user_id = self.authorize(user_id)?;
        let file = file.ok_or(PipelineError::NoFile)?;

        tracker.start();
        match self.execute(user_id, &file, tracker).await {
            Ok(resume_id) => {
                tracker.advance(Stage::Complete);
                tracker.succeed(resume_id);
                info!("Pipeline complete: resume {resume_id} for user {user_id}");
                Ok(resume_id)
            }
            Err(e) => {
                error!(stage = ?e.stage(), "Pipeline failed for user {user_id}: {e}");
                tracker.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        user_id: Uuid,
        file: &UploadedFile,
        tracker: &RunTracker,
    ) -> Result<Uuid, PipelineError> {
        // Stage 1: Upload original file
        tracker.advance(Stage::Uploading);
        let file_url = match self.store.upload_file(user_id, file).await {
            Ok(url) if !url.trim().is_empty() => url,
            Ok(_) => return Err(PipelineError::at(Stage::Uploading, UPLOAD_FAILED)),
            Err(e) => {
                error!("Resume upload failed: {e}");
                return Err(PipelineError::at(Stage::Uploading, UPLOAD_FAILED));
            }
        };

        // Stage 2: AI analysis
        tracker.advance(Stage::Analyzing);
        let analysis = self
            .analyzer
            .analyze(file)
            .await
            .map_err(|e| PipelineError::at(Stage::Analyzing, e.to_string()))?;

        // Stage 3: Job matching (best-effort, may be empty)
        tracker.advance(Stage::Matching);
        let matched_jobs = self.matcher.find_matching_jobs(&analysis.job_titles).await;
        info!("Matched {} jobs for user {user_id}", matched_jobs.len());

        // Stage 4: Persist the composite record
        tracker.advance(Stage::Saving);
        let record = NewResumeRecord::new(user_id, &file.name, file_url, analysis, matched_jobs);
        self.store.save_record(&record).await.map_err(|e| {
            let message = e.to_string();
            if message.trim().is_empty() {
                PipelineError::at(Stage::Saving, SAVE_FAILED)
            } else {
                PipelineError::at(Stage::Saving, message)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::analysis::analyzer::AnalyzeError;
    use crate::pipeline::progress::{Progress, RunSnapshot, RunState};
    use crate::test_support::{
        sample_analysis, sample_file, sample_job, FakeAnalyzer, FakeMatcher, MemoryStore,
    };

    const ALL_ON: Capabilities = Capabilities {
        ai: true,
        job_search: true,
        backend: true,
    };

    struct Harness {
        analyzer: Arc<FakeAnalyzer>,
        matcher: Arc<FakeMatcher>,
        store: Arc<MemoryStore>,
        pipeline: Pipeline,
    }

    fn harness(
        capabilities: Capabilities,
        analysis: Result<crate::models::analysis::Analysis, AnalyzeError>,
        jobs: Vec<crate::models::job::Job>,
        store: MemoryStore,
    ) -> Harness {
        let analyzer = Arc::new(FakeAnalyzer::returning(analysis));
        let matcher = Arc::new(FakeMatcher::returning(jobs));
        let store = Arc::new(store);
        let pipeline = Pipeline::new(
            capabilities,
            analyzer.clone(),
            matcher.clone(),
            store.clone(),
        );
        Harness {
            analyzer,
            matcher,
            store,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_successful_run_persists_once_with_matched_jobs() {
        let h = harness(
            ALL_ON,
            Ok(sample_analysis()),
            vec![sample_job("Backend Engineer"), sample_job("SRE")],
            MemoryStore::default(),
        );
        let tracker = RunTracker::new();
        let user = Uuid::new_v4();

        let resume_id = h
            .pipeline
            .run(Some(user), Some(sample_file()), &tracker)
            .await
            .unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, RunState::Succeeded { resume_id });
        assert_eq!(snapshot.progress, Progress::at(Stage::Complete));
        assert_eq!(snapshot.progress.percentage, 100);

        let saved = h.store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let (saved_id, record) = &saved[0];
        assert_eq!(*saved_id, resume_id);
        assert_eq!(record.user_id, user);
        assert_eq!(record.filename, "jane_doe.pdf");
        assert_eq!(record.file_url, format!("memory://resumes/{user}/jane_doe.pdf"));
        assert_eq!(record.matched_jobs.len(), 2);
        assert_eq!(record.matched_jobs[1].title, "SRE");
        assert_eq!(record.feedback.len(), 3);
        assert_eq!(record.feedback[0].suggestion, "Quantify your achievements");

        let seen = h.matcher.seen_titles.lock().unwrap();
        assert_eq!(seen.as_slice(), &[sample_analysis().job_titles]);
    }

    #[tokio::test]
    async fn test_save_failure_fails_run_and_resets_progress() {
        let h = harness(
            ALL_ON,
            Ok(sample_analysis()),
            vec![sample_job("Backend Engineer")],
            MemoryStore {
                fail_save: true,
                ..Default::default()
            },
        );
        let tracker = RunTracker::new();

        let err = h
            .pipeline
            .run(Some(Uuid::new_v4()), Some(sample_file()), &tracker)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Saving));
        let snapshot = tracker.snapshot();
        assert_eq!(
            snapshot.state,
            RunState::Failed {
                error: "new row violates row-level security policy".to_string()
            }
        );
        assert_eq!(snapshot.progress, Progress::default());
        // The uploaded file is not cleaned up.
        assert_eq!(h.store.uploads.lock().unwrap().len(), 1);
        assert!(h.store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_failure_stops_before_matching_and_saving() {
        let h = harness(
            ALL_ON,
            Err(AnalyzeError::Provider("quota exceeded".to_string())),
            vec![sample_job("Backend Engineer")],
            MemoryStore::default(),
        );
        let tracker = RunTracker::new();

        let err = h
            .pipeline
            .run(Some(Uuid::new_v4()), Some(sample_file()), &tracker)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "quota exceeded");
        assert!(h.matcher.seen_titles.lock().unwrap().is_empty());
        assert!(h.store.saved.lock().unwrap().is_empty());
        assert_eq!(
            tracker.snapshot().state,
            RunState::Failed {
                error: "quota exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_failure_uses_fixed_message_and_skips_analysis() {
        let h = harness(
            ALL_ON,
            Ok(sample_analysis()),
            vec![],
            MemoryStore {
                fail_upload: true,
                ..Default::default()
            },
        );
        let tracker = RunTracker::new();

        let err = h
            .pipeline
            .run(Some(Uuid::new_v4()), Some(sample_file()), &tracker)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to upload your resume file.");
        assert_eq!(h.analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_match_list_still_saves() {
        let h = harness(ALL_ON, Ok(sample_analysis()), vec![], MemoryStore::default());
        let tracker = RunTracker::new();

        h.pipeline
            .run(Some(Uuid::new_v4()), Some(sample_file()), &tracker)
            .await
            .unwrap();

        let saved = h.store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].1.matched_jobs.is_empty());
    }

    #[tokio::test]
    async fn test_preconditions_short_circuit_without_touching_tracker() {
        let disabled = Capabilities {
            ai: false,
            ..ALL_ON
        };
        let cases = [
            (disabled, Some(Uuid::new_v4()), Some(sample_file())),
            (ALL_ON, None, Some(sample_file())),
            (ALL_ON, Some(Uuid::new_v4()), None),
        ];

        for (capabilities, user, file) in cases {
            let h = harness(
                capabilities,
                Ok(sample_analysis()),
                vec![],
                MemoryStore::default(),
            );
            let tracker = RunTracker::new();
            let result = h.pipeline.run(user, file, &tracker).await;

            assert!(result.is_err());
            assert_eq!(tracker.snapshot(), RunSnapshot::default());
            assert_eq!(h.analyzer.calls.load(Ordering::SeqCst), 0);
            assert!(h.store.uploads.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_precondition_order() {
        let h = harness(
            Capabilities {
                ai: false,
                ..ALL_ON
            },
            Ok(sample_analysis()),
            vec![],
            MemoryStore::default(),
        );
        let err = h.pipeline.run(None, None, &RunTracker::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::AiDisabled));

        let h = harness(ALL_ON, Ok(sample_analysis()), vec![], MemoryStore::default());
        let err = h.pipeline.run(None, None, &RunTracker::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Unauthenticated));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_authorize_checks_ai_before_user() {
        let h = harness(
            Capabilities {
                ai: false,
                ..ALL_ON
            },
            Ok(sample_analysis()),
            vec![],
            MemoryStore::default(),
        );
        assert!(matches!(h.pipeline.authorize(None), Err(PipelineError::AiDisabled)));

        let h = harness(ALL_ON, Ok(sample_analysis()), vec![], MemoryStore::default());
        assert!(matches!(
            h.pipeline.authorize(None),
            Err(PipelineError::Unauthenticated)
        ));
        let user = Uuid::new_v4();
        assert_eq!(h.pipeline.authorize(Some(user)).unwrap(), user);
    }
}
