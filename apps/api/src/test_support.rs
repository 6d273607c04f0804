//! Shared fixtures for unit tests: throwaway HTTP servers and in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use crate::analysis::analyzer::{AnalyzeError, ResumeAnalyzer};
use crate::analysis::encoder::{UploadedFile, MEDIA_TYPE_PDF};
use crate::matching::JobMatcher;
use crate::models::analysis::{Analysis, Skill, SkillCategory};
use crate::models::job::Job;
use crate::models::resume::{NewResumeRecord, ResumeRow};
use crate::storage::{PersistenceError, ResumeStore};

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn sample_file() -> UploadedFile {
    UploadedFile::new(&b"%PDF-1.7 resume"[..], MEDIA_TYPE_PDF, "jane_doe.pdf")
}

pub fn sample_analysis() -> Analysis {
    Analysis {
        score: 78.0,
        experience_level: "Mid-Level".to_string(),
        total_experience: 4.0,
        feedback: vec![
            "Quantify your achievements".to_string(),
            "Move skills above education".to_string(),
            "Trim the summary to two lines".to_string(),
        ],
        skills: vec![
            Skill {
                name: "Rust".to_string(),
                category: SkillCategory::Technical,
                confidence: 0.92,
            },
            Skill {
                name: "Communication".to_string(),
                category: SkillCategory::Soft,
                confidence: 0.7,
            },
        ],
        job_titles: vec![
            "Backend Engineer".to_string(),
            "Systems Engineer".to_string(),
            "Platform Engineer".to_string(),
        ],
    }
}

pub fn sample_job(title: &str) -> Job {
    Job {
        title: title.to_string(),
        company: "Acme".to_string(),
        location: "Pune, Maharashtra".to_string(),
        match_percentage: 80,
        apply_url: "https://acme.example/apply".to_string(),
        description: "Build things...".to_string(),
        salary_range: "Not Disclosed".to_string(),
        experience_required: "2 years".to_string(),
        job_type: "Full Time".to_string(),
    }
}

pub struct FakeAnalyzer {
    pub result: Result<Analysis, AnalyzeError>,
    pub calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn returning(result: Result<Analysis, AnalyzeError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _file: &UploadedFile) -> Result<Analysis, AnalyzeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakeMatcher {
    pub jobs: Vec<Job>,
    pub seen_titles: Mutex<Vec<Vec<String>>>,
}

impl FakeMatcher {
    pub fn returning(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            seen_titles: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobMatcher for FakeMatcher {
    async fn find_matching_jobs(&self, job_titles: &[String]) -> Vec<Job> {
        self.seen_titles.lock().unwrap().push(job_titles.to_vec());
        self.jobs.clone()
    }
}

/// In-memory store. Failure switches make either external call fail.
#[derive(Default)]
pub struct MemoryStore {
    pub fail_upload: bool,
    pub fail_save: bool,
    pub uploads: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<(Uuid, NewResumeRecord)>>,
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn upload_file(
        &self,
        user_id: Uuid,
        file: &UploadedFile,
    ) -> Result<String, PersistenceError> {
        if self.fail_upload {
            return Err(PersistenceError::Upload("bucket unreachable".to_string()));
        }
        let url = format!("memory://resumes/{user_id}/{}", file.name);
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn save_record(&self, record: &NewResumeRecord) -> Result<Uuid, PersistenceError> {
        if self.fail_save {
            return Err(PersistenceError::Insert(
                "new row violates row-level security policy".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        self.saved.lock().unwrap().push((id, record.clone()));
        Ok(id)
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<ResumeRow>, PersistenceError> {
        let saved = self.saved.lock().unwrap();
        Ok(saved.iter().find(|(saved_id, _)| *saved_id == id).map(|(id, r)| ResumeRow {
            id: *id,
            user_id: r.user_id,
            filename: r.filename.clone(),
            file_url: r.file_url.clone(),
            score: r.score,
            experience_level: r.experience_level.clone(),
            total_experience: r.total_experience,
            feedback: sqlx::types::Json(r.feedback.clone()),
            skills: sqlx::types::Json(r.skills.clone()),
            matched_jobs: sqlx::types::Json(r.matched_jobs.clone()),
            created_at: chrono::Utc::now(),
        }))
    }
}
