//! Persistence Client: object storage for the original file, PostgreSQL for the record.
//!
//! Upload and insert are two independent external calls. A failed insert leaves the
//! uploaded object behind; orphaned files are accepted and not reconciled.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::analysis::encoder::UploadedFile;
use crate::models::resume::{NewResumeRecord, ResumeRow};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage backend is not configured. Set DATABASE_URL and the S3 variables to enable saving.")]
    NotConfigured,

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Insert(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores the original document and returns a resolvable URL for it.
    async fn upload_file(&self, user_id: Uuid, file: &UploadedFile)
        -> Result<String, PersistenceError>;

    /// Inserts one record and returns its server-generated id.
    async fn save_record(&self, record: &NewResumeRecord) -> Result<Uuid, PersistenceError>;

    async fn fetch_record(&self, id: Uuid) -> Result<Option<ResumeRow>, PersistenceError>;
}

/// S3 (or MinIO) for files, PostgreSQL for records.
pub struct S3PgStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3PgStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, bucket: &str, public_url: &str) -> Self {
        Self {
            pool,
            s3,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ResumeStore for S3PgStore {
    async fn upload_file(
        &self,
        user_id: Uuid,
        file: &UploadedFile,
    ) -> Result<String, PersistenceError> {
        let key = object_key(user_id, Uuid::new_v4(), &file.name);

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.content.clone()))
            .content_type(&file.media_type)
            .send()
            .await
            .map_err(|e| PersistenceError::Upload(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);

        Ok(public_object_url(&self.public_url, &self.bucket, &key))
    }

    async fn save_record(&self, record: &NewResumeRecord) -> Result<Uuid, PersistenceError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO resumes
                (user_id, filename, file_url, score, experience_level, total_experience,
                 feedback, skills, matched_jobs)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(record.user_id)
        .bind(&record.filename)
        .bind(&record.file_url)
        .bind(record.score)
        .bind(&record.experience_level)
        .bind(record.total_experience)
        .bind(Json(&record.feedback))
        .bind(Json(&record.skills))
        .bind(Json(&record.matched_jobs))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError::Insert(e.to_string()))?;

        info!(
            "Saved resume {} with {} matched jobs for user {}",
            id,
            record.matched_jobs.len(),
            record.user_id
        );
        Ok(id)
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<ResumeRow>, PersistenceError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

/// Stand-in used when the backend credentials are missing. Every call fails
/// with [`PersistenceError::NotConfigured`] so the process still starts.
pub struct UnconfiguredStore;

#[async_trait]
impl ResumeStore for UnconfiguredStore {
    async fn upload_file(
        &self,
        _user_id: Uuid,
        _file: &UploadedFile,
    ) -> Result<String, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }

    async fn save_record(&self, _record: &NewResumeRecord) -> Result<Uuid, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }

    async fn fetch_record(&self, _id: Uuid) -> Result<Option<ResumeRow>, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }
}

/// `resumes/<user>/<object id>-<sanitized name>`. The object id keeps re-uploads
/// of the same file name from overwriting each other.
pub fn object_key(user_id: Uuid, object_id: Uuid, filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = if sanitized.trim_matches('_').is_empty() {
        "resume".to_string()
    } else {
        sanitized
    };
    format!("resumes/{user_id}/{object_id}-{sanitized}")
}

pub fn public_object_url(public_base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", public_base.trim_end_matches('/'), bucket, key)
}
