use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// An employer-owned job posting. Only the fields the timesheet flow needs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// The freelancer ↔ job relationship that scopes all timesheet data.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"SELECT id, employer_id, title, created_at
               FROM jobs
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        employer_id: Uuid,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"INSERT INTO jobs (id, employer_id, title)
               VALUES ($1, $2, $3)
               RETURNING id, employer_id, title, created_at"#,
        )
        .bind(id)
        .bind(employer_id)
        .bind(title)
        .fetch_one(pool)
        .await
    }
}

impl JobApplication {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"SELECT id, job_id, freelancer_id, created_at
               FROM job_applications
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"INSERT INTO job_applications (id, job_id, freelancer_id)
               VALUES ($1, $2, $3)
               RETURNING id, job_id, freelancer_id, created_at"#,
        )
        .bind(id)
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_one(pool)
        .await
    }
}
