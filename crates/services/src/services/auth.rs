//! Caller resolution and ownership checks shared by the timesheet services.

use db::models::{
    job::{Job, JobApplication},
    user::{User, UserRole},
};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unknown caller")]
    Unauthorized,
    #[error("caller may not access this job application")]
    Forbidden,
    #[error("job application not found")]
    NotFound,
}

/// Resolve the caller or reject with 401 semantics.
pub async fn require_user(pool: &SqlitePool, user_id: Uuid) -> Result<User, AuthError> {
    User::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthError::Unauthorized)
}

pub async fn require_application(
    pool: &SqlitePool,
    job_application_id: Uuid,
) -> Result<JobApplication, AuthError> {
    JobApplication::find_by_id(pool, job_application_id)
        .await?
        .ok_or(AuthError::NotFound)
}

/// The caller must be a freelancer and the applicant on the application.
pub async fn require_applicant(
    pool: &SqlitePool,
    caller_id: Uuid,
    job_application_id: Uuid,
) -> Result<JobApplication, AuthError> {
    let caller = require_user(pool, caller_id).await?;
    if caller.role != UserRole::Freelancer {
        return Err(AuthError::Forbidden);
    }
    let application = require_application(pool, job_application_id).await?;
    if application.freelancer_id != caller.id {
        return Err(AuthError::Forbidden);
    }
    Ok(application)
}

/// The caller must be an employer and own the job the application targets.
pub async fn require_job_owner(
    pool: &SqlitePool,
    caller_id: Uuid,
    job_application_id: Uuid,
) -> Result<JobApplication, AuthError> {
    let caller = require_user(pool, caller_id).await?;
    if caller.role != UserRole::Employer {
        return Err(AuthError::Forbidden);
    }
    let application = require_application(pool, job_application_id).await?;
    let job = Job::find_by_id(pool, application.job_id)
        .await?
        .ok_or(AuthError::NotFound)?;
    if job.employer_id != caller.id {
        return Err(AuthError::Forbidden);
    }
    Ok(application)
}
