//! Submission aggregation and review: folds a day's entries into an immutable
//! submission and advances submission status on employer decision.

use chrono::NaiveDate;
use db::models::{
    submission::{Submission, SubmissionStatus},
    time_entry::TimeEntry,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::auth::{self, AuthError};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("no entries to submit for this day")]
    NoEntries,
    #[error("this day has already been submitted")]
    AlreadySubmitted,
    #[error("cannot submit a zero-hour day")]
    ZeroHours,
    #[error("invalid review window")]
    InvalidWindow,
}

/// Employer decision over a day window of submissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn target_status(self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approved => SubmissionStatus::Approved,
            ReviewDecision::Rejected => SubmissionStatus::Rejected,
        }
    }
}

pub struct SubmissionService;

impl SubmissionService {
    /// Aggregate one calendar day of the caller's entries into a submission.
    ///
    /// The submission row and its entry links are inserted in a single
    /// transaction, and the unique index on (freelancer, application, date)
    /// backs up the pre-check: a concurrent duplicate loses the race at
    /// insert time and surfaces as `AlreadySubmitted` as well.
    pub async fn submit_day(
        pool: &SqlitePool,
        caller_id: Uuid,
        job_application_id: Uuid,
        date: NaiveDate,
    ) -> Result<Submission, SubmissionError> {
        let application = auth::require_applicant(pool, caller_id, job_application_id).await?;

        let entries =
            TimeEntry::find_for_day(pool, application.freelancer_id, application.id, date).await?;
        if entries.is_empty() {
            return Err(SubmissionError::NoEntries);
        }

        if Submission::find_for_day(pool, application.freelancer_id, application.id, date)
            .await?
            .is_some()
        {
            return Err(SubmissionError::AlreadySubmitted);
        }

        let total_hours: f64 = entries.iter().map(TimeEntry::duration_hours).sum();
        if total_hours <= 0.0 {
            return Err(SubmissionError::ZeroHours);
        }

        let submission = Self::persist_submission(
            pool,
            application.freelancer_id,
            application.id,
            date,
            total_hours,
            &entries,
        )
        .await?;

        info!(
            submission_id = %submission.id,
            job_application_id = %application.id,
            date = %date,
            total_hours,
            entries = entries.len(),
            "day submitted"
        );

        Ok(submission)
    }

    /// Insert the submission row and its entry links in one transaction.
    /// When two submissions for the same day both get past the pre-check,
    /// the unique index on (freelancer, application, date) settles the race
    /// and the loser surfaces as `AlreadySubmitted`.
    async fn persist_submission(
        pool: &SqlitePool,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        date: NaiveDate,
        total_hours: f64,
        entries: &[TimeEntry],
    ) -> Result<Submission, SubmissionError> {
        let mut tx = pool.begin().await?;
        let submission = match Submission::create(
            &mut *tx,
            Uuid::new_v4(),
            freelancer_id,
            job_application_id,
            date,
            total_hours,
            SubmissionStatus::Submitted,
        )
        .await
        {
            Ok(submission) => submission,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(SubmissionError::AlreadySubmitted);
            }
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            Submission::link_entry(&mut *tx, submission.id, entry.id).await?;
        }
        tx.commit().await?;
        Ok(submission)
    }

    /// Apply an employer decision to every reviewable submission in the day
    /// window. Returns the number of submissions advanced. Range-based by
    /// contract; there is no single-submission review path.
    pub async fn review_range(
        pool: &SqlitePool,
        caller_id: Uuid,
        job_application_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        decision: ReviewDecision,
    ) -> Result<u64, SubmissionError> {
        if from > to {
            return Err(SubmissionError::InvalidWindow);
        }
        let application = auth::require_job_owner(pool, caller_id, job_application_id).await?;

        let updated = Submission::update_status_range(
            pool,
            application.id,
            from,
            to,
            decision.target_status(),
        )
        .await?;

        info!(
            job_application_id = %application.id,
            from = %from,
            to = %to,
            ?decision,
            updated,
            "review applied"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use db::models::{
        job::{Job, JobApplication},
        time_entry::CreateTimeEntry,
        user::{User, UserRole},
    };
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn pool_with_logged_day() -> (SqlitePool, Uuid, Uuid, Vec<TimeEntry>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory database");
        db::MIGRATOR.run(&pool).await.expect("run migrations");

        let employer = User::create(&pool, Uuid::new_v4(), "Acme Corp", UserRole::Employer)
            .await
            .unwrap();
        let freelancer = User::create(&pool, Uuid::new_v4(), "Jordan Doe", UserRole::Freelancer)
            .await
            .unwrap();
        let job = Job::create(&pool, Uuid::new_v4(), employer.id, "Backend work")
            .await
            .unwrap();
        let application = JobApplication::create(&pool, Uuid::new_v4(), job.id, freelancer.id)
            .await
            .unwrap();
        let entry = TimeEntry::create(
            &pool,
            Uuid::new_v4(),
            freelancer.id,
            &CreateTimeEntry {
                job_application_id: application.id,
                entry_date: "2024-01-05".parse().unwrap(),
                start_time: "09:00:00".parse().unwrap(),
                end_time: "17:00:00".parse().unwrap(),
                description: "work".to_string(),
            },
        )
        .await
        .unwrap();

        (pool, freelancer.id, application.id, vec![entry])
    }

    #[tokio::test]
    async fn unique_index_rejects_a_duplicate_day() {
        let (pool, freelancer, application, _entries) = pool_with_logged_day().await;
        let date: NaiveDate = "2024-01-05".parse().unwrap();

        Submission::create(
            &pool,
            Uuid::new_v4(),
            freelancer,
            application,
            date,
            8.0,
            SubmissionStatus::Submitted,
        )
        .await
        .unwrap();

        let err = Submission::create(
            &pool,
            Uuid::new_v4(),
            freelancer,
            application,
            date,
            8.0,
            SubmissionStatus::Submitted,
        )
        .await
        .unwrap_err();
        match err {
            sqlx::Error::Database(e) => assert!(e.is_unique_violation()),
            other => panic!("expected a unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_behind_the_pre_check_maps_to_already_submitted() {
        let (pool, freelancer, application, entries) = pool_with_logged_day().await;
        let date: NaiveDate = "2024-01-05".parse().unwrap();

        SubmissionService::submit_day(&pool, freelancer, application, date)
            .await
            .unwrap();

        // A racing submission that already passed the pre-check lands on the
        // insert, where the unique index rejects it.
        let err = SubmissionService::persist_submission(
            &pool,
            freelancer,
            application,
            date,
            8.0,
            &entries,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SubmissionError::AlreadySubmitted));
    }
}
