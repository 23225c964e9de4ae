//! Query façade over entries and submissions, plus the entry mutation paths.
//!
//! The façade owns range validation, role resolution and the employer
//! visibility filter so the route layer stays a thin adapter.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use db::models::{
    submission::{Submission, SubmissionStatus},
    time_entry::{CreateTimeEntry, TimeEntry, UpdateTimeEntry},
    user::UserRole,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::auth::{self, AuthError};

/// Longest window a single timesheet query may span.
pub const MAX_RANGE_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum TimesheetError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid date range: {0}")]
    InvalidRange(&'static str),
    #[error("freelancerId is required for employer queries")]
    MissingFreelancerParam,
    #[error("time entry not found")]
    EntryNotFound,
    #[error("entry belongs to a submission and can no longer be changed")]
    EntryLocked,
}

/// Parameters of a timesheet query as resolved from the request.
#[derive(Debug, Clone)]
pub struct TimesheetQuery {
    pub job_application_id: Uuid,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    /// Required when the caller is an employer; ignored for freelancers, who
    /// always act as themselves.
    pub freelancer_id: Option<Uuid>,
}

/// One entry annotated with its day's submission state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntryView {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
    pub status: Option<SubmissionStatus>,
    pub is_submitted: bool,
}

/// Merged view returned by `get_timesheet`. `is_submitted` holds when at
/// least one visible entry exists and every day with visible entries has a
/// submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetView {
    pub timesheet_entries: Vec<TimesheetEntryView>,
    pub is_submitted: bool,
}

pub struct TimesheetService;

impl TimesheetService {
    pub async fn get_timesheet(
        pool: &SqlitePool,
        caller_id: Uuid,
        query: &TimesheetQuery,
    ) -> Result<TimesheetView, TimesheetError> {
        let caller = auth::require_user(pool, caller_id).await?;
        validate_range(query.from_time, query.to_time)?;

        // Authorization also pins down whose entries we are reading.
        let application = match caller.role {
            UserRole::Freelancer => {
                auth::require_applicant(pool, caller.id, query.job_application_id).await?
            }
            UserRole::Employer => {
                let application =
                    auth::require_job_owner(pool, caller.id, query.job_application_id).await?;
                let requested = query
                    .freelancer_id
                    .ok_or(TimesheetError::MissingFreelancerParam)?;
                if requested != application.freelancer_id {
                    return Err(AuthError::Forbidden.into());
                }
                application
            }
        };

        let from_date = query.from_time.date_naive();
        let to_date = query.to_time.date_naive();

        let entries = TimeEntry::find_in_range(
            pool,
            application.freelancer_id,
            application.id,
            from_date,
            to_date,
        )
        .await?;
        let submissions = Submission::find_in_range(
            pool,
            application.freelancer_id,
            application.id,
            from_date,
            to_date,
        )
        .await?;

        let status_by_day: HashMap<NaiveDate, SubmissionStatus> = submissions
            .into_iter()
            .map(|s| (s.submission_date, s.status))
            .collect();

        let views: Vec<TimesheetEntryView> = entries
            .into_iter()
            .filter(|entry| match caller.role {
                UserRole::Freelancer => true,
                // Employers never see days without a reviewable submission.
                UserRole::Employer => status_by_day
                    .get(&entry.entry_date)
                    .is_some_and(SubmissionStatus::visible_to_employer),
            })
            .map(|entry| {
                let status = status_by_day.get(&entry.entry_date).cloned();
                TimesheetEntryView {
                    id: entry.id,
                    date: entry.entry_date,
                    start_time: entry.start_time,
                    end_time: entry.end_time,
                    description: entry.description,
                    is_submitted: status.is_some(),
                    status,
                }
            })
            .collect();

        let is_submitted = !views.is_empty() && views.iter().all(|v| v.is_submitted);

        debug!(
            job_application_id = %application.id,
            from = %from_date,
            to = %to_date,
            entries = views.len(),
            "timesheet assembled"
        );

        Ok(TimesheetView {
            timesheet_entries: views,
            is_submitted,
        })
    }

    /// Create an entry for the calling freelancer. No overlap validation is
    /// performed; a zero-hour day is rejected at submission time instead.
    pub async fn add_entry(
        pool: &SqlitePool,
        caller_id: Uuid,
        data: &CreateTimeEntry,
    ) -> Result<TimeEntry, TimesheetError> {
        let application =
            auth::require_applicant(pool, caller_id, data.job_application_id).await?;
        let entry =
            TimeEntry::create(pool, Uuid::new_v4(), application.freelancer_id, data).await?;
        Ok(entry)
    }

    pub async fn update_entry(
        pool: &SqlitePool,
        caller_id: Uuid,
        entry_id: Uuid,
        data: &UpdateTimeEntry,
    ) -> Result<TimeEntry, TimesheetError> {
        let caller = Self::require_entry_owner(pool, caller_id, entry_id).await?;
        TimeEntry::update(pool, entry_id, caller, data)
            .await?
            .ok_or(TimesheetError::EntryNotFound)
    }

    pub async fn delete_entry(
        pool: &SqlitePool,
        caller_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(), TimesheetError> {
        let caller = Self::require_entry_owner(pool, caller_id, entry_id).await?;
        let deleted = TimeEntry::delete(pool, entry_id, caller).await?;
        if deleted == 0 {
            return Err(TimesheetError::EntryNotFound);
        }
        Ok(())
    }

    /// Shared guard for entry mutations: caller is a freelancer, owns the
    /// entry, and the entry has not been folded into a submission.
    async fn require_entry_owner(
        pool: &SqlitePool,
        caller_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Uuid, TimesheetError> {
        let caller = auth::require_user(pool, caller_id).await?;
        if caller.role != UserRole::Freelancer {
            return Err(AuthError::Forbidden.into());
        }
        let entry = TimeEntry::find_by_id(pool, entry_id)
            .await?
            .ok_or(TimesheetError::EntryNotFound)?;
        if entry.freelancer_id != caller.id {
            return Err(AuthError::Forbidden.into());
        }
        if TimeEntry::is_locked(pool, entry_id).await? {
            return Err(TimesheetError::EntryLocked);
        }
        Ok(caller.id)
    }
}

fn validate_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), TimesheetError> {
    if from >= to {
        return Err(TimesheetError::InvalidRange("fromTime must precede toTime"));
    }
    if to - from > Duration::days(MAX_RANGE_DAYS) {
        return Err(TimesheetError::InvalidRange("range may not exceed 7 days"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn accepts_window_up_to_seven_days() {
        assert!(validate_range(at("2024-01-01T00:00:00Z"), at("2024-01-08T00:00:00Z")).is_ok());
        assert!(validate_range(at("2024-01-01T09:00:00Z"), at("2024-01-01T17:00:00Z")).is_ok());
    }

    #[test]
    fn rejects_reversed_or_empty_window() {
        assert!(validate_range(at("2024-01-02T00:00:00Z"), at("2024-01-01T00:00:00Z")).is_err());
        assert!(validate_range(at("2024-01-01T00:00:00Z"), at("2024-01-01T00:00:00Z")).is_err());
    }

    #[test]
    fn rejects_window_longer_than_seven_days() {
        assert!(validate_range(at("2024-01-01T00:00:00Z"), at("2024-01-08T00:00:01Z")).is_err());
    }
}
