use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Lifecycle of a daily submission.
///
/// `Draft` is part of the stored taxonomy and is hidden from employers, but no
/// code path currently produces it; the aggregator always inserts `Submitted`.
#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, EnumString, EnumIter, Display)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Legal forward transitions. Nothing is reversible; `Approved` and
    /// `Rejected` are terminal.
    pub fn can_transition_to(&self, next: &SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Draft, SubmissionStatus::Submitted)
                | (SubmissionStatus::Submitted, SubmissionStatus::Approved)
                | (SubmissionStatus::Submitted, SubmissionStatus::Rejected)
        )
    }

    /// Statuses an employer is allowed to see. Draft days look unsubmitted
    /// from the employer side.
    pub fn visible_to_employer(&self) -> bool {
        !matches!(self, SubmissionStatus::Draft)
    }
}

/// An immutable daily aggregate of time entries. Only `status` ever changes
/// after insert, and only through the review path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub freelancer_id: Uuid,
    pub job_application_id: Uuid,
    pub submission_date: NaiveDate,
    pub total_hours: f64,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SUBMISSION_COLUMNS: &str = "id, freelancer_id, job_application_id, submission_date, \
                                  total_hours, status, created_at, updated_at";

impl Submission {
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        submission_date: NaiveDate,
        total_hours: f64,
        status: SubmissionStatus,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Submission>(&format!(
            r#"INSERT INTO submissions
                   (id, freelancer_id, job_application_id, submission_date, total_hours, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {SUBMISSION_COLUMNS}"#
        ))
        .bind(id)
        .bind(freelancer_id)
        .bind(job_application_id)
        .bind(submission_date)
        .bind(total_hours)
        .bind(status)
        .fetch_one(executor)
        .await
    }

    /// Snapshot link between a submission and one of the entries it
    /// aggregated. Later entry edits never change a past submission's total.
    pub async fn link_entry<'e, E>(
        executor: E,
        submission_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO submission_entries (submission_id, entry_id) VALUES ($1, $2)")
            .bind(submission_id)
            .bind(entry_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn find_for_day(
        pool: &SqlitePool,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(&format!(
            r#"SELECT {SUBMISSION_COLUMNS}
               FROM submissions
               WHERE freelancer_id = $1 AND job_application_id = $2 AND submission_date = $3"#
        ))
        .bind(freelancer_id)
        .bind(job_application_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_in_range(
        pool: &SqlitePool,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(&format!(
            r#"SELECT {SUBMISSION_COLUMNS}
               FROM submissions
               WHERE freelancer_id = $1
                 AND job_application_id = $2
                 AND submission_date BETWEEN $3 AND $4
               ORDER BY submission_date ASC"#
        ))
        .bind(freelancer_id)
        .bind(job_application_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Advance every submission in the day window whose current status may
    /// legally reach `target`. Day-granularity by contract; there is no
    /// per-submission review path.
    pub async fn update_status_range(
        pool: &SqlitePool,
        job_application_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        target: SubmissionStatus,
    ) -> Result<u64, sqlx::Error> {
        let sources: Vec<SubmissionStatus> = SubmissionStatus::iter()
            .filter(|s| s.can_transition_to(&target))
            .collect();
        if sources.is_empty() {
            return Ok(0);
        }

        let placeholders = (0..sources.len())
            .map(|i| format!("${}", i + 5))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"UPDATE submissions
               SET status = $1, updated_at = datetime('now', 'subsec')
               WHERE job_application_id = $2
                 AND submission_date BETWEEN $3 AND $4
                 AND status IN ({placeholders})"#
        );

        let mut query = sqlx::query(&sql)
            .bind(target)
            .bind(job_application_id)
            .bind(from)
            .bind(to);
        for source in sources {
            query = query.bind(source);
        }
        let result = query.execute(pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionStatus::*;

    #[test]
    fn submitted_reaches_both_terminal_states() {
        assert!(Submitted.can_transition_to(&Approved));
        assert!(Submitted.can_transition_to(&Rejected));
    }

    #[test]
    fn draft_only_advances_to_submitted() {
        assert!(Draft.can_transition_to(&Submitted));
        assert!(!Draft.can_transition_to(&Approved));
        assert!(!Draft.can_transition_to(&Rejected));
    }

    #[test]
    fn no_transition_is_reversible() {
        for terminal in [Approved, Rejected] {
            for next in [Draft, Submitted, Approved, Rejected] {
                assert!(!terminal.can_transition_to(&next));
            }
        }
        assert!(!Submitted.can_transition_to(&Draft));
    }

    #[test]
    fn draft_hidden_from_employer() {
        assert!(!Draft.visible_to_employer());
        assert!(Submitted.visible_to_employer());
        assert!(Approved.visible_to_employer());
        assert!(Rejected.visible_to_employer());
    }
}
