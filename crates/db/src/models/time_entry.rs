use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use uuid::Uuid;

/// A single freelancer-logged work interval with a description.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub freelancer_id: Uuid,
    pub job_application_id: Uuid,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeEntry {
    pub job_application_id: Uuid,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTimeEntry {
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

const ENTRY_COLUMNS: &str = "id, freelancer_id, job_application_id, entry_date, \
                             start_time, end_time, description, created_at, updated_at";

impl TimeEntry {
    /// Length of the interval in hours. Reversed intervals still count
    /// positive; the aggregator sums absolute durations.
    pub fn duration_hours(&self) -> f64 {
        let secs = (self.end_time - self.start_time).num_seconds().abs();
        secs as f64 / 3600.0
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        freelancer_id: Uuid,
        data: &CreateTimeEntry,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            r#"INSERT INTO time_entries
                   (id, freelancer_id, job_application_id, entry_date, start_time, end_time, description)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(id)
        .bind(freelancer_id)
        .bind(data.job_application_id)
        .bind(data.entry_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            r#"SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Entries whose date falls within `[from, to]` inclusive. Callers are
    /// responsible for capping the window; the store does not.
    pub async fn find_in_range(
        pool: &SqlitePool,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            r#"SELECT {ENTRY_COLUMNS}
               FROM time_entries
               WHERE freelancer_id = $1
                 AND job_application_id = $2
                 AND entry_date BETWEEN $3 AND $4
               ORDER BY entry_date ASC, start_time ASC"#
        ))
        .bind(freelancer_id)
        .bind(job_application_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_day(
        pool: &SqlitePool,
        freelancer_id: Uuid,
        job_application_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        Self::find_in_range(pool, freelancer_id, job_application_id, date, date).await
    }

    /// Owner-scoped update. Returns `None` when no row matched the
    /// (id, freelancer) pair.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        freelancer_id: Uuid,
        data: &UpdateTimeEntry,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            r#"UPDATE time_entries
               SET entry_date = $3, start_time = $4, end_time = $5, description = $6,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND freelancer_id = $2
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(id)
        .bind(freelancer_id)
        .bind(data.entry_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.description)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid, freelancer_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1 AND freelancer_id = $2")
            .bind(id)
            .bind(freelancer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// True when the entry has been folded into a submission. Locked entries
    /// must not be edited or deleted; the snapshot would silently drift from
    /// the recorded total otherwise.
    pub async fn is_locked(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let locked: i64 = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM submission_entries WHERE entry_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(locked != 0)
    }
}
