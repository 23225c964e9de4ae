//! The `/api/timesheet` surface: method-dispatched entry CRUD plus the
//! submit and review actions.

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, request::Parts},
    response::Json as ResponseJson,
    routing::post,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use db::models::{
    submission::{Submission, SubmissionStatus},
    time_entry::{CreateTimeEntry, TimeEntry, UpdateTimeEntry},
};
use serde::{Deserialize, Serialize};
use services::services::{
    submission::{ReviewDecision, SubmissionService},
    timesheet::{TimesheetQuery, TimesheetService, TimesheetView},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity taken from the `X-User-Id` header. Session/OAuth wiring
/// lives outside this service; whatever terminates it injects the header.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub Uuid);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing X-User-Id header"))?;
        let id = value
            .parse::<Uuid>()
            .map_err(|_| ApiError::unauthorized("malformed X-User-Id header"))?;
        Ok(CallerId(id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetParams {
    pub job_application_id: Uuid,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub freelancer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub job_application_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub timesheet_entry_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryRequest {
    pub timesheet_entry_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDayRequest {
    pub job_application_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub job_application_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub decision: ReviewDecision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
}

impl From<TimeEntry> for EntryResponse {
    fn from(entry: TimeEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.entry_date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            description: entry.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub submission_date: NaiveDate,
    pub total_hours: f64,
    pub status: SubmissionStatus,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            submission_date: submission.submission_date,
            total_hours: submission.total_hours,
            status: submission.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub updated: u64,
}

pub async fn get_timesheet(
    State(state): State<AppState>,
    caller: CallerId,
    Query(params): Query<TimesheetParams>,
) -> Result<ResponseJson<TimesheetView>, ApiError> {
    let query = TimesheetQuery {
        job_application_id: params.job_application_id,
        from_time: params.from_time,
        to_time: params.to_time,
        freelancer_id: params.freelancer_id,
    };
    let view = TimesheetService::get_timesheet(&state.db.pool, caller.0, &query).await?;
    Ok(ResponseJson(view))
}

pub async fn create_entry(
    State(state): State<AppState>,
    caller: CallerId,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, ResponseJson<EntryResponse>), ApiError> {
    let data = CreateTimeEntry {
        job_application_id: payload.job_application_id,
        entry_date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        description: payload.description,
    };
    let entry = TimesheetService::add_entry(&state.db.pool, caller.0, &data).await?;
    Ok((StatusCode::CREATED, ResponseJson(entry.into())))
}

pub async fn update_entry(
    State(state): State<AppState>,
    caller: CallerId,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<ResponseJson<EntryResponse>, ApiError> {
    let data = UpdateTimeEntry {
        entry_date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        description: payload.description,
    };
    let entry = TimesheetService::update_entry(
        &state.db.pool,
        caller.0,
        payload.timesheet_entry_id,
        &data,
    )
    .await?;
    Ok(ResponseJson(entry.into()))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    caller: CallerId,
    Json(payload): Json<DeleteEntryRequest>,
) -> Result<StatusCode, ApiError> {
    TimesheetService::delete_entry(&state.db.pool, caller.0, payload.timesheet_entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_day(
    State(state): State<AppState>,
    caller: CallerId,
    Json(payload): Json<SubmitDayRequest>,
) -> Result<(StatusCode, ResponseJson<SubmissionResponse>), ApiError> {
    let submission = SubmissionService::submit_day(
        &state.db.pool,
        caller.0,
        payload.job_application_id,
        payload.date,
    )
    .await?;
    Ok((StatusCode::CREATED, ResponseJson(submission.into())))
}

pub async fn review(
    State(state): State<AppState>,
    caller: CallerId,
    Json(payload): Json<ReviewRequest>,
) -> Result<ResponseJson<ReviewResponse>, ApiError> {
    let updated = SubmissionService::review_range(
        &state.db.pool,
        caller.0,
        payload.job_application_id,
        payload.from_date,
        payload.to_date,
        payload.decision,
    )
    .await?;
    Ok(ResponseJson(ReviewResponse { updated }))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/timesheet",
        Router::new()
            .route(
                "/",
                axum::routing::get(get_timesheet)
                    .post(create_entry)
                    .put(update_entry)
                    .delete(delete_entry),
            )
            .route("/submit", post(submit_day))
            .route("/review", post(review)),
    )
}
