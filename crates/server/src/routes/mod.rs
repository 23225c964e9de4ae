pub mod health;
pub mod timesheet;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api", health::router().merge(timesheet::router()))
}
