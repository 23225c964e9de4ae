pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
}

pub fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}
