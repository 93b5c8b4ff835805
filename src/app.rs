use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/query", post(handlers::submit_form))
        .route("/chart/:chart_type", post(handlers::select_chart_form))
        .route("/api/view", get(handlers::get_view))
        .route("/api/query", post(handlers::submit))
        .route("/api/chart", post(handlers::select_chart))
        .with_state(state)
}
