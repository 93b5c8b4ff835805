use crate::errors::{AppError, PipelineError};
use crate::models::{ChartTypeRequest, SubmitRequest, ViewSnapshot};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.snapshot().await))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.snapshot().await)
}

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ViewSnapshot>, AppError> {
    run_submit(&state, &payload.query).await?;
    Ok(Json(state.snapshot().await))
}

pub async fn select_chart(
    State(state): State<AppState>,
    Json(payload): Json<ChartTypeRequest>,
) -> Result<Json<ViewSnapshot>, AppError> {
    let chart_type = payload.chart_type.trim();
    if chart_type.is_empty() {
        return Err(AppError::bad_request("chart_type must not be empty"));
    }

    state.pipeline.select_chart_type(chart_type).await?;
    Ok(Json(state.snapshot().await))
}

// The form routes always land back on the page; failures show up there as a notice.

pub async fn submit_form(
    State(state): State<AppState>,
    Form(payload): Form<SubmitRequest>,
) -> Redirect {
    if let Err(err) = run_submit(&state, &payload.query).await {
        debug!("form submission finished with error: {err}");
    }
    Redirect::to("/")
}

pub async fn select_chart_form(
    State(state): State<AppState>,
    Path(chart_type): Path<String>,
) -> Redirect {
    if let Err(err) = state.pipeline.select_chart_type(&chart_type).await {
        debug!("chart switch from form failed: {err}");
    }
    Redirect::to("/")
}

async fn run_submit(state: &AppState, query: &str) -> Result<(), PipelineError> {
    state.pipeline.submit(query).await?;
    Ok(())
}
