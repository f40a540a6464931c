//! Agent remoting endpoints.
//!
//! The contract remote build agents poll. `ping` and `get-work` are separate
//! RPCs composed by the agent's poll loop: `ping` updates bookkeeping and
//! answers the cancellation question, `get-work` drains the mailbox. Every
//! call carrying runtime info upserts the registry first, so a stale or
//! duplicate agent is refused before it can touch anything else.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use drydock_core::{
    AgentIdentifier, AgentInstruction, AgentRuntimeInfo, JobIdentifier, JobResult, JobState, Work,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", post(ping))
        .route("/get-work", post(get_work))
        .route("/report-current-status", post(report_current_status))
        .route("/report-completing", post(report_completing))
        .route("/report-completed", post(report_completed))
        .route("/is-ignored", post(is_ignored))
        .route("/get-cookie", post(get_cookie))
}

async fn ping(
    State(app): State<AppState>,
    Json(info): Json<AgentRuntimeInfo>,
) -> Result<Json<AgentInstruction>, ApiError> {
    app.registry.update(info.clone())?;
    let cancelled = info
        .building
        .as_ref()
        .map(|job| app.jobs.is_cancelled(job))
        .unwrap_or(false);
    Ok(Json(if cancelled {
        AgentInstruction::CANCEL
    } else {
        AgentInstruction::NONE
    }))
}

async fn get_work(
    State(app): State<AppState>,
    Json(info): Json<AgentRuntimeInfo>,
) -> Result<Json<Work>, ApiError> {
    app.registry.update(info.clone())?;
    Ok(Json(app.assignments.get_work(&info)))
}

#[derive(Debug, Deserialize)]
struct StatusReport {
    info: AgentRuntimeInfo,
    job: JobIdentifier,
    state: JobState,
}

async fn report_current_status(
    State(app): State<AppState>,
    Json(report): Json<StatusReport>,
) -> Result<Json<Value>, ApiError> {
    app.registry.update(report.info)?;
    app.jobs.report_state(&report.job, report.state);
    Ok(Json(json!({})))
}

#[derive(Debug, Deserialize)]
struct ResultReport {
    info: AgentRuntimeInfo,
    job: JobIdentifier,
    result: JobResult,
}

async fn report_completing(
    State(app): State<AppState>,
    Json(report): Json<ResultReport>,
) -> Result<Json<Value>, ApiError> {
    app.registry.update(report.info)?;
    app.jobs.report_completing(&report.job, report.result);
    Ok(Json(json!({})))
}

async fn report_completed(
    State(app): State<AppState>,
    Json(report): Json<ResultReport>,
) -> Result<Json<Value>, ApiError> {
    app.registry.update(report.info)?;
    app.jobs.report_completed(&report.job, report.result);
    Ok(Json(json!({})))
}

async fn is_ignored(
    State(app): State<AppState>,
    Json(job): Json<JobIdentifier>,
) -> Json<bool> {
    Json(app.jobs.is_ignored(&job))
}

#[derive(Debug, Deserialize)]
struct CookieRequest {
    identifier: AgentIdentifier,
    location: Option<String>,
}

async fn get_cookie(
    State(app): State<AppState>,
    Json(request): Json<CookieRequest>,
) -> Json<Value> {
    let cookie = app
        .registry
        .assign_cookie(&request.identifier, request.location);
    Json(json!({ "cookie": cookie }))
}
