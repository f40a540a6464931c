//! Job entry points for schedulers and operators.
//!
//! Scheduling decisions themselves live outside this core; these endpoints
//! only feed it the facts: a job became runnable, or an operator cancelled
//! one. Assignment to a concrete agent goes through the work-assigned topic
//! in-process.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::AppState;
use drydock_core::JobIdentifier;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", post(schedule_job))
        .route("/cancel", post(cancel_job))
}

#[derive(Debug, Deserialize)]
struct ScheduleRequest {
    job: JobIdentifier,
    /// Capability tags the job requires of its agent.
    #[serde(default)]
    resources: Vec<String>,
    /// When set, demand elastic capacity from this plugin if no matching
    /// idle agent turns up in time.
    elastic_plugin: Option<String>,
}

async fn schedule_job(
    State(app): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Json<Value> {
    app.jobs.schedule(request.job.clone());
    if let Some(plugin_id) = request.elastic_plugin {
        // Fire-and-forget; the waiter owns its own timeout.
        let _ = app
            .elastic
            .demand(plugin_id, request.job, request.resources);
    }
    Json(json!({ "scheduled": true }))
}

#[derive(Debug, Deserialize)]
struct CancelRequest {
    job: JobIdentifier,
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    cancelled: bool,
}

async fn cancel_job(
    State(app): State<AppState>,
    Json(request): Json<CancelRequest>,
) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: app.jobs.cancel(&request.job),
    })
}
