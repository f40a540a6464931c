//! Agent fleet read surface, consumed by the health tracker and operators.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;
use drydock_core::AgentRuntimeInfo;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_agents))
}

#[derive(Debug, Serialize)]
struct AgentListResponse {
    agents: Vec<AgentRuntimeInfo>,
}

async fn list_agents(State(app): State<AppState>) -> Json<AgentListResponse> {
    Json(AgentListResponse {
        agents: app.registry.snapshot(),
    })
}
