//! HTTP surface for the drydock coordinator.
//!
//! `/remoting/*` is the contract remote build agents poll; `/api/v1/*` is the
//! small operator/read surface (registry snapshot, schedule, cancel).

pub mod error;
pub mod routes;
pub mod state;

pub use state::AppState;
