//! Core domain types for the drydock delivery coordinator.
//!
//! This crate contains:
//! - Agent identity and runtime bookkeeping types
//! - Job identifiers, states and results
//! - The work unit delivered to agents (including the `NoWork` sentinel)
//! - The error taxonomy shared by the coordinator and the API surface

pub mod agent;
pub mod error;
pub mod id;
pub mod job;
pub mod work;

pub use agent::{AgentIdentifier, AgentInstruction, AgentRuntimeInfo, AgentStatus};
pub use error::{Error, Result};
pub use id::JobIdentifier;
pub use job::{JobResult, JobState};
pub use work::{BuildAssignment, Work};
