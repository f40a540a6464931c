//! Job identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifies exactly one job instance within a pipeline run.
///
/// The five parts form a composite key: the same job name re-run in a later
/// pipeline or stage counter is a different job. Used as the correlation key
/// across all agent reporting calls and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{pipeline_name}/{pipeline_counter}/{stage_name}/{stage_counter}/{job_name}")]
pub struct JobIdentifier {
    pub pipeline_name: String,
    pub pipeline_counter: u64,
    pub stage_name: String,
    pub stage_counter: u64,
    pub job_name: String,
}

impl JobIdentifier {
    pub fn new(
        pipeline_name: impl Into<String>,
        pipeline_counter: u64,
        stage_name: impl Into<String>,
        stage_counter: u64,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            pipeline_counter,
            stage_name: stage_name.into(),
            stage_counter,
            job_name: job_name.into(),
        }
    }
}
