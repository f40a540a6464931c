//! The unit of work delivered to agents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::JobIdentifier;

/// What an agent should do next.
///
/// `NoWork` is an explicit variant rather than an `Option`: the mailbox
/// distinguishes "no entry for this agent" from "entry present but empty",
/// and its compare-and-set rule depends on that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Work {
    NoWork,
    Build(BuildAssignment),
}

impl Work {
    pub fn is_no_work(&self) -> bool {
        matches!(self, Work::NoWork)
    }

    pub fn job(&self) -> Option<&JobIdentifier> {
        match self {
            Work::NoWork => None,
            Work::Build(assignment) => Some(&assignment.job),
        }
    }
}

/// Everything an agent needs to execute one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildAssignment {
    pub job: JobIdentifier,
    /// Commands to run, in order.
    pub commands: Vec<String>,
    /// Working directory relative to the agent's sandbox root.
    pub working_dir: Option<String>,
    /// Environment variables to export before running.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Capability tags the job requires; matched against agent resources.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Maximum execution time, if any.
    pub timeout: Option<Duration>,
}

impl BuildAssignment {
    pub fn new(job: JobIdentifier, commands: Vec<String>) -> Self {
        Self {
            job,
            commands,
            working_dir: None,
            env: HashMap::new(),
            resources: Vec::new(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_work_sentinel() {
        assert!(Work::NoWork.is_no_work());
        assert_eq!(Work::NoWork.job(), None);
    }

    #[test]
    fn test_build_work_carries_its_job() {
        let job = JobIdentifier::new("dist", 1, "build", 1, "compile");
        let work = Work::Build(BuildAssignment::new(job.clone(), vec!["make".into()]));
        assert!(!work.is_no_work());
        assert_eq!(work.job(), Some(&job));
    }

    #[test]
    fn test_equality_is_structural() {
        let job = JobIdentifier::new("dist", 1, "build", 1, "compile");
        let a = Work::Build(BuildAssignment::new(job.clone(), vec!["make".into()]));
        let b = Work::Build(BuildAssignment::new(job, vec!["make".into()]));
        assert_eq!(a, b);
    }
}
