//! Job lifecycle states and results.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// States a job passes through, in order.
///
/// Transitions are driven exclusively by agent reporting calls; the server
/// never infers a state on its own. Ordering follows declaration order, so
/// `JobState::Building < JobState::Completed` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Scheduled,
    Assigned,
    Preparing,
    Building,
    Completing,
    Completed,
}

impl JobState {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobState::Completed)
    }
}

/// Outcome of a job, provisional from report-completing onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    Passed,
    Failed,
    Cancelled,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(JobState::Scheduled < JobState::Assigned);
        assert!(JobState::Building < JobState::Completing);
        assert!(JobState::Completing < JobState::Completed);
    }

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(JobState::Completed.is_completed());
        assert!(!JobState::Completing.is_completed());
    }
}
