//! Job lifecycle tracking.
//!
//! States move `Scheduled → Assigned → Preparing → Building → Completing →
//! Completed`, driven exclusively by agent reporting calls; the server never
//! infers a transition on its own. Cancellation is an orthogonal flag an
//! operator or scheduler may set at any point before completion — the agent
//! discovers it on its own poll cadence and still reports `Completed`, with
//! result `Cancelled`.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use drydock_core::{JobIdentifier, JobResult, JobState};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct JobRecord {
    state: JobState,
    result: Option<JobResult>,
    cancelled: bool,
}

/// Tracks every job the coordinator currently knows about.
pub struct JobLifecycle {
    jobs: DashMap<JobIdentifier, JobRecord>,
}

impl JobLifecycle {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// A collaborator decided this job is runnable. Idempotent.
    pub fn schedule(&self, job: JobIdentifier) {
        match self.jobs.entry(job) {
            Entry::Vacant(slot) => {
                info!(job = %slot.key(), "job scheduled");
                slot.insert(JobRecord {
                    state: JobState::Scheduled,
                    result: None,
                    cancelled: false,
                });
            }
            Entry::Occupied(slot) => {
                debug!(job = %slot.key(), "job already scheduled");
            }
        }
    }

    /// Record a state transition. Reference behavior is overwrite: duplicate
    /// reports (retried network calls) land on the same value, and anything
    /// after `Completed` is ignored.
    pub fn report_state(&self, job: &JobIdentifier, state: JobState) {
        let Some(mut record) = self.jobs.get_mut(job) else {
            warn!(job = %job, ?state, "state report for unknown job ignored");
            return;
        };
        if record.state.is_completed() {
            debug!(job = %job, ?state, "report after completion ignored");
            return;
        }
        debug!(job = %job, from = %record.state, to = %state, "job state change");
        record.state = state;
    }

    /// The job is wrapping up with a provisional result, before artifacts are
    /// flushed.
    pub fn report_completing(&self, job: &JobIdentifier, result: JobResult) {
        let Some(mut record) = self.jobs.get_mut(job) else {
            warn!(job = %job, "completing report for unknown job ignored");
            return;
        };
        if record.state.is_completed() {
            debug!(job = %job, "completing after completion ignored");
            return;
        }
        info!(job = %job, result = %result, "job completing");
        record.state = JobState::Completing;
        record.result = Some(result);
    }

    /// Terminal report. Safe to call even when `report_completing` was
    /// skipped (agent crash recovery): the completing side effect runs first.
    /// Idempotent once completed.
    pub fn report_completed(&self, job: &JobIdentifier, result: JobResult) {
        let Some(mut record) = self.jobs.get_mut(job) else {
            warn!(job = %job, "completed report for unknown job ignored");
            return;
        };
        if record.state.is_completed() {
            debug!(job = %job, "repeated completion report ignored");
            return;
        }
        if record.state < JobState::Completing {
            info!(job = %job, result = %result, "job completing (completing report was skipped)");
            record.state = JobState::Completing;
            record.result = Some(result);
        }
        info!(job = %job, result = %result, "job completed");
        record.state = JobState::Completed;
        record.result = Some(result);
    }

    /// Flag the job cancelled. Returns false once the job has completed (or
    /// was never scheduled) — there is nothing left to cancel.
    pub fn cancel(&self, job: &JobIdentifier) -> bool {
        let Some(mut record) = self.jobs.get_mut(job) else {
            warn!(job = %job, "cancel for unknown job ignored");
            return false;
        };
        if record.state.is_completed() {
            debug!(job = %job, "cancel after completion ignored");
            return false;
        }
        info!(job = %job, "job cancelled");
        record.cancelled = true;
        true
    }

    /// Server-side reschedule: forget the instance so the agent abandons it.
    pub fn discard(&self, job: &JobIdentifier) {
        if self.jobs.remove(job).is_some() {
            info!(job = %job, "job discarded for reschedule");
        }
    }

    pub fn is_cancelled(&self, job: &JobIdentifier) -> bool {
        self.jobs.get(job).map(|r| r.cancelled).unwrap_or(false)
    }

    /// Should the agent abandon this job? True when it was cancelled, or when
    /// the server no longer holds an instance for it (discarded/rescheduled).
    pub fn is_ignored(&self, job: &JobIdentifier) -> bool {
        match self.jobs.get(job) {
            Some(record) => record.cancelled,
            None => true,
        }
    }

    pub fn state_of(&self, job: &JobIdentifier) -> Option<JobState> {
        self.jobs.get(job).map(|r| r.state)
    }

    pub fn result_of(&self, job: &JobIdentifier) -> Option<JobResult> {
        self.jobs.get(job).and_then(|r| r.result)
    }
}

impl Default for JobLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
