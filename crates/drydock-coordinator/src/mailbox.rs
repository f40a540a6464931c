//! Per-agent work mailbox.
//!
//! Each agent owns one slot holding either `NoWork` or exactly one concrete
//! assignment. The slot is the single source of truth for "what should this
//! agent do right now": schedulers fill it through the work-assigned topic,
//! the agent drains it by polling. The map is key-sharded, so polling one
//! agent never serializes against another.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use drydock_core::{AgentIdentifier, AgentRuntimeInfo, Work};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bus::{IdleAgentMessage, IdleAgentTopic, Subscriber, WorkAssignedMessage};

/// The mailbox. Slot invariant: a key holds `NoWork` while the agent is
/// registered-and-idle-and-has-been-told-so, is absent while truly unseen
/// (or just drained), and holds concrete work exactly between "scheduler
/// assigned" and "agent fetched".
pub struct WorkAssignments {
    assignments: DashMap<AgentIdentifier, Work>,
    idle_topic: Arc<IdleAgentTopic>,
}

impl WorkAssignments {
    pub fn new(idle_topic: Arc<IdleAgentTopic>) -> Self {
        Self {
            assignments: DashMap::new(),
            idle_topic,
        }
    }

    /// Answer an agent's poll.
    ///
    /// - absent slot: the agent was not known to be idle; record `NoWork`,
    ///   announce the idle agent, return `NoWork`
    /// - slot holds `NoWork`: idempotent re-poll, no duplicate idle event
    /// - slot holds work: remove and return it, exactly once
    pub fn get_work(&self, runtime: &AgentRuntimeInfo) -> Work {
        let mut became_idle = false;
        let work = match self.assignments.entry(runtime.identifier.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(Work::NoWork);
                became_idle = true;
                Work::NoWork
            }
            Entry::Occupied(slot) => {
                if slot.get().is_no_work() {
                    Work::NoWork
                } else {
                    slot.remove()
                }
            }
        };
        // The slot guard is released above; subscribers of the idle topic may
        // re-enter this mailbox on the same shard.
        if became_idle {
            debug!(agent = %runtime.uuid(), "agent has no work; announcing idle");
            self.idle_topic.publish(IdleAgentMessage {
                info: runtime.clone(),
            });
        }
        if let Some(job) = work.job() {
            info!(agent = %runtime.uuid(), job = %job, "delivered work");
        }
        work
    }

    /// Number of slots currently holding a concrete assignment.
    pub fn pending(&self) -> usize {
        self.assignments
            .iter()
            .filter(|slot| !slot.value().is_no_work())
            .count()
    }
}

impl Subscriber<WorkAssignedMessage> for WorkAssignments {
    /// Accept a scheduler's decision. A `NoWork` payload retracts whatever is
    /// pending for the agent; concrete work lands only in a slot currently
    /// holding `NoWork` — never overwrite an undelivered assignment, and an
    /// agent that has not announced idle is not accepting work.
    fn on_message(&self, message: &WorkAssignedMessage) {
        match &message.work {
            Work::NoWork => {
                self.assignments.remove(&message.agent);
                debug!(agent = %message.agent.uuid, "retracted pending work");
            }
            work => match self.assignments.entry(message.agent.clone()) {
                Entry::Occupied(mut slot) if slot.get().is_no_work() => {
                    slot.insert(work.clone());
                    info!(agent = %message.agent.uuid, job = ?work.job(), "queued work");
                }
                Entry::Occupied(_) => {
                    warn!(
                        agent = %message.agent.uuid,
                        "dropping assignment: agent already has undelivered work"
                    );
                }
                Entry::Vacant(_) => {
                    warn!(
                        agent = %message.agent.uuid,
                        "dropping assignment: agent has not announced idle"
                    );
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Topic;
    use drydock_core::{BuildAssignment, JobIdentifier};
    use std::sync::Mutex;

    struct IdleRecorder {
        seen: Mutex<Vec<IdleAgentMessage>>,
    }

    impl Subscriber<IdleAgentMessage> for IdleRecorder {
        fn on_message(&self, message: &IdleAgentMessage) {
            self.seen.lock().unwrap().push(message.clone());
        }
    }

    fn agent(uuid: &str) -> AgentRuntimeInfo {
        AgentRuntimeInfo::idle(AgentIdentifier::new("host", "10.0.0.1", uuid), "cookie")
    }

    fn build(job_name: &str) -> Work {
        Work::Build(BuildAssignment::new(
            JobIdentifier::new("dist", 42, "build", 1, job_name),
            vec!["make".into()],
        ))
    }

    fn mailbox_with_recorder() -> (WorkAssignments, Arc<IdleRecorder>) {
        let recorder = Arc::new(IdleRecorder {
            seen: Mutex::new(Vec::new()),
        });
        let mut topic = Topic::new("idle-agent", 8);
        topic.subscribe(recorder.clone());
        (WorkAssignments::new(Arc::new(topic)), recorder)
    }

    fn assigned(info: &AgentRuntimeInfo, work: Work) -> WorkAssignedMessage {
        WorkAssignedMessage {
            agent: info.identifier.clone(),
            work,
        }
    }

    #[test]
    fn test_first_poll_announces_idle_and_returns_no_work() {
        let (mailbox, recorder) = mailbox_with_recorder();
        let a1 = agent("a1");

        assert_eq!(mailbox.get_work(&a1), Work::NoWork);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].info, a1);
    }

    #[test]
    fn test_repolling_while_idle_publishes_no_duplicate_idle_event() {
        let (mailbox, recorder) = mailbox_with_recorder();
        let a1 = agent("a1");

        for _ in 0..5 {
            assert_eq!(mailbox.get_work(&a1), Work::NoWork);
        }

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_assigned_work_is_delivered_exactly_once() {
        let (mailbox, recorder) = mailbox_with_recorder();
        let a1 = agent("a1");
        let job42 = build("job42");

        mailbox.get_work(&a1);
        mailbox.on_message(&assigned(&a1, job42.clone()));

        assert_eq!(mailbox.get_work(&a1), job42);
        // Slot is now empty, so the next poll re-announces idle.
        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
        assert_eq!(recorder.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_second_assignment_never_overwrites_the_first() {
        let (mailbox, _) = mailbox_with_recorder();
        let a1 = agent("a1");
        let job42 = build("job42");
        let job43 = build("job43");

        mailbox.get_work(&a1);
        mailbox.on_message(&assigned(&a1, job42.clone()));
        mailbox.on_message(&assigned(&a1, job43));

        assert_eq!(mailbox.get_work(&a1), job42);
        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
    }

    #[test]
    fn test_assignment_after_drain_is_dropped_until_next_idle_cycle() {
        let (mailbox, _) = mailbox_with_recorder();
        let a1 = agent("a1");
        let job42 = build("job42");
        let job43 = build("job43");

        mailbox.get_work(&a1);
        mailbox.on_message(&assigned(&a1, job42.clone()));
        assert_eq!(mailbox.get_work(&a1), job42);

        // Slot is empty (not NoWork): only NoWork may be replaced, so drop.
        mailbox.on_message(&assigned(&a1, job43));
        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
    }

    #[test]
    fn test_assignment_for_unknown_agent_is_dropped() {
        let (mailbox, _) = mailbox_with_recorder();
        let a1 = agent("a1");

        mailbox.on_message(&assigned(&a1, build("job42")));

        // First poll behaves as a fresh idle cycle, not a delivery.
        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
    }

    #[test]
    fn test_no_work_message_retracts_a_pending_offer() {
        let (mailbox, recorder) = mailbox_with_recorder();
        let a1 = agent("a1");

        mailbox.get_work(&a1);
        mailbox.on_message(&assigned(&a1, build("job42")));
        mailbox.on_message(&assigned(&a1, Work::NoWork));

        assert_eq!(mailbox.get_work(&a1), Work::NoWork);
        assert_eq!(recorder.seen.lock().unwrap().len(), 2);
        assert_eq!(mailbox.pending(), 0);
    }

    #[test]
    fn test_concurrent_polls_deliver_to_exactly_one_caller() {
        let (mailbox, _) = mailbox_with_recorder();
        let a1 = agent("a1");
        let job42 = build("job42");

        mailbox.get_work(&a1);
        mailbox.on_message(&assigned(&a1, job42.clone()));

        let deliveries = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| mailbox.get_work(&a1)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|w| !w.is_no_work())
                .collect::<Vec<_>>()
        });

        assert_eq!(deliveries, vec![job42]);
    }

    #[test]
    fn test_unrelated_agents_do_not_interfere() {
        let (mailbox, _) = mailbox_with_recorder();
        let a1 = agent("a1");
        let a2 = agent("a2");
        let job42 = build("job42");

        mailbox.get_work(&a1);
        mailbox.get_work(&a2);
        mailbox.on_message(&assigned(&a1, job42.clone()));

        assert_eq!(mailbox.get_work(&a2), Work::NoWork);
        assert_eq!(mailbox.get_work(&a1), job42);
    }
}
