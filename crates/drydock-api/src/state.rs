//! Application state.

use drydock_config::ServerConfig;
use drydock_coordinator::{
    AgentRegistry, ElasticProvisioner, IdleAgentTopic, JobLifecycle, Topic, WorkAssignedTopic,
    WorkAssignments,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state, wired once at startup and passed by handle —
/// there are no process-wide singletons anywhere below this.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub assignments: Arc<WorkAssignments>,
    pub jobs: Arc<JobLifecycle>,
    pub idle_topic: Arc<IdleAgentTopic>,
    /// Schedulers publish their assignment decisions here; the mailbox is the
    /// built-in subscriber.
    pub work_topic: Arc<WorkAssignedTopic>,
    pub elastic: Arc<ElasticProvisioner>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let idle_topic = Arc::new(Topic::new("idle-agent", config.bus_capacity));
        let assignments = Arc::new(WorkAssignments::new(Arc::clone(&idle_topic)));

        let mut work_topic = Topic::new("work-assigned", config.bus_capacity);
        work_topic.subscribe(assignments.clone());
        let work_topic = Arc::new(work_topic);

        let elastic = Arc::new(ElasticProvisioner::new(
            Arc::clone(&idle_topic),
            Duration::from_secs(config.provision_wait_secs),
        ));

        Self {
            registry: Arc::new(AgentRegistry::new()),
            assignments,
            jobs: Arc::new(JobLifecycle::new()),
            idle_topic,
            work_topic,
            elastic,
        }
    }
}
