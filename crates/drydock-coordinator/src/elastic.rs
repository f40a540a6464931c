//! Elastic-agent provisioning signal.
//!
//! When a runnable job finds no idle agent able to carry it within a bounded
//! wait, a provisioning request is queued for the plugin responsible for that
//! agent type. Fire-and-forget: the plugin collaborator creates the capacity
//! and reports back out-of-band; the coordinator only guarantees the request
//! is queued at least once, correlated to the job.

use dashmap::DashMap;
use drydock_core::JobIdentifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::IdleAgentTopic;

/// Asks a plugin for one agent able to satisfy `resources`, on behalf of `job`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningRequest {
    pub plugin_id: String,
    pub job: JobIdentifier,
    pub resources: Vec<String>,
}

pub struct ElasticProvisioner {
    idle_topic: Arc<IdleAgentTopic>,
    wait: Duration,
    queues: DashMap<String, mpsc::UnboundedSender<ProvisioningRequest>>,
}

impl ElasticProvisioner {
    pub fn new(idle_topic: Arc<IdleAgentTopic>, wait: Duration) -> Self {
        Self {
            idle_topic,
            wait,
            queues: DashMap::new(),
        }
    }

    /// Register the queue for one plugin. The returned receiver is the
    /// plugin's side of the contract; requests sent before registration are
    /// dropped with a warning.
    pub fn register_plugin(
        &self,
        plugin_id: impl Into<String>,
    ) -> mpsc::UnboundedReceiver<ProvisioningRequest> {
        let plugin_id = plugin_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        info!(plugin = %plugin_id, "elastic provisioner registered");
        self.queues.insert(plugin_id, tx);
        rx
    }

    /// Announce demand for an agent able to run `job`. If no matching idle
    /// agent shows up within the configured wait, the plugin is signalled.
    pub fn demand(
        self: &Arc<Self>,
        plugin_id: impl Into<String>,
        job: JobIdentifier,
        resources: Vec<String>,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let request = ProvisioningRequest {
            plugin_id: plugin_id.into(),
            job,
            resources,
        };
        let mut idle = this.idle_topic.watch();
        tokio::spawn(async move {
            let deadline = tokio::time::sleep(this.wait);
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    _ = &mut deadline => {
                        this.enqueue(request);
                        return;
                    }
                    received = idle.recv() => match received {
                        Ok(message) if covers(&message.info.resources, &request.resources) => {
                            debug!(
                                job = %request.job,
                                agent = %message.info.identifier,
                                "idle agent satisfies pending demand"
                            );
                            return;
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // A matching idle event may have been dropped;
                            // keep waiting, the timeout still bounds us.
                            warn!(skipped, job = %request.job, "idle watcher lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            this.enqueue(request);
                            return;
                        }
                    }
                }
            }
        })
    }

    fn enqueue(&self, request: ProvisioningRequest) {
        match self.queues.get(&request.plugin_id) {
            Some(queue) => {
                info!(
                    plugin = %request.plugin_id,
                    job = %request.job,
                    "requesting elastic agent capacity"
                );
                if queue.send(request).is_err() {
                    warn!("elastic provisioner went away; request dropped");
                }
            }
            None => {
                warn!(
                    plugin = %request.plugin_id,
                    job = %request.job,
                    "no elastic provisioner registered; request dropped"
                );
            }
        }
    }
}

fn covers(available: &[String], required: &[String]) -> bool {
    required.iter().all(|r| available.contains(r))
}
