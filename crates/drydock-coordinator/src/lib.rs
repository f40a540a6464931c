//! Work assignment and job lifecycle coordination.
//!
//! This crate is the concurrency-bearing core of the server:
//! - `bus`: typed publish/subscribe topics for idle and work-assigned events
//! - `mailbox`: the per-agent single-slot work mailbox
//! - `registry`: agent identity, cookies and duplicate-UUID detection
//! - `jobs`: the job state machine with its cancellation overlay
//! - `elastic`: the provisioning signal for on-demand agent capacity
//!
//! Everything here must be safe under arbitrary concurrent invocation from
//! many agents and many scheduler threads; the shared maps are key-sharded
//! so unrelated agents never serialize through one lock.

pub mod bus;
pub mod elastic;
pub mod jobs;
pub mod mailbox;
pub mod registry;

pub use bus::{
    IdleAgentMessage, IdleAgentTopic, Subscriber, Topic, WorkAssignedMessage, WorkAssignedTopic,
};
pub use elastic::{ElasticProvisioner, ProvisioningRequest};
pub use jobs::JobLifecycle;
pub use mailbox::WorkAssignments;
pub use registry::AgentRegistry;
