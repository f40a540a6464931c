//! In-process event bus.
//!
//! Two delivery styles share one topic: registered subscribers are invoked
//! synchronously on the publisher's task, and `watch()` hands out a broadcast
//! receiver for async observers (schedulers, the elastic waiter). Synchronous
//! delivery means two publications for the same agent reach a subscriber in
//! publication order; the mailbox's key-scoped locking serializes whatever
//! races remain between publisher threads.

use drydock_core::{AgentIdentifier, AgentRuntimeInfo, Work};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Notification that an agent polled with nothing to do.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleAgentMessage {
    pub info: AgentRuntimeInfo,
}

/// A scheduler's decision to hand `work` to `agent`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkAssignedMessage {
    pub agent: AgentIdentifier,
    pub work: Work,
}

/// A synchronous consumer registered on a topic.
pub trait Subscriber<M>: Send + Sync {
    fn on_message(&self, message: &M);
}

/// A named topic carrying messages of one type.
pub struct Topic<M> {
    name: &'static str,
    subscribers: Vec<Arc<dyn Subscriber<M>>>,
    watchers: broadcast::Sender<M>,
}

pub type IdleAgentTopic = Topic<IdleAgentMessage>;
pub type WorkAssignedTopic = Topic<WorkAssignedMessage>;

impl<M: Clone + Send + 'static> Topic<M> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (watchers, _) = broadcast::channel(capacity);
        Self {
            name,
            subscribers: Vec::new(),
            watchers,
        }
    }

    /// Register a synchronous subscriber. Subscription happens once during
    /// wiring, before the topic is shared.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber<M>>) {
        self.subscribers.push(subscriber);
    }

    /// Async observation; slow watchers may lag and drop old messages.
    pub fn watch(&self) -> broadcast::Receiver<M> {
        self.watchers.subscribe()
    }

    pub fn publish(&self, message: M) {
        debug!(topic = self.name, "publishing");
        for subscriber in &self.subscribers {
            subscriber.on_message(&message);
        }
        // No watchers is normal; broadcast::send only errs on zero receivers.
        let _ = self.watchers.send(message);
    }
}
