//! Agent identity and runtime bookkeeping.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::JobIdentifier;

/// Immutable identity of a physical agent process.
///
/// The UUID is the registry and mailbox key; host name and IP are carried for
/// operator display and duplicate diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{host_name} [{ip_address}, {uuid}]")]
pub struct AgentIdentifier {
    pub host_name: String,
    pub ip_address: String,
    pub uuid: String,
}

impl AgentIdentifier {
    pub fn new(
        host_name: impl Into<String>,
        ip_address: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            host_name: host_name.into(),
            ip_address: ip_address.into(),
            uuid: uuid.into(),
        }
    }
}

/// Last-observed status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Building,
    Cancelled,
    LostContact,
    Unknown,
}

/// Mutable per-agent bookkeeping owned by the coordination layer.
///
/// Created on first successful registration, updated on every ping, read by
/// schedulers and the health tracker. Agents never mutate this directly; the
/// server interprets their RPC calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRuntimeInfo {
    pub identifier: AgentIdentifier,
    pub status: AgentStatus,
    /// Server-issued registration token. Present once the agent has called
    /// get-cookie; the latest issued cookie is the only valid one.
    pub cookie: Option<String>,
    /// Working directory / install location reported by the agent.
    pub location: Option<String>,
    /// Capability tags the agent advertises, matched against job requirements.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Job the agent reports it is currently executing, if any.
    #[serde(default)]
    pub building: Option<JobIdentifier>,
    /// Stamped by the registry on every update; the health tracker infers
    /// liveness from this, the coordinator itself does not.
    #[serde(default = "Utc::now")]
    pub last_heard_from: DateTime<Utc>,
}

impl AgentRuntimeInfo {
    pub fn new(identifier: AgentIdentifier, location: Option<String>) -> Self {
        Self {
            identifier,
            status: AgentStatus::Unknown,
            cookie: None,
            location,
            resources: Vec::new(),
            building: None,
            last_heard_from: Utc::now(),
        }
    }

    /// An idle agent with a cookie already issued, as it appears on a ping.
    pub fn idle(identifier: AgentIdentifier, cookie: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Idle,
            cookie: Some(cookie.into()),
            ..Self::new(identifier, None)
        }
    }

    pub fn uuid(&self) -> &str {
        &self.identifier.uuid
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    /// True when this agent presents a cookie that conflicts with the one on
    /// record for its UUID: the duplicate-UUID condition.
    pub fn has_duplicate_cookie(&self, on_record: Option<&str>) -> bool {
        match (self.cookie.as_deref(), on_record) {
            (Some(mine), Some(recorded)) => mine != recorded,
            _ => false,
        }
    }
}

/// Response to an agent heartbeat: whether its current job was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInstruction {
    pub cancelled: bool,
}

impl AgentInstruction {
    pub const NONE: AgentInstruction = AgentInstruction { cancelled: false };
    pub const CANCEL: AgentInstruction = AgentInstruction { cancelled: true };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier() -> AgentIdentifier {
        AgentIdentifier::new("agent01", "10.0.0.7", "uuid-1")
    }

    #[test]
    fn test_duplicate_cookie_detection() {
        let info = AgentRuntimeInfo::idle(identifier(), "cookie-a");
        assert!(!info.has_duplicate_cookie(Some("cookie-a")));
        assert!(info.has_duplicate_cookie(Some("cookie-b")));
        // Nothing on record yet: not a conflict, just unregistered.
        assert!(!info.has_duplicate_cookie(None));
    }

    #[test]
    fn test_cookieless_info_never_conflicts() {
        let info = AgentRuntimeInfo::new(identifier(), None);
        assert!(!info.has_cookie());
        assert!(!info.has_duplicate_cookie(Some("cookie-a")));
    }
}
