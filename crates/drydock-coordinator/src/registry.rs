//! Agent identity and registration.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use drydock_core::{AgentIdentifier, AgentRuntimeInfo, Error, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maps agent UUIDs to their last-known runtime info.
///
/// Constructed once at startup and handed around by reference; the registry
/// is the only writer of `AgentRuntimeInfo`, agents only influence it through
/// RPC calls the server interprets.
pub struct AgentRegistry {
    agents: DashMap<String, AgentRuntimeInfo>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: DashMap::new(),
        }
    }

    /// Upsert the caller's runtime info, keyed by UUID. Called on every ping
    /// and reporting call.
    ///
    /// An agent without a cookie must fetch one first. An agent presenting a
    /// cookie that conflicts with the one on record is a second physical
    /// process claiming the same UUID: the update is refused and the existing
    /// registration left untouched.
    pub fn update(&self, mut info: AgentRuntimeInfo) -> Result<()> {
        if !info.has_cookie() {
            warn!(agent = %info.identifier, "agent has no cookie set");
            return Err(Error::NoCookieSet(info.identifier.to_string()));
        }
        info.last_heard_from = Utc::now();
        match self.agents.entry(info.uuid().to_string()) {
            Entry::Occupied(mut existing) => {
                if info.has_duplicate_cookie(existing.get().cookie.as_deref()) {
                    warn!(
                        agent = %info.identifier,
                        "duplicate unique identifier; check the agent installation"
                    );
                    return Err(Error::DuplicateAgentIdentity(info.identifier.to_string()));
                }
                existing.insert(info);
            }
            Entry::Vacant(slot) => {
                // A cookie we did not issue this process lifetime; accept it
                // as a re-registration after restart.
                info!(agent = %info.identifier, "registering agent");
                slot.insert(info);
            }
        }
        Ok(())
    }

    /// Issue a fresh opaque registration token. Repeated calls return a new
    /// cookie each time; the latest one wins and invalidates prior cookies
    /// for this identifier.
    pub fn assign_cookie(
        &self,
        identifier: &AgentIdentifier,
        location: Option<String>,
    ) -> String {
        let cookie = Uuid::new_v4().to_string();
        match self.agents.entry(identifier.uuid.clone()) {
            Entry::Occupied(mut existing) => {
                let record = existing.get_mut();
                record.cookie = Some(cookie.clone());
                if location.is_some() {
                    record.location = location;
                }
                record.last_heard_from = Utc::now();
            }
            Entry::Vacant(slot) => {
                let mut record = AgentRuntimeInfo::new(identifier.clone(), location);
                record.cookie = Some(cookie.clone());
                slot.insert(record);
            }
        }
        info!(agent = %identifier, "issued registration cookie");
        cookie
    }

    pub fn find(&self, uuid: &str) -> Option<AgentRuntimeInfo> {
        self.agents.get(uuid).map(|record| record.clone())
    }

    pub fn cookie_for(&self, uuid: &str) -> Option<String> {
        self.agents.get(uuid).and_then(|record| record.cookie.clone())
    }

    /// Point-in-time view for the health tracker and operator listing.
    pub fn snapshot(&self) -> Vec<AgentRuntimeInfo> {
        debug!(count = self.agents.len(), "taking registry snapshot");
        self.agents.iter().map(|record| record.clone()).collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_core::AgentStatus;

    fn identifier(uuid: &str) -> AgentIdentifier {
        AgentIdentifier::new("host", "10.0.0.1", uuid)
    }

    #[test]
    fn test_ping_without_cookie_is_refused() {
        let registry = AgentRegistry::new();
        let info = AgentRuntimeInfo::new(identifier("u1"), None);

        let err = registry.update(info).unwrap_err();
        assert!(matches!(err, Error::NoCookieSet(_)));
        assert!(registry.find("u1").is_none());
    }

    #[test]
    fn test_update_stores_runtime_info() {
        let registry = AgentRegistry::new();
        let cookie = registry.assign_cookie(&identifier("u1"), Some("/work".into()));

        let mut info = AgentRuntimeInfo::idle(identifier("u1"), cookie);
        info.status = AgentStatus::Building;
        registry.update(info).unwrap();

        assert_eq!(registry.find("u1").unwrap().status, AgentStatus::Building);
    }

    #[test]
    fn test_duplicate_uuid_is_rejected_without_corrupting_registration() {
        let registry = AgentRegistry::new();
        let cookie_a = registry.assign_cookie(&identifier("u1"), None);
        registry
            .update(AgentRuntimeInfo::idle(identifier("u1"), cookie_a.clone()))
            .unwrap();

        let imposter = AgentRuntimeInfo::idle(
            AgentIdentifier::new("other-host", "10.0.0.9", "u1"),
            "cookie-b",
        );
        let err = registry.update(imposter).unwrap_err();

        assert!(err.is_duplicate_identity());
        let existing = registry.find("u1").unwrap();
        assert_eq!(existing.identifier.host_name, "host");
        assert_eq!(existing.cookie.as_deref(), Some(cookie_a.as_str()));
    }

    #[test]
    fn test_latest_cookie_wins() {
        let registry = AgentRegistry::new();
        let first = registry.assign_cookie(&identifier("u1"), None);
        let second = registry.assign_cookie(&identifier("u1"), None);
        assert_ne!(first, second);

        // The old cookie is now a duplicate identity.
        let stale = AgentRuntimeInfo::idle(identifier("u1"), first);
        assert!(registry.update(stale).unwrap_err().is_duplicate_identity());

        let fresh = AgentRuntimeInfo::idle(identifier("u1"), second);
        registry.update(fresh).unwrap();
    }

    #[test]
    fn test_snapshot_lists_every_registration() {
        let registry = AgentRegistry::new();
        registry.assign_cookie(&identifier("u1"), None);
        registry.assign_cookie(&identifier("u2"), None);
        assert_eq!(registry.snapshot().len(), 2);
    }
}
