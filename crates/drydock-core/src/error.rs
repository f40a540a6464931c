//! Error taxonomy for the coordination layer.
//!
//! Agents branch on two kinds: a duplicate identity (abandon the current
//! UUID and re-register) and everything else (log and retry with backoff).
//! Expected conditions such as an absent mailbox entry or `NoWork` are normal
//! control flow and never appear here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Two live registrations claim the same UUID with mismatched cookies.
    /// Never silently merged; the caller must force re-registration.
    #[error("agent [{0}] has invalid cookie: duplicate unique identifier")]
    DuplicateAgentIdentity(String),

    /// The agent called in without a cookie; it must fetch one first.
    #[error("agent [{0}] has no cookie set")]
    NoCookieSet(String),

    /// Generic wrapper for internal faults crossing the RPC boundary.
    #[error("remote access failure: {0}")]
    RemoteAccess(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for the one kind the agent must not blindly retry.
    pub fn is_duplicate_identity(&self) -> bool {
        matches!(self, Error::DuplicateAgentIdentity(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
