//! KDL configuration parsing for the drydock coordinator.
//!
//! The server reads a single `drydock.kdl` document covering:
//! - HTTP bind address
//! - Event-bus channel capacity
//! - Elastic-agent provisioning wait

pub mod error;
pub mod server;

pub use error::{ConfigError, ConfigResult};
pub use server::{ServerConfig, load_config, parse_server_config};
