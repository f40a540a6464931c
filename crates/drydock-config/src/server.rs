//! Server configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coordinator-wide configuration.
///
/// ```kdl
/// server {
///     bind "0.0.0.0:8153"
/// }
/// bus {
///     capacity 256
/// }
/// elastic {
///     provision-wait-secs 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: String,
    /// Broadcast capacity of each event-bus topic.
    pub bus_capacity: usize,
    /// How long to wait for an idle agent before signalling the elastic
    /// provisioner.
    pub provision_wait_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8153".to_string(),
            bus_capacity: 256,
            provision_wait_secs: 30,
        }
    }
}

/// Load configuration from a file, falling back to defaults if it is absent.
pub fn load_config(path: &Path) -> ConfigResult<ServerConfig> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_server_config(&text)
}

/// Parse server configuration from KDL text.
pub fn parse_server_config(kdl: &str) -> ConfigResult<ServerConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = ServerConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "server" => {
                if let Some(bind) = get_child_string(node, "bind") {
                    config.bind = bind;
                }
            }
            "bus" => {
                if let Some(capacity) = get_child_integer(node, "capacity")? {
                    if capacity == 0 {
                        return Err(ConfigError::InvalidValue {
                            field: "bus capacity".to_string(),
                            message: "must be greater than zero".to_string(),
                        });
                    }
                    config.bus_capacity = capacity as usize;
                }
            }
            "elastic" => {
                if let Some(wait) = get_child_integer(node, "provision-wait-secs")? {
                    config.provision_wait_secs = wait;
                }
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn get_child_string(node: &KdlNode, name: &str) -> Option<String> {
    let child = node.children()?.nodes().iter().find(|n| n.name().value() == name)?;
    get_first_string_arg(child)
}

fn get_child_integer(node: &KdlNode, name: &str) -> ConfigResult<Option<u64>> {
    let Some(children) = node.children() else {
        return Ok(None);
    };
    let Some(child) = children.nodes().iter().find(|n| n.name().value() == name) else {
        return Ok(None);
    };
    let value = child
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: name.to_string(),
            message: "expected an integer argument".to_string(),
        })?;
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            field: name.to_string(),
            message: "must not be negative".to_string(),
        });
    }
    Ok(Some(value as u64))
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let kdl = r#"
            server {
                bind "127.0.0.1:9000"
            }
            bus {
                capacity 64
            }
            elastic {
                provision-wait-secs 5
            }
        "#;
        let config = parse_server_config(kdl).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.bus_capacity, 64);
        assert_eq!(config.provision_wait_secs, 5);
    }

    #[test]
    fn test_missing_nodes_fall_back_to_defaults() {
        let config = parse_server_config("server {\n}\n").unwrap();
        let defaults = ServerConfig::default();
        assert_eq!(config.bind, defaults.bind);
        assert_eq!(config.bus_capacity, defaults.bus_capacity);
    }

    #[test]
    fn test_zero_bus_capacity_is_rejected() {
        let kdl = "bus {\n capacity 0\n}\n";
        assert!(matches!(
            parse_server_config(kdl),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            parse_server_config("server {"),
            Err(ConfigError::Parse(_))
        ));
    }
}
