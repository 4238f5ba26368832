use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    config::{InventoryConfig, KeyedGroup},
    node::SwarmNode,
    InventoryError,
};

pub const GROUP_ALL: &str = "all";
pub const GROUP_MANAGER: &str = "manager";
pub const GROUP_WORKER: &str = "worker";
pub const GROUP_LEADER: &str = "leader";
pub const GROUP_NONLEADERS: &str = "nonleaders";

/// Host groups plus per-host variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub groups: BTreeMap<String, BTreeSet<String>>,
    pub hostvars: BTreeMap<String, Map<String, Value>>,
}

impl Inventory {
    pub fn add_group(&mut self, group: &str) {
        self.groups.entry(group.to_string()).or_default();
    }

    /// Adds `host` to `all` and, when given, to `group`.
    pub fn add_host(&mut self, host: &str, group: Option<&str>) {
        for group in std::iter::once(GROUP_ALL).chain(group) {
            self.groups
                .entry(group.to_string())
                .or_default()
                .insert(host.to_string());
        }
        self.hostvars.entry(host.to_string()).or_default();
    }

    pub fn set_variable(&mut self, host: &str, key: &str, value: impl Into<Value>) {
        self.hostvars
            .entry(host.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn hosts(&self, group: &str) -> Vec<&str> {
        self.groups
            .get(group)
            .map(|hosts| hosts.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn variable(&self, host: &str, key: &str) -> Option<&Value> {
        self.hostvars.get(host)?.get(key)
    }
}

/// Builds the inventory for `nodes` as configured.
pub fn build_inventory(
    config: &InventoryConfig,
    nodes: &[SwarmNode],
) -> Result<Inventory, InventoryError> {
    let mut inventory = Inventory::default();
    for group in [
        GROUP_ALL,
        GROUP_MANAGER,
        GROUP_WORKER,
        GROUP_LEADER,
        GROUP_NONLEADERS,
    ] {
        inventory.add_group(group);
    }

    let port = config.host_uri_port();
    for node in nodes {
        debug!(node = %node.id, role = node.role.group(), "adding swarm node");
        let id = node.id.as_str();
        inventory.add_host(id, Some(node.role.group()));

        let addr = node.reachable_addr();
        inventory.set_variable(id, "ansible_host", addr);
        if config.include_host_uri {
            inventory.set_variable(id, "ansible_host_uri", format!("tcp://{addr}:{port}"));
        }
        if config.verbose_output {
            inventory.set_variable(id, "docker_swarm_node_attributes", node.attributes.clone());
        }

        let position = if node.is_leader() {
            GROUP_LEADER
        } else {
            GROUP_NONLEADERS
        };
        inventory.add_host(id, Some(position));

        for keyed in &config.keyed_groups {
            for group in keyed_group_names(keyed, node, config.strict)? {
                inventory.add_host(id, Some(group.as_str()));
            }
        }
    }
    Ok(inventory)
}

fn keyed_group_names(
    keyed: &KeyedGroup,
    node: &SwarmNode,
    strict: bool,
) -> Result<Vec<String>, InventoryError> {
    let value = match node.attribute(&keyed.key) {
        Some(value) if !is_empty_key(value) => value,
        _ if strict => {
            return Err(InventoryError::MissingField {
                node: node.id.clone(),
                key: keyed.key.clone(),
            })
        }
        _ => return Ok(Vec::new()),
    };

    let values: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| scalar_text(v).map(|v| format!("{k}{}{v}", keyed.separator)))
            .collect(),
        other => {
            return Err(InventoryError::InvalidKeyedValue {
                node: node.id.clone(),
                key: keyed.key.clone(),
                value: other.to_string(),
            })
        }
    };

    Ok(values
        .into_iter()
        .map(|value| safe_group_name(&format!("{}{}{}", keyed.prefix, keyed.separator, value)))
        .collect())
}

/// Null, `""`, `false` and zero. Empty lists and maps are not empty keys; they just
/// yield no group names.
fn is_empty_key(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Replaces every character that is not valid in a group name with `_`.
pub fn safe_group_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_always_join_all() {
        let mut inventory = Inventory::default();
        inventory.add_host("h1", Some("web"));
        inventory.add_host("h1", None);
        assert_eq!(inventory.hosts("all"), vec!["h1"]);
        assert_eq!(inventory.hosts("web"), vec!["h1"]);
        assert!(inventory.hosts("db").is_empty());
    }

    #[test]
    fn group_names_are_sanitized() {
        assert_eq!(safe_group_name("label_com.example/tier"), "label_com_example_tier");
        assert_eq!(safe_group_name("os_linux"), "os_linux");
    }
}
