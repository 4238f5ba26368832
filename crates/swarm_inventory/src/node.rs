use serde::Deserialize;
use serde_json::Value;

use crate::InventoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Manager,
    Worker,
}

impl NodeRole {
    pub fn group(&self) -> &'static str {
        match self {
            NodeRole::Manager => "manager",
            NodeRole::Worker => "worker",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NodeFields {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Spec")]
    spec: NodeSpec,
    #[serde(rename = "Status")]
    status: NodeStatus,
    #[serde(rename = "ManagerStatus", default)]
    manager_status: Option<ManagerStatus>,
}

#[derive(Debug, Clone, Deserialize)]
struct NodeSpec {
    #[serde(rename = "Role")]
    role: NodeRole,
}

#[derive(Debug, Clone, Deserialize)]
struct NodeStatus {
    #[serde(rename = "Addr")]
    addr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagerStatus {
    #[serde(rename = "Leader", default)]
    pub leader: bool,
    #[serde(rename = "Addr", default)]
    pub addr: String,
}

/// A swarm node as described by `docker node inspect`.
#[derive(Debug, Clone)]
pub struct SwarmNode {
    pub id: String,
    pub role: NodeRole,
    /// Address the node reports in its status.
    pub addr: String,
    pub manager_status: Option<ManagerStatus>,
    /// The full inspect document.
    pub attributes: Value,
}

impl SwarmNode {
    pub fn from_value(attributes: Value) -> Result<Self, InventoryError> {
        let fields = NodeFields::deserialize(&attributes)?;
        Ok(Self {
            id: fields.id,
            role: fields.spec.role,
            addr: fields.status.addr,
            manager_status: fields.manager_status,
            attributes,
        })
    }

    pub fn is_leader(&self) -> bool {
        self.manager_status.as_ref().is_some_and(|status| status.leader)
    }

    /// Address to reach the node at. Leaders use the host of their manager address and
    /// fall back to the status address when that host is empty (moby/moby#35437).
    pub fn reachable_addr(&self) -> &str {
        match self.manager_status.as_ref() {
            Some(status) if status.leader => {
                let host = split_host(&status.addr);
                if host.is_empty() {
                    self.addr.as_str()
                } else {
                    host
                }
            }
            _ => self.addr.as_str(),
        }
    }

    /// Looks up a dotted path such as `Description.Platform.OS` in the attributes.
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.attributes, |value, segment| value.get(segment))
    }
}

/// Parses the JSON array printed by `docker node inspect <id>...`.
pub fn parse_node_inspect(stdout: &str) -> Result<Vec<SwarmNode>, InventoryError> {
    let values: Vec<Value> = serde_json::from_str(stdout)?;
    values.into_iter().map(SwarmNode::from_value).collect()
}

/// Host part of `host:port`, `[v6]:port` or a bare host.
fn split_host(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(host, _)| host);
    }
    match addr.split_once(':') {
        Some((host, port)) if !port.contains(':') => host,
        _ => addr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leader(manager_addr: &str) -> SwarmNode {
        SwarmNode::from_value(json!({
            "ID": "n1",
            "Spec": {"Role": "manager"},
            "Status": {"Addr": "10.0.0.5"},
            "ManagerStatus": {"Leader": true, "Addr": manager_addr}
        }))
        .unwrap()
    }

    #[test]
    fn split_host_variants() {
        assert_eq!(split_host("10.0.0.1:2377"), "10.0.0.1");
        assert_eq!(split_host("[fe80::1]:2377"), "fe80::1");
        assert_eq!(split_host("fe80::1"), "fe80::1");
        assert_eq!(split_host("manager-1"), "manager-1");
        assert_eq!(split_host(":2377"), "");
    }

    #[test]
    fn leader_address_falls_back_to_status() {
        assert_eq!(leader("192.168.1.2:2377").reachable_addr(), "192.168.1.2");
        assert_eq!(leader(":2377").reachable_addr(), "10.0.0.5");
        assert_eq!(leader("").reachable_addr(), "10.0.0.5");
        assert_eq!(leader("0.0.0.0:2377").reachable_addr(), "0.0.0.0");
    }

    #[test]
    fn attribute_paths() {
        let node = SwarmNode::from_value(json!({
            "ID": "w1",
            "Spec": {"Role": "worker", "Labels": {"zone": "a"}},
            "Status": {"Addr": "10.0.0.9"},
            "Description": {"Platform": {"OS": "linux"}}
        }))
        .unwrap();
        assert_eq!(node.role, NodeRole::Worker);
        assert!(!node.is_leader());
        assert_eq!(node.attribute("Description.Platform.OS"), Some(&json!("linux")));
        assert_eq!(node.attribute("Description.Platform.Arch"), None);
    }

    #[test]
    fn missing_role_is_an_error() {
        let err = SwarmNode::from_value(json!({"ID": "x", "Status": {"Addr": "1.2.3.4"}}))
            .unwrap_err();
        assert!(matches!(err, InventoryError::NodeParse(_)));
    }
}
