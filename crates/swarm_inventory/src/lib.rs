#![forbid(unsafe_code)]
//! Dynamic inventory of Docker Swarm nodes.
//!
//! Node descriptions come from `docker node inspect`; fetching them is left to the
//! caller. [`build_inventory`] sorts the nodes into the `manager`, `worker`, `leader`
//! and `nonleaders` groups and sets `ansible_host` for each of them.

mod config;
mod error;
mod inventory;
mod node;

pub use config::{verify_file, InventoryConfig, KeyedGroup, PLUGIN_NAMES};
pub use error::InventoryError;
pub use inventory::{
    build_inventory, safe_group_name, Inventory, GROUP_ALL, GROUP_LEADER, GROUP_MANAGER,
    GROUP_NONLEADERS, GROUP_WORKER,
};
pub use node::{parse_node_inspect, ManagerStatus, NodeRole, SwarmNode};
