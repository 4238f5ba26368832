use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0:?} is not a docker_swarm inventory file (expected docker_swarm.yml or docker_swarm.yaml)")]
    UnsupportedFile(PathBuf),
    #[error("failed to read inventory config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse inventory config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    #[error("unknown inventory plugin {0:?}")]
    UnknownPlugin(String),
    #[error("unable to parse swarm node data: {0}")]
    NodeParse(#[from] serde_json::Error),
    #[error("keyed group key {key:?} is missing or empty for node {node}")]
    MissingField { node: String, key: String },
    #[error(
        "keyed group key {key:?} of node {node} must be a string, list or mapping, got {value}"
    )]
    InvalidKeyedValue {
        node: String,
        key: String,
        value: String,
    },
}
