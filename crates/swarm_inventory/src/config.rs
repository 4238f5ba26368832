use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::InventoryError;

/// Names accepted in the `plugin` field of the inventory file.
pub const PLUGIN_NAMES: [&str; 2] = ["docker_swarm", "community.docker.docker_swarm"];

const FILE_SUFFIXES: [&str; 2] = ["docker_swarm.yaml", "docker_swarm.yml"];

/// Returns whether `path` names a file this inventory source can consume.
pub fn verify_file(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| FILE_SUFFIXES.iter().any(|suffix| p.ends_with(suffix)))
}

/// Contents of a `docker_swarm.yml` inventory file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryConfig {
    pub plugin: String,
    #[serde(alias = "docker_url")]
    pub docker_host: String,
    #[serde(default = "default_true")]
    pub verbose_output: bool,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, alias = "tls_verify")]
    pub validate_certs: bool,
    #[serde(default, alias = "tls_client_key", alias = "key_path")]
    pub client_key: Option<PathBuf>,
    #[serde(
        default,
        alias = "ca_cert",
        alias = "tls_ca_cert",
        alias = "cacert_path"
    )]
    pub ca_path: Option<PathBuf>,
    #[serde(default, alias = "tls_client_cert", alias = "cert_path")]
    pub client_cert: Option<PathBuf>,
    #[serde(default)]
    pub tls_hostname: Option<String>,
    #[serde(default)]
    pub ssl_version: Option<String>,
    #[serde(default, alias = "docker_api_version")]
    pub api_version: Option<String>,
    /// Seconds to wait for the daemon API.
    #[serde(default = "default_timeout", alias = "time_out")]
    pub timeout: u64,
    #[serde(default)]
    pub use_ssh_client: bool,
    #[serde(default)]
    pub include_host_uri: bool,
    #[serde(default)]
    pub include_host_uri_port: Option<u16>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub keyed_groups: Vec<KeyedGroup>,
}

/// Groups hosts by the value found at a dotted path in the node attributes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyedGroup {
    /// Dotted path such as `Description.Platform.OS`.
    pub key: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    60
}

fn default_separator() -> String {
    "_".to_string()
}

impl InventoryConfig {
    pub fn from_yaml(text: &str) -> Result<Self, InventoryError> {
        let config: Self = serde_yaml::from_str(text)?;
        if !PLUGIN_NAMES.contains(&config.plugin.as_str()) {
            return Err(InventoryError::UnknownPlugin(config.plugin));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        if !verify_file(path) {
            return Err(InventoryError::UnsupportedFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| InventoryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Port used in `ansible_host_uri`: explicit override, else the TLS or plain daemon port.
    pub fn host_uri_port(&self) -> u16 {
        match self.include_host_uri_port {
            Some(port) => port,
            None if self.tls || self.validate_certs => 2376,
            None => 2375,
        }
    }
}
