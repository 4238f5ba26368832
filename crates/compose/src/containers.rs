use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ComposeError;

/// One entry of `docker compose ps --format json`, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawContainer {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Names", default, skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    #[serde(rename = "Labels", default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(rename = "Networks", default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<String>,
    #[serde(rename = "Publishers", default, skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A compose container with the comma-joined CLI fields split into proper collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeContainer {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Names")]
    pub names: Vec<String>,
    #[serde(rename = "Labels")]
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "Networks")]
    pub networks: Vec<String>,
    #[serde(rename = "Publishers")]
    pub publishers: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<RawContainer> for ComposeContainer {
    fn from(raw: RawContainer) -> Self {
        let names = raw
            .names
            .as_deref()
            .unwrap_or(&raw.name)
            .split(',')
            .map(str::to_string)
            .collect();
        let networks = raw
            .networks
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect();
        Self {
            names,
            labels: parse_labels(raw.labels.as_deref().unwrap_or_default()),
            networks,
            publishers: raw.publishers.unwrap_or_default(),
            name: raw.name,
            extra: raw.extra,
        }
    }
}

/// Splits `a=b,c=d,flag` into a map; labels without `=` map to an empty value.
pub fn parse_labels(labels: &str) -> BTreeMap<String, String> {
    if labels.is_empty() {
        return BTreeMap::new();
    }
    labels
        .split(',')
        .map(|part| match part.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

/// Parses output holding a single JSON document (an array for `ps` before 2.21.0).
pub fn parse_json<T: DeserializeOwned>(
    stdout: &str,
    context: &'static str,
) -> Result<T, ComposeError> {
    serde_json::from_str(stdout).map_err(|source| ComposeError::JsonParse {
        context,
        stdout: stdout.to_string(),
        source,
    })
}

/// Parses output holding one JSON document per line; blank lines are skipped.
pub fn parse_json_stream<T: DeserializeOwned>(
    stdout: &str,
    context: &'static str,
) -> Result<Vec<T>, ComposeError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_json(line, context))
        .collect()
}
