use std::{cmp::Ordering, fmt, path::Path};

use semver::Version;
use tracing::debug;

use crate::{
    process::{CommandRequest, ComposeRunner},
    ComposeError,
};

/// Version reported by the compose CLI plugin.
///
/// Plugin versions come in loose shapes (`v2.24.5`, `2.21.0-desktop.1`, `2.20`), so only
/// the leading numeric components take part in comparisons.
#[derive(Debug, Clone)]
pub struct ComposeVersion {
    version: Version,
    raw: String,
}

impl ComposeVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let version = Version::new(major, minor, patch);
        Self {
            raw: version.to_string(),
            version,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ComposeError> {
        let trimmed = raw.trim().trim_start_matches('v');
        let mut parts = [0u64; 3];
        let mut seen = 0;
        for (idx, component) in trimmed.split('.').take(3).enumerate() {
            let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            parts[idx] = digits
                .parse()
                .map_err(|_| ComposeError::InvalidVersion(raw.to_string()))?;
            seen += 1;
            if digits.len() != component.len() {
                break;
            }
        }
        if seen == 0 {
            return Err(ComposeError::InvalidVersion(raw.to_string()));
        }
        Ok(Self {
            version: Version::new(parts[0], parts[1], parts[2]),
            raw: trimmed.to_string(),
        })
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn at_least(&self, major: u64, minor: u64, patch: u64) -> bool {
        self.version >= Version::new(major, minor, patch)
    }
}

impl PartialEq for ComposeVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ComposeVersion {}

impl PartialOrd for ComposeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComposeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for ComposeVersion {
    /// Shows the version as the plugin reported it, minus a leading `v`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Asks the docker CLI for its compose plugin version.
///
/// Returns `Ok(None)` when the CLI runs but has no usable compose plugin.
pub async fn detect_compose_version<R: ComposeRunner>(
    runner: &R,
    binary: &Path,
) -> Result<Option<String>, ComposeError> {
    let request = CommandRequest::new(binary).args(["compose", "version", "--short"]);
    let output = runner.run(&request).await?;
    if !output.success() {
        debug!(rc = output.rc, "docker compose plugin not available");
        return Ok(None);
    }
    let version = output.stdout_text().trim().to_string();
    Ok((!version.is_empty()).then_some(version))
}
