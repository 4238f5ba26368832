use std::fmt;

use serde::Serialize;

/// Kind of resource a compose event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Unknown,
    Network,
    Image,
    Volume,
    Container,
    Service,
}

impl ResourceType {
    /// Maps the capitalized resource token printed by `docker compose` on event lines.
    pub fn from_compose_token(token: &str) -> Option<Self> {
        match token {
            "Network" => Some(Self::Network),
            "Image" => Some(Self::Image),
            "Volume" => Some(Self::Volume),
            "Container" => Some(Self::Container),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Unknown => "unknown",
            ResourceType::Network => "network",
            ResourceType::Image => "image",
            ResourceType::Volume => "volume",
            ResourceType::Container => "container",
            ResourceType::Service => "service",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status token printed by `docker compose` next to a resource.
///
/// The variants mirror the literal strings of the CLI output; anything outside this
/// vocabulary is carried as a free-text message instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Started,
    Healthy,
    Exited,
    Restarted,
    Running,
    Created,
    Stopped,
    Killed,
    Removed,
    Recreated,
    Pulled,
    Creating,
    Starting,
    Waiting,
    Restarting,
    Stopping,
    Killing,
    Removing,
    Recreate,
    Pulling,
    Error,
}

/// Terminal success statuses.
pub const DONE: &[Status] = &[
    Status::Started,
    Status::Healthy,
    Status::Exited,
    Status::Restarted,
    Status::Running,
    Status::Created,
    Status::Stopped,
    Status::Killed,
    Status::Removed,
    // containers only
    Status::Recreated,
    // pull events
    Status::Pulled,
];

/// In-progress statuses. Any of these in an event sequence means something changed.
pub const WORKING: &[Status] = &[
    Status::Creating,
    Status::Starting,
    Status::Waiting,
    Status::Restarting,
    Status::Stopping,
    Status::Killing,
    Status::Removing,
    // containers only
    Status::Recreate,
    // pull events
    Status::Pulling,
];

/// Statuses printed on `<service> <status>` image pull lines.
pub const PULL: &[Status] = &[Status::Pulled, Status::Pulling];

/// Terminal failure statuses.
pub const ERROR: &[Status] = &[Status::Error];

const VOCABULARY: &[&[Status]] = &[DONE, WORKING, PULL, ERROR];

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Started => "Started",
            Status::Healthy => "Healthy",
            Status::Exited => "Exited",
            Status::Restarted => "Restarted",
            Status::Running => "Running",
            Status::Created => "Created",
            Status::Stopped => "Stopped",
            Status::Killed => "Killed",
            Status::Removed => "Removed",
            Status::Recreated => "Recreated",
            Status::Pulled => "Pulled",
            Status::Creating => "Creating",
            Status::Starting => "Starting",
            Status::Waiting => "Waiting",
            Status::Restarting => "Restarting",
            Status::Stopping => "Stopping",
            Status::Killing => "Killing",
            Status::Removing => "Removing",
            Status::Recreate => "Recreate",
            Status::Pulling => "Pulling",
            Status::Error => "Error",
        }
    }

    /// Looks `token` up in the recognized vocabulary (exact, case-sensitive match).
    pub fn from_token(token: &str) -> Option<Self> {
        VOCABULARY
            .iter()
            .flat_map(|set| set.iter())
            .copied()
            .find(|status| status.as_str() == token)
    }

    pub fn is_done(&self) -> bool {
        DONE.contains(self)
    }

    pub fn is_working(&self) -> bool {
        WORKING.contains(self)
    }

    pub fn is_pull(&self) -> bool {
        PULL.contains(self)
    }

    pub fn is_error(&self) -> bool {
        ERROR.contains(self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
