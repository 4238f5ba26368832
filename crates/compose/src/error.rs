use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("docker CLI {cli:?} does not have the compose plugin installed")]
    MissingComposePlugin { cli: PathBuf },
    #[error(
        "docker CLI {cli:?} has the compose plugin with version {version}; \
         need version {min_version} or later"
    )]
    UnsupportedVersion {
        cli: PathBuf,
        version: String,
        min_version: String,
    },
    #[error("cannot parse compose version {0:?}")]
    InvalidVersion(String),
    #[error("{0:?} is not a directory")]
    ProjectNotDirectory(PathBuf),
    #[error("{dir:?} does not contain {expected}")]
    MissingComposeFile { dir: PathBuf, expected: String },
    #[error("failed to spawn docker process (binary={binary:?}): {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{cmd}` exited with return code {rc}: {stderr}")]
    NonZeroExit { cmd: String, rc: i32, stderr: String },
    #[error("docker output was not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("failed to parse {context} JSON output: {source}")]
    JsonParse {
        context: &'static str,
        stdout: String,
        #[source]
        source: serde_json::Error,
    },
}
