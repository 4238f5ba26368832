use std::{collections::BTreeMap, fmt, path::PathBuf};

use crate::{
    manager::ComposeManager,
    process::{CliRunner, ComposeRunner},
    version::ComposeVersion,
    warnings::{TracingSink, WarningSink},
    ComposeError,
};

const DOCKER_BINARY_ENV: &str = "DOCKER_BINARY";
const DEFAULT_DOCKER: &str = "docker";
const DEFAULT_MIN_VERSION: &str = "2.18.0";

/// File names `docker compose` looks for in the project directory.
pub const COMPOSE_FILES: [&str; 2] = ["docker-compose.yml", "docker-compose.yaml"];

pub struct ComposeProjectBuilder {
    pub(crate) project_src: PathBuf,
    pub(crate) project_name: Option<String>,
    pub(crate) env_files: Vec<PathBuf>,
    pub(crate) profiles: Vec<String>,
    pub(crate) binary: Option<PathBuf>,
    pub(crate) compose_version: Option<String>,
    pub(crate) min_version: String,
    pub(crate) check_mode: bool,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) warning_sink: Box<dyn WarningSink + Send>,
}

impl fmt::Debug for ComposeProjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeProjectBuilder")
            .field("project_src", &self.project_src)
            .field("project_name", &self.project_name)
            .field("binary", &self.binary)
            .field("compose_version", &self.compose_version)
            .field("min_version", &self.min_version)
            .finish_non_exhaustive()
    }
}

impl ComposeProjectBuilder {
    pub fn new(project_src: impl Into<PathBuf>) -> Self {
        Self {
            project_src: project_src.into(),
            project_name: None,
            env_files: Vec::new(),
            profiles: Vec::new(),
            binary: None,
            compose_version: None,
            min_version: DEFAULT_MIN_VERSION.to_string(),
            check_mode: false,
            env: BTreeMap::new(),
            warning_sink: Box::new(TracingSink),
        }
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_files.push(path.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self
    }

    /// Docker CLI to invoke. Falls back to `$DOCKER_BINARY`, then `docker` on `PATH`.
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Version of the compose plugin, as reported by the docker CLI. Leaving it unset
    /// means the plugin is not installed.
    pub fn compose_version(mut self, version: impl Into<String>) -> Self {
        self.compose_version = Some(version.into());
        self
    }

    pub fn min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = version.into();
        self
    }

    pub fn check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn warning_sink(mut self, sink: impl WarningSink + Send + 'static) -> Self {
        self.warning_sink = Box::new(sink);
        self
    }

    pub fn build(self) -> Result<ComposeManager<CliRunner>, ComposeError> {
        self.build_with_runner(CliRunner)
    }

    pub fn build_with_runner<R: ComposeRunner>(
        self,
        runner: R,
    ) -> Result<ComposeManager<R>, ComposeError> {
        let binary = resolve_binary(self.binary);

        let raw_version = self
            .compose_version
            .ok_or_else(|| ComposeError::MissingComposePlugin {
                cli: binary.clone(),
            })?;
        let compose_version = ComposeVersion::parse(&raw_version)?;
        let min_version = ComposeVersion::parse(&self.min_version)?;
        if compose_version < min_version {
            return Err(ComposeError::UnsupportedVersion {
                cli: binary,
                version: compose_version.to_string(),
                min_version: min_version.to_string(),
            });
        }

        if !self.project_src.is_dir() {
            return Err(ComposeError::ProjectNotDirectory(self.project_src));
        }
        if !COMPOSE_FILES
            .iter()
            .any(|name| self.project_src.join(name).is_file())
        {
            return Err(ComposeError::MissingComposeFile {
                dir: self.project_src,
                expected: COMPOSE_FILES.join(" or "),
            });
        }

        Ok(ComposeManager {
            runner,
            binary,
            project_src: self.project_src,
            project_name: self.project_name,
            env_files: self.env_files,
            profiles: self.profiles,
            compose_version,
            check_mode: self.check_mode,
            env: self.env,
            warning_sink: self.warning_sink,
        })
    }
}

fn resolve_binary(explicit: Option<PathBuf>) -> PathBuf {
    pick_binary(explicit, std::env::var(DOCKER_BINARY_ENV).ok())
}

/// Explicit path, then a non-blank `$DOCKER_BINARY`, then `docker` from `PATH`.
fn pick_binary(explicit: Option<PathBuf>, from_env: Option<String>) -> PathBuf {
    explicit
        .or_else(|| {
            from_env
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER))
}
