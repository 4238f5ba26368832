use std::{collections::BTreeMap, future::Future, path::PathBuf, process::Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::{aggregate::render_command, ComposeError};

/// A single CLI invocation: binary, argv and the environment to run it in.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl CommandRequest {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Shell-quoted rendering used in logs and error messages.
    pub fn display(&self) -> String {
        render_command(&self.binary.to_string_lossy(), &self.args)
    }
}

/// Raw result of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub rc: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.rc == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Executes CLI invocations on behalf of [`crate::ComposeManager`].
///
/// Process supervision (timeouts, cancellation, output streaming) belongs to the
/// implementor; the manager only needs the finished output.
pub trait ComposeRunner {
    fn run(
        &self,
        request: &CommandRequest,
    ) -> impl Future<Output = Result<CommandOutput, ComposeError>> + Send;
}

/// Runs commands as local child processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliRunner;

impl ComposeRunner for CliRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, ComposeError> {
        let mut cmd = Command::new(&request.binary);
        cmd.args(&request.args);
        if let Some(dir) = request.working_dir.as_ref() {
            cmd.current_dir(dir);
        }
        apply_env(&mut cmd, &request.env);
        cmd.stdin(Stdio::null());

        debug!(cmd = %request.display(), "running docker");
        let output = cmd.output().await.map_err(|source| ComposeError::Spawn {
            binary: request.binary.clone(),
            source,
        })?;

        Ok(CommandOutput {
            rc: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

pub(crate) fn apply_env(command: &mut Command, env: &BTreeMap<String, String>) {
    for (k, v) in env {
        command.env(k, v);
    }
}
