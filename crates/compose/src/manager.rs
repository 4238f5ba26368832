use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::{
    aggregate::{self, build_failure_report, extract_actions, has_changes},
    builder::ComposeProjectBuilder,
    containers::{parse_json, parse_json_stream, ComposeContainer, RawContainer},
    events::{parse_events, Event},
    process::{CliRunner, CommandOutput, CommandRequest, ComposeRunner},
    result::{combine_text_output, ComposeResult},
    version::ComposeVersion,
    warnings::WarningSink,
    ComposeError,
};

/// Drives `docker compose` for one project directory.
pub struct ComposeManager<R> {
    pub(crate) runner: R,
    pub(crate) binary: PathBuf,
    pub(crate) project_src: PathBuf,
    pub(crate) project_name: Option<String>,
    pub(crate) env_files: Vec<PathBuf>,
    pub(crate) profiles: Vec<String>,
    pub(crate) compose_version: ComposeVersion,
    pub(crate) check_mode: bool,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) warning_sink: Box<dyn WarningSink + Send>,
}

impl<R: fmt::Debug> fmt::Debug for ComposeManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeManager")
            .field("runner", &self.runner)
            .field("binary", &self.binary)
            .field("project_src", &self.project_src)
            .field("project_name", &self.project_name)
            .field("compose_version", &self.compose_version)
            .field("check_mode", &self.check_mode)
            .finish_non_exhaustive()
    }
}

impl ComposeManager<CliRunner> {
    pub fn builder(project_src: impl Into<PathBuf>) -> ComposeProjectBuilder {
        ComposeProjectBuilder::new(project_src)
    }
}

impl<R: ComposeRunner> ComposeManager<R> {
    pub fn compose_version(&self) -> &ComposeVersion {
        &self.compose_version
    }

    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    /// Arguments shared by every compose subcommand of this project.
    pub fn base_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["compose".into(), "--ansi".into(), "never".into()];
        if self.compose_version.at_least(2, 19, 0) {
            args.extend(["--progress", "plain"].map(String::from));
        }
        args.push("--project-directory".into());
        args.push(self.project_src.to_string_lossy().into_owned());
        if let Some(name) = self.project_name.as_ref() {
            args.push("--project-name".into());
            args.push(name.clone());
        }
        for env_file in &self.env_files {
            args.push("--env-file".into());
            args.push(env_file.to_string_lossy().into_owned());
        }
        for profile in &self.profiles {
            args.push("--profile".into());
            args.push(profile.clone());
        }
        args
    }

    fn request(&self, args: Vec<String>) -> CommandRequest {
        CommandRequest::new(&self.binary)
            .args(args)
            .working_dir(&self.project_src)
            .envs(&self.env)
    }

    async fn run_checked(&self, args: Vec<String>) -> Result<CommandOutput, ComposeError> {
        let request = self.request(args);
        let output = self.runner.run(&request).await?;
        if !output.success() {
            return Err(ComposeError::NonZeroExit {
                cmd: request.display(),
                rc: output.rc,
                stderr: output.stderr_text(),
            });
        }
        Ok(output)
    }

    /// Containers as printed by `docker compose ps`, without normalization.
    pub async fn list_containers_raw(&self) -> Result<Vec<RawContainer>, ComposeError> {
        let mut args = self.base_args();
        args.extend(["ps", "--format", "json", "--all"].map(String::from));
        if self.compose_version.at_least(2, 23, 0) {
            args.push("--no-trunc".into());
        }
        let output = self.run_checked(args).await?;
        let stdout = String::from_utf8(output.stdout)?;
        // 2.21.0 switched `ps --format json` from one array to one object per line.
        if self.compose_version.at_least(2, 21, 0) {
            parse_json_stream(&stdout, "ps")
        } else {
            parse_json(&stdout, "ps")
        }
    }

    pub async fn list_containers(&self) -> Result<Vec<ComposeContainer>, ComposeError> {
        Ok(self
            .list_containers_raw()
            .await?
            .into_iter()
            .map(ComposeContainer::from)
            .collect())
    }

    pub async fn list_images(&self) -> Result<Vec<Value>, ComposeError> {
        let mut args = self.base_args();
        args.extend(["images", "--format", "json"].map(String::from));
        let output = self.run_checked(args).await?;
        let stdout = String::from_utf8(output.stdout)?;
        parse_json(&stdout, "images")
    }

    pub fn parse_events(&mut self, stderr: &str, dry_run: bool) -> Vec<Event> {
        let sink: &mut dyn WarningSink = self.warning_sink.as_mut();
        parse_events(stderr, dry_run, Some(sink))
    }

    pub fn emit_warnings(&mut self, events: &[Event]) {
        let sink: &mut dyn WarningSink = self.warning_sink.as_mut();
        aggregate::emit_warnings(events, sink);
    }

    pub fn update_result(
        &self,
        result: &mut ComposeResult,
        events: &[Event],
        stdout: &str,
        stderr: &str,
    ) {
        result.changed = result.changed || has_changes(events);
        result.actions.extend(extract_actions(events));
        result.stdout = Some(combine_text_output([result.stdout.as_deref(), Some(stdout)]));
        result.stderr = Some(combine_text_output([result.stderr.as_deref(), Some(stderr)]));
    }

    /// Marks `result` as failed when the invocation failed; returns whether it did.
    pub fn update_failed(
        &self,
        result: &mut ComposeResult,
        events: &[Event],
        args: &[String],
        stdout: &str,
        stderr: &str,
        rc: i32,
    ) -> bool {
        let cli = self.binary.to_string_lossy();
        match build_failure_report(events, rc, args, stdout, stderr, &cli) {
            Some(report) => {
                result.apply_failure(report);
                true
            }
            None => false,
        }
    }

    pub fn cleanup_result(&self, result: &mut ComposeResult) {
        result.cleanup();
    }

    /// Runs `docker compose <base args> <args>` and folds its progress output into
    /// `result`. Returns `Ok(true)` when the invocation failed.
    ///
    /// `dry_run` must match whether `args` contain `--dry-run`.
    pub async fn run_subcommand(
        &mut self,
        result: &mut ComposeResult,
        args: impl IntoIterator<Item = impl Into<String>>,
        dry_run: bool,
    ) -> Result<bool, ComposeError> {
        let mut full_args = self.base_args();
        full_args.extend(args.into_iter().map(Into::into));

        let request = self.request(full_args);
        let output = self.runner.run(&request).await?;
        let stdout = output.stdout_text();
        let stderr = output.stderr_text();
        debug!(rc = output.rc, cmd = %request.display(), "docker compose finished");

        let events = self.parse_events(&stderr, dry_run);
        self.emit_warnings(&events);
        self.update_result(result, &events, &stdout, &stderr);
        Ok(self.update_failed(result, &events, &request.args, &stdout, &stderr, output.rc))
    }
}
