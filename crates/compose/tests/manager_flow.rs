use std::{
    fs,
    sync::{Arc, Mutex},
};

use compose::{
    CommandOutput, CommandRequest, ComposeError, ComposeManager, ComposeResult, ComposeRunner,
    ResourceType, Status,
};
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
struct FakeRunner {
    output: CommandOutput,
    seen: Arc<Mutex<Vec<CommandRequest>>>,
}

impl FakeRunner {
    fn new(rc: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            output: CommandOutput {
                rc,
                stdout: stdout.as_bytes().to_vec(),
                stderr: stderr.as_bytes().to_vec(),
            },
            seen: Arc::default(),
        }
    }

    fn last_args(&self) -> Vec<String> {
        self.seen.lock().unwrap().last().expect("a request").args.clone()
    }
}

impl ComposeRunner for FakeRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, ComposeError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.output.clone())
    }
}

fn project_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").expect("write");
    dir
}

fn manager(
    dir: &TempDir,
    version: &str,
    runner: FakeRunner,
) -> (ComposeManager<FakeRunner>, Arc<Mutex<Vec<String>>>) {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink_warnings = Arc::clone(&warnings);
    let manager = ComposeManager::builder(dir.path())
        .binary("docker")
        .compose_version(version)
        .project_name("demo")
        .env_file("/etc/demo.env")
        .profile("debug")
        .warning_sink(move |msg: String| sink_warnings.lock().unwrap().push(msg))
        .build_with_runner(runner)
        .expect("manager");
    (manager, warnings)
}

#[test]
fn base_args_follow_plugin_version() {
    let dir = project_dir();
    let src = dir.path().to_string_lossy().into_owned();

    let (old, _) = manager(&dir, "2.18.1", FakeRunner::default());
    assert_eq!(
        old.base_args(),
        vec![
            "compose",
            "--ansi",
            "never",
            "--project-directory",
            src.as_str(),
            "--project-name",
            "demo",
            "--env-file",
            "/etc/demo.env",
            "--profile",
            "debug",
        ]
    );

    let (new, _) = manager(&dir, "v2.19.0", FakeRunner::default());
    assert_eq!(&new.base_args()[3..5], ["--progress", "plain"]);
}

#[tokio::test]
async fn list_containers_reads_json_stream() {
    let dir = project_dir();
    let stdout = concat!(
        r#"{"Name":"demo-web-1","Labels":"com.docker.compose.service=web","Networks":"demo_default","Publishers":[{"PublishedPort":8080}],"State":"running"}"#,
        "\n",
        r#"{"Name":"demo-db-1","Names":"demo-db-1","Publishers":null,"State":"exited"}"#,
        "\n"
    );
    let runner = FakeRunner::new(0, stdout, "");
    let (manager, _) = manager(&dir, "2.23.0", runner.clone());

    let containers = manager.list_containers().await.expect("containers");
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].labels["com.docker.compose.service"], "web");
    assert_eq!(containers[0].publishers.len(), 1);
    assert_eq!(containers[1].networks, vec![""]);

    let args = runner.last_args();
    assert!(args.ends_with(&[
        "ps".to_string(),
        "--format".to_string(),
        "json".to_string(),
        "--all".to_string(),
        "--no-trunc".to_string(),
    ]));
}

#[tokio::test]
async fn list_containers_reads_json_array_before_2_21() {
    let dir = project_dir();
    let runner = FakeRunner::new(0, r#"[{"Name":"demo-web-1"}]"#, "");
    let (manager, _) = manager(&dir, "2.20.3", runner.clone());

    let containers = manager.list_containers().await.expect("containers");
    assert_eq!(containers[0].names, vec!["demo-web-1"]);
    assert_eq!(runner.last_args().last().map(String::as_str), Some("--all"));
}

#[tokio::test]
async fn listing_fails_on_non_zero_exit() {
    let dir = project_dir();
    let runner = FakeRunner::new(1, "", "no such project");
    let (manager, _) = manager(&dir, "2.24.0", runner);

    let err = manager.list_images().await.unwrap_err();
    match err {
        ComposeError::NonZeroExit { rc, stderr, .. } => {
            assert_eq!(rc, 1);
            assert_eq!(stderr, "no such project");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn subcommand_results_accumulate() {
    let dir = project_dir();
    let stderr = "Container demo-web-1 Recreate\nContainer demo-web-1 Recreated\nVolume demo_data volume is in use\n";
    let runner = FakeRunner::new(0, "", stderr);
    let (mut manager, warnings) = manager(&dir, "2.24.0", runner.clone());

    let mut result = ComposeResult::new();
    let failed = manager
        .run_subcommand(&mut result, ["up", "--detach"], false)
        .await
        .expect("run");
    assert!(!failed);
    assert!(result.changed);
    assert_eq!(result.actions.len(), 1);
    assert_eq!(result.actions[0].what, ResourceType::Container);
    assert_eq!(result.actions[0].status, Status::Recreate);
    assert_eq!(
        *warnings.lock().unwrap(),
        vec!["Docker compose: volume demo_data: volume is in use".to_string()]
    );
    assert_eq!(runner.last_args().last().map(String::as_str), Some("--detach"));

    manager.cleanup_result(&mut result);
    assert_eq!(result.stdout, None);
    assert_eq!(result.stderr.as_deref(), Some(stderr));
}

#[tokio::test]
async fn subcommand_failure_is_recorded() {
    let dir = project_dir();
    let runner = FakeRunner::new(1, "", "Container demo-db-1 Error\nport is already allocated\n");
    let (mut manager, _) = manager(&dir, "2.24.0", runner);

    let mut result = ComposeResult::new();
    let failed = manager
        .run_subcommand(&mut result, ["up"], false)
        .await
        .expect("run");
    assert!(failed);
    assert!(result.failed);
    assert_eq!(result.rc, Some(1));
    assert_eq!(
        result.msg.as_deref(),
        Some("Error when processing container demo-db-1: port is already allocated")
    );
    assert!(result.cmd.as_deref().unwrap().starts_with("docker compose --ansi never"));
}

#[cfg(unix)]
mod unix {
    use std::{fs, os::unix::fs::PermissionsExt};

    use compose::{detect_compose_version, CliRunner, CommandRequest, ComposeRunner};
    use tempfile::TempDir;

    fn fake_docker(dir: &TempDir, name: &str, script: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, script).expect("write script");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[tokio::test]
    async fn cli_runner_collects_output_and_code() {
        let dir = TempDir::new().expect("temp dir");
        let docker = fake_docker(
            &dir,
            "fake-docker",
            "#!/bin/sh\necho \"args: $*\"\necho \"Container x Started\" >&2\nexit 3\n",
        );

        let request = CommandRequest::new(&docker).args(["compose", "up"]);
        let output = CliRunner.run(&request).await.expect("run");
        assert_eq!(output.rc, 3);
        assert_eq!(output.stdout_text().trim(), "args: compose up");
        assert_eq!(output.stderr_text().trim(), "Container x Started");
    }

    #[tokio::test]
    async fn detects_plugin_version() {
        let dir = TempDir::new().expect("temp dir");
        let docker = fake_docker(
            &dir,
            "fake-docker",
            "#!/bin/sh\nif [ \"$1 $2 $3\" = \"compose version --short\" ]; then echo 2.24.6; exit 0; fi\nexit 1\n",
        );
        let version = detect_compose_version(&CliRunner, &docker).await.expect("detect");
        assert_eq!(version.as_deref(), Some("2.24.6"));

        let broken = fake_docker(
            &dir,
            "no-plugin-docker",
            "#!/bin/sh\necho 'unknown command' >&2\nexit 1\n",
        );
        let version = detect_compose_version(&CliRunner, &broken).await.expect("detect");
        assert_eq!(version, None);
    }
}
