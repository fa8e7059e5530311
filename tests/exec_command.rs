// tests/exec_command.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;

use waxwatch::engine::{ActionStatus, BuildRequest};
use waxwatch::exec::{run_shell, ActionCommands, ActionRunner, ToolchainRunner};
use waxwatch::graph::Settings;
use waxwatch::render::PageRenderer;
use waxwatch::types::ActionKind;
use waxwatch_test_utils::builders::SettingsBuilder;
use waxwatch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn successful_command_reports_success() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let report = with_timeout(run_shell(ActionKind::Styles, "echo compiled", dir.path())).await?;

    assert!(report.is_success());
    Ok(())
}

#[tokio::test]
async fn failing_command_reports_code_and_stderr() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let report = with_timeout(run_shell(
        ActionKind::Scripts,
        "echo 'unexpected token' >&2; exit 3",
        dir.path(),
    ))
    .await?;

    assert_eq!(report.status, ActionStatus::Failed { code: Some(3) });
    assert!(report.output.contains("unexpected token"), "{}", report.output);
    Ok(())
}

#[tokio::test]
async fn commands_run_in_the_project_root() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "here")?;
    let settings: Arc<Settings> = Arc::new(SettingsBuilder::new(dir.path()).build());

    let commands = ActionCommands::new().with(ActionKind::Styles, "test -f marker.txt");
    let renderer = PageRenderer::new(Arc::new(waxwatch::fs::RealFileSystem), dir.path().join("build"));
    let mut runner = ToolchainRunner::new(renderer, commands);

    let request = BuildRequest::new(ActionKind::Styles, dir.path().join("a.scss"));
    let report = with_timeout(runner.run_action(&request, settings)).await;

    assert!(report.is_success(), "{report:?}");
    Ok(())
}

#[tokio::test]
async fn unconfigured_action_is_a_no_op() -> TestResult {
    let dir = tempfile::tempdir()?;
    let settings = Arc::new(SettingsBuilder::new(dir.path()).build());
    let renderer = PageRenderer::new(Arc::new(waxwatch::fs::RealFileSystem), dir.path().join("build"));
    let mut runner = ToolchainRunner::new(renderer, ActionCommands::new());

    let request = BuildRequest::new(ActionKind::Scripts, dir.path().join("a.coffee"));
    let report = with_timeout(runner.run_action(&request, settings)).await;

    assert!(report.is_success());
    Ok(())
}
