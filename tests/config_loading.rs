// tests/config_loading.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use waxwatch::config::{load_and_validate, load_from_path, load_or_default, validate_config};
use waxwatch::errors::WaxError;
use waxwatch::graph::ProjectLayout;
use waxwatch::types::ActionKind;
use waxwatch_test_utils::builders::ConfigFileBuilder;
use waxwatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join("Waxwatch.toml");
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn empty_file_yields_conventional_defaults() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = write_config(&dir, "")?;
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.base_dir(), dir.path());
    assert_eq!(cfg.definition_path(), dir.path().join("Waxfile"));
    assert_eq!(cfg.output_dir(), dir.path().join("build"));
    assert_eq!(cfg.layout, ProjectLayout::default());

    let options = cfg.runtime_options(false);
    assert_eq!(options.tick, Duration::from_millis(250));
    assert_eq!(options.settle, Duration::from_millis(100));
    assert_eq!(options.action_timeout, Duration::from_secs(300));

    let routes = cfg.action_routes();
    assert_eq!(routes.route(Path::new("a/b.scss")), vec![ActionKind::Styles]);
    assert_eq!(routes.route(Path::new("a/b.coffee")), vec![ActionKind::Scripts]);
    assert!(routes.route(Path::new("a/b.json")).is_empty());

    let commands = cfg.action_commands();
    assert!(commands.get(ActionKind::Pages).is_none());
    assert!(commands.get(ActionKind::Styles).is_some_and(|c| c.starts_with("compass")));
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        &dir,
        r#"
[project]
definition = "site/Waxfile"
output = "out"
ignore = ["\\.tmp$"]
tick_ms = 50
settle_ms = 0

[layout]
views = "templates/views"

[action.styles]
cmd = "sass in.scss out.css"
extensions = ["scss", "sass"]

[action.scripts]
cmd = "true"
extensions = ["coffee"]
enabled = false
"#,
    )?;
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.definition_path(), dir.path().join("site/Waxfile"));
    assert_eq!(cfg.output_dir(), dir.path().join("out"));
    assert_eq!(cfg.project.ignore, vec![r"\.tmp$".to_string()]);
    assert_eq!(cfg.runtime_options(true).settle, Duration::ZERO);
    assert!(cfg.runtime_options(true).exit_when_idle);
    assert_eq!(cfg.layout.views, "templates/views/");
    assert_eq!(cfg.layout.data, "wax/data/");

    let routes = cfg.action_routes();
    assert_eq!(routes.route(Path::new("x.sass")), vec![ActionKind::Styles]);
    assert!(routes.route(Path::new("x.coffee")).is_empty());
    assert!(cfg.action_commands().get(ActionKind::Scripts).is_none());
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(&dir, "[project\ntick_ms = 1")?;

    assert!(matches!(load_from_path(&path), Err(WaxError::TomlError(_))));
    Ok(())
}

#[test]
fn explicit_missing_path_is_an_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.toml");

    assert!(matches!(load_or_default(&missing), Err(WaxError::IoError(_))));
    Ok(())
}

#[test]
fn invalid_values_are_config_errors() {
    let cases = [
        ConfigFileBuilder::new().with_tick_ms(0).try_build(),
        ConfigFileBuilder::new().with_ignore("(unclosed").try_build(),
        ConfigFileBuilder::new()
            .with_action(ActionKind::Styles, "  ", &["scss"])
            .try_build(),
        ConfigFileBuilder::new()
            .with_action(ActionKind::Scripts, "coffee -c", &[])
            .try_build(),
        ConfigFileBuilder::new()
            .with_layout(ProjectLayout {
                data: "Views/".to_string(),
                ..ProjectLayout::default()
            })
            .try_build(),
    ];

    for (i, result) in cases.into_iter().enumerate() {
        assert!(
            matches!(result, Err(WaxError::ConfigError(_))),
            "case {i} should be rejected: {result:?}"
        );
    }
}

#[test]
fn pages_command_needs_no_extensions() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_action(ActionKind::Pages, "echo rendered", &[])
        .without_action(ActionKind::Scripts)
        .try_build()?;

    validate_config(&cfg)?;
    assert_eq!(cfg.action_commands().get(ActionKind::Pages), Some("echo rendered"));
    assert!(cfg.action_routes().route(Path::new("a.coffee")).is_empty());
    Ok(())
}
