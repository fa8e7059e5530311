// tests/settings_reload.rs

use std::error::Error;
use std::sync::Arc;

use waxwatch::engine::EnqueueOutcome;
use waxwatch::events::Notification;
use waxwatch::graph::ProjectLayout;
use waxwatch::resolve::{Resolution, Resolver, SettingsHandle};
use waxwatch::types::ActionKind;
use waxwatch_test_utils::builders::{SampleSite, SAMPLE_WAXFILE};
use waxwatch_test_utils::{drain_notifications, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

const BLOG_PAGE: &str = r#"
  Blog:
    content:
      - blog/list: blog/posts
"#;

fn waxfile_with_blog() -> String {
    format!("{SAMPLE_WAXFILE}{BLOG_PAGE}")
}

#[test]
fn waxfile_change_reloads_and_affects_all_new_pages() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let handle = SettingsHandle::open(&site.fs, site.waxfile(), &ProjectLayout::default())?;
    let before = handle.load();

    site.write("Waxfile", &waxfile_with_blog());
    let resolution = Resolver::default().resolve(&handle, &site.fs, &site.waxfile());

    let Resolution::Reloaded { settings } = resolution else {
        panic!("expected a reload");
    };
    assert_eq!(settings.page_names(), vec!["Home", "About Us", "Contact", "Blog"]);
    assert!(Arc::ptr_eq(&settings, &handle.load()));

    // A snapshot taken before the reload is untouched.
    assert_eq!(before.page_names(), vec!["Home", "About Us", "Contact"]);
    Ok(())
}

#[test]
fn parse_failure_keeps_the_previous_graph() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let handle = SettingsHandle::open(&site.fs, site.waxfile(), &ProjectLayout::default())?;
    let before = handle.load();

    site.write("Waxfile", "pages:\n  Home: [broken\n");
    let resolution = Resolver::default().resolve(&handle, &site.fs, &site.waxfile());

    match resolution {
        Resolution::ReloadFailed { error } => {
            let diag = error.parse_diagnostic();
            assert!(diag.line.is_some(), "{diag:?}");
        }
        other => panic!("expected a failed reload, got {other:?}"),
    }
    assert!(Arc::ptr_eq(&before, &handle.load()));
    Ok(())
}

#[test]
fn missing_waxfile_on_reload_is_reported_not_fatal() -> TestResult {
    let site = SampleSite::new();
    let handle = SettingsHandle::open(&site.fs, site.waxfile(), &ProjectLayout::default())?;

    site.remove("Waxfile");
    assert!(handle.reload(&site.fs).is_err());
    assert_eq!(handle.load().pages().len(), 3);
    Ok(())
}

#[test]
fn project_pipeline_reports_reload_and_enqueues_every_page() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let project = site.open();
    let mut rx = project.subscribe();

    site.write("Waxfile", &waxfile_with_blog());
    let outcome = project.handle_path(&site.waxfile());

    assert_eq!(outcome.enqueued, vec![(ActionKind::Pages, EnqueueOutcome::Queued)]);

    let notes = drain_notifications(&mut rx);
    assert!(matches!(notes[0], Notification::SourceFileModified(_)));
    match &notes[1] {
        Notification::DefinitionChanged(settings) => assert_eq!(settings.pages().len(), 4),
        other => panic!("expected DefinitionChanged, got {other:?}"),
    }
    assert_eq!(project.scheduler_handle().pending_actions(), vec![ActionKind::Pages]);
    Ok(())
}

#[test]
fn project_pipeline_reports_parse_errors_without_scheduling() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let project = site.open();
    let mut rx = project.subscribe();

    site.write("Waxfile", "pages: [\n");
    let outcome = project.handle_path(&site.waxfile());

    assert!(outcome.enqueued.is_empty());
    let notes = drain_notifications(&mut rx);
    assert!(notes.iter().any(|n| matches!(n, Notification::ParseError(_))));
    assert!(!notes.iter().any(|n| matches!(n, Notification::DefinitionChanged(_))));
    assert_eq!(project.scheduler_handle().pending(), 0);
    assert_eq!(project.settings().pages().len(), 3);
    Ok(())
}

#[test]
fn readers_never_observe_a_partial_graph() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let handle = SettingsHandle::open(&site.fs, site.waxfile(), &ProjectLayout::default())?;
    let with_blog = waxfile_with_blog();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let handle = handle.clone();
            scope.spawn(move || {
                for _ in 0..200 {
                    let snapshot = handle.load();
                    let names = snapshot.page_names();
                    assert!(
                        names == ["Home", "About Us", "Contact"]
                            || names == ["Home", "About Us", "Contact", "Blog"],
                        "unexpected snapshot {names:?}"
                    );
                }
            });
        }

        for i in 0..50 {
            let contents = if i % 2 == 0 { with_blog.as_str() } else { SAMPLE_WAXFILE };
            site.write("Waxfile", contents);
            handle.reload(&site.fs).expect("both definitions are valid");
        }
    });
    Ok(())
}
