// tests/page_build.rs

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use waxwatch::engine::RuntimeOptions;
use waxwatch::events::Notification;
use waxwatch::exec::{ActionCommands, ToolchainRunner};
use waxwatch::render::{Mustache, PageRenderer, TemplateEngine};
use waxwatch_test_utils::builders::SampleSite;
use waxwatch_test_utils::{drain_notifications, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn renderer(site: &SampleSite) -> PageRenderer {
    PageRenderer::new(site.shared_fs(), site.output())
}

fn fast_options() -> RuntimeOptions {
    RuntimeOptions {
        tick: Duration::from_millis(5),
        settle: Duration::ZERO,
        action_timeout: Duration::from_secs(2),
        exit_when_idle: true,
    }
}

#[test]
fn data_edit_rerenders_home_with_layout_and_views() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let project = site.open();
    let settings = project.settings();

    site.write("wax/data/home/hero.json", r#"{"tagline": "Fast & small"}"#);
    let pages = project
        .resolver()
        .resolve(project.settings_handle(), project.fs(), &site.path("wax/data/home/hero.json"))
        .pages();

    let summary = renderer(&site).render(&settings, &pages, false);

    assert!(summary.diagnostics.is_empty(), "{:?}", summary.diagnostics);
    assert_eq!(summary.written, vec![site.path("build/Home/index.html")]);

    let html = site
        .read(site.path("build/Home/index.html"))
        .ok_or("Home was not written")?;
    assert!(html.contains("<title>Home</title>"), "{html}");
    assert!(html.contains("<h1>Wax</h1>"), "{html}");
    assert!(html.contains("<p>Fast &amp; small</p>"), "{html}");
    assert!(html.contains("<li>one</li><li>two</li>"), "{html}");

    // Only the affected page is touched.
    assert!(site.read(site.path("build/AboutUs/index.html")).is_none());
    assert!(site.read(site.path("build/Contact/index.html")).is_none());
    Ok(())
}

#[test]
fn contents_in_one_slot_are_joined_in_order() -> TestResult {
    let site = SampleSite::new();
    let settings = site.open().settings();
    let home = settings.page("Home").ok_or("Home missing")?.clone();

    renderer(&site).render(&settings, &[home], false);

    let html = site
        .read(site.path("build/Home/index.html"))
        .ok_or("Home was not written")?;
    assert!(
        html.contains("<main><p>Fast &amp; small</p>\n<ul><li>one</li><li>two</li></ul></main>"),
        "{html}"
    );
    Ok(())
}

#[test]
fn missing_data_file_skips_that_content_only() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    site.remove("wax/data/home/news.json");
    let settings = site.open().settings();
    let home = settings.page("Home").ok_or("Home missing")?.clone();

    let summary = renderer(&site).render(&settings, &[home], false);

    assert_eq!(summary.diagnostics.len(), 1);
    assert!(
        summary.diagnostics[0].contains("Missing data file"),
        "{:?}",
        summary.diagnostics
    );
    assert!(summary.diagnostics[0].contains("home/news.json"));

    let html = site
        .read(site.path("build/Home/index.html"))
        .ok_or("Home should still be written")?;
    assert!(html.contains("<p>Fast &amp; small</p>"), "{html}");
    assert!(!html.contains("<li>"), "{html}");
    Ok(())
}

#[test]
fn invalid_json_data_is_reported() -> TestResult {
    let site = SampleSite::new();
    site.write("wax/data/contact/form.json", "{ not json");
    let settings = site.open().settings();
    let contact = settings.page("Contact").ok_or("Contact missing")?.clone();

    let summary = renderer(&site).render(&settings, &[contact], false);

    assert_eq!(summary.diagnostics.len(), 1);
    assert!(summary.diagnostics[0].contains("invalid data file"), "{:?}", summary.diagnostics);
    assert_eq!(summary.written, vec![site.path("build/Contact/index.html")]);
    Ok(())
}

#[test]
fn missing_layout_writes_nothing() -> TestResult {
    let site = SampleSite::new();
    site.remove("wax/templates/layout.mustache");
    let settings = site.open().settings();

    let summary = renderer(&site).render(&settings, settings.pages(), true);

    assert!(summary.written.is_empty());
    assert_eq!(summary.diagnostics.len(), 1);
    assert!(
        summary.diagnostics[0].contains("Missing layout template file"),
        "{:?}",
        summary.diagnostics
    );
    assert!(site.fs.paths().iter().all(|p| !p.starts_with(site.output())));
    Ok(())
}

#[test]
fn full_build_writes_every_page_and_the_index() -> TestResult {
    let site = SampleSite::new();
    let settings = site.open().settings();

    let summary = renderer(&site).render(&settings, settings.pages(), true);

    assert!(summary.diagnostics.is_empty(), "{:?}", summary.diagnostics);
    assert_eq!(
        summary.written,
        vec![
            site.path("build/Home/index.html"),
            site.path("build/AboutUs/index.html"),
            site.path("build/Contact/index.html"),
            site.path("build/index.html"),
        ]
    );

    let index = site
        .read(site.path("build/index.html"))
        .ok_or("index was not written")?;
    assert!(index.contains("<title>index</title>"), "{index}");
    assert!(index.contains(r#"<a href="AboutUs/index.html">About Us</a>"#), "{index}");

    let contact = site
        .read(site.path("build/Contact/index.html"))
        .ok_or("Contact was not written")?;
    assert!(contact.contains("<form>hi@example.com</form>"), "{contact}");
    assert!(!contact.contains("<h1>"), "{contact}");
    Ok(())
}

#[tokio::test]
async fn full_build_through_the_scheduler_reports_start_and_finish() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let project = site.open_with(site.options().with_runtime(fast_options()));
    let mut rx = project.subscribe();
    let runner = ToolchainRunner::new(renderer(&site), ActionCommands::new());
    let mut scheduler = project.scheduler(runner);

    project.request_full_build();
    scheduler.drain_once().await;

    let notes = drain_notifications(&mut rx);
    match notes.as_slice() {
        [Notification::FullBuildStarted { pages }, Notification::FullBuildFinished] => {
            assert_eq!(pages.len(), 3);
        }
        other => panic!("unexpected notifications {other:?}"),
    }
    assert!(site.read(site.path("build/index.html")).is_some());
    Ok(())
}

#[tokio::test]
async fn render_diagnostics_surface_as_build_errors() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    site.remove("Views/contact/form.mustache");
    let project = site.open_with(site.options().with_runtime(fast_options()));
    let mut rx = project.subscribe();
    let mut scheduler = project.scheduler(ToolchainRunner::new(
        renderer(&site),
        ActionCommands::new(),
    ));

    project.handle_path(&site.path("wax/data/contact/form.json"));
    scheduler.drain_once().await;

    let notes = drain_notifications(&mut rx);
    assert!(notes.iter().any(|n| matches!(
        n,
        Notification::BuildError(message) if message.contains("Missing view file")
    )));
    Ok(())
}

#[tokio::test]
async fn pages_dropped_or_changed_by_a_reload_render_from_the_new_graph() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let project = site.open_with(site.options().with_runtime(fast_options()));
    let mut scheduler = project.scheduler(ToolchainRunner::new(
        renderer(&site),
        ActionCommands::new(),
    ));

    // Home and About Us are queued under the original graph.
    project.handle_path(&site.path("wax/data/shared/header.json"));

    site.write(
        "Waxfile",
        "pages:\n  Home:\n    content:\n      - home/hero: home/hero\n",
    );
    project.handle_path(&site.waxfile());

    scheduler.drain_once().await;

    let home = site
        .read(site.path("build/Home/index.html"))
        .ok_or("Home was not written")?;
    assert!(home.contains("<p>Fast &amp; small</p>"), "{home}");
    assert!(!home.contains("<h1>Wax</h1>"), "{home}");
    assert!(!home.contains("<li>"), "{home}");
    assert!(site.read(site.path("build/AboutUs/index.html")).is_none());
    Ok(())
}

/// Engine that blocks on every render and tracks how many overlap.
#[derive(Debug, Default)]
struct SlowEngine {
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl TemplateEngine for SlowEngine {
    fn render(&self, template: &str, context: &Value) -> anyhow::Result<String> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(150));
        self.active.fetch_sub(1, Ordering::SeqCst);
        Mustache.render(template, context)
    }
}

#[tokio::test]
async fn timed_out_render_stops_before_the_next_action_starts() -> TestResult {
    init_tracing();

    let site = SampleSite::new();
    let options = RuntimeOptions {
        action_timeout: Duration::from_millis(50),
        ..fast_options()
    };
    let project = site.open_with(site.options().with_runtime(options));
    let mut rx = project.subscribe();

    let engine = Arc::new(SlowEngine::default());
    let shared: Arc<dyn TemplateEngine> = engine.clone();
    let runner = ToolchainRunner::new(renderer(&site).with_engine(shared), ActionCommands::new());
    let mut scheduler = project.scheduler(runner);

    // Layout change: every page is queued, Home renders first.
    project.handle_path(&site.path("wax/templates/layout.mustache"));
    with_timeout(scheduler.drain_once()).await;

    assert!(project.scheduler_handle().is_idle());
    assert_eq!(engine.active.load(Ordering::SeqCst), 0);
    assert!(site.read(site.path("build/Contact/index.html")).is_none());
    assert!(drain_notifications(&mut rx).iter().any(|n| matches!(
        n,
        Notification::BuildError(message) if message.contains("timed out")
    )));

    project.handle_path(&site.path("wax/data/contact/form.json"));
    with_timeout(scheduler.drain_once()).await;

    assert_eq!(engine.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active.load(Ordering::SeqCst), 0);
    Ok(())
}
