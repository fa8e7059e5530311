// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod project;
pub mod render;
pub mod resolve;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::events::Notification;
use crate::exec::ToolchainRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::Settings;
use crate::project::{Project, ProjectOptions};
use crate::render::PageRenderer;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the initial Waxfile parse
/// - notification printing
/// - the drain loop and its toolchain runner
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let options = ProjectOptions::from_config(&cfg, args.once)?;
    let project = Arc::new(Project::open(Arc::clone(&fs), options)?);

    if args.dry_run {
        print_dry_run(&cfg, &project.settings());
        return Ok(());
    }

    let printer = spawn_printer(project.subscribe());

    let renderer = PageRenderer::new(Arc::clone(&fs), cfg.output_dir());
    let runner = ToolchainRunner::new(renderer, cfg.action_commands());

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        Some(project.watch()?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = shutdown_tx.send(()).await;
    });

    if !args.no_initial_build {
        project.request_full_build();
    } else if args.once {
        info!("--once with --no-initial-build: nothing to do");
        return Ok(());
    }

    info!(root = %project.root().display(), "waxwatch running");
    project.scheduler(runner).run(shutdown_rx).await?;

    if args.once {
        // Last notifier reference; lets the printer drain and finish.
        drop(project);
        let _ = printer.await;
    }
    Ok(())
}

/// Print every notification on stdout, one line each.
fn spawn_printer(mut rx: mpsc::UnboundedReceiver<Notification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            match describe(&notification) {
                Some(line) => println!("[waxwatch] {line}"),
                None => debug!(?notification, "notification"),
            }
        }
    })
}

fn describe(notification: &Notification) -> Option<String> {
    let line = match notification {
        Notification::SourceFileModified(_) | Notification::SourceFileIgnored(_) => return None,
        Notification::PageSourceModified(path) => format!("changed {}", path.display()),
        Notification::DefinitionChanged(settings) => {
            format!("Waxfile reloaded ({} pages)", settings.pages().len())
        }
        Notification::ParseError(diag) => {
            warn!(%diag, "Waxfile parse error");
            format!("Waxfile error: {diag}")
        }
        Notification::BuildStarted { action, pages } if pages.is_empty() => {
            format!("building {action}")
        }
        Notification::BuildStarted { action, pages } => {
            let names: Vec<&str> = pages.iter().map(|p| p.name()).collect();
            format!("building {action}: {}", names.join(", "))
        }
        Notification::BuildFinished { action } => format!("{action} done"),
        Notification::FullBuildStarted { pages } => format!("full build ({} pages)", pages.len()),
        Notification::FullBuildFinished => "full build done".to_string(),
        Notification::BuildError(message) => format!("error: {message}"),
    };
    Some(line)
}

/// Simple dry-run output: print the layout, actions and page graph.
fn print_dry_run(cfg: &ConfigFile, settings: &Settings) {
    println!("waxwatch dry-run");
    println!("  root = {}", settings.root().display());
    println!("  output = {}", cfg.output_dir().display());
    let layout = settings.layout();
    println!("  templates = {}", layout.templates);
    println!("  data = {} (*.{})", layout.data, layout.data_extension);
    println!("  views = {} (*.{})", layout.views, layout.view_extension);
    println!();

    let commands = cfg.action_commands();
    println!("actions:");
    for kind in types::ActionKind::ALL {
        match commands.get(kind) {
            Some(cmd) => println!("  - {kind}: {cmd}"),
            None => println!("  - {kind}: (none)"),
        }
    }
    println!();

    if !settings.symlinks().is_empty() {
        println!("symlinks: {:?}", settings.symlinks());
    }

    println!("pages ({}):", settings.pages().len());
    for page in settings.pages() {
        println!("  - {} -> {}", page.name(), page.output_url());
        for (slot, content) in page.iter_contents() {
            println!("      {slot}: {} <- {}", content.view_path(), content.data_path());
        }
    }

    debug!("dry-run complete (no execution)");
}
