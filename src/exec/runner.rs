// src/exec/runner.rs

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::engine::{ActionReport, BuildRequest};
use crate::exec::command::run_shell;
use crate::graph::{Page, Settings};
use crate::render::{PageRenderer, RenderSummary};
use crate::types::ActionKind;

/// Trait abstracting how a dequeued build request is carried out.
///
/// Production code uses [`ToolchainRunner`]; tests provide their own
/// implementation that records requests instead of touching the disk.
///
/// The scheduler awaits the returned future to completion before
/// dispatching the next request, so implementations never run
/// concurrently with themselves.
pub trait ActionRunner: Send {
    fn run_action<'a>(
        &'a mut self,
        request: &'a BuildRequest,
        settings: Arc<Settings>,
    ) -> Pin<Box<dyn Future<Output = ActionReport> + Send + 'a>>;

    /// Called after the future from [`run_action`](Self::run_action) was
    /// dropped on timeout. Resolves once no work from that request is still
    /// running, so the next request never overlaps it.
    fn abandon<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}

/// Shell command configured per action kind.
#[derive(Debug, Clone, Default)]
pub struct ActionCommands {
    commands: BTreeMap<ActionKind, String>,
}

impl ActionCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: ActionKind, cmd: impl Into<String>) -> Self {
        self.commands.insert(action, cmd.into());
        self
    }

    pub fn get(&self, action: ActionKind) -> Option<&str> {
        self.commands.get(&action).map(String::as_str)
    }
}

/// Runner used by the CLI host.
///
/// - `Pages`: renders the requested pages in process (on a blocking
///   thread), then runs the optional pages command.
/// - `Styles` / `Scripts`: runs the configured external toolchain command.
///
/// Commands run in the project root of the snapshot they are given.
#[derive(Debug)]
pub struct ToolchainRunner {
    renderer: PageRenderer,
    commands: ActionCommands,
    in_flight: Option<InFlightRender>,
}

/// A blocking render whose awaiting future may have been dropped.
#[derive(Debug)]
struct InFlightRender {
    handle: JoinHandle<RenderSummary>,
    cancel: Arc<AtomicBool>,
}

impl ToolchainRunner {
    pub fn new(renderer: PageRenderer, commands: ActionCommands) -> Self {
        Self {
            renderer,
            commands,
            in_flight: None,
        }
    }

    async fn run_command(&self, action: ActionKind, settings: &Settings) -> ActionReport {
        let Some(cmd) = self.commands.get(action) else {
            debug!(%action, "no command configured; nothing to run");
            return ActionReport::success();
        };

        match run_shell(action, cmd, settings.root()).await {
            Ok(report) => report,
            Err(err) => {
                error!(%action, error = %err, "action execution error");
                ActionReport::failed(None, format!("{err:#}"))
            }
        }
    }

    /// Cancel and wait out a render left behind by a dropped future.
    async fn join_abandoned(&mut self) {
        let Some(render) = self.in_flight.take() else {
            return;
        };
        render.cancel.store(true, Ordering::Release);
        if let Err(err) = render.handle.await {
            warn!(error = %err, "abandoned page render task failed");
        }
        debug!("abandoned page render finished");
    }

    async fn run_pages(&mut self, request: &BuildRequest, settings: Arc<Settings>) -> ActionReport {
        self.join_abandoned().await;

        let renderer = self.renderer.clone();
        let pages = current_pages(request, &settings);
        let full = request.full;
        let snapshot = Arc::clone(&settings);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = tokio::task::spawn_blocking(move || {
            renderer.render_until(&snapshot, &pages, full, &flag)
        });
        // Stays recorded until joined, so a timeout that drops this future
        // leaves the render reachable from `abandon`.
        let render = self.in_flight.insert(InFlightRender { handle, cancel });
        let joined = (&mut render.handle).await;
        self.in_flight = None;

        let summary = match joined {
            Ok(summary) => summary,
            Err(err) => {
                error!(error = %err, "page render task failed");
                return ActionReport::failed(None, format!("page render task failed: {err}"));
            }
        };

        self.run_command(ActionKind::Pages, &settings)
            .await
            .with_diagnostics(summary.diagnostics)
    }
}

/// The request's pages as they exist in `settings`.
///
/// Pages removed from the Waxfile since the request was queued are dropped;
/// the rest are taken from the snapshot. A full build renders every page of
/// the snapshot.
fn current_pages(request: &BuildRequest, settings: &Settings) -> Vec<Page> {
    if request.full {
        return settings.pages().to_vec();
    }
    request
        .pages
        .iter()
        .filter_map(|queued| {
            let page = settings.page(queued.name()).cloned();
            if page.is_none() {
                debug!(page = %queued.name(), "page no longer in the Waxfile; skipping");
            }
            page
        })
        .collect()
}

impl ActionRunner for ToolchainRunner {
    fn run_action<'a>(
        &'a mut self,
        request: &'a BuildRequest,
        settings: Arc<Settings>,
    ) -> Pin<Box<dyn Future<Output = ActionReport> + Send + 'a>> {
        Box::pin(async move {
            match request.action {
                ActionKind::Pages => self.run_pages(request, settings).await,
                action => self.run_command(action, &settings).await,
            }
        })
    }

    fn abandon<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.join_abandoned())
    }
}
