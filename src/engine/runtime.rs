// src/engine/runtime.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::events::Notifier;
use crate::exec::ActionRunner;
use crate::resolve::SettingsHandle;
use crate::types::ActionKind;

use super::core::SchedulerCore;
use super::queue::EnqueueOutcome;
use super::{ActionReport, BuildRequest, RuntimeOptions};

/// Shared access to the scheduler state.
///
/// Producers (the watch pipeline, manual full builds) enqueue through a
/// clone of this handle from any thread; the drain loop pops from it.
#[derive(Debug, Clone, Default)]
pub struct SchedulerHandle {
    core: Arc<Mutex<SchedulerCore>>,
}

impl SchedulerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerCore> {
        self.core
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn enqueue(&self, request: BuildRequest) -> EnqueueOutcome {
        self.lock().enqueue(request)
    }

    /// No action is currently executing.
    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    /// Idle and nothing pending.
    pub fn is_quiescent(&self) -> bool {
        let core = self.lock();
        core.is_idle() && core.queue_is_empty()
    }

    pub fn running(&self) -> Option<ActionKind> {
        self.lock().running()
    }

    pub fn pending(&self) -> usize {
        self.lock().pending()
    }

    pub fn pending_actions(&self) -> Vec<ActionKind> {
        self.lock().pending_actions()
    }

    fn with_core<T>(&self, f: impl FnOnce(&mut SchedulerCore) -> T) -> T {
        f(&mut self.lock())
    }
}

/// Drains the action queue one request at a time.
///
/// This is the IO shell around [`SchedulerCore`]: it ticks on a fixed
/// interval, asks the core for the next settled request, runs it through an
/// [`ActionRunner`] under a timeout, and emits the resulting notifications.
/// The lock on the core is never held across an `.await`.
pub struct Scheduler<R: ActionRunner> {
    handle: SchedulerHandle,
    runner: R,
    settings: SettingsHandle,
    notifier: Notifier,
    options: RuntimeOptions,
}

impl<R: ActionRunner> fmt::Debug for Scheduler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("handle", &self.handle)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: ActionRunner> Scheduler<R> {
    pub fn new(
        handle: SchedulerHandle,
        runner: R,
        settings: SettingsHandle,
        notifier: Notifier,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            handle,
            runner,
            settings,
            notifier,
            options,
        }
    }

    pub fn handle(&self) -> &SchedulerHandle {
        &self.handle
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run at most one pending request to completion.
    ///
    /// Returns the action kind that ran, or `None` if nothing was ready.
    pub async fn drain_once(&mut self) -> Option<ActionKind> {
        let request = self
            .handle
            .with_core(|core| core.begin_next(Instant::now(), self.options.settle))?;

        self.notifier.emit(request.started_notification());
        info!(
            action = %request.action,
            full = request.full,
            pages = ?request.page_names(),
            "build started"
        );

        // Page rendering reads the graph as of dispatch time.
        let snapshot = self.settings.load();
        let limit = self.options.action_timeout;
        let outcome = time::timeout(limit, self.runner.run_action(&request, snapshot)).await;
        let report = match outcome {
            Ok(report) => report,
            Err(_) => {
                warn!(action = %request.action, ?limit, "action timed out");
                // The core still counts this request as running until any
                // work it left behind has stopped.
                self.runner.abandon().await;
                ActionReport::timed_out(limit)
            }
        };

        if report.is_success() {
            info!(action = %request.action, "build finished");
        } else {
            warn!(action = %request.action, status = ?report.status, "build failed");
        }

        let notifications = self.handle.with_core(|core| core.finish(&request, &report));
        self.notifier.emit_all(notifications);
        Some(request.action)
    }

    /// Main drain loop.
    ///
    /// Stops when `shutdown` receives a message or is closed, or, with
    /// `exit_when_idle`, once nothing is running or pending. A request that
    /// is executing when shutdown arrives finishes first.
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(tick = ?self.options.tick, "scheduler started");

        let mut ticker = time::interval(self.options.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => {
                    info!("shutdown requested; stopping scheduler");
                    break;
                }
            }

            if let Some(action) = self.drain_once().await {
                debug!(%action, pending = self.handle.pending(), "drain tick complete");
            }

            if self.options.exit_when_idle && self.handle.is_quiescent() {
                info!("queue drained; exiting");
                break;
            }
        }

        Ok(())
    }
}

impl<R: ActionRunner + 'static> Scheduler<R> {
    /// Spawn [`Scheduler::run`] onto the Tokio runtime.
    pub fn spawn(self, shutdown: mpsc::Receiver<()>) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(shutdown))
    }
}
