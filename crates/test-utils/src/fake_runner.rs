use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use waxwatch::engine::{ActionReport, BuildRequest};
use waxwatch::exec::ActionRunner;
use waxwatch::graph::Settings;
use waxwatch::types::ActionKind;

/// One request as the fake runner saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub action: ActionKind,
    pub pages: Vec<String>,
    pub full: bool,
    pub trigger: PathBuf,
    /// Page names of the snapshot the runner was handed.
    pub snapshot_pages: Vec<String>,
}

/// Shared view of what a [`FakeRunner`] did, usable after the runner has
/// been moved into a scheduler.
#[derive(Debug, Clone, Default)]
pub struct FakeRunnerState {
    runs: Arc<Mutex<Vec<RecordedRun>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeRunnerState {
    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<ActionKind> {
        self.runs().into_iter().map(|r| r.action).collect()
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// A fake runner that:
/// - records every request it is handed
/// - optionally sleeps to simulate a slow action
/// - returns success, or a configured report per action kind.
#[derive(Debug, Default)]
pub struct FakeRunner {
    state: FakeRunnerState,
    delay: Duration,
    reports: HashMap<ActionKind, ActionReport>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every run of `action` end with `report`.
    pub fn reporting(mut self, action: ActionKind, report: ActionReport) -> Self {
        self.reports.insert(action, report);
        self
    }

    pub fn failing(self, action: ActionKind, code: i32, output: &str) -> Self {
        self.reporting(action, ActionReport::failed(Some(code), output))
    }

    pub fn state(&self) -> FakeRunnerState {
        self.state.clone()
    }
}

impl ActionRunner for FakeRunner {
    fn run_action<'a>(
        &'a mut self,
        request: &'a BuildRequest,
        settings: Arc<Settings>,
    ) -> Pin<Box<dyn Future<Output = ActionReport> + Send + 'a>> {
        Box::pin(async move {
            let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

            self.state.runs.lock().unwrap().push(RecordedRun {
                action: request.action,
                pages: request.pages.iter().map(|p| p.name().to_string()).collect(),
                full: request.full,
                trigger: request.trigger.clone(),
                snapshot_pages: settings.page_names().iter().map(|s| s.to_string()).collect(),
            });

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.reports
                .get(&request.action)
                .cloned()
                .unwrap_or_else(ActionReport::success)
        })
    }
}
