// src/engine/mod.rs

//! Build scheduling for waxwatch.
//!
//! This module ties together:
//! - the action queue (one pending request per action kind)
//! - the pure scheduler core (queue + "is a build running" state)
//! - the async drain loop that ticks on a fixed interval, dispatches one
//!   request at a time to an [`crate::exec::ActionRunner`] and reports
//!   completion as notifications.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use crate::events::Notification;
use crate::graph::Page;
use crate::types::ActionKind;

pub mod core;
pub mod queue;
pub mod runtime;

pub use core::SchedulerCore;
pub use queue::{ActionQueue, EnqueueOutcome};
pub use runtime::{Scheduler, SchedulerHandle};

/// A request for one action kind to run.
///
/// `trigger` and `requested_at` are kept for diagnostics only; they never
/// influence resolution. `pages` is the affected set computed when the
/// triggering path was resolved.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub action: ActionKind,
    pub trigger: PathBuf,
    pub requested_at: SystemTime,
    pub pages: Vec<Page>,
    /// Full build: render every page plus the page listing.
    pub full: bool,
    /// Time of the most recent event folded into this request.
    pub(crate) last_activity: Instant,
}

impl BuildRequest {
    pub fn new(action: ActionKind, trigger: impl Into<PathBuf>) -> Self {
        Self {
            action,
            trigger: trigger.into(),
            requested_at: SystemTime::now(),
            pages: Vec::new(),
            full: false,
            last_activity: Instant::now(),
        }
    }

    /// Rebuild `pages` because `trigger` changed.
    pub fn pages(trigger: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        let mut request = Self::new(ActionKind::Pages, trigger);
        request.pages = pages;
        request
    }

    /// Manual full rebuild of every page.
    pub fn full(pages: Vec<Page>) -> Self {
        let mut request = Self::pages(PathBuf::new(), pages);
        request.full = true;
        request
    }

    pub fn page_names(&self) -> Vec<&str> {
        self.pages.iter().map(Page::name).collect()
    }

    /// Fold `other` (same action kind) into this request.
    ///
    /// Pages are unioned by name, keeping existing order and appending new
    /// ones. A page already pending is replaced by the incoming value, which
    /// was resolved against a graph at least as new. Returns `true` if
    /// anything was added or replaced.
    pub fn absorb(&mut self, other: BuildRequest) -> bool {
        debug_assert_eq!(self.action, other.action);
        let mut changed = false;

        if other.full && !self.full {
            self.full = true;
            changed = true;
        }

        for page in other.pages {
            match self.pages.iter_mut().find(|p| p.name() == page.name()) {
                Some(pending) if *pending == page => {}
                Some(pending) => {
                    *pending = page;
                    changed = true;
                }
                None => {
                    self.pages.push(page);
                    changed = true;
                }
            }
        }

        self.last_activity = self.last_activity.max(other.last_activity);
        changed
    }

    /// Whether no event has been folded in for at least `settle`.
    pub fn is_settled(&self, now: Instant, settle: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) >= settle
    }

    /// Notification announcing that this request starts executing.
    pub fn started_notification(&self) -> Notification {
        if self.full {
            Notification::FullBuildStarted {
                pages: self.pages.clone(),
            }
        } else {
            Notification::BuildStarted {
                action: self.action,
                pages: self.pages.clone(),
            }
        }
    }
}

/// How an action ended, as far as the scheduler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    /// Non-zero exit (code is `None` when killed by a signal) or an error
    /// before the action could complete.
    Failed { code: Option<i32> },
    /// Exceeded the configured action timeout.
    TimedOut,
}

/// What an [`crate::exec::ActionRunner`] reports back for one request.
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub status: ActionStatus,
    /// Non-fatal problems (e.g. a missing view file) surfaced as build errors
    /// even when the action as a whole succeeded.
    pub diagnostics: Vec<String>,
    /// Captured diagnostic output (stderr) of a failed action.
    pub output: String,
}

impl ActionReport {
    pub fn success() -> Self {
        Self {
            status: ActionStatus::Success,
            diagnostics: Vec::new(),
            output: String::new(),
        }
    }

    pub fn failed(code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Failed { code },
            diagnostics: Vec::new(),
            output: output.into(),
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self {
            status: ActionStatus::TimedOut,
            diagnostics: Vec::new(),
            output: format!("timed out after {}s", after.as_secs_f64()),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

/// Runtime options for the drain loop.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Interval between drain ticks.
    pub tick: Duration,
    /// A request is only dispatched once no event was folded into it for
    /// this long.
    pub settle: Duration,
    /// Upper bound on a single action's run time.
    pub action_timeout: Duration,
    /// Exit once the scheduler is idle and the queue is empty (`--once`).
    pub exit_when_idle: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            settle: Duration::from_millis(100),
            action_timeout: Duration::from_secs(300),
            exit_when_idle: false,
        }
    }
}
