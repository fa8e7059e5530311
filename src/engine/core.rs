// src/engine/core.rs

//! Pure scheduler state machine.
//!
//! `SchedulerCore` owns the pending queue and the "which action is running"
//! state. It performs no IO and knows nothing about Tokio: the drain loop in
//! [`super::runtime`] asks it for the next request, runs it, and feeds the
//! report back in to get the notifications to emit.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::queue::{ActionQueue, EnqueueOutcome};
use crate::engine::{ActionReport, ActionStatus, BuildRequest};
use crate::errors::WaxError;
use crate::events::Notification;
use crate::types::ActionKind;

#[derive(Debug, Default)]
pub struct SchedulerCore {
    queue: ActionQueue,
    running: Option<ActionKind>,
}

impl SchedulerCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    pub fn running(&self) -> Option<ActionKind> {
        self.running
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_actions(&self) -> Vec<ActionKind> {
        self.queue.pending_actions()
    }

    pub fn enqueue(&mut self, request: BuildRequest) -> EnqueueOutcome {
        self.queue.enqueue(request)
    }

    /// Pop the next request if no action is running and the head of the
    /// queue has settled. Marks that action as running.
    pub fn begin_next(&mut self, now: Instant, settle: Duration) -> Option<BuildRequest> {
        if self.running.is_some() {
            return None;
        }

        if !self.queue.front()?.is_settled(now, settle) {
            return None;
        }

        let request = self.queue.pop_front()?;
        self.running = Some(request.action);
        debug!(action = %request.action, "dispatching build request");
        Some(request)
    }

    /// Mark the running action as done and produce the notifications that
    /// describe its outcome.
    pub fn finish(&mut self, request: &BuildRequest, report: &ActionReport) -> Vec<Notification> {
        self.running = None;

        let mut notifications: Vec<Notification> = report
            .diagnostics
            .iter()
            .cloned()
            .map(Notification::BuildError)
            .collect();

        match report.status {
            ActionStatus::Success if request.full => {
                notifications.push(Notification::FullBuildFinished);
            }
            ActionStatus::Success => {
                notifications.push(Notification::BuildFinished {
                    action: request.action,
                });
            }
            ActionStatus::Failed { code } => {
                let mut message = match code {
                    Some(code) => format!("exited with code {code}"),
                    None => "did not complete".to_string(),
                };
                let output = report.output.trim();
                if !output.is_empty() {
                    message.push_str(": ");
                    message.push_str(output);
                }
                notifications.push(failure(request.action, message));
            }
            ActionStatus::TimedOut => {
                notifications.push(failure(request.action, report.output.clone()));
            }
        }

        notifications
    }
}

fn failure(action: ActionKind, message: String) -> Notification {
    Notification::BuildError(WaxError::ActionFailure { action, message }.to_string())
}
