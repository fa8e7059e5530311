// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::engine::BuildRequest;
use crate::types::ActionKind;

/// What happened to a request handed to [`ActionQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// No request of this kind was pending; appended at the back.
    Queued,
    /// A request of this kind was pending; the new one was folded into it.
    Coalesced,
    /// An identical request (same kind, same trigger path, nothing new) was
    /// already pending.
    Rejected,
}

/// FIFO of pending build requests, deduplicated by action kind.
///
/// Semantics:
/// - At most one pending request per [`ActionKind`]. N rapid edits to the
///   same category of artifact collapse into a single run.
/// - A request for a kind that is already pending keeps the pending entry's
///   queue position; its affected pages are merged in so no page is lost.
/// - Different kinds preserve their relative arrival order.
#[derive(Debug, Default)]
pub struct ActionQueue {
    pending: VecDeque<BuildRequest>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no pending requests.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn contains_action(&self, action: ActionKind) -> bool {
        self.pending.iter().any(|r| r.action == action)
    }

    /// Pending action kinds in queue order.
    pub fn pending_actions(&self) -> Vec<ActionKind> {
        self.pending.iter().map(|r| r.action).collect()
    }

    pub fn front(&self) -> Option<&BuildRequest> {
        self.pending.front()
    }

    pub fn enqueue(&mut self, request: BuildRequest) -> EnqueueOutcome {
        let action = request.action;

        let Some(existing) = self.pending.iter_mut().find(|r| r.action == action) else {
            debug!(
                %action,
                trigger = %request.trigger.display(),
                pages = ?request.page_names(),
                "queued build request"
            );
            self.pending.push_back(request);
            return EnqueueOutcome::Queued;
        };

        let same_trigger = existing.trigger == request.trigger;
        let trigger = request.trigger.clone();
        let changed = existing.absorb(request);

        if same_trigger && !changed {
            debug!(%action, trigger = %trigger.display(), "identical request already pending");
            EnqueueOutcome::Rejected
        } else {
            debug!(
                %action,
                trigger = %trigger.display(),
                pages = ?existing.page_names(),
                "coalesced into pending request"
            );
            EnqueueOutcome::Coalesced
        }
    }

    pub fn pop_front(&mut self) -> Option<BuildRequest> {
        self.pending.pop_front()
    }
}
