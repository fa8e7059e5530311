// src/events.rs

//! Notifications the engine sends to its host.
//!
//! Hosts register by calling [`Notifier::subscribe`] and get their own
//! channel; every notification is delivered to every live subscriber.
//! Sending never blocks and never fails: subscribers whose receiver was
//! dropped are pruned on the next send.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::errors::ParseDiagnostic;
use crate::graph::{Page, Settings};
use crate::types::ActionKind;

#[derive(Debug, Clone)]
pub enum Notification {
    /// A filesystem event passed the ignore filter.
    SourceFileModified(PathBuf),
    /// A filesystem event matched an ignore pattern.
    SourceFileIgnored(PathBuf),
    /// A changed file affects at least one page.
    PageSourceModified(PathBuf),
    /// The Waxfile was reloaded successfully.
    DefinitionChanged(Arc<Settings>),
    /// The Waxfile failed to parse; the previous graph stays active.
    ParseError(ParseDiagnostic),
    BuildStarted {
        action: ActionKind,
        pages: Vec<Page>,
    },
    BuildFinished {
        action: ActionKind,
    },
    FullBuildStarted {
        pages: Vec<Page>,
    },
    FullBuildFinished,
    /// A build reported a problem. Does not stop the scheduler.
    BuildError(String),
}

/// Fan-out of [`Notification`]s to any number of subscribers.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Notification>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(_) => warn!("notifier mutex poisoned; subscriber not registered"),
        }
        rx
    }

    pub fn emit(&self, notification: Notification) {
        trace!(?notification, "emitting notification");
        let mut subs = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("notifier mutex poisoned; dropping notification");
                return;
            }
        };
        subs.retain(|tx| tx.send(notification.clone()).is_ok());
    }

    pub fn emit_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        for n in notifications {
            self.emit(n);
        }
    }
}
