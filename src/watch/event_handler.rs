// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use tracing::{debug, info};

use crate::engine::{BuildRequest, EnqueueOutcome};
use crate::events::Notification;
use crate::project::Project;
use crate::resolve::Resolution;
use crate::types::ActionKind;

/// What the pipeline did with one changed path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeOutcome {
    /// The path matched an ignore pattern and was dropped.
    pub ignored: bool,
    /// Requests handed to the scheduler, in order.
    pub enqueued: Vec<(ActionKind, EnqueueOutcome)>,
}

/// Process a single changed path and enqueue the builds it calls for.
///
/// 1. Ignore filter: matching paths only produce `SourceFileIgnored`.
/// 2. Page resolution against one consistent snapshot of the page graph;
///    a Waxfile change reloads the graph first (or reports the parse error
///    and keeps the old graph).
/// 3. Extension routes (styles / scripts), independent of page resolution.
///
/// Never blocks on a running build.
pub fn process_file_change(project: &Project, path: &Path) -> ChangeOutcome {
    let notifier = project.notifier();
    let mut outcome = ChangeOutcome::default();

    if project.ignore().is_ignored(path) {
        debug!(path = %path.display(), "ignored by pattern");
        notifier.emit(Notification::SourceFileIgnored(path.to_path_buf()));
        outcome.ignored = true;
        return outcome;
    }

    notifier.emit(Notification::SourceFileModified(path.to_path_buf()));

    let resolution = project
        .resolver()
        .resolve(project.settings_handle(), project.fs(), path);

    match resolution {
        Resolution::Irrelevant => {}
        Resolution::Pages { pages, classification, .. } if pages.is_empty() => {
            debug!(
                path = %path.display(),
                ?classification,
                "no page references this file; nothing to rebuild"
            );
        }
        Resolution::Pages { pages, .. } => {
            notifier.emit(Notification::PageSourceModified(path.to_path_buf()));
            let result = project.enqueue(BuildRequest::pages(path, pages));
            outcome.enqueued.push((ActionKind::Pages, result));
        }
        Resolution::Reloaded { settings } => {
            info!(pages = settings.pages().len(), "page graph reloaded");
            notifier.emit(Notification::DefinitionChanged(settings.clone()));
            if !settings.pages().is_empty() {
                let result = project.enqueue(BuildRequest::pages(path, settings.pages().to_vec()));
                outcome.enqueued.push((ActionKind::Pages, result));
            }
        }
        Resolution::ReloadFailed { error } => {
            notifier.emit(Notification::ParseError(error.parse_diagnostic()));
        }
    }

    for action in project.routes().route(path) {
        let result = project.enqueue(BuildRequest::new(action, path));
        outcome.enqueued.push((action, result));
    }

    outcome
}
