// src/project.rs

//! The explicit context object a host owns.
//!
//! A `Project` bundles the live page graph, the resolver, the scheduler
//! queue and the notifier. There is no global state: a host creates one
//! `Project`, subscribes for notifications, starts a drain loop with
//! [`Project::scheduler`] and (optionally) a watcher with [`Project::watch`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::engine::{BuildRequest, EnqueueOutcome, RuntimeOptions, Scheduler, SchedulerHandle};
use crate::errors::Result;
use crate::events::{Notification, Notifier};
use crate::exec::ActionRunner;
use crate::fs::FileSystem;
use crate::graph::{ProjectLayout, Settings};
use crate::resolve::{Resolver, SettingsHandle, DEFAULT_DEFINITION_NAME};
use crate::watch::{
    process_file_change, spawn_watcher, ActionRoutes, ChangeOutcome, IgnoreSet, WatcherHandle,
};

/// Everything needed to open a [`Project`].
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    pub definition: PathBuf,
    pub layout: ProjectLayout,
    pub ignore: IgnoreSet,
    pub routes: ActionRoutes,
    pub runtime: RuntimeOptions,
}

impl ProjectOptions {
    pub fn new(definition: impl Into<PathBuf>) -> Self {
        Self {
            definition: definition.into(),
            layout: ProjectLayout::default(),
            ignore: IgnoreSet::default(),
            routes: ActionRoutes::default(),
            runtime: RuntimeOptions::default(),
        }
    }

    pub fn with_layout(mut self, layout: ProjectLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_routes(mut self, routes: ActionRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeOptions) -> Self {
        self.runtime = runtime;
        self
    }

    /// Options described by a validated host config.
    pub fn from_config(cfg: &ConfigFile, exit_when_idle: bool) -> Result<Self> {
        let ignore = IgnoreSet::new(&cfg.project.ignore)?;
        Ok(Self::new(cfg.definition_path())
            .with_layout(cfg.layout.clone())
            .with_ignore(ignore)
            .with_routes(cfg.action_routes())
            .with_runtime(cfg.runtime_options(exit_when_idle)))
    }
}

#[derive(Debug)]
pub struct Project {
    fs: Arc<dyn FileSystem>,
    settings: SettingsHandle,
    resolver: Resolver,
    scheduler: SchedulerHandle,
    notifier: Notifier,
    ignore: IgnoreSet,
    routes: ActionRoutes,
    runtime: RuntimeOptions,
}

impl Project {
    /// Load the Waxfile and build the context around it.
    ///
    /// Fails if the initial Waxfile cannot be read or parsed; there is no
    /// previous graph to fall back to.
    pub fn open(fs: Arc<dyn FileSystem>, options: ProjectOptions) -> Result<Self> {
        let definition = fs
            .canonicalize(&options.definition)
            .unwrap_or_else(|_| options.definition.clone());

        let definition_name = definition
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_DEFINITION_NAME)
            .to_string();

        let settings = SettingsHandle::open(fs.as_ref(), &definition, &options.layout)?;
        info!(
            root = %settings.load().root().display(),
            pages = settings.load().pages().len(),
            "project opened"
        );

        Ok(Self {
            fs,
            settings,
            resolver: Resolver::new(definition_name),
            scheduler: SchedulerHandle::new(),
            notifier: Notifier::new(),
            ignore: options.ignore,
            routes: options.routes,
            runtime: options.runtime,
        })
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn shared_fs(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.fs)
    }

    /// Current snapshot of the page graph.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load()
    }

    pub fn settings_handle(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn root(&self) -> PathBuf {
        self.settings.load().root().to_path_buf()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn scheduler_handle(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn routes(&self) -> &ActionRoutes {
        &self.routes
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        self.runtime
    }

    /// Register an observer for every notification.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn enqueue(&self, request: BuildRequest) -> EnqueueOutcome {
        self.scheduler.enqueue(request)
    }

    /// Handle one changed path as if it came from the watcher.
    pub fn handle_path(&self, path: &Path) -> ChangeOutcome {
        process_file_change(self, path)
    }

    /// Queue a rebuild of every page plus the page listing.
    pub fn request_full_build(&self) -> EnqueueOutcome {
        let pages = self.settings.load().pages().to_vec();
        debug!(pages = pages.len(), "full build requested");
        self.scheduler.enqueue(BuildRequest::full(pages))
    }

    /// Drain loop bound to this project's queue, graph and notifier.
    pub fn scheduler<R: ActionRunner>(&self, runner: R) -> Scheduler<R> {
        Scheduler::new(
            self.scheduler.clone(),
            runner,
            self.settings.clone(),
            self.notifier.clone(),
            self.runtime,
        )
    }

    /// Start the filesystem watcher. Dropping the handle stops it.
    pub fn watch(self: &Arc<Self>) -> anyhow::Result<WatcherHandle> {
        spawn_watcher(Arc::clone(self))
    }
}
