//! Current page graph with atomic reload support.
//!
//! Uses `arc-swap` so resolutions read a snapshot without locking and a
//! reload replaces the whole graph in one store. A resolution that loaded
//! the old snapshot keeps using it until it finishes; it never sees a mix
//! of old and new pages.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::graph::{load_definition, ProjectLayout, Settings};

/// Shared, swappable reference to the live [`Settings`].
///
/// Cheap to clone; all clones observe the same snapshot. There is no
/// process-wide instance: the owning [`crate::project::Project`] creates one.
#[derive(Clone)]
pub struct SettingsHandle {
    inner: Arc<Inner>,
}

struct Inner {
    current: ArcSwap<Settings>,
    definition: PathBuf,
    /// Serializes reloads so two concurrent definition events cannot
    /// interleave their parse-and-store.
    reload_lock: Mutex<()>,
}

impl fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsHandle")
            .field("definition", &self.inner.definition)
            .field("pages", &self.load().pages().len())
            .finish_non_exhaustive()
    }
}

impl SettingsHandle {
    pub fn new(settings: Settings, definition: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(settings),
                definition: definition.into(),
                reload_lock: Mutex::new(()),
            }),
        }
    }

    /// Load the Waxfile at `definition`. Fails instead of publishing a
    /// broken or partial graph.
    pub fn open(
        fs: &dyn FileSystem,
        definition: impl Into<PathBuf>,
        layout: &ProjectLayout,
    ) -> Result<Self> {
        let definition = definition.into();
        let settings = load_definition(fs, &definition, layout)?;
        info!(
            definition = %definition.display(),
            pages = settings.pages().len(),
            "loaded Waxfile"
        );
        Ok(Self::new(settings, definition))
    }

    /// Current snapshot. Wait-free.
    #[inline]
    pub fn load(&self) -> Arc<Settings> {
        self.inner.current.load_full()
    }

    pub fn definition_path(&self) -> &Path {
        &self.inner.definition
    }

    /// Re-parse the Waxfile and swap it in.
    ///
    /// On error the previous snapshot stays authoritative and the error is
    /// returned for the caller to report.
    pub fn reload(&self, fs: &dyn FileSystem) -> Result<Arc<Settings>> {
        let _guard = self
            .inner
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let layout = self.load().layout().clone();
        match load_definition(fs, &self.inner.definition, &layout) {
            Ok(settings) => {
                let settings = Arc::new(settings);
                self.inner.current.store(Arc::clone(&settings));
                info!(pages = settings.pages().len(), "Waxfile reloaded");
                Ok(settings)
            }
            Err(err) => {
                warn!(error = %err, "Waxfile reload failed; keeping previous page graph");
                Err(err)
            }
        }
    }
}
