// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::RuntimeOptions;
use crate::exec::ActionCommands;
use crate::graph::ProjectLayout;
use crate::types::ActionKind;
use crate::watch::ActionRoutes;

/// Host configuration as read from `Waxwatch.toml`.
///
/// ```toml
/// [project]
/// definition = "Waxfile"
/// output = "build"
/// ignore = ["~", "\\.js$", "\\.css$"]
///
/// [layout]
/// views = "Views/"
///
/// [action.styles]
/// cmd = "compass compile --sass-dir public/scss --css-dir public/stylesheets"
/// extensions = ["scss"]
/// ```
///
/// All sections are optional and have defaults matching the conventional
/// project layout. This is the unvalidated form; see [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub layout: ProjectLayout,

    #[serde(default)]
    pub action: ActionsSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Waxfile path, relative to the config file's directory.
    #[serde(default = "default_definition")]
    pub definition: PathBuf,

    /// Directory rendered pages are written to, relative to the config
    /// file's directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Regexes matched against changed paths; matches are ignored.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Drain tick interval.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Quiet period a pending request needs before it is dispatched.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Upper bound on one action's run time.
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
}

fn default_definition() -> PathBuf {
    PathBuf::from("Waxfile")
}

fn default_output() -> PathBuf {
    PathBuf::from("build")
}

fn default_ignore() -> Vec<String> {
    vec!["~".to_string(), r"\.js$".to_string(), r"\.css$".to_string()]
}

fn default_tick_ms() -> u64 {
    250
}

fn default_settle_ms() -> u64 {
    100
}

fn default_action_timeout_secs() -> u64 {
    300
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            definition: default_definition(),
            output: default_output(),
            ignore: default_ignore(),
            tick_ms: default_tick_ms(),
            settle_ms: default_settle_ms(),
            action_timeout_secs: default_action_timeout_secs(),
        }
    }
}

/// `[action.<kind>]` sections.
///
/// `styles` and `scripts` default to the sass / coffeescript toolchains;
/// `pages` has no command by default (rendering happens in process).
#[derive(Debug, Clone, Deserialize)]
pub struct ActionsSection {
    #[serde(default)]
    pub pages: Option<ActionConfig>,

    #[serde(default = "default_styles")]
    pub styles: Option<ActionConfig>,

    #[serde(default = "default_scripts")]
    pub scripts: Option<ActionConfig>,
}

impl Default for ActionsSection {
    fn default() -> Self {
        Self {
            pages: None,
            styles: default_styles(),
            scripts: default_scripts(),
        }
    }
}

fn default_styles() -> Option<ActionConfig> {
    Some(ActionConfig {
        cmd: "compass compile --sass-dir public/scss --css-dir public/stylesheets".to_string(),
        extensions: vec!["scss".to_string()],
        enabled: true,
    })
}

fn default_scripts() -> Option<ActionConfig> {
    Some(ActionConfig {
        cmd: "browserify -t coffeeify --extension=\".coffee\" public/coffee/application.coffee -o public/javascripts/application.js".to_string(),
        extensions: vec!["coffee".to_string()],
        enabled: true,
    })
}

/// One external toolchain action.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    /// Shell command, run in the project root.
    pub cmd: String,

    /// File extensions (without dot) whose changes enqueue this action.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Set to `false` to keep the section but never run it.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ActionsSection {
    pub fn get(&self, action: ActionKind) -> Option<&ActionConfig> {
        let config = match action {
            ActionKind::Pages => self.pages.as_ref(),
            ActionKind::Styles => self.styles.as_ref(),
            ActionKind::Scripts => self.scripts.as_ref(),
        };
        config.filter(|c| c.enabled)
    }
}

/// Validated host configuration.
///
/// Build one with `ConfigFile::try_from(raw)` (see `validate.rs`) or the
/// loader helpers. Relative paths resolve against `base_dir`, the directory
/// the config file lives in.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub project: ProjectSection,
    pub layout: ProjectLayout,
    pub action: ActionsSection,
    base_dir: PathBuf,
}

impl ConfigFile {
    /// Construct without validation. Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            project: raw.project,
            layout: raw.layout.normalized(),
            action: raw.action,
            base_dir: PathBuf::from("."),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        self.base_dir = if base_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            base_dir
        };
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn definition_path(&self) -> PathBuf {
        self.base_dir.join(&self.project.definition)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.project.output)
    }

    pub fn runtime_options(&self, exit_when_idle: bool) -> RuntimeOptions {
        RuntimeOptions {
            tick: Duration::from_millis(self.project.tick_ms),
            settle: Duration::from_millis(self.project.settle_ms),
            action_timeout: Duration::from_secs(self.project.action_timeout_secs),
            exit_when_idle,
        }
    }

    /// Extension routes for every enabled action that lists extensions.
    pub fn action_routes(&self) -> ActionRoutes {
        ActionKind::ALL
            .into_iter()
            .filter_map(|kind| self.action.get(kind).map(|cfg| (kind, cfg)))
            .filter(|(_, cfg)| !cfg.extensions.is_empty())
            .fold(ActionRoutes::new(), |routes, (kind, cfg)| {
                routes.with(kind, &cfg.extensions)
            })
    }

    pub fn action_commands(&self) -> ActionCommands {
        ActionKind::ALL
            .into_iter()
            .filter_map(|kind| self.action.get(kind).map(|cfg| (kind, cfg)))
            .fold(ActionCommands::new(), |commands, (kind, cfg)| {
                commands.with(kind, cfg.cmd.clone())
            })
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}
