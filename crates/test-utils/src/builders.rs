#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use waxwatch::config::{ActionConfig, ConfigFile, RawConfigFile};
use waxwatch::errors::WaxError;
use waxwatch::fs::mock::MockFileSystem;
use waxwatch::fs::FileSystem;
use waxwatch::graph::{Page, PageContent, ProjectLayout, Settings};
use waxwatch::project::{Project, ProjectOptions};
use waxwatch::types::ActionKind;

/// Builder for `Page` to simplify test setup.
pub struct PageBuilder {
    page: Page,
}

impl PageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            page: Page::new(name),
        }
    }

    pub fn content(mut self, slot: &str, view: &str, data: &str) -> Self {
        self.page.add_content(slot, PageContent::new(view, data));
        self
    }

    pub fn build(self) -> Page {
        self.page
    }
}

/// Builder for `Settings` that bypasses the Waxfile parser.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            settings: Settings::new(root, ProjectLayout::default()),
        }
    }

    pub fn with_layout(root: impl Into<PathBuf>, layout: ProjectLayout) -> Self {
        Self {
            settings: Settings::new(root, layout),
        }
    }

    pub fn symlink(mut self, path: &str) -> Self {
        self.settings
            .add_symlink(path)
            .expect("duplicate symlink in SettingsBuilder");
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.settings
            .add_page(page)
            .expect("duplicate page in SettingsBuilder");
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_ignore(mut self, pattern: &str) -> Self {
        self.config.project.ignore.push(pattern.to_string());
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.config.project.tick_ms = tick_ms;
        self
    }

    pub fn with_layout(mut self, layout: ProjectLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn with_action(mut self, kind: ActionKind, cmd: &str, extensions: &[&str]) -> Self {
        let action = Some(ActionConfig {
            cmd: cmd.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            enabled: true,
        });
        match kind {
            ActionKind::Pages => self.config.action.pages = action,
            ActionKind::Styles => self.config.action.styles = action,
            ActionKind::Scripts => self.config.action.scripts = action,
        }
        self
    }

    pub fn without_action(mut self, kind: ActionKind) -> Self {
        match kind {
            ActionKind::Pages => self.config.action.pages = None,
            ActionKind::Styles => self.config.action.styles = None,
            ActionKind::Scripts => self.config.action.scripts = None,
        }
        self
    }

    pub fn try_build(self) -> Result<ConfigFile, WaxError> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Waxfile used by [`SampleSite`].
///
/// - `Home` and `About Us` share the `header` slot through a `<<` merge.
/// - `Home` and `Contact` are disjoint.
/// - `shared/news` is a view used by `Home` only.
pub const SAMPLE_WAXFILE: &str = r#"
paths:
  - public/shared
shared: &shared
  header:
    - shared/header: shared/header
pages:
  Home:
    <<: *shared
    content:
      - home/hero: home/hero
      - shared/news: home/news
  About Us:
    <<: *shared
    content:
      - about/team: about/team
  Contact:
    content:
      - contact/form: contact/form
"#;

pub const SAMPLE_LAYOUT: &str =
    "<html><title>{{page}}</title>{{{header}}}<main>{{{content}}}</main></html>";

pub const SAMPLE_INDEX: &str =
    "<ul>{{#pages}}<li><a href=\"{{url}}\">{{name}}</a></li>{{/pages}}</ul>";

/// In-memory project rooted at `/site` with the default layout.
#[derive(Debug, Clone)]
pub struct SampleSite {
    pub fs: MockFileSystem,
    pub root: PathBuf,
}

impl SampleSite {
    pub fn new() -> Self {
        let site = Self {
            fs: MockFileSystem::new(),
            root: PathBuf::from("/site"),
        };

        site.write("Waxfile", SAMPLE_WAXFILE);
        site.write("wax/templates/layout.mustache", SAMPLE_LAYOUT);
        site.write("wax/templates/index.mustache", SAMPLE_INDEX);

        site.write("Views/shared/header.mustache", "<h1>{{title}}</h1>");
        site.write("wax/data/shared/header.json", r#"{"title": "Wax"}"#);

        site.write("Views/home/hero.mustache", "<p>{{tagline}}</p>");
        site.write("wax/data/home/hero.json", r#"{"tagline": "Fast & small"}"#);

        site.write("Views/shared/news.mustache", "<ul>{{#items}}<li>{{.}}</li>{{/items}}</ul>");
        site.write("wax/data/home/news.json", r#"{"items": ["one", "two"]}"#);

        site.write(
            "Views/about/team.mustache",
            "{{#members}}<span>{{name}}</span>{{/members}}",
        );
        site.write("wax/data/about/team.json", r#"{"members": [{"name": "Ada"}]}"#);

        site.write("Views/contact/form.mustache", "<form>{{email}}</form>");
        site.write("wax/data/contact/form.json", r#"{"email": "hi@example.com"}"#);

        site
    }

    /// Absolute path of a root-relative file.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        self.fs.add_file(self.path(rel), contents);
    }

    pub fn remove(&self, rel: &str) -> bool {
        self.fs.remove_file(self.path(rel))
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
        self.fs.contents(path)
    }

    pub fn waxfile(&self) -> PathBuf {
        self.path("Waxfile")
    }

    pub fn output(&self) -> PathBuf {
        self.path("build")
    }

    pub fn shared_fs(&self) -> Arc<dyn FileSystem> {
        Arc::new(self.fs.clone())
    }

    pub fn options(&self) -> ProjectOptions {
        ProjectOptions::new(self.waxfile())
    }

    pub fn open(&self) -> Project {
        self.open_with(self.options())
    }

    pub fn open_with(&self, options: ProjectOptions) -> Project {
        Project::open(self.shared_fs(), options).expect("sample site should open")
    }
}

impl Default for SampleSite {
    fn default() -> Self {
        Self::new()
    }
}
