use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Category of build work the scheduler coalesces on.
///
/// At most one request per kind is ever pending.
///
/// - `Pages`: re-render affected pages from views, data and the layout.
/// - `Styles`: recompile stylesheets with the external sass toolchain.
/// - `Scripts`: recompile scripts with the external coffeescript toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pages,
    Styles,
    Scripts,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Pages, ActionKind::Styles, ActionKind::Scripts];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Pages => "pages",
            ActionKind::Styles => "styles",
            ActionKind::Scripts => "scripts",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pages" => Ok(ActionKind::Pages),
            "styles" => Ok(ActionKind::Styles),
            "scripts" => Ok(ActionKind::Scripts),
            other => Err(format!(
                "invalid action kind: {other} (expected \"pages\", \"styles\" or \"scripts\")"
            )),
        }
    }
}
