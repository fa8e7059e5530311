// src/config/validate.rs

use crate::config::model::{ActionConfig, ConfigFile, RawConfigFile};
use crate::errors::{Result, WaxError};
use crate::types::ActionKind;
use crate::watch::IgnoreSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WaxError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Validate an already-built config (used after programmatic edits).
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_raw_config(&RawConfigFile {
        project: cfg.project.clone(),
        layout: cfg.layout.clone(),
        action: cfg.action.clone(),
    })
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_project(cfg)?;
    validate_layout(cfg)?;
    validate_actions(cfg)?;
    Ok(())
}

fn validate_project(cfg: &RawConfigFile) -> Result<()> {
    let project = &cfg.project;

    if project.definition.as_os_str().is_empty() {
        return Err(WaxError::ConfigError(
            "[project].definition must not be empty".to_string(),
        ));
    }

    if project.tick_ms == 0 {
        return Err(WaxError::ConfigError(
            "[project].tick_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if project.action_timeout_secs == 0 {
        return Err(WaxError::ConfigError(
            "[project].action_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    IgnoreSet::new(&project.ignore)
        .map_err(|err| WaxError::ConfigError(format!("[project].ignore: {err:#}")))?;

    Ok(())
}

fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    let layout = cfg.layout.clone().normalized();
    let prefixes = [
        ("templates", &layout.templates),
        ("data", &layout.data),
        ("views", &layout.views),
    ];

    for (name, prefix) in prefixes {
        if prefix.trim_matches('/').is_empty() {
            return Err(WaxError::ConfigError(format!(
                "[layout].{name} must not be empty"
            )));
        }
    }

    for (i, (a_name, a)) in prefixes.iter().enumerate() {
        for (b_name, b) in prefixes.iter().skip(i + 1) {
            if a == b {
                return Err(WaxError::ConfigError(format!(
                    "[layout].{a_name} and [layout].{b_name} must differ (both '{a}')"
                )));
            }
        }
    }

    for (name, ext) in [
        ("data_extension", &layout.data_extension),
        ("view_extension", &layout.view_extension),
    ] {
        if ext.is_empty() {
            return Err(WaxError::ConfigError(format!(
                "[layout].{name} must not be empty"
            )));
        }
    }

    Ok(())
}

fn validate_actions(cfg: &RawConfigFile) -> Result<()> {
    for kind in ActionKind::ALL {
        let Some(action) = cfg.action.get(kind) else {
            continue;
        };
        validate_action(kind, action)?;
    }
    Ok(())
}

fn validate_action(kind: ActionKind, action: &ActionConfig) -> Result<()> {
    if action.cmd.trim().is_empty() {
        return Err(WaxError::ConfigError(format!(
            "[action.{kind}].cmd must not be empty"
        )));
    }

    if kind != ActionKind::Pages && action.extensions.is_empty() {
        return Err(WaxError::ConfigError(format!(
            "[action.{kind}] needs at least one entry in `extensions`"
        )));
    }

    Ok(())
}
