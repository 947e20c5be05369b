//! Sidecar settings from `tutord.toml`.
//!
//! Lookup order: the path in `TUTORD_CONFIG`, then `./tutord.toml`. A missing
//! file means defaults; an unreadable or invalid one is logged and ignored.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "TUTORD_CONFIG";
pub const CONFIG_FILENAME: &str = "tutord.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Drop selected ids that the current filters hide.
    pub prune_hidden: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self { prune_hidden: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub seed_mock_data: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_mock_data: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub view: ViewSettings,
    pub selection: SelectionSettings,
    pub store: StoreSettings,
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.view.max_page_size == 0 {
            bail!("view.max_page_size must be >= 1");
        }
        if self.view.default_page_size == 0
            || self.view.default_page_size > self.view.max_page_size
        {
            bail!(
                "view.default_page_size must be in range 1..={}",
                self.view.max_page_size
            );
        }
        Ok(())
    }
}

pub fn parse_settings(content: &str) -> anyhow::Result<Settings> {
    let settings: Settings = toml::from_str(content).context("invalid tutord.toml")?;
    settings.validate()?;
    Ok(settings)
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    parse_settings(&content)
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

pub fn load_settings() -> Settings {
    let path = config_path();
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Settings::default();
    }
    match read_settings(&path) {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!("Ignoring {:?}: {:#}", path, e);
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let s = parse_settings("").expect("parse");
        assert_eq!(s, Settings::default());
        assert_eq!(s.view.default_page_size, 10);
        assert!(s.selection.prune_hidden);
        assert!(s.store.seed_mock_data);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let s = parse_settings(
            r#"
[view]
default_page_size = 25

[selection]
prune_hidden = false
"#,
        )
        .expect("parse");
        assert_eq!(s.view.default_page_size, 25);
        assert_eq!(s.view.max_page_size, 500);
        assert!(!s.selection.prune_hidden);
        assert!(s.store.seed_mock_data);
    }

    #[test]
    fn out_of_range_page_size_is_rejected() {
        let e = parse_settings("[view]\ndefault_page_size = 0\n").unwrap_err();
        assert!(e.to_string().contains("default_page_size"));
        assert!(parse_settings("[view]\ndefault_page_size = 600\n").is_err());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse_settings("[store]\nseed_mock_data = \"yes\"\n").is_err());
    }
}
