use crate::error::{Result, WikiError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const CONFIG_DIR_ENV: &str = "WIKITREE_CONFIG_DIR";
const DEFAULT_EMPTY_CONTENT: &str = "*This page is empty.*";

/// When bulk tree restructuring (e.g. sorting) emits its update bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPolicy {
    /// Only for the document the application currently has open
    #[default]
    ActiveOnly,
    Always,
    Never,
}

impl EventPolicy {
    pub fn should_emit(self, document_active: bool) -> bool {
        match self {
            EventPolicy::ActiveOnly => document_active,
            EventPolicy::Always => true,
            EventPolicy::Never => false,
        }
    }
}

/// Application configuration, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WikiConfig {
    /// Wiki opened when no root is given on the command line
    #[serde(default)]
    pub default_root: Option<PathBuf>,

    /// Extra CSS injected into every rendered page
    #[serde(default)]
    pub user_style: String,

    /// Markup rendered in place of an empty wiki page
    #[serde(default = "default_empty_content")]
    pub empty_content: String,

    #[serde(default)]
    pub tree_update_events: EventPolicy,

    /// Custom HTML template; must contain `{content}`, may contain `{userhead}`
    #[serde(default)]
    pub template: Option<String>,
}

fn default_empty_content() -> String {
    DEFAULT_EMPTY_CONTENT.to_string()
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            default_root: None,
            user_style: String::new(),
            empty_content: default_empty_content(),
            tree_update_events: EventPolicy::default(),
            template: None,
        }
    }
}

impl WikiConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        serde_json::from_str(&content)
            .map_err(|e| WikiError::Config(format!("{}: {}", config_path.display(), e)))
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// `$WIKITREE_CONFIG_DIR`, falling back to the per-user config dir.
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        ProjectDirs::from("net", "wikitree", "wikitree")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| WikiError::Config("Could not determine config dir".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = WikiConfig::default();
        assert_eq!(config.tree_update_events, EventPolicy::ActiveOnly);
        assert_eq!(config.empty_content, DEFAULT_EMPTY_CONTENT);
        assert!(config.template.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig::load(dir.path().join("nope")).unwrap();
        assert_eq!(config, WikiConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig {
            user_style: "body { color: red; }".to_string(),
            tree_update_events: EventPolicy::Always,
            ..WikiConfig::default()
        };
        config.save(dir.path().join("nested")).unwrap();

        let loaded = WikiConfig::load(dir.path().join("nested")).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        let json = serde_json::to_string(&EventPolicy::ActiveOnly).unwrap();
        assert_eq!(json, "\"active_only\"");
    }

    #[test]
    fn test_broken_config_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{ not json").unwrap();
        assert!(matches!(
            WikiConfig::load(dir.path()),
            Err(WikiError::Config(_))
        ));
    }

    #[test]
    fn test_policy_should_emit() {
        assert!(EventPolicy::ActiveOnly.should_emit(true));
        assert!(!EventPolicy::ActiveOnly.should_emit(false));
        assert!(EventPolicy::Always.should_emit(false));
        assert!(!EventPolicy::Never.should_emit(true));
    }
}
