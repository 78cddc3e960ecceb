//! # Page Options
//!
//! Every page folder carries a `__page.opt` file holding the page's
//! persistent state as JSON. The wiki root carries one too: its presence is
//! what marks a folder as a wiki.
//!
//! Besides the fixed fields, options hold free-form `sections`, a two-level
//! string map read and written through typed accessors. The render cache
//! keeps its content hash there and frontends keep UI state there
//! (e.g. `tree.expanded`).

use crate::error::{Result, WikiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const OPTIONS_FILENAME: &str = "__page.opt";
pub const DEFAULT_PAGE_TYPE: &str = "wiki";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOptions {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: usize,
    #[serde(rename = "type", default = "default_page_type")]
    pub page_type: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub readonly: bool,
    // File name of the icon inside the page folder
    #[serde(default)]
    pub icon: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_page_type() -> String {
    DEFAULT_PAGE_TYPE.to_string()
}

impl PageOptions {
    pub fn new(title: impl Into<String>, page_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            order: 0,
            page_type: page_type.into(),
            tags: BTreeSet::new(),
            readonly: false,
            icon: None,
            created: now,
            modified: now,
            sections: BTreeMap::new(),
        }
    }

    /// Options written for a fresh (or reset) wiki root.
    pub fn root() -> Self {
        Self::new("", DEFAULT_PAGE_TYPE)
    }

    pub fn path_in(dir: &Path) -> std::path::PathBuf {
        dir.join(OPTIONS_FILENAME)
    }

    pub fn exists_in(dir: &Path) -> bool {
        Self::path_in(dir).is_file()
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(Self::path_in(dir))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`PageOptions::read`] but maps parse failures to `RootFormat`.
    pub fn read_root(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| WikiError::RootFormat {
            path,
            details: e.to_string(),
        })
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(&Self::path_in(dir), content.as_bytes())
    }

    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get_str(section, key)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get_str(section, key)?.parse().ok()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Returns whether the key was present. Empty sections are dropped.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let Some(entries) = self.sections.get_mut(section) else {
            return false;
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            self.sections.remove(section);
        }
        removed
    }
}

/// Writes through a temp file in the same directory, then renames over the
/// target, so readers never observe a partial file.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| WikiError::InvalidPath(path.display().to_string()))?;
    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WikiError::Io(e));
    }
    Ok(())
}
