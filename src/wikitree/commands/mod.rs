use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;
use crate::stats::{PageStat, TreeStat};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

pub mod attach;
pub mod create;
pub mod helpers;
pub mod init;
pub mod move_page;
pub mod order;
pub mod remove;
pub mod rename;
pub mod render;
pub mod stat;
pub mod tag;
pub mod tree;
pub mod write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// One line of a tree listing.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub id: PageId,
    pub title: String,
    pub title_path: String,
    pub depth: usize,
    pub order: usize,
    pub page_type: String,
    pub tags: Vec<String>,
    pub modified: DateTime<Utc>,
}

impl TreeEntry {
    pub fn from_page(doc: &Document, id: PageId) -> Result<Self> {
        let page = doc.page(id)?;
        Ok(Self {
            id,
            title: page.title().to_string(),
            title_path: doc.title_path(id)?,
            depth: doc.depth(id)?,
            order: page.order(),
            page_type: page.page_type().to_string(),
            tags: page.tags().iter().cloned().collect(),
            modified: page.modified(),
        })
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_pages: Vec<PageId>,
    pub listed_pages: Vec<TreeEntry>,
    pub html_paths: Vec<PathBuf>,
    pub attachments: Vec<String>,
    pub page_stat: Option<PageStat>,
    pub tree_stat: Option<TreeStat>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_pages(mut self, pages: Vec<PageId>) -> Self {
        self.affected_pages = pages;
        self
    }

    pub fn with_listed_pages(mut self, pages: Vec<TreeEntry>) -> Self {
        self.listed_pages = pages;
        self
    }

    pub fn with_html_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.html_paths = paths;
        self
    }

    pub fn with_attachments(mut self, names: Vec<String>) -> Self {
        self.attachments = names;
        self
    }
}
