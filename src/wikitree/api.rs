//! # API Facade
//!
//! A thin layer over [`crate::commands`]. It turns title paths into page ids
//! (`PageNotFound` when nothing matches) and dispatches to the command
//! functions, which hold the actual logic. No terminal I/O happens here; every
//! method returns a [`CmdResult`] for the front end to present.

use crate::application::Application;
use crate::commands::{self, helpers::resolve_page};
use crate::config::WikiConfig;
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;
use std::path::{Path, PathBuf};

pub struct WikiApi {
    app: Application,
    root: PathBuf,
}

impl WikiApi {
    /// Opens the wiki at `root`.
    pub fn open(config: WikiConfig, root: impl Into<PathBuf>, readonly: bool) -> Result<Self> {
        let root = root.into();
        let mut app = Application::new(config);
        app.open(&root, readonly)?;
        Ok(Self { app, root })
    }

    pub fn init(root: &Path) -> Result<commands::CmdResult> {
        commands::init::run(root)
    }

    pub fn reset_root(root: &Path) -> Result<commands::CmdResult> {
        commands::init::reset_root(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Application {
        &mut self.app
    }

    pub fn document(&self) -> Result<&Document> {
        self.app.document()
    }

    fn resolve(&self, title_path: &str) -> Result<PageId> {
        resolve_page(self.app.document()?, title_path)
    }

    pub fn tree(&self, from: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(from)?;
        commands::tree::run(self.app.document()?, id)
    }

    pub fn create_page(
        &mut self,
        parent: &str,
        title: &str,
        page_type: &str,
        tags: &[String],
    ) -> Result<commands::CmdResult> {
        let parent = self.resolve(parent)?;
        commands::create::run(self.app.document_mut()?, parent, title, page_type, tags)
    }

    pub fn rename_page(&mut self, page: &str, new_title: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::rename::run(self.app.document_mut()?, id, new_title)
    }

    pub fn move_page(&mut self, page: &str, new_parent: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        let parent = self.resolve(new_parent)?;
        commands::move_page::run(self.app.document_mut()?, id, parent)
    }

    pub fn remove_page(&mut self, page: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::remove::run(self.app.document_mut()?, id)
    }

    pub fn sort_children(&mut self, page: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::order::sort(self.app.document_mut()?, id)
    }

    pub fn set_order(&mut self, page: &str, order: usize) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::order::set(self.app.document_mut()?, id, order)
    }

    pub fn write_content(&mut self, page: &str, content: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::write::run(self.app.document_mut()?, id, content)
    }

    pub fn add_tags(&mut self, page: &str, tags: &[String]) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::tag::add(self.app.document_mut()?, id, tags)
    }

    pub fn remove_tags(&mut self, page: &str, tags: &[String]) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::tag::remove(self.app.document_mut()?, id, tags)
    }

    pub fn render<I: AsRef<str>>(&mut self, pages: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_all(pages)?;
        let cache = self.app.html_cache();
        commands::render::run(self.app.document_mut()?, &cache, &ids)
    }

    pub fn invalidate<I: AsRef<str>>(&mut self, pages: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_all(pages)?;
        commands::render::invalidate(self.app.document_mut()?, &ids)
    }

    pub fn attach(&self, page: &str, files: &[PathBuf]) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::attach::attach(self.app.document()?, id, files)
    }

    pub fn detach(&self, page: &str, name: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::attach::detach(self.app.document()?, id, name)
    }

    pub fn attachments(&self, page: &str) -> Result<commands::CmdResult> {
        let id = self.resolve(page)?;
        commands::attach::list(self.app.document()?, id)
    }

    /// Page statistics for `page`, or tree statistics without one.
    pub fn stat(&self, page: Option<&str>) -> Result<commands::CmdResult> {
        match page {
            Some(page) => {
                let id = self.resolve(page)?;
                commands::stat::page(self.app.document()?, id)
            }
            None => commands::stat::tree(self.app.document()?),
        }
    }

    pub fn run_action(&mut self, id: &str, params: &[String]) -> Result<commands::CmdResult> {
        self.app.run_action(id, params)
    }

    fn resolve_all<I: AsRef<str>>(&self, pages: &[I]) -> Result<Vec<PageId>> {
        pages.iter().map(|p| self.resolve(p.as_ref())).collect()
    }
}

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, TreeEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WikiError;
    use tempfile::TempDir;

    fn api() -> (TempDir, WikiApi) {
        let dir = TempDir::new().unwrap();
        WikiApi::init(dir.path()).unwrap();
        let api = WikiApi::open(WikiConfig::default(), dir.path(), false).unwrap();
        (dir, api)
    }

    #[test]
    fn dispatches_by_title_path() {
        let (_dir, mut api) = api();
        api.create_page("", "A", "wiki", &[]).unwrap();
        api.create_page("A", "B", "text", &[]).unwrap();
        api.write_content("A/B", "body").unwrap();

        let tree = api.tree("/").unwrap();
        assert_eq!(tree.listed_pages.len(), 2);

        let rendered = api.render(&["A/B"]).unwrap();
        assert!(rendered.html_paths[0].ends_with("A/B/__content.html"));
    }

    #[test]
    fn missing_page_is_reported() {
        let (_dir, mut api) = api();
        assert!(matches!(
            api.rename_page("Nope", "X"),
            Err(WikiError::PageNotFound(_))
        ));
        assert!(matches!(
            api.render(&["Nope"]),
            Err(WikiError::PageNotFound(_))
        ));
    }

    #[test]
    fn stat_without_page_is_tree_stat() {
        let (_dir, mut api) = api();
        api.create_page("", "A", "wiki", &[]).unwrap();
        assert!(api.stat(None).unwrap().tree_stat.is_some());
        assert!(api.stat(Some("A")).unwrap().page_stat.is_some());
    }
}
