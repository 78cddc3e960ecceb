//! Application context: configuration, the open document, actions and
//! plugins.
//!
//! At most one document is open at a time. The open document is the
//! *active* one, which is what [`crate::config::EventPolicy::ActiveOnly`]
//! checks before emitting tree-update brackets.

use crate::actions::ActionController;
use crate::commands::CmdResult;
use crate::config::WikiConfig;
use crate::document::Document;
use crate::error::{Result, WikiError};
use crate::events::{Event, EventKind};
use crate::plugins::{Plugin, PluginManager};
use crate::render::cache::HtmlCache;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct Application {
    pub config: WikiConfig,
    pub document: Option<Document>,
    pub actions: ActionController,
    pub plugins: PluginManager,
}

impl Application {
    pub fn new(config: WikiConfig) -> Self {
        Self {
            config,
            document: None,
            actions: ActionController::new(),
            plugins: PluginManager::new(),
        }
    }

    /// Loads the wiki at `path` and makes it the active document.
    pub fn open<P: AsRef<Path>>(&mut self, path: P, readonly: bool) -> Result<&mut Document> {
        let doc = Document::load(path, readonly)?;
        Ok(self.activate(doc))
    }

    /// Creates a wiki at `path` and makes it the active document.
    pub fn create<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Document> {
        let doc = Document::create(path)?;
        Ok(self.activate(doc))
    }

    fn activate(&mut self, mut doc: Document) -> &mut Document {
        self.close();
        doc.set_event_policy(self.config.tree_update_events);
        doc.set_active(true);
        let root = doc.root();
        doc.events_mut()
            .emit(&Event::for_page(EventKind::DocumentOpened, root));
        info!(path = %doc.path().display(), "document opened");
        self.document.insert(doc)
    }

    /// Closes the active document, handing it back deactivated.
    pub fn close(&mut self) -> Option<Document> {
        let mut doc = self.document.take()?;
        doc.set_active(false);
        Some(doc)
    }

    pub fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| WikiError::Config("no wiki is open".to_string()))
    }

    pub fn document_mut(&mut self) -> Result<&mut Document> {
        self.document
            .as_mut()
            .ok_or_else(|| WikiError::Config("no wiki is open".to_string()))
    }

    pub fn html_cache(&self) -> HtmlCache {
        HtmlCache::new(&self.config)
    }

    pub fn load_plugin(&mut self, plugin: Box<dyn Plugin>) -> bool {
        self.plugins.add(plugin, &mut self.actions)
    }

    pub fn unload_plugin(&mut self, name: &str) -> bool {
        self.plugins.remove(name, &mut self.actions)
    }

    pub fn run_action(&mut self, id: &str, params: &[String]) -> Result<CmdResult> {
        ActionController::run_action(self, id, params)
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.plugins.clear(&mut self.actions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventPolicy;
    use crate::plugins::StatisticsPlugin;
    use tempfile::TempDir;

    #[test]
    fn test_open_activates_and_close_deactivates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wiki");
        Document::create(&path).unwrap();

        let mut app = Application::default();
        assert!(app.document().is_err());
        assert!(app.open(&path, false).unwrap().is_active());

        let closed = app.close().unwrap();
        assert!(!closed.is_active());
        assert!(app.document().is_err());
        assert!(app.close().is_none());
    }

    #[test]
    fn test_open_applies_event_policy() {
        let dir = TempDir::new().unwrap();
        let mut app = Application::new(WikiConfig {
            tree_update_events: EventPolicy::Never,
            ..WikiConfig::default()
        });
        let doc = app.create(dir.path().join("wiki")).unwrap();
        assert_eq!(doc.event_policy(), EventPolicy::Never);
    }

    #[test]
    fn test_plugins_load_once() {
        let mut app = Application::default();
        assert!(app.load_plugin(Box::new(StatisticsPlugin::new())));
        assert!(!app.load_plugin(Box::new(StatisticsPlugin::new())));
        assert_eq!(app.actions.action_ids().len(), 2);

        assert!(app.unload_plugin("Statistics"));
        assert!(app.actions.action_ids().is_empty());
    }

    #[test]
    fn test_action_without_document() {
        let mut app = Application::default();
        app.load_plugin(Box::new(StatisticsPlugin::new()));
        assert!(matches!(
            app.run_action("tree_stat", &[]),
            Err(WikiError::Config(_))
        ));
    }
}
