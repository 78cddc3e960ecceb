//! # Plugins
//!
//! Plugins extend the application by registering actions (and, through the
//! open document, page types). [`PluginManager`] guarantees each plugin is
//! initialized once while loaded and destroyed once when unloaded.

use crate::actions::{Action, ActionController};
use crate::application::Application;
use crate::commands::{self, CmdResult};
use crate::error::{Result, WikiError};
use std::rc::Rc;
use tracing::{debug, info};

pub trait Plugin {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn version(&self) -> &str;

    fn url(&self) -> Option<String> {
        None
    }

    fn initialize(&mut self, actions: &mut ActionController);

    fn destroy(&mut self, actions: &mut ActionController);
}

#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and initializes `plugin`. Returns `false`, without initializing,
    /// if a plugin with the same name is already loaded.
    pub fn add(&mut self, mut plugin: Box<dyn Plugin>, actions: &mut ActionController) -> bool {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            debug!(plugin = plugin.name(), "plugin already loaded");
            return false;
        }
        plugin.initialize(actions);
        info!(plugin = plugin.name(), version = plugin.version(), "plugin loaded");
        self.plugins.push(plugin);
        true
    }

    pub fn remove(&mut self, name: &str, actions: &mut ActionController) -> bool {
        match self.plugins.iter().position(|p| p.name() == name) {
            Some(pos) => {
                let mut plugin = self.plugins.remove(pos);
                plugin.destroy(actions);
                info!(plugin = name, "plugin unloaded");
                true
            }
            None => false,
        }
    }

    /// Destroys every plugin, last loaded first.
    pub fn clear(&mut self, actions: &mut ActionController) {
        while let Some(mut plugin) = self.plugins.pop() {
            plugin.destroy(actions);
            debug!(plugin = plugin.name(), "plugin unloaded");
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

pub const PAGE_STAT_ACTION: &str = "page_stat";
pub const TREE_STAT_ACTION: &str = "tree_stat";

/// Page and tree statistics as two actions.
#[derive(Debug, Default)]
pub struct StatisticsPlugin {
    initialized: bool,
}

impl StatisticsPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Plugin for StatisticsPlugin {
    fn name(&self) -> &str {
        "Statistics"
    }

    fn description(&self) -> &str {
        "Shows statistics of the current page and of the whole tree."
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&mut self, actions: &mut ActionController) {
        if self.initialized {
            return;
        }
        actions.register(Rc::new(PageStatAction), None);
        actions.register(Rc::new(TreeStatAction), None);
        self.initialized = true;
    }

    fn destroy(&mut self, actions: &mut ActionController) {
        if !self.initialized {
            return;
        }
        actions.remove_action(PAGE_STAT_ACTION);
        actions.remove_action(TREE_STAT_ACTION);
        self.initialized = false;
    }
}

struct PageStatAction;

impl Action for PageStatAction {
    fn string_id(&self) -> &str {
        PAGE_STAT_ACTION
    }

    fn title(&self) -> String {
        "Page Statistic".into()
    }

    fn description(&self) -> String {
        "Words, lines and attachments of a page".into()
    }

    /// `params[0]` is a title path; the selected page is used without it.
    fn run(&self, app: &mut Application, params: &[String]) -> Result<CmdResult> {
        let doc = app.document()?;
        let id = match params.first() {
            Some(path) => commands::helpers::resolve_page(doc, path)?,
            None => doc
                .selected()
                .ok_or_else(|| WikiError::PageNotFound("no page selected".into()))?,
        };
        commands::stat::page(doc, id)
    }
}

struct TreeStatAction;

impl Action for TreeStatAction {
    fn string_id(&self) -> &str {
        TREE_STAT_ACTION
    }

    fn title(&self) -> String {
        "Tree Statistic".into()
    }

    fn description(&self) -> String {
        "Page count, depth and tag usage of the whole wiki".into()
    }

    fn run(&self, app: &mut Application, _params: &[String]) -> Result<CmdResult> {
        commands::stat::tree(app.document()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionController;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Recording {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Plugin for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            ""
        }

        fn version(&self) -> &str {
            "1.0"
        }

        fn initialize(&mut self, _actions: &mut ActionController) {
            self.log.borrow_mut().push(format!("init {}", self.name));
        }

        fn destroy(&mut self, _actions: &mut ActionController) {
            self.log.borrow_mut().push(format!("destroy {}", self.name));
        }
    }

    #[test]
    fn test_add_twice_initializes_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut actions = ActionController::new();
        let mut plugins = PluginManager::new();

        assert!(plugins.add(Box::new(Recording { name: "a", log: log.clone() }), &mut actions));
        assert!(!plugins.add(Box::new(Recording { name: "a", log: log.clone() }), &mut actions));

        assert_eq!(plugins.len(), 1);
        assert_eq!(*log.borrow(), vec!["init a"]);
    }

    #[test]
    fn test_clear_destroys_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut actions = ActionController::new();
        let mut plugins = PluginManager::new();
        for name in ["a", "b"] {
            plugins.add(Box::new(Recording { name, log: log.clone() }), &mut actions);
        }

        plugins.clear(&mut actions);
        assert!(plugins.is_empty());
        assert_eq!(*log.borrow(), vec!["init a", "init b", "destroy b", "destroy a"]);
    }

    #[test]
    fn test_statistics_plugin_cycle() {
        let mut actions = ActionController::new();
        let mut plugin = StatisticsPlugin::new();

        plugin.initialize(&mut actions);
        plugin.initialize(&mut actions);
        assert!(plugin.is_initialized());
        assert_eq!(actions.action_ids(), vec![PAGE_STAT_ACTION, TREE_STAT_ACTION]);

        plugin.destroy(&mut actions);
        plugin.destroy(&mut actions);
        assert!(actions.action_ids().is_empty());

        plugin.initialize(&mut actions);
        assert_eq!(actions.action_ids().len(), 2);
    }

    #[test]
    fn test_statistics_actions_run() {
        let dir = TempDir::new().unwrap();
        let mut app = Application::default();
        app.create(dir.path().join("wiki")).unwrap();
        let doc = app.document_mut().unwrap();
        let root = doc.root();
        let page = doc.create_child(root, "A", "text", ["t"]).unwrap();
        doc.set_content(page, "one two three").unwrap();
        app.load_plugin(Box::new(StatisticsPlugin::new()));

        let result = ActionController::run_action(&mut app, PAGE_STAT_ACTION, &["A".into()]).unwrap();
        assert_eq!(result.page_stat.unwrap().words, 3);

        assert!(matches!(
            ActionController::run_action(&mut app, PAGE_STAT_ACTION, &[]),
            Err(WikiError::PageNotFound(_))
        ));

        let result = ActionController::run_action(&mut app, TREE_STAT_ACTION, &[]).unwrap();
        assert_eq!(result.tree_stat.unwrap().page_count, 1);
    }
}
