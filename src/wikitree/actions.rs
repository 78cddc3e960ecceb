//! # Actions
//!
//! An [`Action`] is a named, runnable operation that a front end can bind to
//! a hotkey and to any number of menu or toolbar [`Trigger`]s. The
//! [`ActionController`] owns the registrations; removing an action removes
//! every binding it had, so a stale menu item can never run it.

use crate::application::Application;
use crate::commands::CmdResult;
use crate::error::{Result, WikiError};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

pub trait Action {
    /// Unique, stable identifier
    fn string_id(&self) -> &str;

    fn title(&self) -> String;

    fn description(&self) -> String;

    fn run(&self, app: &mut Application, params: &[String]) -> Result<CmdResult>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HotKey {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl HotKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for HotKey {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WikiError::Config(format!("invalid hotkey '{}'", s));
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;

        let mut hotkey = HotKey::new(key);
        for modifier in parts {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => hotkey.ctrl = true,
                "alt" => hotkey.alt = true,
                "shift" => hotkey.shift = true,
                _ => return Err(invalid()),
            }
        }
        Ok(hotkey)
    }
}

/// A UI element that runs an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    Menu(String),
    Toolbar(String),
}

#[derive(Default)]
pub struct ActionController {
    actions: Vec<Rc<dyn Action>>,
    hotkeys: HashMap<String, HotKey>,
    triggers: HashMap<String, Vec<Trigger>>,
}

impl fmt::Debug for ActionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionController")
            .field("actions", &self.action_ids())
            .field("hotkeys", &self.hotkeys)
            .field("triggers", &self.triggers)
            .finish()
    }
}

impl ActionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action`. An action already registered under the same id is
    /// replaced, together with its bindings.
    pub fn register(&mut self, action: Rc<dyn Action>, hotkey: Option<HotKey>) {
        let id = action.string_id().to_string();
        self.remove_action(&id);
        if let Some(hotkey) = hotkey {
            self.hotkeys.insert(id.clone(), hotkey);
        }
        debug!(action = %id, "action registered");
        self.actions.push(action);
    }

    /// Returns whether the action was registered.
    pub fn remove_action(&mut self, id: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.string_id() != id);
        self.hotkeys.remove(id);
        self.triggers.remove(id);
        let removed = before != self.actions.len();
        if removed {
            debug!(action = %id, "action removed");
        }
        removed
    }

    pub fn bind_trigger(&mut self, id: &str, trigger: Trigger) -> Result<()> {
        if self.action(id).is_none() {
            return Err(WikiError::UnknownAction(id.to_string()));
        }
        let bound = self.triggers.entry(id.to_string()).or_default();
        if !bound.contains(&trigger) {
            bound.push(trigger);
        }
        Ok(())
    }

    pub fn unbind_trigger(&mut self, id: &str, trigger: &Trigger) -> bool {
        match self.triggers.get_mut(id) {
            Some(bound) => {
                let before = bound.len();
                bound.retain(|t| t != trigger);
                before != bound.len()
            }
            None => false,
        }
    }

    pub fn triggers(&self, id: &str) -> &[Trigger] {
        self.triggers.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hotkey(&self, id: &str) -> Option<&HotKey> {
        self.hotkeys.get(id)
    }

    pub fn set_hotkey(&mut self, id: &str, hotkey: Option<HotKey>) -> Result<()> {
        if self.action(id).is_none() {
            return Err(WikiError::UnknownAction(id.to_string()));
        }
        match hotkey {
            Some(hotkey) => self.hotkeys.insert(id.to_string(), hotkey),
            None => self.hotkeys.remove(id),
        };
        Ok(())
    }

    /// The action bound to `hotkey`, if any.
    pub fn action_for_hotkey(&self, hotkey: &HotKey) -> Option<&str> {
        self.actions
            .iter()
            .map(|a| a.string_id())
            .find(|id| self.hotkeys.get(*id) == Some(hotkey))
    }

    pub fn title(&self, id: &str) -> Option<String> {
        self.action(id).map(|a| a.title())
    }

    pub fn action_ids(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.string_id()).collect()
    }

    pub fn action(&self, id: &str) -> Option<Rc<dyn Action>> {
        self.actions.iter().find(|a| a.string_id() == id).cloned()
    }

    /// Runs the action registered as `id` against `app`.
    pub fn run_action(app: &mut Application, id: &str, params: &[String]) -> Result<CmdResult> {
        let action = app
            .actions
            .action(id)
            .ok_or_else(|| WikiError::UnknownAction(id.to_string()))?;
        debug!(action = %id, "running action");
        action.run(app, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CmdMessage;
    use std::cell::Cell;

    struct Counter {
        id: &'static str,
        runs: Rc<Cell<usize>>,
    }

    impl Action for Counter {
        fn string_id(&self) -> &str {
            self.id
        }

        fn title(&self) -> String {
            format!("Count {}", self.id)
        }

        fn description(&self) -> String {
            "Counts its runs".into()
        }

        fn run(&self, _app: &mut Application, params: &[String]) -> Result<CmdResult> {
            self.runs.set(self.runs.get() + 1);
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(params.join(" ")));
            Ok(result)
        }
    }

    fn counter(id: &'static str) -> (Rc<dyn Action>, Rc<Cell<usize>>) {
        let runs = Rc::new(Cell::new(0));
        (
            Rc::new(Counter {
                id,
                runs: runs.clone(),
            }),
            runs,
        )
    }

    #[test]
    fn test_register_and_run() {
        let mut app = Application::default();
        let (action, runs) = counter("count");
        app.actions
            .register(action, Some(HotKey::new("I").ctrl().shift()));

        assert_eq!(app.actions.title("count").unwrap(), "Count count");
        assert_eq!(app.actions.hotkey("count").unwrap().to_string(), "Ctrl+Shift+I");

        let result = ActionController::run_action(&mut app, "count", &["a".into(), "b".into()]).unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(result.messages[0].content, "a b");
    }

    #[test]
    fn test_remove_drops_bindings() {
        let mut app = Application::default();
        let (action, runs) = counter("count");
        let hotkey = HotKey::new("F5");
        app.actions.register(action, Some(hotkey.clone()));
        app.actions
            .bind_trigger("count", Trigger::Menu("Tools".into()))
            .unwrap();
        app.actions
            .bind_trigger("count", Trigger::Toolbar("Main".into()))
            .unwrap();
        assert_eq!(app.actions.triggers("count").len(), 2);
        assert_eq!(app.actions.action_for_hotkey(&hotkey), Some("count"));

        assert!(app.actions.remove_action("count"));

        assert!(app.actions.triggers("count").is_empty());
        assert!(app.actions.hotkey("count").is_none());
        assert_eq!(app.actions.action_for_hotkey(&hotkey), None);
        assert!(matches!(
            ActionController::run_action(&mut app, "count", &[]),
            Err(WikiError::UnknownAction(_))
        ));
        assert_eq!(runs.get(), 0);
        assert!(!app.actions.remove_action("count"));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut actions = ActionController::new();
        let (first, _) = counter("count");
        let (second, _) = counter("count");
        actions.register(first, Some(HotKey::new("A")));
        actions
            .bind_trigger("count", Trigger::Menu("Edit".into()))
            .unwrap();
        actions.register(second, None);

        assert_eq!(actions.action_ids(), vec!["count"]);
        assert!(actions.hotkey("count").is_none());
        assert!(actions.triggers("count").is_empty());
    }

    #[test]
    fn test_bind_unknown_action() {
        let mut actions = ActionController::new();
        assert!(matches!(
            actions.bind_trigger("nope", Trigger::Menu("File".into())),
            Err(WikiError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_unbind_trigger() {
        let mut actions = ActionController::new();
        let (action, _) = counter("count");
        actions.register(action, None);
        let menu = Trigger::Menu("Tools".into());
        actions.bind_trigger("count", menu.clone()).unwrap();
        actions.bind_trigger("count", menu.clone()).unwrap();
        assert_eq!(actions.triggers("count").len(), 1);

        assert!(actions.unbind_trigger("count", &menu));
        assert!(actions.triggers("count").is_empty());
        assert!(!actions.unbind_trigger("count", &menu));
        assert!(!actions.unbind_trigger("nope", &menu));
    }

    #[test]
    fn test_set_hotkey() {
        let mut actions = ActionController::new();
        let (action, _) = counter("count");
        actions.register(action, None);
        let hotkey = HotKey::new("S").ctrl();

        actions.set_hotkey("count", Some(hotkey.clone())).unwrap();
        assert_eq!(actions.action_for_hotkey(&hotkey), Some("count"));

        actions.set_hotkey("count", None).unwrap();
        assert!(actions.hotkey("count").is_none());
        assert!(matches!(
            actions.set_hotkey("nope", Some(hotkey)),
            Err(WikiError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_hotkey_parse() {
        let hotkey: HotKey = "ctrl+alt+Delete".parse().unwrap();
        assert_eq!(hotkey, HotKey::new("Delete").ctrl().alt());
        assert_eq!(hotkey.to_string(), "Ctrl+Alt+Delete");
        assert!("Ctrl+".parse::<HotKey>().is_err());
        assert!("Super+X".parse::<HotKey>().is_err());
    }
}
