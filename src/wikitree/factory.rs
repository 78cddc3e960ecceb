//! # Page Types
//!
//! A page's `type` tag selects a [`PageFactory`] from the document's
//! [`FactoryRegistry`]. The factory prepares the options of new pages and
//! supplies the [`Renderer`] the HTML cache uses for that type.
//!
//! Built-in types: `wiki` (Markdown), `text`, `html` and `search`. Plugins
//! may register more, or replace a built-in by registering the same tag.

use crate::options::PageOptions;
use crate::render::renderers::{HtmlRenderer, MarkdownRenderer, SearchRenderer, TextRenderer};
use crate::render::Renderer;

pub trait PageFactory {
    /// Tag stored in the page options (`"wiki"`, `"text"`, ...)
    fn type_tag(&self) -> &str;

    /// Name shown to users when picking a page type
    fn display_name(&self) -> &str;

    fn renderer(&self) -> &dyn Renderer;

    /// Hook to adjust the options of a page about to be created.
    fn prepare(&self, _options: &mut PageOptions) {}
}

pub struct WikiPageFactory {
    renderer: MarkdownRenderer,
}

impl PageFactory for WikiPageFactory {
    fn type_tag(&self) -> &str {
        "wiki"
    }

    fn display_name(&self) -> &str {
        "Wiki Page"
    }

    fn renderer(&self) -> &dyn Renderer {
        &self.renderer
    }
}

pub struct TextPageFactory {
    renderer: TextRenderer,
}

impl PageFactory for TextPageFactory {
    fn type_tag(&self) -> &str {
        "text"
    }

    fn display_name(&self) -> &str {
        "Text Page"
    }

    fn renderer(&self) -> &dyn Renderer {
        &self.renderer
    }
}

pub struct HtmlPageFactory {
    renderer: HtmlRenderer,
}

impl PageFactory for HtmlPageFactory {
    fn type_tag(&self) -> &str {
        "html"
    }

    fn display_name(&self) -> &str {
        "HTML Page"
    }

    fn renderer(&self) -> &dyn Renderer {
        &self.renderer
    }
}

pub struct SearchPageFactory {
    renderer: SearchRenderer,
}

impl PageFactory for SearchPageFactory {
    fn type_tag(&self) -> &str {
        "search"
    }

    fn display_name(&self) -> &str {
        "Search Page"
    }

    fn renderer(&self) -> &dyn Renderer {
        &self.renderer
    }

    fn prepare(&self, options: &mut PageOptions) {
        // Results depend on the whole tree, never on this page alone
        options.set("search", "live", true);
    }
}

#[derive(Default)]
pub struct FactoryRegistry {
    factories: Vec<Box<dyn PageFactory>>,
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(WikiPageFactory {
            renderer: MarkdownRenderer,
        }));
        registry.register(Box::new(TextPageFactory {
            renderer: TextRenderer,
        }));
        registry.register(Box::new(HtmlPageFactory {
            renderer: HtmlRenderer,
        }));
        registry.register(Box::new(SearchPageFactory {
            renderer: SearchRenderer,
        }));
        registry
    }

    /// Registers a factory, replacing any factory with the same tag.
    pub fn register(&mut self, factory: Box<dyn PageFactory>) {
        match self
            .factories
            .iter()
            .position(|f| f.type_tag() == factory.type_tag())
        {
            Some(pos) => self.factories[pos] = factory,
            None => self.factories.push(factory),
        }
    }

    pub fn unregister(&mut self, type_tag: &str) -> bool {
        let before = self.factories.len();
        self.factories.retain(|f| f.type_tag() != type_tag);
        before != self.factories.len()
    }

    pub fn get(&self, type_tag: &str) -> Option<&dyn PageFactory> {
        self.factories
            .iter()
            .find(|f| f.type_tag() == type_tag)
            .map(|f| f.as_ref())
    }

    pub fn tags(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.type_tag()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = FactoryRegistry::with_defaults();
        assert_eq!(registry.tags(), vec!["wiki", "text", "html", "search"]);
        assert_eq!(registry.get("text").unwrap().display_name(), "Text Page");
        assert!(registry.get("tex").is_none());
    }

    #[test]
    fn test_register_replaces_same_tag() {
        let mut registry = FactoryRegistry::with_defaults();
        registry.register(Box::new(TextPageFactory {
            renderer: TextRenderer,
        }));
        assert_eq!(registry.tags().len(), 4);

        assert!(registry.unregister("text"));
        assert!(!registry.unregister("text"));
        assert!(registry.get("text").is_none());
    }

    #[test]
    fn test_search_factory_marks_options() {
        let registry = FactoryRegistry::with_defaults();
        let mut options = PageOptions::new("Find", "search");
        registry.get("search").unwrap().prepare(&mut options);
        assert_eq!(options.get_bool("search", "live"), Some(true));
    }
}
