use super::hash::content_hash;
use super::{HtmlTemplate, RenderContext};
use crate::config::WikiConfig;
use crate::document::Document;
use crate::error::{Result, WikiError};
use crate::options::{write_atomic, DEFAULT_PAGE_TYPE};
use crate::page::{Page, PageId};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const HTML_FILENAME: &str = "__content.html";
pub const HASH_SECTION: &str = "render";
pub const HASH_KEY: &str = "content_hash";

/// Renders pages to `__content.html` inside their folders and reuses the
/// file while the page's content hash is unchanged.
///
/// Read-only pages always reuse an existing file. Pages marked
/// `search.live` are rendered on every request otherwise.
#[derive(Debug, Clone)]
pub struct HtmlCache {
    config: WikiConfig,
    template: HtmlTemplate,
}

impl HtmlCache {
    pub fn new(config: &WikiConfig) -> Self {
        Self {
            config: config.clone(),
            template: HtmlTemplate::from_config(config),
        }
    }

    pub fn html_path(page: &Page) -> PathBuf {
        page.path().join(HTML_FILENAME)
    }

    fn fingerprint(&self) -> String {
        format!("{}\u{0}{}", self.template.fingerprint(), self.config.empty_content)
    }

    /// Current hash of the page, as [`HtmlCache::get_html`] would store it.
    pub fn current_hash(&self, doc: &Document, id: PageId) -> Result<String> {
        let page = doc.page(id)?;
        content_hash(page, &doc.content(id)?, &self.fingerprint())
    }

    pub fn can_read_from_cache(&self, doc: &Document, id: PageId) -> Result<bool> {
        let page = doc.page(id)?;
        if !Self::html_path(page).exists() {
            return Ok(false);
        }
        if page.readonly() {
            return Ok(true);
        }
        if page.options().get_bool("search", "live").unwrap_or(false) {
            return Ok(false);
        }
        let stored = page.options().get_str(HASH_SECTION, HASH_KEY);
        Ok(stored == Some(self.current_hash(doc, id)?.as_str()))
    }

    /// Path of the page's up-to-date HTML, rendering it first if needed.
    pub fn get_html(&self, doc: &mut Document, id: PageId) -> Result<PathBuf> {
        let page = doc.page(id)?;
        let path = Self::html_path(page);
        if self.can_read_from_cache(doc, id)? {
            debug!(page = %id, "html cache hit");
            return Ok(path);
        }

        let content = doc.content(id)?;
        let hash = content_hash(page, &content, &self.fingerprint())?;
        let factory = doc
            .registry()
            .get(page.page_type())
            .ok_or_else(|| WikiError::UnknownPageType(page.page_type().to_string()))?;

        let source = if content.trim().is_empty() && page.page_type() == DEFAULT_PAGE_TYPE {
            self.config.empty_content.as_str()
        } else {
            content.as_str()
        };
        let ctx = RenderContext {
            document: &*doc,
            config: &self.config,
        };
        let rendered = factory.renderer().render(&ctx, page, source)?;
        write_atomic(&path, self.template.substitute(&rendered).as_bytes())?;
        debug!(page = %id, "html rendered");

        if let Err(e) = doc.set_option(id, HASH_SECTION, HASH_KEY, &hash) {
            warn!(page = %id, error = %e, "could not store content hash");
        }
        Ok(path)
    }

    /// Forgets the stored hash so the next request renders again.
    pub fn invalidate(doc: &mut Document, id: PageId) -> Result<()> {
        doc.page(id)?;
        if let Err(e) = doc.remove_option(id, HASH_SECTION, HASH_KEY) {
            warn!(page = %id, error = %e, "could not clear content hash");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::Attachments;
    use std::fs;
    use tempfile::TempDir;

    fn setup(page_type: &str) -> (TempDir, Document, PageId, HtmlCache) {
        let dir = TempDir::new().unwrap();
        let mut doc = Document::create(dir.path().join("wiki")).unwrap();
        let root = doc.root();
        let id = doc
            .create_child(root, "Page", page_type, Vec::<String>::new())
            .unwrap();
        (dir, doc, id, HtmlCache::new(&WikiConfig::default()))
    }

    #[test]
    fn test_renders_then_hits() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        doc.set_content(id, "# Hello").unwrap();

        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
        let path = cache.get_html(&mut doc, id).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<h1>Hello</h1>"));
        assert!(cache.can_read_from_cache(&doc, id).unwrap());
    }

    #[test]
    fn test_content_change_invalidates() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        doc.set_content(id, "one").unwrap();
        cache.get_html(&mut doc, id).unwrap();

        doc.set_content(id, "two").unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
        let path = cache.get_html(&mut doc, id).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("two"));
    }

    #[test]
    fn test_tags_and_attachments_invalidate() {
        let (dir, mut doc, id, cache) = setup("wiki");
        cache.get_html(&mut doc, id).unwrap();

        doc.add_tag(id, "new").unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
        cache.get_html(&mut doc, id).unwrap();

        let file = dir.path().join("a.txt");
        fs::write(&file, "data").unwrap();
        Attachments::new(doc.page(id).unwrap().path())
            .attach(&[&file])
            .unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
    }

    #[test]
    fn test_style_change_invalidates() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        cache.get_html(&mut doc, id).unwrap();

        let styled = HtmlCache::new(&WikiConfig {
            user_style: "body { color: blue; }".into(),
            ..WikiConfig::default()
        });
        assert!(!styled.can_read_from_cache(&doc, id).unwrap());
    }

    #[test]
    fn test_deleted_html_is_regenerated() {
        let (_dir, mut doc, id, cache) = setup("text");
        let path = cache.get_html(&mut doc, id).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
        assert!(cache.get_html(&mut doc, id).unwrap().exists());
    }

    #[test]
    fn test_invalidate_forces_render() {
        let (_dir, mut doc, id, cache) = setup("text");
        cache.get_html(&mut doc, id).unwrap();
        HtmlCache::invalidate(&mut doc, id).unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
    }

    fn break_options(doc: &Document, id: PageId) {
        let options = crate::options::PageOptions::path_in(doc.page(id).unwrap().path());
        fs::remove_file(&options).unwrap();
        fs::create_dir(&options).unwrap();
    }

    #[test]
    fn test_unsaved_hash_still_renders() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        doc.set_content(id, "# Kept").unwrap();
        break_options(&doc, id);

        let path = cache.get_html(&mut doc, id).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("<h1>Kept</h1>"));
    }

    #[test]
    fn test_unsaved_invalidate_is_not_an_error() {
        let (_dir, mut doc, id, cache) = setup("text");
        cache.get_html(&mut doc, id).unwrap();
        break_options(&doc, id);

        HtmlCache::invalidate(&mut doc, id).unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());
    }

    #[test]
    fn test_empty_wiki_page_uses_placeholder() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        let path = cache.get_html(&mut doc, id).unwrap();
        assert!(fs::read_to_string(path)
            .unwrap()
            .contains("<em>This page is empty.</em>"));
    }

    #[test]
    fn test_readonly_page_serves_stale_file() {
        let (_dir, mut doc, id, cache) = setup("wiki");
        doc.set_content(id, "old").unwrap();
        cache.get_html(&mut doc, id).unwrap();

        // Changed on disk behind the document's back
        fs::write(doc.page(id).unwrap().content_path(), "new").unwrap();
        doc.set_page_readonly(id, true).unwrap();

        assert!(cache.can_read_from_cache(&doc, id).unwrap());
        let path = cache.get_html(&mut doc, id).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("old"));
    }

    #[test]
    fn test_search_page_always_renders() {
        let (_dir, mut doc, id, cache) = setup("search");
        let root = doc.root();
        doc.set_content(id, "rust").unwrap();
        cache.get_html(&mut doc, id).unwrap();
        assert!(!cache.can_read_from_cache(&doc, id).unwrap());

        let hit = doc
            .create_child(root, "Rust notes", "text", Vec::<String>::new())
            .unwrap();
        let path = cache.get_html(&mut doc, id).unwrap();
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("page://Rust notes"));
        assert!(doc.contains(hit));
    }

    #[test]
    fn test_hash_is_stable() {
        let (_dir, doc, id, cache) = setup("wiki");
        assert_eq!(
            cache.current_hash(&doc, id).unwrap(),
            cache.current_hash(&doc, id).unwrap()
        );
        assert_eq!(cache.current_hash(&doc, id).unwrap().len(), 64);
    }
}
