use crate::document::Document;
use crate::error::{Result, WikiError};
use crate::page::PageId;

/// Resolves a title path, failing with `PageNotFound` when nothing matches.
pub fn resolve_page(doc: &Document, title_path: &str) -> Result<PageId> {
    doc.lookup(title_path)?
        .ok_or_else(|| WikiError::PageNotFound(title_path.to_string()))
}

/// Title path for messages; `/` for the root.
pub fn display_path(doc: &Document, id: PageId) -> Result<String> {
    if doc.page(id)?.is_root() {
        return Ok("/".to_string());
    }
    doc.title_path(id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::document::Document;
    use tempfile::TempDir;

    pub fn wiki() -> (TempDir, Document) {
        let dir = TempDir::new().unwrap();
        let doc = Document::create(dir.path().join("wiki")).unwrap();
        (dir, doc)
    }

    /// Creates text pages along `title_path`, reusing existing segments.
    pub fn page(doc: &mut Document, title_path: &str) -> crate::page::PageId {
        let mut current = doc.root();
        for title in title_path.split('/') {
            let existing = doc
                .children(current)
                .unwrap()
                .iter()
                .copied()
                .find(|c| doc.page(*c).unwrap().title() == title);
            current = match existing {
                Some(id) => id,
                None => doc
                    .create_child(current, title, "text", Vec::<String>::new())
                    .unwrap(),
            };
        }
        current
    }
}
