//! Page and tree statistics.

use crate::attachments::Attachments;
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageStat {
    pub chars: usize,
    pub chars_no_spaces: usize,
    pub words: usize,
    pub lines: usize,
    pub attachments_count: usize,
    pub attachments_size: u64,
}

impl PageStat {
    pub fn new(doc: &Document, id: PageId) -> Result<Self> {
        let content = doc.content(id)?;
        let attachments = Attachments::new(doc.page(id)?.path());

        Ok(Self {
            chars: content.chars().count(),
            chars_no_spaces: content.chars().filter(|c| !c.is_whitespace()).count(),
            words: content.split_whitespace().count(),
            lines: content.lines().count(),
            attachments_count: attachments.list()?.len(),
            attachments_size: attachments.total_size()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct PageEntry {
    id: PageId,
    depth: usize,
    modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeStat {
    pub page_count: usize,
    pub tags_count: usize,
    pages: Vec<PageEntry>,
    tags: BTreeMap<String, usize>,
}

impl TreeStat {
    pub fn new(doc: &Document) -> Result<Self> {
        let mut pages = Vec::new();
        let mut tags: BTreeMap<String, usize> = BTreeMap::new();

        for id in doc.all_pages() {
            let page = doc.page(id)?;
            for tag in page.tags() {
                *tags.entry(tag.clone()).or_default() += 1;
            }
            pages.push(PageEntry {
                id,
                depth: doc.depth(id)?,
                modified: page.modified(),
            });
        }

        Ok(Self {
            page_count: pages.len(),
            tags_count: tags.len(),
            pages,
            tags,
        })
    }

    /// Every page at the deepest level, with that depth. Children of the
    /// root are at depth 1.
    pub fn max_depth(&self) -> Vec<(usize, PageId)> {
        let Some(max) = self.pages.iter().map(|p| p.depth).max() else {
            return Vec::new();
        };
        self.pages
            .iter()
            .filter(|p| p.depth == max)
            .map(|p| (max, p.id))
            .collect()
    }

    /// Tags with their page counts, most used first.
    pub fn frequent_tags(&self) -> Vec<(String, usize)> {
        let mut tags: Vec<(String, usize)> =
            self.tags.iter().map(|(t, n)| (t.clone(), *n)).collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }

    /// Pages, most recently modified first.
    pub fn pages_by_date(&self) -> Vec<(PageId, DateTime<Utc>)> {
        let mut pages: Vec<_> = self.pages.iter().map(|p| (p.id, p.modified)).collect();
        pages.sort_by(|a, b| b.1.cmp(&a.1));
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc() -> (TempDir, Document) {
        let dir = TempDir::new().unwrap();
        let doc = Document::create(dir.path().join("wiki")).unwrap();
        (dir, doc)
    }

    #[test]
    fn test_page_stat_counts() {
        let (dir, mut doc) = doc();
        let root = doc.root();
        let id = doc
            .create_child(root, "A", "text", Vec::<String>::new())
            .unwrap();
        doc.set_content(id, "one two\nthree  four\n").unwrap();
        let file = dir.path().join("f.bin");
        fs::write(&file, [0u8; 10]).unwrap();
        Attachments::new(doc.page(id).unwrap().path())
            .attach(&[&file])
            .unwrap();

        let stat = PageStat::new(&doc, id).unwrap();
        assert_eq!(stat.chars, 20);
        assert_eq!(stat.chars_no_spaces, 15);
        assert_eq!(stat.words, 4);
        assert_eq!(stat.lines, 2);
        assert_eq!(stat.attachments_count, 1);
        assert_eq!(stat.attachments_size, 10);
    }

    #[test]
    fn test_empty_page_stat() {
        let (_dir, mut doc) = doc();
        let root = doc.root();
        let id = doc
            .create_child(root, "A", "text", Vec::<String>::new())
            .unwrap();
        assert_eq!(PageStat::new(&doc, id).unwrap(), PageStat::default());
    }

    #[test]
    fn test_tree_stat() {
        let (_dir, mut doc) = doc();
        let root = doc.root();
        let a = doc.create_child(root, "A", "text", ["x", "y"]).unwrap();
        let b = doc.create_child(a, "B", "text", ["x"]).unwrap();
        let c = doc.create_child(a, "C", "text", ["z"]).unwrap();
        doc.set_content(a, "touched").unwrap();

        let stat = TreeStat::new(&doc).unwrap();
        assert_eq!(stat.page_count, 3);
        assert_eq!(stat.tags_count, 3);
        assert_eq!(stat.max_depth(), vec![(2, b), (2, c)]);
        assert_eq!(
            stat.frequent_tags(),
            vec![("x".to_string(), 2), ("y".to_string(), 1), ("z".to_string(), 1)]
        );
        assert_eq!(stat.pages_by_date()[0].0, a);
    }

    #[test]
    fn test_empty_tree_stat() {
        let (_dir, doc) = doc();
        let stat = TreeStat::new(&doc).unwrap();
        assert_eq!(stat.page_count, 0);
        assert!(stat.max_depth().is_empty());
        assert!(stat.frequent_tags().is_empty());
    }
}
