use crate::commands::{CmdResult, TreeEntry};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

/// Lists the subtree under `from` (excluded) in tree order.
pub fn run(doc: &Document, from: PageId) -> Result<CmdResult> {
    let listed = doc
        .iter_subtree(from)
        .into_iter()
        .skip(1)
        .map(|id| TreeEntry::from_page(doc, id))
        .collect::<Result<Vec<_>>>()?;
    Ok(CmdResult::default().with_listed_pages(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{page, wiki};

    #[test]
    fn lists_in_tree_order() {
        let (_dir, mut doc) = wiki();
        page(&mut doc, "A/A1");
        page(&mut doc, "B");
        page(&mut doc, "A/A2");

        let result = run(&doc, doc.root()).unwrap();
        let paths: Vec<_> = result
            .listed_pages
            .iter()
            .map(|e| (e.title_path.as_str(), e.depth))
            .collect();
        assert_eq!(paths, vec![("A", 1), ("A/A1", 2), ("A/A2", 2), ("B", 1)]);
    }

    #[test]
    fn lists_subtree_only() {
        let (_dir, mut doc) = wiki();
        let a = page(&mut doc, "A");
        page(&mut doc, "A/A1");
        page(&mut doc, "B");

        let result = run(&doc, a).unwrap();
        assert_eq!(result.listed_pages.len(), 1);
        assert_eq!(result.listed_pages[0].title, "A1");
    }
}
