use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

/// Sorts the children of `id` by title.
pub fn sort(doc: &mut Document, id: PageId) -> Result<CmdResult> {
    doc.sort_children_alphabetical(id)?;
    let children = doc.children(id)?.to_vec();
    let mut result = CmdResult::default().with_affected_pages(children);
    result.add_message(CmdMessage::success(format!(
        "Children of {} sorted",
        display_path(doc, id)?
    )));
    Ok(result)
}

/// Moves `id` to position `order` among its siblings.
pub fn set(doc: &mut Document, id: PageId, order: usize) -> Result<CmdResult> {
    doc.set_order(id, order)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "{} is now at position {}",
        display_path(doc, id)?,
        doc.page(id)?.order()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{page, wiki};

    #[test]
    fn sorts_naturally() {
        let (_dir, mut doc) = wiki();
        let p10 = page(&mut doc, "Page 10");
        let p2 = page(&mut doc, "page 2");
        let p1 = page(&mut doc, "Page 1");
        let root = doc.root();

        let result = sort(&mut doc, root).unwrap();
        assert_eq!(result.affected_pages, vec![p1, p2, p10]);
    }

    #[test]
    fn set_order_is_clamped() {
        let (_dir, mut doc) = wiki();
        let a = page(&mut doc, "A");
        page(&mut doc, "B");
        let result = set(&mut doc, a, 10).unwrap();
        assert_eq!(doc.page(a).unwrap().order(), 1);
        assert_eq!(result.messages[0].content, "A is now at position 1");
    }
}
