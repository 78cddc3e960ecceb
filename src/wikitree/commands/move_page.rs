use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn run(doc: &mut Document, id: PageId, new_parent: PageId) -> Result<CmdResult> {
    let old = display_path(doc, id)?;
    doc.move_page(id, new_parent)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Page moved: {} -> {}",
        old,
        display_path(doc, id)?
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{page, wiki};
    use crate::error::WikiError;

    #[test]
    fn moves_under_new_parent() {
        let (_dir, mut doc) = wiki();
        let a = page(&mut doc, "A");
        let b = page(&mut doc, "B");
        let result = run(&mut doc, b, a).unwrap();
        assert_eq!(result.messages[0].content, "Page moved: B -> A/B");
    }

    #[test]
    fn cyclic_move_leaves_tree_alone() {
        let (_dir, mut doc) = wiki();
        let a = page(&mut doc, "A");
        let b = page(&mut doc, "A/B");
        assert!(matches!(
            run(&mut doc, a, b),
            Err(WikiError::CyclicMove { .. })
        ));
        assert_eq!(doc.title_path(b).unwrap(), "A/B");
    }
}
