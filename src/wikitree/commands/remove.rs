use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn run(doc: &mut Document, id: PageId) -> Result<CmdResult> {
    let name = display_path(doc, id)?;
    let removed = doc.iter_subtree(id);
    doc.remove(id)?;

    let mut result = CmdResult::default().with_affected_pages(removed);
    let count = result.affected_pages.len();
    result.add_message(CmdMessage::success(if count > 1 {
        format!("Page removed: {} (with {} subpages)", name, count - 1)
    } else {
        format!("Page removed: {}", name)
    }));
    Ok(result)
}
