use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn run(doc: &mut Document, id: PageId, new_title: &str) -> Result<CmdResult> {
    let old = display_path(doc, id)?;
    doc.rename(id, new_title)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Page renamed: {} -> {}",
        old,
        display_path(doc, id)?
    )));
    Ok(result)
}
