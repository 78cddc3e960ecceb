use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn run(doc: &mut Document, id: PageId, content: &str) -> Result<CmdResult> {
    doc.set_content(id, content)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Content of {} updated ({} bytes)",
        display_path(doc, id)?,
        content.len()
    )));
    Ok(result)
}
