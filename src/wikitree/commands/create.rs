use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn run(
    doc: &mut Document,
    parent: PageId,
    title: &str,
    page_type: &str,
    tags: &[String],
) -> Result<CmdResult> {
    let id = doc.create_child(parent, title, page_type, tags.iter().cloned())?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Page created: {}",
        display_path(doc, id)?
    )));
    Ok(result)
}
