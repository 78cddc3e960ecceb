use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;

pub fn add(doc: &mut Document, id: PageId, tags: &[String]) -> Result<CmdResult> {
    for tag in tags {
        doc.add_tag(id, tag)?;
    }
    summary(doc, id)
}

pub fn remove(doc: &mut Document, id: PageId, tags: &[String]) -> Result<CmdResult> {
    for tag in tags {
        doc.remove_tag(id, tag)?;
    }
    summary(doc, id)
}

fn summary(doc: &Document, id: PageId) -> Result<CmdResult> {
    let tags: Vec<&str> = doc.page(id)?.tags().iter().map(String::as_str).collect();
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::info(format!(
        "Tags of {}: {}",
        display_path(doc, id)?,
        if tags.is_empty() {
            "(none)".to_string()
        } else {
            tags.join(", ")
        }
    )));
    Ok(result)
}
