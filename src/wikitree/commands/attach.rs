use crate::attachments::Attachments;
use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::{Result, WikiError};
use crate::page::PageId;
use std::path::PathBuf;

fn store_of(doc: &Document, id: PageId) -> Result<Attachments> {
    Ok(Attachments::new(doc.page(id)?.path()))
}

fn check_writable(doc: &Document, id: PageId) -> Result<()> {
    if doc.is_readonly() || doc.page(id)?.readonly() {
        return Err(WikiError::ReadOnly(display_path(doc, id)?));
    }
    Ok(())
}

pub fn attach(doc: &Document, id: PageId, files: &[PathBuf]) -> Result<CmdResult> {
    check_writable(doc, id)?;
    let names = store_of(doc, id)?.attach(files)?;
    let mut result = CmdResult::default()
        .with_affected_pages(vec![id])
        .with_attachments(names);
    result.add_message(CmdMessage::success(format!(
        "Attached {} file(s) to {}",
        result.attachments.len(),
        display_path(doc, id)?
    )));
    Ok(result)
}

pub fn detach(doc: &Document, id: PageId, name: &str) -> Result<CmdResult> {
    check_writable(doc, id)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    if store_of(doc, id)?.remove(name)? {
        result.add_message(CmdMessage::success(format!("Removed attachment {}", name)));
    } else {
        result.add_message(CmdMessage::warning(format!("No attachment named {}", name)));
    }
    Ok(result)
}

pub fn list(doc: &Document, id: PageId) -> Result<CmdResult> {
    let names = store_of(doc, id)?.list()?;
    Ok(CmdResult::default()
        .with_affected_pages(vec![id])
        .with_attachments(names))
}
