use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;
use crate::render::cache::HtmlCache;

/// Brings the HTML of each page up to date and returns the file paths.
pub fn run(doc: &mut Document, cache: &HtmlCache, ids: &[PageId]) -> Result<CmdResult> {
    let mut result = CmdResult::default().with_affected_pages(ids.to_vec());
    for id in ids {
        let cached = cache.can_read_from_cache(doc, *id)?;
        let path = cache.get_html(doc, *id)?;
        if !cached {
            result.add_message(CmdMessage::info(format!(
                "Rendered {}",
                display_path(doc, *id)?
            )));
        }
        result.html_paths.push(path);
    }
    Ok(result)
}

pub fn invalidate(doc: &mut Document, ids: &[PageId]) -> Result<CmdResult> {
    for id in ids {
        HtmlCache::invalidate(doc, *id)?;
    }
    let mut result = CmdResult::default().with_affected_pages(ids.to_vec());
    result.add_message(CmdMessage::success(format!(
        "Invalidated {} page(s)",
        ids.len()
    )));
    Ok(result)
}
