use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use std::path::Path;

pub fn run(path: &Path) -> Result<CmdResult> {
    let doc = Document::create(path)?;
    let mut result = CmdResult::default().with_affected_pages(vec![doc.root()]);
    result.add_message(CmdMessage::success(format!(
        "Initialized wiki at {}",
        path.display()
    )));
    Ok(result)
}

/// Rewrites broken root options with defaults so the wiki loads again.
pub fn reset_root(path: &Path) -> Result<CmdResult> {
    Document::clear_config_file(path)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::warning(format!(
        "Root options of {} reset to defaults",
        path.display()
    )));
    Ok(result)
}
