use crate::commands::helpers::display_path;
use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::page::PageId;
use crate::stats::{PageStat, TreeStat};

pub fn page(doc: &Document, id: PageId) -> Result<CmdResult> {
    let stat = PageStat::new(doc, id)?;
    let mut result = CmdResult::default().with_affected_pages(vec![id]);
    result.add_message(CmdMessage::info(format!(
        "{}: {} words, {} lines, {} chars ({} without spaces), {} attachment(s), {} bytes attached",
        display_path(doc, id)?,
        stat.words,
        stat.lines,
        stat.chars,
        stat.chars_no_spaces,
        stat.attachments_count,
        stat.attachments_size
    )));
    result.page_stat = Some(stat);
    Ok(result)
}

pub fn tree(doc: &Document) -> Result<CmdResult> {
    let stat = TreeStat::new(doc)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "{} page(s), {} distinct tag(s)",
        stat.page_count, stat.tags_count
    )));
    if let Some((depth, _)) = stat.max_depth().first() {
        let deepest = stat
            .max_depth()
            .iter()
            .map(|(_, id)| display_path(doc, *id))
            .collect::<Result<Vec<_>>>()?;
        result.add_message(CmdMessage::info(format!(
            "Max depth {}: {}",
            depth,
            deepest.join(", ")
        )));
    }
    let frequent: Vec<String> = stat
        .frequent_tags()
        .into_iter()
        .take(10)
        .map(|(tag, count)| format!("{} ({})", tag, count))
        .collect();
    if !frequent.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Frequent tags: {}",
            frequent.join(", ")
        )));
    }
    result.tree_stat = Some(stat);
    Ok(result)
}
