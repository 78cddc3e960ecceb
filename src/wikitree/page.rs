use crate::error::{Result, WikiError};
use crate::options::PageOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const CONTENT_FILENAME: &str = "__page.text";
pub const RESERVED_PREFIX: &str = "__";

const INVALID_FS_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '%'];

/// Stable page identity. Survives renames, moves and reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the page tree.
///
/// Pages are owned by a [`crate::document::Document`] and only mutated
/// through it, which keeps sibling order, paths and parent links consistent.
#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) id: PageId,
    pub(crate) options: PageOptions,
    pub(crate) parent: Option<PageId>,
    pub(crate) children: Vec<PageId>,
    pub(crate) path: PathBuf,
    // Set for every page of a document opened read-only
    pub(crate) locked: bool,
}

impl Page {
    pub(crate) fn new(options: PageOptions, parent: Option<PageId>, path: PathBuf) -> Self {
        Self {
            id: PageId(options.id),
            options,
            parent,
            children: Vec::new(),
            path,
            locked: false,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.options.title
    }

    pub fn order(&self) -> usize {
        self.options.order
    }

    pub fn page_type(&self) -> &str {
        &self.options.page_type
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.options.tags
    }

    pub fn icon(&self) -> Option<PathBuf> {
        self.options.icon.as_ref().map(|name| self.path.join(name))
    }

    pub fn readonly(&self) -> bool {
        self.options.readonly || self.locked
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.options.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.options.modified
    }

    pub fn parent(&self) -> Option<PageId> {
        self.parent
    }

    pub fn children(&self) -> &[PageId] {
        &self.children
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn content_path(&self) -> PathBuf {
        self.path.join(CONTENT_FILENAME)
    }
}

/// Maps a title to the folder name backing the page.
///
/// Characters that common file systems reject, `%` itself, control
/// characters and leading/trailing spaces or dots are written as `%XX` over
/// their UTF-8 bytes. [`title_from_folder`] reverses the mapping.
pub fn folder_name(title: &str) -> String {
    let chars: Vec<char> = title.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut out = String::with_capacity(title.len());

    for (i, &c) in chars.iter().enumerate() {
        let at_edge = i == 0 || i == last;
        let escape = INVALID_FS_CHARS.contains(&c)
            || c.is_control()
            || (at_edge && (c == ' ' || c == '.'));

        if escape {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn title_from_folder(folder: &str) -> String {
    let bytes = folder.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Checks a title and returns its folder name.
pub fn validate_title(title: &str) -> Result<String> {
    if title.trim().is_empty() {
        return Err(WikiError::InvalidName("title cannot be empty".to_string()));
    }
    // Titles are path segments for lookups
    if title.contains('/') {
        return Err(WikiError::InvalidName(format!(
            "'{}' contains '/'",
            title
        )));
    }
    let folder = folder_name(title);
    if folder.starts_with(RESERVED_PREFIX) {
        return Err(WikiError::InvalidName(format!(
            "'{}' starts with the reserved prefix '{}'",
            title, RESERVED_PREFIX
        )));
    }
    Ok(folder)
}

/// Two folder names clash if they only differ by case.
pub(crate) fn same_folder(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Locale-friendly title comparison. Titles are compared with accents
/// folded and case ignored, digit runs by numeric value. Ties fall back to
/// the accented lowercase form, then the raw title.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    natural_cmp(&collation_key(a), &collation_key(b))
        .then_with(|| natural_cmp(&lowercase_chars(a), &lowercase_chars(b)))
        .then_with(|| a.cmp(b))
}

/// Base letters only: `é` -> `e`, `Ё` -> `е`.
fn collation_key(title: &str) -> Vec<char> {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn lowercase_chars(title: &str) -> Vec<char> {
    title.chars().flat_map(char::to_lowercase).collect()
}

fn natural_cmp(la: &[char], lb: &[char]) -> Ordering {
    let (mut i, mut j) = (0, 0);

    while i < la.len() && j < lb.len() {
        if la[i].is_ascii_digit() && lb[j].is_ascii_digit() {
            let si = i;
            while i < la.len() && la[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < lb.len() && lb[j].is_ascii_digit() {
                j += 1;
            }
            let na: String = la[si..i].iter().collect();
            let nb: String = lb[sj..j].iter().collect();
            let na = na.trim_start_matches('0');
            let nb = nb.trim_start_matches('0');
            let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = la[i].cmp(&lb[j]);
        if ord != Ordering::Equal {
            return ord;
        }
        i += 1;
        j += 1;
    }

    (la.len() - i).cmp(&(lb.len() - j))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_plain() {
        assert_eq!(folder_name("Страница 1"), "Страница 1");
        assert_eq!(folder_name("Notes-2024"), "Notes-2024");
    }

    #[test]
    fn test_folder_name_escapes_invalid_chars() {
        assert_eq!(folder_name("a/b"), "a%2Fb");
        assert_eq!(folder_name("why?"), "why%3F");
        assert_eq!(folder_name("100%"), "100%25");
        assert_eq!(folder_name(" padded "), "%20padded%20");
        assert_eq!(folder_name(".."), "%2E%2E");
    }

    #[test]
    fn test_folder_name_round_trips() {
        for title in ["a/b", "C:\\dir", "x*y?z", "50% off", " lead", "trail.", "Ünïcødé <3>"] {
            assert_eq!(title_from_folder(&folder_name(title)), title);
        }
    }

    #[test]
    fn test_title_from_folder_keeps_stray_percent() {
        assert_eq!(title_from_folder("100%"), "100%");
        assert_eq!(title_from_folder("%zz"), "%zz");
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("__attach").is_err());
        assert!(validate_title("a/b").is_err());
        assert_eq!(validate_title("Ok").unwrap(), "Ok");
    }

    #[test]
    fn test_compare_titles_natural() {
        let mut titles = vec!["Page 10", "page 2", "Page 1", "apple", "Zebra"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(titles, vec!["apple", "Page 1", "page 2", "Page 10", "Zebra"]);
    }

    #[test]
    fn test_compare_titles_cyrillic() {
        let mut titles = vec!["Страница 8", "Страница 2", "страница 5", "Страница 1"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(
            titles,
            vec!["Страница 1", "Страница 2", "страница 5", "Страница 8"]
        );
    }

    #[test]
    fn test_compare_titles_folds_accents() {
        let mut titles = vec!["zebra", "éclair", "apple", "Яблоко", "Ёлка", "Жук"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(
            titles,
            vec!["apple", "éclair", "zebra", "Ёлка", "Жук", "Яблоко"]
        );
    }

    #[test]
    fn test_compare_titles_accent_breaks_ties() {
        let mut titles = vec!["resume", "résumé", "Resume", "resumes"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(titles, vec!["Resume", "resume", "résumé", "resumes"]);
    }
}
