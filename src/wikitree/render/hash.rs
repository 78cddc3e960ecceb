use crate::attachments::Attachments;
use crate::error::{Result, WikiError};
use crate::page::Page;
use sha2::{Digest, Sha256};
use std::fs;
use std::time::UNIX_EPOCH;

/// Digest of everything that affects a page's rendered HTML.
///
/// Covers the page type, content, tags, the attachment listing (name, size,
/// mtime) and the template fingerprint. Every field is length-prefixed, and
/// tags and attachments are fed in sorted order so the digest does not depend
/// on directory iteration order.
pub fn content_hash(page: &Page, content: &str, template_fingerprint: &str) -> Result<String> {
    let mut hasher = Sha256::new();
    feed(&mut hasher, page.page_type().as_bytes());
    feed(&mut hasher, content.as_bytes());

    for tag in page.tags() {
        feed(&mut hasher, tag.as_bytes());
    }

    let attachments = Attachments::new(page.path());
    for name in attachments.list()? {
        let path = attachments.attach_dir().join(&name);
        let meta = fs::metadata(&path).map_err(|e| WikiError::attachment_io(&path, e))?;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or_default();

        feed(&mut hasher, name.as_bytes());
        feed(&mut hasher, &meta.len().to_le_bytes());
        feed(&mut hasher, &mtime.to_le_bytes());
    }

    feed(&mut hasher, template_fingerprint.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn feed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
