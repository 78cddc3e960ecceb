//! Files attached to a page live in the page's `__attach` folder.
//!
//! `attach` is not atomic across its file list: a failure leaves the files
//! copied so far in place.

use crate::error::{Result, WikiError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ATTACH_DIRNAME: &str = "__attach";

#[derive(Debug, Clone)]
pub struct Attachments {
    page_dir: PathBuf,
}

impl Attachments {
    pub fn new(page_dir: impl Into<PathBuf>) -> Self {
        Self {
            page_dir: page_dir.into(),
        }
    }

    pub fn attach_dir(&self) -> PathBuf {
        self.page_dir.join(ATTACH_DIRNAME)
    }

    /// Copies `files` into the attachment folder, overwriting same-named
    /// attachments. Returns the attached file names.
    pub fn attach<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<String>> {
        let dir = self.attach_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| WikiError::attachment_io(&dir, e))?;
        }

        let mut attached = Vec::with_capacity(files.len());
        for source in files {
            let source = source.as_ref();
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    WikiError::attachment_io(
                        source,
                        io::Error::new(io::ErrorKind::InvalidInput, "not a file path"),
                    )
                })?;

            fs::copy(source, dir.join(&name)).map_err(|e| WikiError::attachment_io(source, e))?;
            debug!(file = %name, "attached");
            attached.push(name);
        }
        Ok(attached)
    }

    /// Sorted file names; empty when the folder does not exist.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.attach_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WikiError::attachment_io(&dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| WikiError::attachment_io(&dir, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Returns whether a file was deleted.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_of(name)?;
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match result {
            Ok(()) => {
                debug!(file = %name, "attachment removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WikiError::attachment_io(path, e)),
        }
    }

    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
            return Err(WikiError::InvalidName(format!(
                "'{}' is not an attachment name",
                name
            )));
        }
        Ok(self.attach_dir().join(name))
    }

    /// Total size in bytes of the top-level attachment files.
    pub fn total_size(&self) -> Result<u64> {
        let mut total = 0;
        for name in self.list()? {
            let path = self.attach_dir().join(&name);
            let meta = fs::metadata(&path).map_err(|e| WikiError::attachment_io(&path, e))?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }
}
