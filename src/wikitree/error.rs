use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("A page titled '{title}' already exists under '{parent}'")]
    DuplicateTitle { parent: String, title: String },

    #[error("Invalid page name: {0}")]
    InvalidName(String),

    #[error("Invalid page path: '{0}'")]
    InvalidPath(String),

    #[error("Cannot move '{page}' into its own subtree ('{target}')")]
    CyclicMove { page: String, target: String },

    #[error("The root page cannot be removed")]
    RootRemoval,

    #[error("Invalid wiki root options in '{path}': {details}")]
    RootFormat { path: PathBuf, details: String },

    #[error("Attachment I/O failed for '{path}': {source}")]
    AttachmentIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Unknown page type: {0}")]
    UnknownPageType(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Page is read-only: {0}")]
    ReadOnly(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl WikiError {
    pub fn attachment_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WikiError::AttachmentIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WikiError>;
