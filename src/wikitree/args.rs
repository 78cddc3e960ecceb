use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wikitree", version)]
#[command(about = "Folder-per-page wiki tree with cached HTML rendering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Wiki root folder (defaults to the configured root, then the current directory)
    #[arg(short, long, global = true, env = "WIKITREE_ROOT")]
    pub root: Option<PathBuf>,

    /// Open the wiki read-only
    #[arg(long, global = true)]
    pub readonly: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

// Pages are addressed by title path ("Projects/Rust"); "/" is the root.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new wiki in the root folder
    Init,

    /// Show the page tree
    #[command(alias = "ls")]
    Tree {
        /// Only show the subtree under this page
        page: Option<String>,
    },

    /// Create a page
    #[command(alias = "new")]
    Add {
        /// Parent page ("/" for the root)
        parent: String,

        title: String,

        /// Page type (wiki, text, html, search)
        #[arg(short = 't', long = "type", default_value = "wiki")]
        page_type: String,

        /// Tag for the new page (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Rename a page
    Rename { page: String, title: String },

    /// Move a page under a new parent
    Mv { page: String, new_parent: String },

    /// Remove a page and its subpages
    Rm { page: String },

    /// Sort the children of a page by title
    Sort {
        #[arg(default_value = "/")]
        page: String,
    },

    /// Move a page to a position among its siblings
    Order { page: String, position: usize },

    /// Replace the content of a page (reads stdin without --content)
    Write {
        page: String,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Add tags to a page, or remove them with --remove
    Tag {
        page: String,

        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,

        #[arg(long)]
        remove: bool,
    },

    /// Render pages to HTML, reusing cached output when unchanged
    Render {
        #[arg(required = true, num_args = 1..)]
        pages: Vec<String>,
    },

    /// Force the next render of pages
    Invalidate {
        #[arg(required = true, num_args = 1..)]
        pages: Vec<String>,
    },

    /// Attach files to a page
    Attach {
        page: String,

        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Remove an attachment from a page
    Detach { page: String, name: String },

    /// List the attachments of a page
    Attachments { page: String },

    /// Statistics of a page, or of the whole tree
    Stat { page: Option<String> },

    /// Reset broken root options to defaults
    ResetRoot,
}
