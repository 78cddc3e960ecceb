//! # Wikitree Architecture
//!
//! Wikitree is the core of a desktop outliner: a tree of pages stored one
//! folder per page, with each page's HTML rendered on demand and cached
//! until something that affects it changes. It is a library first; the
//! `wikitree` binary is just one client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (args.rs, main.rs)                                     │
//! │  - Parses arguments, prints results, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) + Application (application.rs)                │
//! │  - Resolves title paths to page ids                         │
//! │  - Holds config, the open document, actions and plugins     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - One operation each, returning `Result<CmdResult>`        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core: Document, EventBus, HtmlCache, Attachments           │
//! │  - The page tree and everything persisted in page folders   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## On Disk
//!
//! ```text
//! <root>/
//!   __page.opt          options of the root; marks the folder as a wiki
//!   <folder>/           one per child page, named from the title
//!     __page.opt        PageOptions (JSON)
//!     __page.text       content
//!     __content.html    cached HTML
//!     __icon.<ext>
//!     __attach/         attachments
//!     <folder>/ ...
//! ```
//!
//! Names starting with `__` are reserved, so no page folder can collide with
//! the files above.
//!
//! ## No I/O Assumptions in Core
//!
//! Nothing from `api.rs` inward writes to stdout/stderr or exits the
//! process. Diagnostics go through `tracing`; whoever embeds the library
//! decides where they end up.
//!
//! ## Module Overview
//!
//! - [`document`]: The page tree and its mutations
//! - [`page`]: Page nodes, ids, title/folder-name mapping
//! - [`options`]: Per-page options files
//! - [`events`]: Change notifications
//! - [`render`]: Renderers, templates and the HTML cache
//! - [`factory`]: Page types
//! - [`attachments`]: Files attached to pages
//! - [`actions`], [`plugins`]: Runnable actions and the plugins that add them
//! - [`stats`]: Page and tree statistics
//! - [`application`], [`api`], [`commands`]: Front-end facing layers
//! - [`config`]: Application configuration
//! - [`error`]: Error types

pub mod actions;
pub mod api;
pub mod application;
pub mod attachments;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod factory;
pub mod options;
pub mod page;
pub mod plugins;
pub mod render;
pub mod stats;

pub use document::Document;
pub use error::{Result, WikiError};
pub use page::{Page, PageId};
