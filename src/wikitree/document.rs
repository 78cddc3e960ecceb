//! # Document
//!
//! A [`Document`] is an open wiki: the page tree rooted at a folder carrying
//! `__page.opt`, plus the state that goes with it (selection, event bus,
//! page type registry).
//!
//! ## Invariants
//!
//! - Sibling `order` values are always `0..N-1`, and `children[i].order == i`.
//! - `path(child) == path(parent) / folder_name(title)`.
//! - A page is never its own ancestor.
//! - The selection is `None` or a page of this tree.
//!
//! Every structural check runs before the first mutation, so a rejected
//! operation leaves both the tree and the disk untouched.
//!
//! ## Events
//!
//! Mutations emit on the document's own [`EventBus`]. Sorting wraps its
//! change in a tree-update bracket when the [`EventPolicy`] allows it for
//! this document, which by default means only while the document is the
//! active one.

use crate::config::EventPolicy;
use crate::error::{Result, WikiError};
use crate::events::{Event, EventBus, EventKind, SubscriptionId};
use crate::factory::FactoryRegistry;
use crate::options::{write_atomic, PageOptions};
use crate::page::{
    compare_titles, folder_name, same_folder, title_from_folder, validate_title, Page, PageId,
    RESERVED_PREFIX,
};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ICON_BASENAME: &str = "__icon";

#[derive(Debug)]
pub struct Document {
    root: PageId,
    pages: HashMap<PageId, Page>,
    selected: Option<PageId>,
    bus: EventBus,
    registry: FactoryRegistry,
    active: bool,
    readonly: bool,
    event_policy: EventPolicy,
}

impl Document {
    fn with_root(root: Page) -> Self {
        let root_id = root.id;
        let mut pages = HashMap::new();
        pages.insert(root_id, root);
        Self {
            root: root_id,
            pages,
            selected: None,
            bus: EventBus::new(),
            registry: FactoryRegistry::with_defaults(),
            active: false,
            readonly: false,
            event_policy: EventPolicy::default(),
        }
    }

    /// Creates a new, empty wiki at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if PageOptions::exists_in(path) {
            return Err(WikiError::InvalidPath(format!(
                "{} already contains a wiki",
                path.display()
            )));
        }
        fs::create_dir_all(path)?;

        let options = PageOptions::root();
        options.save(path)?;
        info!(path = %path.display(), "wiki created");

        Ok(Self::with_root(Page::new(options, None, path.to_path_buf())))
    }

    /// Loads the wiki at `path`.
    ///
    /// Fails with `RootFormat` if the root options are missing or cannot be
    /// parsed; [`Document::clear_config_file`] resets them. Sub-folders
    /// without options are not pages and are skipped.
    pub fn load<P: AsRef<Path>>(path: P, readonly: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(WikiError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", path.display()),
            )));
        }
        if !PageOptions::exists_in(path) {
            return Err(WikiError::RootFormat {
                path: PageOptions::path_in(path),
                details: "missing wiki root options".to_string(),
            });
        }

        let root_options = PageOptions::read_root(path)?;
        let mut doc = Self::with_root(Page::new(root_options, None, path.to_path_buf()));
        doc.readonly = readonly;

        let root = doc.root;
        doc.load_children(root)?;

        if readonly {
            for page in doc.pages.values_mut() {
                page.locked = true;
            }
        }
        info!(path = %path.display(), pages = doc.pages.len() - 1, readonly, "wiki loaded");
        Ok(doc)
    }

    fn load_children(&mut self, parent: PageId) -> Result<()> {
        let parent_path = self.page(parent)?.path.clone();

        let mut dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&parent_path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(RESERVED_PREFIX) || name.starts_with('.') {
                continue;
            }
            if entry.file_type()?.is_dir() && PageOptions::exists_in(&entry.path()) {
                dirs.push((name, entry.path()));
            }
        }

        let mut loaded = Vec::with_capacity(dirs.len());
        for (folder, path) in dirs {
            let mut options = match PageOptions::read(&path) {
                Ok(options) => options,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping page with broken options");
                    continue;
                }
            };

            if folder_name(&options.title) != folder {
                options.title = title_from_folder(&folder);
            }
            if let Err(e) = validate_title(&options.title) {
                warn!(path = %path.display(), error = %e, "skipping page with unusable title");
                continue;
            }
            if self.pages.contains_key(&PageId(options.id)) {
                // Copied folders carry their source's id
                options.id = Uuid::new_v4();
                if let Err(e) = options.save(&path) {
                    warn!(path = %path.display(), error = %e, "could not persist new page id");
                }
            }

            let page = Page::new(options, Some(parent), path);
            let id = page.id;
            self.pages.insert(id, page);
            loaded.push(id);
        }

        loaded.sort_by(|a, b| {
            let (pa, pb) = (&self.pages[a], &self.pages[b]);
            pa.order()
                .cmp(&pb.order())
                .then_with(|| compare_titles(pa.title(), pb.title()))
        });
        if let Err(e) = renumber(&mut self.pages, &loaded) {
            warn!(parent = %parent_path.display(), error = %e, "could not persist repaired order");
        }
        self.page_mut(parent)?.children = loaded.clone();

        for id in loaded {
            self.load_children(id)?;
        }
        Ok(())
    }

    /// Resets the root options at `path` to defaults.
    pub fn clear_config_file<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        PageOptions::root().save(path)?;
        info!(path = %path.display(), "wiki root options reset");
        Ok(())
    }

    // --- Queries ---

    pub fn root(&self) -> PageId {
        self.root
    }

    pub fn path(&self) -> &Path {
        &self.pages[&self.root].path
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.len() == 1
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(&id)
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn page(&self, id: PageId) -> Result<&Page> {
        self.pages
            .get(&id)
            .ok_or_else(|| WikiError::PageNotFound(id.to_string()))
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages
            .get_mut(&id)
            .ok_or_else(|| WikiError::PageNotFound(id.to_string()))
    }

    pub fn children(&self, id: PageId) -> Result<&[PageId]> {
        Ok(&self.page(id)?.children)
    }

    pub fn parent(&self, id: PageId) -> Result<Option<PageId>> {
        Ok(self.page(id)?.parent)
    }

    /// Slash-separated titles from the root; empty for the root itself.
    pub fn title_path(&self, id: PageId) -> Result<String> {
        let mut titles = Vec::new();
        let mut current = self.page(id)?;
        while let Some(parent) = current.parent {
            titles.push(current.title());
            current = self.page(parent)?;
        }
        titles.reverse();
        Ok(titles.join("/"))
    }

    /// The page at a slash-delimited title path, `None` if any segment is
    /// missing. One leading and one trailing slash are accepted; an empty
    /// interior segment is an error.
    pub fn lookup(&self, title_path: &str) -> Result<Option<PageId>> {
        let trimmed = title_path.strip_prefix('/').unwrap_or(title_path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Some(self.root));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(WikiError::InvalidPath(title_path.to_string()));
        }

        let mut current = self.root;
        for segment in segments {
            match self.find_child(current, segment) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn find_child(&self, parent: PageId, title: &str) -> Option<PageId> {
        let children = &self.pages.get(&parent)?.children;
        children
            .iter()
            .find(|c| self.pages[c].title() == title)
            .or_else(|| {
                let folder = folder_name(title);
                children
                    .iter()
                    .find(|c| same_folder(&folder_name(self.pages[c].title()), &folder))
            })
            .copied()
    }

    /// Ids of the subtree rooted at `id`, parents before children.
    pub fn iter_subtree(&self, id: PageId) -> Vec<PageId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(page) = self.pages.get(&current) {
                out.push(current);
                stack.extend(page.children.iter().rev());
            }
        }
        out
    }

    /// Every page except the root, in tree order.
    pub fn all_pages(&self) -> Vec<PageId> {
        self.iter_subtree(self.root).into_iter().skip(1).collect()
    }

    pub fn depth(&self, id: PageId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.page(id)?;
        while let Some(parent) = current.parent {
            depth += 1;
            current = self.page(parent)?;
        }
        Ok(depth)
    }

    pub fn is_ancestor(&self, ancestor: PageId, id: PageId) -> bool {
        let mut current = self.pages.get(&id).and_then(|p| p.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.pages.get(&parent).and_then(|p| p.parent);
        }
        false
    }

    // --- Document state ---

    pub fn selected(&self) -> Option<PageId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<PageId>) -> Result<()> {
        if let Some(id) = id {
            self.page(id)?;
        }
        if self.selected != id {
            self.selected = id;
            self.bus.emit(&Event::new(EventKind::PageSelected, id));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn event_policy(&self) -> EventPolicy {
        self.event_policy
    }

    pub fn set_event_policy(&mut self, policy: EventPolicy) {
        self.event_policy = policy;
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.registry
    }

    // --- Structural mutations ---

    fn check_writable(&self, id: PageId) -> Result<()> {
        let page = self.page(id)?;
        if self.readonly || page.readonly() {
            let name = self.title_path(id)?;
            return Err(WikiError::ReadOnly(if name.is_empty() {
                "/".to_string()
            } else {
                name
            }));
        }
        Ok(())
    }

    fn sibling_clash(&self, parent: PageId, folder: &str, except: Option<PageId>) -> bool {
        self.pages[&parent].children.iter().any(|c| {
            Some(*c) != except && same_folder(&folder_name(self.pages[c].title()), folder)
        })
    }

    pub fn create_child<I, S>(
        &mut self,
        parent: PageId,
        title: &str,
        page_type: &str,
        tags: I,
    ) -> Result<PageId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_writable(parent)?;
        let folder = validate_title(title)?;
        if self.sibling_clash(parent, &folder, None) {
            return Err(WikiError::DuplicateTitle {
                parent: self.title_path(parent)?,
                title: title.to_string(),
            });
        }
        let factory = self
            .registry
            .get(page_type)
            .ok_or_else(|| WikiError::UnknownPageType(page_type.to_string()))?;

        let mut options = PageOptions::new(title, page_type);
        options.tags = tags.into_iter().map(Into::into).collect();
        options.order = self.pages[&parent].children.len();
        factory.prepare(&mut options);

        let path = self.pages[&parent].path.join(&folder);
        // A leftover folder that did not load as a page
        if path.exists() {
            return Err(WikiError::DuplicateTitle {
                parent: self.title_path(parent)?,
                title: title.to_string(),
            });
        }
        fs::create_dir(&path)?;
        if let Err(e) = options.save(&path) {
            let _ = fs::remove_dir(&path);
            return Err(e);
        }

        let page = Page::new(options, Some(parent), path);
        let id = page.id;
        self.pages.insert(id, page);
        self.page_mut(parent)?.children.push(id);

        debug!(page = %id, title, page_type, "page created");
        self.bus.emit(&Event::for_page(EventKind::PageCreated, id));
        Ok(id)
    }

    pub fn rename(&mut self, id: PageId, new_title: &str) -> Result<()> {
        let parent = self
            .page(id)?
            .parent
            .ok_or_else(|| WikiError::InvalidName("the root page has no title".to_string()))?;
        self.check_writable(id)?;
        let folder = validate_title(new_title)?;
        if self.pages[&id].title() == new_title {
            return Ok(());
        }
        if self.sibling_clash(parent, &folder, Some(id)) {
            return Err(WikiError::InvalidName(format!(
                "'{}' collides with an existing sibling",
                new_title
            )));
        }

        let old_path = self.pages[&id].path.clone();
        let new_path = self.pages[&parent].path.join(&folder);
        if old_path != new_path {
            fs::rename(&old_path, &new_path)?;
        }

        let page = self.page_mut(id)?;
        let old_title = std::mem::replace(&mut page.options.title, new_title.to_string());
        page.options.modified = Utc::now();
        page.path = new_path.clone();
        if let Err(e) = page.options.save(&new_path) {
            page.options.title = old_title;
            page.path = old_path.clone();
            if old_path != new_path {
                let _ = fs::rename(&new_path, &old_path);
            }
            return Err(e);
        }

        self.refresh_paths(id);
        debug!(page = %id, title = new_title, "page renamed");
        self.bus.emit(&Event::for_page(EventKind::PageRenamed, id));
        Ok(())
    }

    pub fn move_page(&mut self, id: PageId, new_parent: PageId) -> Result<()> {
        self.page(new_parent)?;
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(WikiError::CyclicMove {
                page: self.title_path(id)?,
                target: self.title_path(new_parent)?,
            });
        }
        let old_parent = match self.page(id)?.parent {
            Some(parent) => parent,
            None => return Err(WikiError::RootRemoval),
        };
        if old_parent == new_parent {
            return Ok(());
        }
        self.check_writable(id)?;
        self.check_writable(new_parent)?;

        let title = self.pages[&id].title().to_string();
        let folder = folder_name(&title);
        if self.sibling_clash(new_parent, &folder, None) {
            return Err(WikiError::DuplicateTitle {
                parent: self.title_path(new_parent)?,
                title,
            });
        }

        let old_path = self.pages[&id].path.clone();
        let new_path = self.pages[&new_parent].path.join(&folder);
        if new_path.exists() {
            return Err(WikiError::DuplicateTitle {
                parent: self.title_path(new_parent)?,
                title,
            });
        }
        fs::rename(&old_path, &new_path)?;

        let mut moved = self.pages[&id].options.clone();
        moved.order = self.pages[&new_parent].children.len();
        if let Err(e) = moved.save(&new_path) {
            let _ = fs::rename(&new_path, &old_path);
            return Err(e);
        }

        let old_siblings: Vec<PageId> = self.pages[&old_parent]
            .children
            .iter()
            .copied()
            .filter(|c| *c != id)
            .collect();
        if let Err(e) = renumber(&mut self.pages, &old_siblings) {
            // Nothing is committed in memory yet
            let _ = fs::rename(&new_path, &old_path);
            let _ = self.pages[&id].options.save(&old_path);
            let siblings = self.pages[&old_parent].children.clone();
            restore_order(&mut self.pages, &siblings);
            return Err(e);
        }

        self.page_mut(old_parent)?.children.retain(|c| *c != id);
        self.page_mut(new_parent)?.children.push(id);
        let page = self.page_mut(id)?;
        page.parent = Some(new_parent);
        page.path = new_path;
        page.options = moved;
        self.refresh_paths(id);

        debug!(page = %id, "page moved");
        self.bus
            .emit(&Event::for_page(EventKind::PageOrderChanged, old_parent));
        self.bus.emit(&Event::for_page(EventKind::PageMoved, id));
        self.bus
            .emit(&Event::for_page(EventKind::PageOrderChanged, new_parent));
        Ok(())
    }

    pub fn remove(&mut self, id: PageId) -> Result<()> {
        let parent = self.page(id)?.parent.ok_or(WikiError::RootRemoval)?;
        self.check_writable(id)?;

        let subtree = self.iter_subtree(id);
        fs::remove_dir_all(&self.pages[&id].path)?;

        self.page_mut(parent)?.children.retain(|c| *c != id);
        let siblings = self.pages[&parent].children.clone();
        for removed in &subtree {
            self.pages.remove(removed);
        }
        if let Err(e) = renumber(&mut self.pages, &siblings) {
            warn!(error = %e, "could not persist sibling order after removal");
        }

        if self.selected.is_some_and(|s| subtree.contains(&s)) {
            self.selected = None;
            self.bus.emit(&Event::new(EventKind::PageSelected, None));
        }

        debug!(page = %id, count = subtree.len(), "subtree removed");
        for removed in subtree.iter().rev() {
            self.bus
                .emit(&Event::for_page(EventKind::PageRemoved, *removed));
        }
        Ok(())
    }

    /// Sorts children by title and renumbers them.
    pub fn sort_children_alphabetical(&mut self, id: PageId) -> Result<()> {
        self.check_writable(id)?;
        let mut children = self.page(id)?.children.clone();
        children.sort_by(|a, b| compare_titles(self.pages[a].title(), self.pages[b].title()));

        let root = self.root;
        let emit = self.event_policy.should_emit(self.active);
        let mut guard = emit.then(|| self.bus.update_guard(root));

        renumber(&mut self.pages, &children)?;
        if let Some(page) = self.pages.get_mut(&id) {
            page.children = children;
        }
        if let Some(guard) = guard.as_mut() {
            guard.emit(&Event::for_page(EventKind::PageOrderChanged, id));
        }
        debug!(page = %id, "children sorted");
        Ok(())
    }

    /// Moves a page to `new_order` among its siblings (clamped).
    pub fn set_order(&mut self, id: PageId, new_order: usize) -> Result<()> {
        let Some(parent) = self.page(id)?.parent else {
            return Ok(());
        };
        self.check_writable(id)?;

        let mut siblings = self.pages[&parent].children.clone();
        siblings.retain(|c| *c != id);
        let target = new_order.min(siblings.len());
        siblings.insert(target, id);

        renumber(&mut self.pages, &siblings)?;
        self.page_mut(parent)?.children = siblings;
        self.bus
            .emit(&Event::for_page(EventKind::PageOrderChanged, id));
        Ok(())
    }

    fn refresh_paths(&mut self, id: PageId) {
        let children = self.pages[&id].children.clone();
        let base = self.pages[&id].path.clone();
        for child in children {
            if let Some(page) = self.pages.get_mut(&child) {
                page.path = base.join(folder_name(page.title()));
            }
            self.refresh_paths(child);
        }
    }

    // --- Page data ---

    /// Raw content; empty when the page has no content file.
    pub fn content(&self, id: PageId) -> Result<String> {
        match fs::read_to_string(self.page(id)?.content_path()) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_content(&mut self, id: PageId, text: &str) -> Result<()> {
        self.check_writable(id)?;
        write_atomic(&self.page(id)?.content_path(), text.as_bytes())?;
        self.touch(id)?;
        self.bus.emit(&Event::for_page(EventKind::PageUpdated, id));
        Ok(())
    }

    pub fn set_tags<I, S>(&mut self, id: PageId, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_writable(id)?;
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        self.page_mut(id)?.options.tags = tags;
        self.touch(id)?;
        self.bus.emit(&Event::for_page(EventKind::PageUpdated, id));
        Ok(())
    }

    pub fn add_tag(&mut self, id: PageId, tag: &str) -> Result<()> {
        let mut tags = self.page(id)?.tags().clone();
        if tags.insert(tag.to_string()) {
            self.set_tags(id, tags)?;
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, id: PageId, tag: &str) -> Result<()> {
        let mut tags = self.page(id)?.tags().clone();
        if tags.remove(tag) {
            self.set_tags(id, tags)?;
        }
        Ok(())
    }

    /// Copies `source` into the page folder as its icon.
    pub fn set_icon<P: AsRef<Path>>(&mut self, id: PageId, source: P) -> Result<()> {
        self.check_writable(id)?;
        let source = source.as_ref();
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "png".to_string());
        let name = format!("{}.{}", ICON_BASENAME, ext);

        let page = self.page(id)?;
        fs::copy(source, page.path.join(&name))?;
        if let Some(old) = page.options.icon.as_ref().filter(|old| **old != name) {
            let _ = fs::remove_file(page.path.join(old));
        }

        self.page_mut(id)?.options.icon = Some(name);
        self.touch(id)?;
        self.bus.emit(&Event::for_page(EventKind::PageUpdated, id));
        Ok(())
    }

    pub fn set_page_readonly(&mut self, id: PageId, readonly: bool) -> Result<()> {
        if self.readonly {
            return Err(WikiError::ReadOnly(self.title_path(id)?));
        }
        let page = self.page_mut(id)?;
        page.options.readonly = readonly;
        page.options.save(&page.path)?;
        Ok(())
    }

    /// Stores a free-form option. Not subject to the read-only check: options
    /// hold caches and UI state, not page data.
    pub fn set_option(&mut self, id: PageId, section: &str, key: &str, value: &str) -> Result<()> {
        let page = self.page_mut(id)?;
        page.options.set(section, key, value);
        page.options.save(&page.path)
    }

    pub fn remove_option(&mut self, id: PageId, section: &str, key: &str) -> Result<bool> {
        let page = self.page_mut(id)?;
        if !page.options.remove(section, key) {
            return Ok(false);
        }
        page.options.save(&page.path)?;
        Ok(true)
    }

    fn touch(&mut self, id: PageId) -> Result<()> {
        let page = self.page_mut(id)?;
        page.options.modified = Utc::now();
        page.options.save(&page.path)
    }
}

/// Assigns `order = index` along `ids`, persisting pages whose order changed.
fn renumber(pages: &mut HashMap<PageId, Page>, ids: &[PageId]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, id) in ids.iter().enumerate() {
        debug_assert!(seen.insert(*id), "page listed twice among siblings");
        if let Some(page) = pages.get_mut(id) {
            if page.options.order != index {
                page.options.order = index;
                page.options.save(&page.path)?;
            }
        }
    }
    Ok(())
}

/// Best-effort `renumber` that keeps going past failed writes.
fn restore_order(pages: &mut HashMap<PageId, Page>, ids: &[PageId]) {
    for (index, id) in ids.iter().enumerate() {
        if let Some(page) = pages.get_mut(id) {
            if page.options.order != index {
                page.options.order = index;
                if let Err(e) = page.options.save(&page.path) {
                    warn!(page = %id, error = %e, "could not restore page order");
                }
            }
        }
    }
}
