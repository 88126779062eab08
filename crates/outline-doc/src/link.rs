#![forbid(unsafe_code)]

//! Note link resolution.
//!
//! Internal links store only the target note's id. A [`LinkResolver`] maps
//! between note titles and ids; callers construct one and pass it by
//! reference wherever a title must be resolved.
//!
//! ```
//! use outline_doc::link::{LinkRegistry, LinkResolver};
//!
//! let mut notes = LinkRegistry::new();
//! let id = notes.register("Reading List");
//! assert_eq!(notes.resolve("reading list"), Some(id));
//! assert_eq!(notes.title(id).as_deref(), Some("Reading List"));
//! ```

use std::collections::HashMap;

use uuid::Uuid;

/// Maps link titles to stable ids and back.
pub trait LinkResolver {
    /// The id for `title`, if known.
    fn resolve(&self, title: &str) -> Option<Uuid>;

    /// The current title for `id`, if known.
    fn title(&self, id: Uuid) -> Option<String>;
}

/// In-memory title registry. Title lookup is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    titles: HashMap<Uuid, String>,
    lookup: HashMap<String, Uuid>,
}

fn key(title: &str) -> String {
    title.trim().to_lowercase()
}

impl LinkRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `title`, returning its id.
    ///
    /// If the title is already registered, returns the existing id.
    pub fn register(&mut self, title: &str) -> Uuid {
        if let Some(&id) = self.lookup.get(&key(title)) {
            return id;
        }
        let id = Uuid::new_v4();
        self.insert(id, title);
        id
    }

    /// Register `title` under a known id, replacing any previous title for it.
    ///
    /// A title belongs to one id at a time; if another id holds it, that id
    /// is dropped from the registry.
    pub fn insert(&mut self, id: Uuid, title: &str) {
        if let Some(old) = self.titles.insert(id, title.to_owned()) {
            self.lookup.remove(&key(&old));
        }
        if let Some(previous) = self.lookup.insert(key(title), id) {
            if previous != id {
                tracing::debug!(%previous, %id, title, "link title reassigned");
                self.titles.remove(&previous);
            }
        }
    }

    /// Rename the note `id`. Returns false for unknown ids.
    pub fn rename(&mut self, id: Uuid, title: &str) -> bool {
        if !self.titles.contains_key(&id) {
            return false;
        }
        self.insert(id, title);
        true
    }

    /// Forget `id`, returning its title.
    pub fn unregister(&mut self, id: Uuid) -> Option<String> {
        let title = self.titles.remove(&id)?;
        self.lookup.remove(&key(&title));
        Some(title)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl LinkResolver for LinkRegistry {
    fn resolve(&self, title: &str) -> Option<Uuid> {
        self.lookup.get(&key(title)).copied()
    }

    fn title(&self, id: Uuid) -> Option<String> {
        self.titles.get(&id).cloned()
    }
}
