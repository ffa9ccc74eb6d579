/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Owner of every [`StylesheetContents`] of a document, keyed by
//! [`SheetId`].
//!
//! The store counts the sheets using each contents and whether the contents
//! sit in the in-memory cache, which is what decides whether a CSSOM
//! mutation has to copy them first.

use crate::stylesheets::StylesheetContents;
use log::debug;
use rustc_hash::FxHashMap;
use servo_arc::Arc;
use url::Url;

/// A handle to contents in a [`SheetStore`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SheetId(usize);

#[derive(Debug)]
struct Entry {
    contents: Arc<StylesheetContents>,
    clients: usize,
    in_memory_cache: bool,
}

#[derive(Debug, Default)]
pub struct SheetStore {
    entries: Vec<Entry>,
    memory_cache: FxHashMap<Url, SheetId>,
    next_sheet_key: usize,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contents: StylesheetContents) -> SheetId {
        let id = SheetId(self.entries.len());
        self.entries.push(Entry {
            contents: Arc::new(contents),
            clients: 0,
            in_memory_cache: false,
        });
        id
    }

    pub(crate) fn next_sheet_key(&mut self) -> usize {
        self.next_sheet_key += 1;
        self.next_sheet_key
    }

    #[inline]
    pub fn get(&self, id: SheetId) -> &StylesheetContents {
        &self.entries[id.0].contents
    }

    /// The shared handle to the contents, for the import rules and rule sets
    /// that keep them alive.
    pub fn get_arc(&self, id: SheetId) -> &Arc<StylesheetContents> {
        &self.entries[id.0].contents
    }

    /// Mutable access to contents nobody else can see.
    pub fn get_mut(&mut self, id: SheetId) -> &mut StylesheetContents {
        let entry = &mut self.entries[id.0];
        debug_assert!(
            entry.clients <= 1 && !entry.in_memory_cache,
            "Writing to shared contents"
        );
        Arc::make_mut(&mut entry.contents)
    }

    pub fn register_client(&mut self, id: SheetId) {
        self.entries[id.0].clients += 1;
    }

    pub fn unregister_client(&mut self, id: SheetId) {
        let entry = &mut self.entries[id.0];
        debug_assert!(entry.clients > 0);
        entry.clients = entry.clients.saturating_sub(1);
    }

    /// The number of sheets using these contents.
    #[inline]
    pub fn clients(&self, id: SheetId) -> usize {
        self.entries[id.0].clients
    }

    #[inline]
    pub fn is_in_memory_cache(&self, id: SheetId) -> bool {
        self.entries[id.0].in_memory_cache
    }

    /// Offers contents to the in-memory cache under their URL. Returns
    /// whether they were taken, which they are only when cacheable.
    pub fn add_to_memory_cache(&mut self, id: SheetId) -> bool {
        let entry = &mut self.entries[id.0];
        if !entry.contents.is_cacheable() {
            return false;
        }
        entry.in_memory_cache = true;
        let url = entry.contents.url_data().url().clone();
        if let Some(previous) = self.memory_cache.insert(url, id) {
            if previous != id {
                self.entries[previous.0].in_memory_cache = false;
            }
        }
        true
    }

    pub fn remove_from_memory_cache(&mut self, id: SheetId) {
        let entry = &mut self.entries[id.0];
        if !entry.in_memory_cache {
            return;
        }
        entry.in_memory_cache = false;
        let url = entry.contents.url_data().url();
        if self.memory_cache.get(url) == Some(&id) {
            self.memory_cache.remove(url);
        }
    }

    /// The cached contents for `url`, if any.
    pub fn cached(&self, url: &Url) -> Option<SheetId> {
        self.memory_cache.get(url).copied()
    }

    /// Stores a private copy of `id` for a sheet about to mutate it. The
    /// copy has no clients yet.
    pub fn copy_for_write(&mut self, id: SheetId) -> SheetId {
        debug!(
            "Copying shared contents of {} before mutation",
            self.get(id).url_data().as_str()
        );
        let copy = self.get(id).clone();
        self.insert(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheets::{Origin, UrlExtraData};
    use selectors::matching::QuirksMode;

    fn contents(css: &str) -> StylesheetContents {
        StylesheetContents::from_str(
            css,
            UrlExtraData::new(Url::parse("http://example.com/a.css").unwrap()),
            Origin::Author,
            QuirksMode::NoQuirks,
            None,
            None,
        )
    }

    #[test]
    fn memory_cache_takes_cacheable_contents_only() {
        let mut store = SheetStore::new();
        let id = store.insert(contents("a { color: red }"));
        assert!(store.add_to_memory_cache(id));
        assert_eq!(store.cached(store.get(id).url_data().url()), Some(id));
        store.remove_from_memory_cache(id);
        assert!(!store.is_in_memory_cache(id));
        assert_eq!(store.cached(store.get(id).url_data().url()), None);

        let with_import = store.insert(contents("@import url(b.css);"));
        assert!(!store.add_to_memory_cache(with_import));
    }

    #[test]
    fn copies_start_without_clients() {
        let mut store = SheetStore::new();
        let id = store.insert(contents("a { color: red }"));
        store.register_client(id);
        store.register_client(id);
        let copy = store.copy_for_write(id);
        assert_ne!(copy, id);
        assert_eq!(store.clients(copy), 0);
        assert_eq!(store.clients(id), 2);
        assert_eq!(store.get(copy).rule_count(), 1);
    }
}
