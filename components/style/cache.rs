/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A LRU cache of parsed style attributes.

#![deny(missing_docs)]

use crate::error_reporting::ParseErrorReporter;
use crate::properties::{parse_style_attribute, PropertyDeclarationBlock};
use crate::stylesheets::UrlExtraData;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use selectors::matching::QuirksMode;
use servo_arc::Arc;

/// The number of style attributes kept by default.
pub const DEFAULT_CAPACITY: usize = 128;

/// A LRU cache used to share the declaration blocks of identical style
/// attributes, keyed by the attribute text.
///
/// The most-recently-used entry is the last one.
#[derive(Debug)]
pub struct DeclarationBlockCache {
    entries: IndexMap<Box<str>, Arc<PropertyDeclarationBlock>, FxBuildHasher>,
    capacity: usize,
}

impl Default for DeclarationBlockCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DeclarationBlockCache {
    /// Create a new LRU cache with `capacity` elements at most.
    pub fn new(capacity: usize) -> Self {
        DeclarationBlockCache {
            entries: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            capacity: capacity.max(1),
        }
    }

    /// Returns the number of elements in the cache.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Looks `text` up, marking it as the most recently used.
    pub fn get(&mut self, text: &str) -> Option<Arc<PropertyDeclarationBlock>> {
        let index = self.entries.get_index_of(text)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, block)| block.clone())
    }

    /// Insert a given block in the cache, evicting the least recently used
    /// entry if full.
    pub fn insert(&mut self, text: &str, block: Arc<PropertyDeclarationBlock>) {
        if self.entries.len() == self.capacity && !self.entries.contains_key(text) {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(text.into(), block);
        debug_assert!(self.entries.len() <= self.capacity);
    }

    /// Returns the block for the style attribute `text`, parsing it the
    /// first time.
    pub fn get_or_parse(
        &mut self,
        text: &str,
        url_data: &UrlExtraData,
        error_reporter: Option<&dyn ParseErrorReporter>,
        quirks_mode: QuirksMode,
    ) -> Arc<PropertyDeclarationBlock> {
        if let Some(block) = self.get(text) {
            return block;
        }
        let block = Arc::new(parse_style_attribute(
            text,
            url_data,
            error_reporter,
            quirks_mode,
        ));
        self.insert(text, block.clone());
        block
    }

    /// Evict all elements from the cache.
    pub fn evict_all(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url_data() -> UrlExtraData {
        UrlExtraData::new(Url::parse("http://example.com/").unwrap())
    }

    #[test]
    fn identical_attributes_share_their_block() {
        let mut cache = DeclarationBlockCache::default();
        let a = cache.get_or_parse("color: red", &url_data(), None, QuirksMode::NoQuirks);
        let b = cache.get_or_parse("color: red", &url_data(), None, QuirksMode::NoQuirks);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.num_entries(), 1);
    }

    #[test]
    fn least_recently_used_goes_first() {
        let mut cache = DeclarationBlockCache::new(2);
        let url_data = url_data();
        cache.get_or_parse("color: red", &url_data, None, QuirksMode::NoQuirks);
        cache.get_or_parse("color: blue", &url_data, None, QuirksMode::NoQuirks);
        assert!(cache.get("color: red").is_some());
        cache.get_or_parse("color: green", &url_data, None, QuirksMode::NoQuirks);
        assert!(cache.get("color: blue").is_none());
        assert!(cache.get("color: red").is_some());
        assert_eq!(cache.num_entries(), 2);
    }
}
