/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The style bloom filter is used as an optimization when matching deep
//! descendant selectors.

#![deny(missing_docs)]

use crate::dom::{OpaqueElement, TElement};
use selectors::bloom::{hash_atom, BloomFilter};
use smallvec::SmallVec;
use std::fmt;

/// A struct that allows us to fast-reject deep descendant selectors avoiding
/// selector-matching.
///
/// This is implemented using a counting bloom filter over the tag names, ids
/// and classes of the ancestors of the element being styled. Rules remember
/// the hashes of the identifiers their ancestor compounds require, and a rule
/// one of whose hashes is missing from the filter cannot match.
///
/// The filter is only trustworthy while it holds exactly the ancestor chain
/// of the element being styled, which is what `parent_stack_is_consistent`
/// checks. Styling proceeds depth-first, pushing an element before styling
/// its children and popping it after.
pub struct SelectorFilter {
    filter: BloomFilter,

    /// The stack of elements that this bloom filter contains, along with the
    /// number of hashes pushed for each element.
    elements: SmallVec<[PushedElement; 16]>,

    /// Stack of hashes that have been pushed onto this filter.
    pushed_hashes: SmallVec<[u32; 64]>,
}

/// Clearing the whole filter costs about 25 times more than removing a
/// hash, so only do it when many hashes were pushed.
const MEMSET_CLEAR_THRESHOLD: usize = 25;

struct PushedElement {
    element: OpaqueElement,
    num_hashes: usize,
}

fn each_relevant_element_hash<E, F>(element: &E, mut f: F)
where
    E: TElement,
    F: FnMut(u32),
{
    let local_name = element.local_name();
    if local_name.bytes().any(|b| b.is_ascii_uppercase()) {
        f(hash_atom(&local_name.to_ascii_lowercase()));
    } else {
        f(hash_atom(local_name));
    }

    if let Some(id) = element.id() {
        f(hash_atom(id));
    }

    element.each_class(|class| f(hash_atom(class)));
}

impl fmt::Debug for SelectorFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SelectorFilter")
            .field("depth", &self.elements.len())
            .field("hashes", &self.pushed_hashes.len())
            .finish()
    }
}

impl Default for SelectorFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorFilter {
    /// Create an empty `SelectorFilter`.
    pub fn new() -> Self {
        SelectorFilter {
            filter: BloomFilter::new(),
            elements: Default::default(),
            pushed_hashes: Default::default(),
        }
    }

    /// Return the bloom filter used properly by the `selectors` crate.
    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    /// Push an element to the bloom filter, knowing that it's a child of the
    /// last element pushed.
    pub fn push_parent<E: TElement>(&mut self, element: &E) {
        debug_assert!(
            self.elements.is_empty() ||
                element.parent_element().map(|p| p.opaque()) == self.current_parent(),
            "Pushed an element that is not a child of the top of the stack"
        );
        let mut count = 0;
        each_relevant_element_hash(element, |hash| {
            count += 1;
            self.filter.insert_hash(hash);
            self.pushed_hashes.push(hash);
        });
        self.elements.push(PushedElement {
            element: element.opaque(),
            num_hashes: count,
        });
    }

    /// Pop the last element in the bloom filter and return it.
    pub fn pop_parent(&mut self) -> Option<OpaqueElement> {
        let PushedElement {
            element,
            num_hashes,
        } = self.elements.pop()?;

        for _ in 0..num_hashes {
            if let Some(hash) = self.pushed_hashes.pop() {
                self.filter.remove_hash(hash);
            }
        }

        Some(element)
    }

    /// Makes the filter hold the ancestors of `element`, which becomes the
    /// top of the stack.
    pub fn setup_parent_stack<E: TElement>(&mut self, element: &E) {
        self.clear();

        let mut parents_to_insert = SmallVec::<[E; 16]>::new();
        let mut current = element.clone();
        while let Some(parent) = current.parent_element() {
            parents_to_insert.push(parent.clone());
            current = parent;
        }

        for parent in parents_to_insert.iter().rev() {
            self.push_parent(parent);
        }
        self.push_parent(element);
    }

    /// Whether the filter holds exactly the ancestors of an element whose
    /// parent is `parent`.
    pub fn parent_stack_is_consistent(&self, parent: Option<OpaqueElement>) -> bool {
        match parent {
            Some(parent) => self.current_parent() == Some(parent),
            None => false,
        }
    }

    /// The element at the top of the stack.
    #[inline]
    pub fn current_parent(&self) -> Option<OpaqueElement> {
        self.elements.last().map(|el| el.element)
    }

    /// Returns true if the bloom filter is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the number of elements in the stack.
    pub fn matching_depth(&self) -> usize {
        self.elements.len()
    }

    /// Clears the bloom filter.
    pub fn clear(&mut self) {
        self.elements.clear();

        if self.pushed_hashes.len() > MEMSET_CLEAR_THRESHOLD {
            self.filter.clear();
            self.pushed_hashes.clear();
        } else {
            for hash in self.pushed_hashes.drain(..) {
                self.filter.remove_hash(hash);
            }
            debug_assert!(self.filter.is_zeroed());
        }
    }
}
