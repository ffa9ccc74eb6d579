/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Simple counting bloom filters, used to reject rules whose descendant
//! selectors name an id, class or tag that no ancestor of the element carries.

use crate::Atom;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

const KEY_SIZE: usize = 12;

const ARRAY_SIZE: usize = 1 << KEY_SIZE;
const KEY_MASK: u32 = (1 << KEY_SIZE) - 1;

/// A counting Bloom filter with 8-bit counters. We use two hash functions,
/// both taken from a single 32-bit hash.
///
/// The filter uses an array with 2**KeySize entries.
///
/// Assuming a well-distributed hash function, a Bloom filter with
/// array size M containing N elements and
/// using k hash function has expected false positive rate exactly
///
/// $  (1 - (1 - 1/M)^{kN})^k  $
///
/// What this means in practice is that for a few hundred keys using a
/// KeySize of 12 gives false positive rates on the order of 0.25-4%.
///
/// Counters saturate at 0xff and are never decremented once full, so a
/// saturated slot stays set until the filter is cleared.
#[derive(Debug)]
pub struct BloomFilter {
    counters: Box<[u8; ARRAY_SIZE]>,
}

impl Clone for BloomFilter {
    #[inline]
    fn clone(&self) -> BloomFilter {
        BloomFilter {
            counters: self.counters.clone(),
        }
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BloomFilter {
    /// Creates a new bloom filter.
    #[inline]
    pub fn new() -> BloomFilter {
        BloomFilter {
            counters: Box::new([0; ARRAY_SIZE]),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.counters.fill(0);
    }

    /// Whether every counter is zero. Pushing and popping the same set of
    /// ancestors leaves the filter zeroed.
    pub fn is_zeroed(&self) -> bool {
        self.counters.iter().all(|c| *c == 0)
    }

    #[inline]
    pub fn insert_hash(&mut self, hash: u32) {
        for slot in [hash1(hash), hash2(hash)] {
            let slot = &mut self.counters[slot as usize];
            if !full(slot) {
                *slot += 1
            }
        }
    }

    #[inline]
    pub fn remove_hash(&mut self, hash: u32) {
        for slot in [hash1(hash), hash2(hash)] {
            let slot = &mut self.counters[slot as usize];
            if !full(slot) && *slot > 0 {
                *slot -= 1
            }
        }
    }

    /// Check whether the filter might contain an item.  This can
    /// sometimes return true even if the item is not in the filter,
    /// but will never return false for items that are actually in the
    /// filter.
    #[inline]
    pub fn might_contain_hash(&self, hash: u32) -> bool {
        self.counters[hash1(hash) as usize] != 0 && self.counters[hash2(hash) as usize] != 0
    }
}

#[inline]
fn full(slot: &u8) -> bool {
    *slot == 0xff
}

/// Hashes an identifier the way both selectors and the ancestor filter do.
/// Zero is reserved for "no hash".
pub fn hash_atom(atom: &Atom) -> u32 {
    let mut hasher = FxHasher::default();
    (**atom).hash(&mut hasher);
    let hash: u64 = hasher.finish();
    match (hash >> 32) as u32 ^ (hash as u32) {
        0 => 1,
        hash => hash,
    }
}

#[inline]
fn hash1(hash: u32) -> u32 {
    hash & KEY_MASK
}

#[inline]
fn hash2(hash: u32) -> u32 {
    (hash >> KEY_SIZE) & KEY_MASK
}

#[test]
fn create_and_insert_some_stuff() {
    let mut bf = BloomFilter::new();
    let atoms: Vec<Atom> = (0..200).map(|i| Atom::from(format!("name{}", i))).collect();

    for atom in &atoms {
        bf.insert_hash(hash_atom(atom));
    }

    for atom in &atoms {
        assert!(bf.might_contain_hash(hash_atom(atom)));
    }

    for atom in &atoms[..100] {
        bf.remove_hash(hash_atom(atom));
    }

    for atom in &atoms[100..] {
        assert!(bf.might_contain_hash(hash_atom(atom)));
    }

    for atom in &atoms[100..] {
        bf.remove_hash(hash_atom(atom));
    }
    assert!(bf.is_zeroed());

    bf.insert_hash(hash_atom(&atoms[0]));
    bf.clear();
    assert!(bf.is_zeroed());
    assert!(!bf.might_contain_hash(hash_atom(&atoms[0])));
}
