/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selector model, parsing and matching.
//!
//! Selectors are stored left to right as parsed and walked right to left
//! while matching, one compound at a time.

pub mod attr;
pub mod bloom;
pub mod builder;
pub mod matching;
pub mod parser;
mod tree;

pub use crate::parser::{Parser, Selector, SelectorList};
pub use crate::tree::Element;

/// The interned string type used for every identifier in a selector.
pub type Atom = string_cache::DefaultAtom;
