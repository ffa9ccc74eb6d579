/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Calculate [specified][specified] and [computed values][computed] from a
//! tree of DOM nodes and a set of stylesheets.
//!
//! [computed]: https://drafts.csswg.org/css-cascade/#computed
//! [specified]: https://drafts.csswg.org/css-cascade/#specified
//!
//! In particular, this crate contains the definitions of supported properties,
//! the code to parse them into specified values and compute them into computed
//! values, as well as the code to serialize both specified and computed values.
//!
//! The main entry point is the [`Stylist`][stylist], which buckets the rules
//! of every active stylesheet by the rightmost compound of their selectors
//! and cascades the declarations that apply to a given element. Which
//! stylesheets are active, and how much of the stylist has to be rebuilt when
//! that list changes, is the job of the
//! [`DocumentStyleSheetCollection`][collection].
//!
//! [stylist]: stylist/struct.Stylist.html
//! [collection]: stylesheet_set/struct.DocumentStyleSheetCollection.html

#![deny(unsafe_code)]

pub mod applicable_declarations;
pub mod bloom;
pub mod cache;
pub mod config;
pub mod document_rule_sets;
pub mod dom;
pub mod error_reporting;
pub mod invalidation;
pub mod media_queries;
pub mod namespaces;
pub mod parser;
pub mod properties;
pub mod rule_feature;
pub mod rule_set;
pub mod selector_parser;
pub mod stylesheet_set;
pub mod stylesheets;
pub mod stylist;
pub mod ua_sheets;

pub use selectors::Atom;

/// A namespace URL.
pub type Namespace = Atom;

/// A namespace prefix, as declared by an `@namespace` rule.
pub type Prefix = Atom;

/// The namespace of HTML elements.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
