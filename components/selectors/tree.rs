/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Traits that nodes must implement. Breaks the otherwise-cyclic dependency
//! between layout and style.

use crate::Atom;
use crate::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use crate::parser::NonTSPseudoClass;
use std::fmt::Debug;

/// The element interface the matcher walks.
///
/// Elements are cheap handles into a tree owned elsewhere.
pub trait Element: Sized + Clone + Debug {
    fn parent_element(&self) -> Option<Self>;

    /// Skips non-element nodes.
    fn prev_sibling_element(&self) -> Option<Self>;

    /// Skips non-element nodes.
    fn next_sibling_element(&self) -> Option<Self>;

    fn is_html_element_in_html_document(&self) -> bool;

    fn local_name(&self) -> &Atom;

    /// Empty string is not null
    fn namespace(&self) -> &Atom;

    fn id(&self) -> Option<&Atom>;

    fn has_id(&self, id: &Atom, case_sensitivity: CaseSensitivity) -> bool {
        self.id()
            .is_some_and(|own| case_sensitivity.eq_atom(own, id))
    }

    fn has_class(&self, name: &Atom, case_sensitivity: CaseSensitivity) -> bool;

    /// Visits every class of the element.
    fn each_class<F>(&self, callback: F)
    where
        F: FnMut(&Atom);

    /// Scans the attributes of the element for one matching the namespace and
    /// name, then evaluates `operation` against its value.
    fn attr_matches(
        &self,
        ns: &NamespaceConstraint,
        local_name: &Atom,
        operation: &AttrSelectorOperation<&str>,
    ) -> bool;

    /// Dynamic state pseudo-classes. Links are asked through `is_link` and
    /// never reach this method.
    fn match_non_ts_pseudo_class(&self, pc: &NonTSPseudoClass) -> bool;

    fn is_link(&self) -> bool;

    /// Whether this link has been visited. Selector matching never asks
    /// this; only the cascade does, to pick the visited style.
    fn is_visited_link(&self) -> bool {
        false
    }

    /// Returns whether this element matches `:empty`.
    ///
    /// That is, whether it does not contain any child element or any non-zero-length text node.
    /// See <http://dev.w3.org/csswg/selectors-3/#empty-pseudo>
    fn is_empty(&self) -> bool;

    /// Returns whether this element matches `:root`,
    /// i.e. whether it is the root element of a document.
    fn is_root(&self) -> bool;

    /// The `::-webkit-*` name this element is exposed as inside a user-agent
    /// shadow tree, if any.
    fn custom_pseudo_element(&self) -> Option<&Atom> {
        None
    }

    /// The host of the user-agent shadow tree this element lives in. Custom
    /// pseudo-element selectors match the rest of their compound against it.
    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }
}
