/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Types and traits used to access the DOM from style calculation.

#![deny(missing_docs)]

use crate::properties::PropertyDeclarationBlock;
use selectors::Element;
use servo_arc::Arc;

/// An opaque handle to an element, only good for identity comparisons.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OpaqueElement(pub usize);

/// The element interface the style system needs on top of what selector
/// matching uses.
pub trait TElement: Element {
    /// The identity of this element.
    fn opaque(&self) -> OpaqueElement;

    /// The declarations of the `style` attribute, if any.
    fn style_attribute(&self) -> Option<Arc<PropertyDeclarationBlock>>;

    /// The declarations mapped from presentational attributes such as
    /// `bgcolor`. They cascade as author declarations before any rule.
    fn presentational_hints(&self) -> Option<Arc<PropertyDeclarationBlock>> {
        None
    }

    /// Whether the element's inline style can change through the CSSOM,
    /// which keeps its matched declarations out of any cache.
    fn has_mutable_inline_style(&self) -> bool {
        false
    }

    /// Whether the element matches `:focus`.
    fn is_focused(&self) -> bool;

    /// The first element child, for tree walks.
    fn first_child_element(&self) -> Option<Self>;

    /// Marks the element and its whole subtree as needing a style
    /// recalculation.
    fn set_needs_style_recalc(&self);

    /// Whether `set_needs_style_recalc` was called on this element.
    fn needs_style_recalc(&self) -> bool;
}

/// Visits the elements of the subtree rooted at `root` in tree order.
/// Returning false from `f` skips the children of the element just visited.
pub fn traverse_subtree<E, F>(root: &E, mut f: F)
where
    E: TElement,
    F: FnMut(&E) -> bool,
{
    let mut stack = vec![root.clone()];
    while let Some(element) = stack.pop() {
        if !f(&element) {
            continue;
        }
        let mut children = vec![];
        let mut child = element.first_child_element();
        while let Some(c) = child {
            child = c.next_sibling_element();
            children.push(c);
        }
        stack.extend(children.into_iter().rev());
    }
}
