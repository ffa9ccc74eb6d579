/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::document;
use crate::mock_dom::el;
use selectors::bloom::hash_atom;
use style::Atom;
use style::bloom::SelectorFilter;
use style::dom::TElement;

fn contains(filter: &SelectorFilter, name: &str) -> bool {
    filter.filter().might_contain_hash(hash_atom(&Atom::from(name)))
}

#[test]
fn push_and_pop_track_the_ancestor_chain() {
    let (mut dom, body) = document();
    let div = dom.append(body, el("DIV").id("main").class("a b"));
    let p = dom.append(div, el("p"));

    let mut filter = SelectorFilter::new();
    assert!(filter.is_empty());
    filter.push_parent(&dom.element(0));
    filter.push_parent(&dom.element(body));
    filter.push_parent(&dom.element(div));
    assert_eq!(filter.matching_depth(), 3);
    assert!(filter.parent_stack_is_consistent(Some(dom.element(div).opaque())));
    assert!(!filter.parent_stack_is_consistent(Some(dom.element(body).opaque())));
    assert!(!filter.parent_stack_is_consistent(None));

    // Tag names are lowercased.
    assert!(contains(&filter, "div"));
    assert!(contains(&filter, "main"));
    assert!(contains(&filter, "b"));
    assert!(contains(&filter, "body"));
    assert!(!contains(&filter, "p"));

    assert_eq!(filter.pop_parent(), Some(dom.element(div).opaque()));
    assert!(!contains(&filter, "div"));
    assert!(!contains(&filter, "main"));
    assert!(contains(&filter, "body"));
    assert_eq!(filter.current_parent(), Some(dom.element(body).opaque()));

    filter.setup_parent_stack(&dom.element(p));
    assert_eq!(filter.matching_depth(), 4);
    assert_eq!(filter.current_parent(), Some(dom.element(p).opaque()));
    assert!(contains(&filter, "main"));

    filter.clear();
    assert!(filter.is_empty());
    assert!(filter.filter().is_zeroed());
    assert_eq!(filter.pop_parent(), None);
}

#[test]
fn clearing_many_hashes_empties_the_filter() {
    let (mut dom, body) = document();
    let mut parent = body;
    for i in 0..10 {
        parent = dom.append(parent, el("div").class(&format!("c{} d{} e{}", i, i, i)));
    }

    let mut filter = SelectorFilter::new();
    filter.setup_parent_stack(&dom.element(parent));
    assert_eq!(filter.matching_depth(), 12);
    assert!(contains(&filter, "e9"));
    filter.clear();
    assert!(filter.filter().is_zeroed());
    assert!(!contains(&filter, "c0"));
}
