/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![cfg(test)]

use mock_dom::{Dom, MockElement};
use selectors::Element;
use selectors::matching::QuirksMode;
use servo_arc::Arc;
use style::media_queries::MediaList;
use style::properties::ComputedValues;
use style::stylesheets::{Origin, SheetStore, Stylesheet, UrlExtraData};
use style::stylist::Stylist;
use url::Url;

mod bloom;
mod collection;
mod matching;
mod mock_dom;
mod stylesheets;
mod stylist;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn url_data(url: &str) -> UrlExtraData {
    UrlExtraData::new(Url::parse(url).unwrap())
}

/// Parses an author sheet of `http://example.com`.
fn author_sheet(store: &mut SheetStore, css: &str) -> Stylesheet {
    sheet_at(store, css, "http://example.com/style.css", Origin::Author)
}

fn sheet_at(store: &mut SheetStore, css: &str, url: &str, origin: Origin) -> Stylesheet {
    Stylesheet::from_str(
        store,
        css,
        url_data(url),
        origin,
        MediaList::parse_str(""),
        QuirksMode::NoQuirks,
        None,
        None,
    )
}

/// Resolves the style of every ancestor of `element` on the way down to
/// it, the way a style traversal would.
fn resolve(stylist: &mut Stylist, element: MockElement) -> Arc<ComputedValues> {
    let mut chain = vec![element];
    let mut current = element;
    while let Some(parent) = current.parent_element() {
        chain.push(parent);
        current = parent;
    }
    chain.reverse();

    let mut style: Option<Arc<ComputedValues>> = None;
    let last = chain.len() - 1;
    for (i, element) in chain.iter().enumerate() {
        style = Some(stylist.resolve_style(element, style.as_deref()));
        if i != last {
            stylist.push_parent_element(element);
        }
    }
    for element in chain[..last].iter().rev() {
        stylist.pop_parent_element(element);
    }
    style.unwrap()
}

/// A document with an `<html>` root and a `<body>`, returning the dom and
/// the index of the body.
fn document() -> (Dom, usize) {
    let mut dom = Dom::new();
    let html = dom.root(mock_dom::el("html"));
    let body = dom.append(html, mock_dom::el("body"));
    (dom, body)
}
