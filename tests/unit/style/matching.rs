/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::document;
use crate::mock_dom::{MockElement, el};
use selectors::SelectorList;
use selectors::matching::{
    LinkMatchType, MatchingContext, MatchingMode, QuirksMode, can_use_fast_path,
    determine_link_match_type, fast_matches_selector, matches_selector_list,
};
use style::selector_parser::SelectorParser;

fn parse(selectors: &str) -> SelectorList {
    SelectorParser::parse_author_origin_no_namespace(selectors).unwrap()
}

fn matches_in(
    mode: MatchingMode,
    quirks_mode: QuirksMode,
    selectors: &str,
    element: MockElement,
) -> bool {
    let mut context = MatchingContext::new(mode, None, quirks_mode);
    matches_selector_list(&parse(selectors), &element, &mut context)
}

fn matches(selectors: &str, element: MockElement) -> bool {
    matches_in(MatchingMode::QueryingRules, QuirksMode::NoQuirks, selectors, element)
}

#[test]
fn combinators() {
    let (mut dom, body) = document();
    let section = dom.append(body, el("section").id("main"));
    let heading = dom.append(section, el("h1"));
    let first = dom.append(section, el("p"));
    let div = dom.append(section, el("div"));
    let deep = dom.append(div, el("p"));
    let last = dom.append(section, el("p"));

    assert!(matches("section > p", dom.element(first)));
    assert!(!matches("section > p", dom.element(deep)));
    assert!(matches("#main p", dom.element(deep)));
    assert!(matches("body #main div > p", dom.element(deep)));
    assert!(matches("h1 + p", dom.element(first)));
    assert!(!matches("h1 + p", dom.element(last)));
    assert!(matches("h1 ~ p", dom.element(last)));
    assert!(!matches("p ~ h1", dom.element(heading)));
    // Backtracks to another ancestor after a failed child combinator.
    assert!(matches("section div > p", dom.element(deep)));
    assert!(!matches("h1 p", dom.element(deep)));
    assert!(matches("h1, div > p", dom.element(deep)));
}

#[test]
fn structural_pseudo_classes() {
    let (mut dom, body) = document();
    let list = dom.append(body, el("ul"));
    let items: Vec<usize> = (0..5).map(|_| dom.append(list, el("li"))).collect();
    let nested = dom.append(items[4], el("span"));

    assert!(matches(":root", dom.element(0)));
    assert!(!matches(":root", dom.element(body)));
    assert!(matches("li:first-child", dom.element(items[0])));
    assert!(matches("li:last-child", dom.element(items[4])));
    assert!(matches("span:only-child", dom.element(nested)));
    assert!(matches("span:only-of-type", dom.element(nested)));
    assert!(!matches("li:only-child", dom.element(items[0])));
    assert!(matches("li:nth-child(2n+1)", dom.element(items[2])));
    assert!(!matches("li:nth-child(odd)", dom.element(items[1])));
    assert!(matches("li:nth-child(even)", dom.element(items[3])));
    assert!(matches("li:nth-last-child(2)", dom.element(items[3])));
    assert!(matches("li:nth-of-type(3)", dom.element(items[2])));
    // Offsets at the edge of the integer range.
    assert!(matches("li:nth-child(2n-2147483648)", dom.element(items[1])));
    assert!(!matches("li:nth-child(2n-2147483648)", dom.element(items[0])));
    assert!(!matches("li:nth-last-child(-n-2147483648)", dom.element(items[1])));
    assert!(matches("li:nth-child(n-2147483647)", dom.element(items[1])));
    assert!(matches("li:empty", dom.element(items[0])));
    assert!(!matches("li:empty", dom.element(items[4])));
}

#[test]
fn attribute_selectors() {
    let (mut dom, body) = document();
    let link = dom.append(
        body,
        el("a")
            .attr("href", "https://example.com/index.html")
            .attr("rel", "nofollow noopener")
            .attr("lang", "en-US"),
    );

    assert!(matches("[href]", dom.element(link)));
    assert!(!matches("[title]", dom.element(link)));
    assert!(matches("[href^=https]", dom.element(link)));
    assert!(matches("[href$='.html']", dom.element(link)));
    assert!(matches("[href*=example]", dom.element(link)));
    assert!(matches("[rel~=noopener]", dom.element(link)));
    assert!(!matches("[rel~=noop]", dom.element(link)));
    assert!(matches("[lang|=en]", dom.element(link)));
    assert!(!matches("[lang=en-us]", dom.element(link)));
    assert!(matches("[lang=en-us i]", dom.element(link)));
    // Empty values never match these operators.
    assert!(!matches("[href^='']", dom.element(link)));
}

#[test]
fn negation_and_classes() {
    let (mut dom, body) = document();
    let both = dom.append(body, el("p").class("a b"));
    let only_a = dom.append(body, el("p").class("a"));

    assert!(matches(".a.b", dom.element(both)));
    assert!(!matches(".a.b", dom.element(only_a)));
    assert!(matches("p:not(.b)", dom.element(only_a)));
    assert!(!matches("p:not(.b)", dom.element(both)));
    assert!(matches(":not(div)", dom.element(both)));
}

#[test]
fn classes_and_ids_fold_case_in_quirks_mode() {
    let (mut dom, body) = document();
    let p = dom.append(body, el("p").id("Main").class("Intro"));

    assert!(!matches("#main", dom.element(p)));
    assert!(!matches(".intro", dom.element(p)));
    let quirks = |selectors: &str| {
        matches_in(MatchingMode::QueryingRules, QuirksMode::Quirks, selectors, dom.element(p))
    };
    assert!(quirks("#main"));
    assert!(quirks(".intro"));
    assert!(quirks("body .INTRO"));
}

#[test]
fn fast_path_agrees_with_full_matching() {
    let (mut dom, body) = document();
    let div = dom.append(body, el("div").class("outer"));
    let p = dom.append(div, el("p").id("x").class("inner"));

    for selector in ["p", "div p", ".outer #x", "body .outer p.inner", "html div #y"] {
        let list = parse(selector);
        let selector = &list.0[0];
        assert!(can_use_fast_path(selector));
        let mut context =
            MatchingContext::new(MatchingMode::ResolvingStyle, None, QuirksMode::NoQuirks);
        assert_eq!(
            fast_matches_selector(selector, &dom.element(p), QuirksMode::NoQuirks),
            matches_selector_list(&list, &dom.element(p), &mut context),
        );
    }

    for selector in ["div > p", "p:first-child", "[id]", "h1 + p"] {
        assert!(!can_use_fast_path(&parse(selector).0[0]));
    }
}

#[test]
fn link_pseudo_classes() {
    let (mut dom, body) = document();
    let link = dom.append(body, el("a").link(false));
    let anchor = dom.append(body, el("a"));

    assert!(matches("a:link", dom.element(link)));
    assert!(matches("a:any-link", dom.element(link)));
    assert!(!matches("a:link", dom.element(anchor)));
    // Queries never see the visited state.
    assert!(!matches("a:visited", dom.element(link)));
    // Styling matches both, and picks per link state when cascading.
    assert!(matches_in(
        MatchingMode::ResolvingStyle,
        QuirksMode::NoQuirks,
        "a:visited",
        dom.element(link),
    ));

    let link_match_type = |selector: &str| determine_link_match_type(&parse(selector).0[0]);
    assert_eq!(link_match_type("a:link"), LinkMatchType::MATCH_LINK);
    assert_eq!(link_match_type("a:visited"), LinkMatchType::MATCH_VISITED);
    assert_eq!(link_match_type("a:-webkit-any-link"), LinkMatchType::MATCH_ALL);
    assert_eq!(link_match_type("a:not(:visited)"), LinkMatchType::MATCH_LINK);
    assert_eq!(link_match_type(":visited span"), LinkMatchType::MATCH_VISITED);
    assert_eq!(link_match_type(":visited + span"), LinkMatchType::MATCH_ALL);
}

#[test]
fn pseudo_elements_never_match_the_element_itself() {
    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    assert!(!matches("p::before", dom.element(p)));
    assert!(matches("p::before, p", dom.element(p)));
}
