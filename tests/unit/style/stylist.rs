/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::mock_dom::el;
use crate::{author_sheet, document, init_logger, resolve, sheet_at};
use selectors::parser::PseudoElement;
use style::config::StyleConfig;
use style::properties::LonghandId;
use style::stylesheets::{Origin, SheetStore};
use style::stylist::{RulesToInclude, Stylist};
use url::Url;

fn stylist_with(css: &str) -> Stylist {
    init_logger();
    let mut store = SheetStore::default();
    let sheet = author_sheet(&mut store, css);
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    stylist.append_author_style_sheets(0, &[&sheet], &store);
    stylist
}

#[test]
fn later_rule_wins_between_equal_specificities() {
    let mut stylist = stylist_with("p { color: red; } p { color: blue; }");
    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "blue");
}

#[test]
fn specificity_beats_source_order() {
    let mut stylist = stylist_with(
        "#x { color: red } .a.b { color: green } .a { color: blue } p { color: black }",
    );
    let (mut dom, body) = document();
    let p = dom.append(body, el("p").id("x").class("a b"));
    let q = dom.append(body, el("p").class("a b"));
    let r = dom.append(body, el("p").class("a"));
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "red");
    assert_eq!(resolve(&mut stylist, dom.element(q)).color(), "green");
    assert_eq!(resolve(&mut stylist, dom.element(r)).color(), "blue");
}

#[test]
fn user_agent_rules_apply_to_html_elements_only() {
    let mut stylist = stylist_with("");
    let (mut dom, body) = document();
    let div = dom.append(body, el("div"));
    let svg_div = dom.append(body, el("div").namespace("http://www.w3.org/2000/svg"));

    let body_style = resolve(&mut stylist, dom.element(body));
    assert_eq!(body_style.get(LonghandId::MarginTop), "8px");
    assert_eq!(resolve(&mut stylist, dom.element(div)).get(LonghandId::Display), "block");
    assert_eq!(
        resolve(&mut stylist, dom.element(svg_div)).get(LonghandId::Display),
        "inline"
    );
}

#[test]
fn origins_cascade_in_order() {
    init_logger();
    let mut store = SheetStore::default();
    let user = sheet_at(
        &mut store,
        "p { color: green !important; width: 1px; margin-top: 1px }",
        "file:///user.css",
        Origin::User,
    );
    let author = author_sheet(
        &mut store,
        "p { color: red !important; width: 2px } p { margin-top: 2px !important }",
    );
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    stylist.init_user_style(&[&user], &store);
    stylist.append_author_style_sheets(0, &[&author], &store);

    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    let style = resolve(&mut stylist, dom.element(p));
    // Important user declarations beat important author ones.
    assert_eq!(style.color(), "green");
    // Normal author declarations beat normal user ones.
    assert_eq!(style.get(LonghandId::Width), "2px");
    // Important author declarations beat the normal user agent margin.
    assert_eq!(style.get(LonghandId::MarginTop), "2px");
}

#[test]
fn style_attribute_cascade() {
    let mut stylist = stylist_with("p { color: red; width: 1px !important; margin-top: 1px !important }");
    let (mut dom, body) = document();
    let p = dom.append(
        body,
        el("p").style("color: blue; width: 2px; margin-top: 2px !important"),
    );
    let style = resolve(&mut stylist, dom.element(p));
    assert_eq!(style.color(), "blue");
    assert_eq!(style.get(LonghandId::Width), "1px");
    assert_eq!(style.get(LonghandId::MarginTop), "2px");
}

#[test]
fn presentational_hints_lose_to_author_rules() {
    let mut stylist = stylist_with("p.styled { color: blue }");
    let (mut dom, body) = document();
    let hinted = dom.append(body, el("p").hints("color: red; width: 3px"));
    let styled = dom.append(body, el("p").class("styled").hints("color: red"));
    let hinted_style = resolve(&mut stylist, dom.element(hinted));
    assert_eq!(hinted_style.color(), "red");
    assert_eq!(hinted_style.get(LonghandId::Width), "3px");
    assert_eq!(resolve(&mut stylist, dom.element(styled)).color(), "blue");

    let result = stylist.match_rules(&dom.element(styled), None);
    let author = result.declarations_of(Origin::Author);
    assert_eq!(author.len(), 2);
    assert!(author[0].source.rule().is_none());
    assert!(author[1].source.rule().is_some());
}

#[test]
fn mutable_inline_style_is_not_cacheable() {
    let stylist = stylist_with("");
    let (mut dom, body) = document();
    let fixed = dom.append(body, el("p").style("color: red"));
    let mutable = dom.append(body, el("p").mutable_style("color: red"));
    assert!(stylist.match_rules(&dom.element(fixed), None).is_cacheable);
    assert!(!stylist.match_rules(&dom.element(mutable), None).is_cacheable);
}

#[test]
fn author_and_user_styles_can_be_turned_off() {
    let mut store = SheetStore::default();
    let sheet = author_sheet(&mut store, "div { color: red }");
    let config = StyleConfig {
        match_author_and_user_styles: false,
        ..StyleConfig::default()
    };
    let mut stylist = Stylist::new(config, None);
    stylist.append_author_style_sheets(0, &[&sheet], &store);

    let (mut dom, body) = document();
    let div = dom.append(body, el("div").style("width: 5px"));
    let style = resolve(&mut stylist, dom.element(div));
    assert_eq!(style.get(LonghandId::Display), "block");
    assert_eq!(style.color(), "black");
    assert_eq!(style.get(LonghandId::Width), "auto");
}

#[test]
fn quirks_mode_folds_class_case_and_adds_quirks_rules() {
    let mut store = SheetStore::default();
    let sheet = author_sheet(&mut store, ".Foo { color: red }");
    let config = StyleConfig {
        quirks_mode: true,
        ..StyleConfig::default()
    };
    let mut stylist = Stylist::new(config, None);
    stylist.append_author_style_sheets(0, &[&sheet], &store);

    let (mut dom, body) = document();
    let p = dom.append(body, el("p").class("foo"));
    let form = dom.append(body, el("form"));
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "red");
    assert_eq!(
        resolve(&mut stylist, dom.element(form)).get(LonghandId::MarginBottom),
        "1em"
    );

    let mut standards = stylist_with(".Foo { color: red }");
    assert_ne!(resolve(&mut standards, dom.element(p)).color(), "red");
    assert_eq!(
        resolve(&mut standards, dom.element(form)).get(LonghandId::MarginBottom),
        "0px"
    );
}

#[test]
fn pseudo_element_styles() {
    let mut stylist = stylist_with("p::before { color: red } p::after { } p { color: blue }");
    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));

    let style = resolve(&mut stylist, dom.element(p));
    assert_eq!(style.color(), "blue");
    assert!(style.has_pseudo_style(&PseudoElement::Before));
    // Empty rules are ignored.
    assert!(!style.has_pseudo_style(&PseudoElement::After));

    let before = stylist
        .resolve_pseudo_style(&dom.element(p), &PseudoElement::Before, &style)
        .unwrap();
    assert_eq!(before.color(), "red");
    assert!(stylist
        .resolve_pseudo_style(&dom.element(p), &PseudoElement::After, &style)
        .is_none());
    assert!(stylist
        .resolve_pseudo_style(&dom.element(p), &PseudoElement::FirstLine, &style)
        .is_none());
}

#[test]
fn visited_links_get_a_visited_style() {
    let mut stylist =
        stylist_with("a:link { background-color: white } a:visited { background-color: gray; width: 9px }");
    let (mut dom, body) = document();
    let visited = dom.append(body, el("a").link(true));
    let unvisited = dom.append(body, el("a").link(false));
    let span = dom.append(visited, el("span"));

    let style = resolve(&mut stylist, dom.element(visited));
    assert!(style.is_link());
    assert_eq!(style.color(), "purple");
    assert_eq!(style.resolved_value(LonghandId::BackgroundColor), "gray");
    // Visited rules only ever set visited-dependent properties.
    assert_eq!(style.get(LonghandId::Width), "auto");
    assert_eq!(style.get(LonghandId::BackgroundColor), "white");

    let style = resolve(&mut stylist, dom.element(unvisited));
    assert_eq!(style.color(), "blue");
    assert_eq!(style.resolved_value(LonghandId::BackgroundColor), "white");

    // Inside a visited link, the visited color is inherited.
    let style = resolve(&mut stylist, dom.element(span));
    assert!(!style.is_link());
    assert_eq!(style.color(), "purple");
}

#[test]
fn focus_rules() {
    let mut stylist = stylist_with("p:focus { color: red }");
    let (mut dom, body) = document();
    let focused = dom.append(body, el("p").focused());
    let other = dom.append(body, el("p"));
    assert_eq!(resolve(&mut stylist, dom.element(focused)).color(), "red");
    assert_ne!(resolve(&mut stylist, dom.element(other)).color(), "red");
}

#[test]
fn custom_pseudo_elements_style_shadow_elements() {
    let mut stylist = stylist_with(
        "input::-webkit-inner-spin-button { color: red } \
         video::cue { color: green; margin-top: 4px } \
         div::-webkit-inner-spin-button { color: blue }",
    );
    let (mut dom, body) = document();
    let input = dom.append(body, el("input"));
    let spin = dom.shadow_child(input, el("div").custom_pseudo_element("-webkit-inner-spin-button"));
    let video = dom.append(body, el("video"));
    let cue = dom.shadow_child(video, el("span").custom_pseudo_element("cue"));

    assert_eq!(resolve(&mut stylist, dom.element(spin)).color(), "red");
    let cue_style = resolve(&mut stylist, dom.element(cue));
    assert_eq!(cue_style.color(), "green");
    assert_eq!(cue_style.get(LonghandId::MarginTop), "0px");
}

#[test]
fn region_rules_apply_inside_matching_regions() {
    let mut stylist = stylist_with(
        "@-webkit-region #r { p { color: red; margin-top: 5px } } p { color: blue }",
    );
    let (mut dom, body) = document();
    let region = dom.append(body, el("div").id("r"));
    let other_region = dom.append(body, el("div").id("s"));
    let p = dom.append(body, el("p"));

    assert!(stylist.check_region_style(&dom.element(region)));
    assert!(!stylist.check_region_style(&dom.element(other_region)));

    let plain = stylist.resolve_style(&dom.element(p), None);
    assert_eq!(plain.color(), "blue");
    let in_region = stylist.resolve_style_in_region(&dom.element(p), None, &dom.element(region));
    assert_eq!(in_region.color(), "red");
    assert_eq!(in_region.get(LonghandId::MarginTop), "1em");
    let elsewhere =
        stylist.resolve_style_in_region(&dom.element(p), None, &dom.element(other_region));
    assert_eq!(elsewhere.color(), "blue");
}

#[test]
fn sharing_candidates_are_rejected_by_sibling_and_attribute_rules() {
    let stylist = stylist_with("h1 + p { color: red } [data-state=open] { color: blue } div { }");
    let (mut dom, body) = document();
    dom.append(body, el("h1"));
    let after_heading = dom.append(body, el("p"));
    let plain = dom.append(body, el("p"));
    let open = dom.append(body, el("div").attr("data-state", "open"));

    assert!(stylist.style_sharing_candidate_matches_rule_sets(&dom.element(after_heading)));
    assert!(!stylist.style_sharing_candidate_matches_rule_sets(&dom.element(plain)));
    assert!(stylist.style_sharing_candidate_matches_rule_sets(&dom.element(open)));
}

#[test]
fn feature_queries() {
    let stylist = stylist_with("#main .item[data-x] { color: red } p::first-line { color: blue }");
    assert!(stylist.has_selector_for_id(&"main".into()));
    assert!(stylist.has_selector_for_class(&"item".into()));
    assert!(stylist.has_selector_for_attribute(&"data-x".into()));
    assert!(!stylist.has_selector_for_class(&"main".into()));
    assert!(stylist.uses_first_line_rules());
    // html.css has `q::before`.
    assert!(stylist.uses_before_after_rules());
}

#[test]
fn style_rules_for_element_filters() {
    init_logger();
    let mut store = SheetStore::default();
    let same_origin = author_sheet(&mut store, "p { color: red } p.empty { } p::before { color: blue }");
    let other_origin = sheet_at(
        &mut store,
        "p { width: 1px }",
        "http://cdn.example.net/style.css",
        Origin::Author,
    );
    let origin = Url::parse("http://example.com/").unwrap().origin();
    let mut stylist = Stylist::new(StyleConfig::default(), Some(origin));
    stylist.append_author_style_sheets(0, &[&same_origin, &other_origin], &store);

    let (mut dom, body) = document();
    let p = dom.append(body, el("p").class("empty"));
    let element = dom.element(p);

    let all = stylist.style_rules_for_element(&element, None, RulesToInclude::ALL_BUT_EMPTY_RULES);
    // html.css sets the display and margins of paragraphs.
    assert!(all.len() >= 3);
    let author = stylist.style_rules_for_element(
        &element,
        None,
        RulesToInclude::AUTHOR_RULES | RulesToInclude::CROSS_ORIGIN_RULES,
    );
    assert_eq!(author.len(), 2);
    let same_origin_only =
        stylist.style_rules_for_element(&element, None, RulesToInclude::AUTHOR_RULES);
    assert_eq!(same_origin_only.len(), 1);
    let with_empty = stylist.style_rules_for_element(
        &element,
        None,
        RulesToInclude::AUTHOR_RULES | RulesToInclude::EMPTY_RULES,
    );
    assert_eq!(with_empty.len(), 2);
    let before = stylist.style_rules_for_element(
        &element,
        Some(&PseudoElement::Before),
        RulesToInclude::AUTHOR_RULES,
    );
    assert_eq!(before.len(), 1);
}

#[test]
fn appending_sheets_keeps_source_order() {
    init_logger();
    let mut store = SheetStore::default();
    let first = author_sheet(&mut store, "p { color: red }");
    let second = author_sheet(&mut store, "p { color: blue }");
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    stylist.append_author_style_sheets(0, &[&first], &store);
    stylist.append_author_style_sheets(1, &[&first, &second], &store);

    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "blue");

    stylist.reset_author_style();
    stylist.append_author_style_sheets(0, &[&second, &first], &store);
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "red");
}
