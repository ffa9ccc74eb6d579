/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::mock_dom::{MockElement, el};
use crate::{author_sheet, document, init_logger, resolve, sheet_at};
use std::collections::BTreeMap;
use style::config::StyleConfig;
use style::dom::TElement;
use style::rule_set::RuleSet;
use style::stylesheet_set::{DocumentStyleSheetCollection, StyleResolverUpdateType, UpdateFlag};
use style::stylesheets::Origin;
use style::stylist::Stylist;

fn update(
    collection: &mut DocumentStyleSheetCollection,
    stylist: &mut Stylist,
) -> (StyleResolverUpdateType, bool) {
    collection.update_active_style_sheets(
        UpdateFlag::OptimizedUpdate,
        stylist,
        None::<&MockElement>,
    )
}

fn add(collection: &mut DocumentStyleSheetCollection, css: &str) -> usize {
    let sheet = author_sheet(collection.store_mut(), css);
    collection.add_author_sheet(sheet)
}

fn paragraph_color(stylist: &mut Stylist) -> String {
    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    resolve(stylist, dom.element(p)).color().to_owned()
}

/// The positions of the rules of every bucket.
fn bucket_positions(rule_set: &RuleSet) -> BTreeMap<String, Vec<u32>> {
    rule_set
        .buckets()
        .map(|(bucket, rules)| {
            let mut positions: Vec<u32> = rules.iter().map(|rule| rule.position()).collect();
            positions.sort_unstable();
            (format!("{:?}", bucket), positions)
        })
        .collect()
}

#[test]
fn appending_is_additive_and_inserting_resets() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let mut stylist = Stylist::new(StyleConfig::default(), None);

    add(&mut collection, "p { color: red }");
    assert_eq!(
        update(&mut collection, &mut stylist),
        (StyleResolverUpdateType::Additive, true)
    );
    assert_eq!(paragraph_color(&mut stylist), "red");

    let blue = add(&mut collection, "p { color: blue }");
    assert_eq!(update(&mut collection, &mut stylist).0, StyleResolverUpdateType::Additive);
    assert_eq!(paragraph_color(&mut stylist), "blue");

    let green = author_sheet(collection.store_mut(), "p { color: green }");
    collection.insert_author_sheet(0, green);
    assert_eq!(update(&mut collection, &mut stylist).0, StyleResolverUpdateType::Reset);
    assert_eq!(paragraph_color(&mut stylist), "blue");
    assert_eq!(collection.active_author_sheets().len(), 3);

    assert!(collection.remove_author_sheet(blue));
    assert!(!collection.remove_author_sheet(blue));
    assert_eq!(
        update(&mut collection, &mut stylist),
        (StyleResolverUpdateType::Reconstruct, true)
    );
    assert_eq!(paragraph_color(&mut stylist), "red");
}

#[test]
fn additive_updates_build_the_same_rules_as_a_rebuild() {
    init_logger();
    let sheets = [
        "p { color: red } .a { color: blue } #b { width: 1px }",
        "p.a { color: green } * { margin-top: 1px } a:link { color: red }",
        ".a .c { color: black } :focus { width: 2px }",
    ];

    let mut incremental = DocumentStyleSheetCollection::new();
    let mut incremental_stylist = Stylist::new(StyleConfig::default(), None);
    for css in sheets {
        add(&mut incremental, css);
        assert_eq!(
            update(&mut incremental, &mut incremental_stylist).0,
            StyleResolverUpdateType::Additive
        );
    }

    let mut rebuilt = DocumentStyleSheetCollection::new();
    let mut rebuilt_stylist = Stylist::new(StyleConfig::default(), None);
    for css in sheets {
        add(&mut rebuilt, css);
    }
    assert_eq!(
        rebuilt.update_active_style_sheets(
            UpdateFlag::FullUpdate,
            &mut rebuilt_stylist,
            None::<&MockElement>,
        ),
        (StyleResolverUpdateType::Reconstruct, true)
    );

    let incremental_rules = incremental_stylist.rule_sets().author_style();
    let rebuilt_rules = rebuilt_stylist.rule_sets().author_style();
    assert_eq!(incremental_rules.rule_count(), rebuilt_rules.rule_count());
    assert_eq!(bucket_positions(incremental_rules), bucket_positions(rebuilt_rules));
}

#[test]
fn scoped_sheets_only_invalidate_their_scope() {
    init_logger();
    let (mut dom, body) = document();
    let scoped_div = dom.append(body, el("div").id("a"));
    let inside = dom.append(scoped_div, el("p").class("x"));
    let class_div = dom.append(body, el("div").class("c"));
    let nested = dom.append(class_div, el("span").class("c"));
    let outside = dom.append(body, el("p"));

    let mut collection = DocumentStyleSheetCollection::new();
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    add(&mut collection, "#a p { color: red } .c { color: blue }");
    let root = dom.element(0);
    assert_eq!(
        collection.update_active_style_sheets(UpdateFlag::OptimizedUpdate, &mut stylist, Some(&root)),
        (StyleResolverUpdateType::Additive, false)
    );

    assert!(dom.element(scoped_div).needs_style_recalc());
    assert!(dom.element(class_div).needs_style_recalc());
    // Descendants of marked elements are restyled along with them.
    assert!(!dom.element(inside).needs_style_recalc());
    assert!(!dom.element(nested).needs_style_recalc());
    assert!(!dom.element(outside).needs_style_recalc());
    assert!(!dom.element(body).needs_style_recalc());

    add(&mut collection, "p { color: green }");
    assert_eq!(
        collection.update_active_style_sheets(UpdateFlag::OptimizedUpdate, &mut stylist, Some(&root)),
        (StyleResolverUpdateType::Additive, true)
    );
}

#[test]
fn cssom_mutations_force_a_full_update() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    let key = add(&mut collection, "p { color: red }");
    update(&mut collection, &mut stylist);
    let rebuilds = stylist.num_rebuilds();

    let (sheet, store) = collection.author_sheet_mut(key).unwrap();
    assert_eq!(sheet.insert_rule(store, "p { color: blue }", 1, None), Ok(1));
    assert_eq!(
        update(&mut collection, &mut stylist),
        (StyleResolverUpdateType::Reconstruct, true)
    );
    assert_eq!(stylist.num_rebuilds(), rebuilds + 1);
    assert_eq!(paragraph_color(&mut stylist), "blue");

    // The mutation was accounted for.
    assert_eq!(update(&mut collection, &mut stylist).0, StyleResolverUpdateType::Additive);
}

#[test]
fn disabled_and_empty_sheets_are_inactive() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    let red = add(&mut collection, "p { color: red }");
    add(&mut collection, "");
    let mut disabled = author_sheet(collection.store_mut(), "p { color: blue }");
    assert!(disabled.set_disabled(true));
    let disabled = collection.add_author_sheet(disabled);

    update(&mut collection, &mut stylist);
    assert_eq!(collection.active_author_sheets(), &[red]);
    assert_eq!(paragraph_color(&mut stylist), "red");

    let (sheet, _) = collection.author_sheet_mut(disabled).unwrap();
    sheet.set_disabled(false);
    assert_eq!(update(&mut collection, &mut stylist).0, StyleResolverUpdateType::Additive);
    assert_eq!(collection.active_author_sheets(), &[red, disabled]);
    assert_eq!(paragraph_color(&mut stylist), "blue");
}

#[test]
fn user_sheets_are_added_by_a_reconstruct() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    add(&mut collection, "p { color: red }");
    update(&mut collection, &mut stylist);

    let user = sheet_at(
        collection.store_mut(),
        "p { color: green !important }",
        "file:///user.css",
        Origin::User,
    );
    collection.add_user_sheet(user);
    assert_eq!(collection.user_sheets().len(), 1);
    assert_eq!(update(&mut collection, &mut stylist).0, StyleResolverUpdateType::Reconstruct);
    assert_eq!(paragraph_color(&mut stylist), "green");
}

#[test]
fn pending_sheets_are_counted() {
    let mut collection = DocumentStyleSheetCollection::new();
    assert!(!collection.has_pending_sheets());
    collection.add_pending_sheet();
    collection.add_pending_sheet();
    assert!(collection.has_pending_sheets());
    assert!(!collection.pending_sheet_loaded());
    assert!(collection.pending_sheet_loaded());
    assert!(!collection.has_pending_sheets());
}
