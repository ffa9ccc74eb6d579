/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::mock_dom::{MockElement, el};
use crate::{document, init_logger, resolve, url_data};
use cssparser::SourceLocation;
use selectors::matching::QuirksMode;
use std::cell::RefCell;
use style::config::StyleConfig;
use style::error_reporting::{ContextualParseError, ParseErrorReporter};
use style::media_queries::MediaList;
use style::properties::LonghandId;
use style::stylesheet_set::{DocumentStyleSheetCollection, StyleResolverUpdateType, UpdateFlag};
use style::stylesheets::{
    CssRule, LoadResult, Origin, Stylesheet, StylesheetContents, StylesheetLoader, UrlExtraData,
};
use style::stylist::Stylist;
use url::Url;

#[derive(Debug)]
struct CSSError {
    pub url: Url,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

struct TestingErrorReporter {
    errors: RefCell<Vec<CSSError>>,
}

impl TestingErrorReporter {
    pub fn new() -> Self {
        TestingErrorReporter {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Checks that the errors were reported in this order, each on the given
    /// line, with a message starting with the given text.
    fn assert_messages_contain(&self, expected_errors: &[(u32, &str)]) {
        let errors = self.errors.borrow();
        for (i, (error, &(line, message))) in errors.iter().zip(expected_errors).enumerate() {
            assert_eq!(
                (error.line, error.message.starts_with(message)),
                (line, true),
                "{}: expected {:?} on line {}, got {:?}",
                i,
                message,
                line,
                error,
            );
        }
        assert_eq!(errors.len(), expected_errors.len(), "{:#?}", errors);
    }
}

impl ParseErrorReporter for TestingErrorReporter {
    fn report_error(
        &self,
        url: &UrlExtraData,
        location: SourceLocation,
        error: ContextualParseError,
    ) {
        self.errors.borrow_mut().push(CSSError {
            url: url.url().clone(),
            line: location.line,
            column: location.column,
            message: error.to_string(),
        })
    }
}

#[test]
fn test_report_error_stylesheet() {
    init_logger();
    let css = r"
    div {
        color: red;
        display: invalid;
        invalid: true;
        -moz-background-color: red;
        _background-color: red;
    }
    @invalid;
    @keyframes foo { from invalid {} to { margin-top: 0 invalid; } }
    ";
    let url = Url::parse("http://example.com/errors.css").unwrap();
    let error_reporter = TestingErrorReporter::new();

    let contents = StylesheetContents::from_str(
        css,
        UrlExtraData::new(url.clone()),
        Origin::Author,
        QuirksMode::NoQuirks,
        None,
        Some(&error_reporter),
    );

    // Lines are zero-based.
    error_reporter.assert_messages_contain(&[
        (3, "Unsupported property declaration: 'display: invalid"),
        (4, "Unsupported property declaration: 'invalid: true"),
        (8, "Unsupported rule: '@invalid"),
        (9, "Invalid keyframe rule: 'from invalid"),
        (9, "Unsupported keyframe property declaration: 'margin-top: 0 invalid"),
    ]);
    assert_eq!(error_reporter.errors.borrow()[0].url, url);
    assert!(error_reporter.errors.borrow()[0].column > 0);

    // The valid parts survive.
    assert_eq!(contents.rule_count(), 2);
    match contents.rule_at(0) {
        Some(CssRule::Style(rule)) => assert_eq!(rule.block.len(), 1),
        other => panic!("expected a style rule, got {:?}", other),
    }
}

struct TextLoader;

impl StylesheetLoader for TextLoader {
    fn request_stylesheet(&self, url: &Url, _media: &MediaList) -> LoadResult {
        if url.path() == "/base.css" {
            LoadResult::Text("p { color: green; width: 1px }".to_owned())
        } else {
            LoadResult::Failed
        }
    }
}

struct PendingLoader;

impl StylesheetLoader for PendingLoader {
    fn request_stylesheet(&self, _url: &Url, _media: &MediaList) -> LoadResult {
        LoadResult::Pending
    }
}

#[test]
fn imported_rules_come_before_the_importing_sheet() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let sheet = Stylesheet::from_str(
        collection.store_mut(),
        "@import url(base.css); @import 'missing.css'; p { color: red }",
        url_data("http://example.com/style.css"),
        Origin::Author,
        MediaList::parse_str(""),
        QuirksMode::NoQuirks,
        Some(&TextLoader),
        None,
    );
    let contents = sheet.contents_in(collection.store());
    let imports: Vec<_> = contents.import_rules().collect();
    assert_eq!(imports.len(), 2);
    assert!(imports[0].stylesheet().is_some());
    assert!(imports[1].has_failed_or_canceled_subresources());
    assert!(!contents.is_loading());
    collection.add_author_sheet(sheet);

    let mut stylist = Stylist::new(StyleConfig::default(), None);
    collection.update_active_style_sheets(
        UpdateFlag::OptimizedUpdate,
        &mut stylist,
        None::<&MockElement>,
    );
    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    let style = resolve(&mut stylist, dom.element(p));
    assert_eq!(style.color(), "red");
    assert_eq!(style.get(LonghandId::Width), "1px");
}

#[test]
fn finishing_an_import_load_rebuilds_everything() {
    init_logger();
    let mut collection = DocumentStyleSheetCollection::new();
    let sheet = Stylesheet::from_str(
        collection.store_mut(),
        "@import url(late.css); p { width: 2px }",
        url_data("http://example.com/style.css"),
        Origin::Author,
        MediaList::parse_str(""),
        QuirksMode::NoQuirks,
        Some(&PendingLoader),
        None,
    );
    assert!(sheet.is_loading(collection.store()));
    let key = collection.add_author_sheet(sheet);

    let (mut dom, body) = document();
    let p = dom.append(body, el("p"));
    let mut stylist = Stylist::new(StyleConfig::default(), None);
    let root = dom.element(0);
    assert_eq!(
        collection.update_active_style_sheets(UpdateFlag::OptimizedUpdate, &mut stylist, Some(&root)),
        (StyleResolverUpdateType::Additive, true)
    );
    assert_eq!(resolve(&mut stylist, dom.element(p)).color(), "black");

    let late = Url::parse("http://example.com/late.css").unwrap();
    let (sheet, store) = collection.author_sheet_mut(key).unwrap();
    let loaded = sheet.will_mutate_rules(store).set_import_sheet(
        &late,
        LoadResult::Text("p { color: green }".to_owned()),
        None,
    );
    assert!(loaded);
    let sheet = collection.author_sheet(key).unwrap();
    assert!(!sheet.is_loading(collection.store()));

    assert_eq!(
        collection.update_active_style_sheets(UpdateFlag::OptimizedUpdate, &mut stylist, Some(&root)),
        (StyleResolverUpdateType::Reconstruct, true)
    );
    let style = resolve(&mut stylist, dom.element(p));
    assert_eq!(style.color(), "green");
    assert_eq!(style.get(LonghandId::Width), "2px");
}
