/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The default style sheets of the user agent, and their rule sets.

use crate::error_reporting::ParseErrorReporter;
use crate::media_queries::Device;
use crate::rule_set::RuleSet;
use crate::stylesheets::{Origin, StylesheetContents, UrlExtraData};
use crate::stylist::ExtraStyleData;
use log::debug;
use selectors::matching::QuirksMode;
use url::Url;

const HTML_CSS: &str = include_str!("../../resources/html.css");
const QUIRKS_CSS: &str = include_str!("../../resources/quirks.css");
const VIEW_SOURCE_CSS: &str = include_str!("../../resources/view-source.css");

fn ua_sheet_url(file_name: &str) -> Url {
    match Url::parse("chrome://resources/").and_then(|base| base.join(file_name)) {
        Ok(url) => url,
        // Both parts are constants that parse.
        Err(error) => unreachable!("bad user agent sheet URL: {}", error),
    }
}

fn parse_ua_sheet(
    css: &str,
    file_name: &str,
    error_reporter: Option<&dyn ParseErrorReporter>,
) -> StylesheetContents {
    StylesheetContents::from_str(
        css,
        UrlExtraData::new(ua_sheet_url(file_name)),
        Origin::UserAgent,
        QuirksMode::NoQuirks,
        None,
        error_reporter,
    )
}

/// The parsed user agent sheets. They are parsed once per style system and
/// never mutated.
#[derive(Debug)]
pub struct UserAgentStylesheets {
    pub html: StylesheetContents,
    /// Applies on top of `html` in quirks mode.
    pub quirks: StylesheetContents,
    /// Applies on top of `html` in view-source documents.
    pub view_source: StylesheetContents,
}

impl UserAgentStylesheets {
    pub fn new(error_reporter: Option<&dyn ParseErrorReporter>) -> Self {
        debug!("Parsing the user agent style sheets");
        UserAgentStylesheets {
            html: parse_ua_sheet(HTML_CSS, "html.css", error_reporter),
            quirks: parse_ua_sheet(QUIRKS_CSS, "quirks.css", error_reporter),
            view_source: parse_ua_sheet(VIEW_SOURCE_CSS, "view-source.css", error_reporter),
        }
    }
}

/// The rule sets of the user agent sheets for a given device. The print
/// variant of the default style is the default style of a print device.
#[derive(Debug)]
pub struct UserAgentRuleSets {
    pub default_style: RuleSet,
    pub default_quirks_style: RuleSet,
    pub view_source_style: RuleSet,
}

impl UserAgentRuleSets {
    pub fn new(
        sheets: &UserAgentStylesheets,
        device: &Device,
        extra_data: &mut ExtraStyleData,
    ) -> Self {
        let build = |contents: &StylesheetContents, extra_data: &mut ExtraStyleData| {
            let mut rule_set = RuleSet::new();
            rule_set.add_rules_from_sheet(contents, device, Some(extra_data), None);
            rule_set
        };
        UserAgentRuleSets {
            default_style: build(&sheets.html, extra_data),
            default_quirks_style: build(&sheets.quirks, extra_data),
            view_source_style: build(&sheets.view_source, extra_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::Atom;

    #[test]
    fn default_sheets_parse() {
        let sheets = UserAgentStylesheets::new(None);
        assert!(sheets.html.rule_count() > 10);
        assert!(sheets.quirks.rule_count() > 0);
        assert!(sheets.view_source.rule_count() > 0);

        let mut extra_data = ExtraStyleData::default();
        let rule_sets =
            UserAgentRuleSets::new(&sheets, &StyleConfig::default().device(), &mut extra_data);
        assert!(rule_sets.default_style.tag_rules(&Atom::from("body")).is_some());
        assert!(!rule_sets.default_style.link_pseudo_class_rules().is_empty());
        assert!(rule_sets.default_style.features().uses_before_after_rules);
    }
}
