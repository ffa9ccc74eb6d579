/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The user and author rule sets of a document, and the features gathered
//! over them and the user agent rules.

use crate::media_queries::Device;
use crate::rule_feature::{RuleFeature, RuleFeatureSet};
use crate::rule_set::{AddRuleFlags, RuleSet};
use crate::stylesheets::{SheetStore, Stylesheet};
use crate::stylist::ExtraStyleData;
use crate::ua_sheets::UserAgentRuleSets;
use log::debug;
use selectors::matching::QuirksMode;
use url::Origin as SecurityOrigin;

/// Builds a rule set out of the selectors recorded by a feature set.
fn make_rule_set(features: &[RuleFeature], quirks_mode: QuirksMode) -> Option<RuleSet> {
    if features.is_empty() {
        return None;
    }
    let mut rule_set = RuleSet::with_quirks_mode(quirks_mode);
    for feature in features {
        let flags = if feature.has_document_security_origin {
            AddRuleFlags::HAS_DOCUMENT_SECURITY_ORIGIN
        } else {
            AddRuleFlags::empty()
        };
        rule_set.add_rule(feature.rule.clone(), feature.selector_index, flags);
    }
    rule_set.shrink_to_fit();
    Some(rule_set)
}

/// The rule sets built from the sheets of a document.
#[derive(Debug)]
pub struct DocumentRuleSets {
    author_style: RuleSet,
    user_style: Option<RuleSet>,
    features: RuleFeatureSet,
    sibling_rule_set: Option<RuleSet>,
    uncommon_attribute_rule_set: Option<RuleSet>,
    quirks_mode: QuirksMode,
    max_selector_component_count: usize,
}

impl DocumentRuleSets {
    pub fn new(quirks_mode: QuirksMode, max_selector_component_count: usize) -> Self {
        DocumentRuleSets {
            author_style: Self::empty_author_style(quirks_mode, max_selector_component_count),
            user_style: None,
            features: RuleFeatureSet::new(),
            sibling_rule_set: None,
            uncommon_attribute_rule_set: None,
            quirks_mode,
            max_selector_component_count,
        }
    }

    fn empty_author_style(quirks_mode: QuirksMode, max_selector_component_count: usize) -> RuleSet {
        let mut rule_set = RuleSet::with_quirks_mode(quirks_mode);
        rule_set.set_max_selector_component_count(max_selector_component_count);
        // Author sheets keep coming; the buckets are compacted once per
        // append instead.
        rule_set.disable_auto_shrink_to_fit();
        rule_set
    }

    /// Folds the user sheets that apply to `device` into a user rule set.
    /// It is kept only when some rule ended up in it.
    pub fn init_user_style(
        &mut self,
        user_sheets: &[&Stylesheet],
        store: &SheetStore,
        device: &Device,
        extra_data: &mut ExtraStyleData,
        document_origin: Option<&SecurityOrigin>,
    ) {
        let mut user_style = RuleSet::with_quirks_mode(self.quirks_mode);
        user_style.set_max_selector_component_count(self.max_selector_component_count);
        for sheet in user_sheets {
            if !device.evaluate(Some(sheet.media())) {
                continue;
            }
            user_style.add_rules_from_sheet(
                sheet.contents_in(store),
                device,
                Some(&mut *extra_data),
                document_origin,
            );
        }
        self.user_style = if user_style.rule_count() > 0 || !user_style.page_rules().is_empty() {
            Some(user_style)
        } else {
            None
        };
    }

    /// Throws the author rules away.
    pub fn reset_author_style(&mut self) {
        self.author_style =
            Self::empty_author_style(self.quirks_mode, self.max_selector_component_count);
    }

    /// Adds the rules of `sheets[first_new..]`, assuming every sheet before
    /// `first_new` is already in. Sheets whose media do not match `device`
    /// are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn append_author_style_sheets(
        &mut self,
        first_new: usize,
        sheets: &[&Stylesheet],
        store: &SheetStore,
        device: &Device,
        extra_data: &mut ExtraStyleData,
        document_origin: Option<&SecurityOrigin>,
        is_view_source: bool,
        ua: &UserAgentRuleSets,
    ) {
        for sheet in sheets.iter().skip(first_new) {
            if !device.evaluate(Some(sheet.media())) {
                debug!("Skipping author sheet {}: media does not match", sheet.key());
                continue;
            }
            self.author_style.add_rules_from_sheet(
                sheet.contents_in(store),
                device,
                Some(&mut *extra_data),
                document_origin,
            );
        }
        self.author_style.shrink_to_fit();
        self.collect_features(is_view_source, ua);
    }

    /// Rebuilds the feature set from every origin, then the sibling and
    /// uncommon attribute rule sets out of it.
    pub fn collect_features(&mut self, is_view_source: bool, ua: &UserAgentRuleSets) {
        self.features.clear();
        self.features.add(ua.default_style.features());
        self.features.add(self.author_style.features());
        if is_view_source {
            self.features.add(ua.view_source_style.features());
        }
        if let Some(ref user_style) = self.user_style {
            self.features.add(user_style.features());
        }

        self.sibling_rule_set = make_rule_set(&self.features.sibling_rules, self.quirks_mode);
        self.uncommon_attribute_rule_set =
            make_rule_set(&self.features.uncommon_attribute_rules, self.quirks_mode);
        debug!(
            "Collected features: {} sibling rules, {} uncommon attribute rules",
            self.features.sibling_rules.len(),
            self.features.uncommon_attribute_rules.len()
        );
    }

    #[inline]
    pub fn author_style(&self) -> &RuleSet {
        &self.author_style
    }

    #[inline]
    pub fn user_style(&self) -> Option<&RuleSet> {
        self.user_style.as_ref()
    }

    #[inline]
    pub fn features(&self) -> &RuleFeatureSet {
        &self.features
    }

    #[inline]
    pub fn sibling(&self) -> Option<&RuleSet> {
        self.sibling_rule_set.as_ref()
    }

    #[inline]
    pub fn uncommon_attribute(&self) -> Option<&RuleSet> {
        self.uncommon_attribute_rule_set.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StyleConfig, MAX_SELECTOR_COMPONENT_COUNT};
    use crate::media_queries::MediaList;
    use crate::stylesheets::{Origin, UrlExtraData};
    use crate::ua_sheets::UserAgentStylesheets;
    use crate::Atom;
    use url::Url;

    fn sheet(store: &mut SheetStore, css: &str, media: &str, origin: Origin) -> Stylesheet {
        Stylesheet::from_str(
            store,
            css,
            UrlExtraData::new(Url::parse("http://example.com/a.css").unwrap()),
            origin,
            MediaList::parse_str(media),
            QuirksMode::NoQuirks,
            None,
            None,
        )
    }

    #[test]
    fn appends_skip_non_matching_media_and_collect_features() {
        let device = StyleConfig::default().device();
        let mut extra_data = ExtraStyleData::default();
        let ua = UserAgentRuleSets::new(&UserAgentStylesheets::new(None), &device, &mut extra_data);
        let mut store = SheetStore::default();
        let first = sheet(&mut store, "#a { color: red } a + b { color: blue }", "", Origin::Author);
        let second = sheet(&mut store, ".b { color: red }", "print", Origin::Author);
        let third = sheet(&mut store, "[data-x] { color: red }", "screen", Origin::Author);

        let mut rule_sets = DocumentRuleSets::new(QuirksMode::NoQuirks, MAX_SELECTOR_COMPONENT_COUNT);
        rule_sets.append_author_style_sheets(
            0,
            &[&first, &second, &third],
            &store,
            &device,
            &mut extra_data,
            None,
            false,
            &ua,
        );

        assert_eq!(rule_sets.author_style().rule_count(), 3);
        assert!(rule_sets.features().has_selector_for_id(&Atom::from("a")));
        assert!(!rule_sets.features().has_selector_for_class(&Atom::from("b")));
        assert!(rule_sets.sibling().is_some());
        assert!(rule_sets.uncommon_attribute().is_some());
    }

    #[test]
    fn empty_user_sheets_leave_no_user_style() {
        let device = StyleConfig::default().device();
        let mut extra_data = ExtraStyleData::default();
        let mut store = SheetStore::default();
        let empty = sheet(&mut store, "", "", Origin::User);
        let pages = sheet(&mut store, "@page { margin: 1in }", "", Origin::User);

        let mut rule_sets = DocumentRuleSets::new(QuirksMode::NoQuirks, MAX_SELECTOR_COMPONENT_COUNT);
        rule_sets.init_user_style(&[&empty], &store, &device, &mut extra_data, None);
        assert!(rule_sets.user_style().is_none());
        rule_sets.init_user_style(&[&empty, &pages], &store, &device, &mut extra_data, None);
        assert_eq!(rule_sets.user_style().map(|s| s.page_rules().len()), Some(1));
    }
}
