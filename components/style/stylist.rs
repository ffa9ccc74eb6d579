/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selector matching.

#![deny(missing_docs)]

use crate::applicable_declarations::{ApplicableDeclarationBlock, MatchResult};
use crate::bloom::SelectorFilter;
use crate::cache::DeclarationBlockCache;
use crate::config::StyleConfig;
use crate::document_rule_sets::DocumentRuleSets;
use crate::dom::TElement;
use crate::error_reporting::{ParseErrorReporter, RustLogReporter};
use crate::media_queries::Device;
use crate::properties::{ComputedValues, InsideLink, LonghandId, PropertyDeclarationBlock};
use crate::rule_set::{RuleData, RuleSet};
use crate::stylesheets::{
    FontFaceRule, KeyframesRule, Origin, PageRule, SheetStore, StyleRule, Stylesheet,
    UrlExtraData, ViewportRule,
};
use crate::ua_sheets::{UserAgentRuleSets, UserAgentStylesheets};
use crate::Atom;
use bitflags::bitflags;
use log::debug;
use rustc_hash::FxHashMap;
use selectors::bloom::BloomFilter;
use selectors::matching::{
    fast_matches_selector, match_selector, matches_selector_list, selector_may_match,
    LinkMatchType, MatchingContext, MatchingMode, QuirksMode, SelectorMatchingResult,
};
use selectors::parser::PseudoElement;
use servo_arc::Arc;
use smallvec::SmallVec;
use std::collections::hash_map::Entry;
use url::Origin as SecurityOrigin;

/// This struct holds data which user of Stylist may want to extract
/// from stylesheets which can be done at the same time as updating.
#[derive(Clone, Debug, Default)]
pub struct ExtraStyleData {
    /// A list of effective font-face rules, in cascade order.
    pub font_faces: Vec<Arc<FontFaceRule>>,

    /// The effective keyframes rules, by animation name.
    pub keyframes: FxHashMap<Atom, Arc<KeyframesRule>>,

    /// The effective viewport rules, in cascade order.
    pub viewport_rules: Vec<Arc<ViewportRule>>,
}

impl ExtraStyleData {
    /// Add the given @font-face rule.
    pub fn add_font_face(&mut self, rule: &Arc<FontFaceRule>) {
        self.font_faces.push(rule.clone());
    }

    /// Add the given @keyframes rule. A later rule replaces an earlier one
    /// of the same name, except that a prefixed rule never replaces an
    /// unprefixed one.
    pub fn add_keyframes(&mut self, rule: &Arc<KeyframesRule>) {
        match self.keyframes.entry(rule.name.clone()) {
            Entry::Occupied(mut entry) => {
                if !rule.vendor_prefixed || entry.get().vendor_prefixed {
                    entry.insert(rule.clone());
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(rule.clone());
            },
        }
        debug!("Found valid keyframes rule: {}", rule.name);
    }

    /// Add the given @viewport rule.
    pub fn add_viewport_rule(&mut self, rule: &Arc<ViewportRule>) {
        self.viewport_rules.push(rule.clone());
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.font_faces.clear();
        self.keyframes.clear();
        self.viewport_rules.clear();
    }
}

bitflags! {
    /// Which rules `style_rules_for_element` reports.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct RulesToInclude: u8 {
        /// Rules of the user agent and user sheets.
        const UA_AND_USER_RULES = 1 << 0;
        /// Rules of the author sheets.
        const AUTHOR_RULES = 1 << 1;
        /// Rules whose declaration block is empty.
        const EMPTY_RULES = 1 << 2;
        /// Author rules of sheets of another origin than the document.
        const CROSS_ORIGIN_RULES = 1 << 3;
        /// Everything but the empty rules.
        const ALL_BUT_EMPTY_RULES = Self::UA_AND_USER_RULES.bits() |
            Self::AUTHOR_RULES.bits() |
            Self::CROSS_ORIGIN_RULES.bits();
    }
}

/// This structure holds all the selectors and device characteristics
/// for a given document.
///
/// It corresponds to the `StyleResolver` of WebKit: the rule sets of every
/// origin, the matching of an element against them, and the cascade of the
/// declarations that apply.
#[derive(Debug)]
pub struct Stylist {
    config: StyleConfig,

    /// Device that the stylist is currently evaluating against.
    device: Device,

    quirks_mode: QuirksMode,

    /// The parsed default sheets, kept to rebuild their rule sets.
    ua_sheets: UserAgentStylesheets,

    ua_rule_sets: UserAgentRuleSets,

    /// What the user agent sheets contributed to `extra_data`, restored
    /// whenever the author and user data is thrown away.
    ua_extra_data: ExtraStyleData,

    rule_sets: DocumentRuleSets,

    extra_data: ExtraStyleData,

    /// Parsed style attributes, shared between elements with the same one.
    declaration_block_cache: DeclarationBlockCache,

    /// The ancestors of the element being styled.
    selector_filter: SelectorFilter,

    /// The origin of the document. Author rules coming from it are exposed
    /// to same-origin queries.
    document_origin: Option<SecurityOrigin>,

    /// The total number of times the author rules have been rebuilt.
    num_rebuilds: usize,
}

impl Stylist {
    /// Construct a new `Stylist` from `config`, parsing the default sheets.
    pub fn new(config: StyleConfig, document_origin: Option<SecurityOrigin>) -> Self {
        let ua_sheets = UserAgentStylesheets::new(Some(&RustLogReporter as &dyn ParseErrorReporter));
        Self::with_user_agent_sheets(config, ua_sheets, document_origin)
    }

    /// Construct a new `Stylist` with already parsed default sheets.
    pub fn with_user_agent_sheets(
        config: StyleConfig,
        ua_sheets: UserAgentStylesheets,
        document_origin: Option<SecurityOrigin>,
    ) -> Self {
        let device = config.device();
        let quirks_mode = config.quirks_mode();
        let mut ua_extra_data = ExtraStyleData::default();
        let ua_rule_sets = UserAgentRuleSets::new(&ua_sheets, &device, &mut ua_extra_data);
        let mut rule_sets =
            DocumentRuleSets::new(quirks_mode, config.max_selector_component_count);
        rule_sets.collect_features(config.view_source, &ua_rule_sets);

        Stylist {
            rule_sets,
            extra_data: ua_extra_data.clone(),
            ua_extra_data,
            ua_rule_sets,
            ua_sheets,
            quirks_mode,
            device,
            config,
            declaration_block_cache: DeclarationBlockCache::default(),
            selector_filter: SelectorFilter::new(),
            document_origin,
            num_rebuilds: 0,
        }
    }

    /// The configuration the stylist was created with.
    #[inline]
    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// The device media queries are evaluated against.
    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The quirks mode of the document.
    #[inline]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// The parsed default sheets.
    #[inline]
    pub fn ua_sheets(&self) -> &UserAgentStylesheets {
        &self.ua_sheets
    }

    /// The rule sets of the default sheets.
    #[inline]
    pub fn ua_rule_sets(&self) -> &UserAgentRuleSets {
        &self.ua_rule_sets
    }

    /// The user and author rule sets.
    #[inline]
    pub fn rule_sets(&self) -> &DocumentRuleSets {
        &self.rule_sets
    }

    /// Font faces, keyframes and viewport rules of the active sheets.
    #[inline]
    pub fn extra_data(&self) -> &ExtraStyleData {
        &self.extra_data
    }

    /// Returns the number of times the author rules have been rebuilt.
    pub fn num_rebuilds(&self) -> usize {
        self.num_rebuilds
    }

    /// Throws every user and author rule away.
    pub fn clear(&mut self) {
        debug!("Reconstructing the stylist");
        self.rule_sets =
            DocumentRuleSets::new(self.quirks_mode, self.config.max_selector_component_count);
        self.extra_data = self.ua_extra_data.clone();
        self.num_rebuilds += 1;
    }

    /// Builds the user rule set out of `user_sheets`.
    pub fn init_user_style(&mut self, user_sheets: &[&Stylesheet], store: &SheetStore) {
        self.rule_sets.init_user_style(
            user_sheets,
            store,
            &self.device,
            &mut self.extra_data,
            self.document_origin.as_ref(),
        );
        self.rule_sets
            .collect_features(self.config.view_source, &self.ua_rule_sets);
    }

    /// Throws the author rules away. They come back through
    /// `append_author_style_sheets`.
    pub fn reset_author_style(&mut self) {
        debug!("Resetting the author style");
        self.rule_sets.reset_author_style();
        self.num_rebuilds += 1;
    }

    /// Adds the author sheets from `first_new` on.
    pub fn append_author_style_sheets(
        &mut self,
        first_new: usize,
        sheets: &[&Stylesheet],
        store: &SheetStore,
    ) {
        debug!(
            "Appending {} author sheets",
            sheets.len().saturating_sub(first_new)
        );
        self.rule_sets.append_author_style_sheets(
            first_new,
            sheets,
            store,
            &self.device,
            &mut self.extra_data,
            self.document_origin.as_ref(),
            self.config.view_source,
            &self.ua_rule_sets,
        );
    }

    /// Must be called before styling the children of `parent`.
    pub fn push_parent_element<E: TElement>(&mut self, parent: &E) {
        // We are not always invoked consistently, and may be asked to start
        // somewhere inside the tree. Reset the stack in that case.
        match parent.parent_element() {
            Some(ref grand_parent)
                if self
                    .selector_filter
                    .parent_stack_is_consistent(Some(grand_parent.opaque())) =>
            {
                self.selector_filter.push_parent(parent)
            },
            _ => self.selector_filter.setup_parent_stack(parent),
        }
    }

    /// Must be called after styling the children of `parent`.
    pub fn pop_parent_element<E: TElement>(&mut self, parent: &E) {
        if self
            .selector_filter
            .parent_stack_is_consistent(Some(parent.opaque()))
        {
            self.selector_filter.pop_parent();
        }
    }

    /// The filter over the ancestors pushed so far.
    #[inline]
    pub fn selector_filter(&self) -> &SelectorFilter {
        &self.selector_filter
    }

    /// Returns the declaration block of the style attribute `text`, shared
    /// with every other element that has the same attribute.
    pub fn parse_style_attribute(
        &mut self,
        text: &str,
        url_data: &UrlExtraData,
    ) -> Arc<PropertyDeclarationBlock> {
        self.declaration_block_cache.get_or_parse(
            text,
            url_data,
            Some(&RustLogReporter as &dyn ParseErrorReporter),
            self.quirks_mode,
        )
    }

    /// The cache behind `parse_style_attribute`.
    #[inline]
    pub fn declaration_block_cache(&mut self) -> &mut DeclarationBlockCache {
        &mut self.declaration_block_cache
    }

    fn element_rule_collector<'a, E: TElement>(
        &'a self,
        element: &'a E,
        pseudo_element: Option<&'a PseudoElement>,
        mode: MatchingMode,
    ) -> ElementRuleCollector<'a, E> {
        let bloom_filter = if self.quirks_mode == QuirksMode::NoQuirks &&
            self.selector_filter
                .parent_stack_is_consistent(element.parent_element().map(|p| p.opaque()))
        {
            Some(self.selector_filter.filter())
        } else {
            None
        };
        ElementRuleCollector {
            stylist: self,
            element,
            pseudo_element,
            region: None,
            mode,
            same_origin_only: false,
            include_empty_rules: false,
            bloom_filter,
            matched_rules: vec![],
            pseudo_elements: SmallVec::new(),
        }
    }

    /// Returns the applicable CSS declarations for the given element, in
    /// cascade order.
    ///
    /// This corresponds to `ElementRuleCollector` in WebKit.
    pub fn push_applicable_declarations<E: TElement>(
        &self,
        element: &E,
        pseudo_element: Option<&PseudoElement>,
        result: &mut MatchResult,
    ) {
        let mut collector =
            self.element_rule_collector(element, pseudo_element, MatchingMode::ResolvingStyle);
        if pseudo_element.is_some() {
            collector.match_ua_rules(result);
            if self.config.match_author_and_user_styles {
                collector.match_user_rules(result);
                collector.match_author_rules(result);
            }
        } else {
            collector.match_all_rules(result, self.config.match_author_and_user_styles);
        }
    }

    /// Matches `element` against every rule set.
    pub fn match_rules<E: TElement>(
        &self,
        element: &E,
        pseudo_element: Option<&PseudoElement>,
    ) -> MatchResult {
        let mut result = MatchResult::default();
        self.push_applicable_declarations(element, pseudo_element, &mut result);
        result
    }

    /// Lists the style rules that apply to `element`, or to its
    /// `pseudo_element`, in cascade order. Dynamic pseudo-element rules are
    /// not reported for the element itself.
    pub fn style_rules_for_element<E: TElement>(
        &self,
        element: &E,
        pseudo_element: Option<&PseudoElement>,
        rules_to_include: RulesToInclude,
    ) -> Vec<Arc<StyleRule>> {
        let mut result = MatchResult::default();
        let mut collector =
            self.element_rule_collector(element, pseudo_element, MatchingMode::CollectingRules);
        collector.include_empty_rules = rules_to_include.contains(RulesToInclude::EMPTY_RULES);

        if rules_to_include.contains(RulesToInclude::UA_AND_USER_RULES) {
            collector.match_ua_rules(&mut result);
            collector.match_user_rules(&mut result);
        }
        if rules_to_include.contains(RulesToInclude::AUTHOR_RULES) {
            collector.same_origin_only =
                !rules_to_include.contains(RulesToInclude::CROSS_ORIGIN_RULES);
            collector.match_author_rules(&mut result);
        }

        result
            .declarations
            .iter()
            .filter_map(|block| block.source.rule().cloned())
            .collect()
    }

    /// Computes the style of `element`, whose parent has `parent_style`.
    pub fn resolve_style<E: TElement>(
        &self,
        element: &E,
        parent_style: Option<&ComputedValues>,
    ) -> Arc<ComputedValues> {
        self.resolve_style_internal(element, parent_style, None)
    }

    /// Computes the style of `element` flowing into the region `region`,
    /// which brings in the rules of the `@-webkit-region` blocks the region
    /// matches.
    pub fn resolve_style_in_region<E: TElement>(
        &self,
        element: &E,
        parent_style: Option<&ComputedValues>,
        region: &E,
    ) -> Arc<ComputedValues> {
        self.resolve_style_internal(element, parent_style, Some(region))
    }

    fn resolve_style_internal<E: TElement>(
        &self,
        element: &E,
        parent_style: Option<&ComputedValues>,
        region: Option<&E>,
    ) -> Arc<ComputedValues> {
        let mut result = MatchResult::default();
        let mut collector =
            self.element_rule_collector(element, None, MatchingMode::ResolvingStyle);
        collector.region = region;
        collector.match_all_rules(&mut result, self.config.match_author_and_user_styles);

        let mut style = ComputedValues::inherit_from(parent_style);
        if element.is_link() {
            style.set_is_link(true);
            style.set_inside_link(if element.is_visited_link() {
                InsideLink::InsideVisitedLink
            } else {
                InsideLink::InsideUnvisitedLink
            });
        }
        for pseudo in result.pseudo_elements.iter() {
            style.set_has_pseudo_style(pseudo.clone());
        }
        apply_matched_properties(&mut style, parent_style, &result);
        Arc::new(style)
    }

    /// Computes the style of `pseudo_element` of `element`, or returns
    /// `None` when no rule targets it.
    pub fn resolve_pseudo_style<E: TElement>(
        &self,
        element: &E,
        pseudo_element: &PseudoElement,
        parent_style: &ComputedValues,
    ) -> Option<Arc<ComputedValues>> {
        let result = self.match_rules(element, Some(pseudo_element));
        if result.is_empty() {
            return None;
        }
        let mut style = ComputedValues::inherit_from(Some(parent_style));
        apply_matched_properties(&mut style, Some(parent_style), &result);
        Some(Arc::new(style))
    }

    /// Computes the style of a printed page, from the `@page` rules of
    /// every origin.
    pub fn style_for_page(
        &self,
        page_index: usize,
        root_style: &ComputedValues,
        page_name: Option<&str>,
    ) -> Arc<ComputedValues> {
        let is_first_page_left = root_style.get(LonghandId::Direction) == "rtl";
        let is_left = (page_index + is_first_page_left as usize) % 2 == 1;
        let is_first = page_index == 0;

        let mut result = MatchResult::default();
        let mut match_page_rules = |rule_set: Option<&RuleSet>, origin: Origin| {
            let start = result.declarations.len();
            if let Some(rule_set) = rule_set {
                let mut matched: SmallVec<[&Arc<PageRule>; 8]> = rule_set
                    .page_rules()
                    .iter()
                    .filter(|rule| !rule.block.is_empty())
                    .filter(|rule| rule.matches(is_left, is_first, page_name))
                    .collect();
                matched.sort_by_key(|rule| rule.specificity());
                result.declarations.extend(matched.into_iter().map(|rule| {
                    ApplicableDeclarationBlock::from_declarations(rule.block.clone(), origin)
                }));
            }
            (start, result.declarations.len())
        };

        let user_agent = match_page_rules(Some(&self.ua_rule_sets.default_style), Origin::UserAgent);
        let user = match_page_rules(self.rule_sets.user_style(), Origin::User);
        let author = match_page_rules(Some(self.rule_sets.author_style()), Origin::Author);
        result.ranges.user_agent = user_agent;
        result.ranges.user = user;
        result.ranges.author = author;

        let mut style = ComputedValues::inherit_from(Some(root_style));
        apply_matched_properties(&mut style, Some(root_style), &result);
        Arc::new(style)
    }

    /// Whether any rule of the sibling or uncommon attribute rule sets
    /// applies to `element`, which then cannot share its style with a
    /// sibling.
    pub fn style_sharing_candidate_matches_rule_sets<E: TElement>(&self, element: &E) -> bool {
        let matches = |rule_set: Option<&RuleSet>| {
            let Some(rule_set) = rule_set else {
                return false;
            };
            let mut collector =
                self.element_rule_collector(element, None, MatchingMode::SharingRules);
            collector.collect_matching_rules(rule_set);
            !collector.matched_rules.is_empty()
        };
        matches(self.rule_sets.sibling()) || matches(self.rule_sets.uncommon_attribute())
    }

    /// Whether some `@-webkit-region` block of the author sheets applies to
    /// `region`.
    pub fn check_region_style<E: TElement>(&self, region: &E) -> bool {
        self.rule_sets
            .author_style()
            .region_selectors_and_rule_sets()
            .iter()
            .any(|pair| {
                let mut context =
                    MatchingContext::new(MatchingMode::ResolvingStyle, None, self.quirks_mode);
                matches_selector_list(&pair.selectors, region, &mut context)
            })
    }

    /// Whether some selector of any origin mentions the id `id`.
    pub fn has_selector_for_id(&self, id: &Atom) -> bool {
        self.rule_sets.features().has_selector_for_id(id)
    }

    /// Whether some selector of any origin mentions the class `class`.
    pub fn has_selector_for_class(&self, class: &Atom) -> bool {
        self.rule_sets.features().has_selector_for_class(class)
    }

    /// Whether some selector of any origin looks at the attribute `name`.
    pub fn has_selector_for_attribute(&self, name: &Atom) -> bool {
        self.rule_sets.features().has_selector_for_attribute(name)
    }

    /// Whether any `::first-line` rule exists.
    pub fn uses_first_line_rules(&self) -> bool {
        self.rule_sets.features().uses_first_line_rules
    }

    /// Whether any `::before` or `::after` rule exists.
    pub fn uses_before_after_rules(&self) -> bool {
        self.rule_sets.features().uses_before_after_rules
    }

    /// The `@keyframes` rule named `name`, if any.
    pub fn keyframes_for(&self, name: &Atom) -> Option<&Arc<KeyframesRule>> {
        self.extra_data.keyframes.get(name)
    }
}

/// Collects the rules of the rule sets of a stylist that apply to one
/// element.
struct ElementRuleCollector<'a, E: TElement> {
    stylist: &'a Stylist,
    element: &'a E,
    pseudo_element: Option<&'a PseudoElement>,
    /// The region the element flows into, if any.
    region: Option<&'a E>,
    mode: MatchingMode,
    /// Skip author rules of sheets of another origin than the document.
    same_origin_only: bool,
    include_empty_rules: bool,
    /// Present only when it holds the ancestors of `element`.
    bloom_filter: Option<&'a BloomFilter>,
    matched_rules: Vec<&'a RuleData>,
    pseudo_elements: SmallVec<[PseudoElement; 2]>,
}

impl<'a, E: TElement> ElementRuleCollector<'a, E> {
    fn matching_context(&self) -> MatchingContext<'a> {
        let mut context = match self.pseudo_element {
            Some(pseudo) => {
                MatchingContext::for_pseudo_element(pseudo, self.bloom_filter, self.stylist.quirks_mode)
            },
            None => MatchingContext::new(self.mode, self.bloom_filter, self.stylist.quirks_mode),
        };
        context.matching_mode = self.mode;
        context
    }

    /// Whether the rule applies. A dynamic pseudo-element it matched is left
    /// in `context.matched_pseudo_element`.
    fn rule_matches(&self, rule_data: &RuleData, context: &mut MatchingContext) -> bool {
        if rule_data.has_fast_checkable_selector() {
            context.matched_pseudo_element = None;
            // Fast checkable selectors have no pseudo-element.
            if self.pseudo_element.is_some() {
                return false;
            }
            // A single simple selector matches because the bucket was found
            // through it. HTML only, so that the tag name case does not
            // matter.
            if rule_data.has_rightmost_selector_matching_html_based_on_rule_hash() &&
                self.element.is_html_element_in_html_document() &&
                !rule_data.has_multipart_selector()
            {
                return true;
            }
            return fast_matches_selector(rule_data.selector(), self.element, self.stylist.quirks_mode);
        }

        if match_selector(rule_data.selector(), self.element, context) !=
            SelectorMatchingResult::Matched
        {
            return false;
        }
        match self.pseudo_element {
            Some(requested) => context.matched_pseudo_element.as_ref() == Some(requested),
            None => true,
        }
    }

    fn collect_matching_rules_for_list(&mut self, rules: Option<&'a [RuleData]>) {
        let Some(rules) = rules else {
            return;
        };
        let mut context = self.matching_context();
        for rule_data in rules {
            if self.mode == MatchingMode::SharingRules && !self.matched_rules.is_empty() {
                return;
            }
            if let Some(bloom_filter) = self.bloom_filter {
                if !selector_may_match(rule_data.ancestor_hashes(), bloom_filter) {
                    continue;
                }
            }
            if self.same_origin_only && !rule_data.has_document_security_origin() {
                continue;
            }
            if !self.rule_matches(rule_data, &mut context) {
                continue;
            }
            // If the rule has no properties to apply, then ignore it.
            if rule_data.rule().block.is_empty() && !self.include_empty_rules {
                continue;
            }
            match (self.pseudo_element, context.matched_pseudo_element.take()) {
                // We really just matched a pseudo-element of the element.
                (None, Some(dynamic_pseudo)) => {
                    if self.mode == MatchingMode::CollectingRules {
                        continue;
                    }
                    if !self.pseudo_elements.contains(&dynamic_pseudo) {
                        self.pseudo_elements.push(dynamic_pseudo);
                    }
                },
                _ => self.matched_rules.push(rule_data),
            }
        }
    }

    fn collect_matching_rules(&mut self, rule_set: &'a RuleSet) {
        let element = self.element;

        if let Some(name) = element.custom_pseudo_element() {
            if &**name == "cue" {
                self.collect_matching_rules_for_list(Some(rule_set.cue_pseudo_rules()));
            } else {
                self.collect_matching_rules_for_list(rule_set.shadow_pseudo_element_rules(name));
            }
        }

        // We need to collect the rules for id, class, tag, and everything else
        // into a buffer and then sort the buffer.
        if let Some(id) = element.id() {
            self.collect_matching_rules_for_list(rule_set.id_rules(id));
        }

        let mut classes = SmallVec::<[Atom; 8]>::new();
        element.each_class(|class| {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        });
        for class in &classes {
            self.collect_matching_rules_for_list(rule_set.class_rules(class));
        }

        if element.is_link() {
            self.collect_matching_rules_for_list(Some(rule_set.link_pseudo_class_rules()));
        }
        if element.is_focused() {
            self.collect_matching_rules_for_list(Some(rule_set.focus_pseudo_class_rules()));
        }
        self.collect_matching_rules_for_list(rule_set.tag_rules(element.local_name()));
        self.collect_matching_rules_for_list(Some(rule_set.universal_rules()));
    }

    fn collect_matching_rules_for_region(&mut self, rule_set: &'a RuleSet) {
        let Some(region) = self.region else {
            return;
        };
        for pair in rule_set.region_selectors_and_rule_sets() {
            let mut context = MatchingContext::new(
                MatchingMode::ResolvingStyle,
                None,
                self.stylist.quirks_mode,
            );
            if matches_selector_list(&pair.selectors, region, &mut context) {
                self.collect_matching_rules(&pair.rule_set);
            }
        }
    }

    fn sort_and_transfer_matched_rules(&mut self, origin: Origin, result: &mut MatchResult) {
        // Stable, and positions are unique within a rule set.
        self.matched_rules
            .sort_by_key(|rule_data| (rule_data.specificity(), rule_data.position()));
        for rule_data in self.matched_rules.drain(..) {
            result
                .declarations
                .push(ApplicableDeclarationBlock::from_rule_data(rule_data, origin));
        }
        for pseudo in self.pseudo_elements.drain(..) {
            if !result.pseudo_elements.contains(&pseudo) {
                result.pseudo_elements.push(pseudo);
            }
        }
    }

    fn match_ua_rules(&mut self, result: &mut MatchResult) {
        let start = result.declarations.len();
        let stylist = self.stylist;
        let ua = &stylist.ua_rule_sets;
        self.collect_matching_rules(&ua.default_style);
        self.sort_and_transfer_matched_rules(Origin::UserAgent, result);
        if stylist.quirks_mode == QuirksMode::Quirks {
            self.collect_matching_rules(&ua.default_quirks_style);
            self.sort_and_transfer_matched_rules(Origin::UserAgent, result);
        }
        if stylist.config.view_source {
            self.collect_matching_rules(&ua.view_source_style);
            self.sort_and_transfer_matched_rules(Origin::UserAgent, result);
        }
        result.ranges.user_agent = (start, result.declarations.len());
    }

    fn match_user_rules(&mut self, result: &mut MatchResult) {
        let start = result.declarations.len();
        let stylist = self.stylist;
        if let Some(user_style) = stylist.rule_sets.user_style() {
            self.collect_matching_rules(user_style);
            self.sort_and_transfer_matched_rules(Origin::User, result);
        }
        result.ranges.user = (start, result.declarations.len());
    }

    /// Author rules go after whatever author declarations are already in
    /// the result.
    fn match_author_rules(&mut self, result: &mut MatchResult) {
        let start = if result.ranges.author.1 == result.declarations.len() &&
            result.ranges.author.1 > result.ranges.author.0
        {
            result.ranges.author.0
        } else {
            result.declarations.len()
        };
        let stylist = self.stylist;
        let author_style = stylist.rule_sets.author_style();
        self.collect_matching_rules(author_style);
        self.collect_matching_rules_for_region(author_style);
        self.sort_and_transfer_matched_rules(Origin::Author, result);
        result.ranges.author = (start, result.declarations.len());
    }

    fn add_element_style_properties(
        &mut self,
        result: &mut MatchResult,
        block: Option<Arc<PropertyDeclarationBlock>>,
        is_cacheable: bool,
    ) {
        let Some(block) = block else {
            return;
        };
        if block.is_empty() {
            return;
        }
        let start = if result.ranges.author.1 == result.declarations.len() &&
            result.ranges.author.1 > result.ranges.author.0
        {
            result.ranges.author.0
        } else {
            result.declarations.len()
        };
        result
            .declarations
            .push(ApplicableDeclarationBlock::from_declarations(block, Origin::Author));
        result.ranges.author = (start, result.declarations.len());
        if !is_cacheable {
            result.is_cacheable = false;
        }
    }

    fn match_all_rules(&mut self, result: &mut MatchResult, match_author_and_user_styles: bool) {
        self.match_ua_rules(result);

        if match_author_and_user_styles {
            self.match_user_rules(result);
        }

        // Now check author rules, beginning first with presentational
        // attributes mapped from HTML.
        let element = self.element;
        self.add_element_style_properties(result, element.presentational_hints(), true);

        if match_author_and_user_styles {
            self.match_author_rules(result);

            // Now check our inline style attribute.
            let is_cacheable = !element.has_mutable_inline_style();
            self.add_element_style_properties(result, element.style_attribute(), is_cacheable);
        }
    }
}

/// Applies the declarations of `blocks` of the given importance to `style`,
/// and the visited-dependent ones to `visited` when inside a link.
fn apply_properties(
    blocks: &[ApplicableDeclarationBlock],
    important: bool,
    style: &mut ComputedValues,
    parent: Option<&ComputedValues>,
    mut visited: Option<(&mut ComputedValues, Option<&ComputedValues>)>,
) {
    for block in blocks {
        let (apply_regular, apply_visited) = if visited.is_some() {
            (
                block.link_match_type.contains(LinkMatchType::MATCH_LINK),
                block.link_match_type.contains(LinkMatchType::MATCH_VISITED),
            )
        } else {
            (true, false)
        };
        for (declaration, importance) in block.block().declaration_importance_iter() {
            if importance.important() != important {
                continue;
            }
            let id = declaration.id();
            if !block.property_whitelist.allows(id) {
                continue;
            }
            if apply_regular {
                style.apply_declaration(declaration, parent);
            }
            if apply_visited && id.is_visited_dependent() {
                if let Some((ref mut visited_style, visited_parent)) = visited {
                    visited_style.apply_declaration(declaration, visited_parent);
                }
            }
        }
    }
}

/// The cascade: normal declarations in match order, then important author,
/// user and user agent declarations, in that order.
fn apply_matched_properties(
    style: &mut ComputedValues,
    parent: Option<&ComputedValues>,
    result: &MatchResult,
) {
    let visited_parent =
        parent.map(|p| p.visited_style().map_or(p, |visited| &**visited));
    let mut visited = if style.inside_link() != InsideLink::NotInsideLink {
        Some(ComputedValues::inherit_from(visited_parent))
    } else {
        None
    };

    let mut cascade = |blocks: &[ApplicableDeclarationBlock], important: bool| {
        apply_properties(
            blocks,
            important,
            style,
            parent,
            visited.as_mut().map(|v| (v, visited_parent)),
        );
    };
    cascade(&result.declarations, false);
    cascade(result.declarations_of(Origin::Author), true);
    cascade(result.declarations_of(Origin::User), true);
    cascade(result.declarations_of(Origin::UserAgent), true);

    if let Some(visited) = visited {
        style.set_visited_style(visited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_queries::MediaList;
    use url::Url;

    fn author_sheet(store: &mut SheetStore, css: &str) -> Stylesheet {
        Stylesheet::from_str(
            store,
            css,
            UrlExtraData::new(Url::parse("http://example.com/page.css").unwrap()),
            Origin::Author,
            MediaList::parse_str(""),
            QuirksMode::NoQuirks,
            None,
            None,
        )
    }

    #[test]
    fn prefixed_keyframes_do_not_replace_unprefixed_ones() {
        let mut store = SheetStore::default();
        let sheet = author_sheet(
            &mut store,
            "@keyframes spin { from { width: 1px } } \
             @-webkit-keyframes spin { from { width: 2px } } \
             @-webkit-keyframes fade { from { width: 3px } } \
             @keyframes fade { from { width: 4px } }",
        );
        let mut stylist = Stylist::new(StyleConfig::default(), None);
        stylist.append_author_style_sheets(0, &[&sheet], &store);

        let spin = stylist.keyframes_for(&Atom::from("spin")).unwrap();
        assert!(!spin.vendor_prefixed);
        let fade = stylist.keyframes_for(&Atom::from("fade")).unwrap();
        assert!(!fade.vendor_prefixed);
        assert!(stylist.keyframes_for(&Atom::from("slide")).is_none());
    }

    #[test]
    fn clear_keeps_user_agent_data_only() {
        let mut store = SheetStore::default();
        let sheet = author_sheet(
            &mut store,
            "#main { color: red } @font-face { font-family: foo; src: url(foo.woff) }",
        );
        let mut stylist = Stylist::new(StyleConfig::default(), None);
        let ua_font_faces = stylist.extra_data().font_faces.len();
        stylist.append_author_style_sheets(0, &[&sheet], &store);
        assert!(stylist.has_selector_for_id(&Atom::from("main")));
        assert_eq!(stylist.extra_data().font_faces.len(), ua_font_faces + 1);

        stylist.clear();
        assert!(!stylist.has_selector_for_id(&Atom::from("main")));
        assert_eq!(stylist.extra_data().font_faces.len(), ua_font_faces);
        assert_eq!(stylist.num_rebuilds(), 1);
    }

    #[test]
    fn page_styles_follow_page_side_and_specificity() {
        let mut store = SheetStore::default();
        let sheet = author_sheet(
            &mut store,
            "@page :first { margin-top: 3px } \
             @page :left { margin-top: 2px; margin-left: 5px } \
             @page { margin-top: 1px; margin-left: 1px !important }",
        );
        let mut stylist = Stylist::new(StyleConfig::default(), None);
        stylist.append_author_style_sheets(0, &[&sheet], &store);
        let root = ComputedValues::initial_values();

        let first = stylist.style_for_page(0, &root, None);
        assert_eq!(first.get(LonghandId::MarginTop), "3px");
        let second = stylist.style_for_page(1, &root, None);
        assert_eq!(second.get(LonghandId::MarginTop), "2px");
        assert_eq!(second.get(LonghandId::MarginLeft), "1px");
        let third = stylist.style_for_page(2, &root, None);
        assert_eq!(third.get(LonghandId::MarginTop), "1px");

        // In a right-to-left document the first page is a left page.
        let mut rtl_root = ComputedValues::initial_values();
        rtl_root.set(LonghandId::Direction, "rtl");
        let first = stylist.style_for_page(0, &rtl_root, None);
        assert_eq!(first.get(LonghandId::MarginTop), "3px");
        assert_eq!(first.get(LonghandId::Direction), "rtl");
        let second = stylist.style_for_page(1, &rtl_root, None);
        assert_eq!(second.get(LonghandId::MarginTop), "1px");
    }

    #[test]
    fn style_attributes_are_shared() {
        let mut stylist = Stylist::new(StyleConfig::default(), None);
        let url_data = UrlExtraData::new(Url::parse("http://example.com/").unwrap());
        let a = stylist.parse_style_attribute("color: red", &url_data);
        let b = stylist.parse_style_attribute("color: red", &url_data);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(stylist.declaration_block_cache().num_entries(), 1);
    }
}
