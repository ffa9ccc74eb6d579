/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Rules bucketed by the rightmost compound selector of each of their
//! selectors.
//!
//! e.g.,
//! "p > img" goes into the bucket of the tag "img",
//! "a .foo .bar.baz" goes into the bucket of the class "bar",
//! "input::-webkit-inner-spin-button" goes into the bucket of the custom
//! pseudo-element, since the element it styles is the one exposing that name.
//!
//! Because selectors are matched right-to-left, the rules whose rightmost
//! compound could match an element are found by looking up the element's
//! id, each of its classes, its tag name and its link and focus states, and
//! by adding the universal rules. Every rule lives in exactly one bucket.

use crate::config::MAX_SELECTOR_COMPONENT_COUNT;
use crate::media_queries::Device;
use crate::properties::LonghandId;
use crate::rule_feature::RuleFeatureSet;
use crate::stylesheets::{CssRule, PageRule, RegionRule, StyleRule, StylesheetContents};
use crate::stylist::ExtraStyleData;
use crate::Atom;
use bitflags::bitflags;
use log::trace;
use rustc_hash::FxHashMap;
use selectors::matching::{
    can_use_fast_path, determine_link_match_type, is_common_pseudo_class, LinkMatchType,
    QuirksMode,
};
use selectors::parser::{Component, NonTSPseudoClass, PseudoElement, Selector, NUM_ANCESTOR_HASHES};
use selectors::SelectorList;
use servo_arc::Arc;
use std::collections::hash_map;
use url::Origin as SecurityOrigin;

bitflags! {
    /// How the rules of a sheet are being added.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct AddRuleFlags: u8 {
        /// The sheet comes from the origin of the document.
        const HAS_DOCUMENT_SECURITY_ORIGIN = 1 << 0;
        /// Simple selectors may be matched with the fast path.
        const CAN_USE_FAST_CHECK_SELECTOR = 1 << 1;
        /// The rule sits in an `@-webkit-region` block.
        const IS_IN_REGION_RULE = 1 << 2;
    }
}

bitflags! {
    /// Facts about a single selector, computed once when it is added.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct RuleDataFlags: u8 {
        const HAS_FAST_CHECKABLE_SELECTOR = 1 << 0;
        /// More than one simple selector.
        const HAS_MULTIPART_SELECTOR = 1 << 1;
        /// Finding the rule in its bucket proves it matches an HTML element,
        /// provided the selector is not multipart.
        const HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH = 1 << 2;
        const CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR = 1 << 3;
        const HAS_DOCUMENT_SECURITY_ORIGIN = 1 << 4;
    }
}

/// Which properties the declarations of a rule may set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PropertyWhitelist {
    None,
    /// Rules inside `@-webkit-region`.
    Region,
    /// `::cue` rules.
    Cue,
}

impl PropertyWhitelist {
    /// Whether a declaration of `id` applies under this whitelist.
    pub fn allows(self, id: LonghandId) -> bool {
        match self {
            PropertyWhitelist::None => true,
            PropertyWhitelist::Region => {
                matches!(id, LonghandId::Color | LonghandId::BackgroundColor)
            },
            PropertyWhitelist::Cue => matches!(
                id,
                LonghandId::BackgroundColor |
                    LonghandId::BackgroundImage |
                    LonghandId::Color |
                    LonghandId::FontFamily |
                    LonghandId::FontSize |
                    LonghandId::FontStyle |
                    LonghandId::FontVariant |
                    LonghandId::FontWeight |
                    LonghandId::LineHeight |
                    LonghandId::Opacity |
                    LonghandId::OutlineColor |
                    LonghandId::OutlineOffset |
                    LonghandId::OutlineStyle |
                    LonghandId::OutlineWidth |
                    LonghandId::Visibility |
                    LonghandId::WhiteSpace |
                    LonghandId::TextDecoration |
                    LonghandId::TextShadow |
                    LonghandId::BorderTopStyle |
                    LonghandId::BorderRightStyle |
                    LonghandId::BorderBottomStyle |
                    LonghandId::BorderLeftStyle
            ),
        }
    }
}

/// One selector of a style rule, as stored in a bucket.
#[derive(Clone, Debug)]
pub struct RuleData {
    rule: Arc<StyleRule>,
    selector_index: usize,
    /// Insertion order in the owning rule set. Breaks specificity ties.
    position: u32,
    specificity: u32,
    flags: RuleDataFlags,
    link_match_type: LinkMatchType,
    property_whitelist: PropertyWhitelist,
    ancestor_hashes: [u32; NUM_ANCESTOR_HASHES],
}

impl RuleData {
    pub fn new(
        rule: Arc<StyleRule>,
        selector_index: usize,
        position: u32,
        add_rule_flags: AddRuleFlags,
    ) -> Self {
        let selector = &rule.selectors.0[selector_index];
        let mut flags = RuleDataFlags::empty();
        if add_rule_flags.contains(AddRuleFlags::CAN_USE_FAST_CHECK_SELECTOR) &&
            selector_can_use_fast_check(selector)
        {
            flags.insert(RuleDataFlags::HAS_FAST_CHECKABLE_SELECTOR);
        }
        if selector.iter_raw_match_order().nth(1).is_some() {
            flags.insert(RuleDataFlags::HAS_MULTIPART_SELECTOR);
        }
        if is_selector_matching_html_based_on_rule_hash(selector) {
            flags.insert(RuleDataFlags::HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH);
        }
        if contains_uncommon_attribute_selector(selector) {
            flags.insert(RuleDataFlags::CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR);
        }
        if add_rule_flags.contains(AddRuleFlags::HAS_DOCUMENT_SECURITY_ORIGIN) {
            flags.insert(RuleDataFlags::HAS_DOCUMENT_SECURITY_ORIGIN);
        }

        RuleData {
            specificity: selector.specificity(),
            link_match_type: determine_link_match_type(selector),
            property_whitelist: determine_property_whitelist(selector, add_rule_flags),
            ancestor_hashes: selector.ancestor_hashes(),
            rule,
            selector_index,
            position,
            flags,
        }
    }

    #[inline]
    pub fn rule(&self) -> &Arc<StyleRule> {
        &self.rule
    }

    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.rule.selectors.0[self.selector_index]
    }

    #[inline]
    pub fn selector_index(&self) -> usize {
        self.selector_index
    }

    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    #[inline]
    pub fn flags(&self) -> RuleDataFlags {
        self.flags
    }

    #[inline]
    pub fn has_fast_checkable_selector(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_FAST_CHECKABLE_SELECTOR)
    }

    #[inline]
    pub fn has_multipart_selector(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_MULTIPART_SELECTOR)
    }

    #[inline]
    pub fn has_rightmost_selector_matching_html_based_on_rule_hash(&self) -> bool {
        self.flags
            .contains(RuleDataFlags::HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH)
    }

    #[inline]
    pub fn contains_uncommon_attribute_selector(&self) -> bool {
        self.flags
            .contains(RuleDataFlags::CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR)
    }

    #[inline]
    pub fn has_document_security_origin(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_DOCUMENT_SECURITY_ORIGIN)
    }

    #[inline]
    pub fn link_match_type(&self) -> LinkMatchType {
        self.link_match_type
    }

    #[inline]
    pub fn property_whitelist(&self) -> PropertyWhitelist {
        self.property_whitelist
    }

    /// Identifiers the ancestors of a matching element must carry. Zero
    /// terminates the list.
    #[inline]
    pub fn ancestor_hashes(&self) -> &[u32; NUM_ANCESTOR_HASHES] {
        &self.ancestor_hashes
    }
}

/// Whether `selector` only uses what `fast_matches_selector` handles.
pub fn selector_can_use_fast_check(selector: &Selector) -> bool {
    can_use_fast_path(selector)
}

/// `type` and `readonly` are compared by style sharing directly, so
/// selectors on them in the rightmost compound need no rule set check.
fn is_common_attribute_selector_attribute(name: &Atom) -> bool {
    &**name == "type" || &**name == "readonly"
}

fn negation_contains_attribute_selector(component: &Component) -> bool {
    match *component {
        Component::Negation(ref negated) => negated
            .iter()
            .any(|inner| matches!(*inner, Component::Attribute(..))),
        _ => false,
    }
}

/// Whether the selector looks at an attribute that style sharing does not
/// compare: any attribute outside the rightmost compound, or one other than
/// `type` and `readonly` inside it.
pub fn contains_uncommon_attribute_selector(selector: &Selector) -> bool {
    let mut iter = selector.iter();
    for component in &mut iter {
        if let Component::Attribute(ref attr) = *component {
            if !is_common_attribute_selector_attribute(&attr.local_name_lower) {
                return true;
            }
        }
        if negation_contains_attribute_selector(component) {
            return true;
        }
    }

    while iter.next_sequence().is_some() {
        for component in &mut iter {
            if matches!(*component, Component::Attribute(..)) ||
                negation_contains_attribute_selector(component)
            {
                return true;
            }
        }
    }
    false
}

/// Whether a single simple selector is proven to match an HTML element just
/// by being found in the bucket the element looked up.
pub fn is_selector_matching_html_based_on_rule_hash(selector: &Selector) -> bool {
    let mut components = selector.iter_raw_match_order();
    let (Some(component), None) = (components.next(), components.next()) else {
        return false;
    };
    match *component {
        Component::LocalName(..) | Component::ID(..) | Component::Class(..) => true,
        ref other => is_common_pseudo_class(other),
    }
}

fn determine_property_whitelist(selector: &Selector, flags: AddRuleFlags) -> PropertyWhitelist {
    if flags.contains(AddRuleFlags::IS_IN_REGION_RULE) {
        return PropertyWhitelist::Region;
    }
    let is_cue = selector
        .iter_raw_match_order()
        .any(|c| matches!(*c, Component::PseudoElement(PseudoElement::Cue)));
    if is_cue {
        PropertyWhitelist::Cue
    } else {
        PropertyWhitelist::None
    }
}

/// A bucket of a [`RuleSet`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bucket<'a> {
    Id(&'a Atom),
    Class(&'a Atom),
    ShadowPseudoElement(&'a Atom),
    CuePseudoElement,
    LinkPseudoClass,
    FocusPseudoClass,
    /// Keyed by the ASCII-lowercased name.
    Tag(&'a Atom),
    Universal,
}

impl<'a> Bucket<'a> {
    fn rank(&self) -> u8 {
        match *self {
            Bucket::Id(..) => 5,
            Bucket::Class(..) => 4,
            Bucket::ShadowPseudoElement(..) | Bucket::CuePseudoElement => 3,
            Bucket::LinkPseudoClass | Bucket::FocusPseudoClass => 2,
            Bucket::Tag(..) => 1,
            Bucket::Universal => 0,
        }
    }
}

fn specific_bucket_for(component: &Component) -> Bucket<'_> {
    match *component {
        Component::ID(ref id) => Bucket::Id(id),
        Component::Class(ref class) => Bucket::Class(class),
        Component::PseudoElement(PseudoElement::Custom(ref name)) => {
            Bucket::ShadowPseudoElement(name)
        },
        Component::PseudoElement(PseudoElement::Cue) => Bucket::CuePseudoElement,
        Component::NonTSPseudoClass(NonTSPseudoClass::Focus) => Bucket::FocusPseudoClass,
        ref c if is_common_pseudo_class(c) => Bucket::LinkPseudoClass,
        Component::LocalName(ref name) => Bucket::Tag(&name.lower_name),
        _ => Bucket::Universal,
    }
}

/// Picks the most selective bucket of the rightmost compound, where
///
///   id > class > custom pseudo-element > cue > link or focus > tag > universal.
///
/// A custom pseudo-element or `::cue` always decides, since the rest of its
/// compound applies to the shadow host and not to the element looking the
/// rule up.
fn find_bucket(selector: &Selector) -> Bucket<'_> {
    let mut current_bucket = Bucket::Universal;
    for component in selector.iter() {
        let new_bucket = specific_bucket_for(component);
        if matches!(
            new_bucket,
            Bucket::ShadowPseudoElement(..) | Bucket::CuePseudoElement
        ) {
            return new_bucket;
        }
        if new_bucket.rank() > current_bucket.rank() {
            current_bucket = new_bucket;
        }
    }
    current_bucket
}

/// Wrapper for a hash map keyed by ids or classes, which compare
/// ASCII-case-insensitively in quirks mode.
#[derive(Clone, Debug, Default)]
pub struct MaybeCaseInsensitiveHashMap<V>(FxHashMap<Atom, V>);

impl<V> MaybeCaseInsensitiveHashMap<V> {
    pub fn entry(&mut self, mut key: Atom, quirks_mode: QuirksMode) -> hash_map::Entry<'_, Atom, V> {
        if quirks_mode == QuirksMode::Quirks {
            key = key.to_ascii_lowercase()
        }
        self.0.entry(key)
    }

    pub fn get(&self, key: &Atom, quirks_mode: QuirksMode) -> Option<&V> {
        if quirks_mode == QuirksMode::Quirks {
            self.0.get(&key.to_ascii_lowercase())
        } else {
            self.0.get(key)
        }
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Atom, V> {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> hash_map::ValuesMut<'_, Atom, V> {
        self.0.values_mut()
    }
}

/// The rule set of an `@-webkit-region` block, with the selectors of the
/// regions it applies to.
#[derive(Clone, Debug)]
pub struct RuleSetSelectorPair {
    pub selectors: SelectorList,
    pub rule_set: Box<RuleSet>,
}

/// The rules of one or more stylesheets, bucketed for lookup.
#[derive(Clone, Debug)]
pub struct RuleSet {
    id_rules: MaybeCaseInsensitiveHashMap<Vec<RuleData>>,
    class_rules: MaybeCaseInsensitiveHashMap<Vec<RuleData>>,
    tag_rules: FxHashMap<Atom, Vec<RuleData>>,
    shadow_pseudo_element_rules: FxHashMap<Atom, Vec<RuleData>>,
    cue_pseudo_rules: Vec<RuleData>,
    link_pseudo_class_rules: Vec<RuleData>,
    focus_pseudo_class_rules: Vec<RuleData>,
    universal_rules: Vec<RuleData>,
    page_rules: Vec<Arc<PageRule>>,
    region_selectors_and_rule_sets: Vec<RuleSetSelectorPair>,
    rule_count: u32,
    auto_shrink_to_fit: bool,
    quirks_mode: QuirksMode,
    max_selector_component_count: usize,
    features: RuleFeatureSet,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet {
            id_rules: MaybeCaseInsensitiveHashMap::default(),
            class_rules: MaybeCaseInsensitiveHashMap::default(),
            tag_rules: FxHashMap::default(),
            shadow_pseudo_element_rules: FxHashMap::default(),
            cue_pseudo_rules: vec![],
            link_pseudo_class_rules: vec![],
            focus_pseudo_class_rules: vec![],
            universal_rules: vec![],
            page_rules: vec![],
            region_selectors_and_rule_sets: vec![],
            rule_count: 0,
            auto_shrink_to_fit: true,
            quirks_mode: QuirksMode::NoQuirks,
            max_selector_component_count: MAX_SELECTOR_COMPONENT_COUNT,
            features: RuleFeatureSet::default(),
        }
    }

    /// A rule set whose id and class buckets follow the case rules of
    /// `quirks_mode`.
    pub fn with_quirks_mode(quirks_mode: QuirksMode) -> Self {
        RuleSet {
            quirks_mode,
            ..Self::new()
        }
    }

    /// Style rules with more simple selectors than this are split before
    /// being added.
    pub fn set_max_selector_component_count(&mut self, count: usize) {
        self.max_selector_component_count = count;
    }

    #[inline]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Adds the selector at `selector_index` of `rule`, with the next
    /// position.
    pub fn add_rule(&mut self, rule: Arc<StyleRule>, selector_index: usize, flags: AddRuleFlags) {
        let rule_data = RuleData::new(rule, selector_index, self.rule_count, flags);
        self.rule_count += 1;
        self.features.collect_features_from_rule_data(&rule_data);
        self.find_best_rule_set_and_add(rule_data);
    }

    fn find_best_rule_set_and_add(&mut self, rule_data: RuleData) {
        let quirks_mode = self.quirks_mode;
        let bucket = match find_bucket(rule_data.selector()) {
            Bucket::Id(id) => self
                .id_rules
                .entry(id.clone(), quirks_mode)
                .or_default(),
            Bucket::Class(class) => self
                .class_rules
                .entry(class.clone(), quirks_mode)
                .or_default(),
            Bucket::ShadowPseudoElement(name) => self
                .shadow_pseudo_element_rules
                .entry(name.clone())
                .or_default(),
            Bucket::CuePseudoElement => &mut self.cue_pseudo_rules,
            Bucket::LinkPseudoClass => &mut self.link_pseudo_class_rules,
            Bucket::FocusPseudoClass => &mut self.focus_pseudo_class_rules,
            Bucket::Tag(name) => self.tag_rules.entry(name.clone()).or_default(),
            Bucket::Universal => &mut self.universal_rules,
        };
        trace!(
            "Bucketed {:?} at position {}",
            rule_data.selector(),
            rule_data.position()
        );
        bucket.push(rule_data);
    }

    /// Adds every selector of `rule`, splitting it first if its selector
    /// list is too long. The pieces take consecutive positions, as the
    /// selectors of the unsplit rule would have.
    pub fn add_style_rule(&mut self, rule: &Arc<StyleRule>, flags: AddRuleFlags) {
        if rule.selectors.component_count() > self.max_selector_component_count {
            let pieces = rule.split_into_multiple_rules_with_maximum_selector_component_count(
                self.max_selector_component_count,
            );
            for piece in pieces {
                let piece = Arc::new(piece);
                for selector_index in 0..piece.selectors.len() {
                    self.add_rule(piece.clone(), selector_index, flags);
                }
            }
            return;
        }
        for selector_index in 0..rule.selectors.len() {
            self.add_rule(rule.clone(), selector_index, flags);
        }
    }

    pub fn add_page_rule(&mut self, rule: &Arc<PageRule>) {
        self.page_rules.push(rule.clone());
    }

    /// Collects the style rules of a region block into a rule set of their
    /// own, positioned as if they were inline in this one.
    pub fn add_region_rule(&mut self, rule: &RegionRule, has_document_security_origin: bool) {
        let mut region_rule_set = Box::new(RuleSet::with_quirks_mode(self.quirks_mode));
        region_rule_set.max_selector_component_count = self.max_selector_component_count;
        region_rule_set.rule_count = self.rule_count;

        let mut flags = AddRuleFlags::CAN_USE_FAST_CHECK_SELECTOR | AddRuleFlags::IS_IN_REGION_RULE;
        if has_document_security_origin {
            flags.insert(AddRuleFlags::HAS_DOCUMENT_SECURITY_ORIGIN);
        }
        for child in &rule.rules {
            if let CssRule::Style(ref style_rule) = *child {
                region_rule_set.add_style_rule(style_rule, flags);
            }
        }

        self.rule_count = region_rule_set.rule_count;
        self.region_selectors_and_rule_sets.push(RuleSetSelectorPair {
            selectors: rule.selectors.clone(),
            rule_set: region_rule_set,
        });
    }

    /// Adds the rules of `sheet` that apply to `device`: those of its
    /// imports first, each gated by the media of its `@import`, then its own.
    ///
    /// Font faces, keyframes, viewport rules and region blocks only go
    /// somewhere when there is `extra_data` to receive them.
    pub fn add_rules_from_sheet(
        &mut self,
        sheet: &StylesheetContents,
        device: &Device,
        mut extra_data: Option<&mut ExtraStyleData>,
        document_origin: Option<&SecurityOrigin>,
    ) {
        for import_rule in sheet.import_rules() {
            let Some(imported) = import_rule.stylesheet() else {
                continue;
            };
            if import_rule.media.is_empty() || import_rule.media.evaluate(device) {
                self.add_rules_from_sheet(
                    imported,
                    device,
                    extra_data.as_deref_mut(),
                    document_origin,
                );
            }
        }

        let has_document_security_origin =
            document_origin.is_some_and(|origin| *origin == sheet.url_data().url().origin());
        let mut flags = AddRuleFlags::CAN_USE_FAST_CHECK_SELECTOR;
        if has_document_security_origin {
            flags.insert(AddRuleFlags::HAS_DOCUMENT_SECURITY_ORIGIN);
        }
        let rules: Vec<&CssRule> = sheet.rules().collect();
        self.add_child_rules(
            &rules,
            device,
            extra_data,
            has_document_security_origin,
            flags,
        );

        if self.auto_shrink_to_fit {
            self.shrink_to_fit();
        }
    }

    fn add_child_rules(
        &mut self,
        rules: &[&CssRule],
        device: &Device,
        mut extra_data: Option<&mut ExtraStyleData>,
        has_document_security_origin: bool,
        flags: AddRuleFlags,
    ) {
        for rule in rules {
            match **rule {
                CssRule::Style(ref style_rule) => self.add_style_rule(style_rule, flags),
                CssRule::Page(ref page_rule) => self.add_page_rule(page_rule),
                CssRule::Media(ref media_rule) => {
                    if media_rule.media_queries.is_empty() ||
                        media_rule.media_queries.evaluate(device)
                    {
                        let children: Vec<&CssRule> = media_rule.rules.iter().collect();
                        self.add_child_rules(
                            &children,
                            device,
                            extra_data.as_deref_mut(),
                            has_document_security_origin,
                            flags,
                        );
                    }
                },
                CssRule::Supports(ref supports_rule) => {
                    if supports_rule.enabled {
                        let children: Vec<&CssRule> = supports_rule.rules.iter().collect();
                        self.add_child_rules(
                            &children,
                            device,
                            extra_data.as_deref_mut(),
                            has_document_security_origin,
                            flags,
                        );
                    }
                },
                CssRule::FontFace(ref font_face_rule) => {
                    if let Some(ref mut extra_data) = extra_data {
                        extra_data.add_font_face(font_face_rule);
                    }
                },
                CssRule::Keyframes(ref keyframes_rule) => {
                    if let Some(ref mut extra_data) = extra_data {
                        extra_data.add_keyframes(keyframes_rule);
                    }
                },
                CssRule::Viewport(ref viewport_rule) => {
                    if let Some(ref mut extra_data) = extra_data {
                        extra_data.add_viewport_rule(viewport_rule);
                    }
                },
                CssRule::Region(ref region_rule) => {
                    if extra_data.is_some() {
                        self.add_region_rule(region_rule, has_document_security_origin);
                    }
                },
                CssRule::Import(..) | CssRule::Namespace(..) | CssRule::Filter(..) => {},
            }
        }
    }

    /// Releases the spare capacity of every bucket.
    pub fn shrink_to_fit(&mut self) {
        for rules in self.id_rules.values_mut() {
            rules.shrink_to_fit();
        }
        for rules in self.class_rules.values_mut() {
            rules.shrink_to_fit();
        }
        for rules in self.tag_rules.values_mut() {
            rules.shrink_to_fit();
        }
        for rules in self.shadow_pseudo_element_rules.values_mut() {
            rules.shrink_to_fit();
        }
        self.cue_pseudo_rules.shrink_to_fit();
        self.link_pseudo_class_rules.shrink_to_fit();
        self.focus_pseudo_class_rules.shrink_to_fit();
        self.universal_rules.shrink_to_fit();
        self.page_rules.shrink_to_fit();
        self.region_selectors_and_rule_sets.shrink_to_fit();
    }

    /// Stops `add_rules_from_sheet` from compacting the buckets, for rule
    /// sets that keep growing.
    pub fn disable_auto_shrink_to_fit(&mut self) {
        self.auto_shrink_to_fit = false;
    }

    pub fn id_rules(&self, id: &Atom) -> Option<&[RuleData]> {
        self.id_rules.get(id, self.quirks_mode).map(|v| &**v)
    }

    pub fn class_rules(&self, class: &Atom) -> Option<&[RuleData]> {
        self.class_rules.get(class, self.quirks_mode).map(|v| &**v)
    }

    /// The rules of the tag `local_name`, in any ASCII case.
    pub fn tag_rules(&self, local_name: &Atom) -> Option<&[RuleData]> {
        let rules = if local_name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.tag_rules.get(&local_name.to_ascii_lowercase())
        } else {
            self.tag_rules.get(local_name)
        };
        rules.map(|v| &**v)
    }

    pub fn shadow_pseudo_element_rules(&self, name: &Atom) -> Option<&[RuleData]> {
        self.shadow_pseudo_element_rules.get(name).map(|v| &**v)
    }

    #[inline]
    pub fn cue_pseudo_rules(&self) -> &[RuleData] {
        &self.cue_pseudo_rules
    }

    #[inline]
    pub fn link_pseudo_class_rules(&self) -> &[RuleData] {
        &self.link_pseudo_class_rules
    }

    #[inline]
    pub fn focus_pseudo_class_rules(&self) -> &[RuleData] {
        &self.focus_pseudo_class_rules
    }

    #[inline]
    pub fn universal_rules(&self) -> &[RuleData] {
        &self.universal_rules
    }

    #[inline]
    pub fn page_rules(&self) -> &[Arc<PageRule>] {
        &self.page_rules
    }

    #[inline]
    pub fn region_selectors_and_rule_sets(&self) -> &[RuleSetSelectorPair] {
        &self.region_selectors_and_rule_sets
    }

    /// Every non-empty bucket with its rules, in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket<'_>, &[RuleData])> + '_ {
        let keyed = self
            .id_rules
            .iter()
            .map(|(k, v)| (Bucket::Id(k), &**v))
            .chain(self.class_rules.iter().map(|(k, v)| (Bucket::Class(k), &**v)))
            .chain(self.tag_rules.iter().map(|(k, v)| (Bucket::Tag(k), &**v)))
            .chain(
                self.shadow_pseudo_element_rules
                    .iter()
                    .map(|(k, v)| (Bucket::ShadowPseudoElement(k), &**v)),
            );
        let flat = [
            (Bucket::CuePseudoElement, &*self.cue_pseudo_rules),
            (Bucket::LinkPseudoClass, &*self.link_pseudo_class_rules),
            (Bucket::FocusPseudoClass, &*self.focus_pseudo_class_rules),
            (Bucket::Universal, &*self.universal_rules),
        ];
        keyed
            .chain(flat)
            .filter(|(_, rules)| !rules.is_empty())
    }

    /// The number of selectors added so far, which is also the position the
    /// next one gets.
    #[inline]
    pub fn rule_count(&self) -> u32 {
        self.rule_count
    }

    #[inline]
    pub fn features(&self) -> &RuleFeatureSet {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheets::{Origin, UrlExtraData};
    use url::Url;

    fn sheet(css: &str) -> StylesheetContents {
        StylesheetContents::from_str(
            css,
            UrlExtraData::new(Url::parse("http://example.com/a.css").unwrap()),
            Origin::Author,
            QuirksMode::NoQuirks,
            None,
            None,
        )
    }

    fn rule_set(css: &str) -> RuleSet {
        let mut rule_set = RuleSet::new();
        let device = crate::config::StyleConfig::default().device();
        rule_set.add_rules_from_sheet(&sheet(css), &device, None, None);
        rule_set
    }

    fn bucket_of(rule_set: &RuleSet, position: u32) -> Bucket<'_> {
        let mut found = rule_set
            .buckets()
            .filter(|(_, rules)| rules.iter().any(|r| r.position() == position))
            .map(|(bucket, _)| bucket);
        let bucket = found.next().unwrap();
        assert!(found.next().is_none(), "rule {} is in two buckets", position);
        bucket
    }

    #[test]
    fn bucket_precedence() {
        let rule_set = rule_set(
            "div.foo#bar {} \
             div.foo {} \
             a:link {} \
             input:focus {} \
             DIV {} \
             [title] {} \
             #x::-webkit-slider-thumb {} \
             ::cue {}",
        );
        assert_eq!(bucket_of(&rule_set, 0), Bucket::Id(&Atom::from("bar")));
        assert_eq!(bucket_of(&rule_set, 1), Bucket::Class(&Atom::from("foo")));
        assert_eq!(bucket_of(&rule_set, 2), Bucket::LinkPseudoClass);
        assert_eq!(bucket_of(&rule_set, 3), Bucket::FocusPseudoClass);
        assert_eq!(bucket_of(&rule_set, 4), Bucket::Tag(&Atom::from("div")));
        assert!(rule_set.tag_rules(&Atom::from("div")).is_some());
        assert!(rule_set.tag_rules(&Atom::from("DIV")).is_some());
        assert_eq!(rule_set.universal_rules().len(), 1);
        assert!(rule_set
            .shadow_pseudo_element_rules(&Atom::from("-webkit-slider-thumb"))
            .is_some());
        assert_eq!(rule_set.cue_pseudo_rules().len(), 1);
        assert_eq!(
            rule_set.cue_pseudo_rules()[0].property_whitelist(),
            PropertyWhitelist::Cue
        );
    }

    #[test]
    fn positions_follow_selectors() {
        let rule_set = rule_set("a, b {} c {}");
        assert_eq!(rule_set.rule_count(), 3);
        assert_eq!(rule_set.tag_rules(&Atom::from("b")).unwrap()[0].position(), 1);
        assert_eq!(rule_set.tag_rules(&Atom::from("c")).unwrap()[0].position(), 2);
    }

    #[test]
    fn derived_flags() {
        let rule_set = rule_set(".a {} .b .c {} [data-x] .d {} input[type=text] {}");
        let a = &rule_set.class_rules(&Atom::from("a")).unwrap()[0];
        assert!(a.has_fast_checkable_selector());
        assert!(!a.has_multipart_selector());
        assert!(a.has_rightmost_selector_matching_html_based_on_rule_hash());

        let c = &rule_set.class_rules(&Atom::from("c")).unwrap()[0];
        assert!(c.has_multipart_selector());
        assert_ne!(c.ancestor_hashes()[0], 0);

        let d = &rule_set.class_rules(&Atom::from("d")).unwrap()[0];
        assert!(d.contains_uncommon_attribute_selector());
        assert!(!d.has_fast_checkable_selector());

        let input = &rule_set.tag_rules(&Atom::from("input")).unwrap()[0];
        assert!(!input.contains_uncommon_attribute_selector());
        assert_eq!(rule_set.features().uncommon_attribute_rules.len(), 1);
    }

    #[test]
    fn media_and_supports_gate_their_rules() {
        let rule_set = rule_set(
            "@media print { a {} } \
             @media screen { b {} } \
             @supports (color: red) { c {} } \
             @supports (not-a-property: 1) { d {} }",
        );
        assert!(rule_set.tag_rules(&Atom::from("a")).is_none());
        assert!(rule_set.tag_rules(&Atom::from("b")).is_some());
        assert!(rule_set.tag_rules(&Atom::from("c")).is_some());
        assert!(rule_set.tag_rules(&Atom::from("d")).is_none());
    }

    #[test]
    fn region_rules_continue_the_positions() {
        let contents = sheet("a {} @-webkit-region #r { p { color: red } } b {}");
        let mut rule_set = RuleSet::new();
        let device = crate::config::StyleConfig::default().device();
        let mut extra_data = ExtraStyleData::default();
        rule_set.add_rules_from_sheet(&contents, &device, Some(&mut extra_data), None);

        let regions = rule_set.region_selectors_and_rule_sets();
        assert_eq!(regions.len(), 1);
        let p = &regions[0].rule_set.tag_rules(&Atom::from("p")).unwrap()[0];
        assert_eq!(p.position(), 1);
        assert_eq!(p.property_whitelist(), PropertyWhitelist::Region);
        assert_eq!(rule_set.tag_rules(&Atom::from("b")).unwrap()[0].position(), 2);
    }

    #[test]
    fn quirks_mode_buckets_ignore_case() {
        let mut rule_set = RuleSet::with_quirks_mode(QuirksMode::Quirks);
        let device = crate::config::StyleConfig::default().device();
        rule_set.add_rules_from_sheet(&sheet(".Foo {}"), &device, None, None);
        assert!(rule_set.class_rules(&Atom::from("foo")).is_some());
        assert!(rule_set.class_rules(&Atom::from("FOO")).is_some());
    }

    #[test]
    fn long_selector_lists_are_split_in_order() {
        let css = (0..6).map(|i| format!(".c{}", i)).collect::<Vec<_>>().join(", ") + " {}";
        let mut rule_set = RuleSet::new();
        rule_set.set_max_selector_component_count(2);
        let contents = sheet(&css);
        for rule in contents.rules() {
            if let CssRule::Style(ref style_rule) = *rule {
                rule_set.add_style_rule(style_rule, AddRuleFlags::empty());
            }
        }
        for i in 0..6 {
            let rules = rule_set.class_rules(&Atom::from(format!("c{}", i))).unwrap();
            assert_eq!(rules[0].position(), i);
            assert_eq!(rules[0].rule().selectors.len(), 2);
        }
    }
}
