/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Applicable declarations management.

use crate::properties::PropertyDeclarationBlock;
use crate::rule_set::{PropertyWhitelist, RuleData};
use crate::stylesheets::{Origin, StyleRule};
use selectors::matching::LinkMatchType;
use selectors::parser::PseudoElement;
use servo_arc::Arc;
use smallvec::SmallVec;

/// List of applicable declarations. This is a transient structure that shuttles
/// declarations between selector matching and the cascade, and therefore we
/// want to avoid heap-allocation where possible.
pub type ApplicableDeclarationList = SmallVec<[ApplicableDeclarationBlock; 16]>;

/// Where a declaration block comes from.
#[derive(Clone, Debug)]
pub enum StyleSource {
    /// A style rule, reached through one of its selectors.
    Rule(Arc<StyleRule>),
    /// The style attribute or presentational hints of the element.
    Declarations(Arc<PropertyDeclarationBlock>),
}

impl StyleSource {
    pub fn block(&self) -> &Arc<PropertyDeclarationBlock> {
        match *self {
            StyleSource::Rule(ref rule) => &rule.block,
            StyleSource::Declarations(ref block) => block,
        }
    }

    pub fn rule(&self) -> Option<&Arc<StyleRule>> {
        match *self {
            StyleSource::Rule(ref rule) => Some(rule),
            StyleSource::Declarations(..) => None,
        }
    }
}

/// A declaration block that applies to an element, with what the cascade
/// needs to know to apply it.
#[derive(Clone, Debug)]
pub struct ApplicableDeclarationBlock {
    pub source: StyleSource,
    pub origin: Origin,
    /// The specificity of the selector that matched. Zero for blocks that
    /// come from the element itself.
    pub specificity: u32,
    /// The position of the matched selector in its rule set.
    source_order: u32,
    pub link_match_type: LinkMatchType,
    pub property_whitelist: PropertyWhitelist,
}

impl ApplicableDeclarationBlock {
    /// Constructs an applicable declaration block from a block that comes
    /// from the element itself.
    #[inline]
    pub fn from_declarations(block: Arc<PropertyDeclarationBlock>, origin: Origin) -> Self {
        ApplicableDeclarationBlock {
            source: StyleSource::Declarations(block),
            origin,
            specificity: 0,
            source_order: 0,
            link_match_type: LinkMatchType::MATCH_ALL,
            property_whitelist: PropertyWhitelist::None,
        }
    }

    /// Constructs an applicable declaration block from a matched rule.
    #[inline]
    pub fn from_rule_data(rule_data: &RuleData, origin: Origin) -> Self {
        ApplicableDeclarationBlock {
            source: StyleSource::Rule(rule_data.rule().clone()),
            origin,
            specificity: rule_data.specificity(),
            source_order: rule_data.position(),
            link_match_type: rule_data.link_match_type(),
            property_whitelist: rule_data.property_whitelist(),
        }
    }

    #[inline]
    pub fn source_order(&self) -> u32 {
        self.source_order
    }

    #[inline]
    pub fn block(&self) -> &Arc<PropertyDeclarationBlock> {
        self.source.block()
    }
}

/// Which part of a match result each origin covers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchRanges {
    pub user_agent: (usize, usize),
    pub user: (usize, usize),
    pub author: (usize, usize),
}

/// The declarations an element matched, in cascade order.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub declarations: ApplicableDeclarationList,
    pub ranges: MatchRanges,
    /// False when something matched that the matched properties of a
    /// sibling cannot stand in for, such as an inline style.
    pub is_cacheable: bool,
    /// Dynamic pseudo-elements that have rules for the element, found while
    /// matching for the element itself.
    pub pseudo_elements: SmallVec<[PseudoElement; 2]>,
}

impl Default for MatchResult {
    fn default() -> Self {
        MatchResult {
            declarations: ApplicableDeclarationList::new(),
            ranges: MatchRanges::default(),
            is_cacheable: true,
            pseudo_elements: SmallVec::new(),
        }
    }
}

impl MatchResult {
    /// The blocks of one origin, in the order they apply.
    pub fn declarations_of(&self, origin: Origin) -> &[ApplicableDeclarationBlock] {
        let (start, end) = match origin {
            Origin::UserAgent => self.ranges.user_agent,
            Origin::User => self.ranges.user,
            Origin::Author => self.ranges.author,
        };
        &self.declarations[start..end]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
