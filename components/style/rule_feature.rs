/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Facts gathered over every selector of a collection of rules.
//!
//! Style sharing uses them to reject candidates: two elements may only share
//! a style if no rule could tell them apart, and rules looking at ids,
//! siblings or uncommon attributes can.

use crate::rule_set::RuleData;
use crate::stylesheets::StyleRule;
use crate::Atom;
use rustc_hash::FxHashSet;
use selectors::parser::{Component, PseudoElement};
use servo_arc::Arc;

/// A selector of a rule, remembered so that a small rule set can be built
/// out of it later.
#[derive(Clone, Debug)]
pub struct RuleFeature {
    pub rule: Arc<StyleRule>,
    pub selector_index: usize,
    pub has_document_security_origin: bool,
}

impl RuleFeature {
    fn from_rule_data(rule_data: &RuleData) -> Self {
        RuleFeature {
            rule: rule_data.rule().clone(),
            selector_index: rule_data.selector_index(),
            has_document_security_origin: rule_data.has_document_security_origin(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleFeatureSet {
    /// Ids used anywhere in a selector.
    pub ids: FxHashSet<Atom>,
    /// Classes used anywhere in a selector.
    pub classes: FxHashSet<Atom>,
    /// Lowercased local names of the attributes used in attribute selectors.
    pub attributes: FxHashSet<Atom>,
    /// Selectors using sibling combinators or structural pseudo-classes.
    pub sibling_rules: Vec<RuleFeature>,
    /// Selectors using attributes other than `type` and `readonly`.
    pub uncommon_attribute_rules: Vec<RuleFeature>,
    pub uses_first_line_rules: bool,
    pub uses_before_after_rules: bool,
}

impl RuleFeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `other` into this set. Sets only ever grow this way; use
    /// `clear` to start over.
    pub fn add(&mut self, other: &RuleFeatureSet) {
        self.ids.extend(other.ids.iter().cloned());
        self.classes.extend(other.classes.iter().cloned());
        self.attributes.extend(other.attributes.iter().cloned());
        self.sibling_rules.extend(other.sibling_rules.iter().cloned());
        self.uncommon_attribute_rules
            .extend(other.uncommon_attribute_rules.iter().cloned());
        self.uses_first_line_rules |= other.uses_first_line_rules;
        self.uses_before_after_rules |= other.uses_before_after_rules;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.classes.clear();
        self.attributes.clear();
        self.sibling_rules.clear();
        self.uncommon_attribute_rules.clear();
        self.uses_first_line_rules = false;
        self.uses_before_after_rules = false;
    }

    fn collect_features_from_component(&mut self, component: &Component) {
        match *component {
            Component::ID(ref id) => {
                self.ids.insert(id.clone());
            },
            Component::Class(ref class) => {
                self.classes.insert(class.clone());
            },
            Component::Attribute(ref attr) => {
                self.attributes.insert(attr.local_name_lower.clone());
            },
            Component::PseudoElement(PseudoElement::FirstLine) => {
                self.uses_first_line_rules = true;
            },
            Component::PseudoElement(PseudoElement::Before | PseudoElement::After) => {
                self.uses_before_after_rules = true;
            },
            _ => {},
        }
    }

    /// Records everything the selector of `rule_data` looks at, including
    /// the insides of `:not()`.
    pub fn collect_features_from_rule_data(&mut self, rule_data: &RuleData) {
        let mut found_sibling_selector = false;
        for component in rule_data.selector().iter_raw_match_order() {
            match *component {
                Component::Combinator(combinator) => {
                    found_sibling_selector |= combinator.is_sibling();
                },
                Component::Negation(ref negated) => {
                    for inner in negated.iter() {
                        found_sibling_selector |= inner.is_structural_sibling_pseudo_class();
                        self.collect_features_from_component(inner);
                    }
                },
                ref simple => {
                    found_sibling_selector |= simple.is_structural_sibling_pseudo_class();
                    self.collect_features_from_component(simple);
                },
            }
        }

        if found_sibling_selector {
            self.sibling_rules.push(RuleFeature::from_rule_data(rule_data));
        }
        if rule_data.contains_uncommon_attribute_selector() {
            self.uncommon_attribute_rules
                .push(RuleFeature::from_rule_data(rule_data));
        }
    }

    #[inline]
    pub fn has_selector_for_id(&self, id: &Atom) -> bool {
        self.ids.contains(id)
    }

    #[inline]
    pub fn has_selector_for_class(&self, class: &Atom) -> bool {
        self.classes.contains(class)
    }

    /// `name` is compared ASCII-lowercased.
    pub fn has_selector_for_attribute(&self, name: &Atom) -> bool {
        self.attributes.contains(name) || self.attributes.contains(&name.to_ascii_lowercase())
    }
}
