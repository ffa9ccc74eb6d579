/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A style rule.

use crate::properties::PropertyDeclarationBlock;
use cssparser::{SourceLocation, ToCss};
use selectors::parser::{Component, Selector};
use selectors::SelectorList;
use servo_arc::Arc;
use std::fmt::{self, Write};

/// A style rule, with selectors and declarations.
#[derive(Clone, Debug)]
pub struct StyleRule {
    /// The list of selectors in this rule.
    pub selectors: SelectorList,
    /// The declaration block with the properties it contains.
    pub block: Arc<PropertyDeclarationBlock>,
    /// The location in the sheet where it was found.
    pub source_location: SourceLocation,
}

impl StyleRule {
    /// The declarations of this rule, copied first if they are shared.
    pub fn block_mut(&mut self) -> &mut PropertyDeclarationBlock {
        Arc::make_mut(&mut self.block)
    }

    /// Splits this rule into rules whose selector lists hold at most
    /// `max_count` simple selectors each.
    ///
    /// Selectors are never cut in half, so a single selector longer than the
    /// limit gets a rule of its own. The order of the selectors is kept and
    /// every piece shares the declarations of this rule.
    pub fn split_into_multiple_rules_with_maximum_selector_component_count(
        &self,
        max_count: usize,
    ) -> Vec<StyleRule> {
        let mut rules = vec![];
        let mut components_since_last_split: Vec<Selector> = vec![];
        let mut count_since_last_split = 0;

        for selector in self.selectors.iter() {
            let count = selector.component_count();
            if count + count_since_last_split > max_count && !components_since_last_split.is_empty() {
                rules.push(self.with_selectors(std::mem::take(&mut components_since_last_split)));
                count_since_last_split = 0;
            }
            components_since_last_split.push(selector.clone());
            count_since_last_split += count;
        }

        if !components_since_last_split.is_empty() {
            rules.push(self.with_selectors(components_since_last_split));
        }
        rules
    }

    fn with_selectors(&self, selectors: Vec<Selector>) -> StyleRule {
        StyleRule {
            selectors: SelectorList::from_vec(selectors),
            block: self.block.clone(),
            source_location: self.source_location,
        }
    }

    /// A rough measure of the memory this rule holds.
    pub fn estimated_size_in_bytes(&self) -> usize {
        std::mem::size_of::<StyleRule>() +
            self.selectors.component_count() * std::mem::size_of::<Component>() +
            self.block.len() * std::mem::size_of::<crate::properties::PropertyDeclaration>()
    }
}

impl ToCss for StyleRule {
    /// <https://drafts.csswg.org/cssom/#serialize-a-css-rule CSSStyleRule>
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        // Step 1
        self.selectors.to_css(dest)?;
        // Step 2
        dest.write_str(" { ")?;
        // Step 3
        let declaration_block = &self.block;
        declaration_block.to_css(dest)?;
        // Step 4
        if !declaration_block.is_empty() {
            dest.write_char(' ')?;
        }
        // Step 5
        dest.write_char('}')
    }
}
