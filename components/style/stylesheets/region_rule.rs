/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The `@-webkit-region` rule, which styles the content flowing into the
//! regions its selectors match.

use crate::stylesheets::{nested_rules_to_css, CssRule};
use cssparser::{SourceLocation, ToCss};
use selectors::SelectorList;
use std::fmt::{self, Write};

#[derive(Clone, Debug)]
pub struct RegionRule {
    /// The regions this rule applies to.
    pub selectors: SelectorList,
    /// Style rules for the content of those regions. Only a few properties
    /// of them take effect.
    pub rules: Vec<CssRule>,
    pub source_location: SourceLocation,
}

impl ToCss for RegionRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@-webkit-region ")?;
        self.selectors.to_css(dest)?;
        nested_rules_to_css(&self.rules, dest)
    }
}
