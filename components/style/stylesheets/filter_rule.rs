/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The `@-webkit-filter` at-rule, which names a custom filter.

use crate::error_reporting::ContextualParseError;
use crate::parser::ParserContext;
use crate::stylesheets::descriptors::{descriptor_value, descriptors_to_css, parse_descriptor_block};
use crate::stylesheets::Descriptor;
use crate::Atom;
use cssparser::{serialize_identifier, Parser, SourceLocation, ToCss};
use std::fmt::{self, Write};

#[derive(Clone, Debug, PartialEq)]
pub struct FilterRule {
    pub name: Atom,
    pub descriptors: Vec<Descriptor>,
    pub source_location: SourceLocation,
}

impl FilterRule {
    pub fn parse(
        context: &ParserContext,
        input: &mut Parser,
        name: Atom,
        source_location: SourceLocation,
    ) -> Self {
        // Filter descriptors are open-ended, so any name is kept.
        let descriptors = parse_descriptor_block(context, input, None, |slice, error| {
            ContextualParseError::UnsupportedRule(slice, error)
        });
        FilterRule {
            name,
            descriptors,
            source_location,
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<&str> {
        descriptor_value(&self.descriptors, name)
    }
}

impl ToCss for FilterRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@-webkit-filter ")?;
        serialize_identifier(&self.name, dest)?;
        descriptors_to_css(&self.descriptors, dest)
    }
}
