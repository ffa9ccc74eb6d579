/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@viewport`][at] at-rule.
//!
//! [at]: https://drafts.csswg.org/css-device-adapt/#atviewport-rule

use crate::error_reporting::ContextualParseError;
use crate::parser::ParserContext;
use crate::stylesheets::descriptors::{descriptor_value, descriptors_to_css, parse_descriptor_block};
use crate::stylesheets::Descriptor;
use cssparser::{Parser, SourceLocation, ToCss};
use std::fmt::{self, Write};

const VIEWPORT_DESCRIPTORS: &[&str] = &[
    "min-width",
    "max-width",
    "width",
    "min-height",
    "max-height",
    "height",
    "zoom",
    "min-zoom",
    "max-zoom",
    "user-zoom",
    "orientation",
];

/// A `@viewport` rule.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportRule {
    /// The declarations contained in this @viewport rule.
    pub declarations: Vec<Descriptor>,
    /// Whether the rule was written as `@-webkit-viewport`.
    pub vendor_prefixed: bool,
    pub source_location: SourceLocation,
}

impl ViewportRule {
    /// Parse a single @viewport rule.
    pub fn parse(
        context: &ParserContext,
        input: &mut Parser,
        vendor_prefixed: bool,
        source_location: SourceLocation,
    ) -> Self {
        let declarations = parse_descriptor_block(
            context,
            input,
            Some(VIEWPORT_DESCRIPTORS),
            |slice, error| ContextualParseError::UnsupportedViewportDescriptorDeclaration(slice, error),
        );
        ViewportRule {
            declarations,
            vendor_prefixed,
            source_location,
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<&str> {
        descriptor_value(&self.declarations, name)
    }
}

impl ToCss for ViewportRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str(if self.vendor_prefixed {
            "@-webkit-viewport"
        } else {
            "@viewport"
        })?;
        descriptors_to_css(&self.declarations, dest)
    }
}
