/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@font-face`][ff] at-rule.
//!
//! [ff]: https://drafts.csswg.org/css-fonts/#at-font-face-rule

use crate::error_reporting::ContextualParseError;
use crate::parser::ParserContext;
use crate::stylesheets::descriptors::{descriptor_value, descriptors_to_css, parse_descriptor_block};
use crate::stylesheets::Descriptor;
use cssparser::{Parser, SourceLocation, ToCss};
use std::fmt::{self, Write};

const FONT_FACE_DESCRIPTORS: &[&str] = &[
    "font-family",
    "src",
    "font-style",
    "font-weight",
    "font-stretch",
    "unicode-range",
    "font-variant",
    "font-feature-settings",
];

/// A `@font-face` rule.
#[derive(Clone, Debug, PartialEq)]
pub struct FontFaceRule {
    pub descriptors: Vec<Descriptor>,
    pub source_location: SourceLocation,
}

impl FontFaceRule {
    pub fn parse(context: &ParserContext, input: &mut Parser, source_location: SourceLocation) -> Self {
        let descriptors = parse_descriptor_block(
            context,
            input,
            Some(FONT_FACE_DESCRIPTORS),
            |slice, error| ContextualParseError::UnsupportedFontFaceDescriptor(slice, error),
        );
        FontFaceRule {
            descriptors,
            source_location,
        }
    }

    /// The `font-family` descriptor, if any.
    pub fn family(&self) -> Option<&str> {
        descriptor_value(&self.descriptors, "font-family")
    }

    pub fn descriptor(&self, name: &str) -> Option<&str> {
        descriptor_value(&self.descriptors, name)
    }
}

impl ToCss for FontFaceRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@font-face")?;
        descriptors_to_css(&self.descriptors, dest)
    }
}
