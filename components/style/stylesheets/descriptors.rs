/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Descriptor blocks of the at-rules whose bodies are not property
//! declarations: `@font-face`, `@viewport` and `@-webkit-filter`.
//!
//! Descriptor values are not interpreted by the cascade, so they are kept as
//! the source text of their value.

use crate::error_reporting::ContextualParseError;
use crate::parser::{ParseError, ParserContext, StyleParseErrorKind};
use crate::Atom;
use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, Parser, ParserState, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, ToCss,
};
use std::fmt::{self, Write};

/// A single `name: value` descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Descriptor {
    /// The lowercased descriptor name.
    pub name: Atom,
    /// The value, as written.
    pub value: Box<str>,
}

impl ToCss for Descriptor {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str(&self.name)?;
        dest.write_str(": ")?;
        dest.write_str(&self.value)?;
        dest.write_char(';')
    }
}

/// Returns the value of the last descriptor called `name`.
pub fn descriptor_value<'a>(descriptors: &'a [Descriptor], name: &str) -> Option<&'a str> {
    descriptors
        .iter()
        .rev()
        .find(|d| str::eq_ignore_ascii_case(&d.name, name))
        .map(|d| &*d.value)
}

/// Writes ` { a: b; c: d; }`.
pub(crate) fn descriptors_to_css<W>(descriptors: &[Descriptor], dest: &mut W) -> fmt::Result
where
    W: Write,
{
    dest.write_str(" {")?;
    for descriptor in descriptors {
        dest.write_char(' ')?;
        descriptor.to_css(dest)?;
    }
    dest.write_str(" }")
}

struct DescriptorParser<'a> {
    allowed: Option<&'a [&'a str]>,
}

impl<'a, 'i> AtRuleParser<'i> for DescriptorParser<'a> {
    type Prelude = ();
    type AtRule = Descriptor;
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'i> QualifiedRuleParser<'i> for DescriptorParser<'a> {
    type Prelude = ();
    type QualifiedRule = Descriptor;
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'i> DeclarationParser<'i> for DescriptorParser<'a> {
    type Declaration = Descriptor;
    type Error = StyleParseErrorKind<'i>;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<Descriptor, ParseError<'i>> {
        if let Some(allowed) = self.allowed {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                return Err(input.new_custom_error(StyleParseErrorKind::UnknownProperty(name)));
            }
        }

        let start = input.position();
        while input.next().is_ok() {}
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(StyleParseErrorKind::InvalidValue));
        }

        Ok(Descriptor {
            name: Atom::from(name.to_ascii_lowercase()),
            value: value.into(),
        })
    }
}

impl<'a, 'i> RuleBodyItemParser<'i, Descriptor, StyleParseErrorKind<'i>> for DescriptorParser<'a> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parses the body of a descriptor at-rule. Unknown or empty descriptors are
/// reported with `make_error` and skipped; a later descriptor replaces an
/// earlier one of the same name.
///
/// `None` for `allowed` accepts every name.
pub(crate) fn parse_descriptor_block<'i, 't, F>(
    context: &ParserContext,
    input: &mut Parser<'i, 't>,
    allowed: Option<&[&str]>,
    make_error: F,
) -> Vec<Descriptor>
where
    F: for<'a> Fn(&'a str, ParseError<'a>) -> ContextualParseError<'a>,
{
    let mut descriptors: Vec<Descriptor> = vec![];
    let mut parser = DescriptorParser { allowed };
    let mut iter = RuleBodyParser::new(input, &mut parser);
    while let Some(result) = iter.next() {
        match result {
            Ok(descriptor) => {
                descriptors.retain(|d| d.name != descriptor.name);
                descriptors.push(descriptor);
            },
            Err((error, slice)) => {
                let location = error.location;
                context.log_css_error(location, make_error(slice, error));
            },
        }
    }
    descriptors
}
