/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyframes: https://drafts.csswg.org/css-animations/#keyframes

use crate::error_reporting::ContextualParseError;
use crate::parser::{ParseError, ParserContext, StyleParseErrorKind};
use crate::properties::{Importance, PropertyDeclaration, PropertyDeclarationBlock, PropertyId};
use crate::properties::SourcePropertyDeclaration;
use crate::Atom;
use cssparser::{serialize_identifier, AtRuleParser, CowRcStr, DeclarationParser, Parser};
use cssparser::{ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser};
use cssparser::{RuleBodyParser, SourceLocation, ToCss, Token};
use selectors::matching::QuirksMode;
use servo_arc::Arc;
use std::fmt::{self, Write};

/// A [`@keyframes`][keyframes] rule.
///
/// [keyframes]: https://drafts.csswg.org/css-animations/#keyframes
#[derive(Clone, Debug)]
pub struct KeyframesRule {
    /// The name of the current animation.
    pub name: Atom,
    /// The keyframes specified for this CSS rule.
    pub keyframes: Vec<Keyframe>,
    /// Whether the rule was written as `@-webkit-keyframes`.
    pub vendor_prefixed: bool,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for KeyframesRule {
    // Serialization of KeyframesRule is not specced.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str(if self.vendor_prefixed {
            "@-webkit-keyframes "
        } else {
            "@keyframes "
        })?;
        serialize_identifier(&self.name, dest)?;
        dest.write_str(" {")?;
        for keyframe in self.keyframes.iter() {
            dest.write_str("\n")?;
            keyframe.to_css(dest)?;
        }
        dest.write_str("\n}")
    }
}

impl KeyframesRule {
    /// Returns the index of the last keyframe that matches the given selector.
    /// If the selector is not valid, or no keyframe is found, returns None.
    ///
    /// Related spec:
    /// <https://drafts.csswg.org/css-animations-1/#interface-csskeyframesrule-findrule>
    pub fn find_rule(&self, selector: &str) -> Option<usize> {
        let mut input = ParserInput::new(selector);
        if let Ok(selector) = Parser::new(&mut input).parse_entirely(KeyframeSelector::parse) {
            for (i, keyframe) in self.keyframes.iter().enumerate().rev() {
                if keyframe.selector == selector {
                    return Some(i);
                }
            }
        }
        None
    }
}

/// A number from 0 to 1, indicating the percentage of the animation when this
/// keyframe should run.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct KeyframePercentage(pub f32);

impl Eq for KeyframePercentage {}

impl ToCss for KeyframePercentage {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        Token::Percentage {
            has_sign: false,
            unit_value: self.0,
            int_value: None,
        }
        .to_css(dest)
    }
}

impl KeyframePercentage {
    /// Trivially constructs a new `KeyframePercentage`.
    #[inline]
    pub fn new(value: f32) -> KeyframePercentage {
        debug_assert!((0. ..=1.).contains(&value));
        KeyframePercentage(value)
    }

    fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<KeyframePercentage, ParseError<'i>> {
        let token = input.next()?.clone();
        match token {
            Token::Ident(ref identifier) if identifier.as_ref().eq_ignore_ascii_case("from") => {
                Ok(KeyframePercentage::new(0.))
            },
            Token::Ident(ref identifier) if identifier.as_ref().eq_ignore_ascii_case("to") => {
                Ok(KeyframePercentage::new(1.))
            },
            Token::Percentage {
                unit_value: percentage,
                ..
            } if (0. ..=1.).contains(&percentage) => Ok(KeyframePercentage::new(percentage)),
            _ => Err(input.new_unexpected_token_error(token)),
        }
    }
}

/// A keyframes selector is a list of percentages or from/to symbols, which are
/// converted at parse time to percentages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyframeSelector(Vec<KeyframePercentage>);

impl ToCss for KeyframeSelector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        let mut first = true;
        for percentage in &self.0 {
            if !first {
                dest.write_str(", ")?;
            }
            first = false;
            percentage.to_css(dest)?;
        }
        Ok(())
    }
}

impl KeyframeSelector {
    /// Return the list of percentages this selector contains.
    #[inline]
    pub fn percentages(&self) -> &[KeyframePercentage] {
        &self.0
    }

    /// Parse a keyframe selector from CSS input.
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Self, ParseError<'i>> {
        input
            .parse_comma_separated(KeyframePercentage::parse)
            .map(KeyframeSelector)
    }
}

/// A keyframe.
#[derive(Clone, Debug)]
pub struct Keyframe {
    /// The selector this keyframe was specified from.
    pub selector: KeyframeSelector,

    /// The declaration block that was declared inside this keyframe.
    ///
    /// `!important` declarations are dropped while parsing.
    pub block: Arc<PropertyDeclarationBlock>,

    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for Keyframe {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        self.selector.to_css(dest)?;
        dest.write_str(" { ")?;
        self.block.to_css(dest)?;
        dest.write_str(" }")?;
        Ok(())
    }
}

/// Parses a keyframes list, like:
/// 0%, 50% {
///     width: 50%;
/// }
///
/// 40%, 60%, 100% {
///     width: 100%;
/// }
pub fn parse_keyframe_list(context: &ParserContext, input: &mut Parser) -> Vec<Keyframe> {
    let mut declarations = SourcePropertyDeclaration::new();
    let mut parser = KeyframeListParser {
        context,
        declarations: &mut declarations,
    };
    let mut iter = RuleBodyParser::new(input, &mut parser);
    let mut keyframes = Vec::new();
    while let Some(result) = iter.next() {
        match result {
            Ok(keyframe) => keyframes.push(keyframe),
            Err((error, slice)) => {
                let location = error.location;
                let error = ContextualParseError::InvalidKeyframeRule(slice, error);
                context.log_css_error(location, error);
            },
        }
    }
    keyframes
}

struct KeyframeListParser<'a, 'b> {
    context: &'a ParserContext<'b>,
    declarations: &'a mut SourcePropertyDeclaration,
}

/// Default methods reject all at rules.
impl<'a, 'b, 'i> AtRuleParser<'i> for KeyframeListParser<'a, 'b> {
    type Prelude = ();
    type AtRule = Keyframe;
    type Error = StyleParseErrorKind<'i>;
}

/// Default methods reject all declarations.
impl<'a, 'b, 'i> DeclarationParser<'i> for KeyframeListParser<'a, 'b> {
    type Declaration = Keyframe;
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'b, 'i> QualifiedRuleParser<'i> for KeyframeListParser<'a, 'b> {
    type Prelude = KeyframeSelector;
    type QualifiedRule = Keyframe;
    type Error = StyleParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i>> {
        KeyframeSelector::parse(input)
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Keyframe, ParseError<'i>> {
        let mut block = PropertyDeclarationBlock::new();
        let mut parser = KeyframeDeclarationParser {
            declarations: &mut *self.declarations,
            quirks_mode: self.context.quirks_mode,
        };
        let mut iter = RuleBodyParser::new(input, &mut parser);
        while let Some(declaration) = iter.next() {
            match declaration {
                Ok(()) => {
                    block.extend(iter.parser.declarations.drain(), Importance::Normal);
                },
                Err((error, slice)) => {
                    iter.parser.declarations.clear();
                    let location = error.location;
                    let error =
                        ContextualParseError::UnsupportedKeyframePropertyDeclaration(slice, error);
                    self.context.log_css_error(location, error);
                },
            }
        }
        Ok(Keyframe {
            selector,
            block: Arc::new(block),
            source_location: start.source_location(),
        })
    }
}

impl<'a, 'b, 'i> RuleBodyItemParser<'i, Keyframe, StyleParseErrorKind<'i>>
    for KeyframeListParser<'a, 'b>
{
    fn parse_qualified(&self) -> bool {
        true
    }

    fn parse_declarations(&self) -> bool {
        false
    }
}

struct KeyframeDeclarationParser<'a> {
    declarations: &'a mut SourcePropertyDeclaration,
    quirks_mode: QuirksMode,
}

/// Default methods reject all at rules.
impl<'a, 'i> AtRuleParser<'i> for KeyframeDeclarationParser<'a> {
    type Prelude = ();
    type AtRule = ();
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'i> QualifiedRuleParser<'i> for KeyframeDeclarationParser<'a> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'i> DeclarationParser<'i> for KeyframeDeclarationParser<'a> {
    type Declaration = ();
    type Error = StyleParseErrorKind<'i>;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<(), ParseError<'i>> {
        let id = match PropertyId::parse(&name) {
            Ok(id) => id,
            Err(()) => {
                return Err(input.new_custom_error(StyleParseErrorKind::UnknownProperty(name)));
            },
        };

        // `!important` is not allowed in keyframes, so the whole
        // declaration must be the value.
        PropertyDeclaration::parse_into(self.declarations, id, self.quirks_mode, input)?;
        if self.declarations.is_empty() {
            return Err(input.new_custom_error(StyleParseErrorKind::InvalidValue));
        }
        Ok(())
    }
}

impl<'a, 'i> RuleBodyItemParser<'i, (), StyleParseErrorKind<'i>> for KeyframeDeclarationParser<'a> {
    fn parse_qualified(&self) -> bool {
        false
    }

    fn parse_declarations(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheets::{Origin, UrlExtraData};
    use selectors::matching::QuirksMode;
    use url::Url;

    fn parse(css: &str) -> Vec<Keyframe> {
        let url = UrlExtraData::new(Url::parse("http://example.com/").unwrap());
        let context = ParserContext::new(Origin::Author, &url, None, QuirksMode::NoQuirks, None);
        let mut input = ParserInput::new(css);
        parse_keyframe_list(&context, &mut Parser::new(&mut input))
    }

    #[test]
    fn keyframe_selectors() {
        let keyframes = parse("from { color: red } 50%, to { color: blue } 120% { color: green }");
        assert_eq!(keyframes.len(), 2);
        assert_eq!(keyframes[0].selector.percentages(), &[KeyframePercentage(0.)]);
        assert_eq!(keyframes[1].selector.to_css_string(), "50%, 100%");
    }

    #[test]
    fn important_declarations_are_dropped() {
        let keyframes = parse("from { color: red !important; margin-top: 1px }");
        assert_eq!(keyframes.len(), 1);
        assert_eq!(keyframes[0].block.len(), 1);
    }

    #[test]
    fn find_rule_returns_the_last_match() {
        let rule = KeyframesRule {
            name: Atom::from("fade"),
            keyframes: parse("from { color: red } to { color: blue } 0% { color: green }"),
            vendor_prefixed: false,
            source_location: SourceLocation { line: 0, column: 1 },
        };
        assert_eq!(rule.find_rule("from"), Some(2));
        assert_eq!(rule.find_rule("to"), Some(1));
        assert_eq!(rule.find_rule("50%"), None);
    }
}
