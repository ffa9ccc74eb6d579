/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [@supports rules](https://drafts.csswg.org/css-conditional-3/#at-supports)

use crate::parser::{ParseError, StyleParseErrorKind};
use crate::properties::{PropertyDeclaration, PropertyId, SourcePropertyDeclaration};
use crate::stylesheets::{nested_rules_to_css, CssRule};
use cssparser::{match_ignore_ascii_case, Delimiter, Parser, ParserInput, SourceLocation, ToCss};
use cssparser::{parse_important, Token};
use selectors::matching::QuirksMode;
use std::fmt::{self, Write};

/// An [`@supports`][supports] rule.
///
/// [supports]: https://drafts.csswg.org/css-conditional-3/#at-supports
#[derive(Clone, Debug)]
pub struct SupportsRule {
    /// The parsed condition
    pub condition: SupportsCondition,
    /// Child rules
    pub rules: Vec<CssRule>,
    /// The result of evaluating the condition
    pub enabled: bool,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for SupportsRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@supports ")?;
        self.condition.to_css(dest)?;
        nested_rules_to_css(&self.rules, dest)
    }
}

/// An @supports condition
///
/// <https://drafts.csswg.org/css-conditional-3/#at-supports>
#[derive(Clone, Debug, PartialEq)]
pub enum SupportsCondition {
    /// `not (condition)`
    Not(Box<SupportsCondition>),
    /// `(condition)`
    Parenthesized(Box<SupportsCondition>),
    /// `(condition) and (condition) and (condition) ..`
    And(Vec<SupportsCondition>),
    /// `(condition) or (condition) or (condition) ..`
    Or(Vec<SupportsCondition>),
    /// `property-ident: value` (value can be any tokens)
    Declaration(Declaration),
    /// Any unrecognized syntax
    FutureSyntax(String),
}

impl SupportsCondition {
    /// Parse a condition
    ///
    /// <https://drafts.csswg.org/css-conditional/#supports_condition>
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<SupportsCondition, ParseError<'i>> {
        if input.try_parse(|i| i.expect_ident_matching("not")).is_ok() {
            let inner = SupportsCondition::parse_in_parens(input)?;
            return Ok(SupportsCondition::Not(Box::new(inner)));
        }

        let in_parens = SupportsCondition::parse_in_parens(input)?;

        let location = input.current_source_location();
        let (keyword, is_and) = match input.next() {
            // End of input
            Err(..) => return Ok(in_parens),
            Ok(&Token::Ident(ref ident)) => {
                match_ignore_ascii_case! { &ident,
                    "and" => ("and", true),
                    "or" => ("or", false),
                    _ => return Err(location.new_custom_error(StyleParseErrorKind::UnspecifiedError)),
                }
            },
            Ok(t) => return Err(location.new_unexpected_token_error(t.clone())),
        };

        let mut conditions = Vec::with_capacity(2);
        conditions.push(in_parens);
        loop {
            conditions.push(SupportsCondition::parse_in_parens(input)?);
            if input
                .try_parse(|input| input.expect_ident_matching(keyword))
                .is_err()
            {
                // Did not find the expected keyword.
                // If we found some other token, it will be rejected by
                // `Parser::parse_entirely` somewhere up the stack.
                return Ok(if is_and {
                    SupportsCondition::And(conditions)
                } else {
                    SupportsCondition::Or(conditions)
                });
            }
        }
    }

    /// <https://drafts.csswg.org/css-conditional-3/#supports_condition_in_parens>
    fn parse_in_parens<'i, 't>(input: &mut Parser<'i, 't>) -> Result<SupportsCondition, ParseError<'i>> {
        // Whitespace is normally taken care of in `Parser::next`,
        // but we want to not include it in `pos` for the SupportsCondition::FutureSyntax cases.
        input.skip_whitespace();
        let pos = input.position();
        let location = input.current_source_location();
        match *input.next()? {
            Token::ParenthesisBlock => {
                let nested = input.try_parse(|input| {
                    input.parse_nested_block(parse_condition_or_declaration)
                });
                if nested.is_ok() {
                    return nested;
                }
            },
            Token::Function(_) => {},
            ref t => return Err(location.new_unexpected_token_error(t.clone())),
        }
        input.parse_nested_block(consume_any_value)?;
        Ok(SupportsCondition::FutureSyntax(input.slice_from(pos).to_owned()))
    }

    /// Evaluate a supports condition
    pub fn eval(&self) -> bool {
        match *self {
            SupportsCondition::Not(ref cond) => !cond.eval(),
            SupportsCondition::Parenthesized(ref cond) => cond.eval(),
            SupportsCondition::And(ref vec) => vec.iter().all(|c| c.eval()),
            SupportsCondition::Or(ref vec) => vec.iter().any(|c| c.eval()),
            SupportsCondition::Declaration(ref decl) => decl.eval(),
            SupportsCondition::FutureSyntax(_) => false,
        }
    }
}

/// supports_condition | declaration
/// <https://drafts.csswg.org/css-conditional/#dom-css-supports-conditiontext-conditiontext>
pub fn parse_condition_or_declaration<'i, 't>(
    input: &mut Parser<'i, 't>,
) -> Result<SupportsCondition, ParseError<'i>> {
    if let Ok(condition) = input.try_parse(SupportsCondition::parse) {
        Ok(SupportsCondition::Parenthesized(Box::new(condition)))
    } else {
        Declaration::parse(input).map(SupportsCondition::Declaration)
    }
}

impl ToCss for SupportsCondition {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        match *self {
            SupportsCondition::Not(ref cond) => {
                dest.write_str("not ")?;
                cond.to_css(dest)
            },
            SupportsCondition::Parenthesized(ref cond) => {
                dest.write_char('(')?;
                cond.to_css(dest)?;
                dest.write_char(')')
            },
            SupportsCondition::And(ref vec) => {
                let mut first = true;
                for cond in vec {
                    if !first {
                        dest.write_str(" and ")?;
                    }
                    first = false;
                    cond.to_css(dest)?;
                }
                Ok(())
            },
            SupportsCondition::Or(ref vec) => {
                let mut first = true;
                for cond in vec {
                    if !first {
                        dest.write_str(" or ")?;
                    }
                    first = false;
                    cond.to_css(dest)?;
                }
                Ok(())
            },
            SupportsCondition::Declaration(ref decl) => {
                dest.write_char('(')?;
                decl.to_css(dest)?;
                dest.write_char(')')
            },
            SupportsCondition::FutureSyntax(ref s) => dest.write_str(&s),
        }
    }
}

/// A possibly-invalid property declaration
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration(pub String);

impl ToCss for Declaration {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str(&self.0)
    }
}

/// <https://drafts.csswg.org/css-syntax-3/#typedef-any-value>
fn consume_any_value<'i, 't>(input: &mut Parser<'i, 't>) -> Result<(), ParseError<'i>> {
    while input.next().is_ok() {}
    Ok(())
}

impl Declaration {
    /// Parse a declaration
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Declaration, ParseError<'i>> {
        let pos = input.position();
        input.expect_ident()?;
        input.expect_colon()?;
        consume_any_value(input)?;
        Ok(Declaration(input.slice_from(pos).to_owned()))
    }

    /// Determine if a declaration parses
    ///
    /// <https://drafts.csswg.org/css-conditional-3/#support-definition>
    pub fn eval(&self) -> bool {
        let mut input = ParserInput::new(&self.0);
        let mut input = Parser::new(&mut input);
        input.parse_entirely(parse_supported_declaration).is_ok()
    }
}

fn parse_supported_declaration<'i, 't>(input: &mut Parser<'i, 't>) -> Result<(), ParseError<'i>> {
    let prop = input.expect_ident_cloned()?;
    input.expect_colon()?;

    let id = PropertyId::parse(&prop)
        .map_err(|_| input.new_custom_error(StyleParseErrorKind::UnknownProperty(prop.clone())))?;

    let mut declarations = SourcePropertyDeclaration::new();
    input.parse_until_before(Delimiter::Bang, |input| {
        PropertyDeclaration::parse_into(&mut declarations, id, QuirksMode::NoQuirks, input)
    })?;
    let _ = input.try_parse(parse_important);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> Option<bool> {
        let mut input = ParserInput::new(text);
        Parser::new(&mut input)
            .parse_entirely(SupportsCondition::parse)
            .ok()
            .map(|condition| condition.eval())
    }

    #[test]
    fn supports_declarations() {
        assert_eq!(eval("(color: red)"), Some(true));
        assert_eq!(eval("(colour: red)"), Some(false));
        assert_eq!(eval("not (colour: red)"), Some(true));
        assert_eq!(eval("(color: red) and (margin: 1px)"), Some(true));
        assert_eq!(eval("(colour: red) or (margin: 1px)"), Some(true));
        assert_eq!(eval("(color: red) and (colour: red)"), Some(false));
    }

    #[test]
    fn unknown_syntax_is_false() {
        assert_eq!(eval("selector(div)"), Some(false));
        assert_eq!(eval("(color: red) and"), None);
    }
}
