/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A [`@page`][page] rule.
//!
//! [page]: https://drafts.csswg.org/css2/page.html#page-box

use crate::parser::{ParseError, StyleParseErrorKind};
use crate::properties::PropertyDeclarationBlock;
use crate::Atom;
use cssparser::{match_ignore_ascii_case, serialize_identifier, Parser, SourceLocation, ToCss};
use servo_arc::Arc;
use std::fmt::{self, Write};

/// The page pseudo-classes of a `@page` selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PagePseudoClass {
    First,
    Left,
    Right,
}

impl PagePseudoClass {
    fn as_str(&self) -> &'static str {
        match *self {
            PagePseudoClass::First => ":first",
            PagePseudoClass::Left => ":left",
            PagePseudoClass::Right => ":right",
        }
    }
}

/// A page selector: an optional page name followed by an optional page
/// pseudo-class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageSelector {
    pub name: Option<Atom>,
    pub pseudo: Option<PagePseudoClass>,
}

impl PageSelector {
    /// Parses the prelude of a `@page` rule. An empty prelude gives `None`.
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Option<Self>, ParseError<'i>> {
        let name = input
            .try_parse(|input| input.expect_ident_cloned())
            .ok()
            .map(|name| Atom::from(name.as_ref()));

        let pseudo = input
            .try_parse(|input| -> Result<PagePseudoClass, ParseError<'i>> {
                input.expect_colon()?;
                let location = input.current_source_location();
                let ident = input.expect_ident()?;
                Ok(match_ignore_ascii_case! { &*ident,
                    "first" => PagePseudoClass::First,
                    "left" => PagePseudoClass::Left,
                    "right" => PagePseudoClass::Right,
                    _ => return Err(location.new_custom_error(StyleParseErrorKind::InvalidPageSelector)),
                })
            })
            .ok();

        if !input.is_exhausted() {
            return Err(input.new_custom_error(StyleParseErrorKind::InvalidPageSelector));
        }

        if name.is_none() && pseudo.is_none() {
            return Ok(None);
        }
        Ok(Some(PageSelector { name, pseudo }))
    }

    /// A name counts 4, `:first` 2 and `:left`/`:right` 1.
    pub fn specificity(&self) -> u32 {
        let mut specificity = 0;
        if self.name.is_some() {
            specificity += 4;
        }
        specificity += match self.pseudo {
            Some(PagePseudoClass::First) => 2,
            Some(PagePseudoClass::Left) | Some(PagePseudoClass::Right) => 1,
            None => 0,
        };
        specificity
    }

    /// Whether this selector applies to a page.
    pub fn matches(&self, is_left_page: bool, is_first_page: bool, page_name: Option<&str>) -> bool {
        if let Some(ref name) = self.name {
            if page_name != Some(&**name) {
                return false;
            }
        }
        match self.pseudo {
            None => true,
            Some(PagePseudoClass::First) => is_first_page,
            Some(PagePseudoClass::Left) => is_left_page,
            Some(PagePseudoClass::Right) => !is_left_page,
        }
    }
}

impl ToCss for PageSelector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        if let Some(ref name) = self.name {
            serialize_identifier(name, dest)?;
        }
        if let Some(pseudo) = self.pseudo {
            dest.write_str(pseudo.as_str())?;
        }
        Ok(())
    }
}

/// A [`@page`][page] rule.
///
/// [page]: https://drafts.csswg.org/css2/page.html#page-box
#[derive(Clone, Debug)]
pub struct PageRule {
    pub selector: Option<PageSelector>,
    /// The declaration block this page rule contains.
    pub block: Arc<PropertyDeclarationBlock>,
    /// The source position this rule was found at.
    pub source_location: SourceLocation,
}

impl PageRule {
    pub fn specificity(&self) -> u32 {
        self.selector.as_ref().map_or(0, |s| s.specificity())
    }

    pub fn matches(&self, is_left_page: bool, is_first_page: bool, page_name: Option<&str>) -> bool {
        self.selector
            .as_ref()
            .map_or(true, |s| s.matches(is_left_page, is_first_page, page_name))
    }
}

impl ToCss for PageRule {
    // Serialization of PageRule is not specced, adapted from steps for
    // StyleRule.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@page ")?;
        if let Some(ref selector) = self.selector {
            selector.to_css(dest)?;
            dest.write_char(' ')?;
        }
        dest.write_str("{ ")?;
        self.block.to_css(dest)?;
        if !self.block.is_empty() {
            dest.write_char(' ')?;
        }
        dest.write_char('}')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssparser::ParserInput;

    fn parse(text: &str) -> Option<PageSelector> {
        let mut input = ParserInput::new(text);
        PageSelector::parse(&mut Parser::new(&mut input)).unwrap()
    }

    #[test]
    fn page_selector_specificity() {
        assert!(parse("").is_none());
        assert_eq!(parse(":first").unwrap().specificity(), 2);
        assert_eq!(parse(":left").unwrap().specificity(), 1);
        assert_eq!(parse("cover").unwrap().specificity(), 4);
        assert_eq!(parse("cover:first").unwrap().specificity(), 6);
    }

    #[test]
    fn page_selector_matching() {
        let left = parse(":left").unwrap();
        assert!(left.matches(true, false, None));
        assert!(!left.matches(false, false, None));

        let named = parse("cover").unwrap();
        assert!(named.matches(false, true, Some("cover")));
        assert!(!named.matches(false, true, None));
    }

    #[test]
    fn unknown_page_pseudo_class_is_rejected() {
        let mut input = ParserInput::new(":middle");
        assert!(PageSelector::parse(&mut Parser::new(&mut input)).is_err());
    }
}
