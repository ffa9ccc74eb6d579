/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The pieces of the selector parser that depend on the stylesheet.

use crate::Atom;
use crate::namespaces::Namespaces;
use crate::parser::StyleParseErrorKind;
use cssparser::{Parser as CssParser, ParserInput};
use selectors::SelectorList;
use selectors::parser::Parser;

/// Parses selectors against the namespaces of a stylesheet.
pub struct SelectorParser<'a> {
    pub namespaces: &'a Namespaces,
}

impl<'a> SelectorParser<'a> {
    /// Parses a selector list on its own, as `querySelector` does. Selectors
    /// using namespace prefixes fail since no `@namespace` rule applies.
    pub fn parse_author_origin_no_namespace(input: &str) -> Result<SelectorList, ()> {
        let namespaces = Namespaces::default();
        let parser = SelectorParser {
            namespaces: &namespaces,
        };
        let mut input = ParserInput::new(input);
        SelectorList::parse(&parser, &mut CssParser::new(&mut input)).map_err(|_| ())
    }
}

impl<'a, 'i> Parser<'i> for SelectorParser<'a> {
    type Error = StyleParseErrorKind<'i>;

    fn default_namespace(&self) -> Option<Atom> {
        self.namespaces.default.clone()
    }

    fn namespace_for_prefix(&self, prefix: &Atom) -> Option<Atom> {
        self.namespaces.prefixes.get(prefix).cloned()
    }
}
