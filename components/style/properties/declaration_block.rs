/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A property declaration block.

#![deny(missing_docs)]

use super::*;
use crate::error_reporting::{ContextualParseError, ParseErrorReporter};
use crate::parser::ParserContext;
use crate::stylesheets::{CssRuleType, Origin, UrlExtraData};
use cssparser::{
    parse_important, AtRuleParser, CowRcStr, DeclarationParser, Delimiter, ParseErrorKind,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};
use itertools::Itertools;
use selectors::matching::QuirksMode;
use std::fmt::{self, Write};

/// A declaration [importance][importance].
///
/// [importance]: https://drafts.csswg.org/css-cascade/#importance
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Importance {
    /// Indicates a declaration without `!important`.
    Normal,

    /// Indicates a declaration with `!important`.
    Important,
}

impl Importance {
    /// Return whether this is an important declaration.
    pub fn important(self) -> bool {
        match self {
            Importance::Normal => false,
            Importance::Important => true,
        }
    }
}

/// An ordered list of longhand declarations, each with its importance.
///
/// A longhand appears at most once.
#[derive(Clone, Default)]
pub struct PropertyDeclarationBlock {
    /// The group of declarations.
    declarations: Vec<PropertyDeclaration>,

    /// The importance of each declaration in `declarations`.
    declarations_importance: Vec<Importance>,

    /// The mode values set through `set_property` are parsed in. It is the
    /// mode the block itself was parsed in.
    quirks_mode: QuirksMode,
}

impl PartialEq for PropertyDeclarationBlock {
    fn eq(&self, other: &Self) -> bool {
        self.declarations == other.declarations &&
            self.declarations_importance == other.declarations_importance
    }
}

impl Eq for PropertyDeclarationBlock {}

impl fmt::Debug for PropertyDeclarationBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.declarations.fmt(f)
    }
}

/// How the border shorthand copes with sides that differ.
#[derive(Clone, Copy, Eq, PartialEq)]
enum CommonValueMode {
    OmitUncommonValues,
    ReturnNullOnUncommonValues,
}

impl PropertyDeclarationBlock {
    /// Create an empty block
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block with a single declaration
    pub fn with_one(declaration: PropertyDeclaration, importance: Importance) -> Self {
        PropertyDeclarationBlock {
            declarations: vec![declaration],
            declarations_importance: vec![importance],
            quirks_mode: QuirksMode::NoQuirks,
        }
    }

    /// An empty block whose later `set_property` calls parse in
    /// `quirks_mode`.
    pub fn with_quirks_mode(quirks_mode: QuirksMode) -> Self {
        PropertyDeclarationBlock {
            quirks_mode,
            ..Self::default()
        }
    }

    /// The mode this block parses values in.
    #[inline]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Returns the number of declarations in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the block has no declarations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// The declarations in this block
    #[inline]
    pub fn declarations(&self) -> &[PropertyDeclaration] {
        &self.declarations
    }

    /// Iterate over `(PropertyDeclaration, Importance)` pairs
    #[inline]
    pub fn declaration_importance_iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = (&PropertyDeclaration, Importance)> {
        self.declarations
            .iter()
            .zip(self.declarations_importance.iter().copied())
    }

    /// Returns whether this block contains any declaration with `!important`.
    #[inline]
    pub fn any_important(&self) -> bool {
        self.declarations_importance.iter().any(|i| i.important())
    }

    /// Returns whether this block contains any declaration without `!important`.
    #[inline]
    pub fn any_normal(&self) -> bool {
        self.declarations_importance.iter().any(|i| !i.important())
    }

    fn position(&self, id: LonghandId) -> Option<usize> {
        self.declarations.iter().position(|d| d.id() == id)
    }

    /// Returns whether this block contains a declaration of a given longhand.
    #[inline]
    pub fn contains(&self, id: LonghandId) -> bool {
        self.position(id).is_some()
    }

    /// Get a declaration for a given longhand.
    pub fn get(&self, id: LonghandId) -> Option<(&PropertyDeclaration, Importance)> {
        let index = self.position(id)?;
        Some((&self.declarations[index], self.declarations_importance[index]))
    }

    /// Whether the declaration of `id` was filled in by a shorthand.
    pub fn is_property_implicit(&self, id: LonghandId) -> bool {
        self.get(id).map_or(false, |(d, _)| d.is_implicit())
    }

    /// The shorthand the declaration of `id` came from, if any.
    pub fn property_shorthand(&self, id: LonghandId) -> Option<ShorthandId> {
        self.get(id).and_then(|(d, _)| d.shorthand())
    }

    /// The importance of a property. A shorthand is important when all its
    /// longhands are.
    pub fn get_property_priority(&self, property: &PropertyId) -> Importance {
        match *property {
            PropertyId::Longhand(id) => self.get(id).map_or(Importance::Normal, |(_, i)| i),
            PropertyId::Shorthand(id) => {
                let all_important = id
                    .longhands()
                    .iter()
                    .all(|&longhand| self.get(longhand).map_or(false, |(_, i)| i.important()));
                if all_important {
                    Importance::Important
                } else {
                    Importance::Normal
                }
            },
        }
    }

    /// The serialized value of a property, or `None` when the block can not
    /// express it.
    pub fn get_property_value(&self, property: &PropertyId) -> Option<String> {
        let shorthand = match *property {
            PropertyId::Longhand(id) => {
                return self.get(id).map(|(d, _)| d.value().text().to_owned());
            },
            PropertyId::Shorthand(id) => id,
        };
        match shorthand {
            ShorthandId::Margin |
            ShorthandId::Padding |
            ShorthandId::BorderWidth |
            ShorthandId::BorderStyle |
            ShorthandId::BorderColor => self.get4_values(shorthand),
            ShorthandId::Border => self.border_property_value(CommonValueMode::OmitUncommonValues),
            ShorthandId::Transition | ShorthandId::WebkitTransition => {
                self.get_layered_shorthand_value(shorthand)
            },
            ShorthandId::BorderTop |
            ShorthandId::BorderRight |
            ShorthandId::BorderBottom |
            ShorthandId::BorderLeft |
            ShorthandId::Outline |
            ShorthandId::ListStyle => self.get_shorthand_value(shorthand),
        }
    }

    /// The longhands of `shorthand`, when all are present with the same
    /// importance.
    fn complete_longhands(
        &self,
        shorthand: ShorthandId,
    ) -> Option<(Vec<&PropertyDeclaration>, Importance)> {
        let mut importance = None;
        let mut list = Vec::with_capacity(shorthand.longhands().len());
        for &longhand in shorthand.longhands() {
            let (declaration, this_importance) = self.get(longhand)?;
            if *importance.get_or_insert(this_importance) != this_importance {
                return None;
            }
            list.push(declaration);
        }
        Some((list, importance?))
    }

    /// `inherit` or `initial` when every longhand says so, `None` if only
    /// some do, or an empty string when none does.
    fn css_wide_value(list: &[&PropertyDeclaration]) -> Option<&'static str> {
        if list.iter().all(|d| d.value().is_inherit()) {
            return Some("inherit");
        }
        if list.iter().all(|d| d.value().is_initial()) {
            if list.first().map_or(false, |d| !d.is_implicit()) {
                return Some("initial");
            }
            return None;
        }
        let explicit_css_wide = list.iter().any(|d| {
            d.value().is_inherit() || (d.value().is_initial() && !d.is_implicit())
        });
        if explicit_css_wide {
            return None;
        }
        Some("")
    }

    /// `top right bottom left`, dropping the values the others imply.
    fn get4_values(&self, shorthand: ShorthandId) -> Option<String> {
        let (list, _) = self.complete_longhands(shorthand)?;
        match Self::css_wide_value(&list)? {
            "" => {},
            keyword => return Some(keyword.to_owned()),
        }
        if list.iter().any(|d| d.value().is_initial()) {
            return None;
        }
        let (top, right, bottom, left) = (list[0].value(), list[1].value(), list[2].value(), list[3].value());
        let show_left = right != left;
        let show_bottom = top != bottom || show_left;
        let show_right = top != right || show_bottom;

        let mut result = top.text().to_owned();
        if show_right {
            result.push(' ');
            result.push_str(right.text());
        }
        if show_bottom {
            result.push(' ');
            result.push_str(bottom.text());
        }
        if show_left {
            result.push(' ');
            result.push_str(left.text());
        }
        Some(result)
    }

    /// The explicit longhand values, space-separated.
    fn get_shorthand_value(&self, shorthand: ShorthandId) -> Option<String> {
        let (list, _) = self.complete_longhands(shorthand)?;
        match Self::css_wide_value(&list)? {
            "" => {},
            keyword => return Some(keyword.to_owned()),
        }
        let result = list
            .iter()
            .filter(|d| !d.is_implicit())
            .map(|d| d.value().text())
            .join(" ");
        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    /// Like `get_shorthand_value`, one comma-separated layer at a time.
    fn get_layered_shorthand_value(&self, shorthand: ShorthandId) -> Option<String> {
        let (list, _) = self.complete_longhands(shorthand)?;
        match Self::css_wide_value(&list)? {
            "" => {},
            keyword => return Some(keyword.to_owned()),
        }
        let layers: Vec<Vec<&str>> = list
            .iter()
            .filter(|d| !d.is_implicit())
            .map(|d| d.value().text().split(',').map(str::trim).collect())
            .collect();
        let count = layers.first()?.len();
        if layers.iter().any(|layer| layer.len() != count) {
            return None;
        }
        Some(
            (0..count)
                .map(|index| layers.iter().map(|layer| layer[index]).join(" "))
                .join(", "),
        )
    }

    /// The value shared by every longhand of `shorthand`, if there is one.
    fn get_common_value(&self, shorthand: ShorthandId) -> Option<String> {
        let (list, _) = self.complete_longhands(shorthand)?;
        let first = list[0].value().text();
        if list.iter().all(|d| d.value().text() == first) {
            Some(first.to_owned())
        } else {
            None
        }
    }

    fn border_property_value(&self, mode: CommonValueMode) -> Option<String> {
        let mut common_value: Option<String> = None;
        let mut result: Vec<String> = vec![];
        let groups = [
            ShorthandId::BorderWidth,
            ShorthandId::BorderStyle,
            ShorthandId::BorderColor,
        ];
        for (index, &group) in groups.iter().enumerate() {
            let value = match self.get_common_value(group) {
                Some(value) => value,
                None => {
                    if mode == CommonValueMode::ReturnNullOnUncommonValues {
                        return None;
                    }
                    common_value = None;
                    continue;
                },
            };
            if index == 0 {
                common_value = Some(value.clone());
            } else if common_value.as_ref() != Some(&value) {
                common_value = None;
            }
            if value == "initial" {
                continue;
            }
            if value == "inherit" {
                // Only expressible when every group inherits.
                continue;
            }
            result.push(value);
        }
        match common_value.as_deref() {
            Some("initial") | Some("inherit") => return common_value,
            _ => {},
        }
        let any_inherit = groups
            .iter()
            .any(|&group| self.get_common_value(group).as_deref() == Some("inherit"));
        if any_inherit || result.is_empty() {
            return None;
        }
        if mode == CommonValueMode::ReturnNullOnUncommonValues &&
            self.complete_longhands(ShorthandId::Border).is_none()
        {
            return None;
        }
        Some(result.join(" "))
    }

    /// Adds a declaration produced by the parser. A normal declaration does
    /// not override an important one.
    pub fn add_parsed_property(&mut self, declaration: PropertyDeclaration, importance: Importance) {
        let existing_important = self
            .get(declaration.id())
            .map_or(false, |(_, i)| i.important());
        if !existing_important || importance.important() {
            self.set_parsed_declaration(declaration, importance);
        }
    }

    /// Replaces the declaration of the same longhand in place, or appends.
    /// Keeps the `-webkit-` twin of the property in sync.
    pub fn set_parsed_declaration(&mut self, declaration: PropertyDeclaration, importance: Importance) {
        let id = declaration.id();
        let variant = id.prefixing_variant();
        if let Some(index) = self.position(id) {
            if variant != id {
                if let Some(twin) = self.position(variant) {
                    self.declarations[twin] = declaration.with_id(variant);
                    self.declarations_importance[twin] = importance;
                }
            }
            self.declarations[index] = declaration;
            self.declarations_importance[index] = importance;
            return;
        }
        if variant != id {
            let twin = declaration.with_id(variant);
            self.push(declaration, importance);
            self.push(twin, importance);
        } else {
            self.push(declaration, importance);
        }
    }

    fn push(&mut self, declaration: PropertyDeclaration, importance: Importance) {
        if let Some(index) = self.position(declaration.id()) {
            self.declarations[index] = declaration;
            self.declarations_importance[index] = importance;
            return;
        }
        self.declarations.push(declaration);
        self.declarations_importance.push(importance);
    }

    /// Adds the declarations produced by parsing a single source
    /// declaration.
    pub fn extend(
        &mut self,
        declarations: impl IntoIterator<Item = PropertyDeclaration>,
        importance: Importance,
    ) {
        for declaration in declarations {
            self.add_parsed_property(declaration, importance);
        }
    }

    /// Parses `value` and sets `property` to it. An empty value removes the
    /// property. Returns whether the value parsed.
    pub fn set_property(
        &mut self,
        property: PropertyId,
        value: &str,
        importance: Importance,
        url_data: &UrlExtraData,
    ) -> bool {
        if value.trim().is_empty() {
            self.remove_property(&property);
            return true;
        }
        let mut declarations = SourcePropertyDeclaration::new();
        if parse_one_declaration_into(
            &mut declarations,
            property,
            value,
            url_data,
            None,
            self.quirks_mode,
        )
        .is_err()
        {
            return false;
        }
        if let PropertyId::Shorthand(shorthand) = property {
            self.remove_properties_in_set(shorthand.longhands());
        }
        for declaration in declarations.drain() {
            self.set_parsed_declaration(declaration, importance);
        }
        true
    }

    /// Removes a property. Returns the old value of a removed longhand, an
    /// empty string for a removed shorthand, or `None` if nothing was
    /// removed.
    pub fn remove_property(&mut self, property: &PropertyId) -> Option<String> {
        match *property {
            PropertyId::Shorthand(shorthand) => {
                let mut removed = self.remove_properties_in_set(shorthand.longhands());
                let variant = shorthand.prefixing_variant();
                if variant != shorthand {
                    removed |= self.remove_properties_in_set(variant.longhands());
                }
                if removed {
                    Some(String::new())
                } else {
                    None
                }
            },
            PropertyId::Longhand(id) => {
                let index = self.position(id)?;
                let old = self.declarations[index].value().text().to_owned();
                self.remove_declaration_at(index);
                let variant = id.prefixing_variant();
                if variant != id {
                    if let Some(twin) = self.position(variant) {
                        self.remove_declaration_at(twin);
                    }
                }
                Some(old)
            },
        }
    }

    fn remove_declaration_at(&mut self, index: usize) {
        self.declarations.remove(index);
        self.declarations_importance.remove(index);
    }

    /// Removes every declaration of the given longhands. Returns whether any
    /// was present.
    pub fn remove_properties_in_set(&mut self, set: &[LonghandId]) -> bool {
        let before = self.len();
        let mut index = 0;
        while index < self.declarations.len() {
            if set.contains(&self.declarations[index].id()) {
                self.remove_declaration_at(index);
            } else {
                index += 1;
            }
        }
        before != self.len()
    }

    /// Adds every declaration of `other`, replacing ours on conflict unless
    /// ours is important and theirs is not.
    pub fn merge_and_override(&mut self, other: &PropertyDeclarationBlock) {
        for (declaration, importance) in other.declaration_importance_iter() {
            self.add_parsed_property(declaration.clone(), importance);
        }
    }

    /// A new block with the declarations of the given longhands only.
    pub fn copy_properties_in_set(&self, set: &[LonghandId]) -> Self {
        let mut block = PropertyDeclarationBlock::with_quirks_mode(self.quirks_mode);
        for &id in set {
            if let Some((declaration, importance)) = self.get(id) {
                block.push(declaration.clone(), importance);
            }
        }
        block
    }

    /// Releases unused capacity.
    pub fn shrink_to_fit(&mut self) {
        self.declarations.shrink_to_fit();
        self.declarations_importance.shrink_to_fit();
    }

    /// The shorthands worth trying for `id` when serializing, by preference.
    fn serialization_candidates(id: LonghandId) -> SmallVec<[ShorthandId; 3]> {
        let mut candidates: SmallVec<[ShorthandId; 3]> = id.shorthands().collect();
        // `border` first, then the per-property group, then the side.
        candidates.sort_by_key(|shorthand| match *shorthand {
            ShorthandId::Border => 0,
            ShorthandId::BorderWidth | ShorthandId::BorderStyle | ShorthandId::BorderColor => 1,
            _ => 2,
        });
        candidates
    }

    fn serialization_value(&self, shorthand: ShorthandId) -> Option<String> {
        match shorthand {
            ShorthandId::Border => {
                self.border_property_value(CommonValueMode::ReturnNullOnUncommonValues)
            },
            _ => self.get_property_value(&PropertyId::Shorthand(shorthand)),
        }
    }
}

impl ToCss for PropertyDeclarationBlock {
    /// Serializes the block, folding longhands into shorthands wherever the
    /// shorthand can express them.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut used: SmallVec<[ShorthandId; 8]> = SmallVec::new();
        let mut tried: SmallVec<[ShorthandId; 8]> = SmallVec::new();
        let mut is_first_serialization = true;

        for (declaration, importance) in self.declaration_importance_iter() {
            let candidates = Self::serialization_candidates(declaration.id());
            if candidates.iter().any(|s| used.contains(s)) {
                continue;
            }

            let mut shorthand_value = None;
            for &shorthand in &candidates {
                if tried.contains(&shorthand) {
                    continue;
                }
                tried.push(shorthand);
                if let Some(value) = self.serialization_value(shorthand) {
                    shorthand_value = Some((shorthand, value));
                    break;
                }
            }

            let (name, value) = match shorthand_value {
                Some((shorthand, value)) => {
                    used.push(shorthand);
                    (shorthand.name(), value)
                },
                None => {
                    if declaration.is_implicit() {
                        continue;
                    }
                    (declaration.id().name(), declaration.value().text().to_owned())
                },
            };

            if !is_first_serialization {
                dest.write_char(' ')?;
            }
            is_first_serialization = false;
            dest.write_str(name)?;
            dest.write_str(": ")?;
            dest.write_str(&value)?;
            if importance.important() {
                dest.write_str(" !important")?;
            }
            dest.write_char(';')?;
        }
        Ok(())
    }
}

/// Parses the `style` attribute of an element.
pub fn parse_style_attribute(
    input: &str,
    url_data: &UrlExtraData,
    error_reporter: Option<&dyn ParseErrorReporter>,
    quirks_mode: QuirksMode,
) -> PropertyDeclarationBlock {
    let context = ParserContext::new(
        Origin::Author,
        url_data,
        Some(CssRuleType::Style),
        quirks_mode,
        error_reporter,
    );

    let mut input = ParserInput::new(input);
    parse_property_declaration_list(&context, &mut Parser::new(&mut input))
}

/// Parse a given property declaration. Can result in multiple
/// `PropertyDeclaration`s when expanding a shorthand, for example.
///
/// This does not attempt to parse !important at all.
pub fn parse_one_declaration_into(
    declarations: &mut SourcePropertyDeclaration,
    id: PropertyId,
    input: &str,
    url_data: &UrlExtraData,
    error_reporter: Option<&dyn ParseErrorReporter>,
    quirks_mode: QuirksMode,
) -> Result<(), ()> {
    let context = ParserContext::new(
        Origin::Author,
        url_data,
        Some(CssRuleType::Style),
        quirks_mode,
        error_reporter,
    );

    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);
    let start_position = parser.position();
    parser
        .parse_entirely(|parser| {
            PropertyDeclaration::parse_into(declarations, id, context.quirks_mode, parser)
        })
        .map_err(|err| {
            if context.error_reporting_enabled() {
                report_one_css_error(&context, err, parser.slice_from(start_position))
            }
        })
}

/// A struct to parse property declarations.
struct PropertyDeclarationParser<'a> {
    declarations: &'a mut SourcePropertyDeclaration,
    quirks_mode: QuirksMode,
}

/// Default methods reject all at rules.
impl<'a, 'i> AtRuleParser<'i> for PropertyDeclarationParser<'a> {
    type Prelude = ();
    type AtRule = Importance;
    type Error = StyleParseErrorKind<'i>;
}

/// Default methods reject all rules.
impl<'a, 'i> QualifiedRuleParser<'i> for PropertyDeclarationParser<'a> {
    type Prelude = ();
    type QualifiedRule = Importance;
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'i> DeclarationParser<'i> for PropertyDeclarationParser<'a> {
    type Declaration = Importance;
    type Error = StyleParseErrorKind<'i>;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<Importance, ParseError<'i>> {
        let id = match PropertyId::parse(&name) {
            Ok(id) => id,
            Err(..) => {
                return Err(input.new_custom_error(StyleParseErrorKind::UnknownProperty(name)));
            },
        };
        input.parse_until_before(Delimiter::Bang, |input| {
            PropertyDeclaration::parse_into(self.declarations, id, self.quirks_mode, input)
        })?;
        let importance = match input.try_parse(parse_important) {
            Ok(()) => Importance::Important,
            Err(_) => Importance::Normal,
        };
        // In case there is still unparsed text in the declaration, we should roll back.
        input.expect_exhausted()?;
        Ok(importance)
    }
}

impl<'a, 'i> RuleBodyItemParser<'i, Importance, StyleParseErrorKind<'i>>
    for PropertyDeclarationParser<'a>
{
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Vendor-prefixed properties we do not know are common enough that
/// reporting them is noise.
fn is_vendor_identifier(name: &str) -> bool {
    name.starts_with('-') || name.starts_with('_')
}

#[cold]
fn report_one_css_error<'i>(context: &ParserContext, error: ParseError<'i>, slice: &str) {
    debug_assert!(context.error_reporting_enabled());

    if let ParseErrorKind::Custom(StyleParseErrorKind::UnknownProperty(ref name)) = error.kind {
        if is_vendor_identifier(name) {
            return;
        }
    }

    let location = error.location;
    let error = ContextualParseError::UnsupportedPropertyDeclaration(slice, error);
    context.log_css_error(location, error);
}

/// Parse a list of property declarations and return a property declaration
/// block.
pub fn parse_property_declaration_list(
    context: &ParserContext,
    input: &mut Parser,
) -> PropertyDeclarationBlock {
    let mut declarations = SourcePropertyDeclaration::new();
    let mut block = PropertyDeclarationBlock::with_quirks_mode(context.quirks_mode);
    let mut parser = PropertyDeclarationParser {
        declarations: &mut declarations,
        quirks_mode: context.quirks_mode,
    };
    let mut iter = RuleBodyParser::new(input, &mut parser);
    while let Some(declaration) = iter.next() {
        match declaration {
            Ok(importance) => {
                block.extend(iter.parser.declarations.drain(), importance);
            },
            Err((error, slice)) => {
                iter.parser.declarations.clear();
                if context.error_reporting_enabled() {
                    report_one_css_error(context, error, slice);
                }
            },
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url() -> UrlExtraData {
        UrlExtraData::new(Url::parse("http://example.com/").unwrap())
    }

    fn parse(css: &str) -> PropertyDeclarationBlock {
        parse_style_attribute(css, &url(), None, QuirksMode::NoQuirks)
    }

    #[test]
    fn margin_folds_back() {
        let block = parse("margin: 1px 2px 3px 4px");
        assert_eq!(block.len(), 4);
        assert_eq!(block.to_css_string(), "margin: 1px 2px 3px 4px;");

        let block = parse("margin-top: 1px; margin-right: 2px; margin-bottom: 1px; margin-left: 2px");
        assert_eq!(block.to_css_string(), "margin: 1px 2px;");
    }

    #[test]
    fn missing_longhand_prevents_folding() {
        let block = parse("margin-top: 1px; margin-right: 1px; margin-bottom: 1px");
        assert_eq!(
            block.to_css_string(),
            "margin-top: 1px; margin-right: 1px; margin-bottom: 1px;"
        );
        assert_eq!(block.get_property_value(&PropertyId::Shorthand(ShorthandId::Margin)), None);
    }

    #[test]
    fn mixed_importance_prevents_folding() {
        let block = parse("margin: 1px; margin-left: 2px !important");
        assert_eq!(block.get_property_value(&PropertyId::Shorthand(ShorthandId::Margin)), None);
        assert_eq!(
            block.get_property_priority(&PropertyId::Longhand(LonghandId::MarginLeft)),
            Importance::Important
        );
    }

    #[test]
    fn normal_does_not_override_important() {
        let block = parse("color: red !important; color: blue");
        assert_eq!(block.to_css_string(), "color: red !important;");
        let block = parse("color: red; color: blue");
        assert_eq!(block.to_css_string(), "color: blue;");
    }

    #[test]
    fn border_serialization() {
        let block = parse("border: 1px solid red");
        assert_eq!(block.len(), 12);
        assert_eq!(block.to_css_string(), "border: 1px solid red;");

        let block = parse("border: 1px solid");
        assert_eq!(block.to_css_string(), "border: 1px solid;");

        let block = parse("border: 1px solid red; border-left-color: blue");
        assert_eq!(
            block.to_css_string(),
            "border-width: 1px; border-style: solid; border-color: red red red blue;"
        );
    }

    #[test]
    fn css_wide_keywords() {
        let block = parse("padding: inherit");
        assert_eq!(block.to_css_string(), "padding: inherit;");
        let block = parse("outline: initial");
        assert_eq!(block.to_css_string(), "outline: initial;");
    }

    #[test]
    fn transition_keeps_prefixed_twin_in_sync() {
        let mut block = parse("transition-duration: 1s");
        assert_eq!(block.len(), 2);
        assert!(block.contains(LonghandId::WebkitTransitionDuration));
        assert!(block.set_property(
            PropertyId::Longhand(LonghandId::TransitionDuration),
            "2s",
            Importance::Normal,
            &url(),
        ));
        assert_eq!(
            block.get_property_value(&PropertyId::Longhand(LonghandId::WebkitTransitionDuration)),
            Some("2s".to_owned())
        );
        block.remove_property(&PropertyId::Longhand(LonghandId::TransitionDuration));
        assert!(block.is_empty());
    }

    #[test]
    fn set_property_parses_in_the_mode_of_the_block() {
        let mut quirky = parse_style_attribute("margin: 1 2", &url(), None, QuirksMode::Quirks);
        assert_eq!(quirky.quirks_mode(), QuirksMode::Quirks);
        assert_eq!(
            quirky.get_property_value(&PropertyId::Shorthand(ShorthandId::Margin)),
            Some("1px 2px".to_owned())
        );
        assert!(quirky.set_property(
            PropertyId::Longhand(LonghandId::Width),
            "10",
            Importance::Normal,
            &url(),
        ));
        assert_eq!(
            quirky.get_property_value(&PropertyId::Longhand(LonghandId::Width)),
            Some("10px".to_owned())
        );
        let copy = quirky.copy_properties_in_set(&[LonghandId::Width]);
        assert_eq!(copy.quirks_mode(), QuirksMode::Quirks);

        let mut strict = parse("margin: 1 2; color: red");
        assert_eq!(strict.to_css_string(), "color: red;");
        assert!(!strict.set_property(
            PropertyId::Longhand(LonghandId::Width),
            "10",
            Importance::Normal,
            &url(),
        ));
        assert!(!strict.contains(LonghandId::Width));
    }

    #[test]
    fn set_and_remove() {
        let mut block = parse("color: red");
        assert!(!block.set_property(
            PropertyId::Longhand(LonghandId::Color),
            "nonsense",
            Importance::Normal,
            &url(),
        ));
        assert!(block.set_property(
            PropertyId::Shorthand(ShorthandId::Padding),
            "1px",
            Importance::Important,
            &url(),
        ));
        assert_eq!(block.to_css_string(), "color: red; padding: 1px !important;");
        assert_eq!(
            block.remove_property(&PropertyId::Longhand(LonghandId::Color)),
            Some("red".to_owned())
        );
        assert_eq!(
            block.remove_property(&PropertyId::Shorthand(ShorthandId::Padding)),
            Some(String::new())
        );
        assert_eq!(block.remove_property(&PropertyId::Shorthand(ShorthandId::Padding)), None);
        assert!(block.is_empty());
    }

    #[test]
    fn merge_and_copy() {
        let mut block = parse("color: red !important; display: block");
        block.merge_and_override(&parse("color: blue; display: inline; float: left"));
        assert_eq!(
            block.to_css_string(),
            "color: red !important; display: inline; float: left;"
        );
        let copy = block.copy_properties_in_set(&[LonghandId::Float, LonghandId::Width]);
        assert_eq!(copy.to_css_string(), "float: left;");
    }

    #[test]
    fn serialization_round_trips() {
        for css in [
            "margin: 1px 2px 3px; color: red !important;",
            "border-top: 2px dotted; list-style: square inside;",
            "transition: opacity 1s, color 2s ease-in;",
        ] {
            let block = parse(css);
            let reparsed = parse(&block.to_css_string());
            assert_eq!(
                block.declarations().iter().map(|d| (d.id(), d.value().clone())).collect::<Vec<_>>(),
                reparsed.declarations().iter().map(|d| (d.id(), d.value().clone())).collect::<Vec<_>>(),
                "{}",
                css
            );
        }
    }
}
