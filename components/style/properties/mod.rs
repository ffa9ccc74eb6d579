/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Supported CSS properties and the cascade.
//!
//! Longhands keep the source text of their specified value, once validated
//! against the grammar in [`values`]. Shorthands are expanded at parse time
//! into their longhands, and folded back when a block is serialized.

pub mod cascade;
pub mod declaration_block;
mod shorthands;
pub mod values;

pub use self::cascade::{ComputedValues, InsideLink};
pub use self::declaration_block::{
    parse_one_declaration_into, parse_property_declaration_list, parse_style_attribute,
    Importance, PropertyDeclarationBlock,
};

use self::values::ValueKind;
use self::values::{BORDER_STYLES, OUTLINE_STYLES};
use crate::parser::{ParseError, StyleParseErrorKind};
use cssparser::{Parser, ParserInput, ToCss};
use selectors::matching::QuirksMode;
use smallvec::SmallVec;
use std::fmt;

macro_rules! longhands {
    ($(
        $name:literal => $ident:ident {
            inherited: $inherited:literal,
            initial: $initial:literal,
            kind: $kind:expr $(,)?
        }
    ),+ $(,)?) => {
        /// An identifier for a longhand property.
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum LonghandId {
            $( $ident, )+
        }

        impl LonghandId {
            /// Every longhand, in declaration order.
            pub const ALL: &'static [LonghandId] = &[ $( LonghandId::$ident, )+ ];

            /// The number of longhands.
            pub const COUNT: usize = Self::ALL.len();

            /// The property name, in lowercase.
            pub fn name(self) -> &'static str {
                match self { $( LonghandId::$ident => $name, )+ }
            }

            /// Whether the property inherits by default.
            pub fn inherited(self) -> bool {
                match self { $( LonghandId::$ident => $inherited, )+ }
            }

            /// The computed value of the property on the root element when
            /// nothing sets it.
            pub fn initial_value(self) -> &'static str {
                match self { $( LonghandId::$ident => $initial, )+ }
            }

            /// The grammar of the property.
            pub fn value_kind(self) -> ValueKind {
                match self { $( LonghandId::$ident => $kind, )+ }
            }
        }
    };
}

macro_rules! shorthands {
    ($( $name:literal => $ident:ident [ $( $longhand:ident ),+ $(,)? ] ),+ $(,)?) => {
        /// An identifier for a shorthand property.
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum ShorthandId {
            $( $ident, )+
        }

        impl ShorthandId {
            /// Every shorthand.
            pub const ALL: &'static [ShorthandId] = &[ $( ShorthandId::$ident, )+ ];

            /// The property name, in lowercase.
            pub fn name(self) -> &'static str {
                match self { $( ShorthandId::$ident => $name, )+ }
            }

            /// The longhands this shorthand sets, in canonical order.
            pub fn longhands(self) -> &'static [LonghandId] {
                match self {
                    $( ShorthandId::$ident => &[ $( LonghandId::$longhand, )+ ], )+
                }
            }
        }
    };
}

const DISPLAY_KEYWORDS: &[&str] = &[
    "inline",
    "block",
    "list-item",
    "inline-block",
    "table",
    "inline-table",
    "table-row-group",
    "table-header-group",
    "table-footer-group",
    "table-row",
    "table-column-group",
    "table-column",
    "table-cell",
    "table-caption",
    "flex",
    "inline-flex",
    "-webkit-box",
    "-webkit-inline-box",
    "none",
];

const LIST_STYLE_TYPES: &[&str] = &[
    "disc",
    "circle",
    "square",
    "decimal",
    "decimal-leading-zero",
    "lower-roman",
    "upper-roman",
    "lower-greek",
    "lower-alpha",
    "lower-latin",
    "upper-alpha",
    "upper-latin",
    "armenian",
    "georgian",
    "none",
];

longhands! {
    "color" => Color { inherited: true, initial: "black", kind: ValueKind::Color },
    "background-color" => BackgroundColor {
        inherited: false, initial: "transparent", kind: ValueKind::Color,
    },
    "background-image" => BackgroundImage {
        inherited: false, initial: "none", kind: ValueKind::Image,
    },
    "display" => Display {
        inherited: false, initial: "inline", kind: ValueKind::Keyword(DISPLAY_KEYWORDS),
    },
    "position" => Position {
        inherited: false,
        initial: "static",
        kind: ValueKind::Keyword(&["static", "relative", "absolute", "fixed"]),
    },
    "float" => Float {
        inherited: false, initial: "none", kind: ValueKind::Keyword(&["none", "left", "right"]),
    },
    "clear" => Clear {
        inherited: false,
        initial: "none",
        kind: ValueKind::Keyword(&["none", "left", "right", "both"]),
    },
    "visibility" => Visibility {
        inherited: true,
        initial: "visible",
        kind: ValueKind::Keyword(&["visible", "hidden", "collapse"]),
    },
    "width" => Width { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "height" => Height { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "top" => Top { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "right" => Right { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "bottom" => Bottom { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "left" => Left { inherited: false, initial: "auto", kind: ValueKind::LengthPercentageOrAuto },
    "margin-top" => MarginTop {
        inherited: false, initial: "0px", kind: ValueKind::LengthPercentageOrAuto,
    },
    "margin-right" => MarginRight {
        inherited: false, initial: "0px", kind: ValueKind::LengthPercentageOrAuto,
    },
    "margin-bottom" => MarginBottom {
        inherited: false, initial: "0px", kind: ValueKind::LengthPercentageOrAuto,
    },
    "margin-left" => MarginLeft {
        inherited: false, initial: "0px", kind: ValueKind::LengthPercentageOrAuto,
    },
    "padding-top" => PaddingTop {
        inherited: false, initial: "0px", kind: ValueKind::NonNegativeLengthPercentage,
    },
    "padding-right" => PaddingRight {
        inherited: false, initial: "0px", kind: ValueKind::NonNegativeLengthPercentage,
    },
    "padding-bottom" => PaddingBottom {
        inherited: false, initial: "0px", kind: ValueKind::NonNegativeLengthPercentage,
    },
    "padding-left" => PaddingLeft {
        inherited: false, initial: "0px", kind: ValueKind::NonNegativeLengthPercentage,
    },
    "border-top-width" => BorderTopWidth {
        inherited: false, initial: "medium", kind: ValueKind::LineWidth,
    },
    "border-right-width" => BorderRightWidth {
        inherited: false, initial: "medium", kind: ValueKind::LineWidth,
    },
    "border-bottom-width" => BorderBottomWidth {
        inherited: false, initial: "medium", kind: ValueKind::LineWidth,
    },
    "border-left-width" => BorderLeftWidth {
        inherited: false, initial: "medium", kind: ValueKind::LineWidth,
    },
    "border-top-style" => BorderTopStyle {
        inherited: false, initial: "none", kind: ValueKind::Keyword(BORDER_STYLES),
    },
    "border-right-style" => BorderRightStyle {
        inherited: false, initial: "none", kind: ValueKind::Keyword(BORDER_STYLES),
    },
    "border-bottom-style" => BorderBottomStyle {
        inherited: false, initial: "none", kind: ValueKind::Keyword(BORDER_STYLES),
    },
    "border-left-style" => BorderLeftStyle {
        inherited: false, initial: "none", kind: ValueKind::Keyword(BORDER_STYLES),
    },
    "border-top-color" => BorderTopColor {
        inherited: false, initial: "currentcolor", kind: ValueKind::Color,
    },
    "border-right-color" => BorderRightColor {
        inherited: false, initial: "currentcolor", kind: ValueKind::Color,
    },
    "border-bottom-color" => BorderBottomColor {
        inherited: false, initial: "currentcolor", kind: ValueKind::Color,
    },
    "border-left-color" => BorderLeftColor {
        inherited: false, initial: "currentcolor", kind: ValueKind::Color,
    },
    "outline-color" => OutlineColor {
        inherited: false, initial: "currentcolor", kind: ValueKind::Color,
    },
    "outline-style" => OutlineStyle {
        inherited: false, initial: "none", kind: ValueKind::Keyword(OUTLINE_STYLES),
    },
    "outline-width" => OutlineWidth {
        inherited: false, initial: "medium", kind: ValueKind::LineWidth,
    },
    "outline-offset" => OutlineOffset { inherited: false, initial: "0px", kind: ValueKind::Length },
    "font-family" => FontFamily { inherited: true, initial: "serif", kind: ValueKind::Any },
    "font-size" => FontSize { inherited: true, initial: "medium", kind: ValueKind::FontSize },
    "font-style" => FontStyle {
        inherited: true,
        initial: "normal",
        kind: ValueKind::Keyword(&["normal", "italic", "oblique"]),
    },
    "font-variant" => FontVariant {
        inherited: true, initial: "normal", kind: ValueKind::Keyword(&["normal", "small-caps"]),
    },
    "font-weight" => FontWeight { inherited: true, initial: "normal", kind: ValueKind::FontWeight },
    "line-height" => LineHeight { inherited: true, initial: "normal", kind: ValueKind::LineHeight },
    "text-align" => TextAlign {
        inherited: true,
        initial: "start",
        kind: ValueKind::Keyword(&[
            "start", "end", "left", "right", "center", "justify", "-webkit-auto",
            "-webkit-left", "-webkit-right", "-webkit-center",
        ]),
    },
    "text-decoration" => TextDecoration {
        inherited: false, initial: "none", kind: ValueKind::TextDecoration,
    },
    "text-indent" => TextIndent {
        inherited: true, initial: "0px", kind: ValueKind::LengthPercentageOrAuto,
    },
    "text-transform" => TextTransform {
        inherited: true,
        initial: "none",
        kind: ValueKind::Keyword(&["none", "capitalize", "uppercase", "lowercase"]),
    },
    "text-shadow" => TextShadow { inherited: true, initial: "none", kind: ValueKind::Any },
    "white-space" => WhiteSpace {
        inherited: true,
        initial: "normal",
        kind: ValueKind::Keyword(&["normal", "pre", "pre-wrap", "pre-line", "nowrap"]),
    },
    "vertical-align" => VerticalAlign {
        inherited: false, initial: "baseline", kind: ValueKind::Any,
    },
    "opacity" => Opacity { inherited: false, initial: "1", kind: ValueKind::Number },
    "z-index" => ZIndex { inherited: false, initial: "auto", kind: ValueKind::IntegerOrAuto },
    "overflow" => Overflow {
        inherited: false,
        initial: "visible",
        kind: ValueKind::Keyword(&["visible", "hidden", "scroll", "auto", "overlay"]),
    },
    "cursor" => Cursor { inherited: true, initial: "auto", kind: ValueKind::Any },
    "content" => Content { inherited: false, initial: "normal", kind: ValueKind::Any },
    "unicode-bidi" => UnicodeBidi {
        inherited: false,
        initial: "normal",
        kind: ValueKind::Keyword(&["normal", "embed", "bidi-override", "isolate", "plaintext"]),
    },
    "direction" => Direction {
        inherited: true, initial: "ltr", kind: ValueKind::Keyword(&["ltr", "rtl"]),
    },
    "list-style-type" => ListStyleType {
        inherited: true, initial: "disc", kind: ValueKind::Keyword(LIST_STYLE_TYPES),
    },
    "list-style-position" => ListStylePosition {
        inherited: true, initial: "outside", kind: ValueKind::Keyword(&["inside", "outside"]),
    },
    "list-style-image" => ListStyleImage { inherited: true, initial: "none", kind: ValueKind::Image },
    "transition-property" => TransitionProperty {
        inherited: false, initial: "all", kind: ValueKind::Any,
    },
    "transition-duration" => TransitionDuration {
        inherited: false, initial: "0s", kind: ValueKind::TimeList,
    },
    "transition-timing-function" => TransitionTimingFunction {
        inherited: false, initial: "ease", kind: ValueKind::Any,
    },
    "transition-delay" => TransitionDelay { inherited: false, initial: "0s", kind: ValueKind::TimeList },
    "-webkit-transition-property" => WebkitTransitionProperty {
        inherited: false, initial: "all", kind: ValueKind::Any,
    },
    "-webkit-transition-duration" => WebkitTransitionDuration {
        inherited: false, initial: "0s", kind: ValueKind::TimeList,
    },
    "-webkit-transition-timing-function" => WebkitTransitionTimingFunction {
        inherited: false, initial: "ease", kind: ValueKind::Any,
    },
    "-webkit-transition-delay" => WebkitTransitionDelay {
        inherited: false, initial: "0s", kind: ValueKind::TimeList,
    },
}

shorthands! {
    "margin" => Margin [MarginTop, MarginRight, MarginBottom, MarginLeft],
    "padding" => Padding [PaddingTop, PaddingRight, PaddingBottom, PaddingLeft],
    "border-width" => BorderWidth [
        BorderTopWidth, BorderRightWidth, BorderBottomWidth, BorderLeftWidth,
    ],
    "border-style" => BorderStyle [
        BorderTopStyle, BorderRightStyle, BorderBottomStyle, BorderLeftStyle,
    ],
    "border-color" => BorderColor [
        BorderTopColor, BorderRightColor, BorderBottomColor, BorderLeftColor,
    ],
    "border-top" => BorderTop [BorderTopWidth, BorderTopStyle, BorderTopColor],
    "border-right" => BorderRight [BorderRightWidth, BorderRightStyle, BorderRightColor],
    "border-bottom" => BorderBottom [BorderBottomWidth, BorderBottomStyle, BorderBottomColor],
    "border-left" => BorderLeft [BorderLeftWidth, BorderLeftStyle, BorderLeftColor],
    "border" => Border [
        BorderTopWidth, BorderRightWidth, BorderBottomWidth, BorderLeftWidth,
        BorderTopStyle, BorderRightStyle, BorderBottomStyle, BorderLeftStyle,
        BorderTopColor, BorderRightColor, BorderBottomColor, BorderLeftColor,
    ],
    "outline" => Outline [OutlineColor, OutlineStyle, OutlineWidth],
    "list-style" => ListStyle [ListStyleType, ListStylePosition, ListStyleImage],
    "transition" => Transition [
        TransitionProperty, TransitionDuration, TransitionTimingFunction, TransitionDelay,
    ],
    "-webkit-transition" => WebkitTransition [
        WebkitTransitionProperty, WebkitTransitionDuration, WebkitTransitionTimingFunction,
        WebkitTransitionDelay,
    ],
}

impl LonghandId {
    /// Looks a longhand up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// The `-webkit-` twin of an unprefixed property, or the other way around.
    /// Returns `self` when there is none.
    pub fn prefixing_variant(self) -> Self {
        use self::LonghandId::*;
        match self {
            TransitionProperty => WebkitTransitionProperty,
            TransitionDuration => WebkitTransitionDuration,
            TransitionTimingFunction => WebkitTransitionTimingFunction,
            TransitionDelay => WebkitTransitionDelay,
            WebkitTransitionProperty => TransitionProperty,
            WebkitTransitionDuration => TransitionDuration,
            WebkitTransitionTimingFunction => TransitionTimingFunction,
            WebkitTransitionDelay => TransitionDelay,
            other => other,
        }
    }

    /// Whether a `:visited` rule may set this property.
    pub fn is_visited_dependent(self) -> bool {
        use self::LonghandId::*;
        matches!(
            self,
            Color |
                BackgroundColor |
                BorderTopColor |
                BorderRightColor |
                BorderBottomColor |
                BorderLeftColor |
                OutlineColor
        )
    }

    /// The shorthands that set this longhand.
    pub fn shorthands(self) -> impl Iterator<Item = ShorthandId> {
        ShorthandId::ALL
            .iter()
            .copied()
            .filter(move |shorthand| shorthand.longhands().contains(&self))
    }
}

impl ShorthandId {
    /// Looks a shorthand up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// See `LonghandId::prefixing_variant`.
    pub fn prefixing_variant(self) -> Self {
        match self {
            ShorthandId::Transition => ShorthandId::WebkitTransition,
            ShorthandId::WebkitTransition => ShorthandId::Transition,
            other => other,
        }
    }
}

/// A property, by identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PropertyId {
    Longhand(LonghandId),
    Shorthand(ShorthandId),
}

impl PropertyId {
    /// Looks a property up by name, ignoring ASCII case.
    pub fn parse(name: &str) -> Result<Self, ()> {
        if let Some(id) = LonghandId::from_name(name) {
            return Ok(PropertyId::Longhand(id));
        }
        ShorthandId::from_name(name)
            .map(PropertyId::Shorthand)
            .ok_or(())
    }

    pub fn name(&self) -> &'static str {
        match *self {
            PropertyId::Longhand(id) => id.name(),
            PropertyId::Shorthand(id) => id.name(),
        }
    }

    /// Returns the shorthand, or the longhand in the error case.
    pub fn as_shorthand(&self) -> Result<ShorthandId, LonghandId> {
        match *self {
            PropertyId::Shorthand(id) => Ok(id),
            PropertyId::Longhand(id) => Err(id),
        }
    }
}

/// A CSS-wide keyword.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CSSWideKeyword {
    Initial,
    Inherit,
}

impl CSSWideKeyword {
    pub fn to_str(&self) -> &'static str {
        match *self {
            CSSWideKeyword::Initial => "initial",
            CSSWideKeyword::Inherit => "inherit",
        }
    }

    /// Parses a whole value as a CSS-wide keyword.
    pub fn from_value(text: &str) -> Option<Self> {
        let mut input = ParserInput::new(text);
        let mut input = Parser::new(&mut input);
        let keyword = {
            let ident = input.expect_ident().ok()?;
            if ident.eq_ignore_ascii_case("initial") {
                CSSWideKeyword::Initial
            } else if ident.eq_ignore_ascii_case("inherit") {
                CSSWideKeyword::Inherit
            } else {
                return None;
            }
        };
        if input.is_exhausted() {
            Some(keyword)
        } else {
            None
        }
    }
}

/// The specified value of a longhand declaration.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeclaredValue {
    /// A validated value, as written in the source.
    Value(Box<str>),
    CSSWideKeyword(CSSWideKeyword),
}

impl DeclaredValue {
    pub fn is_initial(&self) -> bool {
        *self == DeclaredValue::CSSWideKeyword(CSSWideKeyword::Initial)
    }

    pub fn is_inherit(&self) -> bool {
        *self == DeclaredValue::CSSWideKeyword(CSSWideKeyword::Inherit)
    }

    /// The serialization of the value.
    pub fn text(&self) -> &str {
        match *self {
            DeclaredValue::Value(ref text) => text,
            DeclaredValue::CSSWideKeyword(keyword) => keyword.to_str(),
        }
    }
}

impl ToCss for DeclaredValue {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(self.text())
    }
}

/// A single longhand declaration.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PropertyDeclaration {
    id: LonghandId,
    value: DeclaredValue,
    /// The shorthand this declaration was expanded from, if any.
    shorthand: Option<ShorthandId>,
    /// Whether the value was filled in by a shorthand that did not mention
    /// this longhand.
    implicit: bool,
}

impl PropertyDeclaration {
    pub fn new(id: LonghandId, value: DeclaredValue) -> Self {
        PropertyDeclaration {
            id,
            value,
            shorthand: None,
            implicit: false,
        }
    }

    fn from_shorthand(
        id: LonghandId,
        value: DeclaredValue,
        shorthand: ShorthandId,
        implicit: bool,
    ) -> Self {
        PropertyDeclaration {
            id,
            value,
            shorthand: Some(shorthand),
            implicit,
        }
    }

    #[inline]
    pub fn id(&self) -> LonghandId {
        self.id
    }

    #[inline]
    pub fn value(&self) -> &DeclaredValue {
        &self.value
    }

    #[inline]
    pub fn shorthand(&self) -> Option<ShorthandId> {
        self.shorthand
    }

    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// The same declaration, for the prefixing variant of its property.
    pub fn with_id(&self, id: LonghandId) -> Self {
        PropertyDeclaration {
            id,
            ..self.clone()
        }
    }

    /// Parses the value of `id` from `input` into `declarations`. Shorthands
    /// push one declaration per longhand.
    ///
    /// This does not parse `!important`. Lengths written without a unit in
    /// quirks mode get `px`.
    pub fn parse_into<'i, 't>(
        declarations: &mut SourcePropertyDeclaration,
        id: PropertyId,
        quirks_mode: QuirksMode,
        input: &mut Parser<'i, 't>,
    ) -> Result<(), ParseError<'i>> {
        let start = input.position();
        let location = input.current_source_location();
        while input.next().is_ok() {}
        let text = input.slice_from(start).trim();
        let invalid = || location.new_custom_error(StyleParseErrorKind::InvalidValue);
        if text.is_empty() {
            return Err(invalid());
        }

        if let Some(keyword) = CSSWideKeyword::from_value(text) {
            let value = DeclaredValue::CSSWideKeyword(keyword);
            match id {
                PropertyId::Longhand(id) => {
                    declarations.push(PropertyDeclaration::new(id, value));
                },
                PropertyId::Shorthand(shorthand) => {
                    for &longhand in shorthand.longhands() {
                        declarations.push(PropertyDeclaration::from_shorthand(
                            longhand,
                            value.clone(),
                            shorthand,
                            false,
                        ));
                    }
                },
            }
            return Ok(());
        }

        match id {
            PropertyId::Longhand(id) => {
                let kind = id.value_kind();
                if !kind.accepts(text, quirks_mode) {
                    return Err(invalid());
                }
                let text = kind.with_quirky_unit(text, quirks_mode);
                declarations.push(PropertyDeclaration::new(id, DeclaredValue::Value(text.into())));
                Ok(())
            },
            PropertyId::Shorthand(shorthand) => {
                let expanded =
                    shorthands::expand(shorthand, text, quirks_mode).map_err(|()| invalid())?;
                for (longhand, value) in expanded {
                    let implicit = value.is_none();
                    let value = match value {
                        Some(text) => DeclaredValue::Value(
                            longhand.value_kind().with_quirky_unit(&text, quirks_mode).into(),
                        ),
                        None => DeclaredValue::CSSWideKeyword(CSSWideKeyword::Initial),
                    };
                    declarations.push(PropertyDeclaration::from_shorthand(
                        longhand, value, shorthand, implicit,
                    ));
                }
                Ok(())
            },
        }
    }
}

/// The declarations produced by parsing a single source declaration.
#[derive(Default)]
pub struct SourcePropertyDeclaration {
    declarations: SmallVec<[PropertyDeclaration; 4]>,
}

impl SourcePropertyDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, declaration: PropertyDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn drain(&mut self) -> smallvec::Drain<'_, [PropertyDeclaration; 4]> {
        self.declarations.drain(..)
    }

    pub fn clear(&mut self) {
        self.declarations.clear();
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(id: PropertyId, text: &str) -> Result<Vec<PropertyDeclaration>, ()> {
        let mut input = ParserInput::new(text);
        let mut input = Parser::new(&mut input);
        let mut declarations = SourcePropertyDeclaration::new();
        PropertyDeclaration::parse_into(&mut declarations, id, QuirksMode::NoQuirks, &mut input)
            .map_err(|_| ())?;
        Ok(declarations.drain().collect())
    }

    #[test]
    fn property_names_are_case_insensitive() {
        assert_eq!(
            PropertyId::parse("Margin-Top"),
            Ok(PropertyId::Longhand(LonghandId::MarginTop))
        );
        assert_eq!(PropertyId::parse("BORDER"), Ok(PropertyId::Shorthand(ShorthandId::Border)));
        assert!(PropertyId::parse("margin-middle").is_err());
    }

    #[test]
    fn every_longhand_accepts_its_initial_value() {
        for &id in LonghandId::ALL {
            assert!(
                id.value_kind().accepts(id.initial_value(), QuirksMode::NoQuirks),
                "{}",
                id.name()
            );
        }
    }

    #[test]
    fn css_wide_keywords_expand_to_every_longhand() {
        let declarations = parse(PropertyId::Shorthand(ShorthandId::Margin), "inherit").unwrap();
        assert_eq!(declarations.len(), 4);
        assert!(declarations.iter().all(|d| d.value().is_inherit() && !d.is_implicit()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse(PropertyId::Longhand(LonghandId::Display), "blocky").is_err());
        assert!(parse(PropertyId::Longhand(LonghandId::Color), "").is_err());
        assert!(parse(PropertyId::Shorthand(ShorthandId::Margin), "1px 2px 3px 4px 5px").is_err());
    }

    #[test]
    fn prefixing_variants_pair_up() {
        for &id in LonghandId::ALL {
            assert_eq!(id.prefixing_variant().prefixing_variant(), id);
        }
    }
}
