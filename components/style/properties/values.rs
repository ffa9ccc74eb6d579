/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Validation of specified values.
//!
//! Declarations keep the source text of their values. These routines only
//! decide whether a component value list is acceptable for a property.

use cssparser::{Parser, ParserInput, Token, match_ignore_ascii_case};
use selectors::matching::QuirksMode;

/// The grammar a longhand accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// One of a fixed set of identifiers.
    Keyword(&'static [&'static str]),
    Color,
    /// `none`, a `url()` or an image function.
    Image,
    /// A length or percentage, or `auto`. Negative values are fine.
    LengthPercentageOrAuto,
    /// A non-negative length or percentage.
    NonNegativeLengthPercentage,
    /// A length, possibly negative.
    Length,
    /// `thin`, `medium`, `thick` or a non-negative length.
    LineWidth,
    FontSize,
    FontWeight,
    /// `normal`, a number, or a non-negative length or percentage.
    LineHeight,
    Number,
    IntegerOrAuto,
    /// A comma-separated list of times.
    TimeList,
    TextDecoration,
    /// Anything that tokenizes.
    Any,
}

pub const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

pub const OUTLINE_STYLES: &[&str] = &[
    "auto", "none", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

pub const TIMING_FUNCTION_KEYWORDS: &[&str] = &[
    "ease",
    "linear",
    "ease-in",
    "ease-out",
    "ease-in-out",
    "step-start",
    "step-end",
];

const LENGTH_UNITS: &[&str] = &[
    "px", "em", "ex", "rem", "ch", "vw", "vh", "vmin", "vmax", "in", "cm", "mm", "pt", "pc",
];

const FONT_SIZE_KEYWORDS: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "larger", "smaller",
    "-webkit-xxx-large",
];

/// Sorted, for binary search.
const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
    "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell",
    "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen",
    "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

/// Keywords accepted wherever a color is, on top of the named colors.
const COLOR_KEYWORDS: &[&str] = &[
    "transparent",
    "currentcolor",
    "-webkit-link",
    "-webkit-activelink",
    "-webkit-text",
    "-webkit-focus-ring-color",
];

impl ValueKind {
    /// Whether `text` is a valid value of this kind.
    ///
    /// In quirks mode lengths may leave out their unit, and `10` means
    /// `10px`.
    pub fn accepts(self, text: &str, quirks_mode: QuirksMode) -> bool {
        let mut input = ParserInput::new(text);
        let mut input = Parser::new(&mut input);
        if input.is_exhausted() {
            return false;
        }
        self.parse(&mut input, quirks_mode).is_ok() && input.is_exhausted()
    }

    /// `text` with the unit a quirks mode length left out spelled as
    /// `px`. Other values come back unchanged.
    pub fn with_quirky_unit(self, text: &str, quirks_mode: QuirksMode) -> String {
        if quirks_mode == QuirksMode::Quirks &&
            !self.accepts(text, QuirksMode::NoQuirks) &&
            self.accepts(text, QuirksMode::Quirks)
        {
            return format!("{}px", text);
        }
        text.to_owned()
    }

    fn parse(self, input: &mut Parser, quirks_mode: QuirksMode) -> Result<(), ()> {
        match self {
            ValueKind::Keyword(keywords) => parse_keyword(input, keywords),
            ValueKind::Color => parse_color(input),
            ValueKind::Image => parse_image(input),
            ValueKind::LengthPercentageOrAuto => input
                .try_parse(|i| parse_keyword(i, &["auto"]))
                .or_else(|()| parse_length(input, true, true, quirks_mode)),
            ValueKind::NonNegativeLengthPercentage => parse_length(input, true, false, quirks_mode),
            ValueKind::Length => parse_length(input, false, true, quirks_mode),
            ValueKind::LineWidth => input
                .try_parse(|i| parse_keyword(i, &["thin", "medium", "thick"]))
                .or_else(|()| parse_length(input, false, false, quirks_mode)),
            ValueKind::FontSize => input
                .try_parse(|i| parse_keyword(i, FONT_SIZE_KEYWORDS))
                .or_else(|()| parse_length(input, true, false, quirks_mode)),
            ValueKind::FontWeight => {
                if input
                    .try_parse(|i| parse_keyword(i, &["normal", "bold", "bolder", "lighter"]))
                    .is_ok()
                {
                    return Ok(());
                }
                match *input.next().map_err(|_| ())? {
                    Token::Number {
                        int_value: Some(weight),
                        ..
                    } if (100..=900).contains(&weight) && weight % 100 == 0 => Ok(()),
                    _ => Err(()),
                }
            },
            ValueKind::LineHeight => {
                if input.try_parse(|i| parse_keyword(i, &["normal"])).is_ok() {
                    return Ok(());
                }
                if input.try_parse(parse_non_negative_number).is_ok() {
                    return Ok(());
                }
                parse_length(input, true, false, QuirksMode::NoQuirks)
            },
            ValueKind::Number => match *input.next().map_err(|_| ())? {
                Token::Number { .. } => Ok(()),
                _ => Err(()),
            },
            ValueKind::IntegerOrAuto => {
                if input.try_parse(|i| parse_keyword(i, &["auto"])).is_ok() {
                    return Ok(());
                }
                match *input.next().map_err(|_| ())? {
                    Token::Number {
                        int_value: Some(_), ..
                    } => Ok(()),
                    _ => Err(()),
                }
            },
            ValueKind::TimeList => input
                .parse_comma_separated(|i| parse_time(i).map_err(|()| i.new_custom_error::<(), ()>(())))
                .map(|_| ())
                .map_err(|_| ()),
            ValueKind::TextDecoration => parse_text_decoration(input),
            ValueKind::Any => {
                while input.next().is_ok() {}
                Ok(())
            },
        }
    }
}

fn parse_keyword(input: &mut Parser, keywords: &[&str]) -> Result<(), ()> {
    let ident = input.expect_ident().map_err(|_| ())?;
    if keywords.iter().any(|k| ident.eq_ignore_ascii_case(k)) {
        Ok(())
    } else {
        Err(())
    }
}

fn parse_length(
    input: &mut Parser,
    allow_percentage: bool,
    allow_negative: bool,
    quirks_mode: QuirksMode,
) -> Result<(), ()> {
    match *input.next().map_err(|_| ())? {
        Token::Number { value, .. } if value == 0. => Ok(()),
        Token::Number { value, .. }
            if quirks_mode == QuirksMode::Quirks && (allow_negative || value >= 0.) =>
        {
            Ok(())
        },
        Token::Dimension {
            value, ref unit, ..
        } if allow_negative || value >= 0. => {
            if LENGTH_UNITS.iter().any(|u| unit.eq_ignore_ascii_case(u)) {
                Ok(())
            } else {
                Err(())
            }
        },
        Token::Percentage { unit_value, .. } if allow_percentage && (allow_negative || unit_value >= 0.) => {
            Ok(())
        },
        _ => Err(()),
    }
}

fn parse_non_negative_number(input: &mut Parser) -> Result<(), ()> {
    match *input.next().map_err(|_| ())? {
        Token::Number { value, .. } if value >= 0. => Ok(()),
        _ => Err(()),
    }
}

pub(super) fn parse_time(input: &mut Parser) -> Result<(), ()> {
    match *input.next().map_err(|_| ())? {
        Token::Dimension { ref unit, .. }
            if unit.eq_ignore_ascii_case("s") || unit.eq_ignore_ascii_case("ms") =>
        {
            Ok(())
        },
        _ => Err(()),
    }
}

fn parse_text_decoration(input: &mut Parser) -> Result<(), ()> {
    if input.try_parse(|i| parse_keyword(i, &["none"])).is_ok() {
        return Ok(());
    }
    let mut seen: Vec<String> = vec![];
    while let Ok(ident) = input.try_parse(|i| i.expect_ident().cloned()) {
        let ident = ident.to_ascii_lowercase();
        let known = matches!(&*ident, "underline" | "overline" | "line-through" | "blink");
        if !known || seen.contains(&ident) {
            return Err(());
        }
        seen.push(ident);
    }
    if seen.is_empty() { Err(()) } else { Ok(()) }
}

fn parse_color(input: &mut Parser) -> Result<(), ()> {
    let location = input.current_source_location();
    let token = input.next().map_err(|_| ())?.clone();
    match token {
        Token::Ident(ref name) => {
            let lower = name.to_ascii_lowercase();
            if NAMED_COLORS.binary_search(&&*lower).is_ok() || COLOR_KEYWORDS.contains(&&*lower) {
                Ok(())
            } else {
                Err(())
            }
        },
        Token::Hash(ref value) | Token::IDHash(ref value) => {
            let valid = matches!(value.len(), 3 | 4 | 6 | 8) &&
                value.bytes().all(|b| b.is_ascii_hexdigit());
            if valid { Ok(()) } else { Err(()) }
        },
        Token::Function(ref name) => {
            let arguments = match_ignore_ascii_case! { name,
                "rgb" | "hsl" => 3,
                "rgba" | "hsla" => 4,
                _ => return Err(()),
            };
            let result: Result<usize, cssparser::ParseError<()>> = input.parse_nested_block(|i| {
                let values = i.parse_comma_separated(|i| match *i.next()? {
                    Token::Number { .. } | Token::Percentage { .. } => Ok(()),
                    Token::Dimension { ref unit, .. } if unit.eq_ignore_ascii_case("deg") => Ok(()),
                    _ => Err(location.new_custom_error(())),
                })?;
                Ok(values.len())
            });
            match result {
                Ok(count) if count == arguments => Ok(()),
                _ => Err(()),
            }
        },
        _ => Err(()),
    }
}

fn parse_image(input: &mut Parser) -> Result<(), ()> {
    let token = input.next().map_err(|_| ())?.clone();
    match token {
        Token::Ident(ref ident) if ident.eq_ignore_ascii_case("none") => Ok(()),
        Token::UnquotedUrl(..) => Ok(()),
        Token::Function(ref name) => {
            let known = match_ignore_ascii_case! { name,
                "url" | "linear-gradient" | "radial-gradient" | "repeating-linear-gradient" |
                "repeating-radial-gradient" | "-webkit-gradient" | "-webkit-linear-gradient" |
                "-webkit-radial-gradient" | "-webkit-image-set" => true,
                _ => false,
            };
            if !known {
                return Err(());
            }
            let result: Result<(), cssparser::ParseError<()>> = input.parse_nested_block(|i| {
                while i.next().is_ok() {}
                Ok(())
            });
            result.map_err(|_| ())
        },
        _ => Err(()),
    }
}

/// Splits a value into its top-level component values, keeping the source
/// text of each. Whitespace separates components.
pub fn component_values(text: &str) -> Result<Vec<String>, ()> {
    let mut input = ParserInput::new(text);
    let mut input = Parser::new(&mut input);
    let mut components = vec![];
    loop {
        let start = input.position();
        let token = match input.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Function(..) |
            Token::ParenthesisBlock |
            Token::SquareBracketBlock |
            Token::CurlyBracketBlock => {
                let result: Result<(), cssparser::ParseError<()>> = input.parse_nested_block(|i| {
                    while i.next().is_ok() {}
                    Ok(())
                });
                result.map_err(|_| ())?;
            },
            Token::Comma | Token::Delim('/') => return Err(()),
            _ => {},
        }
        components.push(input.slice_from(start).trim().to_owned());
    }
    Ok(components)
}

/// Splits a value at its top-level commas, keeping the source text of each
/// item.
pub fn comma_separated_items(text: &str) -> Result<Vec<String>, ()> {
    let mut input = ParserInput::new(text);
    let mut input = Parser::new(&mut input);
    let result: Result<Vec<String>, cssparser::ParseError<()>> =
        input.parse_comma_separated(|i| {
            let start = i.position();
            while i.next().is_ok() {}
            Ok(i.slice_from(start).trim().to_owned())
        });
    match result {
        Ok(items) if items.iter().all(|item| !item.is_empty()) => Ok(items),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_are_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn colors() {
        assert!(ValueKind::Color.accepts("red", QuirksMode::NoQuirks));
        assert!(ValueKind::Color.accepts("#0f0", QuirksMode::NoQuirks));
        assert!(ValueKind::Color.accepts("rgba(0, 0, 0, 0.5)", QuirksMode::NoQuirks));
        assert!(!ValueKind::Color.accepts("rgb(0, 0)", QuirksMode::NoQuirks));
        assert!(!ValueKind::Color.accepts("#12", QuirksMode::NoQuirks));
        assert!(!ValueKind::Color.accepts("reddish", QuirksMode::NoQuirks));
    }

    #[test]
    fn lengths() {
        assert!(ValueKind::LengthPercentageOrAuto.accepts("-3px", QuirksMode::NoQuirks));
        assert!(ValueKind::LengthPercentageOrAuto.accepts("auto", QuirksMode::NoQuirks));
        assert!(!ValueKind::NonNegativeLengthPercentage.accepts("-3px", QuirksMode::NoQuirks));
        assert!(ValueKind::NonNegativeLengthPercentage.accepts("50%", QuirksMode::NoQuirks));
        assert!(!ValueKind::Length.accepts("10", QuirksMode::NoQuirks));
        assert!(ValueKind::LineWidth.accepts("thick", QuirksMode::NoQuirks));
    }

    #[test]
    fn unitless_lengths_in_quirks_mode() {
        assert!(!ValueKind::LengthPercentageOrAuto.accepts("10", QuirksMode::NoQuirks));
        assert!(ValueKind::LengthPercentageOrAuto.accepts("10", QuirksMode::Quirks));
        assert!(ValueKind::Length.accepts("-4", QuirksMode::Quirks));
        assert!(!ValueKind::NonNegativeLengthPercentage.accepts("-4", QuirksMode::Quirks));
        assert!(ValueKind::LineWidth.accepts("2", QuirksMode::Quirks));
        assert!(!ValueKind::Color.accepts("10", QuirksMode::Quirks));
        assert_eq!(ValueKind::Length.with_quirky_unit("-4", QuirksMode::Quirks), "-4px");
        assert_eq!(ValueKind::Length.with_quirky_unit("0", QuirksMode::Quirks), "0");
        assert_eq!(ValueKind::Length.with_quirky_unit("4em", QuirksMode::Quirks), "4em");
    }

    #[test]
    fn splitting() {
        assert_eq!(
            component_values("1px  solid rgb(1, 2, 3)").unwrap(),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert_eq!(
            comma_separated_items("opacity 1s, color 2s ease-in").unwrap(),
            vec!["opacity 1s", "color 2s ease-in"]
        );
        assert!(comma_separated_items("a,,b").is_err());
    }
}
