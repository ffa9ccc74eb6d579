/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [Media queries][mq].
//!
//! [mq]: https://drafts.csswg.org/mediaqueries/

use crate::Atom;
use cssparser::{Delimiter, Parser, ParserInput, ToCss, Token, match_ignore_ascii_case};
use euclid::default::Size2D;
use std::fmt;

/// The device media queries are evaluated against.
#[derive(Clone, Debug, PartialEq)]
pub struct Device {
    media_type: MediaType,
    /// The size of the initial containing block, in CSS pixels.
    viewport_size: Size2D<f32>,
}

impl Device {
    pub fn new(media_type: MediaType, viewport_size: Size2D<f32>) -> Device {
        Device {
            media_type,
            viewport_size,
        }
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn viewport_size(&self) -> Size2D<f32> {
        self.viewport_size
    }

    /// Evaluates a media list. An absent list always matches.
    pub fn evaluate(&self, media: Option<&MediaList>) -> bool {
        media.is_none_or(|media| media.evaluate(self))
    }
}

/// A type that encapsulates a media query list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaList {
    /// The list of media queries.
    pub media_queries: Vec<MediaQuery>,
}

impl ToCss for MediaList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut first = true;
        for query in &self.media_queries {
            if !first {
                dest.write_str(", ")?;
            }
            first = false;
            query.to_css(dest)?;
        }
        Ok(())
    }
}

/// https://drafts.csswg.org/mediaqueries/#mq-prefix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Qualifier {
    /// Hide a media query from legacy UAs:
    /// https://drafts.csswg.org/mediaqueries/#mq-only
    Only,
    /// Negate a media query:
    /// https://drafts.csswg.org/mediaqueries/#mq-not
    Not,
}

impl ToCss for Qualifier {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            Qualifier::Not => "not",
            Qualifier::Only => "only",
        })
    }
}

/// A [media query][mq].
///
/// [mq]: https://drafts.csswg.org/mediaqueries/
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    /// The qualifier for this query.
    pub qualifier: Option<Qualifier>,
    /// The media type for this query, that can be known, unknown, or "all".
    pub media_type: MediaQueryType,
    /// The set of expressions that this media query contains.
    pub expressions: Vec<Expression>,
}

impl MediaQuery {
    /// Return a media query that never matches, used for when we fail to parse
    /// a given media query.
    fn never_matching() -> Self {
        MediaQuery {
            qualifier: Some(Qualifier::Not),
            media_type: MediaQueryType::All,
            expressions: vec![],
        }
    }

    /// Parse a media query given css input.
    ///
    /// Returns an error if any of the expressions is unknown.
    pub fn parse(input: &mut Parser) -> Result<MediaQuery, ()> {
        let mut expressions = vec![];

        let qualifier = if input.try_parse(|input| input.expect_ident_matching("only")).is_ok() {
            Some(Qualifier::Only)
        } else if input.try_parse(|input| input.expect_ident_matching("not")).is_ok() {
            Some(Qualifier::Not)
        } else {
            None
        };

        let media_type = match input.try_parse(|input| input.expect_ident().cloned()) {
            Ok(ident) => MediaQueryType::parse(&ident),
            Err(_) => {
                // Media type is only optional if qualifier is not specified.
                if qualifier.is_some() {
                    return Err(());
                }

                // Without a media type, require at least one expression.
                expressions.push(Expression::parse(input)?);

                MediaQueryType::All
            },
        };

        // Parse any subsequent expressions
        loop {
            if input.try_parse(|input| input.expect_ident_matching("and")).is_err() {
                return if input.is_exhausted() {
                    Ok(MediaQuery {
                        qualifier,
                        media_type,
                        expressions,
                    })
                } else {
                    Err(())
                };
            }
            expressions.push(Expression::parse(input)?)
        }
    }

    fn matches(&self, device: &Device) -> bool {
        let query_match = self.media_type.matches(device.media_type()) &&
            self.expressions.iter().all(|expression| expression.matches(device));

        // Apply the logical NOT qualifier to the result
        match self.qualifier {
            Some(Qualifier::Not) => !query_match,
            _ => query_match,
        }
    }
}

impl ToCss for MediaQuery {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let Some(qual) = self.qualifier {
            qual.to_css(dest)?;
            dest.write_str(" ")?;
        }

        match self.media_type {
            MediaQueryType::All => {
                // We need to print "all" if there's a qualifier, or there's
                // just an empty list of expressions.
                //
                // Otherwise, we'd serialize media queries like "(min-width:
                // 40px)" in "all (min-width: 40px)", which is unexpected.
                if self.qualifier.is_some() || self.expressions.is_empty() {
                    dest.write_str("all")?;
                }
            },
            MediaQueryType::Concrete(ref media_type) => media_type.to_css(dest)?,
        }

        if self.expressions.is_empty() {
            return Ok(());
        }

        if self.media_type != MediaQueryType::All || self.qualifier.is_some() {
            dest.write_str(" and ")?;
        }

        let mut first = true;
        for expression in &self.expressions {
            if !first {
                dest.write_str(" and ")?;
            }
            first = false;
            expression.to_css(dest)?;
        }
        Ok(())
    }
}

/// http://dev.w3.org/csswg/mediaqueries-3/#media0
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaQueryType {
    /// A media type that matches every device.
    All,
    /// A specific media type.
    Concrete(MediaType),
}

impl MediaQueryType {
    fn parse(ident: &str) -> Self {
        if ident.eq_ignore_ascii_case("all") {
            return MediaQueryType::All;
        }
        MediaQueryType::Concrete(MediaType::from_ident(ident))
    }

    fn matches(&self, other: &MediaType) -> bool {
        match *self {
            MediaQueryType::All => true,
            MediaQueryType::Concrete(ref known_type) => known_type == other,
        }
    }
}

/// https://drafts.csswg.org/mediaqueries/#media-types
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaType {
    /// The "screen" media type.
    Screen,
    /// The "print" media type.
    Print,
    /// Any other media type. It never matches a screen or print device.
    Unknown(Atom),
}

impl MediaType {
    pub fn from_ident(name: &str) -> Self {
        match_ignore_ascii_case! { name,
            "screen" => MediaType::Screen,
            "print" => MediaType::Print,
            _ => MediaType::Unknown(Atom::from(name.to_ascii_lowercase())),
        }
    }
}

impl ToCss for MediaType {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            MediaType::Screen => dest.write_str("screen"),
            MediaType::Print => dest.write_str("print"),
            MediaType::Unknown(ref desc) => dest.write_str(desc),
        }
    }
}

/// A length in a media feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaLength {
    value: f32,
    unit: LengthUnit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LengthUnit {
    Px,
    Em,
    In,
    Cm,
    Mm,
    Pt,
    Pc,
}

impl MediaLength {
    fn parse(input: &mut Parser) -> Result<Self, ()> {
        let token = input.next().map_err(|_| ())?.clone();
        match token {
            Token::Number { value, .. } if value == 0. => Ok(MediaLength {
                value,
                unit: LengthUnit::Px,
            }),
            Token::Dimension {
                value, ref unit, ..
            } => {
                let unit = match_ignore_ascii_case! { &**unit,
                    "px" => LengthUnit::Px,
                    "em" => LengthUnit::Em,
                    "in" => LengthUnit::In,
                    "cm" => LengthUnit::Cm,
                    "mm" => LengthUnit::Mm,
                    "pt" => LengthUnit::Pt,
                    "pc" => LengthUnit::Pc,
                    _ => return Err(()),
                };
                Ok(MediaLength { value, unit })
            },
            _ => Err(()),
        }
    }

    /// The length in CSS pixels. Ems are relative to the initial font size.
    fn to_px(&self) -> f32 {
        let factor = match self.unit {
            LengthUnit::Px => 1.,
            LengthUnit::Em => 16.,
            LengthUnit::In => 96.,
            LengthUnit::Cm => 96. / 2.54,
            LengthUnit::Mm => 96. / 25.4,
            LengthUnit::Pt => 96. / 72.,
            LengthUnit::Pc => 16.,
        };
        self.value * factor
    }
}

impl ToCss for MediaLength {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let unit = match self.unit {
            LengthUnit::Px => "px",
            LengthUnit::Em => "em",
            LengthUnit::In => "in",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::Pt => "pt",
            LengthUnit::Pc => "pc",
        };
        write!(dest, "{}{}", self.value, unit)
    }
}

/// Whether a feature is a minimum, a maximum or an exact value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Range {
    Min,
    Max,
    Eq,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A single media feature test, like `(min-width: 40em)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Width(Range, MediaLength),
    Height(Range, MediaLength),
    Orientation(Orientation),
}

impl Expression {
    /// Parse a media expression of the form:
    ///
    /// ```ignore
    /// (media-feature: media-value)
    /// ```
    pub fn parse(input: &mut Parser) -> Result<Self, ()> {
        input.expect_parenthesis_block().map_err(|_| ())?;
        let result: Result<Self, cssparser::ParseError<()>> = input.parse_nested_block(|input| {
            let name = input.expect_ident()?.clone();
            input.expect_colon()?;
            let (range, feature) = if let Some(feature) = strip_prefix_ignore_case(&name, "min-") {
                (Range::Min, feature)
            } else if let Some(feature) = strip_prefix_ignore_case(&name, "max-") {
                (Range::Max, feature)
            } else {
                (Range::Eq, &*name)
            };
            let expression = match_ignore_ascii_case! { feature,
                "width" => MediaLength::parse(input).map(|l| Expression::Width(range, l)),
                "height" => MediaLength::parse(input).map(|l| Expression::Height(range, l)),
                "orientation" => {
                    let value = input.expect_ident()?.clone();
                    let orientation = match_ignore_ascii_case! { &*value,
                        "portrait" => Some(Orientation::Portrait),
                        "landscape" => Some(Orientation::Landscape),
                        _ => None,
                    };
                    match orientation {
                        Some(orientation) if range == Range::Eq => {
                            Ok(Expression::Orientation(orientation))
                        },
                        _ => Err(()),
                    }
                },
                _ => Err(()),
            };
            expression.map_err(|()| input.new_custom_error(()))
        });
        result.map_err(|_| ())
    }

    /// Evaluate this expression and return whether it matches the current
    /// device.
    pub fn matches(&self, device: &Device) -> bool {
        fn compare(range: Range, actual: f32, length: &MediaLength) -> bool {
            let value = length.to_px();
            match range {
                Range::Min => actual >= value,
                Range::Max => actual <= value,
                Range::Eq => actual == value,
            }
        }

        let viewport = device.viewport_size();
        match *self {
            Expression::Width(range, ref length) => compare(range, viewport.width, length),
            Expression::Height(range, ref length) => compare(range, viewport.height, length),
            Expression::Orientation(orientation) => {
                let portrait = viewport.height >= viewport.width;
                portrait == (orientation == Orientation::Portrait)
            },
        }
    }
}

impl ToCss for Expression {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        fn prefix(range: Range) -> &'static str {
            match range {
                Range::Min => "min-",
                Range::Max => "max-",
                Range::Eq => "",
            }
        }

        dest.write_str("(")?;
        match *self {
            Expression::Width(range, ref length) => {
                write!(dest, "{}width: ", prefix(range))?;
                length.to_css(dest)?;
            },
            Expression::Height(range, ref length) => {
                write!(dest, "{}height: ", prefix(range))?;
                length.to_css(dest)?;
            },
            Expression::Orientation(orientation) => {
                dest.write_str("orientation: ")?;
                dest.write_str(match orientation {
                    Orientation::Portrait => "portrait",
                    Orientation::Landscape => "landscape",
                })?;
            },
        }
        dest.write_str(")")
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if name.len() >= prefix.len() && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&name[prefix.len()..])
    } else {
        None
    }
}

impl MediaList {
    /// Create an empty MediaList.
    pub fn empty() -> Self {
        MediaList {
            media_queries: vec![],
        }
    }

    /// Parse a media query list from CSS.
    ///
    /// Always returns a media query list. If any invalid media query is
    /// found, the media query list is only filled with the equivalent of
    /// "not all", see:
    ///
    /// https://drafts.csswg.org/mediaqueries/#error-handling
    pub fn parse(input: &mut Parser) -> MediaList {
        if input.is_exhausted() {
            return MediaList::empty();
        }

        let mut media_queries = vec![];
        let mut found_invalid = false;
        loop {
            match input.parse_until_before(Delimiter::Comma, |i| {
                MediaQuery::parse(i).map_err(|()| i.new_custom_error::<(), ()>(()))
            }) {
                Ok(mq) => {
                    if !found_invalid {
                        media_queries.push(mq);
                    }
                },
                Err(..) => {
                    if !found_invalid {
                        media_queries.clear();
                        media_queries.push(MediaQuery::never_matching());
                        // Consume the rest of the input as if they were valid
                        // expressions (they might be, they might not), but
                        // ignore the result, this allows correctly parsing
                        // invalid media queries.
                        found_invalid = true;
                    }
                },
            }

            match input.next() {
                Ok(&Token::Comma) => {},
                Ok(_) => debug_assert!(false, "parse_until_before stops at commas"),
                Err(_) => break,
            }
        }

        debug_assert!(!found_invalid || media_queries.len() == 1);

        MediaList { media_queries }
    }

    /// Parses the text of a `media` attribute.
    pub fn parse_str(text: &str) -> MediaList {
        let mut input = ParserInput::new(text);
        MediaList::parse(&mut Parser::new(&mut input))
    }

    /// Evaluate a whole `MediaList` against `Device`.
    pub fn evaluate(&self, device: &Device) -> bool {
        // Check if it is an empty media query list or any queries match (OR condition)
        // https://drafts.csswg.org/mediaqueries-4/#mq-list
        self.media_queries.is_empty() || self.media_queries.iter().any(|mq| mq.matches(device))
    }

    /// Whether this `MediaList` contains no media queries.
    pub fn is_empty(&self) -> bool {
        self.media_queries.is_empty()
    }
}
