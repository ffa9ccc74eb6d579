/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Expansion of shorthand values into their longhands.

use super::values::{comma_separated_items, component_values, TIMING_FUNCTION_KEYWORDS};
use super::{LonghandId, ShorthandId};
use cssparser::{Parser, ParserInput};
use selectors::matching::QuirksMode;

/// A longhand and the text it was given, or `None` when the shorthand left
/// it out.
pub type Expansion = Vec<(LonghandId, Option<String>)>;

/// Expands `text`, which must not be a CSS-wide keyword.
pub fn expand(shorthand: ShorthandId, text: &str, quirks_mode: QuirksMode) -> Result<Expansion, ()> {
    match shorthand {
        ShorthandId::Margin |
        ShorthandId::Padding |
        ShorthandId::BorderWidth |
        ShorthandId::BorderStyle |
        ShorthandId::BorderColor => expand_four_sides(shorthand.longhands(), text, quirks_mode),
        ShorthandId::BorderTop |
        ShorthandId::BorderRight |
        ShorthandId::BorderBottom |
        ShorthandId::BorderLeft |
        ShorthandId::Outline |
        ShorthandId::ListStyle => expand_any_order(shorthand.longhands(), text, quirks_mode),
        ShorthandId::Border => expand_border(text, quirks_mode),
        ShorthandId::Transition | ShorthandId::WebkitTransition => {
            expand_transition(shorthand.longhands(), text)
        },
    }
}

/// `top [right [bottom [left]]]`, with the usual fallbacks.
fn expand_four_sides(
    sides: &[LonghandId],
    text: &str,
    quirks_mode: QuirksMode,
) -> Result<Expansion, ()> {
    let values = component_values(text)?;
    if values.is_empty() || values.len() > 4 {
        return Err(());
    }
    // Every side has the same grammar.
    let kind = sides[0].value_kind();
    if !values.iter().all(|value| kind.accepts(value, quirks_mode)) {
        return Err(());
    }
    let top = &values[0];
    let right = values.get(1).unwrap_or(top);
    let bottom = values.get(2).unwrap_or(top);
    let left = values.get(3).unwrap_or(right);
    Ok(sides
        .iter()
        .zip([top, right, bottom, left])
        .map(|(&side, value)| (side, Some(value.clone())))
        .collect())
}

/// Each component goes to the first longhand not yet set that accepts it.
fn expand_any_order(
    longhands: &[LonghandId],
    text: &str,
    quirks_mode: QuirksMode,
) -> Result<Expansion, ()> {
    let mut expansion: Expansion = longhands.iter().map(|&id| (id, None)).collect();
    for value in component_values(text)? {
        let slot = expansion
            .iter_mut()
            .find(|(id, set)| set.is_none() && id.value_kind().accepts(&value, quirks_mode))
            .ok_or(())?;
        slot.1 = Some(value);
    }
    if expansion.iter().all(|(_, value)| value.is_none()) {
        return Err(());
    }
    Ok(expansion)
}

/// `border` sets the width, style and color of all four sides at once.
fn expand_border(text: &str, quirks_mode: QuirksMode) -> Result<Expansion, ()> {
    let sides = expand_any_order(ShorthandId::BorderTop.longhands(), text, quirks_mode)?;
    let value_of = |index: usize| sides[index].1.clone();
    let (width, style, color) = (value_of(0), value_of(1), value_of(2));
    let longhands = ShorthandId::Border.longhands();
    Ok(longhands
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let value = match index / 4 {
                0 => width.clone(),
                1 => style.clone(),
                _ => color.clone(),
            };
            (id, value)
        })
        .collect())
}

fn is_time(text: &str) -> bool {
    let mut input = ParserInput::new(text);
    let mut input = Parser::new(&mut input);
    super::values::parse_time(&mut input).is_ok() && input.is_exhausted()
}

fn is_ident(text: &str) -> bool {
    let mut input = ParserInput::new(text);
    let mut input = Parser::new(&mut input);
    input.expect_ident().is_ok() && input.is_exhausted()
}

fn is_timing_function(text: &str) -> bool {
    if TIMING_FUNCTION_KEYWORDS.iter().any(|k| text.eq_ignore_ascii_case(k)) {
        return true;
    }
    let lower = text.to_ascii_lowercase();
    (lower.starts_with("cubic-bezier(") || lower.starts_with("steps(")) && lower.ends_with(')')
}

/// One comma-separated item of a `transition` value: property, duration,
/// timing function and delay, in this order of longhands.
fn parse_transition_item(text: &str) -> Result<[Option<String>; 4], ()> {
    let mut item: [Option<String>; 4] = Default::default();
    for value in component_values(text)? {
        let slot = if is_time(&value) {
            if item[1].is_none() { 1 } else { 3 }
        } else if is_timing_function(&value) {
            2
        } else if is_ident(&value) {
            0
        } else {
            return Err(());
        };
        if item[slot].is_some() {
            return Err(());
        }
        item[slot] = Some(value);
    }
    Ok(item)
}

fn expand_transition(longhands: &[LonghandId], text: &str) -> Result<Expansion, ()> {
    let items = comma_separated_items(text)?
        .iter()
        .map(|item| parse_transition_item(item))
        .collect::<Result<Vec<_>, ()>>()?;
    if let [item] = &items[..] {
        return Ok(longhands.iter().copied().zip(item.iter().cloned()).collect());
    }
    // With several items every longhand gets a list, so missing parts get
    // their initial value spelled out.
    Ok(longhands
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let list = items
                .iter()
                .map(|item| {
                    item[index]
                        .clone()
                        .unwrap_or_else(|| id.initial_value().to_owned())
                })
                .collect::<Vec<_>>()
                .join(", ");
            (id, Some(list))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(expansion: &Expansion) -> Vec<Option<&str>> {
        expansion.iter().map(|(_, v)| v.as_deref()).collect()
    }

    #[test]
    fn four_sides() {
        let expansion = expand(ShorthandId::Margin, "1px 2px", QuirksMode::NoQuirks).unwrap();
        assert_eq!(
            values(&expansion),
            vec![Some("1px"), Some("2px"), Some("1px"), Some("2px")]
        );
        let expansion = expand(ShorthandId::Padding, "1px 2px 3px", QuirksMode::NoQuirks).unwrap();
        assert_eq!(
            values(&expansion),
            vec![Some("1px"), Some("2px"), Some("3px"), Some("2px")]
        );
        assert!(expand(ShorthandId::Padding, "-1px", QuirksMode::NoQuirks).is_err());
    }

    #[test]
    fn unitless_sides_in_quirks_mode() {
        assert!(expand(ShorthandId::Margin, "1 2", QuirksMode::NoQuirks).is_err());
        let expansion = expand(ShorthandId::Margin, "1 2", QuirksMode::Quirks).unwrap();
        assert_eq!(values(&expansion), vec![Some("1"), Some("2"), Some("1"), Some("2")]);
        let expansion = expand(ShorthandId::BorderTop, "red 2", QuirksMode::Quirks).unwrap();
        assert_eq!(values(&expansion), vec![Some("2"), None, Some("red")]);
    }

    #[test]
    fn border_side_in_any_order() {
        let expansion = expand(ShorthandId::BorderTop, "red 2px", QuirksMode::NoQuirks).unwrap();
        assert_eq!(values(&expansion), vec![Some("2px"), None, Some("red")]);
        assert!(expand(ShorthandId::BorderTop, "red blue", QuirksMode::NoQuirks).is_err());
    }

    #[test]
    fn border_sets_every_side() {
        let expansion = expand(ShorthandId::Border, "1px solid", QuirksMode::NoQuirks).unwrap();
        assert_eq!(expansion.len(), 12);
        assert!(expansion[..4].iter().all(|(_, v)| v.as_deref() == Some("1px")));
        assert!(expansion[4..8].iter().all(|(_, v)| v.as_deref() == Some("solid")));
        assert!(expansion[8..].iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn transitions() {
        let expansion =
            expand(ShorthandId::Transition, "opacity 1s ease-in 2s", QuirksMode::NoQuirks).unwrap();
        assert_eq!(
            values(&expansion),
            vec![Some("opacity"), Some("1s"), Some("ease-in"), Some("2s")]
        );
        let expansion =
            expand(ShorthandId::Transition, "opacity 1s, color", QuirksMode::NoQuirks).unwrap();
        assert_eq!(
            values(&expansion),
            vec![
                Some("opacity, color"),
                Some("1s, 0s"),
                Some("ease, ease"),
                Some("0s, 0s"),
            ]
        );
    }
}
