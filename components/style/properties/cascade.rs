/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Computed values, and applying declarations to them.

use super::{CSSWideKeyword, DeclaredValue, LonghandId, PropertyDeclaration};
use selectors::parser::PseudoElement;
use servo_arc::Arc;
use smallvec::SmallVec;

/// Where an element sits with respect to links.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsideLink {
    NotInsideLink,
    InsideUnvisitedLink,
    InsideVisitedLink,
}

/// The computed style of an element or pseudo-element.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedValues {
    /// One value per longhand, indexed by `LonghandId`.
    values: Box<[Box<str>]>,
    inside_link: InsideLink,
    is_link: bool,
    /// The style used when the link this element is in turns out to be
    /// visited. Only the visited-dependent properties are read from it.
    visited_style: Option<Arc<ComputedValues>>,
    /// Pseudo-elements that have rules for this element.
    pseudo_styles: SmallVec<[PseudoElement; 2]>,
}

impl ComputedValues {
    /// The style of an element nothing applies to, with no parent.
    pub fn initial_values() -> Self {
        ComputedValues {
            values: LonghandId::ALL
                .iter()
                .map(|id| Box::<str>::from(id.initial_value()))
                .collect(),
            inside_link: InsideLink::NotInsideLink,
            is_link: false,
            visited_style: None,
            pseudo_styles: SmallVec::new(),
        }
    }

    /// The starting point of the cascade: inherited properties come from
    /// the parent, the rest are initial.
    pub fn inherit_from(parent: Option<&ComputedValues>) -> Self {
        let mut style = Self::initial_values();
        if let Some(parent) = parent {
            for &id in LonghandId::ALL {
                if id.inherited() {
                    style.values[id as usize] = parent.values[id as usize].clone();
                }
            }
            style.inside_link = parent.inside_link;
        }
        style
    }

    #[inline]
    pub fn get(&self, id: LonghandId) -> &str {
        &self.values[id as usize]
    }

    pub fn set(&mut self, id: LonghandId, value: &str) {
        self.values[id as usize] = value.into();
    }

    /// The value that shows, taking the visited state of the enclosing link
    /// into account.
    pub fn resolved_value(&self, id: LonghandId) -> &str {
        if self.inside_link == InsideLink::InsideVisitedLink && id.is_visited_dependent() {
            if let Some(ref visited) = self.visited_style {
                return visited.get(id);
            }
        }
        self.get(id)
    }

    #[inline]
    pub fn color(&self) -> &str {
        self.resolved_value(LonghandId::Color)
    }

    /// Applies a single declaration. `parent` resolves `inherit`.
    pub fn apply_declaration(
        &mut self,
        declaration: &PropertyDeclaration,
        parent: Option<&ComputedValues>,
    ) {
        let id = declaration.id();
        match *declaration.value() {
            DeclaredValue::Value(ref text) => self.set(id, text),
            DeclaredValue::CSSWideKeyword(CSSWideKeyword::Initial) => {
                self.set(id, id.initial_value())
            },
            DeclaredValue::CSSWideKeyword(CSSWideKeyword::Inherit) => {
                let value = match parent {
                    Some(parent) => parent.values[id as usize].clone(),
                    None => id.initial_value().into(),
                };
                self.values[id as usize] = value;
            },
        }
    }

    #[inline]
    pub fn inside_link(&self) -> InsideLink {
        self.inside_link
    }

    pub fn set_inside_link(&mut self, inside_link: InsideLink) {
        self.inside_link = inside_link;
    }

    #[inline]
    pub fn is_link(&self) -> bool {
        self.is_link
    }

    pub fn set_is_link(&mut self, is_link: bool) {
        self.is_link = is_link;
    }

    pub fn visited_style(&self) -> Option<&Arc<ComputedValues>> {
        self.visited_style.as_ref()
    }

    pub fn set_visited_style(&mut self, style: ComputedValues) {
        self.visited_style = Some(Arc::new(style));
    }

    /// Whether some rule targets `pseudo` on this element.
    pub fn has_pseudo_style(&self, pseudo: &PseudoElement) -> bool {
        self.pseudo_styles.contains(pseudo)
    }

    pub fn set_has_pseudo_style(&mut self, pseudo: PseudoElement) {
        if !self.pseudo_styles.contains(&pseudo) {
            self.pseudo_styles.push(pseudo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherited_properties_come_from_the_parent() {
        let mut parent = ComputedValues::initial_values();
        parent.set(LonghandId::Color, "red");
        parent.set(LonghandId::Display, "block");
        let child = ComputedValues::inherit_from(Some(&parent));
        assert_eq!(child.get(LonghandId::Color), "red");
        assert_eq!(child.get(LonghandId::Display), "inline");
    }

    #[test]
    fn explicit_inherit_and_initial() {
        let mut parent = ComputedValues::initial_values();
        parent.set(LonghandId::Display, "block");
        let mut child = ComputedValues::inherit_from(Some(&parent));
        child.apply_declaration(
            &PropertyDeclaration::new(
                LonghandId::Display,
                DeclaredValue::CSSWideKeyword(CSSWideKeyword::Inherit),
            ),
            Some(&parent),
        );
        assert_eq!(child.get(LonghandId::Display), "block");
        child.apply_declaration(
            &PropertyDeclaration::new(
                LonghandId::Display,
                DeclaredValue::CSSWideKeyword(CSSWideKeyword::Initial),
            ),
            Some(&parent),
        );
        assert_eq!(child.get(LonghandId::Display), "inline");
    }

    #[test]
    fn visited_values_only_show_inside_visited_links() {
        let mut style = ComputedValues::initial_values();
        style.set(LonghandId::Color, "blue");
        let mut visited = style.clone();
        visited.set(LonghandId::Color, "purple");
        visited.set(LonghandId::Width, "10px");
        style.set_visited_style(visited);
        assert_eq!(style.color(), "blue");
        style.set_inside_link(InsideLink::InsideVisitedLink);
        assert_eq!(style.color(), "purple");
        assert_eq!(style.resolved_value(LonghandId::Width), "auto");
    }
}
