/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Helper module to build up a selector safely and efficiently.
//!
//! Our selector representation is designed to optimize matching, and has
//! several requirements:
//! * All simple selectors and combinators are stored inline in the same buffer
//!   as Component instances.
//! * We compute the specificity once, at build time.
//!
//! The builder pushes simple selectors and combinators in parse order and
//! hands out a finished `Selector` with its specificity packed into a `u32`.

use crate::parser::{Combinator, Component, Selector};
use smallvec::SmallVec;
use std::cmp;
use std::ops::{Add, AddAssign};

/// Top-level SelectorBuilder struct. This should be stack-allocated by the
/// consumer and never moved (because it contains a lot of inline data that
/// would be slow to memmov).
///
/// After instantiation, callers may call the push_simple_selector() and
/// push_combinator() methods to append selector data as it is encountered
/// (from left to right). Once the process is complete, callers should invoke
/// build(), which transforms the contents of the SelectorBuilder into a heap-
/// allocated Selector and leaves the builder in a drained state.
#[derive(Debug, Default)]
pub struct SelectorBuilder {
    components: SmallVec<[Component; 16]>,
    current_len: usize,
}

impl SelectorBuilder {
    /// Pushes a simple selector onto the current compound selector.
    #[inline(always)]
    pub fn push_simple_selector(&mut self, ss: Component) {
        debug_assert!(!ss.is_combinator());
        self.components.push(ss);
        self.current_len += 1;
    }

    /// Completes the current compound selector and starts a new one,
    /// delimited by the given combinator.
    #[inline(always)]
    pub fn push_combinator(&mut self, c: Combinator) {
        self.components.push(Component::Combinator(c));
        self.current_len = 0;
    }

    /// Returns true if combinators have ever been pushed to this builder.
    #[inline(always)]
    pub fn has_combinators(&self) -> bool {
        self.current_len != self.components.len()
    }

    /// Returns true if no simple selector has been pushed to the current
    /// compound selector.
    #[inline(always)]
    pub fn current_compound_is_empty(&self) -> bool {
        self.current_len == 0
    }

    /// Drains the pushed components without computing a specificity, for
    /// the argument of a negation.
    pub fn take_components(&mut self) -> Box<[Component]> {
        self.current_len = 0;
        self.components.drain(..).collect()
    }

    /// Consumes the builder, producing a Selector.
    pub fn build(&mut self) -> Selector {
        let components: Box<[Component]> = self.components.drain(..).collect();
        self.current_len = 0;
        Selector::from_components(components)
    }
}

pub const MAX_10BIT: u32 = (1u32 << 10) - 1;

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Specificity {
    id_selectors: u32,
    class_like_selectors: u32,
    element_selectors: u32,
}

impl Specificity {
    pub fn new(ids: u32, classes: u32, elements: u32) -> Self {
        Specificity {
            id_selectors: ids,
            class_like_selectors: classes,
            element_selectors: elements,
        }
    }
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Specificity) -> Specificity {
        Specificity {
            id_selectors: self.id_selectors + rhs.id_selectors,
            class_like_selectors: self.class_like_selectors + rhs.class_like_selectors,
            element_selectors: self.element_selectors + rhs.element_selectors,
        }
    }
}

impl AddAssign for Specificity {
    fn add_assign(&mut self, rhs: Specificity) {
        *self = *self + rhs;
    }
}

impl From<u32> for Specificity {
    #[inline]
    fn from(value: u32) -> Specificity {
        debug_assert!(value <= MAX_10BIT << 20 | MAX_10BIT << 10 | MAX_10BIT);
        Specificity {
            id_selectors: value >> 20,
            class_like_selectors: (value >> 10) & MAX_10BIT,
            element_selectors: value & MAX_10BIT,
        }
    }
}

impl From<Specificity> for u32 {
    #[inline]
    fn from(specificity: Specificity) -> u32 {
        cmp::min(specificity.id_selectors, MAX_10BIT) << 20 |
            cmp::min(specificity.class_like_selectors, MAX_10BIT) << 10 |
            cmp::min(specificity.element_selectors, MAX_10BIT)
    }
}

/// Computes the packed specificity of a component sequence.
pub fn specificity(components: &[Component]) -> u32 {
    complex_selector_specificity(components).into()
}

fn complex_selector_specificity(components: &[Component]) -> Specificity {
    fn simple_selector_specificity(simple_selector: &Component, specificity: &mut Specificity) {
        match *simple_selector {
            Component::Combinator(..) => {},
            Component::LocalName(..) | Component::PseudoElement(..) => {
                specificity.element_selectors += 1
            },
            Component::ID(..) => specificity.id_selectors += 1,
            Component::Class(..) |
            Component::Attribute(..) |
            Component::FirstChild |
            Component::LastChild |
            Component::OnlyChild |
            Component::Root |
            Component::Empty |
            Component::NthChild(..) |
            Component::NthLastChild(..) |
            Component::NthOfType(..) |
            Component::NthLastOfType(..) |
            Component::FirstOfType |
            Component::LastOfType |
            Component::OnlyOfType |
            Component::NonTSPseudoClass(..) => specificity.class_like_selectors += 1,
            Component::ExplicitUniversalType | Component::Namespace(..) => {},
            Component::Negation(ref negated) => {
                for ss in negated.iter() {
                    simple_selector_specificity(ss, specificity);
                }
            },
        }
    }

    let mut specificity = Specificity::default();
    for simple_selector in components {
        simple_selector_specificity(simple_selector, &mut specificity);
    }
    specificity
}
