/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::attr::CaseSensitivity;
use crate::bloom::BloomFilter;
use crate::parser::{Combinator, Component, LocalName, NonTSPseudoClass, PseudoElement};
use crate::parser::{NUM_ANCESTOR_HASHES, Selector, SelectorIter, SelectorList};
use crate::tree::Element;
use bitflags::bitflags;

bitflags! {
    /// Set of flags that determine the different kind of elements affected by
    /// the selector matching process.
    ///
    /// This is used to implement efficient sharing.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct StyleRelations: u16 {
        /// Whether this element has matched any rule that is determined by a
        /// sibling (when using the `+` or `~` combinators).
        const AFFECTED_BY_SIBLINGS = 1 << 0;

        /// Whether this element has matched any rule whose matching is
        /// determined by its position in the tree (i.e., first-child,
        /// nth-child, etc.).
        const AFFECTED_BY_CHILD_INDEX = 1 << 1;

        /// Whether this flag is affected by any state (i.e., non
        /// tree-structural pseudo-class).
        const AFFECTED_BY_STATE = 1 << 2;

        /// Whether this element is affected by an ID selector.
        const AFFECTED_BY_ID_SELECTOR = 1 << 3;

        /// Whether this element is affected by a non-common style-affecting
        /// attribute.
        const AFFECTED_BY_NON_COMMON_STYLE_AFFECTING_ATTRIBUTE_SELECTOR = 1 << 4;

        /// Whether this element matches the :empty pseudo class.
        const AFFECTED_BY_EMPTY = 1 << 5;

        /// Whether this element has pseudo-element styles.
        const AFFECTED_BY_PSEUDO_ELEMENTS = 1 << 6;
    }
}

bitflags! {
    /// Which link states a selector can apply to, decided statically from its
    /// `:link` and `:visited` pseudo-classes.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct LinkMatchType: u8 {
        const MATCH_LINK = 1 << 0;
        const MATCH_VISITED = 1 << 1;
        const MATCH_ALL = Self::MATCH_LINK.bits() | Self::MATCH_VISITED.bits();
    }
}

/// A result of selector matching, includes 3 failure types,
///
///   NotMatchedAndRestartFromClosestLaterSibling
///   NotMatchedAndRestartFromClosestDescendant
///   NotMatchedGlobally
///
/// When NotMatchedGlobally appears, stop selector matching completely since
/// the succeeding selectors never matches.
/// It is raised when
///   Child combinator cannot find the candidate element.
///   Descendant combinator cannot find the candidate element.
///   A pseudo-element other than the requested one was found.
///
/// When NotMatchedAndRestartFromClosestDescendant appears, the selector
/// matching does backtracking and restarts from the closest Descendant
/// combinator. It is raised when
///   NextSibling combinator cannot find the candidate element.
///   LaterSibling combinator cannot find the candidate element.
///
/// When NotMatchedAndRestartFromClosestLaterSibling appears, the selector
/// matching does backtracking and restarts from the closest LaterSibling
/// combinator. It is raised when a compound selector fails on the element
/// it was tried against.
///
/// For example, when the selector "d1 d2 a" is provided and we cannot *find*
/// an appropriate ancestor element for "d1", this selector matching raises
/// NotMatchedGlobally since even if "d2" is moved to more upper element, the
/// candidates for "d1" becomes less than before.
///
/// The next example is siblings. When the selector "b1 + b2 ~ d1 a" is
/// provided and we cannot *find* an appropriate brother element for b1,
/// the selector matching raises NotMatchedAndRestartFromClosestDescendant.
/// The selectors ("b1 + b2 ~") doesn't match and matching restart from "d1".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectorMatchingResult {
    Matched,
    NotMatchedAndRestartFromClosestLaterSibling,
    NotMatchedAndRestartFromClosestDescendant,
    NotMatchedGlobally,
}

/// What the matcher is being asked for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchingMode {
    /// Computing the style of an element or one of its pseudo-elements.
    ResolvingStyle,
    /// Listing the rules that apply to an element, e.g. for an inspector.
    CollectingRules,
    /// `querySelector` and friends. Pseudo-elements never match and
    /// `:visited` is never honored.
    QueryingRules,
    /// Checking a style sharing candidate against the sibling and uncommon
    /// attribute rule sets.
    SharingRules,
}

/// The quirks mode of the document the element lives in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QuirksMode {
    Quirks,
    #[default]
    NoQuirks,
}

impl QuirksMode {
    /// Ids and classes match ASCII-case-insensitively in quirks mode.
    #[inline]
    pub fn classes_and_ids_case_sensitivity(self) -> CaseSensitivity {
        match self {
            QuirksMode::Quirks => CaseSensitivity::AsciiCaseInsensitive,
            QuirksMode::NoQuirks => CaseSensitivity::CaseSensitive,
        }
    }
}

/// Data associated with the matching process for an element. This context
/// is used across many selectors for an element, so it's not appropriate
/// for transient data that applies to only a single selector.
#[derive(Debug)]
pub struct MatchingContext<'a> {
    pub matching_mode: MatchingMode,
    /// The pseudo-element whose style is being resolved, if any.
    pub pseudo_element: Option<&'a PseudoElement>,
    /// Filter over the ancestors of the element.
    pub bloom_filter: Option<&'a BloomFilter>,
    pub quirks_mode: QuirksMode,
    /// Accumulated over every selector tried against the element.
    pub relations: StyleRelations,
    /// The dynamic pseudo-element named by the last selector that was
    /// matched.
    pub matched_pseudo_element: Option<PseudoElement>,
}

impl<'a> MatchingContext<'a> {
    pub fn new(
        matching_mode: MatchingMode,
        bloom_filter: Option<&'a BloomFilter>,
        quirks_mode: QuirksMode,
    ) -> Self {
        MatchingContext {
            matching_mode,
            pseudo_element: None,
            bloom_filter,
            quirks_mode,
            relations: StyleRelations::empty(),
            matched_pseudo_element: None,
        }
    }

    pub fn for_pseudo_element(
        pseudo_element: &'a PseudoElement,
        bloom_filter: Option<&'a BloomFilter>,
        quirks_mode: QuirksMode,
    ) -> Self {
        MatchingContext {
            pseudo_element: Some(pseudo_element),
            ..Self::new(MatchingMode::ResolvingStyle, bloom_filter, quirks_mode)
        }
    }

    #[inline]
    fn visited_matching_enabled(&self) -> bool {
        self.matching_mode != MatchingMode::QueryingRules
    }
}

/// Whether the ancestor filter rules out a selector with the given ancestor
/// hashes. Zero hashes terminate the list.
#[inline]
pub fn selector_may_match(hashes: &[u32; NUM_ANCESTOR_HASHES], bf: &BloomFilter) -> bool {
    hashes
        .iter()
        .take_while(|hash| **hash != 0)
        .all(|hash| bf.might_contain_hash(*hash))
}

/// Pseudo-classes that get their own rule buckets, since they depend on
/// dynamic state rather than on the shape of the tree.
pub fn is_common_pseudo_class(component: &Component) -> bool {
    matches!(
        *component,
        Component::NonTSPseudoClass(
            NonTSPseudoClass::Link |
                NonTSPseudoClass::Visited |
                NonTSPseudoClass::AnyLink |
                NonTSPseudoClass::Focus
        )
    )
}

/// Statically determines whether a selector can match a link in the
/// visited state, the unvisited state, or both.
///
/// `:visited` never matches other elements than the innermost link, so only
/// the compounds up to the first sibling combinator are looked at.
pub fn determine_link_match_type(selector: &Selector) -> LinkMatchType {
    let mut link_match_type = LinkMatchType::MATCH_ALL;
    let mut iter = selector.iter();
    loop {
        for component in &mut iter {
            match *component {
                // :not(:visited) is equivalent to :link. The parser rejects
                // nested negations.
                Component::Negation(ref negated) => {
                    for inner in negated.iter() {
                        match *inner {
                            Component::NonTSPseudoClass(NonTSPseudoClass::Visited) => {
                                link_match_type.remove(LinkMatchType::MATCH_VISITED)
                            },
                            Component::NonTSPseudoClass(NonTSPseudoClass::Link) => {
                                link_match_type.remove(LinkMatchType::MATCH_LINK)
                            },
                            _ => {},
                        }
                    }
                },
                Component::NonTSPseudoClass(NonTSPseudoClass::Link) => {
                    link_match_type.remove(LinkMatchType::MATCH_VISITED)
                },
                Component::NonTSPseudoClass(NonTSPseudoClass::Visited) => {
                    link_match_type.remove(LinkMatchType::MATCH_LINK)
                },
                _ => {},
            }
        }
        match iter.next_sequence() {
            None => return link_match_type,
            Some(combinator) if combinator.is_sibling() => return link_match_type,
            Some(_) if link_match_type != LinkMatchType::MATCH_ALL => return link_match_type,
            Some(_) => {},
        }
    }
}

/// Matches a selector against an element, reporting why it failed.
///
/// A selector ending in a dynamic pseudo-element reports `Matched` when no
/// pseudo-element was requested; the pseudo-element it named is left in
/// `context.matched_pseudo_element` for the caller to act on.
pub fn match_selector<E>(
    selector: &Selector,
    element: &E,
    context: &mut MatchingContext,
) -> SelectorMatchingResult
where
    E: Element,
{
    context.matched_pseudo_element = None;
    let visited_enabled = context.visited_matching_enabled();
    let result =
        matches_complex_selector_internal(selector.iter(), element, context, visited_enabled, true);
    if result == SelectorMatchingResult::Matched &&
        selector.combinators().next().is_some_and(|c| c.is_sibling())
    {
        context.relations |= StyleRelations::AFFECTED_BY_SIBLINGS;
    }
    result
}

/// Whether the element itself, or the requested pseudo-element of it,
/// matches the selector.
pub fn matches_selector<E>(selector: &Selector, element: &E, context: &mut MatchingContext) -> bool
where
    E: Element,
{
    if match_selector(selector, element, context) != SelectorMatchingResult::Matched {
        return false;
    }
    match (context.pseudo_element, context.matched_pseudo_element.as_ref()) {
        (None, None) => true,
        (None, Some(_)) => {
            context.relations |= StyleRelations::AFFECTED_BY_PSEUDO_ELEMENTS;
            false
        },
        (Some(requested), Some(matched)) => requested == matched,
        (Some(_), None) => false,
    }
}

pub fn matches_selector_list<E>(
    selector_list: &SelectorList,
    element: &E,
    context: &mut MatchingContext,
) -> bool
where
    E: Element,
{
    selector_list
        .iter()
        .any(|selector| matches_selector(selector, element, context))
}

/// Whether a selector only uses type, id and class selectors joined by
/// ancestor combinators, which is what `fast_matches_selector` handles.
pub fn can_use_fast_path(selector: &Selector) -> bool {
    selector.iter_raw_match_order().all(|component| match *component {
        Component::Combinator(combinator) => combinator.is_ancestor(),
        Component::ExplicitUniversalType |
        Component::LocalName(..) |
        Component::Namespace(..) |
        Component::ID(..) |
        Component::Class(..) => true,
        _ => false,
    })
}

/// Matches a selector accepted by `can_use_fast_path`. No relations are
/// recorded and pseudo-elements never take part.
pub fn fast_matches_selector<E>(selector: &Selector, element: &E, quirks_mode: QuirksMode) -> bool
where
    E: Element,
{
    debug_assert!(can_use_fast_path(selector));
    fast_matches_complex(selector.iter(), element, quirks_mode) == SelectorMatchingResult::Matched
}

fn fast_matches_complex<E>(
    mut selector_iter: SelectorIter,
    element: &E,
    quirks_mode: QuirksMode,
) -> SelectorMatchingResult
where
    E: Element,
{
    let case_sensitivity = quirks_mode.classes_and_ids_case_sensitivity();
    for component in &mut selector_iter {
        let matches = match *component {
            Component::ExplicitUniversalType => true,
            Component::LocalName(LocalName {
                ref name,
                ref lower_name,
            }) => {
                if element.is_html_element_in_html_document() {
                    element.local_name() == lower_name
                } else {
                    element.local_name() == name
                }
            },
            Component::Namespace(ref namespace) => element.namespace() == &namespace.url,
            Component::ID(ref id) => element.has_id(id, case_sensitivity),
            Component::Class(ref class) => element.has_class(class, case_sensitivity),
            _ => false,
        };
        if !matches {
            return SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling;
        }
    }

    match selector_iter.next_sequence() {
        None => SelectorMatchingResult::Matched,
        Some(Combinator::Child) => match element.parent_element() {
            None => SelectorMatchingResult::NotMatchedGlobally,
            Some(parent) => fast_matches_complex(selector_iter, &parent, quirks_mode),
        },
        Some(Combinator::Descendant) => {
            let mut next_element = element.parent_element();
            while let Some(ancestor) = next_element {
                match fast_matches_complex(selector_iter.clone(), &ancestor, quirks_mode) {
                    SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling => {},
                    result => return result,
                }
                next_element = ancestor.parent_element();
            }
            SelectorMatchingResult::NotMatchedGlobally
        },
        Some(_) => SelectorMatchingResult::NotMatchedGlobally,
    }
}

fn matches_complex_selector_internal<E>(
    mut selector_iter: SelectorIter,
    element: &E,
    context: &mut MatchingContext,
    visited_enabled: bool,
    rightmost: bool,
) -> SelectorMatchingResult
where
    E: Element,
{
    let element = match matches_compound_selector(&mut selector_iter, element, context, visited_enabled) {
        Ok(element) => element,
        Err(result) => return result,
    };

    if rightmost {
        // Bail out if this selector is irrelevant for the requested pseudo.
        if let Some(requested) = context.pseudo_element {
            if context.matched_pseudo_element.as_ref() != Some(requested) {
                return SelectorMatchingResult::NotMatchedGlobally;
            }
        }
    }

    let combinator = match selector_iter.next_sequence() {
        None => return SelectorMatchingResult::Matched,
        Some(c) => c,
    };

    // Disable :visited matching when we see the first link or try to match
    // anything else than an ancestor.
    let visited_enabled = visited_enabled && combinator.is_ancestor() && !element.is_link();

    match combinator {
        Combinator::Descendant => {
            let mut next_element = element.parent_element();
            while let Some(ancestor) = next_element {
                let result = matches_complex_selector_internal(
                    selector_iter.clone(),
                    &ancestor,
                    context,
                    visited_enabled,
                    false,
                );
                match result {
                    SelectorMatchingResult::Matched | SelectorMatchingResult::NotMatchedGlobally => {
                        return result;
                    },
                    _ => {},
                }
                next_element = ancestor.parent_element();
            }
            SelectorMatchingResult::NotMatchedGlobally
        },
        Combinator::Child => match element.parent_element() {
            None => SelectorMatchingResult::NotMatchedGlobally,
            Some(parent) => {
                matches_complex_selector_internal(selector_iter, &parent, context, visited_enabled, false)
            },
        },
        Combinator::NextSibling => match element.prev_sibling_element() {
            None => SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant,
            Some(sibling) => {
                matches_complex_selector_internal(selector_iter, &sibling, context, visited_enabled, false)
            },
        },
        Combinator::LaterSibling => {
            let mut next_element = element.prev_sibling_element();
            while let Some(sibling) = next_element {
                let result = matches_complex_selector_internal(
                    selector_iter.clone(),
                    &sibling,
                    context,
                    visited_enabled,
                    false,
                );
                match result {
                    SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling => {},
                    _ => return result,
                }
                next_element = sibling.prev_sibling_element();
            }
            SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant
        },
    }
}

/// Matches the current compound selector of `selector_iter`. Returns the
/// element the next combinator starts from, which is the shadow host after
/// a custom pseudo-element.
fn matches_compound_selector<E>(
    selector_iter: &mut SelectorIter,
    element: &E,
    context: &mut MatchingContext,
    visited_enabled: bool,
) -> Result<E, SelectorMatchingResult>
where
    E: Element,
{
    let mut element = element.clone();
    for component in selector_iter {
        if let Component::PseudoElement(ref pseudo) = *component {
            element = match_pseudo_element(pseudo, element, context)?;
            continue;
        }
        if !matches_simple_selector(component, &element, context, visited_enabled) {
            return Err(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling);
        }
    }
    Ok(element)
}

fn match_pseudo_element<E>(
    pseudo: &PseudoElement,
    element: E,
    context: &mut MatchingContext,
) -> Result<E, SelectorMatchingResult>
where
    E: Element,
{
    if context.matching_mode == MatchingMode::QueryingRules {
        return Err(SelectorMatchingResult::NotMatchedGlobally);
    }
    let shadow_name = match *pseudo {
        PseudoElement::Custom(ref name) => Some(&**name),
        PseudoElement::Cue => Some("cue"),
        _ => None,
    };
    let Some(shadow_name) = shadow_name else {
        context.matched_pseudo_element = Some(pseudo.clone());
        context.relations |= StyleRelations::AFFECTED_BY_PSEUDO_ELEMENTS;
        return Ok(element);
    };
    if element.custom_pseudo_element().is_none_or(|name| &**name != shadow_name) {
        return Err(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling);
    }
    element
        .containing_shadow_host()
        .ok_or(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling)
}

/// Determines whether the given element matches the given single selector.
///
/// NB: If you add support for any new kinds of selectors to this routine, be
/// sure to set the relevant `StyleRelations` flag, otherwise elements will
/// start mistakenly sharing styles.
fn matches_simple_selector<E>(
    selector: &Component,
    element: &E,
    context: &mut MatchingContext,
    visited_enabled: bool,
) -> bool
where
    E: Element,
{
    macro_rules! relation_if {
        ($ex:expr, $flag:ident) => {
            if $ex {
                context.relations |= StyleRelations::$flag;
                true
            } else {
                false
            }
        };
    }

    match *selector {
        Component::Combinator(_) => unreachable!(),
        Component::PseudoElement(_) => false,
        Component::ExplicitUniversalType => true,
        Component::LocalName(LocalName {
            ref name,
            ref lower_name,
        }) => {
            let name = if element.is_html_element_in_html_document() {
                lower_name
            } else {
                name
            };
            element.local_name() == name
        },
        Component::Namespace(ref namespace) => element.namespace() == &namespace.url,
        Component::ID(ref id) => {
            let case_sensitivity = context.quirks_mode.classes_and_ids_case_sensitivity();
            relation_if!(element.has_id(id, case_sensitivity), AFFECTED_BY_ID_SELECTOR)
        },
        Component::Class(ref class) => {
            element.has_class(class, context.quirks_mode.classes_and_ids_case_sensitivity())
        },
        Component::Attribute(ref attr) => {
            if attr.never_matches {
                return false;
            }
            let is_html = element.is_html_element_in_html_document();
            relation_if!(
                element.attr_matches(
                    &attr.namespace,
                    attr.local_name_for(is_html),
                    &attr.operation.as_str(),
                ),
                AFFECTED_BY_NON_COMMON_STYLE_AFFECTING_ATTRIBUTE_SELECTOR
            )
        },
        Component::NonTSPseudoClass(ref pc) => {
            context.relations |= StyleRelations::AFFECTED_BY_STATE;
            match *pc {
                NonTSPseudoClass::Link | NonTSPseudoClass::AnyLink => element.is_link(),
                NonTSPseudoClass::Visited => visited_enabled && element.is_link(),
                _ => element.match_non_ts_pseudo_class(pc),
            }
        },
        Component::FirstChild => {
            relation_if!(matches_first_child(element), AFFECTED_BY_CHILD_INDEX)
        },
        Component::LastChild => {
            relation_if!(matches_last_child(element), AFFECTED_BY_CHILD_INDEX)
        },
        Component::OnlyChild => relation_if!(
            matches_first_child(element) && matches_last_child(element),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::Root => element.is_root(),
        Component::Empty => relation_if!(element.is_empty(), AFFECTED_BY_EMPTY),
        Component::NthChild(a, b) => relation_if!(
            matches_generic_nth_child(element, a, b, false, false),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::NthLastChild(a, b) => relation_if!(
            matches_generic_nth_child(element, a, b, false, true),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::NthOfType(a, b) => relation_if!(
            matches_generic_nth_child(element, a, b, true, false),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::NthLastOfType(a, b) => relation_if!(
            matches_generic_nth_child(element, a, b, true, true),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::FirstOfType => relation_if!(
            matches_generic_nth_child(element, 0, 1, true, false),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::LastOfType => relation_if!(
            matches_generic_nth_child(element, 0, 1, true, true),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::OnlyOfType => relation_if!(
            matches_generic_nth_child(element, 0, 1, true, false) &&
                matches_generic_nth_child(element, 0, 1, true, true),
            AFFECTED_BY_CHILD_INDEX
        ),
        Component::Negation(ref negated) => {
            // We select between :visited and :link when applying, so neither
            // is known to have matched yet.
            !negated.iter().all(|ss| match *ss {
                Component::NonTSPseudoClass(NonTSPseudoClass::Visited) => false,
                Component::NonTSPseudoClass(NonTSPseudoClass::Link) if visited_enabled => false,
                _ => matches_simple_selector(ss, element, context, visited_enabled),
            })
        },
    }
}

fn matches_generic_nth_child<E>(
    element: &E,
    a: i32,
    b: i32,
    is_of_type: bool,
    is_from_end: bool,
) -> bool
where
    E: Element,
{
    // Selectors Level 4 changed from Level 3:
    // This can match without a parent element:
    // https://drafts.csswg.org/selectors-4/#child-index

    let mut index: i32 = 1;
    let mut next_sibling = if is_from_end {
        element.next_sibling_element()
    } else {
        element.prev_sibling_element()
    };

    while let Some(sibling) = next_sibling {
        if !is_of_type ||
            (element.local_name() == sibling.local_name() &&
                element.namespace() == sibling.namespace())
        {
            index += 1;
        }
        next_sibling = if is_from_end {
            sibling.next_sibling_element()
        } else {
            sibling.prev_sibling_element()
        };
    }

    if a == 0 {
        return b == index;
    }
    // `b` may be as low as `i32::MIN`, so solve `an + b = index` in i64.
    let (a, an) = (i64::from(a), i64::from(index) - i64::from(b));
    an / a >= 0 && an % a == 0
}

#[inline]
fn matches_first_child<E: Element>(element: &E) -> bool {
    element.prev_sibling_element().is_none()
}

#[inline]
fn matches_last_child<E: Element>(element: &E) -> bool {
    element.next_sibling_element().is_none()
}
