/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::Atom;
use crate::attr::{AttrSelector, AttrSelectorOperation, AttrSelectorOperator, CaseSensitivity};
use crate::attr::NamespaceConstraint;
use crate::bloom::hash_atom;
use crate::builder::{SelectorBuilder, specificity};
use cssparser::{BasicParseError, BasicParseErrorKind, CowRcStr, ParseError, SourceLocation};
use cssparser::{Parser as CssParser, ToCss, Token, match_ignore_ascii_case, parse_nth};
use cssparser::serialize_identifier;
use std::fmt::{self, Debug};
use std::iter::Rev;
use std::slice;

/// The whitespace characters that separate the values of `~=`.
pub const SELECTOR_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0C'];

/// How many ancestor identifiers a selector records for bloom filtering.
pub const NUM_ANCESTOR_HASHES: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub enum SelectorParseErrorKind<'i> {
    EmptySelector,
    DanglingCombinator,
    NonSimpleSelectorInNegation,
    NestedNegation,
    EmptyNegation,
    PseudoElementInNegation,
    UnexpectedSelectorAfterPseudoElement(Token<'i>),
    NoQualifiedNameInAttributeSelector(Token<'i>),
    UnexpectedTokenInAttributeSelector(Token<'i>),
    BadValueInAttr(Token<'i>),
    InvalidQualNameInAttr(Token<'i>),
    ExplicitNamespaceUnexpectedToken(Token<'i>),
    ClassNeedsIdent(Token<'i>),
    PseudoElementExpectedIdent(Token<'i>),
    NoIdentForPseudo(Token<'i>),
    UnsupportedPseudoClassOrElement(CowRcStr<'i>),
    ExpectedNamespace(CowRcStr<'i>),
}

/// The namespace lookups a selector parser needs from its surrounding
/// stylesheet.
pub trait Parser<'i> {
    type Error: 'i + From<SelectorParseErrorKind<'i>>;

    fn default_namespace(&self) -> Option<Atom> {
        None
    }

    fn namespace_for_prefix(&self, _prefix: &Atom) -> Option<Atom> {
        None
    }
}

/// A comma-separated list of complex selectors.
#[derive(Clone, Eq, PartialEq)]
pub struct SelectorList(pub Vec<Selector>);

impl SelectorList {
    /// Parse a comma-separated list of Selectors.
    /// <https://drafts.csswg.org/selectors/#grouping>
    ///
    /// Return the Selectors or Err if there is an invalid selector.
    pub fn parse<'i, 't, P>(
        parser: &P,
        input: &mut CssParser<'i, 't>,
    ) -> Result<Self, ParseError<'i, P::Error>>
    where
        P: Parser<'i>,
    {
        input
            .parse_comma_separated(|input| parse_selector(parser, input))
            .map(SelectorList)
    }

    pub fn from_vec(selectors: Vec<Selector>) -> Self {
        SelectorList(selectors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Selector> {
        self.0.iter()
    }

    /// The total number of simple selectors over every selector of the
    /// list.
    pub fn component_count(&self) -> usize {
        self.0.iter().map(|s| s.component_count()).sum()
    }
}

impl Debug for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.to_css(f)
    }
}

impl ToCss for SelectorList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            first.to_css(dest)?;
        }
        for selector in iter {
            dest.write_str(", ")?;
            selector.to_css(dest)?;
        }
        Ok(())
    }
}

/// A complex selector with its specificity computed at build time.
///
/// Components are stored in parse order; matching walks them right to left
/// through `SelectorIter`.
#[derive(Clone, Eq, PartialEq)]
pub struct Selector {
    components: Box<[Component]>,
    specificity: u32,
}

impl Selector {
    pub fn from_components(components: Box<[Component]>) -> Self {
        let specificity = specificity(&components);
        Selector {
            components,
            specificity,
        }
    }

    /// Builds a selector out of a parse-ordered vector of components.
    pub fn from_vec(components: Vec<Component>) -> Self {
        Self::from_components(components.into_boxed_slice())
    }

    #[inline]
    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    /// The pseudo-element of this selector, if any. It can only be the last
    /// simple selector of the rightmost compound.
    pub fn pseudo_element(&self) -> Option<&PseudoElement> {
        match self.components.last() {
            Some(Component::PseudoElement(pseudo)) => Some(pseudo),
            _ => None,
        }
    }

    #[inline]
    pub fn has_pseudo_element(&self) -> bool {
        self.pseudo_element().is_some()
    }

    /// Returns an iterator over the rightmost compound selector, which can be
    /// advanced to the compounds to its left with `next_sequence`.
    #[inline]
    pub fn iter(&self) -> SelectorIter<'_> {
        SelectorIter {
            iter: self.components.iter().rev(),
            next_combinator: None,
        }
    }

    /// Returns an iterator over the entire sequence of simple selectors and
    /// combinators, from right to left.
    pub fn iter_raw_match_order(&self) -> Rev<slice::Iter<'_, Component>> {
        self.components.iter().rev()
    }

    /// Returns an iterator over the entire sequence of simple selectors and
    /// combinators, from left to right.
    pub fn iter_raw_parse_order(&self) -> slice::Iter<'_, Component> {
        self.components.iter()
    }

    /// The number of simple selectors, not counting combinators.
    pub fn component_count(&self) -> usize {
        self.components.iter().filter(|c| !c.is_combinator()).count()
    }

    /// Returns the combinators of this selector, right to left.
    pub fn combinators(&self) -> impl Iterator<Item = Combinator> + '_ {
        self.iter_raw_match_order().filter_map(|c| c.as_combinator())
    }

    /// Identifiers that an ancestor of any matching element must carry, for
    /// the bloom filter fast-reject.
    pub fn ancestor_hashes(&self) -> [u32; NUM_ANCESTOR_HASHES] {
        let mut hashes = [0; NUM_ANCESTOR_HASHES];
        let mut len = 0;
        for hash in AncestorIter::new(self.iter()).filter_map(|c| c.ancestor_hash()) {
            if len == NUM_ANCESTOR_HASHES {
                break;
            }
            hashes[len] = hash;
            len += 1;
        }
        hashes
    }
}

impl Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Selector(")?;
        self.to_css(f)?;
        write!(f, ", specificity = 0x{:x})", self.specificity)
    }
}

#[derive(Clone)]
pub struct SelectorIter<'a> {
    iter: Rev<slice::Iter<'a, Component>>,
    next_combinator: Option<Combinator>,
}

impl<'a> SelectorIter<'a> {
    /// Prepares this iterator to point to the next sequence to the left,
    /// returning the combinator if the sequence was found.
    #[inline]
    pub fn next_sequence(&mut self) -> Option<Combinator> {
        self.next_combinator.take()
    }

    /// Returns the combinator that ended the current compound, without
    /// consuming it.
    #[inline]
    pub fn peek_combinator(&self) -> Option<Combinator> {
        self.next_combinator
    }
}

impl<'a> Iterator for SelectorIter<'a> {
    type Item = &'a Component;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        debug_assert!(
            self.next_combinator.is_none(),
            "You should call next_sequence!"
        );
        match *self.iter.next()? {
            Component::Combinator(c) => {
                self.next_combinator = Some(c);
                None
            },
            ref x => Some(x),
        }
    }
}

/// An iterator over all simple selectors belonging to ancestors.
struct AncestorIter<'a>(SelectorIter<'a>);

impl<'a> AncestorIter<'a> {
    /// Creates an AncestorIter. The passed-in iterator is assumed to point to
    /// the beginning of the child sequence, which will be skipped.
    fn new(inner: SelectorIter<'a>) -> Self {
        let mut result = AncestorIter(inner);
        result.skip_until_ancestor();
        result
    }

    /// Skips a sequence of simple selectors and all subsequent sequences until
    /// a non-pseudo-element ancestor combinator is reached.
    fn skip_until_ancestor(&mut self) {
        loop {
            while self.0.next().is_some() {}
            if self.0.next_sequence().is_none_or(|x| x.is_ancestor()) {
                break;
            }
        }
    }
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        // Grab the next simple selector in the sequence if available.
        let next = self.0.next();
        if next.is_some() {
            return next;
        }

        // See if there are more sequences. If so, skip any non-ancestor sequences.
        if let Some(combinator) = self.0.next_sequence() {
            if !combinator.is_ancestor() {
                self.skip_until_ancestor();
            }
        }

        self.0.next()
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Combinator {
    Child,        //  >
    Descendant,   // space
    NextSibling,  // +
    LaterSibling, // ~
}

impl Combinator {
    /// Returns true if this combinator is a child or descendant combinator.
    #[inline]
    pub fn is_ancestor(&self) -> bool {
        matches!(*self, Combinator::Child | Combinator::Descendant)
    }

    /// Returns true if this combinator is a next- or later-sibling combinator.
    #[inline]
    pub fn is_sibling(&self) -> bool {
        matches!(*self, Combinator::NextSibling | Combinator::LaterSibling)
    }
}

/// A type selector's local name, with its ASCII-lowercased form used for HTML
/// elements in HTML documents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalName {
    pub name: Atom,
    pub lower_name: Atom,
}

impl LocalName {
    pub fn new(name: &str) -> Self {
        LocalName {
            name: Atom::from(name),
            lower_name: Atom::from(name.to_ascii_lowercase()),
        }
    }
}

/// An explicit or default namespace restriction of a type selector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Namespace {
    pub prefix: Option<Atom>,
    pub url: Atom,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
    AnyLink,
    Focus,
    Hover,
    Active,
    Checked,
    Disabled,
    Enabled,
    Target,
}

impl NonTSPseudoClass {
    fn parse(name: &str) -> Option<Self> {
        Some(match_ignore_ascii_case! { name,
            "link" => NonTSPseudoClass::Link,
            "visited" => NonTSPseudoClass::Visited,
            "any-link" => NonTSPseudoClass::AnyLink,
            "-webkit-any-link" => NonTSPseudoClass::AnyLink,
            "focus" => NonTSPseudoClass::Focus,
            "hover" => NonTSPseudoClass::Hover,
            "active" => NonTSPseudoClass::Active,
            "checked" => NonTSPseudoClass::Checked,
            "disabled" => NonTSPseudoClass::Disabled,
            "enabled" => NonTSPseudoClass::Enabled,
            "target" => NonTSPseudoClass::Target,
            _ => return None,
        })
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            NonTSPseudoClass::Link => ":link",
            NonTSPseudoClass::Visited => ":visited",
            NonTSPseudoClass::AnyLink => ":any-link",
            NonTSPseudoClass::Focus => ":focus",
            NonTSPseudoClass::Hover => ":hover",
            NonTSPseudoClass::Active => ":active",
            NonTSPseudoClass::Checked => ":checked",
            NonTSPseudoClass::Disabled => ":disabled",
            NonTSPseudoClass::Enabled => ":enabled",
            NonTSPseudoClass::Target => ":target",
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PseudoElement {
    Before,
    After,
    FirstLine,
    FirstLetter,
    Selection,
    /// `::cue`, for media text tracks.
    Cue,
    /// A `::-webkit-*` pseudo-element exposed by a user-agent shadow tree.
    Custom(Atom),
}

impl PseudoElement {
    /// Whether this pseudo-element is resolved as a separate style of its
    /// originating element, as opposed to matching a shadow tree element.
    pub fn is_dynamic(&self) -> bool {
        !matches!(*self, PseudoElement::Custom(..) | PseudoElement::Cue)
    }
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            PseudoElement::Before => dest.write_str("::before"),
            PseudoElement::After => dest.write_str("::after"),
            PseudoElement::FirstLine => dest.write_str("::first-line"),
            PseudoElement::FirstLetter => dest.write_str("::first-letter"),
            PseudoElement::Selection => dest.write_str("::selection"),
            PseudoElement::Cue => dest.write_str("::cue"),
            PseudoElement::Custom(ref name) => {
                dest.write_str("::")?;
                serialize_identifier(name, dest)
            },
        }
    }
}

/// A CSS simple selector or combinator. We store both in the same enum for
/// optimal packing and cache performance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Component {
    Combinator(Combinator),
    ExplicitUniversalType,
    LocalName(LocalName),
    Namespace(Namespace),
    ID(Atom),
    Class(Atom),
    Attribute(Box<AttrSelector>),

    // Pseudo-classes
    //
    // The negation only takes a compound selector without pseudo-elements or
    // nested negations.
    Negation(Box<[Component]>),
    FirstChild,
    LastChild,
    OnlyChild,
    Root,
    Empty,
    NthChild(i32, i32),
    NthLastChild(i32, i32),
    NthOfType(i32, i32),
    NthLastOfType(i32, i32),
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NonTSPseudoClass(NonTSPseudoClass),
    PseudoElement(PseudoElement),
}

impl Component {
    /// Compute the ancestor hash to check against the bloom filter.
    fn ancestor_hash(&self) -> Option<u32> {
        match *self {
            Component::LocalName(LocalName {
                ref name,
                ref lower_name,
            }) => {
                // Only insert the local-name into the filter if it's all lowercase.
                // Otherwise we would need to test both hashes, and our data structures
                // aren't really set up for that.
                if name == lower_name {
                    Some(hash_atom(name))
                } else {
                    None
                }
            },
            Component::ID(ref id) => Some(hash_atom(id)),
            Component::Class(ref class) => Some(hash_atom(class)),
            _ => None,
        }
    }

    /// Returns true if this is a combinator.
    #[inline]
    pub fn is_combinator(&self) -> bool {
        matches!(*self, Component::Combinator(_))
    }

    /// Returns the value as a combinator if applicable, None otherwise.
    pub fn as_combinator(&self) -> Option<Combinator> {
        match *self {
            Component::Combinator(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this is one of the tree-structural pseudo-classes whose result
    /// depends on the element's siblings.
    pub fn is_structural_sibling_pseudo_class(&self) -> bool {
        matches!(
            *self,
            Component::FirstChild |
                Component::LastChild |
                Component::OnlyChild |
                Component::NthChild(..) |
                Component::NthLastChild(..) |
                Component::NthOfType(..) |
                Component::NthLastOfType(..) |
                Component::FirstOfType |
                Component::LastOfType |
                Component::OnlyOfType
        )
    }
}

impl ToCss for Selector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for item in self.iter_raw_parse_order() {
            item.to_css(dest)?;
        }
        Ok(())
    }
}

impl ToCss for Combinator {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            Combinator::Child => dest.write_str(" > "),
            Combinator::Descendant => dest.write_str(" "),
            Combinator::NextSibling => dest.write_str(" + "),
            Combinator::LaterSibling => dest.write_str(" ~ "),
        }
    }
}

impl ToCss for Component {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        use self::Component::*;
        match *self {
            Combinator(ref c) => c.to_css(dest),
            ExplicitUniversalType => dest.write_char('*'),
            LocalName(ref s) => serialize_identifier(&s.name, dest),
            Namespace(ref ns) => match ns.prefix {
                Some(ref prefix) => {
                    serialize_identifier(prefix, dest)?;
                    dest.write_char('|')
                },
                None if ns.url.is_empty() => dest.write_char('|'),
                None => Ok(()),
            },
            ID(ref s) => {
                dest.write_char('#')?;
                serialize_identifier(s, dest)
            },
            Class(ref s) => {
                dest.write_char('.')?;
                serialize_identifier(s, dest)
            },
            Attribute(ref attr) => attr.to_css(dest),
            Negation(ref arg) => {
                dest.write_str(":not(")?;
                for component in arg.iter() {
                    component.to_css(dest)?;
                }
                dest.write_str(")")
            },
            FirstChild => dest.write_str(":first-child"),
            LastChild => dest.write_str(":last-child"),
            OnlyChild => dest.write_str(":only-child"),
            Root => dest.write_str(":root"),
            Empty => dest.write_str(":empty"),
            FirstOfType => dest.write_str(":first-of-type"),
            LastOfType => dest.write_str(":last-of-type"),
            OnlyOfType => dest.write_str(":only-of-type"),
            NthChild(a, b) => write!(dest, ":nth-child({}n{:+})", a, b),
            NthLastChild(a, b) => write!(dest, ":nth-last-child({}n{:+})", a, b),
            NthOfType(a, b) => write!(dest, ":nth-of-type({}n{:+})", a, b),
            NthLastOfType(a, b) => write!(dest, ":nth-last-of-type({}n{:+})", a, b),
            NonTSPseudoClass(ref pseudo) => pseudo.to_css(dest),
            PseudoElement(ref pseudo) => pseudo.to_css(dest),
        }
    }
}

/// Build up a Selector.
/// selector : simple_selector_sequence [ combinator simple_selector_sequence ]* ;
///
/// `Err` means invalid selector.
fn parse_selector<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
) -> Result<Selector, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let mut builder = SelectorBuilder::default();

    'outer_loop: loop {
        // Parse a sequence of simple selectors.
        let has_pseudo_element = match parse_compound_selector(parser, input, &mut builder)? {
            Some(has_pseudo_element) => has_pseudo_element,
            None => {
                let error = if builder.has_combinators() {
                    SelectorParseErrorKind::DanglingCombinator
                } else {
                    SelectorParseErrorKind::EmptySelector
                };
                return Err(input.new_custom_error(error));
            },
        };
        if has_pseudo_element {
            // Nothing may follow a pseudo-element; leftover tokens make the
            // enclosing comma-separated parse fail.
            break;
        }

        // Parse a combinator.
        let combinator;
        let mut any_whitespace = false;
        loop {
            let before_this_token = input.state();
            match input.next_including_whitespace() {
                Err(_e) => break 'outer_loop,
                Ok(&Token::WhiteSpace(_)) => any_whitespace = true,
                Ok(&Token::Delim('>')) => {
                    combinator = Combinator::Child;
                    break;
                },
                Ok(&Token::Delim('+')) => {
                    combinator = Combinator::NextSibling;
                    break;
                },
                Ok(&Token::Delim('~')) => {
                    combinator = Combinator::LaterSibling;
                    break;
                },
                Ok(_) => {
                    input.reset(&before_this_token);
                    if any_whitespace {
                        combinator = Combinator::Descendant;
                        break;
                    } else {
                        break 'outer_loop;
                    }
                },
            }
        }
        builder.push_combinator(combinator);
    }

    Ok(builder.build())
}

/// The namespace part of a qualified name, as written.
#[derive(Debug)]
enum QNamePrefix {
    /// No prefix: the default namespace for type selectors, no namespace for
    /// attributes.
    Implicit,
    /// `*|`
    ExplicitAny,
    /// `|`
    ExplicitNoNamespace,
    /// `prefix|`
    Explicit(Atom, Atom),
}

/// * `Err(_)`: Invalid selector, abort
/// * `Ok(false)`: Not a type selector, could be something else. `input` was not consumed.
/// * `Ok(true)`: Length 0 (`*|*`), 1 (`*|E` or `ns|*`) or 2 (`|E` or `ns|E`)
fn parse_type_selector<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
    builder: &mut SelectorBuilder,
    inside_negation: bool,
) -> Result<bool, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let (namespace, local_name) = match parse_qualified_name(parser, input, false)? {
        None => return Ok(false),
        Some(qname) => qname,
    };
    match namespace {
        QNamePrefix::Implicit => {
            // Note that this doesn't apply to :not() per spec.
            if !inside_negation {
                if let Some(url) = parser.default_namespace() {
                    builder.push_simple_selector(Component::Namespace(Namespace {
                        prefix: None,
                        url,
                    }));
                }
            }
        },
        QNamePrefix::ExplicitAny => {},
        QNamePrefix::ExplicitNoNamespace => {
            builder.push_simple_selector(Component::Namespace(Namespace {
                prefix: None,
                url: Atom::from(""),
            }));
        },
        QNamePrefix::Explicit(prefix, url) => {
            builder.push_simple_selector(Component::Namespace(Namespace {
                prefix: Some(prefix),
                url,
            }));
        },
    }
    match local_name {
        Some(name) => builder.push_simple_selector(Component::LocalName(LocalName::new(&name))),
        None => builder.push_simple_selector(Component::ExplicitUniversalType),
    }
    Ok(true)
}

#[derive(Debug)]
enum SimpleSelectorParseResult {
    SimpleSelector(Component),
    PseudoElement(PseudoElement),
}

/// * `Err(_)`: Invalid selector, abort
/// * `Ok(None)`: Not a simple selector, could be something else. `input` was not consumed.
/// * `Ok(Some((namespace, local_name)))`: `None` for the local name means a `*` universal selector
fn parse_qualified_name<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
    in_attr_selector: bool,
) -> Result<Option<(QNamePrefix, Option<CowRcStr<'i>>)>, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let start = input.state();
    let token = match input.next_including_whitespace() {
        Ok(token) => token.clone(),
        Err(_) => {
            input.reset(&start);
            return Ok(None);
        },
    };

    match token {
        Token::Ident(value) => {
            let after_ident = input.state();
            match input.next_including_whitespace() {
                Ok(&Token::Delim('|')) => {
                    let prefix = Atom::from(&*value);
                    let url = match parser.namespace_for_prefix(&prefix) {
                        Some(url) => url,
                        None => {
                            return Err(after_ident.source_location().new_custom_error(
                                SelectorParseErrorKind::ExpectedNamespace(value),
                            ));
                        },
                    };
                    explicit_namespace(input, QNamePrefix::Explicit(prefix, url), in_attr_selector)
                        .map(Some)
                },
                _ => {
                    input.reset(&after_ident);
                    Ok(Some((QNamePrefix::Implicit, Some(value))))
                },
            }
        },
        Token::Delim('*') => {
            let after_star = input.state();
            match input.next_including_whitespace() {
                Ok(&Token::Delim('|')) => {
                    explicit_namespace(input, QNamePrefix::ExplicitAny, in_attr_selector).map(Some)
                },
                _ if in_attr_selector => Err(after_star
                    .source_location()
                    .new_custom_error(SelectorParseErrorKind::InvalidQualNameInAttr(token))),
                _ => {
                    input.reset(&after_star);
                    Ok(Some((QNamePrefix::Implicit, None)))
                },
            }
        },
        Token::Delim('|') => {
            explicit_namespace(input, QNamePrefix::ExplicitNoNamespace, in_attr_selector).map(Some)
        },
        _ => {
            input.reset(&start);
            Ok(None)
        },
    }
}

fn explicit_namespace<'i, 't, E>(
    input: &mut CssParser<'i, 't>,
    prefix: QNamePrefix,
    in_attr_selector: bool,
) -> Result<(QNamePrefix, Option<CowRcStr<'i>>), ParseError<'i, E>>
where
    E: From<SelectorParseErrorKind<'i>>,
{
    let location = input.current_source_location();
    match input.next_including_whitespace() {
        Ok(&Token::Delim('*')) if !in_attr_selector => Ok((prefix, None)),
        Ok(&Token::Ident(ref local_name)) => Ok((prefix, Some(local_name.clone()))),
        Ok(t) if in_attr_selector => {
            let t = t.clone();
            Err(location.new_custom_error(SelectorParseErrorKind::InvalidQualNameInAttr(t)))
        },
        Ok(t) => {
            let t = t.clone();
            Err(location.new_custom_error(SelectorParseErrorKind::ExplicitNamespaceUnexpectedToken(t)))
        },
        Err(e) => Err(e.into()),
    }
}

fn parse_attribute_selector<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
) -> Result<Component, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let location = input.current_source_location();
    let (prefix, local_name) = match parse_qualified_name(parser, input, true)? {
        Some((prefix, Some(local_name))) => (prefix, local_name),
        Some((_, None)) => {
            return Err(location.new_custom_error(
                SelectorParseErrorKind::InvalidQualNameInAttr(Token::Delim('*')),
            ));
        },
        None => {
            let t = input.next()?.clone();
            return Err(location
                .new_custom_error(SelectorParseErrorKind::NoQualifiedNameInAttributeSelector(t)));
        },
    };

    let namespace = match prefix {
        QNamePrefix::Implicit | QNamePrefix::ExplicitNoNamespace => NamespaceConstraint::none(),
        QNamePrefix::ExplicitAny => NamespaceConstraint::Any,
        QNamePrefix::Explicit(prefix, url) => NamespaceConstraint::Specific {
            prefix: Some(prefix),
            url,
        },
    };
    let local_name_lower = Atom::from(local_name.to_ascii_lowercase());
    let local_name = Atom::from(&*local_name);

    let location = input.current_source_location();
    let operator = match input.next() {
        // [foo]
        Err(_) => {
            return Ok(Component::Attribute(Box::new(AttrSelector {
                namespace,
                local_name,
                local_name_lower,
                operation: AttrSelectorOperation::Exists,
                never_matches: false,
            })));
        },
        // [foo=bar]
        Ok(&Token::Delim('=')) => AttrSelectorOperator::Equal,
        // [foo~=bar]
        Ok(&Token::IncludeMatch) => AttrSelectorOperator::Includes,
        // [foo|=bar]
        Ok(&Token::DashMatch) => AttrSelectorOperator::DashMatch,
        // [foo^=bar]
        Ok(&Token::PrefixMatch) => AttrSelectorOperator::Prefix,
        // [foo*=bar]
        Ok(&Token::SubstringMatch) => AttrSelectorOperator::Substring,
        // [foo$=bar]
        Ok(&Token::SuffixMatch) => AttrSelectorOperator::Suffix,
        Ok(t) => {
            let t = t.clone();
            return Err(location
                .new_custom_error(SelectorParseErrorKind::UnexpectedTokenInAttributeSelector(t)));
        },
    };

    let value = match input.expect_ident_or_string() {
        Ok(value) => value.clone(),
        Err(BasicParseError {
            kind: BasicParseErrorKind::UnexpectedToken(t),
            location,
        }) => return Err(location.new_custom_error(SelectorParseErrorKind::BadValueInAttr(t))),
        Err(e) => return Err(e.into()),
    };
    let never_matches = match operator {
        AttrSelectorOperator::Equal | AttrSelectorOperator::DashMatch => false,
        AttrSelectorOperator::Includes => value.is_empty() || value.contains(SELECTOR_WHITESPACE),
        AttrSelectorOperator::Prefix |
        AttrSelectorOperator::Substring |
        AttrSelectorOperator::Suffix => value.is_empty(),
    };
    let case_sensitivity = parse_attribute_flags(input)?;

    Ok(Component::Attribute(Box::new(AttrSelector {
        namespace,
        local_name,
        local_name_lower,
        operation: AttrSelectorOperation::WithValue {
            operator,
            case_sensitivity,
            value: value.to_string(),
        },
        never_matches,
    })))
}

fn parse_attribute_flags<'i, 't, E>(
    input: &mut CssParser<'i, 't>,
) -> Result<CaseSensitivity, ParseError<'i, E>> {
    let location = input.current_source_location();
    match input.next() {
        Err(_) => Ok(CaseSensitivity::CaseSensitive),
        Ok(&Token::Ident(ref value)) if value.eq_ignore_ascii_case("i") => {
            Ok(CaseSensitivity::AsciiCaseInsensitive)
        },
        Ok(t) => {
            let t = t.clone();
            Err(location.new_unexpected_token_error(t))
        },
    }
}

/// Parses the argument of `:not()`: one compound selector without
/// pseudo-elements or nested negations.
fn parse_negation<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
) -> Result<Component, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let mut builder = SelectorBuilder::default();
    input.skip_whitespace();
    parse_type_selector(parser, input, &mut builder, /* inside_negation = */ true)?;
    while let Some(result) = parse_one_simple_selector(parser, input, /* inside_negation = */ true)? {
        match result {
            SimpleSelectorParseResult::SimpleSelector(s) => builder.push_simple_selector(s),
            SimpleSelectorParseResult::PseudoElement(_) => {
                return Err(input.new_custom_error(SelectorParseErrorKind::PseudoElementInNegation));
            },
        }
    }
    input.skip_whitespace();
    if !input.is_exhausted() {
        return Err(input.new_custom_error(SelectorParseErrorKind::NonSimpleSelectorInNegation));
    }
    if builder.current_compound_is_empty() {
        return Err(input.new_custom_error(SelectorParseErrorKind::EmptyNegation));
    }
    Ok(Component::Negation(builder.take_components()))
}

/// simple_selector_sequence
/// : [ type_selector | universal ] [ HASH | class | attrib | pseudo | negation ]*
/// | [ HASH | class | attrib | pseudo | negation ]+
///
/// `Ok(None)` means the compound was empty; `Ok(Some(true))` that it ended
/// with a pseudo-element.
fn parse_compound_selector<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
    builder: &mut SelectorBuilder,
) -> Result<Option<bool>, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    input.skip_whitespace();

    let mut empty = true;
    if parse_type_selector(parser, input, builder, /* inside_negation = */ false)? {
        empty = false;
    } else if let Some(url) = parser.default_namespace() {
        // If there was no explicit type selector, but there is a
        // default namespace, there is an implicit "<defaultns>|*" type
        // selector.
        builder.push_simple_selector(Component::Namespace(Namespace { prefix: None, url }));
    }

    while let Some(result) = parse_one_simple_selector(parser, input, /* inside_negation = */ false)? {
        empty = false;
        match result {
            SimpleSelectorParseResult::SimpleSelector(s) => builder.push_simple_selector(s),
            SimpleSelectorParseResult::PseudoElement(p) => {
                builder.push_simple_selector(Component::PseudoElement(p));
                return Ok(Some(true));
            },
        }
    }

    if empty { Ok(None) } else { Ok(Some(false)) }
}

fn parse_functional_pseudo_class<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
    name: CowRcStr<'i>,
    inside_negation: bool,
) -> Result<Component, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    match_ignore_ascii_case! { &*name,
        "nth-child" => return parse_nth_pseudo_class(input, Component::NthChild),
        "nth-of-type" => return parse_nth_pseudo_class(input, Component::NthOfType),
        "nth-last-child" => return parse_nth_pseudo_class(input, Component::NthLastChild),
        "nth-last-of-type" => return parse_nth_pseudo_class(input, Component::NthLastOfType),
        "not" => {
            if inside_negation {
                return Err(input.new_custom_error(SelectorParseErrorKind::NestedNegation));
            }
            return parse_negation(parser, input)
        },
        _ => {}
    }
    Err(input.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
}

fn parse_nth_pseudo_class<'i, 't, E, F>(
    input: &mut CssParser<'i, 't>,
    selector: F,
) -> Result<Component, ParseError<'i, E>>
where
    F: FnOnce(i32, i32) -> Component,
{
    let (a, b) = parse_nth(input)?;
    Ok(selector(a, b))
}

/// Parse a simple selector other than a type selector.
///
/// * `Err(_)`: Invalid selector, abort
/// * `Ok(None)`: Not a simple selector, could be something else. `input` was not consumed.
/// * `Ok(Some(_))`: Parsed a simple selector or pseudo-element
fn parse_one_simple_selector<'i, 't, P>(
    parser: &P,
    input: &mut CssParser<'i, 't>,
    inside_negation: bool,
) -> Result<Option<SimpleSelectorParseResult>, ParseError<'i, P::Error>>
where
    P: Parser<'i>,
{
    let start = input.state();
    let token = match input.next_including_whitespace() {
        Ok(token) => token.clone(),
        Err(_) => {
            input.reset(&start);
            return Ok(None);
        },
    };

    match token {
        Token::IDHash(id) => {
            let id = Component::ID(Atom::from(&*id));
            Ok(Some(SimpleSelectorParseResult::SimpleSelector(id)))
        },
        Token::Delim('.') => {
            let location = input.current_source_location();
            match *input.next_including_whitespace()? {
                Token::Ident(ref class) => {
                    let class = Component::Class(Atom::from(&**class));
                    Ok(Some(SimpleSelectorParseResult::SimpleSelector(class)))
                },
                ref t => {
                    let e = SelectorParseErrorKind::ClassNeedsIdent(t.clone());
                    Err(location.new_custom_error(e))
                },
            }
        },
        Token::SquareBracketBlock => {
            let attr = input.parse_nested_block(|input| parse_attribute_selector(parser, input))?;
            Ok(Some(SimpleSelectorParseResult::SimpleSelector(attr)))
        },
        Token::Colon => {
            let location = input.current_source_location();
            let (is_single_colon, next_token) = match input.next_including_whitespace()?.clone() {
                Token::Colon => (false, input.next_including_whitespace()?.clone()),
                t => (true, t),
            };
            let (name, is_functional) = match next_token {
                Token::Ident(name) => (name, false),
                Token::Function(name) => (name, true),
                t => {
                    let e = if is_single_colon {
                        SelectorParseErrorKind::NoIdentForPseudo(t)
                    } else {
                        SelectorParseErrorKind::PseudoElementExpectedIdent(t)
                    };
                    return Err(location.new_custom_error(e));
                },
            };
            let is_pseudo_element = !is_single_colon || is_css2_pseudo_element(&name);
            if is_pseudo_element {
                if inside_negation {
                    return Err(location.new_custom_error(SelectorParseErrorKind::PseudoElementInNegation));
                }
                if is_functional {
                    return Err(location
                        .new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)));
                }
                let pseudo = parse_pseudo_element(location, name)?;
                Ok(Some(SimpleSelectorParseResult::PseudoElement(pseudo)))
            } else {
                let pseudo_class = if is_functional {
                    input.parse_nested_block(|input| {
                        parse_functional_pseudo_class(parser, input, name, inside_negation)
                    })?
                } else {
                    parse_simple_pseudo_class(location, name)?
                };
                Ok(Some(SimpleSelectorParseResult::SimpleSelector(pseudo_class)))
            }
        },
        _ => {
            input.reset(&start);
            Ok(None)
        },
    }
}

fn is_css2_pseudo_element(name: &str) -> bool {
    // ** Do not add to this list! **
    match_ignore_ascii_case! { name,
        "before" | "after" | "first-line" | "first-letter" => true,
        _ => false,
    }
}

fn parse_pseudo_element<'i, E>(
    location: SourceLocation,
    name: CowRcStr<'i>,
) -> Result<PseudoElement, ParseError<'i, E>>
where
    E: From<SelectorParseErrorKind<'i>>,
{
    Ok(match_ignore_ascii_case! { &*name,
        "before" => PseudoElement::Before,
        "after" => PseudoElement::After,
        "first-line" => PseudoElement::FirstLine,
        "first-letter" => PseudoElement::FirstLetter,
        "selection" => PseudoElement::Selection,
        "cue" => PseudoElement::Cue,
        _ => {
            if starts_with_ignore_ascii_case(&name, "-webkit-") {
                PseudoElement::Custom(Atom::from(name.to_ascii_lowercase()))
            } else {
                return Err(location
                    .new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)));
            }
        },
    })
}

fn parse_simple_pseudo_class<'i, E>(
    location: SourceLocation,
    name: CowRcStr<'i>,
) -> Result<Component, ParseError<'i, E>>
where
    E: From<SelectorParseErrorKind<'i>>,
{
    let component = match_ignore_ascii_case! { &*name,
        "first-child" => Component::FirstChild,
        "last-child" => Component::LastChild,
        "only-child" => Component::OnlyChild,
        "root" => Component::Root,
        "empty" => Component::Empty,
        "first-of-type" => Component::FirstOfType,
        "last-of-type" => Component::LastOfType,
        "only-of-type" => Component::OnlyOfType,
        _ => match NonTSPseudoClass::parse(&name) {
            Some(pseudo_class) => Component::NonTSPseudoClass(pseudo_class),
            None => {
                return Err(location
                    .new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)));
            },
        },
    };
    Ok(component)
}

fn starts_with_ignore_ascii_case(string: &str, prefix: &str) -> bool {
    string.len() >= prefix.len() && string.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssparser::ParserInput;

    struct DummyParser {
        default_ns: Option<Atom>,
    }

    impl<'i> Parser<'i> for DummyParser {
        type Error = SelectorParseErrorKind<'i>;

        fn default_namespace(&self) -> Option<Atom> {
            self.default_ns.clone()
        }

        fn namespace_for_prefix(&self, prefix: &Atom) -> Option<Atom> {
            if &**prefix == "svg" {
                Some(Atom::from("http://www.w3.org/2000/svg"))
            } else {
                None
            }
        }
    }

    fn parse(input: &str) -> Result<SelectorList, ()> {
        let mut input = ParserInput::new(input);
        let parser = DummyParser { default_ns: None };
        SelectorList::parse(&parser, &mut CssParser::new(&mut input)).map_err(|_| ())
    }

    fn specificity(a: u32, b: u32, c: u32) -> u32 {
        a << 20 | b << 10 | c
    }

    #[test]
    fn test_empty() {
        assert!(parse("").is_err());
        assert!(parse(":hover,").is_err());
        assert!(parse("div >").is_err());
    }

    #[test]
    fn test_specificity() {
        let list = parse("#x").unwrap();
        assert_eq!(list.0[0].specificity(), specificity(1, 0, 0));
        let list = parse("div.foo[title] > p:first-child::before").unwrap();
        assert_eq!(list.0[0].specificity(), specificity(0, 3, 3));
        let list = parse("*").unwrap();
        assert_eq!(list.0[0].specificity(), 0);
        let list = parse(":not(#a)").unwrap();
        assert_eq!(list.0[0].specificity(), specificity(1, 0, 0));
    }

    #[test]
    fn test_compound_and_combinators() {
        let list = parse("a > b c + d ~ e").unwrap();
        let selector = &list.0[0];
        let combinators: Vec<_> = selector.combinators().collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::LaterSibling,
                Combinator::NextSibling,
                Combinator::Descendant,
                Combinator::Child,
            ]
        );
        assert_eq!(selector.component_count(), 5);
        assert_eq!(selector.to_css_string(), "a > b c + d ~ e");
    }

    #[test]
    fn test_pseudo_element_must_be_last() {
        assert!(parse("p::before").unwrap().0[0].has_pseudo_element());
        assert!(parse("p:before").unwrap().0[0].has_pseudo_element());
        assert!(parse("p::before span").is_err());
        assert!(parse("input::-webkit-inner-spin-button").is_ok());
        assert!(parse("p::bogus").is_err());
    }

    #[test]
    fn test_namespaces() {
        assert!(parse("svg|rect").is_ok());
        assert!(parse("foo|rect").is_err());
        let mut input = ParserInput::new("p");
        let parser = DummyParser {
            default_ns: Some(Atom::from("http://www.w3.org/1999/xhtml")),
        };
        let list = SelectorList::parse(&parser, &mut CssParser::new(&mut input)).unwrap();
        assert!(matches!(list.0[0].iter_raw_parse_order().next(), Some(Component::Namespace(..))));
    }

    #[test]
    fn test_attribute_serialization() {
        let list = parse("[title~=\"a\" i]").unwrap();
        assert_eq!(list.to_css_string(), "[title~=\"a\" i]");
        let list = parse("[title~=\"\"]").unwrap();
        match list.0[0].iter_raw_parse_order().next() {
            Some(Component::Attribute(attr)) => assert!(attr.never_matches),
            _ => panic!("expected an attribute selector"),
        }
    }
}
