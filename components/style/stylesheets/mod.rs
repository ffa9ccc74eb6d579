/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Style sheets and their CSS rules.

mod descriptors;
mod filter_rule;
mod font_face_rule;
pub mod import_rule;
pub mod keyframes_rule;
mod loader;
mod media_rule;
mod namespace_rule;
pub mod origin;
mod page_rule;
mod region_rule;
mod rule_parser;
mod sheet_store;
mod style_rule;
mod stylesheet;
pub mod supports_rule;
mod viewport_rule;

use crate::parser::ParserContext;
use cssparser::{parse_one_rule, Parser, ParserInput, ToCss};
use servo_arc::Arc;
use std::error::Error;
use std::fmt;
use url::Url;

pub use self::descriptors::Descriptor;
pub use self::filter_rule::FilterRule;
pub use self::font_face_rule::FontFaceRule;
pub use self::import_rule::{ImportRule, ImportState};
pub use self::keyframes_rule::{Keyframe, KeyframeSelector, KeyframesRule};
pub use self::loader::{LoadResult, StylesheetLoader};
pub use self::media_rule::MediaRule;
pub use self::namespace_rule::NamespaceRule;
pub use self::origin::{Origin, OriginSet};
pub use self::page_rule::{PagePseudoClass, PageRule, PageSelector};
pub use self::region_rule::RegionRule;
pub use self::rule_parser::{InsertRuleContext, State, TopLevelRuleParser};
pub use self::sheet_store::{SheetId, SheetStore};
pub use self::style_rule::StyleRule;
pub use self::stylesheet::{Stylesheet, StylesheetContents};
pub use self::supports_rule::SupportsRule;
pub use self::viewport_rule::ViewportRule;

/// Extra data that the backend may need to resolve url values: the base URL
/// of the stylesheet.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UrlExtraData(Arc<Url>);

impl UrlExtraData {
    pub fn new(url: Url) -> Self {
        UrlExtraData(Arc::new(url))
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Resolves a possibly relative URL against this base.
    pub fn join(&self, input: &str) -> Option<Url> {
        self.0.join(input).ok()
    }
}

/// A CSS rule.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum CssRule {
    // The @charset rule is kept on the stylesheet contents, since it can only
    // ever be the first rule.
    Namespace(Arc<NamespaceRule>),
    Import(Arc<ImportRule>),
    Style(Arc<StyleRule>),
    Media(Arc<MediaRule>),
    FontFace(Arc<FontFaceRule>),
    Viewport(Arc<ViewportRule>),
    Keyframes(Arc<KeyframesRule>),
    Supports(Arc<SupportsRule>),
    Page(Arc<PageRule>),
    Region(Arc<RegionRule>),
    Filter(Arc<FilterRule>),
}

/// <https://drafts.csswg.org/cssom/#dom-cssrule-type>
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum CssRuleType {
    Style = 1,
    Charset = 2,
    Import = 3,
    Media = 4,
    FontFace = 5,
    Page = 6,
    Keyframes = 7,
    Keyframe = 8,
    Namespace = 10,
    Supports = 12,
    Viewport = 15,
    Region = 16,
    Filter = 17,
}

/// The errors CSSOM rule mutations raise, named after the DOM exceptions
/// they map to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RulesMutateError {
    /// The rule text did not parse.
    Syntax,
    /// The index was out of range.
    IndexSize,
    /// The rule may not go at that position.
    HierarchyRequest,
    /// Removing or inserting the rule would leave the sheet in an invalid
    /// state.
    InvalidState,
}

impl fmt::Display for RulesMutateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RulesMutateError::Syntax => "SyntaxError: the rule could not be parsed",
            RulesMutateError::IndexSize => "IndexSizeError: the index is out of range",
            RulesMutateError::HierarchyRequest => {
                "HierarchyRequestError: the rule cannot be inserted at this position"
            },
            RulesMutateError::InvalidState => {
                "InvalidStateError: the operation would leave the rule list in an invalid state"
            },
        })
    }
}

impl Error for RulesMutateError {}

impl CssRule {
    /// Returns the CSSOM rule type of this rule.
    pub fn rule_type(&self) -> CssRuleType {
        match *self {
            CssRule::Style(_) => CssRuleType::Style,
            CssRule::Import(_) => CssRuleType::Import,
            CssRule::Media(_) => CssRuleType::Media,
            CssRule::FontFace(_) => CssRuleType::FontFace,
            CssRule::Keyframes(_) => CssRuleType::Keyframes,
            CssRule::Namespace(_) => CssRuleType::Namespace,
            CssRule::Viewport(_) => CssRuleType::Viewport,
            CssRule::Supports(_) => CssRuleType::Supports,
            CssRule::Page(_) => CssRuleType::Page,
            CssRule::Region(_) => CssRuleType::Region,
            CssRule::Filter(_) => CssRuleType::Filter,
        }
    }

    /// The position this kind of rule must keep in a rule list: imports
    /// first, then namespaces, then everything else.
    pub fn rule_state(&self) -> State {
        match *self {
            CssRule::Import(..) => State::Imports,
            CssRule::Namespace(..) => State::Namespaces,
            _ => State::Body,
        }
    }

    #[inline]
    pub fn is_import(&self) -> bool {
        matches!(*self, CssRule::Import(..))
    }

    /// A rough measure of the memory this rule holds.
    pub fn estimated_size_in_bytes(&self) -> usize {
        let own = std::mem::size_of::<CssRule>();
        own + match *self {
            CssRule::Style(ref rule) => rule.estimated_size_in_bytes(),
            CssRule::Import(ref rule) => rule.estimated_size_in_bytes(),
            CssRule::Media(ref rule) => {
                std::mem::size_of::<MediaRule>() +
                    rule.rules.iter().map(|r| r.estimated_size_in_bytes()).sum::<usize>()
            },
            CssRule::Supports(ref rule) => {
                std::mem::size_of::<SupportsRule>() +
                    rule.rules.iter().map(|r| r.estimated_size_in_bytes()).sum::<usize>()
            },
            CssRule::Region(ref rule) => {
                std::mem::size_of::<RegionRule>() +
                    rule.rules.iter().map(|r| r.estimated_size_in_bytes()).sum::<usize>()
            },
            CssRule::Page(ref rule) => {
                std::mem::size_of::<PageRule>() + rule.block.len() * declaration_size()
            },
            CssRule::Keyframes(ref rule) => {
                std::mem::size_of::<KeyframesRule>() +
                    rule.keyframes
                        .iter()
                        .map(|k| std::mem::size_of::<Keyframe>() + k.block.len() * declaration_size())
                        .sum::<usize>()
            },
            CssRule::FontFace(..) |
            CssRule::Viewport(..) |
            CssRule::Filter(..) |
            CssRule::Namespace(..) => 0,
        }
    }

    /// Parses a single rule for `insertRule`.
    ///
    /// `insert_rule_context` describes the rules around the insertion point,
    /// which bound where import and namespace rules may go.
    pub fn parse(
        css: &str,
        parent_stylesheet_contents: &StylesheetContents,
        insert_rule_context: InsertRuleContext,
        loader: Option<&dyn StylesheetLoader>,
    ) -> Result<Self, RulesMutateError> {
        let url_data = parent_stylesheet_contents.url_data().clone();
        let mut context = ParserContext::new(
            parent_stylesheet_contents.origin(),
            &url_data,
            None,
            parent_stylesheet_contents.quirks_mode(),
            None,
        );
        context.max_selector_component_count =
            parent_stylesheet_contents.max_selector_component_count();

        let mut input = ParserInput::new(css);
        let mut input = Parser::new(&mut input);

        let mut namespaces = parent_stylesheet_contents.namespaces().clone();
        let mut rule_parser = TopLevelRuleParser::new(
            context,
            loader,
            &mut namespaces,
            parent_stylesheet_contents.import_ancestors(),
        );
        rule_parser.state = insert_rule_context.previous_state;
        rule_parser.insert_rule_context = Some(insert_rule_context);

        match parse_one_rule(&mut input, &mut rule_parser) {
            Ok(rule) => Ok(rule),
            Err(_) => Err(rule_parser.dom_error.unwrap_or(RulesMutateError::Syntax)),
        }
    }
}

fn declaration_size() -> usize {
    std::mem::size_of::<crate::properties::PropertyDeclaration>()
}

impl ToCss for CssRule {
    // https://drafts.csswg.org/cssom/#serialize-a-css-rule
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            CssRule::Namespace(ref rule) => rule.to_css(dest),
            CssRule::Import(ref rule) => rule.to_css(dest),
            CssRule::Style(ref rule) => rule.to_css(dest),
            CssRule::FontFace(ref rule) => rule.to_css(dest),
            CssRule::Viewport(ref rule) => rule.to_css(dest),
            CssRule::Keyframes(ref rule) => rule.to_css(dest),
            CssRule::Media(ref rule) => rule.to_css(dest),
            CssRule::Supports(ref rule) => rule.to_css(dest),
            CssRule::Page(ref rule) => rule.to_css(dest),
            CssRule::Region(ref rule) => rule.to_css(dest),
            CssRule::Filter(ref rule) => rule.to_css(dest),
        }
    }
}

/// Writes a block of nested rules, one per line.
pub(crate) fn nested_rules_to_css<W>(rules: &[CssRule], dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    dest.write_str(" {")?;
    for rule in rules {
        dest.write_str("\n  ")?;
        rule.to_css(dest)?;
    }
    dest.write_str("\n}")
}

/// The object handed out by `CSSStyleSheet.cssRules`. It is created the
/// first time a rule is asked for and then handed out again for as long as
/// the rule stays in its sheet.
#[derive(Debug)]
pub enum CssRuleWrapper {
    Charset(Box<str>),
    Rule(CssRule),
}

impl CssRuleWrapper {
    pub fn rule_type(&self) -> CssRuleType {
        match *self {
            CssRuleWrapper::Charset(..) => CssRuleType::Charset,
            CssRuleWrapper::Rule(ref rule) => rule.rule_type(),
        }
    }

    /// The wrapped rule. `None` for the `@charset` rule.
    pub fn rule(&self) -> Option<&CssRule> {
        match *self {
            CssRuleWrapper::Charset(..) => None,
            CssRuleWrapper::Rule(ref rule) => Some(rule),
        }
    }

    pub fn css_text(&self) -> String {
        match *self {
            CssRuleWrapper::Charset(ref encoding) => {
                let mut text = String::from("@charset ");
                // Writing to a String never fails.
                let _ = cssparser::serialize_string(encoding, &mut text);
                text.push(';');
                text
            },
            CssRuleWrapper::Rule(ref rule) => rule.to_css_string(),
        }
    }
}
