/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Parsing of the stylesheet contents.

use crate::error_reporting::ContextualParseError;
use crate::media_queries::MediaList;
use crate::namespaces::Namespaces;
use crate::parser::{ParseError, ParserContext, StyleParseErrorKind};
use crate::properties::parse_property_declaration_list;
use crate::selector_parser::SelectorParser;
use crate::stylesheets::keyframes_rule::parse_keyframe_list;
use crate::stylesheets::supports_rule::SupportsCondition;
use crate::stylesheets::{CssRule, CssRuleType, FilterRule, FontFaceRule, ImportRule, ImportState};
use crate::stylesheets::{KeyframesRule, LoadResult, MediaRule, NamespaceRule, PageRule};
use crate::stylesheets::{PageSelector, RegionRule, RulesMutateError, StyleRule};
use crate::stylesheets::{StylesheetContents, StylesheetLoader, SupportsRule, UrlExtraData};
use crate::stylesheets::ViewportRule;
use crate::{Atom, Namespace, Prefix};
use cssparser::{match_ignore_ascii_case, AtRuleParser, BasicParseError, BasicParseErrorKind};
use cssparser::{CowRcStr, DeclarationParser, ParseErrorKind, Parser, ParserState};
use cssparser::{QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token};
use log::{debug, warn};
use selectors::SelectorList;
use servo_arc::Arc;
use url::Url;

/// The information we need particularly to do CSSOM insertRule stuff.
#[derive(Clone, Copy, Debug)]
pub struct InsertRuleContext {
    /// The state of the rule right before the insertion point.
    pub previous_state: State,
    /// The state of the rule at the insertion point, if there is one.
    pub next_state: Option<State>,
    /// Whether every rule from the insertion point on is a namespace rule.
    pub only_namespaces_follow: bool,
}

/// The parser for the top-level rules in a stylesheet.
pub struct TopLevelRuleParser<'a> {
    /// A reference to a stylesheet loader if applicable, for `@import` rules.
    pub loader: Option<&'a dyn StylesheetLoader>,
    /// The top-level parser context.
    pub context: ParserContext<'a>,
    /// The current state of the parser.
    pub state: State,
    /// Whether we have tried to parse was invalid due to being in the wrong
    /// place (e.g. an @import rule was found while in the `Body` state).
    pub dom_error: Option<RulesMutateError>,
    /// The namespace map we use for parsing. `@namespace` rules add to it.
    pub namespaces: &'a mut Namespaces,
    /// The info we need insert a rule in a list.
    pub insert_rule_context: Option<InsertRuleContext>,
    /// The URLs of the sheet being parsed and of every sheet importing it.
    import_ancestors: &'a [Url],
}

impl<'b> TopLevelRuleParser<'b> {
    pub fn new(
        context: ParserContext<'b>,
        loader: Option<&'b dyn StylesheetLoader>,
        namespaces: &'b mut Namespaces,
        import_ancestors: &'b [Url],
    ) -> Self {
        TopLevelRuleParser {
            loader,
            context,
            state: State::Start,
            dom_error: None,
            namespaces,
            insert_rule_context: None,
            import_ancestors,
        }
    }

    fn nested<'a>(&'a self) -> NestedRuleParser<'a, 'b> {
        NestedRuleParser {
            context: &self.context,
            namespaces: &*self.namespaces,
        }
    }

    /// Returns the current state of the parser.
    pub fn state(&self) -> State {
        self.state
    }

    /// Checks whether we can parse a rule that would transition us to
    /// `new_state`.
    ///
    /// This is usually a simple branch, but we may need more bookkeeping if
    /// doing `insertRule` from CSSOM.
    fn check_state(&mut self, new_state: State) -> bool {
        if self.state > new_state {
            self.dom_error = Some(RulesMutateError::HierarchyRequest);
            return false;
        }

        let ctx = match self.insert_rule_context {
            Some(ctx) => ctx,
            None => return true,
        };

        let next_rule_state = match ctx.next_state {
            None => return true,
            Some(state) => state,
        };

        if new_state > next_rule_state {
            self.dom_error = Some(RulesMutateError::HierarchyRequest);
            return false;
        }

        // If there's anything that isn't a namespace rule (or import rule, but
        // we checked that already at the beginning), reject with a
        // StateError.
        if new_state == State::Namespaces && !ctx.only_namespaces_follow {
            self.dom_error = Some(RulesMutateError::InvalidState);
            return false;
        }

        true
    }

    /// Resolves and, when a loader is around, requests the sheet of an
    /// `@import` rule. A sheet that is already being imported further up the
    /// chain fails instead of recursing.
    fn load_import(&self, href: &str, media: &MediaList) -> (Option<Url>, ImportState) {
        let url = match self.context.url_data.join(href) {
            Some(url) => url,
            None => {
                debug!("Dropping @import of unresolvable URL {:?}", href);
                return (None, ImportState::Failed);
            },
        };

        let loader = match self.loader {
            Some(loader) => loader,
            None => {
                debug!("Saw @import of {}, but no way to trigger the load", url);
                return (Some(url), ImportState::Failed);
            },
        };

        if self.import_ancestors.contains(&url) {
            warn!("Import cycle through {}", url);
            return (Some(url), ImportState::Failed);
        }

        let state = match loader.request_stylesheet(&url, media) {
            LoadResult::Pending => ImportState::Pending,
            LoadResult::Failed => ImportState::Failed,
            LoadResult::Text(css) => {
                let mut import_chain = self.import_ancestors.to_vec();
                import_chain.push(url.clone());
                ImportState::Loaded(Arc::new(StylesheetContents::from_str_with_import_chain(
                    &css,
                    UrlExtraData::new(url.clone()),
                    self.context.stylesheet_origin,
                    self.context.quirks_mode,
                    self.context.max_selector_component_count,
                    self.loader,
                    self.context.error_reporter(),
                    import_chain,
                )))
            },
        };
        (Some(url), state)
    }
}

/// The current state of the parser.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum State {
    /// We haven't started parsing rules.
    Start = 1,
    /// We're parsing `@import` rules.
    Imports = 2,
    /// We're parsing `@namespace` rules.
    Namespaces = 3,
    /// We're parsing the main body of the stylesheet.
    Body = 4,
}

/// A rule prelude for at-rules.
pub enum AtRulePrelude {
    /// A @font-face rule prelude.
    FontFace,
    /// A @media rule prelude, with its media queries.
    Media(MediaList),
    /// An @supports rule, with its conditional
    Supports(SupportsCondition),
    /// A @viewport rule prelude, and whether it was prefixed.
    Viewport(bool),
    /// A @keyframes rule, with its animation name and whether it was
    /// prefixed.
    Keyframes(Atom, bool),
    /// A @page rule prelude, with its page selector if any.
    Page(Option<PageSelector>),
    /// A @-webkit-region rule prelude, with the regions it styles.
    Region(SelectorList),
    /// A @-webkit-filter rule prelude, with the filter name.
    Filter(Atom),
    /// A @import rule prelude.
    Import(String, MediaList),
    /// A @namespace rule prelude.
    Namespace(Option<Prefix>, Namespace),
}

impl<'a, 'i> AtRuleParser<'i> for TopLevelRuleParser<'a> {
    type Prelude = AtRulePrelude;
    type AtRule = CssRule;
    type Error = StyleParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<AtRulePrelude, ParseError<'i>> {
        match_ignore_ascii_case! { &*name,
            "import" => {
                if !self.check_state(State::Imports) {
                    return Err(input.new_custom_error(StyleParseErrorKind::UnexpectedImportRule))
                }

                let url_string = input.expect_url_or_string()?.as_ref().to_owned();
                let media = MediaList::parse(input);
                return Ok(AtRulePrelude::Import(url_string, media));
            },
            "namespace" => {
                if !self.check_state(State::Namespaces) {
                    return Err(input.new_custom_error(StyleParseErrorKind::UnexpectedNamespaceRule))
                }

                let prefix = input.try_parse(|i| i.expect_ident_cloned())
                                  .map(|s| Prefix::from(s.as_ref())).ok();
                let maybe_namespace = match input.expect_url_or_string() {
                    Ok(url_or_string) => url_or_string,
                    Err(BasicParseError { kind: BasicParseErrorKind::UnexpectedToken(t), location }) => {
                        return Err(location.new_custom_error(StyleParseErrorKind::UnexpectedTokenWithinNamespace(t)))
                    }
                    Err(e) => return Err(e.into()),
                };
                let url = Namespace::from(maybe_namespace.as_ref());
                return Ok(AtRulePrelude::Namespace(prefix, url));
            },
            // @charset is only valid as the very first bytes of a sheet, and
            // those are handled before rules are parsed.
            "charset" => {
                self.dom_error = Some(RulesMutateError::HierarchyRequest);
                return Err(input.new_custom_error(StyleParseErrorKind::UnexpectedCharsetRule))
            },
            _ => {}
        }

        if !self.check_state(State::Body) {
            return Err(input.new_custom_error(StyleParseErrorKind::UnspecifiedError));
        }

        AtRuleParser::parse_prelude(&mut self.nested(), name, input)
    }

    #[inline]
    fn parse_block<'t>(
        &mut self,
        prelude: AtRulePrelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i>> {
        let rule = AtRuleParser::parse_block(&mut self.nested(), prelude, start, input)?;
        self.state = State::Body;
        Ok(rule)
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: AtRulePrelude,
        start: &ParserState,
    ) -> Result<CssRule, ()> {
        let source_location = start.source_location();
        match prelude {
            AtRulePrelude::Import(href, media) => {
                let (url, state) = self.load_import(&href, &media);
                self.state = State::Imports;
                Ok(CssRule::Import(Arc::new(ImportRule {
                    href,
                    url,
                    media,
                    state,
                    source_location,
                })))
            },
            AtRulePrelude::Namespace(prefix, url) => {
                self.namespaces.parser_add_namespace(prefix.as_ref(), &url);
                self.state = State::Namespaces;
                Ok(CssRule::Namespace(Arc::new(NamespaceRule {
                    prefix,
                    url,
                    source_location,
                })))
            },
            _ => Err(()),
        }
    }
}

impl<'a, 'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'a> {
    type Prelude = SelectorList;
    type QualifiedRule = CssRule;
    type Error = StyleParseErrorKind<'i>;

    #[inline]
    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i>> {
        if !self.check_state(State::Body) {
            return Err(input.new_custom_error(StyleParseErrorKind::UnspecifiedError));
        }

        QualifiedRuleParser::parse_prelude(&mut self.nested(), input)
    }

    #[inline]
    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i>> {
        let rule = QualifiedRuleParser::parse_block(&mut self.nested(), prelude, start, input)?;
        self.state = State::Body;
        Ok(rule)
    }
}

/// Reports a rule that failed to parse and was dropped.
pub(crate) fn report_invalid_rule<'i>(context: &ParserContext, error: ParseError<'i>, slice: &'i str) {
    let location = error.location;
    let error = match error.kind {
        ParseErrorKind::Custom(StyleParseErrorKind::UnsupportedAtRule(..)) => {
            ContextualParseError::UnsupportedRule(slice, error)
        },
        _ => ContextualParseError::InvalidRule(slice, error),
    };
    context.log_css_error(location, error);
}

#[derive(Clone)] // shallow, relatively cheap .clone
struct NestedRuleParser<'a, 'b: 'a> {
    context: &'a ParserContext<'b>,
    namespaces: &'a Namespaces,
}

impl<'a, 'b> NestedRuleParser<'a, 'b> {
    fn parse_nested_rules(&mut self, input: &mut Parser, rule_type: CssRuleType) -> Vec<CssRule> {
        let context = ParserContext::new_with_rule_type(self.context, rule_type);

        let mut nested_parser = NestedRuleParser {
            context: &context,
            namespaces: self.namespaces,
        };

        let mut iter = RuleBodyParser::new(input, &mut nested_parser);
        let mut rules = Vec::new();
        while let Some(result) = iter.next() {
            match result {
                Ok(rule) => rules.push(rule),
                Err((error, slice)) => report_invalid_rule(self.context, error, slice),
            }
        }
        rules
    }

    fn parse_keyframes_name<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Atom, ParseError<'i>> {
        let location = input.current_source_location();
        match *input.next()? {
            Token::Ident(ref name) | Token::QuotedString(ref name) => Ok(Atom::from(name.as_ref())),
            ref t => Err(location.new_unexpected_token_error(t.clone())),
        }
    }
}

impl<'a, 'b, 'i> AtRuleParser<'i> for NestedRuleParser<'a, 'b> {
    type Prelude = AtRulePrelude;
    type AtRule = CssRule;
    type Error = StyleParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<AtRulePrelude, ParseError<'i>> {
        match_ignore_ascii_case! { &*name,
            "media" => {
                Ok(AtRulePrelude::Media(MediaList::parse(input)))
            },
            "supports" => {
                let cond = SupportsCondition::parse(input)?;
                Ok(AtRulePrelude::Supports(cond))
            },
            "font-face" => {
                Ok(AtRulePrelude::FontFace)
            },
            "viewport" => {
                Ok(AtRulePrelude::Viewport(false))
            },
            "-webkit-viewport" => {
                Ok(AtRulePrelude::Viewport(true))
            },
            "keyframes" => {
                let name = Self::parse_keyframes_name(input)?;
                Ok(AtRulePrelude::Keyframes(name, false))
            },
            "-webkit-keyframes" => {
                let name = Self::parse_keyframes_name(input)?;
                Ok(AtRulePrelude::Keyframes(name, true))
            },
            "page" => {
                Ok(AtRulePrelude::Page(PageSelector::parse(input)?))
            },
            "-webkit-region" => {
                let selector_parser = SelectorParser {
                    namespaces: self.namespaces,
                };
                Ok(AtRulePrelude::Region(SelectorList::parse(&selector_parser, input)?))
            },
            "-webkit-filter" => {
                let name = input.expect_ident()?;
                Ok(AtRulePrelude::Filter(Atom::from(name.as_ref())))
            },
            _ => Err(input.new_custom_error(StyleParseErrorKind::UnsupportedAtRule(name.clone())))
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: AtRulePrelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i>> {
        let source_location = start.source_location();
        match prelude {
            AtRulePrelude::FontFace => {
                let context = ParserContext::new_with_rule_type(self.context, CssRuleType::FontFace);
                Ok(CssRule::FontFace(Arc::new(FontFaceRule::parse(
                    &context,
                    input,
                    source_location,
                ))))
            },
            AtRulePrelude::Media(media_queries) => Ok(CssRule::Media(Arc::new(MediaRule {
                media_queries,
                rules: self.parse_nested_rules(input, CssRuleType::Media),
                source_location,
            }))),
            AtRulePrelude::Supports(condition) => {
                let enabled = condition.eval();
                Ok(CssRule::Supports(Arc::new(SupportsRule {
                    condition,
                    rules: self.parse_nested_rules(input, CssRuleType::Supports),
                    enabled,
                    source_location,
                })))
            },
            AtRulePrelude::Viewport(vendor_prefixed) => {
                let context = ParserContext::new_with_rule_type(self.context, CssRuleType::Viewport);
                Ok(CssRule::Viewport(Arc::new(ViewportRule::parse(
                    &context,
                    input,
                    vendor_prefixed,
                    source_location,
                ))))
            },
            AtRulePrelude::Keyframes(name, vendor_prefixed) => {
                let context =
                    ParserContext::new_with_rule_type(self.context, CssRuleType::Keyframes);
                Ok(CssRule::Keyframes(Arc::new(KeyframesRule {
                    name,
                    keyframes: parse_keyframe_list(&context, input),
                    vendor_prefixed,
                    source_location,
                })))
            },
            AtRulePrelude::Page(selector) => {
                let context = ParserContext::new_with_rule_type(self.context, CssRuleType::Page);
                let declarations = parse_property_declaration_list(&context, input);
                Ok(CssRule::Page(Arc::new(PageRule {
                    selector,
                    block: Arc::new(declarations),
                    source_location,
                })))
            },
            AtRulePrelude::Region(selectors) => Ok(CssRule::Region(Arc::new(RegionRule {
                selectors,
                rules: self.parse_nested_rules(input, CssRuleType::Region),
                source_location,
            }))),
            AtRulePrelude::Filter(name) => {
                let context = ParserContext::new_with_rule_type(self.context, CssRuleType::Filter);
                Ok(CssRule::Filter(Arc::new(FilterRule::parse(
                    &context,
                    input,
                    name,
                    source_location,
                ))))
            },
            AtRulePrelude::Import(..) | AtRulePrelude::Namespace(..) => {
                Err(input.new_custom_error(StyleParseErrorKind::UnspecifiedError))
            },
        }
    }
}

impl<'a, 'b, 'i> QualifiedRuleParser<'i> for NestedRuleParser<'a, 'b> {
    type Prelude = SelectorList;
    type QualifiedRule = CssRule;
    type Error = StyleParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i>> {
        let selector_parser = SelectorParser {
            namespaces: self.namespaces,
        };
        SelectorList::parse(&selector_parser, input)
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i>> {
        let context = ParserContext::new_with_rule_type(self.context, CssRuleType::Style);

        let declarations = parse_property_declaration_list(&context, input);
        Ok(CssRule::Style(Arc::new(StyleRule {
            selectors,
            block: Arc::new(declarations),
            source_location: start.source_location(),
        })))
    }
}

/// Nested rule lists hold rules only.
impl<'a, 'b, 'i> DeclarationParser<'i> for NestedRuleParser<'a, 'b> {
    type Declaration = CssRule;
    type Error = StyleParseErrorKind<'i>;
}

impl<'a, 'b, 'i> RuleBodyItemParser<'i, CssRule, StyleParseErrorKind<'i>>
    for NestedRuleParser<'a, 'b>
{
    fn parse_qualified(&self) -> bool {
        true
    }

    fn parse_declarations(&self) -> bool {
        false
    }
}
