/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The context within which CSS code is parsed.

use crate::config::MAX_SELECTOR_COMPONENT_COUNT;
use crate::error_reporting::{ContextualParseError, ParseErrorReporter};
use crate::stylesheets::{CssRuleType, Origin, UrlExtraData};
use cssparser::{CowRcStr, SourceLocation, Token};
use selectors::matching::QuirksMode;
use selectors::parser::SelectorParseErrorKind;

/// A CSS parse error of the style system.
pub type ParseError<'i> = cssparser::ParseError<'i, StyleParseErrorKind<'i>>;

/// Errors specific to the style system, on top of the tokenizer's.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleParseErrorKind<'i> {
    /// Something unexpected that has no better description.
    UnspecifiedError,
    /// A `@charset` rule that was not the first rule of the sheet.
    UnexpectedCharsetRule,
    /// An `@import` rule after other rules.
    UnexpectedImportRule,
    /// A `@namespace` rule after other rules.
    UnexpectedNamespaceRule,
    /// An at-rule we know nothing about.
    UnsupportedAtRule(CowRcStr<'i>),
    /// A property we know nothing about.
    UnknownProperty(CowRcStr<'i>),
    /// A known property with a value it does not accept.
    InvalidValue,
    /// A media feature name was expected.
    MediaQueryExpectedFeatureName(CowRcStr<'i>),
    /// A media feature value was missing or malformed.
    MediaQueryExpectedFeatureValue,
    /// An `@namespace` rule with something else than a URL or string.
    UnexpectedTokenWithinNamespace(Token<'i>),
    /// An `@page` selector we do not support.
    InvalidPageSelector,
    /// The selector of a style rule was invalid.
    SelectorError(SelectorParseErrorKind<'i>),
}

impl<'i> From<SelectorParseErrorKind<'i>> for StyleParseErrorKind<'i> {
    fn from(this: SelectorParseErrorKind<'i>) -> Self {
        StyleParseErrorKind::SelectorError(this)
    }
}

/// The data that the parser needs from outside in order to parse a stylesheet.
pub struct ParserContext<'a> {
    /// The `Origin` of the stylesheet, whether it's a user, author or
    /// user-agent stylesheet.
    pub stylesheet_origin: Origin,
    /// The extra data we need for resolving url values.
    pub url_data: &'a UrlExtraData,
    /// The current rule type, if any.
    pub rule_type: Option<CssRuleType>,
    /// The quirks mode of this stylesheet.
    pub quirks_mode: QuirksMode,
    /// Style rules with more simple selectors than this are split.
    pub max_selector_component_count: usize,
    /// The active error reporter, or none if error reporting is disabled.
    error_reporter: Option<&'a dyn ParseErrorReporter>,
}

impl<'a> ParserContext<'a> {
    /// Create a parser context.
    pub fn new(
        stylesheet_origin: Origin,
        url_data: &'a UrlExtraData,
        rule_type: Option<CssRuleType>,
        quirks_mode: QuirksMode,
        error_reporter: Option<&'a dyn ParseErrorReporter>,
    ) -> Self {
        ParserContext {
            stylesheet_origin,
            url_data,
            rule_type,
            quirks_mode,
            max_selector_component_count: MAX_SELECTOR_COMPONENT_COUNT,
            error_reporter,
        }
    }

    /// Create a parser context based on a previous context, but with a modified rule type.
    pub fn new_with_rule_type(context: &ParserContext<'a>, rule_type: CssRuleType) -> Self {
        ParserContext {
            stylesheet_origin: context.stylesheet_origin,
            url_data: context.url_data,
            rule_type: Some(rule_type),
            quirks_mode: context.quirks_mode,
            max_selector_component_count: context.max_selector_component_count,
            error_reporter: context.error_reporter,
        }
    }

    /// Get the rule type, which assumes that one is available.
    pub fn rule_type(&self) -> Option<CssRuleType> {
        self.rule_type
    }

    /// Whether we're in a @page rule.
    #[inline]
    pub fn in_page_rule(&self) -> bool {
        self.rule_type == Some(CssRuleType::Page)
    }

    /// The reporter errors go to, for parsers that build their own context.
    pub fn error_reporter(&self) -> Option<&'a dyn ParseErrorReporter> {
        self.error_reporter
    }

    /// Whether errors are reported at all.
    #[inline]
    pub fn error_reporting_enabled(&self) -> bool {
        self.error_reporter.is_some()
    }

    /// Record a CSS parse error with this context’s error reporting.
    pub fn log_css_error(&self, location: SourceLocation, error: ContextualParseError) {
        let error_reporter = match self.error_reporter {
            Some(r) => r,
            None => return,
        };

        error_reporter.report_error(self.url_data, location, error)
    }

    /// Whether we're in a user-agent stylesheet.
    #[inline]
    pub fn in_ua_sheet(&self) -> bool {
        self.stylesheet_origin == Origin::UserAgent
    }
}
