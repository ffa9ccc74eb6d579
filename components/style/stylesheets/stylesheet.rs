/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Parsed stylesheets, and the CSSOM view of them.
//!
//! A [`StylesheetContents`] is the parsed rule list of one stylesheet text.
//! Contents may be shared by several [`Stylesheet`]s (and by the in-memory
//! cache of a [`SheetStore`]), so they are copied before they are mutated.

use crate::config::{StyleConfig, MAX_SELECTOR_COMPONENT_COUNT};
use crate::error_reporting::ParseErrorReporter;
use crate::media_queries::{Device, MediaList};
use crate::namespaces::Namespaces;
use crate::parser::ParserContext;
use crate::stylesheets::rule_parser::{report_invalid_rule, InsertRuleContext};
use crate::stylesheets::{CssRule, CssRuleWrapper, ImportRule, ImportState, LoadResult};
use crate::stylesheets::{Origin, RulesMutateError, SheetId, SheetStore, State};
use crate::stylesheets::{StyleRule, StylesheetLoader, TopLevelRuleParser, UrlExtraData};
use crate::{Namespace, Prefix};
use cssparser::{Parser, ParserInput, StyleSheetParser};
use log::{debug, trace};
use selectors::attr::NamespaceConstraint;
use selectors::matching::QuirksMode;
use servo_arc::Arc;
use std::cell::OnceCell;
use url::Url;

/// A rule together with the CSSOM object handed out for it, which is only
/// created when script asks for it.
#[derive(Clone, Debug)]
struct RuleSlot {
    rule: CssRule,
    wrapper: OnceCell<Arc<CssRuleWrapper>>,
}

impl RuleSlot {
    fn new(rule: CssRule) -> Self {
        RuleSlot {
            rule,
            wrapper: OnceCell::new(),
        }
    }

    fn wrapper(&self) -> Arc<CssRuleWrapper> {
        self.wrapper
            .get_or_init(|| Arc::new(CssRuleWrapper::Rule(self.rule.clone())))
            .clone()
    }
}

#[derive(Clone, Debug)]
struct CharsetSlot {
    encoding: Box<str>,
    wrapper: OnceCell<Arc<CssRuleWrapper>>,
}

impl CharsetSlot {
    fn wrapper(&self) -> Arc<CssRuleWrapper> {
        self.wrapper
            .get_or_init(|| Arc::new(CssRuleWrapper::Charset(self.encoding.clone())))
            .clone()
    }
}

/// The encoding named by a leading `@charset "…";`, which has to be the very
/// first bytes of the sheet to count.
fn parse_charset(css: &str) -> Option<&str> {
    let rest = css.strip_prefix("@charset \"")?;
    let end = rest.find('"')?;
    if !rest[end + 1..].starts_with(';') {
        return None;
    }
    Some(&rest[..end])
}

/// The rules of a parsed stylesheet, and what is known about how it loaded.
#[derive(Clone, Debug)]
pub struct StylesheetContents {
    origin: Origin,
    url_data: UrlExtraData,
    quirks_mode: QuirksMode,
    max_selector_component_count: usize,
    charset: Option<CharsetSlot>,
    /// The rules in order: imports first, then namespaces, then the rest.
    rules: Vec<RuleSlot>,
    namespaces: Namespaces,
    has_owner_rule: bool,
    load_completed: bool,
    did_load_error_occur: bool,
    is_mutable: bool,
    has_syntactically_valid_css_header: bool,
    /// This sheet's URL, preceded by the URLs of the sheets importing it.
    import_chain: Vec<Url>,
}

impl StylesheetContents {
    fn empty(
        url_data: UrlExtraData,
        origin: Origin,
        quirks_mode: QuirksMode,
        max_selector_component_count: usize,
        import_chain: Vec<Url>,
    ) -> Self {
        StylesheetContents {
            origin,
            url_data,
            quirks_mode,
            max_selector_component_count,
            charset: None,
            rules: vec![],
            namespaces: Namespaces::default(),
            has_owner_rule: false,
            load_completed: false,
            did_load_error_occur: false,
            is_mutable: false,
            has_syntactically_valid_css_header: true,
            import_chain,
        }
    }

    /// Parses a stylesheet.
    ///
    /// Invalid rules are reported to `error_reporter` and dropped. Imports
    /// are requested from `loader`; without one they fail.
    pub fn from_str(
        css: &str,
        url_data: UrlExtraData,
        origin: Origin,
        quirks_mode: QuirksMode,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
        error_reporter: Option<&dyn ParseErrorReporter>,
    ) -> Self {
        let import_chain = vec![url_data.url().clone()];
        Self::from_str_with_import_chain(
            css,
            url_data,
            origin,
            quirks_mode,
            MAX_SELECTOR_COMPONENT_COUNT,
            stylesheet_loader,
            error_reporter,
            import_chain,
        )
    }

    /// Like `from_str`, with the quirks mode and selector limit of `config`.
    pub fn from_str_with_config(
        css: &str,
        url_data: UrlExtraData,
        origin: Origin,
        config: &StyleConfig,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
        error_reporter: Option<&dyn ParseErrorReporter>,
    ) -> Self {
        let import_chain = vec![url_data.url().clone()];
        Self::from_str_with_import_chain(
            css,
            url_data,
            origin,
            config.quirks_mode(),
            config.max_selector_component_count,
            stylesheet_loader,
            error_reporter,
            import_chain,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_str_with_import_chain(
        css: &str,
        url_data: UrlExtraData,
        origin: Origin,
        quirks_mode: QuirksMode,
        max_selector_component_count: usize,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
        error_reporter: Option<&dyn ParseErrorReporter>,
        import_chain: Vec<Url>,
    ) -> Self {
        let mut contents = StylesheetContents::empty(
            url_data,
            origin,
            quirks_mode,
            max_selector_component_count,
            import_chain,
        );
        contents.has_owner_rule = contents.import_chain.len() > 1;
        contents.charset = parse_charset(css).map(|encoding| CharsetSlot {
            encoding: encoding.into(),
            wrapper: OnceCell::new(),
        });

        let mut namespaces = Namespaces::default();
        let rules = {
            let mut context = ParserContext::new(
                origin,
                &contents.url_data,
                None,
                quirks_mode,
                error_reporter,
            );
            context.max_selector_component_count = max_selector_component_count;

            let mut input = ParserInput::new(css);
            let mut input = Parser::new(&mut input);
            let mut rule_parser = TopLevelRuleParser::new(
                context,
                stylesheet_loader,
                &mut namespaces,
                &contents.import_chain,
            );

            let mut rules = Vec::new();
            let mut iter = StyleSheetParser::new(&mut input, &mut rule_parser);
            while let Some(result) = iter.next() {
                match result {
                    Ok(rule) => rules.push(rule),
                    Err((error, slice)) => report_invalid_rule(&iter.parser.context, error, slice),
                }
            }
            rules
        };

        contents.namespaces = namespaces;
        for rule in rules {
            contents.parser_append_rule(rule);
        }
        contents.check_loaded();

        debug!(
            "Parsed {} with {} rules",
            contents.url_data.as_str(),
            contents.rules.len()
        );
        contents
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    #[inline]
    pub fn url_data(&self) -> &UrlExtraData {
        &self.url_data
    }

    #[inline]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    #[inline]
    pub fn max_selector_component_count(&self) -> usize {
        self.max_selector_component_count
    }

    #[inline]
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The URL of this sheet, preceded by the URLs of the sheets importing
    /// it.
    #[inline]
    pub fn import_ancestors(&self) -> &[Url] {
        &self.import_chain
    }

    /// The encoding of the `@charset` rule, if the sheet started with one.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_ref().map(|c| &*c.encoding)
    }

    /// The rules of the sheet, in order, without the `@charset` rule.
    pub fn rules(&self) -> impl Iterator<Item = &CssRule> + '_ {
        self.rules.iter().map(|slot| &slot.rule)
    }

    /// The `@import` rules of the sheet.
    pub fn import_rules(&self) -> impl Iterator<Item = &ImportRule> + '_ {
        self.rules.iter().filter_map(|slot| match slot.rule {
            CssRule::Import(ref rule) => Some(&**rule),
            _ => None,
        })
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.is_mutable
    }

    pub fn set_mutable(&mut self) {
        self.is_mutable = true;
    }

    pub fn has_owner_rule(&self) -> bool {
        self.has_owner_rule
    }

    /// Marks these contents as the sheet of an `@import` rule.
    pub fn set_has_owner_rule(&mut self, has_owner_rule: bool) {
        self.has_owner_rule = has_owner_rule;
    }

    pub fn load_completed(&self) -> bool {
        self.load_completed
    }

    pub fn did_load_error_occur(&self) -> bool {
        self.did_load_error_occur
    }

    pub fn set_did_load_error_occur(&mut self) {
        self.did_load_error_occur = true;
    }

    /// Records whether the sheet came with a MIME type that marks it as CSS.
    pub fn set_has_syntactically_valid_css_header(&mut self, valid: bool) {
        self.has_syntactically_valid_css_header = valid;
    }

    /// Whether these contents may be shared through the in-memory cache.
    pub fn is_cacheable(&self) -> bool {
        // FIXME: Support copying import rules.
        if self.import_rules().next().is_some() {
            return false;
        }
        // Sheets of @import rules are not cached on their own.
        if self.has_owner_rule {
            return false;
        }
        if !self.load_completed {
            return false;
        }
        if self.did_load_error_occur {
            return false;
        }
        // It is not the original sheet anymore.
        if self.is_mutable {
            return false;
        }
        // If the header is valid we are not going to need to check the
        // SecurityOrigin.
        self.has_syntactically_valid_css_header
    }

    /// Appends a rule found by the parser. A style rule with more simple
    /// selectors than the limit is split into several rules sharing its
    /// declarations.
    pub fn parser_append_rule(&mut self, rule: CssRule) {
        if let CssRule::Style(ref style_rule) = rule {
            if style_rule.selectors.component_count() > self.max_selector_component_count {
                let pieces = style_rule
                    .split_into_multiple_rules_with_maximum_selector_component_count(
                        self.max_selector_component_count,
                    );
                trace!("Split a style rule into {} rules", pieces.len());
                self.rules.extend(
                    pieces
                        .into_iter()
                        .map(|piece| RuleSlot::new(CssRule::Style(Arc::new(piece)))),
                );
                return;
            }
        }
        self.rules.push(RuleSlot::new(rule));
    }

    /// The number of rules the CSSOM sees, counting the `@charset` rule.
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.charset.is_some() as usize
    }

    /// The rule at a CSSOM index. `None` for the `@charset` rule and for
    /// indices past the end.
    pub fn rule_at(&self, index: usize) -> Option<&CssRule> {
        let index = match self.charset {
            Some(..) => index.checked_sub(1)?,
            None => index,
        };
        self.rules.get(index).map(|slot| &slot.rule)
    }

    /// The CSSOM object of the rule at `index`. Asking twice gives the same
    /// object.
    pub fn wrapper_at(&self, index: usize) -> Option<Arc<CssRuleWrapper>> {
        let index = match self.charset {
            Some(ref charset) => {
                if index == 0 {
                    return Some(charset.wrapper());
                }
                index - 1
            },
            None => index,
        };
        self.rules.get(index).map(RuleSlot::wrapper)
    }

    /// What a rule inserted at the CSSOM index `index` would have around it.
    pub fn insert_rule_context(&self, index: usize) -> InsertRuleContext {
        let index = match self.charset {
            Some(..) => index.saturating_sub(1),
            None => index,
        };
        let previous_state = index
            .checked_sub(1)
            .and_then(|i| self.rules.get(i))
            .map_or(State::Start, |slot| slot.rule.rule_state());
        let following = self.rules.get(index..).unwrap_or(&[]);
        InsertRuleContext {
            previous_state,
            next_state: following.first().map(|slot| slot.rule.rule_state()),
            only_namespaces_follow: following
                .iter()
                .all(|slot| matches!(slot.rule, CssRule::Namespace(..))),
        }
    }

    /// Inserts a rule at a CSSOM index, keeping imports before namespaces
    /// and namespaces before everything else.
    pub fn wrapper_insert_rule(
        &mut self,
        rule: CssRule,
        index: usize,
    ) -> Result<(), RulesMutateError> {
        debug_assert!(self.is_mutable);
        if index > self.rule_count() {
            return Err(RulesMutateError::IndexSize);
        }

        let mut child_index = index;
        if self.charset.is_some() {
            // Nothing can be inserted before @charset.
            if child_index == 0 {
                return Err(RulesMutateError::HierarchyRequest);
            }
            child_index -= 1;
        }

        let new_state = rule.rule_state();
        let previous_state = child_index
            .checked_sub(1)
            .map_or(State::Start, |i| self.rules[i].rule.rule_state());
        if previous_state > new_state {
            return Err(RulesMutateError::HierarchyRequest);
        }
        if let Some(next) = self.rules.get(child_index) {
            if new_state > next.rule.rule_state() {
                return Err(RulesMutateError::HierarchyRequest);
            }
        }
        if new_state == State::Namespaces &&
            self.rules[child_index..]
                .iter()
                .any(|slot| !matches!(slot.rule, CssRule::Namespace(..)))
        {
            return Err(RulesMutateError::InvalidState);
        }

        if let CssRule::Namespace(ref namespace_rule) = rule {
            self.namespaces
                .parser_add_namespace(namespace_rule.prefix.as_ref(), &namespace_rule.url);
        }
        self.rules.insert(child_index, RuleSlot::new(rule));
        Ok(())
    }

    /// Removes the rule at a CSSOM index.
    ///
    /// A namespace rule can only go while the sheet holds nothing but
    /// import and namespace rules.
    pub fn wrapper_delete_rule(&mut self, index: usize) -> Result<(), RulesMutateError> {
        debug_assert!(self.is_mutable);
        let mut child_index = index;
        if self.charset.is_some() {
            if child_index == 0 {
                self.charset = None;
                return Ok(());
            }
            child_index -= 1;
        }

        let slot = self.rules.get(child_index).ok_or(RulesMutateError::IndexSize)?;
        if let CssRule::Namespace(..) = slot.rule {
            if self
                .rules
                .iter()
                .any(|slot| !matches!(slot.rule, CssRule::Import(..) | CssRule::Namespace(..)))
            {
                return Err(RulesMutateError::InvalidState);
            }
        }
        self.rules.remove(child_index);
        Ok(())
    }

    pub fn parser_add_namespace(&mut self, prefix: Option<&Prefix>, url: &Namespace) {
        self.namespaces.parser_add_namespace(prefix, url);
    }

    pub fn determine_namespace(&self, prefix: Option<&str>) -> Option<NamespaceConstraint> {
        self.namespaces.determine_namespace(prefix)
    }

    /// Whether an import of this sheet, or of one of its imports, is still
    /// loading.
    pub fn is_loading(&self) -> bool {
        self.import_rules().any(ImportRule::is_loading)
    }

    /// Marks the load as completed once no import is pending. Returns
    /// whether it is.
    pub fn check_loaded(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.load_completed = true;
        true
    }

    pub fn has_failed_or_canceled_subresources(&self) -> bool {
        self.import_rules()
            .any(ImportRule::has_failed_or_canceled_subresources)
    }

    /// Hands the result of a pending import load to the `@import` rules
    /// waiting for `url`, in this sheet or in the sheets it imports.
    ///
    /// Returns whether any rule was waiting for it.
    pub fn set_import_sheet(
        &mut self,
        url: &Url,
        result: LoadResult,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
    ) -> bool {
        let mut found = false;
        for index in 0..self.rules.len() {
            let import_rule = match self.rules[index].rule {
                CssRule::Import(ref rule) => rule,
                _ => break,
            };

            let state = match import_rule.state {
                ImportState::Pending if import_rule.url.as_ref() == Some(url) => {
                    match result {
                        LoadResult::Pending => continue,
                        LoadResult::Failed => ImportState::Failed,
                        LoadResult::Text(ref css) => {
                            let mut import_chain = self.import_chain.clone();
                            import_chain.push(url.clone());
                            let sheet = StylesheetContents::from_str_with_import_chain(
                                css,
                                UrlExtraData::new(url.clone()),
                                self.origin,
                                self.quirks_mode,
                                self.max_selector_component_count,
                                stylesheet_loader,
                                None,
                                import_chain,
                            );
                            ImportState::Loaded(Arc::new(sheet))
                        },
                    }
                },
                ImportState::Loaded(ref sheet) if sheet.is_loading() => {
                    let mut sheet = sheet.clone();
                    if !Arc::make_mut(&mut sheet).set_import_sheet(
                        url,
                        result.clone(),
                        stylesheet_loader,
                    ) {
                        continue;
                    }
                    ImportState::Loaded(sheet)
                },
                _ => continue,
            };

            let mut import_rule = (**import_rule).clone();
            import_rule.state = state;
            // The rule changed, so it gets a fresh CSSOM object.
            self.rules[index] = RuleSlot::new(CssRule::Import(Arc::new(import_rule)));
            found = true;
        }

        if found {
            self.check_loaded();
        }
        found
    }

    /// A copy of these contents that is not marked mutable and has no CSSOM
    /// objects yet.
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.is_mutable = false;
        for slot in copy.rules.iter_mut() {
            slot.wrapper = OnceCell::new();
        }
        if let Some(ref mut charset) = copy.charset {
            charset.wrapper = OnceCell::new();
        }
        copy
    }

    /// A rough measure of the memory held by these contents.
    pub fn estimated_size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>() +
            self.rules
                .iter()
                .map(|slot| slot.rule.estimated_size_in_bytes())
                .sum::<usize>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.rules.shrink_to_fit();
        self.import_chain.shrink_to_fit();
        self.namespaces.prefixes.shrink_to_fit();
    }

    /// Calls `f` with every style rule that applies on `device`, following
    /// imports and conditional group rules.
    pub fn effective_style_rules<F>(&self, device: &Device, mut f: F)
    where
        F: FnMut(&Arc<StyleRule>),
    {
        fn walk<F>(rules: &mut dyn Iterator<Item = &CssRule>, device: &Device, f: &mut F)
        where
            F: FnMut(&Arc<StyleRule>),
        {
            for rule in rules {
                match *rule {
                    CssRule::Style(ref style_rule) => f(style_rule),
                    CssRule::Import(ref import_rule) => {
                        if let Some(sheet) = import_rule.stylesheet() {
                            if device.evaluate(Some(&import_rule.media)) {
                                walk(&mut sheet.rules(), device, f);
                            }
                        }
                    },
                    CssRule::Media(ref media_rule) => {
                        if media_rule.media_queries.evaluate(device) {
                            walk(&mut media_rule.rules.iter(), device, f);
                        }
                    },
                    CssRule::Supports(ref supports_rule) => {
                        if supports_rule.enabled {
                            walk(&mut supports_rule.rules.iter(), device, f);
                        }
                    },
                    _ => {},
                }
            }
        }
        walk(&mut self.rules(), device, &mut f)
    }
}

/// The CSSOM `CSSStyleSheet`: the media and title a sheet was included with,
/// plus a handle to its contents in a [`SheetStore`].
#[derive(Debug)]
pub struct Stylesheet {
    key: usize,
    contents: SheetId,
    media: MediaList,
    title: Option<String>,
    disabled: bool,
    /// Whether the rules were mutated through the CSSOM since the style
    /// resolver last looked.
    mutated: bool,
}

impl Stylesheet {
    /// Creates a sheet over contents that are already in `store`.
    pub fn new(store: &mut SheetStore, contents: SheetId, media: MediaList) -> Self {
        store.register_client(contents);
        Stylesheet {
            key: store.next_sheet_key(),
            contents,
            media,
            title: None,
            disabled: false,
            mutated: false,
        }
    }

    /// Parses `css` into new contents and creates a sheet over them.
    #[allow(clippy::too_many_arguments)]
    pub fn from_str(
        store: &mut SheetStore,
        css: &str,
        url_data: UrlExtraData,
        origin: Origin,
        media: MediaList,
        quirks_mode: QuirksMode,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
        error_reporter: Option<&dyn ParseErrorReporter>,
    ) -> Self {
        let contents = StylesheetContents::from_str(
            css,
            url_data,
            origin,
            quirks_mode,
            stylesheet_loader,
            error_reporter,
        );
        let id = store.insert(contents);
        Stylesheet::new(store, id, media)
    }

    /// A key that tells this sheet apart from every other sheet of the same
    /// store.
    #[inline]
    pub fn key(&self) -> usize {
        self.key
    }

    #[inline]
    pub fn contents(&self) -> SheetId {
        self.contents
    }

    pub fn contents_in<'s>(&self, store: &'s SheetStore) -> &'s StylesheetContents {
        store.get(self.contents)
    }

    #[inline]
    pub fn media(&self) -> &MediaList {
        &self.media
    }

    pub fn set_media(&mut self, media: MediaList) {
        self.media = media;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    #[inline]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Returns whether the value changed.
    pub fn set_disabled(&mut self, disabled: bool) -> bool {
        if self.disabled == disabled {
            return false;
        }
        self.disabled = disabled;
        true
    }

    pub fn is_loading(&self, store: &SheetStore) -> bool {
        self.contents_in(store).is_loading()
    }

    /// Whether the CSSOM changed the rules since the last call.
    pub fn take_mutated(&mut self) -> bool {
        std::mem::replace(&mut self.mutated, false)
    }

    #[inline]
    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    /// `cssRules.length`
    pub fn length(&self, store: &SheetStore) -> usize {
        self.contents_in(store).rule_count()
    }

    /// `cssRules.item(index)`
    pub fn item(&self, store: &SheetStore, index: usize) -> Option<Arc<CssRuleWrapper>> {
        self.contents_in(store).wrapper_at(index)
    }

    /// `cssRules`
    pub fn css_rules(&self, store: &SheetStore) -> Vec<Arc<CssRuleWrapper>> {
        let contents = self.contents_in(store);
        (0..contents.rule_count())
            .filter_map(|index| contents.wrapper_at(index))
            .collect()
    }

    /// Gets contents this sheet alone may write to, copying them first when
    /// another sheet or the in-memory cache shares them.
    pub fn will_mutate_rules<'s>(&mut self, store: &'s mut SheetStore) -> &'s mut StylesheetContents {
        if store.clients(self.contents) > 1 || store.is_in_memory_cache(self.contents) {
            let copy = store.copy_for_write(self.contents);
            store.unregister_client(self.contents);
            store.register_client(copy);
            self.contents = copy;
        }
        let contents = store.get_mut(self.contents);
        contents.set_mutable();
        contents
    }

    /// `insertRule(rule, index)`. Returns the index of the new rule.
    pub fn insert_rule(
        &mut self,
        store: &mut SheetStore,
        rule: &str,
        index: usize,
        stylesheet_loader: Option<&dyn StylesheetLoader>,
    ) -> Result<usize, RulesMutateError> {
        let new_rule = {
            let contents = self.contents_in(store);
            if index > contents.rule_count() {
                return Err(RulesMutateError::IndexSize);
            }
            CssRule::parse(
                rule,
                contents,
                contents.insert_rule_context(index),
                stylesheet_loader,
            )?
        };

        self.will_mutate_rules(store)
            .wrapper_insert_rule(new_rule, index)?;
        self.mutated = true;
        Ok(index)
    }

    /// `deleteRule(index)`
    pub fn delete_rule(&mut self, store: &mut SheetStore, index: usize) -> Result<(), RulesMutateError> {
        if index >= self.length(store) {
            return Err(RulesMutateError::IndexSize);
        }
        self.will_mutate_rules(store).wrapper_delete_rule(index)?;
        self.mutated = true;
        Ok(())
    }

    /// The legacy `addRule(selector, style, index)`, which appends when no
    /// index is given and always returns -1.
    pub fn add_rule(
        &mut self,
        store: &mut SheetStore,
        selector: &str,
        style: &str,
        index: Option<usize>,
    ) -> Result<i32, RulesMutateError> {
        let mut text = String::with_capacity(selector.len() + style.len() + 4);
        text.push_str(selector);
        text.push_str(" { ");
        text.push_str(style);
        if !style.is_empty() {
            text.push(' ');
        }
        text.push('}');
        let index = index.unwrap_or_else(|| self.length(store));
        self.insert_rule(store, &text, index, None)?;
        Ok(-1)
    }

    /// The legacy `removeRule(index)`.
    pub fn remove_rule(&mut self, store: &mut SheetStore, index: usize) -> Result<(), RulesMutateError> {
        self.delete_rule(store, index)
    }

    /// Gives up this sheet's share of its contents.
    pub fn detach(self, store: &mut SheetStore) {
        store.unregister_client(self.contents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheets::{CssRuleType, NamespaceRule};

    fn namespace_rule(prefix: Option<&str>, url: &str) -> CssRule {
        CssRule::Namespace(Arc::new(NamespaceRule {
            prefix: prefix.map(Prefix::from),
            url: Namespace::from(url),
            source_location: cssparser::SourceLocation { line: 0, column: 1 },
        }))
    }

    fn url() -> UrlExtraData {
        UrlExtraData::new(Url::parse("http://example.com/sheet.css").unwrap())
    }

    fn parse(css: &str) -> StylesheetContents {
        StylesheetContents::from_str(
            css,
            url(),
            Origin::Author,
            QuirksMode::NoQuirks,
            None,
            None,
        )
    }

    #[test]
    fn charset_counts_as_the_first_rule() {
        let contents = parse("@charset \"utf-8\"; a { color: red }");
        assert_eq!(contents.charset(), Some("utf-8"));
        assert_eq!(contents.rule_count(), 2);
        assert!(contents.rule_at(0).is_none());
        assert_eq!(contents.rule_at(1).map(|r| r.rule_type()), Some(CssRuleType::Style));
        let wrapper = contents.wrapper_at(0).unwrap();
        assert_eq!(wrapper.css_text(), "@charset \"utf-8\";");
    }

    #[test]
    fn misplaced_rules_are_dropped() {
        let contents = parse("a { color: red } @import url(x.css); @namespace svg url(y);");
        assert_eq!(contents.rule_count(), 1);
        assert!(contents.namespaces().prefixes.is_empty());
    }

    #[test]
    fn fresh_parse_is_cacheable() {
        let contents = parse("a { color: red }");
        assert!(contents.load_completed());
        assert!(contents.is_cacheable());

        let mut imported = contents.clone();
        imported.set_has_owner_rule(true);
        assert!(!imported.is_cacheable());

        let mut bad_header = contents.clone();
        bad_header.set_has_syntactically_valid_css_header(false);
        assert!(!bad_header.is_cacheable());

        let with_import = parse("@import url(other.css); a { color: red }");
        assert!(!with_import.is_cacheable());
    }

    #[test]
    fn wrappers_are_created_once() {
        let contents = parse("a { color: red } b { color: blue }");
        let first = contents.wrapper_at(1).unwrap();
        let again = contents.wrapper_at(1).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        let copy = contents.copy();
        assert!(!Arc::ptr_eq(&first, &copy.wrapper_at(1).unwrap()));
        assert!(contents.wrapper_at(2).is_none());
    }

    #[test]
    fn insertion_keeps_rule_order() {
        let mut contents = parse("@import url(a.css); @namespace url(x); b { color: red }");
        contents.set_mutable();

        let import = contents.rule_at(0).unwrap().clone();
        assert_eq!(
            contents.wrapper_insert_rule(import.clone(), 3),
            Err(RulesMutateError::HierarchyRequest)
        );
        assert_eq!(contents.wrapper_insert_rule(import, 0), Ok(()));

        assert_eq!(
            contents.wrapper_insert_rule(namespace_rule(Some("p"), "y"), 4),
            Err(RulesMutateError::HierarchyRequest)
        );
        assert_eq!(
            contents.wrapper_insert_rule(namespace_rule(Some("p"), "y"), 3),
            Err(RulesMutateError::InvalidState)
        );
        assert_eq!(contents.rule_count(), 4);
    }

    #[test]
    fn namespace_rules_outlive_other_rules() {
        let mut contents = parse("@namespace url(x); b { color: red }");
        contents.set_mutable();
        assert_eq!(contents.wrapper_delete_rule(0), Err(RulesMutateError::InvalidState));
        assert_eq!(contents.wrapper_delete_rule(1), Ok(()));
        assert_eq!(contents.wrapper_delete_rule(0), Ok(()));
        assert_eq!(contents.rule_count(), 0);
    }
}
