/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Which elements have to be restyled when stylesheets are added to a
//! document.

#![deny(unsafe_code)]

use crate::dom::{traverse_subtree, TElement};
use crate::stylesheets::{CssRule, StylesheetContents};
use crate::Atom;
use log::debug;
use rustc_hash::FxHashSet;
use selectors::matching::QuirksMode;
use selectors::parser::{Component, SelectorList};

/// A scope of a selector: the elements that a selector anchored on it can
/// only match inside of.
#[derive(Debug, Eq, Hash, PartialEq)]
enum Scope {
    ID(Atom),
    Class(Atom),
}

impl Scope {
    fn is_id(&self) -> bool {
        matches!(*self, Scope::ID(..))
    }
}

/// Finds the scope of every selector of `selectors`, or returns false if
/// some selector has none.
///
/// We pick the widest scope along the chain of descendant and child
/// combinators, not the narrowest, to minimize the number of scopes found.
/// IDs are preferred to classes.
fn determine_selector_scopes(
    selectors: &SelectorList,
    id_scopes: &mut FxHashSet<Atom>,
    class_scopes: &mut FxHashSet<Atom>,
) -> bool {
    for selector in selectors.iter() {
        let mut scope: Option<Scope> = None;
        let mut iter = selector.iter();
        loop {
            for component in &mut iter {
                match *component {
                    Component::ID(ref id) => scope = Some(Scope::ID(id.clone())),
                    Component::Class(ref class) => {
                        if scope.as_ref().map_or(true, |s| !s.is_id()) {
                            scope = Some(Scope::Class(class.clone()));
                        }
                    },
                    _ => {},
                }
            }
            match iter.next_sequence() {
                Some(combinator) if combinator.is_ancestor() => {},
                _ => break,
            }
        }

        match scope {
            Some(Scope::ID(id)) => {
                id_scopes.insert(id);
            },
            Some(Scope::Class(class)) => {
                class_scopes.insert(class);
            },
            None => return false,
        }
    }
    true
}

/// The outcome of looking at the rules of newly added stylesheets.
#[derive(Debug, Default)]
pub struct StyleInvalidationAnalysis {
    dirties_all_style: bool,
    id_scopes: FxHashSet<Atom>,
    class_scopes: FxHashSet<Atom>,
    quirks_mode: QuirksMode,
}

impl StyleInvalidationAnalysis {
    /// Analyzes `sheets`, their imports included.
    pub fn new(sheets: &[&StylesheetContents]) -> Self {
        let mut analysis = StyleInvalidationAnalysis::default();
        if let Some(sheet) = sheets.first() {
            analysis.quirks_mode = sheet.quirks_mode();
        }
        for sheet in sheets {
            analysis.analyze_style_sheet(sheet);
            if analysis.dirties_all_style {
                analysis.id_scopes.clear();
                analysis.class_scopes.clear();
                break;
            }
        }
        debug!(
            "StyleInvalidationAnalysis: dirties_all_style: {}, ids: {:?}, classes: {:?}",
            analysis.dirties_all_style, analysis.id_scopes, analysis.class_scopes
        );
        analysis
    }

    fn analyze_style_sheet(&mut self, sheet: &StylesheetContents) {
        // See if all rules on the sheet are scoped to some specific ids or
        // classes.
        for import_rule in sheet.import_rules() {
            let Some(imported) = import_rule.stylesheet() else {
                continue;
            };
            self.analyze_style_sheet(imported);
            if self.dirties_all_style {
                return;
            }
        }

        for rule in sheet.rules() {
            match *rule {
                CssRule::Import(..) | CssRule::Namespace(..) => {},
                CssRule::Style(ref style_rule) => {
                    if !determine_selector_scopes(
                        &style_rule.selectors,
                        &mut self.id_scopes,
                        &mut self.class_scopes,
                    ) {
                        self.dirties_all_style = true;
                        return;
                    }
                },
                // Media rules and maybe some others could be allowed.
                _ => {
                    self.dirties_all_style = true;
                    return;
                },
            }
        }
    }

    /// Whether the whole document has to be restyled.
    #[inline]
    pub fn dirties_all_style(&self) -> bool {
        self.dirties_all_style
    }

    #[inline]
    pub fn id_scopes(&self) -> &FxHashSet<Atom> {
        &self.id_scopes
    }

    #[inline]
    pub fn class_scopes(&self) -> &FxHashSet<Atom> {
        &self.class_scopes
    }

    fn element_matches_scopes<E: TElement>(&self, element: &E) -> bool {
        let case_sensitivity = self.quirks_mode.classes_and_ids_case_sensitivity();
        if !self.id_scopes.is_empty() {
            let has_id = self
                .id_scopes
                .iter()
                .any(|id| element.has_id(id, case_sensitivity));
            if has_id {
                return true;
            }
        }
        if self.class_scopes.is_empty() {
            return false;
        }
        let mut found = false;
        element.each_class(|class| {
            if !found {
                found = self
                    .class_scopes
                    .iter()
                    .any(|scope| case_sensitivity.eq_atom(class, scope));
            }
        });
        found
    }

    /// Marks every element of the subtree of `root` that is in one of the
    /// scopes as needing a restyle. Their subtrees are not visited further.
    pub fn invalidate_style<E: TElement>(&self, root: &E) {
        debug_assert!(!self.dirties_all_style);
        if self.id_scopes.is_empty() && self.class_scopes.is_empty() {
            return;
        }
        traverse_subtree(root, |element| {
            if element.needs_style_recalc() {
                return false;
            }
            if self.element_matches_scopes(element) {
                element.set_needs_style_recalc();
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheets::{Origin, UrlExtraData};
    use url::Url;

    fn analyze(css: &str) -> StyleInvalidationAnalysis {
        let contents = StylesheetContents::from_str(
            css,
            UrlExtraData::new(Url::parse("http://example.com/a.css").unwrap()),
            Origin::Author,
            QuirksMode::NoQuirks,
            None,
            None,
        );
        StyleInvalidationAnalysis::new(&[&contents])
    }

    #[test]
    fn scoped_rules() {
        let analysis = analyze("#a .b span { color: red } .c > .d, div#e.f { color: blue }");
        assert!(!analysis.dirties_all_style());
        let mut ids: Vec<_> = analysis.id_scopes().iter().map(|a| a.to_string()).collect();
        ids.sort();
        let classes: Vec<_> = analysis.class_scopes().iter().map(|a| a.to_string()).collect();
        assert_eq!(ids, ["a", "e"]);
        assert_eq!(classes, ["c"]);
    }

    #[test]
    fn sibling_combinators_stop_the_scope_search() {
        let analysis = analyze("#a + .b { color: red }");
        assert!(!analysis.dirties_all_style());
        assert!(analysis.id_scopes().is_empty());
        assert!(analysis.class_scopes().contains(&Atom::from("b")));

        assert!(analyze("#a + span { color: red }").dirties_all_style());
    }

    #[test]
    fn unscoped_rules_dirty_everything() {
        assert!(analyze("span { color: red }").dirties_all_style());
        assert!(analyze("@media screen { .a { color: red } }").dirties_all_style());
        let analysis = analyze(".a { color: red } div { color: blue }");
        assert!(analysis.dirties_all_style());
        assert!(analysis.class_scopes().is_empty());
    }
}
