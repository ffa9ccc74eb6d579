/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A centralized set of stylesheets for a document.

use crate::dom::TElement;
use crate::invalidation::stylesheets::StyleInvalidationAnalysis;
use crate::stylesheets::{SheetStore, Stylesheet, StylesheetContents};
use crate::stylist::Stylist;
use log::debug;

/// How much of the stylist has to be rebuilt after the list of active
/// sheets changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StyleResolverUpdateType {
    /// Throw everything away and start over.
    Reconstruct,
    /// Sheets were inserted before existing ones: rebuild the author rules
    /// so that they keep their order.
    Reset,
    /// Sheets were only appended: add their rules.
    Additive,
}

/// What the caller of `update_active_style_sheets` allows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateFlag {
    /// Try to reuse the existing rules and to restyle only some elements.
    OptimizedUpdate,
    /// Rebuild everything.
    FullUpdate,
}

/// The author and user sheets of a document, the store that owns their
/// contents, and which author sheets the stylist currently holds the rules
/// of.
#[derive(Debug, Default)]
pub struct DocumentStyleSheetCollection {
    store: SheetStore,

    /// The author sheets in document order.
    author_sheets: Vec<Stylesheet>,

    user_sheets: Vec<Stylesheet>,

    /// The keys of the author sheets the stylist was last updated with.
    active_author_sheets: Vec<usize>,

    /// Sheets that block rendering until they are loaded.
    pending_stylesheets: usize,

    had_active_loading_stylesheet: bool,

    /// Set when something the optimized path cannot account for changed.
    needs_full_update: bool,
}

impl DocumentStyleSheetCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The store owning the contents of every sheet of the collection.
    #[inline]
    pub fn store(&self) -> &SheetStore {
        &self.store
    }

    /// The store, for parsing new sheets into it.
    #[inline]
    pub fn store_mut(&mut self) -> &mut SheetStore {
        &mut self.store
    }

    /// The author sheets, in document order.
    #[inline]
    pub fn author_sheets(&self) -> &[Stylesheet] {
        &self.author_sheets
    }

    /// The user sheets.
    #[inline]
    pub fn user_sheets(&self) -> &[Stylesheet] {
        &self.user_sheets
    }

    /// The keys of the author sheets the stylist holds the rules of.
    #[inline]
    pub fn active_author_sheets(&self) -> &[usize] {
        &self.active_author_sheets
    }

    fn author_sheet_index(&self, key: usize) -> Option<usize> {
        self.author_sheets.iter().position(|sheet| sheet.key() == key)
    }

    /// Looks an author sheet up by key.
    pub fn author_sheet(&self, key: usize) -> Option<&Stylesheet> {
        self.author_sheet_index(key).map(|i| &self.author_sheets[i])
    }

    /// Looks an author sheet up by key, along with the store, to mutate its
    /// rules or media.
    pub fn author_sheet_mut(&mut self, key: usize) -> Option<(&mut Stylesheet, &mut SheetStore)> {
        let index = self.author_sheet_index(key)?;
        Some((&mut self.author_sheets[index], &mut self.store))
    }

    /// Appends an author sheet and returns its key.
    pub fn add_author_sheet(&mut self, sheet: Stylesheet) -> usize {
        let key = sheet.key();
        debug!("Adding author sheet {}", key);
        self.author_sheets.push(sheet);
        key
    }

    /// Inserts an author sheet at `index` of the document order, or at the
    /// end if `index` is past it, and returns its key.
    pub fn insert_author_sheet(&mut self, index: usize, sheet: Stylesheet) -> usize {
        let key = sheet.key();
        debug!("Inserting author sheet {} at {}", key, index);
        let index = index.min(self.author_sheets.len());
        self.author_sheets.insert(index, sheet);
        key
    }

    /// Removes an author sheet, releasing its contents. Returns whether it
    /// was there.
    pub fn remove_author_sheet(&mut self, key: usize) -> bool {
        let Some(index) = self.author_sheet_index(key) else {
            return false;
        };
        debug!("Removing author sheet {}", key);
        let sheet = self.author_sheets.remove(index);
        sheet.detach(&mut self.store);
        true
    }

    /// Adds a user sheet. The user rules are only rebuilt by a full update.
    pub fn add_user_sheet(&mut self, sheet: Stylesheet) {
        debug!("Adding user sheet {}", sheet.key());
        self.user_sheets.push(sheet);
        self.needs_full_update = true;
    }

    /// Notes a sheet that started loading.
    pub fn add_pending_sheet(&mut self) {
        self.pending_stylesheets += 1;
    }

    /// Notes a sheet that finished loading. Returns true when it was the
    /// last one, at which point the active sheets should be updated.
    pub fn pending_sheet_loaded(&mut self) -> bool {
        debug_assert!(self.pending_stylesheets > 0);
        self.pending_stylesheets = self.pending_stylesheets.saturating_sub(1);
        self.pending_stylesheets == 0
    }

    #[inline]
    pub fn has_pending_sheets(&self) -> bool {
        self.pending_stylesheets > 0
    }

    /// The keys of the author sheets that are enabled and not empty, in
    /// document order.
    fn collect_active_author_sheets(&self) -> Vec<usize> {
        self.author_sheets
            .iter()
            .filter(|sheet| !sheet.disabled() && sheet.length(&self.store) > 0)
            .map(|sheet| sheet.key())
            .collect()
    }

    /// Decides how the stylist has to be updated for the active author
    /// sheets to become `new_sheets`, and whether the whole document has to
    /// be restyled. When only scoped rules were added, the elements in their
    /// scopes under `document` are marked for restyle here.
    pub fn analyze_style_sheet_change<E: TElement>(
        &mut self,
        update_flag: UpdateFlag,
        new_sheets: &[usize],
        document: Option<&E>,
    ) -> (StyleResolverUpdateType, bool) {
        let reconstruct = (StyleResolverUpdateType::Reconstruct, true);

        // Sheets whose imports are still loading are active. A full
        // recalc has to happen once they are done.
        let has_active_loading_stylesheet = new_sheets.iter().any(|key| {
            self.author_sheet(*key)
                .is_some_and(|sheet| sheet.is_loading(&self.store))
        });
        if self.had_active_loading_stylesheet && !has_active_loading_stylesheet {
            self.had_active_loading_stylesheet = false;
            return reconstruct;
        }
        self.had_active_loading_stylesheet = has_active_loading_stylesheet;

        if update_flag != UpdateFlag::OptimizedUpdate {
            return reconstruct;
        }

        // Find out which sheets are new. The old list has to be a
        // subsequence of the new one.
        let old_sheets = &self.active_author_sheets;
        if new_sheets.len() < old_sheets.len() {
            return reconstruct;
        }
        let mut added_sheets = vec![];
        let mut new_index = 0;
        for old in old_sheets {
            if new_index >= new_sheets.len() {
                return reconstruct;
            }
            while *old != new_sheets[new_index] {
                added_sheets.push(new_sheets[new_index]);
                new_index += 1;
                if new_index == new_sheets.len() {
                    return reconstruct;
                }
            }
            new_index += 1;
        }
        let has_insertions = !added_sheets.is_empty();
        added_sheets.extend_from_slice(&new_sheets[new_index..]);

        // Sheets added at the end can just be appended to the author rules.
        // Insertions need every sheet re-added for the rules to stay in order.
        let update_type = if has_insertions {
            StyleResolverUpdateType::Reset
        } else {
            StyleResolverUpdateType::Additive
        };

        let Some(document) = document else {
            return (update_type, true);
        };
        let contents: Vec<&StylesheetContents> = added_sheets
            .iter()
            .filter_map(|key| self.author_sheet(*key))
            .map(|sheet| sheet.contents_in(&self.store))
            .collect();
        let analysis = StyleInvalidationAnalysis::new(&contents);
        if analysis.dirties_all_style() {
            return (update_type, true);
        }
        analysis.invalidate_style(document);
        (update_type, false)
    }

    /// Brings the rules of `stylist` in line with the enabled author sheets
    /// of the collection. Returns how the stylist was updated, and whether
    /// every element of `document` has to be restyled.
    pub fn update_active_style_sheets<E: TElement>(
        &mut self,
        update_flag: UpdateFlag,
        stylist: &mut Stylist,
        document: Option<&E>,
    ) -> (StyleResolverUpdateType, bool) {
        let mut update_flag = update_flag;
        if std::mem::take(&mut self.needs_full_update) {
            update_flag = UpdateFlag::FullUpdate;
        }
        // Rules changed through the CSSOM are not tracked one by one.
        for sheet in self.author_sheets.iter_mut() {
            if sheet.take_mutated() {
                update_flag = UpdateFlag::FullUpdate;
            }
        }

        let new_sheets = self.collect_active_author_sheets();
        let (update_type, requires_full_style_recalc) =
            self.analyze_style_sheet_change(update_flag, &new_sheets, document);
        debug!(
            "update_active_style_sheets: {:?}, full recalc: {}",
            update_type, requires_full_style_recalc
        );

        let sheets: Vec<&Stylesheet> = new_sheets
            .iter()
            .filter_map(|key| self.author_sheet(*key))
            .collect();
        match update_type {
            StyleResolverUpdateType::Reconstruct => {
                stylist.clear();
                let user_sheets: Vec<&Stylesheet> = self.user_sheets.iter().collect();
                stylist.init_user_style(&user_sheets, &self.store);
                stylist.append_author_style_sheets(0, &sheets, &self.store);
            },
            StyleResolverUpdateType::Reset => {
                stylist.reset_author_style();
                stylist.append_author_style_sheets(0, &sheets, &self.store);
            },
            StyleResolverUpdateType::Additive => {
                stylist.append_author_style_sheets(
                    self.active_author_sheets.len(),
                    &sheets,
                    &self.store,
                );
            },
        }

        self.active_author_sheets = new_sheets;
        (update_type, requires_full_style_recalc)
    }
}
