/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@import`][import] at-rule.
//!
//! [import]: https://drafts.csswg.org/css-cascade-3/#at-import

use crate::media_queries::MediaList;
use crate::stylesheets::StylesheetContents;
use cssparser::{serialize_string, SourceLocation, ToCss};
use servo_arc::Arc;
use std::fmt::{self, Write};
use url::Url;

/// Where the load of an imported sheet stands.
#[derive(Clone, Debug)]
pub enum ImportState {
    /// Requested, not there yet.
    Pending,
    /// The imported sheet.
    Loaded(Arc<StylesheetContents>),
    /// The load failed, was canceled, or would have imported one of the
    /// sheets importing this one.
    Failed,
}

/// The [`@import`][import] at-rule.
///
/// [import]: https://drafts.csswg.org/css-cascade-3/#at-import
#[derive(Clone, Debug)]
pub struct ImportRule {
    /// The URL as written in the rule.
    pub href: String,

    /// The resolved URL, if `href` resolved at all.
    pub url: Option<Url>,

    /// Only the media this list matches get the rules of the imported sheet.
    pub media: MediaList,

    pub state: ImportState,

    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ImportRule {
    /// The imported sheet, once it loaded.
    pub fn stylesheet(&self) -> Option<&Arc<StylesheetContents>> {
        match self.state {
            ImportState::Loaded(ref sheet) => Some(sheet),
            _ => None,
        }
    }

    /// Whether this import, or an import of the imported sheet, is still
    /// loading.
    pub fn is_loading(&self) -> bool {
        match self.state {
            ImportState::Pending => true,
            ImportState::Loaded(ref sheet) => sheet.is_loading(),
            ImportState::Failed => false,
        }
    }

    pub fn has_failed_or_canceled_subresources(&self) -> bool {
        match self.state {
            ImportState::Pending => false,
            ImportState::Loaded(ref sheet) => sheet.has_failed_or_canceled_subresources(),
            ImportState::Failed => true,
        }
    }

    pub fn estimated_size_in_bytes(&self) -> usize {
        std::mem::size_of::<ImportRule>() +
            self.stylesheet().map_or(0, |sheet| sheet.estimated_size_in_bytes())
    }
}

impl ToCss for ImportRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        dest.write_str("@import url(")?;
        serialize_string(&self.href, dest)?;
        dest.write_char(')')?;

        if !self.media.is_empty() {
            dest.write_char(' ')?;
            self.media.to_css(dest)?;
        }

        dest.write_char(';')
    }
}
