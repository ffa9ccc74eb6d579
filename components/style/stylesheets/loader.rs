/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The stylesheet loader is the abstraction used to trigger network requests
//! for `@import` rules.

use crate::media_queries::MediaList;
use url::Url;

/// What a loader can tell about an import right when it is requested.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadResult {
    /// The load is in flight. The sheet arrives later through
    /// `StylesheetContents::set_import_sheet`.
    Pending,
    /// The text of the imported sheet, available right away.
    Text(String),
    /// The load failed or was canceled.
    Failed,
}

/// The stylesheet loader is the abstraction used to trigger network requests
/// for `@import` rules.
pub trait StylesheetLoader {
    /// Request a stylesheet after parsing a given `@import` rule.
    fn request_stylesheet(&self, url: &Url, media: &MediaList) -> LoadResult;
}
