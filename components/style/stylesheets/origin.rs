/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [CSS cascade origins](https://drafts.csswg.org/css-cascade/#cascading-origins).

use bitflags::bitflags;

/// Each style rule has an origin, which determines where it enters the
/// cascade.
///
/// <https://drafts.csswg.org/css-cascade/#cascading-origins>
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Origin {
    /// <https://drafts.csswg.org/css-cascade/#cascade-origin-user-agent>
    UserAgent,

    /// <https://drafts.csswg.org/css-cascade/#cascade-origin-user>
    User,

    /// <https://drafts.csswg.org/css-cascade/#cascade-origin-author>
    Author,
}

impl Origin {
    /// Returns an origin that goes in order for `index`.
    ///
    /// This is used for iterating across origins.
    fn from_index(index: i8) -> Option<Self> {
        Some(match index {
            0 => Origin::Author,
            1 => Origin::User,
            2 => Origin::UserAgent,
            _ => return None,
        })
    }
}

bitflags! {
    /// A set of origins. This is equivalent to Gecko's OriginFlags.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct OriginSet: u8 {
        /// <https://drafts.csswg.org/css-cascade/#cascade-origin-user-agent>
        const ORIGIN_USER_AGENT = 1 << 0;
        /// <https://drafts.csswg.org/css-cascade/#cascade-origin-user>
        const ORIGIN_USER = 1 << 1;
        /// <https://drafts.csswg.org/css-cascade/#cascade-origin-author>
        const ORIGIN_AUTHOR = 1 << 2;
    }
}

impl OriginSet {
    /// Returns an iterator over the origins present in this `OriginSet`.
    ///
    /// See the `OriginSetIterator` type for information about the order
    /// origins are iterated.
    pub fn iter_origins(&self) -> OriginSetIterator {
        OriginSetIterator {
            set: *self,
            cur: 0,
        }
    }
}

impl From<Origin> for OriginSet {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::UserAgent => OriginSet::ORIGIN_USER_AGENT,
            Origin::User => OriginSet::ORIGIN_USER,
            Origin::Author => OriginSet::ORIGIN_AUTHOR,
        }
    }
}

/// Iterates over the origins present in an `OriginSet`, in order from
/// highest priority (author) to lower (user agent).
#[derive(Clone)]
pub struct OriginSetIterator {
    set: OriginSet,
    cur: i8,
}

impl Iterator for OriginSetIterator {
    type Item = Origin;

    fn next(&mut self) -> Option<Origin> {
        loop {
            let origin = Origin::from_index(self.cur)?;

            self.cur += 1;

            if self.set.contains(origin.into()) {
                return Some(origin);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_from_author_to_user_agent() {
        let origins: Vec<_> = OriginSet::all().iter_origins().collect();
        assert_eq!(origins, vec![Origin::Author, Origin::User, Origin::UserAgent]);
        let origins: Vec<_> = OriginSet::ORIGIN_USER_AGENT.iter_origins().collect();
        assert_eq!(origins, vec![Origin::UserAgent]);
    }
}
