/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The prefixes declared by the `@namespace` rules of a stylesheet.

use crate::{Namespace, Prefix};
use rustc_hash::FxHashMap;
use selectors::attr::NamespaceConstraint;

/// A namespace map for a stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Namespaces {
    pub default: Option<Namespace>,
    pub prefixes: FxHashMap<Prefix, Namespace>,
}

impl Namespaces {
    /// Records an `@namespace` rule. A later rule for the same prefix wins.
    pub fn parser_add_namespace(&mut self, prefix: Option<&Prefix>, url: &Namespace) {
        match prefix {
            Some(prefix) if !prefix.is_empty() => {
                self.prefixes.insert(prefix.clone(), url.clone());
            },
            _ => self.default = Some(url.clone()),
        }
    }

    /// Resolves the prefix of a qualified name.
    ///
    /// No prefix means the default namespace, or any namespace when there is
    /// none. `*` means any namespace. An undeclared prefix resolves to
    /// nothing, which makes the selector invalid.
    pub fn determine_namespace(&self, prefix: Option<&str>) -> Option<NamespaceConstraint> {
        let prefix = match prefix {
            None => {
                return Some(match self.default {
                    Some(ref url) => NamespaceConstraint::Specific {
                        prefix: None,
                        url: url.clone(),
                    },
                    None => NamespaceConstraint::Any,
                });
            },
            Some(prefix) => prefix,
        };
        match prefix {
            "" => Some(NamespaceConstraint::none()),
            "*" => Some(NamespaceConstraint::Any),
            _ => {
                let prefix = Prefix::from(prefix);
                self.prefixes
                    .get(&prefix)
                    .map(|url| NamespaceConstraint::Specific {
                        prefix: Some(prefix.clone()),
                        url: url.clone(),
                    })
            },
        }
    }
}
