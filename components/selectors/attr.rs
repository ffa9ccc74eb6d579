/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Attribute selectors: operators, namespace constraints and value
//! comparison.

use crate::Atom;
use crate::parser::SELECTOR_WHITESPACE;
use cssparser::{ToCss, serialize_identifier, serialize_string};
use std::fmt;

/// An attribute selector such as `[svg|href^="#" i]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrSelector {
    pub namespace: NamespaceConstraint,
    pub local_name: Atom,
    pub local_name_lower: Atom,
    pub operation: AttrSelectorOperation<String>,
    /// Set when the value can never match, e.g. `[foo~=""]` or `[foo^=""]`.
    pub never_matches: bool,
}

impl AttrSelector {
    /// The name to compare against, depending on whether the element is an
    /// HTML element in an HTML document.
    pub fn local_name_for(&self, is_html: bool) -> &Atom {
        if is_html {
            &self.local_name_lower
        } else {
            &self.local_name
        }
    }
}

impl ToCss for AttrSelector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char('[')?;
        match self.namespace {
            NamespaceConstraint::Any => dest.write_str("*|")?,
            NamespaceConstraint::Specific {
                prefix: Some(ref prefix),
                ..
            } => {
                serialize_identifier(prefix, dest)?;
                dest.write_char('|')?;
            },
            NamespaceConstraint::Specific { prefix: None, .. } => {},
        }
        serialize_identifier(&self.local_name, dest)?;
        if let AttrSelectorOperation::WithValue {
            operator,
            case_sensitivity,
            ref value,
        } = self.operation
        {
            operator.to_css(dest)?;
            serialize_string(value, dest)?;
            if case_sensitivity == CaseSensitivity::AsciiCaseInsensitive {
                dest.write_str(" i")?;
            }
        }
        dest.write_char(']')
    }
}

/// Which namespaces an attribute or type selector accepts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NamespaceConstraint {
    /// `*|`
    Any,
    /// A single namespace URL. The empty URL means "no namespace".
    Specific { prefix: Option<Atom>, url: Atom },
}

impl NamespaceConstraint {
    /// The constraint of an unprefixed attribute name.
    pub fn none() -> Self {
        NamespaceConstraint::Specific {
            prefix: None,
            url: Atom::from(""),
        }
    }

    pub fn matches(&self, namespace: &Atom) -> bool {
        match *self {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific { ref url, .. } => url == namespace,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttrSelectorOperation<V> {
    Exists,
    WithValue {
        operator: AttrSelectorOperator,
        case_sensitivity: CaseSensitivity,
        value: V,
    },
}

impl<V: AsRef<str>> AttrSelectorOperation<V> {
    /// Evaluates this operation against the value an element carries for
    /// the attribute.
    pub fn eval_str(&self, element_attr_value: &str) -> bool {
        match *self {
            AttrSelectorOperation::Exists => true,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                ref value,
            } => operator.eval_str(element_attr_value, value.as_ref(), case_sensitivity),
        }
    }

    /// Borrows the expected value.
    pub fn as_str(&self) -> AttrSelectorOperation<&str> {
        match *self {
            AttrSelectorOperation::Exists => AttrSelectorOperation::Exists,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                ref value,
            } => AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                value: value.as_ref(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttrSelectorOperator {
    Equal,
    Includes,
    DashMatch,
    Prefix,
    Substring,
    Suffix,
}

impl ToCss for AttrSelectorOperator {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            AttrSelectorOperator::Equal => "=",
            AttrSelectorOperator::Includes => "~=",
            AttrSelectorOperator::DashMatch => "|=",
            AttrSelectorOperator::Prefix => "^=",
            AttrSelectorOperator::Substring => "*=",
            AttrSelectorOperator::Suffix => "$=",
        })
    }
}

impl AttrSelectorOperator {
    pub fn eval_str(
        self,
        element_attr_value: &str,
        attr_selector_value: &str,
        case_sensitivity: CaseSensitivity,
    ) -> bool {
        let e = element_attr_value.as_bytes();
        let s = attr_selector_value.as_bytes();
        let case = case_sensitivity;
        match self {
            AttrSelectorOperator::Equal => case.eq(e, s),
            AttrSelectorOperator::Prefix => e.len() >= s.len() && case.eq(&e[..s.len()], s),
            AttrSelectorOperator::Suffix => {
                e.len() >= s.len() && case.eq(&e[(e.len() - s.len())..], s)
            },
            AttrSelectorOperator::Substring => {
                case.contains(element_attr_value, attr_selector_value)
            },
            AttrSelectorOperator::Includes => element_attr_value
                .split(SELECTOR_WHITESPACE)
                .any(|part| case.eq(part.as_bytes(), s)),
            AttrSelectorOperator::DashMatch => {
                case.eq(e, s) || (e.get(s.len()) == Some(&b'-') && case.eq(&e[..s.len()], s))
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CaseSensitivity {
    CaseSensitive,
    AsciiCaseInsensitive,
}

impl CaseSensitivity {
    pub fn eq(self, a: &[u8], b: &[u8]) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => a == b,
            CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }

    pub fn eq_atom(self, a: &Atom, b: &Atom) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => a == b,
            CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }

    pub fn contains(self, haystack: &str, needle: &str) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => haystack.contains(needle),
            CaseSensitivity::AsciiCaseInsensitive => {
                if let Some((&n_first_byte, n_rest)) = needle.as_bytes().split_first() {
                    haystack.bytes().enumerate().any(|(i, byte)| {
                        if !byte.eq_ignore_ascii_case(&n_first_byte) {
                            return false;
                        }
                        let after_this_byte = &haystack.as_bytes()[i + 1..];
                        match after_this_byte.get(..n_rest.len()) {
                            None => false,
                            Some(haystack_slice) => haystack_slice.eq_ignore_ascii_case(n_rest),
                        }
                    })
                } else {
                    // Any str contains the empty string.
                    true
                }
            },
        }
    }
}
