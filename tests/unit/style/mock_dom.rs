/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A small arena DOM for driving the style system in tests.

use selectors::Element;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::QuirksMode;
use selectors::parser::NonTSPseudoClass;
use servo_arc::Arc;
use std::cell::Cell;
use std::fmt;
use style::Atom;
use style::XHTML_NAMESPACE;
use style::dom::{OpaqueElement, TElement};
use style::properties::{PropertyDeclarationBlock, parse_style_attribute};
use style::stylesheets::UrlExtraData;
use url::Url;

/// Describes an element to add to a [`Dom`].
#[derive(Default)]
pub struct ElementSpec {
    local_name: String,
    namespace: Option<String>,
    id: Option<Atom>,
    classes: Vec<Atom>,
    attributes: Vec<(Atom, String)>,
    style_attribute: Option<Arc<PropertyDeclarationBlock>>,
    presentational_hints: Option<Arc<PropertyDeclarationBlock>>,
    mutable_inline_style: bool,
    link: Option<bool>,
    focused: bool,
    hovered: bool,
    custom_pseudo_element: Option<Atom>,
}

pub fn el(local_name: &str) -> ElementSpec {
    ElementSpec {
        local_name: local_name.to_owned(),
        ..Default::default()
    }
}

fn declarations(css: &str) -> Arc<PropertyDeclarationBlock> {
    let url_data = UrlExtraData::new(Url::parse("http://example.com/").unwrap());
    Arc::new(parse_style_attribute(
        css,
        &url_data,
        None,
        QuirksMode::NoQuirks,
    ))
}

impl ElementSpec {
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(Atom::from(id));
        self.attributes.push((Atom::from("id"), id.to_owned()));
        self
    }

    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(Atom::from));
        self.attributes.push((Atom::from("class"), classes.to_owned()));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((Atom::from(name), value.to_owned()));
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_owned());
        self
    }

    pub fn style(mut self, css: &str) -> Self {
        self.style_attribute = Some(declarations(css));
        self.attributes.push((Atom::from("style"), css.to_owned()));
        self
    }

    pub fn mutable_style(mut self, css: &str) -> Self {
        self.mutable_inline_style = true;
        self.style(css)
    }

    pub fn hints(mut self, css: &str) -> Self {
        self.presentational_hints = Some(declarations(css));
        self
    }

    pub fn link(mut self, visited: bool) -> Self {
        self.link = Some(visited);
        self
    }

    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    pub fn hovered(mut self) -> Self {
        self.hovered = true;
        self
    }

    pub fn custom_pseudo_element(mut self, name: &str) -> Self {
        self.custom_pseudo_element = Some(Atom::from(name));
        self
    }
}

struct Node {
    local_name: Atom,
    namespace: Atom,
    spec: ElementSpec,
    parent: Option<usize>,
    children: Vec<usize>,
    /// The host of the shadow tree this node is part of.
    shadow_host: Option<usize>,
    needs_style_recalc: Cell<bool>,
}

/// The elements of a document. Every element gets the XHTML namespace
/// unless told otherwise.
#[derive(Default)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, parent: Option<usize>, spec: ElementSpec, shadow_host: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            local_name: Atom::from(&*spec.local_name),
            namespace: Atom::from(spec.namespace.as_deref().unwrap_or(XHTML_NAMESPACE)),
            spec,
            parent,
            children: vec![],
            shadow_host,
            needs_style_recalc: Cell::new(false),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        index
    }

    /// Adds the root element.
    pub fn root(&mut self, spec: ElementSpec) -> usize {
        self.push(None, spec, None)
    }

    /// Appends a child to `parent`.
    pub fn append(&mut self, parent: usize, spec: ElementSpec) -> usize {
        self.push(Some(parent), spec, None)
    }

    /// Adds an element of the user agent shadow tree of `host`. It has no
    /// parent in the light tree.
    pub fn shadow_child(&mut self, host: usize, spec: ElementSpec) -> usize {
        self.push(None, spec, Some(host))
    }

    pub fn element(&self, index: usize) -> MockElement<'_> {
        MockElement { dom: self, index }
    }
}

#[derive(Clone, Copy)]
pub struct MockElement<'a> {
    dom: &'a Dom,
    index: usize,
}

impl<'a> MockElement<'a> {
    fn node(&self) -> &'a Node {
        &self.dom.nodes[self.index]
    }

    fn sibling(&self, offset: isize) -> Option<Self> {
        let parent = self.node().parent?;
        let siblings = &self.dom.nodes[parent].children;
        let position = siblings.iter().position(|&i| i == self.index)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).map(|&index| self.dom.element(index))
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<'a> fmt::Debug for MockElement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.node().local_name)?;
        if let Some(ref id) = self.node().spec.id {
            write!(f, " id={}", id)?;
        }
        write!(f, "> ({})", self.index)
    }
}

impl<'a> Element for MockElement<'a> {
    fn parent_element(&self) -> Option<Self> {
        self.node().parent.map(|index| self.dom.element(index))
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling(-1)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling(1)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        &*self.node().namespace == XHTML_NAMESPACE
    }

    fn local_name(&self) -> &Atom {
        &self.node().local_name
    }

    fn namespace(&self) -> &Atom {
        &self.node().namespace
    }

    fn id(&self) -> Option<&Atom> {
        self.node().spec.id.as_ref()
    }

    fn has_class(&self, name: &Atom, case_sensitivity: CaseSensitivity) -> bool {
        self.node()
            .spec
            .classes
            .iter()
            .any(|class| case_sensitivity.eq_atom(class, name))
    }

    fn each_class<F>(&self, mut callback: F)
    where
        F: FnMut(&Atom),
    {
        for class in &self.node().spec.classes {
            callback(class);
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint,
        local_name: &Atom,
        operation: &AttrSelectorOperation<&str>,
    ) -> bool {
        if let NamespaceConstraint::Specific { ref url, .. } = *ns {
            if !url.is_empty() {
                return false;
            }
        }
        self.node()
            .spec
            .attributes
            .iter()
            .filter(|(name, _)| name == local_name)
            .any(|(_, value)| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(&self, pc: &NonTSPseudoClass) -> bool {
        match *pc {
            NonTSPseudoClass::Focus => self.node().spec.focused,
            NonTSPseudoClass::Hover => self.node().spec.hovered,
            _ => false,
        }
    }

    fn is_link(&self) -> bool {
        self.node().spec.link.is_some()
    }

    fn is_visited_link(&self) -> bool {
        self.node().spec.link == Some(true)
    }

    fn is_empty(&self) -> bool {
        self.node().children.is_empty()
    }

    fn is_root(&self) -> bool {
        self.node().parent.is_none() && self.node().shadow_host.is_none()
    }

    fn custom_pseudo_element(&self) -> Option<&Atom> {
        self.node().spec.custom_pseudo_element.as_ref()
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        self.node().shadow_host.map(|index| self.dom.element(index))
    }
}

impl<'a> TElement for MockElement<'a> {
    fn opaque(&self) -> OpaqueElement {
        OpaqueElement(self.index)
    }

    fn style_attribute(&self) -> Option<Arc<PropertyDeclarationBlock>> {
        self.node().spec.style_attribute.clone()
    }

    fn presentational_hints(&self) -> Option<Arc<PropertyDeclarationBlock>> {
        self.node().spec.presentational_hints.clone()
    }

    fn has_mutable_inline_style(&self) -> bool {
        self.node().spec.mutable_inline_style
    }

    fn is_focused(&self) -> bool {
        self.node().spec.focused
    }

    fn first_child_element(&self) -> Option<Self> {
        self.node()
            .children
            .first()
            .map(|&index| self.dom.element(index))
    }

    fn set_needs_style_recalc(&self) {
        self.node().needs_style_recalc.set(true);
    }

    fn needs_style_recalc(&self) -> bool {
        self.node().needs_style_recalc.get()
    }
}
