// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`NamedNodeMap`]: ordered attribute storage on `Element` (spec §4.4).
//!
//! Mirrors `markup5ever_rcdom`'s choice to keep attributes as a plain `Vec`
//! rather than a `HashMap`: spec §4.4 requires insertion order to be
//! preserved, which a hash map does not give for free. Unlike
//! `rcdom::ElementData` (which stores `Vec<Attribute>` inline with name and
//! value together), attribute *content* lives in the owning [`Dom`]'s arena
//! like every other node, so a `NamedNodeMap` is only the ordered list of
//! [`NodeId`]s naming the live Attribute nodes; name/value comparisons go
//! through the `Dom` that owns both the map and the attribute nodes.

use crate::dom::error::{DomError, DomResult};
use crate::dom::node::{Dom, NodeId};

#[derive(Clone, Default)]
pub struct NamedNodeMap {
    items: Vec<NodeId>,
}

impl NamedNodeMap {
    pub fn new() -> NamedNodeMap {
        NamedNodeMap { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, i: usize) -> Option<NodeId> {
        self.items.get(i).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.items.iter()
    }

    /// Append an attribute node already known not to collide with an
    /// existing qualified name. Used internally by [`Dom`]; prefer
    /// [`Dom::append_attribute_unless_present`] or [`NamedNodeMap::set_node`]
    /// at call sites so the "first/last wins" rule is enforced in one place.
    pub(crate) fn push(&mut self, attr: NodeId) {
        self.items.push(attr);
    }

    fn find(&self, dom: &Dom, name: &str, html_fold: bool) -> Option<usize> {
        self.items.iter().position(|&id| {
            let qualified = dom.attribute_name(id).qualified();
            if html_fold {
                qualified.eq_ignore_ascii_case(name)
            } else {
                qualified == name
            }
        })
    }

    /// Look up by qualified name. `html_fold` selects the spec's
    /// ASCII-case-insensitive comparison used when the owner element belongs
    /// to an HTML document.
    pub fn get_named_item(&self, dom: &Dom, name: &str, html_fold: bool) -> Option<NodeId> {
        self.find(dom, name, html_fold).map(|i| self.items[i])
    }

    /// Set (insert or replace-in-place) an attribute node. If an attribute
    /// with the same qualified name already exists, its value is copied onto
    /// the existing node and `attr` is returned as the now-unused duplicate
    /// (spec §4.4: "single entry per qualified name"); otherwise `attr` is
    /// appended and `None` is returned.
    pub fn set_node(
        &mut self,
        dom: &mut Dom,
        element: NodeId,
        attr: NodeId,
        html_fold: bool,
    ) -> DomResult<Option<NodeId>> {
        let qualified = dom.attribute_name(attr).qualified();
        if let Some(i) = self.find(dom, &qualified, html_fold) {
            let existing = self.items[i];
            if existing == attr {
                return Ok(None);
            }
            let value = dom.attribute_value(attr).map(str::to_owned);
            if let Some(v) = value {
                dom.set_attribute_value(existing, v);
            }
            Ok(Some(attr))
        } else {
            dom.set_attribute_owner(attr, element);
            self.items.push(attr);
            Ok(None)
        }
    }

    pub fn remove_named_item(
        &mut self,
        dom: &mut Dom,
        name: &str,
        html_fold: bool,
    ) -> DomResult<NodeId> {
        let i = self
            .find(dom, name, html_fold)
            .ok_or(DomError::NotFoundError)?;
        self.remove_item(dom, i)
    }

    pub fn remove_item(&mut self, dom: &mut Dom, i: usize) -> DomResult<NodeId> {
        if i >= self.items.len() {
            return Err(DomError::NotFoundError);
        }
        let attr = self.items.remove(i);
        dom.clear_attribute_owner(attr);
        Ok(attr)
    }

    pub fn remove_node(&mut self, dom: &mut Dom, node: NodeId) -> DomResult<NodeId> {
        let i = self
            .items
            .iter()
            .position(|&id| id == node)
            .ok_or(DomError::NotFoundError)?;
        self.remove_item(dom, i)
    }

    /// Structural equality ignoring order sensitivity beyond "same set of
    /// (qualified name, value) pairs" — matches how `is_equal_node` treats
    /// attribute sets in the DOM spec (order is not significant there, only
    /// for serialisation/iteration).
    pub fn is_equal(&self, dom: &Dom, other: &NamedNodeMap) -> bool {
        if self.items.len() != other.items.len() {
            return false;
        }
        self.items.iter().all(|&a| {
            let name = dom.attribute_name(a).qualified();
            let value = dom.attribute_value(a);
            other
                .items
                .iter()
                .any(|&b| dom.attribute_name(b).qualified() == name && dom.attribute_value(b) == value)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::node::DocumentKind;

    #[test]
    fn set_node_replaces_value_in_place() {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let el = dom.create_element("div");
        let a1 = dom.create_attribute("class").unwrap();
        dom.set_attribute_value(a1, "x");
        let mut map = NamedNodeMap::new();
        map.set_node(&mut dom, el, a1, true).unwrap();

        let a2 = dom.create_attribute("class").unwrap();
        dom.set_attribute_value(a2, "y");
        let replaced = map.set_node(&mut dom, el, a2, true).unwrap();
        assert_eq!(replaced, Some(a2));
        assert_eq!(map.len(), 1);
        assert_eq!(dom.attribute_value(a1), Some("y"));
    }

    #[test]
    fn html_fold_is_case_insensitive() {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let el = dom.create_element("div");
        let a1 = dom.create_attribute("id").unwrap();
        let mut map = NamedNodeMap::new();
        map.set_node(&mut dom, el, a1, true).unwrap();
        assert!(map.get_named_item(&dom, "ID", true).is_some());
        assert!(map.get_named_item(&dom, "ID", false).is_none());
    }
}
