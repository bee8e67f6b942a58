// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `TreeSink` contract and its concrete [`ArenaDom`] implementation.
//!
//! html5ever's tree builder is generic over `TreeSink<Handle = H>`, and
//! `markup5ever_rcdom::RcDom` is the one concrete sink shipped in-tree
//! (`Rc<Node>` handles, `RefCell`-mutated). Our tree builder is generic over
//! the same kind of trait, narrowed to this workspace's arena [`NodeId`]
//! handle; `ArenaDom` plays `RcDom`'s role, wrapping a [`Dom`] plus the
//! bookkeeping (`<template>` contents, "already started" scripts) the sink
//! owns but the arena's [`Node`] variants have no slot for.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::dom::node::{Dom, DocumentKind, NodeId, NodeType, QuirksMode};
use crate::qualname::{Attribute, QualName};
use crate::report::{Context, Reporter};
use crate::source::Position;

/// Either a ready-made node or raw character data to be appended, coalescing
/// with a preceding text node if one is already in that position — mirrors
/// `markup5ever::interface::tree_builder::NodeOrText`.
pub enum NodeOrText {
    Node(NodeId),
    Text(String),
}

#[derive(Copy, Clone, Default, Debug)]
pub struct ElementFlags {
    pub template: bool,
    pub mathml_annotation_xml_integration_point: bool,
}

/// The interface the HTML5 tree builder (spec §4.7) drives to mutate a DOM.
/// Parse errors observed while driving a sink are not surfaced through these
/// methods — the tree builder logs them to its [`Reporter`] directly — so
/// every method here is infallible from the builder's point of view, exactly
/// as `html5ever::interface::TreeSink` never returns `Result`.
pub trait TreeSink {
    fn get_document(&mut self) -> NodeId;
    fn get_template_contents(&mut self, target: NodeId) -> NodeId;
    fn set_quirks_mode(&mut self, mode: QuirksMode);
    fn same_node(&self, x: NodeId, y: NodeId) -> bool;
    fn elem_name(&self, target: NodeId) -> QualName;
    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags) -> NodeId;
    fn create_comment(&mut self, text: String) -> NodeId;
    fn append(&mut self, parent: NodeId, child: NodeOrText);
    fn append_before_sibling(&mut self, sibling: NodeId, new_node: NodeOrText);
    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String);
    fn add_attrs_if_missing(&mut self, target: NodeId, attrs: Vec<Attribute>);
    fn remove_from_parent(&mut self, target: NodeId);
    fn reparent_children(&mut self, node: NodeId, new_parent: NodeId);
    fn mark_script_already_started(&mut self, node: NodeId);
    fn has_parent_node(&self, node: NodeId) -> bool;

    /// Foster-parenting dispatch (spec §4.7): insert `child` as a sibling of
    /// `element` if `element` has a parent (the common foster-parenting
    /// case — `element` is the table, and it does have a parent once it's
    /// been inserted), otherwise fall back to appending under
    /// `prev_element`. Default impl matches html5ever's.
    fn append_based_on_parent_node(
        &mut self,
        element: NodeId,
        prev_element: NodeId,
        child: NodeOrText,
    ) {
        if self.has_parent_node(element) {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }
}

/// The concrete [`TreeSink`] used by this workspace's HTML5 parser, backed
/// by [`Dom`]'s arena. Borrows its [`Reporter`] rather than owning one, so
/// the tokenizer driving it and the tree builder it belongs to can log to
/// the same sink (mirrors how `html5ever`'s `Parser` threads one `Sink`
/// through both stages).
pub struct ArenaDom<'a> {
    pub dom: Dom,
    path: PathBuf,
    reporter: &'a Reporter,
    template_contents: HashMap<NodeId, NodeId>,
    scripts_started: HashSet<NodeId>,
}

impl<'a> ArenaDom<'a> {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind, reporter: &'a Reporter) -> ArenaDom<'a> {
        let path = path.into();
        ArenaDom {
            dom: Dom::new(path.clone(), kind),
            path,
            reporter,
            template_contents: HashMap::new(),
            scripts_started: HashSet::new(),
        }
    }

    pub fn parse_error(&self, position: Position, code: u32, detail: impl Into<String>) {
        self.reporter.log(
            &self.path,
            Context::Html5TreeBuilder,
            code,
            position,
            Some(detail.into()),
        );
    }

    fn append_common(&mut self, parent: NodeId, child: NodeOrText) {
        match child {
            NodeOrText::Node(n) => {
                let _ = self.dom.append_child(parent, n);
            }
            NodeOrText::Text(text) => {
                if let Some(last) = self.dom.node(parent).last_child {
                    if self.dom.node_type(last) == NodeType::Text {
                        let existing = self.dom.text_content(last);
                        self.dom.set_text_data(last, existing + &text);
                        return;
                    }
                }
                let node = self.dom.create_text_node(text);
                let _ = self.dom.append_child(parent, node);
            }
        }
    }
}

impl<'a> TreeSink for ArenaDom<'a> {
    fn get_document(&mut self) -> NodeId {
        self.dom.document()
    }

    fn get_template_contents(&mut self, target: NodeId) -> NodeId {
        *self
            .template_contents
            .entry(target)
            .or_insert_with(|| self.dom.create_document_fragment())
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.dom.set_quirks_mode(mode);
    }

    fn same_node(&self, x: NodeId, y: NodeId) -> bool {
        self.dom.is_same_node(x, y)
    }

    fn elem_name(&self, target: NodeId) -> QualName {
        self.dom.element_name(target).clone()
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
        let el = self
            .dom
            .create_element_ns(name.ns, &name.qualified())
            .unwrap_or_else(|_| self.dom.create_element(name.local.to_string()));
        for attr in attrs {
            if let Ok(a) = self.dom.create_attribute_ns(attr.name.ns, &attr.name.qualified()) {
                self.dom.set_attribute_value(a, attr.value);
                self.dom.append_attribute_unless_present(el, a);
            }
        }
        el
    }

    fn create_comment(&mut self, text: String) -> NodeId {
        self.dom.create_comment(text)
    }

    fn append(&mut self, parent: NodeId, child: NodeOrText) {
        self.append_common(parent, child);
    }

    fn append_before_sibling(&mut self, sibling: NodeId, new_node: NodeOrText) {
        let Some(parent) = self.dom.node(sibling).parent else {
            return;
        };
        match new_node {
            NodeOrText::Node(n) => {
                let _ = self.dom.insert_before(parent, n, Some(sibling));
            }
            NodeOrText::Text(text) => {
                if let Some(prev) = self.dom.node(sibling).prev {
                    if self.dom.node_type(prev) == NodeType::Text {
                        let existing = self.dom.text_content(prev);
                        self.dom.set_text_data(prev, existing + &text);
                        return;
                    }
                }
                let node = self.dom.create_text_node(text);
                let _ = self.dom.insert_before(parent, node, Some(sibling));
            }
        }
    }

    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String) {
        let doctype = self.dom.set_doctype(name, public_id, system_id);
        let document = self.dom.document();
        let _ = self.dom.append_child(document, doctype);
    }

    fn add_attrs_if_missing(&mut self, target: NodeId, attrs: Vec<Attribute>) {
        for attr in attrs {
            if let Ok(a) = self.dom.create_attribute_ns(attr.name.ns, &attr.name.qualified()) {
                self.dom.set_attribute_value(a, attr.value);
                self.dom.append_attribute_unless_present(target, a);
            }
        }
    }

    fn remove_from_parent(&mut self, target: NodeId) {
        if let Some(parent) = self.dom.node(target).parent {
            let _ = self.dom.remove_child(parent, target);
        }
    }

    fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        for child in self.dom.children(node) {
            let _ = self.dom.remove_child(node, child);
            let _ = self.dom.append_child(new_parent, child);
        }
    }

    fn mark_script_already_started(&mut self, node: NodeId) {
        self.scripts_started.insert(node);
    }

    fn has_parent_node(&self, node: NodeId) -> bool {
        self.dom.node(node).parent.is_some()
    }
}
