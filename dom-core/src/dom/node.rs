// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The DOM node model (spec §4.3): node variants, parent/sibling linkage,
//! and the invariant-preserving mutation API.
//!
//! Children are represented as an intrusive doubly linked list
//! (`first_child`/`last_child` on the parent, `prev`/`next` on each child)
//! rather than html5ever's `Vec<Handle>` per parent (`markup5ever::rcdom`):
//! spec invariant I2 names `prev`/`next` pointers directly, and an
//! arena-indexed linked list gives O(1) `insert_before`/`remove_child`
//! without shifting a vector, at the cost of O(n) `length()`. Every
//! operation still goes through [`Dom`], so the representation is an
//! internal choice, not part of the public shape.

use std::path::PathBuf;

use crate::dom::arena::Arena;
use crate::dom::error::{DomError, DomResult};
use crate::dom::named_node_map::NamedNodeMap;
use crate::namespace::{LocalName, Prefix};
use crate::namespace::NsId;
use crate::qualname::QualName;

pub type NodeId = crate::dom::arena::NodeId<Node>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NodeType {
    Attribute,
    CdataSection,
    Comment,
    Document,
    DocumentFragment,
    DocumentType,
    Element,
    Text,
    Undefined,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum QuirksMode {
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DocumentKind {
    Html,
    Xml,
}

pub struct DocumentData {
    pub character_set: String,
    pub content_type: String,
    pub url: String,
    pub origin_path: PathBuf,
    pub kind: DocumentKind,
    pub quirks_mode: QuirksMode,
    pub doctype_child: Option<NodeId>,
    pub root_element_child: Option<NodeId>,
}

pub struct ElementData {
    pub name: QualName,
    pub attributes: NamedNodeMap,
}

pub struct AttributeData {
    pub name: QualName,
    pub value: Option<String>,
    pub owner_element: Option<NodeId>,
}

pub enum NodeData {
    Document(DocumentData),
    DocumentType { name: String, public_id: String, system_id: String },
    Element(ElementData),
    Attribute(AttributeData),
    Text(String),
    CdataSection(String),
    Comment(String),
    DocumentFragment,
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Document(_) => NodeType::Document,
            NodeData::DocumentType { .. } => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Attribute(_) => NodeType::Attribute,
            NodeData::Text(_) => NodeType::Text,
            NodeData::CdataSection(_) => NodeType::CdataSection,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::DocumentFragment => NodeType::DocumentFragment,
        }
    }
}

/// A DOM node. Always lives inside a [`Dom`]'s arena; referred to elsewhere
/// by [`NodeId`].
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub owner_document: Option<NodeId>,
}

impl Node {
    fn leaf(data: NodeData, owner_document: Option<NodeId>) -> Node {
        Node {
            data,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
            owner_document,
        }
    }
}

/// Validate a proposed name against the XML `Name` production (spec §4.3).
pub fn validate_xml_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return Err(DomError::InvalidCharacterError),
    }
    for c in chars {
        if !(c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':')) {
            return Err(DomError::InvalidCharacterError);
        }
    }
    Ok(())
}

/// Namespace sanity checks (spec §4.3): a non-empty prefix requires a
/// non-empty namespace; `xml`/`xmlns` are reserved prefixes bound to fixed
/// namespaces.
pub fn validate_namespace(prefix: Option<&Prefix>, ns: NsId, local: &str) -> DomResult<()> {
    if let Some(p) = prefix {
        if ns == NsId::Unknown {
            return Err(DomError::NamespaceError);
        }
        if &**p == "xml" && ns != NsId::Xml {
            return Err(DomError::NamespaceError);
        }
        if &**p == "xmlns" && ns != NsId::Xmlns {
            return Err(DomError::NamespaceError);
        }
    }
    if local == "xmlns" && ns != NsId::Xmlns {
        return Err(DomError::NamespaceError);
    }
    if ns == NsId::Xmlns {
        let prefix_is_xmlns = prefix.map_or(false, |p| &**p == "xmlns");
        if !prefix_is_xmlns && local != "xmlns" {
            return Err(DomError::NamespaceError);
        }
    }
    Ok(())
}

/// bitmask returned by [`Dom::compare_document_position`].
pub mod doc_position {
    pub const DISCONNECTED: u32 = 0x01;
    pub const PRECEDING: u32 = 0x02;
    pub const FOLLOWING: u32 = 0x04;
    pub const CONTAINS: u32 = 0x08;
    pub const CONTAINED_BY: u32 = 0x10;
    pub const IMPLEMENTATION_SPECIFIC: u32 = 0x20;
}

/// The owner of a node arena: one or more trees (one connected to a
/// `Document` root, any number detached) sharing the same backing store.
pub struct Dom {
    arena: Arena<Node>,
    document: NodeId,
}

impl Dom {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Dom {
        let mut arena = Arena::new();
        let document = arena.insert(Node::leaf(
            NodeData::Document(DocumentData {
                character_set: "UTF-8".to_owned(),
                content_type: match kind {
                    DocumentKind::Html => "text/html".to_owned(),
                    DocumentKind::Xml => "application/xml".to_owned(),
                },
                url: "about:blank".to_owned(),
                origin_path: path.into(),
                kind,
                quirks_mode: QuirksMode::NoQuirks,
                doctype_child: None,
                root_element_child: None,
            }),
            None,
        ));
        Dom { arena, document }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena.get_mut(id)
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).data.node_type()
    }

    pub fn set_quirks_mode(&mut self, mode: QuirksMode) {
        if let NodeData::Document(doc) = &mut self.node_mut(self.document).data {
            doc.quirks_mode = mode;
        }
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        match &self.node(self.document).data {
            NodeData::Document(doc) => doc.quirks_mode,
            _ => QuirksMode::NoQuirks,
        }
    }

    pub fn document_kind(&self) -> DocumentKind {
        match &self.node(self.document).data {
            NodeData::Document(doc) => doc.kind,
            _ => DocumentKind::Html,
        }
    }

    fn is_html_document(&self) -> bool {
        matches!(self.document_kind(), DocumentKind::Html)
    }

    // ---- factories --------------------------------------------------

    pub fn create_element(&mut self, local_name: impl Into<String>) -> NodeId {
        let mut local: String = local_name.into();
        if self.is_html_document() {
            local = local.to_ascii_lowercase();
        }
        let name = QualName::html(LocalName::from(local));
        self.arena.insert(Node::leaf(
            NodeData::Element(ElementData {
                name,
                attributes: NamedNodeMap::new(),
            }),
            Some(self.document),
        ))
    }

    pub fn create_element_ns(
        &mut self,
        ns: NsId,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let (prefix, local) = split_qualified_name(qualified_name)?;
        validate_xml_name(qualified_name)?;
        validate_namespace(prefix.as_ref(), ns, &local)?;
        let name = QualName::new(prefix, ns, LocalName::from(local));
        Ok(self.arena.insert(Node::leaf(
            NodeData::Element(ElementData {
                name,
                attributes: NamedNodeMap::new(),
            }),
            Some(self.document),
        )))
    }

    pub fn create_text_node(&mut self, data: impl Into<String>) -> NodeId {
        self.arena
            .insert(Node::leaf(NodeData::Text(data.into()), Some(self.document)))
    }

    pub fn create_cdata_section(&mut self, data: impl Into<String>) -> DomResult<NodeId> {
        if self.is_html_document() {
            // createCDATASection on an HTML document throws NotSupportedError in the DOM
            // spec; our closed DomError set has no such variant, so InvalidStateError
            // ("operation not valid given the document's state") is the closest match.
            return Err(DomError::InvalidStateError);
        }
        Ok(self
            .arena
            .insert(Node::leaf(NodeData::CdataSection(data.into()), Some(self.document))))
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.arena
            .insert(Node::leaf(NodeData::Comment(data.into()), Some(self.document)))
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.arena
            .insert(Node::leaf(NodeData::DocumentFragment, Some(self.document)))
    }

    pub fn create_attribute(&mut self, local_name: &str) -> DomResult<NodeId> {
        validate_xml_name(local_name)?;
        Ok(self.arena.insert(Node::leaf(
            NodeData::Attribute(AttributeData {
                name: QualName::html(LocalName::from(local_name)),
                value: None,
                owner_element: None,
            }),
            Some(self.document),
        )))
    }

    pub fn create_attribute_ns(&mut self, ns: NsId, qualified_name: &str) -> DomResult<NodeId> {
        let (prefix, local) = split_qualified_name(qualified_name)?;
        validate_xml_name(qualified_name)?;
        validate_namespace(prefix.as_ref(), ns, &local)?;
        let name = QualName::new(prefix, ns, LocalName::from(local));
        Ok(self.arena.insert(Node::leaf(
            NodeData::Attribute(AttributeData {
                name,
                value: None,
                owner_element: None,
            }),
            Some(self.document),
        )))
    }

    pub fn set_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.arena.insert(Node::leaf(
            NodeData::DocumentType { name, public_id, system_id },
            Some(self.document),
        ))
    }

    // ---- mutation -----------------------------------------------------

    fn is_ancestor(&self, maybe_ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == maybe_ancestor {
                return true;
            }
            cur = self.node(c).parent;
        }
        false
    }

    fn can_have_children(&self, parent: NodeId) -> bool {
        matches!(
            self.node(parent).data.node_type(),
            NodeType::Document | NodeType::DocumentFragment | NodeType::Element
        )
    }

    /// Insert `new` as a child of `parent`, positioned immediately before
    /// `before` (or at the end if `before` is `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new: NodeId,
        before: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if new == parent || self.is_ancestor(new, parent) || !self.can_have_children(parent) {
            return Err(DomError::HierarchyRequestError);
        }
        if let Some(before) = before {
            if self.node(before).parent != Some(parent) {
                return Err(DomError::NotFoundError);
            }
        }
        if self.node(parent).data.node_type() == NodeType::Document {
            if matches!(
                self.node(new).data.node_type(),
                NodeType::Text | NodeType::Attribute
            ) {
                return Err(DomError::HierarchyRequestError);
            }
            if self.node(new).data.node_type() == NodeType::Element
                && self.document_element().is_some()
            {
                return Err(DomError::HierarchyRequestError);
            }
            if self.node(new).data.node_type() == NodeType::DocumentType
                && self.doctype().is_some()
            {
                return Err(DomError::HierarchyRequestError);
            }
        }

        self.detach(new);

        let prev = match before {
            Some(b) => self.node(b).prev,
            None => self.node(parent).last_child,
        };

        self.node_mut(new).parent = Some(parent);
        self.node_mut(new).prev = prev;
        self.node_mut(new).next = before;

        match prev {
            Some(p) => self.node_mut(p).next = Some(new),
            None => self.node_mut(parent).first_child = Some(new),
        }
        match before {
            Some(b) => self.node_mut(b).prev = Some(new),
            None => self.node_mut(parent).last_child = Some(new),
        }

        self.adopt_into(parent, new);
        self.update_document_refs(parent);
        Ok(new)
    }

    pub fn append_child(&mut self, parent: NodeId, new: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, new, None)
    }

    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> DomResult<NodeId> {
        if self.node(old).parent != Some(parent) {
            return Err(DomError::NotFoundError);
        }
        let next = self.node(old).next;
        self.remove_child(parent, old)?;
        let result = self.insert_before(parent, new, next);
        if result.is_err() {
            // best-effort: put `old` back where it was
            let _ = self.insert_before(parent, old, next);
        }
        result.map(|_| old)
    }

    pub fn remove_child(&mut self, parent: NodeId, old: NodeId) -> DomResult<NodeId> {
        if self.node(old).parent != Some(parent) {
            return Err(DomError::NotFoundError);
        }
        self.detach(old);
        self.update_document_refs(parent);
        Ok(old)
    }

    /// Unlink `node` from its current parent/siblings, if any, preserving
    /// invariant I2 on the remaining siblings.
    fn detach(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(node);
            (n.parent, n.prev, n.next)
        };
        let Some(parent) = parent else { return };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let n = self.node_mut(node);
        n.parent = None;
        n.prev = None;
        n.next = None;
    }

    fn adopt_into(&mut self, new_parent: NodeId, node: NodeId) {
        let owner = self.node(new_parent).owner_document;
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            self.node_mut(n).owner_document = owner;
            let mut child = self.node(n).first_child;
            while let Some(c) = child {
                stack.push(c);
                child = self.node(c).next;
            }
        }
    }

    fn update_document_refs(&mut self, parent: NodeId) {
        if self.node(parent).data.node_type() != NodeType::Document {
            return;
        }
        let mut doctype_child = None;
        let mut root_element_child = None;
        let mut cur = self.node(parent).first_child;
        while let Some(c) = cur {
            match self.node(c).data.node_type() {
                NodeType::DocumentType => doctype_child = Some(c),
                NodeType::Element => root_element_child = Some(c),
                _ => {}
            }
            cur = self.node(c).next;
        }
        if let NodeData::Document(doc) = &mut self.node_mut(parent).data {
            doc.doctype_child = doctype_child;
            doc.root_element_child = root_element_child;
        }
    }

    pub fn doctype(&self) -> Option<NodeId> {
        match &self.node(self.document).data {
            NodeData::Document(doc) => doc.doctype_child,
            _ => None,
        }
    }

    pub fn document_element(&self) -> Option<NodeId> {
        match &self.node(self.document).data {
            NodeData::Document(doc) => doc.root_element_child,
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).first_child;
        while let Some(c) = cur {
            out.push(c);
            cur = self.node(c).next;
        }
        out
    }

    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let data = match &self.node(id).data {
            NodeData::Document(doc) => NodeData::Document(DocumentData {
                character_set: doc.character_set.clone(),
                content_type: doc.content_type.clone(),
                url: doc.url.clone(),
                origin_path: doc.origin_path.clone(),
                kind: doc.kind,
                quirks_mode: doc.quirks_mode,
                doctype_child: None,
                root_element_child: None,
            }),
            NodeData::DocumentType { name, public_id, system_id } => NodeData::DocumentType {
                name: name.clone(),
                public_id: public_id.clone(),
                system_id: system_id.clone(),
            },
            NodeData::Element(e) => NodeData::Element(ElementData {
                name: e.name.clone(),
                attributes: e.attributes.clone(),
            }),
            NodeData::Attribute(a) => NodeData::Attribute(AttributeData {
                name: a.name.clone(),
                value: a.value.clone(),
                owner_element: None,
            }),
            NodeData::Text(s) => NodeData::Text(s.clone()),
            NodeData::CdataSection(s) => NodeData::CdataSection(s.clone()),
            NodeData::Comment(s) => NodeData::Comment(s.clone()),
            NodeData::DocumentFragment => NodeData::DocumentFragment,
        };
        let owner = self.node(id).owner_document;
        let clone = self.arena.insert(Node::leaf(data, owner));

        if deep {
            let mut cur = self.node(id).first_child;
            while let Some(c) = cur {
                let child_clone = self.clone_node(c, true);
                self.insert_before(clone, child_clone, None)
                    .expect("cloning into a fresh detached node cannot fail");
                cur = self.node(c).next;
            }
        }
        clone
    }

    pub fn is_same_node(&self, a: NodeId, b: NodeId) -> bool {
        a == b
    }

    pub fn is_equal_node(&self, a: NodeId, b: NodeId) -> bool {
        if self.node(a).data.node_type() != self.node(b).data.node_type() {
            return false;
        }
        let data_eq = match (&self.node(a).data, &self.node(b).data) {
            (NodeData::Document(x), NodeData::Document(y)) => {
                x.kind == y.kind
            }
            (
                NodeData::DocumentType { name: n1, public_id: p1, system_id: s1 },
                NodeData::DocumentType { name: n2, public_id: p2, system_id: s2 },
            ) => n1 == n2 && p1 == p2 && s1 == s2,
            (NodeData::Element(x), NodeData::Element(y)) => {
                x.name == y.name && x.attributes.is_equal(self, &y.attributes)
            }
            (NodeData::Attribute(x), NodeData::Attribute(y)) => {
                x.name == y.name && x.value == y.value
            }
            (NodeData::Text(x), NodeData::Text(y)) => x == y,
            (NodeData::CdataSection(x), NodeData::CdataSection(y)) => x == y,
            (NodeData::Comment(x), NodeData::Comment(y)) => x == y,
            (NodeData::DocumentFragment, NodeData::DocumentFragment) => true,
            _ => false,
        };
        if !data_eq {
            return false;
        }
        let mut ac = self.node(a).first_child;
        let mut bc = self.node(b).first_child;
        loop {
            match (ac, bc) {
                (None, None) => return true,
                (Some(x), Some(y)) => {
                    if !self.is_equal_node(x, y) {
                        return false;
                    }
                    ac = self.node(x).next;
                    bc = self.node(y).next;
                }
                _ => return false,
            }
        }
    }

    /// Inclusive ancestor check: does `maybe_ancestor` contain `node`,
    /// counting `maybe_ancestor == node` as containment?
    pub fn contains(&self, maybe_ancestor: NodeId, node: NodeId) -> bool {
        self.is_ancestor(maybe_ancestor, node)
    }

    fn preorder_position(&self, id: NodeId) -> Vec<usize> {
        // Path of child-indices from the root to `id`, used to compare
        // document order between two nodes that may not share a direct
        // ancestor/descendant relationship.
        let mut path = Vec::new();
        let mut cur = id;
        loop {
            let Some(parent) = self.node(cur).parent else {
                path.push(0);
                break;
            };
            let mut idx = 0;
            let mut sib = self.node(parent).first_child;
            while let Some(s) = sib {
                if s == cur {
                    break;
                }
                idx += 1;
                sib = self.node(s).next;
            }
            path.push(idx);
            cur = parent;
        }
        path.reverse();
        path
    }

    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> u32 {
        use doc_position::*;
        if reference == other {
            return 0;
        }
        if self.contains(reference, other) {
            return CONTAINED_BY | FOLLOWING;
        }
        if self.contains(other, reference) {
            return CONTAINS | PRECEDING;
        }
        let root_a = self.root_of(reference);
        let root_b = self.root_of(other);
        if root_a != root_b {
            return DISCONNECTED | IMPLEMENTATION_SPECIFIC | PRECEDING;
        }
        let pa = self.preorder_position(reference);
        let pb = self.preorder_position(other);
        if pa < pb {
            FOLLOWING
        } else {
            PRECEDING
        }
    }

    fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.node(cur).parent {
            cur = p;
        }
        cur
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match &self.node(id).data {
            NodeData::Attribute(a) => a.value.clone().unwrap_or_default(),
            NodeData::DocumentType { .. } | NodeData::Document(_) => String::new(),
            NodeData::Text(s) | NodeData::CdataSection(s) | NodeData::Comment(s) => s.clone(),
            _ => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut cur = self.node(id).first_child;
        while let Some(c) = cur {
            match &self.node(c).data {
                NodeData::Text(s) | NodeData::CdataSection(s) => out.push_str(s),
                _ => self.collect_text(c, out),
            }
            cur = self.node(c).next;
        }
    }

    /// Overwrite a Text/Comment/CDATASection node's character data in place.
    pub fn set_text_data(&mut self, id: NodeId, data: impl Into<String>) {
        match &mut self.node_mut(id).data {
            NodeData::Text(s) | NodeData::CdataSection(s) | NodeData::Comment(s) => {
                *s = data.into();
            }
            _ => panic!("not a character-data node"),
        }
    }

    pub fn length(&self, id: NodeId) -> usize {
        match &self.node(id).data {
            NodeData::Text(s) | NodeData::CdataSection(s) | NodeData::Comment(s) => {
                s.chars().count()
            }
            NodeData::Attribute(_) | NodeData::DocumentType { .. } => 0,
            _ => self.children(id).len(),
        }
    }

    /// Merge contiguous runs of same-kind exclusive Text/Comment siblings
    /// into one node each, dropping empty ones, recursing into children.
    pub fn normalize(&mut self, id: NodeId) {
        let mut cur = self.node(id).first_child;
        while let Some(c) = cur {
            let next = self.node(c).next;
            let is_text = matches!(self.node(c).data, NodeData::Text(_));
            if is_text {
                if let NodeData::Text(s) = &self.node(c).data {
                    if s.is_empty() {
                        let _ = self.remove_child(id, c);
                        cur = next;
                        continue;
                    }
                }
                // merge forward-adjacent text siblings into `c`
                let mut n = next;
                while let Some(nn) = n {
                    if matches!(self.node(nn).data, NodeData::Text(_)) {
                        let appended = match &self.node(nn).data {
                            NodeData::Text(s) => s.clone(),
                            _ => unreachable!(),
                        };
                        if let NodeData::Text(s) = &mut self.node_mut(c).data {
                            s.push_str(&appended);
                        }
                        let after = self.node(nn).next;
                        let _ = self.remove_child(id, nn);
                        n = after;
                    } else {
                        break;
                    }
                }
            } else {
                self.normalize(c);
            }
            cur = self.node(c).next;
        }
    }

    // ---- element-specific ---------------------------------------------

    pub fn element_name(&self, id: NodeId) -> &QualName {
        match &self.node(id).data {
            NodeData::Element(e) => &e.name,
            _ => panic!("not an element"),
        }
    }

    /// Uppercased qualified name when the owner document is HTML and the
    /// element is in the HTML namespace; the exact qualified name otherwise.
    pub fn tag_name(&self, id: NodeId) -> String {
        let name = self.element_name(id);
        if self.is_html_document() && name.ns == NsId::Html {
            name.qualified().to_ascii_uppercase()
        } else {
            name.qualified()
        }
    }

    pub fn attributes(&self, id: NodeId) -> &NamedNodeMap {
        match &self.node(id).data {
            NodeData::Element(e) => &e.attributes,
            _ => panic!("not an element"),
        }
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> &mut NamedNodeMap {
        match &mut self.node_mut(id).data {
            NodeData::Element(e) => &mut e.attributes,
            _ => panic!("not an element"),
        }
    }

    pub fn attribute_name(&self, id: NodeId) -> &QualName {
        match &self.node(id).data {
            NodeData::Attribute(a) => &a.name,
            _ => panic!("not an attribute"),
        }
    }

    pub fn attribute_value(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Attribute(a) => a.value.as_deref(),
            _ => panic!("not an attribute"),
        }
    }

    pub fn set_attribute_value(&mut self, id: NodeId, value: impl Into<String>) {
        match &mut self.node_mut(id).data {
            NodeData::Attribute(a) => a.value = Some(value.into()),
            _ => panic!("not an attribute"),
        }
    }

    pub(crate) fn set_attribute_owner(&mut self, attr: NodeId, owner: NodeId) {
        if let NodeData::Attribute(a) = &mut self.node_mut(attr).data {
            a.owner_element = Some(owner);
        }
    }

    pub(crate) fn clear_attribute_owner(&mut self, attr: NodeId) {
        if let NodeData::Attribute(a) = &mut self.node_mut(attr).data {
            a.owner_element = None;
        }
    }

    /// Insert an already-created, unattached attribute node into `element`'s
    /// map (spec §4.4): if the qualified name is already present, the
    /// existing attribute keeps its slot and the new one is discarded (this
    /// is also how the HTML5 tree builder drops duplicate attributes within
    /// one start tag — the first occurrence wins, per the spec's "tag open"
    /// attribute algorithm).
    pub fn append_attribute_unless_present(&mut self, element: NodeId, attr: NodeId) {
        let html_fold = self.is_html_document();
        let qualified = self.attribute_name(attr).qualified();
        let present = self
            .attributes(element)
            .get_named_item(self, &qualified, html_fold)
            .is_some();
        if present {
            return;
        }
        self.set_attribute_owner(attr, element);
        self.attributes_mut(element).push(attr);
    }

    // ---- namespace resolution -------------------------------------------

    /// `https://dom.spec.whatwg.org/#locate-a-namespace-prefix`, simplified
    /// to the HTML-relevant case: walk ancestors looking at `xmlns`/
    /// `xmlns:*` attributes.
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<NsId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let NodeData::Element(e) = &self.node(n).data {
                if prefix.is_none() && e.name.prefix.is_none() && e.name.ns != NsId::Unknown {
                    return Some(e.name.ns);
                }
                if let Some(p) = prefix {
                    if e.name.prefix.as_deref() == Some(p) {
                        return Some(e.name.ns);
                    }
                }
                for attr in e.attributes.iter() {
                    let a = match &self.node(*attr).data {
                        NodeData::Attribute(a) => a,
                        _ => continue,
                    };
                    let matches = match prefix {
                        None => a.name.prefix.is_none() && &*a.name.local == "xmlns",
                        Some(p) => {
                            a.name.prefix.as_deref() == Some("xmlns") && &*a.name.local == p
                        }
                    };
                    if matches {
                        if let Some(v) = &a.value {
                            if !v.is_empty() {
                                return Some(NsId::from_uri(v));
                            }
                        }
                    }
                }
            }
            cur = self.node(n).parent;
        }
        None
    }

    pub fn lookup_prefix(&self, id: NodeId, ns: NsId) -> Option<Prefix> {
        if ns == NsId::Unknown {
            return None;
        }
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let NodeData::Element(e) = &self.node(n).data {
                if e.name.ns == ns {
                    if let Some(p) = &e.name.prefix {
                        if self.lookup_namespace_uri(n, Some(p)) == Some(ns) {
                            return Some(p.clone());
                        }
                    }
                }
            }
            cur = self.node(n).parent;
        }
        None
    }

    // ---- pre-order search -----------------------------------------------

    pub fn get_element_by_id(&self, id: NodeId, wanted: &str) -> Option<NodeId> {
        let mut stack = self.children(id);
        stack.reverse();
        while let Some(n) = stack.pop() {
            if let NodeData::Element(e) = &self.node(n).data {
                if let Some(attr) = e.attributes.get_named_item(self, "id", true) {
                    if let NodeData::Attribute(a) = &self.node(attr).data {
                        if a.value.as_deref() == Some(wanted) {
                            return Some(n);
                        }
                    }
                }
            }
            let mut children = self.children(n);
            children.reverse();
            stack.extend(children);
        }
        None
    }

    pub fn get_elements_by_tag_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_by_tag_name(root, name, &mut out);
        out
    }

    fn collect_by_tag_name(&self, id: NodeId, name: &str, out: &mut Vec<NodeId>) {
        for c in self.children(id) {
            if let NodeData::Element(e) = &self.node(c).data {
                if name == "*" || e.name.qualified().eq_ignore_ascii_case(name) {
                    out.push(c);
                }
            }
            self.collect_by_tag_name(c, name, out);
        }
    }

    pub fn get_elements_by_tag_name_ns(&self, root: NodeId, ns: NsId, local: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_by_tag_name_ns(root, ns, local, &mut out);
        out
    }

    fn collect_by_tag_name_ns(&self, id: NodeId, ns: NsId, local: &str, out: &mut Vec<NodeId>) {
        for c in self.children(id) {
            if let NodeData::Element(e) = &self.node(c).data {
                let ns_ok = ns == NsId::Unknown || e.name.ns == ns;
                let local_ok = local == "*" || &*e.name.local == local;
                if ns_ok && local_ok {
                    out.push(c);
                }
            }
            self.collect_by_tag_name_ns(c, ns, local, out);
        }
    }
}

fn split_qualified_name(qualified_name: &str) -> DomResult<(Option<Prefix>, String)> {
    match qualified_name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
            Ok((Some(Prefix::from(prefix)), local.to_owned()))
        }
        Some(_) => Err(DomError::InvalidCharacterError),
        None => Ok((None, qualified_name.to_owned())),
    }
}
