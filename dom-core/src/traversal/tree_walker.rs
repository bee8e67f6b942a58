// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`TreeWalker`] (spec §4.5): filtered pre-order traversal with full
//! navigation. Unlike [`super::node_iterator::NodeIterator`], `REJECT`
//! prunes the rejected node's subtree entirely; `SKIP` hides the node
//! itself but still descends into its children.

use crate::dom::node::{Dom, NodeId};
use crate::traversal::filter::{FilterResult, NodeFilter};

pub struct TreeWalker<'a> {
    dom: &'a Dom,
    root: NodeId,
    filter: NodeFilter,
    current: NodeId,
}

fn child_of(dom: &Dom, node: NodeId, first: bool) -> Option<NodeId> {
    if first {
        dom.node(node).first_child
    } else {
        dom.node(node).last_child
    }
}

fn sibling_of(dom: &Dom, node: NodeId, next: bool) -> Option<NodeId> {
    if next {
        dom.node(node).next
    } else {
        dom.node(node).prev
    }
}

impl<'a> TreeWalker<'a> {
    pub fn new(dom: &'a Dom, root: NodeId, filter: NodeFilter) -> TreeWalker<'a> {
        TreeWalker {
            dom,
            root,
            filter,
            current: root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn current_node(&self) -> NodeId {
        self.current
    }

    pub fn set_current_node(&mut self, node: NodeId) {
        self.current = node;
    }

    pub fn parent_node(&mut self) -> Option<NodeId> {
        let mut node = self.current;
        while node != self.root {
            node = self.dom.node(node).parent?;
            if self.filter.accept(self.dom, node) == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
        None
    }

    pub fn first_child(&mut self) -> Option<NodeId> {
        self.traverse_children(true)
    }

    pub fn last_child(&mut self) -> Option<NodeId> {
        self.traverse_children(false)
    }

    pub fn next_sibling(&mut self) -> Option<NodeId> {
        self.traverse_siblings(true)
    }

    pub fn previous_sibling(&mut self) -> Option<NodeId> {
        self.traverse_siblings(false)
    }

    fn traverse_children(&mut self, first: bool) -> Option<NodeId> {
        let mut node = child_of(self.dom, self.current, first)?;
        loop {
            match self.filter.accept(self.dom, node) {
                FilterResult::Accept => {
                    self.current = node;
                    return Some(node);
                }
                FilterResult::Skip => {
                    if let Some(c) = child_of(self.dom, node, first) {
                        node = c;
                        continue;
                    }
                }
                FilterResult::Reject => {}
            }
            loop {
                if let Some(s) = sibling_of(self.dom, node, first) {
                    node = s;
                    break;
                }
                match self.dom.node(node).parent {
                    Some(p) if p != self.current => node = p,
                    _ => return None,
                }
            }
        }
    }

    fn traverse_siblings(&mut self, next: bool) -> Option<NodeId> {
        let mut node = self.current;
        if node == self.root {
            return None;
        }
        loop {
            let mut sibling = sibling_of(self.dom, node, next);
            while sibling.is_none() {
                match self.dom.node(node).parent {
                    Some(p) if p != self.root && p != self.current => {
                        node = p;
                        sibling = sibling_of(self.dom, node, next);
                    }
                    _ => return None,
                }
            }
            node = sibling.unwrap();
            match self.filter.accept(self.dom, node) {
                FilterResult::Accept => {
                    self.current = node;
                    return Some(node);
                }
                FilterResult::Skip => {
                    if let Some(c) = child_of(self.dom, node, next) {
                        node = c;
                    }
                }
                FilterResult::Reject => {}
            }
        }
    }

    pub fn next_node(&mut self) -> Option<NodeId> {
        let mut node = self.current;
        let mut result = FilterResult::Accept;
        loop {
            while result != FilterResult::Reject {
                let Some(child) = self.dom.node(node).first_child else {
                    break;
                };
                node = child;
                result = self.filter.accept(self.dom, node);
                if result == FilterResult::Accept {
                    self.current = node;
                    return Some(node);
                }
            }
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = self.dom.node(node).next {
                    node = sibling;
                    break;
                }
                match self.dom.node(node).parent {
                    Some(p) => node = p,
                    None => return None,
                }
            }
            result = self.filter.accept(self.dom, node);
            if result == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
    }

    pub fn previous_node(&mut self) -> Option<NodeId> {
        let mut node = self.current;
        while node != self.root {
            let mut sibling = self.dom.node(node).prev;
            while let Some(s) = sibling {
                node = s;
                let mut result = self.filter.accept(self.dom, node);
                while result != FilterResult::Reject {
                    let Some(last) = self.dom.node(node).last_child else {
                        break;
                    };
                    node = last;
                    result = self.filter.accept(self.dom, node);
                }
                if result == FilterResult::Accept {
                    self.current = node;
                    return Some(node);
                }
                sibling = self.dom.node(node).prev;
            }
            if node == self.root {
                return None;
            }
            let Some(parent) = self.dom.node(node).parent else {
                return None;
            };
            node = parent;
            if self.filter.accept(self.dom, node) == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::node::DocumentKind;
    use crate::traversal::show;

    fn build() -> (Dom, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let root = dom.document();
        let div = dom.create_element("div");
        let span1 = dom.create_element("span");
        let span2 = dom.create_element("span");
        dom.append_child(root, div).unwrap();
        dom.append_child(div, span1).unwrap();
        dom.append_child(div, span2).unwrap();
        (dom, root, div, span1, span2)
    }

    #[test]
    fn next_node_visits_in_preorder() {
        let (dom, root, div, span1, span2) = build();
        let mut w = TreeWalker::new(&dom, root, NodeFilter::new(show::SHOW_ELEMENT));
        assert_eq!(w.next_node(), Some(div));
        assert_eq!(w.next_node(), Some(span1));
        assert_eq!(w.next_node(), Some(span2));
        assert_eq!(w.next_node(), None);
    }

    #[test]
    fn reject_prunes_subtree() {
        let (dom, root, div, _span1, _span2) = build();
        let filter = NodeFilter::with_callback(show::SHOW_ELEMENT, move |dom, n| {
            if n == div {
                FilterResult::Reject
            } else {
                FilterResult::Accept
            }
        });
        let mut w = TreeWalker::new(&dom, root, filter);
        assert_eq!(w.next_node(), None);
    }

    #[test]
    fn skip_hides_node_but_descends() {
        let (dom, root, div, span1, span2) = build();
        let filter = NodeFilter::with_callback(show::SHOW_ELEMENT, move |_dom, n| {
            if n == div {
                FilterResult::Skip
            } else {
                FilterResult::Accept
            }
        });
        let mut w = TreeWalker::new(&dom, root, filter);
        assert_eq!(w.next_node(), Some(span1));
        assert_eq!(w.next_node(), Some(span2));
    }

    #[test]
    fn child_and_sibling_navigation() {
        let (dom, root, div, span1, span2) = build();
        let mut w = TreeWalker::new(&dom, root, NodeFilter::new(show::SHOW_ELEMENT));
        w.set_current_node(div);
        assert_eq!(w.first_child(), Some(span1));
        assert_eq!(w.next_sibling(), Some(span2));
        assert_eq!(w.previous_sibling(), Some(span1));
        assert_eq!(w.parent_node(), Some(div));
    }
}
