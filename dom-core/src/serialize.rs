// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! DOM serialisation (spec §6): "on any node, an output stream operator
//! emits an HTML/XML serialisation." `html5ever`'s own `Serialize` trait
//! writes through a generic `Serializer`; this workspace has one concrete
//! consumer (round-tripping test fixtures), so [`Serializable`] is a plain
//! `Display` impl rather than a serializer-parameterised trait — text is
//! emitted verbatim with no escaping, matching spec §6's "no escaping on
//! serialisation for parity with test fixtures".

use std::fmt;

use crate::dom::node::{Dom, NodeData, NodeId};

/// A void HTML element never has a closing tag or children in its
/// serialisation, per the HTML Living Standard's void elements list.
fn is_void_element(local: &str) -> bool {
    matches!(
        local,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Borrows a `Dom` and one of its nodes so the pair can be formatted with
/// `{}` — `write!(f, "{}", Serializable::new(&dom, node))`.
pub struct Serializable<'a> {
    dom: &'a Dom,
    node: NodeId,
}

impl<'a> Serializable<'a> {
    pub fn new(dom: &'a Dom, node: NodeId) -> Serializable<'a> {
        Serializable { dom, node }
    }
}

impl fmt::Display for Serializable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self.dom, self.node, f)
    }
}

fn write_node(dom: &Dom, node: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &dom.node(node).data {
        NodeData::Document(_) | NodeData::DocumentFragment => {
            for child in dom.children(node) {
                write_node(dom, child, f)?;
            }
            Ok(())
        }
        NodeData::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            write!(f, "<!DOCTYPE {}", name)?;
            match (public_id.is_empty(), system_id.is_empty()) {
                (false, false) => write!(f, " PUBLIC \"{}\" \"{}\"", public_id, system_id)?,
                (false, true) => write!(f, " PUBLIC \"{}\"", public_id)?,
                (true, false) => write!(f, " SYSTEM \"{}\"", system_id)?,
                (true, true) => {}
            }
            write!(f, ">")
        }
        NodeData::Element(e) => {
            write!(f, "<{}", e.name.qualified())?;
            for &attr in e.attributes.iter() {
                if let NodeData::Attribute(a) = &dom.node(attr).data {
                    write!(f, " {}", a.name.qualified())?;
                    if let Some(v) = &a.value {
                        write!(f, "=\"{}\"", v)?;
                    }
                }
            }
            write!(f, ">")?;
            if !is_void_element(&e.name.local) {
                for child in dom.children(node) {
                    write_node(dom, child, f)?;
                }
                write!(f, "</{}>", e.name.qualified())?;
            }
            Ok(())
        }
        NodeData::Attribute(a) => f.write_str(a.value.as_deref().unwrap_or("")),
        NodeData::Text(s) => f.write_str(s),
        NodeData::CdataSection(s) => write!(f, "<![CDATA[{}]]>", s),
        NodeData::Comment(s) => write!(f, "<!--{}-->", s),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::node::DocumentKind;

    #[test]
    fn element_with_attribute_and_text_child() {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let div = dom.create_element("div");
        let id = dom.create_attribute("id").unwrap();
        dom.set_attribute_value(id, "x");
        dom.append_attribute_unless_present(div, id);
        let text = dom.create_text_node("hi");
        dom.append_child(div, text).unwrap();
        assert_eq!(
            Serializable::new(&dom, div).to_string(),
            r#"<div id="x">hi</div>"#
        );
    }

    #[test]
    fn void_element_has_no_closing_tag() {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let br = dom.create_element("br");
        assert_eq!(Serializable::new(&dom, br).to_string(), "<br>");
    }

    #[test]
    fn doctype_with_public_and_system_id() {
        let mut dom = Dom::new("t.html", DocumentKind::Html);
        let doctype = dom.set_doctype(
            "html".to_owned(),
            "-//W3C//DTD HTML 4.01//EN".to_owned(),
            "http://www.w3.org/TR/html4/strict.dtd".to_owned(),
        );
        assert_eq!(
            Serializable::new(&dom, doctype).to_string(),
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#
        );
    }
}
