// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Namespace identifiers (spec §3 "Namespace identifier").
//!
//! html5ever represents a namespace as an open, string-interned `Atom`
//! (`markup5ever::Namespace`, built from `string_cache`). The spec narrows
//! this to a closed small-integer enumeration over
//! `{HTML, SVG, MathML, XLink, XML, XMLNS, Other, Unknown}`, with `Other`
//! as an escape hatch for the arbitrary namespace URIs XML documents (as
//! opposed to HTML5 foreign content, which only ever needs the first five)
//! can declare. We keep html5ever's *local name*/`Prefix` atoms
//! (`string_cache::DefaultAtom`, dynamically interned, no codegen needed)
//! since those are genuinely open-ended, but give namespaces this closed
//! representation instead.

use std::sync::{Mutex, OnceLock};

pub type LocalName = string_cache::DefaultAtom;
pub type Prefix = string_cache::DefaultAtom;

/// A namespace identifier: either one of the seven well-known kinds, or an
/// interned small integer referring to an arbitrary URI registered via
/// [`NsId::intern`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NsId {
    Html,
    Svg,
    MathMl,
    XLink,
    Xml,
    Xmlns,
    /// No namespace at all (the common case for HTML attributes).
    Unknown,
    /// An arbitrary namespace URI, for XML documents. Carries an index into
    /// the process-wide interning table.
    Other(u32),
}

impl NsId {
    pub const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
    pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";
    pub const MATHML_URI: &'static str = "http://www.1998.org/Math/MathML";
    pub const XLINK_URI: &'static str = "http://www.w3.org/1999/xlink";
    pub const XML_URI: &'static str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS_URI: &'static str = "http://www.w3.org/2000/xmlns/";

    /// The canonical URI for this namespace id (empty string for `Unknown`).
    pub fn uri(&self) -> std::borrow::Cow<'static, str> {
        use std::borrow::Cow;
        match *self {
            NsId::Html => Cow::Borrowed(Self::HTML_URI),
            NsId::Svg => Cow::Borrowed(Self::SVG_URI),
            NsId::MathMl => Cow::Borrowed(Self::MATHML_URI),
            NsId::XLink => Cow::Borrowed(Self::XLINK_URI),
            NsId::Xml => Cow::Borrowed(Self::XML_URI),
            NsId::Xmlns => Cow::Borrowed(Self::XMLNS_URI),
            NsId::Unknown => Cow::Borrowed(""),
            NsId::Other(idx) => Cow::Owned(interner().lookup(idx)),
        }
    }

    /// Resolve a URI string to an `NsId`, recognising the six well-known
    /// URIs and otherwise interning it fresh.
    pub fn from_uri(uri: &str) -> NsId {
        match uri {
            "" => NsId::Unknown,
            Self::HTML_URI => NsId::Html,
            Self::SVG_URI => NsId::Svg,
            Self::MATHML_URI => NsId::MathMl,
            Self::XLINK_URI => NsId::XLink,
            Self::XML_URI => NsId::Xml,
            Self::XMLNS_URI => NsId::Xmlns,
            other => NsId::Other(interner().intern(other)),
        }
    }
}

struct Interner {
    table: Mutex<Vec<String>>,
}

impl Interner {
    fn intern(&self, uri: &str) -> u32 {
        let mut table = self.table.lock().unwrap();
        if let Some(idx) = table.iter().position(|s| s == uri) {
            return idx as u32;
        }
        table.push(uri.to_owned());
        (table.len() - 1) as u32
    }

    fn lookup(&self, idx: u32) -> String {
        self.table.lock().unwrap()[idx as usize].clone()
    }
}

fn interner() -> &'static Interner {
    static INSTANCE: OnceLock<Interner> = OnceLock::new();
    INSTANCE.get_or_init(|| Interner {
        table: Mutex::new(Vec::new()),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn well_known_roundtrip() {
        assert_eq!(NsId::from_uri(NsId::HTML_URI), NsId::Html);
        assert_eq!(NsId::Html.uri(), NsId::HTML_URI);
        assert_eq!(NsId::from_uri(""), NsId::Unknown);
    }

    #[test]
    fn other_namespace_interns_and_roundtrips() {
        let ns = NsId::from_uri("urn:furniture");
        assert!(matches!(ns, NsId::Other(_)));
        assert_eq!(ns.uri(), "urn:furniture");
        let ns2 = NsId::from_uri("urn:furniture");
        assert_eq!(ns, ns2, "interning the same URI twice yields the same id");
    }
}
