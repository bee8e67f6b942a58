// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`QualName`] and [`Attribute`], carried over from
//! `markup5ever::interface::{QualName, Attribute}` with `Namespace` narrowed
//! to [`NsId`] (see [`crate::namespace`]).

use std::fmt;

use crate::namespace::{LocalName, NsId, Prefix};

/// `https://www.w3.org/TR/REC-xml-names/#dt-expname`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExpandedName<'a> {
    pub ns: NsId,
    pub local: &'a LocalName,
}

/// A qualified name: `prefix:local_name`, or just `local_name` with no prefix.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualName {
    pub prefix: Option<Prefix>,
    pub ns: NsId,
    pub local: LocalName,
}

impl QualName {
    pub fn new(prefix: Option<Prefix>, ns: NsId, local: LocalName) -> QualName {
        QualName { prefix, ns, local }
    }

    /// An unprefixed, unnamespaced name — the common case for HTML tags and
    /// attributes outside foreign content.
    pub fn html(local: impl Into<LocalName>) -> QualName {
        QualName::new(None, NsId::Html, local.into())
    }

    pub fn expanded(&self) -> ExpandedName<'_> {
        ExpandedName {
            ns: self.ns,
            local: &self.local,
        }
    }

    /// The qualified name as it would be written in source: `prefix:local`
    /// or just `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.to_string(),
        }
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// A tag attribute. The namespace is almost always `NsId::Unknown`; the
/// tree builder adjusts certain attribute names inside foreign content
/// (MathML, SVG), exactly as html5ever's `Attribute` does.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}
