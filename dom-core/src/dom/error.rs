// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! DOM operation errors (spec §4.3, §7.2). These unwind a single mutation
//! API call and leave the tree unchanged; they are never surfaced through
//! the [`crate::report::Reporter`], which is reserved for recoverable parse
//! errors.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DomError {
    /// `new` is an ancestor of `parent`, or the variant forbids children of
    /// that kind.
    HierarchyRequestError,
    /// A reference node was looked up but is not a child of the expected parent.
    NotFoundError,
    /// A proposed Element/Attribute name fails the XML `Name` production.
    InvalidCharacterError,
    /// A namespace/prefix combination violates the sanity rules in spec §4.3.
    NamespaceError,
    /// An operation mixed nodes owned by different documents.
    WrongDocumentError,
    /// The node or iterator is not in a state where the operation is valid.
    InvalidStateError,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomError::HierarchyRequestError => "HierarchyRequestError",
            DomError::NotFoundError => "NotFoundError",
            DomError::InvalidCharacterError => "InvalidCharacterError",
            DomError::NamespaceError => "NamespaceError",
            DomError::WrongDocumentError => "WrongDocumentError",
            DomError::InvalidStateError => "InvalidStateError",
        };
        f.write_str(name)
    }
}

impl std::error::Error for DomError {}

pub type DomResult<T> = Result<T, DomError>;
