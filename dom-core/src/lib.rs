// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared vocabulary for the HTML5 and Markdown parsers: the code-point
//! [`source::Source`] (spec §4.1), the [`report::Reporter`] error sink
//! (§4.2), the DOM node arena and its mutation API (§4.3–§4.4), filtered
//! traversal (§4.5), and the namespace/qualified-name types both
//! tokenizers' tag tokens are built from (§3).
//!
//! Plays the role `markup5ever` plays for `html5ever` and
//! `markup5ever_rcdom`: a small foundational crate with no tokenizer or
//! tree-builder logic of its own, depended on by every other crate in the
//! workspace.

pub mod dom;
pub mod namespace;
pub mod qualname;
pub mod report;
pub mod serialize;
pub mod source;
pub mod token;
pub mod traversal;

pub use namespace::NsId;
pub use qualname::{Attribute, QualName};
pub use report::{Context, ErrorRecord, ParsingFailure, Reporter};
pub use source::{Marker, Position, Source, EOF};
