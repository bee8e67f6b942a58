// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The DOM node model (spec §4.3), its attribute storage (§4.4), and the
//! concrete tree sink the HTML5 parser drives (§9 "arena + index").

pub mod arena;
pub mod arena_sink;
pub mod error;
pub mod named_node_map;
pub mod node;

pub use arena::{Arena, NodeId as ArenaNodeId};
pub use error::{DomError, DomResult};
pub use named_node_map::NamedNodeMap;
pub use node::{
    AttributeData, Dom, DocumentData, DocumentKind, ElementData, Node, NodeData, NodeId,
    NodeType, QuirksMode,
};
