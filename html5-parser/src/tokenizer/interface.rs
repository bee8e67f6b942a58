// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The token vocabulary the tokenizer emits (spec §3 "Token", §4.6) and the
//! [`TokenSink`] trait its consumer implements. Mirrors
//! `html5ever::tokenizer::interface`, narrowed to the six token kinds spec
//! §3 names — no `ParseError`/`NullCharacterToken` pseudo-tokens, since this
//! workspace reports parse errors through [`dom_core::Reporter`] directly
//! rather than threading them through the token stream.

use dom_core::dom::node::NodeId;
use dom_core::{Attribute, Position};

use crate::tokenizer::states::RawKind;

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub force_quirks: bool,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: String,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

impl Tag {
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Token {
    Doctype(Doctype),
    Tag(Tag),
    Comment(String),
    Character(String),
    Eof,
}

/// A token together with the position it began at (spec §3).
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PositionedToken {
    pub position: Position,
    pub token: Token,
}

#[must_use]
pub enum TokenSinkResult {
    Continue,
    /// The sink wants raw-text/RCDATA/script-data/PLAINTEXT content states
    /// from here on (set by the tree builder after a `<script>`/`<style>`
    /// start tag, mirroring `html5ever`'s `TokenSinkResult::RawData`).
    ToRawData(RawKind),
    ToPlaintext,
}

/// Types that can receive tokens from the [`crate::tokenizer::Tokenizer`].
pub trait TokenSink {
    fn process_token(&mut self, token: PositionedToken) -> TokenSinkResult;
}
