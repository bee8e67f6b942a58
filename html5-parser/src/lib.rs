// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An HTML5 tokenizer and insertion-mode tree builder (spec §4.6–§4.7),
//! sitting on top of [`dom_core`]'s arena-backed DOM the way `html5ever`
//! sits on top of `markup5ever`.

pub mod tokenizer;
pub mod tree_builder;

use std::path::Path;

use dom_core::dom::arena_sink::ArenaDom;
use dom_core::dom::node::{Dom, DocumentKind};
use dom_core::source::Source;
use dom_core::Reporter;

pub use tokenizer::{Tokenizer, TokenizerOpts};
pub use tree_builder::{TreeBuilder, TreeBuilderOpts};

/// Parse a complete HTML document (spec §8 scenario S1/S2/S6 entry point):
/// tokenize `text` and drive a tree builder over a fresh [`Dom`], returning
/// the finished document.
pub fn parse_document(path: impl AsRef<Path>, text: &str, reporter: &Reporter) -> Dom {
    let path = path.as_ref();
    let sink = ArenaDom::new(path, DocumentKind::Html, reporter);
    let mut builder = TreeBuilder::new(sink, reporter, path, TreeBuilderOpts::default());
    let source = Source::from_str(path, text);
    let mut tokenizer = Tokenizer::new(path, source, &mut builder, reporter, TokenizerOpts::default());
    tokenizer.run();
    builder.finish().dom
}

/// Parse `text` as an HTML fragment in the context of `context_tag_name`
/// (spec §4.7 "fragment parsing"), e.g. parsing the `innerHTML` setter's
/// argument against a `<div>` or `<template>` context element.
pub fn parse_fragment(
    path: impl AsRef<Path>,
    text: &str,
    context_tag_name: &str,
    reporter: &Reporter,
) -> Dom {
    let path = path.as_ref();
    let sink = ArenaDom::new(path, DocumentKind::Html, reporter);
    let mut builder =
        TreeBuilder::new_fragment(sink, reporter, path, context_tag_name, TreeBuilderOpts::default());
    let opts = TokenizerOpts {
        initial_state: Some(builder.fragment_initial_tokenizer_state()),
        last_start_tag_name: Some(context_tag_name.to_string()),
    };
    let source = Source::from_str(path, text);
    let mut tokenizer = Tokenizer::new(path, source, &mut builder, reporter, opts);
    tokenizer.run();
    builder.finish().dom
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_minimal_document_into_html_head_body_skeleton() {
        let reporter = Reporter::new();
        let dom = parse_document("t.html", "<!DOCTYPE html><title>Hi</title><p>Hello</p>", &reporter);
        let html = dom.document_element().expect("html element");
        assert_eq!(&*dom.element_name(html).local, "html");
    }
}
