// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A hierarchical Markdown tokenizer (CommonMark plus task lists,
//! footnotes, definition lists, block IDs, and tables, spec §4.8) and the
//! bridge that renders its token stream to HTML and hands it to
//! [`html5_parser`] (spec §4.9), sitting on top of [`dom_core`]'s arena DOM
//! the same way `html5-parser` does.

pub mod bridge;
pub mod token;
pub mod tokenizer;

use std::path::Path;

use dom_core::dom::node::Dom;
use dom_core::source::Source;
use dom_core::Reporter;

pub use token::{Context, Token};
pub use tokenizer::Tokenizer;

/// Parse a complete Markdown document: tokenize `text`, bridge the token
/// stream to HTML, and drive it through [`html5_parser::parse_document`]
/// to produce a finished DOM.
pub fn parse_document(path: impl AsRef<Path>, text: &str, reporter: &Reporter) -> Dom {
    let path = path.as_ref();
    let html = render_to_html(path, text, reporter);
    html5_parser::parse_document(path, &html, reporter)
}

/// Tokenize and bridge `text` without handing the result to the HTML5
/// parser, for callers that want to embed the rendered fragment themselves
/// (e.g. the `{{…}}` escape-to-host case, spec §4.8 `Context::Native`).
pub fn render_to_html(path: impl AsRef<Path>, text: &str, reporter: &Reporter) -> String {
    let path = path.as_ref();
    let source = Source::from_str(path, text);
    let mut tokenizer = Tokenizer::new(path, source, reporter);
    tokenizer.parse(Context::Markdown);
    let tokens = tokenizer.into_tokens();
    bridge::render(path, &tokens, reporter)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_minimal_document_into_html_skeleton() {
        let reporter = Reporter::new();
        let dom = parse_document("t.md", "# Title\n\nHello *world*.\n", &reporter);
        let html = dom.document_element().expect("html element");
        assert_eq!(&*dom.element_name(html).local, "html");
    }

    #[test]
    fn render_to_html_produces_expected_tight_list_markup() {
        let reporter = Reporter::new();
        let html = render_to_html("t.md", "- a\n- b\n", &reporter);
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
    }
}
