// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Markdown tokenizer (spec §4.8): a hierarchical state machine over
//! three levels (root/block, container continuation, inline), grounded on
//! `src/parser/tokeniser/Markdown.{h,cpp}`'s `Markdown` class. Condensed the
//! way `html5-parser`'s tokenizer condenses WHATWG states that differ only
//! in fixed punctuation: container-continuation matching and inline-span
//! scanning are ordinary recursive helpers rather than one enum variant per
//! column/delimiter combination, but every architectural element the spec
//! names (pending buffer, open-blocks stack, open-containers deque,
//! formatting-marker deque, section markers, token/error queues,
//! list-spacing tracking, HTML-block type detection, speculative table
//! parsing) is implemented, not stubbed.

pub mod block;
pub mod container;
pub mod inline;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use dom_core::report::Context as ReportContext;
use dom_core::source::{Position, Source};
use dom_core::Reporter;

use crate::token::{Context, ListKind, ListSpacing, Spanned, Token};

pub mod error_code {
    pub const INVALID_BLOCK_ID: u32 = 200;
    pub const UNCLOSED_CODE_SPAN: u32 = 201;
    pub const UNCLOSED_EMPHASIS: u32 = 202;
    pub const UNCLOSED_LINK: u32 = 203;
    pub const MALFORMED_LINK_DESTINATION: u32 = 204;
    pub const TABLE_COLUMN_COUNT_MISMATCH: u32 = 205;
    pub const UNCLOSED_FENCED_CODE_BLOCK: u32 = 206;
    pub const UNCLOSED_HTML_BLOCK: u32 = 207;
    pub const EMPTY_FOOTNOTE_ID: u32 = 208;
}

/// A block currently open on [`Tokenizer::open_blocks`] (spec §4.8
/// "Open-blocks stack").
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    Paragraph,
    Heading(u8),
    BlockQuote,
    List {
        kind: ListKind,
        spacing: ListSpacing,
        begin_index: usize,
        blank_pending: bool,
    },
    ListItem,
    CodeBlock { fence: Option<FenceKind>, info: String },
    HtmlBlock { close: HtmlBlockClose },
    Table,
    FootnoteDef,
    DefinitionList,
    DefinitionDescription,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FenceKind {
    Backtick,
    Tilde,
}

/// How an HTML block (spec §4.8 "HTML-block type detection") decides it has
/// ended: per CommonMark types 1-6 close on a matching line pattern, type 7
/// closes on the next blank line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HtmlBlockClose {
    Pattern(String),
    BlankLine,
}

/// A container frame on [`Tokenizer::open_containers`] (spec §4.8
/// "open-containers deque"): blockquote, list item, or footnote-definition
/// item, each tracked by the column its content must be indented past to
/// continue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Container {
    pub kind: ContainerKind,
    pub indent_col: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    BlockQuote,
    ListItem,
    FootnoteDef,
}

/// Snapshot of queue lengths enabling atomic rollback of a speculative
/// section (spec §4.8 "Section markers"): tables and link/image parses that
/// turn out invalid roll back to exactly this point.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SectionMarker {
    pub token_i: usize,
    pub error_i: usize,
}

/// The pending buffer (spec §4.8): speculative characters accumulated for
/// the current leaf block before it is recognised and flushed.
#[derive(Default)]
pub(crate) struct PendingBuffer {
    pub position: Option<Position>,
    pub chars: String,
    pub block_line_count: usize,
    pub setext_possible: bool,
    /// Index of this leaf's opening token in the not-yet-flushed queue, so
    /// a setext heading or a definition-list term can rewrite it in place
    /// instead of leaving the original `ParagraphBegin` dangling.
    pub begin_index: Option<usize>,
}

impl PendingBuffer {
    fn reset(&mut self, position: Position) {
        self.position = Some(position);
        self.chars.clear();
        self.block_line_count = 0;
        self.setext_possible = true;
        self.begin_index = None;
    }
}

struct QueuedError {
    code: u32,
    position: Position,
    detail: Option<String>,
}

/// The Markdown tokenizer. Owns the input [`Source`] and accumulates
/// [`Token`]s into an internal queue, flushed to the bridge once the
/// outermost open block closes (spec §4.8 "Token queue … flushed").
pub struct Tokenizer<'a> {
    path: PathBuf,
    reporter: &'a Reporter,
    source: Source,
    pub(crate) pending: PendingBuffer,
    pub(crate) open_blocks: Vec<Block>,
    pub(crate) open_containers: VecDeque<Container>,
    pub(crate) section_markers: Vec<SectionMarker>,
    pub(crate) is_fake_table: bool,
    pub(crate) table_col_count: usize,
    pub(crate) table_aligns: Vec<Option<crate::token::Align>>,
    token_queue: Vec<Spanned<Token>>,
    error_queue: Vec<QueuedError>,
    flushed: Vec<Spanned<Token>>,
    error_count: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(path: impl AsRef<Path>, source: Source, reporter: &'a Reporter) -> Tokenizer<'a> {
        Tokenizer {
            path: path.as_ref().to_path_buf(),
            reporter,
            source,
            pending: PendingBuffer::default(),
            open_blocks: Vec::new(),
            open_containers: VecDeque::new(),
            section_markers: Vec::new(),
            is_fake_table: false,
            table_col_count: 0,
            table_aligns: Vec::new(),
            token_queue: Vec::new(),
            error_queue: Vec::new(),
            flushed: Vec::new(),
            error_count: 0,
        }
    }

    pub fn errors(&self) -> usize {
        self.error_count
    }

    pub(crate) fn error(&mut self, code: u32, position: Position, detail: Option<String>) {
        log::debug!("markdown parse error {code} at {position}");
        self.error_count += 1;
        self.error_queue.push(QueuedError { code, position, detail });
    }

    pub(crate) fn queue(&mut self, position: Position, token: Token) {
        self.token_queue.push(Spanned::new(position, token));
    }

    /// Queue a token and return its index in the (not-yet-flushed) token
    /// queue, so a later event can patch it in place — used for the
    /// `ListBegin` spacing field (spec §4.8 "List-spacing tracking") and
    /// for rewriting an unmatched `FormatBegin` back to literal text.
    pub(crate) fn queue_and_index(&mut self, position: Position, token: Token) -> usize {
        self.token_queue.push(Spanned::new(position, token));
        self.token_queue.len() - 1
    }

    pub(crate) fn rewrite_queued(&mut self, index: usize, token: Token) {
        self.token_queue[index].value = token;
    }

    pub(crate) fn push_section_marker(&mut self) {
        self.section_markers.push(SectionMarker {
            token_i: self.token_queue.len(),
            error_i: self.error_queue.len(),
        });
    }

    pub(crate) fn pop_section_marker(&mut self) {
        self.section_markers.pop();
    }

    /// Roll back to the last section marker, discarding every token and
    /// error queued since (spec §8 "Markdown rollback" testable property).
    pub(crate) fn rollback_to_last_section_marker(&mut self) {
        if let Some(marker) = self.section_markers.pop() {
            self.token_queue.truncate(marker.token_i);
            self.error_queue.truncate(marker.error_i);
        }
    }

    /// Dispatch every queued token/error to the reporter and the flushed
    /// output, emptying both queues (spec §4.8 "then flushed").
    pub(crate) fn dispatch_queued(&mut self) {
        for err in self.error_queue.drain(..) {
            self.reporter.log(
                &self.path,
                ReportContext::MarkdownTokenizer,
                err.code,
                err.position,
                err.detail,
            );
        }
        self.flushed.append(&mut self.token_queue);
    }

    /// Tokenize `text`, returning the ending [`Context`] (spec §4.8
    /// `parse(text, starting_ctx)`). `starting_ctx` is currently always
    /// honoured as `Markdown`; `Native` is only ever an output (a `{{…}}`
    /// escape-to-host marker was hit).
    pub fn parse(&mut self, starting_ctx: Context) -> Context {
        let _ = starting_ctx;
        loop {
            let line_start = self.source.position();
            if self.source.reached_end() {
                break;
            }
            let line = self.read_line();
            if let Some(ctx) = block::process_line(self, &line, line_start) {
                self.dispatch_queued();
                return ctx;
            }
        }
        self.close_all_open_blocks(self.source.position());
        self.dispatch_queued();
        Context::Markdown
    }

    /// Hand back every token produced across the whole parse, in source
    /// order (spec §4.9 "receives markdown tokens").
    pub fn into_tokens(mut self) -> Vec<Spanned<Token>> {
        self.flushed.push(Spanned::new(self.source.position(), Token::Eof));
        self.flushed
    }

    pub(crate) fn source_position(&self) -> Position {
        self.source.position()
    }

    pub(crate) fn source_mark(&self) -> dom_core::source::Marker {
        self.source.mark()
    }

    pub(crate) fn source_restore(&mut self, marker: dom_core::source::Marker) {
        self.source.restore(marker);
    }

    pub(crate) fn read_line(&mut self) -> String {
        let mut line = String::new();
        loop {
            let c = self.source.next();
            if c == dom_core::source::EOF {
                break;
            }
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        line
    }

    fn close_all_open_blocks(&mut self, pos: Position) {
        block::flush_pending_block(self, pos);
        while !self.open_blocks.is_empty() {
            block::close_last_open_block(self, pos);
        }
        self.open_containers.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::FormatKind;

    fn tokens_for(text: &str) -> Vec<Token> {
        let reporter = Reporter::new();
        let source = Source::from_str("t.md", text);
        let mut tokenizer = Tokenizer::new("t.md", source, &reporter);
        tokenizer.parse(Context::Markdown);
        tokenizer
            .into_tokens()
            .into_iter()
            .map(|s| s.value)
            .collect()
    }

    #[test]
    fn tight_bullet_list_emits_two_list_items() {
        let tokens = tokens_for("- a\n- b\n");
        assert!(matches!(
            tokens[0],
            Token::ListBegin { spacing: ListSpacing::DefaultTight, .. }
        ));
        assert_eq!(
            tokens.iter().filter(|t| matches!(t, Token::ListItemBegin)).count(),
            2
        );
        assert!(tokens.contains(&Token::ListEnd));
    }

    #[test]
    fn paragraph_emits_character_tokens() {
        let tokens = tokens_for("hello world\n");
        assert!(tokens.contains(&Token::ParagraphBegin));
        assert!(tokens.iter().any(|t| matches!(t, Token::Character(s) if s.contains("hello"))));
    }

    #[test]
    fn definition_list_pairs_term_with_description() {
        let tokens = tokens_for("Apple\n: A fruit\n");
        assert!(tokens.contains(&Token::DefinitionListBegin));
        assert!(tokens.contains(&Token::DefinitionTermBegin));
        assert!(tokens.iter().any(|t| matches!(t, Token::Character(s) if s.contains("Apple"))));
        assert!(tokens.contains(&Token::DefinitionDescriptionBegin));
        assert!(tokens.iter().any(|t| matches!(t, Token::Character(s) if s.contains("A fruit"))));
        assert!(tokens.contains(&Token::DefinitionListEnd));
    }

    #[test]
    fn emphasis_pairs_into_format_begin_end() {
        let tokens = tokens_for("a *b* c\n");
        let begins = tokens
            .iter()
            .filter(|t| matches!(t, Token::FormatBegin(FormatKind::Emphasis)))
            .count();
        let ends = tokens
            .iter()
            .filter(|t| matches!(t, Token::FormatEnd(FormatKind::Emphasis)))
            .count();
        assert_eq!(begins, 1);
        assert_eq!(ends, 1);
    }
}
