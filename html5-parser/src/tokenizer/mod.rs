// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tokenizer (spec §4.6): a state machine over [`State`] that consumes
//! a [`dom_core::Source`] and emits [`PositionedToken`]s to a [`TokenSink`].
//!
//! Grounded on `html5ever::tokenizer::Tokenizer`, but driven directly off a
//! fully buffered [`Source`] rather than a `BufferQueue` pumped chunk by
//! chunk, since this workspace's input is always a complete in-memory
//! document (spec §4.1). The dispatch loop below does not attempt a
//! literal port of every one of `html5ever`'s ~80 states; it implements the
//! complete state *space* declared in [`states::State`] with the transition
//! logic each state's name calls for, condensed where several WHATWG states
//! differ only in which fixed punctuation they watch for (e.g. the comment
//! and DOCTYPE states) into shared helper functions. This is a deliberate,
//! disclosed scope reduction from a line-for-line port, not a reduction in
//! the state space covered.

pub mod char_ref;
pub mod interface;
pub mod states;

use std::path::{Path, PathBuf};

use dom_core::source::{Position, Source, EOF};
use dom_core::{Attribute, QualName, Reporter};

use interface::{Doctype, PositionedToken, Tag, TagKind, Token, TokenSink, TokenSinkResult};
use states::{AttrValueKind, DoctypeIdKind, RawKind, ScriptEscapeKind, State};

/// Error codes logged under [`dom_core::Context::Html5Tokenizer`] (spec §6).
/// Numbered in roughly the order the WHATWG tokenization algorithm
/// introduces the corresponding parse errors.
pub mod error_code {
    pub const UNEXPECTED_NULL_CHARACTER: u32 = 1;
    pub const INVALID_FIRST_CHARACTER_OF_TAG_NAME: u32 = 2;
    pub const EOF_BEFORE_TAG_NAME: u32 = 3;
    pub const MISSING_END_TAG_NAME: u32 = 4;
    pub const EOF_IN_TAG: u32 = 5;
    pub const UNEXPECTED_EQUALS_SIGN_BEFORE_ATTRIBUTE_NAME: u32 = 6;
    pub const UNEXPECTED_CHARACTER_IN_ATTRIBUTE_NAME: u32 = 7;
    pub const MISSING_ATTRIBUTE_VALUE: u32 = 8;
    pub const UNEXPECTED_CHARACTER_IN_UNQUOTED_ATTRIBUTE_VALUE: u32 = 9;
    pub const MISSING_WHITESPACE_BETWEEN_ATTRIBUTES: u32 = 10;
    pub const UNEXPECTED_SOLIDUS_IN_TAG: u32 = 11;
    pub const EOF_IN_COMMENT: u32 = 12;
    pub const ABRUPT_CLOSING_OF_EMPTY_COMMENT: u32 = 13;
    pub const NESTED_COMMENT: u32 = 14;
    pub const INCORRECTLY_CLOSED_COMMENT: u32 = 15;
    pub const EOF_IN_DOCTYPE: u32 = 16;
    pub const MISSING_WHITESPACE_BEFORE_DOCTYPE_NAME: u32 = 17;
    pub const MISSING_DOCTYPE_NAME: u32 = 18;
    pub const MISSING_QUOTE_BEFORE_DOCTYPE_PUBLIC_IDENTIFIER: u32 = 19;
    pub const MISSING_QUOTE_BEFORE_DOCTYPE_SYSTEM_IDENTIFIER: u32 = 20;
    pub const MISSING_WHITESPACE_AFTER_DOCTYPE_PUBLIC_KEYWORD: u32 = 21;
    pub const MISSING_WHITESPACE_AFTER_DOCTYPE_SYSTEM_KEYWORD: u32 = 22;
    pub const ABRUPT_DOCTYPE_PUBLIC_IDENTIFIER: u32 = 23;
    pub const ABRUPT_DOCTYPE_SYSTEM_IDENTIFIER: u32 = 24;
    pub const UNEXPECTED_CHARACTER_AFTER_DOCTYPE_SYSTEM_IDENTIFIER: u32 = 25;
    pub const MISSING_WHITESPACE_BETWEEN_DOCTYPE_PUBLIC_AND_SYSTEM_IDENTIFIERS: u32 = 26;
    pub const CDATA_IN_HTML_CONTENT: u32 = 27;
    pub const EOF_IN_CDATA: u32 = 28;
    pub const INCORRECTLY_OPENED_COMMENT: u32 = 29;
    pub const EOF_IN_SCRIPT_HTML_COMMENT_LIKE_TEXT: u32 = 30;
    pub const MISSING_SEMICOLON_AFTER_CHARACTER_REFERENCE: u32 = 31;
    pub const UNKNOWN_NAMED_CHARACTER_REFERENCE: u32 = 32;
    pub const ABSENCE_OF_DIGITS_IN_NUMERIC_CHARACTER_REFERENCE: u32 = 33;
    pub const UNEXPECTED_QUESTION_MARK_INSTEAD_OF_TAG_NAME: u32 = 34;
}

/// Configuration the tokenizer is constructed with (spec's ambient
/// "Configuration" section): which raw-text content state (if any) parsing
/// should begin in, for fragment parsing against a context element whose
/// content model is already known.
#[derive(Clone, Debug, Default)]
pub struct TokenizerOpts {
    pub initial_state: Option<State>,
    pub last_start_tag_name: Option<String>,
}

/// The tokenizer (spec §4.6). Owns the input [`Source`] and drives a
/// [`TokenSink`] with the tokens it produces; does not itself build a tree.
pub struct Tokenizer<'a, S: TokenSink> {
    sink: &'a mut S,
    reporter: &'a Reporter,
    path: PathBuf,
    source: Source,
    state: State,
    return_state: State,
    pending_chars: String,
    pending_chars_pos: Option<Position>,
    current_tag: Option<Tag>,
    current_attr_name: String,
    current_attr_value: String,
    current_attr_pos: Position,
    current_comment: String,
    current_doctype: Doctype,
    doctype_id_buf: String,
    temp_buffer: String,
    char_ref_code: u32,
    char_ref_pos: Position,
    last_start_tag_name: Option<String>,
}

impl<'a, S: TokenSink> Tokenizer<'a, S> {
    pub fn new(
        path: impl AsRef<Path>,
        source: Source,
        sink: &'a mut S,
        reporter: &'a Reporter,
        opts: TokenizerOpts,
    ) -> Tokenizer<'a, S> {
        Tokenizer {
            sink,
            reporter,
            path: path.as_ref().to_path_buf(),
            source,
            state: opts.initial_state.unwrap_or(State::Data),
            return_state: State::Data,
            pending_chars: String::new(),
            pending_chars_pos: None,
            current_tag: None,
            current_attr_name: String::new(),
            current_attr_value: String::new(),
            current_attr_pos: Position::START,
            current_comment: String::new(),
            current_doctype: Doctype::default(),
            doctype_id_buf: String::new(),
            temp_buffer: String::new(),
            char_ref_code: 0,
            char_ref_pos: Position::START,
            last_start_tag_name: opts.last_start_tag_name,
        }
    }

    /// Run the tokenizer to completion, feeding every produced token to the
    /// sink, and reacting to [`TokenSinkResult`] by switching content models
    /// the way a tree builder's `<script>`/`<style>`/`<textarea>` start tag
    /// handling does.
    pub fn run(&mut self) {
        loop {
            let pos = self.source.position();
            let c = self.source.next();
            if self.step(c, pos) {
                break;
            }
        }
    }

    fn error(&self, code: u32, pos: Position, detail: Option<String>) {
        self.reporter.log(
            &self.path,
            dom_core::report::Context::Html5Tokenizer,
            code,
            pos,
            detail,
        );
    }

    fn emit_char(&mut self, pos: Position, c: char) {
        if self.pending_chars_pos.is_none() {
            self.pending_chars_pos = Some(pos);
        }
        self.pending_chars.push(c);
    }

    fn flush_chars(&mut self) {
        if !self.pending_chars.is_empty() {
            let pos = self.pending_chars_pos.take().unwrap_or(Position::START);
            let text = std::mem::take(&mut self.pending_chars);
            self.dispatch(PositionedToken {
                position: pos,
                token: Token::Character(text),
            });
        }
        self.pending_chars_pos = None;
    }

    fn emit_token(&mut self, pos: Position, token: Token) {
        self.flush_chars();
        self.dispatch(PositionedToken { position: pos, token });
    }

    fn dispatch(&mut self, token: PositionedToken) {
        match self.sink.process_token(token) {
            TokenSinkResult::Continue => {}
            TokenSinkResult::ToRawData(kind) => self.state = State::RawData(kind),
            TokenSinkResult::ToPlaintext => self.state = State::Plaintext,
        }
    }

    fn start_tag(&mut self, pos: Position, kind: TagKind) {
        self.flush_chars();
        self.current_tag = Some(Tag {
            kind,
            name: String::new(),
            self_closing: false,
            attrs: Vec::new(),
        });
        self.current_attr_pos = pos;
    }

    fn emit_current_tag(&mut self, pos: Position) {
        self.finish_attribute();
        if let Some(tag) = self.current_tag.take() {
            if tag.kind == TagKind::StartTag {
                self.last_start_tag_name = Some(tag.name.clone());
            }
            self.emit_token(pos, Token::Tag(tag));
        }
    }

    fn tag_name_mut(&mut self) -> &mut String {
        &mut self.current_tag.as_mut().expect("tag in progress").name
    }

    fn start_attribute(&mut self, pos: Position) {
        self.finish_attribute();
        self.current_attr_pos = pos;
    }

    fn finish_attribute(&mut self) {
        if self.current_attr_name.is_empty() {
            self.current_attr_value.clear();
            return;
        }
        let name = std::mem::take(&mut self.current_attr_name);
        let value = std::mem::take(&mut self.current_attr_value);
        if let Some(tag) = self.current_tag.as_mut() {
            // First attribute with a given name wins (spec §4.6 "duplicate
            // attribute" parse error); later ones are still consumed but
            // discarded here rather than in the tree builder, since the
            // tree builder only ever sees a `Tag` with already-deduplicated
            // attributes.
            if !tag.attrs.iter().any(|a| &*a.name.local == name.as_str()) {
                tag.attrs.push(Attribute {
                    name: QualName::html(name),
                    value,
                });
            }
        }
    }

    fn is_appropriate_end_tag(&self) -> bool {
        match (&self.current_tag, &self.last_start_tag_name) {
            (Some(tag), Some(last)) => tag.name == *last,
            _ => false,
        }
    }

    /// Advance one step of the state machine for code point `c`, consumed
    /// at `pos`. Returns `true` once an EOF token has been emitted and the
    /// tokenizer is finished.
    fn step(&mut self, c: char, pos: Position) -> bool {
        match self.state {
            State::Data => self.step_data(c, pos),
            State::Plaintext => self.step_plaintext(c, pos),
            State::RawData(kind) => self.step_raw_data(kind, c, pos),
            State::TagOpen => self.step_tag_open(c, pos),
            State::EndTagOpen => self.step_end_tag_open(c, pos),
            State::TagName => self.step_tag_name(c, pos),
            State::RawLessThanSign(kind) => self.step_raw_less_than_sign(kind, c, pos),
            State::RawEndTagOpen(kind) => self.step_raw_end_tag_open(kind, c, pos),
            State::RawEndTagName(kind) => self.step_raw_end_tag_name(kind, c, pos),
            State::ScriptDataEscapeStart(kind) => self.step_script_data_escape_start(kind, c, pos),
            State::ScriptDataEscapeStartDash => self.step_script_data_escape_start_dash(c, pos),
            State::ScriptDataEscapedDash(kind) => self.step_script_data_escaped_dash(kind, c, pos),
            State::ScriptDataEscapedDashDash(kind) => {
                self.step_script_data_escaped_dash_dash(kind, c, pos)
            }
            State::ScriptDataDoubleEscapeEnd => self.step_script_data_double_escape_end(c, pos),
            State::BeforeAttributeName => self.step_before_attribute_name(c, pos),
            State::AttributeName => self.step_attribute_name(c, pos),
            State::AfterAttributeName => self.step_after_attribute_name(c, pos),
            State::BeforeAttributeValue => self.step_before_attribute_value(c, pos),
            State::AttributeValue(kind) => self.step_attribute_value(kind, c, pos),
            State::AfterAttributeValueQuoted => self.step_after_attribute_value_quoted(c, pos),
            State::SelfClosingStartTag => self.step_self_closing_start_tag(c, pos),
            State::BogusComment => self.step_bogus_comment(c, pos),
            State::MarkupDeclarationOpen => self.step_markup_declaration_open(c, pos),
            State::CommentStart => self.step_comment_start(c, pos),
            State::CommentStartDash => self.step_comment_start_dash(c, pos),
            State::Comment => self.step_comment(c, pos),
            State::CommentLessThanSign => self.step_comment_less_than_sign(c, pos),
            State::CommentLessThanSignBang => self.step_comment_less_than_sign_bang(c, pos),
            State::CommentLessThanSignBangDash => self.step_comment_less_than_sign_bang_dash(c, pos),
            State::CommentLessThanSignBangDashDash => {
                self.step_comment_less_than_sign_bang_dash_dash(c, pos)
            }
            State::CommentEndDash => self.step_comment_end_dash(c, pos),
            State::CommentEnd => self.step_comment_end(c, pos),
            State::CommentEndBang => self.step_comment_end_bang(c, pos),
            State::Doctype => self.step_doctype(c, pos),
            State::BeforeDoctypeName => self.step_before_doctype_name(c, pos),
            State::DoctypeName => self.step_doctype_name(c, pos),
            State::AfterDoctypeName => self.step_after_doctype_name(c, pos),
            State::AfterDoctypeKeyword(kind) => self.step_after_doctype_keyword(kind, c, pos),
            State::BeforeDoctypeIdentifier(kind) => self.step_before_doctype_identifier(kind, c, pos),
            State::DoctypeIdentifierDoubleQuoted(kind) => {
                self.step_doctype_identifier_quoted(kind, '"', c, pos)
            }
            State::DoctypeIdentifierSingleQuoted(kind) => {
                self.step_doctype_identifier_quoted(kind, '\'', c, pos)
            }
            State::AfterDoctypeIdentifier(kind) => self.step_after_doctype_identifier(kind, c, pos),
            State::BetweenDoctypePublicAndSystemIdentifiers => {
                self.step_between_doctype_public_and_system_identifiers(c, pos)
            }
            State::BogusDoctype => self.step_bogus_doctype(c, pos),
            State::CdataSection => self.step_cdata_section(c, pos),
            State::CdataSectionBracket => self.step_cdata_section_bracket(c, pos),
            State::CdataSectionEnd => self.step_cdata_section_end(c, pos),
            State::CharacterReference => self.step_character_reference(c, pos),
        }
    }

    // ---- Data / PLAINTEXT / raw-text content models ----------------------

    fn step_data(&mut self, c: char, pos: Position) -> bool {
        match c {
            '&' => {
                self.return_state = State::Data;
                self.temp_buffer.clear();
                self.char_ref_pos = pos;
                self.state = State::CharacterReference;
            }
            '<' => self.state = State::TagOpen,
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.emit_char(pos, '\u{FFFD}');
            }
            EOF => {
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.emit_char(pos, c),
        }
        false
    }

    fn step_plaintext(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.emit_char(pos, '\u{FFFD}');
            }
            EOF => {
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.emit_char(pos, c),
        }
        false
    }

    fn step_raw_data(&mut self, kind: RawKind, c: char, pos: Position) -> bool {
        match (kind, c) {
            (RawKind::Rcdata | RawKind::Rawtext | RawKind::ScriptData, '<') => {
                self.state = State::RawLessThanSign(kind);
            }
            (RawKind::ScriptDataEscaped(_), '<') => {
                self.state = State::RawLessThanSign(kind);
            }
            (RawKind::ScriptDataEscaped(esc), '-') if esc == ScriptEscapeKind::Escaped => {
                self.emit_char(pos, '-');
                self.state = State::ScriptDataEscapedDash(esc);
            }
            (_, '\0') => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.emit_char(pos, '\u{FFFD}');
            }
            (_, EOF) => {
                self.emit_token(pos, Token::Eof);
                return true;
            }
            (_, c) => self.emit_char(pos, c),
        }
        false
    }

    fn step_script_data_escaped_dash(&mut self, kind: ScriptEscapeKind, c: char, pos: Position) -> bool {
        match c {
            '-' => {
                self.emit_char(pos, '-');
                self.state = State::ScriptDataEscapedDashDash(kind);
            }
            '<' => self.state = State::RawLessThanSign(RawKind::ScriptDataEscaped(kind)),
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.emit_char(pos, '\u{FFFD}');
                self.state = State::RawData(RawKind::ScriptDataEscaped(kind));
            }
            EOF => {
                self.error(error_code::EOF_IN_SCRIPT_HTML_COMMENT_LIKE_TEXT, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => {
                self.emit_char(pos, c);
                self.state = State::RawData(RawKind::ScriptDataEscaped(kind));
            }
        }
        false
    }

    fn step_script_data_escaped_dash_dash(
        &mut self,
        kind: ScriptEscapeKind,
        c: char,
        pos: Position,
    ) -> bool {
        match c {
            '-' => self.emit_char(pos, '-'),
            '<' => self.state = State::RawLessThanSign(RawKind::ScriptDataEscaped(kind)),
            '>' => {
                self.emit_char(pos, '>');
                self.state = State::RawData(RawKind::ScriptData);
            }
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.emit_char(pos, '\u{FFFD}');
                self.state = State::RawData(RawKind::ScriptDataEscaped(kind));
            }
            EOF => {
                self.error(error_code::EOF_IN_SCRIPT_HTML_COMMENT_LIKE_TEXT, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => {
                self.emit_char(pos, c);
                self.state = State::RawData(RawKind::ScriptDataEscaped(kind));
            }
        }
        false
    }

    fn step_raw_less_than_sign(&mut self, kind: RawKind, c: char, pos: Position) -> bool {
        match (kind, c) {
            (RawKind::ScriptData, '!') => {
                self.emit_char(pos, '<');
                self.emit_char(pos, '!');
                self.state = State::ScriptDataEscapeStart(ScriptEscapeKind::Escaped);
            }
            (_, '/') => {
                self.temp_buffer.clear();
                self.state = State::RawEndTagOpen(kind);
            }
            (RawKind::ScriptDataEscaped(ScriptEscapeKind::Escaped), c) if c.is_ascii_alphabetic() => {
                self.emit_char(pos, '<');
                self.temp_buffer.clear();
                self.source.reconsume();
                self.state = State::ScriptDataEscapeStart(ScriptEscapeKind::DoubleEscaped);
            }
            (_, _) => {
                self.emit_char(pos, '<');
                self.source.reconsume();
                self.state = State::RawData(kind);
            }
        }
        false
    }

    fn step_raw_end_tag_open(&mut self, kind: RawKind, c: char, pos: Position) -> bool {
        if c.is_ascii_alphabetic() {
            self.start_tag(pos, TagKind::EndTag);
            self.source.reconsume();
            self.state = State::RawEndTagName(kind);
        } else {
            self.emit_char(pos, '<');
            self.emit_char(pos, '/');
            self.source.reconsume();
            self.state = State::RawData(kind);
        }
        false
    }

    fn step_raw_end_tag_name(&mut self, kind: RawKind, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' if self.is_appropriate_end_tag() => {
                self.state = State::BeforeAttributeName;
            }
            '/' if self.is_appropriate_end_tag() => self.state = State::SelfClosingStartTag,
            '>' if self.is_appropriate_end_tag() => {
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            c if c.is_ascii_alphabetic() => {
                self.tag_name_mut().push(c.to_ascii_lowercase());
                self.temp_buffer.push(c);
            }
            _ => {
                self.current_tag = None;
                self.emit_char(pos, '<');
                self.emit_char(pos, '/');
                for ch in self.temp_buffer.clone().chars() {
                    self.emit_char(pos, ch);
                }
                self.source.reconsume();
                self.state = State::RawData(kind);
            }
        }
        false
    }

    fn step_script_data_escape_start(&mut self, kind: ScriptEscapeKind, c: char, pos: Position) -> bool {
        if c == '-' {
            self.emit_char(pos, '-');
            self.state = State::ScriptDataEscapeStartDash;
        } else {
            self.source.reconsume();
            self.state = match kind {
                ScriptEscapeKind::Escaped => State::RawData(RawKind::ScriptData),
                ScriptEscapeKind::DoubleEscaped => {
                    State::RawData(RawKind::ScriptDataEscaped(ScriptEscapeKind::Escaped))
                }
            };
        }
        false
    }

    fn step_script_data_escape_start_dash(&mut self, c: char, pos: Position) -> bool {
        if c == '-' {
            self.emit_char(pos, '-');
            self.state = State::ScriptDataEscapedDashDash(ScriptEscapeKind::Escaped);
        } else {
            self.source.reconsume();
            self.state = State::RawData(RawKind::ScriptData);
        }
        false
    }

    fn step_script_data_double_escape_end(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' | '/' | '>' => {
                let matches = self.temp_buffer.eq_ignore_ascii_case("script");
                self.emit_char(pos, c);
                self.state = State::RawData(RawKind::ScriptDataEscaped(if matches {
                    ScriptEscapeKind::Escaped
                } else {
                    ScriptEscapeKind::DoubleEscaped
                }));
            }
            c if c.is_ascii_alphabetic() => {
                self.temp_buffer.push(c.to_ascii_lowercase());
                self.emit_char(pos, c);
            }
            _ => {
                self.source.reconsume();
                self.state = State::RawData(RawKind::ScriptDataEscaped(ScriptEscapeKind::DoubleEscaped));
            }
        }
        false
    }

    // ---- Tag open / name / attributes -------------------------------------

    fn step_tag_open(&mut self, c: char, pos: Position) -> bool {
        match c {
            '!' => self.state = State::MarkupDeclarationOpen,
            '/' => self.state = State::EndTagOpen,
            c if c.is_ascii_alphabetic() => {
                self.start_tag(pos, TagKind::StartTag);
                self.source.reconsume();
                self.state = State::TagName;
            }
            '?' => {
                self.error(error_code::UNEXPECTED_QUESTION_MARK_INSTEAD_OF_TAG_NAME, pos, None);
                self.current_comment.clear();
                self.source.reconsume();
                self.state = State::BogusComment;
            }
            EOF => {
                self.error(error_code::EOF_BEFORE_TAG_NAME, pos, None);
                self.emit_char(pos, '<');
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::INVALID_FIRST_CHARACTER_OF_TAG_NAME, pos, None);
                self.emit_char(pos, '<');
                self.source.reconsume();
                self.state = State::Data;
            }
        }
        false
    }

    fn step_end_tag_open(&mut self, c: char, pos: Position) -> bool {
        match c {
            c if c.is_ascii_alphabetic() => {
                self.start_tag(pos, TagKind::EndTag);
                self.source.reconsume();
                self.state = State::TagName;
            }
            '>' => {
                self.error(error_code::MISSING_END_TAG_NAME, pos, None);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_BEFORE_TAG_NAME, pos, None);
                self.emit_char(pos, '<');
                self.emit_char(pos, '/');
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::INVALID_FIRST_CHARACTER_OF_TAG_NAME, pos, None);
                self.current_comment.clear();
                self.source.reconsume();
                self.state = State::BogusComment;
            }
        }
        false
    }

    fn step_tag_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => self.state = State::BeforeAttributeName,
            '/' => self.state = State::SelfClosingStartTag,
            '>' => {
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.tag_name_mut().push('\u{FFFD}');
            }
            EOF => {
                self.error(error_code::EOF_IN_TAG, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.tag_name_mut().push(c.to_ascii_lowercase()),
        }
        false
    }

    fn step_before_attribute_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '/' | '>' | EOF => {
                self.source.reconsume();
                self.state = State::AfterAttributeName;
            }
            '=' => {
                self.error(
                    error_code::UNEXPECTED_EQUALS_SIGN_BEFORE_ATTRIBUTE_NAME,
                    pos,
                    None,
                );
                self.start_attribute(pos);
                self.current_attr_name.push('=');
                self.state = State::AttributeName;
            }
            c => {
                self.start_attribute(pos);
                self.source.reconsume();
                self.state = State::AttributeName;
            }
        }
        false
    }

    fn step_attribute_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' | '/' | '>' | EOF => {
                self.source.reconsume();
                self.state = State::AfterAttributeName;
            }
            '=' => self.state = State::BeforeAttributeValue,
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.current_attr_name.push('\u{FFFD}');
            }
            '"' | '\'' | '<' => {
                self.error(error_code::UNEXPECTED_CHARACTER_IN_ATTRIBUTE_NAME, pos, None);
                self.current_attr_name.push(c);
            }
            c => self.current_attr_name.push(c.to_ascii_lowercase()),
        }
        false
    }

    fn step_after_attribute_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '/' => {
                self.finish_attribute();
                self.state = State::SelfClosingStartTag;
            }
            '=' => self.state = State::BeforeAttributeValue,
            '>' => {
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_TAG, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.finish_attribute();
                self.start_attribute(pos);
                self.source.reconsume();
                self.state = State::AttributeName;
            }
        }
        false
    }

    fn step_before_attribute_value(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '"' => self.state = State::AttributeValue(AttrValueKind::DoubleQuoted),
            '\'' => self.state = State::AttributeValue(AttrValueKind::SingleQuoted),
            '>' => {
                self.error(error_code::MISSING_ATTRIBUTE_VALUE, pos, None);
                self.finish_attribute();
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            _ => {
                self.source.reconsume();
                self.state = State::AttributeValue(AttrValueKind::Unquoted);
            }
        }
        false
    }

    fn step_attribute_value(&mut self, kind: AttrValueKind, c: char, pos: Position) -> bool {
        let terminator = match kind {
            AttrValueKind::DoubleQuoted => Some('"'),
            AttrValueKind::SingleQuoted => Some('\''),
            AttrValueKind::Unquoted => None,
        };
        if Some(c) == terminator {
            self.state = State::AfterAttributeValueQuoted;
            return false;
        }
        match (kind, c) {
            (_, '&') => {
                self.return_state = State::AttributeValue(kind);
                self.temp_buffer.clear();
                self.char_ref_pos = pos;
                self.state = State::CharacterReference;
            }
            (AttrValueKind::Unquoted, '>') => {
                self.finish_attribute();
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            (_, '\0') => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.current_attr_value.push('\u{FFFD}');
            }
            (AttrValueKind::Unquoted, '"' | '\'' | '<' | '=' | '`') => {
                self.error(
                    error_code::UNEXPECTED_CHARACTER_IN_UNQUOTED_ATTRIBUTE_VALUE,
                    pos,
                    None,
                );
                self.current_attr_value.push(c);
            }
            (AttrValueKind::Unquoted, '\t' | '\n' | '\u{000C}' | ' ') => {
                self.state = State::BeforeAttributeName;
            }
            (_, EOF) => {
                self.error(error_code::EOF_IN_TAG, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            (_, c) => self.current_attr_value.push(c),
        }
        false
    }

    fn step_after_attribute_value_quoted(&mut self, c: char, pos: Position) -> bool {
        self.finish_attribute();
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => self.state = State::BeforeAttributeName,
            '/' => self.state = State::SelfClosingStartTag,
            '>' => {
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_TAG, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::MISSING_WHITESPACE_BETWEEN_ATTRIBUTES, pos, None);
                self.source.reconsume();
                self.state = State::BeforeAttributeName;
            }
        }
        false
    }

    fn step_self_closing_start_tag(&mut self, c: char, pos: Position) -> bool {
        match c {
            '>' => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.self_closing = true;
                }
                self.emit_current_tag(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_TAG, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::UNEXPECTED_SOLIDUS_IN_TAG, pos, None);
                self.source.reconsume();
                self.state = State::BeforeAttributeName;
            }
        }
        false
    }

    // ---- Bogus comment / markup declaration open --------------------------

    fn step_bogus_comment(&mut self, c: char, pos: Position) -> bool {
        match c {
            '>' => {
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.state = State::Data;
            }
            '\0' => self.current_comment.push('\u{FFFD}'),
            EOF => {
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.current_comment.push(c),
        }
        false
    }

    fn step_markup_declaration_open(&mut self, c: char, pos: Position) -> bool {
        // Two-character-plus lookahead collapsed into one state: the three
        // markup-declaration productions (`--`, `doctype`, `[CDATA[`) only
        // need to look ahead, never reconsume more than the teacher's
        // `BufferQueue::eat` does here.
        if c == '-' && self.source.peek(0) == '-' {
            self.source.advance(1);
            self.current_comment.clear();
            self.state = State::CommentStart;
            return false;
        }
        let rest7: String = (0..6).map(|k| self.source.peek(k)).collect();
        if c.to_ascii_lowercase() == 'd' && rest7.eq_ignore_ascii_case("octype") {
            self.source.advance(6);
            self.state = State::Doctype;
            return false;
        }
        let cdata6: String =
            std::iter::once(c).chain((0..6).map(|k| self.source.peek(k))).collect();
        if cdata6 == "[CDATA[" {
            self.source.advance(6);
            self.state = State::CdataSection;
            return false;
        }
        self.error(error_code::INCORRECTLY_OPENED_COMMENT, pos, None);
        self.current_comment.clear();
        self.source.reconsume();
        self.state = State::BogusComment;
        false
    }

    // ---- Comments ----------------------------------------------------------

    fn step_comment_start(&mut self, c: char, pos: Position) -> bool {
        match c {
            '-' => self.state = State::CommentStartDash,
            '>' => {
                self.error(error_code::ABRUPT_CLOSING_OF_EMPTY_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.state = State::Data;
            }
            _ => {
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    fn step_comment_start_dash(&mut self, c: char, pos: Position) -> bool {
        match c {
            '-' => self.state = State::CommentEnd,
            '>' => {
                self.error(error_code::ABRUPT_CLOSING_OF_EMPTY_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.current_comment.push('-');
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    fn step_comment(&mut self, c: char, pos: Position) -> bool {
        match c {
            '<' => {
                self.current_comment.push('<');
                self.state = State::CommentLessThanSign;
            }
            '-' => self.state = State::CommentEndDash,
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.current_comment.push('\u{FFFD}');
            }
            EOF => {
                self.error(error_code::EOF_IN_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.current_comment.push(c),
        }
        false
    }

    fn step_comment_less_than_sign(&mut self, c: char, pos: Position) -> bool {
        match c {
            '!' => {
                self.current_comment.push('!');
                self.state = State::CommentLessThanSignBang;
            }
            '<' => self.current_comment.push('<'),
            _ => {
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    fn step_comment_less_than_sign_bang(&mut self, c: char, pos: Position) -> bool {
        if c == '-' {
            self.state = State::CommentLessThanSignBangDash;
        } else {
            self.source.reconsume();
            self.state = State::Comment;
        }
        let _ = pos;
        false
    }

    fn step_comment_less_than_sign_bang_dash(&mut self, c: char, pos: Position) -> bool {
        if c == '-' {
            self.state = State::CommentLessThanSignBangDashDash;
        } else {
            self.source.reconsume();
            self.state = State::CommentEndDash;
        }
        let _ = pos;
        false
    }

    fn step_comment_less_than_sign_bang_dash_dash(&mut self, c: char, pos: Position) -> bool {
        if c != '>' && c != EOF {
            self.error(error_code::NESTED_COMMENT, pos, None);
        }
        self.source.reconsume();
        self.state = State::CommentEnd;
        false
    }

    fn step_comment_end_dash(&mut self, c: char, pos: Position) -> bool {
        match c {
            '-' => self.state = State::CommentEnd,
            EOF => {
                self.error(error_code::EOF_IN_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.current_comment.push('-');
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    fn step_comment_end(&mut self, c: char, pos: Position) -> bool {
        match c {
            '>' => {
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.state = State::Data;
            }
            '!' => self.state = State::CommentEndBang,
            '-' => self.current_comment.push('-'),
            EOF => {
                self.error(error_code::EOF_IN_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.current_comment.push('-');
                self.current_comment.push('-');
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    fn step_comment_end_bang(&mut self, c: char, pos: Position) -> bool {
        match c {
            '-' => {
                self.current_comment.push('-');
                self.current_comment.push('-');
                self.current_comment.push('!');
                self.state = State::CommentEndDash;
            }
            '>' => {
                self.error(error_code::INCORRECTLY_CLOSED_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_COMMENT, pos, None);
                let text = std::mem::take(&mut self.current_comment);
                self.emit_token(pos, Token::Comment(text));
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.current_comment.push('-');
                self.current_comment.push('-');
                self.current_comment.push('!');
                self.source.reconsume();
                self.state = State::Comment;
            }
        }
        false
    }

    // ---- DOCTYPE -------------------------------------------------------

    fn step_doctype(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => self.state = State::BeforeDoctypeName,
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::MISSING_WHITESPACE_BEFORE_DOCTYPE_NAME, pos, None);
                self.source.reconsume();
                self.state = State::BeforeDoctypeName;
            }
        }
        false
    }

    fn emit_doctype(&mut self, pos: Position) {
        let dt = std::mem::take(&mut self.current_doctype);
        self.emit_token(pos, Token::Doctype(dt));
    }

    fn step_before_doctype_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.current_doctype.name = Some("\u{FFFD}".to_string());
                self.state = State::DoctypeName;
            }
            '>' => {
                self.error(error_code::MISSING_DOCTYPE_NAME, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => {
                self.current_doctype.name = Some(c.to_ascii_lowercase().to_string());
                self.state = State::DoctypeName;
            }
        }
        false
    }

    fn step_doctype_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => self.state = State::AfterDoctypeName,
            '>' => {
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.current_doctype.name.get_or_insert_with(String::new).push('\u{FFFD}');
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => {
                self.current_doctype
                    .name
                    .get_or_insert_with(String::new)
                    .push(c.to_ascii_lowercase());
            }
        }
        false
    }

    fn step_after_doctype_name(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '>' => {
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c if c.to_ascii_lowercase() == 'p' => {
                let rest5: String = (0..5).map(|k| self.source.peek(k)).collect();
                if rest5.eq_ignore_ascii_case("ublic") {
                    self.source.advance(5);
                    self.state = State::AfterDoctypeKeyword(DoctypeIdKind::Public);
                } else {
                    self.bogus_doctype_from_here(pos);
                }
            }
            c if c.to_ascii_lowercase() == 's' => {
                let rest5: String = (0..5).map(|k| self.source.peek(k)).collect();
                if rest5.eq_ignore_ascii_case("ystem") {
                    self.source.advance(5);
                    self.state = State::AfterDoctypeKeyword(DoctypeIdKind::System);
                } else {
                    self.bogus_doctype_from_here(pos);
                }
            }
            _ => self.bogus_doctype_from_here(pos),
        }
        false
    }

    fn bogus_doctype_from_here(&mut self, pos: Position) {
        // WHATWG's "anything else" branch here sets force-quirks and
        // reconsumes in the bogus DOCTYPE state; covers malformed
        // PUBLIC/SYSTEM keywords uniformly.
        let _ = pos;
        self.current_doctype.force_quirks = true;
        self.source.reconsume();
        self.state = State::BogusDoctype;
    }

    fn step_after_doctype_keyword(&mut self, kind: DoctypeIdKind, c: char, pos: Position) -> bool {
        let (missing_ws, abrupt) = match kind {
            DoctypeIdKind::Public => (
                error_code::MISSING_WHITESPACE_AFTER_DOCTYPE_PUBLIC_KEYWORD,
                error_code::ABRUPT_DOCTYPE_PUBLIC_IDENTIFIER,
            ),
            DoctypeIdKind::System => (
                error_code::MISSING_WHITESPACE_AFTER_DOCTYPE_SYSTEM_KEYWORD,
                error_code::ABRUPT_DOCTYPE_SYSTEM_IDENTIFIER,
            ),
        };
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => self.state = State::BeforeDoctypeIdentifier(kind),
            '"' => {
                self.error(missing_ws, pos, None);
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierDoubleQuoted(kind);
            }
            '\'' => {
                self.error(missing_ws, pos, None);
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierSingleQuoted(kind);
            }
            '>' => {
                self.error(abrupt, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(
                    match kind {
                        DoctypeIdKind::Public => {
                            error_code::MISSING_QUOTE_BEFORE_DOCTYPE_PUBLIC_IDENTIFIER
                        }
                        DoctypeIdKind::System => {
                            error_code::MISSING_QUOTE_BEFORE_DOCTYPE_SYSTEM_IDENTIFIER
                        }
                    },
                    pos,
                    None,
                );
                self.bogus_doctype_from_here(pos);
            }
        }
        false
    }

    fn step_before_doctype_identifier(&mut self, kind: DoctypeIdKind, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '"' => {
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierDoubleQuoted(kind);
            }
            '\'' => {
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierSingleQuoted(kind);
            }
            '>' => {
                self.error(
                    match kind {
                        DoctypeIdKind::Public => error_code::ABRUPT_DOCTYPE_PUBLIC_IDENTIFIER,
                        DoctypeIdKind::System => error_code::ABRUPT_DOCTYPE_SYSTEM_IDENTIFIER,
                    },
                    pos,
                    None,
                );
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(
                    match kind {
                        DoctypeIdKind::Public => {
                            error_code::MISSING_QUOTE_BEFORE_DOCTYPE_PUBLIC_IDENTIFIER
                        }
                        DoctypeIdKind::System => {
                            error_code::MISSING_QUOTE_BEFORE_DOCTYPE_SYSTEM_IDENTIFIER
                        }
                    },
                    pos,
                    None,
                );
                self.bogus_doctype_from_here(pos);
            }
        }
        false
    }

    fn step_doctype_identifier_quoted(
        &mut self,
        kind: DoctypeIdKind,
        quote: char,
        c: char,
        pos: Position,
    ) -> bool {
        match c {
            c if c == quote => {
                let id = std::mem::take(&mut self.doctype_id_buf);
                match kind {
                    DoctypeIdKind::Public => self.current_doctype.public_id = Some(id),
                    DoctypeIdKind::System => self.current_doctype.system_id = Some(id),
                }
                self.state = State::AfterDoctypeIdentifier(kind);
            }
            '\0' => {
                self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None);
                self.doctype_id_buf.push('\u{FFFD}');
            }
            '>' => {
                self.error(
                    match kind {
                        DoctypeIdKind::Public => error_code::ABRUPT_DOCTYPE_PUBLIC_IDENTIFIER,
                        DoctypeIdKind::System => error_code::ABRUPT_DOCTYPE_SYSTEM_IDENTIFIER,
                    },
                    pos,
                    None,
                );
                self.current_doctype.force_quirks = true;
                let id = std::mem::take(&mut self.doctype_id_buf);
                match kind {
                    DoctypeIdKind::Public => self.current_doctype.public_id = Some(id),
                    DoctypeIdKind::System => self.current_doctype.system_id = Some(id),
                }
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.doctype_id_buf.push(c),
        }
        false
    }

    fn step_after_doctype_identifier(&mut self, kind: DoctypeIdKind, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '>' => {
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            '"' | '\'' if kind == DoctypeIdKind::Public => {
                self.error(
                    error_code::MISSING_WHITESPACE_BETWEEN_DOCTYPE_PUBLIC_AND_SYSTEM_IDENTIFIERS,
                    pos,
                    None,
                );
                self.doctype_id_buf.clear();
                self.state = if c == '"' {
                    State::DoctypeIdentifierDoubleQuoted(DoctypeIdKind::System)
                } else {
                    State::DoctypeIdentifierSingleQuoted(DoctypeIdKind::System)
                };
            }
            _ => {
                self.error(
                    error_code::UNEXPECTED_CHARACTER_AFTER_DOCTYPE_SYSTEM_IDENTIFIER,
                    pos,
                    None,
                );
                self.bogus_doctype_from_here(pos);
            }
        }
        false
    }

    fn step_between_doctype_public_and_system_identifiers(&mut self, c: char, pos: Position) -> bool {
        match c {
            '\t' | '\n' | '\u{000C}' | ' ' => {}
            '>' => {
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            '"' => {
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierDoubleQuoted(DoctypeIdKind::System);
            }
            '\'' => {
                self.doctype_id_buf.clear();
                self.state = State::DoctypeIdentifierSingleQuoted(DoctypeIdKind::System);
            }
            EOF => {
                self.error(error_code::EOF_IN_DOCTYPE, pos, None);
                self.current_doctype.force_quirks = true;
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {
                self.error(error_code::ABRUPT_DOCTYPE_SYSTEM_IDENTIFIER, pos, None);
                self.bogus_doctype_from_here(pos);
            }
        }
        false
    }

    fn step_bogus_doctype(&mut self, c: char, pos: Position) -> bool {
        match c {
            '>' => {
                self.emit_doctype(pos);
                self.state = State::Data;
            }
            '\0' => self.error(error_code::UNEXPECTED_NULL_CHARACTER, pos, None),
            EOF => {
                self.emit_doctype(pos);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            _ => {}
        }
        false
    }

    // ---- CDATA -------------------------------------------------------------

    fn step_cdata_section(&mut self, c: char, pos: Position) -> bool {
        match c {
            ']' => self.state = State::CdataSectionBracket,
            EOF => {
                self.error(error_code::EOF_IN_CDATA, pos, None);
                self.emit_token(pos, Token::Eof);
                return true;
            }
            c => self.emit_char(pos, c),
        }
        false
    }

    fn step_cdata_section_bracket(&mut self, c: char, pos: Position) -> bool {
        if c == ']' {
            self.state = State::CdataSectionEnd;
        } else {
            self.emit_char(pos, ']');
            self.source.reconsume();
            self.state = State::CdataSection;
        }
        false
    }

    fn step_cdata_section_end(&mut self, c: char, pos: Position) -> bool {
        match c {
            ']' => self.emit_char(pos, ']'),
            '>' => self.state = State::Data,
            _ => {
                self.emit_char(pos, ']');
                self.emit_char(pos, ']');
                self.source.reconsume();
                self.state = State::CdataSection;
            }
        }
        false
    }

    // ---- Character references ----------------------------------------------

    fn step_character_reference(&mut self, c: char, pos: Position) -> bool {
        // Condenses the WHATWG "character reference", "named character
        // reference", "ambiguous ampersand", "numeric character reference"
        // and "hexadecimal/decimal character reference start/digits/end"
        // states into a single state handled eagerly: the return-state
        // dispatch loop above still runs between each resumed consumption,
        // preserving interleaving with whatever interrupted the reference
        // (e.g. a sink-driven content model switch can't happen mid-reference
        // since references never reach the tree builder).
        self.temp_buffer.push('&');
        if c == '#' {
            self.temp_buffer.push('#');
            return self.numeric_character_reference();
        }
        self.source.reconsume();
        let rest: String = {
            let mut s = String::new();
            let mut k = 0;
            loop {
                let ch = self.source.peek(k);
                if ch == EOF || k > 40 {
                    break;
                }
                s.push(ch);
                k += 1;
            }
            s
        };
        let in_attribute = matches!(self.return_state, State::AttributeValue(_));
        match char_ref::resolve_named(&rest, in_attribute, |i| rest.chars().nth(i)) {
            Some((len, expansion, had_semicolon)) => {
                self.source.advance(len);
                if !had_semicolon {
                    self.error(
                        error_code::MISSING_SEMICOLON_AFTER_CHARACTER_REFERENCE,
                        self.char_ref_pos,
                        None,
                    );
                }
                self.flush_reference_expansion(expansion, pos);
            }
            None => {
                self.error(
                    error_code::UNKNOWN_NAMED_CHARACTER_REFERENCE,
                    self.char_ref_pos,
                    None,
                );
                self.flush_reference_expansion("&", pos);
            }
        }
        self.state = self.return_state;
        false
    }

    fn flush_reference_expansion(&mut self, expansion: &str, pos: Position) {
        if matches!(self.return_state, State::AttributeValue(_)) {
            self.current_attr_value.push_str(expansion);
        } else {
            for ch in expansion.chars() {
                self.emit_char(pos, ch);
            }
        }
    }

    fn numeric_character_reference(&mut self) -> bool {
        let start_pos = self.char_ref_pos;
        self.char_ref_code = 0;
        let hex = matches!(self.source.peek(0), 'x' | 'X');
        if hex {
            self.source.advance(1);
        }
        let mut digits = 0u32;
        loop {
            let c = self.source.peek(0);
            let digit = if hex { c.to_digit(16) } else { c.to_digit(10) };
            match digit {
                Some(d) => {
                    self.char_ref_code = self.char_ref_code.saturating_mul(if hex { 16 } else { 10 }) + d;
                    self.source.advance(1);
                    digits += 1;
                }
                None => break,
            }
        }
        if digits == 0 {
            self.error(
                error_code::ABSENCE_OF_DIGITS_IN_NUMERIC_CHARACTER_REFERENCE,
                start_pos,
                None,
            );
            self.flush_reference_expansion(&self.temp_buffer.clone(), start_pos);
            self.state = self.return_state;
            return false;
        }
        let had_semicolon = self.source.peek(0) == ';';
        if had_semicolon {
            self.source.advance(1);
        } else {
            self.error(
                error_code::MISSING_SEMICOLON_AFTER_CHARACTER_REFERENCE,
                start_pos,
                None,
            );
        }
        let (resolved, err) = char_ref::resolve_numeric(self.char_ref_code);
        if err != char_ref::NumericRefError::None {
            self.error(numeric_error_code(err), start_pos, None);
        }
        let mut s = String::new();
        s.push(resolved);
        self.flush_reference_expansion(&s, start_pos);
        self.state = self.return_state;
        false
    }
}

fn numeric_error_code(err: char_ref::NumericRefError) -> u32 {
    use char_ref::NumericRefError::*;
    match err {
        None => 0,
        NullCharacterReference => error_code::UNEXPECTED_NULL_CHARACTER,
        CharacterReferenceOutsideUnicodeRange
        | SurrogateCharacterReference
        | NoncharacterCharacterReference
        | ControlCharacterReference => error_code::UNKNOWN_NAMED_CHARACTER_REFERENCE,
        MissingSemicolonAfterCharacterReference => {
            error_code::MISSING_SEMICOLON_AFTER_CHARACTER_REFERENCE
        }
    }
}

