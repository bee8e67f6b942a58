// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The insertion modes (spec §4.7), and the per-mode token-handling methods
//! on [`super::TreeBuilder`].

use dom_core::dom::arena_sink::{ElementFlags, NodeOrText, TreeSink};
use dom_core::dom::node::NodeId;
use dom_core::source::Position;
use dom_core::QualName;

use crate::tokenizer::interface::{Tag, TagKind, Token, TokenSinkResult};
use crate::tokenizer::states::RawKind;

use super::{error_code, is_formatting, is_void, FormattingEntry, StepOutcome, TreeBuilder};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

/// Is `c` one of the five ASCII whitespace characters the spec treats
/// specially in "character tokens" branches?
fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')
}

impl<'a, S: TreeSink> TreeBuilder<'a, S> {
    fn is_start(tag: &Tag) -> bool {
        matches!(tag.kind, TagKind::StartTag)
    }

    pub(super) fn step_initial(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.done(),
            Token::Comment(text) => {
                let node = self.sink.create_comment(text);
                let document = self.sink.get_document();
                self.sink.append(document, NodeOrText::Node(node));
                self.done()
            }
            Token::Doctype(dt) => {
                self.handle_doctype_in_initial(dt, pos);
                self.done()
            }
            other => {
                self.quirks_mode = dom_core::dom::node::QuirksMode::Quirks;
                self.sink.set_quirks_mode(self.quirks_mode);
                self.mode = InsertionMode::BeforeHtml;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_before_html(&mut self, token: Token, _pos: Position) -> StepOutcome {
        match token {
            Token::Doctype(_) => self.done(),
            Token::Comment(text) => {
                let node = self.sink.create_comment(text);
                let document = self.sink.get_document();
                self.sink.append(document, NodeOrText::Node(node));
                self.done()
            }
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.done(),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => {
                let document = self.sink.get_document();
                let node = self.sink.create_element(QualName::html("html"), tag.attrs, ElementFlags::default());
                self.sink.append(document, NodeOrText::Node(node));
                self.push("html", node);
                self.mode = InsertionMode::BeforeHead;
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") => {
                self.done()
            }
            other => {
                let document = self.sink.get_document();
                let node = self.sink.create_element(QualName::html("html"), Vec::new(), ElementFlags::default());
                self.sink.append(document, NodeOrText::Node(node));
                self.push("html", node);
                self.mode = InsertionMode::BeforeHead;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_before_head(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.done(),
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in before-head");
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "head" => {
                let node = self.insert_html_element(&tag);
                self.head_element = Some(node);
                self.mode = InsertionMode::InHead;
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") => {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => {
                let tag = Tag { kind: TagKind::StartTag, name: "head".to_string(), self_closing: false, attrs: Vec::new() };
                let node = self.insert_html_element(&tag);
                self.head_element = Some(node);
                self.mode = InsertionMode::InHead;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_in_head(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => {
                self.insert_text(text.clone());
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in head");
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if Self::is_start(&tag) && matches!(tag.name.as_str(), "base" | "basefont" | "bgsound" | "link" | "meta") => {
                self.insert_html_element(&tag);
                self.pop();
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "title" => {
                self.insert_html_element(&tag);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(RawKind::Rcdata))
            }
            Token::Tag(tag) if Self::is_start(&tag) && (tag.name == "noframes" || tag.name == "style") => {
                self.insert_html_element(&tag);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(RawKind::Rawtext))
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "noscript" && self.opts.scripting_enabled => {
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InHeadNoscript;
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "noscript" => {
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "script" => {
                let node = self.insert_html_element(&tag);
                self.sink.mark_script_already_started(node);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(RawKind::ScriptData))
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "head" => {
                self.pop();
                self.mode = InsertionMode::AfterHead;
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && matches!(tag.name.as_str(), "body" | "html" | "br") => {
                self.pop();
                self.mode = InsertionMode::AfterHead;
                self.reprocess(token)
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "template" => {
                self.insert_html_element(&tag);
                self.active_formatting.push(FormattingEntry::Marker);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTemplate;
                self.template_modes.push(InsertionMode::InTemplate);
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "template" => {
                if !self.open_names.iter().any(|n| n == "template") {
                    self.error(pos, error_code::STRAY_END_TAG, "template");
                    return self.done();
                }
                self.generate_implied_end_tags_thoroughly();
                self.pop_until("template");
                self.clear_active_formatting_to_last_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "head" => {
                self.error(pos, error_code::MISPLACED_HEAD, "head");
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) => {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => {
                self.pop();
                self.mode = InsertionMode::AfterHead;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_in_head_noscript(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "noscript" => {
                self.pop();
                self.mode = InsertionMode::InHead;
                self.done()
            }
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.step_in_head(token, pos),
            Token::Comment(_) => self.step_in_head(token, pos),
            Token::Tag(ref tag) if Self::is_start(tag) && matches!(tag.name.as_str(), "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style") => {
                self.step_in_head(token, pos)
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "br" => {
                self.pop();
                self.mode = InsertionMode::InHead;
                self.reprocess(token)
            }
            Token::Tag(tag) if Self::is_start(&tag) && matches!(tag.name.as_str(), "head" | "noscript") => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, tag.name);
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) => {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "noscript content");
                self.pop();
                self.mode = InsertionMode::InHead;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_after_head(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => {
                self.insert_text(text.clone());
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype after head");
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "body" => {
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.mode = InsertionMode::InBody;
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "frameset" => {
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InFrameset;
                self.done()
            }
            Token::Tag(tag)
                if Self::is_start(&tag)
                    && matches!(
                        tag.name.as_str(),
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
                            | "template" | "title"
                    ) =>
            {
                self.error(pos, error_code::MISPLACED_HEAD, tag.name.clone());
                if let Some(head) = self.head_element {
                    self.push("head", head);
                    let outcome = self.step_in_head(Token::Tag(tag), pos);
                    self.pop();
                    outcome
                } else {
                    self.done()
                }
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "template" => self.step_in_head(token, pos),
            Token::Tag(ref tag) if !Self::is_start(tag) && matches!(tag.name.as_str(), "body" | "html" | "br") => {
                let tag = Tag { kind: TagKind::StartTag, name: "body".to_string(), self_closing: false, attrs: Vec::new() };
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InBody;
                self.reprocess(token)
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "head" => {
                self.error(pos, error_code::MISPLACED_HEAD, "head");
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) => {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => {
                let tag = Tag { kind: TagKind::StartTag, name: "body".to_string(), self_closing: false, attrs: Vec::new() };
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InBody;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_text(&mut self, token: Token, _pos: Position) -> StepOutcome {
        match token {
            Token::Character(text) => {
                self.insert_text(text);
                self.done()
            }
            Token::Tag(ref tag) if !matches!(tag.kind, TagKind::StartTag) && tag.name == "script" => {
                self.pop();
                self.mode = self.original_mode;
                self.done()
            }
            Token::Tag(_) => {
                self.pop();
                self.mode = self.original_mode;
                self.done()
            }
            Token::Eof => {
                self.pop();
                self.mode = self.original_mode;
                self.reprocess(Token::Eof)
            }
            other => self.reprocess(other),
        }
    }

    pub(super) fn step_after_body(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.step_in_body(token, pos),
            Token::Comment(text) => {
                let html = self.open_elements[0];
                self.sink.append(html, NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => self.done(),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "html" => {
                self.mode = InsertionMode::AfterAfterBody;
                self.done()
            }
            Token::Eof => StepOutcome::Done(TokenSinkResult::Continue),
            other => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "content after body");
                self.mode = InsertionMode::InBody;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_in_frameset(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => {
                self.insert_text(text.clone());
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => self.done(),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "frameset" => {
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "frameset" => {
                if self.open_names.len() == 1 {
                    self.error(pos, error_code::STRAY_END_TAG, "frameset");
                    return self.done();
                }
                self.pop();
                if self.current_name() != "frameset" {
                    self.mode = InsertionMode::AfterFrameset;
                }
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "frame" => {
                self.insert_html_element(&tag);
                self.pop();
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "noframes" => self.step_in_head(Token::Tag(tag), pos),
            Token::Eof => {
                if self.open_names.len() != 1 {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "frameset at eof");
                }
                self.done()
            }
            other => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "content in frameset");
                let _ = other;
                self.done()
            }
        }
    }

    pub(super) fn step_after_frameset(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(is_whitespace) => {
                self.insert_text(text.clone());
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => self.done(),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(ref tag) if !Self::is_start(tag) && tag.name == "html" => {
                self.mode = InsertionMode::AfterAfterFrameset;
                self.done()
            }
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "noframes" => self.step_in_head(Token::Tag(tag), pos),
            Token::Eof => StepOutcome::Done(TokenSinkResult::Continue),
            other => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "content after frameset");
                let _ = other;
                self.done()
            }
        }
    }

    pub(super) fn step_after_after_body(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Comment(text) => {
                let document = self.sink.get_document();
                self.sink.append(document, NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => self.step_in_body(token, pos),
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.step_in_body(token, pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Eof => StepOutcome::Done(TokenSinkResult::Continue),
            other => {
                self.mode = InsertionMode::InBody;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_after_after_frameset(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Comment(text) => {
                let document = self.sink.get_document();
                self.sink.append(document, NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => self.step_in_body(token, pos),
            Token::Character(ref text) if text.chars().all(is_whitespace) => self.step_in_body(token, pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if Self::is_start(&tag) && tag.name == "noframes" => self.step_in_head(Token::Tag(tag), pos),
            Token::Eof => StepOutcome::Done(TokenSinkResult::Continue),
            _ => self.done(),
        }
    }
}
