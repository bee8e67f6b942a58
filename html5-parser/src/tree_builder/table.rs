// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The table-related insertion modes (spec §4.7): "in table" down through
//! "in cell", plus "in select"/"in select in table". These are where
//! foster parenting kicks in — misplaced content gets redirected to just
//! before the table rather than inside it.

use dom_core::dom::arena_sink::{NodeOrText, TreeSink};
use dom_core::source::Position;

use crate::tokenizer::interface::{Tag, TagKind, Token};

use super::modes::InsertionMode;
use super::{error_code, StepOutcome, TreeBuilder};

impl<'a, S: TreeSink> TreeBuilder<'a, S> {
    pub(super) fn step_in_table(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(_) if matches!(self.current_name(), "table" | "tbody" | "tfoot" | "thead" | "tr") => {
                self.original_mode = self.mode;
                self.mode = InsertionMode::InTableText;
                self.reprocess(token)
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in table");
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "caption" => {
                self.clear_stack_back_to_table_context();
                self.active_formatting.push(super::FormattingEntry::Marker);
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InCaption;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "colgroup" => {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InColumnGroup;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "col" => {
                self.clear_stack_back_to_table_context();
                let colgroup = Tag { kind: TagKind::StartTag, name: "colgroup".to_string(), self_closing: false, attrs: Vec::new() };
                self.insert_html_element(&colgroup);
                self.mode = InsertionMode::InColumnGroup;
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InTableBody;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "td" | "th" | "tr") => {
                self.clear_stack_back_to_table_context();
                let tbody = Tag { kind: TagKind::StartTag, name: "tbody".to_string(), self_closing: false, attrs: Vec::new() };
                self.insert_html_element(&tbody);
                self.mode = InsertionMode::InTableBody;
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "table" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "nested table");
                if !self.has_in_table_scope("table") {
                    return self.done();
                }
                self.pop_until("table");
                self.reset_insertion_mode();
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "table" => {
                if !self.has_in_table_scope("table") {
                    self.error(pos, error_code::STRAY_END_TAG, "table");
                    return self.done();
                }
                self.pop_until("table");
                self.reset_insertion_mode();
                self.done()
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                            | "thead" | "tr"
                    ) =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "style" | "script" | "template") =>
            {
                self.step_in_head(token, pos)
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "template" => self.step_in_head(token, pos),
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "input" => {
                let is_hidden = tag
                    .get_attribute("type")
                    .map(|v| v.eq_ignore_ascii_case("hidden"))
                    .unwrap_or(false);
                if !is_hidden {
                    self.error(pos, error_code::UNEXPECTED_START_TAG, "input in table");
                    self.foster_parenting = true;
                    let outcome = self.step_in_body(Token::Tag(tag), pos);
                    self.foster_parenting = false;
                    outcome
                } else {
                    self.error(pos, error_code::UNEXPECTED_START_TAG, "input[hidden] in table");
                    self.insert_html_element(&tag);
                    self.pop();
                    self.done()
                }
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "form" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "form in table");
                if self.form_element.is_some() || self.open_names.iter().any(|n| n == "template") {
                    return self.done();
                }
                let node = self.insert_html_element(&tag);
                self.form_element = Some(node);
                self.pop();
                self.done()
            }
            Token::Eof => self.step_in_body(Token::Eof, pos),
            other => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "foster-parented content");
                self.foster_parenting = true;
                let outcome = self.step_in_body(other, pos);
                self.foster_parenting = false;
                outcome
            }
        }
    }

    fn clear_stack_back_to_table_context(&mut self) {
        while !matches!(self.current_name(), "table" | "template" | "html") {
            self.pop();
        }
    }

    fn clear_stack_back_to_table_body_context(&mut self) {
        while !matches!(self.current_name(), "tbody" | "tfoot" | "thead" | "template" | "html") {
            self.pop();
        }
    }

    fn clear_stack_back_to_table_row_context(&mut self) {
        while !matches!(self.current_name(), "tr" | "template" | "html") {
            self.pop();
        }
    }

    pub(super) fn step_in_table_text(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if !text.contains('\0') => {
                self.pending_table_text.push_str(text);
                self.done()
            }
            Token::Character(_) => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "null character in table text");
                self.done()
            }
            other => {
                let pending = std::mem::take(&mut self.pending_table_text);
                if !pending.is_empty() {
                    if pending.chars().all(|c| matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')) {
                        self.insert_text(pending);
                    } else {
                        self.error(pos, error_code::UNEXPECTED_START_TAG, "non-whitespace table text");
                        self.foster_parenting = true;
                        self.insert_text(pending);
                        self.foster_parenting = false;
                    }
                }
                self.mode = self.original_mode;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_in_caption(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "caption" => {
                if !self.has_in_table_scope("caption") {
                    self.error(pos, error_code::STRAY_END_TAG, "caption");
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_name() != "caption" {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "caption");
                }
                self.pop_until("caption");
                self.clear_active_formatting_to_last_marker();
                self.mode = InsertionMode::InTable;
                self.done()
            }
            Token::Tag(ref tag)
                if (tag.kind == TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ))
                    || (tag.kind != TagKind::StartTag && tag.name == "table") =>
            {
                if !self.has_in_table_scope("caption") {
                    self.error(pos, error_code::STRAY_END_TAG, "caption");
                    return self.done();
                }
                self.pop_until("caption");
                self.clear_active_formatting_to_last_marker();
                self.mode = InsertionMode::InTable;
                self.reprocess(token)
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag
                    && matches!(tag.name.as_str(), "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => self.step_in_body(other, pos),
        }
    }

    pub(super) fn step_in_column_group(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(ref text) if text.chars().all(|c| matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')) => {
                self.insert_text(text.clone());
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in colgroup");
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "col" => {
                self.insert_html_element(&tag);
                self.pop();
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "colgroup" => {
                if self.current_name() != "colgroup" {
                    self.error(pos, error_code::STRAY_END_TAG, "colgroup");
                    return self.done();
                }
                self.pop();
                self.mode = InsertionMode::InTable;
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "col" => {
                self.error(pos, error_code::STRAY_END_TAG, "col");
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "template" => self.step_in_head(token, pos),
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && tag.name == "template" => self.step_in_head(token, pos),
            Token::Eof => self.step_in_body(token, pos),
            other => {
                if self.current_name() != "colgroup" {
                    self.error(pos, error_code::STRAY_END_TAG, "colgroup content");
                    return self.done();
                }
                self.pop();
                self.mode = InsertionMode::InTable;
                self.reprocess(other)
            }
        }
    }

    pub(super) fn step_in_table_body(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "tr" => {
                self.clear_stack_back_to_table_body_context();
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InRow;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "th" | "td") => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, tag.name.clone());
                self.clear_stack_back_to_table_body_context();
                let tr = Tag { kind: TagKind::StartTag, name: "tr".to_string(), self_closing: false, attrs: Vec::new() };
                self.insert_html_element(&tr);
                self.mode = InsertionMode::InRow;
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(ref tag)
                if (tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead"))
                    || (tag.kind == TagKind::StartTag
                        && matches!(tag.name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"))
                    || (tag.kind != TagKind::StartTag && tag.name == "table") =>
            {
                if !self.has_any_in_scope(&["tbody", "thead", "tfoot"]) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.clear_stack_back_to_table_body_context();
                self.pop();
                self.mode = InsertionMode::InTable;
                self.reprocess(token)
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag
                    && matches!(tag.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr") =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => self.step_in_table(other, pos),
        }
    }

    pub(super) fn step_in_row(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "th" | "td") => {
                self.clear_stack_back_to_table_row_context();
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InCell;
                self.active_formatting.push(super::FormattingEntry::Marker);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "tr" => {
                if !self.has_in_table_scope("tr") {
                    self.error(pos, error_code::STRAY_END_TAG, "tr");
                    return self.done();
                }
                self.clear_stack_back_to_table_row_context();
                self.pop();
                self.mode = InsertionMode::InTableBody;
                self.done()
            }
            Token::Tag(ref tag)
                if (tag.kind == TagKind::StartTag
                    && matches!(tag.name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"))
                    || (tag.kind != TagKind::StartTag && tag.name == "table") =>
            {
                if !self.has_in_table_scope("tr") {
                    self.error(pos, error_code::STRAY_END_TAG, "tr");
                    return self.done();
                }
                self.clear_stack_back_to_table_row_context();
                self.pop();
                self.mode = InsertionMode::InTableBody;
                self.reprocess(token)
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                if !self.has_in_table_scope(&tag.name) || !self.has_in_table_scope("tr") {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.clear_stack_back_to_table_row_context();
                self.pop();
                self.mode = InsertionMode::InTableBody;
                self.reprocess(token)
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag
                    && matches!(tag.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th") =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            other => self.step_in_table(other, pos),
        }
    }

    pub(super) fn step_in_cell(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "td" | "th") => {
                if !self.has_in_table_scope(&tag.name) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_name() != tag.name {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, tag.name.clone());
                }
                self.pop_until(&tag.name);
                self.clear_active_formatting_to_last_marker();
                self.mode = InsertionMode::InRow;
                self.done()
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ) =>
            {
                if !self.has_any_in_scope(&["td", "th"]) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.close_current_cell();
                self.reprocess(token)
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.has_in_table_scope(&tag.name) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.close_current_cell();
                self.reprocess(token)
            }
            other => self.step_in_body(other, pos),
        }
    }

    fn close_current_cell(&mut self) {
        let cell = if self.has_in_table_scope("td") { "td" } else { "th" };
        self.generate_implied_end_tags(None);
        if self.current_name() != cell {
            self.error(Position::START, error_code::UNCLOSED_ELEMENTS, cell);
        }
        self.pop_until(cell);
        self.clear_active_formatting_to_last_marker();
        self.mode = InsertionMode::InRow;
    }

    pub(super) fn step_in_select(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(text) => {
                if text.contains('\0') {
                    self.error(pos, error_code::UNEXPECTED_START_TAG, "null character in select");
                } else {
                    self.insert_text(text);
                }
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in select");
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "html" => self.step_in_body(Token::Tag(tag), pos),
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "option" => {
                if self.current_name() == "option" {
                    self.pop();
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "optgroup" => {
                if self.current_name() == "option" {
                    self.pop();
                }
                if self.current_name() == "optgroup" {
                    self.pop();
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "optgroup" => {
                if self.current_name() == "option" && self.open_names.len() >= 2 && self.open_names[self.open_names.len() - 2] == "optgroup" {
                    self.pop();
                }
                if self.current_name() == "optgroup" {
                    self.pop();
                } else {
                    self.error(pos, error_code::STRAY_END_TAG, "optgroup");
                }
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "option" => {
                if self.current_name() == "option" {
                    self.pop();
                } else {
                    self.error(pos, error_code::STRAY_END_TAG, "option");
                }
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "select" => {
                if !self.open_names.contains(&"select".to_string()) {
                    self.error(pos, error_code::STRAY_END_TAG, "select");
                    return self.done();
                }
                self.pop_until("select");
                self.reset_insertion_mode();
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "select" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "nested select");
                self.pop_until("select");
                self.reset_insertion_mode();
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "input" | "keygen" | "textarea") =>
            {
                self.error(pos, error_code::UNEXPECTED_START_TAG, tag.name.clone());
                if !self.open_names.contains(&"select".to_string()) {
                    return self.done();
                }
                self.pop_until("select");
                self.reset_insertion_mode();
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "script" | "template") => {
                self.step_in_head(Token::Tag(tag), pos)
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "template" => self.step_in_head(token, pos),
            Token::Eof => self.step_in_body(Token::Eof, pos),
            _ => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "content in select");
                self.done()
            }
        }
    }

    pub(super) fn step_in_select_in_table(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag
                    && matches!(tag.name.as_str(), "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                self.error(pos, error_code::UNEXPECTED_START_TAG, tag.name.clone());
                self.pop_until("select");
                self.reset_insertion_mode();
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(ref tag)
                if tag.kind != TagKind::StartTag
                    && matches!(tag.name.as_str(), "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                if !self.has_in_table_scope(&tag.name) {
                    return self.done();
                }
                self.pop_until("select");
                self.reset_insertion_mode();
                self.reprocess(token)
            }
            other => self.step_in_select(other, pos),
        }
    }
}
