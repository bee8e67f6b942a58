// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The "in body" insertion mode (spec §4.7) — the mode that handles the
//! bulk of ordinary HTML content — plus "in template", which mostly
//! delegates to whatever mode `<template>` would use outside a template.

use dom_core::dom::arena_sink::{NodeOrText, TreeSink};
use dom_core::source::Position;

use crate::tokenizer::interface::{Tag, TagKind, Token, TokenSinkResult};

use super::modes::InsertionMode;
use super::{error_code, FormattingEntry, StepOutcome, TreeBuilder};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Start tags that imply closing an open `<p>` in button scope (spec
/// §4.7 "in body" start-tag table, the large "address, article, ..."
/// group).
const P_CLOSING_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "main", "menu", "nav", "ol", "p", "section", "summary", "ul",
];

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')
}

impl<'a, S: TreeSink> TreeBuilder<'a, S> {
    pub(super) fn step_in_body(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(text) => {
                if text.contains('\0') {
                    self.error(pos, error_code::UNEXPECTED_START_TAG, "null character");
                }
                self.reconstruct_active_formatting_elements();
                if !text.chars().all(is_whitespace) {
                    self.frameset_ok = false;
                }
                self.insert_text(text);
                self.done()
            }
            Token::Comment(text) => {
                self.insert_node(NodeOrText::Node(self.sink.create_comment(text)));
                self.done()
            }
            Token::Doctype(_) => {
                self.error(pos, error_code::UNEXPECTED_DOCTYPE, "doctype in body");
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "html" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "html");
                if let Some(&html) = self.open_elements.first() {
                    self.sink.add_attrs_if_missing(html, tag.attrs);
                }
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
                            | "template" | "title"
                    ) =>
            {
                self.step_in_head(Token::Tag(tag), pos)
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "template" => {
                self.step_in_head(token, pos)
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "body" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "body");
                if self.open_names.len() > 1 && self.open_names.get(1).map(String::as_str) == Some("body") {
                    let body = self.open_elements[1];
                    self.sink.add_attrs_if_missing(body, tag.attrs);
                    self.frameset_ok = false;
                }
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "frameset" => {
                if !self.frameset_ok || self.open_names.len() < 2 {
                    self.error(pos, error_code::UNEXPECTED_START_TAG, "frameset");
                    return self.done();
                }
                let body = self.open_elements[1];
                self.sink.remove_from_parent(body);
                self.open_elements.truncate(1);
                self.open_names.truncate(1);
                self.insert_html_element(&tag);
                self.mode = InsertionMode::InFrameset;
                self.done()
            }
            Token::Eof => {
                if !self.template_modes.is_empty() {
                    return self.step_in_template(Token::Eof, pos);
                }
                for name in &self.open_names {
                    if !matches!(
                        name.as_str(),
                        "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb" | "rp" | "rt" | "rtc"
                            | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" | "body" | "html"
                    ) {
                        self.error(pos, error_code::UNCLOSED_ELEMENTS, "elements still open at eof");
                        break;
                    }
                }
                self.done = true;
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "body" | "html") => {
                if !self.has_in_scope("body") {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                for name in &self.open_names {
                    if !matches!(
                        name.as_str(),
                        "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb" | "rp" | "rt" | "rtc"
                            | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" | "body" | "html"
                    ) {
                        self.error(pos, error_code::UNCLOSED_ELEMENTS, "elements still open at body close");
                        break;
                    }
                }
                self.mode = InsertionMode::AfterBody;
                if tag.name == "html" {
                    return self.reprocess(Token::Tag(tag.clone()));
                }
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag && P_CLOSING_TAGS.contains(&tag.name.as_str()) && tag.name != "p" =>
            {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                if HEADING_TAGS.contains(&self.current_name()) && HEADING_TAGS.contains(&tag.name.as_str()) {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "nested heading");
                    self.pop();
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "p" => {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "pre" | "listing") => {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.ignore_next_lf = true;
                self.frameset_ok = false;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "form" => {
                if self.form_element.is_some() && !self.open_names.iter().any(|n| n == "template") {
                    self.error(pos, error_code::NESTED_FORM, "form");
                    return self.done();
                }
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                let node = self.insert_html_element(&tag);
                if !self.open_names.iter().any(|n| n == "template") {
                    self.form_element = Some(node);
                }
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "li" | "dd" | "dt") => {
                self.frameset_ok = false;
                let is_li = tag.name == "li";
                for i in (0..self.open_names.len()).rev() {
                    let name = self.open_names[i].clone();
                    if (is_li && name == "li") || (!is_li && matches!(name.as_str(), "dd" | "dt")) {
                        self.generate_implied_end_tags(Some(&name));
                        if self.current_name() != name {
                            self.error(pos, error_code::UNCLOSED_ELEMENTS, name.clone());
                        }
                        self.pop_until(&name);
                        break;
                    }
                    if super::is_special(&name) && !matches!(name.as_str(), "address" | "div" | "p") {
                        break;
                    }
                }
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "plaintext" => {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                StepOutcome::Done(TokenSinkResult::ToPlaintext)
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "button" => {
                if self.has_in_scope("button") {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "nested button");
                    self.generate_implied_end_tags(None);
                    self.pop_until("button");
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && P_CLOSING_TAGS.contains(&tag.name.as_str()) && tag.name != "p" => {
                if !self.has_in_scope(&tag.name) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_name() != tag.name {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, tag.name.clone());
                }
                self.pop_until(&tag.name);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "form" => {
                if self.open_names.iter().any(|n| n == "template") {
                    if !self.has_in_scope("form") {
                        self.error(pos, error_code::STRAY_END_TAG, "form");
                        return self.done();
                    }
                    self.generate_implied_end_tags(None);
                    if self.current_name() != "form" {
                        self.error(pos, error_code::UNCLOSED_ELEMENTS, "form");
                    }
                    self.pop_until("form");
                    return self.done();
                }
                let Some(form) = self.form_element.take() else {
                    self.error(pos, error_code::STRAY_END_TAG, "form");
                    return self.done();
                };
                if !self.has_in_scope("form") {
                    self.error(pos, error_code::STRAY_END_TAG, "form");
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_node() != form {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "form");
                }
                if let Some(idx) = self.open_elements.iter().position(|n| *n == form) {
                    self.open_elements.remove(idx);
                    self.open_names.remove(idx);
                }
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "p" => {
                if !self.has_in_button_scope("p") {
                    self.error(pos, error_code::STRAY_END_TAG, "p");
                    let implicit = Tag { kind: TagKind::StartTag, name: "p".to_string(), self_closing: false, attrs: Vec::new() };
                    self.insert_html_element(&implicit);
                }
                self.close_p_element();
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "li" => {
                if !self.has_in_list_item_scope("li") {
                    self.error(pos, error_code::STRAY_END_TAG, "li");
                    return self.done();
                }
                self.generate_implied_end_tags(Some("li"));
                if self.current_name() != "li" {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, "li");
                }
                self.pop_until("li");
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "dd" | "dt") => {
                if !self.has_in_scope(&tag.name) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.generate_implied_end_tags(Some(&tag.name));
                if self.current_name() != tag.name {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, tag.name.clone());
                }
                self.pop_until(&tag.name);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && HEADING_TAGS.contains(&tag.name.as_str()) => {
                if !self.has_any_in_scope(HEADING_TAGS) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_name() != tag.name {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, tag.name.clone());
                }
                while let Some((name, _)) = self.pop() {
                    if HEADING_TAGS.contains(&name.as_str()) {
                        break;
                    }
                }
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && is_formatting(&tag.name) => {
                self.reconstruct_active_formatting_elements();
                let node = self.insert_html_element(&tag);
                self.push_formatting(node, tag);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && is_formatting(&tag.name) => {
                self.adoption_agency(&tag.name, pos);
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "applet" | "marquee" | "object") =>
            {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.active_formatting.push(FormattingEntry::Marker);
                self.frameset_ok = false;
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && matches!(tag.name.as_str(), "applet" | "marquee" | "object") => {
                if !self.has_in_scope(&tag.name) {
                    self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                    return self.done();
                }
                self.generate_implied_end_tags(None);
                if self.current_name() != tag.name {
                    self.error(pos, error_code::UNCLOSED_ELEMENTS, tag.name.clone());
                }
                self.pop_until(&tag.name);
                self.clear_active_formatting_to_last_marker();
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "table" => {
                if self.has_in_button_scope("p")
                    && !matches!(self.quirks_mode, dom_core::dom::node::QuirksMode::Quirks)
                {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag
                    && matches!(tag.name.as_str(), "area" | "br" | "embed" | "img" | "keygen" | "wbr") =>
            {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.pop();
                self.frameset_ok = false;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.clone());
                self.pop();
                let is_hidden = tag
                    .get_attribute("type")
                    .map(|v| v.eq_ignore_ascii_case("hidden"))
                    .unwrap_or(false);
                if !is_hidden {
                    self.frameset_ok = false;
                }
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "param" | "source" | "track") =>
            {
                self.insert_html_element(&tag);
                self.pop();
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "hr" => {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.insert_html_element(&tag);
                self.pop();
                self.frameset_ok = false;
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "image" => {
                self.error(pos, error_code::UNEXPECTED_START_TAG, "image");
                let mut tag = tag;
                tag.name = "img".to_string();
                self.reprocess(Token::Tag(tag))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "textarea" => {
                self.insert_html_element(&tag);
                self.ignore_next_lf = true;
                self.frameset_ok = false;
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(crate::tokenizer::states::RawKind::Rcdata))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "xmp" => {
                if self.has_in_button_scope("p") {
                    self.close_p_element();
                }
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.insert_html_element(&tag);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(crate::tokenizer::states::RawKind::Rawtext))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "iframe" => {
                self.frameset_ok = false;
                self.insert_html_element(&tag);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(crate::tokenizer::states::RawKind::Rawtext))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "noembed" => {
                self.insert_html_element(&tag);
                self.original_mode = self.mode;
                self.mode = InsertionMode::Text;
                StepOutcome::Done(TokenSinkResult::ToRawData(crate::tokenizer::states::RawKind::Rawtext))
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && tag.name == "select" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "optgroup" | "option") => {
                if self.current_name() == "option" {
                    self.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "rb" | "rtc") => {
                if self.has_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "rp" | "rt") => {
                if self.has_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "math" | "svg") => {
                self.reconstruct_active_formatting_elements();
                let ns = if tag.name == "math" {
                    dom_core::namespace::NsId::MathMl
                } else {
                    dom_core::namespace::NsId::Svg
                };
                let self_closing = tag.self_closing;
                self.insert_foreign_element(&tag, ns);
                if self_closing {
                    self.pop();
                }
                self.done()
            }
            Token::Tag(tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
                            | "thead" | "tr"
                    ) =>
            {
                self.error(pos, error_code::UNEXPECTED_START_TAG, tag.name.clone());
                self.done()
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag);
                self.done()
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag => {
                self.in_body_any_other_end_tag(&tag.name.clone(), pos);
                self.done()
            }
            other => self.reprocess(other),
        }
    }

    pub(super) fn step_in_template(&mut self, token: Token, pos: Position) -> StepOutcome {
        match token {
            Token::Character(_) | Token::Comment(_) | Token::Doctype(_) => self.step_in_body(token, pos),
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        tag.name.as_str(),
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
                            | "template" | "title"
                    ) =>
            {
                self.step_in_head(token, pos)
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag && tag.name == "template" => self.step_in_head(token, pos),
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(tag.name.as_str(), "caption" | "colgroup" | "tbody" | "tfoot" | "thead") =>
            {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InTable);
                self.mode = InsertionMode::InTable;
                self.reprocess(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && tag.name == "col" => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InColumnGroup);
                self.mode = InsertionMode::InColumnGroup;
                self.reprocess(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && tag.name == "tr" => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InTableBody);
                self.mode = InsertionMode::InTableBody;
                self.reprocess(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && matches!(tag.name.as_str(), "td" | "th") => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InRow);
                self.mode = InsertionMode::InRow;
                self.reprocess(token)
            }
            Token::Tag(ref tag) if tag.kind != TagKind::StartTag => {
                self.error(pos, error_code::STRAY_END_TAG, tag.name.clone());
                self.done()
            }
            Token::Eof => {
                if !self.open_names.iter().any(|n| n == "template") {
                    self.done = true;
                    return self.done();
                }
                self.error(pos, error_code::UNCLOSED_ELEMENTS, "template at eof");
                self.pop_until("template");
                self.clear_active_formatting_to_last_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                self.reprocess(Token::Eof)
            }
            other => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InBody);
                self.mode = InsertionMode::InBody;
                self.reprocess(other)
            }
        }
    }
}
