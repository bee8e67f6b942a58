// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Inline level (spec §4.8 level 3): emphasis/strong, inline code spans,
//! links, images, footnote references, block IDs, hard line breaks, and
//! backslash escapes, over the text accumulated for one leaf block.
//!
//! Delimiter pairing uses "earliest-matching-type" semantics per spec
//! §4.8's formatting-marker deque: a closing run resolves against the
//! oldest still-open marker of the same kind, not the nearest one. This is
//! a condensed stand-in for CommonMark's left/right-flanking delimiter-run
//! algorithm — sufficient for non-overlapping emphasis, not bit-for-bit
//! CommonMark on pathological delimiter soup.

use dom_core::source::Position;

use super::{error_code, Tokenizer};
use crate::token::{FormatKind, Token};

struct OpenMarker {
    kind: FormatKind,
    queue_index: usize,
    delim: char,
    width: usize,
}

/// Scan `text` (already line-joined, hard breaks encoded as "  \n") as the
/// content of one leaf block, queuing the resulting inline tokens.
pub(crate) fn scan_into(tok: &mut Tokenizer, text: &str, pos: Position) {
    let chars: Vec<char> = text.chars().collect();
    let mut open_markers: Vec<OpenMarker> = Vec::new();
    scan_run(tok, &chars, pos, &mut open_markers);
    for m in open_markers {
        tok.error(error_code::UNCLOSED_EMPHASIS, pos, None);
        let literal: String = std::iter::repeat(m.delim).take(m.width).collect();
        tok.rewrite_queued(m.queue_index, Token::Character(literal));
    }
}

fn scan_run(tok: &mut Tokenizer, chars: &[char], pos: Position, open: &mut Vec<OpenMarker>) {
    let mut i = 0;
    let mut text_buf = String::new();
    let char_pos = |base: Position, idx: usize| Position {
        line: base.line,
        col: base.col + idx as u32,
    };

    macro_rules! flush_text {
        () => {
            if !text_buf.is_empty() {
                tok.queue(pos, Token::Character(std::mem::take(&mut text_buf)));
            }
        };
    }

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() && is_escapable(chars[i + 1]) => {
                text_buf.push(chars[i + 1]);
                i += 2;
            }
            ' ' if chars.get(i + 1) == Some(&' ') => {
                // possible hard break: run of spaces immediately before '\n'
                let mut j = i;
                while chars.get(j) == Some(&' ') {
                    j += 1;
                }
                if chars.get(j) == Some(&'\n') && j - i >= 2 {
                    flush_text!();
                    tok.queue(char_pos(pos, i), Token::HardBreak);
                    i = j + 1;
                } else {
                    text_buf.push(' ');
                    i += 1;
                }
            }
            '\n' => {
                text_buf.push(' ');
                i += 1;
            }
            '`' => {
                let run_len = count_run(chars, i, '`');
                if let Some(close_start) = find_backtick_closer(chars, i + run_len, run_len) {
                    flush_text!();
                    let content: String = chars[i + run_len..close_start]
                        .iter()
                        .collect::<String>()
                        .trim()
                        .to_string();
                    tok.queue(char_pos(pos, i), Token::CodeSpan(content));
                    i = close_start + run_len;
                } else {
                    if run_len >= 2 {
                        tok.error(error_code::UNCLOSED_CODE_SPAN, char_pos(pos, i), None);
                    }
                    text_buf.extend(std::iter::repeat('`').take(run_len));
                    i += run_len;
                }
            }
            '*' | '_' => {
                let delim = c;
                let run_len = count_run(chars, i, delim).min(2).max(1);
                let kind = if run_len == 2 {
                    FormatKind::Strong
                } else {
                    FormatKind::Emphasis
                };
                if let Some(open_i) = open.iter().position(|m| m.kind == kind) {
                    flush_text!();
                    open.remove(open_i);
                    tok.queue(char_pos(pos, i), Token::FormatEnd(kind));
                } else {
                    flush_text!();
                    let idx = tok.queue_and_index(char_pos(pos, i), Token::FormatBegin(kind));
                    open.push(OpenMarker { kind, queue_index: idx, delim, width: run_len });
                }
                i += run_len;
            }
            '~' if chars.get(i + 1) == Some(&'~') => {
                let kind = FormatKind::Strikethrough;
                if let Some(open_i) = open.iter().position(|m| m.kind == kind) {
                    flush_text!();
                    open.remove(open_i);
                    tok.queue(char_pos(pos, i), Token::FormatEnd(kind));
                } else {
                    flush_text!();
                    let idx = tok.queue_and_index(char_pos(pos, i), Token::FormatBegin(kind));
                    open.push(OpenMarker { kind, queue_index: idx, delim: '~', width: 2 });
                }
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'[') => {
                if let Some((alt, href, title, next)) = scan_image(chars, i + 1) {
                    flush_text!();
                    tok.queue(char_pos(pos, i), Token::Image { src: href, alt, title });
                    i = next;
                } else {
                    text_buf.push(c);
                    i += 1;
                }
            }
            '[' if chars.get(i + 1) == Some(&'^') => {
                if let Some((id, next)) = scan_footnote_ref(chars, i) {
                    flush_text!();
                    if id.is_empty() {
                        tok.error(error_code::EMPTY_FOOTNOTE_ID, char_pos(pos, i), None);
                    }
                    tok.queue(char_pos(pos, i), Token::FootnoteRef(id));
                    i = next;
                } else {
                    text_buf.push(c);
                    i += 1;
                }
            }
            '[' => {
                if let Some((label, href, title, next)) = scan_link(chars, i) {
                    flush_text!();
                    tok.queue(char_pos(pos, i), Token::LinkBegin { href, title });
                    let label_chars: Vec<char> = label.chars().collect();
                    scan_run(tok, &label_chars, char_pos(pos, i + 1), open);
                    tok.queue(char_pos(pos, next), Token::LinkEnd);
                    i = next;
                } else {
                    text_buf.push(c);
                    i += 1;
                }
            }
            other => {
                text_buf.push(other);
                i += 1;
            }
        }
    }
    flush_text!();
}

fn is_escapable(c: char) -> bool {
    matches!(
        c,
        '!' | '"'
            | '#'
            | '$'
            | '%'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | ';'
            | '<'
            | '='
            | '>'
            | '?'
            | '@'
            | '['
            | '\\'
            | ']'
            | '^'
            | '_'
            | '`'
            | '{'
            | '|'
            | '}'
            | '~'
    )
}

fn count_run(chars: &[char], start: usize, c: char) -> usize {
    let mut n = 0;
    while chars.get(start + n) == Some(&c) {
        n += 1;
    }
    n
}

fn find_backtick_closer(chars: &[char], from: usize, run_len: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '`' {
            let len = count_run(chars, i, '`');
            if len == run_len {
                return Some(i);
            }
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

/// Scans `[label](dest "title")` starting at the `[`. Returns the label
/// text, destination, optional title, and the index just past the closing
/// `)`. No nested bracket support, a condensed stand-in for full reference
/// link resolution.
fn scan_link(chars: &[char], start: usize) -> Option<(String, String, Option<String>, usize)> {
    let close_bracket = find_unescaped(chars, start + 1, ']')?;
    if chars.get(close_bracket + 1) != Some(&'(') {
        return None;
    }
    let close_paren = find_unescaped(chars, close_bracket + 2, ')')?;
    let label: String = chars[start + 1..close_bracket].iter().collect();
    let inside: String = chars[close_bracket + 2..close_paren].iter().collect();
    let (dest, title) = split_destination_title(&inside);
    Some((label, dest, title, close_paren + 1))
}

fn scan_image(chars: &[char], bracket_start: usize) -> Option<(String, String, Option<String>, usize)> {
    let (alt, dest, title, next) = scan_link(chars, bracket_start)?;
    Some((alt, dest, title, next))
}

fn scan_footnote_ref(chars: &[char], start: usize) -> Option<(String, usize)> {
    let close = find_unescaped(chars, start + 1, ']')?;
    let id: String = chars[start + 2..close].iter().collect();
    Some((id, close + 1))
}

fn find_unescaped(chars: &[char], from: usize, target: char) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == target {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn split_destination_title(inside: &str) -> (String, Option<String>) {
    let trimmed = inside.trim();
    if let Some(q_start) = trimmed.find('"') {
        if trimmed.ends_with('"') && q_start > 0 {
            let dest = trimmed[..q_start].trim().to_string();
            let title = trimmed[q_start + 1..trimmed.len() - 1].to_string();
            return (dest, Some(title));
        }
    }
    (trimmed.to_string(), None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::Context;
    use dom_core::source::Source;
    use dom_core::Reporter;

    fn run(text: &str) -> Vec<Token> {
        let reporter = Reporter::new();
        let source = Source::from_str("t.md", "");
        let mut tok = Tokenizer::new("t.md", source, &reporter);
        scan_into(&mut tok, text, Position::START);
        let _ = Context::Markdown;
        tok.into_tokens().into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn code_span_is_verbatim() {
        let tokens = run("use `a*b`");
        assert!(tokens.contains(&Token::CodeSpan("a*b".to_string())));
    }

    #[test]
    fn link_emits_begin_text_end() {
        let tokens = run("[home](https://example.invalid \"Home\")");
        assert!(tokens.iter().any(|t| matches!(
            t,
            Token::LinkBegin { href, title }
                if href == "https://example.invalid" && title.as_deref() == Some("Home")
        )));
        assert!(tokens.contains(&Token::LinkEnd));
    }

    #[test]
    fn unmatched_emphasis_becomes_literal() {
        let tokens = run("a *b");
        assert!(!tokens
            .iter()
            .any(|t| matches!(t, Token::FormatBegin(FormatKind::Emphasis))));
    }
}
