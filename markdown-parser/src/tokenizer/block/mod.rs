// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Root (block) level (spec §4.8 level 1): recognises opening delimiters of
//! block constructs at the start of a logical line, after container prefix
//! consumption, and flushes leaf-block content through the inline level.

pub(crate) mod list;

use dom_core::source::Position;

use super::{container, error_code, inline, Block, ContainerKind, FenceKind, HtmlBlockClose, Tokenizer};
use crate::token::{Context, ListSpacing, Token};

/// Process one physical line. Returns `Some(ctx)` only when a `{{…}}`
/// escape-to-host marker ends the Markdown region (spec §4.8 `parse`
/// return contract); `None` otherwise.
pub(crate) fn process_line(tok: &mut Tokenizer, raw_line: &str, pos: Position) -> Option<Context> {
    let (matched, content) = container::match_prefixes(tok, raw_line);
    let content = content.to_string();
    if matched < tok.open_containers.len() {
        close_containers_from(tok, matched, pos);
    }

    if tok.open_blocks.is_empty() && content.trim_start().starts_with("{{") {
        return Some(Context::Native);
    }

    dispatch_content(tok, &content, pos);
    None
}

fn dispatch_content(tok: &mut Tokenizer, content: &str, pos: Position) {
    let is_blank = content.trim().is_empty();

    if let Some(Block::CodeBlock { fence: Some(kind), .. }) = tok.open_blocks.last() {
        let kind = *kind;
        return continue_fenced_code(tok, content, kind, pos);
    }
    if let Some(Block::HtmlBlock { close }) = tok.open_blocks.last() {
        let close = close.clone();
        return continue_html_block(tok, content, &close, is_blank, pos);
    }
    if let Some(Block::Table) = tok.open_blocks.last() {
        return continue_table(tok, content, is_blank, pos);
    }

    if matches!(tok.open_blocks.last(), Some(Block::DefinitionDescription)) {
        if is_blank {
            close_last_open_block(tok, pos);
            return;
        }
        if let Some(rest) = definition_description_marker(content) {
            close_last_open_block(tok, pos);
            open_definition_description(tok, rest, pos);
            return;
        }
        tok.pending.chars.push('\n');
        tok.pending.chars.push_str(content);
        return;
    }
    if matches!(tok.open_blocks.last(), Some(Block::DefinitionList)) && !is_blank {
        if let Some(rest) = definition_description_marker(content) {
            open_definition_description(tok, rest, pos);
            return;
        }
        close_last_open_block(tok, pos);
    }

    if is_blank {
        handle_blank_line(tok, pos);
        return;
    }

    if let Some(level) = atx_heading_level(content) {
        close_leaf_if_open(tok, pos);
        open_heading(tok, level, content, pos);
        return;
    }

    if is_thematic_break(content) {
        close_leaf_if_open(tok, pos);
        tok.queue(pos, Token::ThematicBreak);
        return;
    }

    if let Some((kind, info)) = fenced_code_open(content) {
        close_leaf_if_open(tok, pos);
        tok.open_blocks.push(Block::CodeBlock { fence: Some(kind), info: info.clone() });
        tok.queue(pos, Token::CodeBlockBegin { info });
        tok.pending.reset(pos);
        return;
    }

    if let Some(rest) = content.trim_start().strip_prefix('>') {
        if content.trim_start().len() - rest.len() == 1 {
            close_leaf_if_open(tok, pos);
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            tok.open_containers.push_back(super::Container { kind: ContainerKind::BlockQuote, indent_col: 0 });
            tok.open_blocks.push(Block::BlockQuote);
            tok.queue(pos, Token::BlockQuoteBegin);
            return dispatch_content(tok, rest, pos);
        }
    }

    if let Some((id, rest)) = footnote_def_marker(content) {
        close_leaf_if_open(tok, pos);
        let indent = content.len() - content.trim_start_matches(' ').len() + prefix_len(&id);
        tok.open_containers.push_back(super::Container { kind: ContainerKind::FootnoteDef, indent_col: indent });
        tok.open_blocks.push(Block::FootnoteDef);
        tok.queue(pos, Token::FootnoteDefBegin { id });
        if !rest.trim().is_empty() {
            open_paragraph(tok, rest, pos);
        }
        return;
    }

    if let Some((kind, indent_col, rest)) = list::marker(content) {
        return handle_list_item_start(tok, kind, indent_col, rest, pos);
    }

    if try_start_table(tok, content, pos) {
        return;
    }

    if is_html_block_open(content) {
        close_leaf_if_open(tok, pos);
        tok.open_blocks.push(Block::HtmlBlock { close: HtmlBlockClose::BlankLine });
        tok.pending.reset(pos);
        tok.pending.chars.push_str(content);
        tok.pending.chars.push('\n');
        return;
    }

    // Setext heading: a line of `===`/`---` immediately following an
    // open single-line paragraph converts it to a heading.
    if let Some(level) = setext_level(content) {
        if matches!(tok.open_blocks.last(), Some(Block::Paragraph)) {
            let text = std::mem::take(&mut tok.pending.chars);
            let start = tok.pending.position.unwrap_or(pos);
            tok.open_blocks.pop();
            if let Some(begin_index) = tok.pending.begin_index {
                tok.rewrite_queued(begin_index, Token::HeadingBegin(level));
            } else {
                tok.queue(pos, Token::HeadingBegin(level));
            }
            inline::scan_into(tok, text.trim(), start);
            tok.queue(pos, Token::HeadingEnd(level));
            return;
        }
    }

    if let Some(rest) = definition_description_marker(content) {
        if matches!(tok.open_blocks.last(), Some(Block::Paragraph)) {
            open_definition_description(tok, rest, pos);
            return;
        }
    }

    // Lazy continuation of an open paragraph, or a fresh one.
    if matches!(tok.open_blocks.last(), Some(Block::Paragraph)) {
        tok.pending.chars.push('\n');
        tok.pending.chars.push_str(content);
        tok.pending.block_line_count += 1;
        return;
    }

    open_paragraph(tok, content, pos);
}

fn open_paragraph(tok: &mut Tokenizer, content: &str, pos: Position) {
    if peek_definition_marker(tok) {
        open_definition_term(tok, content, pos);
        return;
    }
    if matches!(tok.open_blocks.last(), Some(Block::DefinitionList)) {
        close_last_open_block(tok, pos);
    }
    tok.open_blocks.push(Block::Paragraph);
    tok.pending.reset(pos);
    tok.pending.chars.push_str(content);
    tok.pending.begin_index = Some(tok.queue_and_index(pos, Token::ParagraphBegin));
    mark_block_started_in_list(tok);
}

/// One-line lookahead (same technique as `try_start_table`'s delimiter-row
/// check): a paragraph-shaped line is only a definition-list term if the
/// very next physical line is a `:`/`~` description marker.
fn peek_definition_marker(tok: &mut Tokenizer) -> bool {
    let marker = tok.source_mark();
    let line = tok.read_line();
    tok.source_restore(marker);
    definition_description_marker(&line).is_some()
}

fn definition_description_marker(content: &str) -> Option<&str> {
    let stripped = content.trim_start_matches(' ');
    if content.len() - stripped.len() > 3 {
        return None;
    }
    for marker in [": ", "~ "] {
        if let Some(rest) = stripped.strip_prefix(marker) {
            return Some(rest);
        }
    }
    None
}

fn open_definition_term(tok: &mut Tokenizer, term: &str, pos: Position) {
    if !matches!(tok.open_blocks.last(), Some(Block::DefinitionList)) {
        tok.queue(pos, Token::DefinitionListBegin);
        tok.open_blocks.push(Block::DefinitionList);
    }
    tok.queue(pos, Token::DefinitionTermBegin);
    inline::scan_into(tok, term.trim(), pos);
    tok.queue(pos, Token::DefinitionTermEnd);
}

fn open_definition_description(tok: &mut Tokenizer, content: &str, pos: Position) {
    tok.open_blocks.push(Block::DefinitionDescription);
    tok.pending.reset(pos);
    tok.pending.chars.push_str(content);
    tok.queue(pos, Token::DefinitionDescriptionBegin);
}

fn close_leaf_if_open(tok: &mut Tokenizer, pos: Position) {
    if matches!(
        tok.open_blocks.last(),
        Some(Block::Paragraph) | Some(Block::Heading(_)) | Some(Block::DefinitionDescription)
    ) {
        close_last_open_block(tok, pos);
    }
    if matches!(tok.open_blocks.last(), Some(Block::DefinitionList)) {
        close_last_open_block(tok, pos);
    }
}

fn handle_blank_line(tok: &mut Tokenizer, pos: Position) {
    if matches!(tok.open_blocks.last(), Some(Block::Paragraph)) {
        close_last_open_block(tok, pos);
    }
    for b in tok.open_blocks.iter_mut() {
        if let Block::List { blank_pending, .. } = b {
            *blank_pending = true;
        }
    }
}

fn mark_block_started_in_list(tok: &mut Tokenizer) {
    let mut upgrade_index = None;
    for (i, b) in tok.open_blocks.iter().enumerate() {
        if let Block::List { blank_pending: true, begin_index, .. } = b {
            upgrade_index = Some((i, *begin_index));
        }
    }
    if let Some((i, begin_index)) = upgrade_index {
        if let Block::List { spacing, blank_pending, kind, .. } = &mut tok.open_blocks[i] {
            *spacing = ListSpacing::Loose;
            *blank_pending = false;
            let kind = *kind;
            tok.rewrite_queued(begin_index, Token::ListBegin { kind, spacing: ListSpacing::Loose });
        }
    }
}

/// Close the innermost open block, emitting the matching `*End` token(s)
/// and popping its container frame if it has one.
pub(crate) fn close_last_open_block(tok: &mut Tokenizer, pos: Position) {
    let Some(block) = tok.open_blocks.pop() else { return };
    match block {
        Block::Paragraph => {
            flush_pending_as_inline(tok, pos);
            tok.queue(pos, Token::ParagraphEnd);
        }
        Block::Heading(level) => {
            flush_pending_as_inline(tok, pos);
            tok.queue(pos, Token::HeadingEnd(level));
        }
        Block::BlockQuote => {
            tok.open_containers.pop_back();
            tok.queue(pos, Token::BlockQuoteEnd);
        }
        Block::List { kind, spacing, begin_index, .. } => {
            tok.rewrite_queued(begin_index, Token::ListBegin { kind, spacing });
            tok.queue(pos, Token::ListEnd);
        }
        Block::ListItem => {
            tok.open_containers.pop_back();
            tok.queue(pos, Token::ListItemEnd);
        }
        Block::CodeBlock { fence, info } => {
            let _ = info;
            if fence.is_some() {
                tok.error(error_code::UNCLOSED_FENCED_CODE_BLOCK, pos, None);
            }
            let text = std::mem::take(&mut tok.pending.chars);
            if !text.is_empty() {
                tok.queue(pos, Token::Character(text));
            }
            tok.queue(pos, Token::CodeBlockEnd);
        }
        Block::HtmlBlock { .. } => {
            let text = std::mem::take(&mut tok.pending.chars);
            tok.queue(pos, Token::HtmlBlock(text));
        }
        Block::Table => {
            tok.queue(pos, Token::TableBodyEnd);
            tok.queue(pos, Token::TableEnd);
        }
        Block::FootnoteDef => {
            tok.open_containers.pop_back();
            tok.queue(pos, Token::FootnoteDefEnd);
        }
        Block::DefinitionList => {
            tok.queue(pos, Token::DefinitionListEnd);
        }
        Block::DefinitionDescription => {
            flush_pending_as_inline(tok, pos);
            tok.queue(pos, Token::DefinitionDescriptionEnd);
        }
    }
}

fn flush_pending_as_inline(tok: &mut Tokenizer, pos: Position) {
    let text = std::mem::take(&mut tok.pending.chars);
    let start = tok.pending.position.unwrap_or(pos);
    let (text, block_id) = extract_trailing_block_id(&text);
    inline::scan_into(tok, text.trim_end(), start);
    if let Some(id) = block_id {
        if id.trim().is_empty() {
            tok.error(error_code::INVALID_BLOCK_ID, pos, None);
        } else {
            tok.queue(pos, Token::BlockId(id));
        }
    }
}

fn extract_trailing_block_id(text: &str) -> (&str, Option<String>) {
    let trimmed = text.trim_end();
    if trimmed.ends_with('}') {
        if let Some(open) = trimmed.rfind("{#") {
            if open + 2 <= trimmed.len() - 1 {
                let id = trimmed[open + 2..trimmed.len() - 1].to_string();
                return (trimmed[..open].trim_end(), Some(id));
            }
        }
    }
    (text, None)
}

pub(crate) fn flush_pending_block(tok: &mut Tokenizer, pos: Position) {
    let _ = (tok, pos);
}

fn close_containers_from(tok: &mut Tokenizer, from: usize, pos: Position) {
    // Every container past `from` failed to continue; close the open
    // block stack down to (and including) the block that introduced the
    // `from`-th container, plus any trailing leaf block above it.
    let container_blocks = tok
        .open_blocks
        .iter()
        .filter(|b| matches!(b, Block::BlockQuote | Block::ListItem | Block::FootnoteDef))
        .count();
    let to_close = container_blocks.saturating_sub(from);
    let mut closed_containers = 0;
    while closed_containers < to_close && !tok.open_blocks.is_empty() {
        if matches!(
            tok.open_blocks.last(),
            Some(Block::BlockQuote) | Some(Block::ListItem) | Some(Block::FootnoteDef)
        ) {
            closed_containers += 1;
        }
        close_last_open_block(tok, pos);
    }
    // A List with no more items left open closes alongside its last item.
    if matches!(tok.open_blocks.last(), Some(Block::List { .. })) {
        close_last_open_block(tok, pos);
    }
}

fn handle_list_item_start(
    tok: &mut Tokenizer,
    kind: crate::token::ListKind,
    indent_col: usize,
    rest: &str,
    pos: Position,
) {
    // Close whatever leaf is dangling from the previous item first — its
    // paragraph was never closed by the container matcher, since a sibling
    // marker is recognised without stripping (see `container::match_prefixes`).
    close_leaf_if_open(tok, pos);

    let mut same_list = false;
    if matches!(tok.open_blocks.last(), Some(Block::ListItem)) {
        close_last_open_block(tok, pos);
        if let Some(Block::List { kind: existing, .. }) = tok.open_blocks.last() {
            same_list = list::same_list_kind(*existing, kind);
        }
    }

    if !same_list {
        if matches!(tok.open_blocks.last(), Some(Block::List { .. })) {
            close_last_open_block(tok, pos);
        }
        let begin_index = tok.queue_and_index(
            pos,
            Token::ListBegin { kind, spacing: ListSpacing::DefaultTight },
        );
        tok.open_blocks.push(Block::List {
            kind,
            spacing: ListSpacing::DefaultTight,
            begin_index,
            blank_pending: false,
        });
    }

    tok.open_containers.push_back(super::Container { kind: ContainerKind::ListItem, indent_col });
    tok.open_blocks.push(Block::ListItem);
    tok.queue(pos, Token::ListItemBegin);
    mark_block_started_in_list(tok);

    if let Some(rest_after_task) = task_marker(rest) {
        tok.queue(pos, Token::TaskMarker { checked: rest_after_task.0 });
        if !rest_after_task.1.trim().is_empty() {
            open_paragraph(tok, rest_after_task.1, pos);
        }
    } else if !rest.trim().is_empty() {
        open_paragraph(tok, rest, pos);
    }
}

fn task_marker(rest: &str) -> Option<(bool, &str)> {
    let rest = rest.strip_prefix('[')?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    let after = chars.as_str().strip_prefix(']')?;
    let checked = match mark {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    Some((checked, after.strip_prefix(' ').unwrap_or(after)))
}

fn atx_heading_level(content: &str) -> Option<u8> {
    let stripped = content.trim_start_matches(' ');
    if content.len() - stripped.len() > 3 {
        return None;
    }
    let hashes = stripped.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let after = &stripped[hashes..];
    if !after.is_empty() && !after.starts_with(' ') {
        return None;
    }
    Some(hashes as u8)
}

fn open_heading(tok: &mut Tokenizer, level: u8, content: &str, pos: Position) {
    let stripped = content.trim_start_matches(' ');
    let after = stripped[level as usize..].trim_start_matches(' ');
    let text = after.trim_end_matches(' ').trim_end_matches('#').trim_end();
    tok.open_blocks.push(Block::Heading(level));
    tok.pending.reset(pos);
    tok.pending.chars.push_str(text);
    tok.queue(pos, Token::HeadingBegin(level));
}

fn is_thematic_break(content: &str) -> bool {
    let stripped = content.trim_start_matches(' ');
    if content.len() - stripped.len() > 3 {
        return false;
    }
    let mut chars = stripped.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.clone().next() else { return false };
    if !matches!(first, '-' | '_' | '*') {
        return false;
    }
    let count = stripped.chars().filter(|&c| c == first).count();
    let only_marker_and_space = stripped.chars().all(|c| c == first || c == ' ');
    count >= 3 && only_marker_and_space
}

fn setext_level(content: &str) -> Option<u8> {
    let stripped = content.trim();
    if stripped.is_empty() {
        return None;
    }
    if stripped.chars().all(|c| c == '=') {
        Some(1)
    } else if stripped.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

fn fenced_code_open(content: &str) -> Option<(FenceKind, String)> {
    let stripped = content.trim_start_matches(' ');
    if content.len() - stripped.len() > 3 {
        return None;
    }
    let (kind, ch) = if stripped.starts_with("```") {
        (FenceKind::Backtick, '`')
    } else if stripped.starts_with("~~~") {
        (FenceKind::Tilde, '~')
    } else {
        return None;
    };
    let run = stripped.chars().take_while(|&c| c == ch).count();
    let info = stripped[run..].trim().to_string();
    if kind == FenceKind::Backtick && info.contains('`') {
        return None;
    }
    Some((kind, info))
}

fn continue_fenced_code(tok: &mut Tokenizer, content: &str, kind: FenceKind, pos: Position) {
    let ch = match kind {
        FenceKind::Backtick => '`',
        FenceKind::Tilde => '~',
    };
    let stripped = content.trim_start_matches(' ');
    let run = stripped.chars().take_while(|&c| c == ch).count();
    if run >= 3 && stripped[run..].trim().is_empty() {
        close_last_open_block(tok, pos);
        return;
    }
    tok.pending.chars.push_str(content);
    tok.pending.chars.push('\n');
}

fn is_html_block_open(content: &str) -> bool {
    let stripped = content.trim_start();
    stripped.starts_with("<!--")
        || stripped.starts_with("<!")
        || (stripped.starts_with('<')
            && stripped[1..]
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '/')
                .unwrap_or(false))
}

fn continue_html_block(tok: &mut Tokenizer, content: &str, close: &HtmlBlockClose, is_blank: bool, pos: Position) {
    match close {
        HtmlBlockClose::BlankLine => {
            if is_blank {
                close_last_open_block(tok, pos);
                return;
            }
        }
        HtmlBlockClose::Pattern(pat) => {
            if content.contains(pat.as_str()) {
                tok.pending.chars.push_str(content);
                tok.pending.chars.push('\n');
                close_last_open_block(tok, pos);
                return;
            }
        }
    }
    tok.pending.chars.push_str(content);
    tok.pending.chars.push('\n');
}

fn footnote_def_marker(content: &str) -> Option<(String, &str)> {
    let stripped = content.strip_prefix("[^")?;
    let close = stripped.find(']')?;
    let after_bracket = &stripped[close + 1..];
    let rest = after_bracket.strip_prefix(':')?;
    let id = stripped[..close].to_string();
    Some((id, rest.strip_prefix(' ').unwrap_or(rest)))
}

/// Column width of `[^id]: `, the part of a footnote-definition marker that
/// continuation lines must be indented past.
fn prefix_len(id: &str) -> usize {
    "[^".len() + id.len() + "]: ".len()
}

/// Speculative table start (spec §4.8 "Table parsing"): the header row is
/// tentative until a valid delimiter row is observed immediately after it.
fn try_start_table(tok: &mut Tokenizer, content: &str, pos: Position) -> bool {
    if tok.is_fake_table {
        tok.is_fake_table = false;
        return false;
    }
    if !content.trim_start().starts_with('|') && !content.contains('|') {
        return false;
    }
    let Some(cells) = split_table_row(content) else { return false };
    if cells.is_empty() {
        return false;
    }

    tok.push_section_marker();
    tok.queue(pos, Token::TableBegin);
    tok.queue(pos, Token::TableHeadBegin);
    tok.queue(pos, Token::TableRowBegin);
    let mut header_begin_indices = Vec::with_capacity(cells.len());
    for cell in &cells {
        header_begin_indices.push(tok.queue_and_index(pos, Token::TableHeaderCellBegin { align: None }));
        inline::scan_into(tok, cell.trim(), pos);
        tok.queue(pos, Token::TableHeaderCellEnd);
    }
    tok.queue(pos, Token::TableRowEnd);

    let marker = tok.source_mark();
    let next_pos = tok.source_position();
    let next_line = tok.read_line();
    if let Some(aligns) = parse_delimiter_row(&next_line) {
        if aligns.len() == cells.len() {
            tok.pop_section_marker();
            for (index, align) in header_begin_indices.into_iter().zip(aligns.iter()) {
                tok.rewrite_queued(index, Token::TableHeaderCellBegin { align: *align });
            }
            tok.queue(next_pos, Token::TableHeadEnd);
            tok.queue(next_pos, Token::TableBodyBegin);
            tok.table_col_count = cells.len();
            tok.table_aligns = aligns;
            tok.open_blocks.push(Block::Table);
            return true;
        }
    }
    tok.source_restore(marker);
    tok.rollback_to_last_section_marker();
    tok.is_fake_table = true;
    false
}

fn continue_table(tok: &mut Tokenizer, content: &str, is_blank: bool, pos: Position) {
    if is_blank {
        close_last_open_block(tok, pos);
        return;
    }
    let Some(cells) = split_table_row(content) else {
        close_last_open_block(tok, pos);
        return dispatch_content(tok, content, pos);
    };
    if cells.len() != tok.table_col_count {
        tok.error(error_code::TABLE_COLUMN_COUNT_MISMATCH, pos, None);
    }
    tok.queue(pos, Token::TableRowBegin);
    for (i, cell) in cells.iter().enumerate() {
        let align = tok.table_aligns.get(i).copied().flatten();
        tok.queue(pos, Token::TableCellBegin { align });
        inline::scan_into(tok, cell.trim(), pos);
        tok.queue(pos, Token::TableCellEnd);
    }
    tok.queue(pos, Token::TableRowEnd);
}

fn split_table_row(content: &str) -> Option<Vec<String>> {
    let trimmed = content.trim();
    if trimmed.is_empty() || !trimmed.contains('|') {
        return None;
    }
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let mut cells = Vec::new();
    let mut buf = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'|') {
            buf.push('|');
            chars.next();
        } else if c == '|' {
            cells.push(std::mem::take(&mut buf));
        } else {
            buf.push(c);
        }
    }
    cells.push(buf);
    Some(cells)
}

fn parse_delimiter_row(line: &str) -> Option<Vec<Option<crate::token::Align>>> {
    let cells = split_table_row(line)?;
    let mut aligns = Vec::with_capacity(cells.len());
    for cell in &cells {
        let t = cell.trim();
        if t.is_empty() || !t.chars().all(|c| c == '-' || c == ':') {
            return None;
        }
        if !t.contains('-') {
            return None;
        }
        let left = t.starts_with(':');
        let right = t.ends_with(':');
        aligns.push(match (left, right) {
            (true, true) => Some(crate::token::Align::Center),
            (true, false) => Some(crate::token::Align::Left),
            (false, true) => Some(crate::token::Align::Right),
            (false, false) => None,
        });
    }
    Some(aligns)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn atx_heading_level_detects_one_to_six_hashes() {
        assert_eq!(atx_heading_level("# Title"), Some(1));
        assert_eq!(atx_heading_level("### Title"), Some(3));
        assert_eq!(atx_heading_level("####### too many"), None);
    }

    #[test]
    fn thematic_break_detects_three_or_more_markers() {
        assert!(is_thematic_break("---"));
        assert!(is_thematic_break("* * *"));
        assert!(!is_thematic_break("--"));
    }

    #[test]
    fn table_row_splits_on_pipes() {
        let cells = split_table_row("| h1 | h2 |").unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].trim(), "h1");
    }

    #[test]
    fn delimiter_row_parses_alignment() {
        let aligns = parse_delimiter_row("|:--|--:|:--:|").unwrap();
        assert_eq!(aligns.len(), 3);
    }

    #[test]
    fn non_table_line_has_no_delimiter_row_reading() {
        assert!(parse_delimiter_row("not a table").is_none());
    }
}
