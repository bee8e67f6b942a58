// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Container continuation level (spec §4.8 level 2): on every new line,
//! replay the stack of currently-open container blocks (blockquote `>`,
//! list items at their expected indent column, footnote-definition items)
//! and decide continuation vs. close by matching prefixes.

use super::block::list;
use super::{Block, ContainerKind, Tokenizer};

/// Try to strip every currently-open container's prefix from `line`, in
/// order. Pure (no mutation): returns how many containers matched from the
/// front and the remaining content. The caller (`block::process_line`)
/// closes whatever didn't match.
///
/// A list-item container that fails its indent check is still counted as
/// matched, without stripping, when the line is itself a new marker of the
/// same list's kind — that is a sibling item, not a dedent out of the
/// list, and `block::handle_list_item_start` resolves it from the
/// unstripped content.
pub(crate) fn match_prefixes<'l>(tok: &Tokenizer, line: &'l str) -> (usize, &'l str) {
    let mut rest = line;
    let mut matched = 0;
    let count = tok.open_containers.len();
    for (i, container) in tok.open_containers.iter().enumerate() {
        match container.kind {
            ContainerKind::BlockQuote => {
                let trimmed = rest.trim_start_matches(' ');
                let indent = rest.len() - trimmed.len();
                if indent > 3 {
                    break;
                }
                if let Some(after) = trimmed.strip_prefix('>') {
                    rest = after.strip_prefix(' ').unwrap_or(after);
                    matched += 1;
                } else {
                    break;
                }
            }
            ContainerKind::ListItem | ContainerKind::FootnoteDef => {
                if rest.trim().is_empty() {
                    matched += 1;
                    continue;
                }
                let indent = rest.len() - rest.trim_start_matches(' ').len();
                if indent >= container.indent_col {
                    rest = &rest[container.indent_col.min(rest.len())..];
                    matched += 1;
                } else if i + 1 == count
                    && container.kind == ContainerKind::ListItem
                    && sibling_marker_compatible(tok, rest)
                {
                    matched += 1;
                } else {
                    break;
                }
            }
        }
    }
    (matched, rest)
}

fn sibling_marker_compatible(tok: &Tokenizer, rest: &str) -> bool {
    let Some((kind, _, _)) = list::marker(rest) else { return false };
    tok.open_blocks
        .iter()
        .any(|b| matches!(b, Block::List { kind: existing, .. } if list::same_list_kind(*existing, kind)))
}
