//! Line-based declaration matching.
//!
//! Finds the statement that starts on a documentation record's context line.
//! Only start lines and sibling order are consulted, never end lines.

use std::sync::Arc;

use crate::types::SyntaxNode;

/// Find the node whose declaration starts on `target_line`.
///
/// At each level the children starting at or before the target are
/// considered. If the last of them starts exactly on the target it is the
/// match. Otherwise the search descends into the sibling just before it, or
/// into the last one when it has no predecessor. A candidate without a body
/// ends the search with no match.
///
/// Children of every `body` must be sorted by start line; unsorted trees give
/// an unspecified result.
pub fn match_node(root: &SyntaxNode, target_line: usize) -> Option<&Arc<SyntaxNode>> {
    let mut scope = root;

    loop {
        let children = scope.children();
        let eligible = children.partition_point(|c| c.start_line() <= target_line);
        if eligible == 0 {
            return None;
        }

        let last = &children[eligible - 1];
        if last.start_line() == target_line {
            return Some(last);
        }

        let candidate = if eligible >= 2 {
            &children[eligible - 2]
        } else {
            last
        };

        if !candidate.has_body() {
            return None;
        }
        scope = candidate;
    }
}
