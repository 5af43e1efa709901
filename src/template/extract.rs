//! Recovering the template's sub-trees from the reparsed synthetic unit.
//!
//! The emitter bracketed the spliced text with block-comment markers; after
//! the reparse those comments sit in the trivia of whatever nodes follow
//! them. The extractor walks every trivia attachment point, flips a
//! collecting flag at the markers, and records candidate nodes with the
//! depth they were seen at. Only nodes at the depth recorded when
//! collection started are returned, so a statement and its sub-expressions
//! never both come back.

use std::collections::HashSet;

use crate::ast::{CommentStyle, NodeId, Space, Tree};
use crate::cursor::Cursor;
use crate::errors::{unspanned, ErrorContext, ErrorKind, ErrorReporting, GraftError, SourceContext};
use crate::template::{SNIPPET_MARKER_END, SNIPPET_MARKER_START};
use crate::visit::TreeVisitor;

#[derive(Default)]
pub struct Extractor {
    collecting: bool,
    elements: Vec<(usize, Tree)>,
    collected_ids: HashSet<NodeId>,
    start_depth: usize,
    saw_start: bool,
    saw_end: bool,
    orphaned_end: bool,
}

impl Extractor {
    pub fn new() -> Self {
        Extractor::default()
    }

    /// All collected nodes at the recorded start depth, in source order.
    /// `synthetic_source` is attached to marker-invariant failures.
    pub fn into_snippets(self, synthetic_source: &str) -> Result<Vec<Tree>, GraftError> {
        let ctx = ErrorContext::new(
            SourceContext::new("<generated>", synthetic_source),
            "extract",
        );
        if self.orphaned_end {
            return Err(ctx.internal_error(ErrorKind::OrphanedEndMarker, unspanned()));
        }
        if !self.saw_start || !self.saw_end {
            return Err(ctx.internal_error(ErrorKind::MissingEndMarker, unspanned()));
        }
        let start_depth = self.start_depth;
        Ok(self
            .elements
            .into_iter()
            .filter(|(depth, _)| *depth == start_depth)
            .map(|(_, tree)| tree)
            .collect())
    }
}

impl TreeVisitor for Extractor {
    fn visit_space(&mut self, space: &Space, cursor: &Cursor) -> Space {
        let depth = cursor.depth();

        if find_marker(space, SNIPPET_MARKER_END).is_some() {
            if !self.saw_start {
                self.orphaned_end = true;
            }
            self.saw_end = true;
            self.collecting = false;

            // When the end marker sits inside the first collected element,
            // that element is scaffolding (the member-initialiser wrap) and
            // its children are the real template.
            if self.elements.len() > 1 && cursor.contains(&self.elements[0].1) {
                self.elements.remove(0);
                self.start_depth += 1;
            }
        }

        if let Some(index) = find_marker(space, SNIPPET_MARKER_START) {
            self.saw_start = true;
            self.collecting = true;
            self.start_depth = depth;
            let node = cursor.value();

            if matches!(node, Tree::Unit(_)) {
                // Inserting before the first declaration of an import-free
                // unit puts the marker on the unit itself. The unit is not
                // recorded; its direct children are the template's top
                // level.
                self.start_depth = depth + 1;
                return space.clone();
            }

            self.collected_ids.insert(node.id());
            let mut cleaned = space.clone();
            cleaned.comments.remove(index);
            self.elements.push((depth, node.with_prefix(cleaned)));
        } else if self.collecting {
            let node = cursor.value();
            let ancestor_collected = cursor
                .parent()
                .map_or(false, |p| self.collected_ids.contains(&p.value().id()));
            if !ancestor_collected && !self.collected_ids.contains(&node.id()) {
                self.elements.push((depth, node.clone()));
                self.collected_ids.insert(node.id());
            }
        }

        space.clone()
    }
}

fn find_marker(space: &Space, marker: &str) -> Option<usize> {
    space
        .comments
        .iter()
        .position(|c| c.style == CommentStyle::Block && c.text == marker)
}
