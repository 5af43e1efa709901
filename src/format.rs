//! Whitespace reconciliation for freshly extracted snippets.
//!
//! [`AutoFormat`] rewrites a snippet's indentation to match the host scope
//! it will be spliced into. It only ever touches prefix whitespace: node
//! identities, comments, and structure all pass through unchanged, and
//! formatting an already-formatted snippet is a no-op.

use crate::ast::{Block, Space, Tree};
use crate::cursor::Cursor;
use crate::errors::{unspanned, ErrorContext, ErrorKind, ErrorReporting, GraftError, SourceContext};
use crate::visit::{visit_root, walk_block, TreeVisitor};

const INDENT: &str = "    ";

pub struct AutoFormat {
    base_depth: usize,
}

impl AutoFormat {
    /// `scope` is the host cursor the snippet will live under; its block
    /// nesting determines the indentation.
    pub fn new(scope: &Cursor) -> Self {
        AutoFormat {
            base_depth: scope
                .path()
                .iter()
                .filter(|t| matches!(t, Tree::Block(_)))
                .count(),
        }
    }

    pub fn format(&self, tree: &Tree) -> Result<Tree, GraftError> {
        if matches!(tree, Tree::Unit(_)) {
            let ctx = ErrorContext::new(SourceContext::fallback("snippet formatting"), "format");
            return Err(ctx.report(
                ErrorKind::UnformattableSnippet {
                    kind: tree.kind().name().to_string(),
                },
                unspanned(),
            ));
        }

        let mut visitor = IndentVisitor {
            depth: self.base_depth,
        };
        let formatted = visit_root(&mut visitor, tree);
        Ok(formatted.with_prefix(reindent(tree.prefix(), self.base_depth)))
    }
}

struct IndentVisitor {
    depth: usize,
}

impl TreeVisitor for IndentVisitor {
    fn visit_block(&mut self, block: &Block, cursor: &Cursor) -> Block {
        self.depth += 1;
        let mut visited = walk_block(self, block, cursor);
        for statement in &mut visited.statements {
            statement.elem = statement
                .elem
                .with_prefix(reindent(statement.elem.prefix(), self.depth));
        }
        self.depth -= 1;
        visited.end = reindent(&visited.end, self.depth);
        visited
    }
}

/// Newline plus one indent unit per depth level; comments survive.
fn reindent(space: &Space, depth: usize) -> Space {
    let mut whitespace = String::with_capacity(1 + depth * INDENT.len());
    whitespace.push('\n');
    for _ in 0..depth {
        whitespace.push_str(INDENT);
    }
    Space {
        whitespace,
        comments: space.comments.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Parser;

    fn parse(source: &str) -> Tree {
        Parser::new().parse(source).unwrap().remove(0)
    }

    fn statement_scope(unit: &Tree) -> Cursor {
        let class = unit.as_unit().unwrap().classes[0].clone();
        let body = match &class {
            Tree::Class(c) => c.body.clone(),
            _ => panic!("expected class"),
        };
        let method = body.statements[0].elem.clone();
        let method_body = match &method {
            Tree::Method(m) => m.body.clone().unwrap(),
            _ => panic!("expected method"),
        };
        Cursor::new(unit.clone())
            .child(class)
            .child(Tree::Block(body))
            .child(method)
            .child(Tree::Block(method_body))
    }

    #[test]
    fn snippet_is_indented_to_the_host_scope() {
        let host = parse("class A { void m() { int x = 1; } }");
        let scope = statement_scope(&host);

        let snippet_host = parse("class B { void n() {\nfoo();\n} }");
        let snippet = {
            let class = snippet_host.as_unit().unwrap().classes[0].clone();
            let body = match &class {
                Tree::Class(c) => c.body.clone(),
                _ => panic!("expected class"),
            };
            let method = match &body.statements[0].elem {
                Tree::Method(m) => m.clone(),
                _ => panic!("expected method"),
            };
            method.body.as_ref().unwrap().statements[0].elem.clone()
        };

        let formatted = AutoFormat::new(&scope).format(&snippet).unwrap();
        assert_eq!(formatted.prefix().whitespace, "\n        ");
        assert_eq!(formatted.id(), snippet.id());
    }

    #[test]
    fn formatting_is_idempotent() {
        let host = parse("class A { void m() { int x = 1; } }");
        let scope = statement_scope(&host);
        let snippet = parse("class C { void p() { int q = 1; } }")
            .as_unit()
            .unwrap()
            .classes[0]
            .clone();

        let formatter = AutoFormat::new(&scope);
        let once = formatter.format(&snippet).unwrap();
        let twice = formatter.format(&once).unwrap();
        assert_eq!(once.print(), twice.print());
    }

    #[test]
    fn a_compilation_unit_cannot_be_formatted() {
        let host = parse("class A { void m() { int x = 1; } }");
        let scope = statement_scope(&host);
        let err = AutoFormat::new(&scope).format(&host).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnformattableSnippet { .. }));
    }
}
