//! Pruning a host unit down to the insertion point's compilable context.
//!
//! The pruner keeps outer scopes, declarations, and the statements leading
//! up to the insertion point, and strips everything the reparse does not
//! need: later statements, unrelated method bodies, unrelated initialisers.
//! Node identities are preserved throughout.

use std::sync::Arc;

use crate::ast::{Block, Ident, MethodDecl, NamedVariable, Tree};
use crate::cursor::Cursor;
use crate::visit::{walk_block, walk_method, walk_variable, TreeVisitor};

pub struct Pruner {
    insertion: Cursor,
}

impl Pruner {
    pub fn new(insertion: Cursor) -> Self {
        Pruner { insertion }
    }
}

impl TreeVisitor for Pruner {
    fn visit_block(&mut self, block: &Block, cursor: &Cursor) -> Block {
        let parent = cursor.parent();
        let parent_is_class = parent
            .as_ref()
            .map_or(false, |p| matches!(p.value(), Tree::Class(_)));

        if parent_is_class {
            // Class body layout is preserved; members decide for themselves.
            return walk_block(self, block, cursor);
        }

        if parent.is_some() && self.insertion.contains(cursor.value()) {
            let visited = walk_block(self, block, cursor);

            if block
                .statements
                .iter()
                .any(|s| self.insertion.contains(&s.elem))
            {
                // Emit statements up to and including the one that leads to
                // the insertion point; everything after it is irrelevant.
                let mut kept = Vec::new();
                for (original, pruned) in block.statements.iter().zip(visited.statements) {
                    let on_path = self.insertion.contains(&original.elem);
                    kept.push(pruned);
                    if on_path {
                        break;
                    }
                }
                return Block {
                    id: visited.id,
                    prefix: visited.prefix,
                    statik: visited.statik,
                    statements: kept,
                    end: visited.end,
                };
            }
        }

        // Off the insertion path: the block only needs to exist, not run.
        Block {
            statements: Vec::new(),
            ..(*block).clone()
        }
    }

    fn visit_method(&mut self, method: &MethodDecl, cursor: &Cursor) -> MethodDecl {
        if self.insertion.contains(cursor.value()) {
            return walk_method(self, method, cursor);
        }

        // Keep the signature, drop the rest: a stub reparses as `sig();`.
        MethodDecl {
            annotations: Vec::new(),
            body: None,
            ..(*method).clone()
        }
    }

    fn visit_variable(&mut self, variable: &NamedVariable, cursor: &Cursor) -> NamedVariable {
        if !self.insertion.contains(cursor.value()) {
            let cleared = NamedVariable {
                initializer: None,
                ..(*variable).clone()
            };
            return walk_variable(self, &cleared, cursor);
        }

        // The declaration stays in the pruned context while the template may
        // redeclare the same name; renaming sidesteps the collision.
        let renamed = NamedVariable {
            name: Arc::new(Ident {
                id: variable.name.id,
                prefix: variable.name.prefix.clone(),
                simple_name: format!("_{}", variable.name.simple_name),
            }),
            ..(*variable).clone()
        };
        walk_variable(self, &renamed, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print;
    use crate::syntax::Parser;
    use crate::visit::visit_root;

    fn parse(source: &str) -> Tree {
        Parser::new().parse(source).unwrap().remove(0)
    }

    /// Cursor to the first statement of the first method of the first class.
    fn cursor_to_first_statement(unit: &Tree) -> Cursor {
        let class = unit.as_unit().unwrap().classes[0].clone();
        let body = match &class {
            Tree::Class(c) => c.body.clone(),
            _ => panic!("expected class"),
        };
        let method = body
            .statements
            .iter()
            .map(|s| &s.elem)
            .find(|t| matches!(t, Tree::Method(_)))
            .expect("class has a method")
            .clone();
        let method_body = match &method {
            Tree::Method(m) => m.body.clone().unwrap(),
            _ => panic!("expected method"),
        };
        let statement = method_body.statements[0].elem.clone();
        Cursor::new(unit.clone())
            .child(class)
            .child(Tree::Block(body))
            .child(method)
            .child(Tree::Block(method_body))
            .child(statement)
    }

    #[test]
    fn later_statements_are_dropped() {
        let unit = parse("class A { void m() { int x = 1; int y = 2; } }");
        let cursor = cursor_to_first_statement(&unit);
        let pruned = visit_root(&mut Pruner::new(cursor), &unit);
        let printed = print(&pruned);
        assert!(printed.contains("int x"));
        assert!(!printed.contains("int y"));
    }

    #[test]
    fn off_path_method_becomes_a_stub() {
        let unit = parse("class A { void m() { int x = 1; } void n() { int z = 3; } }");
        let cursor = cursor_to_first_statement(&unit);
        let pruned = visit_root(&mut Pruner::new(cursor), &unit);
        let printed = print(&pruned);
        assert!(printed.contains("void n();"));
        assert!(!printed.contains("int z"));
    }

    #[test]
    fn off_path_initializer_is_cleared() {
        let unit = parse("class A { int f = 42; void m() { int x = 1; } }");
        let cursor = cursor_to_first_statement(&unit);
        let pruned = visit_root(&mut Pruner::new(cursor), &unit);
        let printed = print(&pruned);
        assert!(printed.contains("int f;"));
        assert!(!printed.contains("42"));
    }

    #[test]
    fn pruning_preserves_identities_on_the_insertion_path() {
        let unit = parse("class A { void m() { int x = 1; } }");
        let cursor = cursor_to_first_statement(&unit);
        let statement_id = cursor.value().id();
        let pruned = visit_root(&mut Pruner::new(cursor), &unit);

        assert_eq!(pruned.id(), unit.id());
        let pruned_unit = pruned.as_unit().unwrap();
        let class = &pruned_unit.classes[0];
        assert_eq!(class.id(), unit.as_unit().unwrap().classes[0].id());
        let body = match class {
            Tree::Class(c) => &c.body,
            _ => panic!("expected class"),
        };
        let method = match &body.statements[0].elem {
            Tree::Method(m) => m,
            _ => panic!("expected method"),
        };
        let kept = &method.body.as_ref().unwrap().statements[0].elem;
        assert_eq!(kept.id(), statement_id);
    }

    #[test]
    fn variable_on_the_insertion_path_is_renamed() {
        let unit = parse("class A { void m(int i) { int j = i; } }");
        let statement_cursor = cursor_to_first_statement(&unit);
        let variable = match statement_cursor.value() {
            Tree::VarDecls(d) => d.vars[0].elem.clone(),
            _ => panic!("expected declaration"),
        };
        let init = match &variable {
            Tree::Variable(v) => v.initializer.as_ref().unwrap().elem.clone(),
            _ => panic!("expected variable"),
        };
        let cursor = statement_cursor.child(variable).child(init);
        let pruned = visit_root(&mut Pruner::new(cursor), &unit);
        let printed = print(&pruned);
        assert!(printed.contains("int _j = i;"));
    }
}
