//! Tree visitors.
//!
//! [`TreeVisitor`] is a mapping visitor: every method returns the node that
//! replaces its input, and the default implementations rebuild each node
//! from visited children while copying its identity. The cursor passed to
//! every method has the visited node as its focus, so implementations can
//! query ancestry without carrying their own stack.
//!
//! [`TreeVisitor::visit_space`] fires for every trivia attachment point: a
//! node's prefix, the space after a right-padded element, the space before
//! a left-padded element, a block's end space, and the unit's eof space.
//! The marker extractor is built entirely on that hook.

use std::sync::Arc;

use crate::ast::{
    Annotation, Assign, Binary, Block, ClassDecl, CompilationUnit, Container, FieldAccess, Import,
    LeftPadded, MethodCall, MethodDecl, NamedVariable, Paren, ReturnStmt, RightPadded, Space, Tree,
    Unary, VarDecls,
};
use crate::cursor::Cursor;

pub trait TreeVisitor {
    /// Dispatches on the node variant. `cursor`'s focus is `tree`.
    fn visit_tree(&mut self, tree: &Tree, cursor: &Cursor) -> Tree {
        dispatch(self, tree, cursor)
    }

    fn visit_unit(&mut self, unit: &CompilationUnit, cursor: &Cursor) -> CompilationUnit {
        walk_unit(self, unit, cursor)
    }

    fn visit_class(&mut self, class: &ClassDecl, cursor: &Cursor) -> ClassDecl {
        walk_class(self, class, cursor)
    }

    fn visit_method(&mut self, method: &MethodDecl, cursor: &Cursor) -> MethodDecl {
        walk_method(self, method, cursor)
    }

    fn visit_block(&mut self, block: &Block, cursor: &Cursor) -> Block {
        walk_block(self, block, cursor)
    }

    fn visit_var_decls(&mut self, decls: &VarDecls, cursor: &Cursor) -> VarDecls {
        walk_var_decls(self, decls, cursor)
    }

    fn visit_variable(&mut self, variable: &NamedVariable, cursor: &Cursor) -> NamedVariable {
        walk_variable(self, variable, cursor)
    }

    fn visit_space(&mut self, space: &Space, _cursor: &Cursor) -> Space {
        space.clone()
    }
}

/// Runs a visitor from the root with a fresh cursor.
pub fn visit_root<V: TreeVisitor + ?Sized>(v: &mut V, root: &Tree) -> Tree {
    let cursor = Cursor::new(root.clone());
    v.visit_tree(root, &cursor)
}

pub fn dispatch<V: TreeVisitor + ?Sized>(v: &mut V, tree: &Tree, cursor: &Cursor) -> Tree {
    match tree {
        Tree::Unit(u) => Tree::Unit(Arc::new(v.visit_unit(u, cursor))),
        Tree::Class(c) => Tree::Class(Arc::new(v.visit_class(c, cursor))),
        Tree::Method(m) => Tree::Method(Arc::new(v.visit_method(m, cursor))),
        Tree::Block(b) => Tree::Block(Arc::new(v.visit_block(b, cursor))),
        Tree::VarDecls(d) => Tree::VarDecls(Arc::new(v.visit_var_decls(d, cursor))),
        Tree::Variable(n) => Tree::Variable(Arc::new(v.visit_variable(n, cursor))),
        _ => walk_other(v, tree, cursor),
    }
}

// ============================================================================
// WALK HELPERS
// ============================================================================

/// Visits a child node under `parent`, extending the cursor.
pub fn visit_child<V: TreeVisitor + ?Sized>(v: &mut V, child: &Tree, parent: &Cursor) -> Tree {
    let cursor = parent.child(child.clone());
    v.visit_tree(child, &cursor)
}

/// Visits a right-padded element; the after space is visited with the
/// cursor at the element it pads.
pub fn visit_padded<V: TreeVisitor + ?Sized>(
    v: &mut V,
    padded: &RightPadded<Tree>,
    parent: &Cursor,
) -> RightPadded<Tree> {
    let cursor = parent.child(padded.elem.clone());
    let elem = v.visit_tree(&padded.elem, &cursor);
    let after = v.visit_space(&padded.after, &cursor);
    RightPadded { elem, after }
}

fn visit_container<V: TreeVisitor + ?Sized>(
    v: &mut V,
    container: &Container,
    parent: &Cursor,
) -> Container {
    Container {
        before: v.visit_space(&container.before, parent),
        elems: container
            .elems
            .iter()
            .map(|e| visit_padded(v, e, parent))
            .collect(),
    }
}

fn visit_opt_space<V: TreeVisitor + ?Sized>(
    v: &mut V,
    space: &Option<Space>,
    cursor: &Cursor,
) -> Option<Space> {
    space.as_ref().map(|s| v.visit_space(s, cursor))
}

// ============================================================================
// DEFAULT WALKS
// ============================================================================

pub fn walk_unit<V: TreeVisitor + ?Sized>(
    v: &mut V,
    unit: &CompilationUnit,
    cursor: &Cursor,
) -> CompilationUnit {
    let prefix = v.visit_space(&unit.prefix, cursor);
    let imports = unit
        .imports
        .iter()
        .map(|i| visit_padded(v, i, cursor))
        .collect();
    let classes = unit
        .classes
        .iter()
        .map(|c| visit_child(v, c, cursor))
        .collect();
    let eof = v.visit_space(&unit.eof, cursor);
    CompilationUnit {
        id: unit.id,
        prefix,
        imports,
        classes,
        eof,
    }
}

pub fn walk_class<V: TreeVisitor + ?Sized>(
    v: &mut V,
    class: &ClassDecl,
    cursor: &Cursor,
) -> ClassDecl {
    let prefix = v.visit_space(&class.prefix, cursor);
    let modifiers = class
        .modifiers
        .iter()
        .map(|m| visit_child(v, m, cursor))
        .collect();
    let kind_prefix = v.visit_space(&class.kind_prefix, cursor);
    let body_tree = Tree::Block(class.body.clone());
    let body_cursor = cursor.child(body_tree.clone());
    let body = Arc::new(v.visit_block(&class.body, &body_cursor));
    ClassDecl {
        id: class.id,
        prefix,
        modifiers,
        kind_prefix,
        name: class.name.clone(),
        body,
    }
}

pub fn walk_method<V: TreeVisitor + ?Sized>(
    v: &mut V,
    method: &MethodDecl,
    cursor: &Cursor,
) -> MethodDecl {
    let prefix = v.visit_space(&method.prefix, cursor);
    let annotations = method
        .annotations
        .iter()
        .map(|a| visit_child(v, a, cursor))
        .collect();
    let modifiers = method
        .modifiers
        .iter()
        .map(|m| visit_child(v, m, cursor))
        .collect();
    let return_type_tree = Tree::TypeRef(method.return_type.clone());
    let return_type = match visit_child(v, &return_type_tree, cursor) {
        Tree::TypeRef(t) => t,
        _ => method.return_type.clone(),
    };
    let params = visit_container(v, &method.params, cursor);
    let body = method.body.as_ref().map(|b| {
        let body_tree = Tree::Block(b.clone());
        let body_cursor = cursor.child(body_tree);
        Arc::new(v.visit_block(b, &body_cursor))
    });
    let semi = visit_opt_space(v, &method.semi, cursor);
    MethodDecl {
        id: method.id,
        prefix,
        annotations,
        modifiers,
        return_type,
        name: method.name.clone(),
        params,
        body,
        semi,
    }
}

pub fn walk_block<V: TreeVisitor + ?Sized>(v: &mut V, block: &Block, cursor: &Cursor) -> Block {
    let prefix = v.visit_space(&block.prefix, cursor);
    let statik = visit_opt_space(v, &block.statik, cursor);
    let statements = block
        .statements
        .iter()
        .map(|s| visit_padded(v, s, cursor))
        .collect();
    let end = v.visit_space(&block.end, cursor);
    Block {
        id: block.id,
        prefix,
        statik,
        statements,
        end,
    }
}

pub fn walk_var_decls<V: TreeVisitor + ?Sized>(
    v: &mut V,
    decls: &VarDecls,
    cursor: &Cursor,
) -> VarDecls {
    let prefix = v.visit_space(&decls.prefix, cursor);
    let modifiers = decls
        .modifiers
        .iter()
        .map(|m| visit_child(v, m, cursor))
        .collect();
    let type_ref_tree = Tree::TypeRef(decls.type_ref.clone());
    let type_ref = match visit_child(v, &type_ref_tree, cursor) {
        Tree::TypeRef(t) => t,
        _ => decls.type_ref.clone(),
    };
    let vars = decls
        .vars
        .iter()
        .map(|n| visit_padded(v, n, cursor))
        .collect();
    VarDecls {
        id: decls.id,
        prefix,
        modifiers,
        type_ref,
        vars,
    }
}

pub fn walk_variable<V: TreeVisitor + ?Sized>(
    v: &mut V,
    variable: &NamedVariable,
    cursor: &Cursor,
) -> NamedVariable {
    let prefix = v.visit_space(&variable.prefix, cursor);
    let initializer = variable.initializer.as_ref().map(|init| {
        let before = v.visit_space(&init.before, cursor);
        let elem = visit_child(v, &init.elem, cursor);
        LeftPadded { before, elem }
    });
    NamedVariable {
        id: variable.id,
        prefix,
        name: variable.name.clone(),
        initializer,
    }
}

fn walk_other<V: TreeVisitor + ?Sized>(v: &mut V, tree: &Tree, cursor: &Cursor) -> Tree {
    match tree {
        Tree::Import(i) => {
            let prefix = v.visit_space(&i.prefix, cursor);
            let statik = visit_opt_space(v, &i.statik, cursor);
            let before = v.visit_space(&i.qualid.before, cursor);
            Tree::Import(Arc::new(Import {
                id: i.id,
                prefix,
                statik,
                qualid: LeftPadded {
                    before,
                    elem: i.qualid.elem.clone(),
                },
            }))
        }
        Tree::Annotation(a) => {
            let prefix = v.visit_space(&a.prefix, cursor);
            Tree::Annotation(Arc::new(Annotation {
                id: a.id,
                prefix,
                name: a.name.clone(),
            }))
        }
        Tree::Return(r) => {
            let prefix = v.visit_space(&r.prefix, cursor);
            let expr = r.expr.as_ref().map(|e| visit_child(v, e, cursor));
            Tree::Return(Arc::new(ReturnStmt {
                id: r.id,
                prefix,
                expr,
            }))
        }
        Tree::Assign(a) => {
            let prefix = v.visit_space(&a.prefix, cursor);
            let target = visit_child(v, &a.target, cursor);
            let before = v.visit_space(&a.expr.before, cursor);
            let elem = visit_child(v, &a.expr.elem, cursor);
            Tree::Assign(Arc::new(Assign {
                id: a.id,
                prefix,
                target,
                expr: LeftPadded { before, elem },
            }))
        }
        Tree::Binary(b) => {
            let prefix = v.visit_space(&b.prefix, cursor);
            let left = visit_child(v, &b.left, cursor);
            let op_before = v.visit_space(&b.op.before, cursor);
            let right = visit_child(v, &b.right, cursor);
            Tree::Binary(Arc::new(Binary {
                id: b.id,
                prefix,
                left,
                op: LeftPadded {
                    before: op_before,
                    elem: b.op.elem,
                },
                right,
            }))
        }
        Tree::Unary(u) => {
            let prefix = v.visit_space(&u.prefix, cursor);
            let expr = visit_child(v, &u.expr, cursor);
            Tree::Unary(Arc::new(Unary {
                id: u.id,
                prefix,
                op: u.op,
                expr,
            }))
        }
        Tree::Paren(p) => {
            let prefix = v.visit_space(&p.prefix, cursor);
            let expr = visit_padded(v, &p.expr, cursor);
            Tree::Paren(Arc::new(Paren {
                id: p.id,
                prefix,
                expr,
            }))
        }
        Tree::FieldAccess(f) => {
            let prefix = v.visit_space(&f.prefix, cursor);
            let target = visit_child(v, &f.target, cursor);
            let dot_prefix = v.visit_space(&f.dot_prefix, cursor);
            Tree::FieldAccess(Arc::new(FieldAccess {
                id: f.id,
                prefix,
                target,
                dot_prefix,
                name: f.name.clone(),
            }))
        }
        Tree::Call(c) => {
            let prefix = v.visit_space(&c.prefix, cursor);
            let select = c.select.as_ref().map(|s| visit_padded(v, s, cursor));
            let args = visit_container(v, &c.args, cursor);
            Tree::Call(Arc::new(MethodCall {
                id: c.id,
                prefix,
                select,
                name: c.name.clone(),
                args,
            }))
        }
        Tree::Modifier(_) | Tree::TypeRef(_) | Tree::Ident(_) | Tree::Literal(_)
        | Tree::Empty(_) => {
            let prefix = v.visit_space(tree.prefix(), cursor);
            tree.with_prefix(prefix)
        }
        // Handled by dispatch before reaching here.
        Tree::Unit(_)
        | Tree::Class(_)
        | Tree::Method(_)
        | Tree::Block(_)
        | Tree::VarDecls(_)
        | Tree::Variable(_) => dispatch(v, tree, cursor),
    }
}
