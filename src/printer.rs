//! Lossless source printing.
//!
//! [`Printer`] emits a tree exactly as it was parsed: every node writes its
//! prefix trivia, its tokens, and its children in order. The trait exposes
//! [`Printer::pre_node`] and [`Printer::post_node`] hooks around every
//! dispatched node plus one overridable method per variant; the template
//! emitter is a `Printer` with a single-shot splice in those hooks.
//!
//! The block printer owns statement semicolons: a statement's own print
//! never emits the trailing `;`, which is why an after-splice has to
//! prepend one.

use crate::ast::{
    Annotation, Assign, Binary, Block, ClassDecl, CompilationUnit, Container, Empty, FieldAccess,
    Ident, Import, Literal, MethodCall, MethodDecl, Modifier, NamedVariable, Paren, ReturnStmt,
    Tree, TypeRef, Unary, VarDecls,
};

pub trait Printer {
    /// Runs immediately before a node's own emission.
    fn pre_node(&mut self, _tree: &Tree, _out: &mut String) {}

    /// Runs immediately after a node's own emission, before any separator
    /// the parent adds.
    fn post_node(&mut self, _tree: &Tree, _out: &mut String) {}

    fn print_tree(&mut self, tree: &Tree, out: &mut String) {
        self.pre_node(tree, out);
        match tree {
            Tree::Unit(n) => self.print_unit(n, out),
            Tree::Import(n) => self.print_import(n, out),
            Tree::Class(n) => self.print_class(n, out),
            Tree::Method(n) => self.print_method(n, out),
            Tree::Annotation(n) => self.print_annotation(n, out),
            Tree::Modifier(n) => self.print_modifier(n, out),
            Tree::Block(n) => self.print_block(n, out),
            Tree::VarDecls(n) => self.print_var_decls(n, out),
            Tree::Variable(n) => self.print_variable(n, out),
            Tree::TypeRef(n) => self.print_type_ref(n, out),
            Tree::Return(n) => self.print_return(n, out),
            Tree::Assign(n) => self.print_assign(n, out),
            Tree::Binary(n) => self.print_binary(n, out),
            Tree::Unary(n) => self.print_unary(n, out),
            Tree::Paren(n) => self.print_paren(n, out),
            Tree::FieldAccess(n) => self.print_field_access(n, out),
            Tree::Call(n) => self.print_call(n, out),
            Tree::Ident(n) => self.print_ident(n, out),
            Tree::Literal(n) => self.print_literal(n, out),
            Tree::Empty(n) => self.print_empty(n, out),
        }
        self.post_node(tree, out);
    }

    fn print_unit(&mut self, unit: &CompilationUnit, out: &mut String) {
        unit.prefix.write_to(out);
        for import in &unit.imports {
            self.print_tree(&import.elem, out);
            import.after.write_to(out);
            out.push(';');
        }
        for class in &unit.classes {
            self.print_tree(class, out);
        }
        unit.eof.write_to(out);
    }

    fn print_import(&mut self, import: &Import, out: &mut String) {
        import.prefix.write_to(out);
        out.push_str("import");
        if let Some(space) = &import.statik {
            space.write_to(out);
            out.push_str("static");
        }
        import.qualid.before.write_to(out);
        out.push_str(&import.qualid.elem);
    }

    fn print_class(&mut self, class: &ClassDecl, out: &mut String) {
        class.prefix.write_to(out);
        for modifier in &class.modifiers {
            self.print_tree(modifier, out);
        }
        class.kind_prefix.write_to(out);
        out.push_str("class");
        self.print_ident(&class.name, out);
        self.print_tree(&Tree::Block(class.body.clone()), out);
    }

    fn print_method(&mut self, method: &MethodDecl, out: &mut String) {
        method.prefix.write_to(out);
        for annotation in &method.annotations {
            self.print_tree(annotation, out);
        }
        for modifier in &method.modifiers {
            self.print_tree(modifier, out);
        }
        self.print_type_ref(&method.return_type, out);
        self.print_ident(&method.name, out);
        self.print_container(&method.params, out);
        match &method.body {
            Some(body) => self.print_tree(&Tree::Block(body.clone()), out),
            None => {
                if let Some(space) = &method.semi {
                    space.write_to(out);
                }
                out.push(';');
            }
        }
    }

    fn print_annotation(&mut self, annotation: &Annotation, out: &mut String) {
        annotation.prefix.write_to(out);
        out.push('@');
        self.print_ident(&annotation.name, out);
    }

    fn print_modifier(&mut self, modifier: &Modifier, out: &mut String) {
        modifier.prefix.write_to(out);
        out.push_str(modifier.kind.keyword());
    }

    fn print_block(&mut self, block: &Block, out: &mut String) {
        block.prefix.write_to(out);
        if let Some(space) = &block.statik {
            out.push_str("static");
            space.write_to(out);
        }
        out.push('{');
        for statement in &block.statements {
            self.print_tree(&statement.elem, out);
            statement.after.write_to(out);
            if statement.elem.requires_semicolon() {
                out.push(';');
            }
        }
        block.end.write_to(out);
        out.push('}');
    }

    fn print_var_decls(&mut self, decls: &VarDecls, out: &mut String) {
        decls.prefix.write_to(out);
        for modifier in &decls.modifiers {
            self.print_tree(modifier, out);
        }
        self.print_type_ref(&decls.type_ref, out);
        let last = decls.vars.len().saturating_sub(1);
        for (i, var) in decls.vars.iter().enumerate() {
            self.print_tree(&var.elem, out);
            var.after.write_to(out);
            if i < last {
                out.push(',');
            }
        }
    }

    fn print_variable(&mut self, variable: &NamedVariable, out: &mut String) {
        variable.prefix.write_to(out);
        self.print_ident(&variable.name, out);
        if let Some(init) = &variable.initializer {
            init.before.write_to(out);
            out.push('=');
            self.print_tree(&init.elem, out);
        }
    }

    fn print_type_ref(&mut self, type_ref: &TypeRef, out: &mut String) {
        type_ref.prefix.write_to(out);
        out.push_str(&type_ref.name);
    }

    fn print_return(&mut self, ret: &ReturnStmt, out: &mut String) {
        ret.prefix.write_to(out);
        out.push_str("return");
        if let Some(expr) = &ret.expr {
            self.print_tree(expr, out);
        }
    }

    fn print_assign(&mut self, assign: &Assign, out: &mut String) {
        assign.prefix.write_to(out);
        self.print_tree(&assign.target, out);
        assign.expr.before.write_to(out);
        out.push('=');
        self.print_tree(&assign.expr.elem, out);
    }

    fn print_binary(&mut self, binary: &Binary, out: &mut String) {
        binary.prefix.write_to(out);
        self.print_tree(&binary.left, out);
        binary.op.before.write_to(out);
        out.push_str(binary.op.elem.symbol());
        self.print_tree(&binary.right, out);
    }

    fn print_unary(&mut self, unary: &Unary, out: &mut String) {
        unary.prefix.write_to(out);
        out.push_str(unary.op.symbol());
        self.print_tree(&unary.expr, out);
    }

    fn print_paren(&mut self, paren: &Paren, out: &mut String) {
        paren.prefix.write_to(out);
        out.push('(');
        self.print_tree(&paren.expr.elem, out);
        paren.expr.after.write_to(out);
        out.push(')');
    }

    fn print_field_access(&mut self, access: &FieldAccess, out: &mut String) {
        access.prefix.write_to(out);
        self.print_tree(&access.target, out);
        access.dot_prefix.write_to(out);
        out.push('.');
        self.print_ident(&access.name, out);
    }

    fn print_call(&mut self, call: &MethodCall, out: &mut String) {
        call.prefix.write_to(out);
        if let Some(select) = &call.select {
            self.print_tree(&select.elem, out);
            select.after.write_to(out);
            out.push('.');
        }
        self.print_ident(&call.name, out);
        self.print_container(&call.args, out);
    }

    fn print_ident(&mut self, ident: &Ident, out: &mut String) {
        ident.prefix.write_to(out);
        out.push_str(&ident.simple_name);
    }

    fn print_literal(&mut self, literal: &Literal, out: &mut String) {
        literal.prefix.write_to(out);
        out.push_str(&literal.value_source);
    }

    fn print_empty(&mut self, empty: &Empty, out: &mut String) {
        empty.prefix.write_to(out);
    }

    fn print_container(&mut self, container: &Container, out: &mut String) {
        container.before.write_to(out);
        out.push('(');
        let last = container.elems.len().saturating_sub(1);
        for (i, elem) in container.elems.iter().enumerate() {
            self.print_tree(&elem.elem, out);
            elem.after.write_to(out);
            if i < last {
                out.push(',');
            }
        }
        out.push(')');
    }
}

/// Prints source exactly as parsed.
pub struct DefaultPrinter;

impl Printer for DefaultPrinter {}

/// Prints a tree with the default printer.
pub fn print(tree: &Tree) -> String {
    let mut out = String::new();
    DefaultPrinter.print_tree(tree, &mut out);
    out
}

impl Tree {
    pub fn print(&self) -> String {
        print(self)
    }

    /// Printed form with surrounding whitespace removed; the form parameter
    /// substitution uses.
    pub fn print_trimmed(&self) -> String {
        self.print().trim().to_string()
    }
}
