// tests/template_tests.rs

use std::collections::HashSet;
use std::sync::Arc;

use graft::ast::{Block, NodeId, Space, Tree};
use graft::cursor::Cursor;
use graft::errors::{ErrorCategory, ErrorKind};
use graft::syntax::Parser;
use graft::template::{Param, Template, SNIPPET_MARKER_END, SNIPPET_MARKER_START};
use graft::visit::{visit_root, TreeVisitor};

// ---
// Host navigation helpers
// ---

fn parse(source: &str) -> Tree {
    Parser::new().parse(source).unwrap().remove(0)
}

fn first_class(unit: &Tree) -> Tree {
    unit.as_unit().unwrap().classes[0].clone()
}

fn class_body(class: &Tree) -> Arc<Block> {
    match class {
        Tree::Class(c) => c.body.clone(),
        _ => panic!("expected a class declaration"),
    }
}

fn method_body(method: &Tree) -> Arc<Block> {
    match method {
        Tree::Method(m) => m.body.clone().expect("method has a body"),
        _ => panic!("expected a method declaration"),
    }
}

/// Cursor to the `index`-th statement of the first method of the first
/// class.
fn cursor_to_method_statement(unit: &Tree, index: usize) -> Cursor {
    let class = first_class(unit);
    let body = class_body(&class);
    let method = body.statements[0].elem.clone();
    let mblock = method_body(&method);
    let statement = mblock.statements[index].elem.clone();
    Cursor::new(unit.clone())
        .child(class)
        .child(Tree::Block(body))
        .child(method)
        .child(Tree::Block(mblock))
        .child(statement)
}

/// Cursor to the initialiser expression of the first field of the first
/// class.
fn cursor_to_field_initializer(unit: &Tree) -> Cursor {
    let class = first_class(unit);
    let body = class_body(&class);
    let field = body.statements[0].elem.clone();
    let variable = match &field {
        Tree::VarDecls(d) => d.vars[0].elem.clone(),
        _ => panic!("expected a field declaration"),
    };
    let init = match &variable {
        Tree::Variable(v) => v.initializer.as_ref().expect("field has initialiser").elem.clone(),
        _ => panic!("expected a named variable"),
    };
    Cursor::new(unit.clone())
        .child(class)
        .child(Tree::Block(body))
        .child(field)
        .child(variable)
        .child(init)
}

/// Every node identity reachable from `root`.
fn all_ids(root: &Tree) -> HashSet<NodeId> {
    struct IdCollector {
        ids: HashSet<NodeId>,
    }
    impl TreeVisitor for IdCollector {
        fn visit_space(&mut self, space: &Space, cursor: &Cursor) -> Space {
            self.ids.insert(cursor.value().id());
            space.clone()
        }
    }
    let mut collector = IdCollector {
        ids: HashSet::new(),
    };
    visit_root(&mut collector, root);
    collector.ids
}

// ---
// Scenario: statement after statement
// ---

#[test]
fn statement_inserted_after_a_statement() {
    let host = parse("class A { void m() { int x = 1; int y = 2; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("System.out.println(#{});")
        .imports(["java.lang.System"])
        .unwrap()
        .build()
        .unwrap();

    let snippets = template.generate_after(&cursor, &[Param::from("x")]).unwrap();
    assert_eq!(snippets.len(), 1);
    assert!(matches!(snippets[0], Tree::Call(_)));
    assert_eq!(snippets[0].print_trimmed(), "System.out.println(x)");
}

#[test]
fn generated_identities_are_new() {
    let host = parse("class A { void m() { int x = 1; int y = 2; } }");
    let cursor = cursor_to_method_statement(&host, 0);
    let host_ids = all_ids(&host);

    let template = Template::builder("System.out.println(#{});")
        .imports(["java.lang.System"])
        .unwrap()
        .build()
        .unwrap();

    for snippets in [
        template.generate_before(&cursor, &[Param::from("x")]).unwrap(),
        template.generate_after(&cursor, &[Param::from("x")]).unwrap(),
    ] {
        for snippet in &snippets {
            let snippet_ids = all_ids(snippet);
            assert!(
                snippet_ids.is_disjoint(&host_ids),
                "snippet reused a host identity"
            );
        }
    }
}

#[test]
fn generation_is_idempotent_up_to_identity() {
    let host = parse("class A { void m() { int x = 1; int y = 2; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("System.out.println(#{});")
        .imports(["java.lang.System"])
        .unwrap()
        .build()
        .unwrap();

    let first = template.generate_after(&cursor, &[Param::from("x")]).unwrap();
    let second = template.generate_after(&cursor, &[Param::from("x")]).unwrap();

    let first_printed: Vec<String> = first.iter().map(|t| t.print()).collect();
    let second_printed: Vec<String> = second.iter().map(|t| t.print()).collect();
    assert_eq!(first_printed, second_printed);
    assert_ne!(first[0].id(), second[0].id());
}

#[test]
fn start_marker_never_appears_in_returned_prefixes() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("int fresh = 1;").build().unwrap();
    let snippets = template.generate_after(&cursor, &[]).unwrap();

    for snippet in &snippets {
        for comment in &snippet.prefix().comments {
            assert_ne!(comment.text, SNIPPET_MARKER_START);
            assert_ne!(comment.text, SNIPPET_MARKER_END);
        }
    }
}

// ---
// Scenario: field initialiser (member-initialiser path)
// ---

#[test]
fn field_initializer_insertion_unwraps_the_synthetic_block() {
    let host = parse("class A { int f = 0; }");
    let cursor = cursor_to_field_initializer(&host);

    let template = Template::builder("1 + #{}").build().unwrap();
    let snippets = template.generate_before(&cursor, &[Param::from(2)]).unwrap();

    assert_eq!(snippets.len(), 1);
    assert!(matches!(snippets[0], Tree::Binary(_)));
    assert_eq!(snippets[0].print_trimmed(), "1 + 2");
}

#[test]
fn field_initializer_insertion_after_the_field() {
    let host = parse("class A { int f = 0; }");
    let cursor = cursor_to_field_initializer(&host);

    let template = Template::builder("1 + #{}").build().unwrap();
    let snippets = template.generate_after(&cursor, &[Param::from(2)]).unwrap();

    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].print_trimmed(), "1 + 2");
}

// ---
// Scenario: before the first declaration, no imports
// ---

#[test]
fn class_inserted_before_the_first_declaration() {
    let host = parse("class A {}");
    let class = first_class(&host);
    let cursor = Cursor::new(host.clone()).child(class);

    let template = Template::builder("class B {}").build().unwrap();
    let snippets = template.generate_before(&cursor, &[]).unwrap();

    assert_eq!(snippets.len(), 1);
    assert!(matches!(snippets[0], Tree::Class(_)));
    assert!(snippets[0].print_trimmed().starts_with("class B"));
}

#[test]
fn multiple_classes_before_the_first_declaration() {
    let host = parse("class A {}");
    let class = first_class(&host);
    let cursor = Cursor::new(host.clone()).child(class);

    let template = Template::builder("class B {} class C {}").build().unwrap();
    let snippets = template.generate_before(&cursor, &[]).unwrap();

    assert_eq!(snippets.len(), 2);
    assert!(snippets[0].print_trimmed().starts_with("class B"));
    assert!(snippets[1].print_trimmed().starts_with("class C"));
}

#[test]
fn statements_at_unit_level_surface_a_parse_error() {
    let host = parse("class A {}");
    let class = first_class(&host);
    let cursor = Cursor::new(host.clone()).child(class);

    let template = Template::builder("int a = 1; int b = 2;").build().unwrap();
    let err = template.generate_before(&cursor, &[]).unwrap_err();
    assert_eq!(err.kind.category(), ErrorCategory::Parse);
}

// ---
// Scenario: renaming collision
// ---

#[test]
fn on_path_declaration_is_renamed_out_of_the_way() {
    let host = parse("class A { void m(int i) { int j = i; } }");
    let statement_cursor = cursor_to_method_statement(&host, 0);
    let variable = match statement_cursor.value() {
        Tree::VarDecls(d) => d.vars[0].elem.clone(),
        _ => panic!("expected declaration"),
    };
    let init = match &variable {
        Tree::Variable(v) => v.initializer.as_ref().unwrap().elem.clone(),
        _ => panic!("expected variable"),
    };
    let cursor = statement_cursor.child(variable).child(init);

    // The template redeclares `j`; the pruned host declaration must not
    // collide with it.
    let template = Template::builder("int j = #{};").build().unwrap();
    let snippets = template.generate_after(&cursor, &[Param::from(42)]).unwrap();

    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].print_trimmed(), "int j = 42");
}

// ---
// Scenario: multiple statements extracted
// ---

#[test]
fn multiple_statements_come_back_in_source_order() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("int a = 1; int b = 2;").build().unwrap();
    let snippets = template.generate_after(&cursor, &[]).unwrap();

    assert_eq!(snippets.len(), 2);
    assert!(matches!(snippets[0], Tree::VarDecls(_)));
    assert!(matches!(snippets[1], Tree::VarDecls(_)));
    assert_eq!(snippets[0].print_trimmed(), "int a = 1");
    assert_eq!(snippets[1].print_trimmed(), "int b = 2");
}

#[test]
fn no_returned_node_is_an_ancestor_of_another() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("int a = #{} + #{};").build().unwrap();
    let snippets = template
        .generate_after(&cursor, &[Param::from(1), Param::from(2)])
        .unwrap();

    assert_eq!(snippets.len(), 1);
    let ids = all_ids(&snippets[0]);
    // The statement subsumes its sub-expressions; none come back separately.
    assert!(ids.len() > 1);
}

// ---
// Scenario: placeholder arity mismatch
// ---

#[test]
fn arity_mismatch_is_an_argument_error() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("#{} + #{}").build().unwrap();
    let err = template.generate_after(&cursor, &[Param::from(1)]).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::ArityMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert_eq!(err.kind.category(), ErrorCategory::Argument);
}

// ---
// Substitution behavior
// ---

#[test]
fn tree_parameters_substitute_as_trimmed_source() {
    let host = parse("class A { void m() { int x = 1; int y = 2; } }");
    let cursor = cursor_to_method_statement(&host, 1);

    // Use the host's own `x` declaration's initialiser as the parameter.
    let x_init = {
        let decls = match cursor_to_method_statement(&host, 0).value() {
            Tree::VarDecls(d) => d.clone(),
            _ => panic!("expected declaration"),
        };
        match &decls.vars[0].elem {
            Tree::Variable(v) => v.initializer.as_ref().unwrap().elem.clone(),
            _ => panic!("expected variable"),
        }
    };

    let template = Template::builder("int z = #{};").build().unwrap();
    let snippets = template
        .generate_after(&cursor, &[Param::from(&x_init)])
        .unwrap();
    assert_eq!(snippets[0].print_trimmed(), "int z = 1");
}

#[test]
fn custom_parameter_marker() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("int a = $$;")
        .parameter_marker("$$")
        .unwrap()
        .build()
        .unwrap();
    let snippets = template
        .generate_after(&cursor, &[Param::from(graft::ast::builder::int_literal(7))])
        .unwrap();
    assert_eq!(snippets[0].print_trimmed(), "int a = 7");
}

#[test]
fn static_imports_are_carried_into_the_synthetic_unit() {
    let host = parse("class A { void m() { int x = 1; } }");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("emptyList()")
        .static_imports(["java.util.Collections.emptyList"])
        .unwrap()
        .build()
        .unwrap();
    let snippets = template.generate_after(&cursor, &[]).unwrap();
    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].print_trimmed(), "emptyList()");
}

// ---
// Error paths
// ---

#[test]
fn line_comment_swallowing_the_end_marker_is_an_extraction_error() {
    let host = parse("class A {\n    void m() {\n        int x = 1;\n    }\n}\n");
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("x = 1; // done").build().unwrap();
    let err = template.generate_after(&cursor, &[]).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::MissingEndMarker));
    assert_eq!(err.kind.category(), ErrorCategory::Extraction);
}

#[test]
fn host_tree_is_never_mutated() {
    let host = parse("class A { void m() { int x = 1; int y = 2; } }");
    let before = host.print();
    let cursor = cursor_to_method_statement(&host, 0);

    let template = Template::builder("int a = 1;").build().unwrap();
    template.generate_after(&cursor, &[]).unwrap();
    assert_eq!(host.print(), before);
}
