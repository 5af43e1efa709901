// tests/parser_tests.rs

use pretty_assertions::assert_eq;

use graft::ast::{BinaryOp, CommentStyle, Tree};
use graft::errors::{ErrorCategory, ErrorKind};
use graft::syntax::Parser;

fn parse_one(source: &str) -> Tree {
    Parser::new()
        .parse(source)
        .expect("parse should succeed")
        .remove(0)
}

fn assert_round_trip(source: &str) {
    let unit = parse_one(source);
    assert_eq!(unit.print(), source, "round-trip failed for: {}", source);
}

// ---
// Lossless round-trips
// ---

#[test]
fn round_trip_minimal_class() {
    assert_round_trip("class A {}");
}

#[test]
fn round_trip_modifiers_and_fields() {
    assert_round_trip("public final class A { private int x = 1; static String s; }");
}

#[test]
fn round_trip_multi_variable_declaration() {
    assert_round_trip("class A { void m() { int x = 1, y, z = 3; } }");
}

#[test]
fn round_trip_methods_and_params() {
    assert_round_trip("class A { int add(int a, int b) { return a + b; } void empty() {} }");
}

#[test]
fn round_trip_bodiless_method() {
    assert_round_trip("abstract class A { abstract void m(); }");
}

#[test]
fn round_trip_annotations() {
    assert_round_trip("class A { @Override public void m() {} }");
}

#[test]
fn round_trip_static_initializer_and_nested_blocks() {
    assert_round_trip("class A { static { int x = 1; } void m() { { int y = 2; } } }");
}

#[test]
fn round_trip_imports() {
    assert_round_trip(
        "import java.util.List;\nimport static java.util.Collections.emptyList;\nimport java.util.*;\n\nclass A {}",
    );
}

#[test]
fn round_trip_expressions() {
    assert_round_trip(
        "class A { void m() { System.out.println(\"hi\"); x = (1 + 2) * -3; b = a != null && !done; c = 'c'; } }",
    );
}

#[test]
fn round_trip_comments_everywhere() {
    assert_round_trip(
        "// header\nclass A { /* body */ void m() { int x = 1; // trailing\n } }\n// footer\n",
    );
}

#[test]
fn round_trip_empty_statements() {
    assert_round_trip("class A { ; void m() { ; ; } }");
}

#[test]
fn round_trip_whitespace_shapes() {
    assert_round_trip("class A {\n    void m( ) {\n        int x = 1 ;\n    }\n}\n");
}

// ---
// Trivia ownership
// ---

#[test]
fn file_leading_trivia_belongs_to_the_unit() {
    let unit = parse_one("  /* lead */ class A {}");
    let cu = unit.as_unit().unwrap();
    assert_eq!(cu.prefix.whitespace, "  ");
    assert_eq!(cu.prefix.comments[0].style, CommentStyle::Block);
    assert_eq!(cu.prefix.comments[0].text, " lead ");
    assert!(cu.classes[0].prefix().is_empty());
}

#[test]
fn expression_chains_hoist_trivia_to_the_outermost_node() {
    let unit = parse_one("class A { void m() { /* marker */ System.out.println(x); } }");
    let cu = unit.as_unit().unwrap();
    let class = match &cu.classes[0] {
        Tree::Class(c) => c,
        _ => panic!("expected class"),
    };
    let method = match &class.body.statements[0].elem {
        Tree::Method(m) => m,
        _ => panic!("expected method"),
    };
    let statement = &method.body.as_ref().unwrap().statements[0].elem;
    assert!(matches!(statement, Tree::Call(_)));
    assert_eq!(statement.prefix().comments[0].text, " marker ");
}

#[test]
fn binary_operators_honor_precedence() {
    let unit = parse_one("class A { void m() { x = 1 + 2 * 3; } }");
    let cu = unit.as_unit().unwrap();
    let class = match &cu.classes[0] {
        Tree::Class(c) => c,
        _ => panic!("expected class"),
    };
    let method = match &class.body.statements[0].elem {
        Tree::Method(m) => m,
        _ => panic!("expected method"),
    };
    let assign = match &method.body.as_ref().unwrap().statements[0].elem {
        Tree::Assign(a) => a,
        _ => panic!("expected assignment"),
    };
    let add = match &assign.expr.elem {
        Tree::Binary(b) => b,
        _ => panic!("expected binary"),
    };
    assert_eq!(add.op.elem, BinaryOp::Add);
    assert!(matches!(&add.right, Tree::Binary(m) if m.op.elem == BinaryOp::Mul));
}

// ---
// Failures and warnings
// ---

#[test]
fn unclosed_block_fails() {
    let err = Parser::new().parse("class A {").unwrap_err();
    assert_eq!(err.kind.category(), ErrorCategory::Parse);
}

#[test]
fn unterminated_comment_fails() {
    let err = Parser::new().parse("class A {} /* oops").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnterminatedComment));
}

#[test]
fn top_level_statement_is_rejected() {
    let err = Parser::new().parse("int a = 1;").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
}

#[test]
fn duplicate_modifier_produces_a_warning() {
    let mut parser = Parser::new();
    parser.parse("public public class A {}").unwrap();
    assert_eq!(parser.warnings().len(), 1);
    assert!(parser.warnings()[0].contains("duplicate modifier"));

    parser.reset();
    assert!(parser.warnings().is_empty());
}

#[test]
fn reparsing_printed_output_is_stable() {
    let sources = [
        "class A { void m() { int x = 1; } }",
        "import a.b.C;\nclass D { int f = 0; }",
    ];
    for source in sources {
        let once = parse_one(source).print();
        let twice = parse_one(&once).print();
        assert_eq!(once, twice);
    }
}
