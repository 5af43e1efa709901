//! Construction helpers for fresh nodes.
//!
//! Parsed trees come from the parser; these helpers cover the places that
//! need to mint nodes by hand, mainly tests and template parameters.

use std::sync::Arc;

use super::{
    Empty, Ident, Literal, LiteralValue, Modifier, ModifierKind, NodeId, Space, Tree, TypeRef,
};

pub fn ident(name: impl Into<String>) -> Tree {
    Tree::Ident(Arc::new(Ident {
        id: NodeId::fresh(),
        prefix: Space::empty(),
        simple_name: name.into(),
    }))
}

pub fn modifier(kind: ModifierKind) -> Tree {
    Tree::Modifier(Arc::new(Modifier {
        id: NodeId::fresh(),
        prefix: Space::empty(),
        kind,
    }))
}

pub fn type_ref(name: impl Into<String>) -> Tree {
    Tree::TypeRef(Arc::new(TypeRef {
        id: NodeId::fresh(),
        prefix: Space::empty(),
        name: name.into(),
    }))
}

pub fn int_literal(value: i64) -> Tree {
    Tree::Literal(Arc::new(Literal {
        id: NodeId::fresh(),
        prefix: Space::empty(),
        value: LiteralValue::Int(value),
        value_source: value.to_string(),
    }))
}

pub fn str_literal(value: impl Into<String>) -> Tree {
    let value = value.into();
    Tree::Literal(Arc::new(Literal {
        id: NodeId::fresh(),
        prefix: Space::empty(),
        value_source: format!("\"{}\"", value),
        value: LiteralValue::Str(value),
    }))
}

pub fn empty() -> Tree {
    Tree::Empty(Arc::new(Empty {
        id: NodeId::fresh(),
        prefix: Space::empty(),
    }))
}
