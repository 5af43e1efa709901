//! Search visitors and the recipe contract.
//!
//! A [`Recipe`] packages a named transformation; its visitor is part of the
//! public contract so runners invoke it directly instead of reflecting into
//! the implementation.

use crate::ast::{Tree, VarDecls};
use crate::cursor::Cursor;
use crate::visit::{visit_root, walk_var_decls, TreeVisitor};

pub trait Recipe {
    fn name(&self) -> &'static str;

    /// The visitor that performs this recipe's work.
    fn visitor(&self) -> Box<dyn TreeVisitor>;
}

/// Finds every variable declaration group whose type reference matches a
/// target name.
pub struct FindVariables {
    pub type_name: String,
}

impl FindVariables {
    pub fn new(type_name: impl Into<String>) -> Self {
        FindVariables {
            type_name: type_name.into(),
        }
    }
}

impl Recipe for FindVariables {
    fn name(&self) -> &'static str {
        "find-variables"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor> {
        Box::new(FindVariablesVisitor {
            type_name: self.type_name.clone(),
            found: Vec::new(),
        })
    }
}

pub struct FindVariablesVisitor {
    type_name: String,
    pub found: Vec<Tree>,
}

impl TreeVisitor for FindVariablesVisitor {
    fn visit_var_decls(&mut self, decls: &VarDecls, cursor: &Cursor) -> VarDecls {
        if decls.type_ref.name == self.type_name {
            self.found.push(cursor.value().clone());
        }
        walk_var_decls(self, decls, cursor)
    }
}

/// Convenience form of [`FindVariables`] for callers that just want the
/// matching nodes.
pub fn find_variables(root: &Tree, type_name: &str) -> Vec<Tree> {
    let mut visitor = FindVariablesVisitor {
        type_name: type_name.to_string(),
        found: Vec::new(),
    };
    visit_root(&mut visitor, root);
    visitor.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Parser;

    #[test]
    fn finds_fields_and_locals_by_type_name() {
        let unit = Parser::new()
            .parse("class A { int f = 0; String s = null; void m() { int x = 1; } }")
            .unwrap()
            .remove(0);

        let ints = find_variables(&unit, "int");
        assert_eq!(ints.len(), 2);
        let strings = find_variables(&unit, "String");
        assert_eq!(strings.len(), 1);
        assert_eq!(find_variables(&unit, "long").len(), 0);
    }

    #[test]
    fn the_recipe_contract_exposes_its_visitor() {
        let recipe = FindVariables::new("int");
        assert_eq!(recipe.name(), "find-variables");
        let _visitor = recipe.visitor();
    }
}
