//! Ancestry paths into a tree.
//!
//! A [`Cursor`] is the ordered sequence of nodes from a compilation unit
//! down to a focus node. Cursors borrow node handles; they never extend a
//! tree's lifetime and are only valid for the tree version that produced
//! them.

use crate::ast::{Tree, TreeKind};

#[derive(Debug, Clone)]
pub struct Cursor {
    path: Vec<Tree>,
}

impl Cursor {
    /// A cursor whose path is just the root. The root of a well-formed
    /// cursor is a compilation unit.
    pub fn new(root: Tree) -> Self {
        Cursor { path: vec![root] }
    }

    /// Extends the path one level deeper.
    pub fn child(&self, tree: Tree) -> Cursor {
        let mut path = self.path.clone();
        path.push(tree);
        Cursor { path }
    }

    /// The focus node.
    pub fn value(&self) -> &Tree {
        self.path.last().expect("cursor path is never empty")
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Root-to-focus path.
    pub fn path(&self) -> &[Tree] {
        &self.path
    }

    /// The cursor one step shallower, or `None` at the root.
    pub fn parent(&self) -> Option<Cursor> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Cursor {
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Nearest strict ancestor satisfying the predicate.
    pub fn drop_parent_until(&self, pred: impl Fn(&Tree) -> bool) -> Option<Cursor> {
        let mut cursor = self.parent();
        while let Some(c) = cursor {
            if pred(c.value()) {
                return Some(c);
            }
            cursor = c.parent();
        }
        None
    }

    /// Nearest node of the given kind, starting at the focus itself.
    pub fn first_enclosing(&self, kind: TreeKind) -> Option<&Tree> {
        self.path.iter().rev().find(|t| t.kind() == kind)
    }

    /// Whether any node on the path has the given identity.
    pub fn contains(&self, tree: &Tree) -> bool {
        let id = tree.id();
        self.path.iter().any(|t| t.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Parser;

    fn parse_unit(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser.parse(source).unwrap().remove(0)
    }

    fn first_class(unit: &Tree) -> Tree {
        unit.as_unit().unwrap().classes[0].clone()
    }

    #[test]
    fn parent_walks_toward_the_root() {
        let unit = parse_unit("class A {}");
        let class = first_class(&unit);
        let cursor = Cursor::new(unit.clone()).child(class);

        assert_eq!(cursor.depth(), 2);
        let parent = cursor.parent().unwrap();
        assert_eq!(parent.depth(), 1);
        assert!(matches!(parent.value(), Tree::Unit(_)));
        assert!(parent.parent().is_none());
    }

    #[test]
    fn first_enclosing_finds_the_unit_from_any_depth() {
        let unit = parse_unit("class A {}");
        let class = first_class(&unit);
        let cursor = Cursor::new(unit.clone()).child(class);

        let enclosing = cursor.first_enclosing(TreeKind::Unit).unwrap();
        assert_eq!(enclosing.id(), unit.id());
    }

    #[test]
    fn contains_matches_by_identity() {
        let unit = parse_unit("class A {}");
        let class = first_class(&unit);
        let cursor = Cursor::new(unit.clone()).child(class.clone());

        assert!(cursor.contains(&class));
        assert!(cursor.contains(&unit));

        let other = parse_unit("class B {}");
        assert!(!cursor.contains(&other));
    }

    #[test]
    fn drop_parent_until_skips_to_the_matching_ancestor() {
        let unit = parse_unit("class A {}");
        let class = first_class(&unit);
        let body = match &class {
            Tree::Class(c) => Tree::Block(c.body.clone()),
            _ => panic!("expected a class declaration"),
        };
        let cursor = Cursor::new(unit).child(class).child(body);

        let found = cursor
            .drop_parent_until(|t| matches!(t, Tree::Unit(_)))
            .unwrap();
        assert_eq!(found.depth(), 1);
    }
}
