//! Marker-emitting printer.
//!
//! Prints the pruned unit and splices the substituted template text at the
//! insertion point, wrapped in the start and end marker comments. The
//! splice fires exactly once: node identities are unique, and only the
//! insertion focus matches.

use std::collections::BTreeSet;

use crate::ast::{CompilationUnit, Import, NodeId, Tree};
use crate::cursor::Cursor;
use crate::printer::Printer;
use crate::template::{SNIPPET_MARKER_END, SNIPPET_MARKER_START};

pub struct TemplatePrinter<'a> {
    after: bool,
    insertion_id: NodeId,
    /// The block printer adds `;` after the host statement; an after-splice
    /// runs before that happens and has to terminate the statement itself.
    prepend_semi: bool,
    block_start: &'static str,
    block_end: &'static str,
    template: &'a str,
    imports: &'a BTreeSet<String>,
}

impl<'a> TemplatePrinter<'a> {
    pub fn new(
        after: bool,
        member_initializer: bool,
        insertion_scope: &Cursor,
        template: &'a str,
        imports: &'a BTreeSet<String>,
    ) -> Self {
        let parent_is_block = insertion_scope
            .parent()
            .map_or(false, |p| matches!(p.value(), Tree::Block(_)));
        TemplatePrinter {
            after,
            insertion_id: insertion_scope.value().id(),
            prepend_semi: after && parent_is_block,
            block_start: if member_initializer { "{" } else { "" },
            block_end: if member_initializer { "}" } else { "" },
            template,
            imports,
        }
    }

    /// Prints the pruned unit with the template spliced in.
    pub fn print(&mut self, pruned: &Tree, out: &mut String) {
        self.print_tree(pruned, out);
    }

    fn splice(&self, out: &mut String) {
        out.push_str(self.block_start);
        out.push_str("/*");
        out.push_str(SNIPPET_MARKER_START);
        out.push_str("*/");
        out.push_str(self.template);
        out.push_str("/*");
        out.push_str(SNIPPET_MARKER_END);
        out.push_str("*/");
        out.push_str(self.block_end);
    }
}

impl Printer for TemplatePrinter<'_> {
    fn pre_node(&mut self, tree: &Tree, out: &mut String) {
        if !self.after && tree.id() == self.insertion_id {
            self.splice(out);
        }
    }

    fn post_node(&mut self, tree: &Tree, out: &mut String) {
        if self.after && tree.id() == self.insertion_id {
            if self.prepend_semi {
                out.push(';');
            }
            self.splice(out);
        }
    }

    fn print_unit(&mut self, unit: &CompilationUnit, out: &mut String) {
        unit.prefix.write_to(out);
        for import in &unit.imports {
            self.print_tree(&import.elem, out);
            import.after.write_to(out);
            out.push(';');
        }
        // The template's required imports go in ahead of the reparse, after
        // whatever the host already imports.
        for statement in self.imports.iter() {
            if unit.imports.iter().any(|i| import_matches(&i.elem, statement)) {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(statement);
        }
        for class in &unit.classes {
            self.print_tree(class, out);
        }
        unit.eof.write_to(out);
    }
}

/// Whether an existing host import already covers an `import x.y.Z;`
/// statement from the template's import set.
fn import_matches(existing: &Tree, statement: &str) -> bool {
    let Tree::Import(import) = existing else {
        return false;
    };
    canonical_import(import) == statement
}

fn canonical_import(import: &Import) -> String {
    if import.statik.is_some() {
        format!("import static {};", import.qualid.elem)
    } else {
        format!("import {};", import.qualid.elem)
    }
}
