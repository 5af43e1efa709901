//! Templated snippet generation.
//!
//! A [`Template`] holds a source fragment with positional `#{}`
//! placeholders. Each generate call substitutes the parameters, prunes the
//! host unit down to the insertion point's context, prints that context
//! with the fragment spliced between marker comments, reparses the result,
//! extracts the sub-trees the markers bracket, and reformats them against
//! the host scope. The returned nodes are fresh: none of their identities
//! come from the host tree.

use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::ast::{LeftPadded, RightPadded, Tree, TreeKind};
use crate::cursor::Cursor;
use crate::errors::{
    unspanned, ErrorContext, ErrorKind, ErrorReporting, GraftError, SourceContext,
};
use crate::format::AutoFormat;
use crate::syntax::Parser;
use crate::visit::visit_root;

pub mod emit;
pub mod extract;
pub mod prune;

use emit::TemplatePrinter;
use extract::Extractor;
use prune::Pruner;

pub const SNIPPET_MARKER_START: &str = "<<<<START>>>>";
pub const SNIPPET_MARKER_END: &str = "<<<<END>>>>";

const DEFAULT_PARAMETER_MARKER: &str = "#{}";

// ============================================================================
// PARAMETERS
// ============================================================================

/// A positional template parameter. Trees substitute as their trimmed
/// printed form; padded wrappers unwrap to their element; everything else
/// substitutes as plain text.
#[derive(Debug, Clone)]
pub enum Param {
    Tree(Tree),
    Text(String),
}

impl Param {
    fn to_source(&self) -> String {
        match self {
            Param::Tree(tree) => tree.print_trimmed(),
            Param::Text(text) => text.clone(),
        }
    }
}

impl From<Tree> for Param {
    fn from(tree: Tree) -> Self {
        Param::Tree(tree)
    }
}

impl From<&Tree> for Param {
    fn from(tree: &Tree) -> Self {
        Param::Tree(tree.clone())
    }
}

impl From<RightPadded<Tree>> for Param {
    fn from(padded: RightPadded<Tree>) -> Self {
        Param::from(padded.elem)
    }
}

impl From<LeftPadded<Tree>> for Param {
    fn from(padded: LeftPadded<Tree>) -> Self {
        Param::from(padded.elem)
    }
}

impl From<&str> for Param {
    fn from(text: &str) -> Self {
        Param::Text(text.to_string())
    }
}

impl From<String> for Param {
    fn from(text: String) -> Self {
        Param::Text(text)
    }
}

macro_rules! param_from_display {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Param {
            fn from(value: $ty) -> Self {
                Param::Text(value.to_string())
            }
        })*
    };
}

param_from_display!(i32, i64, u32, u64, f64, bool, char);

// ============================================================================
// TEMPLATE
// ============================================================================

/// An immutable template bundle. Construction goes through
/// [`Template::builder`]; a built template may be reused across any number
/// of generate calls. The parser handle carries mutable state, so it sits
/// behind a lock and concurrent generate calls serialise on it.
#[derive(Debug)]
pub struct Template {
    parser: Mutex<Parser>,
    code: String,
    parameter_count: usize,
    imports: BTreeSet<String>,
    parameter_marker: String,
}

impl Template {
    pub fn builder(code: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder {
            code: code.into(),
            imports: BTreeSet::new(),
            parameter_marker: DEFAULT_PARAMETER_MARKER.to_string(),
            parser: None,
        }
    }

    /// Generates snippets inserted ahead of the node at the cursor's focus.
    pub fn generate_before(
        &self,
        insertion_scope: &Cursor,
        parameters: &[Param],
    ) -> Result<Vec<Tree>, GraftError> {
        self.generate(false, insertion_scope, parameters)
    }

    /// Generates snippets inserted behind the node at the cursor's focus.
    pub fn generate_after(
        &self,
        insertion_scope: &Cursor,
        parameters: &[Param],
    ) -> Result<Vec<Tree>, GraftError> {
        self.generate(true, insertion_scope, parameters)
    }

    fn generate(
        &self,
        after: bool,
        insertion_scope: &Cursor,
        parameters: &[Param],
    ) -> Result<Vec<Tree>, GraftError> {
        let ctx = ErrorContext::new(SourceContext::new("template", self.code.clone()), "template");

        if parameters.len() != self.parameter_count {
            return Err(ctx.report(
                ErrorKind::ArityMismatch {
                    expected: self.parameter_count,
                    actual: parameters.len(),
                },
                unspanned(),
            ));
        }

        let printed_template = self.substitute_parameters(parameters);

        let unit = insertion_scope
            .first_enclosing(TreeKind::Unit)
            .cloned()
            .ok_or_else(|| ctx.report(ErrorKind::UnrootedCursor, unspanned()))?;

        // Walk the cursor out to the first node directly under a block or
        // the unit; that node is where the splice lands. A variable sitting
        // directly in a class body on the way out means the template must be
        // wrapped in an initialiser block to parse in statement context.
        let mut scope = insertion_scope.clone();
        let mut member_initializer = false;
        while let Some(parent) = scope.parent() {
            if matches!(parent.value(), Tree::Unit(_) | Tree::Block(_)) {
                break;
            }
            if matches!(parent.value(), Tree::Variable(_)) && is_class_body_variable(&parent) {
                member_initializer = true;
            }
            scope = parent;
        }

        let pruned = visit_root(&mut Pruner::new(scope.clone()), &unit);

        let mut generated_source = String::new();
        TemplatePrinter::new(
            after,
            member_initializer,
            &scope,
            &printed_template,
            &self.imports,
        )
        .print(&pruned, &mut generated_source);

        tracing::trace!(
            target: "graft::template",
            "generated source:\n-------------------\n{}\n-------------------",
            generated_source
        );

        let synthetic = {
            let mut parser = self
                .parser
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            parser.reset();
            let mut units = parser.parse(&generated_source)?;
            if units.is_empty() {
                return Err(ctx.unexpected_eof("the synthetic unit", unspanned()));
            }
            units.remove(0)
        };

        let mut extractor = Extractor::new();
        visit_root(&mut extractor, &synthetic);
        let snippets = extractor.into_snippets(&generated_source)?;

        let format_scope = scope.parent().unwrap_or_else(|| scope.clone());
        let formatter = AutoFormat::new(&format_scope);
        snippets.iter().map(|s| formatter.format(s)).collect()
    }

    /// Replaces placeholder occurrences left to right, one occurrence per
    /// parameter. The scan resumes after each replacement, so a substituted
    /// value that contains the placeholder string never cascades.
    fn substitute_parameters(&self, parameters: &[Param]) -> String {
        let marker = self.parameter_marker.as_str();
        let mut out = String::with_capacity(self.code.len());
        let mut rest = self.code.as_str();
        for parameter in parameters {
            match rest.find(marker) {
                Some(at) => {
                    out.push_str(&rest[..at]);
                    out.push_str(&parameter.to_source());
                    rest = &rest[at + marker.len()..];
                }
                None => break,
            }
        }
        out.push_str(rest);
        out
    }
}

fn is_class_body_variable(cursor: &Cursor) -> bool {
    let path = cursor.path();
    let n = path.len();
    n >= 4
        && matches!(path[n - 1], Tree::Variable(_))
        && matches!(path[n - 2], Tree::VarDecls(_))
        && matches!(path[n - 3], Tree::Block(_))
        && matches!(path[n - 4], Tree::Class(_))
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut rest = haystack;
    while let Some(at) = rest.find(needle) {
        count += 1;
        rest = &rest[at + needle.len()..];
    }
    count
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug)]
pub struct TemplateBuilder {
    code: String,
    imports: BTreeSet<String>,
    parameter_marker: String,
    parser: Option<Parser>,
}

impl TemplateBuilder {
    /// Fully-qualified type names to import into every synthetic unit.
    pub fn imports<I, S>(mut self, names: I) -> Result<Self, GraftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            validate_import(name)?;
            self.imports.insert(format!("import {};", name));
        }
        Ok(self)
    }

    /// Fully-qualified member names to import statically.
    pub fn static_imports<I, S>(mut self, names: I) -> Result<Self, GraftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            validate_import(name)?;
            self.imports.insert(format!("import static {};", name));
        }
        Ok(self)
    }

    /// Overrides the `#{}` placeholder.
    pub fn parameter_marker(mut self, marker: impl Into<String>) -> Result<Self, GraftError> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(argument_error(ErrorKind::EmptyParameterMarker, ""));
        }
        self.parameter_marker = marker;
        Ok(self)
    }

    /// Overrides the default parser.
    pub fn parser(mut self, parser: Parser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn build(self) -> Result<Template, GraftError> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(argument_error(ErrorKind::EmptyTemplate, &self.code));
        }
        let parameter_count = count_occurrences(&code, &self.parameter_marker);
        let parser = self.parser.unwrap_or_else(|| {
            Parser::new()
                .with_source_name("<generated>")
                .log_warnings(false)
        });
        Ok(Template {
            parser: Mutex::new(parser),
            code,
            parameter_count,
            imports: self.imports,
            parameter_marker: self.parameter_marker,
        })
    }
}

fn validate_import(name: &str) -> Result<(), GraftError> {
    if name.starts_with("import ") || name.starts_with("static ") {
        return Err(argument_error(
            ErrorKind::MalformedImport {
                name: name.to_string(),
                reason: "names are fully qualified and carry no 'import' or 'static' prefix"
                    .to_string(),
            },
            name,
        ));
    }
    if name.ends_with(';') || name.ends_with('\n') {
        return Err(argument_error(
            ErrorKind::MalformedImport {
                name: name.to_string(),
                reason: "names carry no trailing terminator".to_string(),
            },
            name,
        ));
    }
    Ok(())
}

fn argument_error(kind: ErrorKind, subject: &str) -> GraftError {
    ErrorContext::new(SourceContext::new("template", subject), "build").report(
        kind,
        (0..subject.len()).into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_count_comes_from_the_trimmed_code() {
        let template = Template::builder("  #{} + #{}  ").build().unwrap();
        assert_eq!(template.parameter_count, 2);
        assert_eq!(template.code, "#{} + #{}");
    }

    #[test]
    fn substituted_value_containing_the_marker_does_not_cascade() {
        let template = Template::builder("#{} + #{}").build().unwrap();
        let out =
            template.substitute_parameters(&[Param::from("#{}"), Param::from("y")]);
        assert_eq!(out, "#{} + y");
    }

    #[test]
    fn import_with_keyword_prefix_is_rejected() {
        let err = Template::builder("x")
            .imports(["import java.util.List"])
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedImport { .. }));
    }

    #[test]
    fn import_with_terminator_is_rejected() {
        let err = Template::builder("x")
            .imports(["java.util.List;"])
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedImport { .. }));
    }

    #[test]
    fn empty_template_is_rejected() {
        let err = Template::builder("   ").build().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmptyTemplate));
    }
}
