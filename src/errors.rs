//! Graft error handling.
//!
//! A single error type covers the whole pipeline; construction goes through
//! [`ErrorReporting`] contexts so every error carries the source text it
//! refers to. For reparse failures that source is the synthesised program
//! itself, which is what makes the diagnostics actionable.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source text an error points into, with a display name.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Fallback for errors not tied to any particular source text.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("// {}", context),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

/// The single error type: what went wrong, where, and how to help.
#[derive(Debug)]
pub struct GraftError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

/// All error types as a single enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Argument errors - rejected before the pipeline runs
    ArityMismatch {
        expected: usize,
        actual: usize,
    },
    MalformedImport {
        name: String,
        reason: String,
    },
    EmptyTemplate,
    EmptyParameterMarker,
    UnrootedCursor,

    // Parse errors - the source (host or synthesised) is rejected
    UnexpectedToken {
        expected: String,
        found: String,
    },
    UnexpectedEof {
        context: String,
    },
    UnterminatedString,
    UnterminatedComment,
    InvalidLiteral {
        literal_type: String,
        value: String,
    },

    // Extraction errors - marker invariants violated; an emitter bug
    MissingEndMarker,
    OrphanedEndMarker,

    // Format errors - the snippet cannot be reconciled with the host scope
    UnformattableSnippet {
        kind: String,
    },
}

/// Context-specific source information.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation; each pipeline phase knows its source text.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError;

    fn unexpected_token(&self, expected: &str, found: &str, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            },
            span,
        )
    }

    fn unexpected_eof(&self, context: &str, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::UnexpectedEof {
                context: context.into(),
            },
            span,
        )
    }

    fn invalid_literal(&self, literal_type: &str, value: &str, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::InvalidLiteral {
                literal_type: literal_type.into(),
                value: value.into(),
            },
            span,
        )
    }

    /// Internal invariant violations; these indicate engine bugs, not user
    /// errors.
    fn internal_error(&self, kind: ErrorKind, span: SourceSpan) -> GraftError {
        let mut error = self.report(kind, span);
        error.diagnostic_info.help =
            Some("This is an internal engine error. Please report this as a bug.".into());
        error
    }
}

/// General-purpose reporting context carrying the current phase name.
pub struct ErrorContext {
    pub source: SourceContext,
    pub phase: String,
}

impl ErrorContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for ErrorContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError {
        let error_code = format!("graft::{}::{}", self.phase, kind.code_suffix());

        GraftError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

impl ErrorKind {
    /// The error category for test assertions and callers that branch on
    /// failure class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArityMismatch { .. }
            | Self::MalformedImport { .. }
            | Self::EmptyTemplate
            | Self::EmptyParameterMarker
            | Self::UnrootedCursor => ErrorCategory::Argument,

            Self::UnexpectedToken { .. }
            | Self::UnexpectedEof { .. }
            | Self::UnterminatedString
            | Self::UnterminatedComment
            | Self::InvalidLiteral { .. } => ErrorCategory::Parse,

            Self::MissingEndMarker | Self::OrphanedEndMarker => ErrorCategory::Extraction,

            Self::UnformattableSnippet { .. } => ErrorCategory::Format,
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::MalformedImport { .. } => "malformed_import",
            Self::EmptyTemplate => "empty_template",
            Self::EmptyParameterMarker => "empty_parameter_marker",
            Self::UnrootedCursor => "unrooted_cursor",
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::UnexpectedEof { .. } => "unexpected_eof",
            Self::UnterminatedString => "unterminated_string",
            Self::UnterminatedComment => "unterminated_comment",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::MissingEndMarker => "missing_end_marker",
            Self::OrphanedEndMarker => "orphaned_end_marker",
            Self::UnformattableSnippet { .. } => "unformattable_snippet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Argument,
    Parse,
    Extraction,
    Format,
}

impl std::error::Error for GraftError {}

impl fmt::Display for GraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ArityMismatch { expected, actual } => {
                write!(
                    f,
                    "Argument error: this template requires {} parameters, got {}",
                    expected, actual
                )
            }
            ErrorKind::MalformedImport { name, reason } => {
                write!(f, "Argument error: malformed import '{}': {}", name, reason)
            }
            ErrorKind::EmptyTemplate => {
                write!(f, "Argument error: template code must not be empty")
            }
            ErrorKind::EmptyParameterMarker => {
                write!(f, "Argument error: parameter marker must not be empty")
            }
            ErrorKind::UnrootedCursor => {
                write!(
                    f,
                    "Argument error: insertion cursor is not rooted at a compilation unit"
                )
            }
            ErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "Parse error: expected {}, found {}", expected, found)
            }
            ErrorKind::UnexpectedEof { context } => {
                write!(
                    f,
                    "Parse error: unexpected end of input while parsing {}",
                    context
                )
            }
            ErrorKind::UnterminatedString => {
                write!(f, "Parse error: unterminated string literal")
            }
            ErrorKind::UnterminatedComment => {
                write!(f, "Parse error: unterminated block comment")
            }
            ErrorKind::InvalidLiteral { literal_type, value } => {
                write!(f, "Parse error: invalid {} '{}'", literal_type, value)
            }
            ErrorKind::MissingEndMarker => {
                write!(
                    f,
                    "Extraction error: end marker never reached in synthetic unit"
                )
            }
            ErrorKind::OrphanedEndMarker => {
                write!(f, "Extraction error: end marker seen before start marker")
            }
            ErrorKind::UnformattableSnippet { kind } => {
                write!(
                    f,
                    "Format error: cannot format a {} against a host scope",
                    kind
                )
            }
        }
    }
}

impl Diagnostic for GraftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl GraftError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::ArityMismatch { .. } => "wrong parameter count".into(),
            ErrorKind::MalformedImport { .. } => "malformed import".into(),
            ErrorKind::EmptyTemplate => "empty template".into(),
            ErrorKind::EmptyParameterMarker => "empty marker".into(),
            ErrorKind::UnrootedCursor => "cursor has no compilation unit".into(),
            ErrorKind::UnexpectedToken { .. } => "unexpected token".into(),
            ErrorKind::UnexpectedEof { .. } => "input ends here".into(),
            ErrorKind::UnterminatedString => "string never closed".into(),
            ErrorKind::UnterminatedComment => "comment never closed".into(),
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::MissingEndMarker => "end marker missing".into(),
            ErrorKind::OrphanedEndMarker => "end marker without start".into(),
            ErrorKind::UnformattableSnippet { .. } => "cannot format".into(),
        }
    }
}

/// Placeholder span for errors not tied to a specific source location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}
