//! graft: template-driven snippet generation for lossless syntax trees.
//!
//! Given a parsed host program, a cursor into it, and a source fragment
//! with `#{}` placeholders, [`template::Template`] produces fully parsed
//! and formatted sub-trees ready to splice at the cursor. See the
//! [`template`] module for the pipeline.

pub use crate::errors::{ErrorCategory, ErrorContext, ErrorKind, GraftError, SourceContext};

pub mod ast;
pub mod cursor;
pub mod errors;
pub mod format;
pub mod printer;
pub mod search;
pub mod syntax;
pub mod template;
pub mod visit;

pub mod prelude {
    pub use crate::ast::{NodeId, Space, Tree, TreeKind};
    pub use crate::cursor::Cursor;
    pub use crate::errors::{ErrorCategory, ErrorKind, GraftError};
    pub use crate::printer::{print, Printer};
    pub use crate::syntax::Parser;
    pub use crate::template::{Param, Template};
    pub use crate::visit::{visit_root, TreeVisitor};
}
