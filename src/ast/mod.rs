//! Lossless syntax tree for the Java subset graft operates on.
//!
//! Every node carries a stable identity, a prefix [`Space`] holding the
//! whitespace and comments that precede its first token, and `Arc`-shared
//! children. Nodes are immutable: every rewrite returns a fresh node and
//! aliases the unchanged children, so structural sharing is observable
//! through [`NodeId`] equality.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod builder;

// ============================================================================
// IDENTITY AND TRIVIA
// ============================================================================

/// Process-unique node identity. Rewrites copy the id, so a node and its
/// rewritten form compare equal here while a freshly parsed node never
/// collides with a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentStyle {
    Line,
    Block,
}

/// A single comment plus the whitespace that follows it before the next
/// comment or token. `text` excludes the delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub style: CommentStyle,
    pub text: String,
    pub suffix: String,
}

/// Leading trivia of a node: whitespace, then an ordered run of comments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Space {
    pub whitespace: String,
    pub comments: Vec<Comment>,
}

impl Space {
    pub fn empty() -> Self {
        Space::default()
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    /// Serialises the trivia exactly as it appeared in source.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.whitespace);
        for comment in &self.comments {
            match comment.style {
                CommentStyle::Line => {
                    out.push_str("//");
                    out.push_str(&comment.text);
                }
                CommentStyle::Block => {
                    out.push_str("/*");
                    out.push_str(&comment.text);
                    out.push_str("*/");
                }
            }
            out.push_str(&comment.suffix);
        }
    }
}

// ============================================================================
// PADDING
// ============================================================================

/// An element plus the space between it and the separator that follows it
/// (`;`, `,`, or a closing delimiter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightPadded<T> {
    pub elem: T,
    pub after: Space,
}

impl<T> RightPadded<T> {
    pub fn new(elem: T) -> Self {
        RightPadded {
            elem,
            after: Space::empty(),
        }
    }

    pub fn with_after(elem: T, after: Space) -> Self {
        RightPadded { elem, after }
    }
}

/// An element plus the space between the token that introduces it (`=`)
/// and the previous token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub elem: T,
}

impl<T> LeftPadded<T> {
    pub fn new(elem: T) -> Self {
        LeftPadded {
            before: Space::empty(),
            elem,
        }
    }
}

/// A delimited list: the space before the opening delimiter, then padded
/// elements. An empty list holds a single padded [`Empty`] so the space
/// inside the delimiters survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub before: Space,
    pub elems: Vec<RightPadded<Tree>>,
}

// ============================================================================
// NODE VARIANTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub prefix: Space,
    pub imports: Vec<RightPadded<Tree>>,
    pub classes: Vec<Tree>,
    pub eof: Space,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    /// Space before the `static` keyword when present.
    pub statik: Option<Space>,
    /// The fully-qualified name, space before it in `before`.
    pub qualid: LeftPadded<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Tree>,
    /// Space before the `class` keyword; empty when there are no modifiers.
    pub kind_prefix: Space,
    pub name: Arc<Ident>,
    pub body: Arc<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub annotations: Vec<Tree>,
    pub modifiers: Vec<Tree>,
    pub return_type: Arc<TypeRef>,
    pub name: Arc<Ident>,
    pub params: Container,
    pub body: Option<Arc<Block>>,
    /// Space before the terminating `;` of a bodiless declaration.
    pub semi: Option<Space>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
}

impl ModifierKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ModifierKind::Public => "public",
            ModifierKind::Private => "private",
            ModifierKind::Protected => "protected",
            ModifierKind::Static => "static",
            ModifierKind::Final => "final",
            ModifierKind::Abstract => "abstract",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "public" => Some(ModifierKind::Public),
            "private" => Some(ModifierKind::Private),
            "protected" => Some(ModifierKind::Protected),
            "static" => Some(ModifierKind::Static),
            "final" => Some(ModifierKind::Final),
            "abstract" => Some(ModifierKind::Abstract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: NodeId,
    pub prefix: Space,
    pub kind: ModifierKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    /// Space before `{` when this is a `static` initialiser block.
    pub statik: Option<Space>,
    pub statements: Vec<RightPadded<Tree>>,
    /// Space before the closing `}`.
    pub end: Space,
}

/// One declaration group: `int x = 1, y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecls {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Tree>,
    pub type_ref: Arc<TypeRef>,
    pub vars: Vec<RightPadded<Tree>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedVariable {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<Ident>,
    pub initializer: Option<LeftPadded<Tree>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: NodeId,
    pub prefix: Space,
    /// Primitive or (possibly qualified) type name, exactly as written.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub id: NodeId,
    pub prefix: Space,
    pub expr: Option<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub id: NodeId,
    pub prefix: Space,
    pub target: Tree,
    pub expr: LeftPadded<Tree>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub left: Tree,
    pub op: LeftPadded<BinaryOp>,
    pub right: Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub op: UnaryOp,
    pub expr: Tree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paren {
    pub id: NodeId,
    pub prefix: Space,
    pub expr: RightPadded<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub target: Tree,
    /// Space before the `.`.
    pub dot_prefix: Space,
    pub name: Arc<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub id: NodeId,
    pub prefix: Space,
    /// Receiver plus the space before the `.`.
    pub select: Option<RightPadded<Tree>>,
    pub name: Arc<Ident>,
    pub args: Container,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub prefix: Space,
    pub simple_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub value: LiteralValue,
    /// The literal exactly as written, so printing never reformats it.
    pub value_source: String,
}

/// An empty statement (a bare `;`) or the hole inside empty delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empty {
    pub id: NodeId,
    pub prefix: Space,
}

// ============================================================================
// THE TREE
// ============================================================================

/// Cheaply clonable handle to any node. Cloning shares the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tree {
    Unit(Arc<CompilationUnit>),
    Import(Arc<Import>),
    Class(Arc<ClassDecl>),
    Method(Arc<MethodDecl>),
    Annotation(Arc<Annotation>),
    Modifier(Arc<Modifier>),
    Block(Arc<Block>),
    VarDecls(Arc<VarDecls>),
    Variable(Arc<NamedVariable>),
    TypeRef(Arc<TypeRef>),
    Return(Arc<ReturnStmt>),
    Assign(Arc<Assign>),
    Binary(Arc<Binary>),
    Unary(Arc<Unary>),
    Paren(Arc<Paren>),
    FieldAccess(Arc<FieldAccess>),
    Call(Arc<MethodCall>),
    Ident(Arc<Ident>),
    Literal(Arc<Literal>),
    Empty(Arc<Empty>),
}

/// Discriminant of [`Tree`], for enclosing-kind queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeKind {
    Unit,
    Import,
    Class,
    Method,
    Annotation,
    Modifier,
    Block,
    VarDecls,
    Variable,
    TypeRef,
    Return,
    Assign,
    Binary,
    Unary,
    Paren,
    FieldAccess,
    Call,
    Ident,
    Literal,
    Empty,
}

impl TreeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TreeKind::Unit => "compilation unit",
            TreeKind::Import => "import",
            TreeKind::Class => "class declaration",
            TreeKind::Method => "method declaration",
            TreeKind::Annotation => "annotation",
            TreeKind::Modifier => "modifier",
            TreeKind::Block => "block",
            TreeKind::VarDecls => "variable declarations",
            TreeKind::Variable => "named variable",
            TreeKind::TypeRef => "type reference",
            TreeKind::Return => "return statement",
            TreeKind::Assign => "assignment",
            TreeKind::Binary => "binary expression",
            TreeKind::Unary => "unary expression",
            TreeKind::Paren => "parentheses",
            TreeKind::FieldAccess => "field access",
            TreeKind::Call => "method call",
            TreeKind::Ident => "identifier",
            TreeKind::Literal => "literal",
            TreeKind::Empty => "empty statement",
        }
    }
}

macro_rules! for_each_variant {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            Tree::Unit($node) => $body,
            Tree::Import($node) => $body,
            Tree::Class($node) => $body,
            Tree::Method($node) => $body,
            Tree::Annotation($node) => $body,
            Tree::Modifier($node) => $body,
            Tree::Block($node) => $body,
            Tree::VarDecls($node) => $body,
            Tree::Variable($node) => $body,
            Tree::TypeRef($node) => $body,
            Tree::Return($node) => $body,
            Tree::Assign($node) => $body,
            Tree::Binary($node) => $body,
            Tree::Unary($node) => $body,
            Tree::Paren($node) => $body,
            Tree::FieldAccess($node) => $body,
            Tree::Call($node) => $body,
            Tree::Ident($node) => $body,
            Tree::Literal($node) => $body,
            Tree::Empty($node) => $body,
        }
    };
}

impl Tree {
    pub fn id(&self) -> NodeId {
        for_each_variant!(self, node => node.id)
    }

    pub fn prefix(&self) -> &Space {
        for_each_variant!(self, node => &node.prefix)
    }

    pub fn kind(&self) -> TreeKind {
        match self {
            Tree::Unit(_) => TreeKind::Unit,
            Tree::Import(_) => TreeKind::Import,
            Tree::Class(_) => TreeKind::Class,
            Tree::Method(_) => TreeKind::Method,
            Tree::Annotation(_) => TreeKind::Annotation,
            Tree::Modifier(_) => TreeKind::Modifier,
            Tree::Block(_) => TreeKind::Block,
            Tree::VarDecls(_) => TreeKind::VarDecls,
            Tree::Variable(_) => TreeKind::Variable,
            Tree::TypeRef(_) => TreeKind::TypeRef,
            Tree::Return(_) => TreeKind::Return,
            Tree::Assign(_) => TreeKind::Assign,
            Tree::Binary(_) => TreeKind::Binary,
            Tree::Unary(_) => TreeKind::Unary,
            Tree::Paren(_) => TreeKind::Paren,
            Tree::FieldAccess(_) => TreeKind::FieldAccess,
            Tree::Call(_) => TreeKind::Call,
            Tree::Ident(_) => TreeKind::Ident,
            Tree::Literal(_) => TreeKind::Literal,
            Tree::Empty(_) => TreeKind::Empty,
        }
    }

    /// Fresh node with the given prefix; identity is preserved.
    pub fn with_prefix(&self, prefix: Space) -> Tree {
        match self {
            Tree::Unit(n) => Tree::Unit(Arc::new(CompilationUnit {
                prefix,
                ..(**n).clone()
            })),
            Tree::Import(n) => Tree::Import(Arc::new(Import {
                prefix,
                ..(**n).clone()
            })),
            Tree::Class(n) => Tree::Class(Arc::new(ClassDecl {
                prefix,
                ..(**n).clone()
            })),
            Tree::Method(n) => Tree::Method(Arc::new(MethodDecl {
                prefix,
                ..(**n).clone()
            })),
            Tree::Annotation(n) => Tree::Annotation(Arc::new(Annotation {
                prefix,
                ..(**n).clone()
            })),
            Tree::Modifier(n) => Tree::Modifier(Arc::new(Modifier {
                prefix,
                ..(**n).clone()
            })),
            Tree::Block(n) => Tree::Block(Arc::new(Block {
                prefix,
                ..(**n).clone()
            })),
            Tree::VarDecls(n) => Tree::VarDecls(Arc::new(VarDecls {
                prefix,
                ..(**n).clone()
            })),
            Tree::Variable(n) => Tree::Variable(Arc::new(NamedVariable {
                prefix,
                ..(**n).clone()
            })),
            Tree::TypeRef(n) => Tree::TypeRef(Arc::new(TypeRef {
                prefix,
                ..(**n).clone()
            })),
            Tree::Return(n) => Tree::Return(Arc::new(ReturnStmt {
                prefix,
                ..(**n).clone()
            })),
            Tree::Assign(n) => Tree::Assign(Arc::new(Assign {
                prefix,
                ..(**n).clone()
            })),
            Tree::Binary(n) => Tree::Binary(Arc::new(Binary {
                prefix,
                ..(**n).clone()
            })),
            Tree::Unary(n) => Tree::Unary(Arc::new(Unary {
                prefix,
                ..(**n).clone()
            })),
            Tree::Paren(n) => Tree::Paren(Arc::new(Paren {
                prefix,
                ..(**n).clone()
            })),
            Tree::FieldAccess(n) => Tree::FieldAccess(Arc::new(FieldAccess {
                prefix,
                ..(**n).clone()
            })),
            Tree::Call(n) => Tree::Call(Arc::new(MethodCall {
                prefix,
                ..(**n).clone()
            })),
            Tree::Ident(n) => Tree::Ident(Arc::new(Ident {
                prefix,
                ..(**n).clone()
            })),
            Tree::Literal(n) => Tree::Literal(Arc::new(Literal {
                prefix,
                ..(**n).clone()
            })),
            Tree::Empty(n) => Tree::Empty(Arc::new(Empty {
                prefix,
                ..(**n).clone()
            })),
        }
    }

    pub fn as_unit(&self) -> Option<&Arc<CompilationUnit>> {
        if let Tree::Unit(unit) = self {
            return Some(unit);
        }
        None
    }

    pub fn as_block(&self) -> Option<&Arc<Block>> {
        if let Tree::Block(block) = self {
            return Some(block);
        }
        None
    }

    /// Whether the block printer terminates this node with a `;` when it
    /// appears in statement position.
    pub fn requires_semicolon(&self) -> bool {
        matches!(
            self,
            Tree::VarDecls(_)
                | Tree::Return(_)
                | Tree::Assign(_)
                | Tree::Binary(_)
                | Tree::Unary(_)
                | Tree::Paren(_)
                | Tree::FieldAccess(_)
                | Tree::Call(_)
                | Tree::Ident(_)
                | Tree::Literal(_)
                | Tree::Empty(_)
        )
    }
}
