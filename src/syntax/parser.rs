//! Recursive-descent parser for the Java subset.
//!
//! Purely syntactic: no name resolution or type checking. Each node takes
//! ownership of the trivia before its first token (the compilation unit
//! owns the file's leading run), and expression chains hoist the leftmost
//! operand's prefix to the outermost node, so every statement- and
//! expression-level tree owns the trivia that precedes it. That ownership
//! rule is what the marker extractor depends on.
//!
//! The parser is deliberately lenient where the snippet pipeline needs it
//! to be: stray semicolons parse as empty statements, a statement may omit
//! its semicolon directly before `}`, and no initialization analysis is
//! performed on pruned hosts.

use std::mem;

use crate::ast::{
    Annotation, Assign, Binary, BinaryOp, Block, ClassDecl, CompilationUnit, Container, Empty,
    FieldAccess, Ident, Import, LeftPadded, Literal, LiteralValue, MethodCall, MethodDecl,
    Modifier, ModifierKind, NamedVariable, NodeId, Paren, ReturnStmt, RightPadded, Space, Tree,
    TypeRef, Unary, UnaryOp, VarDecls,
};
use crate::errors::{ErrorContext, ErrorKind, ErrorReporting, GraftError, SourceContext};
use crate::syntax::lexer::{lex, LexError, Token, TokenKind};
use std::sync::Arc;

// ============================================================================
// PUBLIC API
// ============================================================================

/// A reusable parser handle. `parse` may be called repeatedly; call
/// [`Parser::reset`] between uses to drop accumulated warnings.
#[derive(Debug)]
pub struct Parser {
    source_name: String,
    log_warnings: bool,
    warnings: Vec<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser that collects but does not log warnings.
    pub fn new() -> Self {
        Parser {
            source_name: "<source>".to_string(),
            log_warnings: false,
            warnings: Vec::new(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn log_warnings(mut self, enabled: bool) -> Self {
        self.log_warnings = enabled;
        self
    }

    /// Clears per-parse state.
    pub fn reset(&mut self) {
        self.warnings.clear();
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Parses one source text into its compilation units. A single text
    /// yields a single unit; callers that only care about the first can
    /// take element zero.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Tree>, GraftError> {
        let ctx = ErrorContext::new(
            SourceContext::new(self.source_name.clone(), source),
            "parse",
        );
        let tokens = lex(source).map_err(|e| lex_error_to_graft(&ctx, e))?;
        let mut state = ParseState {
            tokens,
            pos: 0,
            ctx,
            warnings: &mut self.warnings,
        };
        let unit = state.parse_unit()?;
        if self.log_warnings {
            for warning in &self.warnings {
                tracing::warn!(source = %self.source_name, "{}", warning);
            }
        }
        Ok(vec![unit])
    }
}

fn lex_error_to_graft(ctx: &ErrorContext, e: LexError) -> GraftError {
    let span = (e.offset()..e.offset() + 1).into();
    match e {
        LexError::UnterminatedString { .. } | LexError::UnterminatedChar { .. } => {
            ctx.report(ErrorKind::UnterminatedString, span)
        }
        LexError::UnterminatedComment { .. } => ctx.report(ErrorKind::UnterminatedComment, span),
        LexError::UnexpectedChar { ch, .. } => {
            ctx.unexpected_token("a token", &ch.to_string(), span)
        }
    }
}

// ============================================================================
// PARSE STATE
// ============================================================================

struct ParseState<'a> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: ErrorContext,
    warnings: &'a mut Vec<String>,
}

type Parse<T> = Result<T, GraftError>;

impl ParseState<'_> {
    // ------------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_word(&self, word: &str) -> bool {
        let t = self.peek();
        t.kind == TokenKind::Ident && t.text == word
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Takes the trivia of the upcoming token, leaving it empty. The caller
    /// becomes the owner of that trivia.
    fn take_prefix(&mut self) -> Space {
        mem::take(&mut self.tokens[self.pos].prefix)
    }

    fn token_span(&self, token: &Token) -> miette::SourceSpan {
        (token.offset..token.offset + token.text.len().max(1)).into()
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Parse<Token> {
        if self.peek_kind() == kind {
            return Ok(self.bump());
        }
        Err(self.error_here(expected))
    }

    fn expect_word(&mut self, word: &str) -> Parse<Token> {
        if self.peek_word(word) {
            return Ok(self.bump());
        }
        Err(self.error_here(&format!("'{}'", word)))
    }

    fn error_here(&self, expected: &str) -> GraftError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", token.text)
        };
        self.ctx
            .unexpected_token(expected, &found, self.token_span(token))
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    // ------------------------------------------------------------------------
    // Compilation unit
    // ------------------------------------------------------------------------

    fn parse_unit(&mut self) -> Parse<Tree> {
        // The unit owns the file's leading trivia.
        let prefix = self.take_prefix();

        let mut imports = Vec::new();
        while self.peek_word("import") {
            let import = self.parse_import()?;
            let after = self.take_prefix();
            self.expect(TokenKind::Semi, "';' after import")?;
            imports.push(RightPadded::with_after(import, after));
        }

        let mut classes = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            classes.push(self.parse_class()?);
        }

        let eof = self.take_prefix();
        Ok(Tree::Unit(Arc::new(CompilationUnit {
            id: NodeId::fresh(),
            prefix,
            imports,
            classes,
            eof,
        })))
    }

    fn parse_import(&mut self) -> Parse<Tree> {
        let prefix = self.take_prefix();
        self.expect_word("import")?;
        let statik = if self.peek_word("static") {
            let space = self.take_prefix();
            self.bump();
            Some(space)
        } else {
            None
        };
        let before = self.take_prefix();
        let name = self.parse_qualified_name()?;
        Ok(Tree::Import(Arc::new(Import {
            id: NodeId::fresh(),
            prefix,
            statik,
            qualid: LeftPadded { before, elem: name },
        })))
    }

    /// Dotted name with no interior trivia: `java.util.List`, `java.util.*`.
    fn parse_qualified_name(&mut self) -> Parse<String> {
        let first = self.expect(TokenKind::Ident, "a name")?;
        let mut name = first.text;
        while self.peek_kind() == TokenKind::Dot && self.peek().prefix.is_empty() {
            let part = self.peek_at(1);
            let part_ok = (part.kind == TokenKind::Ident || part.kind == TokenKind::Star)
                && part.prefix.is_empty();
            if !part_ok {
                break;
            }
            self.bump();
            let part = self.bump();
            name.push('.');
            name.push_str(&part.text);
        }
        Ok(name)
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn parse_class(&mut self) -> Parse<Tree> {
        let prefix = self.take_prefix();
        let modifiers = self.parse_modifiers();
        let kind_prefix = self.take_prefix();
        self.expect_word("class")?;
        let name = self.parse_ident("a class name")?;
        let body = self.parse_block()?;
        Ok(Tree::Class(Arc::new(ClassDecl {
            id: NodeId::fresh(),
            prefix,
            modifiers,
            kind_prefix,
            name,
            body,
        })))
    }

    fn parse_modifiers(&mut self) -> Vec<Tree> {
        let mut modifiers = Vec::new();
        let mut seen = Vec::new();
        while let Some(kind) = modifier_ahead(self.peek()) {
            // `static {` introduces an initialiser block, not a modifier.
            if kind == ModifierKind::Static && self.peek_at(1).kind == TokenKind::LBrace {
                break;
            }
            if seen.contains(&kind) {
                self.warn(format!("duplicate modifier '{}'", kind.keyword()));
            }
            seen.push(kind);
            let prefix = self.take_prefix();
            self.bump();
            modifiers.push(Tree::Modifier(Arc::new(Modifier {
                id: NodeId::fresh(),
                prefix,
                kind,
            })));
        }
        modifiers
    }

    fn parse_ident(&mut self, expected: &str) -> Parse<Arc<Ident>> {
        let prefix = self.take_prefix();
        let token = self.expect(TokenKind::Ident, expected)?;
        Ok(Arc::new(Ident {
            id: NodeId::fresh(),
            prefix,
            simple_name: token.text,
        }))
    }

    fn parse_type(&mut self) -> Parse<Arc<TypeRef>> {
        let prefix = self.take_prefix();
        let name = self.parse_qualified_name()?;
        Ok(Arc::new(TypeRef {
            id: NodeId::fresh(),
            prefix,
            name,
        }))
    }

    // ------------------------------------------------------------------------
    // Blocks and statements
    // ------------------------------------------------------------------------

    fn parse_block(&mut self) -> Parse<Arc<Block>> {
        let prefix = self.take_prefix();
        let statik = if self.peek_word("static") && self.peek_at(1).kind == TokenKind::LBrace {
            self.bump();
            Some(self.take_prefix())
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut statements = Vec::new();
        while self.peek_kind() != TokenKind::RBrace && self.peek_kind() != TokenKind::Eof {
            let statement = self.parse_statement()?;
            // The block owns statement semicolons; block-shaped statements
            // never consume one here.
            let padded = if statement.requires_semicolon() && self.peek_kind() == TokenKind::Semi {
                let after = self.take_prefix();
                self.bump();
                RightPadded::with_after(statement, after)
            } else {
                RightPadded::new(statement)
            };
            statements.push(padded);
        }

        let end = self.take_prefix();
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Arc::new(Block {
            id: NodeId::fresh(),
            prefix,
            statik,
            statements,
            end,
        }))
    }

    fn parse_statement(&mut self) -> Parse<Tree> {
        match self.peek_kind() {
            TokenKind::Semi => {
                let prefix = self.take_prefix();
                Ok(Tree::Empty(Arc::new(Empty {
                    id: NodeId::fresh(),
                    prefix,
                })))
            }
            TokenKind::LBrace => Ok(Tree::Block(self.parse_block()?)),
            TokenKind::At => self.parse_member(),
            TokenKind::Ident => {
                if self.peek_word("static") && self.peek_at(1).kind == TokenKind::LBrace {
                    return Ok(Tree::Block(self.parse_block()?));
                }
                if self.peek_word("return") {
                    return self.parse_return();
                }
                if self.peek_word("class") || modifier_ahead(self.peek()).is_some() {
                    return self.parse_member();
                }
                if self.declaration_ahead() {
                    return self.parse_member();
                }
                self.parse_expression()
            }
            _ => self.parse_expression(),
        }
    }

    fn parse_return(&mut self) -> Parse<Tree> {
        let prefix = self.take_prefix();
        self.expect_word("return")?;
        let expr = if self.peek_kind() == TokenKind::Semi || self.peek_kind() == TokenKind::RBrace {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Tree::Return(Arc::new(ReturnStmt {
            id: NodeId::fresh(),
            prefix,
            expr,
        })))
    }

    /// Lookahead: `Type name (` is a method, `Type name` otherwise a
    /// variable declaration. Anything else is an expression.
    fn declaration_ahead(&self) -> bool {
        let mut i = 0;
        if self.peek_at(i).kind != TokenKind::Ident {
            return false;
        }
        i += 1;
        while self.peek_at(i).kind == TokenKind::Dot && self.peek_at(i + 1).kind == TokenKind::Ident
        {
            i += 2;
        }
        self.peek_at(i).kind == TokenKind::Ident
    }

    /// A class member or local declaration: annotations, modifiers, then a
    /// method or variable group.
    fn parse_member(&mut self) -> Parse<Tree> {
        let prefix = self.take_prefix();

        let mut annotations = Vec::new();
        while self.peek_kind() == TokenKind::At {
            let ann_prefix = self.take_prefix();
            self.bump();
            let name = self.parse_ident("an annotation name")?;
            annotations.push(Tree::Annotation(Arc::new(Annotation {
                id: NodeId::fresh(),
                prefix: ann_prefix,
                name,
            })));
        }

        let modifiers = self.parse_modifiers();

        if self.peek_word("class") {
            // Nested class with the prefix already consumed; rebuild it.
            let kind_prefix = self.take_prefix();
            self.bump();
            let name = self.parse_ident("a class name")?;
            let body = self.parse_block()?;
            return Ok(Tree::Class(Arc::new(ClassDecl {
                id: NodeId::fresh(),
                prefix,
                modifiers,
                kind_prefix,
                name,
                body,
            })));
        }

        let type_ref = self.parse_type()?;
        let pre_name = self.take_prefix();
        let name_token = self.expect(TokenKind::Ident, "a declaration name")?;

        if self.peek_kind() == TokenKind::LParen {
            let name = Arc::new(Ident {
                id: NodeId::fresh(),
                prefix: pre_name,
                simple_name: name_token.text,
            });
            return self.parse_method(prefix, annotations, modifiers, type_ref, name);
        }

        if !annotations.is_empty() {
            self.warn("annotations on variable declarations are ignored".to_string());
        }
        self.parse_var_decls(prefix, modifiers, type_ref, pre_name, name_token.text)
    }

    fn parse_method(
        &mut self,
        prefix: Space,
        annotations: Vec<Tree>,
        modifiers: Vec<Tree>,
        return_type: Arc<TypeRef>,
        name: Arc<Ident>,
    ) -> Parse<Tree> {
        let params = self.parse_params()?;

        let (body, semi) = if self.peek_kind() == TokenKind::LBrace {
            (Some(self.parse_block()?), None)
        } else if self.peek_kind() == TokenKind::Semi {
            let space = self.take_prefix();
            self.bump();
            (None, Some(space))
        } else {
            return Err(self.error_here("a method body or ';'"));
        };

        if body.is_some()
            && modifiers.iter().any(
                |m| matches!(m, Tree::Modifier(m) if m.kind == ModifierKind::Abstract),
            )
        {
            self.warn(format!(
                "abstract method '{}' has a body",
                name.simple_name
            ));
        }

        Ok(Tree::Method(Arc::new(MethodDecl {
            id: NodeId::fresh(),
            prefix,
            annotations,
            modifiers,
            return_type,
            name,
            params,
            body,
            semi,
        })))
    }

    fn parse_params(&mut self) -> Parse<Container> {
        let before = self.take_prefix();
        self.expect(TokenKind::LParen, "'('")?;

        if self.peek_kind() == TokenKind::RParen {
            let hole = Tree::Empty(Arc::new(Empty {
                id: NodeId::fresh(),
                prefix: self.take_prefix(),
            }));
            self.bump();
            return Ok(Container {
                before,
                elems: vec![RightPadded::new(hole)],
            });
        }

        let mut elems = Vec::new();
        loop {
            let param = self.parse_param()?;
            match self.peek_kind() {
                TokenKind::Comma => {
                    let after = self.take_prefix();
                    self.bump();
                    elems.push(RightPadded::with_after(param, after));
                }
                TokenKind::RParen => {
                    let after = self.take_prefix();
                    self.bump();
                    elems.push(RightPadded::with_after(param, after));
                    return Ok(Container { before, elems });
                }
                _ => return Err(self.error_here("',' or ')'")),
            }
        }
    }

    fn parse_param(&mut self) -> Parse<Tree> {
        let prefix = self.take_prefix();
        let modifiers = self.parse_modifiers();
        let type_ref = self.parse_type()?;
        let var_prefix = self.take_prefix();
        let name_token = self.expect(TokenKind::Ident, "a parameter name")?;
        let variable = Tree::Variable(Arc::new(NamedVariable {
            id: NodeId::fresh(),
            prefix: var_prefix,
            name: Arc::new(Ident {
                id: NodeId::fresh(),
                prefix: Space::empty(),
                simple_name: name_token.text,
            }),
            initializer: None,
        }));
        Ok(Tree::VarDecls(Arc::new(VarDecls {
            id: NodeId::fresh(),
            prefix,
            modifiers,
            type_ref,
            vars: vec![RightPadded::new(variable)],
        })))
    }

    fn parse_var_decls(
        &mut self,
        prefix: Space,
        modifiers: Vec<Tree>,
        type_ref: Arc<TypeRef>,
        first_var_prefix: Space,
        first_name: String,
    ) -> Parse<Tree> {
        let mut vars = Vec::new();
        let mut var_prefix = first_var_prefix;
        let mut name = first_name;
        loop {
            let initializer = if self.peek_kind() == TokenKind::Assign {
                let before = self.take_prefix();
                self.bump();
                let elem = self.parse_expression()?;
                Some(LeftPadded { before, elem })
            } else {
                None
            };
            let variable = Tree::Variable(Arc::new(NamedVariable {
                id: NodeId::fresh(),
                prefix: var_prefix,
                name: Arc::new(Ident {
                    id: NodeId::fresh(),
                    prefix: Space::empty(),
                    simple_name: name,
                }),
                initializer,
            }));

            if self.peek_kind() == TokenKind::Comma {
                let after = self.take_prefix();
                self.bump();
                vars.push(RightPadded::with_after(variable, after));
                var_prefix = self.take_prefix();
                name = self.expect(TokenKind::Ident, "a variable name")?.text;
            } else {
                vars.push(RightPadded::new(variable));
                break;
            }
        }
        Ok(Tree::VarDecls(Arc::new(VarDecls {
            id: NodeId::fresh(),
            prefix,
            modifiers,
            type_ref,
            vars,
        })))
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn parse_expression(&mut self) -> Parse<Tree> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Parse<Tree> {
        let left = self.parse_binary(0)?;
        if self.peek_kind() == TokenKind::Assign {
            let before = self.take_prefix();
            self.bump();
            let right = self.parse_assign()?;
            let (prefix, target) = hoist(left);
            return Ok(Tree::Assign(Arc::new(Assign {
                id: NodeId::fresh(),
                prefix,
                target,
                expr: LeftPadded {
                    before,
                    elem: right,
                },
            })));
        }
        Ok(left)
    }

    /// Precedence climbing over the binary operator table.
    fn parse_binary(&mut self, min_level: u8) -> Parse<Tree> {
        let mut left = if min_level >= BINARY_LEVELS.len() as u8 {
            self.parse_unary()?
        } else {
            self.parse_binary(min_level + 1)?
        };
        if min_level >= BINARY_LEVELS.len() as u8 {
            return Ok(left);
        }
        while let Some(op) = binary_op_at(self.peek_kind(), min_level) {
            let before = self.take_prefix();
            self.bump();
            let right = self.parse_binary(min_level + 1)?;
            let (prefix, lhs) = hoist(left);
            left = Tree::Binary(Arc::new(Binary {
                id: NodeId::fresh(),
                prefix,
                left: lhs,
                op: LeftPadded { before, elem: op },
                right,
            }));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Parse<Tree> {
        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            _ => None,
        };
        if let Some(op) = op {
            let prefix = self.take_prefix();
            self.bump();
            let expr = self.parse_unary()?;
            return Ok(Tree::Unary(Arc::new(Unary {
                id: NodeId::fresh(),
                prefix,
                op,
                expr,
            })));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Parse<Tree> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.peek_kind() == TokenKind::Dot {
                let dot_prefix = self.take_prefix();
                self.bump();
                let name = self.parse_ident("a member name")?;
                if self.peek_kind() == TokenKind::LParen {
                    let args = self.parse_args()?;
                    let (prefix, select) = hoist(expr);
                    expr = Tree::Call(Arc::new(MethodCall {
                        id: NodeId::fresh(),
                        prefix,
                        select: Some(RightPadded::with_after(select, dot_prefix)),
                        name,
                        args,
                    }));
                } else {
                    let (prefix, target) = hoist(expr);
                    expr = Tree::FieldAccess(Arc::new(FieldAccess {
                        id: NodeId::fresh(),
                        prefix,
                        target,
                        dot_prefix,
                        name,
                    }));
                }
                continue;
            }
            if self.peek_kind() == TokenKind::LParen {
                if let Tree::Ident(name) = &expr {
                    let name = name.clone();
                    let args = self.parse_args()?;
                    let (prefix, _) = hoist(expr);
                    let name = Arc::new(Ident {
                        id: name.id,
                        prefix: Space::empty(),
                        simple_name: name.simple_name.clone(),
                    });
                    expr = Tree::Call(Arc::new(MethodCall {
                        id: NodeId::fresh(),
                        prefix,
                        select: None,
                        name,
                        args,
                    }));
                    continue;
                }
            }
            return Ok(expr);
        }
    }

    fn parse_args(&mut self) -> Parse<Container> {
        let before = self.take_prefix();
        self.expect(TokenKind::LParen, "'('")?;

        if self.peek_kind() == TokenKind::RParen {
            let hole = Tree::Empty(Arc::new(Empty {
                id: NodeId::fresh(),
                prefix: self.take_prefix(),
            }));
            self.bump();
            return Ok(Container {
                before,
                elems: vec![RightPadded::new(hole)],
            });
        }

        let mut elems = Vec::new();
        loop {
            let arg = self.parse_expression()?;
            match self.peek_kind() {
                TokenKind::Comma => {
                    let after = self.take_prefix();
                    self.bump();
                    elems.push(RightPadded::with_after(arg, after));
                }
                TokenKind::RParen => {
                    let after = self.take_prefix();
                    self.bump();
                    elems.push(RightPadded::with_after(arg, after));
                    return Ok(Container { before, elems });
                }
                _ => return Err(self.error_here("',' or ')'")),
            }
        }
    }

    fn parse_primary(&mut self) -> Parse<Tree> {
        match self.peek_kind() {
            TokenKind::LParen => {
                let prefix = self.take_prefix();
                self.bump();
                let inner = self.parse_expression()?;
                let after = self.take_prefix();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Tree::Paren(Arc::new(Paren {
                    id: NodeId::fresh(),
                    prefix,
                    expr: RightPadded::with_after(inner, after),
                })))
            }
            TokenKind::Int => {
                let prefix = self.take_prefix();
                let token = self.bump();
                let value = token.text.parse::<i64>().map_err(|_| {
                    self.ctx
                        .invalid_literal("integer", &token.text, self.token_span(&token))
                })?;
                Ok(literal(prefix, LiteralValue::Int(value), token.text))
            }
            TokenKind::Float => {
                let prefix = self.take_prefix();
                let token = self.bump();
                let value = token.text.parse::<f64>().map_err(|_| {
                    self.ctx
                        .invalid_literal("number", &token.text, self.token_span(&token))
                })?;
                Ok(literal(prefix, LiteralValue::Float(value), token.text))
            }
            TokenKind::Str => {
                let prefix = self.take_prefix();
                let token = self.bump();
                let inner = token.text[1..token.text.len() - 1].to_string();
                Ok(literal(
                    prefix,
                    LiteralValue::Str(unescape(&inner)),
                    token.text,
                ))
            }
            TokenKind::Char => {
                let prefix = self.take_prefix();
                let token = self.bump();
                let inner = unescape(&token.text[1..token.text.len() - 1]);
                let ch = inner.chars().next().ok_or_else(|| {
                    self.ctx
                        .invalid_literal("character", &token.text, self.token_span(&token))
                })?;
                Ok(literal(prefix, LiteralValue::Char(ch), token.text))
            }
            TokenKind::Ident => {
                if self.peek_word("true") || self.peek_word("false") {
                    let prefix = self.take_prefix();
                    let token = self.bump();
                    let value = LiteralValue::Bool(token.text == "true");
                    return Ok(literal(prefix, value, token.text));
                }
                if self.peek_word("null") {
                    let prefix = self.take_prefix();
                    let token = self.bump();
                    return Ok(literal(prefix, LiteralValue::Null, token.text));
                }
                Ok(Tree::Ident(self.parse_ident("an expression")?))
            }
            _ => Err(self.error_here("an expression")),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Strips a subexpression's prefix so the enclosing node can own it. The
/// outermost node of an expression chain always owns the leading trivia.
fn hoist(expr: Tree) -> (Space, Tree) {
    let prefix = expr.prefix().clone();
    let stripped = expr.with_prefix(Space::empty());
    (prefix, stripped)
}

fn literal(prefix: Space, value: LiteralValue, value_source: String) -> Tree {
    Tree::Literal(Arc::new(Literal {
        id: NodeId::fresh(),
        prefix,
        value,
        value_source,
    }))
}

fn modifier_ahead(token: &Token) -> Option<ModifierKind> {
    if token.kind != TokenKind::Ident {
        return None;
    }
    ModifierKind::from_keyword(&token.text)
}

/// Operator levels, loosest first.
const BINARY_LEVELS: [&[(TokenKind, BinaryOp)]; 6] = [
    &[(TokenKind::OrOr, BinaryOp::Or)],
    &[(TokenKind::AndAnd, BinaryOp::And)],
    &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::Ne, BinaryOp::Ne)],
    &[
        (TokenKind::Lt, BinaryOp::Lt),
        (TokenKind::Gt, BinaryOp::Gt),
        (TokenKind::Le, BinaryOp::Le),
        (TokenKind::Ge, BinaryOp::Ge),
    ],
    &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
    &[
        (TokenKind::Star, BinaryOp::Mul),
        (TokenKind::Slash, BinaryOp::Div),
        (TokenKind::Percent, BinaryOp::Rem),
    ],
];

fn binary_op_at(kind: TokenKind, level: u8) -> Option<BinaryOp> {
    BINARY_LEVELS[level as usize]
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, op)| *op)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
