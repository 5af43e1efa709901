//! Trivia-attaching lexer.
//!
//! Every token carries the whitespace and comments that precede it, so the
//! parser can hand each node the exact trivia it owns and printing stays
//! lossless. Comments keep their text without delimiters; that is the form
//! the marker extractor matches against.

use thiserror::Error;

use crate::ast::{Comment, CommentStyle, Space};

#[derive(Debug, Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },
    #[error("unterminated character literal")]
    UnterminatedChar { offset: usize },
    #[error("unterminated block comment")]
    UnterminatedComment { offset: usize },
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { offset }
            | LexError::UnterminatedChar { offset }
            | LexError::UnterminatedComment { offset }
            | LexError::UnexpectedChar { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Int,
    Float,
    Str,
    Char,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
    Comma,
    Dot,
    At,
    Star,
    Assign,
    Plus,
    Minus,
    Slash,
    Percent,
    Bang,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub prefix: Space,
    pub offset: usize,
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let prefix = self.lex_space()?;
            let offset = self.offset();
            if self.pos >= self.chars.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    prefix,
                    offset,
                });
                return Ok(tokens);
            }
            let (kind, text) = self.lex_token()?;
            tokens.push(Token {
                kind,
                text,
                prefix,
                offset,
            });
        }
    }

    fn offset(&self) -> usize {
        // Byte offset of the current char position.
        self.chars[..self.pos].iter().map(|c| c.len_utf8()).sum()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    // ------------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------------

    fn lex_space(&mut self) -> Result<Space, LexError> {
        let mut space = Space::empty();
        let mut buf = String::new();
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    buf.push(c);
                    self.pos += 1;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    flush(&mut space, &mut buf);
                    self.pos += 2;
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        text.push(c);
                        self.pos += 1;
                    }
                    space.comments.push(Comment {
                        style: CommentStyle::Line,
                        text,
                        suffix: String::new(),
                    });
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    flush(&mut space, &mut buf);
                    let start = self.offset();
                    self.pos += 2;
                    let mut text = String::new();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(c) => {
                                text.push(c);
                                self.pos += 1;
                            }
                            None => {
                                return Err(LexError::UnterminatedComment { offset: start });
                            }
                        }
                    }
                    space.comments.push(Comment {
                        style: CommentStyle::Block,
                        text,
                        suffix: String::new(),
                    });
                }
                _ => break,
            }
        }
        flush(&mut space, &mut buf);
        return Ok(space);

        fn flush(space: &mut Space, buf: &mut String) {
            if buf.is_empty() {
                return;
            }
            let run = std::mem::take(buf);
            match space.comments.last_mut() {
                Some(comment) => comment.suffix.push_str(&run),
                None => space.whitespace.push_str(&run),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn lex_token(&mut self) -> Result<(TokenKind, String), LexError> {
        let offset = self.offset();
        let c = self.peek().expect("lex_token called at end of input");

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let mut text = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    text.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            return Ok((TokenKind::Ident, text));
        }

        if c.is_ascii_digit() {
            let mut text = String::new();
            let mut kind = TokenKind::Int;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
                kind = TokenKind::Float;
                text.push('.');
                self.pos += 1;
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
            return Ok((kind, text));
        }

        if c == '"' {
            let mut text = String::from('"');
            self.pos += 1;
            loop {
                match self.bump() {
                    Some('"') => {
                        text.push('"');
                        return Ok((TokenKind::Str, text));
                    }
                    Some('\\') => {
                        text.push('\\');
                        match self.bump() {
                            Some(esc) => text.push(esc),
                            None => return Err(LexError::UnterminatedString { offset }),
                        }
                    }
                    Some(c) => text.push(c),
                    None => return Err(LexError::UnterminatedString { offset }),
                }
            }
        }

        if c == '\'' {
            let mut text = String::from('\'');
            self.pos += 1;
            loop {
                match self.bump() {
                    Some('\'') => {
                        text.push('\'');
                        return Ok((TokenKind::Char, text));
                    }
                    Some('\\') => {
                        text.push('\\');
                        match self.bump() {
                            Some(esc) => text.push(esc),
                            None => return Err(LexError::UnterminatedChar { offset }),
                        }
                    }
                    Some(c) => text.push(c),
                    None => return Err(LexError::UnterminatedChar { offset }),
                }
            }
        }

        let two = |a: char, b: char| -> bool { c == a && self.peek_at(1) == Some(b) };
        let (kind, len) = if two('=', '=') {
            (TokenKind::EqEq, 2)
        } else if two('!', '=') {
            (TokenKind::Ne, 2)
        } else if two('<', '=') {
            (TokenKind::Le, 2)
        } else if two('>', '=') {
            (TokenKind::Ge, 2)
        } else if two('&', '&') {
            (TokenKind::AndAnd, 2)
        } else if two('|', '|') {
            (TokenKind::OrOr, 2)
        } else {
            let kind = match c {
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ';' => TokenKind::Semi,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '@' => TokenKind::At,
                '*' => TokenKind::Star,
                '=' => TokenKind::Assign,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '!' => TokenKind::Bang,
                '<' => TokenKind::Lt,
                '>' => TokenKind::Gt,
                _ => return Err(LexError::UnexpectedChar { ch: c, offset }),
            };
            (kind, 1)
        };
        let text: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.pos += len;
        Ok((kind, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_attaches_to_the_following_token() {
        let tokens = lex("  /* note */ class").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "class");
        assert_eq!(tokens[0].prefix.whitespace, "  ");
        assert_eq!(tokens[0].prefix.comments.len(), 1);
        assert_eq!(tokens[0].prefix.comments[0].text, " note ");
        assert_eq!(tokens[0].prefix.comments[0].suffix, " ");
    }

    #[test]
    fn line_comment_excludes_the_newline() {
        let tokens = lex("// hi\nx").unwrap();
        let prefix = &tokens[0].prefix;
        assert_eq!(prefix.comments[0].style, CommentStyle::Line);
        assert_eq!(prefix.comments[0].text, " hi");
        assert_eq!(prefix.comments[0].suffix, "\n");
    }

    #[test]
    fn two_char_operators_win_over_single() {
        let kinds: Vec<TokenKind> = lex("== != <= >= && || =")
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(matches!(
            lex("/* never closed"),
            Err(LexError::UnterminatedComment { .. })
        ));
    }
}
