//! Tokens produced by the lexer.

use std::fmt;

use crate::{Name, Span};

/// A token with its span in the source.
#[derive(Copy, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Token kinds.
///
/// Keywords are their own variants. Every character that is not part of an
/// identifier, number, comment or whitespace becomes [`TokenKind::Op`], so
/// punctuation such as `(` `)` `,` `;` and user-declared operator symbols
/// share one representation and the lexer never fails.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    Def,
    Extern,
    If,
    Then,
    Else,
    For,
    In,
    Var,
    Unary,
    Binary,
    Ident(Name),
    Number(f64),
    Op(char),
    /// End of input. Returned again on every subsequent request.
    Eof,
}

impl TokenKind {
    /// Keyword for reserved word `s`, if any.
    pub fn keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "def" => TokenKind::Def,
            "extern" => TokenKind::Extern,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "var" => TokenKind::Var,
            "unary" => TokenKind::Unary,
            "binary" => TokenKind::Binary,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Def
                | TokenKind::Extern
                | TokenKind::If
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Var
                | TokenKind::Unary
                | TokenKind::Binary
        )
    }

    /// True for the tokens that start a new top-level unit.
    ///
    /// Error recovery skips forward to one of these.
    pub fn is_unit_boundary(&self) -> bool {
        matches!(
            self,
            TokenKind::Def | TokenKind::Extern | TokenKind::Op(';') | TokenKind::Eof
        )
    }

    /// Short human-readable description for diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            TokenKind::Def => "`def`".into(),
            TokenKind::Extern => "`extern`".into(),
            TokenKind::If => "`if`".into(),
            TokenKind::Then => "`then`".into(),
            TokenKind::Else => "`else`".into(),
            TokenKind::For => "`for`".into(),
            TokenKind::In => "`in`".into(),
            TokenKind::Var => "`var`".into(),
            TokenKind::Unary => "`unary`".into(),
            TokenKind::Binary => "`binary`".into(),
            TokenKind::Ident(_) => "identifier".into(),
            TokenKind::Number(_) => "number".into(),
            TokenKind::Op(c) => format!("`{c}`"),
            TokenKind::Eof => "end of input".into(),
        }
    }
}
