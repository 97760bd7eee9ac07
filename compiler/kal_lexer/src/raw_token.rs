//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! string interning and final token conversion.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r\x0B\x0C]+")] // Whitespace
#[logos(skip r"#[^\n\r]*")] // Comment to end of line
pub(crate) enum RawToken {
    #[token("def")]
    Def,
    #[token("extern")]
    Extern,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("var")]
    Var,
    #[token("unary")]
    Unary,
    #[token("binary")]
    Binary,

    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Ident,

    // Maximal run of digits and dots; `1.2.3` is one token.
    #[regex(r"[0-9.]+")]
    Number,
}
