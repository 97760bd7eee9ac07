//! Pull-based token stream.

use std::collections::VecDeque;

use kal_ir::{Span, StringInterner, Token, TokenKind};
use logos::Logos;

use crate::number::parse_number;
use crate::raw_token::RawToken;

/// Token stream over one source string.
pub struct Lexer<'a> {
    raw: logos::Lexer<'a, RawToken>,
    interner: &'a StringInterner,
    /// Operator tokens split out of a multi-character error slice.
    pending: VecDeque<Token>,
    eof: Span,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, interner: &'a StringInterner) -> Self {
        let end = Span::from_range(source.len()..source.len());
        Lexer {
            raw: RawToken::lexer(source),
            interner,
            pending: VecDeque::new(),
            eof: end,
        }
    }

    /// Produce the next token. Returns `Eof` forever once input runs out.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.pending.pop_front() {
            return tok;
        }

        loop {
            let Some(result) = self.raw.next() else {
                return Token::new(TokenKind::Eof, self.eof);
            };
            let span = Span::from_range(self.raw.span());
            let slice = self.raw.slice();

            let kind = match result {
                Ok(raw) => convert(raw, slice, self.interner),
                Err(()) => {
                    self.split_unknown(slice, span);
                    match self.pending.pop_front() {
                        Some(tok) => return tok,
                        None => continue,
                    }
                }
            };
            return Token::new(kind, span);
        }
    }

    /// Turn an unrecognized slice into one `Op` token per character.
    fn split_unknown(&mut self, slice: &str, span: Span) {
        for (offset, c) in slice.char_indices() {
            let start = span.start as usize + offset;
            let tok_span = Span::from_range(start..start + c.len_utf8());
            self.pending.push_back(Token::new(TokenKind::Op(c), tok_span));
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        (tok.kind != TokenKind::Eof).then_some(tok)
    }
}

fn convert(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::Def => TokenKind::Def,
        RawToken::Extern => TokenKind::Extern,
        RawToken::If => TokenKind::If,
        RawToken::Then => TokenKind::Then,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Var => TokenKind::Var,
        RawToken::Unary => TokenKind::Unary,
        RawToken::Binary => TokenKind::Binary,
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        RawToken::Number => TokenKind::Number(parse_number(slice)),
    }
}

/// Lex all of `source`, including the trailing `Eof` token.
pub fn lex(source: &str, interner: &StringInterner) -> Vec<Token> {
    let mut lexer = Lexer::new(source, interner);
    let mut tokens: Vec<Token> = lexer.by_ref().collect();
    tokens.push(lexer.next_token());
    tracing::trace!(count = tokens.len(), "lexed source");
    tokens
}
