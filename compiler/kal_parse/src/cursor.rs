//! Token cursor over the lexer's pull stream.
//!
//! Holds exactly one token of lookahead. The cursor outlives individual
//! parses: the session creates one per input and parses unit after unit
//! from it, so everything one unit does to shared state is visible before
//! the next unit's first token is examined.

use kal_diagnostic::ErrorCode;
use kal_ir::{Name, Span, StringInterner, Token, TokenKind};
use kal_lexer::Lexer;

use crate::ParseError;

pub struct TokenCursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous_span: Span,
    interner: &'a StringInterner,
}

impl<'a> TokenCursor<'a> {
    /// Create a cursor positioned on the first token of `source`.
    pub fn new(source: &'a str, interner: &'a StringInterner) -> Self {
        let mut lexer = Lexer::new(source, interner);
        let current = lexer.next_token();
        TokenCursor {
            lexer,
            current,
            previous_span: Span::DUMMY,
            interner,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.current
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current.span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        self.previous_span
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Consume the current token and return it. At end of input this keeps
    /// returning `Eof`.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous_span = consumed.span;
        consumed
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    #[inline]
    pub fn check_op(&self, op: char) -> bool {
        self.current.kind == TokenKind::Op(op)
    }

    /// Consume `op` if it is the current token.
    pub fn eat_op(&mut self, op: char) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with `message`.
    #[inline]
    pub fn expect(&mut self, kind: TokenKind, message: &'static str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(message))
        }
    }

    /// Consume an identifier or fail with `message`.
    #[inline]
    pub fn expect_ident(&mut self, message: &'static str) -> Result<Name, ParseError> {
        if let TokenKind::Ident(name) = self.current.kind {
            self.advance();
            Ok(name)
        } else {
            Err(self.make_ident_error(message))
        }
    }

    /// Error for the current token with the generic "unexpected token" code.
    #[cold]
    #[inline(never)]
    pub fn unexpected(&self, message: &'static str) -> ParseError {
        ParseError::new(ErrorCode::E1001, message, self.current.span)
    }

    #[cold]
    #[inline(never)]
    fn make_ident_error(&self, message: &'static str) -> ParseError {
        ParseError::new(ErrorCode::E1004, message, self.current.span)
    }
}
