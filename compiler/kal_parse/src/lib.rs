//! Recursive descent parser for Kal.
//!
//! Expressions use precedence climbing against a runtime [`OperatorTable`],
//! so a `def binary| 5 (a b) ...` unit changes how every later unit parses.
//! The parser handles exactly one top-level construct per call and never
//! loops past it; looping, `;` skipping and error recovery belong to the
//! session driver.

mod cursor;
mod error;
mod grammar;
mod precedence;
mod recovery;

pub use cursor::TokenCursor;
pub use error::{ErrorContext, ParseError};
pub use precedence::{OperatorTable, BUILTIN_OPERATORS};
pub use recovery::synchronize;

use kal_ir::{Name, Span, TokenKind, TopLevel};

/// Name of the function a top-level expression is wrapped in.
pub const ANON_EXPR_NAME: &str = "__anon_expr";

/// Parser for one top-level unit.
///
/// Borrows the session's long-lived cursor and operator table. Build a new
/// one for every unit so it always sees the table as the previous unit
/// left it.
pub struct Parser<'c, 'a> {
    cursor: &'c mut TokenCursor<'a>,
    ops: &'c OperatorTable,
}

impl<'c, 'a> Parser<'c, 'a> {
    pub fn new(cursor: &'c mut TokenCursor<'a>, ops: &'c OperatorTable) -> Self {
        Parser { cursor, ops }
    }

    /// Parse whatever unit starts at the current token.
    ///
    /// Returns `Ok(None)` at end of input. A leading `;` is not a unit; the
    /// caller skips it before asking.
    pub fn parse_top_level(&mut self) -> Result<Option<TopLevel>, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Eof => Ok(None),
            TokenKind::Def => self.parse_definition().map(|f| Some(TopLevel::Definition(f))),
            TokenKind::Extern => self.parse_extern().map(|p| Some(TopLevel::Extern(p))),
            _ => self
                .parse_top_level_expr()
                .map(|f| Some(TopLevel::Expression(f))),
        }
    }

    // Cursor delegation

    #[inline]
    fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    /// Span from `start` through the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous_span())
    }

    fn intern(&self, s: &str) -> Name {
        self.cursor.interner().intern(s)
    }

    /// Run `f`, tagging any error it returns with `context`.
    fn in_error_context<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        f(self).map_err(|e| e.with_context(context))
    }
}

/// Parse one expression from `source` with the given operator table.
///
/// Convenience for tests and tools; the session drives [`Parser`] directly.
pub fn parse_expression(
    source: &str,
    interner: &kal_ir::StringInterner,
    ops: &OperatorTable,
) -> Result<kal_ir::Expr, ParseError> {
    let mut cursor = TokenCursor::new(source, interner);
    Parser::new(&mut cursor, ops).parse_expression()
}

#[cfg(test)]
mod tests;
