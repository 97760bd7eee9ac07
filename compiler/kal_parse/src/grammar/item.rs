//! Top-level items: prototypes, definitions, externs, bare expressions.

use kal_diagnostic::ErrorCode;
use kal_ir::{Function, Precedence, ProtoKind, Prototype, TokenKind};

use crate::precedence::is_builtin;
use crate::{ErrorContext, ParseError, Parser, ANON_EXPR_NAME};

impl Parser<'_, '_> {
    /// `'def' prototype expr`
    pub fn parse_definition(&mut self) -> Result<Function, ParseError> {
        self.in_error_context(ErrorContext::Definition, |p| {
            p.cursor.expect(TokenKind::Def, "expected 'def'")?;
            let proto = p.parse_prototype()?;
            let body = p.parse_expression()?;
            Ok(Function { proto, body })
        })
    }

    /// `'extern' prototype`
    pub fn parse_extern(&mut self) -> Result<Prototype, ParseError> {
        self.in_error_context(ErrorContext::Extern, |p| {
            p.cursor.expect(TokenKind::Extern, "expected 'extern'")?;
            p.parse_prototype()
        })
    }

    /// A bare expression, wrapped in a zero-argument function named
    /// [`ANON_EXPR_NAME`].
    pub fn parse_top_level_expr(&mut self) -> Result<Function, ParseError> {
        self.in_error_context(ErrorContext::TopLevelExpression, |p| {
            let body = p.parse_expression()?;
            let proto = Prototype::new(
                p.intern(ANON_EXPR_NAME),
                Vec::new(),
                ProtoKind::Function,
                body.span,
            );
            Ok(Function { proto, body })
        })
    }

    /// ```text
    /// prototype := ident '(' ident* ')'
    ///            | 'unary' OPCHAR '(' ident ')'
    ///            | 'binary' OPCHAR number? '(' ident ident ')'
    /// ```
    pub fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        self.in_error_context(ErrorContext::Prototype, Self::parse_prototype_inner)
    }

    fn parse_prototype_inner(&mut self) -> Result<Prototype, ParseError> {
        let start = self.current_span();

        let (name, kind) = match self.current_kind() {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                (name, ProtoKind::Function)
            }
            TokenKind::Unary => {
                self.cursor.advance();
                let op = self.expect_operator_char("Expected unary operator")?;
                (self.intern(&format!("unary{op}")), ProtoKind::Unary(op))
            }
            TokenKind::Binary => {
                self.cursor.advance();
                let op_span = self.current_span();
                let op = self.expect_operator_char("Expected binary operator")?;
                if is_builtin(op) {
                    return Err(ParseError::new(
                        ErrorCode::E1005,
                        format!("Cannot redefine built-in operator '{op}'"),
                        op_span,
                    ));
                }
                let precedence = self.parse_declared_precedence()?;
                (
                    self.intern(&format!("binary{op}")),
                    ProtoKind::Binary { op, precedence },
                )
            }
            _ => {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    "Expected function name in prototype",
                    self.current_span(),
                ))
            }
        };

        if !self.cursor.check_op('(') {
            return Err(ParseError::new(
                ErrorCode::E1005,
                "Expected '(' in prototype",
                self.current_span(),
            ));
        }
        let open = self.cursor.advance().span;

        let mut params = Vec::new();
        while let TokenKind::Ident(param) = self.current_kind() {
            self.cursor.advance();
            params.push(param);
        }

        if !self.cursor.eat_op(')') {
            return Err(ParseError::new(
                ErrorCode::E1005,
                "Expected ')' in prototype",
                self.current_span(),
            )
            .with_related(open, "'(' opened here"));
        }

        let span = self.span_from(start);
        let expected_arity = match kind {
            ProtoKind::Function => None,
            ProtoKind::Unary(_) => Some(1),
            ProtoKind::Binary { .. } => Some(2),
        };
        if expected_arity.is_some_and(|n| n != params.len()) {
            return Err(ParseError::new(
                ErrorCode::E1007,
                "Invalid number of operands for operator",
                span,
            ));
        }

        Ok(Prototype::new(name, params, kind, span))
    }

    /// The operator symbol after `unary`/`binary`.
    fn expect_operator_char(&mut self, message: &'static str) -> Result<char, ParseError> {
        match self.current_kind() {
            TokenKind::Op(c) if c.is_ascii() => {
                self.cursor.advance();
                Ok(c)
            }
            _ => Err(ParseError::new(ErrorCode::E1005, message, self.current_span())),
        }
    }

    /// Optional precedence of a binary operator prototype, in `[1, 100]`.
    fn parse_declared_precedence(&mut self) -> Result<Precedence, ParseError> {
        let TokenKind::Number(value) = self.current_kind() else {
            return Ok(Precedence::DEFAULT_USER);
        };
        let span = self.current_span();
        let precedence = Precedence::user(value).ok_or_else(|| {
            ParseError::new(ErrorCode::E1006, "Invalid precedence: must be 1..100", span)
        })?;
        self.cursor.advance();
        Ok(precedence)
    }
}
