//! Expression parsing.

use kal_diagnostic::ErrorCode;
use kal_ir::{Expr, ExprKind, Precedence, TokenKind, VarBinding};
use kal_stack::ensure_sufficient_stack;

use crate::{ErrorContext, ParseError, Parser};

/// True if `c` may start a unary operator application.
///
/// `(` and `,` are punctuation; non-ASCII characters never name operators.
fn is_operator_char(c: char) -> bool {
    c.is_ascii() && c != '(' && c != ','
}

impl Parser<'_, '_> {
    /// `expr := unary binRHS(0)`
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let lhs = self.parse_unary()?;
            self.parse_bin_rhs(0, lhs)
        })
    }

    /// Precedence of the current token as a binary operator.
    fn current_precedence(&self) -> Option<Precedence> {
        match self.current_kind() {
            TokenKind::Op(c) if c.is_ascii() => self.ops.precedence(c),
            _ => None,
        }
    }

    /// Precedence climbing.
    ///
    /// Consumes `(op unary)` pairs while the operator binds at least as
    /// tightly as `min`. A threshold of 0 accepts every declared operator.
    /// Equal precedences associate to the left.
    fn parse_bin_rhs(&mut self, min: u8, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            let prec = match self.current_precedence() {
                Some(p) if p.get() >= min => p,
                _ => return Ok(lhs),
            };
            let TokenKind::Op(op) = self.cursor.advance().kind else {
                return Ok(lhs);
            };

            let mut rhs = self.parse_unary()?;
            if self.current_precedence() > Some(prec) {
                rhs = ensure_sufficient_stack(|| self.parse_bin_rhs(prec.next().get(), rhs))?;
            }

            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
    }

    /// `unary := primary | OPCHAR unary`
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::Op(c) if is_operator_char(c) => {
                let start = self.cursor.advance().span;
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                let span = start.merge(operand.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: c,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(_) => self.parse_identifier_expr(),
            TokenKind::Number(value) => {
                let span = self.cursor.advance().span;
                Ok(Expr::new(ExprKind::Number(value), span))
            }
            TokenKind::Op('(') => self.in_error_context(ErrorContext::Parenthesized, Self::parse_paren_expr),
            TokenKind::If => self.in_error_context(ErrorContext::IfExpression, Self::parse_if_expr),
            TokenKind::For => self.in_error_context(ErrorContext::ForLoop, Self::parse_for_expr),
            TokenKind::Var => self.in_error_context(ErrorContext::VarExpression, Self::parse_var_expr),
            _ => Err(self.make_expected_expression_error()),
        }
    }

    #[cold]
    #[inline(never)]
    fn make_expected_expression_error(&self) -> ParseError {
        ParseError::new(
            ErrorCode::E1002,
            "unknown token when expecting an expression",
            self.current_span(),
        )
    }

    /// `identifier | identifier '(' (expr (',' expr)*)? ')'`
    fn parse_identifier_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let name = self.cursor.expect_ident("expected identifier")?;

        if !self.cursor.check_op('(') {
            return Ok(Expr::new(ExprKind::Variable(name), start));
        }
        let open = self.cursor.advance().span;

        let args = self.in_error_context(ErrorContext::CallArguments, |p| {
            let mut args = Vec::new();
            if p.cursor.eat_op(')') {
                return Ok(args);
            }
            loop {
                args.push(p.parse_expression()?);
                if p.cursor.eat_op(')') {
                    return Ok(args);
                }
                if !p.cursor.eat_op(',') {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "Expected ')' or ',' in argument list",
                        p.current_span(),
                    )
                    .with_related(open, "'(' opened here"));
                }
            }
        })?;

        Ok(Expr::new(
            ExprKind::Call { callee: name, args },
            self.span_from(start),
        ))
    }

    /// `'(' expr ')'`
    ///
    /// Parentheses do not produce a node; the inner expression's span is
    /// widened to include them.
    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        let open = self.cursor.advance().span;
        let mut inner = self.parse_expression()?;
        if !self.cursor.eat_op(')') {
            return Err(
                ParseError::new(ErrorCode::E1003, "expected ')'", self.current_span())
                    .with_related(open, "'(' opened here"),
            );
        }
        inner.span = self.span_from(open);
        Ok(inner)
    }

    /// `'if' expr 'then' expr 'else' expr`
    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_expression()?;
        self.cursor.expect(TokenKind::Then, "expected then")?;
        let then_branch = self.parse_expression()?;
        self.cursor.expect(TokenKind::Else, "expected else")?;
        let else_branch = self.parse_expression()?;

        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            self.span_from(start),
        ))
    }

    /// `'for' ident '=' expr ',' expr (',' expr)? 'in' expr`
    fn parse_for_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let var = self.cursor.expect_ident("expected identifier after for")?;

        if !self.cursor.eat_op('=') {
            return Err(self.cursor.unexpected("expected '=' after for"));
        }
        let start_value = self.parse_expression()?;

        if !self.cursor.eat_op(',') {
            return Err(self.cursor.unexpected("expected ',' after for start value"));
        }
        let end = self.parse_expression()?;

        let step = if self.cursor.eat_op(',') {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.cursor.expect(TokenKind::In, "expected 'in' after for")?;
        let body = self.parse_expression()?;

        Ok(Expr::new(
            ExprKind::For {
                var,
                start: Box::new(start_value),
                end: Box::new(end),
                step,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    /// `'var' ident ('=' expr)? (',' ident ('=' expr)?)* 'in' expr`
    fn parse_var_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let mut bindings = Vec::new();

        let mut name = self.cursor.expect_ident("expected identifier after var")?;
        loop {
            let init = if self.cursor.eat_op('=') {
                Some(self.parse_expression()?)
            } else {
                None
            };
            bindings.push(VarBinding { name, init });

            if !self.cursor.eat_op(',') {
                break;
            }
            name = self
                .cursor
                .expect_ident("expected identifier list after var")?;
        }

        self.cursor
            .expect(TokenKind::In, "expected 'in' keyword after 'var'")?;
        let body = self.parse_expression()?;

        Ok(Expr::new(
            ExprKind::Var {
                bindings,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }
}
