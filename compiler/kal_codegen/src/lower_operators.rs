//! Operator lowering: built-in arithmetic and comparison, assignment, and
//! calls to user-defined `unary<op>` / `binary<op>` functions.

use inkwell::values::FloatValue;
use inkwell::FloatPredicate;
use kal_ir::{Expr, ExprKind, Span};

use crate::error::CodegenError;
use crate::expr_lowerer::ExprLowerer;

impl<'ctx> ExprLowerer<'_, 'ctx> {
    pub(crate) fn lower_unary(
        &mut self,
        op: char,
        operand: &Expr,
        span: Span,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let value = self.lower(operand)?;
        let name = self.interner.intern(&format!("unary{op}"));
        let Some(callee) = self.callee(name) else {
            return Err(CodegenError::UnknownUnaryOperator { op, span });
        };
        self.call(callee, &[value])
    }

    pub(crate) fn lower_binary(
        &mut self,
        op: char,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        if op == '=' {
            return self.lower_assign(lhs, rhs, span);
        }

        let l = self.lower(lhs)?;
        let r = self.lower(rhs)?;
        match op {
            '+' => Ok(self.builder.build_float_add(l, r, "addtmp")?),
            '-' => Ok(self.builder.build_float_sub(l, r, "subtmp")?),
            '*' => Ok(self.builder.build_float_mul(l, r, "multmp")?),
            '<' => {
                let cmp = self
                    .builder
                    .build_float_compare(FloatPredicate::ULT, l, r, "cmptmp")?;
                Ok(self
                    .builder
                    .build_unsigned_int_to_float(cmp, self.context.f64_type(), "booltmp")?)
            }
            _ => {
                let name = self.interner.intern(&format!("binary{op}"));
                let Some(callee) = self.callee(name) else {
                    return Err(CodegenError::UnresolvedBinaryOperator { op, span });
                };
                self.call(callee, &[l, r])
            }
        }
    }

    /// `name = value`: store into the variable's slot, yield the value.
    fn lower_assign(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let ExprKind::Variable(name) = lhs.kind else {
            return Err(CodegenError::InvalidAssignTarget { span: lhs.span });
        };
        let value = self.lower(rhs)?;
        let Some(slot) = self.env.lookup(name) else {
            return Err(CodegenError::UnknownVariable {
                name: self.resolve_name(name).to_string(),
                span,
            });
        };
        self.builder.build_store(slot, value)?;
        Ok(value)
    }
}
