//! Call lowering.

use inkwell::values::FloatValue;
use kal_ir::{Expr, Name, Span};

use crate::error::CodegenError;
use crate::expr_lowerer::ExprLowerer;

impl<'ctx> ExprLowerer<'_, 'ctx> {
    /// `callee(args...)`. Arguments are lowered left to right; the first
    /// failure aborts the call.
    pub(crate) fn lower_call(
        &mut self,
        callee: Name,
        args: &[Expr],
        span: Span,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let Some(function) = self.callee(callee) else {
            return Err(CodegenError::UnknownFunction {
                name: self.resolve_name(callee).to_string(),
                span,
            });
        };
        let arity = function.count_params() as usize;
        if arity != args.len() {
            return Err(CodegenError::ArgumentCount {
                name: self.resolve_name(callee).to_string(),
                expected: arity,
                found: args.len(),
                span,
            });
        }

        let values = args
            .iter()
            .map(|arg| self.lower(arg))
            .collect::<Result<Vec<_>, _>>()?;
        self.call(function, &values)
    }
}
