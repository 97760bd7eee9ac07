//! Control flow lowering: `if`, `for` and `var`.

use inkwell::values::FloatValue;
use inkwell::FloatPredicate;
use kal_ir::{Expr, Name, VarBinding};

use crate::error::CodegenError;
use crate::expr_lowerer::ExprLowerer;

impl<'ctx> ExprLowerer<'_, 'ctx> {
    /// `if c then t else e`: branch on `c != 0`, join the two sides with a
    /// phi keyed by the block each side ended in.
    pub(crate) fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let cond_val = self.lower(cond)?;
        let test = self.builder.build_float_compare(
            FloatPredicate::ONE,
            cond_val,
            self.const_f64(0.0),
            "ifcond",
        )?;

        let then_bb = self.append_block("then");
        let else_bb = self.append_block("else");
        let merge_bb = self.append_block("ifcont");
        self.builder
            .build_conditional_branch(test, then_bb, else_bb)?;

        self.builder.position_at_end(then_bb);
        let then_val = self.lower(then_branch)?;
        let then_end = self.current_block()?;
        self.builder.build_unconditional_branch(merge_bb)?;

        self.builder.position_at_end(else_bb);
        let else_val = self.lower(else_branch)?;
        let else_end = self.current_block()?;
        self.builder.build_unconditional_branch(merge_bb)?;

        self.builder.position_at_end(merge_bb);
        let phi = self.builder.build_phi(self.context.f64_type(), "iftmp")?;
        phi.add_incoming(&[(&then_val, then_end), (&else_val, else_end)]);
        Ok(phi.as_basic_value().into_float_value())
    }

    /// `for var = start, end, step in body`.
    ///
    /// ```text
    /// entry:      slot = alloca; store start
    /// loopcond:   test end != 0 with var bound  -> loop / afterloop
    /// loop:       body; slot += step            -> loopcond
    /// afterloop:  yields 0.0
    /// ```
    ///
    /// The test runs before every iteration, including the first, so a
    /// body that assigns `var` is seen by the next test.
    pub(crate) fn lower_for(
        &mut self,
        var: Name,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let slot = self.entry_alloca(var)?;
        let start_val = self.lower(start)?;
        self.builder.build_store(slot, start_val)?;

        let cond_bb = self.append_block("loopcond");
        let body_bb = self.append_block("loop");
        let after_bb = self.append_block("afterloop");
        self.builder.build_unconditional_branch(cond_bb)?;

        self.in_scope(|this| {
            this.env.bind(var, slot);

            this.builder.position_at_end(cond_bb);
            let end_val = this.lower(end)?;
            let test = this.builder.build_float_compare(
                FloatPredicate::ONE,
                end_val,
                this.const_f64(0.0),
                "loopcond",
            )?;
            this.builder
                .build_conditional_branch(test, body_bb, after_bb)?;

            this.builder.position_at_end(body_bb);
            this.lower(body)?;
            let step_val = match step {
                Some(step) => this.lower(step)?,
                None => this.const_f64(1.0),
            };
            let current = this.load(slot, this.resolve_name(var))?;
            let next = this.builder.build_float_add(current, step_val, "nextvar")?;
            this.builder.build_store(slot, next)?;
            this.builder.build_unconditional_branch(cond_bb)?;
            Ok(())
        })?;

        self.builder.position_at_end(after_bb);
        Ok(self.const_f64(0.0))
    }

    /// `var a = 1, b in body`. Each initializer sees the bindings before
    /// it; an omitted initializer is 0.0.
    pub(crate) fn lower_var(
        &mut self,
        bindings: &[VarBinding],
        body: &Expr,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        self.in_scope(|this| {
            for binding in bindings {
                let init = match &binding.init {
                    Some(init) => this.lower(init)?,
                    None => this.const_f64(0.0),
                };
                let slot = this.entry_alloca(binding.name)?;
                this.builder.build_store(slot, init)?;
                this.env.bind(binding.name, slot);
            }
            this.lower(body)
        })
    }
}
