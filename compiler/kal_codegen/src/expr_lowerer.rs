//! Expression lowering coordinator.
//!
//! `ExprLowerer` holds the LLVM builder positioned inside the function under
//! construction plus its variable environment, and dispatches each
//! `ExprKind` to a focused `lower_*` method implemented in separate files.
//!
//! ```text
//! ExprLowerer
//!   ├── lower_operators.rs    Unary, Binary, assignment
//!   ├── lower_control_flow.rs If, For, Var
//!   └── lower_calls.rs        Call, operator-function calls
//! ```

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, PointerValue,
};
use kal_ir::{Expr, ExprKind, Name, Span, StringInterner};
use kal_stack::ensure_sufficient_stack;

use crate::env::SymbolEnv;
use crate::error::CodegenError;
use crate::registry::FunctionRegistry;

pub(crate) struct ExprLowerer<'a, 'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) builder: &'a Builder<'ctx>,
    /// Module the function is generated into; callees are declared here.
    pub(crate) module: &'a Module<'ctx>,
    pub(crate) function: FunctionValue<'ctx>,
    pub(crate) env: SymbolEnv<PointerValue<'ctx>>,
    pub(crate) registry: &'a FunctionRegistry,
    pub(crate) interner: &'a StringInterner,
}

impl<'a, 'ctx> ExprLowerer<'a, 'ctx> {
    pub(crate) fn new(
        context: &'ctx Context,
        builder: &'a Builder<'ctx>,
        module: &'a Module<'ctx>,
        function: FunctionValue<'ctx>,
        registry: &'a FunctionRegistry,
        interner: &'a StringInterner,
    ) -> Self {
        ExprLowerer {
            context,
            builder,
            module,
            function,
            env: SymbolEnv::new(),
            registry,
            interner,
        }
    }

    pub(crate) fn resolve_name(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    /// Give every parameter a slot holding its incoming value.
    pub(crate) fn bind_params(&mut self, params: &[Name]) -> Result<(), CodegenError> {
        for (param, &name) in self.function.get_param_iter().zip(params) {
            let label = self.resolve_name(name);
            param.set_name(label);
            let slot = self.entry_alloca(name)?;
            self.builder.build_store(slot, param.into_float_value())?;
            self.env.bind(name, slot);
        }
        Ok(())
    }

    /// Run `f` in a nested variable scope, undoing its bindings on every
    /// exit path.
    pub(crate) fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CodegenError>,
    ) -> Result<T, CodegenError> {
        let mark = self.env.mark();
        let result = f(self);
        self.env.restore_to(mark);
        result
    }

    /// `name` as callable from this module, declaring it on first reference.
    pub(crate) fn callee(&self, name: Name) -> Option<FunctionValue<'ctx>> {
        self.registry
            .get_function(self.context, self.module, self.interner, name)
    }

    // ── Builder helpers ─────────────────────────────────────────────

    pub(crate) fn const_f64(&self, value: f64) -> FloatValue<'ctx> {
        self.context.f64_type().const_float(value)
    }

    /// A slot for `name` at the top of the entry block, where `mem2reg`
    /// looks for it.
    pub(crate) fn entry_alloca(&self, name: Name) -> Result<PointerValue<'ctx>, CodegenError> {
        let entry = self
            .function
            .get_first_basic_block()
            .ok_or_else(|| CodegenError::builder("function has no entry block"))?;
        let tmp = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        Ok(tmp.build_alloca(self.context.f64_type(), self.resolve_name(name))?)
    }

    pub(crate) fn load(
        &self,
        slot: PointerValue<'ctx>,
        name: &str,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        Ok(self
            .builder
            .build_load(self.context.f64_type(), slot, name)?
            .into_float_value())
    }

    pub(crate) fn append_block(&self, name: &str) -> BasicBlock<'ctx> {
        self.context.append_basic_block(self.function, name)
    }

    pub(crate) fn current_block(&self) -> Result<BasicBlock<'ctx>, CodegenError> {
        self.builder
            .get_insert_block()
            .ok_or_else(|| CodegenError::builder("builder is not positioned"))
    }

    pub(crate) fn call(
        &self,
        callee: FunctionValue<'ctx>,
        args: &[FloatValue<'ctx>],
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let args: Vec<BasicMetadataValueEnum<'ctx>> = args.iter().map(|&a| a.into()).collect();
        self.builder
            .build_call(callee, &args, "calltmp")?
            .try_as_basic_value()
            .basic()
            .map(BasicValueEnum::into_float_value)
            .ok_or_else(|| CodegenError::builder("call produced no value"))
    }

    // ── Main dispatch ───────────────────────────────────────────────

    /// Lower `expr` into the current block, returning its value.
    pub(crate) fn lower(&mut self, expr: &Expr) -> Result<FloatValue<'ctx>, CodegenError> {
        ensure_sufficient_stack(|| self.lower_inner(expr))
    }

    fn lower_inner(&mut self, expr: &Expr) -> Result<FloatValue<'ctx>, CodegenError> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Number(value) => Ok(self.const_f64(*value)),
            ExprKind::Variable(name) => self.lower_variable(*name, span),
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand, span),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs, span),
            ExprKind::Call { callee, args } => self.lower_call(*callee, args, span),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch),
            ExprKind::For {
                var,
                start,
                end,
                step,
                body,
            } => self.lower_for(*var, start, end, step.as_deref(), body),
            ExprKind::Var { bindings, body } => self.lower_var(bindings, body),
        }
    }

    fn lower_variable(&mut self, name: Name, span: Span) -> Result<FloatValue<'ctx>, CodegenError> {
        let Some(slot) = self.env.lookup(name) else {
            return Err(CodegenError::UnknownVariable {
                name: self.resolve_name(name).to_string(),
                span,
            });
        };
        self.load(slot, self.resolve_name(name))
    }
}
