//! Top-level code generation: prototypes and definitions.
//!
//! A definition is built in a scratch module of its own, verified and
//! optimized there, and only then linked into the unit's module. A failed
//! definition is dropped with its scratch module, so the unit's module never
//! holds a half-built body.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::FunctionValue;
use kal_backend::Optimizer;
use kal_ir::{ast, Prototype, StringInterner};
use kal_parse::OperatorTable;

use crate::error::CodegenError;
use crate::expr_lowerer::ExprLowerer;
use crate::registry::{declare_function, FunctionRegistry};

/// Generates top-level units into one LLVM module.
///
/// Borrows the session's long-lived state: the registry and operator table
/// outlive the module, which the session replaces after every unit.
pub struct CodeGen<'s, 'ctx> {
    context: &'ctx Context,
    builder: Builder<'ctx>,
    module: &'s Module<'ctx>,
    interner: &'s StringInterner,
    registry: &'s mut FunctionRegistry,
    ops: &'s mut OperatorTable,
    /// `None` leaves generated code as lowered.
    optimizer: Option<&'s Optimizer>,
}

impl<'s, 'ctx> CodeGen<'s, 'ctx> {
    pub fn new(
        context: &'ctx Context,
        module: &'s Module<'ctx>,
        interner: &'s StringInterner,
        registry: &'s mut FunctionRegistry,
        ops: &'s mut OperatorTable,
        optimizer: Option<&'s Optimizer>,
    ) -> Self {
        CodeGen {
            context,
            builder: context.create_builder(),
            module,
            interner,
            registry,
            ops,
            optimizer,
        }
    }

    /// Declare `proto` in the module. Idempotent.
    pub fn declare_prototype(&self, proto: &Prototype) -> FunctionValue<'ctx> {
        declare_function(self.context, self.module, self.interner, proto)
    }

    /// `extern name(params)`: remember the signature for later units and
    /// declare it here.
    pub fn compile_extern(&mut self, proto: &Prototype) -> FunctionValue<'ctx> {
        tracing::debug!(name = self.interner.lookup(proto.name), "extern");
        self.registry.insert(proto.clone());
        self.declare_prototype(proto)
    }

    /// Generate a definition.
    ///
    /// On failure the module, the registry and the operator table are left
    /// as they were before the call.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(name = self.interner.lookup(func.proto.name))
    )]
    pub fn compile_function(
        &mut self,
        func: &ast::Function,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        let proto = &func.proto;
        let name = self.interner.lookup(proto.name);
        if self
            .module
            .get_function(name)
            .is_some_and(|f| f.count_basic_blocks() > 0)
        {
            return Err(CodegenError::Redefinition {
                name: name.to_string(),
                span: proto.span,
            });
        }

        let previous_proto = self.registry.insert(proto.clone());
        // Install before the body: the body may use the operator it defines.
        let previous_prec = proto
            .binary_operator()
            .map(|(op, prec)| (op, self.ops.install(op, prec)));

        let result = self
            .build_definition(func)
            .and_then(|scratch| self.link(scratch, func));
        self.builder.clear_insertion_position();

        match result {
            Ok(function) => {
                tracing::debug!(blocks = function.count_basic_blocks(), "generated");
                Ok(function)
            }
            Err(err) => {
                tracing::debug!(%err, "rolling back definition");
                if let Some((op, previous)) = previous_prec {
                    self.ops.restore(op, previous);
                }
                self.registry.restore(proto.name, previous_proto);
                Err(err)
            }
        }
    }

    /// Lower, verify and optimize `func` in a module of its own.
    fn build_definition(&self, func: &ast::Function) -> Result<Module<'ctx>, CodegenError> {
        let proto = &func.proto;
        let name = self.interner.lookup(proto.name);
        let scratch = self.context.create_module(name);
        let function = declare_function(self.context, &scratch, self.interner, proto);
        self.builder
            .position_at_end(self.context.append_basic_block(function, "entry"));

        {
            let mut lowerer = ExprLowerer::new(
                self.context,
                &self.builder,
                &scratch,
                function,
                &*self.registry,
                self.interner,
            );
            lowerer.bind_params(&proto.params)?;
            let value = lowerer.lower(&func.body)?;
            self.builder.build_return(Some(&value))?;
        }

        scratch
            .verify()
            .map_err(|message| CodegenError::Verification {
                name: name.to_string(),
                message: message.to_string(),
                span: proto.span,
            })?;

        if let Some(optimizer) = self.optimizer {
            optimizer
                .run(&scratch)
                .map_err(|err| CodegenError::Backend {
                    name: name.to_string(),
                    message: err.to_string(),
                    span: proto.span,
                })?;
            tracing::trace!(pipeline = optimizer.pipeline(), "optimized");
        }
        Ok(scratch)
    }

    /// Move the finished definition into the unit's module.
    fn link(
        &self,
        scratch: Module<'ctx>,
        func: &ast::Function,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        let name = self.interner.lookup(func.proto.name);
        let backend = |message: String| CodegenError::Backend {
            name: name.to_string(),
            message,
            span: func.proto.span,
        };
        self.module
            .link_in_module(scratch)
            .map_err(|err| backend(err.to_string()))?;
        self.module
            .get_function(name)
            .ok_or_else(|| backend("definition missing after link".to_owned()))
    }
}
