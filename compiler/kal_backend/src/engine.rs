//! JIT execution of generated modules.
//!
//! Modules are added whole and stay live until removed. Running a function
//! links a fresh copy of every module it can reach into one LLVM module and
//! hands that to MCJIT. For each callee the newest module with a body wins,
//! then the host functions. A declaration never satisfies a call, so a
//! module that only declares `foo` still sees an older module's body for it.
//!
//! Every reachable symbol is resolved before LLVM sees the module: MCJIT
//! aborts the process on a symbol it cannot find.

use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::values::FunctionValue;
use inkwell::OptimizationLevel;
use kal_diagnostic::{Diagnostic, ErrorCode};
use kal_ir::Span;
use rustc_hash::FxHashSet;

use crate::host::{with_output, HostFunction, HOST_FUNCTIONS};
use crate::output::SharedOutput;

/// Identifies a module added to a [`JitEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleHandle(u32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("unresolved symbol {name}")]
    UnresolvedSymbol { name: String },

    #[error("`{name}` takes {expected} argument(s) but is declared with {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("JIT compilation failed: {message}")]
    Jit { message: String },
}

impl ExecError {
    fn jit(message: impl std::fmt::Display) -> Self {
        ExecError::Jit {
            message: message.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ExecError::UnresolvedSymbol { .. } => ErrorCode::E3001,
            ExecError::Jit { .. } => ErrorCode::E3002,
            ExecError::ArityMismatch { .. } => ErrorCode::E3003,
        }
    }

    /// Diagnostic pointing at the expression whose evaluation failed.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(span, "while evaluating this expression")
    }
}

type EntryFn = unsafe extern "C" fn() -> f64;

pub struct JitEngine<'ctx> {
    context: &'ctx Context,
    output: SharedOutput,
    /// Oldest first.
    modules: Vec<(ModuleHandle, Module<'ctx>)>,
    next_handle: u32,
}

impl<'ctx> JitEngine<'ctx> {
    pub fn new(context: &'ctx Context, output: SharedOutput) -> Self {
        JitEngine {
            context,
            output,
            modules: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    pub fn add_module(&mut self, module: Module<'ctx>) -> ModuleHandle {
        let handle = ModuleHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(
            handle = handle.0,
            module = %module.get_name().to_string_lossy(),
            functions = module.get_functions().count(),
            "add module"
        );
        self.modules.push((handle, module));
        handle
    }

    /// Remove a module, returning it if it was still live.
    pub fn remove_module(&mut self, handle: ModuleHandle) -> Option<Module<'ctx>> {
        let pos = self.modules.iter().position(|(h, _)| *h == handle)?;
        tracing::debug!(handle = handle.0, "remove module");
        Some(self.modules.remove(pos).1)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// The body that a call to `name` would run, newest module first.
    pub fn find_function(&self, name: &str) -> Option<FunctionValue<'ctx>> {
        self.defining_module(name)
            .and_then(|module| module.get_function(name))
    }

    fn defining_module(&self, name: &str) -> Option<&Module<'ctx>> {
        self.modules
            .iter()
            .rev()
            .map(|(_, module)| module)
            .find(|module| {
                module
                    .get_function(name)
                    .is_some_and(|f| f.count_basic_blocks() > 0)
            })
    }

    /// The modules a run of `entry` needs, each at most once.
    ///
    /// `entry` itself must take no arguments. Every declaration reached on
    /// the way must match the parameter count of whatever satisfies it.
    fn link_plan(&self, entry: &str) -> Result<Vec<&Module<'ctx>>, ExecError> {
        let mut plan: Vec<&Module<'ctx>> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut pending = vec![(entry.to_owned(), 0usize)];

        while let Some((name, declared)) = pending.pop() {
            let Some(module) = self.defining_module(&name) else {
                let host = HostFunction::lookup(&name)
                    .ok_or_else(|| ExecError::UnresolvedSymbol { name: name.clone() })?;
                check_arity(&name, host.arity, declared)?;
                continue;
            };
            let params = module
                .get_function(&name)
                .map_or(0, |f| f.count_params() as usize);
            check_arity(&name, params, declared)?;

            if !seen.insert(name) || plan.iter().any(|m| std::ptr::eq(*m, module)) {
                continue;
            }
            plan.push(module);
            for decl in module.get_functions().filter(|f| f.count_basic_blocks() == 0) {
                let callee = decl.get_name().to_string_lossy().into_owned();
                pending.push((callee, decl.count_params() as usize));
            }
        }
        Ok(plan)
    }

    /// Run a zero-argument function.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run(&self, name: &str) -> Result<f64, ExecError> {
        let result = self.link_and_run(name);
        if let Err(err) = &result {
            tracing::debug!(%err, "execution failed");
        }
        result
    }

    fn link_and_run(&self, name: &str) -> Result<f64, ExecError> {
        let plan = self.link_plan(name)?;
        let linked = self.context.create_module("jit");
        for module in &plan {
            linked
                .link_in_module((*module).clone())
                .map_err(ExecError::jit)?;
        }

        let engine = linked
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(ExecError::jit)?;
        for host in HOST_FUNCTIONS {
            if let Some(func) = linked.get_function(host.name) {
                if func.count_basic_blocks() == 0 {
                    engine.add_global_mapping(&func, host.address());
                }
            }
        }
        tracing::debug!(modules = plan.len(), "jit ready");

        with_output(&self.output, || call_entry(&engine, name))
    }
}

#[expect(unsafe_code, reason = "calling JIT-compiled code")]
fn call_entry(engine: &ExecutionEngine<'_>, name: &str) -> Result<f64, ExecError> {
    // SAFETY: generated functions take and return `double`, and
    // `link_plan` checked that `name` takes no parameters.
    unsafe {
        let entry = engine
            .get_function::<EntryFn>(name)
            .map_err(ExecError::jit)?;
        Ok(entry.call())
    }
}

fn check_arity(name: &str, expected: usize, declared: usize) -> Result<(), ExecError> {
    if expected == declared {
        Ok(())
    } else {
        Err(ExecError::ArityMismatch {
            name: name.to_owned(),
            expected,
            found: declared,
        })
    }
}
