//! The incremental session: one top-level unit at a time.
//!
//! A session owns everything that outlives a unit: the interner, the
//! operator table, the function registry and the JIT engine. Each unit is
//! generated into a fresh LLVM module, which is handed to the engine once
//! the unit is done, so unit N's operators and functions are visible to
//! unit N+1.

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::AnyValue;
use kal_backend::{BackendError, JitEngine, Optimizer, SharedOutput};
use kal_codegen::{CodeGen, FunctionRegistry};
use kal_diagnostic::emitter::DiagnosticEmitter;
use kal_diagnostic::ErrorCode;
use kal_ir::{ast, Prototype, SharedInterner, TokenKind};
use kal_parse::{synchronize, OperatorTable, ParseError, Parser, TokenCursor, ANON_EXPR_NAME};

use crate::config::SessionConfig;

/// Where the driver is in its unit loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitUnit,
    HaveDefinition,
    HaveExtern,
    HaveTopLevelExpr,
    ErrorRecovery,
}

/// What happened to one unit.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitOutcome {
    /// `def`: the function's name.
    Defined(String),
    /// `extern`: the declared name.
    Declared(String),
    /// Top-level expression, executed.
    Evaluated(f64),
    /// Top-level expression, generated but not executed.
    Generated,
    /// Reported through the emitter; the session moved on.
    Failed(ErrorCode),
}

pub struct Session<'ctx, E: DiagnosticEmitter> {
    context: &'ctx Context,
    config: SessionConfig,
    interner: SharedInterner,
    ops: OperatorTable,
    registry: FunctionRegistry,
    engine: JitEngine<'ctx>,
    /// Present when `config.optimize` is set.
    optimizer: Option<Optimizer>,
    modules_created: usize,
    emitter: E,
    output: SharedOutput,
    state: SessionState,
    error_count: usize,
}

impl<'ctx, E: DiagnosticEmitter> Session<'ctx, E> {
    /// Fails only when optimization is on and LLVM has no target machine
    /// for the host.
    pub fn new(
        context: &'ctx Context,
        config: SessionConfig,
        emitter: E,
        output: SharedOutput,
    ) -> Result<Self, BackendError> {
        let optimizer = if config.optimize {
            Some(Optimizer::native()?)
        } else {
            None
        };
        Ok(Session {
            context,
            config,
            interner: SharedInterner::new(),
            ops: OperatorTable::new(),
            registry: FunctionRegistry::new(),
            engine: JitEngine::new(context, output.clone()),
            optimizer,
            modules_created: 0,
            emitter,
            output,
            state: SessionState::AwaitUnit,
            error_count: 0,
        })
    }

    /// State reached by the most recent unit; `AwaitUnit` before any.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.ops
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &JitEngine<'ctx> {
        &self.engine
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    /// Diagnostics reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Process every unit in `source`, reporting failures and moving on.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn process_source(&mut self, source: &str) -> Vec<UnitOutcome> {
        self.emitter.set_source(source);
        let interner = self.interner.clone();
        let mut cursor = TokenCursor::new(source, &interner);
        let mut outcomes = Vec::new();
        self.state = SessionState::AwaitUnit;

        loop {
            let outcome = match cursor.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Op(';') => {
                    cursor.advance();
                    continue;
                }
                TokenKind::Def => {
                    self.state = SessionState::HaveDefinition;
                    self.handle_definition(&mut cursor)
                }
                TokenKind::Extern => {
                    self.state = SessionState::HaveExtern;
                    self.handle_extern(&mut cursor)
                }
                _ => {
                    self.state = SessionState::HaveTopLevelExpr;
                    self.handle_top_level_expression(&mut cursor)
                }
            };
            tracing::debug!(?outcome, "unit done");
            outcomes.push(outcome);
        }

        self.emitter.flush();
        outcomes
    }

    /// Whether `source` stops in the middle of a unit, so a line-at-a-time
    /// reader should wait for more input before processing it.
    ///
    /// Parses without generating code or reporting anything. Operators
    /// defined earlier in `source` are installed into a copy of the table
    /// so later units parse as they will for real.
    pub fn is_incomplete(&self, source: &str) -> bool {
        let interner = self.interner.clone();
        let mut ops = self.ops.clone();
        let mut cursor = TokenCursor::new(source, &interner);

        loop {
            let parsed = match cursor.current_kind() {
                TokenKind::Eof => return false,
                TokenKind::Op(';') => {
                    cursor.advance();
                    continue;
                }
                TokenKind::Def => {
                    let parsed = Parser::new(&mut cursor, &ops).parse_definition();
                    parsed.map(|func| {
                        if let Some((op, prec)) = func.proto.binary_operator() {
                            ops.install(op, prec);
                        }
                    })
                }
                TokenKind::Extern => Parser::new(&mut cursor, &ops).parse_extern().map(drop),
                _ => Parser::new(&mut cursor, &ops)
                    .parse_top_level_expr()
                    .map(drop),
            };
            if parsed.is_err() {
                return matches!(cursor.current_kind(), TokenKind::Eof);
            }
        }
    }

    fn handle_definition(&mut self, cursor: &mut TokenCursor<'_>) -> UnitOutcome {
        let func = match Parser::new(cursor, &self.ops).parse_definition() {
            Ok(func) => func,
            Err(err) => return self.recover(cursor, &err),
        };
        let module = self.new_module();
        let result = self.codegen(&module).compile_function(&func).map(drop);
        let outcome = match result {
            Ok(()) => {
                self.print_ir("Read function definition:", &module, &func.proto);
                UnitOutcome::Defined(self.interner.lookup(func.proto.name).to_string())
            }
            Err(err) => self.report(&err.to_diagnostic(func.proto.span)),
        };
        self.finish_module(module);
        outcome
    }

    fn handle_extern(&mut self, cursor: &mut TokenCursor<'_>) -> UnitOutcome {
        let proto = match Parser::new(cursor, &self.ops).parse_extern() {
            Ok(proto) => proto,
            Err(err) => return self.recover(cursor, &err),
        };
        let module = self.new_module();
        self.codegen(&module).compile_extern(&proto);
        self.print_ir("Read extern:", &module, &proto);
        self.finish_module(module);
        UnitOutcome::Declared(self.interner.lookup(proto.name).to_string())
    }

    fn handle_top_level_expression(&mut self, cursor: &mut TokenCursor<'_>) -> UnitOutcome {
        let func = match Parser::new(cursor, &self.ops).parse_top_level_expr() {
            Ok(func) => func,
            Err(err) => return self.recover(cursor, &err),
        };
        let module = self.new_module();
        let result = self.codegen(&module).compile_function(&func).map(drop);
        if let Err(err) = result {
            return self.report(&err.to_diagnostic(func.body.span));
        }
        self.print_ir("Read top-level expression:", &module, &func.proto);

        if !self.config.execute {
            return UnitOutcome::Generated;
        }
        self.evaluate(module, &func)
    }

    /// Run the anonymous function in `module`, then drop the module again.
    fn evaluate(&mut self, module: Module<'ctx>, func: &ast::Function) -> UnitOutcome {
        let handle = self.engine.add_module(module);
        let result = self.engine.run(ANON_EXPR_NAME);
        self.engine.remove_module(handle);
        match result {
            Ok(value) => {
                self.output.println(&format!("Evaluated to {value:.6}"));
                UnitOutcome::Evaluated(value)
            }
            Err(err) => self.report(&err.to_diagnostic(func.body.span)),
        }
    }

    /// Report a parse failure and skip to the next unit.
    fn recover(&mut self, cursor: &mut TokenCursor<'_>, err: &ParseError) -> UnitOutcome {
        self.state = SessionState::ErrorRecovery;
        let outcome = self.report(&err.to_diagnostic());
        let skipped = synchronize(cursor);
        tracing::debug!(skipped, "recovered from parse error");
        outcome
    }

    fn report(&mut self, diagnostic: &kal_diagnostic::Diagnostic) -> UnitOutcome {
        self.error_count += 1;
        self.emitter.emit(diagnostic);
        UnitOutcome::Failed(diagnostic.code)
    }

    fn codegen<'s>(&'s mut self, module: &'s Module<'ctx>) -> CodeGen<'s, 'ctx> {
        CodeGen::new(
            self.context,
            module,
            &self.interner,
            &mut self.registry,
            &mut self.ops,
            self.optimizer.as_ref(),
        )
    }

    /// A fresh module for the next unit.
    fn new_module(&mut self) -> Module<'ctx> {
        self.modules_created += 1;
        self.context
            .create_module(&format!("unit{}", self.modules_created))
    }

    /// Hand a finished unit's module to the engine.
    fn finish_module(&mut self, module: Module<'ctx>) {
        if module.get_first_function().is_some() {
            self.engine.add_module(module);
        }
    }

    fn print_ir(&self, heading: &str, module: &Module<'ctx>, proto: &Prototype) {
        if !self.config.print_ir {
            return;
        }
        self.output.println(heading);
        if let Some(func) = module.get_function(self.interner.lookup(proto.name)) {
            self.output.print(&func.print_to_string().to_string());
        }
    }
}
