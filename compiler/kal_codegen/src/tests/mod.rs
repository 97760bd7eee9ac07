#![allow(clippy::unwrap_used, clippy::expect_used)]

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::AnyValue;
use kal_backend::{buffer_handler, JitEngine, Optimizer};
use kal_diagnostic::ErrorCode;
use kal_ir::{ast, Precedence, SharedInterner, Span, TopLevel};
use kal_parse::{OperatorTable, Parser, TokenCursor, ANON_EXPR_NAME};
use pretty_assertions::assert_eq;

use crate::{CodeGen, CodegenError, FunctionRegistry};

/// Session-shaped driver: one fresh module per unit, all added to the
/// engine.
struct Harness<'ctx> {
    context: &'ctx Context,
    interner: SharedInterner,
    registry: FunctionRegistry,
    ops: OperatorTable,
    engine: JitEngine<'ctx>,
    optimizer: Option<Optimizer>,
    units: usize,
}

impl<'ctx> Harness<'ctx> {
    fn new(context: &'ctx Context) -> Self {
        Self::with_optimizer(context, true)
    }

    fn with_optimizer(context: &'ctx Context, optimize: bool) -> Self {
        let optimizer = optimize.then(|| Optimizer::native().expect("native target"));
        Harness {
            context,
            interner: SharedInterner::new(),
            registry: FunctionRegistry::new(),
            ops: OperatorTable::new(),
            engine: JitEngine::new(context, buffer_handler()),
            optimizer,
            units: 0,
        }
    }

    fn parse(&self, source: &str) -> TopLevel {
        let mut cursor = TokenCursor::new(source, &self.interner);
        match Parser::new(&mut cursor, &self.ops).parse_top_level() {
            Ok(Some(unit)) => unit,
            other => panic!("expected a unit from {source:?}, got {other:?}"),
        }
    }

    /// Generate one unit into a fresh module without running anything.
    fn compile(&mut self, source: &str) -> Result<Module<'ctx>, CodegenError> {
        let unit = self.parse(source);
        self.units += 1;
        let module = self.context.create_module(&format!("unit{}", self.units));
        {
            let mut codegen = CodeGen::new(
                self.context,
                &module,
                &self.interner,
                &mut self.registry,
                &mut self.ops,
                self.optimizer.as_ref(),
            );
            match &unit {
                TopLevel::Definition(func) | TopLevel::Expression(func) => {
                    codegen.compile_function(func)?;
                }
                TopLevel::Extern(proto) => {
                    codegen.compile_extern(proto);
                }
            }
        }
        Ok(module)
    }

    /// `def` or `extern`: generate and keep the module live.
    fn define(&mut self, source: &str) -> Result<(), CodegenError> {
        let module = self.compile(source)?;
        self.engine.add_module(module);
        Ok(())
    }

    /// Top-level expression: generate, run, remove.
    fn eval(&mut self, source: &str) -> Result<f64, String> {
        let module = self.compile(source).map_err(|e| e.to_string())?;
        let handle = self.engine.add_module(module);
        let result = self.engine.run(ANON_EXPR_NAME);
        self.engine.remove_module(handle);
        result.map_err(|e| e.to_string())
    }

    fn codegen_error(&mut self, source: &str) -> CodegenError {
        match self.compile(source) {
            Err(err) => err,
            Ok(module) => panic!(
                "expected a codegen error, generated {}",
                module.print_to_string().to_string()
            ),
        }
    }
}

/// Text of `name` in `module`, as LLVM prints it.
fn function_ir(module: &Module<'_>, name: &str) -> String {
    module
        .get_function(name)
        .map(|f| f.print_to_string().to_string())
        .unwrap_or_default()
}

// === Expressions ===

#[test]
fn arithmetic_respects_precedence() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.eval("4 + 5 * 3"), Ok(19.0));
    assert_eq!(h.eval("4 * 5 - 3"), Ok(17.0));
    assert_eq!(h.eval("1 < 2"), Ok(1.0));
    assert_eq!(h.eval("2 < 1"), Ok(0.0));
}

#[test]
fn definitions_are_callable_from_later_units() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def add(a b) a + b"), Ok(()));
    assert_eq!(h.eval("add(2, 3)"), Ok(5.0));
    assert_eq!(h.eval("add(add(1, 2), 3) * 2"), Ok(12.0));
}

#[test]
fn recursion_through_if() {
    for optimize in [true, false] {
        let context = Context::create();
        let mut h = Harness::with_optimizer(&context, optimize);
        assert_eq!(
            h.define("def fib(n) if n < 3 then 1 else fib(n-1) + fib(n-2)"),
            Ok(())
        );
        assert_eq!(h.eval("fib(10)"), Ok(55.0));
    }
}

#[test]
fn extern_without_body_fails_at_run_time() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("extern foo(a)"), Ok(()));
    assert_eq!(h.define("def bar(b) foo(b) + 1"), Ok(()));
    assert_eq!(h.eval("bar(3)"), Err("unresolved symbol foo".to_string()));
}

#[test]
fn extern_host_function() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("extern putchard(c)"), Ok(()));
    assert_eq!(h.eval("putchard(72) + putchard(105)"), Ok(0.0));
    assert_eq!(h.engine.output().get_output(), "Hi");
}

// === User-defined operators ===

#[test]
fn binary_operator_lowers_to_call() {
    let context = Context::create();
    let mut h = Harness::with_optimizer(&context, false);
    assert_eq!(h.define("def binary> 10 (a b) b < a"), Ok(()));
    assert_eq!(h.ops.precedence('>'), Precedence::new(10));

    let module = h.compile("1 > 2").unwrap();
    let ir = function_ir(&module, ANON_EXPR_NAME);
    assert!(ir.contains("call double @\"binary>\"(double"), "{ir}");

    assert_eq!(h.eval("1 > 2"), Ok(0.0));
    assert_eq!(h.eval("3 > 2"), Ok(1.0));
}

#[test]
fn unary_operator() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(
        h.codegen_error("!1").code(),
        ErrorCode::E2003,
        "no unary! defined yet"
    );
    assert_eq!(h.define("def unary!(v) if v then 0 else 1"), Ok(()));
    assert_eq!(h.eval("!0"), Ok(1.0));
    assert_eq!(h.eval("!!3"), Ok(1.0));
}

#[test]
fn user_operator_can_sequence() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def binary : 1 (x y) y"), Ok(()));
    assert_eq!(h.eval("1 : 2 : 3"), Ok(3.0));
}

#[test]
fn failed_operator_definition_rolls_back() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let err = h.codegen_error("def binary| 5 (a b) a + nope");
    assert_eq!(err.code(), ErrorCode::E2001);
    assert_eq!(h.ops.precedence('|'), None);
    assert!(!h.registry.contains(h.interner.intern("binary|")));
}

#[test]
fn missing_operator_function_is_internal_error() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    if let Some(p) = Precedence::new(40) {
        h.ops.install('%', p);
    }
    let err = h.codegen_error("7 % 2");
    assert_eq!(err.code(), ErrorCode::E9001);
    let diag = err.to_diagnostic(Span::DUMMY);
    assert!(diag.notes.iter().any(|n| n.contains("bug")));
}

// === Control flow and variables ===

#[test]
fn for_loop_tests_before_each_iteration() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.eval("for i = 1, i < 3, 1 in i"), Ok(0.0));

    assert_eq!(h.define("def binary : 1 (x y) y"), Ok(()));
    assert_eq!(
        h.define("def count() var n = 0 in (for i = 1, i < 3 in n = n + 1) : n"),
        Ok(())
    );
    assert_eq!(h.eval("count()"), Ok(2.0));
}

#[test]
fn loop_body_assignment_is_seen_by_next_test() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def binary : 1 (x y) y"), Ok(()));
    assert_eq!(
        h.define("def f() var c = 0 in (for i = 0, i < 10 in (i = i + 4) : (c = c + 1)) : c"),
        Ok(())
    );
    assert_eq!(h.eval("f()"), Ok(2.0));
}

#[test]
fn loop_variable_is_unbound_after_loop() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let err = h.codegen_error("(for i = 0, i < 1 in 0) + i");
    assert_eq!(
        err,
        CodegenError::UnknownVariable {
            name: "i".to_string(),
            span: err.span().unwrap_or(Span::DUMMY),
        }
    );
}

#[test]
fn var_shadowing_restores_outer_binding() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.eval("var x = 1 in (var x = x + 1 in x)"), Ok(2.0));
    assert_eq!(h.eval("var x = 1 in ((var x = x + 1 in x) + x)"), Ok(3.0));
    assert_eq!(h.codegen_error("(var x = 1 in x) + x").code(), ErrorCode::E2001);
}

#[test]
fn var_defaults_to_zero_and_sees_earlier_bindings() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.eval("var a, b = 2 in a + b"), Ok(2.0));
    assert_eq!(h.eval("var a = 3, b = a * 2 in b"), Ok(6.0));
}

#[test]
fn parameters_are_assignable() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def binary : 1 (x y) y"), Ok(()));
    assert_eq!(h.define("def bump(x) (x = x + 1) : x * 10"), Ok(()));
    assert_eq!(h.eval("bump(4)"), Ok(50.0));
}

// === Errors ===

#[test]
fn unknown_function() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let err = h.codegen_error("nope(1)");
    assert_eq!(err.code(), ErrorCode::E2002);
    assert_eq!(err.to_string(), "unknown function referenced: `nope`");
}

#[test]
fn argument_count_mismatch() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def two(a b) a"), Ok(()));
    let err = h.codegen_error("two(1)");
    assert_eq!(err.code(), ErrorCode::E2004);
    assert!(matches!(
        err,
        CodegenError::ArgumentCount {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn assignment_target_must_be_variable() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let err = h.codegen_error("1 = 2");
    assert_eq!(err.code(), ErrorCode::E2005);
    assert_eq!(err.to_string(), "destination of '=' must be a variable");
}

#[test]
fn failed_definition_is_removed_and_unregistered() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let err = h.codegen_error("def broken(x) x + y");
    assert_eq!(err.code(), ErrorCode::E2001);
    assert!(!h.registry.contains(h.interner.intern("broken")));
}

#[test]
fn body_cannot_be_added_twice_to_one_module() {
    let context = Context::create();
    let h = Harness::new(&context);
    let interner = h.interner.clone();
    let mut registry = FunctionRegistry::new();
    let mut ops = OperatorTable::new();
    let module = context.create_module("m");

    let (TopLevel::Definition(first), TopLevel::Definition(second)) =
        (h.parse("def f(x) x"), h.parse("def f(x y) y"))
    else {
        panic!("expected two definitions");
    };

    {
        let mut codegen = CodeGen::new(
            &context,
            &module,
            &interner,
            &mut registry,
            &mut ops,
            h.optimizer.as_ref(),
        );
        assert!(codegen.compile_function(&first).is_ok());
        let err = codegen.compile_function(&second).map(|_| ());
        assert!(matches!(err, Err(CodegenError::Redefinition { .. })));
    }

    // The first definition and its signature survive.
    let f = interner.intern("f");
    assert_eq!(registry.get(f).map(ast::Prototype::arity), Some(1));
    let defined = module.get_function("f");
    assert_eq!(defined.map(|f| f.count_params()), Some(1));
    assert!(defined.is_some_and(|f| f.count_basic_blocks() > 0));
}

#[test]
fn callee_is_declared_once_per_module() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("extern foo(a)"), Ok(()));
    let module = h.compile("def twice(x) foo(x) + foo(x)").unwrap();
    let declarations = module
        .get_functions()
        .filter(|f| f.count_basic_blocks() == 0)
        .count();
    assert_eq!((module.get_functions().count(), declarations), (2, 1));
}

#[test]
fn newer_definition_shadows_older() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    assert_eq!(h.define("def f() 1"), Ok(()));
    assert_eq!(h.eval("f()"), Ok(1.0));
    assert_eq!(h.define("def f() 2"), Ok(()));
    assert_eq!(h.eval("f()"), Ok(2.0));
}

#[test]
fn deeply_nested_expression_lowers() {
    let context = Context::create();
    let mut h = Harness::new(&context);
    let depth = 2000;
    let source = format!("{}0{}", "(1+".repeat(depth), ")".repeat(depth));
    assert_eq!(h.eval(&source), Ok(2000.0));
}

#[test]
fn failed_definition_leaves_module_untouched() {
    let context = Context::create();
    let h = Harness::new(&context);
    let mut registry = FunctionRegistry::new();
    let mut ops = OperatorTable::new();
    let module = context.create_module("m");
    let TopLevel::Definition(broken) = h.parse("def broken(x) helper(x) + y") else {
        panic!("expected a definition");
    };

    let mut codegen = CodeGen::new(
        &context,
        &module,
        &h.interner,
        &mut registry,
        &mut ops,
        None,
    );
    let err = codegen.compile_function(&broken).map(|_| ());
    assert!(matches!(err, Err(CodegenError::UnknownFunction { .. })));
    drop(codegen);

    assert_eq!(module.get_functions().count(), 0);
    assert!(module.verify().is_ok());
}

// === Generated code ===

#[test]
fn slots_are_promoted_when_optimizing() {
    let context = Context::create();
    let mut optimized = Harness::with_optimizer(&context, true);
    let module = optimized.compile("def id(y) y").unwrap();
    let ir = function_ir(&module, "id");
    assert!(ir.contains("define double @id(double %y)"), "{ir}");
    assert!(ir.contains("ret double %y"), "{ir}");
    assert!(!ir.contains("alloca"), "{ir}");

    let mut plain = Harness::with_optimizer(&context, false);
    let module = plain.compile("def id(y) y").unwrap();
    let ir = function_ir(&module, "id");
    assert!(ir.contains("alloca double"), "{ir}");
}

#[test]
fn every_slot_lives_in_the_entry_block() {
    let context = Context::create();
    let mut h = Harness::with_optimizer(&context, false);
    let module = h
        .compile("def f(a) if a then (var b = 1 in b) else (for i = 0, i < 2 in i)")
        .unwrap();
    let function = module.get_function("f").unwrap();
    let entry = function.get_first_basic_block().unwrap();
    let mut entry_allocas = 0;
    let mut other_allocas = 0;
    for block in function.get_basic_blocks() {
        let mut instr = block.get_first_instruction();
        while let Some(i) = instr {
            if i.get_opcode() == inkwell::values::InstructionOpcode::Alloca {
                if block == entry {
                    entry_allocas += 1;
                } else {
                    other_allocas += 1;
                }
            }
            instr = i.get_next_instruction();
        }
    }
    assert_eq!((entry_allocas, other_allocas), (3, 0));
    assert!(module.verify().is_ok());
}

#[test]
fn comparison_yields_zero_or_one() {
    let context = Context::create();
    let mut h = Harness::with_optimizer(&context, false);
    let module = h.compile("def lt(a b) a < b").unwrap();
    let ir = function_ir(&module, "lt");
    assert!(ir.contains("fcmp ult double"), "{ir}");
    assert!(ir.contains("uitofp i1"), "{ir}");
}
