use kal_diagnostic::ErrorCode;
use kal_ir::{Expr, Precedence, ProtoKind, StringInterner, TokenKind, TopLevel};
use pretty_assertions::assert_eq;

use crate::{parse_expression, ErrorContext, OperatorTable, ParseError, Parser, TokenCursor};

fn sexp(source: &str) -> String {
    sexp_with(source, &OperatorTable::new())
}

fn sexp_with(source: &str, ops: &OperatorTable) -> String {
    let interner = StringInterner::new();
    match parse_expression(source, &interner, ops) {
        Ok(expr) => expr.to_sexp(&interner),
        Err(e) => format!("error: {}", e.message),
    }
}

fn parse_err(source: &str) -> ParseError {
    let interner = StringInterner::new();
    let ops = OperatorTable::new();
    let mut cursor = TokenCursor::new(source, &interner);
    match Parser::new(&mut cursor, &ops).parse_top_level() {
        Err(e) => e,
        Ok(unit) => panic!("expected an error, parsed {unit:?}"),
    }
}

fn parse_unit(source: &str, interner: &StringInterner) -> TopLevel {
    let ops = OperatorTable::new();
    let mut cursor = TokenCursor::new(source, interner);
    match Parser::new(&mut cursor, &ops).parse_top_level() {
        Ok(Some(unit)) => unit,
        other => panic!("expected a unit, got {other:?}"),
    }
}

// === Precedence climbing ===

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(sexp("a + b * c"), "(+ a (* b c))");
    assert_eq!(sexp("a * b + c"), "(+ (* a b) c)");
    assert_eq!(sexp("4 + 5 * 3"), "(+ 4 (* 5 3))");
}

#[test]
fn equal_precedence_is_left_associative() {
    assert_eq!(sexp("a - b - c"), "(- (- a b) c)");
    assert_eq!(sexp("a + b - c + d"), "(+ (- (+ a b) c) d)");
}

#[test]
fn assignment_binds_loosest() {
    assert_eq!(sexp("x = y + 1 < 3"), "(= x (< (+ y 1) 3))");
}

#[test]
fn mixed_levels() {
    assert_eq!(sexp("a < b + c * d - e"), "(< a (- (+ b (* c d)) e))");
    assert_eq!(sexp("a * b < c * d"), "(< (* a b) (* c d))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(sexp("(a + b) * c"), "(* (+ a b) c)");
}

#[test]
fn user_operator_precedence_is_respected() {
    let mut ops = OperatorTable::new();
    let (Some(low), Some(high)) = (Precedence::new(5), Precedence::new(50)) else {
        return;
    };
    ops.install('|', low);
    ops.install('^', high);
    assert_eq!(sexp_with("a | b + c", &ops), "(| a (+ b c))");
    assert_eq!(sexp_with("a + b ^ c", &ops), "(+ a (^ b c))");
    assert_eq!(sexp_with("a ^ b * c", &ops), "(* (^ a b) c)");
}

#[test]
fn undeclared_operator_ends_expression() {
    // `>` is not a binary operator, so parsing stops before it.
    assert_eq!(sexp("1 > 2"), "1");
}

#[test]
fn unary_operators() {
    assert_eq!(sexp("!x"), "(! x)");
    assert_eq!(sexp("-x * 2"), "(* (- x) 2)");
    assert_eq!(sexp("!!x"), "(! (! x))");
    assert_eq!(sexp("a + -b"), "(+ a (- b))");
}

// === Primaries ===

#[test]
fn calls() {
    assert_eq!(sexp("f()"), "(call f)");
    assert_eq!(sexp("f(1, a + 2)"), "(call f 1 (+ a 2))");
    assert_eq!(sexp("f(g(x))"), "(call f (call g x))");
}

#[test]
fn if_expression() {
    assert_eq!(sexp("if x < 3 then 1 else 2"), "(if (< x 3) 1 2)");
}

#[test]
fn for_expression() {
    assert_eq!(sexp("for i = 1, i < 3, 1 in i"), "(for i 1 (< i 3) 1 i)");
    assert_eq!(sexp("for i = 1, i < n in f(i)"), "(for i 1 (< i n) _ (call f i))");
}

#[test]
fn var_expression() {
    assert_eq!(sexp("var a = 1, b in a + b"), "(var ((a 1) (b)) (+ a b))");
    assert_eq!(
        sexp("var x = 1 in (var x = x + 1 in x)"),
        "(var ((x 1)) (var ((x (+ x 1))) x))"
    );
}

#[test]
fn spans_cover_whole_expression() {
    let interner = StringInterner::new();
    let ops = OperatorTable::new();
    let parsed = parse_expression("  (a + b) * c", &interner, &ops);
    let span = parsed.map(|e: Expr| e.span);
    assert_eq!(span, Ok(kal_ir::Span::new(2, 13)));
}

// === Prototypes and units ===

#[test]
fn definition() {
    let interner = StringInterner::new();
    let TopLevel::Definition(f) = parse_unit("def add(a b) a + b", &interner) else {
        panic!("not a definition");
    };
    assert_eq!(interner.lookup(f.proto.name), "add");
    assert_eq!(f.proto.arity(), 2);
    assert_eq!(f.proto.kind, ProtoKind::Function);
    assert_eq!(f.body.to_sexp(&interner), "(+ a b)");
}

#[test]
fn extern_declaration() {
    let interner = StringInterner::new();
    let TopLevel::Extern(p) = parse_unit("extern sin(x)", &interner) else {
        panic!("not an extern");
    };
    assert_eq!(interner.lookup(p.name), "sin");
    assert_eq!(p.params, vec![interner.intern("x")]);
}

#[test]
fn top_level_expression_is_anonymous_function() {
    let interner = StringInterner::new();
    let TopLevel::Expression(f) = parse_unit("4 + 5 * 3", &interner) else {
        panic!("not an expression");
    };
    assert_eq!(interner.lookup(f.proto.name), "__anon_expr");
    assert!(f.proto.params.is_empty());
}

#[test]
fn binary_operator_prototype() {
    let interner = StringInterner::new();
    let TopLevel::Definition(f) = parse_unit("def binary> 10 (a b) b < a", &interner) else {
        panic!("not a definition");
    };
    assert_eq!(interner.lookup(f.proto.name), "binary>");
    assert_eq!(
        f.proto.binary_operator().map(|(op, p)| (op, p.get())),
        Some(('>', 10))
    );
}

#[test]
fn binary_operator_default_precedence() {
    let interner = StringInterner::new();
    let TopLevel::Definition(f) = parse_unit("def binary| (a b) a + b", &interner) else {
        panic!("not a definition");
    };
    assert_eq!(f.proto.binary_operator().map(|(_, p)| p.get()), Some(30));
}

#[test]
fn unary_operator_prototype() {
    let interner = StringInterner::new();
    let TopLevel::Definition(f) = parse_unit("def unary!(v) if v then 0 else 1", &interner) else {
        panic!("not a definition");
    };
    assert_eq!(interner.lookup(f.proto.name), "unary!");
    assert_eq!(f.proto.kind, ProtoKind::Unary('!'));
}

#[test]
fn eof_is_no_unit() {
    let interner = StringInterner::new();
    let ops = OperatorTable::new();
    let mut cursor = TokenCursor::new("  # only a comment", &interner);
    assert_eq!(Parser::new(&mut cursor, &ops).parse_top_level(), Ok(None));
}

#[test]
fn parser_stops_after_one_unit() {
    let interner = StringInterner::new();
    let ops = OperatorTable::new();
    let mut cursor = TokenCursor::new("def f(x) x def g(y) y", &interner);
    let first = Parser::new(&mut cursor, &ops).parse_top_level();
    assert!(matches!(first, Ok(Some(TopLevel::Definition(_)))));
    assert_eq!(cursor.current_kind(), TokenKind::Def);
}

// === Errors ===

#[test]
fn unclosed_paren() {
    let err = parse_err("(1 + 2");
    assert_eq!(err.code, ErrorCode::E1003);
    assert_eq!(err.message, "expected ')'");
    assert!(err.related.is_some());
    assert_eq!(err.context, Some(ErrorContext::Parenthesized));
}

#[test]
fn bad_argument_list() {
    let err = parse_err("f(1 2)");
    assert_eq!(err.message, "Expected ')' or ',' in argument list");
    assert_eq!(err.context, Some(ErrorContext::CallArguments));
}

#[test]
fn if_errors() {
    assert_eq!(parse_err("if 1 2").message, "expected then");
    assert_eq!(parse_err("if 1 then 2 3").message, "expected else");
}

#[test]
fn for_errors() {
    assert_eq!(parse_err("for 1").message, "expected identifier after for");
    assert_eq!(parse_err("for i 1").message, "expected '=' after for");
    assert_eq!(parse_err("for i = 1 2").message, "expected ',' after for start value");
    assert_eq!(parse_err("for i = 1, 2 i").message, "expected 'in' after for");
}

#[test]
fn var_errors() {
    assert_eq!(parse_err("var 1").message, "expected identifier after var");
    assert_eq!(parse_err("var a, 1").message, "expected identifier list after var");
    assert_eq!(parse_err("var a = 1 a").message, "expected 'in' keyword after 'var'");
}

#[test]
fn expected_expression() {
    let err = parse_err(")");
    assert_eq!(err.code, ErrorCode::E1002);
    assert_eq!(err.message, "unknown token when expecting an expression");
}

#[test]
fn prototype_errors() {
    assert_eq!(parse_err("def 1").message, "Expected function name in prototype");
    assert_eq!(parse_err("extern f x").message, "Expected '(' in prototype");
    assert_eq!(parse_err("extern f(x 1)").message, "Expected ')' in prototype");
    assert_eq!(parse_err("def unary x(a) a").message, "Expected unary operator");
    assert_eq!(parse_err("def binary 5 (a b) a").message, "Expected binary operator");
}

#[test]
fn builtin_operators_cannot_be_redefined() {
    for source in [
        "def binary+ 50 (a b) a",
        "def binary= 9 (a b) a",
        "def binary< (a b) a",
        "def binary- 5 (a b) a",
        "def binary* 60 (a b) a",
    ] {
        let err = parse_err(source);
        assert_eq!(err.code, ErrorCode::E1005, "{source}");
        assert!(err.message.starts_with("Cannot redefine built-in operator"), "{source}");
    }
    let err = parse_err("def binary+ 50 (a b) a");
    assert_eq!(err.message, "Cannot redefine built-in operator '+'");
    assert_eq!(err.span, kal_ir::Span::new(10, 11));
}

#[test]
fn unary_minus_is_not_a_builtin() {
    let interner = StringInterner::new();
    let TopLevel::Definition(f) = parse_unit("def unary-(v) 0-v", &interner) else {
        panic!("not a definition");
    };
    assert_eq!(f.proto.kind, ProtoKind::Unary('-'));
}

#[test]
fn precedence_out_of_range() {
    let err = parse_err("def binary| 0 (a b) a");
    assert_eq!(err.code, ErrorCode::E1006);
    assert_eq!(err.message, "Invalid precedence: must be 1..100");
    assert_eq!(parse_err("def binary| 101 (a b) a").code, ErrorCode::E1006);
}

#[test]
fn operator_arity() {
    let err = parse_err("def binary| 5 (a) a");
    assert_eq!(err.code, ErrorCode::E1007);
    assert_eq!(err.message, "Invalid number of operands for operator");
    assert_eq!(parse_err("def unary-(a b) a").code, ErrorCode::E1007);
}

#[test]
fn deeply_nested_parentheses_do_not_overflow() {
    let depth = 5_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(sexp(&source), "1");
}
