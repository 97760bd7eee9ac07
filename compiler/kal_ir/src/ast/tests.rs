use pretty_assertions::assert_eq;

use super::*;

fn num(v: f64) -> Expr {
    Expr::new(ExprKind::Number(v), Span::DUMMY)
}

fn var(n: Name) -> Expr {
    Expr::new(ExprKind::Variable(n), Span::DUMMY)
}

fn bin(op: char, lhs: Expr, rhs: Expr) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        Span::DUMMY,
    )
}

#[test]
fn precedence_rejects_zero() {
    assert_eq!(Precedence::new(0), None);
    assert_eq!(Precedence::new(40).map(Precedence::get), Some(40));
}

#[test]
fn absent_precedence_orders_below_all() {
    let none: Option<Precedence> = None;
    assert!(none < Precedence::new(1));
}

#[test]
fn user_precedence_range() {
    assert_eq!(Precedence::user(0.0), None);
    assert_eq!(Precedence::user(101.0), None);
    assert_eq!(Precedence::user(-3.0), None);
    assert_eq!(Precedence::user(1.0).map(Precedence::get), Some(1));
    assert_eq!(Precedence::user(100.0).map(Precedence::get), Some(100));
    assert_eq!(Precedence::DEFAULT_USER.get(), 30);
}

#[test]
fn next_is_one_higher() {
    let p = Precedence::new(20).map(Precedence::next).map(Precedence::get);
    assert_eq!(p, Some(21));
}

#[test]
fn sexp_rendering() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let f = interner.intern("f");
    let expr = bin('+', var(a), bin('*', num(5.0), num(3.0)));
    assert_eq!(expr.to_sexp(&interner), "(+ a (* 5 3))");

    let call = Expr::new(
        ExprKind::Call {
            callee: f,
            args: vec![num(1.5), var(a)],
        },
        Span::DUMMY,
    );
    assert_eq!(call.to_sexp(&interner), "(call f 1.5 a)");
}

#[test]
fn sexp_var_and_for() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let i = interner.intern("i");
    let v = Expr::new(
        ExprKind::Var {
            bindings: vec![
                VarBinding {
                    name: x,
                    init: Some(num(1.0)),
                },
                VarBinding { name: i, init: None },
            ],
            body: Box::new(var(x)),
        },
        Span::DUMMY,
    );
    assert_eq!(v.to_sexp(&interner), "(var ((x 1) (i)) x)");

    let f = Expr::new(
        ExprKind::For {
            var: i,
            start: Box::new(num(1.0)),
            end: Box::new(bin('<', var(i), num(3.0))),
            step: None,
            body: Box::new(var(i)),
        },
        Span::DUMMY,
    );
    assert_eq!(f.to_sexp(&interner), "(for i 1 (< i 3) _ i)");
}

#[test]
fn binary_operator_accessor() {
    let interner = StringInterner::new();
    let prec = Precedence::new(10);
    assert!(prec.is_some());
    let Some(prec) = prec else { return };
    let proto = Prototype::new(
        interner.intern("binary>"),
        vec![interner.intern("a"), interner.intern("b")],
        ProtoKind::Binary { op: '>', precedence: prec },
        Span::DUMMY,
    );
    assert_eq!(proto.arity(), 2);
    assert_eq!(proto.binary_operator(), Some(('>', prec)));
}
