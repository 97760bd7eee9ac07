//! Abstract syntax tree.
//!
//! The tree is owned top-down: every composite node exclusively owns its
//! children through `Box`/`Vec`. There is no sharing and no arena; a
//! top-level unit is parsed, lowered once, and dropped.

use std::fmt::{self, Write as _};
use std::num::NonZeroU8;

use crate::{Name, Span, StringInterner};

/// Binding strength of a binary operator. Higher binds tighter.
///
/// Never zero, so `Option<Precedence>` distinguishes "not an operator" from
/// every real precedence, and `None < Some(_)` orders an absent operator
/// below every declared one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Precedence(NonZeroU8);

impl Precedence {
    /// Lowest precedence a user operator may declare.
    pub const MIN_USER: u8 = 1;
    /// Highest precedence a user operator may declare.
    pub const MAX_USER: u8 = 100;
    /// Precedence of a `binary` prototype that does not declare one.
    pub const DEFAULT_USER: Precedence = Precedence(NonZeroU8::MIN.saturating_add(29));

    /// `None` for zero.
    pub const fn new(value: u8) -> Option<Self> {
        match NonZeroU8::new(value) {
            Some(v) => Some(Precedence(v)),
            None => None,
        }
    }

    /// Precedence declared in source. `None` outside `[1, 100]`.
    pub fn user(value: f64) -> Option<Self> {
        if !(f64::from(Self::MIN_USER)..=f64::from(Self::MAX_USER)).contains(&value) {
            return None;
        }
        // Truncates fractional precedences, e.g. `binary| 5.5`.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self::new(value as u8)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Threshold for parsing the right operand of a tighter-binding operator.
    #[must_use]
    pub const fn next(self) -> Self {
        Precedence(self.0.saturating_add(1))
    }
}

impl fmt::Debug for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Precedence({})", self.0)
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Variable(Name),
    Unary {
        op: char,
        operand: Box<Expr>,
    },
    /// `op == '='` is assignment; the left side must be a `Variable`.
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: Name,
        args: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    For {
        var: Name,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },
    Var {
        bindings: Vec<VarBinding>,
        body: Box<Expr>,
    },
}

/// One `name (= init)?` entry of a `var` expression.
#[derive(Clone, Debug, PartialEq)]
pub struct VarBinding {
    pub name: Name,
    pub init: Option<Expr>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Render as an S-expression, resolving names through `interner`.
    ///
    /// `4 + 5 * 3` renders as `(+ 4 (* 5 3))`.
    pub fn to_sexp(&self, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_sexp(interner, &mut out);
        out
    }

    fn write_sexp(&self, interner: &StringInterner, out: &mut String) {
        // Writing to a String cannot fail.
        match &self.kind {
            ExprKind::Number(v) => {
                let _ = write!(out, "{v}");
            }
            ExprKind::Variable(name) => out.push_str(interner.lookup(*name)),
            ExprKind::Unary { op, operand } => {
                let _ = write!(out, "({op} ");
                operand.write_sexp(interner, out);
                out.push(')');
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let _ = write!(out, "({op} ");
                lhs.write_sexp(interner, out);
                out.push(' ');
                rhs.write_sexp(interner, out);
                out.push(')');
            }
            ExprKind::Call { callee, args } => {
                let _ = write!(out, "(call {}", interner.lookup(*callee));
                for arg in args {
                    out.push(' ');
                    arg.write_sexp(interner, out);
                }
                out.push(')');
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push_str("(if ");
                cond.write_sexp(interner, out);
                out.push(' ');
                then_branch.write_sexp(interner, out);
                out.push(' ');
                else_branch.write_sexp(interner, out);
                out.push(')');
            }
            ExprKind::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                let _ = write!(out, "(for {} ", interner.lookup(*var));
                start.write_sexp(interner, out);
                out.push(' ');
                end.write_sexp(interner, out);
                out.push(' ');
                match step {
                    Some(step) => step.write_sexp(interner, out),
                    None => out.push('_'),
                }
                out.push(' ');
                body.write_sexp(interner, out);
                out.push(')');
            }
            ExprKind::Var { bindings, body } => {
                out.push_str("(var (");
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "({}", interner.lookup(binding.name));
                    if let Some(init) = &binding.init {
                        out.push(' ');
                        init.write_sexp(interner, out);
                    }
                    out.push(')');
                }
                out.push_str(") ");
                body.write_sexp(interner, out);
                out.push(')');
            }
        }
    }
}

/// What a prototype declares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProtoKind {
    Function,
    Unary(char),
    Binary { op: char, precedence: Precedence },
}

/// Function signature: name and parameter names. Every parameter and the
/// result are `f64`.
///
/// Operator prototypes carry the synthesized names `unary<op>` and
/// `binary<op>`, which is how calls to them are resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Prototype {
    pub name: Name,
    pub params: Vec<Name>,
    pub kind: ProtoKind,
    pub span: Span,
}

impl Prototype {
    pub fn new(name: Name, params: Vec<Name>, kind: ProtoKind, span: Span) -> Self {
        Prototype {
            name,
            params,
            kind,
            span,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Operator symbol and precedence of a binary operator prototype.
    pub fn binary_operator(&self) -> Option<(char, Precedence)> {
        match self.kind {
            ProtoKind::Binary { op, precedence } => Some((op, precedence)),
            _ => None,
        }
    }
}

/// A definition: prototype plus body.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

/// One top-level unit.
#[derive(Clone, Debug, PartialEq)]
pub enum TopLevel {
    Definition(Function),
    Extern(Prototype),
    /// A bare expression, wrapped in an anonymous zero-argument function.
    Expression(Function),
}

#[cfg(test)]
mod tests;
