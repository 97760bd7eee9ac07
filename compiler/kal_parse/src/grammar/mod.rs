//! Grammar productions, one method per rule.
//!
//! ```text
//! primary    := identifier | identifier '(' (expr (',' expr)*)? ')' | number
//!             | '(' expr ')' | if | for | var
//! unary      := primary | OPCHAR unary
//! binRHS(p)  := (OPCHAR unary)*
//! expr       := unary binRHS(0)
//! prototype  := ident '(' ident* ')'
//!             | 'unary' OPCHAR '(' ident ')'
//!             | 'binary' OPCHAR number? '(' ident ident ')'
//! definition := 'def' prototype expr
//! external   := 'extern' prototype
//! ```

mod expr;
mod item;
