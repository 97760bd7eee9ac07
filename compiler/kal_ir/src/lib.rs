//! Shared front-end data for the Kal compiler.
//!
//! - [`Span`]: byte range into the source of the current session input
//! - [`Name`] / [`StringInterner`]: interned identifiers
//! - [`Token`] / [`TokenKind`]: lexer output consumed by the parser
//! - [`ast`]: the expression tree produced by the parser
//!
//! Everything here is plain data. Behavior lives in `kal_lexer`,
//! `kal_parse` and `kal_codegen`.

pub mod ast;
mod interner;
mod name;
mod span;
mod token;

pub use ast::{Expr, ExprKind, Function, Precedence, ProtoKind, Prototype, TopLevel, VarBinding};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use token::{Token, TokenKind};
