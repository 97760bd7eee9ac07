//! AST to IR lowering for Kal.
//!
//! [`CodeGen`] turns one top-level unit at a time into functions of an
//! LLVM module through the inkwell builder. Every variable, parameters
//! included, lives in an entry-block `alloca`; `mem2reg` promotes them.
//!
//! Session-long state is passed in by reference:
//!
//! - [`FunctionRegistry`]: every prototype seen so far, so later units can
//!   call functions defined by earlier ones
//! - [`kal_parse::OperatorTable`]: a `def binary` installs its precedence
//!   before its body is generated
//!
//! A failed definition rolls all of it back.

mod env;
mod error;
mod expr_lowerer;
mod function_compiler;
mod lower_calls;
mod lower_control_flow;
mod lower_operators;
mod registry;

pub use env::{ScopeMark, SymbolEnv};
pub use error::CodegenError;
pub use function_compiler::CodeGen;
pub use registry::FunctionRegistry;

#[cfg(test)]
mod tests;
