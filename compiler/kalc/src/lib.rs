//! The Kal driver library.
//!
//! Wires the lexer, parser, code generator and JIT engine into an
//! incremental [`Session`] that the `kal` binary feeds from a file or from
//! standard input.

pub mod config;
pub mod repl;
pub mod session;
mod tracing_setup;

pub use config::{parse_args, CliArgs, SessionConfig, DEBUG_IR_ENV, USAGE};
pub use repl::LineBuffer;
pub use session::{Session, SessionState, UnitOutcome};
pub use tracing_setup::{init_tracing, LOG_TREE_ENV};
