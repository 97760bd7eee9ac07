//! Diagnostics for every phase of the Kal compiler.
//!
//! A [`Diagnostic`] carries:
//! - an [`ErrorCode`] for searchability
//! - the message (what went wrong)
//! - labeled spans (where it went wrong)
//! - notes (why)
//!
//! Phases build diagnostics from their own error types and hand them to a
//! [`DiagnosticEmitter`](emitter::DiagnosticEmitter). Emitting never affects
//! control flow: the session keeps going after every report.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{internal_error, Diagnostic, Label};
pub use error_code::{ErrorCategory, ErrorCode};
