//! Diagnostic Emitters
//!
//! - Terminal: colored, human-readable output for the `kal` binary
//! - Buffer: collects diagnostics in memory for tests and embedders
//!
//! Each emitter implements the `DiagnosticEmitter` trait.

mod buffer;
mod terminal;

pub use buffer::BufferEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary line for `error_count` reported errors.
    fn emit_summary(&mut self, error_count: usize);

    /// Set the source text that subsequent label spans refer to.
    ///
    /// Emitters that do not render source locations ignore it.
    fn set_source(&mut self, _source: &str) {}
}

impl<E: DiagnosticEmitter + ?Sized> DiagnosticEmitter for &mut E {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn emit_summary(&mut self, error_count: usize) {
        (**self).emit_summary(error_count);
    }

    fn set_source(&mut self, source: &str) {
        (**self).set_source(source);
    }
}
