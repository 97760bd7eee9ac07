//! In-memory emitter.

use crate::Diagnostic;

use super::DiagnosticEmitter;

/// Collects every emitted diagnostic.
#[derive(Default, Debug)]
pub struct BufferEmitter {
    diagnostics: Vec<Diagnostic>,
    summary: Option<usize>,
}

impl BufferEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Messages of all collected diagnostics, in emission order.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    /// Last count passed to `emit_summary`.
    pub fn summary(&self) -> Option<usize> {
        self.summary
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.summary = None;
    }
}

impl DiagnosticEmitter for BufferEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn flush(&mut self) {}

    fn emit_summary(&mut self, error_count: usize) {
        self.summary = Some(error_count);
    }
}
