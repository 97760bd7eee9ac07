//! Line collection for the interactive prompt.
//!
//! A unit may span several lines. Lines are collected until the session
//! says the text no longer stops in the middle of a unit, and only then
//! handed over as one source.

use kal_diagnostic::emitter::DiagnosticEmitter;

use crate::session::Session;

pub const PROMPT: &str = "ready> ";
pub const CONTINUATION_PROMPT: &str = "  ...> ";

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing collected since the last complete source.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The prompt to show before reading the next line.
    pub fn prompt(&self) -> &'static str {
        if self.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        }
    }

    /// Add one line. Returns the collected source once it ends on a unit
    /// boundary.
    pub fn push<E: DiagnosticEmitter>(
        &mut self,
        session: &Session<'_, E>,
        line: &str,
    ) -> Option<String> {
        self.pending.push_str(line);
        if !line.ends_with('\n') {
            self.pending.push('\n');
        }
        if self.pending.trim().is_empty() {
            self.pending.clear();
            return None;
        }
        if session.is_incomplete(&self.pending) {
            tracing::trace!(len = self.pending.len(), "waiting for more input");
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }

    /// Whatever is left at end of input, complete or not.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        (!rest.trim().is_empty()).then_some(rest)
    }
}
