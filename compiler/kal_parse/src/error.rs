//! Parse error types.

use kal_diagnostic::{Diagnostic, ErrorCode};
use kal_ir::Span;

/// What was being parsed when an error occurred.
///
/// Rendered as a "while parsing ..." note on the diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    Definition,
    Extern,
    Prototype,
    TopLevelExpression,
    IfExpression,
    ForLoop,
    VarExpression,
    CallArguments,
    Parenthesized,
}

impl ErrorContext {
    /// Phrase suitable for "while parsing {description}".
    pub fn description(self) -> &'static str {
        match self {
            Self::Definition => "a function definition",
            Self::Extern => "an extern declaration",
            Self::Prototype => "a prototype",
            Self::TopLevelExpression => "a top-level expression",
            Self::IfExpression => "an if expression",
            Self::ForLoop => "a for loop",
            Self::VarExpression => "a var expression",
            Self::CallArguments => "call arguments",
            Self::Parenthesized => "a parenthesized expression",
        }
    }
}

/// A syntax error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Location of the offending token.
    pub span: Span,
    /// Innermost construct being parsed.
    pub context: Option<ErrorContext>,
    /// Related location, e.g. where an unclosed `(` was opened.
    pub related: Option<(Span, String)>,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
            related: None,
        }
    }

    /// Attach `context` unless a more specific one is already set.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context.get_or_insert(context);
        self
    }

    #[must_use]
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related = Some((span, message.into()));
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, self.message.clone());
        if let Some((span, msg)) = &self.related {
            diag = diag.with_secondary_label(*span, msg.clone());
        }
        if let Some(ctx) = self.context {
            diag = diag.with_note(format!("while parsing {}", ctx.description()));
        }
        diag
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ParseError {}
