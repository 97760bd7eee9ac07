//! Code generation errors.

use inkwell::builder::BuilderError;
use kal_diagnostic::{internal_error, Diagnostic, ErrorCode};
use kal_ir::Span;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("unknown variable name `{name}`")]
    UnknownVariable { name: String, span: Span },

    #[error("unknown function referenced: `{name}`")]
    UnknownFunction { name: String, span: Span },

    #[error("unknown unary operator `{op}`")]
    UnknownUnaryOperator { op: char, span: Span },

    #[error("incorrect number of arguments passed to `{name}`: expected {expected}, found {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("destination of '=' must be a variable")]
    InvalidAssignTarget { span: Span },

    #[error("function `{name}` cannot be redefined")]
    Redefinition { name: String, span: Span },

    #[error("generated code for `{name}` is invalid: {message}")]
    Verification {
        name: String,
        message: String,
        span: Span,
    },

    /// The parser accepted an operator the code generator cannot find.
    #[error("binary operator `{op}` not found")]
    UnresolvedBinaryOperator { op: char, span: Span },

    /// LLVM refused to optimize or link a finished definition.
    #[error("backend failed on `{name}`: {message}")]
    Backend {
        name: String,
        message: String,
        span: Span,
    },

    /// An LLVM builder call failed.
    #[error("LLVM builder failed: {message}")]
    Builder { message: String },
}

impl CodegenError {
    pub(crate) fn builder(message: impl Into<String>) -> Self {
        CodegenError::Builder {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::UnknownVariable { .. } => ErrorCode::E2001,
            CodegenError::UnknownFunction { .. } => ErrorCode::E2002,
            CodegenError::UnknownUnaryOperator { .. } => ErrorCode::E2003,
            CodegenError::ArgumentCount { .. } => ErrorCode::E2004,
            CodegenError::InvalidAssignTarget { .. } => ErrorCode::E2005,
            CodegenError::Redefinition { .. } => ErrorCode::E2006,
            CodegenError::Verification { .. } => ErrorCode::E2007,
            CodegenError::UnresolvedBinaryOperator { .. }
            | CodegenError::Backend { .. }
            | CodegenError::Builder { .. } => ErrorCode::E9001,
        }
    }

    /// Where the error happened. Builder failures carry no span of their
    /// own; callers fall back to the definition's.
    pub fn span(&self) -> Option<Span> {
        match self {
            CodegenError::UnknownVariable { span, .. }
            | CodegenError::UnknownFunction { span, .. }
            | CodegenError::UnknownUnaryOperator { span, .. }
            | CodegenError::ArgumentCount { span, .. }
            | CodegenError::InvalidAssignTarget { span }
            | CodegenError::Redefinition { span, .. }
            | CodegenError::Verification { span, .. }
            | CodegenError::UnresolvedBinaryOperator { span, .. }
            | CodegenError::Backend { span, .. } => Some(*span),
            CodegenError::Builder { .. } => None,
        }
    }

    /// Diagnostic for this error; `fallback` labels errors without a span.
    pub fn to_diagnostic(&self, fallback: Span) -> Diagnostic {
        let span = self.span().unwrap_or(fallback);
        let label = match self {
            CodegenError::UnresolvedBinaryOperator { .. }
            | CodegenError::Backend { .. }
            | CodegenError::Builder { .. } => {
                return internal_error(span, self.to_string());
            }
            CodegenError::UnknownVariable { .. } => "not bound here",
            CodegenError::UnknownFunction { .. } => "not declared or defined",
            CodegenError::UnknownUnaryOperator { .. } => "no `def unary` for this operator",
            CodegenError::ArgumentCount { .. } => "in this call",
            CodegenError::InvalidAssignTarget { .. } => "cannot be assigned to",
            CodegenError::Redefinition { .. } => "already has a body in this unit",
            CodegenError::Verification { .. } => "in this definition",
        };
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(span, label)
    }
}

impl From<BuilderError> for CodegenError {
    fn from(err: BuilderError) -> Self {
        CodegenError::builder(err.to_string())
    }
}
