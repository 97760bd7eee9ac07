use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Parser errors
/// - E2xxx: Code generation errors (names, arity, semantics)
/// - E3xxx: Execution errors
/// - E9xxx: Internal compiler errors
///
/// The lexer has no error codes; every character becomes some token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Malformed prototype
    E1005,
    /// Operator precedence out of range
    E1006,
    /// Operator prototype with the wrong number of operands
    E1007,

    // Code Generation Errors (E2xxx)
    /// Unknown variable
    E2001,
    /// Unknown function
    E2002,
    /// Unknown unary operator
    E2003,
    /// Argument count mismatch
    E2004,
    /// Assignment to something other than a variable
    E2005,
    /// Function body defined twice
    E2006,
    /// Generated function failed verification
    E2007,

    // Execution Errors (E3xxx)
    /// Call to a symbol with no definition
    E3001,
    /// JIT compilation failed
    E3002,
    /// Declared arity does not match the definition
    E3003,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

/// Broad classification of a failure, independent of its exact code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCategory {
    Syntax,
    Name,
    Arity,
    Semantic,
    Execution,
    Internal,
}

impl ErrorCode {
    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Parser
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            // Codegen
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            // Execution
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E1005
            | ErrorCode::E1006 => ErrorCategory::Syntax,
            ErrorCode::E1007 | ErrorCode::E2004 => ErrorCategory::Arity,
            ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003 => ErrorCategory::Name,
            ErrorCode::E2005 | ErrorCode::E2006 | ErrorCode::E2007 => ErrorCategory::Semantic,
            ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3003 => ErrorCategory::Execution,
            ErrorCode::E9001 => ErrorCategory::Internal,
        }
    }

    /// Check if this is a parser/syntax error (E1xxx range).
    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Syntax => "syntax error",
            ErrorCategory::Name => "name error",
            ErrorCategory::Arity => "arity error",
            ErrorCategory::Semantic => "semantic error",
            ErrorCategory::Execution => "execution error",
            ErrorCategory::Internal => "internal error",
        };
        f.write_str(s)
    }
}
