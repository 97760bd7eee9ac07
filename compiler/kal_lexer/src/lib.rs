//! Lexer for Kal using logos with string interning.
//!
//! The lexer is a pull stream: [`Lexer::next_token`] produces one token per
//! call and cannot be rewound. It never fails. Characters that are not part
//! of an identifier, number, comment or whitespace come back as
//! [`TokenKind::Op`] so the parser decides what they mean. Once the input
//! is exhausted every further call returns [`TokenKind::Eof`].

mod lexer;
mod number;
mod raw_token;

pub use lexer::{lex, Lexer};
pub use number::parse_number;
