//! Error recovery between top-level units.

use kal_ir::TokenKind;

use crate::TokenCursor;

/// Skip past a failed unit.
///
/// Discards the token the error was reported at, then every token up to the
/// next unit boundary (`def`, `extern`, `;` or end of input). An offending
/// `def` or `extern` is kept, since it starts the next unit. Returns the
/// number of tokens skipped.
pub fn synchronize(cursor: &mut TokenCursor<'_>) -> usize {
    let mut skipped = 0;
    if !matches!(
        cursor.current_kind(),
        TokenKind::Def | TokenKind::Extern | TokenKind::Eof
    ) {
        cursor.advance();
        skipped += 1;
    }
    while !cursor.current_kind().is_unit_boundary() {
        cursor.advance();
        skipped += 1;
    }
    tracing::debug!(skipped, "recovered to unit boundary");
    skipped
}
