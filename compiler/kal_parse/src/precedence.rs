//! Binary operator precedence table.

use kal_ir::Precedence;
use rustc_hash::FxHashMap;

/// Built-in binary operators and their precedences.
pub const BUILTIN_OPERATORS: [(char, u8); 5] = [('=', 2), ('<', 10), ('+', 20), ('-', 20), ('*', 40)];

/// Whether `op` is one of [`BUILTIN_OPERATORS`]. These are lowered directly
/// and cannot be redefined with `def binary`.
pub(crate) fn is_builtin(op: char) -> bool {
    BUILTIN_OPERATORS.iter().any(|&(builtin, _)| builtin == op)
}

/// Maps a single-character operator to its precedence.
///
/// Owned by the session and shared by reference: the parser reads it, the
/// code generator installs a user operator's precedence before lowering its
/// body and rolls the entry back if the definition fails.
#[derive(Clone, Debug)]
pub struct OperatorTable {
    table: FxHashMap<char, Precedence>,
}

impl OperatorTable {
    /// Table seeded with the built-in operators.
    pub fn new() -> Self {
        let table = BUILTIN_OPERATORS
            .iter()
            .filter_map(|&(op, prec)| Precedence::new(prec).map(|p| (op, p)))
            .collect();
        OperatorTable { table }
    }

    /// Precedence of `op`, or `None` if it is not a binary operator.
    #[inline]
    pub fn precedence(&self, op: char) -> Option<Precedence> {
        self.table.get(&op).copied()
    }

    /// Declare `op` with `precedence`, returning the entry it replaced.
    ///
    /// Pass the returned value to [`restore`](Self::restore) to undo.
    pub fn install(&mut self, op: char, precedence: Precedence) -> Option<Precedence> {
        tracing::debug!(%op, %precedence, "install binary operator");
        self.table.insert(op, precedence)
    }

    /// Put `op` back to a state previously returned by `install`.
    pub fn restore(&mut self, op: char, previous: Option<Precedence>) {
        match previous {
            Some(p) => {
                self.table.insert(op, p);
            }
            None => {
                self.table.remove(&op);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}
