//! Scoped variable environment.
//!
//! Maps a variable name to the slot holding its value. Binding a name that
//! is already bound shadows it; the previous binding is saved on a stack so
//! that leaving the scope puts back exactly what was there before, in
//! reverse order. A name bound twice in one scope therefore returns to its
//! outer binding, not to the first inner one.

use kal_ir::Name;
use rustc_hash::FxHashMap;

/// Position in the shadow stack, taken on scope entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMark(usize);

/// `V` is the slot type, an LLVM pointer value during code generation.
#[derive(Debug)]
pub struct SymbolEnv<V> {
    bindings: FxHashMap<Name, V>,
    /// Every `bind`, with what it replaced.
    shadowed: Vec<(Name, Option<V>)>,
}

impl<V> Default for SymbolEnv<V> {
    fn default() -> Self {
        SymbolEnv {
            bindings: FxHashMap::default(),
            shadowed: Vec::new(),
        }
    }
}

impl<V: Copy> SymbolEnv<V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<V> {
        self.bindings.get(&name).copied()
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    /// Bind `name` to `slot`, shadowing any existing binding until the
    /// enclosing scope is left.
    pub fn bind(&mut self, name: Name, slot: V) {
        let previous = self.bindings.insert(name, slot);
        self.shadowed.push((name, previous));
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.shadowed.len())
    }

    /// Undo every `bind` made since `mark`, newest first.
    pub fn restore_to(&mut self, mark: ScopeMark) {
        while self.shadowed.len() > mark.0 {
            let Some((name, previous)) = self.shadowed.pop() else {
                break;
            };
            match previous {
                Some(slot) => {
                    self.bindings.insert(name, slot);
                }
                None => {
                    self.bindings.remove(&name);
                }
            }
        }
    }

    /// Number of names currently bound.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
