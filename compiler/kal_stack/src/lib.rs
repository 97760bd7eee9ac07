//! Stack growth for deeply nested source.
//!
//! The parser and the code generator both recurse on the shape of their
//! input. A pathological expression like `((((...))))` or a
//! long chain of unary operators would otherwise overflow the native stack.
//! Wrapping each recursive step in [`ensure_sufficient_stack`] moves the
//! computation onto a freshly allocated segment when the current one runs low.

/// Remaining stack below which a new segment is allocated (128 KiB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2 MiB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
