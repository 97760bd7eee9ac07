//! Functions provided by the host rather than by any module.
//!
//! Programs reach them through `extern` declarations, e.g.
//! `extern putchard(c)`. The JIT maps a declaration to a host function only
//! when no live module defines the name, so a program may define its own
//! `printd`.
//!
//! Generated code calls these through plain `extern "C"` pointers, so they
//! cannot take the output handler as an argument. [`with_output`] installs
//! it in a thread-local for the duration of one run.

use std::cell::RefCell;
use std::sync::Arc;

use crate::output::SharedOutput;

/// Signature of every host function: one `double` in, one `double` out.
pub type HostFn = extern "C" fn(f64) -> f64;

#[derive(Clone, Copy)]
pub struct HostFunction {
    pub name: &'static str,
    pub arity: usize,
    pub f: HostFn,
}

impl std::fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl HostFunction {
    pub fn lookup(name: &str) -> Option<&'static HostFunction> {
        HOST_FUNCTIONS.iter().find(|h| h.name == name)
    }

    /// Address handed to the JIT's global mapping.
    pub fn address(&self) -> usize {
        self.f as *const () as usize
    }
}

pub static HOST_FUNCTIONS: &[HostFunction] = &[
    HostFunction {
        name: "putchard",
        arity: 1,
        f: putchard,
    },
    HostFunction {
        name: "printd",
        arity: 1,
        f: printd,
    },
];

thread_local! {
    static CURRENT_OUTPUT: RefCell<Option<SharedOutput>> = const { RefCell::new(None) };
}

/// Run `f` with `output` as the destination of host function output on
/// this thread. Nested calls restore the outer handler on return.
pub fn with_output<R>(output: &SharedOutput, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_OUTPUT.with(|cell| cell.replace(Some(Arc::clone(output))));
    let result = f();
    CURRENT_OUTPUT.with(|cell| *cell.borrow_mut() = previous);
    result
}

/// Output written outside [`with_output`] is dropped.
fn print(msg: &str) {
    CURRENT_OUTPUT.with(|cell| {
        if let Some(out) = cell.borrow().as_ref() {
            out.print(msg);
        }
    });
}

/// Write the character whose code is `x`; returns 0.0.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "character codes are truncated like a C cast"
)]
pub extern "C" fn putchard(x: f64) -> f64 {
    let ch = char::from_u32(x as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0u8; 4];
    print(ch.encode_utf8(&mut buf));
    0.0
}

/// Write `x` with six decimals and a newline; returns 0.0.
pub extern "C" fn printd(x: f64) -> f64 {
    print(&format!("{x:.6}\n"));
    0.0
}
