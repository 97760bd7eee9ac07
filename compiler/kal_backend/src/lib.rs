//! LLVM services for the Kal code generator.
//!
//! - [`JitEngine`]: keeps every unit's module and runs functions through
//!   MCJIT, resolving calls newest module first
//! - [`Optimizer`]: the pass pipeline run over each finished definition
//! - host functions (`putchard`, `printd`) and the output they write to
//!
//! The LLVM [`inkwell::context::Context`] is owned by the caller; everything
//! here borrows it.

mod engine;
mod host;
mod optimizer;
mod output;

pub use engine::{ExecError, JitEngine, ModuleHandle};
pub use host::{with_output, HostFn, HostFunction, HOST_FUNCTIONS};
pub use optimizer::{BackendError, Optimizer, DEFAULT_PIPELINE};
pub use output::{
    buffer_handler, silent_handler, stdout_handler, BufferOutput, OutputHandlerImpl,
    SharedOutput, StdoutOutput,
};
