//! Where programs write their output.
//!
//! Host functions such as `putchard` and `printd` print through an output
//! handler so the driver can send output to stdout while tests capture it.
//! Enum dispatch keeps the hot print path free of vtable calls.

use std::sync::Arc;

use parking_lot::Mutex;

/// Writes straight to stdout.
#[derive(Default)]
pub struct StdoutOutput;

impl StdoutOutput {
    pub fn print(&self, msg: &str) {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        // A closed stdout is not the program's problem.
        let _ = out.write_all(msg.as_bytes());
        let _ = out.flush();
    }
}

/// Captures everything in memory.
#[derive(Default)]
pub struct BufferOutput {
    buffer: Mutex<String>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

pub enum OutputHandlerImpl {
    /// Writes to stdout (default).
    Stdout(StdoutOutput),
    /// Captures to a buffer (tests).
    Buffer(BufferOutput),
    /// Discards everything.
    Silent,
}

impl OutputHandlerImpl {
    /// Print without newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.print(msg),
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(h) => {
                h.print(msg);
                h.print("\n");
            }
            Self::Buffer(h) => {
                h.print(msg);
                h.print("\n");
            }
            Self::Silent => {}
        }
    }

    /// Captured output. Empty for handlers that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Output handler shared between the engine and whoever reads the output.
pub type SharedOutput = Arc<OutputHandlerImpl>;

pub fn stdout_handler() -> SharedOutput {
    Arc::new(OutputHandlerImpl::Stdout(StdoutOutput))
}

pub fn buffer_handler() -> SharedOutput {
    Arc::new(OutputHandlerImpl::Buffer(BufferOutput::new()))
}

pub fn silent_handler() -> SharedOutput {
    Arc::new(OutputHandlerImpl::Silent)
}
