//! Session configuration and command-line parsing.

use std::path::PathBuf;

use kal_diagnostic::emitter::ColorMode;

/// Environment variable that turns on IR printing when set to any
/// non-empty value.
pub const DEBUG_IR_ENV: &str = "KAL_DEBUG_IR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Run every top-level expression and report its value.
    pub execute: bool,
    /// Run the optimizer on generated functions.
    pub optimize: bool,
    /// Print the IR of every unit.
    pub print_ir: bool,
    pub color: ColorMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            execute: true,
            optimize: true,
            print_ir: false,
            color: ColorMode::Auto,
        }
    }
}

impl SessionConfig {
    /// Apply environment overrides, reading variables through `var`.
    #[must_use]
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if var(DEBUG_IR_ENV).is_some_and(|v| !v.is_empty()) {
            self.print_ir = true;
        }
        self
    }
}

/// Parsed command line of the `kal` binary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Source file; `None` starts the REPL.
    pub file: Option<PathBuf>,
    pub config: SessionConfig,
    pub help: bool,
}

pub const USAGE: &str = "\
Usage: kal [file] [options]

Without a file, reads units from standard input.

Options:
  --no-exec                 Generate code but do not run top-level expressions
  --no-opt                  Skip the optimizer
  --emit-ir                 Print the IR of every unit (also: KAL_DEBUG_IR=1)
  --color=<auto|always|never>
  -h, --help                Show this message";

/// Parse `args` (without the program name).
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "--no-exec" => cli.config.execute = false,
            "--no-opt" => cli.config.optimize = false,
            "--emit-ir" => cli.config.print_ir = true,
            "-h" | "--help" => cli.help = true,
            _ => {
                if let Some(mode) = arg.strip_prefix("--color=") {
                    cli.config.color = ColorMode::parse(mode)
                        .ok_or_else(|| format!("invalid color mode `{mode}`"))?;
                } else if arg.starts_with('-') {
                    return Err(format!("unknown option `{arg}`"));
                } else if cli.file.is_none() {
                    cli.file = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("unexpected argument `{arg}`"));
                }
            }
        }
    }
    Ok(cli)
}
