//! `kal`: run a Kal source file, or read units interactively.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::Path;

use inkwell::context::Context;
use kal_backend::stdout_handler;
use kal_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use kalc::{init_tracing, parse_args, LineBuffer, Session, USAGE};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    if cli.help {
        eprintln!("{USAGE}");
        return;
    }

    init_tracing();

    let config = cli.config.with_env(|key| std::env::var(key).ok());
    let emitter =
        TerminalEmitter::with_color_mode(io::stderr(), config.color, io::stderr().is_terminal());
    let context = Context::create();
    let mut session = match Session::new(&context, config, emitter, stdout_handler()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let ok = match &cli.file {
        Some(path) => run_file(&mut session, path),
        None if !io::stdin().is_terminal() => run_piped(&mut session),
        None => run_repl(&mut session),
    };

    let errors = session.error_count();
    if errors > 0 {
        session.emitter_mut().emit_summary(errors);
    }
    if !ok || (cli.file.is_some() && errors > 0) {
        std::process::exit(1);
    }
}

fn run_file<E: DiagnosticEmitter>(session: &mut Session<'_, E>, path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            session.process_source(&source);
            true
        }
        Err(e) => {
            eprintln!("error: cannot read '{}': {e}", path.display());
            false
        }
    }
}

/// Standard input from a pipe or file is one source, like a file argument.
fn run_piped<E: DiagnosticEmitter>(session: &mut Session<'_, E>) -> bool {
    let mut source = String::new();
    match io::stdin().read_to_string(&mut source) {
        Ok(_) => {
            session.process_source(&source);
            true
        }
        Err(e) => {
            eprintln!("error: {e}");
            false
        }
    }
}

/// Reads the terminal line by line, holding back a unit until it is whole.
fn run_repl<E: DiagnosticEmitter>(session: &mut Session<'_, E>) -> bool {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut lines = LineBuffer::new();
    let mut line = String::new();
    loop {
        eprint!("{}", lines.prompt());
        let _ = io::stderr().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                if let Some(rest) = lines.finish() {
                    session.process_source(&rest);
                }
                eprintln!();
                return true;
            }
            Ok(_) => {
                if let Some(source) = lines.push(session, &line) {
                    session.process_source(&source);
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                return false;
            }
        }
    }
}
