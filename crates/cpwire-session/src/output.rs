//! Where solver log, warning and error text is printed.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;

/// Receives the solver's human-readable output.
///
/// Printing is independent of callbacks: a session prints every log,
/// warning and error line (unless `print_log` is off) and also hands it to
/// the matching callback.
pub trait OutputSink: Send + Sync {
    fn log(&self, text: &str);
    fn warning(&self, text: &str);
    fn error(&self, text: &str);
}

/// Prints log lines to stdout and warnings and errors to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    colors: bool,
}

impl ConsoleOutput {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// Colors when stdout is a terminal.
    pub fn detect() -> Self {
        Self::new(io::stdout().is_terminal())
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::detect()
    }
}

impl OutputSink for ConsoleOutput {
    fn log(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{text}");
        if !text.ends_with('\n') {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    fn warning(&self, text: &str) {
        let line = format!("Warning: {text}");
        if self.colors {
            let _ = writeln!(io::stderr(), "{}", line.yellow());
        } else {
            let _ = writeln!(io::stderr(), "{line}");
        }
    }

    fn error(&self, text: &str) {
        let line = format!("Error: {text}");
        if self.colors {
            let _ = writeln!(io::stderr(), "{}", line.bright_red().bold());
        } else {
            let _ = writeln!(io::stderr(), "{line}");
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl OutputSink for NullOutput {
    fn log(&self, _text: &str) {}
    fn warning(&self, _text: &str) {}
    fn error(&self, _text: &str) {}
}
