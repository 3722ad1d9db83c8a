use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{BfError, Instruction};

pub const ENV_LOG: &str = "BFRUN_LOG";

/// Initialize logging to stderr.
///
/// Use the `BFRUN_LOG` environment variable to override the default filter,
/// which is `warn` so that a clean run leaves stderr empty.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Print a structured [`BfError`] to stderr with source location and a caret.
///
/// `origin` names the source in the location, e.g. the program's file path.
pub fn print_run_error(origin: &str, source: &str, err: &BfError) {
    let color = io::stderr().is_terminal();
    eprint!("{}", render_error(origin, source, err, color));
    let _ = io::stderr().flush();
}

/// Build the message printed by [`print_run_error`].
pub fn render_error(origin: &str, source: &str, err: &BfError, color: bool) -> String {
    let label = match err {
        BfError::UnmatchedLoopStart { .. } => "Parse error: unmatched '['".to_string(),
        BfError::UnmatchedLoopEnd { .. } => "Runtime error: unmatched ']'".to_string(),
        BfError::PointerOutOfRange { ptr, .. } => {
            format!("Runtime error: pointer out of range (ptr={ptr})")
        }
        BfError::Io { source, .. } => format!("I/O error: {source}"),
        BfError::TapeAllocation { len } => {
            format!("Error: cannot allocate a tape of {len} cells")
        }
    };
    let label = if color {
        Color::Red.bold().paint(label).to_string()
    } else {
        label
    };

    let located = err
        .instruction()
        .and_then(|ip| instruction_source_offset(source, ip).map(|offset| (ip, offset)));
    let Some((ip, offset)) = located else {
        return format!("{label}\n");
    };

    let (line, col) = line_col(source, offset);
    let mut out = format!("{label} at {origin}:{line}:{col} (instruction {ip})\n");
    if let Some(text) = source.lines().nth(line - 1) {
        out.push_str(&context_window(text, col - 1));
    }
    out
}

/// Char offset in `source` of the instruction with address `ip`.
///
/// Addresses count instruction characters only, so this walks the raw source
/// skipping everything the preprocessor would drop.
pub fn instruction_source_offset(source: &str, ip: usize) -> Option<usize> {
    source
        .chars()
        .enumerate()
        .filter(|(_, c)| Instruction::from_char(*c).is_some())
        .nth(ip)
        .map(|(offset, _)| offset)
}

/// 1-based line and column of a char offset.
pub fn line_col(source: &str, char_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for c in source.chars().take(char_offset) {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// A short slice of `line` around char column `col` (0-based) with a caret under it.
fn context_window(line: &str, col: usize) -> String {
    const WINDOW_CHARS: usize = 32;

    let start = col.saturating_sub(WINDOW_CHARS);
    let slice: String = line
        .trim_end_matches('\r')
        .chars()
        .skip(start)
        .take(col - start + WINDOW_CHARS + 1)
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();

    let caret = " ".repeat(col - start);
    format!("  {slice}\n  {caret}^\n")
}
