use std::fs;
use std::io::{self, Write};

use gbf::{RuntimeError, TranslateError};
use nu_ansi_term::Color;

/// Where program text comes from: positional code parts or a file.
pub enum Source {
    Inline(String),
    File(String),
}

impl Source {
    /// Pick the source from the parsed args; `None` means the combination is invalid
    /// (neither given, or both given).
    pub fn from_args(file: Option<String>, code: Vec<String>) -> Option<Self> {
        match (file, code.is_empty()) {
            (Some(path), true) => Some(Source::File(path)),
            (None, false) => Some(Source::Inline(code.join(""))),
            _ => None,
        }
    }

    pub fn load(&self) -> io::Result<Vec<u8>> {
        match self {
            Source::Inline(code) => Ok(code.clone().into_bytes()),
            Source::File(path) => fs::read(path),
        }
    }
}

/// Print a translation error with a caret under the offending bracket in the
/// filtered program. If `program` is `Some("gbf")`, prefix messages with "gbf: ...".
pub fn print_translate_error(program: Option<&str>, filtered: &[u8], err: &TranslateError, color: bool) {
    let msg = match err {
        TranslateError::UnmatchedCloseBracket { .. } => "Translation error: unmatched ']'",
        TranslateError::UnmatchedOpenBracket { .. } => "Translation error: unmatched '['",
    };
    let msg = prefix_program(program, msg);
    let msg = if color { Color::Red.bold().paint(msg).to_string() } else { msg };
    print_error_with_context(&msg, filtered, err.offset());
}

pub fn print_runtime_error(program: Option<&str>, err: &RuntimeError, color: bool) {
    let msg = prefix_program(program, &format!("Runtime error: {err}"));
    let msg = if color { Color::Red.bold().paint(msg).to_string() } else { msg };
    eprintln!("{msg}");
    let _ = io::stderr().flush();
}

fn prefix_program(program: Option<&str>, msg: &str) -> String {
    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    }
}

/// Print a concise error with the command offset and a caret context window.
/// `code` is filtered source, so every byte is one ASCII command.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{prefix} at command {pos}");

    // Show a short window around the position for context
    const WINDOW: usize = 32;

    let start = pos.saturating_sub(WINDOW);
    let end = (pos + WINDOW + 1).min(code.len());
    let slice = String::from_utf8_lossy(&code[start.min(end)..end]);

    eprintln!("  {slice}");

    // Caret under the exact position
    let caret = " ".repeat(pos - start.min(pos));
    eprintln!("  {caret}^");
    let _ = io::stderr().flush();
}
