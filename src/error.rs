//! Error types for the two failure domains: translation and execution.

use std::io;

/// Structural problems found while translating. Both abort translation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TranslateError {
    /// A `]` appeared with no pending `[`.
    #[error("unmatched ']' at offset {offset}")]
    UnmatchedCloseBracket { offset: usize },

    /// The source ended while a `[` was still open; `offset` is the innermost one.
    #[error("unmatched '[' at offset {offset}")]
    UnmatchedOpenBracket { offset: usize },
}

impl TranslateError {
    /// Position of the offending bracket in the translated source.
    pub fn offset(&self) -> usize {
        match self {
            TranslateError::UnmatchedCloseBracket { offset }
            | TranslateError::UnmatchedOpenBracket { offset } => *offset,
        }
    }
}

/// Environment failures while executing. Cell and pointer arithmetic never fail.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to read input at instruction {ip}: {source}")]
    Input {
        ip: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output at instruction {ip}: {source}")]
    Output {
        ip: usize,
        #[source]
        source: io::Error,
    },

    /// Input ran out and the EOF policy is `error`.
    #[error("input exhausted at instruction {ip}")]
    InputExhausted { ip: usize },
}

impl RuntimeError {
    /// Index of the operation that failed.
    pub fn ip(&self) -> usize {
        match self {
            RuntimeError::Input { ip, .. }
            | RuntimeError::Output { ip, .. }
            | RuntimeError::InputExhausted { ip } => *ip,
        }
    }
}

/// Any failure of the full filter, translate and run pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
