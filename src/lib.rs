//! A Brainfuck translator and virtual machine.
//!
//! Programs go through a two-phase pipeline:
//!
//! 1. [`filter`] drops every byte outside `+-<>[].,`.
//! 2. The [`Translator`] folds runs of repeatable commands (`+-<>.`) into one
//!    operation with a repeat count, links every `[` with its `]` through a
//!    back-patch stack, and runs a list of peephole passes (by default only the
//!    `[-]` to clear rewrite). Unbalanced brackets abort translation.
//! 3. The [`Interpreter`] executes the resulting [`Program`] on a circular tape
//!    of 3,000 wrapping byte cells.
//!
//! Translation always finishes before execution starts, so a malformed
//! program never produces any output.
//!
//! Quick start:
//!
//! ```no_run
//! use std::io;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let machine = gbf::run(code, io::stdin(), io::stdout(), gbf::EofPolicy::Zero)
//!     .expect("program should run");
//! println!("pointer ended at {}", machine.pointer());
//! ```

pub mod error;
pub mod filter;
pub mod interpreter;
pub mod op;
pub mod peephole;
pub mod translator;

use std::io::{Read, Write};

pub use error::{Error, RuntimeError, TranslateError};
pub use filter::{filter, is_command, COMMANDS, REPEATABLE};
pub use interpreter::{EofPolicy, Interpreter, Machine, Memory, MEMORY_SIZE};
pub use op::{Command, Op, Program};
pub use peephole::{Peephole, Rewrite, ZeroIdiom};
pub use translator::{translate, Translator, MAX_REPEAT};

/// Filter, translate and execute `source`.
///
/// Translation errors are returned before anything is read from `input` or
/// written to `output`.
pub fn run<R: Read, W: Write>(
    source: &[u8],
    input: R,
    output: W,
    eof: EofPolicy,
) -> Result<Machine, Error> {
    let program = translate(&filter(source))?;
    let machine = Interpreter::new(program)
        .with_eof_policy(eof)
        .run(input, output)?;
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn run_filters_comments_before_translating() {
        let mut out = Vec::new();
        let source = b"ten: ++++++++++ [ loop: > +++++++ < - ] > -----.";
        run(source, io::empty(), &mut out, EofPolicy::Zero).unwrap();
        assert_eq!(out, b"A");
    }

    #[test]
    fn unmatched_close_never_executes() {
        let mut out = Vec::new();
        let err = run(b"+.]", io::empty(), &mut out, EofPolicy::Zero).unwrap_err();
        assert!(matches!(
            err,
            Error::Translate(TranslateError::UnmatchedCloseBracket { offset: 2 })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn unmatched_open_never_executes() {
        let mut out = Vec::new();
        let mut input = Cursor::new(b"x".to_vec());
        let err = run(b",.[", &mut input, &mut out, EofPolicy::Zero).unwrap_err();
        assert!(matches!(
            err,
            Error::Translate(TranslateError::UnmatchedOpenBracket { offset: 2 })
        ));
        assert!(out.is_empty());
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn runtime_errors_surface_as_runtime_domain() {
        let err = run(b",", io::empty(), io::sink(), EofPolicy::Error).unwrap_err();
        assert!(matches!(err, Error::Runtime(RuntimeError::InputExhausted { ip: 0 })));
    }
}
