//! Translated operations and the immutable [`Program`] they form.

use std::fmt;

use crate::filter;

/// One command of the language, plus the synthetic [`Command::Clear`]
/// introduced by peephole optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `+`: add to the current cell.
    Increment,
    /// `-`: subtract from the current cell.
    Decrement,
    /// `<`: move the memory pointer left.
    MoveLeft,
    /// `>`: move the memory pointer right.
    MoveRight,
    /// `[`: jump past the matching `]` if the current cell is zero.
    LoopOpen,
    /// `]`: jump back past the matching `[` if the current cell is non-zero.
    LoopClose,
    /// `.`: write the current cell to the output.
    Output,
    /// `,`: read one byte of input into the current cell.
    Input,
    /// Synthetic: set the current cell to zero.
    Clear,
}

impl Command {
    /// Decode a source byte. Returns `None` for bytes outside the alphabet.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'+' => Command::Increment,
            b'-' => Command::Decrement,
            b'<' => Command::MoveLeft,
            b'>' => Command::MoveRight,
            b'[' => Command::LoopOpen,
            b']' => Command::LoopClose,
            b'.' => Command::Output,
            b',' => Command::Input,
            _ => return None,
        })
    }

    /// The symbol shown in listings. `Clear` has no source form and shows as `z`.
    pub fn symbol(self) -> char {
        match self {
            Command::Increment => '+',
            Command::Decrement => '-',
            Command::MoveLeft => '<',
            Command::MoveRight => '>',
            Command::LoopOpen => '[',
            Command::LoopClose => ']',
            Command::Output => '.',
            Command::Input => ',',
            Command::Clear => 'z',
        }
    }

    /// Whether runs of this command are folded into one operation.
    pub fn is_repeatable(self) -> bool {
        self != Command::Clear && filter::is_repeatable(self.symbol() as u8)
    }

    pub fn is_loop(self) -> bool {
        matches!(self, Command::LoopOpen | Command::LoopClose)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single IR instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Op {
    /// Dense, zero-based position in the final program.
    pub index: usize,
    pub command: Command,
    /// Number of folded source commands. Always 1 for loops, input and clear.
    pub repeat: u8,
    /// Index of the matching partner; only loop operations carry one.
    pub target: Option<usize>,
}

impl Op {
    pub fn new(index: usize, command: Command, repeat: u8) -> Self {
        Self {
            index,
            command,
            repeat,
            target: None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{BFOP-{:05} cmd={} repeat={} target=",
            self.index, self.command, self.repeat
        )?;
        match self.target {
            Some(target) => write!(f, "{target}}}"),
            None => write!(f, "-}}"),
        }
    }
}

/// An ordered, immutable sequence of operations with contiguous indices.
///
/// Only the translator builds programs, and it rejects peephole rewrites that
/// would split a loop, so every `Program` in hand has matched, cross-linked
/// loops: each loop op carries `Some(target)` naming its partner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
}

impl Program {
    pub(crate) fn from_ops(ops: Vec<Op>) -> Self {
        debug_assert!(ops.iter().enumerate().all(|(i, op)| op.index == i));
        Self { ops }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn get(&self, index: usize) -> Option<&Op> {
        self.ops.get(index)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Human-readable listing, one tab-indented record per operation.
    ///
    /// Not a stable wire format, but deterministic.
    pub fn listing(&self) -> Listing<'_> {
        Listing { program: self }
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// [`Display`](fmt::Display) adapter returned by [`Program::listing`].
pub struct Listing<'a> {
    program: &'a Program,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.program {
            writeln!(f, "\t{op}")?;
        }
        Ok(())
    }
}
