//! Peephole passes applied by the translator while it emits operations.
//!
//! After every append the translator offers the operations emitted so far to
//! each pass, in list order, until none of them fires. A pass only ever looks
//! at the tail of the sequence.

use crate::op::{Command, Op};

/// Replace the last `consumed` operations with `emit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub consumed: usize,
    /// Replacement commands with their repeat counts, in order.
    pub emit: Vec<(Command, u8)>,
}

/// A tail rewrite over the operation sequence.
///
/// Rules a pass must follow:
/// - every loop bracket in the consumed window is matched inside that window;
/// - `emit` contains no loop operations;
/// - `emit.len() < consumed`, so repeated application terminates.
///
/// The translator checks these before applying a rewrite and skips (with a
/// warning) any that breaks them.
pub trait Peephole {
    fn name(&self) -> &'static str;

    fn rewrite(&self, ops: &[Op]) -> Option<Rewrite>;
}

/// `[-]` decrements until zero, which always terminates because cells wrap,
/// so it is the same as clearing the cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroIdiom;

impl Peephole for ZeroIdiom {
    fn name(&self) -> &'static str {
        "zero-idiom"
    }

    fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
        let [open, body, close] = ops.last_chunk::<3>()?;
        let matches = open.command == Command::LoopOpen
            && body.command == Command::Decrement
            && body.repeat == 1
            && close.command == Command::LoopClose;

        matches.then(|| Rewrite {
            consumed: 3,
            emit: vec![(Command::Clear, 1)],
        })
    }
}

/// The passes a default translator runs.
pub fn default_passes() -> Vec<Box<dyn Peephole>> {
    vec![Box::new(ZeroIdiom)]
}
