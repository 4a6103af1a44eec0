//! The virtual machine that executes a translated [`Program`].
//!
//! Behavior:
//! - Memory is a circular tape of [`MEMORY_SIZE`] cells, all starting at 0.
//! - Cells wrap modulo 256; the memory pointer wraps modulo [`MEMORY_SIZE`].
//! - `,` reads exactly one byte; what happens at end of input is decided by
//!   the [`EofPolicy`].
//! - `.` writes the current cell `repeat` times and flushes, so output appears
//!   as it is produced.
//! - There is no step limit: a program that loops forever runs forever.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::op::{Command, Op, Program};

/// Number of cells on the tape.
pub const MEMORY_SIZE: usize = 3000;

/// What `,` does once the input source is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Store 0 in the current cell and continue.
    #[default]
    Zero,
    /// Leave the current cell as it is and continue.
    Unchanged,
    /// Stop with [`RuntimeError::InputExhausted`].
    Error,
}

impl EofPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            EofPolicy::Zero => "zero",
            EofPolicy::Unchanged => "unchanged",
            EofPolicy::Error => "error",
        }
    }
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown EOF policy '{0}' (expected zero, unchanged or error)")]
pub struct ParseEofPolicyError(String);

impl FromStr for EofPolicy {
    type Err = ParseEofPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofPolicy::Zero),
            "unchanged" | "keep" => Ok(EofPolicy::Unchanged),
            "error" => Ok(EofPolicy::Error),
            _ => Err(ParseEofPolicyError(s.to_string())),
        }
    }
}

/// Fixed-size circular byte memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.cells.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
        f.debug_struct("Memory")
            .field("nonzero_prefix", &&self.cells[..used])
            .finish()
    }
}

impl Memory {
    /// Cell at `ptr`, wrapped into range.
    pub fn get(&self, ptr: usize) -> u8 {
        self.cells[ptr % MEMORY_SIZE]
    }

    pub fn set(&mut self, ptr: usize, value: u8) {
        self.cells[ptr % MEMORY_SIZE] = value;
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// Machine state for one execution. Returned by [`Interpreter::run`] so the
/// caller can inspect where the program left things.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Machine {
    memory: Memory,
    ip: usize,
    ptr: usize,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the memory pointer at `ptr` (wrapped into range).
    pub fn with_pointer(ptr: usize) -> Self {
        Self {
            ptr: ptr % MEMORY_SIZE,
            ..Self::default()
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn pointer(&self) -> usize {
        self.ptr
    }

    /// Value of the cell under the memory pointer.
    pub fn current(&self) -> u8 {
        self.memory.get(self.ptr)
    }

    fn set_current(&mut self, value: u8) {
        self.memory.set(self.ptr, value);
    }

    pub fn add(&mut self, count: u8) {
        self.set_current(self.current().wrapping_add(count));
    }

    pub fn sub(&mut self, count: u8) {
        self.set_current(self.current().wrapping_sub(count));
    }

    pub fn move_right(&mut self, count: usize) {
        self.ptr = (self.ptr + count % MEMORY_SIZE) % MEMORY_SIZE;
    }

    pub fn move_left(&mut self, count: usize) {
        self.ptr = (self.ptr + MEMORY_SIZE - count % MEMORY_SIZE) % MEMORY_SIZE;
    }

    /// Execute `op` and advance the instruction pointer.
    fn step<R: Read, W: Write>(
        &mut self,
        op: &Op,
        input: &mut R,
        output: &mut W,
        eof: EofPolicy,
    ) -> Result<(), RuntimeError> {
        match op.command {
            Command::Increment => self.add(op.repeat),
            Command::Decrement => self.sub(op.repeat),
            Command::MoveRight => self.move_right(usize::from(op.repeat)),
            Command::MoveLeft => self.move_left(usize::from(op.repeat)),
            Command::Output => {
                let run = [self.current(); u8::MAX as usize];
                output
                    .write_all(&run[..usize::from(op.repeat)])
                    .and_then(|()| output.flush())
                    .map_err(|source| RuntimeError::Output { ip: self.ip, source })?;
            }
            Command::Input => {
                // Prompts written so far must be visible before we block.
                output
                    .flush()
                    .map_err(|source| RuntimeError::Output { ip: self.ip, source })?;
                match read_byte(input).map_err(|source| RuntimeError::Input { ip: self.ip, source })? {
                    Some(b) => self.set_current(b),
                    None => {
                        debug!(ip = self.ip, policy = %eof, "input exhausted");
                        match eof {
                            EofPolicy::Zero => self.set_current(0),
                            EofPolicy::Unchanged => {}
                            EofPolicy::Error => {
                                return Err(RuntimeError::InputExhausted { ip: self.ip });
                            }
                        }
                    }
                }
            }
            Command::LoopOpen => {
                if self.current() == 0 {
                    self.ip = op.target.expect("Program loops are cross-linked");
                }
            }
            Command::LoopClose => {
                if self.current() != 0 {
                    self.ip = op.target.expect("Program loops are cross-linked");
                }
            }
            Command::Clear => self.set_current(0),
        }

        // Jump targets hold the partner's own index, so this lands one past it.
        self.ip += 1;
        Ok(())
    }
}

/// Read exactly one byte, retrying interrupted reads. `None` means end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Executes a [`Program`] with a fresh [`Machine`] per run.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: Program,
    eof: EofPolicy,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            eof: EofPolicy::default(),
        }
    }

    pub fn with_eof_policy(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn eof_policy(&self) -> EofPolicy {
        self.eof
    }

    /// Run until the instruction pointer falls off the end of the program.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W) -> Result<Machine, RuntimeError> {
        self.run_on(Machine::new(), input, output)
    }

    /// Run starting from an existing machine state. The instruction pointer is
    /// reset to 0; memory and memory pointer are kept.
    pub fn run_on<R: Read, W: Write>(
        &self,
        mut machine: Machine,
        mut input: R,
        mut output: W,
    ) -> Result<Machine, RuntimeError> {
        machine.ip = 0;
        while let Some(op) = self.program.get(machine.ip) {
            trace!(
                ip = machine.ip,
                ptr = machine.ptr,
                cell = machine.current(),
                op = %op,
                "step"
            );
            machine.step(op, &mut input, &mut output, self.eof)?;
        }
        Ok(machine)
    }
}
