//! Source filtering.
//!
//! Everything outside the eight-symbol command alphabet is a comment. The
//! filter drops it so the translator only ever sees commands.

/// The full command alphabet `+-<>[].,`.
pub const COMMANDS: &[u8] = b"+-<>[].,";

/// Commands that may be run-length folded into a single operation.
pub const REPEATABLE: &[u8] = b"+-<>.";

/// Whether `byte` belongs to the command alphabet.
pub fn is_command(byte: u8) -> bool {
    COMMANDS.contains(&byte)
}

/// Whether `byte` is a command that may be folded with its identical neighbours.
pub fn is_repeatable(byte: u8) -> bool {
    REPEATABLE.contains(&byte)
}

/// Keep only command bytes, preserving their order.
pub fn filter(source: &[u8]) -> Vec<u8> {
    source.iter().copied().filter(|&b| is_command(b)).collect()
}
