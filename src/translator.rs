//! Filtered source to [`Program`].
//!
//! A single left-to-right scan folds runs of repeatable commands, links each
//! `]` to its `[` through a stack of pending opens, and runs the peephole
//! passes after every emitted operation. Structural errors abort the whole
//! translation; no partial program is ever returned.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::TranslateError;
use crate::op::{Command, Op, Program};
use crate::peephole::{self, Peephole, Rewrite};

/// Longest run folded into one operation. Longer runs continue in a new one.
pub const MAX_REPEAT: u8 = u8::MAX;

/// An open bracket waiting for its `]`.
struct Pending {
    index: usize,
    offset: usize,
}

pub struct Translator {
    passes: Vec<Box<dyn Peephole>>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.passes.iter().map(|p| p.name()).collect();
        f.debug_struct("Translator").field("passes", &names).finish()
    }
}

impl Translator {
    /// A translator running the default peephole passes.
    pub fn new() -> Self {
        Self {
            passes: peephole::default_passes(),
        }
    }

    /// A translator with no peephole passes: folding and jump resolution only.
    pub fn bare() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass; it runs after the ones already registered.
    pub fn with_pass<P: Peephole + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Translate already-filtered source. Bytes outside the alphabet are skipped.
    pub fn translate(&self, source: &[u8]) -> Result<Program, TranslateError> {
        let mut ops: Vec<Op> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let offset = pos;
            let Some(command) = Command::from_byte(source[pos]) else {
                pos += 1;
                continue;
            };

            let mut repeat: u8 = 1;
            if command.is_repeatable() {
                while repeat < MAX_REPEAT && source.get(pos + 1) == Some(&source[pos]) {
                    repeat += 1;
                    pos += 1;
                }
            }
            pos += 1;

            let index = ops.len();
            let mut op = Op::new(index, command, repeat);

            match command {
                Command::LoopOpen => pending.push(Pending { index, offset }),
                Command::LoopClose => {
                    let Some(open) = pending.pop() else {
                        return Err(TranslateError::UnmatchedCloseBracket { offset });
                    };
                    op.target = Some(open.index);
                    ops[open.index].target = Some(index);
                }
                _ => {}
            }

            ops.push(op);
            self.optimize_tail(&mut ops);
        }

        if let Some(open) = pending.last() {
            return Err(TranslateError::UnmatchedOpenBracket {
                offset: open.offset,
            });
        }

        info!(source_len = source.len(), ops = ops.len(), "translated program");
        Ok(Program::from_ops(ops))
    }

    fn optimize_tail(&self, ops: &mut Vec<Op>) {
        loop {
            let Some((name, rewrite)) = self.passes.iter().find_map(|pass| {
                let rewrite = pass.rewrite(ops.as_slice())?;
                match check_rewrite(ops.as_slice(), &rewrite) {
                    Ok(()) => Some((pass.name(), rewrite)),
                    Err(reason) => {
                        warn!(pass = pass.name(), reason, "rejected peephole rewrite");
                        None
                    }
                }
            }) else {
                break;
            };

            let start = ops.len() - rewrite.consumed;
            ops.truncate(start);
            for (offset, (command, repeat)) in rewrite.emit.into_iter().enumerate() {
                ops.push(Op::new(start + offset, command, repeat));
            }
            debug!(pass = name, at = start, "peephole rewrite");
        }
    }
}

/// A rewrite is applied only if it shrinks the tail, emits straight-line ops,
/// and every loop op it consumes has its partner inside the consumed window.
fn check_rewrite(ops: &[Op], rewrite: &Rewrite) -> Result<(), &'static str> {
    if rewrite.consumed > ops.len() {
        return Err("consumes more operations than exist");
    }
    if rewrite.emit.len() >= rewrite.consumed {
        return Err("does not shrink the tail");
    }
    if rewrite.emit.iter().any(|&(c, repeat)| c.is_loop() || repeat == 0) {
        return Err("emits a loop or a zero repeat");
    }

    let start = ops.len() - rewrite.consumed;
    // Pending opens have no target yet; closed loops must not reach before `start`.
    let self_contained = ops[start..]
        .iter()
        .filter(|op| op.command.is_loop())
        .all(|op| op.target.is_some_and(|t| t >= start));
    if !self_contained {
        return Err("splits a loop across the window");
    }
    Ok(())
}

/// Translate with the default pass list.
pub fn translate(source: &[u8]) -> Result<Program, TranslateError> {
    Translator::new().translate(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(program: &Program) -> Vec<(char, u8, Option<usize>)> {
        program
            .iter()
            .map(|op| (op.command.symbol(), op.repeat, op.target))
            .collect()
    }

    #[test]
    fn folds_runs_of_repeatable_commands() {
        let program = translate(b"+++>>-<....").unwrap();
        assert_eq!(
            summary(&program),
            vec![
                ('+', 3, None),
                ('>', 2, None),
                ('-', 1, None),
                ('<', 1, None),
                ('.', 4, None),
            ]
        );
    }

    #[test]
    fn never_folds_loops_or_input() {
        let program = translate(b",,[[]]").unwrap();
        assert_eq!(
            summary(&program),
            vec![
                (',', 1, None),
                (',', 1, None),
                ('[', 1, Some(5)),
                ('[', 1, Some(4)),
                (']', 1, Some(3)),
                (']', 1, Some(2)),
            ]
        );
    }

    #[test]
    fn splits_runs_longer_than_max_repeat() {
        let source = vec![b'+'; 300];
        let program = translate(&source).unwrap();
        assert_eq!(summary(&program), vec![('+', 255, None), ('+', 45, None)]);
    }

    #[test]
    fn links_loop_partners_both_ways() {
        let program = translate(b"+[>+<-]").unwrap();
        let open = program.get(1).unwrap();
        let close = program.get(6).unwrap();
        assert_eq!(open.command, Command::LoopOpen);
        assert_eq!(open.target, Some(6));
        assert_eq!(close.command, Command::LoopClose);
        assert_eq!(close.target, Some(1));
    }

    #[test]
    fn zero_idiom_becomes_single_clear() {
        let program = translate(b"[-]").unwrap();
        assert_eq!(summary(&program), vec![('z', 1, None)]);

        let naive = Translator::bare().translate(b"[-]").unwrap();
        assert_eq!(program.len(), naive.len() - 2);
    }

    #[test]
    fn indices_stay_dense_after_rewrite() {
        let program = translate(b"+[-]>[-]+[>]").unwrap();
        for (i, op) in program.iter().enumerate() {
            assert_eq!(op.index, i);
        }
        // `+ z > z + [ > ]`
        assert_eq!(program.len(), 8);
        assert_eq!(program.get(5).unwrap().target, Some(7));
        assert_eq!(program.get(7).unwrap().target, Some(5));
    }

    #[test]
    fn zero_idiom_inside_outer_loop_keeps_outer_links() {
        let program = translate(b"[>[-]<-]").unwrap();
        assert_eq!(
            summary(&program),
            vec![
                ('[', 1, Some(5)),
                ('>', 1, None),
                ('z', 1, None),
                ('<', 1, None),
                ('-', 1, None),
                (']', 1, Some(0)),
            ]
        );
    }

    #[test]
    fn bare_translator_leaves_zero_idiom_alone() {
        let program = Translator::bare().translate(b"[-]").unwrap();
        assert_eq!(
            summary(&program),
            vec![('[', 1, Some(2)), ('-', 1, None), (']', 1, Some(0))]
        );
    }

    #[test]
    fn unmatched_close_reports_its_offset() {
        let err = translate(b"+]").unwrap_err();
        assert!(matches!(err, TranslateError::UnmatchedCloseBracket { offset: 1 }));

        let err = translate(b"]").unwrap_err();
        assert!(matches!(err, TranslateError::UnmatchedCloseBracket { offset: 0 }));
    }

    #[test]
    fn unmatched_open_reports_innermost_offset() {
        let err = translate(b"[").unwrap_err();
        assert!(matches!(err, TranslateError::UnmatchedOpenBracket { offset: 0 }));

        let err = translate(b"[+[").unwrap_err();
        assert!(matches!(err, TranslateError::UnmatchedOpenBracket { offset: 2 }));
    }

    #[test]
    fn empty_source_is_empty_program() {
        assert!(translate(b"").unwrap().is_empty());
    }

    #[test]
    fn custom_passes_run_after_defaults() {
        // Drops a trailing `+-` pair, which is a no-op on the current cell.
        struct CancelIncDec;
        impl Peephole for CancelIncDec {
            fn name(&self) -> &'static str {
                "cancel-inc-dec"
            }
            fn rewrite(&self, ops: &[Op]) -> Option<peephole::Rewrite> {
                let [a, b] = ops.last_chunk::<2>()?;
                (a.command == Command::Increment
                    && b.command == Command::Decrement
                    && a.repeat == b.repeat)
                    .then(|| peephole::Rewrite {
                        consumed: 2,
                        emit: Vec::new(),
                    })
            }
        }

        let translator = Translator::new().with_pass(CancelIncDec);
        let program = translator.translate(b">+-[-]").unwrap();
        assert_eq!(summary(&program), vec![('>', 1, None), ('z', 1, None)]);
    }

    /// Collapses the tail `[`, `+` into `+`, leaving a `]` with no partner.
    struct DropOpen;
    impl Peephole for DropOpen {
        fn name(&self) -> &'static str {
            "drop-open"
        }
        fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
            let [a, b] = ops.last_chunk::<2>()?;
            (a.command == Command::LoopOpen && b.command == Command::Increment).then(|| Rewrite {
                consumed: 2,
                emit: vec![(Command::Increment, 1)],
            })
        }
    }

    /// Always fires and never shrinks anything.
    struct Stuck;
    impl Peephole for Stuck {
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
            let last = ops.last()?;
            Some(Rewrite {
                consumed: 1,
                emit: vec![(last.command, last.repeat)],
            })
        }
    }

    /// Claims more operations than the tail holds.
    struct Greedy;
    impl Peephole for Greedy {
        fn name(&self) -> &'static str {
            "greedy"
        }
        fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
            Some(Rewrite {
                consumed: ops.len() + 5,
                emit: Vec::new(),
            })
        }
    }

    /// Swaps a closed `[+]` for a bare `[`.
    struct EmitsLoop;
    impl Peephole for EmitsLoop {
        fn name(&self) -> &'static str {
            "emits-loop"
        }
        fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
            let [open, _, close] = ops.last_chunk::<3>()?;
            (open.command == Command::LoopOpen && close.command == Command::LoopClose).then(|| Rewrite {
                consumed: 3,
                emit: vec![(Command::LoopOpen, 1)],
            })
        }
    }

    #[test]
    fn rewrite_splitting_a_loop_is_rejected() {
        let program = Translator::bare().with_pass(DropOpen).translate(b"[+]").unwrap();
        assert_eq!(
            summary(&program),
            vec![('[', 1, Some(2)), ('+', 1, None), (']', 1, Some(0))]
        );
    }

    #[test]
    fn rewrite_reaching_before_a_closed_loop_is_rejected() {
        // The window `] +` would cut the `]` off from its `[` at index 0.
        struct EatClose;
        impl Peephole for EatClose {
            fn name(&self) -> &'static str {
                "eat-close"
            }
            fn rewrite(&self, ops: &[Op]) -> Option<Rewrite> {
                let [a, b] = ops.last_chunk::<2>()?;
                (a.command == Command::LoopClose && b.command == Command::Increment).then(|| Rewrite {
                    consumed: 2,
                    emit: vec![(Command::Increment, 1)],
                })
            }
        }

        let program = Translator::bare().with_pass(EatClose).translate(b"[>]+").unwrap();
        assert_eq!(program.get(0).unwrap().target, Some(2));
        assert_eq!(program.get(2).unwrap().target, Some(0));
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn non_shrinking_or_oversized_rewrites_are_rejected() {
        let program = Translator::new().with_pass(Stuck).translate(b"++>[-]").unwrap();
        assert_eq!(summary(&program), vec![('+', 2, None), ('>', 1, None), ('z', 1, None)]);

        let program = Translator::bare().with_pass(Greedy).translate(b"+>").unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn rewrite_emitting_loop_ops_is_rejected() {
        let program = Translator::bare().with_pass(EmitsLoop).translate(b"[+]").unwrap();
        assert_eq!(
            summary(&program),
            vec![('[', 1, Some(2)), ('+', 1, None), (']', 1, Some(0))]
        );
    }

    #[test]
    fn valid_pass_after_a_rejected_one_still_fires() {
        let program = Translator::bare()
            .with_pass(Stuck)
            .with_pass(peephole::ZeroIdiom)
            .translate(b"[-]")
            .unwrap();
        assert_eq!(summary(&program), vec![('z', 1, None)]);
    }
}
