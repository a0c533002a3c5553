use super::{BuiltinCommand, Context};
use crate::prelude::*;

#[derive(Default)]
pub struct History;

impl BuiltinCommand for History {
    fn name(&self) -> &'static str {
        "history"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Transition> {
        match args.first().copied() {
            None => {
                for (index, line) in ctx.history.list() {
                    writeln!(ctx.out, "{index} {line}")?;
                }
            }
            Some("-c") => {
                debug!(cleared = ctx.history.len(), "clearing history");
                ctx.history.clear();
            }
            Some(arg) => {
                let offset = parse_offset(arg)?;
                ctx.history.resolve(offset)?;

                // nothing is recorded while replaying, so a revisit would never end
                if ctx.replayed.contains(&offset) {
                    return Err(ShellError::InvalidArgument(format!(
                        "history: {offset}: replay cycle"
                    )));
                }

                trace!(offset, "scheduling history replay");
                return Ok(Transition::Replay(offset));
            }
        }

        Ok(Transition::Continue)
    }
}

fn parse_offset(arg: &str) -> ShellResult<usize> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ShellError::InvalidArgument(format!(
            "history: {arg}: invalid offset"
        )));
    }

    arg.parse()
        .map_err(|_| ShellError::InvalidArgument(format!("history: {arg}: offset too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryError, HistoryStore};

    fn run(
        history: &mut HistoryStore,
        args: &[&str],
        replayed: &[usize],
    ) -> (ShellResult<Transition>, String) {
        let mut out = Vec::new();
        let result = History.execute(
            args,
            &mut Context {
                history,
                out: &mut out,
                replayed,
            },
        );
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn lists_with_chronological_indices() {
        let mut history = HistoryStore::with_capacity(2);
        for line in ["ls", "pwd", "echo hi"] {
            history.record(line);
        }

        let (result, out) = run(&mut history, &[], &[]);
        assert!(matches!(result, Ok(Transition::Continue)));
        assert_eq!(out, "0 pwd\n1 echo hi\n");
    }

    #[test]
    fn clear_then_list_prints_nothing() {
        let mut history = HistoryStore::default();
        history.record("ls");
        history.record("history -c");

        let (result, _) = run(&mut history, &["-c"], &[]);
        assert!(matches!(result, Ok(Transition::Continue)));

        let (_, out) = run(&mut history, &[], &[]);
        assert_eq!(out, "");
    }

    #[test]
    fn replay_of_a_retained_offset() {
        let mut history = HistoryStore::default();
        history.record("echo a");
        history.record("echo b");

        let (result, out) = run(&mut history, &["1"], &[]);
        assert!(matches!(result, Ok(Transition::Replay(1))));
        assert_eq!(out, "");
    }

    #[test]
    fn offset_on_empty_history_is_out_of_range() {
        let mut history = HistoryStore::default();

        let (result, _) = run(&mut history, &["0"], &[]);
        assert!(matches!(
            result,
            Err(ShellError::History(HistoryError::OutOfRange {
                offset: 0,
                retained: 0
            }))
        ));
    }

    #[test]
    fn rejects_non_numeric_offsets() {
        let mut history = HistoryStore::default();
        history.record("ls");

        for arg in ["-1", "abc", "+0", "1x", "99999999999999999999999"] {
            let (result, _) = run(&mut history, &[arg], &[]);
            assert!(
                matches!(result, Err(ShellError::InvalidArgument(_))),
                "{arg}"
            );
        }
    }

    #[test]
    fn replay_may_chain_to_another_offset() {
        let mut history = HistoryStore::default();
        history.record("echo x");
        history.record("history 0");

        let (result, _) = run(&mut history, &["0"], &[1]);
        assert!(matches!(result, Ok(Transition::Replay(0))));
    }

    #[test]
    fn revisiting_an_offset_is_a_cycle() {
        let mut history = HistoryStore::default();
        history.record("history 0");

        let (result, _) = run(&mut history, &["0"], &[0]);
        assert!(matches!(
            result,
            Err(ShellError::InvalidArgument(msg)) if msg == "history: 0: replay cycle"
        ));
    }
}
