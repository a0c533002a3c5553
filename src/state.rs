use std::io::{BufRead, Write};

use color_eyre::Result;

use crate::{
    builtins::{BuiltinCommand, BuiltinCommands, Context},
    config::Config,
    history::HistoryStore,
    input::{self, Input},
    parse::parse_head,
    prelude::*,
    process::{self, pipe::Endpoints, status::StageStatus},
};

/// Outcome of dispatching one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    /// Run the history entry at this offset instead of reading a new line.
    Replay(usize),
    Exit,
}

pub struct State<R, W> {
    pub prompt: String,
    pub history: HistoryStore,
    pub pending: Option<usize>,
    /// Offsets replayed since the last typed line, oldest first.
    pub replay_chain: Vec<usize>,
    pub last_statuses: Vec<StageStatus>,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> State<R, W> {
    pub fn new(config: &Config, input: R, out: W) -> Self {
        Self {
            prompt: config.prompt.clone(),
            history: HistoryStore::with_capacity(config.history_capacity),
            pending: None,
            replay_chain: Vec::new(),
            last_statuses: Vec::new(),
            input,
            out,
        }
    }

    /// The interpreter loop. Returns once `exit` runs or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let input = match self.pending.take() {
                Some(offset) => Input::Replay(offset),
                None => {
                    write!(self.out, "{}", self.prompt)?;
                    self.out.flush()?;

                    match input::read_line(&mut self.input)? {
                        Some(line) => Input::Fresh(line),
                        None => {
                            info!("end of input");
                            break;
                        }
                    }
                }
            };

            let transition = self.accept(input).and_then(|line| self.dispatch(&line));
            self.out.flush()?;

            match transition {
                Ok(Transition::Continue) => {}
                Ok(Transition::Replay(offset)) => self.pending = Some(offset),
                Ok(Transition::Exit) => {
                    info!("exit requested");
                    break;
                }
                Err(err) => {
                    warn!(%err, "command failed");
                    eprintln!("sish: {err}");
                }
            }
        }

        Ok(())
    }

    /// Turns the input into the owned line to run, recording fresh lines.
    pub fn accept(&mut self, input: Input) -> ShellResult<String> {
        match input {
            Input::Replay(offset) => {
                let line = self.history.resolve(offset)?.to_owned();
                self.replay_chain.push(offset);
                debug!(offset, %line, "replaying history entry");
                Ok(line)
            }
            Input::Fresh(line) => {
                self.replay_chain.clear();
                self.history.record(line.as_str());
                Ok(line)
            }
        }
    }

    pub fn dispatch(&mut self, line: &str) -> ShellResult<Transition> {
        if line.trim().is_empty() {
            return Ok(Transition::Continue);
        }

        let head = parse_head(line)?;

        if let Some(builtin) = BuiltinCommands::from_name(head.program()) {
            trace!(builtin = builtin.name(), "dispatching builtin");
            let mut ctx = Context {
                history: &mut self.history,
                out: &mut self.out,
                replayed: &self.replay_chain,
            };
            return builtin.execute(head.args(), &mut ctx);
        }

        let pipeline = head.into_pipeline()?;

        // anything buffered would otherwise interleave with the children's output
        self.out.flush()?;

        self.last_statuses = process::run(&pipeline, Endpoints::inherit())?;

        Ok(Transition::Continue)
    }
}
