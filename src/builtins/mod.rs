use std::io::Write;

use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};

use crate::{history::HistoryStore, prelude::*};

pub mod cd;
pub mod exit;
pub mod history;

/// What a built-in may touch while it runs inside the interpreter.
pub struct Context<'a> {
    pub history: &'a mut HistoryStore,
    pub out: &'a mut dyn Write,
    /// History offsets already replayed since the last typed line.
    pub replayed: &'a [usize],
}

#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Transition>;
}

#[enum_dispatch]
#[derive(EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Exit(exit::Exit),
    History(history::History),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}
