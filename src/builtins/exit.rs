use super::{BuiltinCommand, Context};
use crate::prelude::*;

#[derive(Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> ShellResult<Transition> {
        if !args.is_empty() {
            debug!(?args, "ignoring exit arguments");
        }

        Ok(Transition::Exit)
    }
}
