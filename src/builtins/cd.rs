use super::{BuiltinCommand, Context};
use crate::prelude::*;

#[derive(Default)]
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> ShellResult<Transition> {
        trace!("executing cd builtin: {args:?}");

        let path = args
            .first()
            .ok_or_else(|| ShellError::InvalidArgument("cd: missing operand".into()))?;

        nix::unistd::chdir(*path).map_err(|source| ShellError::Directory {
            path: path.to_string(),
            source,
        })?;

        debug!("cd: now in {path}");

        Ok(Transition::Continue)
    }
}
