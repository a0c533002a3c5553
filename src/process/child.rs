use std::{
    ffi::CString,
    io::{self, Write},
};

use nix::{errno::Errno, libc, unistd::execvp};

use super::pipe::Wiring;
use crate::prelude::*;

const EXIT_NOT_FOUND: i32 = 127;
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Body of a freshly forked stage. Never returns into the interpreter: the
/// process image is replaced, or the child exits with 127/126.
pub fn exec_stage(stage: usize, wiring: &Wiring, argv: &[CString]) -> ! {
    let err = match wiring.bind(stage) {
        Ok(()) => match execvp(&argv[0], argv) {
            Ok(never) => match never {},
            Err(source) => ShellError::ExecFailed {
                program: argv[0].to_string_lossy().into_owned(),
                source,
            },
        },
        Err(source) => ShellError::ResourceExhausted {
            what: "dup2",
            source,
        },
    };

    let _ = writeln!(io::stderr(), "sish: {err}");
    // SAFETY: _exit skips atexit handlers and buffered stdio that belong to the parent
    unsafe { libc::_exit(exit_code(&err)) }
}

fn exit_code(err: &ShellError) -> i32 {
    match err {
        ShellError::ExecFailed {
            source: Errno::ENOENT,
            ..
        } => EXIT_NOT_FOUND,
        _ => EXIT_NOT_EXECUTABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_exits_127() {
        let err = ShellError::ExecFailed {
            program: "nope".into(),
            source: Errno::ENOENT,
        };
        assert_eq!(exit_code(&err), 127);
        assert_eq!(err.to_string(), "nope: ENOENT: No such file or directory");
    }

    #[test]
    fn other_failures_exit_126() {
        let err = ShellError::ExecFailed {
            program: "/etc".into(),
            source: Errno::EACCES,
        };
        assert_eq!(exit_code(&err), 126);

        let err = ShellError::ResourceExhausted {
            what: "dup2",
            source: Errno::EBADF,
        };
        assert_eq!(exit_code(&err), 126);
    }
}
