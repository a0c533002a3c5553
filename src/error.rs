use std::io;

use nix::errno::Errno;
use thiserror::Error;

use crate::{history::HistoryError, parse::ParseError};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("cd: {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: Errno,
    },
    #[error("{what}: {source}")]
    ResourceExhausted {
        what: &'static str,
        #[source]
        source: Errno,
    },
    #[error("{program}: {source}")]
    ExecFailed {
        program: String,
        #[source]
        source: Errno,
    },
    #[error("waitpid: {0}")]
    Wait(#[source] Errno),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
