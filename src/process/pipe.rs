use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::{
    fcntl::{fcntl, FcntlArg, FdFlag, OFlag},
    libc,
    unistd::{self, dup2, pipe2},
};

use super::syscall;
use crate::prelude::*;

/// Descriptors that replace the interpreter's own stdin and stdout at the
/// two ends of a pipeline. `None` means the stage inherits the interpreter's.
#[derive(Debug, Default)]
pub struct Endpoints {
    pub input: Option<OwnedFd>,
    pub output: Option<OwnedFd>,
}

impl Endpoints {
    pub fn inherit() -> Self {
        Self::default()
    }
}

/// The pipe between stage `i` (writer) and stage `i + 1` (reader).
#[derive(Debug)]
pub struct PipeLink {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl PipeLink {
    pub fn open() -> nix::Result<Self> {
        // close-on-exec so a child forked elsewhere never keeps a pipe end alive
        let (read, write) = syscall(|| pipe2(OFlag::O_CLOEXEC))?;

        // SAFETY: both descriptors were just returned by pipe2 and nothing else owns them
        unsafe {
            Ok(Self {
                read: OwnedFd::from_raw_fd(read),
                write: OwnedFd::from_raw_fd(write),
            })
        }
    }
}

/// Every descriptor a pipeline of `stages` processes needs, created up front.
///
/// Dropping the wiring closes all of them, which is what the parent does once
/// the children are started.
#[derive(Debug)]
pub struct Wiring {
    links: Vec<PipeLink>,
    endpoints: Endpoints,
}

impl Wiring {
    pub fn allocate(stages: usize, endpoints: Endpoints) -> ShellResult<Self> {
        // a failed pipe drops the links opened before it
        let links = (1..stages)
            .map(|_| PipeLink::open())
            .collect::<nix::Result<Vec<_>>>()
            .map_err(|source| ShellError::ResourceExhausted {
                what: "pipe",
                source,
            })?;

        trace!(stages, links = links.len(), "allocated pipeline wiring");

        Ok(Self { links, endpoints })
    }

    pub fn links(&self) -> &[PipeLink] {
        &self.links
    }

    pub fn stages(&self) -> usize {
        self.links.len() + 1
    }

    pub fn input_of(&self, stage: usize) -> Option<RawFd> {
        if stage == 0 {
            self.endpoints.input.as_ref().map(AsRawFd::as_raw_fd)
        } else {
            self.links.get(stage - 1).map(|link| link.read.as_raw_fd())
        }
    }

    pub fn output_of(&self, stage: usize) -> Option<RawFd> {
        if stage + 1 == self.stages() {
            self.endpoints.output.as_ref().map(AsRawFd::as_raw_fd)
        } else {
            self.links.get(stage).map(|link| link.write.as_raw_fd())
        }
    }

    /// Runs in the child: moves this stage's ends onto stdin/stdout, then
    /// closes every pipeline descriptor so only the standard streams remain.
    pub fn bind(&self, stage: usize) -> nix::Result<()> {
        if let Some(fd) = self.input_of(stage) {
            rebind(fd, libc::STDIN_FILENO)?;
        }
        if let Some(fd) = self.output_of(stage) {
            rebind(fd, libc::STDOUT_FILENO)?;
        }

        // the OwnedFds are never dropped in the child: it either execs or _exits
        for fd in self.descriptors() {
            if fd > libc::STDERR_FILENO {
                syscall(|| unistd::close(fd))?;
            }
        }

        Ok(())
    }

    fn descriptors(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.links
            .iter()
            .flat_map(|link| [link.read.as_raw_fd(), link.write.as_raw_fd()])
            .chain(self.endpoints.input.as_ref().map(AsRawFd::as_raw_fd))
            .chain(self.endpoints.output.as_ref().map(AsRawFd::as_raw_fd))
    }
}

fn rebind(fd: RawFd, target: RawFd) -> nix::Result<()> {
    if fd == target {
        // already in place, but pipe2 set close-on-exec on it
        syscall(|| fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty())))?;
    } else {
        syscall(|| dup2(fd, target))?;
    }
    Ok(())
}
