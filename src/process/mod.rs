use itertools::Itertools;
use nix::{
    sys::wait::waitpid,
    unistd::{fork, ForkResult, Pid},
};

use self::{
    pipe::{Endpoints, Wiring},
    status::StageStatus,
};
use crate::{parse::Pipeline, prelude::*};

pub mod child;
pub mod pipe;
pub mod status;

/// Retries a system call interrupted by a signal.
pub fn syscall<F, T>(f: F) -> nix::Result<T>
where
    F: Fn() -> nix::Result<T>,
{
    loop {
        match f() {
            Err(nix::Error::EINTR) => continue,
            result => return result,
        }
    }
}

/// Starts one process per stage, wires them together and waits for all of
/// them. Statuses come back in stage order.
///
/// A failed fork aborts only this pipeline: whatever was started is still
/// reaped before the error is returned.
pub fn run(pipeline: &Pipeline<'_>, endpoints: Endpoints) -> ShellResult<Vec<StageStatus>> {
    // everything the children need is allocated before the first fork
    let argvs = pipeline
        .stages()
        .iter()
        .map(|stage| {
            stage.argv().map_err(|err| {
                ShellError::InvalidArgument(format!(
                    "{}: argument contains a nul byte at {}",
                    stage.program(),
                    err.nul_position()
                ))
            })
        })
        .collect::<ShellResult<Vec<_>>>()?;

    let wiring = Wiring::allocate(pipeline.len(), endpoints)?;

    let mut children = Vec::with_capacity(argvs.len());
    let mut failure = None;

    for (index, (stage, argv)) in pipeline.stages().iter().zip(&argvs).enumerate() {
        trace!(index, command = %stage.tokens().iter().join(" "), "starting stage");

        // SAFETY: the child only rebinds descriptors before exec or _exit
        match syscall(|| unsafe { fork() }) {
            Ok(ForkResult::Parent { child }) => children.push(child),
            Ok(ForkResult::Child) => child::exec_stage(index, &wiring, argv),
            Err(source) => {
                error!(index, %source, "fork failed, abandoning pipeline");
                failure = Some(source);
                break;
            }
        }
    }

    // the parent keeps no pipe ends, so readers see end-of-stream
    drop(wiring);

    let results = children.into_iter().map(wait_for).collect::<Vec<_>>();

    if let Some(source) = failure {
        return Err(ShellError::ResourceExhausted {
            what: "fork",
            source,
        });
    }

    let statuses = results.into_iter().collect::<ShellResult<Vec<_>>>()?;
    debug!(?statuses, "pipeline finished");

    Ok(statuses)
}

fn wait_for(pid: Pid) -> ShellResult<StageStatus> {
    loop {
        let status = syscall(|| waitpid(pid, None)).map_err(ShellError::Wait)?;
        if let Some(status) = StageStatus::from_wait(status) {
            trace!(%pid, ?status, "reaped stage");
            return Ok(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::{Read, Write},
    };

    use super::{pipe::PipeLink, *};
    use crate::parse::parse_head;

    fn run_captured(line: &str, input: Option<&[u8]>) -> (Vec<StageStatus>, String) {
        let pipeline = parse_head(line).unwrap().into_pipeline().unwrap();

        let output = PipeLink::open().unwrap();
        let mut endpoints = Endpoints {
            input: None,
            output: Some(output.write),
        };

        if let Some(data) = input {
            let feed = PipeLink::open().unwrap();
            File::from(feed.write).write_all(data).unwrap();
            endpoints.input = Some(feed.read);
        }

        let statuses = run(&pipeline, endpoints).unwrap();

        let mut captured = String::new();
        File::from(output.read)
            .read_to_string(&mut captured)
            .unwrap();

        (statuses, captured)
    }

    #[test]
    fn two_stage_pipeline() {
        let (statuses, output) = run_captured("printf AB | tr A-Z a-z", None);

        assert_eq!(output, "ab");
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(StageStatus::success));
    }

    #[test]
    fn three_stage_pipeline_terminates() {
        let (statuses, output) = run_captured("echo one | cat | cat", None);

        assert_eq!(output, "one\n");
        assert_eq!(statuses, vec![StageStatus::Exited(0); 3]);
    }

    #[test]
    fn single_stage() {
        let (statuses, output) = run_captured("echo hello   world", None);

        assert_eq!(output, "hello world\n");
        assert_eq!(statuses, vec![StageStatus::Exited(0)]);
    }

    #[test]
    fn input_endpoint_feeds_the_first_stage() {
        let (_, output) = run_captured("sort | head -n 2", Some(b"c\nb\na\n"));

        assert_eq!(output, "a\nb\n");
    }

    #[test]
    fn missing_program_does_not_hang_siblings() {
        let (statuses, output) =
            run_captured("definitely-not-a-real-program-sish | cat | echo done", None);

        assert_eq!(output, "done\n");
        assert_eq!(statuses[0], StageStatus::Exited(127));
        assert!(statuses[1].success());
        assert!(statuses[2].success());
    }

    #[test]
    fn exit_codes_are_collected_per_stage() {
        let (statuses, _) = run_captured("false | true", None);

        assert_eq!(statuses, vec![StageStatus::Exited(1), StageStatus::Exited(0)]);
    }

    #[test]
    fn nul_byte_is_rejected_before_forking() {
        let pipeline = parse_head("echo a\0b").unwrap().into_pipeline().unwrap();

        assert!(matches!(
            run(&pipeline, Endpoints::inherit()),
            Err(ShellError::InvalidArgument(_))
        ));
    }
}
