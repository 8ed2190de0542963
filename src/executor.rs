// executor.rs

use std::ffi::CString;
use std::io::Write;
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, execvp, fork, pipe, read, write, ForkResult, Pid};

/// How an external command ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    Exited(i32),
    Signaled(Signal),
    /// The program never ran: fork or exec failed.
    SpawnFailed(Errno),
}

/// Runs an external program to completion. `argv[0]` is the program.
pub trait Executor {
    fn run(&mut self, argv: &[String]) -> ExecOutcome;
}

/// Spawns children with fork/execvp and blocks in waitpid.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForkExecutor;

impl Executor for ForkExecutor {
    fn run(&mut self, argv: &[String]) -> ExecOutcome {
        let args: Vec<CString> = match argv.iter().map(|s| CString::new(s.as_str())).collect() {
            Ok(args) => args,
            Err(_) => return ExecOutcome::SpawnFailed(Errno::EINVAL),
        };
        if args.is_empty() {
            return ExecOutcome::SpawnFailed(Errno::EINVAL);
        }
        // exec failures travel back over this pipe; a successful exec closes it
        let (report_r, report_w) = match cloexec_pipe() {
            Ok(fds) => fds,
            Err(errno) => return ExecOutcome::SpawnFailed(errno),
        };
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                let _ = close(report_r);
                let errno = match execvp(&args[0], &args) {
                    Err(errno) => errno,
                    Ok(never) => match never {},
                };
                let _ = write(report_w, &(errno as i32).to_ne_bytes());
                unsafe { libc::_exit(127) }
            }
            Ok(ForkResult::Parent { child }) => {
                let _ = close(report_w);
                let exec_error = read_exec_report(report_r);
                let _ = close(report_r);
                let outcome = wait_for(child);
                tracing::debug!(pid = %child, ?outcome, "child finished");
                match exec_error {
                    Some(errno) => ExecOutcome::SpawnFailed(errno),
                    None => outcome,
                }
            }
            Err(errno) => {
                let _ = close(report_r);
                let _ = close(report_w);
                ExecOutcome::SpawnFailed(errno)
            }
        }
    }
}

fn cloexec_pipe() -> Result<(RawFd, RawFd), Errno> {
    let (r, w) = pipe()?;
    for fd in [r, w] {
        if let Err(errno) = fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)) {
            let _ = close(r);
            let _ = close(w);
            return Err(errno);
        }
    }
    Ok((r, w))
}

/// Reads the errno the child writes when exec fails. EOF with nothing read
/// means exec succeeded.
fn read_exec_report(fd: RawFd) -> Option<Errno> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match read(fd, &mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
    (filled == buf.len()).then(|| Errno::from_i32(i32::from_ne_bytes(buf)))
}

fn wait_for(child: Pid) -> ExecOutcome {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return ExecOutcome::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return ExecOutcome::Signaled(signal),
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => return ExecOutcome::SpawnFailed(errno),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::lock_process_env;

    /// Runs with the process environment held still.
    fn run(parts: &[&str]) -> ExecOutcome {
        let _env = lock_process_env();
        let argv: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
        ForkExecutor.run(&argv)
    }

    #[test]
    fn reports_exit_status() {
        let outcome = run(&["/bin/sh", "-c", "exit 3"]);
        assert_eq!(outcome, ExecOutcome::Exited(3));
    }

    #[test]
    fn successful_command_exits_zero() {
        let outcome = run(&["/bin/sh", "-c", ":"]);
        assert_eq!(outcome, ExecOutcome::Exited(0));
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let outcome = run(&["/definitely/not/a/program"]);
        assert_eq!(outcome, ExecOutcome::SpawnFailed(Errno::ENOENT));
    }

    #[test]
    fn killed_child_reports_signal() {
        let outcome = run(&["/bin/sh", "-c", "kill -9 $$"]);
        assert_eq!(outcome, ExecOutcome::Signaled(Signal::SIGKILL));
    }

    #[test]
    fn interior_nul_is_rejected_before_forking() {
        let outcome = run(&["/bin/sh\0x"]);
        assert_eq!(outcome, ExecOutcome::SpawnFailed(Errno::EINVAL));
    }
}
