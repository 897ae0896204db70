use anyhow::Result;
use libc::{STDERR_FILENO, STDOUT_FILENO};
use nix::unistd::Pid;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::os::unix::io::FromRawFd;
use std::os::unix::io::RawFd;
use thiserror::Error;

/// smsh specific error types
#[derive(Error, Debug)]
pub enum SmshError {
    #[error("fork() failed: {0}")]
    Fork(nix::errno::Errno),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("too many background jobs (limit {limit})")]
    JobTable { limit: usize },

    #[error("System call failed: {0}")]
    System(String),
}

pub type SmshResult<T> = std::result::Result<T, SmshError>;

#[derive(Clone)]
pub struct Context {
    pub shell_pid: Pid,
    pub outfile: RawFd,
    pub errfile: RawFd,
}

impl Context {
    pub fn new(shell_pid: Pid) -> Self {
        Context {
            shell_pid,
            outfile: STDOUT_FILENO,
            errfile: STDERR_FILENO,
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("Context")
            .field("shell_pid", &self.shell_pid)
            .field("outfile", &self.outfile)
            .field("errfile", &self.errfile)
            .finish()
    }
}

impl Context {
    pub fn write_stdout(&self, msg: &str) -> Result<()> {
        let mut file = unsafe { File::from_raw_fd(self.outfile) };
        writeln!(&mut file, "{msg}")?;
        file.flush()?;
        mem::forget(file);
        Ok(())
    }

    pub fn write_stderr(&self, msg: &str) -> Result<()> {
        let mut file = unsafe { File::from_raw_fd(self.errfile) };
        writeln!(&mut file, "{msg}")?;
        mem::forget(file);
        Ok(())
    }
}

/// How a foreground command ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    ExitedWith(i32),
    Signaled(i32),
}

impl ExitStatus {
    /// Process exit code the shell reports for this status, using the
    /// conventional `128 + signo` for signaled children.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::ExitedWith(code) => *code,
            ExitStatus::Signaled(signo) => 128 + signo,
        }
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        ExitStatus::ExitedWith(0)
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExitStatus::ExitedWith(code) => write!(formatter, "exit value {code}"),
            ExitStatus::Signaled(signo) => write!(formatter, "terminated by signal {signo}"),
        }
    }
}
