use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::fcntl::{OFlag, open};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::os::unix::io::RawFd;

/// Exit code of a child whose redirect target could not be opened.
pub const OPEN_FAILED: i32 = 1;
/// Exit code of a child whose standard stream could not be rebound.
pub const REBIND_FAILED: i32 = 2;

pub const NULL_DEVICE: &str = "/dev/null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Input(String),
    Output(String),
}

impl Redirect {
    fn target_fd(&self) -> RawFd {
        match self {
            Redirect::Input(_) => STDIN_FILENO,
            Redirect::Output(_) => STDOUT_FILENO,
        }
    }

    fn open(&self) -> nix::Result<RawFd> {
        match self {
            Redirect::Input(path) => open(path.as_str(), OFlag::O_RDONLY, Mode::empty()),
            Redirect::Output(path) => open(
                path.as_str(),
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH,
            ),
        }
    }

    fn open_failure(&self) -> String {
        match self {
            Redirect::Input(path) => format!("cannot open {path} for input"),
            Redirect::Output(path) => format!("cannot open {path} for output"),
        }
    }

    fn rebind_failure(&self) -> &'static str {
        match self {
            Redirect::Input(_) => "cannot redirect to source",
            Redirect::Output(_) => "cannot redirect to target",
        }
    }

    /// Opens the target and rebinds the matching standard stream onto it.
    /// On failure returns the message to report and the child's exit code.
    pub(crate) fn apply(&self) -> Result<(), (String, i32)> {
        let fd = self.open().map_err(|_| (self.open_failure(), OPEN_FAILED))?;
        let target = self.target_fd();
        if fd == target {
            return Ok(());
        }
        if dup2(fd, target).is_err() {
            let _ = close(fd);
            return Err((self.rebind_failure().to_string(), REBIND_FAILED));
        }
        let _ = close(fd);
        Ok(())
    }

    /// Runs in the forked child only: any failure ends the child.
    pub(crate) fn process(&self) {
        if let Err((message, code)) = self.apply() {
            eprintln!("{message}");
            std::process::exit(code);
        }
    }
}
