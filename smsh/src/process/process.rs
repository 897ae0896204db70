use anyhow::{Context as _, Result};
use nix::unistd::execvp;
use std::ffi::CString;
use tracing::debug;

use super::redirect::{NULL_DEVICE, Redirect};
use super::signal::set_child_signals;
use crate::parser::Command;

/// Exit code of a child whose program could not be executed.
pub const EXEC_FAILED: i32 = 1;

/// An external command ready to be exec'd in a forked child.
///
/// Program and arguments are converted to `CString`s in the parent, so a bad
/// argument is reported by the shell instead of by a half-started child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub(crate) cmd: String,
    program: CString,
    argv: Vec<CString>,
    pub(crate) redirects: Vec<Redirect>,
    pub(crate) foreground: bool,
}

impl Process {
    pub fn new(argv: Vec<String>, redirects: Vec<Redirect>, foreground: bool) -> Result<Self> {
        let cmd = argv.first().cloned().unwrap_or_default();
        let program = CString::new(cmd.clone())
            .with_context(|| format!("{cmd}: command name contains a NUL byte"))?;
        let argv = argv
            .into_iter()
            .map(|a| CString::new(a).context("argument contains a NUL byte"))
            .collect::<Result<Vec<_>>>()?;
        Ok(Process {
            cmd,
            program,
            argv,
            redirects,
            foreground,
        })
    }

    /// Background jobs read from and write to the null device unless the
    /// command redirects explicitly.
    pub fn from_command(command: &Command, foreground: bool) -> Result<Self> {
        let input = command
            .input
            .clone()
            .or_else(|| (!foreground).then(|| NULL_DEVICE.to_string()));
        let output = command
            .output
            .clone()
            .or_else(|| (!foreground).then(|| NULL_DEVICE.to_string()));

        let mut redirects = Vec::new();
        if let Some(input) = input {
            redirects.push(Redirect::Input(input));
        }
        if let Some(output) = output {
            redirects.push(Redirect::Output(output));
        }
        debug!(
            "process: cmd:{:?} redirects:{:?} foreground:{}",
            command.argv, redirects, foreground
        );
        Process::new(command.argv.clone(), redirects, foreground)
    }

    /// Child side of the launch. Replaces the process image or exits.
    pub fn launch(&self) -> ! {
        for redirect in &self.redirects {
            redirect.process();
        }
        let _ = set_child_signals(self.foreground);

        // only returns on failure
        let _ = execvp(&self.program, &self.argv);
        eprintln!("{}: no such file or directory", self.cmd);
        std::process::exit(EXEC_FAILED);
    }
}
