use anyhow::{Context as _, Result};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use smsh_types::ExitStatus;
use tracing::{debug, error};

use super::state::ProcessState;

/// Waits on a single child. With `no_hang` the call never blocks and returns
/// `Ok(None)` while the child is still alive. `EINTR` is retried.
pub fn wait_pid_job(pid: Pid, no_hang: bool) -> Result<Option<ProcessState>, Errno> {
    let options = if no_hang {
        Some(WaitPidFlag::WNOHANG)
    } else {
        None
    };

    debug!("wait_pid_job: pid:{} no_hang:{}", pid, no_hang);

    loop {
        match waitpid(pid, options) {
            Ok(WaitStatus::StillAlive) => {
                debug!("wait_pid_job: {} still alive", pid);
                return Ok(None);
            }
            Ok(status) => {
                if let Some(state) = ProcessState::from_wait_status(status) {
                    debug!("wait_pid_job: {} -> {:?}", pid, state);
                    return Ok(Some(state));
                }
                // stop/continue notifications are not requested, but a
                // blocking wait must keep going if one shows up anyway
                debug!("wait_pid_job: {} non-terminal status {:?}", pid, status);
                if no_hang {
                    return Ok(None);
                }
            }
            Err(Errno::EINTR) => {
                debug!("wait_pid_job: {} interrupted, retrying", pid);
            }
            Err(err) => {
                error!("wait_pid_job: waitpid({}) failed: {}", pid, err);
                return Err(err);
            }
        }
    }
}

/// Blocks until `pid` terminates and returns how it ended.
pub fn wait_foreground(pid: Pid) -> Result<ExitStatus> {
    loop {
        let state = wait_pid_job(pid, false)
            .with_context(|| format!("failed to wait for foreground pid {pid}"))?;
        if let Some(ProcessState::Completed(status)) = state {
            return Ok(status);
        }
    }
}
