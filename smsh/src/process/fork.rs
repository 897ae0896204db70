use nix::errno::Errno;
use nix::unistd::{ForkResult, Pid, fork};
use std::io::Write;
use tracing::{debug, error};

/// Outcome of process creation, seen from the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
    /// We are the new child and must exec or exit.
    Child,
    /// We are the shell; the child has this pid.
    Parent(Pid),
    Failed(Errno),
}

pub fn spawn() -> Spawn {
    // buffered output would otherwise be written twice
    std::io::stdout().flush().ok();
    std::io::stderr().flush().ok();

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("FORK: parent continues, child pid: {}", child);
            Spawn::Parent(child)
        }
        Ok(ForkResult::Child) => Spawn::Child,
        Err(err) => {
            error!("FORK: fork failed: {}", err);
            Spawn::Failed(err)
        }
    }
}
