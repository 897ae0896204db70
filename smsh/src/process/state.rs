use nix::sys::wait::WaitStatus;
use smsh_types::ExitStatus;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProcessState {
    Running,
    Completed(ExitStatus),
    /// The pid is no longer our child; nothing left to reap.
    Lost,
}

impl ProcessState {
    /// Maps a terminal wait status. Non-terminal statuses yield `None`.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ProcessState::Completed(ExitStatus::ExitedWith(code))),
            WaitStatus::Signaled(_, signal, _) => {
                Some(ProcessState::Completed(ExitStatus::Signaled(signal as i32)))
            }
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, ProcessState::Running)
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProcessState::Running => formatter.write_str("running"),
            ProcessState::Completed(status) => write!(formatter, "{status}"),
            ProcessState::Lost => formatter.write_str("lost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn maps_terminal_statuses() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Exited(pid, 3)),
            Some(ProcessState::Completed(ExitStatus::ExitedWith(3)))
        );
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ProcessState::Completed(ExitStatus::Signaled(9)))
        );
        assert_eq!(ProcessState::from_wait_status(WaitStatus::StillAlive), None);
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Continued(pid)),
            None
        );
    }

    #[test]
    fn display() {
        assert_eq!(ProcessState::Running.to_string(), "running");
        assert_eq!(
            ProcessState::Completed(ExitStatus::Signaled(15)).to_string(),
            "terminated by signal 15"
        );
        assert!(ProcessState::Lost.is_finished());
        assert!(!ProcessState::Running.is_finished());
    }
}
