use anyhow::{Context as _, Result};
use libc::{STDOUT_FILENO, c_int};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, kill, sigaction};
use nix::unistd::Pid;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_FOREGROUND_ONLY: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n: ";
const EXIT_FOREGROUND_ONLY: &[u8] = b"\nExiting foreground-only mode\n: ";

/// Handle to the foreground-only flag.
///
/// The SIGTSTP handler is the only writer; the dispatcher reads it once per
/// background launch. Only lock-free atomic operations touch the flag, so it
/// is safe to use from the handler while the main loop sits in `read` or
/// `waitpid`.
#[derive(Debug, Clone, Copy)]
pub struct SignalPolicy {
    flag: &'static AtomicBool,
}

impl SignalPolicy {
    /// The flag shared with the installed SIGTSTP handler.
    pub fn process() -> Self {
        SignalPolicy {
            flag: &FOREGROUND_ONLY,
        }
    }

    /// A private flag that no signal handler can reach.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        SignalPolicy {
            flag: Box::leak(Box::new(AtomicBool::new(false))),
        }
    }

    pub fn foreground_only(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Flips the mode and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.flag.fetch_xor(true, Ordering::SeqCst)
    }

    fn notice(foreground_only: bool) -> &'static [u8] {
        if foreground_only {
            ENTER_FOREGROUND_ONLY
        } else {
            EXIT_FOREGROUND_ONLY
        }
    }
}

extern "C" fn handle_sigtstp(_: c_int) {
    let foreground_only = SignalPolicy::process().toggle();
    let _ = nix::unistd::write(STDOUT_FILENO, SignalPolicy::notice(foreground_only));
}

/// Shell-side dispositions: SIGINT ignored, SIGTSTP toggles foreground-only
/// mode. `SA_RESTART` lets an interrupted `read` resume on its own.
pub(crate) fn install_shell_handlers() -> Result<()> {
    tracing::info!("SIGNAL: installing shell handlers");
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    unsafe {
        sigaction(Signal::SIGINT, &ignore).context("failed to ignore SIGINT")?;
        sigaction(Signal::SIGTSTP, &toggle).context("failed to set SIGTSTP handler")?;
    }
    debug!("SIGNAL: SIGINT ignored, SIGTSTP handler installed");
    Ok(())
}

/// Child-side dispositions, applied right before exec. Runs after fork, so
/// it must not log.
pub(crate) fn set_child_signals(foreground: bool) -> nix::Result<()> {
    let interrupt = if foreground {
        SigHandler::SigDfl
    } else {
        SigHandler::SigIgn
    };
    let interrupt = SigAction::new(interrupt, SaFlags::empty(), SigSet::empty());
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // the Rust runtime ignores SIGPIPE in the shell; exec keeps ignored dispositions
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    unsafe {
        sigaction(Signal::SIGINT, &interrupt)?;
        sigaction(Signal::SIGTSTP, &ignore)?;
        sigaction(Signal::SIGPIPE, &default)?;
    }
    Ok(())
}

pub(crate) fn send_signal(pid: Pid, signal: Signal) -> Result<()> {
    debug!("SIGNAL: sending {:?} to pid {}", signal, pid);
    match kill(pid, signal) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("SIGNAL: failed to send {:?} to pid {}: {}", signal, pid, e);
            Err(e.into())
        }
    }
}
