pub mod eval;
pub mod job;

use crate::config::Config;
use crate::process::{Job, JobTable, SignalPolicy};
use anyhow::Result;
use nix::unistd::{Pid, getpid};
use smsh_types::{Context, ExitStatus};
use tracing::{debug, warn};

pub const APP_NAME: &str = "smsh";

pub struct Shell {
    pub exited: Option<ExitStatus>,
    pub pid: Pid,
    pub(crate) jobs: JobTable,
    pub(crate) last_status: ExitStatus,
    pub(crate) policy: SignalPolicy,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("pid", &self.pid)
            .field("jobs", &self.jobs.len())
            .field("last_status", &self.last_status)
            .finish()
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.terminate_background_jobs();
    }
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Shell::with_policy(config, SignalPolicy::process())
    }

    pub(crate) fn with_policy(config: &Config, policy: SignalPolicy) -> Self {
        Shell {
            exited: None,
            pid: getpid(),
            jobs: JobTable::new(config.max_jobs, config.overflow),
            last_status: ExitStatus::default(),
            policy,
        }
    }

    pub fn set_signals(&mut self) {
        use crate::process::signal::install_shell_handlers;
        if let Err(e) = install_shell_handlers() {
            warn!("Failed to install signal handlers: {}", e);
        }
        debug!("Signal handlers setup completed");
    }

    pub fn eval_line(&mut self, ctx: &Context, line: &str) -> Result<()> {
        eval::eval_line(self, ctx, line)
    }

    /// Non-blocking sweep of finished background jobs.
    pub fn reap_jobs(&mut self, ctx: &Context) -> Vec<Job> {
        job::reap_jobs(self, ctx)
    }

    pub fn terminate_background_jobs(&mut self) {
        job::terminate_background_jobs(self)
    }

    pub fn last_status(&self) -> ExitStatus {
        self.last_status
    }

    pub fn foreground_only(&self) -> bool {
        self.policy.foreground_only()
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn exit(&mut self) {
        self.exited = Some(ExitStatus::ExitedWith(0));
    }

    pub fn print_error(&self, ctx: &Context, msg: &str) {
        ctx.write_stderr(&format!("{APP_NAME}: {msg}")).ok();
    }
}
