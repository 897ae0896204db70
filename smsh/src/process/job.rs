use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use smsh_types::{SmshError, SmshResult};
use tracing::{debug, warn};

use super::signal::send_signal;
use super::state::ProcessState;
use super::wait::wait_pid_job;
use crate::config::OverflowPolicy;

/// Slots reserved up front; matches the classic fixed-size table.
pub const DEFAULT_MAX_JOBS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub cmd: String,
    pub state: ProcessState,
}

impl Job {
    pub fn new(pid: Pid, cmd: String) -> Self {
        Job {
            pid,
            cmd,
            state: ProcessState::Running,
        }
    }

    /// Non-blocking check; never waits on a running child.
    pub fn update_state(&mut self) -> ProcessState {
        if self.state.is_finished() {
            return self.state;
        }
        match wait_pid_job(self.pid, true) {
            Ok(Some(state)) => self.state = state,
            Ok(None) => {}
            Err(Errno::ECHILD) => {
                warn!("job {} ({}) is no longer a child", self.pid, self.cmd);
                self.state = ProcessState::Lost;
            }
            Err(err) => {
                warn!("job {} ({}): waitpid failed: {}", self.pid, self.cmd, err);
            }
        }
        self.state
    }

    pub fn kill(&self) -> anyhow::Result<()> {
        if self.state.is_finished() {
            return Ok(());
        }
        send_signal(self.pid, Signal::SIGTERM)
    }

    /// Line printed when the job is reaped.
    pub fn done_notice(&self) -> Option<String> {
        match self.state {
            ProcessState::Completed(status) => {
                Some(format!("background pid {} is done: {}", self.pid, status))
            }
            _ => None,
        }
    }
}

/// Background jobs awaiting reclamation, in launch order.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    limit: usize,
    policy: OverflowPolicy,
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable::new(DEFAULT_MAX_JOBS, OverflowPolicy::default())
    }
}

impl JobTable {
    pub fn new(limit: usize, policy: OverflowPolicy) -> Self {
        JobTable {
            jobs: Vec::with_capacity(limit),
            limit,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether another background job may be launched.
    pub fn has_room(&self) -> bool {
        match self.policy {
            OverflowPolicy::Grow => true,
            OverflowPolicy::Reject => self.jobs.len() < self.limit,
        }
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn insert(&mut self, job: Job) -> SmshResult<()> {
        if self.contains(job.pid) {
            return Err(SmshError::System(format!(
                "pid {} is already tracked",
                job.pid
            )));
        }
        if !self.has_room() {
            return Err(SmshError::JobTable { limit: self.limit });
        }
        if self.jobs.len() == self.limit {
            debug!(
                "job table grows past {} entries (pid {})",
                self.limit, job.pid
            );
        }
        debug!("job table: tracking pid {} ({})", job.pid, job.cmd);
        self.jobs.push(job);
        Ok(())
    }

    pub fn update_all(&mut self) {
        for job in self.jobs.iter_mut() {
            job.update_state();
        }
    }

    /// Removes and returns every finished job, keeping the rest in order.
    pub fn take_finished(&mut self) -> Vec<Job> {
        let all_jobs = std::mem::take(&mut self.jobs);
        let (finished, active): (Vec<Job>, Vec<Job>) = all_jobs
            .into_iter()
            .partition(|job| job.state.is_finished());
        self.jobs = active;
        finished
    }
}
