use crate::process::Job;
use crate::shell::Shell;
use smsh_types::Context;
use tracing::{debug, warn};

/// Reaps every finished background job and prints its notice.
pub fn reap_jobs(shell: &mut Shell, ctx: &Context) -> Vec<Job> {
    if shell.jobs.is_empty() {
        return Vec::new();
    }

    debug!("REAP: checking {} background jobs", shell.jobs.len());
    shell.jobs.update_all();
    let finished = shell.jobs.take_finished();

    for job in &finished {
        match job.done_notice() {
            Some(notice) => {
                if let Err(err) = ctx.write_stdout(&notice) {
                    warn!("REAP: failed to report job {}: {}", job.pid, err);
                }
            }
            None => debug!("REAP: dropping job {} ({})", job.pid, job.state),
        }
    }
    debug!(
        "REAP: {} finished, {} still running",
        finished.len(),
        shell.jobs.len()
    );
    finished
}

/// Sends SIGTERM to every tracked job, then reaps whatever already ended.
pub fn terminate_background_jobs(shell: &mut Shell) {
    if shell.jobs.is_empty() {
        return;
    }
    for job in shell.jobs.iter() {
        debug!("Terminating background job {} ({})", job.pid, job.cmd);
        if let Err(err) = job.kill() {
            warn!("Failed to terminate job {}: {}", job.pid, err);
        }
    }
    shell.jobs.update_all();
    let finished = shell.jobs.take_finished();
    debug!(
        "Terminated jobs: {} reaped, {} left to init",
        finished.len(),
        shell.jobs.len()
    );
}
