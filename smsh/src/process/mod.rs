#![allow(clippy::module_inception)]

pub mod fork;
pub mod job;
pub mod process;
pub mod redirect;
pub mod signal;
pub mod state;
pub mod wait;

pub use fork::{Spawn, spawn};
pub use job::{Job, JobTable};
pub use process::Process;
pub use redirect::Redirect;
pub use signal::SignalPolicy;
pub use state::ProcessState;
pub use wait::{wait_foreground, wait_pid_job};
