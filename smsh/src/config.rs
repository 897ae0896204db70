use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::process::job::DEFAULT_MAX_JOBS;

pub const PROMPT: &str = ": ";

/// What happens when more background jobs are running than `--max-jobs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OverflowPolicy {
    /// Keep tracking every job; the table grows past the limit.
    #[default]
    Grow,
    /// Refuse to launch new background jobs while the table is full.
    Reject,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run a single command line and exit with its status
    #[arg(short, long)]
    pub command: Option<String>,

    /// Number of background jobs tracked before the overflow policy applies
    #[arg(long, env = "SMSH_MAX_JOBS", default_value_t = DEFAULT_MAX_JOBS)]
    pub max_jobs: usize,

    #[arg(long, env = "SMSH_JOB_OVERFLOW", value_enum, default_value_t = OverflowPolicy::Grow)]
    pub job_overflow: OverflowPolicy,

    /// Write diagnostics here instead of stderr (filter with SMSH_LOG)
    #[arg(long, env = "SMSH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Option<String>,
    pub max_jobs: usize,
    pub overflow: OverflowPolicy,
    pub log_file: Option<PathBuf>,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            command: None,
            max_jobs: DEFAULT_MAX_JOBS,
            overflow: OverflowPolicy::default(),
            log_file: None,
            prompt: PROMPT.to_string(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            command: cli.command,
            max_jobs: cli.max_jobs,
            overflow: cli.job_overflow,
            log_file: cli.log_file,
            ..Config::default()
        }
    }
}
