use anyhow::{Context as _, Result};
use clap::Parser;
use smsh::{Cli, Config, Repl, Shell};
use smsh_types::{Context, SmshError};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SMSH_LOG";

fn main() -> ExitCode {
    let config = Config::from(Cli::parse());
    if let Err(err) = init_tracing(&config) {
        eprintln!("Failed to initialize tracing: {err:#}");
        return ExitCode::FAILURE;
    }

    let mut shell = Shell::new(&config);
    let ctx = Context::new(shell.pid);
    shell.set_signals();

    let result = match config.command.as_deref() {
        Some(command) => execute_command(&mut shell, &ctx, command),
        None => run_interactive(&mut shell, &ctx, &config),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            if !matches!(err.downcast_ref::<SmshError>(), Some(SmshError::Fork(_))) {
                eprintln!("smsh: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true);

    match &config.log_file {
        Some(path) => {
            let log_file = std::sync::Arc::new(
                std::fs::File::create(path)
                    .with_context(|| format!("cannot create log file {}", path.display()))?,
            );
            builder
                .with_writer(log_file)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

fn execute_command(shell: &mut Shell, ctx: &Context, command: &str) -> Result<ExitCode> {
    debug!("run command mode {:?}", command);
    shell.eval_line(ctx, command)?;
    shell.reap_jobs(ctx);
    shell.terminate_background_jobs();
    let code = shell.last_status().code();
    Ok(ExitCode::from(code.clamp(0, 255) as u8))
}

fn run_interactive(shell: &mut Shell, ctx: &Context, config: &Config) -> Result<ExitCode> {
    debug!("start shell");
    let stdin = std::io::stdin();
    Repl::new(shell, &config.prompt).run(ctx, stdin.lock())?;
    Ok(ExitCode::SUCCESS)
}
