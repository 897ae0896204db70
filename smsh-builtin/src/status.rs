use super::ShellProxy;
use smsh_types::{Context, ExitStatus};
use tracing::debug;

/// Prints the status of the last foreground command. Does not change it.
pub fn command(ctx: &Context, _argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    let last = proxy.last_status();
    debug!("status: {:?}", last);
    if let Err(err) = ctx.write_stdout(&last.to_string()) {
        debug!("status: failed to write: {}", err);
        return ExitStatus::ExitedWith(1);
    }
    ExitStatus::ExitedWith(0)
}
