use super::ShellProxy;
use smsh_types::{Context, ExitStatus};
use tracing::debug;

const CD_FAILURE: &str = "No such directory";

pub fn command(ctx: &Context, argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    let dir = match argv.get(1).map(|s| s.as_str()) {
        Some(dir) if dir.starts_with('~') => shellexpand::tilde(dir).into_owned(),
        Some(dir) => dir.to_string(),
        None => match home_dir() {
            Some(home) => home,
            None => {
                debug!("cd: HOME is not set and no home directory is known");
                ctx.write_stdout(CD_FAILURE).ok();
                return ExitStatus::ExitedWith(1);
            }
        },
    };

    match proxy.changepwd(&dir) {
        Ok(_) => ExitStatus::ExitedWith(0),
        Err(err) => {
            debug!("cd: {}: {}", dir, err);
            ctx.write_stdout(CD_FAILURE).ok();
            ExitStatus::ExitedWith(1)
        }
    }
}

/// `$HOME` first, then whatever the platform reports.
pub fn home_dir() -> Option<String> {
    std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .or_else(|| dirs::home_dir().map(|home| home.to_string_lossy().into_owned()))
}
