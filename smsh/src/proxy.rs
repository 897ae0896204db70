use crate::shell::Shell;
use anyhow::{Context as _, Result};
use smsh_builtin::ShellProxy;
use smsh_types::ExitStatus;
use tracing::debug;

impl ShellProxy for Shell {
    fn exit_shell(&mut self) {
        self.exit();
    }

    fn changepwd(&mut self, path: &str) -> Result<()> {
        debug!("changepwd {}", path);
        nix::unistd::chdir(path).with_context(|| format!("failed to chdir to {path}"))?;
        Ok(())
    }

    fn last_status(&self) -> ExitStatus {
        self.last_status
    }
}
