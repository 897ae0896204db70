use crate::shell::Shell;
use anyhow::{Context as _, Result};
use smsh_types::{Context, SmshError};
use std::io::{BufRead, Write};
use tracing::{debug, error};

/// Prompt, read, dispatch, reap.
pub struct Repl<'a> {
    pub shell: &'a mut Shell,
    prompt: String,
}

impl<'a> Repl<'a> {
    pub fn new(shell: &'a mut Shell, prompt: &str) -> Self {
        Repl {
            shell,
            prompt: prompt.to_string(),
        }
    }

    fn print_prompt(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.prompt.as_bytes())?;
        stdout.flush().context("failed to flush prompt")?;
        Ok(())
    }

    /// Runs until `exit` or end of input. Only a failed fork ends the loop
    /// with an error.
    pub fn run(&mut self, ctx: &Context, mut input: impl BufRead) -> Result<()> {
        let mut line = String::new();
        loop {
            self.shell.reap_jobs(ctx);
            self.print_prompt()?;

            line.clear();
            let read = input.read_line(&mut line).context("failed to read input")?;
            if read == 0 {
                debug!("repl: end of input");
                break;
            }

            let command = line.trim_end_matches(['\n', '\r']);
            if let Err(err) = self.shell.eval_line(ctx, command) {
                if let Some(SmshError::Fork(_)) = err.downcast_ref::<SmshError>() {
                    return Err(err);
                }
                error!("repl: {:?}: {:#}", command, err);
                self.shell.print_error(ctx, &format!("{err:#}"));
            }

            if self.shell.exited.is_some() {
                debug!("repl: exit requested");
                break;
            }
        }
        self.shell.terminate_background_jobs();
        Ok(())
    }
}
