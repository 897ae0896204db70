use crate::parser::{self, Command};
use crate::process::{Job, Process, Spawn, spawn, wait_foreground};
use crate::shell::Shell;
use anyhow::Result;
use smsh_builtin::get_command;
use smsh_types::{Context, SmshError};
use tracing::{debug, error};

/// Runs one input line: builtins in-process, everything else in a child.
pub fn eval_line(shell: &mut Shell, ctx: &Context, line: &str) -> Result<()> {
    let words = parser::split_words(line);
    if parser::is_noop(&words) {
        debug!("eval_line: blank or comment line");
        return Ok(());
    }

    let command = match parser::parse_command(words, shell.pid) {
        Ok(command) => command,
        Err(err) => {
            shell.print_error(ctx, &err.to_string());
            return Ok(());
        }
    };
    dispatch(shell, ctx, command)
}

pub fn dispatch(shell: &mut Shell, ctx: &Context, command: Command) -> Result<()> {
    let Some(program) = command.program() else {
        debug!("dispatch: nothing left to run after parsing");
        return Ok(());
    };

    if let Some(builtin) = get_command(program) {
        debug!("dispatch: builtin {:?}", command.argv);
        let status = builtin(ctx, command.argv, shell);
        debug!("dispatch: builtin finished with {:?}", status);
        return Ok(());
    }

    launch(shell, ctx, command)
}

fn launch(shell: &mut Shell, ctx: &Context, command: Command) -> Result<()> {
    let background = command.background && !shell.foreground_only();
    if command.background && !background {
        debug!("launch: foreground-only mode, running {:?} in foreground", command.argv);
    }

    if background && !shell.jobs.has_room() {
        let err = SmshError::JobTable {
            limit: shell.jobs.limit(),
        };
        shell.print_error(ctx, &err.to_string());
        return Ok(());
    }

    let process = match Process::from_command(&command, !background) {
        Ok(process) => process,
        Err(err) => {
            shell.print_error(ctx, &format!("{err:#}"));
            return Ok(());
        }
    };

    match spawn() {
        Spawn::Failed(errno) => {
            error!("launch: cannot create process for {:?}: {}", command.argv, errno);
            ctx.write_stderr("fork() failed!").ok();
            Err(SmshError::Fork(errno).into())
        }
        Spawn::Child => process.launch(),
        Spawn::Parent(child) if background => {
            shell.jobs.insert(Job::new(child, command.argv.join(" ")))?;
            ctx.write_stdout(&format!("background pid is {child}"))?;
            Ok(())
        }
        Spawn::Parent(child) => {
            let status = wait_foreground(child)?;
            debug!("launch: foreground pid {} finished: {:?}", child, status);
            shell.last_status = status;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OverflowPolicy};
    use crate::process::{ProcessState, SignalPolicy};
    use nix::sys::signal::Signal;
    use smsh_types::ExitStatus;
    use std::time::Duration;

    fn shell() -> (Shell, Context) {
        shell_with(&Config::default())
    }

    fn shell_with(config: &Config) -> (Shell, Context) {
        let shell = Shell::with_policy(config, SignalPolicy::detached());
        let ctx = Context::new(shell.pid);
        (shell, ctx)
    }

    fn reap_until_done(shell: &mut Shell, ctx: &Context) -> Vec<Job> {
        for _ in 0..500 {
            let finished = shell.reap_jobs(ctx);
            if !finished.is_empty() {
                return finished;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Vec::new()
    }

    #[test]
    fn comment_and_blank_lines_do_nothing() {
        let (mut shell, ctx) = shell();
        shell.last_status = ExitStatus::ExitedWith(5);
        eval_line(&mut shell, &ctx, "").unwrap();
        eval_line(&mut shell, &ctx, "   ").unwrap();
        eval_line(&mut shell, &ctx, "# sleep 10 &").unwrap();
        assert!(shell.jobs.is_empty());
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(5));
    }

    #[test]
    fn foreground_status_is_recorded() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "true").unwrap();
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(0));
        eval_line(&mut shell, &ctx, "false").unwrap();
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(1));
    }

    #[test]
    fn missing_program_exits_one() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "smsh-no-such-command-xyz").unwrap();
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(1));
    }

    #[test]
    fn missing_input_file_exits_one() {
        let (mut shell, ctx) = shell();
        let dir = tempfile::tempdir().unwrap();
        let line = format!("cat < {}", dir.path().join("absent").display());
        eval_line(&mut shell, &ctx, &line).unwrap();
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(1));
    }

    #[test]
    fn output_redirect_writes_file() {
        let (mut shell, ctx) = shell();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        std::fs::write(&out, "stale contents that should disappear").unwrap();
        eval_line(&mut shell, &ctx, &format!("echo hello > {}", out.display())).unwrap();
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(0));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[test]
    fn input_and_output_redirect_together() {
        let (mut shell, ctx) = shell();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "one\ntwo\nthree\n").unwrap();
        let line = format!("wc -l < {} > {}", input.display(), output.display());
        eval_line(&mut shell, &ctx, &line).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap().trim(),
            "3"
        );
    }

    #[test]
    fn background_job_is_tracked_then_reaped() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "true &").unwrap();
        assert_eq!(shell.jobs.len(), 1);
        let pid = shell.jobs.iter().next().unwrap().pid;

        let finished = reap_until_done(&mut shell, &ctx);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].pid, pid);
        assert_eq!(
            finished[0].state,
            ProcessState::Completed(ExitStatus::ExitedWith(0))
        );
        assert!(shell.jobs.is_empty());
    }

    #[test]
    fn background_job_does_not_touch_foreground_status() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "false").unwrap();
        eval_line(&mut shell, &ctx, "true &").unwrap();
        reap_until_done(&mut shell, &ctx);
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(1));
    }

    #[test]
    fn signaled_background_job_reports_signal() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "sleep 30 &").unwrap();
        let pid = shell.jobs.iter().next().unwrap().pid;
        nix::sys::signal::kill(pid, Signal::SIGKILL).unwrap();

        let finished = reap_until_done(&mut shell, &ctx);
        assert_eq!(
            finished[0].state,
            ProcessState::Completed(ExitStatus::Signaled(9))
        );
    }

    #[test]
    fn foreground_only_mode_ignores_background_marker() {
        let (mut shell, ctx) = shell();
        shell.policy.toggle();
        eval_line(&mut shell, &ctx, "false &").unwrap();
        assert!(shell.jobs.is_empty());
        assert_eq!(shell.last_status, ExitStatus::ExitedWith(1));

        shell.policy.toggle();
        eval_line(&mut shell, &ctx, "true &").unwrap();
        assert_eq!(shell.jobs.len(), 1);
    }

    #[test]
    fn pid_expansion_reaches_the_child() {
        let (mut shell, ctx) = shell();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pid.txt");
        eval_line(&mut shell, &ctx, &format!("echo $$ > {}", out.display())).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap().trim(),
            shell.pid.to_string()
        );
    }

    #[test]
    fn reject_policy_refuses_extra_background_jobs() {
        let config = Config {
            max_jobs: 1,
            overflow: OverflowPolicy::Reject,
            ..Config::default()
        };
        let (mut shell, ctx) = shell_with(&config);
        eval_line(&mut shell, &ctx, "sleep 30 &").unwrap();
        eval_line(&mut shell, &ctx, "sleep 30 &").unwrap();
        assert_eq!(shell.jobs.len(), 1);
    }

    #[test]
    fn exit_builtin_marks_shell() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "exit").unwrap();
        assert_eq!(shell.exited, Some(ExitStatus::ExitedWith(0)));
    }

    #[test]
    fn syntax_error_launches_nothing() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "sleep 30 < ").unwrap();
        eval_line(&mut shell, &ctx, "sleep 30 & &").unwrap();
        assert!(shell.jobs.is_empty());
    }

    #[test]
    fn terminate_kills_tracked_jobs() {
        let (mut shell, ctx) = shell();
        eval_line(&mut shell, &ctx, "sleep 30 &").unwrap();
        let pid = shell.jobs.iter().next().unwrap().pid;
        shell.terminate_background_jobs();

        // either reaped already or dies from SIGTERM shortly
        if shell.jobs.contains(pid) {
            let finished = reap_until_done(&mut shell, &ctx);
            assert_eq!(
                finished[0].state,
                ProcessState::Completed(ExitStatus::Signaled(15))
            );
        }
        assert!(shell.jobs.is_empty());
    }
}
