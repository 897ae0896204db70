use nix::unistd::Pid;
use smsh_types::{SmshError, SmshResult};

pub const BACKGROUND: &str = "&";
pub const INPUT_REDIRECT: &str = "<";
pub const OUTPUT_REDIRECT: &str = ">";
pub const COMMENT: char = '#';
pub const PID_VARIABLE: &str = "$$";

/// One parsed command line. `argv` never contains redirection operators,
/// their targets or the background marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}

impl Command {
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(|s| s.as_str())
    }
}

pub fn split_words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Blank lines and comments never reach the dispatcher.
pub fn is_noop(words: &[String]) -> bool {
    match words.first() {
        None => true,
        Some(first) => first.starts_with(COMMENT),
    }
}

pub fn expand_pid(word: &str, pid: Pid) -> String {
    if word.contains(PID_VARIABLE) {
        word.replace(PID_VARIABLE, &pid.to_string())
    } else {
        word.to_string()
    }
}

pub fn parse_command(words: Vec<String>, pid: Pid) -> SmshResult<Command> {
    let mut words: Vec<String> = words.iter().map(|w| expand_pid(w, pid)).collect();

    let background = words.last().is_some_and(|w| w == BACKGROUND);
    if background {
        words.pop();
    }

    let mut command = Command {
        background,
        ..Command::default()
    };
    let mut iter = words.into_iter();
    while let Some(word) = iter.next() {
        match word.as_str() {
            INPUT_REDIRECT => command.input = Some(redirect_target(&mut iter, INPUT_REDIRECT)?),
            OUTPUT_REDIRECT => {
                command.output = Some(redirect_target(&mut iter, OUTPUT_REDIRECT)?)
            }
            BACKGROUND => {
                return Err(SmshError::Syntax(format!(
                    "'{BACKGROUND}' is only allowed at the end of a command"
                )));
            }
            _ => command.argv.push(word),
        }
    }
    Ok(command)
}

fn redirect_target(iter: &mut impl Iterator<Item = String>, op: &str) -> SmshResult<String> {
    match iter.next() {
        Some(target) if !is_operator(&target) => Ok(target),
        _ => Err(SmshError::Syntax(format!("missing file name after '{op}'"))),
    }
}

fn is_operator(word: &str) -> bool {
    matches!(word, INPUT_REDIRECT | OUTPUT_REDIRECT | BACKGROUND)
}
