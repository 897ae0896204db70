pub mod config;
pub mod parser;
pub mod process;
mod proxy;
pub mod repl;
pub mod shell;

pub use config::{Cli, Config, OverflowPolicy};
pub use parser::Command;
pub use repl::Repl;
pub use shell::Shell;
