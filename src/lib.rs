//! A small interactive shell.
//!
//! Each line read from the user is split on whitespace, looked up in a fixed table of
//! built-in commands and, when no builtin matches, launched as an external program
//! that the shell waits for. Control flows back to the read-eval loop as a [`Flow`]
//! value: builtins and the launcher either ask the loop to keep going or to stop.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and
//! [`env`] expose the types a caller needs to drive it or to plug in a different
//! [`Launcher`](external::Launcher).

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod extras;
pub mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod registry;

pub use command::Flow;
pub use config::Config;
pub use interpreter::Interpreter;
