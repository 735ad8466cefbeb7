use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs + 'static {
    /// Canonical name of the command, e.g. "cd" or "help".
    fn name() -> &'static str;

    /// Short description shown by `help`.
    fn summary() -> &'static str;

    /// Executes the command. An `Err` is printed to the user and the shell continues.
    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow>;

    /// Builds the command straight from the typed words, with no flag parsing.
    ///
    /// Commands that take free text return `Some` so a word like `-v` reaches them
    /// untouched. `None` hands the words to `argh`.
    fn from_words(_args: &[&str]) -> Option<Self> {
        None
    }
}

pub(crate) fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "change the working directory"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => anyhow::bail!("cd: expected argument"),
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            ctx.env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        ctx.env.current_dir = canonical;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Describe the built-in commands.
pub struct Help {
    #[argh(positional)]
    /// command to describe; lists every builtin when omitted.
    pub command: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "show this list, or details about one builtin"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let Some(command) = self.command else {
            writeln!(ctx.out, "PSS - a small interactive shell")?;
            writeln!(
                ctx.out,
                "Type program names and arguments, and hit enter to run them."
            )?;
            writeln!(ctx.out, "The following are built-in commands:\n")?;
            let width = ctx.registry.list().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, summary) in ctx.registry.list() {
                writeln!(ctx.out, "  {:<width$}  {}", name, summary)?;
            }
            writeln!(
                ctx.out,
                "\nFor more information about external programs, use the 'man' command."
            )?;
            return Ok(Flow::Continue);
        };

        match ctx.registry.lookup(&command) {
            Some(builtin) => writeln!(ctx.out, "{}", builtin.usage().trim_end())?,
            None => writeln!(
                ctx.out,
                "No specific help available for '{}'. Use 'help' for a general list of commands.",
                command
            )?,
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub ignored: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn summary() -> &'static str {
        "leave the shell"
    }

    fn execute(self, _ctx: &mut Context<'_>) -> Result<Flow> {
        Ok(Flow::Terminate)
    }

    fn from_words(args: &[&str]) -> Option<Self> {
        Some(Exit {
            ignored: owned(args),
        })
    }
}

#[derive(FromArgs)]
/// Show the commands typed so far, with time and directory.
pub struct History {
    #[argh(positional, greedy)]
    /// pass -c to delete the history file.
    pub args: Vec<String>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn summary() -> &'static str {
        "show or clear the command history"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let log = &ctx.stores.history;
        match self.args.as_slice() {
            [] => {}
            [flag] if flag == "-c" => {
                log.clear()?;
                writeln!(ctx.out, "History cleared successfully.")?;
                return Ok(Flow::Continue);
            }
            _ => anyhow::bail!("Usage: history [-c]"),
        }

        writeln!(ctx.out, "History of commands used:")?;
        match log.read_all()? {
            Some(records) => {
                for record in records {
                    writeln!(ctx.out, "{}", record)?;
                }
            }
            None => writeln!(ctx.out, "No history found.")?,
        }
        Ok(Flow::Continue)
    }

    fn from_words(args: &[&str]) -> Option<Self> {
        Some(History { args: owned(args) })
    }
}

#[derive(FromArgs)]
/// Inspect or change the shell environment: `env search VAR`, `env set VAR VALUE`,
/// `env unset VAR`, `env list`. Without arguments runs the system `env`.
pub struct Env {
    #[argh(positional, greedy)]
    /// one of search, set, unset, list, followed by the variable name and the value
    /// for `set`.
    pub args: Vec<String>,
}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    fn summary() -> &'static str {
        "search, set, unset or list environment variables"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let Some((action, args)) = self.args.split_first() else {
            ctx.run_checked(&["env"])?;
            return Ok(Flow::Continue);
        };

        match (action.as_str(), args) {
            ("search", [name, ..]) => match ctx.env.get_var(name) {
                Some(value) => writeln!(ctx.out, "Found {}={}", name, value)?,
                None => writeln!(ctx.out, "Environment variable '{}' not found.", name)?,
            },
            ("search", []) => anyhow::bail!("Usage: env search <VAR_NAME>"),
            ("set", [name, value, ..]) => {
                if name.is_empty() || name.contains('=') {
                    anyhow::bail!("env: invalid variable name '{}'", name);
                }
                ctx.env.set_var(name.as_str(), value.as_str());
                writeln!(ctx.out, "Environment variable '{}' set to '{}'", name, value)?;
            }
            ("set", _) => anyhow::bail!("Usage: env set <VAR_NAME> <VALUE>"),
            ("unset", [name, ..]) => match ctx.env.remove_var(name) {
                Some(_) => writeln!(ctx.out, "Environment variable '{}' removed.", name)?,
                None => writeln!(ctx.out, "Environment variable '{}' was not set.", name)?,
            },
            ("unset", []) => anyhow::bail!("Usage: env unset <VAR_NAME>"),
            _ => {
                writeln!(ctx.out, "Environment variables:")?;
                writeln!(ctx.out, "----------------------------------------")?;
                for (name, value) in &ctx.env.vars {
                    writeln!(ctx.out, "{} = {}", name, value)?;
                }
                writeln!(ctx.out, "----------------------------------------")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn from_words(args: &[&str]) -> Option<Self> {
        Some(Env { args: owned(args) })
    }
}
