use crate::config::Config;
use crate::env::Environment;
use crate::external::Launcher;
use crate::extras::connections::ConnectionStore;
use crate::extras::definitions::DefinitionStore;
use crate::extras::reminders::ReminderStore;
use crate::history::HistoryLog;
use crate::registry::Registry;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure. Programs
/// killed by a signal are reported as `128 + signal`.
pub type ExitCode = i32;

/// What the read-eval loop should do after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,
    /// Leave the loop; the shell exits successfully.
    Terminate,
}

/// State owned by one shell instance and shared by the builtins that need it.
///
/// Every store lives here rather than in a static, so two interpreters in the same
/// process never see each other's reminders or files.
pub struct Stores {
    pub history: HistoryLog,
    pub definitions: DefinitionStore,
    pub connections: ConnectionStore,
    pub reminders: ReminderStore,
}

impl Stores {
    pub fn from_config(config: &Config) -> Self {
        Self {
            history: HistoryLog::new(&config.history_path),
            definitions: DefinitionStore::new(&config.definitions_path),
            connections: ConnectionStore::new(&config.connections_path),
            reminders: ReminderStore::with_capacity(config.reminder_capacity),
        }
    }
}

/// Everything a builtin may touch during one invocation.
pub struct Context<'a> {
    pub env: &'a mut Environment,
    pub stores: &'a mut Stores,
    /// Used by builtins that run helper programs (`run`, `ssh`, `compress`, `env`).
    pub launcher: &'a dyn Launcher,
    /// The table the builtin was found in; `help` lists it.
    pub registry: &'a Registry,
    pub out: &'a mut dyn Write,
}

impl Context<'_> {
    /// Run `argv` through the launcher and fail unless it exits with status 0.
    pub fn run_checked(&mut self, argv: &[&str]) -> anyhow::Result<()> {
        let code = self.launcher.spawn_and_wait(argv, self.env)?;
        if code != 0 {
            anyhow::bail!("{} exited with status {}", argv[0], code);
        }
        Ok(())
    }
}
