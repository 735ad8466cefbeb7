use crate::env::Environment;
use std::path::{Path, PathBuf};

/// Maximum number of reminders kept at once.
pub const REMINDER_CAPACITY: usize = 10;

/// Where the shell keeps its files, resolved once at startup.
///
/// All paths are absolute so that `cd` never moves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append-only log of every non-empty line typed.
    pub history_path: PathBuf,
    /// Tab-separated `term\tdefinition` lines written by `define`.
    pub definitions_path: PathBuf,
    /// `name host` lines written by `ssh -s`.
    pub connections_path: PathBuf,
    pub reminder_capacity: usize,
}

impl Config {
    /// Build the configuration from the shell environment.
    ///
    /// `PSS_HISTORY`, `PSS_DEFINITIONS` and `PSS_CONNECTIONS` override the default
    /// locations under `$HOME`. Without a home directory the files go to the
    /// starting directory (`history.txt` for the history log).
    pub fn from_env(env: &Environment) -> Self {
        let home = env
            .get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);
        let pick = |var: &str, in_home: &str, fallback: &str| -> PathBuf {
            let path = match (env.get_var(var), &home) {
                (Some(explicit), _) if !explicit.is_empty() => PathBuf::from(explicit),
                (_, Some(home)) => home.join(in_home),
                _ => PathBuf::from(fallback),
            };
            absolutize(&env.current_dir, path)
        };

        Self {
            history_path: pick("PSS_HISTORY", ".pss_history", "history.txt"),
            definitions_path: pick("PSS_DEFINITIONS", ".pss_definitions", ".pss_definitions"),
            connections_path: pick("PSS_CONNECTIONS", ".pss_connections", ".pss_connections"),
            reminder_capacity: REMINDER_CAPACITY,
        }
    }

    /// Configuration with every file inside `dir`; handy for tests and sandboxes.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            history_path: dir.join("history.txt"),
            definitions_path: dir.join("definitions.txt"),
            connections_path: dir.join("connections.txt"),
            reminder_capacity: REMINDER_CAPACITY,
        }
    }
}

/// Resolve `path` against `base` when it is relative.
pub fn absolutize(base: &Path, path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_in_home() {
        let mut env = Environment::empty("/work");
        env.set_var("HOME", "/home/ada");
        let config = Config::from_env(&env);
        assert_eq!(config.history_path, PathBuf::from("/home/ada/.pss_history"));
        assert_eq!(
            config.definitions_path,
            PathBuf::from("/home/ada/.pss_definitions")
        );
        assert_eq!(
            config.connections_path,
            PathBuf::from("/home/ada/.pss_connections")
        );
        assert_eq!(config.reminder_capacity, 10);
    }

    #[test]
    fn variables_override_defaults() {
        let mut env = Environment::empty("/work");
        env.set_var("HOME", "/home/ada");
        env.set_var("PSS_HISTORY", "logs/hist.txt");
        env.set_var("PSS_CONNECTIONS", "/etc/pss/conn");
        let config = Config::from_env(&env);
        assert_eq!(config.history_path, PathBuf::from("/work/logs/hist.txt"));
        assert_eq!(config.connections_path, PathBuf::from("/etc/pss/conn"));
    }

    #[test]
    fn without_home_uses_starting_directory() {
        let env = Environment::empty("/work");
        let config = Config::from_env(&env);
        assert_eq!(config.history_path, PathBuf::from("/work/history.txt"));
    }
}
