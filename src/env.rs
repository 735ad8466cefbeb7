use std::collections::BTreeMap;
use std::env as stdenv;
use std::path::PathBuf;

/// The shell's live environment table.
///
/// The environment contains:
/// - `vars`: the variables every spawned child receives, and nothing else.
/// - `current_dir`: the working directory children are started in.
///
/// `env set`/`env unset` edit `vars` directly, so the table is the single source of
/// truth for what external programs see.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME), sorted by key.
    pub vars: BTreeMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// An environment with no variables, rooted at `current_dir`.
    pub fn empty(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: BTreeMap::new(),
            current_dir: current_dir.into(),
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Remove a variable, returning its previous value.
    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Name of the user for the prompt; `unknown` when neither `USER` nor `LOGNAME`
    /// holds a non-empty value.
    pub fn user_name(&self) -> &str {
        ["USER", "LOGNAME"]
            .into_iter()
            .filter_map(|key| self.get_var(key))
            .find(|name| !name.is_empty())
            .unwrap_or("unknown")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
