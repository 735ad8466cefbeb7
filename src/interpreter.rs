use crate::command::{Context, Flow, Stores};
use crate::config::Config;
use crate::env::Environment;
use crate::external::{Launcher, ProcessLauncher};
use crate::io_adapters::LineSource;
use crate::lexer;
use crate::registry::Registry;
use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// An interactive shell: the builtin table, the environment children inherit, the
/// per-session stores and the launcher used for everything that is not a builtin.
///
/// Example
/// ```no_run
/// use pss::{Config, Flow, Interpreter};
/// use pss::env::Environment;
///
/// let env = Environment::new();
/// let mut sh = Interpreter::new(Config::from_env(&env), env);
/// assert_eq!(sh.execute(&["exit"]), Flow::Terminate);
/// ```
pub struct Interpreter {
    env: Environment,
    stores: Stores,
    registry: Registry,
    launcher: Box<dyn Launcher>,
    out: Box<dyn Write>,
}

impl Interpreter {
    /// Shell with the default builtins, real process launching and output to stdout.
    pub fn new(config: Config, env: Environment) -> Self {
        Self::with_parts(
            config,
            env,
            Registry::default(),
            Box::new(ProcessLauncher),
            Box::new(std::io::stdout()),
        )
    }

    pub fn with_parts(
        config: Config,
        env: Environment,
        registry: Registry,
        launcher: Box<dyn Launcher>,
        out: Box<dyn Write>,
    ) -> Self {
        debug!(history = %config.history_path.display(), "starting shell");
        Self {
            env,
            stores: Stores::from_config(&config),
            registry,
            launcher,
            out,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Run one argument vector: a builtin when the name is registered, otherwise an
    /// external program. An empty vector is a no-op.
    pub fn execute(&mut self, argv: &[&str]) -> Flow {
        let Some((&name, args)) = argv.split_first() else {
            return Flow::Continue;
        };

        if let Some(builtin) = self.registry.lookup(name) {
            let mut ctx = Context {
                env: &mut self.env,
                stores: &mut self.stores,
                launcher: self.launcher.as_ref(),
                registry: &self.registry,
                out: self.out.as_mut(),
            };
            let flow = builtin.invoke(args, &mut ctx);
            let _ = self.out.flush();
            return flow;
        }

        let _ = self.out.flush();
        match self.launcher.launch(argv, &self.env) {
            Ok(flow) => flow,
            Err(e) => {
                let _ = writeln!(self.out, "pss: {}", e);
                let _ = self.out.flush();
                Flow::Continue
            }
        }
    }

    /// Handle one raw input line: log it, split it and run it.
    pub fn execute_line(&mut self, line: &str) -> Flow {
        if !line.is_empty() {
            self.record_history(line);
        }
        let argv = lexer::split_line(line);
        self.execute(&argv)
    }

    /// Read and run lines until a builtin asks to stop or input runs out.
    pub fn repl(&mut self, input: &mut dyn LineSource) {
        loop {
            self.announce_due_reminders();
            let prompt = self.prompt();
            let line = match input.read_line(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            };
            if self.execute_line(&line) == Flow::Terminate {
                break;
            }
        }
    }

    /// `user@pss:/current/dir $ ` in color; unknown parts become `unknown`.
    pub fn prompt(&self) -> String {
        format!(
            "\x1b[1;32m{}@pss:\x1b[0m\x1b[1;34m{}\x1b[0m $ ",
            self.env.user_name(),
            current_dir_or_unknown().display()
        )
    }

    /// Best effort: a failing history write is logged and otherwise ignored.
    fn record_history(&mut self, line: &str) {
        let cwd = current_dir_or_unknown();
        if let Err(e) = self.stores.history.append(Local::now(), &cwd, line) {
            debug!(error = %format!("{:#}", e), "skipping history record");
        }
    }

    fn announce_due_reminders(&mut self) {
        for reminder in self.stores.reminders.take_due(Local::now().naive_local()) {
            let _ = writeln!(
                self.out,
                "Reminder: {} (due {})",
                reminder.task,
                reminder.due.format("%Y-%m-%d %H:%M:%S")
            );
        }
        let _ = self.out.flush();
    }
}

fn current_dir_or_unknown() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        warn!(error = %e, "can't determine working directory");
        PathBuf::from("unknown")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::tests::{RecordingLauncher, lock_current_dir};
    use crate::external::LaunchError;
    use crate::io_adapters::{MemWriter, Piped};
    use std::io::Cursor;
    use std::rc::Rc;

    /// Launcher that forwards to a shared [`RecordingLauncher`] so the test can look at
    /// the calls after handing ownership to the interpreter.
    struct Shared(Rc<RecordingLauncher>);

    impl Launcher for Shared {
        fn spawn_and_wait(&self, argv: &[&str], env: &Environment) -> Result<i32, LaunchError> {
            self.0.spawn_and_wait(argv, env)
        }
    }

    struct Fixture {
        shell: Interpreter,
        out: MemWriter,
        launcher: Rc<RecordingLauncher>,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let launcher = Rc::new(RecordingLauncher::default());
            let out = MemWriter::new();
            let mut env = Environment::empty(std::env::current_dir().unwrap());
            env.set_var("PATH", "/usr/bin:/bin");
            let shell = Interpreter::with_parts(
                Config::in_dir(dir.path()),
                env,
                Registry::default(),
                Box::new(Shared(launcher.clone())),
                Box::new(out.clone()),
            );
            Self {
                shell,
                out,
                launcher,
                _dir: dir,
            }
        }

        fn launched(&self) -> Vec<Vec<String>> {
            self.launcher.calls.borrow().clone()
        }

        fn history(&self) -> Option<Vec<String>> {
            self.shell.stores().history.read_all().unwrap()
        }
    }

    #[test]
    fn blank_lines_do_nothing() {
        let mut f = Fixture::new();
        assert_eq!(f.shell.execute(&[]), Flow::Continue);
        assert_eq!(f.shell.execute_line(""), Flow::Continue);
        assert!(f.launched().is_empty());
        assert_eq!(f.out.contents(), "");
        assert!(f.history().is_none());
    }

    #[test]
    fn whitespace_line_is_logged_but_not_run() {
        let mut f = Fixture::new();
        assert_eq!(f.shell.execute_line("   \t"), Flow::Continue);
        assert!(f.launched().is_empty());
        assert_eq!(f.history().unwrap().len(), 1);
    }

    #[test]
    fn exit_terminates() {
        let mut f = Fixture::new();
        assert_eq!(f.shell.execute_line("exit"), Flow::Terminate);
    }

    #[test]
    fn unknown_names_go_to_the_launcher() {
        let mut f = Fixture::new();
        assert_eq!(f.shell.execute_line("ls -la"), Flow::Continue);
        assert_eq!(
            f.launched(),
            vec![vec!["ls".to_string(), "-la".to_string()]]
        );
    }

    #[test]
    fn external_exit_status_does_not_stop_the_shell() {
        let mut f = Fixture::new();
        f.launcher.exit_code.set(1);
        assert_eq!(f.shell.execute_line("false"), Flow::Continue);
        assert_eq!(f.out.contents(), "");
    }

    #[test]
    fn builtins_never_reach_the_launcher() {
        let mut f = Fixture::new();
        // `env` also exists as /usr/bin/env; the builtin must win.
        assert_eq!(f.shell.execute_line("env search PATH"), Flow::Continue);
        assert_eq!(f.shell.execute_line("help"), Flow::Continue);
        assert_eq!(f.shell.execute_line("history"), Flow::Continue);
        assert!(f.launched().is_empty());
        assert!(f.out.contents().contains("Found PATH=/usr/bin:/bin"));
    }

    #[test]
    fn missing_program_is_diagnosed_and_shell_survives() {
        let dir = tempfile::tempdir().unwrap();
        let out = MemWriter::new();
        let mut env = Environment::empty(std::env::current_dir().unwrap());
        env.set_var("PATH", dir.path().to_string_lossy().to_string());
        let mut shell = Interpreter::with_parts(
            Config::in_dir(dir.path()),
            env,
            Registry::default(),
            Box::new(ProcessLauncher),
            Box::new(out.clone()),
        );

        assert_eq!(shell.execute_line("no-such-program-pss --flag"), Flow::Continue);
        assert_eq!(
            out.contents(),
            "pss: no-such-program-pss: command not found\n"
        );
    }

    #[test]
    fn history_records_every_non_empty_line_in_order() {
        let _lock = lock_current_dir();
        let mut f = Fixture::new();
        f.shell.execute_line("echo one");
        f.shell.execute_line("");
        f.shell.execute_line("echo two");

        let records = f.history().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with("] echo one"));
        assert!(records[1].ends_with("] echo two"));
        let cwd = std::env::current_dir().unwrap();
        assert!(records[0].contains(&format!("[{}]", cwd.display())));
    }

    #[test]
    fn repl_stops_at_exit() {
        let mut f = Fixture::new();
        let mut input = Piped::quiet(Cursor::new(b"ls\n\nexit\nwhoami\n".to_vec()));
        f.shell.repl(&mut input);
        assert_eq!(f.launched(), vec![vec!["ls".to_string()]]);

        let records = f.history().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].ends_with("] exit"));
    }

    #[test]
    fn repl_stops_at_end_of_input() {
        let mut f = Fixture::new();
        let mut input = Piped::quiet(Cursor::new(b"pwd\n".to_vec()));
        f.shell.repl(&mut input);
        assert_eq!(f.launched(), vec![vec!["pwd".to_string()]]);
    }

    #[test]
    fn cd_failure_keeps_directory_and_continues() {
        let _lock = lock_current_dir();
        let mut f = Fixture::new();
        let before = std::env::current_dir().unwrap();

        assert_eq!(f.shell.execute_line("cd /nonexistent-path"), Flow::Continue);

        assert_eq!(std::env::current_dir().unwrap(), before);
        assert_eq!(f.shell.env().current_dir, before);
        assert!(f.out.contents().starts_with("cd: /nonexistent-path"));
    }

    #[test]
    fn due_reminders_are_announced_once() {
        let mut f = Fixture::new();
        f.shell.execute_line("remind stretch 2000-01-01 00:00:00");
        let mut input = Piped::quiet(Cursor::new(b"\n\n".to_vec()));
        f.shell.repl(&mut input);

        let out = f.out.contents();
        assert_eq!(out.matches("Reminder: stretch (due 2000-01-01 00:00:00)").count(), 1);
        assert!(f.shell.stores().reminders.pending().is_empty());
    }

    #[test]
    fn prompt_shows_user_and_directory() {
        let mut f = Fixture::new();
        f.shell.execute_line("env set USER ada");
        let prompt = f.shell.prompt();
        assert!(prompt.contains("ada@pss:"));
        assert!(prompt.ends_with(" $ "));
    }

    #[test]
    fn independent_shells_keep_separate_state() {
        let mut a = Fixture::new();
        let b = Fixture::new();
        a.shell.execute_line("remind tea 2099-01-01 12:00:00");
        a.shell.execute_line("define rust a language");
        assert_eq!(a.shell.stores().reminders.pending().len(), 1);
        assert!(b.shell.stores().reminders.pending().is_empty());
        assert!(b.shell.stores().definitions.load().unwrap().is_empty());
    }
}
