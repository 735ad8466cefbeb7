//! Launching external programs.
//!
//! Every child is spawned with the shell's own [`Environment`] and waited for before
//! control returns, so at most one child exists at a time and none is left unreaped.

use crate::command::{ExitCode, Flow};
use crate::env::Environment;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("empty command")]
    EmptyCommand,

    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program}: failed to start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program}: failed to wait for child: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can run an external program to completion.
pub trait Launcher {
    /// Spawn `argv[0]` with arguments `argv[1..]` and block until it terminates.
    ///
    /// Returns the child's exit code; a child killed by a signal yields `128 + signal`.
    fn spawn_and_wait(&self, argv: &[&str], env: &Environment) -> Result<ExitCode, LaunchError>;

    /// Run an external command on behalf of the read-eval loop.
    ///
    /// The child's own exit status never stops the shell, so success is always
    /// [`Flow::Continue`].
    fn launch(&self, argv: &[&str], env: &Environment) -> Result<Flow, LaunchError> {
        let code = self.spawn_and_wait(argv, env)?;
        debug!(program = argv[0], code, "external command finished");
        Ok(Flow::Continue)
    }
}

/// [`Launcher`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn spawn_and_wait(&self, argv: &[&str], env: &Environment) -> Result<ExitCode, LaunchError> {
        let (&program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(OsStr::new(search_paths), Path::new(program))
            .ok_or_else(|| LaunchError::NotFound {
                program: program.to_string(),
            })?;

        let mut command = Command::new(&*executable);
        command
            .args(args)
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(program);
        }

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        debug!(pid = child.id(), program, path = %executable.display(), "spawned child");

        // `wait` only returns once the child has exited or was killed; stop/continue
        // transitions in between keep it blocked.
        let status = child.wait().map_err(|source| LaunchError::Wait {
            program: program.to_string(),
            source,
        })?;
        Ok(status.code().unwrap_or_else(|| terminated_by_signal(status)))
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(osstr("/bin"), path).expect("absolute /bin/sh");
        assert_eq!(&*found, path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let res = find_command_path(osstr("/bin"), Path::new("/bin/nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let found = find_command_path(osstr("/nonexistent-dir:/bin"), Path::new("sh"))
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(&*found, Path::new("/bin/sh"));
    }

    #[test]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("nonexisting-cmd-for-pss"));
        assert!(res.is_none());
    }

    #[test]
    fn directories_on_path_are_not_commands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tool")).unwrap();
        let res = find_command_path(dir.path().as_os_str(), Path::new("tool"));
        assert!(res.is_none());
    }

    #[cfg(unix)]
    fn make_file(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        File::create(path).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn file_on_custom_path_is_found() {
        let dir = tempfile::tempdir().unwrap();
        make_file(&dir.path().join("tool"), 0o755);
        let found = find_command_path(dir.path().as_os_str(), Path::new("tool")).unwrap();
        assert_eq!(&*found, dir.path().join("tool").as_path());
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_file_does_not_shadow_later_entry() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        make_file(&first.path().join("tool"), 0o644);
        make_file(&second.path().join("tool"), 0o755);

        let search = std::env::join_paths([first.path(), second.path()]).unwrap();
        let found = find_command_path(&search, Path::new("tool")).unwrap();
        assert_eq!(&*found, second.path().join("tool").as_path());

        let only_first = find_command_path(first.path().as_os_str(), Path::new("tool"));
        assert!(only_first.is_none());
    }

    #[test]
    fn empty_path_is_none() {
        assert!(find_command_path(osstr("/bin"), Path::new("")).is_none());
    }

    #[cfg(unix)]
    fn shell_env() -> Environment {
        let mut env = Environment::empty(std::env::temp_dir());
        env.set_var("PATH", "/usr/bin:/bin");
        env
    }

    #[test]
    #[cfg(unix)]
    fn reports_child_exit_code() {
        let code = ProcessLauncher
            .spawn_and_wait(&["sh", "-c", "exit 3"], &shell_env())
            .unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    #[cfg(unix)]
    fn reports_signal_termination() {
        let code = ProcessLauncher
            .spawn_and_wait(&["sh", "-c", "kill -9 $$"], &shell_env())
            .unwrap();
        assert_eq!(code, 128 + 9);
    }

    #[test]
    #[cfg(unix)]
    fn child_sees_only_the_shell_environment() {
        let mut env = shell_env();
        env.set_var("PSS_MARKER", "present");
        let script = r#"[ "$PSS_MARKER" = present ] && [ -z "$PSS_NOT_SET" ]"#;
        let code = ProcessLauncher
            .spawn_and_wait(&["sh", "-c", script], &env)
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    #[cfg(unix)]
    fn failing_command_still_continues() {
        let flow = ProcessLauncher.launch(&["false"], &shell_env()).unwrap();
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn missing_program_is_not_found() {
        let err = ProcessLauncher
            .launch(&["definitely-not-a-real-program-pss"], &Environment::empty("."))
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "definitely-not-a-real-program-pss: command not found"
        );
    }

    #[test]
    fn empty_argv_is_rejected() {
        let err = ProcessLauncher
            .spawn_and_wait(&[], &Environment::empty("."))
            .unwrap_err();
        assert!(matches!(err, LaunchError::EmptyCommand));
    }
}
