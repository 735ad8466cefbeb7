use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub name: String,
    pub host: String,
}

/// Saved SSH targets persisted as `name host` lines. Passwords are never stored.
#[derive(Debug, Clone)]
pub struct ConnectionStore {
    path: PathBuf,
}

impl ConnectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<Connection>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("ssh: can't read {}", self.path.display()));
            }
        };
        Ok(text
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                match (fields.next(), fields.next()) {
                    (Some(name), Some(host)) => Some(Connection {
                        name: name.to_string(),
                        host: host.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect())
    }

    pub fn find(&self, name: &str) -> Result<Option<Connection>> {
        Ok(self.load()?.into_iter().find(|c| c.name == name))
    }

    pub fn save(&self, name: &str, host: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("ssh: can't open {}", self.path.display()))?;
        writeln!(file, "{} {}", name, host)
            .with_context(|| format!("ssh: can't write {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Connect to a remote machine with the system `ssh`. A target that names a saved
/// connection connects to its host. Without a target lists saved connections.
pub struct Ssh {
    #[argh(positional)]
    /// user@host, or the name of a saved connection.
    pub target: Option<String>,

    #[argh(option, short = 's')]
    /// save the target under this name before connecting.
    pub save: Option<String>,
}

impl BuiltinCommand for Ssh {
    fn name() -> &'static str {
        "ssh"
    }

    fn summary() -> &'static str {
        "connect to a remote host, optionally saving it under a name"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let Some(target) = self.target else {
            let saved = ctx.stores.connections.load()?;
            if saved.is_empty() {
                writeln!(ctx.out, "No saved connections. Save one with: ssh <user@host> -s <name>")?;
            } else {
                writeln!(ctx.out, "Saved connections:")?;
                for connection in saved {
                    writeln!(ctx.out, "  {}  {}", connection.name, connection.host)?;
                }
            }
            return Ok(Flow::Continue);
        };

        let host = match ctx.stores.connections.find(&target)? {
            Some(connection) => connection.host,
            None => target,
        };

        if let Some(name) = self.save {
            if ctx.stores.connections.find(&name)?.is_some() {
                anyhow::bail!("ssh: a connection named '{}' already exists", name);
            }
            ctx.stores.connections.save(&name, &host)?;
            writeln!(ctx.out, "Saved connection '{}' -> {}", name, host)?;
        }

        ctx.run_checked(&["ssh", host.as_str()])?;
        Ok(Flow::Continue)
    }
}
