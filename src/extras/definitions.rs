use crate::builtin::{BuiltinCommand, owned};
use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Term/definition pairs persisted as `term\tdefinition` lines.
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    path: PathBuf,
}

impl DefinitionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All definitions in file order. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<(String, String)>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("define: can't read {}", self.path.display()));
            }
        };
        Ok(text
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(term, definition)| (term.to_string(), definition.to_string()))
            .collect())
    }

    pub fn get(&self, term: &str) -> Result<Option<String>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|(t, _)| t == term)
            .map(|(_, definition)| definition))
    }

    /// Store `definition` for `term`, replacing an earlier one.
    pub fn set(&self, term: &str, definition: &str) -> Result<()> {
        let mut entries = self.load()?;
        match entries.iter_mut().find(|(t, _)| t == term) {
            Some(entry) => entry.1 = definition.to_string(),
            None => entries.push((term.to_string(), definition.to_string())),
        }

        let mut text = String::new();
        for (term, definition) in &entries {
            text.push_str(term);
            text.push('\t');
            text.push_str(definition);
            text.push('\n');
        }
        fs::write(&self.path, text)
            .with_context(|| format!("define: can't write {}", self.path.display()))
    }
}

#[derive(FromArgs)]
/// Store or look up definitions: `define <term> <definition...>`, `define <term>`,
/// `define all`.
pub struct Define {
    #[argh(positional)]
    /// term to define or look up, or `all`.
    pub term: String,

    #[argh(positional, greedy)]
    /// definition text.
    pub definition: Vec<String>,
}

impl BuiltinCommand for Define {
    fn name() -> &'static str {
        "define"
    }

    fn summary() -> &'static str {
        "store or look up a definition for a term"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let store = &ctx.stores.definitions;
        if self.term == "all" && self.definition.is_empty() {
            let entries = store.load()?;
            if entries.is_empty() {
                writeln!(ctx.out, "No definitions stored.")?;
            }
            for (term, definition) in entries {
                writeln!(ctx.out, "{}: {}", term, definition)?;
            }
        } else if self.definition.is_empty() {
            match store.get(&self.term)? {
                Some(definition) => writeln!(ctx.out, "{}: {}", self.term, definition)?,
                None => writeln!(ctx.out, "No definition found for '{}'.", self.term)?,
            }
        } else {
            store.set(&self.term, &self.definition.join(" "))?;
            writeln!(ctx.out, "Definition for '{}' saved.", self.term)?;
        }
        Ok(Flow::Continue)
    }

    fn from_words(args: &[&str]) -> Option<Self> {
        let (term, definition) = args.split_first()?;
        Some(Define {
            term: term.to_string(),
            definition: owned(definition),
        })
    }
}
