use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use regex::{Regex, RegexBuilder};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Directories nested deeper than this below the starting directory are not visited.
const MAX_DEPTH: usize = 32;

#[derive(FromArgs)]
/// Recursively search every file under a directory for lines matching a pattern.
pub struct Search {
    #[argh(positional)]
    /// the pattern to search for (a regular expression).
    pub query: String,

    #[argh(positional)]
    /// directory to search in.
    pub dir: String,

    #[argh(switch, short = 'i')]
    /// ignore case distinctions.
    pub ignore_case: bool,
}

impl Search {
    /// Walk `dir` depth-first in name order. Symlinked directories are not followed,
    /// so the walk always terminates.
    fn walk(&self, dir: &Path, depth: usize, re: &Regex, out: &mut dyn Write) -> Result<usize> {
        let mut entries: Vec<_> = match fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|entry| entry.ok()).collect(),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return Ok(0);
            }
        };
        entries.sort_by_key(|entry| entry.file_name());

        let mut matches = 0;
        for entry in entries {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if depth < MAX_DEPTH {
                    matches += self.walk(&path, depth + 1, re, out)?;
                } else {
                    debug!(dir = %path.display(), "search depth limit reached");
                }
            } else if file_type.is_file() {
                matches += search_file(&path, re, out)?;
            }
        }
        Ok(matches)
    }
}

/// Print `path:line: text` for each matching line. Files that are not valid text are
/// skipped from the first undecodable line on.
fn search_file(path: &Path, re: &Regex, out: &mut dyn Write) -> Result<usize> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(file = %path.display(), error = %e, "skipping unreadable file");
            return Ok(0);
        }
    };

    let mut matches = 0;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let Ok(line) = line else {
            break;
        };
        if re.is_match(&line) {
            writeln!(out, "{}:{}: {}", path.display(), index + 1, line)?;
            matches += 1;
        }
    }
    Ok(matches)
}

impl BuiltinCommand for Search {
    fn name() -> &'static str {
        "search"
    }

    fn summary() -> &'static str {
        "search files under a directory for a pattern"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let re = RegexBuilder::new(&self.query)
            .case_insensitive(self.ignore_case)
            .build()
            .with_context(|| format!("search: invalid pattern: {}", self.query))?;

        let root = ctx.env.current_dir.join(&self.dir);
        if !root.is_dir() {
            anyhow::bail!("search: {}: not a directory", self.dir);
        }

        if self.walk(&root, 0, &re, ctx.out)? == 0 {
            writeln!(ctx.out, "No matches found for '{}'.", self.query)?;
        }
        Ok(Flow::Continue)
    }
}
