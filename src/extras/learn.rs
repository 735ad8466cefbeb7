use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::Result;
use argh::FromArgs;
use std::io::Write;

/// Topic, tutorial text.
const TUTORIALS: &[(&str, &str)] = &[
    (
        "ls",
        "ls lists directory contents.\n  ls          files in the current directory\n  ls -l       long format with permissions, owner, size and date\n  ls -a       include hidden files (names starting with '.')",
    ),
    (
        "cd",
        "cd changes the working directory.\n  cd /tmp     go to an absolute path\n  cd ..       go up one level\n  cd project  go into a subdirectory",
    ),
    (
        "pwd",
        "pwd prints the absolute path of the working directory.",
    ),
    (
        "mkdir",
        "mkdir creates directories.\n  mkdir notes        create one directory\n  mkdir -p a/b/c     create parents as needed",
    ),
    (
        "rm",
        "rm removes files. There is no undo.\n  rm file.txt     remove a file\n  rm -r dir       remove a directory and its contents\n  rm -i file.txt  ask before removing",
    ),
    (
        "cp",
        "cp copies files.\n  cp a.txt b.txt     copy a file\n  cp -r src dst      copy a directory recursively",
    ),
    (
        "mv",
        "mv moves or renames files.\n  mv old.txt new.txt   rename\n  mv file.txt dir/     move into a directory",
    ),
    (
        "cat",
        "cat prints files to the terminal.\n  cat notes.txt       show one file\n  cat a.txt b.txt     show several, one after another",
    ),
    (
        "grep",
        "grep prints lines matching a pattern.\n  grep main file.c     lines containing 'main'\n  grep -i todo *.txt   ignore case\n  grep -r fn src       search a directory recursively",
    ),
    (
        "chmod",
        "chmod changes file permissions.\n  chmod +x script.sh   make a file executable\n  chmod 644 notes.txt  owner read/write, others read",
    ),
];

#[derive(FromArgs)]
/// Show a short tutorial for a common command.
pub struct Learn {
    #[argh(positional)]
    /// command to learn about; lists topics when omitted.
    pub topic: Option<String>,
}

impl BuiltinCommand for Learn {
    fn name() -> &'static str {
        "learn"
    }

    fn summary() -> &'static str {
        "show a tutorial for a common command"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let topics = || TUTORIALS.iter().map(|(topic, _)| *topic).collect::<Vec<_>>().join(", ");
        let Some(topic) = self.topic else {
            writeln!(ctx.out, "Available topics: {}", topics())?;
            return Ok(Flow::Continue);
        };

        match TUTORIALS.iter().find(|(name, _)| *name == topic) {
            Some((_, text)) => writeln!(ctx.out, "{}", text)?,
            None => anyhow::bail!("learn: no tutorial for '{}'. Available topics: {}", topic, topics()),
        }
        Ok(Flow::Continue)
    }
}
