use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use std::fs;
use std::io::{BufRead, BufReader, Write};

#[derive(FromArgs)]
/// Display the first lines of a file.
pub struct Preview {
    #[argh(positional)]
    /// file to preview.
    pub file: String,

    #[argh(option, short = 'n', default = "10")]
    /// number of lines to show.
    pub lines: usize,
}

impl BuiltinCommand for Preview {
    fn name() -> &'static str {
        "preview"
    }

    fn summary() -> &'static str {
        "show the first lines of a file"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let path = ctx.env.current_dir.join(&self.file);
        let file =
            fs::File::open(&path).with_context(|| format!("preview: {}", self.file))?;

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        for _ in 0..self.lines {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .with_context(|| format!("preview: read error in {}", self.file))?;
            if read == 0 {
                break;
            }
            ctx.out.write_all(&line)?;
            if !line.ends_with(b"\n") {
                writeln!(ctx.out)?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::tests::Harness;

    fn harness_with_file(content: &str) -> Harness {
        let mut h = Harness::new();
        fs::write(h.path().join("example.txt"), content).unwrap();
        h.env.current_dir = h.path().to_path_buf();
        h
    }

    #[test]
    fn default_is_ten_lines() {
        let content: String = (1..=15).map(|i| format!("line {}\n", i)).collect();
        let mut h = harness_with_file(&content);
        h.invoke("preview", &["example.txt"]);
        let out = h.take_output();
        assert_eq!(out.lines().count(), 10);
        assert!(out.ends_with("line 10\n"));
    }

    #[test]
    fn custom_line_count_and_short_file() {
        let mut h = harness_with_file("a\nb\nc");
        h.invoke("preview", &["example.txt", "-n", "2"]);
        assert_eq!(h.take_output(), "a\nb\n");

        h.invoke("preview", &["example.txt", "-n", "5"]);
        assert_eq!(h.take_output(), "a\nb\nc\n");
    }

    #[test]
    fn missing_file_is_reported() {
        let mut h = harness_with_file("");
        h.invoke("preview", &["nope.txt"]);
        assert!(h.take_output().starts_with("preview: nope.txt:"));
    }
}
