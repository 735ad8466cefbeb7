use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::{Context as _, Result};
use argh::FromArgs;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(FromArgs)]
/// Pack a file or directory into a gzipped tar archive, optionally encrypted, or
/// extract one.
pub struct Compress {
    #[argh(positional)]
    /// file or directory to pack, or the archive to extract with -x.
    pub path: String,

    #[argh(option, short = 'o')]
    /// archive name; defaults to <name>.tar.gz.
    pub output: Option<String>,

    #[argh(switch, short = 'e')]
    /// encrypt the archive with openssl (asks for a password).
    pub encrypt: bool,

    #[argh(switch, short = 'x')]
    /// extract the archive into the current directory.
    pub extract: bool,
}

impl BuiltinCommand for Compress {
    fn name() -> &'static str {
        "compress"
    }

    fn summary() -> &'static str {
        "create, encrypt or extract a .tar.gz archive"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        if self.extract {
            ctx.run_checked(&["tar", "-xzf", self.path.as_str()])
                .context("compress: extraction failed")?;
            writeln!(ctx.out, "Extracted {}", self.path)?;
            return Ok(Flow::Continue);
        }

        let archive = match self.output {
            Some(output) => output,
            None => default_archive_name(&self.path)?,
        };
        ctx.run_checked(&["tar", "-czf", archive.as_str(), self.path.as_str()])
            .context("compress: archiving failed")?;

        if !self.encrypt {
            writeln!(ctx.out, "Created {}", archive)?;
            return Ok(Flow::Continue);
        }

        let encrypted = format!("{}.enc", archive);
        ctx.run_checked(&[
            "openssl",
            "enc",
            "-aes-256-cbc",
            "-pbkdf2",
            "-salt",
            "-in",
            archive.as_str(),
            "-out",
            encrypted.as_str(),
        ])
        .context("compress: encryption failed")?;
        fs::remove_file(ctx.env.current_dir.join(&archive))
            .with_context(|| format!("compress: can't remove unencrypted {}", archive))?;
        writeln!(ctx.out, "Created {}", encrypted)?;
        Ok(Flow::Continue)
    }
}

fn default_archive_name(path: &str) -> Result<String> {
    let name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("compress: can't derive an archive name from '{}', use -o", path))?;
    Ok(format!("{}.tar.gz", name))
}
