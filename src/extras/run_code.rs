use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use anyhow::Result;
use argh::FromArgs;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(FromArgs)]
/// Compile and run a C or C++ file, or run a Python script.
pub struct Run {
    #[argh(positional)]
    /// source file ending in .c, .cpp or .py.
    pub file: String,
}

impl BuiltinCommand for Run {
    fn name() -> &'static str {
        "run"
    }

    fn summary() -> &'static str {
        "compile and run a .c/.cpp file or run a .py script"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let source = ctx.env.current_dir.join(&self.file);
        if !source.is_file() {
            anyhow::bail!("run: {}: no such file", self.file);
        }

        let extension = source.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let compiler = match extension {
            "c" => "gcc",
            "cpp" => "g++",
            "py" => {
                ctx.run_checked(&["python3", self.file.as_str()])?;
                return Ok(Flow::Continue);
            }
            _ => anyhow::bail!("run: unsupported file type '{}' (expected .c, .cpp or .py)", self.file),
        };

        let binary = std::env::temp_dir().join(format!(
            "pss_run_{}_{}",
            std::process::id(),
            file_stem(&source)
        ));
        let binary_str = binary.to_string_lossy().to_string();

        if let Err(e) = ctx.run_checked(&[compiler, self.file.as_str(), "-o", binary_str.as_str()]) {
            anyhow::bail!("run: compilation failed: {:#}", e);
        }
        let result = ctx.run_checked(&[binary_str.as_str()]);
        if let Err(e) = fs::remove_file(&binary) {
            debug!(binary = %binary.display(), error = %e, "could not remove compiled program");
        }
        result?;
        Ok(Flow::Continue)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "program".to_string())
}
