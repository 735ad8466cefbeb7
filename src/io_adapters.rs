use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{self, BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// Where the read-eval loop gets its lines from.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` once input is exhausted before any character was read.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Interactive terminal input with line editing.
///
/// Lines are also kept in the editor's in-memory history for arrow-key recall. Ctrl-C
/// abandons the current line and yields an empty one; Ctrl-D ends input.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain buffered input, used when stdin is not a terminal.
///
/// The line is read as raw bytes and decoded lossily, so invalid UTF-8 never aborts
/// the loop.
pub struct Piped<R> {
    reader: R,
    show_prompt: bool,
}

impl<R: BufRead> Piped<R> {
    /// Reader that prints the prompt to stdout before each line.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            show_prompt: true,
        }
    }

    /// Reader that never prints a prompt.
    pub fn quiet(reader: R) -> Self {
        Self {
            reader,
            show_prompt: false,
        }
    }
}

impl<R: BufRead> LineSource for Piped<R> {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        if self.show_prompt {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Memory-backed writer for capturing what the shell prints.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
