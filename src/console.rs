//! Colored console output and line input.
//!
//! Every kind of output has its own color: user input cyan, bot replies
//! green, headers yellow, errors red, and plain information white.

use crate::error::Result;
use colored::{ColoredString, Colorize};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use tracing::debug;

/// Writes colored transcript lines to any sink (stdout in the app, a buffer in tests).
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn line(&mut self, text: ColoredString) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Headers, labels and the banner.
    pub fn system(&mut self, text: &str) -> Result<()> {
        self.line(text.yellow())
    }

    pub fn info(&mut self, text: &str) -> Result<()> {
        self.line(text.white())
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        self.line(text.red())
    }

    /// A yellow label followed by a white value on the same line.
    pub fn field(&mut self, label: &str, value: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{}{}", label.yellow(), value.to_string().white())?;
        Ok(())
    }

    /// One streamed fragment of the bot's reply, written immediately.
    pub fn reply_chunk(&mut self, chunk: &str) -> Result<()> {
        write!(self.out, "{}", chunk.green())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn end_reply(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }
}

/// Result of asking for one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C: the current line was abandoned.
    Interrupted,
    /// Ctrl-D or closed input.
    Eof,
}

/// Where the session loop gets its input from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Interactive input with line editing and in-memory history.
pub struct ReadlineSource {
    editor: DefaultEditor,
}

impl ReadlineSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for ReadlineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(&prompt.cyan().to_string()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!("Could not record input history: {}", e);
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory sink so tests can read back what was written.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub fn buffered_console() -> (Console, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Console::new(Box::new(buffer.clone())), buffer)
    }

    /// Plays back a fixed script of input events, then reports end of input.
    pub struct ScriptedInput(VecDeque<ReadOutcome>);

    impl ScriptedInput {
        pub fn lines(lines: &[&str]) -> Self {
            Self(lines.iter().map(|l| ReadOutcome::Line(l.to_string())).collect())
        }

        pub fn events(events: Vec<ReadOutcome>) -> Self {
            Self(events.into())
        }
    }

    impl LineSource for ScriptedInput {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
            Ok(self.0.pop_front().unwrap_or(ReadOutcome::Eof))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_lines_are_written_in_order() {
        let (mut console, buffer) = buffered_console();

        console.system("Current configuration:").unwrap();
        console.field(" - Temperature: ", 0.3).unwrap();
        console.error("Invalid temperature.").unwrap();

        let out = buffer.contents();
        let header = out.find("Current configuration:").unwrap();
        let field = out.find("0.3").unwrap();
        let error = out.find("Invalid temperature.").unwrap();
        assert!(header < field && field < error);
    }

    #[test]
    fn test_reply_chunks_share_one_line() {
        let (mut console, buffer) = buffered_console();

        console.reply_chunk("Hello").unwrap();
        console.reply_chunk(" there").unwrap();
        console.end_reply().unwrap();

        let out = buffer.contents();
        assert!(out.contains("Hello"));
        assert!(out.contains(" there"));
        assert_eq!(out.matches('\n').count(), 1);
    }

    #[test]
    fn test_scripted_input_ends_with_eof() {
        let mut input = ScriptedInput::lines(&["hello"]);

        assert_eq!(input.read_line("> ").unwrap(), ReadOutcome::Line("hello".to_string()));
        assert_eq!(input.read_line("> ").unwrap(), ReadOutcome::Eof);
    }
}
