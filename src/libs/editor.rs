//! External editor sessions.
//!
//! Text is written to a temporary `.rst` file, the user's editor is run on
//! it, and the file is read back. The temporary file is removed when the
//! session ends, whether the editor succeeded or not.

use crate::libs::error::{Error, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    command: String,
}

impl Editor {
    /// `command` may carry arguments, as in `code --wait`.
    pub fn new(command: &str) -> Self {
        Editor {
            command: command.trim().to_string(),
        }
    }

    /// The configured editor, else `$EDITOR`, else `$VISUAL`.
    pub fn resolve(configured: Option<&str>) -> Result<Self> {
        configured
            .map(str::to_string)
            .or_else(|| env::var("EDITOR").ok())
            .or_else(|| env::var("VISUAL").ok())
            .filter(|command| !command.trim().is_empty())
            .map(|command| Editor::new(&command))
            .ok_or(Error::NoEditor)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Lets the user edit `text` and returns what they saved.
    pub fn edit(&self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new().prefix("master-").suffix(".rst").tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(Error::NoEditor)?;
        debug!(editor = %self.command, path = %file.path().display(), "starting editor");

        let status = Command::new(program).args(parts).arg(file.path()).status()?;
        if !status.success() {
            return Err(Error::EditorFailed {
                editor: self.command.clone(),
                status: status.to_string(),
            });
        }

        Ok(fs::read_to_string(file.path())?)
    }
}
