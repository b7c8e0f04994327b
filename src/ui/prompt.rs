use std::io::BufRead;

use inquire::{InquireError, Text};

use crate::error::Result;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of the yes/no answer before committing
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Confirmer {
    /// Ask `question` and return the raw answer.
    ///
    /// `None` means the prompt was aborted (Esc, Ctrl-C, closed input).
    fn ask(&self, question: &str) -> Result<Option<String>>;
}

/// Reads the answer from the terminal
///
/// Falls back to a plain line read when stdin is not a TTY, so answers can
/// be piped in.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn ask(&self, question: &str) -> Result<Option<String>> {
        match Text::new(question).prompt() {
            Ok(answer) => Ok(Some(answer)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(InquireError::NotTTY) => read_stdin_line(),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_stdin_line() -> Result<Option<String>> {
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    Ok((read > 0).then_some(line))
}

/// Only a lone `y` or `Y` confirms
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}
