/*
 * User-facing prompt and confirmation primitives. The shell asks through the
 * `UserPromptOperations` trait so rename/delete/edit flows can be driven by a mock in
 * tests; `ConsolePrompt` is the stdin/stdout implementation. A cancelled prompt
 * (end of input) is reported as `None` / `false`.
 */
use std::io::{self, Write};

pub trait UserPromptOperations: Send + Sync {
    /* Asks for a line of text. `None` means the user cancelled. */
    fn prompt(&self, message: &str) -> Option<String>;
    /* Asks a yes/no question. Anything but an explicit yes is a no. */
    fn confirm(&self, message: &str) -> bool;
}

/*
 * Reads one line from stdin without its line ending. Returns `Ok(None)` at end of input.
 * The stdin lock is only held for the duration of the read.
 */
pub fn read_console_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let bytes = io::stdin().read_line(&mut line)?;
    if bytes == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

pub struct ConsolePrompt {}

impl ConsolePrompt {
    pub fn new() -> Self {
        ConsolePrompt {}
    }

    fn ask(message: &str) -> Option<String> {
        print!("{message} ");
        if let Err(e) = io::stdout().flush() {
            log::warn!("ConsolePrompt: Failed to flush stdout: {e}");
        }
        match read_console_line() {
            Ok(line) => line,
            Err(e) => {
                log::error!("ConsolePrompt: Failed to read from stdin: {e}");
                None
            }
        }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl UserPromptOperations for ConsolePrompt {
    fn prompt(&self, message: &str) -> Option<String> {
        Self::ask(message)
    }

    fn confirm(&self, message: &str) -> bool {
        Self::ask(&format!("{message} [y/N]"))
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
