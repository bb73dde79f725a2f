/*
 * This module provides the user-facing layer, centered around `ShellHandler`, which
 * acts as the presenter for the `Navigator`: it turns typed commands into navigator
 * transitions and formats the results. Prompts and confirmations go through
 * `UserPromptOperations`. Unit tests for `ShellHandler` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod prompt;
pub mod ui_constants;


pub use handler::{ShellHandler, run_shell};
pub use prompt::ConsolePrompt;
