use super::prompt::{UserPromptOperations, read_console_line};
use super::ui_constants::{
    ACTIVE_ITEM_INDICATOR_CHAR, EDIT_LINE_PROMPT, EDIT_TERMINATOR, HELP_LINES, RENAME_SEPARATOR,
};
use crate::core::{
    AggregateSummary, BackOutcome, DirectoryEntry, Navigator, NavigatorError, NavigatorMode,
    SelectOutcome,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

/*
 * The result of one shell command: lines to show, how to show them, and whether the
 * shell should exit afterwards.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub lines: Vec<String>,
    pub severity: MessageSeverity,
    pub quit: bool,
}

impl CommandOutcome {
    fn info(lines: Vec<String>) -> Self {
        CommandOutcome {
            lines,
            severity: MessageSeverity::Information,
            quit: false,
        }
    }

    fn line(text: impl Into<String>) -> Self {
        Self::info(vec![text.into()])
    }

    fn warning(text: impl Into<String>) -> Self {
        CommandOutcome {
            lines: vec![text.into()],
            severity: MessageSeverity::Warning,
            quit: false,
        }
    }

    fn error(err: &NavigatorError) -> Self {
        CommandOutcome {
            lines: vec![err.to_string()],
            severity: MessageSeverity::Error,
            quit: false,
        }
    }

    fn quit() -> Self {
        CommandOutcome {
            lines: Vec::new(),
            severity: MessageSeverity::Information,
            quit: true,
        }
    }
}

/*
 * Manages the interactive session on top of a `Navigator` in a terminal-agnostic way.
 * Each input line is parsed into a command and turned into a `CommandOutcome`; the
 * caller decides how to print it. Questions to the user (new names, confirmations,
 * multi-line input) go through `UserPromptOperations`, and a cancelled question always
 * short-circuits the command without touching the filesystem.
 */
pub struct ShellHandler {
    navigator: Navigator,
    prompt: Arc<dyn UserPromptOperations>,
}

impl ShellHandler {
    pub fn new(navigator: Navigator, prompt: Arc<dyn UserPromptOperations>) -> Self {
        ShellHandler { navigator, prompt }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn prompt_label(&self) -> String {
        match self.navigator.mode() {
            NavigatorMode::Browsing { .. } => format!("{}> ", self.navigator.display_path()),
            NavigatorMode::Editing { file_name, .. } => {
                let dirty_marker = if self.navigator.buffer().is_dirty() { "*" } else { "" };
                format!(
                    "{} [{file_name}{dirty_marker}]> ",
                    self.navigator.display_path()
                )
            }
        }
    }

    pub fn handle_line(&mut self, line: &str) -> CommandOutcome {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandOutcome::info(Vec::new());
        }
        let (command, argument) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };
        log::trace!("ShellHandler: Command '{command}' with argument '{argument}'");

        match command {
            "ls" => self.on_list(),
            "pwd" => self.on_where(),
            "cd" => self.on_change_directory(argument),
            "open" => self.on_open(argument),
            "select" => self.on_select(argument),
            "back" => self.on_back(),
            "show" => self.on_show(),
            "stats" => self.on_stats(),
            "set" => self.on_set(argument),
            "append" => self.on_append(argument),
            "edit" => self.on_edit(),
            "save" => self.on_save(),
            "new" => self.on_new_file(argument),
            "mkdir" => self.on_new_folder(argument),
            "rename" => self.on_rename(argument),
            "rm" => self.on_delete(argument),
            "export" => self.on_export(argument),
            "refresh" => self.on_refresh(),
            "help" => CommandOutcome::info(HELP_LINES.iter().map(|l| l.to_string()).collect()),
            "quit" | "exit" => self.on_quit(),
            other => CommandOutcome::warning(format!(
                "Unknown command '{other}'. Type 'help' for a list of commands."
            )),
        }
    }

    fn require_argument<'a>(argument: &'a str, usage: &str) -> Result<&'a str, CommandOutcome> {
        if argument.is_empty() {
            return Err(CommandOutcome::warning(format!("Usage: {usage}")));
        }
        Ok(argument)
    }

    fn format_entry(&self, entry: &DirectoryEntry) -> String {
        match entry {
            DirectoryEntry::Directory { name } => format!("  {name}/"),
            DirectoryEntry::File { name } => {
                if self.navigator.selection() == Some(name.as_str()) {
                    format!("{ACTIVE_ITEM_INDICATOR_CHAR} {name}")
                } else {
                    format!("  {name}")
                }
            }
        }
    }

    fn on_list(&self) -> CommandOutcome {
        let entries = self.navigator.entries();
        if entries.is_empty() {
            return CommandOutcome::line("(empty folder)");
        }
        CommandOutcome::info(entries.iter().map(|e| self.format_entry(e)).collect())
    }

    fn on_where(&self) -> CommandOutcome {
        let mut lines = vec![format!(
            "{} ({})",
            self.navigator.display_path(),
            self.navigator.current_path().display()
        )];
        if let NavigatorMode::Editing { file_name, .. } = self.navigator.mode() {
            lines.push(format!("Editing {file_name}"));
        }
        CommandOutcome::info(lines)
    }

    fn on_change_directory(&mut self, argument: &str) -> CommandOutcome {
        let name = match Self::require_argument(argument, "cd <folder>") {
            Ok(name) => name,
            Err(outcome) => return outcome,
        };
        if name == ".." {
            return self.on_back();
        }
        if !self.may_discard_changes() {
            return CommandOutcome::line("Cancelled.");
        }
        match self.navigator.enter_directory(name) {
            Ok(()) => self.on_list(),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_open(&mut self, argument: &str) -> CommandOutcome {
        let name = match Self::require_argument(argument, "open <note>") {
            Ok(name) => name,
            Err(outcome) => return outcome,
        };
        if self.navigator.find_entry(name).is_some_and(|e| e.is_dir()) {
            return CommandOutcome::warning(format!("'{name}' is a folder, use 'cd {name}'."));
        }
        if !self.may_discard_changes() {
            return CommandOutcome::line("Cancelled.");
        }
        match self.navigator.open_file(name) {
            Ok(()) => self.on_show(),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_select(&mut self, argument: &str) -> CommandOutcome {
        let name = match Self::require_argument(argument, "select <name>") {
            Ok(name) => name,
            Err(outcome) => return outcome,
        };
        if !self.may_discard_changes() {
            return CommandOutcome::line("Cancelled.");
        }
        match self.navigator.select_entry(name) {
            Ok(SelectOutcome::EnteredDirectory) => self.on_list(),
            Ok(SelectOutcome::OpenedFile) => self.on_show(),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_back(&mut self) -> CommandOutcome {
        if !self.may_discard_changes() {
            return CommandOutcome::line("Cancelled.");
        }
        match self.navigator.go_back() {
            Ok(BackOutcome::AtRoot) => CommandOutcome::line("Already at the root folder."),
            Ok(BackOutcome::ClosedFile) => CommandOutcome::line("Closed the note."),
            Ok(BackOutcome::MovedUp) => self.on_list(),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_show(&self) -> CommandOutcome {
        let buffer = self.navigator.buffer();
        let Some(file_name) = buffer.file_name() else {
            return CommandOutcome::line("No note is open.");
        };
        let mut lines = vec![format!("--- {file_name} ---")];
        lines.extend(buffer.text().lines().map(|l| l.to_string()));
        CommandOutcome::info(lines)
    }

    fn on_stats(&self) -> CommandOutcome {
        let buffer = self.navigator.buffer();
        let name = buffer.file_name().unwrap_or("(no note open)");
        let state = if buffer.is_dirty() { "unsaved changes" } else { "saved" };
        CommandOutcome::line(format!(
            "{name}: {} words, {} characters, {state}",
            buffer.word_count(),
            buffer.char_count()
        ))
    }

    fn require_open_note(&self) -> Option<CommandOutcome> {
        if self.navigator.buffer().is_open() {
            None
        } else {
            Some(CommandOutcome::warning(
                "No note is open. Use 'open <note>' first.",
            ))
        }
    }

    fn on_set(&mut self, argument: &str) -> CommandOutcome {
        if let Some(outcome) = self.require_open_note() {
            return outcome;
        }
        self.navigator.set_text(format!("{argument}\n"));
        self.on_stats()
    }

    fn on_append(&mut self, argument: &str) -> CommandOutcome {
        if let Some(outcome) = self.require_open_note() {
            return outcome;
        }
        let mut addition = String::new();
        let text = self.navigator.buffer().text();
        if !text.is_empty() && !text.ends_with('\n') {
            addition.push('\n');
        }
        addition.push_str(argument);
        addition.push('\n');
        self.navigator.append_text(&addition);
        self.on_stats()
    }

    fn on_edit(&mut self) -> CommandOutcome {
        if let Some(outcome) = self.require_open_note() {
            return outcome;
        }
        let mut text = String::new();
        loop {
            match self.prompt.prompt(EDIT_LINE_PROMPT) {
                Some(line) if line == EDIT_TERMINATOR => break,
                Some(line) => {
                    text.push_str(&line);
                    text.push('\n');
                }
                None => return CommandOutcome::line("Edit cancelled, buffer unchanged."),
            }
        }
        self.navigator.set_text(text);
        self.on_stats()
    }

    fn on_save(&mut self) -> CommandOutcome {
        match self.navigator.save_content() {
            Ok(true) => CommandOutcome::line(format!(
                "Saved {}.",
                self.navigator.buffer().file_name().unwrap_or_default()
            )),
            Ok(false) => CommandOutcome::warning("Nothing to save: no note is open."),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_new_file(&mut self, argument: &str) -> CommandOutcome {
        match self.navigator.create_file(argument) {
            Ok(file_name) => CommandOutcome::line(format!("Created {file_name}.")),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_new_folder(&mut self, argument: &str) -> CommandOutcome {
        match self.navigator.create_folder(argument) {
            Ok(()) => CommandOutcome::line(format!("Created folder {}.", argument.trim())),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_rename(&mut self, argument: &str) -> CommandOutcome {
        let argument = match Self::require_argument(argument, "rename <old> [-> new]") {
            Ok(argument) => argument,
            Err(outcome) => return outcome,
        };
        let (old_name, new_name) = match argument.split_once(RENAME_SEPARATOR) {
            Some((old, new)) => (old.trim().to_string(), new.trim().to_string()),
            None => {
                let old = argument.to_string();
                match self.prompt.prompt(&format!("New name for '{old}':")) {
                    Some(new) => (old, new.trim().to_string()),
                    None => return CommandOutcome::line("Rename cancelled."),
                }
            }
        };
        match self.navigator.rename_item(&old_name, &new_name) {
            Ok(true) => CommandOutcome::line(format!("Renamed {old_name} to {new_name}.")),
            Ok(false) => CommandOutcome::line("Name unchanged."),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_delete(&mut self, argument: &str) -> CommandOutcome {
        let name = match Self::require_argument(argument, "rm <name>") {
            Ok(name) => name,
            Err(outcome) => return outcome,
        };
        let question = match self.navigator.find_entry(name) {
            Some(DirectoryEntry::Directory { .. }) => {
                format!("Delete folder '{name}' and everything inside it?")
            }
            _ => format!("Delete '{name}'?"),
        };
        if !self.prompt.confirm(&question) {
            return CommandOutcome::line("Delete cancelled.");
        }
        match self.navigator.delete_item(name) {
            Ok(()) => CommandOutcome::line(format!("Deleted {name}.")),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn summary_line(summary: &AggregateSummary) -> String {
        let mut line = format!(
            "{} notes from {} folders",
            summary.markdown_files, summary.folders
        );
        if summary.failures > 0 {
            line.push_str(&format!(", {} unreadable entries skipped", summary.failures));
        }
        line
    }

    fn on_export(&mut self, argument: &str) -> CommandOutcome {
        if argument.is_empty() {
            let (document, summary) = self.navigator.aggregate_current();
            let mut lines: Vec<String> = document.lines().map(|l| l.to_string()).collect();
            lines.push(format!("({})", Self::summary_line(&summary)));
            return CommandOutcome::info(lines);
        }
        match self.navigator.export_current(Path::new(argument)) {
            Ok((target, summary)) => CommandOutcome::line(format!(
                "Exported {} to {}.",
                Self::summary_line(&summary),
                target.display()
            )),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_refresh(&mut self) -> CommandOutcome {
        match self.navigator.refresh() {
            Ok(()) => self.on_list(),
            Err(e) => CommandOutcome::error(&e),
        }
    }

    fn on_quit(&mut self) -> CommandOutcome {
        if !self.may_discard_changes() {
            return CommandOutcome::line("Cancelled.");
        }
        CommandOutcome::quit()
    }

    /*
     * Asks before an action would drop unsaved edits. True when nothing would be lost.
     */
    fn may_discard_changes(&self) -> bool {
        let buffer = self.navigator.buffer();
        if !buffer.is_open() || !buffer.is_dirty() {
            return true;
        }
        self.prompt.confirm(&format!(
            "'{}' has unsaved changes. Discard them?",
            buffer.file_name().unwrap_or_default()
        ))
    }
}

/*
 * Runs the read-eval-print loop on the console until `quit` or end of input.
 * Errors go to stderr, everything else to `output`.
 */
pub fn run_shell(handler: &mut ShellHandler, output: &mut impl Write) -> io::Result<()> {
    writeln!(
        output,
        "Notes at {}. Type 'help' for commands.",
        handler.navigator().root_path().display()
    )?;
    loop {
        write!(output, "{}", handler.prompt_label())?;
        output.flush()?;
        let Some(line) = read_console_line()? else {
            writeln!(output)?;
            break;
        };
        let outcome = handler.handle_line(&line);
        for text in &outcome.lines {
            match outcome.severity {
                MessageSeverity::Error => eprintln!("error: {text}"),
                MessageSeverity::Warning => writeln!(output, "warning: {text}")?,
                MessageSeverity::Information => writeln!(output, "{text}")?,
            }
        }
        if outcome.quit {
            break;
        }
    }
    log::debug!("ShellHandler: Shell loop finished.");
    Ok(())
}
