/*
 * Defines shared constants for the interactive shell: the application name used for
 * configuration and log locations, the prompt markers, and the help text listing
 * every command `ShellHandler` understands.
 */

// Name used to derive the configuration directory.
pub const APP_NAME: &str = "NoteExplorer";

pub const LOG_FILE_NAME: &str = "note_explorer.log";

// Marker shown in listings next to the open note.
pub const ACTIVE_ITEM_INDICATOR_CHAR: char = '●';

// Prompt shown while collecting lines for `edit`; a lone "." ends the input.
pub const EDIT_LINE_PROMPT: &str = "…";
pub const EDIT_TERMINATOR: &str = ".";

pub const RENAME_SEPARATOR: &str = "->";

pub const HELP_LINES: &[&str] = &[
    "ls                     list the current folder",
    "pwd                    show the current folder and open note",
    "cd <folder>            enter a folder (cd .. goes back)",
    "open <note>            open a note into the editor buffer",
    "select <name>          enter a folder or open a note",
    "back                   close the open note, or go up one folder",
    "show                   print the editor buffer",
    "stats                  word and character counts of the buffer",
    "set <text>             replace the buffer with one line of text",
    "append <text>          append a line to the buffer",
    "edit                   replace the buffer with typed lines, end with '.'",
    "save                   write the buffer to the open note",
    "new <name>             create a note (.md is added if missing)",
    "mkdir <name>           create a folder",
    "rename <old> [-> new]  rename a note or folder",
    "rm <name>              delete a note or folder (asks first)",
    "export [file]          aggregate all notes below here; print or write to file",
    "refresh                re-read the current folder",
    "help                   show this help",
    "quit                   leave",
];
