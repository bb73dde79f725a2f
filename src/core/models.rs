use super::checksum_utils;
use std::path::Path;

pub const MARKDOWN_EXTENSION: &str = "md";

/*
 * Returns true if the name ends with the Markdown extension (case-insensitive).
 */
pub fn is_markdown_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}

/*
 * Strips the Markdown extension from a file name, if present.
 */
pub fn markdown_stem(name: &str) -> &str {
    if !is_markdown_name(name) {
        return name;
    }
    let cut = name.len() - MARKDOWN_EXTENSION.len() - 1;
    &name[..cut]
}

/*
 * One child of a listed directory.
 * The name is unique within its parent and doubles as the lookup identifier.
 * Entries are a transient projection of the filesystem, recomputed on every listing.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    Directory { name: String },
    File { name: String },
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        match self {
            DirectoryEntry::Directory { name } | DirectoryEntry::File { name } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, DirectoryEntry::Directory { .. })
    }
}

/*
 * The in-memory text of the currently open note.
 * `file_name` is relative to the navigator's current path. The text diverges from the
 * on-disk content until an explicit save; `persisted_checksum` remembers what was last
 * loaded or saved so `is_dirty` can be answered without a second copy of the text.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorBuffer {
    file_name: Option<String>,
    text: String,
    persisted_checksum: Option<String>,
}

impl EditorBuffer {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn loaded(file_name: String, text: String) -> Self {
        let checksum = checksum_utils::calculate_text_checksum(&text);
        EditorBuffer {
            file_name: Some(file_name),
            text,
            persisted_checksum: Some(checksum),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_open(&self) -> bool {
        self.file_name.is_some()
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn rename_to(&mut self, new_name: String) {
        if self.file_name.is_some() {
            self.file_name = Some(new_name);
        }
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.persisted_checksum = Some(checksum_utils::calculate_text_checksum(&self.text));
    }

    pub fn is_dirty(&self) -> bool {
        match &self.persisted_checksum {
            Some(checksum) => *checksum != checksum_utils::calculate_text_checksum(&self.text),
            None => !self.text.is_empty(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Length in UTF-16 code units, the unit editors on the mobile side report, so
    /// characters outside the Basic Multilingual Plane count twice.
    pub fn char_count(&self) -> usize {
        self.text.encode_utf16().count()
    }
}
