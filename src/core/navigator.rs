/*
 * This module defines the `Navigator`, the owned state object behind the explorer.
 * It tracks the root and current path, the last successful listing, the selected note
 * and the editor buffer, and exposes the transitions (navigate, open, save, create,
 * rename, delete, export) as its only mutation surface.
 *
 * Every filesystem failure is converted into a `NavigatorError` and the state is left
 * as it was, so a later successful navigation or refresh can heal the view.
 */
use super::aggregator::{self, AggregateSummary};
use super::directory_lister;
use super::file_system::{FileSystemError, FileSystemOperations};
use super::models::{
    DirectoryEntry, EditorBuffer, MARKDOWN_EXTENSION, is_markdown_name, markdown_stem,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub enum NavigatorError {
    List(PathBuf, FileSystemError),
    Read(PathBuf, FileSystemError),
    Write(PathBuf, FileSystemError),
    Create(PathBuf, FileSystemError),
    Rename(PathBuf, FileSystemError),
    Delete(PathBuf, FileSystemError),
    EmptyName,
    InvalidName(String),
    UnknownEntry(String),
    StaleListing(PathBuf),
}

impl std::fmt::Display for NavigatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigatorError::List(p, e) => write!(f, "Could not list {p:?}: {e}"),
            NavigatorError::Read(p, e) => write!(f, "Could not read {p:?}: {e}"),
            NavigatorError::Write(p, e) => write!(f, "Could not save {p:?}: {e}"),
            NavigatorError::Create(p, e) => write!(f, "Could not create {p:?}: {e}"),
            NavigatorError::Rename(p, e) => write!(f, "Could not rename {p:?}: {e}"),
            NavigatorError::Delete(p, e) => write!(f, "Could not delete {p:?}: {e}"),
            NavigatorError::EmptyName => write!(f, "Name must not be empty"),
            NavigatorError::InvalidName(name) => write!(
                f,
                "Invalid name '{name}': names may not contain path separators or be '.' or '..'"
            ),
            NavigatorError::UnknownEntry(name) => {
                write!(f, "No entry named '{name}' in the current folder")
            }
            NavigatorError::StaleListing(p) => {
                write!(f, "Discarded listing of {p:?}: the view moved on")
            }
        }
    }
}

impl std::error::Error for NavigatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavigatorError::List(_, e)
            | NavigatorError::Read(_, e)
            | NavigatorError::Write(_, e)
            | NavigatorError::Create(_, e)
            | NavigatorError::Rename(_, e)
            | NavigatorError::Delete(_, e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NavigatorError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorMode {
    Browsing { path: PathBuf },
    Editing { path: PathBuf, file_name: String },
}

/* What a call to `go_back` did. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    AtRoot,
    ClosedFile,
    MovedUp,
}

/* What a call to `select_entry` did. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    EnteredDirectory,
    OpenedFile,
}

/*
 * Identifies one listing request. A result is only committed while the navigator is
 * still at `path` and no other navigation happened since the ticket was issued.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    path: PathBuf,
    generation: u64,
}

impl ListingTicket {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rejects names that would escape the current folder. The name is returned as given:
/// listed entries may legitimately start or end with spaces.
fn validate_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(NavigatorError::EmptyName);
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(NavigatorError::InvalidName(name.to_string()));
    }
    Ok(name)
}

pub struct Navigator {
    fs: Arc<dyn FileSystemOperations>,
    root_path: PathBuf,
    current_path: PathBuf,
    entries: Vec<DirectoryEntry>,
    selection: Option<String>,
    buffer: EditorBuffer,
    generation: u64,
}

impl Navigator {
    /// Leaves the idle state: fixes the root and performs the initial listing.
    /// A failing initial listing is logged and leaves `entries` empty; `refresh` can
    /// recover once the folder becomes readable.
    pub fn start(fs: Arc<dyn FileSystemOperations>, root_path: PathBuf) -> Self {
        log::debug!("Navigator: Starting at root {root_path:?}");
        let mut navigator = Navigator {
            fs,
            current_path: root_path.clone(),
            root_path,
            entries: Vec::new(),
            selection: None,
            buffer: EditorBuffer::empty(),
            generation: 0,
        };
        if let Err(e) = navigator.refresh() {
            log::warn!("Navigator: Initial listing failed: {e}");
        }
        navigator
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn is_at_root(&self) -> bool {
        self.current_path == self.root_path
    }

    pub fn mode(&self) -> NavigatorMode {
        match self.buffer.file_name() {
            Some(file_name) => NavigatorMode::Editing {
                path: self.current_path.clone(),
                file_name: file_name.to_string(),
            },
            None => NavigatorMode::Browsing {
                path: self.current_path.clone(),
            },
        }
    }

    /// Path of the current folder relative to the root, for display ("/" at root).
    pub fn display_path(&self) -> String {
        match self.current_path.strip_prefix(&self.root_path) {
            Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
            Ok(relative) => format!("/{}", relative.to_string_lossy()),
            Err(_) => self.current_path.to_string_lossy().into_owned(),
        }
    }

    pub fn find_entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn begin_listing(&self) -> ListingTicket {
        ListingTicket {
            path: self.current_path.clone(),
            generation: self.generation,
        }
    }

    /// Applies a listing result if the ticket still matches the live state.
    pub fn commit_listing(
        &mut self,
        ticket: ListingTicket,
        result: std::result::Result<Vec<DirectoryEntry>, FileSystemError>,
    ) -> Result<()> {
        if ticket.generation != self.generation || ticket.path != self.current_path {
            log::debug!(
                "Navigator: Dropping stale listing for {:?} (now at {:?})",
                ticket.path,
                self.current_path
            );
            return Err(NavigatorError::StaleListing(ticket.path));
        }
        match result {
            Ok(entries) => {
                self.entries = entries;
                Ok(())
            }
            Err(e) => {
                log::warn!("Navigator: Listing {:?} failed: {e}", ticket.path);
                Err(NavigatorError::List(ticket.path, e))
            }
        }
    }

    pub fn refresh(&mut self) -> Result<()> {
        let ticket = self.begin_listing();
        let result = directory_lister::list_directory_sorted(self.fs.as_ref(), ticket.path());
        self.commit_listing(ticket, result)
    }

    /// Re-lists after a mutation, trying once more before giving up so the view ends up
    /// reflecting the filesystem rather than a stale listing.
    fn refresh_after_mutation(&mut self) {
        if let Err(first) = self.refresh() {
            log::warn!("Navigator: Refresh after mutation failed ({first}), retrying.");
            if let Err(second) = self.refresh() {
                log::error!("Navigator: Refresh after mutation failed again: {second}");
            }
        }
    }

    /// Moves the view to `target`, listing it first. Nothing changes if the listing fails.
    fn move_to(&mut self, target: PathBuf) -> Result<()> {
        let entries = directory_lister::list_directory_sorted(self.fs.as_ref(), &target)
            .map_err(|e| {
                log::warn!("Navigator: Cannot move to {target:?}: {e}");
                NavigatorError::List(target.clone(), e)
            })?;
        // Invalidates tickets issued for the previous folder, even if we come back to it.
        self.generation += 1;
        log::debug!("Navigator: Moved from {:?} to {target:?}", self.current_path);
        self.current_path = target;
        self.entries = entries;
        self.selection = None;
        self.buffer = EditorBuffer::empty();
        Ok(())
    }

    pub fn select_entry(&mut self, name: &str) -> Result<SelectOutcome> {
        match self.find_entry(name).cloned() {
            Some(DirectoryEntry::Directory { name }) => {
                self.enter_directory(&name)?;
                Ok(SelectOutcome::EnteredDirectory)
            }
            Some(DirectoryEntry::File { name }) => {
                self.open_file(&name)?;
                Ok(SelectOutcome::OpenedFile)
            }
            None => Err(NavigatorError::UnknownEntry(name.to_string())),
        }
    }

    pub fn enter_directory(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let target = self.current_path.join(name);
        self.move_to(target)
    }

    /// Reads a note into the buffer. On failure the previous buffer and selection are
    /// kept untouched and the error is returned for the UI to show.
    pub fn open_file(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let path = self.current_path.join(name);
        match self.fs.read_text(&path) {
            Ok(text) => {
                log::debug!("Navigator: Opened {path:?} ({} bytes)", text.len());
                self.selection = Some(name.to_string());
                self.buffer = EditorBuffer::loaded(name.to_string(), text);
                Ok(())
            }
            Err(e) => {
                log::warn!("Navigator: Failed to read {path:?}: {e}");
                Err(NavigatorError::Read(path, e))
            }
        }
    }

    /// Closes an open note, otherwise moves to the parent folder. Never goes above the
    /// root; at the root with nothing open this is a no-op.
    pub fn go_back(&mut self) -> Result<BackOutcome> {
        if self.buffer.is_open() {
            log::debug!("Navigator: Closing {:?}", self.buffer.file_name());
            self.buffer = EditorBuffer::empty();
            self.selection = None;
            return Ok(BackOutcome::ClosedFile);
        }
        if self.is_at_root() {
            log::trace!("Navigator: go_back ignored at root.");
            return Ok(BackOutcome::AtRoot);
        }
        let parent = match self.current_path.parent() {
            Some(parent) if parent.starts_with(&self.root_path) => parent.to_path_buf(),
            _ => self.root_path.clone(),
        };
        self.move_to(parent)?;
        Ok(BackOutcome::MovedUp)
    }

    pub fn set_text(&mut self, text: String) {
        self.buffer.set_text(text);
    }

    pub fn append_text(&mut self, text: &str) {
        self.buffer.append_text(text);
    }

    /// Writes the buffer over the open note. Returns `Ok(false)` without touching the
    /// filesystem when no note is open.
    pub fn save_content(&mut self) -> Result<bool> {
        let Some(file_name) = self.buffer.file_name() else {
            log::trace!("Navigator: save_content ignored, no file open.");
            return Ok(false);
        };
        let path = self.current_path.join(file_name);
        self.fs
            .write_text(&path, self.buffer.text())
            .map_err(|e| NavigatorError::Write(path.clone(), e))?;
        self.buffer.mark_persisted();
        log::debug!("Navigator: Saved {path:?}");
        Ok(true)
    }

    /// Creates a note in the current folder, appending the Markdown extension when
    /// missing, with a heading made from its stem. Surrounding whitespace in the typed
    /// name is dropped. Returns the final file name.
    pub fn create_file(&mut self, name: &str) -> Result<String> {
        let name = validate_name(name.trim())?;
        let file_name = if is_markdown_name(name) {
            name.to_string()
        } else {
            format!("{name}.{MARKDOWN_EXTENSION}")
        };
        let path = self.current_path.join(&file_name);
        if self.fs.exists(&path) {
            return Err(NavigatorError::Create(
                path.clone(),
                FileSystemError::AlreadyExists(path),
            ));
        }
        let template = format!("# {}\n\n", markdown_stem(&file_name));
        self.fs
            .write_text(&path, &template)
            .map_err(|e| NavigatorError::Create(path.clone(), e))?;
        log::debug!("Navigator: Created note {path:?}");
        self.refresh_after_mutation();
        Ok(file_name)
    }

    pub fn create_folder(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name.trim())?;
        let path = self.current_path.join(name);
        self.fs
            .make_directory(&path)
            .map_err(|e| NavigatorError::Create(path.clone(), e))?;
        log::debug!("Navigator: Created folder {path:?}");
        self.refresh_after_mutation();
        Ok(())
    }

    /// Renames an entry of the current folder. Returns `Ok(false)` when the new name is
    /// empty or unchanged. Keeps the open note tracked under its new name.
    pub fn rename_item(&mut self, old_name: &str, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == old_name {
            return Ok(false);
        }
        let old_name = validate_name(old_name)?;
        let new_name = validate_name(new_name)?;
        let from = self.current_path.join(old_name);
        let to = self.current_path.join(new_name);
        self.fs
            .move_item(&from, &to)
            .map_err(|e| NavigatorError::Rename(from.clone(), e))?;
        log::debug!("Navigator: Renamed {from:?} to {to:?}");

        // Selection only ever names a file, so this is the open note being renamed.
        if self.selection.as_deref() == Some(old_name) {
            self.selection = Some(new_name.to_string());
            self.buffer.rename_to(new_name.to_string());
        }
        self.refresh_after_mutation();
        Ok(true)
    }

    /// Deletes an entry (folders recursively). Clears the buffer if the open note was
    /// the one deleted.
    pub fn delete_item(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let path = self.current_path.join(name);
        self.fs
            .remove_recursive(&path)
            .map_err(|e| NavigatorError::Delete(path.clone(), e))?;
        log::debug!("Navigator: Deleted {path:?}");

        if self.selection.as_deref() == Some(name) {
            self.selection = None;
            self.buffer = EditorBuffer::empty();
        }
        self.refresh_after_mutation();
        Ok(())
    }

    pub fn aggregate_current(&self) -> (String, AggregateSummary) {
        aggregator::aggregate_with_summary(self.fs.as_ref(), &self.current_path)
    }

    /// Aggregates the current folder and writes the document to `output`. A relative
    /// output path is resolved against the current folder. The target itself is left
    /// out of the walk, so exporting twice over an unchanged tree writes the same bytes.
    pub fn export_current(&mut self, output: &Path) -> Result<(PathBuf, AggregateSummary)> {
        let target = if output.is_absolute() {
            output.to_path_buf()
        } else {
            self.current_path.join(output)
        };
        let (document, summary) =
            aggregator::aggregate_excluding(self.fs.as_ref(), &self.current_path, &target);
        self.fs
            .write_text(&target, &document)
            .map_err(|e| NavigatorError::Write(target.clone(), e))?;
        log::info!("Navigator: Exported {summary:?} to {target:?}");
        // Only an export landing in the visible folder changes the listing.
        if target.parent() == Some(self.current_path.as_path()) {
            self.refresh_after_mutation();
        }
        Ok((target, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_system::{CoreFileSystem, RawDirEntry, Result as FsResult};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    // Real provider whose next listings or writes can be made to fail.
    struct ScriptedFileSystem {
        inner: CoreFileSystem,
        failing_lists: Mutex<usize>,
        fail_writes: Mutex<bool>,
        list_calls: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedFileSystem {
        fn new() -> Self {
            ScriptedFileSystem {
                inner: CoreFileSystem::new(),
                failing_lists: Mutex::new(0),
                fail_writes: Mutex::new(false),
                list_calls: Mutex::new(Vec::new()),
            }
        }

        fn fail_next_lists(&self, count: usize) {
            *self.failing_lists.lock().unwrap() = count;
        }

        fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn list_call_count(&self) -> usize {
            self.list_calls.lock().unwrap().len()
        }

        fn denied() -> FileSystemError {
            FileSystemError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "mocked permission denied",
            ))
        }
    }

    impl FileSystemOperations for ScriptedFileSystem {
        fn list_directory(&self, path: &Path) -> FsResult<Vec<RawDirEntry>> {
            self.list_calls.lock().unwrap().push(path.to_path_buf());
            let mut remaining = self.failing_lists.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Self::denied());
            }
            self.inner.list_directory(path)
        }
        fn read_text(&self, path: &Path) -> FsResult<String> {
            self.inner.read_text(path)
        }
        fn write_text(&self, path: &Path, text: &str) -> FsResult<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(Self::denied());
            }
            self.inner.write_text(path, text)
        }
        fn make_directory(&self, path: &Path) -> FsResult<()> {
            self.inner.make_directory(path)
        }
        fn remove_recursive(&self, path: &Path) -> FsResult<()> {
            self.inner.remove_recursive(path)
        }
        fn move_item(&self, from: &Path, to: &Path) -> FsResult<()> {
            self.inner.move_item(from, to)
        }
        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }
    }

    fn setup_scripted() -> (TempDir, Arc<ScriptedFileSystem>, Navigator) {
        let dir = tempdir().unwrap();
        let provider = Arc::new(ScriptedFileSystem::new());
        let navigator = Navigator::start(provider.clone(), dir.path().to_path_buf());
        (dir, provider, navigator)
    }

    fn setup() -> (TempDir, Navigator) {
        let dir = tempdir().unwrap();
        let navigator = Navigator::start(Arc::new(CoreFileSystem::new()), dir.path().to_path_buf());
        (dir, navigator)
    }

    fn names(navigator: &Navigator) -> Vec<&str> {
        navigator.entries().iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_start_lists_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Work")).unwrap();
        fs::write(dir.path().join("todo.md"), "- milk").unwrap();

        let navigator = Navigator::start(Arc::new(CoreFileSystem::new()), dir.path().to_path_buf());

        assert_eq!(names(&navigator), vec!["Work", "todo.md"]);
        assert!(navigator.is_at_root());
        assert_eq!(navigator.display_path(), "/");
        assert_eq!(
            navigator.mode(),
            NavigatorMode::Browsing {
                path: dir.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_start_with_missing_root_is_empty_and_refresh_heals() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("later");
        let mut navigator = Navigator::start(Arc::new(CoreFileSystem::new()), root.clone());
        assert!(navigator.entries().is_empty());
        assert!(matches!(navigator.refresh(), Err(NavigatorError::List(_, _))));

        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.md"), "a").unwrap();
        navigator.refresh().unwrap();

        assert_eq!(names(&navigator), vec!["a.md"]);
    }

    #[test]
    fn test_go_back_at_root_is_noop() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("n.md"), "n").unwrap();
        navigator.refresh().unwrap();
        let entries_before = navigator.entries().to_vec();

        assert_eq!(navigator.go_back().unwrap(), BackOutcome::AtRoot);

        assert_eq!(navigator.current_path(), dir.path());
        assert_eq!(navigator.entries(), entries_before.as_slice());
    }

    #[test]
    fn test_enter_directory_and_back() {
        let (dir, mut navigator) = setup();
        fs::create_dir_all(dir.path().join("Projects").join("Rust")).unwrap();
        fs::write(dir.path().join("Projects").join("plan.md"), "plan").unwrap();
        navigator.refresh().unwrap();

        assert_eq!(
            navigator.select_entry("Projects").unwrap(),
            SelectOutcome::EnteredDirectory
        );
        assert_eq!(navigator.current_path(), dir.path().join("Projects"));
        assert_eq!(names(&navigator), vec!["Rust", "plan.md"]);
        assert_eq!(navigator.display_path(), "/Projects");

        assert_eq!(navigator.go_back().unwrap(), BackOutcome::MovedUp);
        assert!(navigator.is_at_root());
        assert_eq!(names(&navigator), vec!["Projects"]);
    }

    #[test]
    fn test_failed_navigation_leaves_state_unchanged() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join("gone")).unwrap();
        navigator.refresh().unwrap();
        fs::remove_dir(dir.path().join("gone")).unwrap();

        let result = navigator.select_entry("gone");

        assert!(matches!(result, Err(NavigatorError::List(_, _))));
        assert!(navigator.is_at_root());
        assert_eq!(names(&navigator), vec!["gone"]);
    }

    #[test]
    fn test_open_file_then_back_closes_it() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("idea.md"), "# idea\nbody").unwrap();
        navigator.refresh().unwrap();

        assert_eq!(
            navigator.select_entry("idea.md").unwrap(),
            SelectOutcome::OpenedFile
        );
        assert_eq!(navigator.buffer().text(), "# idea\nbody");
        assert_eq!(navigator.selection(), Some("idea.md"));
        assert_eq!(
            navigator.mode(),
            NavigatorMode::Editing {
                path: dir.path().to_path_buf(),
                file_name: "idea.md".to_string()
            }
        );

        assert_eq!(navigator.go_back().unwrap(), BackOutcome::ClosedFile);
        assert!(!navigator.buffer().is_open());
        assert_eq!(navigator.selection(), None);
        assert!(navigator.is_at_root());
    }

    #[test]
    fn test_failed_read_keeps_previous_buffer() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("good.md"), "good").unwrap();
        fs::write(dir.path().join("bad.md"), [0xffu8, 0xfe]).unwrap();
        navigator.refresh().unwrap();
        navigator.open_file("good.md").unwrap();

        let result = navigator.open_file("bad.md");

        assert!(matches!(result, Err(NavigatorError::Read(_, _))));
        assert_eq!(navigator.buffer().file_name(), Some("good.md"));
        assert_eq!(navigator.buffer().text(), "good");
        assert_eq!(navigator.selection(), Some("good.md"));
    }

    #[test]
    fn test_select_unknown_entry() {
        let (_dir, mut navigator) = setup();
        assert!(matches!(
            navigator.select_entry("nope"),
            Err(NavigatorError::UnknownEntry(_))
        ));
    }

    #[test]
    fn test_create_file_in_empty_directory() {
        let (dir, mut navigator) = setup();

        let created = navigator.create_file("note").unwrap();

        assert_eq!(created, "note.md");
        assert_eq!(
            navigator.entries(),
            &[DirectoryEntry::File {
                name: "note.md".to_string()
            }]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("note.md")).unwrap(),
            "# note\n\n"
        );
    }

    #[test]
    fn test_create_file_keeps_existing_extension_and_rejects_duplicates() {
        let (_dir, mut navigator) = setup();

        assert_eq!(navigator.create_file("Plan.md").unwrap(), "Plan.md");
        assert!(matches!(
            navigator.create_file("Plan"),
            Err(NavigatorError::Create(_, FileSystemError::AlreadyExists(_)))
        ));
        assert!(matches!(
            navigator.create_file("   "),
            Err(NavigatorError::EmptyName)
        ));
        assert!(matches!(
            navigator.create_file("../escape"),
            Err(NavigatorError::InvalidName(_))
        ));
        assert_eq!(names(&navigator), vec!["Plan.md"]);
    }

    #[test]
    fn test_create_folder() {
        let (dir, mut navigator) = setup();
        navigator.create_file("z").unwrap();

        navigator.create_folder("Archive").unwrap();

        assert!(dir.path().join("Archive").is_dir());
        assert_eq!(names(&navigator), vec!["Archive", "z.md"]);
        assert!(matches!(
            navigator.create_folder("Archive"),
            Err(NavigatorError::Create(_, FileSystemError::AlreadyExists(_)))
        ));
    }

    #[test]
    fn test_delete_active_file_clears_buffer() {
        let (dir, mut navigator) = setup();
        navigator.create_file("draft").unwrap();
        navigator.open_file("draft.md").unwrap();
        navigator.set_text("unsaved".to_string());

        navigator.delete_item("draft.md").unwrap();

        assert!(!navigator.buffer().is_open());
        assert_eq!(navigator.buffer().text(), "");
        assert_eq!(navigator.selection(), None);
        assert!(navigator.find_entry("draft.md").is_none());
        assert!(!dir.path().join("draft.md").exists());
    }

    #[test]
    fn test_delete_folder_is_recursive_and_missing_fails() {
        let (dir, mut navigator) = setup();
        fs::create_dir_all(dir.path().join("old").join("deeper")).unwrap();
        fs::write(dir.path().join("old").join("deeper").join("x.md"), "x").unwrap();
        navigator.refresh().unwrap();

        navigator.delete_item("old").unwrap();

        assert!(!dir.path().join("old").exists());
        assert!(navigator.entries().is_empty());
        assert!(matches!(
            navigator.delete_item("old"),
            Err(NavigatorError::Delete(_, FileSystemError::NotFound(_)))
        ));
    }

    #[test]
    fn test_rename_active_file_then_save_targets_new_name() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("a.md"), "original").unwrap();
        navigator.refresh().unwrap();
        navigator.open_file("a.md").unwrap();

        assert!(navigator.rename_item("a.md", "b.md").unwrap());
        navigator.set_text("edited".to_string());
        assert!(navigator.save_content().unwrap());

        assert!(!dir.path().join("a.md").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("b.md")).unwrap(),
            "edited"
        );
        assert_eq!(navigator.selection(), Some("b.md"));
        assert_eq!(names(&navigator), vec!["b.md"]);
    }

    #[test]
    fn test_rename_noops_and_conflicts() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        navigator.refresh().unwrap();

        assert!(!navigator.rename_item("a.md", "").unwrap());
        assert!(!navigator.rename_item("a.md", "a.md").unwrap());
        assert!(matches!(
            navigator.rename_item("a.md", "b.md"),
            Err(NavigatorError::Rename(_, FileSystemError::AlreadyExists(_)))
        ));
        assert_eq!(fs::read_to_string(dir.path().join("b.md")).unwrap(), "b");
        assert_eq!(names(&navigator), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_save_without_open_file_is_noop() {
        let (dir, mut navigator) = setup();
        navigator.set_text("orphan text".to_string());

        assert!(!navigator.save_content().unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_clears_dirty_flag() {
        let (dir, mut navigator) = setup();
        navigator.create_file("log").unwrap();
        navigator.open_file("log.md").unwrap();
        navigator.append_text("entry\n");
        assert!(navigator.buffer().is_dirty());

        navigator.save_content().unwrap();

        assert!(!navigator.buffer().is_dirty());
        assert_eq!(
            fs::read_to_string(dir.path().join("log.md")).unwrap(),
            "# log\n\nentry\n"
        );
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("root.md"), "r").unwrap();
        navigator.refresh().unwrap();

        let ticket = navigator.begin_listing();
        let late_result = Ok(vec![DirectoryEntry::File {
            name: "late.md".to_string(),
        }]);
        navigator.enter_directory("sub").unwrap();

        assert!(matches!(
            navigator.commit_listing(ticket, late_result),
            Err(NavigatorError::StaleListing(_))
        ));
        assert_eq!(navigator.current_path(), dir.path().join("sub"));
        assert!(navigator.entries().is_empty());
    }

    #[test]
    fn test_stale_listing_detected_after_round_trip() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join("sub")).unwrap();
        navigator.refresh().unwrap();

        let ticket = navigator.begin_listing();
        navigator.enter_directory("sub").unwrap();
        navigator.go_back().unwrap();

        // Same path again, but a newer navigation happened in between.
        assert!(matches!(
            navigator.commit_listing(ticket, Ok(Vec::new())),
            Err(NavigatorError::StaleListing(_))
        ));
        assert_eq!(names(&navigator), vec!["sub"]);
    }

    #[test]
    fn test_export_current_writes_aggregate() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join("x")).unwrap();
        fs::write(dir.path().join("x").join("one.md"), "Hello").unwrap();
        navigator.refresh().unwrap();
        let out_dir = tempdir().unwrap();
        let output = out_dir.path().join("export.md");

        let (written, summary) = navigator.export_current(&output).unwrap();

        assert_eq!(written, output);
        assert_eq!(summary.markdown_files, 1);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "# X\n\n## one\n\nHello\n\n---\n\n"
        );
    }

    #[test]
    fn test_navigation_leaving_folder_discards_open_file() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        navigator.refresh().unwrap();
        navigator.open_file("a.md").unwrap();

        navigator.enter_directory("sub").unwrap();

        assert_eq!(navigator.selection(), None);
        assert!(!navigator.buffer().is_open());
        assert!(!navigator.save_content().unwrap());
    }

    #[test]
    fn test_mutation_retries_failed_listing_once() {
        let (dir, provider, mut navigator) = setup_scripted();
        let calls_before = provider.list_call_count();
        provider.fail_next_lists(1);

        assert_eq!(navigator.create_file("fresh").unwrap(), "fresh.md");

        assert_eq!(provider.list_call_count(), calls_before + 2);
        assert_eq!(names(&navigator), vec!["fresh.md"]);
        assert!(dir.path().join("fresh.md").exists());
    }

    #[test]
    fn test_mutation_succeeds_when_both_listings_fail() {
        let (dir, provider, mut navigator) = setup_scripted();
        navigator.create_file("first").unwrap();
        let calls_before = provider.list_call_count();
        provider.fail_next_lists(2);

        navigator.create_folder("Second").unwrap();

        assert_eq!(provider.list_call_count(), calls_before + 2);
        assert!(dir.path().join("Second").is_dir());
        // The view keeps the last good listing until the next refresh.
        assert_eq!(names(&navigator), vec!["first.md"]);
        navigator.refresh().unwrap();
        assert_eq!(names(&navigator), vec!["Second", "first.md"]);
    }

    #[test]
    fn test_failed_save_reports_write_error_and_stays_dirty() {
        let (dir, provider, mut navigator) = setup_scripted();
        navigator.create_file("draft").unwrap();
        navigator.open_file("draft.md").unwrap();
        navigator.set_text("new words".to_string());
        provider.set_fail_writes(true);

        let result = navigator.save_content();

        assert!(matches!(
            result,
            Err(NavigatorError::Write(_, FileSystemError::Io(_)))
        ));
        assert!(navigator.buffer().is_dirty());
        assert_eq!(
            fs::read_to_string(dir.path().join("draft.md")).unwrap(),
            "# draft\n\n"
        );
    }

    #[test]
    fn test_create_file_in_unwritable_folder_fails() {
        let (dir, provider, mut navigator) = setup_scripted();
        provider.set_fail_writes(true);

        let result = navigator.create_file("blocked");

        assert!(matches!(
            result,
            Err(NavigatorError::Create(_, FileSystemError::Io(_)))
        ));
        assert!(navigator.entries().is_empty());
        assert!(!dir.path().join("blocked.md").exists());
    }

    #[test]
    fn test_names_with_surrounding_spaces_address_their_own_entry() {
        let (dir, mut navigator) = setup();
        fs::create_dir(dir.path().join(" spaced")).unwrap();
        fs::write(dir.path().join(" spaced").join("inner.md"), "inner").unwrap();
        fs::write(dir.path().join("a.md"), "keep me").unwrap();
        fs::write(dir.path().join("a.md "), "trailing").unwrap();
        navigator.refresh().unwrap();

        navigator.open_file("a.md ").unwrap();
        assert_eq!(navigator.buffer().text(), "trailing");

        navigator.delete_item("a.md ").unwrap();
        assert!(dir.path().join("a.md").exists());
        assert!(!dir.path().join("a.md ").exists());
        assert_eq!(names(&navigator), vec![" spaced", "a.md"]);

        assert_eq!(
            navigator.select_entry(" spaced").unwrap(),
            SelectOutcome::EnteredDirectory
        );
        assert_eq!(names(&navigator), vec!["inner.md"]);
    }

    #[test]
    fn test_whitespace_only_and_dot_names_are_rejected() {
        let (_dir, mut navigator) = setup();
        assert!(matches!(
            navigator.delete_item("  "),
            Err(NavigatorError::EmptyName)
        ));
        assert!(matches!(
            navigator.enter_directory(".."),
            Err(NavigatorError::InvalidName(_))
        ));
        assert!(matches!(
            navigator.open_file("sub/x.md"),
            Err(NavigatorError::InvalidName(_))
        ));
    }

    #[test]
    fn test_repeated_export_inside_folder_is_stable() {
        let (dir, mut navigator) = setup();
        fs::write(dir.path().join("one.md"), "Hello").unwrap();
        navigator.refresh().unwrap();

        let (target, _) = navigator.export_current(Path::new("export.md")).unwrap();
        let first = fs::read_to_string(&target).unwrap();
        let (_, summary) = navigator.export_current(Path::new("export.md")).unwrap();
        let second = fs::read_to_string(&target).unwrap();

        assert_eq!(target, dir.path().join("export.md"));
        assert_eq!(first, "# one\n\nHello\n\n---\n\n");
        assert_eq!(first, second);
        assert_eq!(summary.markdown_files, 1);
        assert_eq!(names(&navigator), vec!["export.md", "one.md"]);
    }
}
