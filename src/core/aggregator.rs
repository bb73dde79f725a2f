/*
 * Flattens a subtree of notes into one Markdown document.
 *
 * The walk is depth-first and follows the directory lister's order at every level,
 * so two aggregations of an unchanged tree are byte-identical. It is exposed as a lazy
 * iterator of fragments (`AggregateWalk`) that is rendered and joined at the end;
 * rendering is a pure function and can be tested without any I/O.
 *
 * Failure policy: a directory that cannot be listed or a note that cannot be read is
 * logged and contributes nothing. Siblings and ancestors are still aggregated and the
 * top-level call never fails.
 */
use super::directory_lister;
use super::file_system::FileSystemOperations;
use super::models::{DirectoryEntry, is_markdown_name, markdown_stem};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const MAX_HEADING_LEVEL: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateFragment {
    FolderHeading { name: String, depth: usize },
    FileHeading { title: String, depth: usize },
    Content(String),
    Separator,
}

/*
 * Counters collected while walking, for status messages.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub folders: usize,
    pub markdown_files: usize,
    pub skipped_files: usize,
    pub failures: usize,
}

#[derive(Debug)]
enum WalkItem {
    Directory {
        path: PathBuf,
        name: String,
        depth: usize,
    },
    File {
        path: PathBuf,
        name: String,
        depth: usize,
    },
}

/*
 * Depth-first iterator over the fragments of an aggregation.
 * Items still to visit are kept on an explicit stack (children pushed in reverse so they
 * pop in listing order); fragments produced by one item are queued in `ready`.
 * A walk is not restartable, but creating a new one over the same tree yields the same
 * sequence.
 */
pub struct AggregateWalk<'a> {
    fs: &'a dyn FileSystemOperations,
    // Never visited, e.g. the file an export is about to overwrite.
    excluded: Option<PathBuf>,
    pending: Vec<WalkItem>,
    ready: VecDeque<AggregateFragment>,
    summary: AggregateSummary,
}

impl<'a> AggregateWalk<'a> {
    pub fn new(fs: &'a dyn FileSystemOperations, root: &Path) -> Self {
        Self::excluding(fs, root, None)
    }

    /// Like `new`, but skips `excluded` (and everything below it) wherever the walk meets it.
    pub fn excluding(
        fs: &'a dyn FileSystemOperations,
        root: &Path,
        excluded: Option<&Path>,
    ) -> Self {
        log::debug!("Aggregator: Starting walk at {root:?}");
        let mut walk = AggregateWalk {
            fs,
            excluded: excluded.map(Path::to_path_buf),
            pending: Vec::new(),
            ready: VecDeque::new(),
            summary: AggregateSummary::default(),
        };
        walk.push_children(root, 0);
        walk
    }

    pub fn summary(&self) -> AggregateSummary {
        self.summary
    }

    fn push_children(&mut self, dir_path: &Path, depth: usize) {
        let entries = match directory_lister::list_directory_sorted(self.fs, dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Aggregator: Skipping unlistable directory {dir_path:?}: {e}");
                self.summary.failures += 1;
                return;
            }
        };
        for entry in entries.into_iter().rev() {
            let path = dir_path.join(entry.name());
            if self.excluded.as_deref() == Some(path.as_path()) {
                log::trace!("Aggregator: Leaving out excluded path {path:?}");
                continue;
            }
            let item = match entry {
                DirectoryEntry::Directory { name } => WalkItem::Directory { path, name, depth },
                DirectoryEntry::File { name } => WalkItem::File { path, name, depth },
            };
            self.pending.push(item);
        }
    }

    fn visit(&mut self, item: WalkItem) {
        match item {
            WalkItem::Directory { path, name, depth } => {
                self.summary.folders += 1;
                self.ready
                    .push_back(AggregateFragment::FolderHeading { name, depth });
                self.push_children(&path, depth + 1);
            }
            WalkItem::File { path, name, depth } => {
                if !is_markdown_name(&name) {
                    log::trace!("Aggregator: Skipping non-Markdown file {path:?}");
                    self.summary.skipped_files += 1;
                    return;
                }
                match self.fs.read_text(&path) {
                    Ok(text) => {
                        self.summary.markdown_files += 1;
                        self.ready.push_back(AggregateFragment::FileHeading {
                            title: markdown_stem(&name).to_string(),
                            depth,
                        });
                        self.ready.push_back(AggregateFragment::Content(text));
                        self.ready.push_back(AggregateFragment::Separator);
                    }
                    Err(e) => {
                        log::warn!("Aggregator: Skipping unreadable note {path:?}: {e}");
                        self.summary.failures += 1;
                    }
                }
            }
        }
    }
}

impl Iterator for AggregateWalk<'_> {
    type Item = AggregateFragment;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fragment) = self.ready.pop_front() {
                return Some(fragment);
            }
            let item = self.pending.pop()?;
            self.visit(item);
        }
    }
}

fn heading_marker(depth: usize) -> String {
    "#".repeat((depth + 1).min(MAX_HEADING_LEVEL))
}

fn render_fragment(fragment: &AggregateFragment, out: &mut String) {
    match fragment {
        AggregateFragment::FolderHeading { name, depth } => {
            out.push_str(&format!("{} {}\n\n", heading_marker(*depth), name.to_uppercase()));
        }
        AggregateFragment::FileHeading { title, depth } => {
            out.push_str(&format!("{} {}\n\n", heading_marker(*depth), title));
        }
        AggregateFragment::Content(text) => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        AggregateFragment::Separator => out.push_str("\n---\n\n"),
    }
}

pub fn render_fragments<'f>(
    fragments: impl IntoIterator<Item = &'f AggregateFragment>,
) -> String {
    let mut out = String::new();
    for fragment in fragments {
        render_fragment(fragment, &mut out);
    }
    out
}

/// Aggregates every Markdown note below `root` into one document and reports what
/// was included.
pub fn aggregate_with_summary(
    fs: &dyn FileSystemOperations,
    root: &Path,
) -> (String, AggregateSummary) {
    finish_walk(AggregateWalk::new(fs, root), root)
}

/// Aggregation that leaves out `excluded`, so an export written inside the aggregated
/// folder does not end up in the next export.
pub fn aggregate_excluding(
    fs: &dyn FileSystemOperations,
    root: &Path,
    excluded: &Path,
) -> (String, AggregateSummary) {
    finish_walk(AggregateWalk::excluding(fs, root, Some(excluded)), root)
}

fn finish_walk(mut walk: AggregateWalk<'_>, root: &Path) -> (String, AggregateSummary) {
    let fragments: Vec<AggregateFragment> = walk.by_ref().collect();
    let document = render_fragments(&fragments);
    let summary = walk.summary();
    log::debug!("Aggregator: Finished walk at {root:?}: {summary:?}");
    (document, summary)
}

/// The aggregated document of everything below `root`. Never fails; unreadable parts
/// are left out.
pub fn aggregate(fs: &dyn FileSystemOperations, root: &Path) -> String {
    aggregate_with_summary(fs, root).0
}
