/*
 * Lists the immediate children of a directory and orders them deterministically:
 * folders before files, then a case-insensitive, numeric-aware ("natural") name
 * comparison so that "file2" sorts before "file10". The exact name is used as the
 * final tie-break, which makes the order total and stable across repeated calls.
 */
use super::file_system::{FileSystemOperations, Result};
use super::models::DirectoryEntry;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

/// Lists `path` through the provider and returns its entries folders first, in natural
/// name order. Provider errors are passed through untouched.
pub fn list_directory_sorted(
    fs: &dyn FileSystemOperations,
    path: &Path,
) -> Result<Vec<DirectoryEntry>> {
    let raw_entries = fs.list_directory(path)?;
    let mut entries: Vec<DirectoryEntry> = raw_entries
        .into_iter()
        .map(|raw| match raw.is_dir {
            true => DirectoryEntry::Directory { name: raw.name },
            false => DirectoryEntry::File { name: raw.name },
        })
        .collect();
    sort_entries(&mut entries);
    log::debug!(
        "DirectoryLister: Listed {} entries in {:?}",
        entries.len(),
        path
    );
    Ok(entries)
}

pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(a.name(), b.name()),
    });
}

/// Natural, case-insensitive comparison of two names.
/// Runs of ASCII digits compare by numeric value (leading zeros ignored, shorter run of
/// equal value first); everything else compares by lowercased character. Names equal
/// under that rule fall back to plain ordering so distinct names never compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            // Equal under the natural rule; raw bytes keep the order total.
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digit_run(&mut left);
                let right_run = take_digit_run(&mut right);
                let ordering = compare_digit_runs(&left_run, &right_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left_trimmed = left.trim_start_matches('0');
    let right_trimmed = right.trim_start_matches('0');
    left_trimmed
        .len()
        .cmp(&right_trimmed.len())
        .then_with(|| left_trimmed.cmp(right_trimmed))
        .then_with(|| left.len().cmp(&right.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_system::CoreFileSystem;
    use std::fs;
    use tempfile::tempdir;

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_compare_names_numeric_aware() {
        assert_eq!(compare_names("file2", "file10"), Ordering::Less);
        assert_eq!(compare_names("file10", "file2"), Ordering::Greater);
        assert_eq!(compare_names("v1.9", "v1.10"), Ordering::Less);
        assert_eq!(compare_names("a", "a1"), Ordering::Less);
        assert_eq!(compare_names("007", "7"), Ordering::Greater);
        assert_eq!(compare_names("99 bottles", "100 bottles"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_case_insensitive_with_total_order() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Apple", "banana"), Ordering::Less);
        // Same letters, different case: ordered but never equal.
        assert_ne!(compare_names("Note", "note"), Ordering::Equal);
        assert_eq!(
            compare_names("Note", "note"),
            compare_names("Note", "note")
        );
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_sort_entries_folders_first_then_natural() {
        let mut entries = vec![
            DirectoryEntry::File {
                name: "file10.md".to_string(),
            },
            DirectoryEntry::Directory {
                name: "zeta".to_string(),
            },
            DirectoryEntry::File {
                name: "File2.md".to_string(),
            },
            DirectoryEntry::Directory {
                name: "Alpha".to_string(),
            },
            DirectoryEntry::File {
                name: "apple.md".to_string(),
            },
        ];

        sort_entries(&mut entries);

        assert_eq!(
            names(&entries),
            vec!["Alpha", "zeta", "apple.md", "File2.md", "file10.md"]
        );
    }

    #[test]
    fn test_list_directory_sorted_is_repeatable() -> Result<()> {
        let dir = tempdir()?;
        for name in ["b10.md", "b9.md", "B1.md", "notes.txt"] {
            fs::write(dir.path().join(name), name)?;
        }
        fs::create_dir(dir.path().join("Projects"))?;
        fs::create_dir(dir.path().join("archive"))?;
        let provider = CoreFileSystem::new();

        let first = list_directory_sorted(&provider, dir.path())?;
        let second = list_directory_sorted(&provider, dir.path())?;

        assert_eq!(
            names(&first),
            vec!["archive", "Projects", "B1.md", "b9.md", "b10.md", "notes.txt"]
        );
        assert!(first[0].is_dir() && first[1].is_dir());
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_list_directory_sorted_missing_path_fails() {
        let provider = CoreFileSystem::new();
        let missing = Path::new("this_path_does_not_exist_hopefully");
        let result = list_directory_sorted(&provider, missing);
        assert!(result.is_err());
    }
}
