//! Reading the source directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::date::system_time_to_naive;
use crate::entry::{Action, Entry, trim_trailing_separator};
use crate::{os_str_to_string, path_to_string};

/// Filesystem queries needed to build entries.
///
/// All paths are relative to the source root.
pub trait SourceTree {
    /// Names of the items in a directory, sorted.
    fn list_dir(&self, relative: &str) -> Result<Vec<String>>;
    fn exists(&self, relative: &str) -> bool;
    fn is_dir(&self, relative: &str) -> bool;
    fn modified(&self, relative: &str) -> Result<NaiveDateTime>;
}

/// Source tree on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
}

impl FsSourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn absolute(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl SourceTree for FsSourceTree {
    fn list_dir(&self, relative: &str) -> Result<Vec<String>> {
        let path = self.absolute(relative);
        let mut names = Vec::new();
        for entry in fs::read_dir(&path).with_context(|| format!("Failed to read directory: {}", path.display()))? {
            let entry = entry?;
            names.push(os_str_to_string(&entry.file_name()));
        }
        names.sort_unstable();
        Ok(names)
    }

    fn exists(&self, relative: &str) -> bool {
        self.absolute(relative).exists()
    }

    fn is_dir(&self, relative: &str) -> bool {
        self.absolute(relative).is_dir()
    }

    fn modified(&self, relative: &str) -> Result<NaiveDateTime> {
        let path = self.absolute(relative);
        let modified = fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("Failed to read modification time: {}", path.display()))?;
        Ok(system_time_to_naive(modified))
    }
}

/// Join a child name onto a relative directory path.
#[must_use]
pub fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        path_to_string(&Path::new(trim_trailing_separator(relative)).join(name))
    }
}

/// Create an entry for an existing path, reading its type and modification time.
pub fn entry_for<T: SourceTree + ?Sized>(tree: &T, relative: &str, action: Action, category: &str) -> Result<Entry> {
    let modified = tree.modified(relative)?;
    Ok(Entry::new(relative, tree.is_dir(relative), action, category, modified))
}

/// List one directory level as unprocessed entries that inherit the given category.
pub fn scan_directory<T: SourceTree + ?Sized>(tree: &T, relative: &str, category: &str) -> Result<Vec<Entry>> {
    tree.list_dir(relative)?
        .iter()
        .map(|name| entry_for(tree, &join_relative(relative, name), Action::Unprocessed, category))
        .collect()
}

/// Find files that are not listed yet.
///
/// Directories that are listed themselves are not descended into.
/// Every other directory is searched recursively.
pub fn find_new_files<T: SourceTree + ?Sized>(tree: &T, relative: &str, known: &HashSet<String>) -> Result<Vec<Entry>> {
    let mut found = Vec::new();
    for name in tree.list_dir(relative)? {
        let child = join_relative(relative, &name);
        if tree.is_dir(&child) {
            if !known.contains(&child) {
                found.extend(find_new_files(tree, &child, known)?);
            }
        } else if !known.contains(&child) {
            found.push(entry_for(tree, &child, Action::Unprocessed, "")?);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    use std::fs::File;

    use tempfile::tempdir;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("photos/2015")).unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        File::create(dir.path().join("photos/2015/beach.jpg")).unwrap();
        File::create(dir.path().join("photos/index.txt")).unwrap();
        File::create(dir.path().join("docs/cv.pdf")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        dir
    }

    #[test]
    fn lists_directory_sorted() {
        let dir = sample_tree();
        let tree = FsSourceTree::new(dir.path());
        assert_eq!(tree.list_dir("").unwrap(), vec!["docs", "notes.txt", "photos"]);
        assert_eq!(tree.list_dir("photos").unwrap(), vec!["2015", "index.txt"]);
        assert!(tree.list_dir("missing").is_err());
    }

    #[test]
    fn scans_one_level() {
        let dir = sample_tree();
        let tree = FsSourceTree::new(dir.path());
        let entries = scan_directory(&tree, "photos", "media/photos/").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, path_to_string(&Path::new("photos").join("2015")));
        assert!(entries[0].is_directory);
        assert_eq!(entries[0].action, Action::Unprocessed);
        assert_eq!(entries[0].category_text, "media/photos/");
        assert!(!entries[1].is_directory);
    }

    #[test]
    fn directory_year_sets_timestamp() {
        let dir = sample_tree();
        let tree = FsSourceTree::new(dir.path());
        let entries = scan_directory(&tree, "photos", "").unwrap();
        assert_eq!(entries[0].timestamp.date().to_string(), "2015-01-01");
    }

    #[test]
    fn finds_unlisted_files() {
        let dir = sample_tree();
        let tree = FsSourceTree::new(dir.path());
        let known: HashSet<String> = ["notes.txt".to_string(), "photos".to_string()].into_iter().collect();

        let found = find_new_files(&tree, "", &known).unwrap();
        let paths: Vec<&str> = found.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec![path_to_string(&Path::new("docs").join("cv.pdf"))]);
        assert!(found.iter().all(|e| e.category.is_empty()));
    }

    #[test]
    fn finds_everything_when_nothing_is_listed() {
        let dir = sample_tree();
        let tree = FsSourceTree::new(dir.path());
        let found = find_new_files(&tree, "", &HashSet::new()).unwrap();
        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|e| !e.is_directory));
    }

    #[test]
    fn joins_relative_paths() {
        assert_eq!(join_relative("", "a"), "a");
        assert_eq!(join_relative("x", "a"), path_to_string(&Path::new("x").join("a")));
    }
}
