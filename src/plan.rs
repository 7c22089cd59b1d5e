//! Turn kept entries into copy instructions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::category::CategoryPath;
use crate::diagnostics::Diagnostics;
use crate::entry::{Action, Entry};

/// A single copy operation for the copy executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub is_directory: bool,
}

impl fmt::Display for CopyInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.destination.display())
    }
}

/// Build copy instructions for every kept entry in the given order.
///
/// Entries without a complete category are skipped and recorded in the returned diagnostics.
///
/// # Errors
/// Returns an error if a kept entry has no target directory in `mapping`.
pub fn copy_plan(
    entries: &[Entry],
    mapping: &BTreeMap<CategoryPath, PathBuf>,
    source_dir: &Path,
    target_dir: &Path,
) -> Result<(Vec<CopyInstruction>, Diagnostics)> {
    let mut diagnostics = Diagnostics::new();
    let mut instructions = Vec::new();

    for entry in entries.iter().filter(|e| e.action.is_keep()) {
        if !entry.category_complete() {
            diagnostics.skip(&entry.path, "a complete target has not been set");
            continue;
        }

        let folder = mapping
            .get(&entry.category)
            .with_context(|| format!("No target directory for category '{}'", entry.category))?;

        instructions.push(CopyInstruction {
            source: source_dir.join(&entry.path),
            destination: destination(entry, &target_dir.join(folder))?,
            is_directory: entry.is_directory,
        });
    }

    Ok((instructions, diagnostics))
}

/// Destination for an entry inside its numbered folder.
///
/// Files and `k` directories go inside the folder, `K` directories become the folder.
///
/// # Errors
/// Returns an error for any action other than `k` or `K`.
pub fn destination(entry: &Entry, folder: &Path) -> Result<PathBuf> {
    if !entry.is_directory {
        return Ok(folder.join(entry.name()));
    }
    match entry.action {
        Action::KeepMerge => Ok(folder.join(entry.name())),
        Action::KeepAsFolder => Ok(folder.to_path_buf()),
        ref action => anyhow::bail!("Internal error - unknown action '{action}' for {}", entry.path),
    }
}

#[cfg(test)]
mod plan_tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::tree::CategoryTree;

    fn entry(path: &str, is_directory: bool, code: &str, category: &str) -> Entry {
        let timestamp = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Entry::new(path, is_directory, Action::from_code(code), category, timestamp)
    }

    fn plan(entries: &[Entry]) -> (Vec<CopyInstruction>, Diagnostics) {
        let (numbered, _) = CategoryTree::from_entries(entries).number(10, 1);
        copy_plan(entries, &numbered.target_dirs(), Path::new("/src"), Path::new("/dst")).unwrap()
    }

    fn folder() -> PathBuf {
        Path::new("/dst").join("10-19 a").join("10 b").join("10.01 c")
    }

    #[test]
    fn file_goes_inside_folder() {
        let (instructions, diagnostics) = plan(&[entry("docs/report.pdf", false, "k", "a/b/c")]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            instructions,
            vec![CopyInstruction {
                source: Path::new("/src").join("docs/report.pdf"),
                destination: folder().join("report.pdf"),
                is_directory: false,
            }]
        );
    }

    #[test]
    fn merged_directory_becomes_subfolder() {
        let (instructions, _) = plan(&[entry("photos/trip", true, "k", "a/b/c")]);
        assert_eq!(instructions[0].destination, folder().join("trip"));
        assert!(instructions[0].is_directory);
    }

    #[test]
    fn directory_kept_as_folder_becomes_the_folder() {
        let (instructions, _) = plan(&[entry("photos/trip/", true, "K", "a/b/c")]);
        assert_eq!(instructions[0].destination, folder());
    }

    #[test]
    fn file_kept_as_folder_goes_inside() {
        let (instructions, _) = plan(&[entry("note.txt", false, "K", "a/b/c")]);
        assert_eq!(instructions[0].destination, folder().join("note.txt"));
    }

    #[test]
    fn decomposed_file_name_is_kept_verbatim() {
        let decomposed = "cafe\u{301}.txt";
        let entries = vec![entry(decomposed, false, "k", "a/b/c")];
        let (instructions, _) = plan(&entries);
        assert_eq!(instructions[0].source, Path::new("/src").join(decomposed));
        assert_eq!(instructions[0].destination, folder().join(decomposed));
    }

    #[test]
    fn decomposed_directory_name_is_kept_verbatim() {
        let decomposed = "re\u{301}sume\u{301}";
        let entries = vec![entry(&format!("docs/{decomposed}/"), true, "k", "a/b/c")];
        let (instructions, _) = plan(&entries);
        assert_eq!(instructions[0].destination, folder().join(decomposed));
    }

    #[test]
    fn incomplete_category_is_skipped() {
        let entries = [
            entry("readme.txt", false, "k", "misc//"),
            entry("old.log", false, "d", ""),
            entry("new.txt", false, "u", "a/b/c"),
        ];
        let (instructions, diagnostics) = plan(&entries);
        assert!(instructions.is_empty());
        assert!(!diagnostics.has_warnings());
        assert_eq!(diagnostics.skipped.len(), 1);
        assert_eq!(diagnostics.skipped[0].path, "readme.txt");
    }

    #[test]
    fn missing_mapping_is_an_error() {
        let entries = [entry("a.txt", false, "k", "a/b/c")];
        let result = copy_plan(&entries, &BTreeMap::new(), Path::new("/src"), Path::new("/dst"));
        assert!(result.is_err());
    }

    #[test]
    fn non_keep_directory_destination_is_an_error() {
        let e = entry("dir", true, "u", "a/b/c");
        assert!(destination(&e, Path::new("/dst")).is_err());
    }
}
