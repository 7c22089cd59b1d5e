//! Managed filesystem entries and their canonical ordering.

use std::ffi::OsStr;
use std::fmt;
use std::path::{MAIN_SEPARATOR, Path};

use chrono::NaiveDateTime;
use unicode_normalization::UnicodeNormalization;

use crate::category::CategoryPath;
use crate::date::resolve_timestamp;
use crate::os_str_to_string;

/// What to do with an entry, stored as a single character in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// `u`: newly found, not decided yet.
    Unprocessed,
    /// `k`: copy into the target folder. Directories become a subfolder.
    KeepMerge,
    /// `K`: directory contents become the target folder itself.
    KeepAsFolder,
    /// `d`: do not copy.
    Delete,
    /// `r`: replace this directory with its children on the next run.
    Recurse,
    /// Anything else found in a hand-edited table.
    Unknown(String),
}

impl Action {
    /// Parse an action code. Surrounding whitespace is ignored.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "u" => Self::Unprocessed,
            "k" => Self::KeepMerge,
            "K" => Self::KeepAsFolder,
            "d" => Self::Delete,
            "r" => Self::Recurse,
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Unprocessed => "u",
            Self::KeepMerge => "k",
            Self::KeepAsFolder => "K",
            Self::Delete => "d",
            Self::Recurse => "r",
            Self::Unknown(code) => code,
        }
    }

    /// Entry should be copied into the numbered hierarchy.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::KeepMerge | Self::KeepAsFolder)
    }

    /// Action is final and allowed in a copy run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::KeepMerge | Self::KeepAsFolder | Self::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One file or directory under management, relative to the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative path without a trailing separator.
    pub path: String,
    pub is_directory: bool,
    pub action: Action,
    pub category: CategoryPath,
    /// Category as written in the table, with any date annotation removed.
    pub category_text: String,
    /// Date annotation found in the category, for example `[2020-05-01]`.
    pub annotation: String,
    pub timestamp: NaiveDateTime,
}

impl Entry {
    /// Create an entry, resolving its timestamp and the `!` folder directive.
    ///
    /// Never fails: problems are reported later by [`Entry::check`].
    #[must_use]
    pub fn new(
        path: &str,
        is_directory: bool,
        action: Action,
        raw_category: &str,
        modified: NaiveDateTime,
    ) -> Self {
        let path = trim_trailing_separator(path.trim()).to_string();
        let resolved = resolve_timestamp(raw_category.trim(), &path, modified);

        let mut category = CategoryPath::parse(&resolved.category);
        let mut category_text = resolved.category;
        if category.folder_from_name() {
            category.folder = base_name(&path);
            category_text = category.to_string();
        }

        Self {
            path,
            is_directory,
            action,
            category,
            category_text,
            annotation: resolved.annotation,
            timestamp: resolved.timestamp,
        }
    }

    /// All three category levels are set.
    #[must_use]
    pub const fn category_complete(&self) -> bool {
        self.category.is_complete()
    }

    /// Describe why this entry can not be copied, if anything.
    #[must_use]
    pub fn check(&self) -> Option<String> {
        if !self.action.is_terminal() {
            return Some(format!("Action must be k, K or d for copying: {}", self.path));
        }
        if self.action != Action::Delete && !self.category_complete() {
            return Some(format!("Category not completely specified: {}", self.path));
        }
        if self.action == Action::Delete && !self.category.is_empty() {
            return Some(format!("Action is delete, but category is non-empty: {}", self.path));
        }
        None
    }

    /// Table row cells: category, action code and path.
    ///
    /// Directories get a trailing separator.
    /// The date annotation is appended to the category when `annotate` is set.
    #[must_use]
    pub fn row(&self, annotate: bool) -> [String; 3] {
        let mut category = self.category_text.clone();
        if annotate && !self.annotation.is_empty() {
            category.push_str("  ");
            category.push_str(&self.annotation);
        }

        let mut path = self.path.clone();
        if self.is_directory && !path.ends_with(MAIN_SEPARATOR) {
            path.push(MAIN_SEPARATOR);
        }

        [category, self.action.code().to_string(), path]
    }

    /// File or directory name of the entry, exactly as it is on disk.
    #[must_use]
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(&self.path)
    }

    /// Canonical ordering key.
    ///
    /// Deleted entries last, then by category, files before directories,
    /// then oldest first, with the path as the final tie-break.
    #[must_use]
    pub fn sort_key(&self) -> (bool, &str, &str, &str, bool, NaiveDateTime, &str) {
        (
            self.action == Action::Delete,
            self.category.group.as_str(),
            self.category.subgroup.as_str(),
            self.category.folder.as_str(),
            self.is_directory,
            self.timestamp,
            self.path.as_str(),
        )
    }
}

/// Sort entries into canonical table order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Strip trailing path separators.
#[must_use]
pub fn trim_trailing_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', MAIN_SEPARATOR]);
    if trimmed.is_empty() { path } else { trimmed }
}

/// Last component of a relative path in NFC form, ignoring a trailing separator.
/// Used as the folder name for the `!` directive.
#[must_use]
pub fn base_name(path: &str) -> String {
    let name = Path::new(trim_trailing_separator(path))
        .file_name()
        .map(os_str_to_string)
        .unwrap_or_default();
    name.nfc().collect::<String>()
}
