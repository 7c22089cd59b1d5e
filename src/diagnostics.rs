//! Warnings and skipped entries collected while processing a document.

use std::fmt;

use colored::Colorize;

use crate::print_warning;

/// Non-fatal problem. Any warning blocks copying unless forced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A path listed in the table no longer exists in the source directory.
    Vanished { path: String },
    /// A group has too few unused subgroup numbers left.
    CrowdedGroup {
        group: String,
        subgroups: usize,
        minimum_groupspace: usize,
    },
    /// An entry is not ready to be copied.
    Check { problem: String },
    /// A table row has an action code that is not recognised.
    UnknownAction { code: String, path: String },
}

/// Entry that was left out of the copy plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub path: String,
    pub reason: String,
}

/// Warnings and skips accumulated by each processing stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
    pub skipped: Vec<Skip>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn skip(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(Skip {
            path: path.into(),
            reason: reason.into(),
        });
    }

    /// Append everything from another stage.
    pub fn merge(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
        self.skipped.extend(other.skipped);
    }

    #[must_use]
    pub const fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.skipped.is_empty()
    }

    /// Print all warnings and skips to stderr.
    pub fn print(&self) {
        for warning in &self.warnings {
            print_warning!("WARNING: {warning}");
        }
        for skip in &self.skipped {
            eprintln!("{} {}: {}", "SKIPPING".cyan(), skip.path, skip.reason);
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vanished { path } => write!(f, "Entry disappeared: {path}"),
            Self::CrowdedGroup {
                group,
                subgroups,
                minimum_groupspace,
            } => write!(
                f,
                "Group '{group}' has {subgroups} subgroups, which leaves less than {minimum_groupspace} spare places \
                 for future additions. Reorganize the groups, increase subgroups-per-group or decrease the minimum groupspace."
            ),
            Self::Check { problem } => write!(f, "{problem}"),
            Self::UnknownAction { code, path } => write!(f, "Unknown action '{code}': {path}"),
        }
    }
}
