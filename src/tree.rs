//! Category tree built from kept entries and its Johnny Decimal numbering.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::category::CategoryPath;
use crate::diagnostics::{Diagnostics, Warning};
use crate::entry::Entry;

/// Display name used for an empty group, subgroup or folder.
pub const UNCATEGORIZED: &str = "(uncategorized)";

/// Number of entries in a folder and the earliest timestamp among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderStats {
    pub count: usize,
    pub earliest: NaiveDateTime,
}

type Folders = BTreeMap<String, FolderStats>;
type Subgroups = BTreeMap<String, Folders>;

/// Three-level tree of group → subgroup → folder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryTree {
    groups: BTreeMap<String, Subgroups>,
}

/// A numbered folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedFolder {
    pub name: String,
    pub sequence: usize,
    pub count: usize,
    pub earliest: NaiveDateTime,
}

/// A numbered subgroup and its folders in numbering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedSubgroup {
    pub name: String,
    pub id: usize,
    pub folders: Vec<NumberedFolder>,
}

/// A group with its reserved band of subgroup numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedGroup {
    pub name: String,
    pub band_start: usize,
    pub band_end: usize,
    pub subgroups: Vec<NumberedSubgroup>,
}

/// Category tree with numbers assigned to every level.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NumberedTree {
    pub groups: Vec<NumberedGroup>,
}

impl CategoryTree {
    /// Aggregate all entries with a keep action.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut tree = Self::default();
        for entry in entries.into_iter().filter(|e| e.action.is_keep()) {
            tree.add(&entry.category, entry.timestamp);
        }
        tree
    }

    /// Count one entry in the given category.
    pub fn add(&mut self, category: &CategoryPath, timestamp: NaiveDateTime) {
        self.groups
            .entry(category.group.clone())
            .or_default()
            .entry(category.subgroup.clone())
            .or_default()
            .entry(category.folder.clone())
            .and_modify(|stats| {
                stats.count += 1;
                stats.earliest = stats.earliest.min(timestamp);
            })
            .or_insert(FolderStats {
                count: 1,
                earliest: timestamp,
            });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn get(&self, category: &CategoryPath) -> Option<&FolderStats> {
        self.groups
            .get(&category.group)?
            .get(&category.subgroup)?
            .get(&category.folder)
    }

    /// Assign numbers to every group, subgroup and folder.
    ///
    /// Groups are sorted by name and each one reserves a band of `subgroups_per_group` numbers,
    /// the first band starting at `subgroups_per_group`.
    /// Subgroups are numbered by name from the start of their band.
    /// Folders are numbered from 1 in order of their earliest timestamp.
    ///
    /// Groups that leave less than `minimum_groupspace` unused subgroup numbers produce a warning.
    #[must_use]
    pub fn number(&self, subgroups_per_group: usize, minimum_groupspace: usize) -> (NumberedTree, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut groups = Vec::with_capacity(self.groups.len());

        let mut band_start = subgroups_per_group;
        for (group_name, subgroups) in &self.groups {
            if subgroups.len() + minimum_groupspace > subgroups_per_group {
                diagnostics.warn(Warning::CrowdedGroup {
                    group: group_name.clone(),
                    subgroups: subgroups.len(),
                    minimum_groupspace,
                });
            }

            let numbered_subgroups = subgroups
                .iter()
                .enumerate()
                .map(|(index, (subgroup_name, folders))| NumberedSubgroup {
                    name: subgroup_name.clone(),
                    id: band_start + index,
                    folders: number_folders(folders),
                })
                .collect();

            groups.push(NumberedGroup {
                name: group_name.clone(),
                band_start,
                band_end: band_start + subgroups_per_group - 1,
                subgroups: numbered_subgroups,
            });

            band_start += subgroups_per_group;
        }

        (NumberedTree { groups }, diagnostics)
    }
}

/// Folders ordered by earliest timestamp, with the name as a tie-break.
fn number_folders(folders: &Folders) -> Vec<NumberedFolder> {
    folders
        .iter()
        .sorted_by(|(a_name, a), (b_name, b)| a.earliest.cmp(&b.earliest).then_with(|| a_name.cmp(b_name)))
        .enumerate()
        .map(|(index, (name, stats))| NumberedFolder {
            name: name.clone(),
            sequence: index + 1,
            count: stats.count,
            earliest: stats.earliest,
        })
        .collect()
}

impl NumberedGroup {
    /// Heading text, for example `10-19 finance`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}-{} {}", self.band_start, self.band_end, display_name(&self.name))
    }
}

impl NumberedSubgroup {
    /// Heading text, for example `10 invoices`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.id, display_name(&self.name))
    }

    /// Heading text for one of this subgroup's folders, for example `10.01 2021`.
    #[must_use]
    pub fn folder_title(&self, folder: &NumberedFolder) -> String {
        format!("{}.{:02} {}", self.id, folder.sequence, display_name(&folder.name))
    }
}

impl NumberedTree {
    /// Outline list lines describing the numbered hierarchy.
    #[must_use]
    pub fn heading_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for group in &self.groups {
            lines.push(format!(" * {}", group.title()));
            for subgroup in &group.subgroups {
                lines.push(format!("   * {}", subgroup.title()));
                for folder in &subgroup.folders {
                    lines.push(format!("     * {} ({})", subgroup.folder_title(folder), folder.count));
                }
            }
        }
        lines
    }

    /// Map each category to its directory relative to the target root.
    #[must_use]
    pub fn target_dirs(&self) -> BTreeMap<CategoryPath, PathBuf> {
        let mut mapping = BTreeMap::new();
        for group in &self.groups {
            let group_title = group.title();
            for subgroup in &group.subgroups {
                let subgroup_title = subgroup.title();
                for folder in &subgroup.folders {
                    let category = CategoryPath::new(&group.name, &subgroup.name, &folder.name);
                    let directory: PathBuf = [group_title.clone(), subgroup_title.clone(), subgroup.folder_title(folder)]
                        .iter()
                        .collect();
                    mapping.insert(category, directory);
                }
            }
        }
        mapping
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { UNCATEGORIZED } else { name }
}
