//! Settings stored as properties in the filing document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const SOURCE_DIR_KEY: &str = "sourcedir";
pub const TARGET_DIR_KEY: &str = "targetdir";
pub const SUBGROUPS_PER_GROUP_KEY: &str = "subgroups-per-group";

/// Validated document properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Directory that is being organized.
    pub source_dir: PathBuf,
    /// Root of the numbered hierarchy.
    pub target_dir: PathBuf,
    /// Width of the subgroup number band reserved for each group.
    pub subgroups_per_group: usize,
}

impl DocumentSettings {
    /// Read the required properties.
    /// Relative directories are resolved against `base_dir`, the directory of the document.
    ///
    /// # Errors
    /// Returns an error if a key is missing or `subgroups-per-group` is not a positive integer.
    pub fn from_properties(properties: &BTreeMap<String, String>, base_dir: &Path) -> Result<Self> {
        let source_dir = required(properties, SOURCE_DIR_KEY)?;
        let target_dir = required(properties, TARGET_DIR_KEY)?;
        let subgroups_per_group = required(properties, SUBGROUPS_PER_GROUP_KEY)?
            .parse::<usize>()
            .with_context(|| format!("Property '{SUBGROUPS_PER_GROUP_KEY}' must be a positive integer"))?;
        if subgroups_per_group == 0 {
            anyhow::bail!("Property '{SUBGROUPS_PER_GROUP_KEY}' must be at least 1");
        }

        Ok(Self {
            source_dir: base_dir.join(source_dir),
            target_dir: base_dir.join(target_dir),
            subgroups_per_group,
        })
    }
}

fn required<'a>(properties: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str> {
    properties
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .with_context(|| format!("Document is missing required property '{key}'"))
}
