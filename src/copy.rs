//! Performing copy instructions on disk.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::plan::CopyInstruction;
use crate::print_warning;

/// What to do when a destination file already exists.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Abort on any existing destination file.
    #[default]
    Fail,
    /// Leave the destination alone unless it is older than the source.
    SkipUnlessNewer,
}

/// Counts from executing a copy plan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub skipped: usize,
}

/// Executes copy instructions.
#[derive(Debug, Clone, Copy)]
pub struct Copier {
    pub policy: OverwritePolicy,
    pub dryrun: bool,
    pub verbose: bool,
}

impl Copier {
    #[must_use]
    pub const fn new(policy: OverwritePolicy, dryrun: bool, verbose: bool) -> Self {
        Self {
            policy,
            dryrun,
            verbose,
        }
    }

    /// Print and, unless in dryrun mode, perform every instruction in order.
    ///
    /// # Errors
    /// Returns an error on the first failed copy, or on an existing destination with [`OverwritePolicy::Fail`].
    pub fn execute(&self, instructions: &[CopyInstruction]) -> Result<CopyStats> {
        let mut stats = CopyStats::default();
        for instruction in instructions {
            println!("{instruction}");
            if self.dryrun {
                continue;
            }
            if instruction.is_directory {
                self.copy_tree(&instruction.source, &instruction.destination, &mut stats)?;
            } else {
                self.copy_file(&instruction.source, &instruction.destination, &mut stats)?;
            }
        }
        Ok(stats)
    }

    /// Copy a directory recursively, merging into an existing destination directory.
    fn copy_tree(&self, source: &Path, destination: &Path, stats: &mut CopyStats) -> Result<()> {
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to read directory: {}", source.display()))?;
            let relative = entry.path().strip_prefix(source)?;
            let target = destination.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create directory: {}", target.display()))?;
            } else {
                self.copy_file(entry.path(), &target, stats)?;
            }
        }
        Ok(())
    }

    fn copy_file(&self, source: &Path, destination: &Path, stats: &mut CopyStats) -> Result<()> {
        if destination.exists() {
            match self.policy {
                OverwritePolicy::Fail => anyhow::bail!(
                    "File already exists, can't copy {} -> {}",
                    source.display(),
                    destination.display()
                ),
                OverwritePolicy::SkipUnlessNewer => {
                    if !is_older(destination, source)? {
                        if self.verbose {
                            print_warning!("Skipping existing file: {}", destination.display());
                        }
                        stats.skipped += 1;
                        return Ok(());
                    }
                }
            }
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        copy_contents(source, destination)
            .with_context(|| format!("Failed to copy {} -> {}", source.display(), destination.display()))?;

        if self.verbose {
            println!("  {} {}", "Copied:".green(), destination.display());
        }
        stats.copied += 1;
        Ok(())
    }
}

/// True if `path` was modified strictly before `other`.
fn is_older(path: &Path, other: &Path) -> Result<bool> {
    let modified = |p: &Path| {
        fs::metadata(p)
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("Failed to read modification time: {}", p.display()))
    };
    Ok(modified(path)? < modified(other)?)
}

/// Copy file contents and modification time, then apply the source permissions.
///
/// Permissions are set last so a read-only source does not prevent setting the time.
fn copy_contents(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source)?;
    let mut reader = File::open(source)?;
    let mut writer = File::create(destination)?;
    io::copy(&mut reader, &mut writer)?;
    writer
        .set_modified(metadata.modified()?)
        .with_context(|| format!("Failed to set modification time: {}", destination.display()))?;
    drop(writer);
    fs::set_permissions(destination, metadata.permissions())
        .with_context(|| format!("Failed to set permissions: {}", destination.display()))
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::SkipUnlessNewer => write!(f, "skip-unless-newer"),
        }
    }
}
