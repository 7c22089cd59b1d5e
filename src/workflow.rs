//! One run over a filing document: rebuild entries, renumber, save, then optionally copy.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;

use crate::config::Config;
use crate::copy::{Copier, CopyStats};
use crate::diagnostics::{Diagnostics, Warning};
use crate::entry::{Action, Entry, sort_entries, trim_trailing_separator};
use crate::outline::Document;
use crate::plan::copy_plan;
use crate::scan::{FsSourceTree, SourceTree, entry_for, find_new_files, scan_directory};
use crate::settings::DocumentSettings;
use crate::tree::{CategoryTree, NumberedTree};
use crate::{path_to_string_relative, print_bold, show_diff};

/// Result of rebuilding the document model.
#[derive(Debug)]
pub struct Processed {
    /// Entries in canonical order.
    pub entries: Vec<Entry>,
    pub numbered: NumberedTree,
    pub diagnostics: Diagnostics,
}

/// Summary of a complete run.
#[derive(Debug)]
pub struct RunReport {
    pub entries: usize,
    pub diagnostics: Diagnostics,
    /// Set when the copy phase ran.
    pub copy: Option<CopyStats>,
}

/// Processes a single filing document.
#[derive(Debug)]
pub struct Johnny {
    document_path: PathBuf,
    config: Config,
}

impl Johnny {
    /// # Errors
    /// Returns an error if the document path does not exist.
    pub fn new(document_path: &Path, config: Config) -> Result<Self> {
        let document_path = crate::resolve_input_path(Some(document_path))?;
        if config.debug {
            eprintln!("{config}");
            eprintln!("Document: {}", document_path.display());
        }
        Ok(Self { document_path, config })
    }

    /// Update the document and run the copy phase if configured.
    ///
    /// The document is saved before copying starts,
    /// so a failed copy never loses the updated table and category tree.
    ///
    /// # Errors
    /// Returns an error if the document is invalid, copying was refused because of warnings,
    /// or a copy operation failed.
    pub fn run(&self) -> Result<RunReport> {
        let mut document = Document::load(&self.document_path)?;
        let base_dir = self.document_path.parent().unwrap_or_else(|| Path::new("."));
        let settings = DocumentSettings::from_properties(&document.properties(), base_dir)?;
        if self.config.debug {
            eprintln!("{settings:#?}");
        }

        let source = FsSourceTree::new(&settings.source_dir);
        let mut processed = process(&mut document, &settings, &source, &self.config)?;
        document.save_atomic(&self.document_path)?;
        println!(
            "Updated {} with {} entries",
            path_to_string_relative(&self.document_path).cyan(),
            processed.entries.len()
        );

        let copy = if self.config.copy {
            Some(copy_phase(&mut processed, &settings, &self.config)?)
        } else {
            processed.diagnostics.print();
            None
        };

        Ok(RunReport {
            entries: processed.entries.len(),
            diagnostics: processed.diagnostics,
            copy,
        })
    }
}

/// Rebuild entries from the document table and the source tree,
/// then rewrite the table and the category tree heading in `document`.
///
/// # Errors
/// Returns an error if the document has no single table or the source tree can not be read.
pub fn process<T: SourceTree + ?Sized>(
    document: &mut Document,
    settings: &DocumentSettings,
    source: &T,
    config: &Config,
) -> Result<Processed> {
    let mut diagnostics = Diagnostics::new();
    let table = document.table_mut()?;
    let rows: Vec<Vec<String>> = table.data_rows().map(<[String]>::to_vec).collect();

    let mut entries = if rows.is_empty() {
        println!(
            "No files, doing the initial scan of {}",
            settings.source_dir.display()
        );
        scan_directory(source, "", "")?
    } else {
        entries_from_rows(&rows, source, config, &mut diagnostics)?
    };

    let known: HashSet<String> = entries.iter().map(|entry| entry.path.clone()).collect();
    let new_files = find_new_files(source, "", &known)?;
    if config.verbose && !new_files.is_empty() {
        print_bold!("Found {} new file(s)", new_files.len());
    }
    entries.extend(new_files);
    sort_entries(&mut entries);

    let new_rows: Vec<[String; 3]> = entries.iter().map(|e| e.row(config.annotate_dates)).collect();
    if config.verbose {
        show_changed_rows(&rows, &new_rows);
    }
    table.set_data_rows(new_rows);

    let (numbered, tree_diagnostics) =
        CategoryTree::from_entries(&entries).number(settings.subgroups_per_group, config.minimum_groupspace);
    diagnostics.merge(tree_diagnostics);
    document.replace_last_heading_body(numbered.heading_lines());

    Ok(Processed {
        entries,
        numbered,
        diagnostics,
    })
}

/// Check all entries and copy the kept ones into the numbered hierarchy.
///
/// # Errors
/// Returns an error when there are warnings and `force` is not set, or when copying fails.
pub fn copy_phase(processed: &mut Processed, settings: &DocumentSettings, config: &Config) -> Result<CopyStats> {
    for entry in &processed.entries {
        if let Some(problem) = entry.check() {
            processed.diagnostics.warn(Warning::Check { problem });
        }
    }

    if processed.diagnostics.has_warnings() && !config.force {
        processed.diagnostics.print();
        anyhow::bail!("Refusing to copy files because there were warnings. Fix or use --force.");
    }

    let (plan, plan_diagnostics) = copy_plan(
        &processed.entries,
        &processed.numbered.target_dirs(),
        &settings.source_dir,
        &settings.target_dir,
    )?;
    processed.diagnostics.merge(plan_diagnostics);
    processed.diagnostics.print();

    if config.execute {
        print_bold!("Copying {} item(s)", plan.len());
    } else {
        print_bold!("Dryrun: {} item(s) would be copied", plan.len());
    }

    let stats = Copier::new(config.overwrite, !config.execute, config.verbose)
        .execute(&plan)
        .context("Copying stopped")?;
    if config.execute {
        println!("Copied {} file(s), skipped {}", stats.copied, stats.skipped);
    }
    Ok(stats)
}

/// Create entries from table rows, expanding `r` rows and dropping rows whose path has vanished.
fn entries_from_rows<T: SourceTree + ?Sized>(
    rows: &[Vec<String>],
    source: &T,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = move |index: usize| row.get(index).map_or("", |value| value.trim());
        let (category, code, path) = (cell(0), cell(1), trim_trailing_separator(cell(2)));
        if path.is_empty() {
            continue;
        }

        if !source.exists(path) {
            diagnostics.warn(Warning::Vanished { path: path.to_string() });
            continue;
        }

        let action = Action::from_code(code);
        if let Action::Unknown(code) = &action {
            diagnostics.warn(Warning::UnknownAction {
                code: code.clone(),
                path: path.to_string(),
            });
        }

        if action == Action::Recurse {
            if config.verbose {
                println!("Recursing into {path}");
            }
            entries.extend(scan_directory(source, path, category)?);
        } else {
            entries.push(entry_for(source, path, action, category)?);
        }
    }
    Ok(entries)
}

/// Print a diff for every row whose text changed, matched by path.
fn show_changed_rows(old_rows: &[Vec<String>], new_rows: &[[String; 3]]) {
    let old_by_path: HashMap<String, String> = old_rows
        .iter()
        .filter_map(|row| {
            let path = trim_trailing_separator(row.get(2)?.trim()).to_string();
            Some((path, row.iter().map(|cell| cell.trim()).join(" | ")))
        })
        .collect();

    for row in new_rows {
        let path = trim_trailing_separator(&row[2]);
        if let Some(old) = old_by_path.get(path) {
            let new = row.join(" | ");
            if *old != new {
                show_diff(old, &new);
            }
        }
    }
}
