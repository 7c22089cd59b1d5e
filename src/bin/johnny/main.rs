mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use johnny_decimal::copy::OverwritePolicy;
use johnny_decimal::workflow::Johnny;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Organize files into a Johnny Decimal hierarchy using an outline document"
)]
pub struct Args {
    /// Outline document to process
    #[arg(value_hint = clap::ValueHint::FilePath, required_unless_present = "SHELL")]
    file: Option<PathBuf>,

    /// Copy kept files into the target directory
    #[arg(short, long)]
    copy: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Copy files in spite of warnings
    #[arg(short, long)]
    force: bool,

    /// Minimum number of unused subgroup numbers each group must have left
    #[arg(short, long, value_name = "COUNT")]
    minimum_groupspace: Option<usize>,

    /// Actually copy files instead of only printing what would be copied
    #[arg(short = 'x', long = "no-dry-run")]
    execute: bool,

    /// What to do when a destination file already exists
    #[arg(short, long, value_enum, value_name = "POLICY")]
    overwrite: Option<OverwritePolicy>,

    /// Drop `[YYYY-MM-DD]` date annotations from the rewritten table
    #[arg(short = 'a', long)]
    no_annotate: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        return johnny_decimal::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"));
    }

    let file = args.file.clone().unwrap_or_default();
    let config = config::from_args(args)?;
    Johnny::new(&file, config)?.run()?;
    Ok(())
}
