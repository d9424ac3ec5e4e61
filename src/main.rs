use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use runfolder_clean::disk_usage::{self, DiskUsage};
use runfolder_clean::{
    load_purge_table, purge_run_folder, validate_run_folder, PurgeOptions, PurgeOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Clean up an illumina (presently MiSeq) run folder",
    long_about = None
)]
struct Args {
    /// Absolute or relative pathname of the run folder to clean
    dir: PathBuf,

    /// Display what would have been done, but do not delete anything
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// List every entry found in each purge directory
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<()> {
    let table = load_purge_table()?;

    println!("{}", "illumina run folder cleanup".bold());
    println!("[{}]", args.dir.display());
    if args.dry_run {
        println!("{}", "Dry run mode: nothing will be deleted".yellow());
    }

    validate_run_folder(&args.dir)?;

    // Filesystem level only
    let pre = DiskUsage::for_path(&args.dir)?;

    let options = PurgeOptions {
        dry_run: args.dry_run,
        verbose: args.verbose,
    };
    let report = purge_run_folder(&args.dir, &table, options)?;

    let post = DiskUsage::for_path(&args.dir)?;
    disk_usage::print_report(&pre, &post);

    debug!(
        removed = report.count(PurgeOutcome::Removed),
        would_remove = report.count(PurgeOutcome::WouldRemove),
        missing = report.count(PurgeOutcome::Missing),
        "purge finished"
    );

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
