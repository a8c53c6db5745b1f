mod content;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use readme_sections_config::Manifest;
use readme_sections_core::{
    section_titles, DocumentFs, ExitCode, FlushReport, MergeOptions, OverlayFs, Section,
    SectionError, SectionStore, StdFs, DEFAULT_DOCUMENT,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::content::section_body;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keep generated sections of a markdown document up to date",
    long_about = None
)]
struct Cli {
    /// Markdown document to update [default: README.md, or the manifest's document]
    #[arg(short = 'f', long = "file", value_name = "FILE", global = true)]
    file: Option<PathBuf>,

    /// Print the diff without writing changes
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    /// Do not keep a .bak copy of the previous document
    #[arg(long = "no-backup", global = true)]
    no_backup: bool,

    /// Suppress informational output (diffs, success messages)
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert or update a single section
    Set {
        /// Section title, matched literally against `## <TITLE>` headings
        #[arg(value_name = "TITLE")]
        title: String,

        /// Bullet list item (repeatable)
        #[arg(long = "item", value_name = "ITEM", allow_hyphen_values = true)]
        items: Vec<String>,

        /// Read section content from file (use '-' for stdin)
        #[arg(long = "with", value_name = "PATH", allow_hyphen_values = true)]
        with: Option<PathBuf>,

        /// Inline section content with escape sequences (\\n, \\t, \\\\ , \\")
        #[arg(long = "with-string", value_name = "TEXT", allow_hyphen_values = true)]
        with_string: Option<String>,
    },
    /// Update every section listed in a TOML manifest
    Sync {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
    /// List the `##` sections found in the document
    Show,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(exit) | Err(exit) => std::process::ExitCode::from(exit as u8),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    match &cli.command {
        Command::Set {
            title,
            items,
            with,
            with_string,
        } => {
            let content = section_body(items, with.as_deref(), with_string.as_deref())
                .map_err(|err| {
                    eprintln!("{err}");
                    err.exit_code()
                })?;
            let path = cli
                .file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT));
            apply(&cli, path, vec![Section::new(title.clone(), content)])
        }
        Command::Sync { manifest } => {
            let manifest = Manifest::load(manifest).map_err(|err| {
                eprintln!("{err}");
                ExitCode::Manifest
            })?;
            debug!(
                manifest = %manifest.source.display(),
                document = %manifest.document.display(),
                sections = manifest.sections.len(),
                "manifest loaded"
            );
            let path = cli.file.clone().unwrap_or(manifest.document);
            apply(&cli, path, manifest.sections)
        }
        Command::Show => show(&cli),
    }
}

fn apply(cli: &Cli, path: PathBuf, sections: Vec<Section>) -> Result<ExitCode, ExitCode> {
    debug!(
        path = %path.display(),
        sections = sections.len(),
        dry_run = cli.dry_run,
        "applying sections"
    );
    let fs = StdFs::with_backup(!cli.no_backup);
    let options = MergeOptions {
        path: path.clone(),
        ..Default::default()
    };

    if !cli.dry_run {
        let mut store = SectionStore::with_options(fs, options);
        store.add(sections);
        let report = store.flush_all().map_err(report_error)?;
        print_report(cli, &path, &report);
        return Ok(ExitCode::Success);
    }

    let mut store = SectionStore::with_options(OverlayFs::new(fs), options);
    store.add(sections);
    let report = store.flush_all().map_err(report_error)?;

    if cli.quiet {
        return Ok(ExitCode::Success);
    }

    match report.diff(&path.to_string_lossy()) {
        Some(diff) => {
            print!("{diff}");
            io::stdout().flush().ok();
        }
        None => println!("No changes (dry run)"),
    }

    Ok(ExitCode::Success)
}

fn print_report(cli: &Cli, path: &Path, report: &FlushReport) {
    if cli.quiet {
        return;
    }

    if !report.changed() {
        println!("No changes to {}", path.display());
        return;
    }

    for outcome in report.outcomes.iter().filter(|outcome| outcome.changed()) {
        println!("{} section '{}'", outcome.action, outcome.title);
    }
    println!("Updated {}", path.display());
}

fn show(cli: &Cli) -> Result<ExitCode, ExitCode> {
    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT));
    let bytes = StdFs::new().read_file(&path).map_err(|err| {
        eprintln!("failed to read {}: {err}", path.display());
        ExitCode::Io
    })?;
    let content = String::from_utf8(bytes).map_err(|err| {
        eprintln!("invalid document {}: {err}", path.display());
        ExitCode::InvalidContent
    })?;

    for title in section_titles(&content) {
        println!("{title}");
    }

    Ok(ExitCode::Success)
}

fn report_error(err: SectionError) -> ExitCode {
    eprintln!("{err}");
    err.exit_code()
}
