//! Command-line front end for `prodtally_core`.
//!
//! # Responsibility
//! - Load project documents, apply exclusions and print per-person summaries.
//! - Expose the combo encoder for checking shortcut ids by hand.

mod render;

use clap::{Args, Parser, Subcommand};
use log::info;
use prodtally_core::{
    encode, load_project_files, DisplayConfig, DocumentError, KeyEvent, LoggingConfig, Platform,
    SelectionFilter, SummaryCache,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "prodtally", version, about = "Per-person contribution summaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize contributions per person across project documents.
    Summary(SummaryArgs),
    /// List the projects found in documents.
    Projects {
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
    },
    /// Print the combo id a key chord encodes to.
    Combo(ComboArgs),
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
    /// Leave a project out of the totals (repeatable).
    #[arg(long, value_name = "ID")]
    exclude: Vec<String>,
    /// Show detail rows under each project/phase group.
    #[arg(long)]
    expand: bool,
    /// Machine-readable JSON output.
    #[arg(long)]
    json: bool,
    /// Display config JSON (labels, currency).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ComboArgs {
    /// Physical key code, e.g. `KeyC`.
    code: String,
    /// Encode as on macOS (Command is primary).
    #[arg(long)]
    mac: bool,
    #[arg(long)]
    ctrl: bool,
    #[arg(long)]
    meta: bool,
    #[arg(long)]
    alt: bool,
    #[arg(long)]
    shift: bool,
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Document(DocumentError),
    Config {
        path: PathBuf,
        source: Box<dyn Error>,
    },
    Output(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Config { path, source } => {
                write!(f, "cannot use config `{}`: {source}", path.display())
            }
            Self::Output(err) => write!(f, "cannot encode output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Document(err) => Some(err),
            Self::Config { source, .. } => Some(source.as_ref()),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<DocumentError> for CliError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    LoggingConfig::from_env()
        .apply()
        .map_err(CliError::Logging)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        prodtally_core::core_version()
    );

    match cli.command {
        Command::Summary(args) => summary(args),
        Command::Projects { files } => {
            let projects = load_project_files(&files)?;
            print!("{}", render::project_list(&projects, &DisplayConfig::default()));
            Ok(())
        }
        Command::Combo(args) => {
            println!("{}", combo(&args));
            Ok(())
        }
    }
}

fn summary(args: SummaryArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => load_display_config(path)?,
        None => DisplayConfig::default(),
    };
    let projects = load_project_files(&args.files)?;

    let mut selection = SelectionFilter::new();
    for id in &args.exclude {
        if !projects.iter().any(|project| &project.id == id) {
            eprintln!("warning: no project with id `{id}`");
        }
        if selection.is_included(id) {
            selection.toggle(id);
        }
    }

    let mut cache = SummaryCache::new();
    let snapshot = cache.get_or_compute(&projects, &selection);
    if snapshot.report.has_skips() {
        eprintln!(
            "warning: skipped {} malformed contribution(s); {} unlabeled node(s) counted under their parent",
            snapshot.report.skipped_records, snapshot.report.unlabeled_nodes
        );
    }

    if args.json {
        println!("{}", render::summary_json(snapshot, &config)?);
    } else {
        print!("{}", render::summary_text(snapshot, &config, args.expand));
    }
    Ok(())
}

fn load_display_config(path: &PathBuf) -> Result<DisplayConfig, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|err| CliError::Config {
        path: path.clone(),
        source: Box::new(err),
    })?;
    DisplayConfig::from_json(&raw).map_err(|err| CliError::Config {
        path: path.clone(),
        source: Box::new(err),
    })
}

fn combo(args: &ComboArgs) -> String {
    let mut event = KeyEvent::new(args.code.as_str());
    event.ctrl_key = args.ctrl;
    event.meta_key = args.meta;
    event.alt_key = args.alt;
    event.shift_key = args.shift;
    let platform = if args.mac {
        Platform::Apple
    } else {
        Platform::Other
    };
    encode(&event, platform)
}
