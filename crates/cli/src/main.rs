// sheetfuse - merge spreadsheet/CSV files by key columns, flagging conflicts

mod exit_codes;
mod merge_cmd;
mod normalize;
mod profile;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_IO, EXIT_PARSE, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetfuse")]
#[command(about = "Merge spreadsheet/CSV files by key columns, flagging conflicts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge input files into one deduplicated table
    #[command(after_help = "\
Examples:
  sheetfuse merge --files a.xlsx b.xlsx --key ArticleID --special Tag -o merged.xlsx
  sheetfuse merge --files q1.csv q2.csv --key Company --key Date --normalize-dates Date -o merged.csv
  sheetfuse merge --profile merge.toml
  sheetfuse merge --files a.csv b.csv --key id --json")]
    Merge(merge_cmd::MergeArgs),

    /// List the header columns of input files
    #[command(after_help = "\
Examples:
  sheetfuse columns a.xlsx b.csv
  sheetfuse columns report.xlsx --sheet Q2")]
    Columns {
        /// Files to inspect
        files: Vec<PathBuf>,

        /// Sheet name for workbooks (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge(args) => merge_cmd::cmd_merge(args),
        Commands::Columns { files, sheet } => cmd_columns(files, sheet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self { code: EXIT_SCHEMA, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn cmd_columns(files: Vec<PathBuf>, sheet: Option<String>) -> Result<(), CliError> {
    if files.is_empty() {
        return Err(CliError::usage("no input files given"));
    }
    for path in &files {
        let table = sheetfuse_io::load_table(path, sheet.as_deref()).map_err(CliError::parse)?;
        println!("{}: {}", path.display(), table.columns.join(", "));
    }
    Ok(())
}
