//! `sheetfuse merge` — load, normalize, reconcile, write.

use std::path::PathBuf;

use clap::Args;

use sheetfuse_merge::plan::DEFAULT_CONFLICT_COLUMN;
use sheetfuse_merge::{reconcile, Batch, MergePlan};

use crate::exit_codes::{EXIT_CONFLICTS, EXIT_ERROR};
use crate::normalize;
use crate::profile::MergeProfile;
use crate::CliError;

#[derive(Args)]
pub struct MergeArgs {
    /// Input files (.csv, .tsv, .xlsx, .xls, .ods)
    #[arg(long = "files", short = 'i', num_args = 1.., value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Key column; repeat for a compound key
    #[arg(long = "key", short = 'k', value_name = "COL")]
    pub keys: Vec<String>,

    /// Column checked for conflicting values within a group
    #[arg(long, short = 's', value_name = "COL")]
    pub special: Option<String>,

    /// Output file (extension selects the format; omit for a summary only)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Name of the appended provenance-conflict column
    #[arg(long, value_name = "NAME")]
    pub conflict_column: Option<String>,

    /// Canonicalize these columns to YYYY-MM-DD before merging
    #[arg(long = "normalize-dates", value_name = "COL")]
    pub normalize_dates: Vec<String>,

    /// Strip control characters and collapse whitespace in these columns
    #[arg(long = "clean", value_name = "COL")]
    pub clean: Vec<String>,

    /// Sheet name for workbooks (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Load files/keys/options from a TOML profile (flags override)
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Exit non-zero when any group has conflicting special values
    #[arg(long)]
    pub fail_on_conflict: bool,

    /// Print the merge report as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress stderr summaries
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Flags merged over the profile (flags win).
struct Settings {
    files: Vec<PathBuf>,
    keys: Vec<String>,
    special: Option<String>,
    output: Option<PathBuf>,
    conflict_column: String,
    normalize_dates: Vec<String>,
    clean: Vec<String>,
    sheet: Option<String>,
}

fn resolve_settings(args: &MergeArgs) -> Result<Settings, CliError> {
    let profile = match &args.profile {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            MergeProfile::from_toml(&text).map_err(CliError::usage)?
        }
        None => MergeProfile::default(),
    };

    let files = if args.files.is_empty() {
        profile.files.iter().map(PathBuf::from).collect()
    } else {
        args.files.clone()
    };
    let keys = if args.keys.is_empty() {
        profile.key_columns.clone()
    } else {
        args.keys.clone()
    };

    if files.is_empty() {
        return Err(CliError::usage("no input files to process")
            .with_hint("pass --files, or a --profile that lists them"));
    }
    if keys.is_empty() {
        return Err(CliError::usage("no key columns given")
            .with_hint("pass --key, or a --profile with key_columns"));
    }

    Ok(Settings {
        files,
        keys,
        special: args.special.clone().or(profile.special_column),
        output: args
            .output
            .clone()
            .or(profile.output.map(PathBuf::from)),
        conflict_column: args
            .conflict_column
            .clone()
            .or(profile.conflict_column)
            .unwrap_or_else(|| DEFAULT_CONFLICT_COLUMN.to_string()),
        normalize_dates: if args.normalize_dates.is_empty() {
            profile.normalize_dates
        } else {
            args.normalize_dates.clone()
        },
        clean: if args.clean.is_empty() {
            profile.clean
        } else {
            args.clean.clone()
        },
        sheet: args.sheet.clone().or(profile.sheet),
    })
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let settings = resolve_settings(&args)?;

    let mut batches: Vec<Batch> = Vec::with_capacity(settings.files.len());
    for path in &settings.files {
        let mut batch = sheetfuse_io::load_batch(path, settings.sheet.as_deref())
            .map_err(CliError::parse)?;
        if !args.quiet {
            eprintln!("read {} rows from {}", batch.table.rows.len(), batch.source);
        }
        normalize::apply(&mut batch.table, &settings.normalize_dates, &settings.clean);
        batches.push(batch);
    }

    let mut plan = MergePlan::new(settings.keys).with_conflict_column(settings.conflict_column);
    if let Some(special) = settings.special {
        plan = plan.with_special(special);
    }

    let outcome = reconcile(&plan, &batches).map_err(|e| {
        CliError::schema(e.to_string())
            .with_hint("run `sheetfuse columns <files>` to see the available columns")
    })?;

    if let Some(path) = &settings.output {
        sheetfuse_io::write_table(&outcome.table, path).map_err(CliError::io)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&outcome).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    }

    if !args.quiet {
        let s = &outcome.summary;
        eprintln!(
            "merged {} rows from {} file(s) into {} group(s), {} conflict(s)",
            s.input_rows, s.input_batches, s.groups, s.conflicts,
        );
    }

    if args.fail_on_conflict && outcome.summary.conflicts > 0 {
        return Err(CliError {
            code: EXIT_CONFLICTS,
            message: format!(
                "{} group(s) carry conflicting '{}' values",
                outcome.summary.conflicts,
                plan.special_column.as_deref().unwrap_or_default(),
            ),
            hint: None,
        });
    }

    Ok(())
}
