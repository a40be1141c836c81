//! `packlist run` / `packlist run-csv` — consolidate a packing list against
//! its code reference sheet and write the result.

use std::path::{Path, PathBuf};

use clap::Args;
use packlist_io::{workbook, ExportArtifact, ExportOptions};
use packlist_recon::model::SampleTable;
use packlist_recon::{Dataset, ReconConfig, ReconOutcome, ReconResult, SchemaMapping};

use crate::exit_codes::{EXIT_EMPTY_CONSOLIDATION, EXIT_USAGE};
use crate::CliError;

/// Unmatched lookups listed before the report is cut short.
const MAX_UNMATCHED_SHOWN: usize = 20;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (TOML); built-in defaults when omitted
    #[arg(long, env = "PACKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory or file for the consolidated sheet
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Only print errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Load the config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text).map_err(|e| {
        CliError { code: EXIT_USAGE, message: e.to_string(), hint: None }
            .with_hint("`packlist config` prints a complete default config")
    })?;
    log::info!("using config '{}' from {}", config.name, path.display());
    Ok(config)
}

pub fn cmd_run(
    workbook_path: PathBuf,
    packing_sheet: Option<String>,
    codes_sheet: Option<String>,
    args: RunArgs,
) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let sheets = workbook::load_workbook(&workbook_path).map_err(CliError::load)?;
    let selected = workbook::select_sheets(
        sheets,
        &config.sheets,
        packing_sheet.as_deref(),
        codes_sheet.as_deref(),
    )
    .map_err(|e| {
        CliError::load(e).with_hint("name the sheets with --packing-sheet / --codes-sheet")
    })?;

    if !args.quiet {
        eprintln!(
            "packing sheet: {}  code sheet: {}",
            selected.packing.name(),
            selected.codes.name()
        );
    }
    consolidate(&config, &selected.packing, &selected.codes, &args)
}

pub fn cmd_run_csv(packing: PathBuf, codes: PathBuf, args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let packing = packlist_io::csv::load_dataset(&packing).map_err(CliError::load)?;
    let codes = packlist_io::csv::load_dataset(&codes).map_err(CliError::load)?;
    consolidate(&config, &packing, &codes, &args)
}

fn consolidate(
    config: &ReconConfig,
    packing: &Dataset,
    codes: &Dataset,
    args: &RunArgs,
) -> Result<(), CliError> {
    let result = packlist_recon::reconcile(config, packing, codes).map_err(CliError::recon)?;

    if !args.quiet {
        print_report(&result);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    if result.outcome == ReconOutcome::Empty {
        if !args.quiet {
            if let Some(samples) = &result.diagnostics.samples {
                print_sample("packing list", &samples.packing);
                print_sample("code reference", &samples.codes);
            }
        }
        return Err(CliError {
            code: EXIT_EMPTY_CONSOLIDATION,
            message: "no packing row matched a code; nothing to export".into(),
            hint: Some("compare style, color and size values in the samples above".into()),
        });
    }

    let artifact = packlist_io::serialize(&result.table, &ExportOptions::from(&config.export));
    if let Some(notice) = &artifact.notice {
        eprintln!("note: {notice}");
    }

    let path = output_path(args.out.as_deref(), &artifact);
    std::fs::write(&path, &artifact.bytes)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    if !args.quiet {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

/// Where the artifact goes: the fixed file name in the working directory,
/// inside `--out` when it is a directory, or at `--out` itself. An explicit
/// file keeps the artifact's real extension.
pub fn output_path(out: Option<&Path>, artifact: &ExportArtifact) -> PathBuf {
    match out {
        None => PathBuf::from(artifact.file_name()),
        Some(dir) if dir.is_dir() => dir.join(artifact.file_name()),
        Some(file) => {
            let ext = artifact.format.extension();
            let matches = file
                .extension()
                .map(|e| e.eq_ignore_ascii_case(ext))
                .unwrap_or(false);
            if matches {
                file.to_path_buf()
            } else {
                log::warn!("output is {ext}; writing {}", file.with_extension(ext).display());
                file.with_extension(ext)
            }
        }
    }
}

// ============================================================================
// Human report (stderr)
// ============================================================================

fn describe(mapping: &SchemaMapping) -> String {
    mapping
        .iter()
        .map(|(field, column)| format!("{field}={}", column.unwrap_or("-")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(result: &ReconResult) {
    let resolved = &result.resolved;
    eprintln!("packing columns: {}", describe(&resolved.packing));
    eprintln!("code columns:    {}", describe(&resolved.codes));
    eprintln!("size columns:    {}", resolved.size_columns.join(", "));

    let diag = &result.diagnostics;
    for miss in diag.unmatched.iter().take(MAX_UNMATCHED_SHOWN) {
        eprintln!(
            "  no code for packing row {}: style {} / color {} / size {} (qty {})",
            miss.row + 1,
            miss.style,
            miss.color,
            miss.size,
            miss.quantity
        );
    }
    if diag.unmatched.len() > MAX_UNMATCHED_SHOWN {
        eprintln!("  ... and {} more", diag.unmatched.len() - MAX_UNMATCHED_SHOWN);
    }
    if diag.ambiguous_lookups > 0 {
        eprintln!(
            "  {} lookup(s) matched several codes; the first was used",
            diag.ambiguous_lookups
        );
    }

    let s = &result.summary;
    eprintln!(
        "consolidated: {} rows, {} units, {} styles, {} colors ({} unmatched, {} skipped cells)",
        s.rows,
        s.total_units,
        s.unique_styles,
        s.unique_colors,
        diag.unmatched.len(),
        diag.skipped_quantities,
    );
}

fn print_sample(label: &str, sample: &SampleTable) {
    eprintln!("{label} sample:");
    eprintln!("  {}", sample.columns.join(" | "));
    for row in &sample.rows {
        eprintln!("  {}", row.join(" | "));
    }
}
