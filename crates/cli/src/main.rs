// packlist CLI - consolidate packing lists against code reference sheets

mod consolidate;
mod exit_codes;
mod logging;
mod sheets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use packlist_io::LoadError;
use packlist_recon::{ReconConfig, ReconError};

use consolidate::RunArgs;
use exit_codes::{load_exit_code, recon_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "packlist")]
#[command(about = "Consolidate packing lists against UPC code references")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate a workbook holding a packing sheet and a UPC sheet
    #[command(after_help = "\
Examples:
  packlist run shipment.xlsx
  packlist run shipment.xlsx --out exports/
  packlist run shipment.xlsx --codes-sheet 'Codes 2024' --json > result.json
  packlist run shipment.xlsx --config denim.recon.toml -v")]
    Run {
        /// Workbook (.xlsx, .xls, .xlsb, .ods)
        workbook: PathBuf,

        /// Packing sheet name (default: first sheet matching the packing patterns)
        #[arg(long)]
        packing_sheet: Option<String>,

        /// Code reference sheet name (default: sheet matching the code patterns)
        #[arg(long)]
        codes_sheet: Option<String>,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Consolidate from two delimited text files
    #[command(after_help = "\
Examples:
  packlist run-csv --packing pl.csv --codes upc.csv
  packlist run-csv --packing pl.tsv --codes upc.csv --out consolidated.xlsx")]
    RunCsv {
        /// Packing list file
        #[arg(long)]
        packing: PathBuf,

        /// Code reference file
        #[arg(long)]
        codes: PathBuf,

        #[command(flatten)]
        args: RunArgs,
    },

    /// List a workbook's sheets and which ones would be used
    Sheets {
        workbook: PathBuf,

        /// Config file (TOML) with sheet name patterns
        #[arg(long, env = "PACKLIST_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default config as TOML, or validate a config file
    Config {
        /// Validate this file instead of printing defaults
        #[arg(long, value_name = "FILE")]
        check: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  packlist-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = match &cli.command {
        Commands::Run { args, .. } | Commands::RunCsv { args, .. } => args.quiet,
        _ => false,
    };
    logging::init(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Run { workbook, packing_sheet, codes_sheet, args } => {
            consolidate::cmd_run(workbook, packing_sheet, codes_sheet, args)
        }
        Commands::RunCsv { packing, codes, args } => consolidate::cmd_run_csv(packing, codes, args),
        Commands::Sheets { workbook, config, json } => sheets::cmd_sheets(workbook, config, json),
        Commands::Config { check } => cmd_config(check),
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
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Engine error with its registry exit code and a pointer at the fix.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::SchemaMismatch { .. } => Some(
                "rename the header or add it as a candidate under [packing] / [codes] in the config",
            ),
            ReconError::NoSizeColumnsFound { .. } => {
                Some("add the size headers to size_tokens in the config")
            }
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("`packlist config` prints a complete default config")
            }
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(String::from),
        }
    }

    pub fn load(err: LoadError) -> Self {
        match err {
            LoadError::Recon(inner) => Self::recon(inner),
            other => Self { code: load_exit_code(&other), message: other.to_string(), hint: None },
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(check: Option<PathBuf>) -> Result<(), CliError> {
    match check {
        Some(path) => {
            let config = consolidate::load_config(Some(&path))?;
            println!(
                "ok: '{}' ({} size tokens)",
                config.name,
                config.size_tokens.len()
            );
        }
        None => {
            let text = ReconConfig::default().to_toml().map_err(|e| CliError {
                code: EXIT_USAGE,
                message: e.to_string(),
                hint: None,
            })?;
            print!("{text}");
        }
    }
    Ok(())
}
