//! invoice-hub CLI - generate invoice workbooks from a source table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invoice_hub::{
    generate, read_source, words_for_text, write_sample_template, FieldLayout, RowStatus,
    RunInputs, RunOptions, RunReport, SourceFormat,
};
use invoice_hub_xlsx::XlsxTableReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "invoice-hub")]
#[command(
    author,
    version,
    about = "Fill an invoice template once per row of a spreadsheet"
)]
struct Cli {
    /// Log every cell write and style change
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one invoice per source row
    Generate {
        /// Source table (xlsx, xlsm, csv)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Invoice template workbook
        #[arg(long)]
        template: Option<PathBuf>,

        /// Directory receiving the invoices
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file overriding field addresses
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Source worksheet (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Write a CSV manifest of every row
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Stop at the first row that cannot be generated
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the column names detected in a source table
    Columns {
        /// Source table (xlsx, xlsm, csv)
        source: PathBuf,

        /// Source worksheet (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List the worksheets of a source workbook
    Sheets {
        /// Source workbook
        source: PathBuf,
    },

    /// Write a starter template matching the default layout
    SampleTemplate {
        /// Output path
        path: PathBuf,
    },

    /// Print an amount in words
    Words {
        /// Amount such as 1500.50
        amount: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            source,
            template,
            output,
            layout,
            sheet,
            manifest,
            fail_fast,
        } => {
            let inputs = RunInputs {
                source,
                template,
                output_dir: output,
            };
            let options = RunOptions::default()
                .with_fail_fast(fail_fast)
                .with_sheet(sheet);
            run_generate(&inputs, layout.as_deref(), &options, manifest.as_deref())
        }
        Commands::Columns { source, sheet } => list_columns(&source, sheet.as_deref()),
        Commands::Sheets { source } => list_sheets(&source),
        Commands::SampleTemplate { path } => write_sample_template(&path)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        Commands::Words { amount } => {
            println!("{}", words_for_text(&amount)?);
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over the default level; records from `log` are bridged
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(
    inputs: &RunInputs,
    layout: Option<&Path>,
    options: &RunOptions,
    manifest: Option<&Path>,
) -> Result<()> {
    // Report missing inputs before touching the layout file
    inputs.validate()?;

    let layout = match layout {
        Some(path) => FieldLayout::from_json_file(path)?,
        None => FieldLayout::default(),
    };

    let report = generate(inputs, layout, options).context("Invoice generation failed")?;

    if let Some(path) = manifest {
        report
            .write_manifest(path)
            .with_context(|| format!("Failed to write manifest '{}'", path.display()))?;
        tracing::info!("wrote manifest to {}", path.display());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("{}", report.summary());
    for path in report.generated() {
        println!("{}", path.display());
    }

    for (row, warning) in report.warnings() {
        eprintln!("Warning: row {}: {}", row, warning);
    }
    for outcome in report.failed() {
        if let RowStatus::Failed(message) = &outcome.status {
            eprintln!(
                "Failed: row {} ({}): {}",
                outcome.row, outcome.employee, message
            );
        }
    }
}

fn list_columns(source: &Path, sheet: Option<&str>) -> Result<()> {
    let table = read_source(source, sheet)
        .with_context(|| format!("Failed to read '{}'", source.display()))?;

    println!("Columns detected:");
    for header in table.headers() {
        println!("  {}", header);
    }
    Ok(())
}

fn list_sheets(source: &Path) -> Result<()> {
    if SourceFormat::from_path(source)? != SourceFormat::Xlsx {
        anyhow::bail!("'{}' is not a workbook", source.display());
    }
    let names = XlsxTableReader::sheet_names(source)
        .with_context(|| format!("Failed to open '{}'", source.display()))?;

    for (i, name) in names.iter().enumerate() {
        println!("{}\t{}", i, name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "invoice-hub",
            "generate",
            "--source",
            "employees.xlsx",
            "--template",
            "template.xlsx",
            "-o",
            "out",
            "--fail-fast",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                source,
                output,
                layout,
                fail_fast,
                ..
            } => {
                assert_eq!(source, Some(PathBuf::from("employees.xlsx")));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(layout.is_none());
                assert!(fail_fast);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_missing_inputs_are_reported() {
        let options = RunOptions::default();
        let err = run_generate(&RunInputs::default(), None, &options, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required inputs: source, template, output directory"
        );
    }
}
