//! Generating one invoice per source row
//!
//! # Example
//!
//! ```rust,no_run
//! use invoice_hub::{generate, FieldLayout, RunInputs, RunOptions};
//!
//! let inputs = RunInputs {
//!     source: Some("employees.xlsx".into()),
//!     template: Some("template.xlsx".into()),
//!     output_dir: Some("invoices".into()),
//! };
//! let report = generate(&inputs, FieldLayout::default(), &RunOptions::default()).unwrap();
//! println!("{}", report.summary());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use invoice_hub_core::{CellValue, Table};
use invoice_hub_csv::{CsvWriteOptions, CsvWriter, LineTerminator};
use invoice_hub_xlsx::Template;

use crate::config::{RunConfig, RunInputs, RunOptions};
use crate::error::Result;
use crate::filename::invoice_file_name;
use crate::filler::fill_invoice;
use crate::format::AmountField;
use crate::layout::FieldLayout;
use crate::row::{columns, SourceRow};
use crate::source::read_source;

/// Non-fatal problems found while filling a row
#[derive(Debug, Clone, PartialEq)]
pub enum RowWarning {
    /// The amount was given but is not a non-negative number
    AmountUnparseable { raw: String },
    /// An earlier row of this run already wrote the same file
    DuplicateOutput { path: PathBuf },
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::AmountUnparseable { raw } => {
                write!(f, "amount {:?} is not a number; amount cells left blank", raw)
            }
            RowWarning::DuplicateOutput { path } => {
                write!(f, "overwrote {} written by an earlier row", path.display())
            }
        }
    }
}

/// What happened to one source row
#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Generated(PathBuf),
    Failed(String),
}

/// Result of one source row
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// 1-based position among the source's data rows
    pub row: usize,
    pub employee: String,
    pub invoice_no: String,
    pub status: RowStatus,
    pub warnings: Vec<RowWarning>,
}

/// Per-row results of a run, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<RowOutcome>,
}

impl RunReport {
    /// Paths of the generated invoices in source order
    pub fn generated(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                RowStatus::Generated(path) => Some(path.as_path()),
                RowStatus::Failed(_) => None,
            })
            .collect()
    }

    /// Rows that could not be generated
    pub fn failed(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Failed(_)))
    }

    /// Every warning with the row it belongs to
    pub fn warnings(&self) -> impl Iterator<Item = (usize, &RowWarning)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.warnings.iter().map(move |w| (o.row, w)))
    }

    /// `"<N> invoices generated"`
    pub fn summary(&self) -> String {
        format!("{} invoices generated", self.generated().len())
    }

    /// One record per row: `row,employee,invoice_no,status,output,detail`
    pub fn manifest(&self) -> Table {
        let mut table = Table::new(["row", "employee", "invoice_no", "status", "output", "detail"]);
        for outcome in &self.outcomes {
            let (status, output, mut detail) = match &outcome.status {
                RowStatus::Generated(path) => (
                    "generated",
                    path.display().to_string(),
                    Vec::with_capacity(outcome.warnings.len()),
                ),
                RowStatus::Failed(message) => ("failed", String::new(), vec![message.clone()]),
            };
            detail.extend(outcome.warnings.iter().map(ToString::to_string));

            table.push_row(vec![
                CellValue::Number(outcome.row as f64),
                CellValue::text(outcome.employee.as_str()),
                CellValue::text(outcome.invoice_no.as_str()),
                CellValue::text(status),
                CellValue::text(output),
                CellValue::text(detail.join("; ")),
            ]);
        }
        table
    }

    /// Write the manifest as CSV
    pub fn write_manifest<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..Default::default()
        };
        CsvWriter::write_file(&self.manifest(), path, &options)?;
        Ok(())
    }
}

/// Fills a parsed template once per source row
pub struct InvoiceGenerator {
    template: Template,
    layout: FieldLayout,
    config: RunConfig,
}

impl InvoiceGenerator {
    pub fn new(template: Template, layout: FieldLayout, config: RunConfig) -> Self {
        Self {
            template,
            layout,
            config,
        }
    }

    /// Parse the template at `path` and prepare the output directory
    pub fn open<P: AsRef<Path>>(path: P, layout: FieldLayout, config: RunConfig) -> Result<Self> {
        let template = Template::open(path.as_ref())?;
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(Self::new(template, layout, config))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Generate an invoice for every row of `table`.
    ///
    /// A row that fails is recorded and the run continues, unless
    /// `fail_fast` is set, in which case its error is returned.
    pub fn generate_table(&self, table: &Table) -> Result<RunReport> {
        let mut report = RunReport::default();
        let mut written: HashSet<PathBuf> = HashSet::new();

        for row in SourceRow::iter_table(table) {
            let employee = row.get(columns::EMPLOYEE_NAME).to_string();
            let invoice_no = row.get(columns::INVOICE_NO).to_string();
            let mut warnings = Vec::new();

            let status = match self.generate_row(&row) {
                Ok((path, amount)) => {
                    if let AmountField::Unparseable(raw) = amount {
                        warnings.push(RowWarning::AmountUnparseable { raw });
                    }
                    if !written.insert(path.clone()) {
                        log::warn!("row {}: {} was overwritten", row.number(), path.display());
                        warnings.push(RowWarning::DuplicateOutput { path: path.clone() });
                    }
                    log::info!("generated {}", path.display());
                    RowStatus::Generated(path)
                }
                Err(err) if self.config.options.fail_fast => return Err(err),
                Err(err) => {
                    log::warn!("row {} ({}): {}", row.number(), employee, err);
                    RowStatus::Failed(err.to_string())
                }
            };

            report.outcomes.push(RowOutcome {
                row: row.number(),
                employee,
                invoice_no,
                status,
                warnings,
            });
        }

        Ok(report)
    }

    /// Fill and save the invoice of a single row
    pub fn generate_row(&self, row: &SourceRow<'_>) -> Result<(PathBuf, AmountField)> {
        let mut doc = self.template.instantiate();
        let amount = fill_invoice(&mut doc, row, &self.layout)?;

        let file_name = invoice_file_name(
            row.get(columns::EMPLOYEE_NAME),
            row.get(columns::INVOICE_NO),
        );
        let path = self.config.output_dir.join(file_name);
        doc.save(&path)?;
        Ok((path, amount))
    }
}

/// Generate one invoice per row of the source table.
///
/// All three inputs are checked before anything is read. The template is
/// parsed once and the output directory created before the first row.
pub fn generate(
    inputs: &RunInputs,
    layout: FieldLayout,
    options: &RunOptions,
) -> Result<RunReport> {
    let inputs = inputs.validate()?;
    let config = RunConfig::new(inputs.output_dir, options.clone());

    let generator = InvoiceGenerator::open(inputs.template, layout, config)?;
    let table = read_source(inputs.source, generator.config().options.sheet.as_deref())?;
    let report = generator.generate_table(&table)?;

    log::info!("{}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(row: usize, status: RowStatus, warnings: Vec<RowWarning>) -> RowOutcome {
        RowOutcome {
            row,
            employee: format!("Employee {}", row),
            invoice_no: format!("INV-{}", row),
            status,
            warnings,
        }
    }

    fn report() -> RunReport {
        RunReport {
            outcomes: vec![
                outcome(1, RowStatus::Generated("out/a.xlsx".into()), vec![]),
                outcome(
                    2,
                    RowStatus::Generated("out/b.xlsx".into()),
                    vec![RowWarning::AmountUnparseable { raw: "N/A".into() }],
                ),
                outcome(3, RowStatus::Failed("disk full".into()), vec![]),
            ],
        }
    }

    #[test]
    fn test_report_accessors() {
        let report = report();
        assert_eq!(
            report.generated(),
            vec![Path::new("out/a.xlsx"), Path::new("out/b.xlsx")]
        );
        assert_eq!(report.summary(), "2 invoices generated");
        assert_eq!(report.failed().map(|o| o.row).collect::<Vec<_>>(), vec![3]);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(RunReport::default().summary(), "0 invoices generated");
    }

    #[test]
    fn test_manifest() {
        let mut buf = Vec::new();
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..Default::default()
        };
        CsvWriter::write(&report().manifest(), &mut buf, &options).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "row,employee,invoice_no,status,output,detail\n\
             1,Employee 1,INV-1,generated,out/a.xlsx,\n\
             2,Employee 2,INV-2,generated,out/b.xlsx,\"amount \"\"N/A\"\" is not a number; amount cells left blank\"\n\
             3,Employee 3,INV-3,failed,,disk full\n"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = RowWarning::DuplicateOutput {
            path: "out/Invoice_A_1.xlsx".into(),
        };
        assert_eq!(
            warning.to_string(),
            "overwrote out/Invoice_A_1.xlsx written by an earlier row"
        );
    }
}
