//! Run inputs and options

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The three paths a run needs; any may be missing at the boundary
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub source: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Inputs after every required path was checked to be present
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInputs<'a> {
    pub source: &'a Path,
    pub template: &'a Path,
    pub output_dir: &'a Path,
}

impl RunInputs {
    /// Check that all inputs are given.
    ///
    /// Fails with one [`Error::MissingInputs`] naming every absent input.
    pub fn validate(&self) -> Result<ValidatedInputs<'_>> {
        let source = given(&self.source);
        let template = given(&self.template);
        let output_dir = given(&self.output_dir);

        match (source, template, output_dir) {
            (Some(source), Some(template), Some(output_dir)) => Ok(ValidatedInputs {
                source,
                template,
                output_dir,
            }),
            _ => {
                let missing = [
                    ("source", source.is_none()),
                    ("template", template.is_none()),
                    ("output directory", output_dir.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect();
                Err(Error::MissingInputs(missing))
            }
        }
    }
}

/// An empty path counts as not given
fn given(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

/// How a run treats failures and which source sheet it reads
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Abort on the first failed row instead of recording it and continuing
    pub fail_fast: bool,
    /// Source worksheet; the first one when `None`
    pub sheet: Option<String>,
}

impl RunOptions {
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_sheet<S: Into<String>>(mut self, sheet: Option<S>) -> Self {
        self.sheet = sheet.map(Into::into);
        self
    }
}

/// Everything an [`InvoiceGenerator`](crate::InvoiceGenerator) needs besides the template
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory receiving the generated invoices
    pub output_dir: PathBuf,
    pub options: RunOptions,
}

impl RunConfig {
    pub fn new<P: Into<PathBuf>>(output_dir: P, options: RunOptions) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_missing_inputs_are_named() {
        let err = RunInputs::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required inputs: source, template, output directory"
        );

        let inputs = RunInputs {
            source: Some("employees.xlsx".into()),
            ..Default::default()
        };
        assert!(matches!(
            inputs.validate(),
            Err(Error::MissingInputs(names)) if names == vec!["template", "output directory"]
        ));
    }

    #[test]
    fn test_complete_inputs() {
        let inputs = RunInputs {
            source: Some("employees.csv".into()),
            template: Some("template.xlsx".into()),
            output_dir: Some("out".into()),
        };
        let valid = inputs.validate().unwrap();
        assert_eq!(valid.output_dir, Path::new("out"));
    }

    #[test]
    fn test_empty_paths_are_missing() {
        let inputs = RunInputs {
            source: Some("employees.csv".into()),
            template: Some("template.xlsx".into()),
            output_dir: Some(PathBuf::new()),
        };
        assert!(matches!(
            inputs.validate(),
            Err(Error::MissingInputs(names)) if names == vec!["output directory"]
        ));

        let inputs = RunInputs {
            source: Some("".into()),
            template: None,
            output_dir: Some("out".into()),
        };
        assert_eq!(
            inputs.validate().unwrap_err().to_string(),
            "missing required inputs: source, template"
        );
    }

    #[test]
    fn test_options_builders() {
        let options = RunOptions::default()
            .with_fail_fast(true)
            .with_sheet(Some("March"));
        assert!(options.fail_fast);
        assert_eq!(options.sheet.as_deref(), Some("March"));

        let config = RunConfig::new("out", RunOptions::default());
        assert!(!config.options.fail_fast);
        assert!(config.options.sheet.is_none());
    }
}
