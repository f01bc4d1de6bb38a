//! Invoice templates: load once, fill one copy per source row
//!
//! A [`Template`] parses the workbook's active sheet, its styles and its
//! merged regions a single time. Each [`TemplateDocument`] it hands out is an
//! independent copy; writing to one never affects the template or any other
//! document.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use invoice_hub_core::{CellAddress, CellFormat, CellValue, MergeMap};

use crate::error::{XlsxError, XlsxResult};
use crate::package::{XlsxPackage, STYLES};
use crate::reader::decode_cell;
use crate::shared_strings::read_shared_strings;
use crate::sheet::SheetXml;
use crate::styles::{StyleSheet, XfSummary};

/// A parsed template workbook
#[derive(Clone)]
pub struct Template {
    package: XlsxPackage,
    sheet_name: String,
    sheet_path: String,
    sheet: SheetXml,
    styles: Option<StyleSheet>,
    shared_strings: Arc<Vec<String>>,
    merges: Arc<MergeMap>,
    date_1904: bool,
}

impl Template {
    /// Load a template from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::from_package(XlsxPackage::read_file(path)?)
    }

    /// Load a template from in-memory bytes
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::from_package(XlsxPackage::from_bytes(bytes)?)
    }

    /// Prepare a template from an already-read package.
    ///
    /// The active sheet is the one filled. Fails if the sheet, its styles or
    /// its merged regions cannot be parsed.
    pub fn from_package(package: XlsxPackage) -> XlsxResult<Self> {
        let info = package.workbook_info()?;
        let entry = info
            .active_sheet()
            .cloned()
            .ok_or_else(|| XlsxError::InvalidFormat("Workbook has no worksheets".into()))?;

        let sheet = SheetXml::parse(package.part_str(&entry.path)?)?;
        let merges = MergeMap::new(sheet.merges())?;
        let styles = match package.part(STYLES) {
            Some(_) => Some(StyleSheet::parse(package.part_str(STYLES)?)?),
            None => None,
        };
        let shared_strings = read_shared_strings(&package)?;

        log::debug!(
            "loaded template sheet '{}' ({} merged regions)",
            entry.name,
            merges.len()
        );

        Ok(Self {
            package,
            sheet_name: entry.name,
            sheet_path: entry.path,
            sheet,
            styles,
            shared_strings: Arc::new(shared_strings),
            merges: Arc::new(merges),
            date_1904: info.date_1904,
        })
    }

    /// Name of the sheet that gets filled
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Merged regions of the filled sheet
    pub fn merges(&self) -> &MergeMap {
        &self.merges
    }

    /// A fresh, independent copy to fill
    pub fn instantiate(&self) -> TemplateDocument {
        TemplateDocument {
            template: self.clone(),
            values_written: false,
            formulas_replaced: false,
        }
    }
}

/// One filled copy of a template
pub struct TemplateDocument {
    template: Template,
    values_written: bool,
    formulas_replaced: bool,
}

impl TemplateDocument {
    /// Load a template file and instantiate it once
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Ok(Template::open(path)?.instantiate())
    }

    /// Name of the filled sheet
    pub fn sheet_name(&self) -> &str {
        self.template.sheet_name()
    }

    /// Merged regions of the filled sheet
    pub fn merges(&self) -> &MergeMap {
        self.template.merges()
    }

    /// The cell that receives writes aimed at `addr`
    pub fn resolve(&self, addr: CellAddress) -> CellAddress {
        self.template.merges.resolve(addr)
    }

    /// Write a value, redirecting to the anchor if `addr` lies in a merged
    /// region. The cell's style is kept. Returns the cell actually written.
    pub fn write<V: Into<CellValue>>(&mut self, addr: CellAddress, value: V) -> CellAddress {
        let target = self.resolve(addr);
        if target != addr {
            log::debug!("{} is merged; writing to anchor {}", addr, target);
        }
        self.values_written = true;
        if self.template.sheet.set_value(target, &value.into()) {
            self.formulas_replaced = true;
        }
        target
    }

    /// Apply format changes on top of the cell's current style
    pub fn apply_format(&mut self, addr: CellAddress, format: &CellFormat) -> XlsxResult<CellAddress> {
        let target = self.resolve(addr);
        if format.is_empty() {
            return Ok(target);
        }

        let styles = self
            .template
            .styles
            .as_mut()
            .ok_or_else(|| XlsxError::MissingPart(STYLES.to_string()))?;
        let base = self.template.sheet.style_of(target);
        let xf = styles.derive_xf(base, format)?;
        self.template.sheet.set_style(target, xf);
        Ok(target)
    }

    /// Value stored at exactly `addr`, with date-formatted numbers as dates
    pub fn value(&self, addr: CellAddress) -> XlsxResult<CellValue> {
        let t = &self.template;
        match t.sheet.cell(addr) {
            Some(cell) => decode_cell(cell, &t.shared_strings, t.styles.as_ref(), t.date_1904),
            None => Ok(CellValue::Empty),
        }
    }

    /// Display attributes of the style shown at `addr`
    pub fn format_summary(&self, addr: CellAddress) -> Option<XfSummary> {
        let t = &self.template;
        t.styles.as_ref()?.xf_summary(t.sheet.style_of(addr))
    }

    /// Serialize the filled workbook
    pub fn write_to<W: Write + Seek>(self, writer: W) -> XlsxResult<()> {
        self.into_package()?.write(writer)
    }

    /// Save the filled workbook to a file path
    pub fn save<P: AsRef<Path>>(self, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.into_package()?.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn into_package(self) -> XlsxResult<XlsxPackage> {
        let Template {
            mut package,
            sheet_path,
            sheet,
            styles,
            ..
        } = self.template;

        package.set_part(&sheet_path, sheet.to_xml().into_bytes());
        if let Some(styles) = styles {
            package.set_part(STYLES, styles.to_xml().into_bytes());
        }
        if self.formulas_replaced {
            package.remove_calc_chain()?;
        }
        // Formulas reading the written cells still cache the template's results
        if self.values_written && sheet.has_formulas() {
            package.request_full_calculation()?;
        }
        Ok(package)
    }
}
