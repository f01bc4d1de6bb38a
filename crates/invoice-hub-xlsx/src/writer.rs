//! Minimal XLSX writer
//!
//! Produces small workbooks from scratch: starter invoice templates and
//! source tables. Cells carry one of three fixed styles; anything richer is
//! expected to be authored in a spreadsheet application.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use ahash::AHashMap;
use invoice_hub_core::{CellAddress, CellRange, CellValue, Error as CoreError};

use crate::dates::datetime_to_serial;
use crate::error::{XlsxError, XlsxResult};
use crate::xml::{encode_excel_escapes, escape};

/// Fixed cell styles available to [`SheetBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStyle {
    #[default]
    Normal,
    Bold,
    /// Short date (`numFmtId` 14); applied automatically to date values
    Date,
}

impl CellStyle {
    fn xf_id(&self) -> u32 {
        match self {
            CellStyle::Normal => 0,
            CellStyle::Bold => 1,
            CellStyle::Date => 2,
        }
    }
}

/// A worksheet under construction
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    name: String,
    cells: BTreeMap<CellAddress, (CellValue, CellStyle)>,
    merges: Vec<CellRange>,
    column_widths: BTreeMap<u16, f64>,
}

impl SheetBuilder {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell with the normal style
    pub fn set<V: Into<CellValue>>(&mut self, addr: CellAddress, value: V) -> &mut Self {
        self.set_styled(addr, value, CellStyle::Normal)
    }

    /// Set a cell with an explicit style
    pub fn set_styled<V: Into<CellValue>>(
        &mut self,
        addr: CellAddress,
        value: V,
        style: CellStyle,
    ) -> &mut Self {
        let value = value.into();
        let style = match (&value, style) {
            (CellValue::Date(_), CellStyle::Normal) => CellStyle::Date,
            (_, style) => style,
        };
        self.cells.insert(addr, (value, style));
        self
    }

    /// Set a cell by A1 reference
    pub fn cell<V: Into<CellValue>>(&mut self, reference: &str, value: V) -> XlsxResult<&mut Self> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.set(addr, value))
    }

    /// Set a bold cell by A1 reference
    pub fn bold<V: Into<CellValue>>(&mut self, reference: &str, value: V) -> XlsxResult<&mut Self> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.set_styled(addr, value, CellStyle::Bold))
    }

    /// Merge a range such as `A48:N50`
    pub fn merge(&mut self, range: &str) -> XlsxResult<&mut Self> {
        let range = CellRange::parse(range)?;
        if let Some(existing) = self.merges.iter().find(|r| r.overlaps(&range)) {
            return Err(CoreError::MergedCellConflict(
                existing.to_a1_string(),
                range.to_a1_string(),
            )
            .into());
        }
        self.merges.push(range);
        Ok(self)
    }

    /// Set a column width in characters (0-based column)
    pub fn column_width(&mut self, col: u16, width: f64) -> &mut Self {
        self.column_widths.insert(col, width);
        self
    }

    /// The value set at `addr`
    pub fn get(&self, addr: CellAddress) -> Option<&CellValue> {
        self.cells.get(&addr).map(|(value, _)| value)
    }

    fn dimension(&self) -> String {
        let mut cells = self.cells.keys();
        let first = match cells.next() {
            Some(first) => *first,
            None => return "A1".to_string(),
        };
        let (mut max_row, mut min_col, mut max_col) = (first.row, first.col, first.col);
        for addr in cells {
            max_row = max_row.max(addr.row);
            min_col = min_col.min(addr.col);
            max_col = max_col.max(addr.col);
        }
        CellRange::from_indices(first.row, min_col, max_row, max_col).to_a1_string()
    }
}

/// Shared string table built while writing
#[derive(Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: AHashMap<String, usize>,
    count: usize,
}

impl SharedStrings {
    fn add(&mut self, s: &str) -> usize {
        self.count += 1;
        if let Some(i) = self.index.get(s) {
            return *i;
        }
        let i = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        i
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write sheets to a file path; the first sheet is active
    pub fn write_file<P: AsRef<Path>>(sheets: &[SheetBuilder], path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(sheets, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write sheets to a writer; the first sheet is active
    pub fn write<W: Write + Seek>(sheets: &[SheetBuilder], writer: W) -> XlsxResult<()> {
        if sheets.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "A workbook needs at least one sheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);
        let mut shared = SharedStrings::default();

        let worksheets: Vec<String> = sheets
            .iter()
            .map(|sheet| Self::worksheet_xml(sheet, &mut shared))
            .collect();

        Self::add_part(&mut zip, "[Content_Types].xml", &Self::content_types_xml(sheets.len()))?;
        Self::add_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        Self::add_part(&mut zip, "xl/workbook.xml", &Self::workbook_xml(sheets))?;
        Self::add_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &Self::workbook_rels_xml(sheets.len()),
        )?;
        Self::add_part(&mut zip, "xl/styles.xml", STYLES_XML)?;
        Self::add_part(&mut zip, "xl/sharedStrings.xml", &Self::shared_strings_xml(&shared))?;
        for (i, xml) in worksheets.iter().enumerate() {
            Self::add_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), xml)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn add_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn content_types_xml(sheet_count: usize) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        content
    }

    fn workbook_xml(sheets: &[SheetBuilder]) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="0"/>
    </bookViews>
    <sheets>"#,
        );

        for (i, sheet) in sheets.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );
        content
    }

    fn workbook_rels_xml(sheet_count: usize) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#,
            sheet_count + 1,
            sheet_count + 2
        ));
        content
    }

    fn shared_strings_xml(shared: &SharedStrings) -> String {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            shared.count,
            shared.strings.len()
        );
        for s in &shared.strings {
            content.push_str(&format!(
                r#"<si><t xml:space="preserve">{}</t></si>"#,
                escape(&encode_excel_escapes(s))
            ));
        }
        content.push_str("</sst>");
        content
    }

    fn worksheet_xml(sheet: &SheetBuilder, shared: &mut SharedStrings) -> String {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <dimension ref="{}"/>
    <sheetViews><sheetView workbookViewId="0"/></sheetViews>
    <sheetFormatPr defaultRowHeight="15"/>"#,
            sheet.dimension()
        );

        if !sheet.column_widths.is_empty() {
            content.push_str("\n    <cols>");
            for (col, width) in &sheet.column_widths {
                content.push_str(&format!(
                    r#"<col min="{}" max="{}" width="{}" customWidth="1"/>"#,
                    col + 1,
                    col + 1,
                    width
                ));
            }
            content.push_str("</cols>");
        }

        content.push_str("\n    <sheetData>");
        let mut current_row: Option<u32> = None;
        for (addr, (value, style)) in &sheet.cells {
            if current_row != Some(addr.row) {
                if current_row.is_some() {
                    content.push_str("</row>");
                }
                content.push_str(&format!("\n        <row r=\"{}\">", addr.row + 1));
                current_row = Some(addr.row);
            }
            content.push_str(&Self::cell_xml(*addr, value, *style, shared));
        }
        if current_row.is_some() {
            content.push_str("</row>");
        }
        content.push_str("\n    </sheetData>");

        if !sheet.merges.is_empty() {
            content.push_str(&format!("\n    <mergeCells count=\"{}\">", sheet.merges.len()));
            for range in &sheet.merges {
                content.push_str(&format!(r#"<mergeCell ref="{}"/>"#, range.to_a1_string()));
            }
            content.push_str("</mergeCells>");
        }

        content.push_str(
            r#"
    <pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>
</worksheet>"#,
        );
        content
    }

    fn cell_xml(
        addr: CellAddress,
        value: &CellValue,
        style: CellStyle,
        shared: &mut SharedStrings,
    ) -> String {
        let reference = addr.to_a1_string();
        let style_attr = match style.xf_id() {
            0 => String::new(),
            id => format!(" s=\"{}\"", id),
        };

        match value {
            CellValue::Empty => format!(r#"<c r="{}"{}/>"#, reference, style_attr),
            CellValue::Number(n) if !n.is_finite() => {
                format!(r#"<c r="{}"{}/>"#, reference, style_attr)
            }
            CellValue::Number(n) => {
                format!(r#"<c r="{}"{}><v>{}</v></c>"#, reference, style_attr, n)
            }
            CellValue::Boolean(b) => format!(
                r#"<c r="{}"{} t="b"><v>{}</v></c>"#,
                reference,
                style_attr,
                if *b { 1 } else { 0 }
            ),
            CellValue::Text(s) => format!(
                r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                reference,
                style_attr,
                shared.add(s)
            ),
            CellValue::Date(d) => format!(
                r#"<c r="{}"{}><v>{}</v></c>"#,
                reference,
                style_attr,
                datetime_to_serial(*d)
            ),
        }
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
        <font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="3">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
        <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    </cellXfs>
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#;
