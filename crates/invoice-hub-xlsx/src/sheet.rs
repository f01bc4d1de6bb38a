//! Worksheet part model used for in-place patching
//!
//! Only `<sheetData>` is modelled. Everything before it (sheet properties,
//! views, column widths) and after it (merges, page setup, drawings) is kept
//! as the original text and written back unchanged.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use invoice_hub_core::{CellAddress, CellRange, CellValue};

use crate::dates::datetime_to_serial;
use crate::error::{XlsxError, XlsxResult};
use crate::xml::{
    decode_excel_escapes, encode_excel_escapes, escape, get_attr, raw_attrs, remove_attr,
    render_attrs, set_attr, tag_start, Attrs,
};

/// One `<c>` element: attributes other than `r`, and its raw inner XML
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellXml {
    attrs: Attrs,
    inner: String,
}

/// One `<row>` element: attributes other than `r`, and its cells by column
#[derive(Debug, Clone, Default, PartialEq)]
struct RowXml {
    attrs: Attrs,
    cells: BTreeMap<u16, CellXml>,
}

/// A `<col>` range carrying a default style
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnStyle {
    first: u16,
    last: u16,
    style: u32,
}

/// A parsed worksheet part
#[derive(Debug, Clone)]
pub(crate) struct SheetXml {
    prefix: String,
    sheet_data_attrs: Attrs,
    suffix: String,
    rows: BTreeMap<u32, RowXml>,
    columns: Vec<ColumnStyle>,
    merges: Vec<CellRange>,
}

impl SheetXml {
    /// Parse a worksheet part
    pub fn parse(xml: &str) -> XlsxResult<Self> {
        let bytes = xml.as_bytes();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut prefix: Option<String> = None;
        let mut suffix: Option<String> = None;
        let mut sheet_data_attrs = Attrs::new();
        let mut rows: BTreeMap<u32, RowXml> = BTreeMap::new();
        let mut columns = Vec::new();
        let mut merges = Vec::new();

        let mut in_sheet_data = false;
        // Rows and cells may omit `r`; they then follow the previous one
        let mut next_row = 0u32;
        let mut current_row: Option<u32> = None;
        let mut next_col = 0u16;
        // Open cell: (column, attrs, offset where its content starts)
        let mut open_cell: Option<(u16, Attrs, usize)> = None;

        loop {
            let event = reader.read_event()?;
            let end = reader.buffer_position();
            match event {
                Event::Start(e) | Event::Empty(e) if !in_sheet_data => {
                    let is_empty = bytes.get(end.saturating_sub(2)) == Some(&b'/');
                    match e.local_name().as_ref() {
                        b"sheetData" => {
                            prefix = Some(xml[..tag_start(bytes, end)].to_string());
                            sheet_data_attrs = raw_attrs(&e);
                            if is_empty {
                                suffix = Some(xml[end..].to_string());
                            } else {
                                in_sheet_data = true;
                            }
                        }
                        b"col" => {
                            let attrs = raw_attrs(&e);
                            let number = |key: &str| get_attr(&attrs, key).and_then(|v| v.parse::<u16>().ok());
                            let style = get_attr(&attrs, "style").and_then(|v| v.parse::<u32>().ok());
                            if let (Some(first), Some(last), Some(style)) =
                                (number("min"), number("max"), style)
                            {
                                columns.push(ColumnStyle {
                                    first: first.saturating_sub(1),
                                    last: last.saturating_sub(1),
                                    style,
                                });
                            }
                        }
                        b"mergeCell" => {
                            if let Some(range) = get_attr(&raw_attrs(&e), "ref") {
                                merges.push(CellRange::parse(range)?);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Start(e) | Event::Empty(e) => {
                    let is_empty = bytes.get(end.saturating_sub(2)) == Some(&b'/');
                    match e.local_name().as_ref() {
                        b"row" => {
                            let mut attrs = raw_attrs(&e);
                            let row = match get_attr(&attrs, "r") {
                                Some(r) => r
                                    .parse::<u32>()
                                    .ok()
                                    .filter(|r| *r > 0)
                                    .map(|r| r - 1)
                                    .ok_or_else(|| {
                                        XlsxError::Parse(format!("Invalid row number '{}'", r))
                                    })?,
                                None => next_row,
                            };
                            remove_attr(&mut attrs, "r");
                            rows.insert(
                                row,
                                RowXml {
                                    attrs,
                                    cells: BTreeMap::new(),
                                },
                            );
                            next_row = row + 1;
                            next_col = 0;
                            current_row = if is_empty { None } else { Some(row) };
                        }
                        b"c" if open_cell.is_none() => {
                            let row = current_row.ok_or_else(|| {
                                XlsxError::Parse("Cell outside of a row".into())
                            })?;
                            let mut attrs = raw_attrs(&e);
                            let col = match get_attr(&attrs, "r") {
                                Some(r) => {
                                    let addr = CellAddress::parse(r).map_err(|err| {
                                        XlsxError::Parse(format!(
                                            "Invalid cell reference '{}': {}",
                                            r, err
                                        ))
                                    })?;
                                    if addr.row != row {
                                        return Err(XlsxError::Parse(format!(
                                            "Cell {} listed under row {}",
                                            r,
                                            row + 1
                                        )));
                                    }
                                    addr.col
                                }
                                None => next_col,
                            };
                            remove_attr(&mut attrs, "r");
                            next_col = col.saturating_add(1);

                            if is_empty {
                                insert_cell(&mut rows, row, col, CellXml { attrs, inner: String::new() });
                            } else {
                                open_cell = Some((col, attrs, end));
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(e) if in_sheet_data => match e.local_name().as_ref() {
                    b"c" => {
                        if let (Some(row), Some((col, attrs, start))) = (current_row, open_cell.take())
                        {
                            let inner = xml[start..tag_start(bytes, end)].to_string();
                            insert_cell(&mut rows, row, col, CellXml { attrs, inner });
                        }
                    }
                    b"row" => current_row = None,
                    b"sheetData" => {
                        in_sheet_data = false;
                        suffix = Some(xml[end..].to_string());
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        match (prefix, suffix) {
            (Some(prefix), Some(suffix)) => Ok(Self {
                prefix,
                sheet_data_attrs,
                suffix,
                rows,
                columns,
                merges,
            }),
            _ => Err(XlsxError::InvalidFormat(
                "Worksheet has no <sheetData> element".into(),
            )),
        }
    }

    /// Merged ranges declared by the sheet
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The cell at `addr`, if the sheet has one
    pub fn cell(&self, addr: CellAddress) -> Option<&CellXml> {
        self.rows.get(&addr.row)?.cells.get(&addr.col)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellXml)> + '_ {
        self.rows.iter().flat_map(|(row, r)| {
            r.cells
                .iter()
                .map(move |(col, cell)| (CellAddress::new(*row, *col), cell))
        })
    }

    /// Style index shown at `addr`: the cell's own, else its row's, else its column's
    pub fn style_of(&self, addr: CellAddress) -> u32 {
        let row = self.rows.get(&addr.row);
        if let Some(style) = row.and_then(|r| r.cells.get(&addr.col)).and_then(CellXml::style) {
            return style;
        }
        self.inherited_style(addr).unwrap_or(0)
    }

    fn inherited_style(&self, addr: CellAddress) -> Option<u32> {
        let row_style = self.rows.get(&addr.row).and_then(|r| {
            let custom = matches!(get_attr(&r.attrs, "customFormat"), Some("1" | "true"));
            get_attr(&r.attrs, "s")
                .filter(|_| custom)
                .and_then(|s| s.parse().ok())
        });
        row_style.or_else(|| {
            self.columns
                .iter()
                .find(|c| c.first <= addr.col && addr.col <= c.last)
                .map(|c| c.style)
        })
    }

    /// The cell at `addr`, created with the inherited style if missing
    fn cell_mut(&mut self, addr: CellAddress) -> &mut CellXml {
        let inherited = self.inherited_style(addr);
        let row = self.rows.entry(addr.row).or_default();
        if !row.cells.contains_key(&addr.col) {
            // Cached spans would no longer cover the row
            remove_attr(&mut row.attrs, "spans");
        }
        row.cells.entry(addr.col).or_insert_with(|| {
            let mut cell = CellXml::default();
            if let Some(style) = inherited.filter(|s| *s != 0) {
                set_attr(&mut cell.attrs, "s", style.to_string());
            }
            cell
        })
    }

    /// Whether any cell holds a formula
    pub fn has_formulas(&self) -> bool {
        self.cells().any(|(_, cell)| cell.has_formula())
    }

    /// Replace the value at `addr`, keeping its style.
    ///
    /// Returns true when a formula was overwritten. Overwriting the master
    /// of a shared formula also drops the formula from the cells sharing
    /// it; they keep their last computed values.
    pub fn set_value(&mut self, addr: CellAddress, value: &CellValue) -> bool {
        let shared_master = self
            .cell(addr)
            .and_then(CellXml::shared_formula)
            .filter(|(_, master)| *master)
            .map(|(si, _)| si);

        let cell = self.cell_mut(addr);
        let had_formula = cell.has_formula();

        for key in ["t", "cm", "vm"] {
            remove_attr(&mut cell.attrs, key);
        }

        cell.inner = match value {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if !n.is_finite() => String::new(),
            CellValue::Number(n) => format!("<v>{}</v>", n),
            CellValue::Boolean(b) => {
                set_attr(&mut cell.attrs, "t", "b");
                format!("<v>{}</v>", if *b { 1 } else { 0 })
            }
            CellValue::Text(s) => {
                set_attr(&mut cell.attrs, "t", "inlineStr");
                format!(
                    "<is><t xml:space=\"preserve\">{}</t></is>",
                    escape(&encode_excel_escapes(s))
                )
            }
            CellValue::Date(d) => format!("<v>{}</v>", datetime_to_serial(*d)),
        };

        if let Some(si) = shared_master {
            let detached = self.detach_shared_formula(&si);
            if detached > 0 {
                log::warn!(
                    "{} held shared formula {}; {} dependent cells now keep their last values",
                    addr,
                    si,
                    detached
                );
            }
        }

        had_formula
    }

    /// Remove the formula from every cell in shared group `si`
    fn detach_shared_formula(&mut self, si: &str) -> usize {
        let mut detached = 0;
        for r in self.rows.values_mut() {
            for cell in r.cells.values_mut() {
                if !cell.shared_formula().map_or(false, |(group, _)| group == si) {
                    continue;
                }
                if let Some((span, _)) = cell.formula_element() {
                    cell.inner.replace_range(span, "");
                    detached += 1;
                }
            }
        }
        detached
    }

    /// Set the style index of the cell at `addr`
    pub fn set_style(&mut self, addr: CellAddress, style: u32) {
        let cell = self.cell_mut(addr);
        if style == 0 {
            remove_attr(&mut cell.attrs, "s");
        } else {
            set_attr(&mut cell.attrs, "s", style.to_string());
        }
    }

    /// Render the part back to XML
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.prefix.len() + self.suffix.len() + 4096);
        out.push_str(&self.prefix);

        if self.rows.is_empty() {
            out.push_str(&format!("<sheetData{}/>", render_attrs(&self.sheet_data_attrs)));
        } else {
            out.push_str(&format!("<sheetData{}>", render_attrs(&self.sheet_data_attrs)));
            for (row, r) in &self.rows {
                let attrs = render_attrs(&r.attrs);
                if r.cells.is_empty() {
                    out.push_str(&format!("<row r=\"{}\"{}/>", row + 1, attrs));
                    continue;
                }
                out.push_str(&format!("<row r=\"{}\"{}>", row + 1, attrs));
                for (col, cell) in &r.cells {
                    let reference = CellAddress::new(*row, *col).to_a1_string();
                    let attrs = render_attrs(&cell.attrs);
                    if cell.inner.is_empty() {
                        out.push_str(&format!("<c r=\"{}\"{}/>", reference, attrs));
                    } else {
                        out.push_str(&format!("<c r=\"{}\"{}>{}</c>", reference, attrs, cell.inner));
                    }
                }
                out.push_str("</row>");
            }
            out.push_str("</sheetData>");
        }

        out.push_str(&self.suffix);
        out
    }
}

fn insert_cell(rows: &mut BTreeMap<u32, RowXml>, row: u32, col: u16, cell: CellXml) {
    rows.entry(row).or_default().cells.insert(col, cell);
}

impl CellXml {
    /// Style index, if the cell has one
    pub fn style(&self) -> Option<u32> {
        get_attr(&self.attrs, "s").and_then(|s| s.parse().ok())
    }

    fn has_formula(&self) -> bool {
        self.inner.contains("<f>") || self.inner.contains("<f ") || self.inner.contains("<f/>")
    }

    /// Byte span of the `<f>` element inside the cell, with its attributes
    fn formula_element(&self) -> Option<(Range<usize>, Attrs)> {
        let bytes = self.inner.as_bytes();
        let mut reader = Reader::from_str(&self.inner);
        let mut open = None;

        loop {
            let event = reader.read_event().ok()?;
            let end = reader.buffer_position();
            match event {
                Event::Empty(e) if e.local_name().as_ref() == b"f" => {
                    return Some((tag_start(bytes, end)..end, raw_attrs(&e)));
                }
                Event::Start(e) if e.local_name().as_ref() == b"f" => {
                    open = Some((tag_start(bytes, end), raw_attrs(&e)));
                }
                Event::End(e) if e.local_name().as_ref() == b"f" => {
                    let (start, attrs) = open?;
                    return Some((start..end, attrs));
                }
                Event::Eof => return None,
                _ => {}
            }
        }
    }

    /// Group index of a shared formula, and whether this cell is its master
    fn shared_formula(&self) -> Option<(String, bool)> {
        let (_, attrs) = self.formula_element()?;
        if get_attr(&attrs, "t") != Some("shared") {
            return None;
        }
        let si = get_attr(&attrs, "si")?.to_string();
        Some((si, get_attr(&attrs, "ref").is_some()))
    }

    /// Decode the stored value.
    ///
    /// Formula cells yield their cached result. Numbers are returned as
    /// numbers even when styled as dates; callers that know the style decide.
    pub fn value(&self, shared_strings: &[String]) -> XlsxResult<CellValue> {
        if self.inner.is_empty() {
            return Ok(CellValue::Empty);
        }

        let mut reader = Reader::from_str(&self.inner);
        reader.trim_text(false);

        let mut raw: Option<String> = None;
        let mut inline = String::new();
        let mut in_v = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"v" => {
                        in_v = true;
                        raw.get_or_insert_with(String::new);
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" => in_v = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Event::Text(e) if in_v => {
                    raw.get_or_insert_with(String::new).push_str(&e.unescape()?);
                }
                Event::Text(e) if in_inline_text => inline.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
        }

        let cell_type = get_attr(&self.attrs, "t");
        if cell_type == Some("inlineStr") {
            return Ok(CellValue::Text(decode_excel_escapes(&inline)));
        }

        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(CellValue::Empty),
        };

        let value = match cell_type {
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::Text(s.clone())
            }
            Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),
            Some("str") | Some("e") => CellValue::Text(decode_excel_escapes(&raw)),
            Some("d") => parse_iso_date(&raw)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Text(raw)),
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::Text(raw),
            },
            Some(_) => CellValue::Text(raw),
        };

        Ok(value)
    }
}

/// Parse the ISO 8601 form used by `t="d"` cells
fn parse_iso_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEET: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<dimension ref="A1:C3"/><cols><col min="3" max="3" width="12" style="5" customWidth="1"/></cols>"#,
        r#"<sheetData>"#,
        r#"<row r="1" spans="1:2"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="2"/></row>"#,
        r#"<row r="3" s="4" customFormat="1"><c r="A3"><f>SUM(1,2)</f><v>3</v></c></row>"#,
        r#"</sheetData>"#,
        r#"<mergeCells count="1"><mergeCell ref="A5:D6"/></mergeCells>"#,
        r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
        r#"</worksheet>"#,
    );

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_render_unchanged() {
        let sheet = SheetXml::parse(SHEET).unwrap();
        let rendered = sheet.to_xml();

        assert!(rendered.starts_with(&SHEET[..SHEET.find("<sheetData>").unwrap()]));
        assert!(rendered.ends_with(&SHEET[SHEET.find("</sheetData>").unwrap() + 12..]));
        assert!(rendered.contains(r#"<c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="2"/>"#));
        assert_eq!(sheet.merges(), &[CellRange::parse("A5:D6").unwrap()]);
    }

    #[test]
    fn test_values() {
        let sheet = SheetXml::parse(SHEET).unwrap();
        let shared = vec!["Name : ".to_string()];

        let a1 = sheet.cell(addr("A1")).unwrap();
        assert_eq!(a1.value(&shared).unwrap(), CellValue::text("Name : "));
        assert_eq!(a1.style(), Some(1));
        assert_eq!(sheet.cell(addr("B1")).unwrap().value(&shared).unwrap(), CellValue::Empty);
        assert_eq!(sheet.cell(addr("A3")).unwrap().value(&shared).unwrap(), CellValue::Number(3.0));
    }

    #[test]
    fn test_set_value_keeps_style() {
        let mut sheet = SheetXml::parse(SHEET).unwrap();

        assert!(!sheet.set_value(addr("A1"), &CellValue::text("Name : A & B")));
        let rendered = sheet.to_xml();
        assert!(rendered.contains(
            r#"<c r="A1" s="1" t="inlineStr"><is><t xml:space="preserve">Name : A &amp; B</t></is></c>"#
        ));

        sheet.set_value(addr("B1"), &CellValue::Number(1500.5));
        assert!(sheet.to_xml().contains(r#"<c r="B1" s="2"><v>1500.5</v></c>"#));

        sheet.set_value(addr("B1"), &CellValue::Empty);
        assert!(sheet.to_xml().contains(r#"<c r="B1" s="2"/>"#));
    }

    #[test]
    fn test_overwriting_formula_is_reported() {
        let mut sheet = SheetXml::parse(SHEET).unwrap();
        assert!(sheet.set_value(addr("A3"), &CellValue::Number(7.0)));
        assert!(!sheet.to_xml().contains("SUM"));
    }

    #[test]
    fn test_overwriting_shared_formula_master_detaches_group() {
        let xml = concat!(
            r#"<worksheet><sheetData><row r="1">"#,
            r#"<c r="A1"><f t="shared" ref="A1:A3" si="0">B1*2</f><v>2</v></c>"#,
            r#"<c r="B1"><f t="shared" ref="B1:B2" si="1">C1</f><v>0</v></c></row>"#,
            r#"<row r="2"><c r="A2"><f t="shared" si="0"/><v>4</v></c><c r="B2"><f t="shared" si="1"/><v>0</v></c></row>"#,
            r#"<row r="3"><c r="A3"><f t="shared" si="0"/><v>6</v></c></row>"#,
            r#"</sheetData></worksheet>"#,
        );
        let mut sheet = SheetXml::parse(xml).unwrap();

        assert!(sheet.set_value(addr("A1"), &CellValue::Number(9.0)));
        let rendered = sheet.to_xml();
        assert!(rendered.contains(r#"<c r="A1"><v>9</v></c>"#));
        assert!(rendered.contains(r#"<c r="A2"><v>4</v></c>"#));
        assert!(rendered.contains(r#"<c r="A3"><v>6</v></c>"#));
        // Other groups are untouched
        assert!(rendered.contains(r#"<c r="B2"><f t="shared" si="1"/><v>0</v></c>"#));
        assert!(sheet.has_formulas());

        // Overwriting a dependent leaves its master alone
        assert!(sheet.set_value(addr("B2"), &CellValue::Number(1.0)));
        assert!(sheet.to_xml().contains(r#"<f t="shared" ref="B1:B2" si="1">C1</f>"#));
    }

    #[test]
    fn test_new_cells_inherit_row_and_column_styles() {
        let mut sheet = SheetXml::parse(SHEET).unwrap();

        sheet.set_value(addr("B3"), &CellValue::Boolean(true));
        sheet.set_value(addr("C10"), &CellValue::text("x"));
        sheet.set_value(addr("A2"), &CellValue::Number(1.0));

        assert_eq!(sheet.style_of(addr("B3")), 4);
        assert_eq!(sheet.style_of(addr("C10")), 5);
        assert_eq!(sheet.style_of(addr("A2")), 0);

        let rendered = sheet.to_xml();
        assert!(rendered.contains(r#"<c r="B3" s="4" t="b"><v>1</v></c>"#));
        assert!(rendered.contains(r#"<row r="2"><c r="A2"><v>1</v></c></row>"#));
    }

    #[test]
    fn test_adding_cell_drops_spans() {
        let mut sheet = SheetXml::parse(SHEET).unwrap();
        sheet.set_value(addr("H1"), &CellValue::text("Code"));
        let rendered = sheet.to_xml();
        assert!(rendered.contains(r#"<row r="1">"#));
        assert!(rendered.contains(r#"<c r="H1" t="inlineStr">"#));
    }

    #[test]
    fn test_empty_sheet_data() {
        let xml = r#"<worksheet><sheetData/><pageMargins left="0.7"/></worksheet>"#;
        let mut sheet = SheetXml::parse(xml).unwrap();
        assert_eq!(sheet.to_xml(), xml);

        sheet.set_value(addr("A1"), &CellValue::Number(2.0));
        assert_eq!(
            sheet.to_xml(),
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>2</v></c></row></sheetData><pageMargins left="0.7"/></worksheet>"#
        );
    }

    #[test]
    fn test_rows_and_cells_without_references() {
        let xml = r#"<worksheet><sheetData><row><c><v>1</v></c><c><v>2</v></c></row><row><c t="inlineStr"><is><t>x</t></is></c></row></sheetData></worksheet>"#;
        let sheet = SheetXml::parse(xml).unwrap();
        assert_eq!(sheet.cell(addr("B1")).unwrap().value(&[]).unwrap(), CellValue::Number(2.0));
        assert_eq!(sheet.cell(addr("A2")).unwrap().value(&[]).unwrap(), CellValue::text("x"));
    }

    #[test]
    fn test_missing_sheet_data_is_rejected() {
        assert!(matches!(
            SheetXml::parse("<worksheet/>"),
            Err(XlsxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_iso_date_cells() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="d"><v>2024-03-15T00:00:00Z</v></c></row></sheetData></worksheet>"#;
        let sheet = SheetXml::parse(xml).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(sheet.cell(addr("A1")).unwrap().value(&[]).unwrap(), CellValue::Date(expected));
    }
}
