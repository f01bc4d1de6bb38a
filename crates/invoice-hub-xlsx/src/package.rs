//! OOXML package access: the zip container and workbook-level metadata

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{
    attr_value, get_attr, raw_attrs, remove_empty_elements, render_attrs, set_attr, tag_start,
};

pub(crate) const CONTENT_TYPES: &str = "[Content_Types].xml";
pub(crate) const WORKBOOK: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const STYLES: &str = "xl/styles.xml";
pub(crate) const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const CALC_CHAIN: &str = "xl/calcChain.xml";

/// `workbook` children that come after `calcPr` in schema order
const AFTER_CALC_PR: &[&[u8]] = &[
    b"oleSize",
    b"customWorkbookViews",
    b"pivotCaches",
    b"smartTagPr",
    b"smartTagTypes",
    b"webPublishing",
    b"fileRecoveryPr",
    b"webPublishObjects",
    b"extLst",
];

/// A worksheet listed in `xl/workbook.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Display name
    pub name: String,
    /// Part path inside the package (e.g. `xl/worksheets/sheet1.xml`)
    pub path: String,
}

/// Workbook-level information needed to locate and interpret sheets
#[derive(Debug, Clone, Default)]
pub struct WorkbookInfo {
    /// Worksheets in tab order
    pub sheets: Vec<SheetEntry>,
    /// Index of the sheet shown when the file is opened
    pub active_tab: usize,
    /// Whether the workbook uses the 1904 date system
    pub date_1904: bool,
}

impl WorkbookInfo {
    /// The sheet shown when the file is opened
    pub fn active_sheet(&self) -> Option<&SheetEntry> {
        self.sheets
            .get(self.active_tab)
            .or_else(|| self.sheets.first())
    }

    /// Look up a sheet by display name
    pub fn sheet_by_name(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[derive(Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// All parts of an XLSX file held in memory, in archive order
#[derive(Clone)]
pub struct XlsxPackage {
    parts: Vec<Part>,
}

impl XlsxPackage {
    /// Read a package from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a package from in-memory bytes
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a package from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part { name, data });
        }

        let package = Self { parts };

        // Verify this is an XLSX file
        if package.part(CONTENT_TYPES).is_none() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        Ok(package)
    }

    /// Raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// A part decoded as UTF-8 XML
    pub fn part_str(&self, name: &str) -> XlsxResult<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))?;
        std::str::from_utf8(data)
            .map_err(|e| XlsxError::Parse(format!("{} is not valid UTF-8: {}", name, e)))
    }

    /// Replace a part's contents, adding the part if it does not exist
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Remove a part; returns whether it existed
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.name != name);
        self.parts.len() != before
    }

    /// Names of all parts, in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Write the package as a zip archive
    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        for part in &self.parts {
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Read sheet names, their part paths, the active tab and the date system
    pub fn workbook_info(&self) -> XlsxResult<WorkbookInfo> {
        let rels = self.workbook_rels()?;
        let mut reader = Reader::from_str(self.part_str(WORKBOOK)?);
        let mut info = WorkbookInfo::default();

        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let name = attr_value(&e, b"name");
                        let r_id = attr_value(&e, b"r:id");
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            match rels.iter().find(|(id, _, _)| *id == r_id) {
                                Some((_, _, path)) => info.sheets.push(SheetEntry {
                                    name,
                                    path: path.clone(),
                                }),
                                None => log::warn!("sheet '{}' has no relationship {}", name, r_id),
                            }
                        }
                    }
                    b"workbookView" => {
                        if let Some(tab) = attr_value(&e, b"activeTab").and_then(|v| v.parse().ok())
                        {
                            info.active_tab = tab;
                        }
                    }
                    b"workbookPr" => {
                        info.date_1904 = attr_value(&e, b"date1904")
                            .map_or(false, |v| v == "1" || v == "true");
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(info)
    }

    /// Relationships of `xl/workbook.xml` as `(id, type, resolved path)`
    fn workbook_rels(&self) -> XlsxResult<Vec<(String, String, String)>> {
        let mut reader = Reader::from_str(self.part_str(WORKBOOK_RELS)?);
        let mut rels = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let id = attr_value(&e, b"Id");
                    let rel_type = attr_value(&e, b"Type");
                    let target = attr_value(&e, b"Target");
                    if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                        rels.push((id, rel_type, resolve_target(&target)));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(rels)
    }

    /// Drop the calculation chain so spreadsheet applications rebuild it.
    ///
    /// Needed once a formula cell has been overwritten with a value; a stale
    /// chain pointing at it makes Excel report the file as damaged.
    pub fn remove_calc_chain(&mut self) -> XlsxResult<bool> {
        if !self.remove_part(CALC_CHAIN) {
            return Ok(false);
        }

        let content_types = remove_empty_elements(self.part_str(CONTENT_TYPES)?, b"Override", |attrs| {
            get_attr(attrs, "PartName") == Some("/xl/calcChain.xml")
        })?;
        self.set_part(CONTENT_TYPES, content_types.into_bytes());

        if self.part(WORKBOOK_RELS).is_some() {
            let rels = remove_empty_elements(self.part_str(WORKBOOK_RELS)?, b"Relationship", |attrs| {
                get_attr(attrs, "Type").map_or(false, |t| t.ends_with("/calcChain"))
            })?;
            self.set_part(WORKBOOK_RELS, rels.into_bytes());
        }

        log::debug!("removed stale calculation chain");
        Ok(true)
    }

    /// Ask spreadsheet applications to recalculate every formula on open.
    ///
    /// Cached results of formulas that read a written cell are stale until
    /// then. Sets `fullCalcOnLoad="1"` on `<calcPr>`, adding the element
    /// when the workbook has none.
    pub fn request_full_calculation(&mut self) -> XlsxResult<()> {
        let patched = set_full_calc_on_load(self.part_str(WORKBOOK)?)?;
        self.set_part(WORKBOOK, patched.into_bytes());
        Ok(())
    }
}

fn set_full_calc_on_load(xml: &str) -> XlsxResult<String> {
    let bytes = xml.as_bytes();
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut insert_at = None;

    loop {
        let event = reader.read_event()?;
        let end = reader.buffer_position();
        let (e, empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && insert_at.is_none() {
                    insert_at = Some(tag_start(bytes, end));
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if depth == 0 {
            if let Some(p) = e.name().prefix() {
                prefix = format!("{}:", String::from_utf8_lossy(p.as_ref()));
            }
        } else if depth == 1 {
            let name = e.local_name();
            if name.as_ref() == b"calcPr" {
                let mut attrs = raw_attrs(&e);
                set_attr(&mut attrs, "fullCalcOnLoad", "1");
                let tag = format!(
                    "<{}{}{}>",
                    String::from_utf8_lossy(e.name().as_ref()),
                    render_attrs(&attrs),
                    if empty { "/" } else { "" }
                );
                let start = tag_start(bytes, end);
                return Ok(format!("{}{}{}", &xml[..start], tag, &xml[end..]));
            }
            if insert_at.is_none() && AFTER_CALC_PR.iter().any(|n| *n == name.as_ref()) {
                insert_at = Some(tag_start(bytes, end));
            }
        }

        if !empty {
            depth += 1;
        }
    }

    let at = insert_at
        .ok_or_else(|| XlsxError::InvalidFormat(format!("{} has no workbook element", WORKBOOK)))?;
    Ok(format!(
        "{}<{}calcPr fullCalcOnLoad=\"1\"/>{}",
        &xml[..at],
        prefix,
        &xml[at..]
    ))
}

/// Resolve a relationship target relative to the `xl/` folder
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
