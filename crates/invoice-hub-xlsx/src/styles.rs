//! XLSX styles (styles.xml) patching
//!
//! A template's styles are extended, never rebuilt: a format change on a
//! cell derives a new `xf` record from the cell's current one, appending a
//! font when the font changes. Existing records keep their indices, so every
//! untouched cell renders exactly as before.

use ahash::AHashMap;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use invoice_hub_core::{CellFormat, HorizontalAlignment, NumberFormat, VerticalAlignment};

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{
    attr_value, child_elements, get_attr, raw_attrs, render_attrs, set_attr,
    tag_start, Attrs, Element,
};

/// Display-relevant attributes of one `cellXfs` record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XfSummary {
    pub number_format_id: u32,
    pub bold: bool,
    pub font_size: Option<f64>,
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
}

/// A `<font>` or `<xf>` record
#[derive(Debug, Clone, PartialEq)]
struct Record {
    attrs: Attrs,
    children: Vec<Element>,
}

impl Record {
    fn to_xml(&self, name: &str) -> String {
        let attrs = render_attrs(&self.attrs);
        if self.children.is_empty() {
            format!("<{}{}/>", name, attrs)
        } else {
            let children: String = self.children.iter().map(|c| c.raw.as_str()).collect();
            format!("<{}{}>{}</{}>", name, attrs, children, name)
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn id_attr(&self, key: &str) -> u32 {
        get_attr(&self.attrs, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// A collection element (`<fonts>`, `<cellXfs>`) and where it sits in the source
#[derive(Debug, Clone)]
struct Section {
    name: &'static str,
    item_name: &'static str,
    attrs: Attrs,
    /// Span of the opening (or self-closing) tag
    open: (usize, usize),
    /// Offset of the closing tag; `None` for a self-closing element
    close: Option<usize>,
    records: Vec<Record>,
    /// Records appended since parsing
    added: usize,
    index: AHashMap<String, u32>,
}

impl Section {
    fn new(name: &'static str, item_name: &'static str, attrs: Attrs, open: (usize, usize)) -> Self {
        Self {
            name,
            item_name,
            attrs,
            open,
            close: None,
            records: Vec::new(),
            added: 0,
            index: AHashMap::new(),
        }
    }

    /// Index of an identical record, appending it if there is none
    fn intern(&mut self, record: Record) -> u32 {
        let xml = record.to_xml(self.item_name);
        if let Some(id) = self.index.get(&xml) {
            return *id;
        }
        let id = self.records.len() as u32;
        self.index.insert(xml, id);
        self.records.push(record);
        self.added += 1;
        id
    }

    fn build_index(&mut self) {
        for (i, record) in self.records.iter().enumerate() {
            self.index
                .entry(record.to_xml(self.item_name))
                .or_insert(i as u32);
        }
    }

    /// Edits that splice the appended records into the source
    fn edits(&self) -> Vec<(usize, usize, String)> {
        if self.added == 0 {
            return Vec::new();
        }

        let mut attrs = self.attrs.clone();
        set_attr(&mut attrs, "count", self.records.len().to_string());
        let open_tag = format!("<{}{}>", self.name, render_attrs(&attrs));
        let appended: String = self.records[self.records.len() - self.added..]
            .iter()
            .map(|r| r.to_xml(self.item_name))
            .collect();

        match self.close {
            Some(close) => vec![
                (self.open.0, self.open.1, open_tag),
                (close, close, appended),
            ],
            None => vec![(
                self.open.0,
                self.open.1,
                format!("{}{}</{}>", open_tag, appended, self.name),
            )],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Open {
    Fonts,
    CellXfs,
}

/// Parsed `xl/styles.xml` that can be extended and spliced back
#[derive(Debug, Clone)]
pub(crate) struct StyleSheet {
    source: String,
    num_fmts: AHashMap<u32, String>,
    fonts: Option<Section>,
    cell_xfs: Option<Section>,
}

impl StyleSheet {
    /// Parse a styles part
    pub fn parse(xml: &str) -> XlsxResult<Self> {
        let bytes = xml.as_bytes();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut num_fmts = AHashMap::new();
        let mut fonts: Option<Section> = None;
        let mut cell_xfs: Option<Section> = None;
        let mut open: Option<Open> = None;
        // Current record: (attrs, offset where its content starts)
        let mut record: Option<(Attrs, usize)> = None;
        let mut depth = 0usize;

        loop {
            let event = reader.read_event()?;
            let end = reader.buffer_position();
            match event {
                Event::Start(e) => {
                    depth += 1;
                    match (depth, e.local_name().as_ref(), open) {
                        (2, b"fonts", _) => {
                            fonts = Some(Section::new("fonts", "font", raw_attrs(&e), (tag_start(bytes, end), end)));
                            open = Some(Open::Fonts);
                        }
                        (2, b"cellXfs", _) => {
                            cell_xfs = Some(Section::new("cellXfs", "xf", raw_attrs(&e), (tag_start(bytes, end), end)));
                            open = Some(Open::CellXfs);
                        }
                        (3, b"font", Some(Open::Fonts)) | (3, b"xf", Some(Open::CellXfs)) => {
                            record = Some((raw_attrs(&e), end));
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) => match (depth + 1, e.local_name().as_ref(), open) {
                    (2, b"fonts", _) => {
                        fonts = Some(Section::new("fonts", "font", raw_attrs(&e), (tag_start(bytes, end), end)));
                    }
                    (2, b"cellXfs", _) => {
                        cell_xfs = Some(Section::new("cellXfs", "xf", raw_attrs(&e), (tag_start(bytes, end), end)));
                    }
                    (3, b"font", Some(Open::Fonts)) => push_record(&mut fonts, raw_attrs(&e), Vec::new()),
                    (3, b"xf", Some(Open::CellXfs)) => push_record(&mut cell_xfs, raw_attrs(&e), Vec::new()),
                    (3, b"numFmt", None) => {
                        let id = attr_value(&e, b"numFmtId").and_then(|v| v.parse().ok());
                        let code = attr_value(&e, b"formatCode");
                        if let (Some(id), Some(code)) = (id, code) {
                            num_fmts.insert(id, code);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => {
                    match (depth, e.local_name().as_ref(), open) {
                        (2, b"fonts", Some(Open::Fonts)) => {
                            set_close(&mut fonts, tag_start(bytes, end));
                            open = None;
                        }
                        (2, b"cellXfs", Some(Open::CellXfs)) => {
                            set_close(&mut cell_xfs, tag_start(bytes, end));
                            open = None;
                        }
                        (3, b"font", Some(Open::Fonts)) | (3, b"xf", Some(Open::CellXfs)) => {
                            if let Some((attrs, start)) = record.take() {
                                let children = child_elements(&xml[start..tag_start(bytes, end)])?;
                                let section = if open == Some(Open::Fonts) { &mut fonts } else { &mut cell_xfs };
                                push_record(section, attrs, children);
                            }
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        for section in [&mut fonts, &mut cell_xfs].into_iter().flatten() {
            section.build_index();
        }

        Ok(Self {
            source: xml.to_string(),
            num_fmts,
            fonts,
            cell_xfs,
        })
    }

    fn xf(&self, id: u32) -> Option<&Record> {
        self.cell_xfs.as_ref()?.records.get(id as usize)
    }

    fn font(&self, id: u32) -> Option<&Record> {
        self.fonts.as_ref()?.records.get(id as usize)
    }

    /// Whether cells with this style display dates
    pub fn is_date_xf(&self, id: u32) -> bool {
        let num_fmt = match self.xf(id) {
            Some(xf) => xf.id_attr("numFmtId"),
            None => return false,
        };
        match self.num_fmts.get(&num_fmt) {
            Some(code) => NumberFormat::is_date_code(code),
            None => NumberFormat::is_builtin_date(num_fmt),
        }
    }

    /// Display-relevant attributes of a style
    pub fn xf_summary(&self, id: u32) -> Option<XfSummary> {
        let xf = self.xf(id)?;
        let font = self.font(xf.id_attr("fontId"));
        let alignment = xf.child("alignment");

        let bold = font
            .and_then(|f| f.child("b"))
            .map_or(false, |b| !matches!(get_attr(&b.attrs, "val"), Some("0" | "false")));
        let font_size = font
            .and_then(|f| f.child("sz"))
            .and_then(|sz| get_attr(&sz.attrs, "val"))
            .and_then(|v| v.parse().ok());
        let align = |key: &str| {
            alignment
                .and_then(|a| get_attr(&a.attrs, key))
                .map(str::to_string)
        };

        Some(XfSummary {
            number_format_id: xf.id_attr("numFmtId"),
            bold,
            font_size,
            horizontal: align("horizontal").and_then(|h| HorizontalAlignment::from_xlsx(&h)),
            vertical: align("vertical").and_then(|v| VerticalAlignment::from_xlsx(&v)),
        })
    }

    /// Style index for `base` with `format` applied on top
    pub fn derive_xf(&mut self, base: u32, format: &CellFormat) -> XlsxResult<u32> {
        if format.is_empty() {
            return Ok(base);
        }

        let mut xf = self
            .xf(base)
            .cloned()
            .ok_or_else(|| XlsxError::Parse(format!("Style index {} out of bounds", base)))?;

        if let Some(number_format) = format.number_format {
            set_attr(&mut xf.attrs, "numFmtId", number_format.id().to_string());
            set_attr(&mut xf.attrs, "applyNumberFormat", "1");
        }

        if let Some(patch) = format.font {
            let mut font = self.font(xf.id_attr("fontId")).cloned().unwrap_or(Record {
                attrs: Attrs::new(),
                children: Vec::new(),
            });
            if patch.size.is_some() {
                font.children.retain(|c| c.name != "sz");
            }
            if patch.bold.is_some() {
                font.children.retain(|c| c.name != "b");
            }
            if let Some(size) = patch.size {
                font.children.insert(0, empty_element("sz", vec![("val".into(), size.to_string())]));
            }
            if patch.bold == Some(true) {
                font.children.insert(0, empty_element("b", Attrs::new()));
            }

            let fonts = self
                .fonts
                .as_mut()
                .ok_or_else(|| XlsxError::InvalidFormat("styles.xml has no <fonts>".into()))?;
            let font_id = fonts.intern(font);
            set_attr(&mut xf.attrs, "fontId", font_id.to_string());
            set_attr(&mut xf.attrs, "applyFont", "1");
        }

        if let Some(patch) = format.alignment {
            let mut attrs = xf.child("alignment").map(|a| a.attrs.clone()).unwrap_or_default();
            if let Some(h) = patch.horizontal {
                set_attr(&mut attrs, "horizontal", h.as_xlsx_str());
            }
            if let Some(v) = patch.vertical {
                set_attr(&mut attrs, "vertical", v.as_xlsx_str());
            }
            xf.children.retain(|c| c.name != "alignment");
            // alignment precedes protection and extLst
            xf.children.insert(0, empty_element("alignment", attrs));
            set_attr(&mut xf.attrs, "applyAlignment", "1");
        }

        let cell_xfs = self
            .cell_xfs
            .as_mut()
            .ok_or_else(|| XlsxError::InvalidFormat("styles.xml has no <cellXfs>".into()))?;
        Ok(cell_xfs.intern(xf))
    }

    /// Render the part, splicing in any appended records
    pub fn to_xml(&self) -> String {
        let mut edits: Vec<(usize, usize, String)> = [&self.fonts, &self.cell_xfs]
            .into_iter()
            .flatten()
            .flat_map(Section::edits)
            .collect();
        if edits.is_empty() {
            return self.source.clone();
        }
        edits.sort_by_key(|(start, end, _)| (*start, *end));

        let mut out = String::with_capacity(self.source.len() + 1024);
        let mut pos = 0;
        for (start, end, text) in edits {
            out.push_str(&self.source[pos..start]);
            out.push_str(&text);
            pos = end;
        }
        out.push_str(&self.source[pos..]);
        out
    }
}

fn push_record(section: &mut Option<Section>, attrs: Attrs, children: Vec<Element>) {
    if let Some(section) = section {
        section.records.push(Record { attrs, children });
    }
}

fn set_close(section: &mut Option<Section>, offset: usize) {
    if let Some(section) = section {
        section.close = Some(offset);
    }
}

fn empty_element(name: &str, attrs: Attrs) -> Element {
    Element {
        name: name.to_string(),
        raw: format!("<{}{}/>", name, render_attrs(&attrs)),
        attrs,
    }
}
