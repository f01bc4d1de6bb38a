//! Small helpers over quick-xml for splicing package parts.
//!
//! Parts are patched in place: only the elements being changed are
//! re-rendered and every other byte is copied from the original. Attribute
//! values are therefore kept in their raw (still escaped) form.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;

/// Attributes as `(key, raw escaped value)` pairs, in document order
pub(crate) type Attrs = Vec<(String, String)>;

/// Collect the attributes of a start tag without unescaping them
pub(crate) fn raw_attrs(e: &BytesStart<'_>) -> Attrs {
    e.attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect()
}

/// Unescaped value of one attribute
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

pub(crate) fn get_attr<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Replace an attribute's value, appending it if absent
pub(crate) fn set_attr(attrs: &mut Attrs, key: &str, raw_value: impl Into<String>) {
    let raw_value = raw_value.into();
    match attrs.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = raw_value,
        None => attrs.push((key.to_string(), raw_value)),
    }
}

pub(crate) fn remove_attr(attrs: &mut Attrs, key: &str) {
    attrs.retain(|(k, _)| k != key);
}

pub(crate) fn render_attrs(attrs: &Attrs) -> String {
    let mut out = String::new();
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out
}

/// Escape text or an attribute value for XML output
pub(crate) fn escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Offset of the `<` that opened the tag ending at `end`.
///
/// quick-xml reports positions after an event; depending on whether text
/// preceded the tag, the `<` may or may not have been consumed already, so
/// the tag start is found by scanning back. Tags never contain a literal `<`.
pub(crate) fn tag_start(xml: &[u8], end: usize) -> usize {
    xml[..end].iter().rposition(|&b| b == b'<').unwrap_or(0)
}

/// A top-level element of an XML fragment, with its raw source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Attrs,
    pub raw: String,
}

/// Split a fragment (e.g. the inside of `<font>`) into its top-level elements
pub(crate) fn child_elements(fragment: &str) -> XlsxResult<Vec<Element>> {
    let bytes = fragment.as_bytes();
    let mut reader = Reader::from_str(fragment);
    let mut children = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<(String, Attrs, usize)> = None;

    loop {
        let event = reader.read_event()?;
        let end = reader.buffer_position();
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    open = Some((local_name(&e), raw_attrs(&e), tag_start(bytes, end)));
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some((name, attrs, start)) = open.take() {
                        children.push(Element {
                            name,
                            attrs,
                            raw: fragment[start..end].to_string(),
                        });
                    }
                }
            }
            Event::Empty(e) if depth == 0 => {
                children.push(Element {
                    name: local_name(&e),
                    attrs: raw_attrs(&e),
                    raw: fragment[tag_start(bytes, end)..end].to_string(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(children)
}

pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Drop every empty element named `name` for which `matches` returns true
pub(crate) fn remove_empty_elements<F>(xml: &str, name: &[u8], matches: F) -> XlsxResult<String>
where
    F: Fn(&Attrs) -> bool,
{
    let bytes = xml.as_bytes();
    let mut reader = Reader::from_str(xml);
    let mut cuts = Vec::new();

    loop {
        let event = reader.read_event()?;
        let end = reader.buffer_position();
        match event {
            Event::Empty(e) if e.local_name().as_ref() == name && matches(&raw_attrs(&e)) => {
                cuts.push((tag_start(bytes, end), end));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    for (start, end) in cuts {
        out.push_str(&xml[pos..start]);
        pos = end;
    }
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode characters XML cannot carry:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(idx) = rest.find("_x") {
        result.push_str(&rest[..idx]);
        let candidate = &rest[idx..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Encode characters XML 1.0 cannot carry as Excel `_xHHHH_` sequences
pub(crate) fn encode_excel_escapes(s: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| c.is_control() && !matches!(c, '\t' | '\n' | '\r');
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if needs_escape(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("Line1_x000a_Line2"), "Line1\nLine2");
        assert_eq!(decode_excel_escapes("a_x005f_b"), "a_b");
        assert_eq!(decode_excel_escapes("_x_y"), "_x_y");
        assert_eq!(decode_excel_escapes("x_00ZZ_"), "x_00ZZ_");
        assert_eq!(decode_excel_escapes("plain"), "plain");
    }

    #[test]
    fn test_encode_excel_escapes() {
        assert_eq!(encode_excel_escapes("a\u{1}b"), "a_x0001_b");
        assert_eq!(encode_excel_escapes("tab\tline\n"), "tab\tline\n");
        assert_eq!(decode_excel_escapes(&encode_excel_escapes("x\u{7}")), "x\u{7}");
    }

    #[test]
    fn test_child_elements() {
        let children =
            child_elements(r#"<sz val="11"/><color theme="1"/><name val="Calibri"/>"#).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sz", "color", "name"]);
        assert_eq!(children[0].raw, r#"<sz val="11"/>"#);
        assert_eq!(get_attr(&children[2].attrs, "val"), Some("Calibri"));

        let nested = child_elements(r#"<alignment wrapText="1"/><extLst><ext uri="x"/></extLst>"#)
            .unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[1].raw, r#"<extLst><ext uri="x"/></extLst>"#);
    }

    #[test]
    fn test_remove_empty_elements() {
        let xml = r#"<Types><Override PartName="/a.xml"/><Override PartName="/b.xml"/></Types>"#;
        let out = remove_empty_elements(xml, b"Override", |attrs| {
            get_attr(attrs, "PartName") == Some("/a.xml")
        })
        .unwrap();
        assert_eq!(out, r#"<Types><Override PartName="/b.xml"/></Types>"#);
    }

    #[test]
    fn test_attr_editing() {
        let mut attrs: Attrs = vec![("t".into(), "s".into()), ("ht".into(), "15".into())];
        set_attr(&mut attrs, "ht", "20");
        set_attr(&mut attrs, "customHeight", "1");
        remove_attr(&mut attrs, "t");
        assert_eq!(render_attrs(&attrs), r#" ht="20" customHeight="1""#);
    }
}
