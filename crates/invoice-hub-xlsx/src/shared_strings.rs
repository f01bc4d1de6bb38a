//! Shared string table (`xl/sharedStrings.xml`)

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::package::{XlsxPackage, SHARED_STRINGS};
use crate::xml::decode_excel_escapes;

/// Read the shared strings table; a package without one has no strings
pub(crate) fn read_shared_strings(package: &XlsxPackage) -> XlsxResult<Vec<String>> {
    if package.part(SHARED_STRINGS).is_none() {
        return Ok(Vec::new());
    }
    parse_shared_strings(package.part_str(SHARED_STRINGS)?)
}

pub(crate) fn parse_shared_strings(xml: &str) -> XlsxResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    // Phonetic runs carry their own <t> elements that are not part of the value
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(decode_excel_escapes(&current));
                    current.clear();
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Text(e) if in_t => {
                current.push_str(&e.unescape()?);
            }
            Event::CData(e) if in_t => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_and_rich_text() {
        let xml = r#"<sst count="3" uniqueCount="3">
            <si><t>Name</t></si>
            <si><r><rPr><b/></rPr><t xml:space="preserve">Bold </t></r><r><t>tail</t></r></si>
            <si/>
        </sst>"#;

        assert_eq!(
            parse_shared_strings(xml).unwrap(),
            vec!["Name".to_string(), "Bold tail".to_string(), String::new()]
        );
    }

    #[test]
    fn test_phonetic_runs_skipped_and_escapes_decoded() {
        let xml = r#"<sst><si><t>A &amp; B_x000a_C</t><rPh sb="0" eb="1"><t>ei</t></rPh></si></sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), vec!["A & B\nC".to_string()]);
    }
}
