//! Tabular source data: one header row and any number of data rows

use crate::cell::CellValue;

/// A header row plus data rows read from a source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table from raw header cells.
    ///
    /// Header names are trimmed; empty headers are named `Unnamed: <index>`.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| match h.as_ref().trim() {
                "" => format!("Unnamed: {}", i),
                name => name.to_string(),
            })
            .collect();

        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    ///
    /// Rows in which every value is blank are dropped. Short rows are padded
    /// with [`CellValue::Empty`]; cells beyond the last header are discarded.
    pub fn push_row(&mut self, mut values: Vec<CellValue>) -> bool {
        if values.iter().all(CellValue::is_blank) {
            return false;
        }
        values.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(values);
        true
    }

    /// Column names in source order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in source order
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows as (header, value) pairs
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &CellValue)>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_headers_trimmed_and_named() {
        let table = Table::new(["EMPLOYEE NAME ", "", " IN HAND"]);
        assert_eq!(table.headers(), &["EMPLOYEE NAME", "Unnamed: 1", "IN HAND"]);
        assert_eq!(table.column_index("IN HAND"), Some(2));
        assert_eq!(table.column_index("in hand"), None);
    }

    #[test]
    fn test_rows_padded_and_blank_rows_skipped() {
        let mut table = Table::new(["A", "B", "C"]);
        assert!(table.push_row(vec![CellValue::text("x")]));
        assert!(!table.push_row(vec![CellValue::Empty, CellValue::text("  ")]));
        assert!(table.push_row(vec![
            CellValue::Number(1.0),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::text("extra"),
        ]));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0],
            vec![CellValue::text("x"), CellValue::Empty, CellValue::Empty]
        );
        assert_eq!(table.rows()[1].len(), 3);
    }

    #[test]
    fn test_records() {
        let mut table = Table::new(["PAN", "State"]);
        table.push_row(vec![CellValue::text("ABCDE1234F"), CellValue::text("MH")]);

        let records: Vec<_> = table.records().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][1], ("State", &CellValue::text("MH")));
    }
}
