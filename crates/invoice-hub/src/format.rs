//! Display values derived from raw source fields

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use invoice_hub_core::CellValue;
use invoice_hub_xlsx::dates::{serial_to_datetime, MAX_SERIAL};

/// `05 Mar-24`
pub const INVOICE_DATE_FORMAT: &str = "%d %b-%y";

/// Amounts at or above this are rejected
const MAX_AMOUNT: f64 = 1e13;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Month-first is tried before day-first for ambiguous slash and dash dates
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%b-%y",
    "%d %b-%y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
];

/// Parse a date written as text in one of the common forms
pub fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Format an invoice date as `DD Mon-YY`.
///
/// Empty gives an empty string; text that is not a recognizable date and
/// any other non-date value fall back to their display form. Never fails.
pub fn format_date(value: &CellValue) -> String {
    let date = match value {
        CellValue::Empty => return String::new(),
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Number(n) if (1.0..=MAX_SERIAL).contains(n) => serial_to_datetime(*n, false),
        _ => None,
    };

    match date {
        Some(d) => d.format(INVOICE_DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// `"<prefix><value>"` using the value's display form
pub fn label(prefix: &str, value: &CellValue) -> String {
    format!("{}{}", prefix, value)
}

/// `"Invoice No : <trimmed invoice number>"`
pub fn invoice_no_label(value: &CellValue) -> String {
    format!("Invoice No : {}", value.to_string().trim())
}

/// A non-negative amount held as a whole number of paise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    paise: u64,
}

impl Amount {
    /// Amount from a number; `None` if negative, non-finite or too large
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value >= MAX_AMOUNT {
            return None;
        }
        Some(Self {
            paise: (value * 100.0).round() as u64,
        })
    }

    /// Amount from whole rupees and paise
    pub fn from_parts(rupees: u64, paise: u8) -> Self {
        Self {
            paise: rupees * 100 + u64::from(paise.min(99)),
        }
    }

    /// Parse decimal text such as `1500.50`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let numeric = !s.is_empty()
            && s.bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
        if !numeric {
            return None;
        }
        s.parse::<f64>().ok().and_then(Self::from_f64)
    }

    /// Whole rupees
    pub fn rupees(&self) -> u64 {
        self.paise / 100
    }

    /// Paise part, always in `0..=99`
    pub fn paise(&self) -> u8 {
        (self.paise % 100) as u8
    }

    /// The amount as a number of rupees
    pub fn value(&self) -> f64 {
        self.paise as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    /// Thousands separators and two decimals, as in `#,##0.00`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.rupees().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "{}.{:02}", grouped, self.paise())
    }
}

/// Classification of the raw in-hand amount
#[derive(Debug, Clone, PartialEq)]
pub enum AmountField {
    /// Empty or blank
    Absent,
    /// A usable amount
    Present(Amount),
    /// Given but not a non-negative decimal; holds the raw display form
    Unparseable(String),
}

impl AmountField {
    /// Classify a raw source value
    pub fn classify(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => AmountField::Absent,
            CellValue::Text(s) if s.trim().is_empty() => AmountField::Absent,
            CellValue::Text(s) => match Amount::parse(s) {
                Some(amount) => AmountField::Present(amount),
                None => AmountField::Unparseable(s.clone()),
            },
            CellValue::Number(n) => match Amount::from_f64(*n) {
                Some(amount) => AmountField::Present(amount),
                None => AmountField::Unparseable(value.to_string()),
            },
            other => AmountField::Unparseable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::from(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_format_date_values() {
        assert_eq!(format_date(&date(2024, 3, 5)), "05 Mar-24");
        assert_eq!(format_date(&CellValue::Empty), "");
        // Excel serial for 2024-03-15
        assert_eq!(format_date(&CellValue::Number(45366.0)), "15 Mar-24");
        assert_eq!(format_date(&CellValue::Boolean(true)), "TRUE");
        assert_eq!(format_date(&CellValue::Number(-4.0)), "-4");
    }

    #[test]
    fn test_format_date_text() {
        assert_eq!(format_date(&CellValue::text("2024-03-05")), "05 Mar-24");
        assert_eq!(format_date(&CellValue::text("2024-03-05 10:30:00")), "05 Mar-24");
        assert_eq!(format_date(&CellValue::text("03/05/2024")), "05 Mar-24");
        assert_eq!(format_date(&CellValue::text("15/03/2024")), "15 Mar-24");
        assert_eq!(format_date(&CellValue::text("5-Mar-2024")), "05 Mar-24");
        assert_eq!(format_date(&CellValue::text("March 5, 2024")), "05 Mar-24");
        assert_eq!(format_date(&CellValue::text("05.03.2024")), "05 Mar-24");
    }

    #[test]
    fn test_malformed_date_is_verbatim() {
        assert_eq!(format_date(&CellValue::text("next Tuesday")), "next Tuesday");
        assert_eq!(format_date(&CellValue::text("31/31/2024")), "31/31/2024");
    }

    #[test]
    fn test_labels() {
        assert_eq!(label("Name : ", &CellValue::text("Asha")), "Name : Asha");
        assert_eq!(label("PAN : ", &CellValue::Empty), "PAN : ");
        assert_eq!(label("State : ", &CellValue::Number(27.0)), "State : 27");
        assert_eq!(
            invoice_no_label(&CellValue::text("  INV-7 ")),
            "Invoice No : INV-7"
        );
        assert_eq!(invoice_no_label(&CellValue::Number(101.0)), "Invoice No : 101");
    }

    #[test]
    fn test_amount_parts() {
        let amount = Amount::from_f64(1500.5).unwrap();
        assert_eq!((amount.rupees(), amount.paise()), (1500, 50));

        // 0.1 + 0.2 style noise rounds instead of truncating
        let amount = Amount::from_f64(19.99).unwrap();
        assert_eq!((amount.rupees(), amount.paise()), (19, 99));
        // Halves round away from zero
        let amount = Amount::from_f64(0.125).unwrap();
        assert_eq!(amount.paise(), 13);

        // Rounding can carry into the rupees
        let amount = Amount::from_f64(2.999).unwrap();
        assert_eq!((amount.rupees(), amount.paise()), (3, 0));

        assert_eq!(Amount::from_parts(7, 5).value(), 7.05);
        assert!(Amount::from_f64(-1.0).is_none());
        assert!(Amount::from_f64(f64::NAN).is_none());
        assert!(Amount::from_f64(1e13).is_none());
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_f64(1500.5).unwrap().to_string(), "1,500.50");
        assert_eq!(Amount::from_f64(0.0).unwrap().to_string(), "0.00");
        assert_eq!(Amount::from_f64(999.0).unwrap().to_string(), "999.00");
        assert_eq!(Amount::from_f64(1234567.891).unwrap().to_string(), "1,234,567.89");
    }

    #[test]
    fn test_classify_amounts() {
        assert_eq!(AmountField::classify(&CellValue::Empty), AmountField::Absent);
        assert_eq!(AmountField::classify(&CellValue::text("  ")), AmountField::Absent);
        assert_eq!(
            AmountField::classify(&CellValue::Number(1500.0)),
            AmountField::Present(Amount::from_parts(1500, 0))
        );
        assert_eq!(
            AmountField::classify(&CellValue::text(" 1500.50 ")),
            AmountField::Present(Amount::from_parts(1500, 50))
        );
        assert_eq!(
            AmountField::classify(&CellValue::text("1,500")),
            AmountField::Unparseable("1,500".into())
        );
        assert_eq!(
            AmountField::classify(&CellValue::text("N/A")),
            AmountField::Unparseable("N/A".into())
        );
        assert_eq!(
            AmountField::classify(&CellValue::Number(-5.0)),
            AmountField::Unparseable("-5".into())
        );
        assert!(matches!(
            AmountField::classify(&CellValue::Boolean(true)),
            AmountField::Unparseable(_)
        ));
    }
}
