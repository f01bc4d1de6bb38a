//! Excel serial date conversion
//!
//! Notes:
//! - Excel stores dates as serial numbers (days since a base date, with the
//!   time of day as the fractional part).
//! - In the 1900 date system, Excel includes the historical "1900 leap year"
//!   bug, inserting a non-existent day 1900-02-29 as serial 60. It is read
//!   as 1900-02-28.
//! - In the 1904 date system, serial 0 is 1904-01-01.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Largest serial Excel accepts (9999-12-31)
pub const MAX_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a serial number to a date-time, rounded to the nearest second
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL + 1.0 {
        return None;
    }

    let mut days = serial.trunc() as i64;
    let mut seconds = ((serial - serial.trunc()) * SECONDS_PER_DAY).round() as i64;
    if seconds >= SECONDS_PER_DAY as i64 {
        days += 1;
        seconds = 0;
    }

    let date = if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?.checked_add_signed(Duration::days(days))?
    } else if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(days))?
    } else if days == 60 {
        NaiveDate::from_ymd_opt(1900, 2, 28)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days))?
    };

    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Convert a date-time to a 1900-system serial number
pub fn datetime_to_serial(value: NaiveDateTime) -> f64 {
    let date = value.date();
    let march_1900 = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap_or(date);
    let base = if date >= march_1900 {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    }
    .unwrap_or(date);

    let days = (date - base).num_days() as f64;
    days + value.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_serial_1900_system() {
        assert_eq!(serial_to_datetime(1.0, false), Some(ymd(1900, 1, 1)));
        assert_eq!(serial_to_datetime(59.0, false), Some(ymd(1900, 2, 28)));
        assert_eq!(serial_to_datetime(61.0, false), Some(ymd(1900, 3, 1)));
        // Excel serial 45366 = 2024-03-15
        assert_eq!(serial_to_datetime(45366.0, false), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_serial_time_of_day() {
        let value = serial_to_datetime(45366.5, false).unwrap();
        assert_eq!(value, ymd(2024, 3, 15) + Duration::hours(12));

        // Rounds up to the next midnight
        let value = serial_to_datetime(45366.999_999_9, false).unwrap();
        assert_eq!(value, ymd(2024, 3, 16));
    }

    #[test]
    fn test_serial_1904_system() {
        assert_eq!(serial_to_datetime(0.0, true), Some(ymd(1904, 1, 1)));
        assert_eq!(serial_to_datetime(43904.0, true), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert_eq!(serial_to_datetime(-1.0, false), None);
        assert_eq!(serial_to_datetime(f64::NAN, false), None);
        assert_eq!(serial_to_datetime(3_000_000.0, false), None);
    }

    #[test]
    fn test_datetime_to_serial() {
        assert_eq!(datetime_to_serial(ymd(2024, 3, 15)), 45366.0);
        assert_eq!(datetime_to_serial(ymd(1900, 1, 1)), 1.0);
        assert_eq!(datetime_to_serial(ymd(1900, 3, 1)), 61.0);
        assert_eq!(
            datetime_to_serial(ymd(2024, 3, 15) + Duration::hours(6)),
            45366.25
        );
    }
}
