// Parsing and formatting helpers.
//
// Everything that has to cope with untidy CSV cells lives here so the
// loader can work with plain `Option`s.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a count cell into a non-negative integer.
///
/// - Trims whitespace.
/// - Accepts decimal digits only: signs, separators and fractions are
///   rejected rather than guessed at.
/// - Returns `None` for a missing or empty cell.
pub fn parse_count_safe(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok()
}

/// Parse a date cell.
///
/// The feed writes either `YYYY-MM-DD` or a full timestamp whose first ten
/// characters are the calendar date; only that prefix is used.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Stable string key for a calendar date (`2020-01-25`).
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thousands separators for counts shown on the console (`12,345`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_counts() {
        assert_eq!(parse_count_safe(Some("120")), Some(120));
        assert_eq!(parse_count_safe(Some(" 7 ")), Some(7));
        assert_eq!(parse_count_safe(Some("0")), Some(0));
    }

    #[test]
    fn rejects_non_numeric_counts() {
        assert_eq!(parse_count_safe(None), None);
        assert_eq!(parse_count_safe(Some("")), None);
        assert_eq!(parse_count_safe(Some("-3")), None);
        assert_eq!(parse_count_safe(Some("1.5")), None);
        assert_eq!(parse_count_safe(Some("12a")), None);
        assert_eq!(parse_count_safe(Some("1,200")), None);
    }

    #[test]
    fn parses_date_and_timestamp_prefix() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 25);
        assert_eq!(parse_date_safe(Some("2020-01-25")), expected);
        assert_eq!(parse_date_safe(Some("2020-01-25 18:03:12.123")), expected);
        assert_eq!(parse_date_safe(Some("2020-1-25")), None);
        assert_eq!(parse_date_safe(Some("yesterday")), None);
        assert_eq!(parse_date_safe(None), None);
    }

    #[test]
    fn formats_counts_with_separators() {
        assert_eq!(format_int(1234567u64), "1,234,567");
        assert_eq!(date_key(NaiveDate::from_ymd_opt(2020, 2, 3).unwrap()), "2020-02-03");
    }
}
