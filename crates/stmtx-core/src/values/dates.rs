//! Date parsing for statement tokens.

use chrono::NaiveDate;

use super::patterns::DATE_DMY;

/// Parse a `dd.mm.yyyy` (or `d.m.yy`) date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_DMY.captures(s.trim())?;

    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("14.01.2021"),
            Some(NaiveDate::from_ymd_opt(2021, 1, 14).unwrap())
        );
        assert_eq!(
            parse_date("3.3.2022"),
            Some(NaiveDate::from_ymd_opt(2022, 3, 3).unwrap())
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(
            parse_date("29.12.17"),
            Some(NaiveDate::from_ymd_opt(2017, 12, 29).unwrap())
        );
        assert_eq!(
            parse_date("01.01.99"),
            Some(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(parse_date("31.02.2021"), None);
        assert_eq!(parse_date("2021-01-14"), None);
        assert_eq!(parse_date("14.01.2021 12:00"), None);
    }
}
