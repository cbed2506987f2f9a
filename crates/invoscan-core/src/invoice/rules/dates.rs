//! Numeric dates: the shape check used by payment rules, and calendar parsing.

use chrono::NaiveDate;

const SEPARATORS: [char; 3] = ['/', '-', '.'];

/// Whether `s` is one or more digit groups separated by `/`, `-` or `.`.
///
/// Purely syntactic: `2024` and `2024-13-45` both pass.
pub fn is_date_like(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty()
        && s.split(SEPARATORS)
            .all(|group| !group.is_empty() && group.chars().all(|c| c.is_ascii_digit()))
}

/// Parse a numeric date such as `01/15/2024`, `15-01-24` or `2024-01-15`.
///
/// A four-digit first part means year-month-day. Otherwise month-day-year
/// is tried before day-month-year.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(SEPARATORS).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let nums: Vec<u32> = parts.iter().map(|p| p.parse().ok()).collect::<Option<_>>()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }

    let year = parse_year(parts[2], nums[2])?;
    NaiveDate::from_ymd_opt(year, nums[0], nums[1])
        .or_else(|| NaiveDate::from_ymd_opt(year, nums[1], nums[0]))
}

fn parse_year(raw: &str, year: u32) -> Option<i32> {
    match raw.len() {
        // Two-digit year: 00-50 is the 2000s, 51-99 the 1900s
        2 if year <= 50 => Some(2000 + year as i32),
        2 => Some(1900 + year as i32),
        4 => Some(year as i32),
        _ => None,
    }
}
