use crate::schema::YearlessDatePolicy;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Full-cell grammar used when parsing. Separators may be '-', '/' or '.', optionally padded
// with spaces ("2024. 1. 31." is how Korean-locale sheets export dates).
static YMD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})\s*[-/.]\s*(\d{1,2})\s*[-/.]\s*(\d{1,2})\.?(?:(?:\s+|T)(\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?)?$",
    )
    .unwrap()
});

static YM_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})\s*[-/.]\s*(\d{1,2})\.?$").unwrap());

static MDY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$").unwrap()
});

static KOREAN_YMD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일$").unwrap());

static KOREAN_YM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s*년\s*(\d{1,2})\s*월$").unwrap());

static KOREAN_MD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s*월\s*(\d{1,2})\s*일$").unwrap());

const MONTH_NAME_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%b %d %Y", "%d %b %Y", "%d %B %Y"];

// Shape-only patterns for the content sampling pass. These search anywhere in the cell.
static DATE_SHAPE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\d{4}-\d{1,2}-\d{1,2}").unwrap(),
        Regex::new(r"\d{4}\.\s*\d{1,2}\.\s*\d{1,2}").unwrap(),
        Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").unwrap(),
        Regex::new(r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일").unwrap(),
        Regex::new(r"\d{1,2}월\s*\d{1,2}일").unwrap(),
    ]
});

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Calendar-day subtraction with no timezone adjustment. Saturates at the earliest representable date.
pub fn days_before(moment: NaiveDateTime, days: u32) -> NaiveDateTime {
    moment
        .checked_sub_days(Days::new(days as u64))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Whether `text` contains something shaped like a date (ISO-like, slash-delimited or
/// Korean year/month/day words). Does not validate the calendar values.
pub fn looks_like_date(text: &str) -> bool {
    DATE_SHAPE_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Parses a single cell with the permissive date grammar.
///
/// Accepted forms:
/// - `YYYY-M-D` (also `/` or `.` separators) with an optional `HH:MM[:SS]` or ISO `T` time
/// - `YYYY-MM` and `YYYY년 M월` (first day of the month)
/// - `M/D/YYYY`
/// - `YYYY년 M월 D일`
/// - `M월 D일`, resolved through `yearless`
/// - English month names: `Jan 5, 2024`, `5 January 2024`
pub fn parse_calendar_date(text: &str, yearless: &YearlessDatePolicy) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = YMD_PATTERN.captures(trimmed) {
        let date = ymd(&caps, 1, 2, 3)?;
        return with_time(date, &caps, 4);
    }

    if let Some(caps) = MDY_PATTERN.captures(trimmed) {
        let date = NaiveDate::from_ymd_opt(num(&caps, 3)?, num(&caps, 1)? as u32, num(&caps, 2)? as u32)?;
        return with_time(date, &caps, 4);
    }

    if let Some(caps) = KOREAN_YMD_PATTERN.captures(trimmed) {
        return ymd(&caps, 1, 2, 3).map(midnight);
    }

    if let Some(caps) = YM_PATTERN.captures(trimmed) {
        return NaiveDate::from_ymd_opt(num(&caps, 1)?, num(&caps, 2)? as u32, 1).map(midnight);
    }

    if let Some(caps) = KOREAN_YM_PATTERN.captures(trimmed) {
        return NaiveDate::from_ymd_opt(num(&caps, 1)?, num(&caps, 2)? as u32, 1).map(midnight);
    }

    if let Some(caps) = KOREAN_MD_PATTERN.captures(trimmed) {
        return match yearless {
            YearlessDatePolicy::Reject => None,
            YearlessDatePolicy::AssumeYear(year) => {
                NaiveDate::from_ymd_opt(*year, num(&caps, 1)? as u32, num(&caps, 2)? as u32)
                    .map(midnight)
            }
        };
    }

    MONTH_NAME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(midnight)
}

fn num(caps: &Captures<'_>, group: usize) -> Option<i32> {
    caps.get(group)?.as_str().parse().ok()
}

fn ymd(caps: &Captures<'_>, y: usize, m: usize, d: usize) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(num(caps, y)?, num(caps, m)? as u32, num(caps, d)? as u32)
}

fn with_time(date: NaiveDate, caps: &Captures<'_>, first_group: usize) -> Option<NaiveDateTime> {
    if caps.get(first_group).is_none() {
        return Some(midnight(date));
    }
    let hour = num(caps, first_group)? as u32;
    let minute = num(caps, first_group + 1)? as u32;
    let second = caps
        .get(first_group + 2)
        .map(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(Some(0))?;
    date.and_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn parse(text: &str) -> Option<NaiveDateTime> {
        parse_calendar_date(text, &YearlessDatePolicy::Reject)
    }

    #[test]
    fn test_iso_like_forms() {
        assert_eq!(parse("2024-1-5"), Some(day(2024, 1, 5)));
        assert_eq!(parse("2024-01-31"), Some(day(2024, 1, 31)));
        assert_eq!(parse("2024/02/29"), Some(day(2024, 2, 29)));
        assert_eq!(parse("2024. 3. 1."), Some(day(2024, 3, 1)));
        assert_eq!(
            parse("2024-01-31T13:45:10"),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(13, 45, 10)
        );
        assert_eq!(
            parse("2024-01-31 08:30"),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(8, 30, 0)
        );
    }

    #[test]
    fn test_slash_and_korean_forms() {
        assert_eq!(parse("3/4/2024"), Some(day(2024, 3, 4)));
        assert_eq!(parse("2024년 3월 4일"), Some(day(2024, 3, 4)));
        assert_eq!(parse("2024년3월4일"), Some(day(2024, 3, 4)));
        assert_eq!(parse("2024년 3월"), Some(day(2024, 3, 1)));
        assert_eq!(parse("2024-03"), Some(day(2024, 3, 1)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse("Jan 5, 2024"), Some(day(2024, 1, 5)));
        assert_eq!(parse("5 March 2024"), Some(day(2024, 3, 5)));
    }

    #[test]
    fn test_rejects_invalid_calendar_values() {
        assert_eq!(parse("2023-02-29"), None);
        assert_eq!(parse("13/01/2024"), None);
        assert_eq!(parse("2024-01-31 25:00"), None);
        assert_eq!(parse("3/4"), None);
        assert_eq!(parse("1234"), None);
        assert_eq!(parse("hello"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_yearless_policy() {
        assert_eq!(parse("3월 5일"), None);
        assert_eq!(
            parse_calendar_date("3월 5일", &YearlessDatePolicy::AssumeYear(2023)),
            Some(day(2023, 3, 5))
        );
        assert_eq!(
            parse_calendar_date("2월 30일", &YearlessDatePolicy::AssumeYear(2023)),
            None
        );
    }

    #[test]
    fn test_looks_like_date() {
        assert!(looks_like_date("2024-01-31"));
        assert!(looks_like_date("작성일: 2024-1-5"));
        assert!(looks_like_date("1/31/2024"));
        assert!(looks_like_date("2024년 1월 31일"));
        assert!(looks_like_date("1월 31일"));
        assert!(!looks_like_date("1,234"));
        assert!(!looks_like_date("3/4"));
    }

    #[test]
    fn test_days_before() {
        assert_eq!(days_before(day(2024, 1, 31), 365), day(2023, 1, 31));
        assert_eq!(days_before(day(2024, 3, 1), 1), day(2024, 2, 29));
    }
}
