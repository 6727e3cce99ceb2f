//! Date normalization for extracted document fields.
//!
//! Vision models echo dates in whatever shape the document prints them.
//! Each value is matched against a fixed, ordered list of layouts and
//! re-rendered in the layout an endpoint promises its callers.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::OcrError;

/// Recognized input layouts, tried in order. Order matters: `YYYY-MM-DD`
/// must be tried before the dash-separated `DD-MM-YYYY`.
const INPUT_FORMATS: &[&str] = &[
    "%d %b %Y",  // 08 JUN 1996
    "%d/%m/%Y",  // 08/06/1996
    "%Y-%m-%d",  // 1996-06-08
    "%d-%m-%Y",  // 08-06-1996
    "%d.%m.%Y",  // 08.06.1996
    "%B %d, %Y", // JUNE 8, 1996
    "%e %b %Y",  // 8 JUN 1996
];

/// chrono's `%Y` also takes one to three digits; every layout here wants four.
static FOUR_DIGIT_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)\d{4}(?:\D|$)").unwrap());

/// Passport endpoint layout.
pub const PASSPORT_DATE_FORMAT: &str = "DD/MM/YYYY";

/// Driving-license endpoint layout.
pub const DRIVING_LICENSE_DATE_FORMAT: &str = "YYYY.MM.DD";

/// Parse a date in any recognized layout.
pub fn parse_date(input: &str) -> Result<NaiveDate, OcrError> {
    let upper = input.trim().to_uppercase();
    if !FOUR_DIGIT_YEAR.is_match(&upper) {
        return Err(OcrError::DateParse(input.to_string()));
    }
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&upper, fmt).ok())
        .ok_or_else(|| OcrError::DateParse(input.to_string()))
}

/// Re-render `input` in `output_format` (e.g. `DD/MM/YYYY`).
pub fn normalize_date(input: &str, output_format: &str) -> Result<String, OcrError> {
    let date = parse_date(input)?;
    Ok(date.format(&to_strftime(output_format)).to_string())
}

/// Normalize a record field in place, keeping the raw value when it cannot be parsed.
pub fn normalize_field(field: &mut String, output_format: &str) {
    if field.trim().is_empty() {
        return;
    }
    match normalize_date(field, output_format) {
        Ok(normalized) => *field = normalized,
        Err(e) => debug!(value = %field, error = %e, "Keeping unparsed date"),
    }
}

/// Translate a layout such as `YYYY.MM.DD` into a chrono format string.
///
/// Tokens: `YYYY`, `YY`, `MONTH`, `MON`, `MM`, `M`, `DD`, `D`. Anything
/// else is literal. Layouts containing `%` are already strftime strings.
pub fn to_strftime(layout: &str) -> String {
    if layout.contains('%') {
        return layout.to_string();
    }

    const TOKENS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("MONTH", "%B"),
        ("MON", "%b"),
        ("YY", "%y"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("M", "%-m"),
        ("D", "%-d"),
    ];

    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (token, directive) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(directive);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_abbreviation_to_passport_layout() {
        assert_eq!(normalize_date("08 JUN 1996", PASSPORT_DATE_FORMAT).unwrap(), "08/06/1996");
    }

    #[test]
    fn iso_to_passport_layout() {
        assert_eq!(normalize_date("1996-06-08", PASSPORT_DATE_FORMAT).unwrap(), "08/06/1996");
    }

    #[test]
    fn mixed_case_month_is_tolerated() {
        assert_eq!(normalize_date("8 jun 1996", PASSPORT_DATE_FORMAT).unwrap(), "08/06/1996");
        assert_eq!(normalize_date("June 8, 1996", PASSPORT_DATE_FORMAT).unwrap(), "08/06/1996");
    }

    #[test]
    fn every_recognized_layout_round_trips_the_calendar_date() {
        let inputs = [
            "08 JUN 1996",
            "08/06/1996",
            "1996-06-08",
            "08-06-1996",
            "08.06.1996",
            "June 8, 1996",
            "8 Jun 1996",
        ];
        for input in inputs {
            for layout in [PASSPORT_DATE_FORMAT, DRIVING_LICENSE_DATE_FORMAT, "YYYY-MM-DD"] {
                let out = normalize_date(input, layout).unwrap();
                let back = NaiveDate::parse_from_str(&out, &to_strftime(layout)).unwrap();
                assert_eq!(back, ymd(1996, 6, 8), "{input} via {layout}");
            }
        }
    }

    #[test]
    fn dash_layouts_are_disambiguated() {
        assert_eq!(parse_date("2001-02-03").unwrap(), ymd(2001, 2, 3));
        assert_eq!(parse_date("03-02-2001").unwrap(), ymd(2001, 2, 3));
    }

    #[test]
    fn license_layout() {
        assert_eq!(
            normalize_date("23/01/1994", DRIVING_LICENSE_DATE_FORMAT).unwrap(),
            "1994.01.23"
        );
    }

    #[test]
    fn garbage_fails_with_date_parse() {
        let err = normalize_date("not-a-date", PASSPORT_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, OcrError::DateParse(ref s) if s == "not-a-date"));
    }

    #[test]
    fn near_miss_layouts_are_rejected() {
        for input in [
            "08/06/96",
            "8 JUN 96",
            "08-06-96",
            "08.06.96",
            "JUNE 8, 96",
            "1996/06/08",
            "31/02/1996",
            "08/13/1996",
            "08/06/19961",
        ] {
            let err = parse_date(input).unwrap_err();
            assert!(matches!(err, OcrError::DateParse(ref s) if s == input), "{input}");
        }
    }

    #[test]
    fn two_digit_year_field_is_left_alone() {
        let mut field = "08/06/96".to_string();
        normalize_field(&mut field, PASSPORT_DATE_FORMAT);
        assert_eq!(field, "08/06/96");

        let mut field = "8 JUN 96".to_string();
        normalize_field(&mut field, DRIVING_LICENSE_DATE_FORMAT);
        assert_eq!(field, "8 JUN 96");
    }

    #[test]
    fn unparseable_field_keeps_original_value() {
        let mut field = "UNKNOWN".to_string();
        normalize_field(&mut field, PASSPORT_DATE_FORMAT);
        assert_eq!(field, "UNKNOWN");

        let mut field = "1994-01-23".to_string();
        normalize_field(&mut field, PASSPORT_DATE_FORMAT);
        assert_eq!(field, "23/01/1994");
    }

    #[test]
    fn layout_translation() {
        assert_eq!(to_strftime("DD/MM/YYYY"), "%d/%m/%Y");
        assert_eq!(to_strftime("YYYY.MM.DD"), "%Y.%m.%d");
        assert_eq!(to_strftime("DD MON YYYY"), "%d %b %Y");
        assert_eq!(to_strftime("%d-%m-%Y"), "%d-%m-%Y");
    }
}
