//! Date Normalizer: turns loosely formatted CV dates into a structured `DateValue`
//! and renders them back to display strings.
//!
//! Accepted inputs (first matching pattern wins):
//! - `present` / `current` (any case) → current year, flagged as present
//! - `2023`
//! - `Jan 2023`
//! - `15 Jan 2023`
//! - `03/15/2023` (MM/DD/YYYY)
//! - `2023-03-15`
//!
//! A pattern that matches textually but carries out-of-range fields (month 13,
//! unknown month abbreviation) falls through to the next pattern. Nothing matching
//! yields `None`; callers treat that as "could not normalize", never as an error.

use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Structured date. `year` is always set; when `is_present` is true the month and day
/// are not used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDateValue")]
pub struct DateValue {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    is_present: Option<bool>,
}

/// Unvalidated wire form; every deserialized `DateValue` passes through `TryFrom`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateValue {
    year: i32,
    #[serde(default)]
    month: Option<u32>,
    #[serde(default)]
    day: Option<u32>,
    #[serde(default)]
    is_present: Option<bool>,
}

impl TryFrom<RawDateValue> for DateValue {
    type Error = String;

    fn try_from(raw: RawDateValue) -> Result<Self, Self::Error> {
        if raw.is_present == Some(true) {
            return Ok(DateValue::present(raw.year));
        }
        let value = match (raw.month, raw.day) {
            (None, None) => Some(DateValue::year_only(raw.year)),
            (Some(m), None) => DateValue::month_year(raw.year, m),
            (Some(m), Some(d)) => DateValue::full(raw.year, m, d),
            (None, Some(_)) => None,
        };
        value.ok_or_else(|| {
            format!(
                "invalid date value: year={}, month={:?}, day={:?}",
                raw.year, raw.month, raw.day
            )
        })
    }
}

impl DateValue {
    pub fn present(current_year: i32) -> Self {
        Self {
            year: current_year,
            month: None,
            day: None,
            is_present: Some(true),
        }
    }

    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
            is_present: None,
        }
    }

    pub fn month_year(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            month: Some(month),
            day: None,
            is_present: None,
        })
    }

    pub fn full(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=31).contains(&day) {
            return None;
        }
        Self::month_year(year, month).map(|v| Self {
            day: Some(day),
            ..v
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn is_present(&self) -> bool {
        self.is_present == Some(true)
    }

    /// Display form: `Present`, `D Mon YYYY`, `Mon YYYY` or `YYYY`.
    pub fn format(&self) -> String {
        if self.is_present() {
            return "Present".to_string();
        }
        match (self.month, self.day) {
            (Some(m), Some(d)) => format!("{} {} {}", d, month_abbreviation(m), self.year),
            (Some(m), None) => format!("{} {}", month_abbreviation(m), self.year),
            _ => self.year.to_string(),
        }
    }
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

/// Month table lookup. Months are validated on construction, so 1..=12 always holds here.
fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month - 1) as usize]
}

/// Case-insensitive `jan` → 1 ... `dec` → 12.
pub fn month_from_abbreviation(name: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

type PatternParser = fn(&Captures) -> Option<DateValue>;

struct DatePattern {
    regex: Regex,
    parse: PatternParser,
}

fn patterns() -> &'static [DatePattern] {
    static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let table: [(&str, PatternParser); 5] = [
            (r"^(\d{4})$", parse_year),
            (r"^([A-Za-z]{3})\s+(\d{4})$", parse_month_year),
            (r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})$", parse_day_month_year),
            (r"^(\d{1,2})/(\d{1,2})/(\d{4})$", parse_us_numeric),
            (r"^(\d{4})-(\d{1,2})-(\d{1,2})$", parse_iso),
        ];
        table
            .into_iter()
            .map(|(pattern, parse)| DatePattern {
                regex: Regex::new(pattern).expect("date pattern is a valid regex"),
                parse,
            })
            .collect()
    })
}

/// `2023`
fn parse_year(c: &Captures) -> Option<DateValue> {
    Some(DateValue::year_only(num(c, 1)?))
}

/// `Jan 2023`
fn parse_month_year(c: &Captures) -> Option<DateValue> {
    DateValue::month_year(num(c, 2)?, month_from_abbreviation(&c[1])?)
}

/// `15 Jan 2023`
fn parse_day_month_year(c: &Captures) -> Option<DateValue> {
    DateValue::full(num(c, 3)?, month_from_abbreviation(&c[2])?, num(c, 1)?)
}

/// `03/15/2023`
fn parse_us_numeric(c: &Captures) -> Option<DateValue> {
    DateValue::full(num(c, 3)?, num(c, 1)?, num(c, 2)?)
}

/// `2023-03-15`
fn parse_iso(c: &Captures) -> Option<DateValue> {
    DateValue::full(num(c, 1)?, num(c, 2)?, num(c, 3)?)
}

fn num<T: std::str::FromStr>(caps: &Captures, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

/// Parses a display date using the current year for `Present` / `Current`.
pub fn parse_date(text: &str) -> Option<DateValue> {
    parse_date_with_year(text, Utc::now().year())
}

/// Parses a display date; `current_year` is used for `Present` / `Current`.
pub fn parse_date_with_year(text: &str, current_year: i32) -> Option<DateValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.eq_ignore_ascii_case("present") || text.eq_ignore_ascii_case("current") {
        return Some(DateValue::present(current_year));
    }

    patterns().iter().find_map(|pattern| {
        pattern
            .regex
            .captures(text)
            .and_then(|caps| (pattern.parse)(&caps))
    })
}
