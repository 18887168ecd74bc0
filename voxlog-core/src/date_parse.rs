//! Maps coarsened date slots from the speech resolver to a date granularity.
//!
//! Slots arrive pre-shaped by the upstream speech-to-intent resolver: either a
//! full `YYYY-MM-DD`, or one of a handful of wildcard shapes where `XX` marks a
//! component the user did not say. This module never does free-text parsing; it
//! only decides which granularity a shape names and resolves wildcards.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static MONTH_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}(-XX)?$").unwrap());
static YEAR_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}(-XX-XX)?$").unwrap());
static DAY_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^XXXX-XX-\d{2}$").unwrap());
static SHORT_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^XX\d{2}-\d{2}-\d{2}$").unwrap());

/// The granularity a date slot resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDate {
    /// An exact calendar day.
    Day(NaiveDate),
    /// A month, kept as a `"YYYY-MM"` string for lexical prefix queries.
    Month(String),
    /// Only a year was given.
    Year,
    /// Nothing usable.
    Invalid,
}

impl ParsedDate {
    pub fn as_day(&self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Day(d) => Some(*d),
            _ => None,
        }
    }
}

/// Parses a date slot together with an optional year-override slot.
///
/// Day-only shapes (`XXXX-XX-27`) resolve against the current month and year.
pub fn parse_date_slot(date_slot: &str, year_override: &str) -> ParsedDate {
    parse_date_slot_with_today(date_slot, year_override, Local::now().date_naive())
}

/// Same as [`parse_date_slot`], with "today" pinned for deterministic tests.
pub fn parse_date_slot_with_today(
    date_slot: &str,
    year_override: &str,
    today: NaiveDate,
) -> ParsedDate {
    if date_slot.is_empty() {
        if year_override.is_empty() {
            return ParsedDate::Invalid;
        }
        return ParsedDate::Year;
    }
    if MONTH_DATE_RE.is_match(date_slot) {
        let month = if year_override.is_empty() {
            date_slot[..7].to_string()
        } else {
            format!("{:0>4}-{}", year_override, &date_slot[5..7])
        };
        return ParsedDate::Month(month);
    }
    if YEAR_DATE_RE.is_match(date_slot) {
        return ParsedDate::Year;
    }

    let mut candidate = date_slot.to_string();
    if DAY_ONLY_RE.is_match(&candidate) {
        if year_override == "?" {
            // The resolver could not settle on a year; resolving against today
            // would silently guess, so refuse instead.
            return ParsedDate::Invalid;
        }
        candidate = format!("{:04}-{:02}-{}", today.year(), today.month(), &candidate[8..]);
    }
    if SHORT_YEAR_RE.is_match(&candidate) {
        candidate = format!("20{}", &candidate[2..]);
    }

    let parsed = match NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => return ParsedDate::Invalid,
    };
    if year_override.is_empty() {
        return ParsedDate::Day(parsed);
    }
    let overridden = format!("{:0>4}-{}", year_override, &candidate[5..]);
    match NaiveDate::parse_from_str(&overridden, "%Y-%m-%d") {
        Ok(d) => ParsedDate::Day(d),
        Err(_) => ParsedDate::Invalid,
    }
}
