use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Placeholder for an unknown end of a date range.
pub const NO_DATE: &str = "???";

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Both ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        other.start <= self.end && other.end >= self.start
    }
}

/// Render a date range for humans, collapsing the shared month or year.
///
/// - same month: `Dec 01-03, 2021`
/// - same year: `Nov 29-Dec 03, 2021`
/// - otherwise: `Dec 29, 2021-Jan 02, 2022`
///
/// A missing side is printed as `???`.
pub fn human_daterange(
    left: Option<NaiveDate>,
    right: Option<NaiveDate>,
    range_char: &str,
) -> String {
    match (left, right) {
        (None, None) => format!("{NO_DATE}{range_char}{NO_DATE}"),
        (Some(l), None) => format!("{}{range_char}{NO_DATE}", l.format("%b %d, %Y")),
        (None, Some(r)) => format!("{NO_DATE}{range_char}{}", r.format("%b %d, %Y")),
        (Some(l), Some(r)) => {
            if l.year() == r.year() && l.month() == r.month() {
                format!("{}{range_char}{}", l.format("%b %d"), r.format("%d, %Y"))
            } else if l.year() == r.year() {
                format!("{}{range_char}{}", l.format("%b %d"), r.format("%b %d, %Y"))
            } else {
                format!(
                    "{}{range_char}{}",
                    l.format("%b %d, %Y"),
                    r.format("%b %d, %Y")
                )
            }
        }
    }
}
