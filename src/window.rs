//! Date windows for bounded-range history requests.

use chrono::{Duration, NaiveDate};

/// A half-open `[start, end)` date range submitted as one API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Splits `[start, end)` into consecutive windows of at most
/// `days_per_request` days. The windows tile the range exactly: no gaps, no
/// overlaps, and the last window ends on `end`.
pub fn windows(start: NaiveDate, end: NaiveDate, days_per_request: u32) -> Vec<DateWindow> {
    let width = Duration::days(i64::from(days_per_request));
    let mut out = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let stop = (cursor + width).min(end);
        out.push(DateWindow {
            start: cursor,
            end: stop,
        });
        cursor = stop;
    }

    out
}

// -- Tests -------------------------------------------------------------------
