//! Calendar view-model: visible date ranges for week and month modes,
//! Monday-first grid alignment, date binning, and anchor navigation.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Week,
    Month,
}

/// The date window currently on screen: a display mode plus the anchor date
/// the window is computed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    pub mode: ViewMode,
    pub anchor: NaiveDate,
}

/// Monday on or before the given date.
pub fn week_start(anchor: NaiveDate) -> NaiveDate {
    anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64)
}

/// Monday-through-Sunday range containing the given date.
pub fn week_range(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = week_start(anchor);
    (start, start + Duration::days(6))
}

/// The 7 dates of the containing week, Monday first.
pub fn week_days(anchor: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(anchor);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

/// First calendar day of the anchor's month.
pub fn month_start(anchor: NaiveDate) -> NaiveDate {
    anchor.with_day(1).unwrap_or(anchor)
}

/// Every calendar day of the anchor's month, in order.
pub fn month_days(anchor: NaiveDate) -> Vec<NaiveDate> {
    let start = month_start(anchor);
    let next_month = start
        .checked_add_months(Months::new(1))
        .unwrap_or(start);
    let mut days = Vec::with_capacity(31);
    let mut day = start;
    while day < next_month {
        days.push(day);
        match day.succ_opt() {
            Some(d) => day = d,
            None => break,
        }
    }
    days
}

/// Number of leading blank cells before day 1 in a Monday-first month grid,
/// so the first real day lands under its weekday column. A month starting on
/// Wednesday needs 2 blanks.
pub fn leading_blanks(anchor: NaiveDate) -> usize {
    month_start(anchor).weekday().num_days_from_monday() as usize
}

/// Records whose date field equals the target day's `YYYY-MM-DD` form.
pub fn bin_by_date<'a, F>(
    records: &'a [Record<F>],
    date_of: impl Fn(&F) -> Option<&str>,
    day: NaiveDate,
) -> Vec<&'a Record<F>> {
    let key = day.format("%Y-%m-%d").to_string();
    records
        .iter()
        .filter(|r| date_of(&r.fields) == Some(key.as_str()))
        .collect()
}

impl CalendarView {
    pub fn new(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self { mode, anchor }
    }

    /// View anchored at the current local date.
    pub fn today(mode: ViewMode) -> Self {
        Self::new(mode, chrono::Local::now().date_naive())
    }

    /// Inclusive start/end of the visible range.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        match self.mode {
            ViewMode::Week => week_range(self.anchor),
            ViewMode::Month => {
                let days = month_days(self.anchor);
                match (days.first(), days.last()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => (self.anchor, self.anchor),
                }
            }
        }
    }

    /// All dates in the visible range, in display order.
    pub fn visible_days(&self) -> Vec<NaiveDate> {
        match self.mode {
            ViewMode::Week => week_days(self.anchor),
            ViewMode::Month => month_days(self.anchor),
        }
    }

    /// Leading blank cell count for the month grid; a week grid needs none.
    pub fn grid_blanks(&self) -> usize {
        match self.mode {
            ViewMode::Week => 0,
            ViewMode::Month => leading_blanks(self.anchor),
        }
    }

    /// Shift the anchor back by one unit of the current mode.
    pub fn previous(&mut self) {
        self.anchor = match self.mode {
            ViewMode::Week => self.anchor - Duration::days(7),
            ViewMode::Month => self
                .anchor
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    /// Shift the anchor forward by one unit of the current mode. Month steps
    /// clamp to valid month lengths (Jan 31 -> Feb 28).
    pub fn next(&mut self) {
        self.anchor = match self.mode {
            ViewMode::Week => self.anchor + Duration::days(7),
            ViewMode::Month => self
                .anchor
                .checked_add_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    /// Reset the anchor to the current local date.
    pub fn go_today(&mut self) {
        self.anchor = chrono::Local::now().date_naive();
    }

    /// Switch display mode. The anchor date is preserved, not the scroll
    /// position.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }
}
