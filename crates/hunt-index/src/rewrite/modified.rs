//! Converts relative durations in `modified:` terms into time ranges.
//!
//! Accepted values: `today`, `yesterday`, `hour`, `day`, `week`, `month`, plurals, and a
//! leading count such as `3 days`. Unknown values are left as literal terms.

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};

use crate::{
    clause::{Clause, RangeClause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Example duration values, as offered for completion.
pub const DURATION_NAMES: [&str; 7] = ["today", "yesterday", "hour", "day", "week", "month", "3 days"];

/// One hour in milliseconds.
const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds.
const DAY_MS: i64 = 24 * HOUR_MS;

/// A named interval ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interval {
    /// Since local midnight.
    Today,
    /// The previous calendar day.
    Yesterday,
    /// A fixed number of milliseconds.
    Span(i64),
}

impl Interval {
    /// Looks up an interval by singular name, ignoring case.
    fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "today" => Some(Self::Today),
            "yesterday" => Some(Self::Yesterday),
            "hour" => Some(Self::Span(HOUR_MS)),
            "day" => Some(Self::Span(DAY_MS)),
            "week" => Some(Self::Span(7 * DAY_MS)),
            "month" => Some(Self::Span(30 * DAY_MS)),
            _ => None,
        }
    }
}

/// Local midnight starting `date`, in milliseconds.
fn midnight_millis(date: NaiveDate) -> Option<i64> {
    day_start_millis(&Local, date)
}

/// Quarter hours past midnight searched for the first existing local time of a day.
const DAY_START_STEPS: i64 = 12;

/// Start of `date` in `tz`, in milliseconds.
///
/// Where the clocks skip midnight the day starts at the first quarter hour that exists.
fn day_start_millis<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=DAY_START_STEPS)
        .map(|step| midnight + TimeDelta::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|t| t.timestamp_millis())
}

/// Parses a duration value into an inclusive `[start, end]` millisecond range ending at `now`.
pub fn duration_range(value: &str, now: DateTime<Local>) -> Option<(i64, i64)> {
    let value = value.trim();
    let mut multiplier = 1;
    let mut name = value.to_string();
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        let digits: String = value.chars().filter(char::is_ascii_digit).collect();
        multiplier = digits.parse::<i64>().unwrap_or(1);
        name = value
            .chars()
            .filter(|c| !c.is_ascii_digit() && *c != ' ')
            .collect();
    }
    let name = name.strip_suffix('s').unwrap_or(&name);

    let end = now.timestamp_millis();
    match Interval::by_name(name)? {
        Interval::Today => Some((midnight_millis(now.date_naive())?, end)),
        Interval::Yesterday => {
            let today = now.date_naive();
            let start = midnight_millis(today.pred_opt()?)?;
            Some((start, midnight_millis(today)?))
        }
        Interval::Span(millis) => Some((end.saturating_sub(multiplier.saturating_mul(millis)), end)),
    }
}

/// Replaces `modified:<duration>` terms with millisecond ranges.
#[derive(Debug)]
pub struct ModifiedTimeConverter {
    /// Reference instant.
    now: DateTime<Local>,
}

impl ModifiedTimeConverter {
    /// Creates a converter computing ranges relative to `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Visitor for ModifiedTimeConverter {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !term.field.is(Field::Modified) {
            return Clause::Term(term);
        }
        match duration_range(&term.text, self.now) {
            Some((lower, upper)) => Clause::Range(RangeClause {
                field: Field::Modified,
                lower,
                upper,
                boost: term.boost,
            }),
            None => Clause::Term(term),
        }
    }
}
