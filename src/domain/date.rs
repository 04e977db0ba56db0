//! Flexible parsing of the `DateFrom` and `DateTo` columns.
//!
//! Input files come from many sources, so dates are accepted in a number of
//! layouts. A fixed list of zero-padded numeric layouts is tried first, in
//! order, each of which must match the whole field exactly. Ambiguous values
//! resolve to whichever layout comes first: `01/02/2024` is the 2nd of
//! January, not the 1st of February. Only when none of those match is a set of
//! more lenient layouts attempted.
//!
//! The order of [`STRICT_PATTERNS`] decides how historical files are
//! interpreted and must not be reordered.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::trace;

use super::clock::Clock;

/// Which column of an assignment a date was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    /// The start of the assignment (`DateFrom`). Mandatory.
    From,
    /// The end of the assignment (`DateTo`). NULL means "still ongoing".
    To,
}

impl DateRole {
    /// The column name this role is read from.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::From => "DateFrom",
            Self::To => "DateTo",
        }
    }
}

impl fmt::Display for DateRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Errors that can occur while parsing a date field.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The start date was NULL or empty.
    #[error("DateFrom cannot be null or empty")]
    MissingStartDate,

    /// No known layout could interpret the value.
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
    DayMonthYear,
}

/// A strict numeric layout: three zero-padded fields joined by a separator.
///
/// The year is exactly four digits, the month and day exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DatePattern {
    order: FieldOrder,
    separator: char,
}

impl DatePattern {
    const fn new(order: FieldOrder, separator: char) -> Self {
        Self { order, separator }
    }

    fn parse(self, value: &str) -> Option<NaiveDate> {
        let mut fields = value.split(self.separator);
        let (first, second, third) = (fields.next()?, fields.next()?, fields.next()?);
        if fields.next().is_some() {
            return None;
        }

        let (year, month, day) = match self.order {
            FieldOrder::YearMonthDay => (first, second, third),
            FieldOrder::MonthDayYear => (third, first, second),
            FieldOrder::DayMonthYear => (third, second, first),
        };

        let year = i32::try_from(fixed_width(year, 4)?).ok()?;
        NaiveDate::from_ymd_opt(year, fixed_width(month, 2)?, fixed_width(day, 2)?)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c] = match self.order {
            FieldOrder::YearMonthDay => ["YYYY", "MM", "DD"],
            FieldOrder::MonthDayYear => ["MM", "DD", "YYYY"],
            FieldOrder::DayMonthYear => ["DD", "MM", "YYYY"],
        };
        let sep = self.separator;
        write!(f, "{a}{sep}{b}{sep}{c}")
    }
}

fn fixed_width(field: &str, width: usize) -> Option<u32> {
    if field.len() == width && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().ok()
    } else {
        None
    }
}

/// Strict layouts, in priority order.
const STRICT_PATTERNS: [DatePattern; 9] = [
    DatePattern::new(FieldOrder::YearMonthDay, '-'),
    DatePattern::new(FieldOrder::MonthDayYear, '/'),
    DatePattern::new(FieldOrder::DayMonthYear, '/'),
    DatePattern::new(FieldOrder::YearMonthDay, '/'),
    DatePattern::new(FieldOrder::MonthDayYear, '-'),
    DatePattern::new(FieldOrder::DayMonthYear, '-'),
    DatePattern::new(FieldOrder::DayMonthYear, '.'),
    DatePattern::new(FieldOrder::MonthDayYear, '.'),
    DatePattern::new(FieldOrder::YearMonthDay, '.'),
];

/// Lenient date-only layouts used when no strict layout matches.
///
/// Numeric fields may omit their leading zeros here, and month names are
/// accepted in full or abbreviated form.
const LENIENT_DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// ISO week dates, `YYYY-Www-D`.
const LENIENT_WEEK_FORMATS: [&str; 2] = ["%G-W%V-%u", "%GW%V%u"];

/// Lenient date-and-time layouts; the time of day is discarded.
const LENIENT_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-and-time layouts carrying a UTC offset or `Z`. The date is taken as
/// written, in the offset's own time zone.
const LENIENT_OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

fn is_null(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("null")
}

fn parse_lenient(value: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(value) {
        return Some(datetime.date_naive());
    }
    if let Some(datetime) = LENIENT_OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime.date_naive());
    }
    if let Some(datetime) = LENIENT_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime.date());
    }
    if let Some(date) = parse_basic(value).or_else(|| parse_reduced(value)) {
        return Some(date);
    }
    LENIENT_DATE_FORMATS
        .iter()
        .chain(&LENIENT_WEEK_FORMATS)
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// ISO 8601 dates with reduced precision: `YYYY` is the 1st of January and
/// `YYYY-MM` the 1st of the month. `YYYY-DDD` is an ordinal date.
fn parse_reduced(value: &str) -> Option<NaiveDate> {
    let (year, rest) = value
        .split_once('-')
        .map_or((value, None), |(year, rest)| (year, Some(rest)));
    let year = i32::try_from(fixed_width(year, 4)?).ok()?;

    match rest {
        None => NaiveDate::from_ymd_opt(year, 1, 1),
        Some(month) if month.len() == 2 => {
            NaiveDate::from_ymd_opt(year, fixed_width(month, 2)?, 1)
        }
        Some(ordinal) => NaiveDate::from_yo_opt(year, fixed_width(ordinal, 3)?),
    }
}

/// ISO 8601 basic format, `YYYYMMDD`.
fn parse_basic(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.is_ascii() {
        return None;
    }
    let (year, rest) = value.split_at(4);
    let (month, day) = rest.split_at(2);
    let year = i32::try_from(fixed_width(year, 4)?).ok()?;
    NaiveDate::from_ymd_opt(year, fixed_width(month, 2)?, fixed_width(day, 2)?)
}

/// Converts raw date fields into calendar dates.
///
/// The parser captures "today" when it is created, and uses that single date
/// for every NULL end date it resolves. Create one parser per computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    today: NaiveDate,
}

impl DateParser {
    /// Creates a parser that resolves open-ended assignments to the clock's
    /// current date.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self::with_today(clock.today())
    }

    /// Creates a parser that resolves open-ended assignments to `today`.
    #[must_use]
    pub const fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    /// The date NULL end dates resolve to.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns `true` if `raw` is the NULL sentinel (empty or `null` in any
    /// case, after trimming).
    #[must_use]
    pub fn is_null(raw: &str) -> bool {
        is_null(raw.trim())
    }

    /// Parses a raw date field.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingStartDate`] if `raw` is NULL and `role` is
    ///   [`DateRole::From`].
    /// - [`Error::InvalidDateFormat`] if no layout can interpret `raw`.
    pub fn parse(&self, raw: &str, role: DateRole) -> Result<NaiveDate, Error> {
        let value = raw.trim();

        if is_null(value) {
            return match role {
                DateRole::From => Err(Error::MissingStartDate),
                DateRole::To => Ok(self.today),
            };
        }

        for pattern in STRICT_PATTERNS {
            if let Some(date) = pattern.parse(value) {
                trace!(%value, %pattern, "matched strict date pattern");
                return Ok(date);
            }
        }

        parse_lenient(value).map_or_else(
            || Err(Error::InvalidDateFormat(raw.to_string())),
            |date| {
                trace!(%value, "matched lenient date format");
                Ok(date)
            },
        )
    }
}
