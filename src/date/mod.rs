pub mod due;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Deserialize;

/// Display format for dates, selectable in settings.
///
/// Every date field in the app renders and parses through the active format;
/// there is no per-field override.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "yyyy/mm/dd")]
    YearMonthDay,
    #[serde(rename = "dd/mm/yyyy")]
    DayMonthYear,
}

impl DateFormat {
    /// Placeholder text shown in empty date fields.
    pub fn placeholder(&self) -> &'static str {
        match self {
            DateFormat::YearMonthDay => "yyyy/mm/dd",
            DateFormat::DayMonthYear => "dd/mm/yyyy",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            DateFormat::YearMonthDay => DateFormat::DayMonthYear,
            DateFormat::DayMonthYear => DateFormat::YearMonthDay,
        }
    }
}

/// A validated calendar date.
///
/// The only way to obtain one is through [`CalendarDate::from_ymd`] (or
/// [`CalendarDate::today`]), so any value of this type names a real day.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Validated constructor: year 1000-9999, month 1-12, day 1-31, and the
    /// triple must exist on the calendar (Feb 30 is rejected here).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    pub fn today() -> Self {
        CalendarDate(Local::now().date_naive())
    }

    pub fn plus_days(self, days: i64) -> Self {
        CalendarDate(self.0 + Duration::days(days))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Successful outcome of [`parse`]: either a date, or an explicit request to
/// clear the field. Invalid text is `None` at the `parse` call, which callers
/// treat as "do not commit, keep editing".
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Parsed {
    Clear,
    Date(CalendarDate),
}

/// Render a committed date in the given display format. An unset date renders
/// as the empty string.
pub fn format(date: Option<CalendarDate>, fmt: DateFormat) -> String {
    let Some(date) = date else {
        return String::new();
    };
    match fmt {
        DateFormat::YearMonthDay => {
            format!("{:04}/{:02}/{:02}", date.year(), date.month(), date.day())
        }
        DateFormat::DayMonthYear => {
            format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year())
        }
    }
}

/// Parse user-entered date text.
///
/// The separator actually present in the input (`/` or `-`) is detected
/// rather than dictated by the format; the format only decides which of the
/// three numeric parts is which. Trimmed-empty input parses to
/// [`Parsed::Clear`].
pub fn parse(input: &str, fmt: DateFormat) -> Option<Parsed> {
    let input = input.trim();
    if input.is_empty() {
        return Some(Parsed::Clear);
    }

    let separator = if input.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = input.split(separator).collect();
    if parts.len() != 3 {
        return None;
    }

    let mut numbers = [0u32; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }

    let [first, second, third] = numbers;
    let (year, month, day) = match fmt {
        DateFormat::YearMonthDay => (first, second, third),
        DateFormat::DayMonthYear => (third, second, first),
    };

    CalendarDate::from_ymd(year as i32, month, day).map(Parsed::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn formats_in_both_orders() {
        let d = date(2024, 3, 7);
        assert_eq!(format(Some(d), DateFormat::YearMonthDay), "2024/03/07");
        assert_eq!(format(Some(d), DateFormat::DayMonthYear), "07/03/2024");
    }

    #[test]
    fn unset_date_formats_to_empty() {
        assert_eq!(format(None, DateFormat::YearMonthDay), "");
    }

    #[test]
    fn parses_either_separator() {
        let expected = Some(Parsed::Date(date(2024, 3, 7)));
        assert_eq!(parse("2024/03/07", DateFormat::YearMonthDay), expected);
        assert_eq!(parse("2024-03-07", DateFormat::YearMonthDay), expected);
        assert_eq!(parse("07-03-2024", DateFormat::DayMonthYear), expected);
    }

    #[test]
    fn parses_unpadded_parts() {
        assert_eq!(
            parse("2024/3/7", DateFormat::YearMonthDay),
            Some(Parsed::Date(date(2024, 3, 7)))
        );
    }

    #[test]
    fn empty_input_is_a_clear() {
        assert_eq!(parse("", DateFormat::YearMonthDay), Some(Parsed::Clear));
        assert_eq!(parse("   ", DateFormat::DayMonthYear), Some(Parsed::Clear));
    }

    #[test]
    fn rejects_impossible_calendar_days() {
        assert_eq!(parse("2023/02/30", DateFormat::YearMonthDay), None);
        assert_eq!(parse("2023/04/31", DateFormat::YearMonthDay), None);
        // 2024 is a leap year, 2023 is not
        assert_eq!(
            parse("2024/02/29", DateFormat::YearMonthDay),
            Some(Parsed::Date(date(2024, 2, 29)))
        );
        assert_eq!(parse("2023/02/29", DateFormat::YearMonthDay), None);
    }

    #[test]
    fn rejects_out_of_range_parts() {
        assert_eq!(parse("13/40/2023", DateFormat::DayMonthYear), None);
        assert_eq!(parse("2023/13/01", DateFormat::YearMonthDay), None);
        assert_eq!(parse("0999/01/01", DateFormat::YearMonthDay), None);
        assert_eq!(parse("99/01/01", DateFormat::YearMonthDay), None);
    }

    #[test]
    fn rejects_wrong_shape() {
        assert_eq!(parse("2023/01", DateFormat::YearMonthDay), None);
        assert_eq!(parse("2023/01/02/03", DateFormat::YearMonthDay), None);
        assert_eq!(parse("2023/ab/01", DateFormat::YearMonthDay), None);
        assert_eq!(parse("not a date", DateFormat::YearMonthDay), None);
        assert_eq!(parse("2023//01", DateFormat::YearMonthDay), None);
    }

    proptest! {
        // The core correctness property of the whole date subsystem: any
        // committed date survives a render/re-parse cycle in either format.
        #[test]
        fn round_trips_through_both_formats(
            year in 1000i32..=9999,
            month in 1u32..=12,
            day in 1u32..=31,
        ) {
            if let Some(d) = CalendarDate::from_ymd(year, month, day) {
                for fmt in [DateFormat::YearMonthDay, DateFormat::DayMonthYear] {
                    prop_assert_eq!(parse(&format(Some(d), fmt), fmt), Some(Parsed::Date(d)));
                }
            }
        }
    }
}
