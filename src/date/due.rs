use super::CalendarDate;

/// Derive a due date from the invoice date plus the configured deadline.
///
/// Whole-day calendar arithmetic; month and year boundaries are crossed
/// correctly. An unset invoice date yields an unset due date.
pub fn due_date(invoice_date: Option<CalendarDate>, deadline_days: u32) -> Option<CalendarDate> {
    invoice_date.map(|date| date.plus_days(i64::from(deadline_days)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn crosses_month_boundary() {
        assert_eq!(
            due_date(Some(date(2024, 1, 25)), 10),
            Some(date(2024, 2, 4))
        );
    }

    #[test]
    fn crosses_short_february() {
        // 2024 is a leap year
        assert_eq!(
            due_date(Some(date(2024, 2, 20)), 10),
            Some(date(2024, 3, 1))
        );
        assert_eq!(
            due_date(Some(date(2023, 2, 20)), 10),
            Some(date(2023, 3, 2))
        );
    }

    #[test]
    fn crosses_year_boundary() {
        assert_eq!(
            due_date(Some(date(2024, 12, 28)), 10),
            Some(date(2025, 1, 7))
        );
    }

    #[test]
    fn zero_deadline_is_same_day() {
        assert_eq!(due_date(Some(date(2024, 6, 1)), 0), Some(date(2024, 6, 1)));
    }

    #[test]
    fn unset_invoice_date_stays_unset() {
        assert_eq!(due_date(None, 10), None);
    }
}
