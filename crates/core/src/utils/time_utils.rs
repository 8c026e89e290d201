use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

/// Source of the current date for the ledger's "today" fallback and period filters.
///
/// Aggregation itself is pure and takes `today` as an argument; services read
/// it from a clock so tests can pin it.
pub trait Clock: Send + Sync {
    /// The current calendar date in the user's local timezone.
    fn today(&self) -> NaiveDate;

    /// The current instant.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let next_month_start = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let end = next_month_start
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (start, end)
}

/// First and last day of the calendar year containing `date`.
pub fn year_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds_handles_december_and_leap_years() {
        assert_eq!(
            month_bounds(date(2024, 2, 14)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(date(2023, 12, 31)),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(
            year_bounds(date(2024, 7, 4)),
            (date(2024, 1, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn test_fixed_clock_returns_pinned_date() {
        let clock = FixedClock::new(date(2024, 3, 1));
        assert_eq!(clock.today(), date(2024, 3, 1));
    }
}
