use chrono::{Datelike, Days, Months, NaiveDate};

/// Format of the day keys in an availability map, e.g. `2024-06-13T00:00:00Z`.
pub const DAY_FORMAT: &str = "%Y-%m-%dT00:00:00Z";

/// Expand an inclusive date range into the day keys used by the availability API.
///
/// The result holds one entry per calendar day from `start` to `end`, both
/// included, in ascending order. A reversed range (`start > end`) yields an
/// empty list; callers are expected to reject such ranges up front.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| day.format(DAY_FORMAT).to_string())
        .collect()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// The `start_date` query value for the month containing `date`.
pub fn month_start_param(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", month_start(date).format("%Y-%m-%d"))
}

/// First-of-month dates for every month the inclusive range touches.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut month = month_start(start);

    while month <= end {
        months.push(month);
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }

    months
}
