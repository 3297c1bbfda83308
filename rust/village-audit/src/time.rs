//! Date helpers for sampling timestamps inside bounded windows.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use rand::Rng;

pub fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Calendar date `years` before `today`, saturating at the earliest
/// representable date.
pub fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Uniform date in `[start, end]`. An inverted window collapses to `start`.
pub fn date_between<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(0..=span))
}

/// Moves `start` forward by a uniform 1..=N whole days, where N is the number
/// of whole days between `start` and `now`. Falls back to `start` itself when
/// less than one day separates them.
pub fn days_after<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (now - start).num_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(1..=span))
}
