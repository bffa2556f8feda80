//! As-of lookups on ascending series.
//!
//! Both functions take a slice that must already be sorted ascending by date.
//! They never sort; [`crate::domain::TimeSeries`] is the sorted wrapper.

use chrono::NaiveDate;

use crate::domain::Observation;

/// Value of the last observation dated on or before `target`.
///
/// Returns `None` for an empty series or when `target` predates the first
/// observation. If the series contains duplicate dates the later-indexed value
/// wins.
pub fn latest_on_or_before(target: NaiveDate, series: &[Observation]) -> Option<f64> {
    let mut latest = None;
    for obs in series {
        if obs.date > target {
            break;
        }
        latest = Some(obs.value);
    }
    latest
}

/// First observation dated on or after `target`.
///
/// This is how window endpoints slide past weekends and holidays to the next
/// trading day.
pub fn first_on_or_after(target: NaiveDate, series: &[Observation]) -> Option<&Observation> {
    series.iter().find(|obs| obs.date >= target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series() -> Vec<Observation> {
        vec![
            Observation::new(d(2022, 1, 3), 1.5),
            Observation::new(d(2022, 1, 5), 1.7),
            Observation::new(d(2022, 1, 10), 1.9),
        ]
    }

    #[test]
    fn target_before_first_is_absent() {
        assert_eq!(latest_on_or_before(d(2022, 1, 2), &series()), None);
        assert_eq!(latest_on_or_before(d(2022, 1, 2), &[]), None);
    }

    #[test]
    fn target_at_or_after_last_returns_last() {
        assert_eq!(latest_on_or_before(d(2022, 1, 10), &series()), Some(1.9));
        assert_eq!(latest_on_or_before(d(2030, 6, 1), &series()), Some(1.9));
    }

    #[test]
    fn target_in_gap_returns_previous_value() {
        assert_eq!(latest_on_or_before(d(2022, 1, 4), &series()), Some(1.5));
        assert_eq!(latest_on_or_before(d(2022, 1, 5), &series()), Some(1.7));
    }

    #[test]
    fn duplicate_dates_resolve_to_later_index() {
        let dup = vec![
            Observation::new(d(2022, 1, 3), 1.5),
            Observation::new(d(2022, 1, 3), 2.5),
        ];
        assert_eq!(latest_on_or_before(d(2022, 1, 3), &dup), Some(2.5));
    }

    #[test]
    fn first_on_or_after_slides_forward() {
        let s = series();
        assert_eq!(first_on_or_after(d(2022, 1, 4), &s).map(|o| o.value), Some(1.7));
        assert_eq!(first_on_or_after(d(2022, 1, 3), &s).map(|o| o.value), Some(1.5));
        assert!(first_on_or_after(d(2022, 1, 11), &s).is_none());
    }
}
