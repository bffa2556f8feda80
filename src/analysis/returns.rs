//! Post-filing price returns.
//!
//! Two flavours:
//!
//! - fixed calendar offsets from the filing date (`compute_returns`), stored per
//!   company and filing date
//! - first-to-last close over whatever window is stored (`whole_window_return`),
//!   used for the ad hoc section of the report

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::analysis::asof::first_on_or_after;
use crate::domain::{Observation, TimeSeries};

/// Calendar-day offsets from the filing date.
///
/// Window A runs from the anchor to `window_a_days`; window B runs from
/// `window_a_days` to `window_b_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnWindows {
    pub anchor_days: i64,
    pub window_a_days: i64,
    pub window_b_days: i64,
}

impl Default for ReturnWindows {
    fn default() -> Self {
        Self {
            anchor_days: 0,
            window_a_days: 5,
            window_b_days: 10,
        }
    }
}

impl ReturnWindows {
    /// Furthest offset any window reaches.
    pub fn max_offset_days(&self) -> i64 {
        self.anchor_days.max(self.window_a_days).max(self.window_b_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WindowReturns {
    pub window_a_pct: Option<f64>,
    pub window_b_pct: Option<f64>,
}

/// Percentage change, or `None` when the start price is zero or the result is
/// not finite.
pub fn pct_change(start: f64, end: f64) -> Option<f64> {
    if start == 0.0 {
        return None;
    }
    let pct = (end - start) / start * 100.0;
    pct.is_finite().then_some(pct)
}

/// Window returns anchored on `filing_date`.
///
/// Each endpoint is the first close on or after its target date. Window A is
/// required: if the anchor or the A endpoint is missing (or the anchor is zero)
/// both results are `None`. Window B is computed independently when its endpoint
/// resolves.
pub fn compute_returns(filing_date: NaiveDate, prices: &TimeSeries, windows: &ReturnWindows) -> WindowReturns {
    let closes = prices.as_slice();
    let close_at = |offset: i64| -> Option<f64> {
        let target = filing_date.checked_add_signed(Duration::days(offset))?;
        first_on_or_after(target, closes).map(|o| o.value)
    };

    let (Some(p0), Some(pa)) = (close_at(windows.anchor_days), close_at(windows.window_a_days)) else {
        return WindowReturns::default();
    };

    let Some(window_a_pct) = pct_change(p0, pa) else {
        return WindowReturns::default();
    };

    let window_b_pct = close_at(windows.window_b_days).and_then(|pb| pct_change(pa, pb));

    WindowReturns {
        window_a_pct: Some(window_a_pct),
        window_b_pct,
    }
}

/// First-to-last return over a stored price window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WholeWindowReturn {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_close: f64,
    pub end_close: f64,
    pub return_pct: f64,
}

/// Return from the earliest to the latest close in `closes`.
///
/// Input order does not matter. Needs at least two observations on distinct
/// dates; fewer yields `None` so the filing drops out of aggregates.
pub fn whole_window_return(closes: &[Observation]) -> Option<WholeWindowReturn> {
    let series = TimeSeries::from_unsorted(closes.to_vec());
    let first = *series.first()?;
    let last = *series.last()?;
    if first.date == last.date {
        return None;
    }

    let return_pct = pct_change(first.value, last.value)?;
    Some(WholeWindowReturn {
        start_date: first.date,
        end_date: last.date,
        start_close: first.value,
        end_close: last.value,
        return_pct,
    })
}
