//! Aggregation over stored filings, rates and returns.
//!
//! Everything here is pure: the caller loads an [`AnalysisInput`] from the store
//! and gets back an [`AnalysisReport`] for formatting or export.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{RateBucket, WholeWindowReturn, classify, whole_window_return};
use crate::domain::{FilingPrices, ReturnRecord, TimeSeries};

/// Filing counts per rate bucket, over filings with a resolvable as-of rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketCounts {
    counts: BTreeMap<RateBucket, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShare {
    pub bucket: RateBucket,
    pub label: &'static str,
    pub count: usize,
    pub pct: f64,
}

impl BucketCounts {
    pub fn add(&mut self, bucket: RateBucket) {
        *self.counts.entry(bucket).or_insert(0) += 1;
    }

    pub fn count(&self, bucket: RateBucket) -> usize {
        self.counts.get(&bucket).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Non-empty buckets in ordinal order with their share of the total.
    pub fn shares(&self) -> Vec<BucketShare> {
        let total = self.total();
        RateBucket::ALL
            .iter()
            .filter_map(|&bucket| {
                let count = self.count(bucket);
                (count > 0).then(|| BucketShare {
                    bucket,
                    label: bucket.label(),
                    count,
                    pct: count as f64 / total as f64 * 100.0,
                })
            })
            .collect()
    }
}

/// Bucket each filing by the 10-year yield as of its filing date.
///
/// Filings dated before the first rate observation are left out.
pub fn bucket_filings(filing_dates: &[NaiveDate], rates: &TimeSeries) -> BucketCounts {
    let mut counts = BucketCounts::default();
    for &date in filing_dates {
        if let Some(rate) = rates.as_of(date) {
            counts.add(classify(rate));
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnStats {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl ReturnStats {
    /// Statistics over the finite values, `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Some(Self {
            n,
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

/// Per-window statistics; each window is summarised over its own non-null values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSummary {
    pub window_a: Option<ReturnStats>,
    pub window_b: Option<ReturnStats>,
}

impl ReturnSummary {
    pub fn window_a_samples(&self) -> usize {
        self.window_a.map_or(0, |s| s.n)
    }

    pub fn window_b_samples(&self) -> usize {
        self.window_b.map_or(0, |s| s.n)
    }
}

pub fn summarize_returns(records: &[ReturnRecord]) -> ReturnSummary {
    let window_a: Vec<f64> = records.iter().filter_map(|r| r.window_a_pct).collect();
    let window_b: Vec<f64> = records.iter().filter_map(|r| r.window_b_pct).collect();
    ReturnSummary {
        window_a: ReturnStats::from_values(&window_a),
        window_b: ReturnStats::from_values(&window_b),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year_month: String,
    pub count: usize,
}

/// Count filings per `YYYY-MM`, ascending.
///
/// The key is the first seven characters of the stored date string; keys that do
/// not form a valid year-month are dropped.
pub fn monthly_counts<S: AsRef<str>>(filing_dates: &[S]) -> Vec<MonthlyCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for raw in filing_dates {
        let Some(key) = year_month_key(raw.as_ref()) else {
            continue;
        };
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year_month, count)| MonthlyCount { year_month, count })
        .collect()
}

fn year_month_key(raw: &str) -> Option<&str> {
    let key = raw.trim().get(..7)?;
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()?;
    Some(key)
}

/// First-to-last return around a company's earliest filing, with the as-of rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilingWindowReturn {
    pub filing_id: i64,
    pub ticker: String,
    pub filing_date: NaiveDate,
    #[serde(flatten)]
    pub window: WholeWindowReturn,
    pub rate_at_filing: Option<f64>,
}

/// Whole-window returns; filings with fewer than two usable closes are dropped.
pub fn whole_window_returns(groups: &[FilingPrices], rates: &TimeSeries) -> Vec<FilingWindowReturn> {
    groups
        .iter()
        .filter_map(|group| {
            let window = whole_window_return(&group.closes)?;
            Some(FilingWindowReturn {
                filing_id: group.filing_id,
                ticker: group.ticker.clone(),
                filing_date: group.filing_date,
                window,
                rate_at_filing: rates.as_of(group.filing_date),
            })
        })
        .collect()
}

/// Everything the reporter reads from the store.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    /// Raw `filing_date` values, as stored.
    pub filing_dates: Vec<String>,
    pub rates: TimeSeries,
    pub returns: Vec<ReturnRecord>,
    pub earliest_filing_prices: Vec<FilingPrices>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub filings_total: usize,
    pub buckets: BucketCounts,
    pub returns: ReturnSummary,
    pub whole_window: Vec<FilingWindowReturn>,
    pub whole_window_stats: Option<ReturnStats>,
    pub monthly: Vec<MonthlyCount>,
}

pub fn build_report(input: &AnalysisInput) -> AnalysisReport {
    let dates: Vec<NaiveDate> = input
        .filing_dates
        .iter()
        .filter_map(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .collect();

    let whole_window = whole_window_returns(&input.earliest_filing_prices, &input.rates);
    let whole_window_values: Vec<f64> = whole_window.iter().map(|r| r.window.return_pct).collect();

    AnalysisReport {
        filings_total: input.filing_dates.len(),
        buckets: bucket_filings(&dates, &input.rates),
        returns: summarize_returns(&input.returns),
        whole_window_stats: ReturnStats::from_values(&whole_window_values),
        whole_window,
        monthly: monthly_counts(&input.filing_dates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rates() -> TimeSeries {
        TimeSeries::from_unsorted(vec![
            Observation::new(d(2022, 1, 1), 1.5),
            Observation::new(d(2022, 3, 1), 4.5),
        ])
    }

    #[test]
    fn filings_bucketed_by_as_of_rate() {
        let counts = bucket_filings(&[d(2022, 2, 1), d(2022, 3, 15), d(2021, 12, 1)], &rates());
        assert_eq!(counts.count(RateBucket::Low), 1);
        assert_eq!(counts.count(RateBucket::High), 1);
        assert_eq!(counts.count(RateBucket::Medium), 0);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn shares_are_over_bucketed_total() {
        let mut counts = BucketCounts::default();
        counts.add(RateBucket::Low);
        counts.add(RateBucket::High);
        counts.add(RateBucket::High);
        counts.add(RateBucket::High);

        let shares = counts.shares();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].bucket, RateBucket::Low);
        assert!((shares[0].pct - 25.0).abs() < 1e-9);
        assert!((shares[1].pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn stats_mean_median_min_max() {
        let s = ReturnStats::from_values(&[4.0, -2.0, 10.0, 0.0]).unwrap();
        assert_eq!(s.n, 4);
        assert!((s.mean - 3.0).abs() < 1e-9);
        assert!((s.median - 2.0).abs() < 1e-9);
        assert_eq!(s.min, -2.0);
        assert_eq!(s.max, 10.0);
        assert!(ReturnStats::from_values(&[]).is_none());
    }

    #[test]
    fn windows_summarised_independently() {
        let rec = |a: Option<f64>, b: Option<f64>| ReturnRecord {
            company_id: 1,
            filing_date: d(2024, 1, 1),
            window_a_pct: a,
            window_b_pct: b,
        };
        let summary = summarize_returns(&[rec(Some(1.0), None), rec(Some(3.0), Some(-1.0)), rec(Some(5.0), None)]);
        assert_eq!(summary.window_a_samples(), 3);
        assert_eq!(summary.window_b_samples(), 1);
        assert!((summary.window_a.unwrap().median - 3.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_counts_drop_bad_keys() {
        let counts = monthly_counts(&["2024-02-10", "2024-01-31", "2024-02-01", "", "2024-13-01", "bad"]);
        assert_eq!(
            counts,
            vec![
                MonthlyCount {
                    year_month: "2024-01".to_string(),
                    count: 1
                },
                MonthlyCount {
                    year_month: "2024-02".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn whole_window_rows_carry_rate_and_skip_thin_series() {
        let groups = vec![
            FilingPrices {
                filing_id: 1,
                ticker: "AAA".to_string(),
                filing_date: d(2022, 2, 1),
                closes: vec![Observation::new(d(2022, 1, 1), 10.0), Observation::new(d(2022, 1, 10), 12.0)],
            },
            FilingPrices {
                filing_id: 2,
                ticker: "BBB".to_string(),
                filing_date: d(2022, 2, 1),
                closes: vec![Observation::new(d(2022, 1, 1), 10.0)],
            },
        ];

        let rows = whole_window_returns(&groups, &rates());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "AAA");
        assert!((rows[0].window.return_pct - 20.0).abs() < 1e-9);
        assert_eq!(rows[0].rate_at_filing, Some(1.5));
    }

    #[test]
    fn build_report_ignores_malformed_dates_for_buckets() {
        let input = AnalysisInput {
            filing_dates: vec!["2022-02-01".to_string(), "not-a-date".to_string()],
            rates: rates(),
            ..AnalysisInput::default()
        };
        let report = build_report(&input);
        assert_eq!(report.filings_total, 2);
        assert_eq!(report.buckets.total(), 1);
        assert_eq!(report.monthly.len(), 1);
        assert!(report.whole_window_stats.is_none());
    }
}
