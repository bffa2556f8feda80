//! Formatted terminal / text-file output.
//!
//! Formatting lives in one place so the aggregation code stays free of layout
//! concerns and output changes stay local.

use crate::analysis::ReturnWindows;
use crate::report::summary::{AnalysisReport, ReturnStats};

/// Plain-text summary of a full analysis run.
pub fn format_summary(report: &AnalysisReport, windows: &ReturnWindows) -> String {
    let mut out = String::new();

    out.push_str("=== cvr - Convertible Filings Analysis Summary ===\n\n");
    out.push_str(&format!("Filings stored: {}\n\n", report.filings_total));

    out.push_str("1) Filings by 10Y Treasury Yield Environment\n");
    if report.buckets.is_empty() {
        out.push_str("   No data available.\n\n");
    } else {
        for share in report.buckets.shares() {
            out.push_str(&format!(
                "   - {:<14} {:>5} filings ({:.1}%)\n",
                share.label, share.count, share.pct
            ));
        }
        out.push_str(&format!("   Total filings considered: {}\n\n", report.buckets.total()));
    }

    out.push_str("2) Post-Filing Window Returns\n");
    let window_a = format!("Day {} -> Day {}", windows.anchor_days, windows.window_a_days);
    let window_b = format!("Day {} -> Day {}", windows.window_a_days, windows.window_b_days);
    out.push_str(&format_stats_line(&window_a, report.returns.window_a.as_ref()));
    out.push_str(&format_stats_line(&window_b, report.returns.window_b.as_ref()));
    out.push('\n');

    out.push_str("3) Approximate Stock Performance Around Earliest Filing\n");
    match &report.whole_window_stats {
        Some(stats) => {
            out.push_str(&format!("   Number of companies with usable price data: {}\n", stats.n));
            out.push_str(&format!("   Average return across window: {:.2}%\n", stats.mean));
            out.push_str(&format!("   Median return: {:.2}%\n", stats.median));
            out.push_str(&format!("   Min return: {:.2}%\n", stats.min));
            out.push_str(&format!("   Max return: {:.2}%\n", stats.max));
            for row in &report.whole_window {
                let rate = row
                    .rate_at_filing
                    .map(|r| format!("{r:.2}%"))
                    .unwrap_or_else(|| "n/a".to_string());
                out.push_str(&format!(
                    "   {:<8} filed {} | {} -> {} | {:>8.2}% | 10Y {}\n",
                    row.ticker, row.filing_date, row.window.start_date, row.window.end_date, row.window.return_pct, rate
                ));
            }
            out.push('\n');
        }
        None => out.push_str("   No usable stock price data available.\n\n"),
    }

    out.push_str("4) Filings Over Time (by Month)\n");
    if report.monthly.is_empty() {
        out.push_str("   No filings aggregated by month.\n");
    } else {
        for m in &report.monthly {
            out.push_str(&format!("   - {}: {} filings\n", m.year_month, m.count));
        }
    }

    out
}

fn format_stats_line(label: &str, stats: Option<&ReturnStats>) -> String {
    match stats {
        Some(s) => format!(
            "   {label:<18} n={:<4} mean={:>7.2}% median={:>7.2}% min={:>7.2}% max={:>7.2}%\n",
            s.n, s.mean, s.median, s.min, s.max
        ),
        None => format!("   {label:<18} n=0    (no usable returns)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RateBucket;
    use crate::report::summary::{BucketCounts, MonthlyCount, ReturnSummary};

    #[test]
    fn empty_report_says_so() {
        let text = format_summary(&AnalysisReport::default(), &ReturnWindows::default());
        assert!(text.contains("No data available."));
        assert!(text.contains("Day 0 -> Day 5"));
        assert!(text.contains("n=0    (no usable returns)"));
        assert!(text.contains("No filings aggregated by month."));
    }

    #[test]
    fn populated_report_lists_buckets_and_months() {
        let mut buckets = BucketCounts::default();
        buckets.add(RateBucket::Medium);
        buckets.add(RateBucket::High);

        let report = AnalysisReport {
            filings_total: 3,
            buckets,
            returns: ReturnSummary {
                window_a: ReturnStats::from_values(&[2.0, 4.0]),
                window_b: None,
            },
            monthly: vec![MonthlyCount {
                year_month: "2024-01".to_string(),
                count: 3,
            }],
            ..AnalysisReport::default()
        };

        let text = format_summary(&report, &ReturnWindows::default());
        assert!(text.contains("Medium (2-4%)"));
        assert!(text.contains("(50.0%)"));
        assert!(text.contains("Total filings considered: 2"));
        assert!(text.contains("mean=   3.00%"));
        assert!(text.contains("- 2024-01: 3 filings"));
    }
}
