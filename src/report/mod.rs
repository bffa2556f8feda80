//! Reporting: aggregation of stored data and formatted output.

pub mod format;
pub mod summary;

pub use format::format_summary;
pub use summary::{
    AnalysisInput, AnalysisReport, BucketCounts, BucketShare, FilingWindowReturn, MonthlyCount, ReturnStats,
    ReturnSummary, build_report, bucket_filings, monthly_counts, summarize_returns, whole_window_returns,
};
