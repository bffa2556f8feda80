//! Write the analysis report to disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::AnalysisReport;

/// Write an already formatted summary to a text file.
pub fn write_summary_text(path: &Path, text: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary file '{}': {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write summary file '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the structured report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RateBucket;
    use crate::report::{BucketCounts, MonthlyCount};

    #[test]
    fn json_export_uses_lowercase_bucket_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut buckets = BucketCounts::default();
        buckets.add(RateBucket::Low);
        let report = AnalysisReport {
            filings_total: 1,
            buckets,
            monthly: vec![MonthlyCount {
                year_month: "2022-02".to_string(),
                count: 1,
            }],
            ..AnalysisReport::default()
        };

        write_report_json(&path, &report).unwrap();
        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["buckets"]["counts"]["low"], 1);
        assert_eq!(value["monthly"][0]["year_month"], "2022-02");
    }

    #[test]
    fn summary_text_round_trips_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");
        write_summary_text(&path, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("summary.txt");
        let err = write_summary_text(&path, "x").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
