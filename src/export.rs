//! JSON export of the analysis summary.
//!
//! Serializes the same overview, statistics, anomaly, and threat-intel
//! results that feed the PDF report, for downstream tooling.

use std::path::Path;

use serde::Serialize;

use crate::anomaly::ColumnScan;
use crate::dataset::{ColumnType, Dataset};
use crate::errors::{SentinelError, SentinelResult};
use crate::stats::{self, NumericSummary};
use crate::threat_intel::IntelMatch;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
    pub unique_values: usize,
    pub missing_values: usize,
}

/// Full machine-readable analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub generated_at: String,
    pub sources: Vec<String>,
    pub records: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub column_info: Vec<ColumnInfo>,
    pub numeric_summaries: Vec<NumericSummary>,
    /// Absent when detection was not applicable or not requested.
    pub anomalies: Option<ColumnScan>,
    pub intel_matches: Vec<IntelMatch>,
}

impl AnalysisSummary {
    pub fn build(
        dataset: &Dataset,
        sources: Vec<String>,
        anomalies: Option<ColumnScan>,
        intel_matches: Vec<IntelMatch>,
    ) -> Self {
        let column_info = dataset
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                column_type: c.column_type(),
                unique_values: c.unique_count(),
                missing_values: c.missing_count(),
            })
            .collect();
        Self {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            sources,
            records: dataset.row_count(),
            columns: dataset.column_count(),
            missing_cells: dataset.missing_total(),
            column_info,
            numeric_summaries: stats::describe_all(dataset),
            anomalies,
            intel_matches,
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> SentinelResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SentinelError::external("JSON export", e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| SentinelError::io(e, Some(path.to_path_buf())))?;
        log::info!("Analysis summary exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn test_summary_roundtrip() {
        let ds = Dataset::from_raw(
            vec!["bytes".to_string(), "event_type".to_string()],
            vec![
                vec!["100".to_string(), "login".to_string()],
                vec!["200".to_string(), "logout".to_string()],
            ],
        )
        .unwrap();
        let summary = AnalysisSummary::build(&ds, vec!["events.csv".to_string()], None, vec![]);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.column_info.len(), 2);
        assert_eq!(summary.numeric_summaries.len(), 1);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"event_type\""));
        assert!(json.contains("\"categorical\""));
    }

    #[test]
    fn test_write_json() {
        let ds = Dataset::from_raw(
            vec!["v".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        )
        .unwrap();
        let summary = AnalysisSummary::build(&ds, vec![], None, vec![]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        summary.write_json(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"records\": 2"));
    }
}
