//! Sentinel-X Security Data Analyzer
//!
//! Ingests tabular security-event data (CSV, spreadsheet, JSON), computes
//! descriptive statistics, flags statistical anomalies by z-score, and
//! compiles a formatted PDF report.

pub mod anomaly;
pub mod charts;
pub mod cli;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod report;
pub mod session;
pub mod stats;
pub mod threat_intel;

pub use errors::{SentinelError, SentinelResult};
pub use session::AnalysisSession;
