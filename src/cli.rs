use clap::Parser;
use std::path::PathBuf;

use crate::report::Section;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sentinelx",
    about = "Sentinel-X - security event data analysis and reporting tool",
    version
)]
pub struct Args {
    /// Input event files (CSV, spreadsheet, or JSON)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Report sections to include (defaults to overview, statistics, visualizations)
    #[arg(short, long, value_delimiter = ',')]
    pub sections: Vec<Section>,

    /// Report title, also used for the output file name
    #[arg(long, default_value = "SOC Data Analysis Report")]
    pub title: String,

    /// Report author line
    #[arg(long)]
    pub author: Option<String>,

    /// Report classification line (e.g. TLP:AMBER)
    #[arg(long)]
    pub classification: Option<String>,

    /// Column to run anomaly detection on (first numeric column if omitted)
    #[arg(short = 'c', long)]
    pub anomaly_column: Option<String>,

    /// Anomaly threshold (z-score magnitude)
    #[arg(short, long, default_value = "3.0")]
    pub threshold: f64,

    /// Directory the PDF report is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also export the analysis summary as JSON to this path
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Skip PDF generation (terminal summary and JSON export only)
    #[arg(long)]
    pub no_pdf: bool,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide progress output and log errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Effective section selection; the dashboard's default set when the
    /// flag was omitted.
    pub fn effective_sections(&self) -> Vec<Section> {
        if self.sections.is_empty() {
            Section::DEFAULT.to_vec()
        } else {
            self.sections.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::parse_from(["sentinelx", "events.csv"]);
        assert_eq!(args.files.len(), 1);
        assert_eq!(args.threshold, 3.0);
        assert_eq!(args.effective_sections(), Section::DEFAULT.to_vec());
        assert!(!args.no_pdf);
    }

    #[test]
    fn test_parse_sections_list() {
        let args = Args::parse_from([
            "sentinelx",
            "events.csv",
            "--sections",
            "anomalies,threat-intel,data-sample",
            "--threshold",
            "2.5",
        ]);
        assert_eq!(
            args.effective_sections(),
            vec![Section::Anomalies, Section::ThreatIntel, Section::DataSample]
        );
        assert_eq!(args.threshold, 2.5);
    }

    #[test]
    fn test_requires_input_files() {
        assert!(Args::try_parse_from(["sentinelx"]).is_err());
    }
}
