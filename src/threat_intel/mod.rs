//! Threat Intelligence Module
//!
//! Matches dataset values against a bundled sample IoC database. The
//! database is static example content, not a live feed; matches are
//! labeled as sample data wherever they are reported.

use regex::Regex;
use serde::Serialize;

use crate::dataset::{Column, ColumnType, Dataset};

/// A dataset value that matched the sample IoC database.
#[derive(Debug, Clone, Serialize)]
pub struct IntelMatch {
    /// Indicator category ("Malicious IP", "Malicious Domain").
    pub indicator_type: String,
    /// The matched value.
    pub value: String,
    /// Column the value was found in.
    pub column: String,
    /// Number of rows carrying the value.
    pub row_count: usize,
    /// Short description from the database entry.
    pub description: String,
}

/// Sample threat-intelligence database.
pub struct IntelDatabase {
    malicious_ips: Vec<(&'static str, &'static str)>,
    malicious_domains: Vec<(&'static str, &'static str)>,
    ipv4: Regex,
}

impl IntelDatabase {
    /// Load the bundled sample database.
    pub fn new() -> Self {
        Self {
            malicious_ips: vec![
                ("185.220.101.1", "Known Tor exit node (sample entry)"),
                ("45.155.205.233", "Reported scanning host (sample entry)"),
                ("91.240.118.172", "Commodity botnet C2 (sample entry)"),
                ("103.94.185.72", "Credential-stuffing source (sample entry)"),
            ],
            malicious_domains: vec![
                ("evil.example.com", "Phishing landing page (sample entry)"),
                ("malware-cdn.example.net", "Payload distribution (sample entry)"),
                ("c2.badsite.example.org", "Beaconing endpoint (sample entry)"),
            ],
            ipv4: Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$").expect("static regex"),
        }
    }

    /// True when a value is a known-bad IP.
    pub fn check_ip(&self, value: &str) -> Option<&'static str> {
        self.malicious_ips
            .iter()
            .find(|(ip, _)| *ip == value)
            .map(|(_, desc)| *desc)
    }

    /// True when a value is (or ends with) a known-bad domain.
    pub fn check_domain(&self, value: &str) -> Option<&'static str> {
        let lower = value.to_ascii_lowercase();
        self.malicious_domains
            .iter()
            .find(|(domain, _)| lower == *domain || lower.ends_with(&format!(".{domain}")))
            .map(|(_, desc)| *desc)
    }

    /// Scan every text-like column of a dataset for IoC matches.
    ///
    /// IP entries are only compared against values shaped like IPv4
    /// addresses; everything else is checked against the domain list.
    pub fn match_dataset(&self, dataset: &Dataset) -> Vec<IntelMatch> {
        let mut matches = Vec::new();
        for column in dataset.columns() {
            if !matches!(
                column.column_type(),
                ColumnType::Text | ColumnType::Categorical
            ) {
                continue;
            }
            matches.extend(self.match_column(column));
        }
        matches
    }

    fn match_column(&self, column: &Column) -> Vec<IntelMatch> {
        let Some(cells) = column.as_text() else {
            return Vec::new();
        };
        let mut counts: std::collections::BTreeMap<&str, usize> =
            std::collections::BTreeMap::new();
        for cell in cells.iter().flatten() {
            *counts.entry(cell.as_str()).or_insert(0) += 1;
        }

        let mut out = Vec::new();
        for (value, row_count) in counts {
            let hit = if self.ipv4.is_match(value) {
                self.check_ip(value).map(|desc| ("Malicious IP", desc))
            } else {
                self.check_domain(value)
                    .map(|desc| ("Malicious Domain", desc))
            };
            if let Some((indicator_type, description)) = hit {
                log::debug!(
                    "IoC match in column '{}': {} ({})",
                    column.name(),
                    value,
                    indicator_type
                );
                out.push(IntelMatch {
                    indicator_type: indicator_type.to_string(),
                    value: value.to_string(),
                    column: column.name().to_string(),
                    row_count,
                    description: description.to_string(),
                });
            }
        }
        out
    }
}

impl Default for IntelDatabase {
    fn default() -> Self {
        Self::new()
    }
}
