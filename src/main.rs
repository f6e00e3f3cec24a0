use std::time::Duration;

use clap::Parser;
use console::style;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};

use sentinelx::anomaly;
use sentinelx::cli::Args;
use sentinelx::export::AnalysisSummary;
use sentinelx::report::{self, ReportSpec};
use sentinelx::session::{AnalysisSession, AnalysisSettings};
use sentinelx::stats;
use sentinelx::threat_intel::IntelDatabase;
use sentinelx::{SentinelError, SentinelResult};

fn banner(quiet: bool) {
    if quiet {
        return;
    }
    println!();
    println!("    {}", style("SENTINEL-X").cyan().bold());
    println!(
        "    {}",
        style("Security data analysis & reporting").dim()
    );
    println!();
}

fn main() {
    let args = Args::parse();

    // Map verbosity flags onto the log filter.
    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::debug!("Sentinel-X starting with args: {:?}", args);

    if let Err(err) = run(&args) {
        if err.is_blocked_state() {
            eprintln!("    {} {}", style("⚠").yellow().bold(), style(&err).yellow());
        } else {
            eprintln!(
                "    {} {}",
                style("✗").red().bold(),
                style(format!("Report generation failed: {err}")).red()
            );
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> SentinelResult<()> {
    banner(args.quiet);

    let mut session = AnalysisSession::new(AnalysisSettings {
        threshold: args.threshold,
        anomaly_column: args.anomaly_column.clone(),
    });
    session.load_paths(&args.files);

    for failure in session.failures() {
        eprintln!(
            "    {} {}",
            style("⚠").yellow().bold(),
            style(format!("{}: {}", failure.name, failure.message)).yellow()
        );
    }

    let mut dataset = session.active_dataset()?;

    if !args.quiet {
        println!(
            "    {} {} records, {} columns, {} missing cells ({} file(s))",
            style("▶").green(),
            style(dataset.row_count()).bold(),
            dataset.column_count(),
            dataset.missing_total(),
            session.selected_names().len()
        );
    }

    let summaries = stats::describe_all(&dataset);
    if !args.quiet && !summaries.is_empty() {
        println!();
        println!(
            "    {:<18} {:>8} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std Dev", "Min", "Max"
        );
        for s in &summaries {
            println!(
                "    {:<18} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
                truncate(&s.column, 18),
                s.count,
                s.mean,
                s.std_dev,
                s.min,
                s.max
            );
        }
        println!();
    }

    // Anomaly scan on the configured column, or the first numeric one.
    let target_column = args.anomaly_column.clone().or_else(|| {
        dataset
            .numeric_columns()
            .first()
            .map(|c| c.name().to_string())
    });
    let scan = match target_column {
        Some(name) => match anomaly::scan_column(&dataset, &name, args.threshold) {
            Ok(scan) => {
                dataset.insert_numeric("z_score", scan.z_scores.clone())?;
                if !args.quiet {
                    println!(
                        "    {} Anomalies in '{}' (|z| > {}): {}",
                        style("▶").green(),
                        name,
                        args.threshold,
                        style(scan.hits.len()).bold()
                    );
                    for hit in report::ranked(&scan.hits).iter().take(5) {
                        println!(
                            "      row {:>6}  value {:>12.2}  z {:>7.2}",
                            hit.index, hit.value, hit.z_score
                        );
                    }
                }
                Some(scan)
            }
            Err(SentinelError::Anomaly { column, source }) => {
                if !args.quiet {
                    println!(
                        "    {} Anomaly detection not applicable for '{}': {}",
                        style("⚠").yellow(),
                        column,
                        source
                    );
                }
                None
            }
            Err(other) => return Err(other),
        },
        None => {
            log::info!("No numeric columns; skipping anomaly detection");
            None
        }
    };

    let intel_matches = IntelDatabase::new().match_dataset(&dataset);
    if !args.quiet && !intel_matches.is_empty() {
        println!(
            "    {} Sample IoC matches: {}",
            style("▶").green(),
            style(intel_matches.len()).bold()
        );
    }

    if !args.no_pdf {
        let mut spec = ReportSpec::new(args.title.clone())
            .with_sections(args.effective_sections())
            .with_sources(session.selected_names())
            .with_anomaly_column(args.anomaly_column.clone())
            .with_threshold(args.threshold);
        spec.author = args.author.clone();
        spec.classification = args.classification.clone();

        let spinner = if args.quiet {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("    {spinner:.green} {msg}")
                    .map_err(|e| SentinelError::external("progress template", e.to_string()))?,
            );
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message("Generating report...");
            spinner
        };

        let result = report::compile(&dataset, &spec);
        spinner.finish_and_clear();
        let bytes = result?;

        let output_path = args.output_dir.join(spec.output_file_name());
        std::fs::write(&output_path, &bytes)
            .map_err(|e| SentinelError::io(e, Some(output_path.clone())))?;

        if !args.quiet {
            println!(
                "    {} Report written: {} ({:.1} KB)",
                style("✓").green().bold(),
                style(output_path.display()).bold(),
                bytes.len() as f64 / 1024.0
            );
        }
    }

    if let Some(path) = &args.export_json {
        let summary =
            AnalysisSummary::build(&dataset, session.selected_names(), scan, intel_matches);
        summary.write_json(path)?;
        if !args.quiet {
            println!(
                "    {} Summary exported: {}",
                style("✓").green().bold(),
                style(path.display()).bold()
            );
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
