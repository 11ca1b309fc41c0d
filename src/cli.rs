// Command-line interface argument parsing.

use crate::error::{ReportError, Result};
use crate::loader::InputFormat;
use crate::period::{parse_month_selection, parse_quarter_selection};
use crate::types::{PeriodFilter, Selection};
use clap::Parser;
use std::path::PathBuf;

/// Period revenue report by service type
///
/// Reads a period breakdown (JSON keyed by service type, or flat CSV),
/// selects one MTD/QTD/YTD window and prints totals per service type plus
/// a grand total.
///
/// Examples:
///   proceed_report --input periods.json --period ytd --year 2025
///   proceed_report --input periods.csv --period mtd --month Jun
///   proceed_report --input periods.json --period qtd --quarter all --no-export
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Period breakdown file to read
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PROCEED_INPUT",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Input format; inferred from the file extension by default
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<InputFormat>,

    /// Period window: mtd, qtd or ytd
    ///
    /// Any other value is accepted and selects nothing.
    #[arg(short, long, default_value = "ytd")]
    pub period: String,

    /// Fiscal year; defaults to the latest year in the data
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Month for MTD: 1-12, Jan-Dec, or "all" (default)
    #[arg(long)]
    pub month: Option<String>,

    /// Quarter for QTD: 1-4, Q1-Q4, or "all" (default)
    #[arg(long)]
    pub quarter: Option<String>,

    /// Directory for service_totals.csv and summary.json
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the report without writing export files
    #[arg(long)]
    pub no_export: bool,

    /// Maximum rows in the console preview
    #[arg(long, value_name = "COUNT")]
    pub preview_rows: Option<usize>,

    /// Path to configuration file (default: .proceed-report.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default .proceed-report.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default tracing directive for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    pub fn validate(&self) -> Result<()> {
        let period = self.period.to_ascii_lowercase();
        if self.month.is_some() && period != "mtd" {
            return Err(ReportError::InvalidArgument(
                "--month only applies to --period mtd".to_string(),
            ));
        }
        if self.quarter.is_some() && period != "qtd" {
            return Err(ReportError::InvalidArgument(
                "--quarter only applies to --period qtd".to_string(),
            ));
        }
        if let Some(0) = self.preview_rows {
            return Err(ReportError::InvalidArgument(
                "--preview-rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the period filter for `year`. A missing month or quarter
    /// selects all of them.
    pub fn to_filter(&self, year: i32) -> Result<PeriodFilter> {
        match self.period.to_ascii_lowercase().as_str() {
            "mtd" => {
                let month = match self.month.as_deref() {
                    Some(m) => parse_month_selection(m).ok_or_else(|| {
                        ReportError::InvalidArgument(format!("invalid month: {}", m))
                    })?,
                    None => Selection::All,
                };
                Ok(PeriodFilter::mtd(year, month))
            }
            "qtd" => {
                let quarter = match self.quarter.as_deref() {
                    Some(q) => parse_quarter_selection(q).ok_or_else(|| {
                        ReportError::InvalidArgument(format!("invalid quarter: {}", q))
                    })?,
                    None => Selection::All,
                };
                Ok(PeriodFilter::qtd(year, quarter))
            }
            "ytd" => Ok(PeriodFilter::ytd(year)),
            _ => Ok(PeriodFilter::other(year, self.period.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterPeriod;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["proceed_report"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_to_ytd_and_info() {
        let args = parse(&["--input", "periods.json"]);
        assert_eq!(args.period, "ytd");
        assert_eq!(args.log_level(), "info");
        assert_eq!(args.to_filter(2025).unwrap(), PeriodFilter::ytd(2025));
    }

    #[test]
    fn builds_month_and_quarter_filters() {
        let args = parse(&["-i", "p.json", "--period", "MTD", "--month", "Jun"]);
        args.validate().unwrap();
        assert_eq!(
            args.to_filter(2025).unwrap(),
            PeriodFilter::mtd(2025, Selection::Only(6))
        );

        let args = parse(&["-i", "p.json", "--period", "qtd"]);
        assert_eq!(
            args.to_filter(2024).unwrap(),
            PeriodFilter::qtd(2024, Selection::All)
        );
    }

    #[test]
    fn unknown_period_is_kept() {
        let args = parse(&["-i", "p.json", "--period", "wtd"]);
        let filter = args.to_filter(2025).unwrap();
        assert_eq!(filter.period, FilterPeriod::Other("wtd".to_string()));
    }

    #[test]
    fn rejects_mismatched_selectors() {
        assert!(parse(&["-i", "p.json", "--month", "Jun"]).validate().is_err());
        assert!(parse(&["-i", "p.json", "-p", "mtd", "--quarter", "2"]).validate().is_err());
        assert!(parse(&["-i", "p.json", "-p", "mtd", "--month", "Juno"])
            .to_filter(2025)
            .is_err());
    }

    #[test]
    fn input_required_unless_init_config() {
        assert!(Args::try_parse_from(["proceed_report"]).is_err()
            || std::env::var_os("PROCEED_INPUT").is_some());
        assert!(Args::try_parse_from(["proceed_report", "--init-config"]).is_ok());
        assert!(Args::try_parse_from(["proceed_report", "-i", "x.json", "-v", "-q"]).is_err());
    }
}
