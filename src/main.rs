// Entry point and high-level CLI flow.
//
// Load the period breakdown, normalize and filter it to the requested
// window, print the per-service totals and export them.
use chrono::{Datelike, Local};
use clap::Parser;
use proceed_report::cli::Args;
use proceed_report::config::{Config, DEFAULT_CONFIG_FILE};
use proceed_report::loader;
use proceed_report::output;
use proceed_report::reports::{self, Report};
use proceed_report::util::format_int;
use proceed_report::{ReportError, Result};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        return Err(ReportError::InvalidArgument(format!(
            "{} already exists; remove it first or edit it manually",
            DEFAULT_CONFIG_FILE
        )));
    }
    std::fs::write(path, Config::default_toml()?)?;
    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    args.validate()?;
    let config = Config::load(args.config.as_deref())?;
    debug!("Config: {:?}", config);

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| ReportError::InvalidArgument("--input is required".to_string()))?;
    let format = args.format.unwrap_or(config.input.format);

    let (data, load_report) = loader::load_period_data(input, format)?;
    info!(
        "Loaded {} rows for {} service types from {}",
        format_int(load_report.loaded_rows),
        load_report.services,
        input.display()
    );
    if load_report.skipped_rows > 0 {
        warn!(
            "{} rows skipped due to parse/validation errors",
            format_int(load_report.skipped_rows)
        );
    }

    let (records, normalize_report) = reports::normalize_with_report(&data);
    for dropped in &normalize_report.dropped_labels {
        warn!(
            "Dropped row with unrecognised period label {:?} ({})",
            dropped.period_label, dropped.service_type
        );
    }

    let year = match args.year {
        Some(y) => y,
        None => reports::available_years(&records)
            .last()
            .copied()
            .unwrap_or_else(|| Local::now().year()),
    };
    let filter = args.to_filter(year)?;
    if filter.period.kind().is_none() {
        warn!("Unknown period {:?}; nothing will match", filter.period.token());
    }

    let report = reports::build_report_from(&records, normalize_report, &filter);
    info!(
        "{}: {} of {} normalized rows matched",
        filter.title(),
        format_int(report.matched_rows),
        format_int(report.normalize.normalized_rows)
    );

    print_and_export(&args, &config, &report)
}

fn print_and_export(args: &Args, config: &Config, report: &Report) -> Result<()> {
    let decimals = config.report.decimals;
    let preview_rows = args.preview_rows.unwrap_or(config.report.preview_rows);
    let rows = output::service_rows(&report.totals, &report.grand_total, decimals);

    let title = format!("Revenue by Service Type: {}", report.filter.title());
    let note = format!(
        "{} service types, {} matched rows",
        report.totals.len(),
        format_int(report.matched_rows)
    );
    // Keep the Total row visible even when the preview is truncated.
    if rows.len() > preview_rows {
        let mut shown: Vec<_> = rows.iter().take(preview_rows.saturating_sub(1)).cloned().collect();
        shown.extend(rows.last().cloned());
        output::preview_table(&title, Some(&note), &shown, preview_rows);
    } else {
        output::preview_table(&title, Some(&note), &rows, preview_rows);
    }

    if args.no_export {
        return Ok(());
    }

    let out_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.report.output_dir.clone());
    std::fs::create_dir_all(&out_dir)?;

    let csv_path = out_dir.join("service_totals.csv");
    output::write_csv(&csv_path, &rows)?;
    let json_path = out_dir.join("summary.json");
    output::write_json(&json_path, &reports::generate_summary(report))?;
    info!(
        "Exported {} and {}",
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);
    info!("proceed_report v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        error!("Report failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
