use crate::error::{ReportError, Result};
use crate::types::{PeriodData, RawPeriodRecord};
use crate::util::parse_f64_safe;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Pick by file extension
    #[default]
    Auto,
    /// Object keyed by service type, each holding a list of period rows
    Json,
    /// Flat rows with a `Service_Type` column
    Csv,
}

impl InputFormat {
    pub fn resolve(self, path: &Path) -> Result<InputFormat> {
        if self != InputFormat::Auto {
            return Ok(self);
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(ReportError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub services: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Service_Type", alias = "Service Type")]
    service_type: Option<String>,
    #[serde(rename = "Period")]
    period: Option<String>,
    #[serde(rename = "Target")]
    target: Option<String>,
    #[serde(rename = "Revenue")]
    revenue: Option<String>,
    #[serde(rename = "Cost")]
    cost: Option<String>,
    #[serde(rename = "Achievement %", default)]
    achievement_pct: Option<String>,
    #[serde(rename = "Gross Profit")]
    gross_profit: Option<String>,
    #[serde(rename = "Gross Profit %", default)]
    gross_profit_pct: Option<String>,
}

pub fn load_period_data(path: &Path, format: InputFormat) -> Result<(PeriodData, LoadReport)> {
    let format = format.resolve(path)?;
    debug!("Reading {} as {:?}", path.display(), format);
    match format {
        InputFormat::Json => {
            let text = std::fs::read_to_string(path)?;
            let data = parse_json(&text)?;
            let report = LoadReport {
                total_rows: data.total_rows(),
                loaded_rows: data.total_rows(),
                skipped_rows: 0,
                services: data.service_count(),
            };
            Ok((data, report))
        }
        InputFormat::Csv => {
            let file = std::fs::File::open(path)?;
            read_csv(file)
        }
        InputFormat::Auto => Err(ReportError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a period breakdown object: `{"<service type>": [ {"Period": ..}, .. ]}`.
/// Service types keep their document order.
pub fn parse_json(text: &str) -> Result<PeriodData> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Object(services) = value else {
        return Err(ReportError::InvalidData(
            "top level must be an object keyed by service type".to_string(),
        ));
    };

    let mut data = PeriodData::new();
    for (service_type, rows) in services {
        let records: Vec<RawPeriodRecord> = serde_json::from_value(rows)?;
        debug!("{}: {} period rows", service_type, records.len());
        data.extend_service(&service_type, records);
    }
    Ok(data)
}

/// Read flat CSV rows. Rows that fail to deserialize or carry no service
/// type are skipped and counted; blank or non-numeric cells become missing
/// figures.
pub fn read_csv<R: Read>(reader: R) -> Result<(PeriodData, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut data = PeriodData::new();
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;

    for result in rdr.deserialize::<CsvRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping CSV row {}: {}", total_rows, e);
                skipped_rows += 1;
                continue;
            }
        };
        let service_type = match row.service_type.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        let record = RawPeriodRecord {
            period_label: row.period.unwrap_or_default().trim().to_string(),
            target: parse_f64_safe(row.target.as_deref()),
            revenue: parse_f64_safe(row.revenue.as_deref()),
            cost: parse_f64_safe(row.cost.as_deref()),
            achievement_pct: parse_f64_safe(row.achievement_pct.as_deref()),
            gross_profit: parse_f64_safe(row.gross_profit.as_deref()),
            gross_profit_pct: parse_f64_safe(row.gross_profit_pct.as_deref()),
        };
        data.push(&service_type, record);
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: data.total_rows(),
        skipped_rows,
        services: data.service_count(),
    };
    Ok((data, report))
}
