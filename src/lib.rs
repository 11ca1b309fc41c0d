//! Period revenue aggregation.
//!
//! Normalizes period-labelled rows (`MTD (Jun 2025)`, `QTD (Q2 2025)`,
//! `YTD (2025)`) grouped by service type, selects one reporting window and
//! totals it per service type and overall.
//!
//! ```
//! use proceed_report::reports::{aggregate_by_service_type, filter_by_period, grand_total, normalize};
//! use proceed_report::types::{PeriodData, PeriodFilter, RawPeriodRecord};
//!
//! let mut data = PeriodData::new();
//! data.push("Transportation", RawPeriodRecord::new("YTD (2025)").with_figures(100.0, 50.0, 30.0, 20.0));
//! data.push("Warehousing", RawPeriodRecord::new("YTD (2025)").with_figures(300.0, 300.0, 200.0, 100.0));
//!
//! let records = normalize(&data);
//! let selected = filter_by_period(&records, &PeriodFilter::ytd(2025));
//! let totals = aggregate_by_service_type(&selected);
//! let total = grand_total(&totals);
//! assert_eq!(total.achievement_pct, 87.5);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod period;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
