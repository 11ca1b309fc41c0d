use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One row of a period breakdown as delivered by the dashboard export.
///
/// Numeric fields are optional because upstream exports leave cells blank;
/// the aggregator treats a missing value as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPeriodRecord {
    #[serde(rename = "Period", default)]
    pub period_label: String,
    #[serde(rename = "Target", default)]
    pub target: Option<f64>,
    #[serde(rename = "Revenue", default)]
    pub revenue: Option<f64>,
    #[serde(rename = "Cost", default)]
    pub cost: Option<f64>,
    #[serde(rename = "Achievement %", default)]
    pub achievement_pct: Option<f64>,
    #[serde(rename = "Gross Profit", default)]
    pub gross_profit: Option<f64>,
    #[serde(rename = "Gross Profit %", default)]
    pub gross_profit_pct: Option<f64>,
}

impl RawPeriodRecord {
    pub fn new(period_label: impl Into<String>) -> Self {
        Self {
            period_label: period_label.into(),
            ..Self::default()
        }
    }

    pub fn with_figures(mut self, target: f64, revenue: f64, cost: f64, gross_profit: f64) -> Self {
        self.target = Some(target);
        self.revenue = Some(revenue);
        self.cost = Some(cost);
        self.gross_profit = Some(gross_profit);
        self
    }
}

/// Period records grouped by service type, in the order service types were
/// first supplied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodData {
    services: Vec<(String, Vec<RawPeriodRecord>)>,
}

impl PeriodData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to `service_type`, creating the group on first use.
    pub fn push(&mut self, service_type: &str, record: RawPeriodRecord) {
        match self.services.iter_mut().find(|(name, _)| name == service_type) {
            Some((_, records)) => records.push(record),
            None => self.services.push((service_type.to_string(), vec![record])),
        }
    }

    /// Add a whole group. Records for an already known service type are
    /// appended to the existing group.
    pub fn extend_service(&mut self, service_type: &str, records: Vec<RawPeriodRecord>) {
        match self.services.iter_mut().find(|(name, _)| name == service_type) {
            Some((_, existing)) => existing.extend(records),
            None => self.services.push((service_type.to_string(), records)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawPeriodRecord])> {
        self.services
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn total_rows(&self) -> usize {
        self.services.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<RawPeriodRecord>)> for PeriodData {
    fn from_iter<I: IntoIterator<Item = (S, Vec<RawPeriodRecord>)>>(iter: I) -> Self {
        let mut data = PeriodData::new();
        for (name, records) in iter {
            let name: String = name.into();
            data.extend_service(&name, records);
        }
        data
    }
}

/// Fiscal reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodKind {
    Mtd,
    Qtd,
    Ytd,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Mtd => "MTD",
            PeriodKind::Qtd => "QTD",
            PeriodKind::Ytd => "YTD",
        }
    }

    /// Exact, case-sensitive token match as it appears in period labels.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "MTD" => Some(PeriodKind::Mtd),
            "QTD" => Some(PeriodKind::Qtd),
            "YTD" => Some(PeriodKind::Ytd),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record whose period label has been parsed.
///
/// `month` is only ever set for MTD records and `quarter` only for QTD
/// records. Either may be unset when the label detail was not recognised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub service_type: String,
    pub period_kind: PeriodKind,
    pub year: i32,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
    pub target: Option<f64>,
    pub revenue: Option<f64>,
    pub cost: Option<f64>,
    pub achievement_pct: Option<f64>,
    pub gross_profit: Option<f64>,
    pub gross_profit_pct: Option<f64>,
}

/// A month or quarter selector: a specific value, or every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(u32),
}

impl Selection {
    pub fn accepts(&self, value: Option<u32>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(*wanted),
        }
    }
}

/// Which window a filter selects. `Other` carries a period kind the
/// aggregator does not know; it matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPeriod {
    Mtd(Selection),
    Qtd(Selection),
    Ytd,
    Other(String),
}

impl FilterPeriod {
    pub fn kind(&self) -> Option<PeriodKind> {
        match self {
            FilterPeriod::Mtd(_) => Some(PeriodKind::Mtd),
            FilterPeriod::Qtd(_) => Some(PeriodKind::Qtd),
            FilterPeriod::Ytd => Some(PeriodKind::Ytd),
            FilterPeriod::Other(_) => None,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            FilterPeriod::Other(token) => token,
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub period: FilterPeriod,
    pub year: i32,
}

impl PeriodFilter {
    pub fn mtd(year: i32, month: Selection) -> Self {
        Self { period: FilterPeriod::Mtd(month), year }
    }

    pub fn qtd(year: i32, quarter: Selection) -> Self {
        Self { period: FilterPeriod::Qtd(quarter), year }
    }

    pub fn ytd(year: i32) -> Self {
        Self { period: FilterPeriod::Ytd, year }
    }

    pub fn other(year: i32, token: impl Into<String>) -> Self {
        Self { period: FilterPeriod::Other(token.into()), year }
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if record.year != self.year {
            return false;
        }
        match &self.period {
            FilterPeriod::Mtd(month) => {
                record.period_kind == PeriodKind::Mtd && month.accepts(record.month)
            }
            FilterPeriod::Qtd(quarter) => {
                record.period_kind == PeriodKind::Qtd && quarter.accepts(record.quarter)
            }
            FilterPeriod::Ytd => record.period_kind == PeriodKind::Ytd,
            FilterPeriod::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTotal {
    pub service_type: String,
    pub target: f64,
    pub revenue: f64,
    pub cost: f64,
    pub gross_profit: f64,
    pub achievement_pct: f64,
    pub gross_profit_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GrandTotal {
    pub target: f64,
    pub revenue: f64,
    pub cost: f64,
    pub gross_profit: f64,
    pub achievement_pct: f64,
    pub gross_profit_pct: f64,
}

/// A label that could not be parsed during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedLabel {
    pub service_type: String,
    pub period_label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub normalized_rows: usize,
    pub dropped_labels: Vec<DroppedLabel>,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.dropped_labels.len()
    }
}

// Rendered rows for CSV export and console preview. Numbers are already
// formatted so both sinks print the same text.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ServiceTotalRow {
    #[serde(rename = "Service_Type")]
    #[tabled(rename = "Service_Type")]
    pub service_type: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Cost")]
    #[tabled(rename = "Cost")]
    pub cost: String,
    #[serde(rename = "Achievement %")]
    #[tabled(rename = "Achievement %")]
    pub achievement_pct: String,
    #[serde(rename = "Gross Profit")]
    #[tabled(rename = "Gross Profit")]
    pub gross_profit: String,
    #[serde(rename = "Gross Profit %")]
    #[tabled(rename = "Gross Profit %")]
    pub gross_profit_pct: String,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub title: String,
    pub period: String,
    pub year: i32,
    pub month: Option<String>,
    pub quarter: Option<String>,
    pub total_rows: usize,
    pub normalized_rows: usize,
    pub dropped_labels: usize,
    pub matched_rows: usize,
    pub services: Vec<AggregatedTotal>,
    pub grand_total: GrandTotal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: PeriodKind, year: i32, month: Option<u32>, quarter: Option<u32>) -> NormalizedRecord {
        NormalizedRecord {
            service_type: "Transportation".to_string(),
            period_kind: kind,
            year,
            month,
            quarter,
            target: None,
            revenue: None,
            cost: None,
            achievement_pct: None,
            gross_profit: None,
            gross_profit_pct: None,
        }
    }

    #[test]
    fn push_groups_by_first_seen_service() {
        let mut data = PeriodData::new();
        data.push("Warehousing", RawPeriodRecord::new("YTD (2025)"));
        data.push("Transportation", RawPeriodRecord::new("YTD (2025)"));
        data.push("Warehousing", RawPeriodRecord::new("MTD (Jun 2025)"));
        data.extend_service("Transportation", vec![RawPeriodRecord::new("QTD (Q2 2025)")]);

        let groups: Vec<(&str, usize)> = data.iter().map(|(n, r)| (n, r.len())).collect();
        assert_eq!(groups, vec![("Warehousing", 2), ("Transportation", 2)]);
        assert_eq!(data.total_rows(), 4);
        assert!(!data.is_empty());
        assert!(PeriodData::new().is_empty());
    }

    #[test]
    fn year_mismatch_always_excludes() {
        let r = record(PeriodKind::Ytd, 2024, None, None);
        assert!(!PeriodFilter::ytd(2025).matches(&r));
        assert!(PeriodFilter::ytd(2024).matches(&r));
        assert!(!PeriodFilter::mtd(2024, Selection::All).matches(&r));
    }

    #[test]
    fn selections_match_exactly_or_all() {
        let june = record(PeriodKind::Mtd, 2025, Some(6), None);
        assert!(PeriodFilter::mtd(2025, Selection::Only(6)).matches(&june));
        assert!(!PeriodFilter::mtd(2025, Selection::Only(5)).matches(&june));
        assert!(PeriodFilter::mtd(2025, Selection::All).matches(&june));

        let q2 = record(PeriodKind::Qtd, 2025, None, Some(2));
        assert!(PeriodFilter::qtd(2025, Selection::Only(2)).matches(&q2));
        assert!(!PeriodFilter::qtd(2025, Selection::Only(3)).matches(&q2));
        assert!(!PeriodFilter::other(2025, "QTD2").matches(&q2));
    }

    #[test]
    fn raw_record_json_names() {
        let raw: RawPeriodRecord = serde_json::from_str(
            r#"{"Period": "YTD (2025)", "Target": 10, "Gross Profit %": 12.5}"#,
        )
        .unwrap();
        assert_eq!(raw.period_label, "YTD (2025)");
        assert_eq!(raw.target, Some(10.0));
        assert_eq!(raw.revenue, None);
        assert_eq!(raw.gross_profit_pct, Some(12.5));
    }
}
