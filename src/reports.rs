// Period aggregation: normalize labelled rows, select a period, total the
// selection per service type and across all service types.
//
// Every function here is pure. Ratios are always recomputed from summed
// figures, never averaged.
use crate::period::parse_period_label;
use crate::types::{
    AggregatedTotal, DroppedLabel, FilterPeriod, GrandTotal, NormalizeReport, NormalizedRecord,
    PeriodData, PeriodFilter, ReportSummary, Selection,
};
use crate::util::percentage;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};

/// Parse every row's period label. Rows whose label does not parse are
/// left out.
pub fn normalize(data: &PeriodData) -> Vec<NormalizedRecord> {
    normalize_with_report(data).0
}

/// Like [`normalize`], but also reports which labels were dropped.
pub fn normalize_with_report(data: &PeriodData) -> (Vec<NormalizedRecord>, NormalizeReport) {
    let mut records = Vec::with_capacity(data.total_rows());
    let mut report = NormalizeReport::default();

    for (service_type, rows) in data.iter() {
        for row in rows {
            report.total_rows += 1;
            let Some(parsed) = parse_period_label(&row.period_label) else {
                report.dropped_labels.push(DroppedLabel {
                    service_type: service_type.to_string(),
                    period_label: row.period_label.clone(),
                });
                continue;
            };
            records.push(NormalizedRecord {
                service_type: service_type.to_string(),
                period_kind: parsed.kind,
                year: parsed.year,
                month: parsed.month,
                quarter: parsed.quarter,
                target: row.target,
                revenue: row.revenue,
                cost: row.cost,
                achievement_pct: row.achievement_pct,
                gross_profit: row.gross_profit,
                gross_profit_pct: row.gross_profit_pct,
            });
        }
    }

    report.normalized_rows = records.len();
    (records, report)
}

/// Records matching `filter`, in their original order.
pub fn filter_by_period(records: &[NormalizedRecord], filter: &PeriodFilter) -> Vec<NormalizedRecord> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Sum figures per service type, in first-seen order.
pub fn aggregate_by_service_type(records: &[NormalizedRecord]) -> Vec<AggregatedTotal> {
    #[derive(Default)]
    struct Acc {
        service_type: String,
        target: f64,
        revenue: f64,
        cost: f64,
        gross_profit: f64,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();
    for r in records {
        let idx = *index.entry(r.service_type.as_str()).or_insert_with(|| {
            groups.push(Acc {
                service_type: r.service_type.clone(),
                ..Acc::default()
            });
            groups.len() - 1
        });
        let e = &mut groups[idx];
        e.target += r.target.unwrap_or(0.0);
        e.revenue += r.revenue.unwrap_or(0.0);
        e.cost += r.cost.unwrap_or(0.0);
        e.gross_profit += r.gross_profit.unwrap_or(0.0);
    }

    groups
        .into_iter()
        .map(|acc| AggregatedTotal {
            achievement_pct: percentage(acc.revenue, acc.target),
            gross_profit_pct: percentage(acc.gross_profit, acc.revenue),
            service_type: acc.service_type,
            target: acc.target,
            revenue: acc.revenue,
            cost: acc.cost,
            gross_profit: acc.gross_profit,
        })
        .collect()
}

pub fn grand_total(totals: &[AggregatedTotal]) -> GrandTotal {
    let mut total = GrandTotal::default();
    for t in totals {
        total.target += t.target;
        total.revenue += t.revenue;
        total.cost += t.cost;
        total.gross_profit += t.gross_profit;
    }
    total.achievement_pct = percentage(total.revenue, total.target);
    total.gross_profit_pct = percentage(total.gross_profit, total.revenue);
    total
}

/// Distinct years present in `records`, ascending.
pub fn available_years(records: &[NormalizedRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Result of running the whole pipeline for one period selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub filter: PeriodFilter,
    pub normalize: NormalizeReport,
    pub matched_rows: usize,
    pub totals: Vec<AggregatedTotal>,
    pub grand_total: GrandTotal,
}

pub fn build_report(data: &PeriodData, filter: &PeriodFilter) -> Report {
    let (records, normalize) = normalize_with_report(data);
    build_report_from(&records, normalize, filter)
}

/// Run filter → aggregate → total over records that were already
/// normalized, e.g. when the caller needed them to pick a default year.
pub fn build_report_from(
    records: &[NormalizedRecord],
    normalize: NormalizeReport,
    filter: &PeriodFilter,
) -> Report {
    let matched = filter_by_period(records, filter);
    let totals = aggregate_by_service_type(&matched);
    let grand_total = grand_total(&totals);
    Report {
        filter: filter.clone(),
        normalize,
        matched_rows: matched.len(),
        totals,
        grand_total,
    }
}

pub fn generate_summary(report: &Report) -> ReportSummary {
    let selection = |s: &Selection| match s {
        Selection::All => "all".to_string(),
        Selection::Only(v) => v.to_string(),
    };
    let (month, quarter) = match &report.filter.period {
        FilterPeriod::Mtd(m) => (Some(selection(m)), None),
        FilterPeriod::Qtd(q) => (None, Some(selection(q))),
        FilterPeriod::Ytd | FilterPeriod::Other(_) => (None, None),
    };
    ReportSummary {
        generated_at: Utc::now(),
        title: report.filter.title(),
        period: report.filter.period.token().to_string(),
        year: report.filter.year,
        month,
        quarter,
        total_rows: report.normalize.total_rows,
        normalized_rows: report.normalize.normalized_rows,
        dropped_labels: report.normalize.dropped(),
        matched_rows: report.matched_rows,
        services: report.totals.clone(),
        grand_total: report.grand_total.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PeriodKind, RawPeriodRecord};

    fn record(service: &str, kind: PeriodKind, year: i32, target: f64, revenue: f64) -> NormalizedRecord {
        NormalizedRecord {
            service_type: service.to_string(),
            period_kind: kind,
            year,
            month: None,
            quarter: None,
            target: Some(target),
            revenue: Some(revenue),
            cost: None,
            achievement_pct: None,
            gross_profit: None,
            gross_profit_pct: None,
        }
    }

    #[test]
    fn normalize_drops_only_unparseable_rows() {
        let mut data = PeriodData::new();
        data.push("Transportation", RawPeriodRecord::new("MTD (Jun 2025)"));
        data.push("Transportation", RawPeriodRecord::new("Unknown Format"));
        data.push("Transportation", RawPeriodRecord::new("MTD 2025"));
        data.push("Warehousing", RawPeriodRecord::new("YTD (2025)"));

        let (records, report) = normalize_with_report(&data);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service_type, "Transportation");
        assert_eq!(records[0].month, Some(6));
        assert_eq!(records[1].service_type, "Warehousing");
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.normalized_rows, 2);
        assert_eq!(report.dropped(), 2);
        assert_eq!(report.dropped_labels[0].period_label, "Unknown Format");
    }

    #[test]
    fn aggregate_keeps_first_seen_order() {
        let records = vec![
            record("B", PeriodKind::Ytd, 2025, 10.0, 5.0),
            record("A", PeriodKind::Ytd, 2025, 20.0, 10.0),
            record("B", PeriodKind::Ytd, 2025, 30.0, 15.0),
        ];
        let totals = aggregate_by_service_type(&records);
        let names: Vec<&str> = totals.iter().map(|t| t.service_type.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(totals[0].target, 40.0);
        assert_eq!(totals[0].revenue, 20.0);
        assert_eq!(totals[0].achievement_pct, 50.0);
    }

    #[test]
    fn missing_figures_count_as_zero() {
        let mut r = record("A", PeriodKind::Ytd, 2025, 0.0, 0.0);
        r.target = None;
        r.revenue = Some(100.0);
        r.gross_profit = Some(25.0);
        let totals = aggregate_by_service_type(&[r]);
        assert_eq!(totals[0].target, 0.0);
        assert_eq!(totals[0].cost, 0.0);
        assert_eq!(totals[0].achievement_pct, 0.0);
        assert_eq!(totals[0].gross_profit_pct, 25.0);
    }

    #[test]
    fn empty_input_gives_empty_totals() {
        assert!(aggregate_by_service_type(&[]).is_empty());
        assert_eq!(grand_total(&[]), GrandTotal::default());
    }

    #[test]
    fn available_years_are_sorted_and_distinct() {
        let records = vec![
            record("A", PeriodKind::Ytd, 2025, 0.0, 0.0),
            record("A", PeriodKind::Mtd, 2024, 0.0, 0.0),
            record("B", PeriodKind::Ytd, 2025, 0.0, 0.0),
        ];
        assert_eq!(available_years(&records), vec![2024, 2025]);
    }

    #[test]
    fn summary_reflects_filter() {
        let mut data = PeriodData::new();
        data.push(
            "Transportation",
            RawPeriodRecord::new("QTD (Q2 2025)").with_figures(100.0, 80.0, 60.0, 20.0),
        );
        data.push("Transportation", RawPeriodRecord::new("bogus"));
        let report = build_report(&data, &PeriodFilter::qtd(2025, Selection::Only(2)));
        let summary = generate_summary(&report);
        assert_eq!(summary.title, "QTD (Q2 2025)");
        assert_eq!(summary.period, "QTD");
        assert_eq!(summary.quarter.as_deref(), Some("2"));
        assert_eq!(summary.month, None);
        assert_eq!(summary.dropped_labels, 1);
        assert_eq!(summary.matched_rows, 1);
        assert!((summary.grand_total.achievement_pct - 80.0).abs() < 1e-9);
    }
}
