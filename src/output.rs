use crate::error::Result;
use crate::types::{AggregatedTotal, GrandTotal, ServiceTotalRow};
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render per-service totals followed by a `Total` row.
pub fn service_rows(
    totals: &[AggregatedTotal],
    grand: &GrandTotal,
    decimals: usize,
) -> Vec<ServiceTotalRow> {
    let mut rows: Vec<ServiceTotalRow> = totals
        .iter()
        .map(|t| ServiceTotalRow {
            service_type: t.service_type.clone(),
            target: format_number(t.target, decimals),
            revenue: format_number(t.revenue, decimals),
            cost: format_number(t.cost, decimals),
            achievement_pct: format_number(t.achievement_pct, decimals),
            gross_profit: format_number(t.gross_profit, decimals),
            gross_profit_pct: format_number(t.gross_profit_pct, decimals),
        })
        .collect();
    rows.push(ServiceTotalRow {
        service_type: "Total".to_string(),
        target: format_number(grand.target, decimals),
        revenue: format_number(grand.revenue, decimals),
        cost: format_number(grand.cost, decimals),
        achievement_pct: format_number(grand.achievement_pct, decimals),
        gross_profit: format_number(grand.gross_profit, decimals),
        gross_profit_pct: format_number(grand.gross_profit_pct, decimals),
    });
    rows
}

/// Markdown table of the first `max_rows` rows, or `None` if there are none.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}
