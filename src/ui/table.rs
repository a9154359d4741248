//! Plain-text tables for the terminal.

use std::collections::BTreeSet;

use crate::domain::{
    AgentCostBreakdown, CalculationResult, ComponentStatus, CostCategory, CostComponent,
    ValidityReport, ValidityStatus,
};
use crate::util::dates::format_date;

pub fn render_result(result: &CalculationResult) -> String {
    let mut out = format!("Reference date: {}\n", format_date(result.reference_date));

    if !result.is_route_available() {
        out.push_str("no route available\n");
        push_warnings(&mut out, result);
        return out;
    }

    let categories: BTreeSet<&CostCategory> = result
        .breakdowns
        .iter()
        .flat_map(|b| b.components.iter().map(|c| &c.category))
        .collect();

    let mut headers = vec!["#".to_string(), "Route".to_string(), "Sea".to_string()];
    headers.extend(categories.iter().map(|c| c.label()));
    headers.push("Total".to_string());
    headers.push("Status".to_string());

    let rows: Vec<Vec<String>> = result
        .breakdowns
        .iter()
        .enumerate()
        .map(|(idx, breakdown)| {
            let mut row = vec![
                (idx + 1).to_string(),
                breakdown.route_label(),
                breakdown.sea_label(),
            ];
            row.extend(
                categories
                    .iter()
                    .map(|category| format_cell(breakdown.component(category))),
            );
            row.push(format_amount(breakdown.total));
            row.push(status_text(breakdown).to_string());
            row
        })
        .collect();

    out.push_str(&render_rows(&headers, &rows));

    if let Some(best) = &result.best {
        out.push_str(&format!(
            "\nBest: {} via {} = {}\n",
            best.route_label(),
            best.sea_label(),
            format_amount(best.total)
        ));
    }

    push_warnings(&mut out, result);
    out
}

pub fn render_report(report: &ValidityReport) -> String {
    let mut out = format!(
        "Reference date: {} (expiring within {} days)\n",
        format_date(report.reference_date),
        report.expiring_within_days
    );

    let summary: Vec<String> = report
        .counts
        .iter()
        .map(|(status, count)| format!("{} {}", count, status.label()))
        .collect();
    if summary.is_empty() {
        out.push_str("snapshot is empty\n");
        return out;
    }
    out.push_str(&summary.join(", "));
    out.push('\n');

    if report.is_clean() {
        out.push_str("all rates valid\n");
        return out;
    }

    let headers = ["Table", "Id", "Version", "Valid from", "Valid to", "Status"]
        .map(String::from)
        .to_vec();
    let rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .map(|entry| {
            let status = match (entry.status, entry.days_remaining) {
                (ValidityStatus::Active, Some(days)) => format!("expires in {days}d"),
                (status, _) => status.label().to_string(),
            };
            vec![
                entry.table.table_name().to_string(),
                entry.record_id.clone(),
                entry.version.to_string(),
                format_date(entry.valid_from),
                format_date(entry.valid_to),
                status,
            ]
        })
        .collect();

    out.push('\n');
    out.push_str(&render_rows(&headers, &rows));
    out
}

fn push_warnings(out: &mut String, result: &CalculationResult) {
    if result.warnings.is_empty() {
        return;
    }
    out.push_str("\nWarnings:\n");
    for message in result.warning_messages() {
        out.push_str(&format!("  - {message}\n"));
    }
}

fn status_text(breakdown: &AgentCostBreakdown) -> &'static str {
    if breakdown.expired {
        "EXPIRED"
    } else {
        "ok"
    }
}

fn format_cell(component: Option<&CostComponent>) -> String {
    let Some(component) = component else {
        return String::new();
    };
    match (component.status, component.amount) {
        (ComponentStatus::Applied, Some(amount)) => format_amount(amount),
        (ComponentStatus::Excluded, Some(amount)) => format!("({}) excl", format_amount(amount)),
        (ComponentStatus::Excluded, None) => "excl".to_string(),
        (ComponentStatus::Missing, _) => "missing".to_string(),
        (ComponentStatus::Absent, _) => "n/a".to_string(),
        _ => "-".to_string(),
    }
}

/// Two decimals with thousands separators.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if value < 0.0 && value.abs() >= 0.005 {
        format!("-{grouped}.{fraction}")
    } else {
        format!("{grouped}.{fraction}")
    }
}

fn render_rows(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}
