//! Console rendering for delta and anomaly results.

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table};
use costblame_core::analytics::{Delta, PercentChange, Severity};
use costblame_core::export::AnomalyReport;
use costblame_core::{Breakdown, TimeWindow};
use tracing::warn;

/// Dollar amount with two decimals.
pub fn money(value: f64) -> String {
    if value < 0.0 { format!("-${:.2}", -value) } else { format!("${:.2}", value) }
}

/// Percent change, or `NEW` for spend that appeared from nothing.
pub fn percent_change(delta: &Delta) -> String {
    match delta.percent() {
        PercentChange::Unbounded => "NEW".to_string(),
        PercentChange::Finite(pct) => format!("{:.1}%", pct),
    }
}

/// Log that the current period's latest data is not final.
pub fn warn_incomplete_today(window: &TimeWindow) {
    warn!(
        current_end = %window.current_end.format("%Y-%m-%d %H:%M"),
        "Current period includes today; costs are not final"
    );
}

/// Heading with the compared periods.
pub fn print_title(title: &str, window: &TimeWindow, breakdown: &Breakdown) {
    println!("{}", title.bold().cyan());
    let mut grouping = breakdown.group_by.to_string();
    if let Some(tag) = &breakdown.tag_key {
        grouping.push_str(&format!(" + tag:{}", tag));
    }
    println!(
        "  {}",
        format!(
            "{} → {} vs {} → {}, by {}",
            window.current_start.format("%Y-%m-%d %H:%M"),
            window.current_end.format("%Y-%m-%d %H:%M"),
            window.prior_start.format("%Y-%m-%d %H:%M"),
            window.prior_end.format("%Y-%m-%d %H:%M"),
            grouping
        )
        .dimmed()
    );
    println!();
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Render the delta table.
pub fn print_delta_table(deltas: &[Delta]) {
    if deltas.is_empty() {
        println!("No cost changes found matching criteria");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Key", "Current", "Prior", "Delta", "Change %", "New?"]);

    for d in deltas {
        let delta_color = if d.absolute_delta > 0.0 {
            Color::Red
        } else if d.absolute_delta < 0.0 {
            Color::Green
        } else {
            Color::Reset
        };

        table.add_row(vec![
            Cell::new(&d.key),
            right(money(d.current_cost)),
            right(money(d.prior_cost)),
            right(money(d.absolute_delta)).fg(delta_color),
            right(percent_change(d)),
            Cell::new(if d.is_new_spender { "✓" } else { "" }).set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{table}");

    let total: f64 = deltas.iter().map(|d| d.absolute_delta).sum();
    println!();
    println!("{} {} rows, net change {}", "✓".green(), deltas.len(), money(total).bold());
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::Magenta,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Reset,
    }
}

/// Render the anomaly table. Severity shows `-` for rows below the threshold.
pub fn print_anomaly_table(report: &AnomalyReport) {
    if report.anomalies.is_empty() {
        println!("No anomalies detected");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Key", "Current", "Mean", "Std Dev", "Z-Score", "Deviation %", "Severity"]);

    for a in &report.anomalies {
        let severity = if a.is_anomaly {
            Cell::new(a.severity.to_string()).fg(severity_color(a.severity))
        } else {
            Cell::new("-")
        };

        table.add_row(vec![
            Cell::new(&a.key),
            right(money(a.current_cost)),
            right(money(a.historical_mean)),
            right(money(a.historical_std_dev)),
            right(format!("{:.2}", a.z_score)),
            right(format!("{:.1}%", a.percent_deviation)),
            severity,
        ]);
    }

    println!("{table}");
    println!();
    println!("{} {} series shown, {} flagged", "✓".green(), report.count, report.flagged);
}
