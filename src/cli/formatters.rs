//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the valuation itself from its presentation.

use colored::Colorize;
use hindsight::config::Config;
use hindsight::models::PortfolioConfig;
use hindsight::reports::ValuationReport;
use hindsight::utils::{format_percent, format_usd, round_money};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Format a valuation report for JSON output
pub fn format_report_json(report: &ValuationReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a valuation report for terminal output
pub fn format_report_table(report: &ValuationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Portfolio Results\n\n", "📈".cyan().bold()));
    if let Some(start) = report.start_date {
        output.push_str(&format!("{:<20} {}\n", "Start Date:".bold(), start));
    }
    output.push_str(&format!("{:<20} {}\n", "End Date:".bold(), report.end_date));
    output.push_str(&format!(
        "{:<20} {}\n\n",
        "Initial Balance:".bold(),
        format_usd(report.initial_balance)
    ));

    #[derive(Tabled)]
    struct AllocationRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Allocation")]
        allocation: String,
        #[tabled(rename = "Bought")]
        bought: String,
        #[tabled(rename = "Current")]
        current: String,
        #[tabled(rename = "Return %")]
        return_pct: String,
    }

    let allocation_rows: Vec<AllocationRow> = report
        .allocations
        .iter()
        .map(|a| {
            let series = report.price_series.get(&a.symbol);
            let bought = series.and_then(|s| s.bought_price());
            let current = series.and_then(|s| s.current_price());

            let return_pct = match (bought, current) {
                (Some(b), Some(c)) => c
                    .checked_sub(b)
                    .and_then(|diff| diff.checked_div(b))
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .map(|pct| colorize(format_percent(pct), pct))
                    .unwrap_or_else(|| "N/A".to_string()),
                _ => "N/A".to_string(),
            };

            AllocationRow {
                symbol: a.symbol.clone(),
                allocation: format!("{}%", a.allocation_percent),
                bought: bought.map(format_usd).unwrap_or_else(|| "N/A".to_string()),
                current: current.map(format_usd).unwrap_or_else(|| "N/A".to_string()),
                return_pct,
            }
        })
        .collect();

    let mut table = Table::new(&allocation_rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    #[derive(Tabled)]
    struct PointRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    let point_rows: Vec<PointRow> = report
        .result
        .series
        .iter()
        .map(|p| PointRow {
            date: p.date.clone(),
            value: format_usd(p.value),
            change: p
                .value
                .checked_sub(report.initial_balance)
                .map(|change| colorize(format_usd(change), change))
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    if !point_rows.is_empty() {
        let mut table = Table::new(&point_rows);
        table.with(Style::modern());
        table.modify(Columns::new(1..), Alignment::right());
        output.push('\n');
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output.push_str(&format!("\n{}", "━".repeat(60).bright_black()));
    let value_text = format!(
        "{} ({})",
        format_usd(report.current_value()),
        format_percent(report.gain_percent)
    );
    let value_colored = if report.is_gain() {
        value_text.green().bold()
    } else {
        value_text.red().bold()
    };
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Current Value:".bold(),
        value_colored
    ));

    for warning in &report.warnings {
        output.push_str(&format!("{} {}\n", "⚠".yellow().bold(), warning));
    }

    output
}

/// Confirmation for a portfolio that passed validation
pub fn format_valid_portfolio(config: &PortfolioConfig, json_output: bool) -> String {
    if json_output {
        let payload = serde_json::json!({
            "valid": true,
            "start_date": config.start_date,
            "initial_balance": round_money(config.initial_balance),
            "allocations": config.allocations,
        });
        return serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e));
    }

    let symbols: Vec<String> = config
        .allocations
        .iter()
        .map(|a| format!("{} {}%", a.symbol, a.allocation_percent))
        .collect();
    format!(
        "{} Portfolio is valid: {} starting with {}",
        "✓".green().bold(),
        symbols.join(", "),
        format_usd(config.initial_balance)
    )
}

/// Resolved configuration, API key masked
pub fn format_config(config: &Config, path: &str, json_output: bool) -> String {
    if json_output {
        let payload = serde_json::json!({
            "path": path,
            "api_key": config.masked_api_key(),
            "base_url": config.base_url,
            "timeout_secs": config.timeout_secs,
            "output_size": config.output_size,
        });
        return serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e));
    }

    let mut output = String::new();
    output.push_str(&format!("{:<16} {}\n", "Config file:".bold(), path));
    output.push_str(&format!("{:<16} {}\n", "API key:".bold(), config.masked_api_key()));
    output.push_str(&format!("{:<16} {}\n", "Base URL:".bold(), config.base_url));
    output.push_str(&format!("{:<16} {}s\n", "Timeout:".bold(), config.timeout_secs));
    output.push_str(&format!("{:<16} {}", "Output size:".bold(), config.output_size));
    output
}

fn colorize(text: String, value: Decimal) -> String {
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}
