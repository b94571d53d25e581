//! Markdown and JSON report generation.
//!
//! This module renders a dashboard, after dismissals, for operators.

use crate::analysis::{top_ingredients, total_prep_items};
use crate::format::{format_busy_periods, relative_day_label, to_12_hour};
use crate::models::{PrepNotification, Report, ReportMetadata, TrafficForecast};
use anyhow::Result;
use chrono::NaiveDate;

/// Options that shape the Markdown output.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub include_top_ingredients: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_top_ingredients: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &MarkdownOptions) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# PrepCast Dashboard\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report, options));
    output.push_str(&generate_traffic_section(
        &report.dashboard.traffic_forecasts,
        report.metadata.today,
    ));
    output.push_str(&generate_prep_section(
        &report.dashboard.notifications,
        report.metadata.today,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Today:** {}\n", metadata.today.format("%Y-%m-%d")));
    if metadata.dismissed_prep > 0 || metadata.dismissed_traffic > 0 {
        section.push_str(&format!(
            "- **Dismissed:** {} prep, {} traffic\n",
            metadata.dismissed_prep, metadata.dismissed_traffic
        ));
    }
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(report: &Report, options: &MarkdownOptions) -> String {
    let mut section = String::new();
    let dashboard = &report.dashboard;

    section.push_str("## Summary\n\n");
    section.push_str("| Traffic Forecasts | Prep Notifications | Prep Items |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        dashboard.traffic_forecasts.len(),
        dashboard.notifications.len(),
        total_prep_items(&dashboard.notifications)
    ));

    if options.include_top_ingredients {
        let top = top_ingredients(&dashboard.notifications, 5);
        if !top.is_empty() {
            section.push_str("### Top Ingredients\n\n");
            section.push_str("| Ingredient | Total Quantity |\n");
            section.push_str("|:---|---:|\n");

            for (name, quantity) in top {
                section.push_str(&format!("| {} | {:.2} |\n", escape_cell(&name), quantity));
            }
            section.push('\n');
        }
    }

    section
}

/// Generate the traffic outlook section.
fn generate_traffic_section(forecasts: &[TrafficForecast], today: NaiveDate) -> String {
    let mut section = String::new();

    section.push_str("## Traffic Outlook\n\n");

    if forecasts.is_empty() {
        section.push_str("No upcoming traffic forecasts.\n\n");
        return section;
    }

    for forecast in forecasts {
        section.push_str(&generate_traffic_block(forecast, today));
    }

    section
}

/// Generate a single traffic forecast block.
fn generate_traffic_block(forecast: &TrafficForecast, today: NaiveDate) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### {} `#{}`\n\n",
        relative_day_label(forecast.date, today),
        forecast.id
    ));

    if !forecast.day_of_week.is_empty() {
        block.push_str(&format!("- **Day:** {}\n", forecast.day_of_week));
    }
    if !forecast.forecasted_increase.is_empty() {
        block.push_str(&format!(
            "- **Expected increase:** {} above normal\n",
            forecast.forecasted_increase
        ));
    }
    if !forecast.peak_hour.is_empty() {
        block.push_str(&format!("- **Peak hour:** {}\n", to_12_hour(&forecast.peak_hour)));
    }
    if !forecast.busy_periods.is_empty() {
        block.push_str(&format!(
            "- **Busy periods:** {}\n",
            format_busy_periods(&forecast.busy_periods)
        ));
    }
    block.push('\n');

    block
}

/// Generate the prep notifications section.
fn generate_prep_section(notifications: &[PrepNotification], today: NaiveDate) -> String {
    let mut section = String::new();

    section.push_str("## Prep Notifications\n\n");

    if notifications.is_empty() {
        section.push_str("Nothing to prep ahead right now.\n\n");
        return section;
    }

    for notification in notifications {
        section.push_str(&format!(
            "### {} {} `#{}`\n\n",
            notification.severity.emoji(),
            relative_day_label(notification.date, today),
            notification.id
        ));
        section.push_str("| Ingredient | Quantity | Bulk Order |\n");
        section.push_str("|:---|---:|---:|\n");

        for item in &notification.items {
            section.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                escape_cell(&item.name),
                item.quantity,
                item.bulk_order_quantity
            ));
        }
        section.push('\n');
    }

    section
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by PrepCast*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
