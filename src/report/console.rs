//! Plain-text summary for terminal output

use crate::types::ReportSummary;
use crate::utils::format::{format_number, format_rate};

/// Format the summary and the per-user table for console output
pub fn format_summary(summary: &ReportSummary) -> String {
    let mut output = String::new();
    let totals = &summary.summary;

    output.push_str("=== SMTP2GO USAGE REPORT ===\n");
    output.push_str(&format!("Period: {}\n", summary.period_formatted));
    output.push_str(&format!(
        "Generated: {}\n\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S %z")
    ));

    output.push_str(&format!(
        "Total Emails Sent:      {:>12}\n",
        format_number(totals.total_sent)
    ));
    output.push_str(&format!(
        "Total Emails Delivered: {:>12}\n",
        format_number(totals.total_delivered)
    ));
    output.push_str(&format!(
        "Total Emails Failed:    {:>12}\n",
        format_number(totals.total_failed)
    ));
    output.push_str(&format!(
        "Overall Delivery Rate:  {:>12}\n",
        format_rate(totals.delivery_rate)
    ));
    output.push_str(&format!(
        "Total Users:            {:>12}\n",
        totals.total_users
    ));

    if !summary.has_activity() {
        output.push_str("\nNo email activity recorded for this period.\n");
        return output;
    }

    output.push_str("\n=== USAGE BY USER ===\n\n");
    output.push_str(&format!(
        "{:<24} | {:<24} | {:>10} | {:>10} | {:>8} | {:>8}\n",
        "Username", "Name", "Sent", "Delivered", "Failed", "Rate"
    ));
    output.push_str(&format!("{}\n", "-".repeat(99)));

    for user in &summary.users {
        output.push_str(&format!(
            "{:<24} | {:<24} | {:>10} | {:>10} | {:>8} | {:>8}\n",
            user.username,
            user.display_name,
            format_number(user.sent),
            format_number(user.delivered),
            format_number(user.failed),
            format_rate(user.delivery_rate),
        ));
    }

    output
}
