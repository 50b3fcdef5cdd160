//! HTML email body
//!
//! A condensed view: summary totals and the top users by volume. The full
//! per-user table lives in the attached PDF.

use crate::types::{ReportSummary, TOP_USERS_LIMIT};
use crate::utils::format::{format_number, format_rate};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; }
h1 { color: #2c5aa0; }
h2 { color: #2c5aa0; }
table { border-collapse: collapse; width: 100%; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
th { background-color: #4472C4; color: white; }
.summary { margin-bottom: 20px; }
.footer { font-size: small; color: #666; margin-top: 30px; }";

/// Render the email body for `summary`
pub fn render_email_body(summary: &ReportSummary) -> String {
    let totals = &summary.summary;
    let mut html = String::new();

    html.push_str("<html>\n<head>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str("<h1>SMTP2GO Monthly Usage Report</h1>\n");
    html.push_str(&format!(
        "<p>Please find attached the SMTP2GO usage report for <strong>{}</strong>.</p>\n",
        escape(&summary.period_formatted)
    ));

    html.push_str("<div class=\"summary\">\n<h2>Summary</h2>\n<ul>\n");
    for (label, value) in [
        ("Total Emails Sent", format_number(totals.total_sent)),
        ("Total Emails Delivered", format_number(totals.total_delivered)),
        ("Total Emails Failed", format_number(totals.total_failed)),
        ("Overall Delivery Rate", format_rate(totals.delivery_rate)),
        ("Total Users", totals.total_users.to_string()),
    ] {
        html.push_str(&format!("<li>{}: <strong>{}</strong></li>\n", label, value));
    }
    html.push_str("</ul>\n</div>\n");

    let top_users = summary.top_users(TOP_USERS_LIMIT);
    if !top_users.is_empty() {
        html.push_str("<h2>Top Users by Volume</h2>\n<table>\n");
        html.push_str("<tr><th>Username</th><th>Emails Sent</th><th>Delivery Rate</th></tr>\n");
        for user in top_users {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&user.username),
                format_number(user.sent),
                format_rate(user.delivery_rate)
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str(
        "<div class=\"footer\">\n<p>This report was automatically generated by the \
         SMTP2GO Monthly Usage Reporter. \
         For detailed information, please see the attached PDF report.</p>\n</div>\n",
    );
    html.push_str("</body>\n</html>\n");

    html
}

/// Minimal HTML escaping for text nodes
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
