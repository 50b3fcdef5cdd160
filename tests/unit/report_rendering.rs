use anyhow::Result;
use smtp2go_usage::analysis::reconcile;
use smtp2go_usage::observer::NullObserver;
use smtp2go_usage::report::{
    html, pdf, report_filename, OutputFormat, RenderedReport, ReportFormatter,
};
use smtp2go_usage::types::{Identity, ReportSummary, TrafficRecord};

use crate::common::{february_2025, fixed_now};

/// Tests for the PDF document, HTML email body and stdout renderings

fn summary_with_users(count: usize) -> ReportSummary {
    let traffic: Vec<TrafficRecord> = (0..count)
        .map(|i| TrafficRecord::new(format!("user{:02}", i), 1000 - i as u64 * 10, 1, 1))
        .collect();
    reconcile(&[], &traffic, february_2025(), fixed_now(), &NullObserver)
}

#[test]
fn test_email_body_lists_top_five_only() {
    let summary = summary_with_users(8);
    let body = html::render_email_body(&summary);

    assert!(body.contains("SMTP2GO Monthly Usage Report"));
    assert!(body.contains("February 01, 2025 - February 28, 2025"));
    assert!(body.contains("Top Users by Volume"));
    for shown in ["user00", "user01", "user02", "user03", "user04"] {
        assert!(body.contains(shown), "{} missing", shown);
    }
    for hidden in ["user05", "user06", "user07"] {
        assert!(!body.contains(hidden), "{} should not be listed", hidden);
    }
}

#[test]
fn test_email_body_formats_totals() {
    let summary = reconcile(
        &[Identity::new("bulk", "Bulk Sender", "bulk@example.com")],
        &[TrafficRecord::new("bulk", 1_234_567, 1_000, 234)],
        february_2025(),
        fixed_now(),
        &NullObserver,
    );
    let body = ReportFormatter::email_body(&summary);

    assert!(body.contains("1,234,567"));
    assert!(body.contains("1,233,333"));
    assert!(body.contains("1,234"));
    assert!(body.contains("99.90%"));
}

#[test]
fn test_email_body_escapes_usernames() {
    let summary = reconcile(
        &[],
        &[TrafficRecord::new("<script>", 1, 0, 0)],
        february_2025(),
        fixed_now(),
        &NullObserver,
    );
    let body = html::render_email_body(&summary);

    assert!(body.contains("&lt;script&gt;"));
    assert!(!body.contains("<td><script>"));
}

#[test]
fn test_email_body_without_activity_has_no_table() {
    let summary = summary_with_users(0);
    let body = html::render_email_body(&summary);

    assert!(!body.contains("Top Users by Volume"));
    assert!(body.contains("Total Emails Sent: <strong>0</strong>"));
    assert!(body.contains("0.00%"));
}

#[test]
fn test_pdf_bytes_are_a_pdf_document() -> Result<()> {
    let bytes = pdf::render_pdf(&summary_with_users(3))?;
    assert!(bytes.starts_with(b"%PDF"));
    Ok(())
}

#[test]
fn test_pdf_paginates_long_user_lists() -> Result<()> {
    let short = pdf::render_pdf(&summary_with_users(5))?;
    let long = pdf::render_pdf(&summary_with_users(90))?;

    assert!(long.starts_with(b"%PDF"));
    assert!(long.len() > short.len());
    Ok(())
}

#[test]
fn test_pdf_for_empty_period() -> Result<()> {
    let bytes = ReportFormatter::pdf(&summary_with_users(0))?;
    assert!(bytes.starts_with(b"%PDF"));
    Ok(())
}

#[test]
fn test_report_filename_uses_period_month() {
    assert_eq!(
        report_filename(&summary_with_users(1)),
        "smtp2go_usage_report_2025_02.pdf"
    );
}

#[test]
fn test_rendered_report_written_into_new_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("nested").join("reports");

    let rendered = RenderedReport::render(&summary_with_users(2))?;
    let path = rendered.write_to(&target)?;

    assert_eq!(path, target.join("smtp2go_usage_report_2025_02.pdf"));
    assert_eq!(std::fs::read(&path)?, rendered.pdf_bytes);
    Ok(())
}

#[test]
fn test_console_and_json_summaries() -> Result<()> {
    let summary = summary_with_users(2);

    let console = ReportFormatter::format_summary(&summary, &OutputFormat::Console)?;
    assert!(console.contains("user00"));
    assert!(console.contains("February 01, 2025 - February 28, 2025"));

    let json = ReportFormatter::format_summary(&summary, &OutputFormat::Json)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["summary"]["total_users"], 2);
    assert_eq!(value["users"][0]["username"], "user00");
    assert_eq!(
        value["period_formatted"],
        "February 01, 2025 - February 28, 2025"
    );
    Ok(())
}
