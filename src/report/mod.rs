//! Report rendering and output
//!
//! Provides the PDF document, the HTML email body and stdout renderings of a
//! [`ReportSummary`] via the [`ReportFormatter`] facade.

pub mod console;
pub mod html;
pub mod pdf;

use crate::errors::{AppError, AppResult};
use crate::types::ReportSummary;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output format options for the stdout summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_summary(summary: &ReportSummary, format: &OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Console => Ok(console::format_summary(summary)),
            OutputFormat::Json => export_json(summary),
        }
    }

    pub fn email_body(summary: &ReportSummary) -> String {
        html::render_email_body(summary)
    }

    pub fn pdf(summary: &ReportSummary) -> AppResult<Vec<u8>> {
        pdf::render_pdf(summary)
    }
}

/// Everything the distribution stage needs, built before anything is sent
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub html_body: String,
    pub pdf_bytes: Vec<u8>,
    pub pdf_filename: String,
}

impl RenderedReport {
    pub fn render(summary: &ReportSummary) -> AppResult<Self> {
        let pdf_bytes = ReportFormatter::pdf(summary)?;
        Ok(Self {
            html_body: ReportFormatter::email_body(summary),
            pdf_bytes,
            pdf_filename: report_filename(summary),
        })
    }

    /// Write the PDF into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Render(format!(
                "Failed to create report directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(&self.pdf_filename);
        fs::write(&path, &self.pdf_bytes).map_err(|e| {
            AppError::Render(format!("Failed to write report {}: {}", path.display(), e))
        })?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

/// `smtp2go_usage_report_<YYYY_MM>.pdf`, named after the period's first month
pub fn report_filename(summary: &ReportSummary) -> String {
    format!("smtp2go_usage_report_{}.pdf", summary.period.slug())
}

/// Export data as JSON for programmatic use
pub fn export_json<T: serde::Serialize>(data: &T) -> AppResult<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| AppError::Render(format!("JSON export failed: {}", e)))
}
