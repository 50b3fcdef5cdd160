//! End-to-end report run: fetch, reconcile, render, write, send
//!
//! Stages run strictly in order. Fetch problems degrade to an empty report;
//! render and delivery failures abort the run with distinct error variants.

use crate::analysis::reconcile;
use crate::api::Smtp2GoClient;
use crate::config::ReportSettings;
use crate::email::EmailSender;
use crate::errors::AppResult;
use crate::observer::ReportObserver;
use crate::report::RenderedReport;
use crate::types::{ReportPeriod, ReportSummary};
use crate::utils::time::previous_month_range;
use chrono::{DateTime, FixedOffset, Local};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Per-run choices that are not part of the configuration
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Explicit period; `None` reports on the previous calendar month
    pub period: Option<ReportPeriod>,
    /// Whether to email the report after writing it
    pub send_email: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            period: None,
            send_email: true,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub summary: ReportSummary,
    pub pdf_path: PathBuf,
    pub delivered: bool,
}

pub struct ReportPipeline {
    settings: ReportSettings,
    client: Smtp2GoClient,
    observer: Arc<dyn ReportObserver>,
}

impl ReportPipeline {
    pub fn new(settings: ReportSettings, observer: Arc<dyn ReportObserver>) -> AppResult<Self> {
        let client = Smtp2GoClient::new(settings.api.clone(), Arc::clone(&observer))?;
        Ok(Self {
            settings,
            client,
            observer,
        })
    }

    /// Run every stage with the local clock
    pub async fn run(&self, options: PipelineOptions) -> AppResult<PipelineOutcome> {
        self.run_at(options, Local::now().fixed_offset()).await
    }

    /// Run every stage as if the current time were `now`
    pub async fn run_at(
        &self,
        options: PipelineOptions,
        now: DateTime<FixedOffset>,
    ) -> AppResult<PipelineOutcome> {
        let period = options
            .period
            .unwrap_or_else(|| previous_month_range(&now));
        info!("Generating report for period: {}", period.formatted());

        let summary = self.build_summary(period, now).await;

        let rendered = RenderedReport::render(&summary)?;
        let pdf_path = rendered.write_to(&self.settings.report.report_dir)?;

        if !options.send_email {
            info!("Email delivery disabled; report kept at {}", pdf_path.display());
            return Ok(PipelineOutcome {
                summary,
                pdf_path,
                delivered: false,
            });
        }

        let subject = self.settings.report.subject(&summary.period_formatted);
        EmailSender::new(self.settings.smtp.clone())
            .send_report(&self.settings.report.recipients, &subject, &rendered)
            .await?;

        info!("Monthly report generated and sent successfully");
        Ok(PipelineOutcome {
            summary,
            pdf_path,
            delivered: true,
        })
    }

    /// Fetch both data sets and reconcile them; never fails
    pub async fn build_summary(
        &self,
        period: ReportPeriod,
        generated_at: DateTime<FixedOffset>,
    ) -> ReportSummary {
        let identities = self.client.list_identities().await;
        info!("Found {} SMTP users", identities.len());

        let traffic = self.client.get_traffic(&period).await;
        info!("Retrieved usage records for {} users", traffic.len());

        reconcile(
            &identities,
            &traffic,
            period,
            generated_at,
            self.observer.as_ref(),
        )
    }
}
