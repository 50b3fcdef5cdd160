use crate::config::{AppConfig, ConfigOverrides};
use crate::errors::{AppError, AppResult};
use crate::observer::TracingObserver;
use crate::pipeline::{PipelineOptions, ReportPipeline};
use crate::report::{OutputFormat, ReportFormatter};
use crate::types::ReportPeriod;
use crate::utils::time::period_for_dates;
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// SMTP2GO Monthly Usage Reporter
///
/// Every option can also be set through an `SMTP2GO_*` environment variable
/// (e.g. `SMTP2GO_API_KEY`); command-line values take precedence.
#[derive(Parser, Debug)]
#[command(name = "smtp2go-usage")]
#[command(about = "Generate and email a monthly SMTP2GO usage report")]
#[command(version)]
pub struct Cli {
    /// Legacy JSON configuration file (deprecated)
    #[arg(short = 'c', long)]
    pub config_file: Option<PathBuf>,

    /// SMTP2GO API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// SMTP server for sending the report
    #[arg(long)]
    pub smtp_server: Option<String>,

    /// SMTP port
    #[arg(long)]
    pub smtp_port: Option<u16>,

    /// SMTP username
    #[arg(long)]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long)]
    pub smtp_password: Option<String>,

    /// Sender email address
    #[arg(long)]
    pub sender_email: Option<String>,

    /// Comma-separated list of report recipients
    #[arg(long)]
    pub report_recipients: Option<String>,

    /// Email subject; `{period}` is replaced by the report period
    #[arg(long)]
    pub report_subject_template: Option<String>,

    /// Directory the PDF report is written to
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// First day of a custom period (YYYY-MM-DD)
    #[arg(long, requires = "end_date")]
    pub start_date: Option<NaiveDate>,

    /// Last day of a custom period (YYYY-MM-DD)
    #[arg(long, requires = "start_date")]
    pub end_date: Option<NaiveDate>,

    /// Build and write the report without emailing it
    #[arg(long)]
    pub no_email: bool,

    /// Also print the summary to stdout
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config_file.clone(),
            api_key: self.api_key.clone(),
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone(),
            smtp_password: self.smtp_password.clone(),
            sender_email: self.sender_email.clone(),
            report_recipients: self.report_recipients.clone(),
            report_subject_template: self.report_subject_template.clone(),
            report_dir: self.report_dir.clone(),
        }
    }

    /// Custom period from `--start-date`/`--end-date`, in the local time zone
    pub fn period(&self) -> AppResult<Option<ReportPeriod>> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AppError::InvalidData(format!(
                "start date {} is after end date {}",
                start, end
            ))),
            (Some(start), Some(end)) => Ok(Some(period_for_dates(start, end, &Local))),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidData(
                "--start-date and --end-date must be given together".to_string(),
            )),
        }
    }
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "info" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    execute(&cli).await
}

/// Load configuration from every source, validate it and run one report
pub async fn execute(cli: &Cli) -> AppResult<()> {
    info!("=== SMTP2GO Monthly Usage Reporter ===");

    let period = cli.period()?;
    let settings = AppConfig::load(&cli.overrides())?.validate()?;
    info!("Configuration loaded successfully");

    let pipeline = ReportPipeline::new(settings, Arc::new(TracingObserver))?;
    let outcome = pipeline
        .run(PipelineOptions {
            period,
            send_email: !cli.no_email,
        })
        .await?;

    if let Some(format) = &cli.format {
        println!("{}", ReportFormatter::format_summary(&outcome.summary, format)?);
    }

    Ok(())
}
