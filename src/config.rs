use crate::errors::{AppError, AppResult};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix for environment overrides, e.g. `SMTP2GO_API_KEY`
pub const ENV_PREFIX: &str = "SMTP2GO";

pub const DEFAULT_API_BASE_URL: &str = "https://api.smtp2go.com/v3";
pub const DEFAULT_SMTP_SERVER: &str = "smtp2go.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SUBJECT_TEMPLATE: &str = "SMTP2GO Usage Report - {period}";

/// Placeholder replaced by the formatted report period in the subject line
pub const PERIOD_PLACEHOLDER: &str = "{period}";

/// Settings as loaded from defaults, the legacy config file, the environment
/// and the command line. Use [`AppConfig::validate`] to obtain usable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub api_timeout_seconds: u64,
    pub api_max_retries: usize,
    pub api_initial_backoff_ms: u64,
    pub api_backoff_multiplier: f64,
    pub api_max_backoff_seconds: u64,

    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub sender_email: Option<String>,

    #[serde(default, deserialize_with = "deserialize_recipients")]
    pub report_recipients: Vec<String>,
    pub report_subject_template: String,
    pub report_dir: PathBuf,
}

/// Provider API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 10,
        }
    }
}

/// Outgoing mail server used to deliver the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_email: String,
}

/// Where the report goes and how it is titled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    pub recipients: Vec<String>,
    pub subject_template: String,
    pub report_dir: PathBuf,
}

impl ReportOptions {
    /// Subject line with `{period}` substituted
    pub fn subject(&self, period: &str) -> String {
        self.subject_template.replace(PERIOD_PLACEHOLDER, period)
    }
}

/// Validated settings: every required value is present
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub api: ApiConfig,
    pub smtp: SmtpConfig,
    pub report: ReportOptions,
}

/// Command-line values; `None` leaves lower-precedence sources in effect
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub sender_email: Option<String>,
    /// Comma-separated list
    pub report_recipients: Option<String>,
    pub report_subject_template: Option<String>,
    pub report_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration with precedence CLI > environment > legacy file > defaults
    pub fn load(overrides: &ConfigOverrides) -> AppResult<Self> {
        Self::load_with_env(overrides, None)
    }

    /// Same as [`AppConfig::load`], reading `SMTP2GO_*` variables from `env`
    /// instead of the process environment when given
    pub fn load_with_env(
        overrides: &ConfigOverrides,
        env: Option<Map<String, String>>,
    ) -> AppResult<Self> {
        let api = ApiConfig::default();
        let mut builder = Config::builder()
            // API defaults
            .set_default("api_base_url", api.base_url)?
            .set_default("api_timeout_seconds", api.timeout_seconds)?
            .set_default("api_max_retries", api.max_retries as i64)?
            .set_default("api_initial_backoff_ms", api.initial_backoff_ms)?
            .set_default("api_backoff_multiplier", api.backoff_multiplier)?
            .set_default("api_max_backoff_seconds", api.max_backoff_seconds)?
            // SMTP defaults
            .set_default("smtp_server", DEFAULT_SMTP_SERVER)?
            .set_default("smtp_port", DEFAULT_SMTP_PORT as i64)?
            // Report defaults
            .set_default("report_subject_template", DEFAULT_SUBJECT_TEMPLATE)?
            .set_default(
                "report_dir",
                default_report_dir().to_string_lossy().to_string(),
            )?;

        if let Some(path) = &overrides.config_file {
            warn!(
                "Using a config file is deprecated. \
                 Please use SMTP2GO_* environment variables instead."
            );
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Json));
            } else {
                warn!("Configuration file not found: {}", path.display());
            }
        }

        let builder = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .set_override_option("api_key", overrides.api_key.clone())?
            .set_override_option("smtp_server", overrides.smtp_server.clone())?
            .set_override_option("smtp_port", overrides.smtp_port.map(i64::from))?
            .set_override_option("smtp_username", overrides.smtp_username.clone())?
            .set_override_option("smtp_password", overrides.smtp_password.clone())?
            .set_override_option("sender_email", overrides.sender_email.clone())?
            .set_override_option("report_recipients", overrides.report_recipients.clone())?
            .set_override_option(
                "report_subject_template",
                overrides.report_subject_template.clone(),
            )?
            .set_override_option(
                "report_dir",
                overrides
                    .report_dir
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().to_string()),
            )?;

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.report_dir = expand_home(&app_config.report_dir);

        Ok(app_config)
    }

    /// Names of required settings that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("api_key", &self.api_key),
            ("smtp_username", &self.smtp_username),
            ("smtp_password", &self.smtp_password),
            ("sender_email", &self.sender_email),
        ] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                missing.push(name);
            }
        }
        if self.report_recipients.is_empty() {
            missing.push("report_recipients");
        }
        missing
    }

    /// Check required settings and split them into per-component configs
    pub fn validate(&self) -> AppResult<ReportSettings> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::ConfigInvalid { missing });
        }
        // zero would time out every attempt
        if self.api_timeout_seconds == 0 {
            return Err(AppError::Config(
                "api_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let required = |value: &Option<String>| value.clone().unwrap_or_default();

        Ok(ReportSettings {
            api: ApiConfig {
                api_key: required(&self.api_key),
                base_url: self.api_base_url.trim_end_matches('/').to_string(),
                timeout_seconds: self.api_timeout_seconds,
                max_retries: self.api_max_retries,
                initial_backoff_ms: self.api_initial_backoff_ms,
                backoff_multiplier: self.api_backoff_multiplier,
                max_backoff_seconds: self.api_max_backoff_seconds,
            },
            smtp: SmtpConfig {
                server: self.smtp_server.clone(),
                port: self.smtp_port,
                username: required(&self.smtp_username),
                password: required(&self.smtp_password),
                sender_email: required(&self.sender_email),
            },
            report: ReportOptions {
                recipients: self.report_recipients.clone(),
                subject_template: self.report_subject_template.clone(),
                report_dir: self.report_dir.clone(),
            },
        })
    }
}

/// `~/smtp2go-reports`, or a relative directory when no home is known
pub fn default_report_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("smtp2go-reports"))
        .unwrap_or_else(|| PathBuf::from("smtp2go-reports"))
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Split a comma-separated recipient list, dropping blanks
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

/// Recipients arrive as a JSON array from the legacy file and as a
/// comma-separated string from the environment or command line
fn deserialize_recipients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Recipients {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Recipients::deserialize(deserializer)? {
        Recipients::List(list) => list
            .iter()
            .flat_map(|entry| parse_recipients(entry))
            .collect(),
        Recipients::Csv(raw) => parse_recipients(&raw),
    })
}
